//! Sensors: periodic scans that write memories.

use rand::Rng;
use tracing::trace;

use mc_rs_world::pos::BlockPos;

use crate::behavior::BehaviorContext;
use crate::level::EntityKind;
use crate::memory::keys::{NEAREST_VISIBLE_VILLAGERS, SECONDARY_JOB_SITE};
use crate::memory::MemoryId;
use crate::mob::{Mob, VillagerMob};

/// Ticks between scans when a sensor does not say otherwise.
pub const DEFAULT_SCAN_RATE: u64 = 20;

pub trait Sensor<E>: Send + Sync {
    fn scan_rate(&self) -> u64 {
        DEFAULT_SCAN_RATE
    }

    /// Memories this sensor writes.
    fn outputs(&self) -> Vec<MemoryId>;

    fn sense(&mut self, ctx: &mut BehaviorContext<'_, E>);

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A sensor with its own scan clock. The first scan happens after a random
/// offset within one scan period so agents do not all scan on the same tick.
pub(crate) struct ScheduledSensor<E> {
    sensor: Box<dyn Sensor<E>>,
    next_scan: Option<u64>,
}

impl<E> ScheduledSensor<E> {
    pub(crate) fn new(sensor: Box<dyn Sensor<E>>) -> Self {
        Self {
            sensor,
            next_scan: None,
        }
    }

    pub(crate) fn outputs(&self) -> Vec<MemoryId> {
        self.sensor.outputs()
    }

    pub(crate) fn name(&self) -> &'static str {
        self.sensor.name()
    }

    pub(crate) fn tick(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        let rate = self.sensor.scan_rate().max(1);
        let next = *self
            .next_scan
            .get_or_insert_with(|| ctx.game_time + ctx.random.gen_range(0..rate));
        if ctx.game_time >= next {
            trace!(sensor = self.sensor.name(), "scan");
            self.sensor.sense(ctx);
            self.next_scan = Some(ctx.game_time + rate);
        }
    }
}

// ---------------------------------------------------------------------------
// NearestVillagerSensor
// ---------------------------------------------------------------------------

/// Lists visible villagers within range, nearest first.
#[derive(Debug)]
pub struct NearestVillagerSensor {
    range: f64,
    scan_rate: u64,
}

impl NearestVillagerSensor {
    pub fn new(range: f64, scan_rate: u64) -> Self {
        Self { range, scan_rate }
    }
}

impl Default for NearestVillagerSensor {
    fn default() -> Self {
        Self::new(16.0, DEFAULT_SCAN_RATE)
    }
}

impl<E: Mob> Sensor<E> for NearestVillagerSensor {
    fn scan_rate(&self) -> u64 {
        self.scan_rate
    }

    fn outputs(&self) -> Vec<MemoryId> {
        vec![NEAREST_VISIBLE_VILLAGERS.id()]
    }

    fn sense(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        let me = ctx.mob.id();
        let origin = ctx.mob.position();
        let eyes = ctx.mob.eye_position();
        let mut visible: Vec<_> = ctx
            .level
            .nearby_entities(origin, self.range)
            .into_iter()
            .filter(|e| e.id != me && e.kind == EntityKind::Villager)
            .filter(|e| e.position.distance_to_sqr(origin) <= self.range * self.range)
            .filter(|e| ctx.level.has_line_of_sight(eyes, e.eye_position()))
            .collect();
        visible.sort_by(|a, b| {
            a.position
                .distance_to_sqr(origin)
                .total_cmp(&b.position.distance_to_sqr(origin))
        });
        ctx.brain
            .set_optional(NEAREST_VISIBLE_VILLAGERS, (!visible.is_empty()).then_some(visible));
    }
}

// ---------------------------------------------------------------------------
// SecondaryPoiSensor
// ---------------------------------------------------------------------------

/// Collects blocks the villager's profession works on (farmland for
/// farmers) in a 9x5x9 box around the villager.
#[derive(Debug)]
pub struct SecondaryPoiSensor {
    scan_rate: u64,
}

impl SecondaryPoiSensor {
    pub fn new(scan_rate: u64) -> Self {
        Self { scan_rate }
    }
}

impl Default for SecondaryPoiSensor {
    fn default() -> Self {
        Self::new(40)
    }
}

impl<E: VillagerMob> Sensor<E> for SecondaryPoiSensor {
    fn scan_rate(&self) -> u64 {
        self.scan_rate
    }

    fn outputs(&self) -> Vec<MemoryId> {
        vec![SECONDARY_JOB_SITE.id()]
    }

    fn sense(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        let profession = ctx.mob.profession();
        let pos = ctx.mob.block_position();
        let found: Vec<BlockPos> = BlockPos::between_closed(pos.offset(-4, -2, -4), pos.offset(4, 2, 4))
            .filter(|p| profession.is_secondary_poi(ctx.level.block(*p)))
            .collect();
        ctx.brain
            .set_optional(SECONDARY_JOB_SITE, (!found.is_empty()).then_some(found));
    }
}
