//! Head control and picking someone to interact with.

use crate::behavior::{Behavior, BehaviorContext, Task};
use crate::level::{EntityKind, PositionTracker};
use crate::memory::keys::{INTERACTION_TARGET, LOOK_TARGET, NEAREST_VISIBLE_VILLAGERS};
use crate::memory::{MemoryId, MemoryStatus};
use crate::mob::Mob;

// ---------------------------------------------------------------------------
// LookAtTargetSink: keep facing the look target
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct LookAtTargetSink;

impl LookAtTargetSink {
    pub fn create(min_duration: u64, max_duration: u64) -> Behavior<Self> {
        Behavior::new([(LOOK_TARGET.id(), MemoryStatus::ValuePresent)], Self)
            .with_duration(min_duration, max_duration)
    }
}

impl<E: Mob> Task<E> for LookAtTargetSink {
    fn can_still_use(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        ctx.brain
            .get(LOOK_TARGET)
            .is_some_and(|t| t.is_visible(&*ctx.level))
    }

    fn tick(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        if let Some(target) = ctx.brain.get(LOOK_TARGET) {
            let at = target.position(&*ctx.level);
            ctx.mob.look_at(at);
        }
    }

    fn stop(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        ctx.brain.erase(LOOK_TARGET);
    }
}

// ---------------------------------------------------------------------------
// SetLookAndInteraction: choose a nearby villager to interact with
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SetLookAndInteraction {
    kind: EntityKind,
    range_sqr: f64,
}

impl SetLookAndInteraction {
    pub fn create(kind: EntityKind, interaction_range: i32) -> Behavior<Self> {
        let range = f64::from(interaction_range);
        Behavior::new(
            [
                (INTERACTION_TARGET.id(), MemoryStatus::Registered),
                (NEAREST_VISIBLE_VILLAGERS.id(), MemoryStatus::ValuePresent),
            ],
            Self {
                kind,
                range_sqr: range * range,
            },
        )
    }
}

impl<E: Mob> Task<E> for SetLookAndInteraction {
    fn check_extra_start_conditions(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        ctx.brain
            .get(NEAREST_VISIBLE_VILLAGERS)
            .is_some_and(|v| v.iter().any(|e| e.kind == self.kind))
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        let here = ctx.mob.position();
        let partner = ctx.brain.get(NEAREST_VISIBLE_VILLAGERS).and_then(|visible| {
            visible
                .iter()
                .filter(|e| e.kind == self.kind)
                .find(|e| e.position.distance_to_sqr(here) <= self.range_sqr)
                .cloned()
        });
        if let Some(partner) = partner {
            ctx.brain.set(INTERACTION_TARGET, partner.id);
            ctx.brain.set(LOOK_TARGET, PositionTracker::entity(&partner));
        }
    }

    fn used_memories(&self) -> Vec<MemoryId> {
        vec![LOOK_TARGET.id()]
    }
}
