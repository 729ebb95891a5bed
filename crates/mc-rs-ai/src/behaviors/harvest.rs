//! Farmers harvesting mature crops and replanting farmland.

use tracing::trace;

use mc_rs_world::block::Block;
use mc_rs_world::item::Item;
use mc_rs_world::pos::BlockPos;

use rand::Rng;

use crate::behavior::{Behavior, BehaviorContext, Task};
use crate::config::HarvestConfig;
use crate::level::{Level, PositionTracker, Sound, WalkTarget};
use crate::memory::keys::{LOOK_TARGET, SECONDARY_JOB_SITE, WALK_TARGET};
use crate::memory::MemoryStatus;
use crate::mob::{Profession, VillagerMob, FARM_SEEDS};
use crate::weighted::TickRange;

/// How close to a tile's center the farmer must be to work it.
const REACH: f64 = 1.5;

/// Pause before working the next tile.
const NEXT_TILE_PAUSE: u64 = 20;

#[derive(Debug)]
pub struct HarvestFarmland {
    work_ticks: u64,
    cooldown: TickRange,
    speed: f64,
    target: Option<BlockPos>,
    next_ok_start_time: u64,
    time_worked: u64,
    valid_farmland: Vec<BlockPos>,
}

impl HarvestFarmland {
    pub fn create(config: &HarvestConfig) -> Behavior<Self> {
        Behavior::new(
            [
                (LOOK_TARGET.id(), MemoryStatus::Registered),
                (WALK_TARGET.id(), MemoryStatus::Registered),
                (SECONDARY_JOB_SITE.id(), MemoryStatus::ValuePresent),
            ],
            Self {
                work_ticks: config.work_ticks,
                cooldown: config.cooldown,
                speed: config.speed,
                target: None,
                next_ok_start_time: 0,
                time_worked: 0,
                valid_farmland: Vec::new(),
            },
        )
        .with_duration(config.work_ticks, config.work_ticks)
    }

    /// Tile currently being worked.
    pub fn target(&self) -> Option<BlockPos> {
        self.target
    }

    fn pick_farmland(&self, rng: &mut impl Rng) -> Option<BlockPos> {
        if self.valid_farmland.is_empty() {
            None
        } else {
            Some(self.valid_farmland[rng.gen_range(0..self.valid_farmland.len())])
        }
    }

    fn walk_to<E>(&self, ctx: &mut BehaviorContext<'_, E>, pos: BlockPos) {
        ctx.brain.set(LOOK_TARGET, PositionTracker::Block(pos));
        ctx.brain.set(WALK_TARGET, WalkTarget::block(pos, self.speed, 1));
    }
}

/// A mature crop, or air over farmland.
fn is_workable(level: &dyn Level, pos: BlockPos) -> bool {
    let block = level.block(pos);
    block.is_mature_crop() || (block.is_air() && level.block(pos.below()) == Block::Farmland)
}

/// Seed to plant next: farm seeds by priority, then pack crops.
fn pick_seed(mob: &impl VillagerMob) -> Option<Item> {
    let inventory = mob.inventory();
    FARM_SEEDS
        .into_iter()
        .find(|seed| inventory.count_item(*seed) > 0)
        .or_else(|| {
            inventory
                .stacks()
                .map(|s| s.item)
                .find(|item| matches!(item, Item::ModdedSeeds(_)))
        })
}

fn plant<E: VillagerMob>(ctx: &mut BehaviorContext<'_, E>, pos: BlockPos) {
    let Some(seed) = pick_seed(&*ctx.mob) else {
        return;
    };
    let Some(kind) = seed.plants() else {
        return;
    };
    if ctx.level.set_block(pos, Block::planted(kind)) {
        ctx.level.play_sound(pos.center(), Sound::CropPlanted);
        ctx.mob.inventory_mut().remove_one(seed);
        trace!(mob = ctx.mob.id(), %pos, ?kind, "planted crop");
    }
}

impl<E: VillagerMob> Task<E> for HarvestFarmland {
    fn check_extra_start_conditions(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        if !ctx.level.mob_griefing() || ctx.mob.profession() != Profession::Farmer {
            return false;
        }
        if ctx.game_time < self.next_ok_start_time {
            return false;
        }
        let origin = ctx.mob.block_position();
        let level = &*ctx.level;
        self.valid_farmland = BlockPos::between_closed(origin.offset(-1, -1, -1), origin.offset(1, 1, 1))
            .filter(|pos| is_workable(level, *pos))
            .collect();
        self.target = self.pick_farmland(ctx.random);
        self.target.is_some()
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        if let Some(pos) = self.target {
            self.walk_to(ctx, pos);
        }
    }

    fn tick(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        let Some(pos) = self.target else {
            self.time_worked += 1;
            return;
        };
        if !pos.closer_to_center_than(ctx.mob.position(), REACH) {
            return;
        }
        if ctx.game_time > self.next_ok_start_time {
            let block = ctx.level.block(pos);
            let over_farmland = ctx.level.block(pos.below()) == Block::Farmland;
            if block.is_mature_crop() {
                let id = ctx.mob.id();
                ctx.level.destroy_block(pos, true, Some(id));
                trace!(mob = id, %pos, "harvested crop");
            } else if block.is_air() && over_farmland && ctx.mob.has_farm_seeds() {
                plant(ctx, pos);
            } else {
                // tile is done; move on to another
                self.valid_farmland.retain(|p| *p != pos);
                self.target = self.pick_farmland(ctx.random);
                if let Some(next) = self.target {
                    self.next_ok_start_time = ctx.game_time + NEXT_TILE_PAUSE;
                    self.walk_to(ctx, next);
                }
            }
        }
        self.time_worked += 1;
    }

    fn can_still_use(&mut self, _ctx: &mut BehaviorContext<'_, E>) -> bool {
        self.target.is_some() && self.time_worked < self.work_ticks
    }

    fn stop(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        ctx.brain.erase(LOOK_TARGET);
        ctx.brain.erase(WALK_TARGET);
        self.time_worked = 0;
        self.target = None;
        self.next_ok_start_time = ctx.game_time + self.cooldown.sample(ctx.random);
    }
}

#[cfg(test)]
mod tests {
    use mc_rs_world::block::CropKind;
    use mc_rs_world::item::ItemStack;
    use mc_rs_world::pos::Vec3;

    use super::*;
    use crate::behavior::{BehaviorControl, BehaviorStatus};
    use crate::testing::{Harness, TestVillager};

    const TILE: BlockPos = BlockPos::new(1, 4, 0);

    fn harness(mob: TestVillager) -> Harness<TestVillager> {
        let mut h = Harness::new(mob, &[LOOK_TARGET.id(), WALK_TARGET.id(), SECONDARY_JOB_SITE.id()]);
        h.memories.set(SECONDARY_JOB_SITE, vec![TILE.below()]);
        h.level.put(TILE.below(), Block::Farmland);
        h
    }

    fn mature_wheat() -> Block {
        Block::Crop {
            kind: CropKind::Wheat,
            age: CropKind::Wheat.max_age(),
        }
    }

    #[test]
    fn harvests_once_then_replants() {
        let mut mob = TestVillager::farmer();
        mob.inventory.add_item(ItemStack::new(Item::WheatSeeds, 3));
        let mut h = harness(mob);
        h.level.put(TILE, mature_wheat());
        let mut b = HarvestFarmland::create(&HarvestConfig::default());
        assert!(b.try_start(&mut h.ctx(1)));
        assert_eq!(b.task().target(), Some(TILE));
        assert!(h.memories.has_value(WALK_TARGET));

        b.tick_or_stop(&mut h.ctx(2));
        assert_eq!(h.level.destroyed, vec![(TILE, mature_wheat())]);
        assert!(!h.level.drops.is_empty());
        assert_eq!(h.level.block(TILE), Block::Air);
        // nothing planted in the harvesting tick
        assert_eq!(h.mob.inventory.count_item(Item::WheatSeeds), 3);

        b.tick_or_stop(&mut h.ctx(3));
        assert_eq!(h.level.destroyed.len(), 1);
        assert_eq!(h.level.block(TILE), Block::planted(CropKind::Wheat));
        assert_eq!(h.mob.inventory.count_item(Item::WheatSeeds), 2);
        assert!(h.level.has_sound(Sound::CropPlanted));

        // the young crop is left alone and there is no other tile
        b.tick_or_stop(&mut h.ctx(4));
        assert_eq!(b.task().target(), None);
        b.tick_or_stop(&mut h.ctx(5));
        assert_eq!(b.status(), BehaviorStatus::Stopped);
        assert!(!h.memories.has_value(WALK_TARGET));
    }

    #[test]
    fn plants_by_seed_priority() {
        let mut mob = TestVillager::farmer();
        mob.inventory.add_item(ItemStack::new(Item::Carrot, 5));
        mob.inventory.add_item(ItemStack::new(Item::ModdedSeeds(3), 5));
        mob.inventory.add_item(ItemStack::new(Item::Potato, 5));
        assert_eq!(pick_seed(&mob), Some(Item::Potato));

        let mut h = harness(mob);
        let mut b = HarvestFarmland::create(&HarvestConfig::default());
        assert!(b.try_start(&mut h.ctx(1)));
        b.tick_or_stop(&mut h.ctx(2));
        assert_eq!(h.level.block(TILE), Block::planted(CropKind::Potatoes));
        assert_eq!(h.mob.inventory.count_item(Item::Potato), 4);
    }

    #[test]
    fn falls_back_to_pack_seeds() {
        let mut mob = TestVillager::farmer();
        mob.inventory.add_item(ItemStack::new(Item::Bread, 5));
        assert_eq!(pick_seed(&mob), None);
        mob.inventory.add_item(ItemStack::new(Item::ModdedSeeds(3), 1));
        assert_eq!(pick_seed(&mob), Some(Item::ModdedSeeds(3)));
    }

    #[test]
    fn only_farmers_with_griefing_and_work() {
        let mut h = harness(TestVillager::default());
        let mut b = HarvestFarmland::create(&HarvestConfig::default());
        assert!(!b.try_start(&mut h.ctx(1)));

        let mut h = harness(TestVillager::farmer());
        h.level.mob_griefing = false;
        assert!(!b.try_start(&mut h.ctx(1)));

        let mut h = harness(TestVillager::farmer());
        h.level.put(TILE, Block::planted(CropKind::Wheat));
        assert!(!b.try_start(&mut h.ctx(1)));
    }

    #[test]
    fn waits_out_the_cooldown_after_stopping() {
        let mut h = harness(TestVillager::farmer());
        h.level.put(TILE, mature_wheat());
        let mut b = HarvestFarmland::create(&HarvestConfig::default());
        assert!(b.try_start(&mut h.ctx(1)));
        b.do_stop(&mut h.ctx(2));

        let next = b.task().next_ok_start_time;
        assert!((22..=42).contains(&next), "next start {next}");
        assert!(!b.try_start(&mut h.ctx(next - 1)));
        assert!(b.try_start(&mut h.ctx(next)));
    }

    #[test]
    fn fixed_cooldown_is_exact() {
        let mut h = harness(TestVillager::farmer());
        h.level.put(TILE, mature_wheat());
        let config = HarvestConfig {
            cooldown: TickRange::fixed(20),
            ..HarvestConfig::default()
        };
        let mut b = HarvestFarmland::create(&config);
        assert!(b.try_start(&mut h.ctx(100)));
        b.do_stop(&mut h.ctx(100));

        assert!(!b.try_start(&mut h.ctx(119)));
        assert!(b.try_start(&mut h.ctx(120)));
    }

    #[test]
    fn works_only_within_reach() {
        let mut h = harness(TestVillager::farmer());
        h.level.put(TILE, mature_wheat());
        let mut b = HarvestFarmland::create(&HarvestConfig::default());
        assert!(b.try_start(&mut h.ctx(1)));
        h.mob.base.position = Vec3::new(-1.5, 4.0, 0.5);
        b.tick_or_stop(&mut h.ctx(2));
        assert!(h.level.destroyed.is_empty());
        assert_eq!(b.status(), BehaviorStatus::Running);
    }
}
