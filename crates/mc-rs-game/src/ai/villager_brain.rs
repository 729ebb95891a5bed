//! Wiring of the villager brain: memory schema, sensors and the behaviors
//! of each activity.

use mc_rs_ai::activity::{Activity, Schedule};
use mc_rs_ai::behavior::BoxedBehavior;
use mc_rs_ai::behaviors::{
    DoNothing, FleeFromAttacker, HarvestFarmland, LongJumpMidJump, LongJumpToRandomPos, LookAtTargetSink,
    MoveToTargetSink, RandomStroll, SetLookAndInteraction, SetWalkTargetFromBlockMemory, SleepInBed,
    StrollToPoiList, Swim, TradeWithVillager, UpdateActivityFromSchedule, VillagerCalmDown, VillagerPanicTrigger,
};
use mc_rs_ai::composite::{GateBehavior, OrderPolicy, RunIf, RunSometimes, RunningPolicy};
use mc_rs_ai::config::AiConfig;
use mc_rs_ai::level::EntityKind;
use mc_rs_ai::memory::keys::*;
use mc_rs_ai::memory::{MemoryId, MemoryStatus};
use mc_rs_ai::mob::{Profession, VillagerMob};
use mc_rs_ai::sensor::{NearestVillagerSensor, SecondaryPoiSensor};
use mc_rs_ai::weighted::TickRange;
use mc_rs_ai::{Brain, BrainError};

use crate::components::Villager;

/// Range at which villagers notice each other.
const VILLAGER_SENSE_RANGE: f64 = 16.0;

/// Priority of the schedule check; runs after everything else.
const SCHEDULE_PRIORITY: u32 = 99;

fn memory_schema() -> Vec<MemoryId> {
    vec![
        WALK_TARGET.id(),
        LOOK_TARGET.id(),
        PATH.id(),
        CANT_REACH_WALK_TARGET_SINCE.id(),
        INTERACTION_TARGET.id(),
        NEAREST_VISIBLE_VILLAGERS.id(),
        HOME.id(),
        JOB_SITE.id(),
        SECONDARY_JOB_SITE.id(),
        MEETING_POINT.id(),
        LAST_WOKEN.id(),
        LAST_SLEPT.id(),
        HURT_BY.id(),
        HURT_BY_ENTITY.id(),
        LONG_JUMP_COOLDOWN.id(),
        LONG_JUMP_MID_JUMP.id(),
    ]
}

/// Build the brain every villager starts with.
pub fn create_villager_brain(config: &AiConfig) -> Result<Brain<Villager>, BrainError> {
    let mut brain = Brain::new(memory_schema());
    let scan_rate = config.brain.sensor_scan_rate;
    brain.add_sensor(Box::new(NearestVillagerSensor::new(VILLAGER_SENSE_RANGE, scan_rate)))?;
    brain.add_sensor(Box::new(SecondaryPoiSensor::new(scan_rate)))?;

    brain.add_activity(Activity::Core, core_package(config))?;
    brain.add_activity(Activity::Idle, idle_package(config))?;
    brain.add_activity_with_conditions(
        Activity::Work,
        work_package(config),
        vec![(JOB_SITE.id(), MemoryStatus::ValuePresent)],
        Vec::new(),
    )?;
    brain.add_activity_with_conditions(
        Activity::Meet,
        meet_package(config),
        vec![(MEETING_POINT.id(), MemoryStatus::ValuePresent)],
        Vec::new(),
    )?;
    brain.add_activity_with_conditions(
        Activity::Rest,
        rest_package(config),
        vec![(HOME.id(), MemoryStatus::ValuePresent)],
        Vec::new(),
    )?;
    brain.add_activity(Activity::Panic, panic_package(config))?;

    brain.set_core_activities([Activity::Core]);
    brain.set_default_activity(Activity::Idle);
    brain.set_schedule(Schedule::villager_default());
    brain
        .activities_mut()
        .set_schedule_update_interval(config.brain.schedule_update_interval);
    brain.use_default_activity();
    brain.validate()?;
    Ok(brain)
}

fn core_package(config: &AiConfig) -> Vec<(u32, BoxedBehavior<Villager>)> {
    let mut package = vec![
        (0, Swim::create(0.8).boxed()),
        (0, LookAtTargetSink::create(45, 90).boxed()),
        (0, VillagerPanicTrigger::create().boxed()),
    ];
    if config.long_jump.enabled {
        package.push((0, LongJumpMidJump::create(&config.long_jump).boxed()));
    }
    package.push((1, MoveToTargetSink::create(150, 250, config.movement.path_range).boxed()));
    package
}

/// Trade with whoever the villager is interacting with. Nitwits never trade.
fn trade_gate() -> BoxedBehavior<Villager> {
    GateBehavior::new(
        [],
        vec![INTERACTION_TARGET.id()],
        OrderPolicy::Ordered,
        RunningPolicy::RunOne,
        vec![(
            RunIf::wrap(
                |v: &Villager| v.profession() != Profession::Nitwit,
                TradeWithVillager::create(),
                true,
            )
            .boxed(),
            1,
        )],
    )
    .boxed()
}

fn interact_sometimes() -> BoxedBehavior<Villager> {
    RunSometimes::new(
        SetLookAndInteraction::create(EntityKind::Villager, 8),
        TickRange::new(30, 60),
        false,
    )
    .boxed()
}

fn idle_package(config: &AiConfig) -> Vec<(u32, BoxedBehavior<Villager>)> {
    let walk = config.movement.walk_speed;
    let mut package = Vec::new();
    if config.long_jump.enabled {
        package.push((1, LongJumpToRandomPos::create(&config.long_jump).boxed()));
    }
    package.extend([
        (
            2,
            GateBehavior::run_one(vec![
                (RandomStroll::create(walk).boxed(), 2),
                (DoNothing::create(30, 60).boxed(), 1),
            ])
            .boxed(),
        ),
        (3, trade_gate()),
        (3, interact_sometimes()),
        (SCHEDULE_PRIORITY, UpdateActivityFromSchedule::create().boxed()),
    ]);
    package
}

fn work_package(config: &AiConfig) -> Vec<(u32, BoxedBehavior<Villager>)> {
    let walk = config.movement.walk_speed;
    vec![
        (
            2,
            SetWalkTargetFromBlockMemory::create(JOB_SITE, walk, 9, 100, 1200).boxed(),
        ),
        (
            5,
            GateBehavior::run_one(vec![
                (HarvestFarmland::create(&config.harvest).boxed(), 7),
                (
                    StrollToPoiList::create(SECONDARY_JOB_SITE, walk, 1, 6.0, JOB_SITE).boxed(),
                    5,
                ),
                (DoNothing::create(30, 60).boxed(), 2),
            ])
            .boxed(),
        ),
        (SCHEDULE_PRIORITY, UpdateActivityFromSchedule::create().boxed()),
    ]
}

fn meet_package(config: &AiConfig) -> Vec<(u32, BoxedBehavior<Villager>)> {
    let walk = config.movement.walk_speed;
    vec![
        (
            2,
            SetWalkTargetFromBlockMemory::create(MEETING_POINT, walk, 6, 100, 200).boxed(),
        ),
        (5, interact_sometimes()),
        (5, trade_gate()),
        (SCHEDULE_PRIORITY, UpdateActivityFromSchedule::create().boxed()),
    ]
}

fn rest_package(config: &AiConfig) -> Vec<(u32, BoxedBehavior<Villager>)> {
    let walk = config.movement.walk_speed;
    vec![
        (2, SetWalkTargetFromBlockMemory::create(HOME, walk, 1, 150, 1200).boxed()),
        (3, SleepInBed::create().boxed()),
        (SCHEDULE_PRIORITY, UpdateActivityFromSchedule::create().boxed()),
    ]
}

fn panic_package(config: &AiConfig) -> Vec<(u32, BoxedBehavior<Villager>)> {
    let speed = config.movement.panic_speed;
    vec![
        (0, VillagerCalmDown::create().boxed()),
        (1, FleeFromAttacker::create(speed, 6).boxed()),
        (3, RandomStroll::create(speed).boxed()),
    ]
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use mc_rs_world::block::{Block, CropKind};
    use mc_rs_world::flat_generator::generate_flat_world;
    use mc_rs_world::item::{Item, ItemStack};
    use mc_rs_world::pos::{BlockPos, Vec3};

    use super::*;
    use crate::ai::level::tests::Fixture;

    #[test]
    fn default_brain_is_valid_and_idle() {
        let brain = create_villager_brain(&AiConfig::default()).unwrap();
        assert_eq!(brain.activities().active(), Activity::Idle);
        assert!(brain.running_behaviors().is_empty());
        assert!(brain.memories().is_registered(LONG_JUMP_COOLDOWN.id()));
        assert!(!brain.memories().is_registered(ATTACK_TARGET.id()));
    }

    #[test]
    fn long_jumps_can_be_disabled() {
        let mut config = AiConfig::default();
        config.long_jump.enabled = false;
        let brain = create_villager_brain(&config).unwrap();
        assert_eq!(brain.activities().active(), Activity::Idle);
    }

    #[test]
    fn hurt_villager_panics() {
        let mut fx = Fixture::new(generate_flat_world(1));
        let mut villager = Villager::new(1, Vec3::new(0.5, 4.0, 0.5), Profession::None);
        villager.on_ground = true;
        let mut brain = create_villager_brain(&AiConfig::default()).unwrap();
        let mut random = StdRng::seed_from_u64(3);

        brain.memories_mut().set_with_expiry(HURT_BY, 99, 100);
        brain.memories_mut().set(HURT_BY_ENTITY, 99);
        brain.tick(&mut fx.level(), &mut villager, &mut random, 1);
        assert_eq!(brain.activities().active(), Activity::Panic);
    }

    #[test]
    fn farmer_harvests_at_work() {
        let mut blocks = generate_flat_world(1);
        let composter = BlockPos::new(0, 4, 2);
        blocks.set_block(composter, Block::Composter);
        let tile = BlockPos::new(1, 4, 0);
        blocks.set_block(tile.below(), Block::Farmland);
        blocks.set_block(
            tile,
            Block::Crop {
                kind: CropKind::Wheat,
                age: CropKind::Wheat.max_age(),
            },
        );
        let mut fx = Fixture::new(blocks);
        fx.day_time = 3000;

        let mut villager = Villager::new(1, Vec3::new(0.5, 4.0, 0.5), Profession::Farmer);
        villager.on_ground = true;
        villager.inventory.add_item(ItemStack::new(Item::WheatSeeds, 4));
        let mut config = AiConfig::default();
        config.long_jump.enabled = false;
        let mut brain = create_villager_brain(&config).unwrap();
        brain.memories_mut().set(JOB_SITE, composter);
        brain.activities_mut().request(Activity::Work);
        let mut random = StdRng::seed_from_u64(11);

        // the farmer stands next to the tile, so harvesting needs no walking
        for t in 1..400 {
            brain.tick(&mut fx.level(), &mut villager, &mut random, t);
            if fx.blocks.get_block(tile) == Block::planted(CropKind::Wheat) {
                break;
            }
        }
        assert_eq!(brain.activities().active(), Activity::Work);
        assert_eq!(fx.blocks.get_block(tile), Block::planted(CropKind::Wheat));
        assert!(fx
            .effects
            .spawned_items
            .iter()
            .any(|i| i.stack.item == Item::Wheat));
    }
}
