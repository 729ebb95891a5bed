//! Concrete villager behaviors.

mod combat;
mod harvest;
mod long_jump;
mod look;
mod movement;
mod sleep;
mod trade;

pub use combat::{FleeFromAttacker, MeleeAttack, VillagerCalmDown, VillagerPanicTrigger};
pub use harvest::HarvestFarmland;
pub use long_jump::{
    jump_vector_for_angle, optimal_jump_vector, solve_launch_speed, LongJumpMidJump, LongJumpToRandomPos,
    ALLOWED_ANGLES,
};
pub use look::{LookAtTargetSink, SetLookAndInteraction};
pub use movement::{DoNothing, MoveToTargetSink, RandomStroll, SetWalkTargetFromBlockMemory, StrollToPoiList, Swim};
pub use sleep::{SleepInBed, UpdateActivityFromSchedule};
pub use trade::TradeWithVillager;
