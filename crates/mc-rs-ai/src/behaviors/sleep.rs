//! Daily routine: following the schedule and sleeping in bed.

use mc_rs_world::block::Block;
use mc_rs_world::pos::BlockPos;
use tracing::debug;

use crate::activity::Activity;
use crate::behavior::{Behavior, BehaviorContext, Task};
use crate::memory::keys::{HOME, LAST_SLEPT, LAST_WOKEN};
use crate::memory::{MemoryId, MemoryStatus};
use crate::mob::VillagerMob;

// ---------------------------------------------------------------------------
// UpdateActivityFromSchedule
// ---------------------------------------------------------------------------

/// Ask the brain to follow its schedule.
#[derive(Debug)]
pub struct UpdateActivityFromSchedule;

impl UpdateActivityFromSchedule {
    pub fn create() -> Behavior<Self> {
        Behavior::new([], Self)
    }
}

impl<E> Task<E> for UpdateActivityFromSchedule {
    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        ctx.activities.request_schedule();
    }
}

// ---------------------------------------------------------------------------
// SleepInBed
// ---------------------------------------------------------------------------

/// No sleeping this soon after waking up.
const MIN_AWAKE_TICKS: u64 = 100;

/// Pause before lying down again after being woken.
const RETRY_DELAY: u64 = 40;

#[derive(Debug, Default)]
pub struct SleepInBed {
    next_ok_start_time: u64,
}

impl SleepInBed {
    pub fn create() -> Behavior<Self> {
        Behavior::new([(HOME.id(), MemoryStatus::ValuePresent)], Self::default())
    }
}

fn set_occupied<E>(ctx: &mut BehaviorContext<'_, E>, bed: BlockPos, occupied: bool) {
    if ctx.level.block(bed).is_bed() {
        ctx.level.set_block(bed, Block::Bed { occupied });
    }
}

impl<E: VillagerMob> Task<E> for SleepInBed {
    fn check_extra_start_conditions(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        if let Some(woken) = ctx.brain.get(LAST_WOKEN) {
            let awake = ctx.game_time.saturating_sub(*woken);
            if awake > 0 && awake < MIN_AWAKE_TICKS {
                return false;
            }
        }
        let Some(home) = ctx.brain.get(HOME).copied() else {
            return false;
        };
        home.closer_to_center_than(ctx.mob.position(), 2.0)
            && matches!(ctx.level.block(home), Block::Bed { occupied: false })
    }

    fn can_still_use(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        let Some(home) = ctx.brain.get(HOME).copied() else {
            return false;
        };
        ctx.activities.is_active(Activity::Rest)
            && ctx.mob.position().y > f64::from(home.y) + 0.4
            && home.closer_to_center_than(ctx.mob.position(), 1.14)
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        if ctx.game_time <= self.next_ok_start_time {
            return;
        }
        let Some(home) = ctx.brain.get(HOME).copied() else {
            return;
        };
        ctx.mob.start_sleeping(home);
        set_occupied(ctx, home, true);
        ctx.brain.set(LAST_SLEPT, ctx.game_time);
        debug!(mob = ctx.mob.id(), bed = %home, "villager went to bed");
    }

    fn stop(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        if !ctx.mob.is_sleeping() {
            return;
        }
        ctx.mob.stop_sleeping();
        if let Some(home) = ctx.brain.get(HOME).copied() {
            set_occupied(ctx, home, false);
        }
        ctx.brain.set(LAST_WOKEN, ctx.game_time);
        self.next_ok_start_time = ctx.game_time + RETRY_DELAY;
    }

    fn timed_out(&self, _game_time: u64, _end_timestamp: u64) -> bool {
        false
    }

    fn used_memories(&self) -> Vec<MemoryId> {
        vec![LAST_WOKEN.id(), LAST_SLEPT.id()]
    }
}
