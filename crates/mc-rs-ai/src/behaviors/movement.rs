//! Walking: path following, walk-target selection and idling.

use rand::Rng;
use tracing::trace;

use mc_rs_world::pos::BlockPos;

use crate::behavior::{Behavior, BehaviorContext, Task};
use crate::level::WalkTarget;
use crate::memory::keys::{CANT_REACH_WALK_TARGET_SINCE, PATH, WALK_TARGET};
use crate::memory::{MemoryId, MemoryKey, MemoryStatus};
use crate::mob::Mob;
use crate::navigation::Path;
use crate::random_pos;

fn reached_target<E: Mob>(ctx: &BehaviorContext<'_, E>, target: &WalkTarget) -> bool {
    target
        .target
        .block_position(&*ctx.level)
        .dist_manhattan(ctx.mob.block_position())
        <= target.close_enough_dist
}

// ---------------------------------------------------------------------------
// MoveToTargetSink: follow a path to the walk target
// ---------------------------------------------------------------------------

/// Turns the walk target into a path and follows it. Tracks how long the
/// target has been unreachable and backs off after getting stuck.
#[derive(Debug)]
pub struct MoveToTargetSink {
    path_range: i32,
    path: Option<Path>,
    last_target_pos: Option<BlockPos>,
    speed_modifier: f64,
    remaining_cooldown: u32,
}

impl MoveToTargetSink {
    pub fn create(min_duration: u64, max_duration: u64, path_range: i32) -> Behavior<Self> {
        Behavior::new(
            [
                (PATH.id(), MemoryStatus::Registered),
                (WALK_TARGET.id(), MemoryStatus::ValuePresent),
            ],
            Self {
                path_range,
                path: None,
                last_target_pos: None,
                speed_modifier: 0.0,
                remaining_cooldown: 0,
            },
        )
        .with_duration(min_duration, max_duration)
    }

    fn try_compute_path<E: Mob>(&mut self, ctx: &mut BehaviorContext<'_, E>, target: &WalkTarget) -> bool {
        let goal = target.target.block_position(&*ctx.level);
        let from = ctx.mob.block_position();
        self.path = ctx
            .mob
            .navigation()
            .create_path(&*ctx.level, from, goal, 0, self.path_range);
        self.speed_modifier = target.speed_modifier;

        if reached_target(ctx, target) {
            ctx.brain.erase(CANT_REACH_WALK_TARGET_SINCE);
            return false;
        }
        let can_reach = self.path.as_ref().is_some_and(Path::can_reach);
        if can_reach {
            ctx.brain.erase(CANT_REACH_WALK_TARGET_SINCE);
        } else if !ctx.brain.has_value(CANT_REACH_WALK_TARGET_SINCE) {
            ctx.brain.set(CANT_REACH_WALK_TARGET_SINCE, ctx.game_time);
        }
        if self.path.is_some() {
            return true;
        }

        let toward = random_pos::land_pos_towards(&*ctx.level, from, goal.bottom_center(), 10, 7, ctx.random);
        if let Some(pos) = toward {
            self.path = ctx
                .mob
                .navigation()
                .create_path(&*ctx.level, from, pos, 0, self.path_range);
        }
        self.path.is_some()
    }
}

impl<E: Mob> Task<E> for MoveToTargetSink {
    fn check_extra_start_conditions(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        if self.remaining_cooldown > 0 {
            self.remaining_cooldown -= 1;
            return false;
        }
        let Some(target) = ctx.brain.get(WALK_TARGET).cloned() else {
            return false;
        };
        let reached = reached_target(ctx, &target);
        if !reached && self.try_compute_path(ctx, &target) {
            self.last_target_pos = Some(target.target.block_position(&*ctx.level));
            return true;
        }
        ctx.brain.erase(WALK_TARGET);
        if reached {
            ctx.brain.erase(CANT_REACH_WALK_TARGET_SINCE);
        }
        false
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        if let Some(path) = self.path.clone() {
            ctx.brain.set(PATH, path.clone());
            ctx.mob.navigation().move_to(path, self.speed_modifier);
        }
    }

    fn tick(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        let current = ctx.mob.navigation().path().cloned();
        if current != self.path {
            self.path = current.clone();
            ctx.brain.set_optional(PATH, current);
        }
        let (Some(_), Some(last)) = (&self.path, self.last_target_pos) else {
            return;
        };
        let Some(target) = ctx.brain.get(WALK_TARGET).cloned() else {
            return;
        };
        let now_at = target.target.block_position(&*ctx.level);
        if now_at.dist_sqr(last) > 4.0 && self.try_compute_path(ctx, &target) {
            trace!(target = %now_at, "walk target moved, repathing");
            self.last_target_pos = Some(now_at);
            self.start(ctx);
        }
    }

    fn can_still_use(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        if self.path.is_none() || self.last_target_pos.is_none() {
            return false;
        }
        let Some(target) = ctx.brain.get(WALK_TARGET).cloned() else {
            return false;
        };
        !ctx.mob.navigation().is_done() && !reached_target(ctx, &target)
    }

    fn stop(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        let unfinished = ctx
            .brain
            .get(WALK_TARGET)
            .cloned()
            .is_some_and(|t| !reached_target(ctx, &t));
        if unfinished && ctx.mob.navigation().is_stuck() {
            self.remaining_cooldown = ctx.random.gen_range(0..40);
        }
        ctx.mob.navigation().stop();
        ctx.brain.erase(WALK_TARGET);
        ctx.brain.erase(PATH);
        self.path = None;
    }

    fn used_memories(&self) -> Vec<MemoryId> {
        vec![CANT_REACH_WALK_TARGET_SINCE.id()]
    }
}

// ---------------------------------------------------------------------------
// SetWalkTargetFromBlockMemory: walk toward a remembered block
// ---------------------------------------------------------------------------

/// Sets a walk target toward the position stored in `memory`. Gives the
/// position up after it has been unreachable for too long; targets farther
/// than `too_far` get an intermediate stop in their direction.
#[derive(Debug)]
pub struct SetWalkTargetFromBlockMemory {
    memory: MemoryKey<BlockPos>,
    speed_modifier: f64,
    close_enough_dist: i32,
    too_far_distance: i32,
    too_long_unreachable: u64,
}

impl SetWalkTargetFromBlockMemory {
    pub fn create(
        memory: MemoryKey<BlockPos>,
        speed_modifier: f64,
        close_enough_dist: i32,
        too_far_distance: i32,
        too_long_unreachable: u64,
    ) -> Behavior<Self> {
        Behavior::new(
            [
                (WALK_TARGET.id(), MemoryStatus::Registered),
                (memory.id(), MemoryStatus::ValuePresent),
            ],
            Self {
                memory,
                speed_modifier,
                close_enough_dist,
                too_far_distance,
                too_long_unreachable,
            },
        )
    }

    fn give_up<E>(&self, ctx: &mut BehaviorContext<'_, E>) {
        trace!(memory = %self.memory.id(), "giving up on unreachable position");
        ctx.brain.erase(self.memory);
        ctx.brain.set(CANT_REACH_WALK_TARGET_SINCE, ctx.game_time);
    }
}

impl<E: Mob> Task<E> for SetWalkTargetFromBlockMemory {
    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        let Some(goal) = ctx.brain.get(self.memory).copied() else {
            return;
        };
        let tired = ctx
            .brain
            .get(CANT_REACH_WALK_TARGET_SINCE)
            .is_some_and(|since| ctx.game_time.saturating_sub(*since) > self.too_long_unreachable);
        if tired {
            self.give_up(ctx);
            return;
        }

        let here = ctx.mob.block_position();
        let distance = goal.dist_manhattan(here);
        if distance > self.too_far_distance {
            let mut stop = None;
            for _ in 0..100 {
                let candidate = random_pos::land_pos_towards(&*ctx.level, here, goal.bottom_center(), 15, 7, ctx.random);
                if let Some(pos) = candidate.filter(|p| p.dist_manhattan(here) <= self.too_far_distance) {
                    stop = Some(pos);
                    break;
                }
            }
            match stop {
                Some(pos) => ctx.brain.set(
                    WALK_TARGET,
                    WalkTarget::block(pos, self.speed_modifier, self.close_enough_dist),
                ),
                None => self.give_up(ctx),
            }
        } else if distance > self.close_enough_dist {
            ctx.brain.set(
                WALK_TARGET,
                WalkTarget::block(goal, self.speed_modifier, self.close_enough_dist),
            );
        }
    }

    fn used_memories(&self) -> Vec<MemoryId> {
        vec![CANT_REACH_WALK_TARGET_SINCE.id()]
    }
}

// ---------------------------------------------------------------------------
// StrollToPoiList: wander between remembered work blocks
// ---------------------------------------------------------------------------

/// Picks one of the positions in `list` as walk target while staying near
/// the position in `must_be_close_to`.
#[derive(Debug)]
pub struct StrollToPoiList {
    list: MemoryKey<Vec<BlockPos>>,
    must_be_close_to: MemoryKey<BlockPos>,
    speed_modifier: f64,
    close_enough_dist: i32,
    max_distance: f64,
    target: Option<BlockPos>,
    next_ok_start_time: u64,
}

impl StrollToPoiList {
    pub fn create(
        list: MemoryKey<Vec<BlockPos>>,
        speed_modifier: f64,
        close_enough_dist: i32,
        max_distance: f64,
        must_be_close_to: MemoryKey<BlockPos>,
    ) -> Behavior<Self> {
        Behavior::new(
            [
                (list.id(), MemoryStatus::ValuePresent),
                (must_be_close_to.id(), MemoryStatus::ValuePresent),
            ],
            Self {
                list,
                must_be_close_to,
                speed_modifier,
                close_enough_dist,
                max_distance,
                target: None,
                next_ok_start_time: 0,
            },
        )
    }
}

impl<E: Mob> Task<E> for StrollToPoiList {
    fn check_extra_start_conditions(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        let (Some(list), Some(anchor)) = (ctx.brain.get(self.list), ctx.brain.get(self.must_be_close_to)) else {
            return false;
        };
        if list.is_empty() {
            return false;
        }
        self.target = Some(list[ctx.random.gen_range(0..list.len())]);
        anchor.closer_to_center_than(ctx.mob.position(), self.max_distance)
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        if ctx.game_time > self.next_ok_start_time {
            if let Some(pos) = self.target {
                ctx.brain.set(
                    WALK_TARGET,
                    WalkTarget::block(pos, self.speed_modifier, self.close_enough_dist),
                );
                self.next_ok_start_time = ctx.game_time + 100;
            }
        }
    }

    fn used_memories(&self) -> Vec<MemoryId> {
        vec![WALK_TARGET.id()]
    }
}

// ---------------------------------------------------------------------------
// RandomStroll: walk to a random nearby spot
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct RandomStroll {
    speed_modifier: f64,
    max_horizontal: i32,
    max_vertical: i32,
}

impl RandomStroll {
    pub fn create(speed_modifier: f64) -> Behavior<Self> {
        Self::with_range(speed_modifier, 10, 7)
    }

    pub fn with_range(speed_modifier: f64, max_horizontal: i32, max_vertical: i32) -> Behavior<Self> {
        Behavior::new(
            [(WALK_TARGET.id(), MemoryStatus::Registered)],
            Self {
                speed_modifier,
                max_horizontal,
                max_vertical,
            },
        )
    }
}

impl<E: Mob> Task<E> for RandomStroll {
    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        let origin = ctx.mob.block_position();
        let pos = random_pos::land_random_pos(
            &*ctx.level,
            origin,
            self.max_horizontal,
            self.max_vertical,
            ctx.random,
        );
        ctx.brain.set_optional(
            WALK_TARGET,
            pos.map(|p| WalkTarget::block(p, self.speed_modifier, 0)),
        );
    }
}

// ---------------------------------------------------------------------------
// DoNothing: stand still for a while
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct DoNothing;

impl DoNothing {
    pub fn create(min_duration: u64, max_duration: u64) -> Behavior<Self> {
        Behavior::new([], Self).with_duration(min_duration, max_duration)
    }
}

impl<E> Task<E> for DoNothing {
    fn can_still_use(&mut self, _ctx: &mut BehaviorContext<'_, E>) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Swim: keep the head above water
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Swim {
    chance: f64,
}

impl Swim {
    pub fn create(chance: f64) -> Behavior<Self> {
        Behavior::new([], Self { chance })
    }
}

impl<E: Mob> Task<E> for Swim {
    fn check_extra_start_conditions(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        ctx.mob.in_water()
    }

    fn tick(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        if ctx.random.gen_bool(self.chance.clamp(0.0, 1.0)) {
            ctx.mob.jump();
        }
    }

    fn can_still_use(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        ctx.mob.in_water()
    }
}
