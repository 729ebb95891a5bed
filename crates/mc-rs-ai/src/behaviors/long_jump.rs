//! Ballistic long jumps to nearby blocks that cannot be walked to.
//!
//! [`LongJumpToRandomPos`] picks a landing block, solves a launch velocity
//! over a few fixed angles, winds up and launches. [`LongJumpMidJump`]
//! watches the flight and handles the landing.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use mc_rs_world::block::Block;
use mc_rs_world::physics::{EntityDimensions, GRAVITY};
use mc_rs_world::pos::{BlockPos, Vec3};

use crate::behavior::{Behavior, BehaviorContext, Task};
use crate::config::LongJumpConfig;
use crate::level::{Level, PositionTracker, Sound};
use crate::memory::keys::{LONG_JUMP_COOLDOWN, LONG_JUMP_MID_JUMP, LOOK_TARGET};
use crate::memory::{MemoryId, MemoryStatus};
use crate::mob::Mob;
use crate::navigation::path_type_at;
use crate::weighted::{self, TickRange};

/// Launch angles in degrees, tried in random order.
pub const ALLOWED_ANGLES: [u32; 4] = [65, 70, 75, 80];

/// Targets a walk of this many blocks can reach are not worth a jump.
const MIN_PATHFIND_DISTANCE: i32 = 8;

// ---------------------------------------------------------------------------
// Trajectory solver
// ---------------------------------------------------------------------------

/// Launch speed that lands `horizontal` blocks away and `dy` blocks higher
/// when thrown at `angle` radians under [`GRAVITY`]. `None` when no real
/// speed exists.
pub fn solve_launch_speed(horizontal: f64, dy: f64, angle: f64) -> Option<f64> {
    if horizontal <= 0.0 {
        return None;
    }
    let denominator = horizontal * (2.0 * angle).sin() - 2.0 * dy * angle.cos().powi(2);
    if denominator <= 0.0 {
        return None;
    }
    Some((horizontal * horizontal * GRAVITY / denominator).sqrt())
}

/// Whether a box of `dims` can move in a straight line from `from` to `to`,
/// sampled at 0.9 of its smallest dimension.
fn is_clear_transition(level: &dyn Level, dims: EntityDimensions, from: Vec3, to: Vec3) -> bool {
    let delta = to - from;
    let step = dims.width.min(dims.height);
    let samples = (delta.length() / step).ceil() as usize;
    let direction = delta.normalize();
    let mut at = from;
    for i in 0..samples {
        at = if i + 1 == samples {
            to
        } else {
            at + direction.scale(step * 0.9)
        };
        if !level.no_collision(&dims.make_bounding_box(at)) {
            return false;
        }
    }
    true
}

/// Velocity that carries a box of `dims` from `from` to just short of
/// `target` at `angle_deg`, or `None` if it needs more than `max_velocity`
/// or the arc hits a block.
pub fn jump_vector_for_angle(
    level: &dyn Level,
    dims: EntityDimensions,
    from: Vec3,
    target: Vec3,
    angle_deg: u32,
    max_velocity: f64,
) -> Option<Vec3> {
    // aim for the near edge of the landing block
    let short = Vec3::new(target.x - from.x, 0.0, target.z - from.z)
        .normalize()
        .scale(0.5);
    let delta = target - short - from;
    let horizontal = delta.horizontal_distance_sqr().sqrt();
    let angle = f64::from(angle_deg).to_radians();
    let speed = solve_launch_speed(horizontal, delta.y, angle)?;
    if speed > max_velocity {
        return None;
    }

    let (sin_a, cos_a) = angle.sin_cos();
    let (sin_h, cos_h) = delta.z.atan2(delta.x).sin_cos();
    let forward = speed * cos_a;
    let steps = (horizontal / forward).ceil() as usize * 2;
    let mut travelled = 0.0;
    let mut previous: Option<Vec3> = None;
    for _ in 0..steps.saturating_sub(1) {
        travelled += horizontal / steps as f64;
        let height = sin_a / cos_a * travelled
            - travelled * travelled * GRAVITY / (2.0 * speed * speed * cos_a * cos_a);
        let point = Vec3::new(from.x + travelled * cos_h, from.y + height, from.z + travelled * sin_h);
        if let Some(previous) = previous {
            if !is_clear_transition(level, dims, previous, point) {
                return None;
            }
        }
        previous = Some(point);
    }
    Some(Vec3::new(forward * cos_h, speed * sin_a, forward * sin_h).scale(0.95))
}

/// First workable launch velocity over [`ALLOWED_ANGLES`] in shuffled order.
pub fn optimal_jump_vector(
    level: &dyn Level,
    dims: EntityDimensions,
    from: Vec3,
    target: Vec3,
    max_velocity: f64,
    rng: &mut impl Rng,
) -> Option<Vec3> {
    let mut angles = ALLOWED_ANGLES;
    angles.shuffle(rng);
    angles
        .into_iter()
        .find_map(|angle| jump_vector_for_angle(level, dims, from, target, angle, max_velocity))
}

// ---------------------------------------------------------------------------
// LongJumpToRandomPos
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct LongJumpToRandomPos {
    max_width: i32,
    max_height: i32,
    max_velocity: f64,
    cooldown: TickRange,
    find_tries_per_run: u32,
    prepare_ticks: u64,
    candidates: Vec<(BlockPos, u64)>,
    initial_position: Option<Vec3>,
    chosen_jump: Option<Vec3>,
    find_tries: u32,
    prepare_jump_start: u64,
}

impl LongJumpToRandomPos {
    pub fn create(config: &LongJumpConfig) -> Behavior<Self> {
        Behavior::new(
            [
                (LONG_JUMP_COOLDOWN.id(), MemoryStatus::Registered),
                (LONG_JUMP_MID_JUMP.id(), MemoryStatus::Registered),
            ],
            Self {
                max_width: config.max_width,
                max_height: config.max_height,
                max_velocity: config.max_velocity,
                cooldown: config.cooldown,
                find_tries_per_run: config.find_tries,
                prepare_ticks: config.prepare_ticks,
                candidates: Vec::new(),
                initial_position: None,
                chosen_jump: None,
                find_tries: 0,
                prepare_jump_start: 0,
            },
        )
        .with_duration(config.timeout, config.timeout)
    }

    /// Velocity picked for the pending jump, if any.
    pub fn chosen_jump(&self) -> Option<Vec3> {
        self.chosen_jump
    }

    fn is_acceptable_landing<E: Mob>(ctx: &mut BehaviorContext<'_, E>, pos: BlockPos) -> bool {
        let own = ctx.mob.block_position();
        if own.x == pos.x && own.z == pos.z {
            return false;
        }
        if !ctx.mob.navigation().is_stable_destination(&*ctx.level, pos) {
            return false;
        }
        ctx.mob.pathfinding_malus(path_type_at(&*ctx.level, pos)) == 0.0
    }

    /// Draw one candidate and keep it if it is a jump worth making.
    fn pick_candidate<E: Mob>(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        let Some(index) = weighted::random_index(&self.candidates, |(_, w)| *w, ctx.random) else {
            return;
        };
        let (pos, _) = self.candidates.swap_remove(index);
        if !Self::is_acceptable_landing(ctx, pos) {
            return;
        }
        let Some(velocity) = optimal_jump_vector(
            &*ctx.level,
            ctx.mob.dimensions(),
            ctx.mob.position(),
            pos.center(),
            self.max_velocity,
            ctx.random,
        ) else {
            return;
        };
        ctx.brain.set(LOOK_TARGET, PositionTracker::Block(pos));
        let from = ctx.mob.block_position();
        let path = ctx
            .mob
            .navigation()
            .create_path(&*ctx.level, from, pos, 0, MIN_PATHFIND_DISTANCE);
        if path.is_some_and(|p| p.can_reach()) {
            return;
        }
        debug!(mob = ctx.mob.id(), target = %pos, "long jump chosen");
        self.chosen_jump = Some(velocity);
        self.prepare_jump_start = ctx.game_time;
    }
}

impl<E: Mob> Task<E> for LongJumpToRandomPos {
    fn check_extra_start_conditions(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        let pos = ctx.mob.block_position();
        ctx.mob.on_ground()
            && ctx.level.block(pos) != Block::HoneyBlock
            && ctx.level.block(pos.below()) != Block::HoneyBlock
    }

    fn can_still_use(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        let mid_jump = ctx.brain.has_value(LONG_JUMP_MID_JUMP);
        let keep_going = self.initial_position == Some(ctx.mob.position())
            && self.find_tries > 0
            && !ctx.mob.in_water()
            && !mid_jump
            && (self.chosen_jump.is_some() || !self.candidates.is_empty());
        if !keep_going && !mid_jump {
            let ticks = self.cooldown.sample(ctx.random) / 2;
            ctx.brain.set_with_expiry(LONG_JUMP_COOLDOWN, (), ticks);
            ctx.brain.erase(LOOK_TARGET);
        }
        keep_going
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        self.chosen_jump = None;
        self.find_tries = self.find_tries_per_run;
        self.initial_position = Some(ctx.mob.position());
        let origin = ctx.mob.block_position();
        let extent = BlockPos::new(self.max_width, self.max_height, self.max_width);
        self.candidates = BlockPos::between_closed(
            origin.offset(-extent.x, -extent.y, -extent.z),
            origin.offset(extent.x, extent.y, extent.z),
        )
        .filter(|pos| *pos != origin)
        .map(|pos| (pos, origin.dist_sqr(pos).ceil() as u64))
        .collect();
    }

    fn tick(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        let Some(velocity) = self.chosen_jump else {
            self.find_tries = self.find_tries.saturating_sub(1);
            self.pick_candidate(ctx);
            return;
        };
        if ctx.game_time.saturating_sub(self.prepare_jump_start) < self.prepare_ticks {
            return;
        }
        let length = velocity.length();
        let boosted = length + ctx.mob.jump_boost_power();
        ctx.mob.set_discard_friction(true);
        ctx.mob.set_delta_movement(velocity.scale(boosted / length));
        ctx.brain.set(LONG_JUMP_MID_JUMP, true);
        let at = ctx.mob.position();
        ctx.level.play_sound(at, Sound::LongJump);
    }

    fn stop(&mut self, _ctx: &mut BehaviorContext<'_, E>) {
        self.candidates.clear();
        self.chosen_jump = None;
        self.initial_position = None;
    }

    fn used_memories(&self) -> Vec<MemoryId> {
        vec![LOOK_TARGET.id()]
    }
}

// ---------------------------------------------------------------------------
// LongJumpMidJump
// ---------------------------------------------------------------------------

/// Keeps friction off while airborne and lands the jump.
#[derive(Debug)]
pub struct LongJumpMidJump {
    cooldown: TickRange,
}

impl LongJumpMidJump {
    pub fn create(config: &LongJumpConfig) -> Behavior<Self> {
        Behavior::new(
            [(LONG_JUMP_MID_JUMP.id(), MemoryStatus::ValuePresent)],
            Self {
                cooldown: config.cooldown,
            },
        )
        .with_duration(config.landing_timeout, config.landing_timeout)
    }
}

impl<E: Mob> Task<E> for LongJumpMidJump {
    fn can_still_use(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        !ctx.mob.on_ground()
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        ctx.mob.set_discard_friction(true);
    }

    fn stop(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        if ctx.mob.on_ground() {
            let motion = ctx.mob.delta_movement();
            ctx.mob.set_delta_movement(motion.scale(0.1));
            let at = ctx.mob.position();
            ctx.level.play_sound(at, Sound::LongJumpLand);
        }
        ctx.mob.set_discard_friction(false);
        ctx.brain.erase(LONG_JUMP_MID_JUMP);
        let ticks = self.cooldown.sample(ctx.random);
        ctx.brain.set_with_expiry(LONG_JUMP_COOLDOWN, (), ticks);
    }

    fn used_memories(&self) -> Vec<MemoryId> {
        vec![LONG_JUMP_COOLDOWN.id()]
    }
}
