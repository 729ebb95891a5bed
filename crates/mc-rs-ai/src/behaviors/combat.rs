//! Melee attacks and the villager panic cycle.

use tracing::debug;

use crate::activity::Activity;
use crate::behavior::{Behavior, BehaviorContext, Task};
use crate::level::{EntitySnapshot, PositionTracker, Sound, WalkTarget};
use crate::memory::keys::{
    ATTACK_COOLING_DOWN, ATTACK_TARGET, HURT_BY, HURT_BY_ENTITY, INTERACTION_TARGET, LOOK_TARGET, PATH,
    WALK_TARGET,
};
use crate::memory::{MemoryId, MemoryStatus};
use crate::mob::Mob;
use crate::random_pos;

// ---------------------------------------------------------------------------
// MeleeAttack
// ---------------------------------------------------------------------------

/// Hit the attack target when it is in reach, then cool down.
#[derive(Debug)]
pub struct MeleeAttack {
    cooldown: u64,
}

impl MeleeAttack {
    pub fn create(cooldown_between_attacks: u64) -> Behavior<Self> {
        Behavior::new(
            [
                (ATTACK_TARGET.id(), MemoryStatus::ValuePresent),
                (ATTACK_COOLING_DOWN.id(), MemoryStatus::Registered),
            ],
            Self {
                cooldown: cooldown_between_attacks,
            },
        )
    }

    fn target<E>(ctx: &BehaviorContext<'_, E>) -> Option<EntitySnapshot> {
        let id = *ctx.brain.get(ATTACK_TARGET)?;
        ctx.level.entity(id)
    }
}

/// Squared reach of `mob` against a target of `target_width`.
fn melee_range_sqr(mob: &impl Mob, target_width: f64) -> f64 {
    let reach = mob.dimensions().width * 2.0;
    reach * reach + target_width
}

impl<E: Mob> Task<E> for MeleeAttack {
    fn check_extra_start_conditions(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        let Some(target) = Self::target(ctx) else {
            return false;
        };
        !ctx.mob.is_holding_ranged_weapon()
            && ctx
                .level
                .has_line_of_sight(ctx.mob.eye_position(), target.eye_position())
            && ctx.mob.position().distance_to_sqr(target.position) <= melee_range_sqr(&*ctx.mob, target.width)
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        let Some(target) = Self::target(ctx) else {
            return;
        };
        ctx.brain.set(LOOK_TARGET, PositionTracker::entity(&target));
        ctx.mob.look_at(target.eye_position());
        ctx.mob.swing();
        let hit = ctx.level.hurt(target.id, ctx.mob.id(), ctx.mob.attack_damage());
        if hit {
            ctx.level.play_sound(target.position, Sound::Attack);
        }
        ctx.brain.set_with_expiry(ATTACK_COOLING_DOWN, true, self.cooldown);
    }

    fn used_memories(&self) -> Vec<MemoryId> {
        vec![LOOK_TARGET.id()]
    }
}

// ---------------------------------------------------------------------------
// VillagerPanicTrigger
// ---------------------------------------------------------------------------

/// Switch to panic while recently hurt.
#[derive(Debug)]
pub struct VillagerPanicTrigger;

impl VillagerPanicTrigger {
    pub fn create() -> Behavior<Self> {
        Behavior::new([(HURT_BY.id(), MemoryStatus::ValuePresent)], Self)
    }
}

impl<E: Mob> Task<E> for VillagerPanicTrigger {
    fn can_still_use(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        ctx.brain.has_value(HURT_BY)
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        if !ctx.activities.is_active(Activity::Panic) {
            ctx.brain.erase(PATH);
            ctx.brain.erase(WALK_TARGET);
            ctx.brain.erase(LOOK_TARGET);
            ctx.brain.erase(INTERACTION_TARGET);
            debug!(mob = ctx.mob.id(), "villager panics");
        }
        ctx.activities.request(Activity::Panic);
    }

    fn used_memories(&self) -> Vec<MemoryId> {
        vec![PATH.id(), WALK_TARGET.id(), LOOK_TARGET.id(), INTERACTION_TARGET.id()]
    }
}

// ---------------------------------------------------------------------------
// VillagerCalmDown
// ---------------------------------------------------------------------------

/// Squared distance to the attacker within which a villager stays scared.
const SCARED_DISTANCE_SQR: f64 = 36.0;

/// Leave panic once no longer hurt and the attacker is far away.
#[derive(Debug)]
pub struct VillagerCalmDown;

impl VillagerCalmDown {
    pub fn create() -> Behavior<Self> {
        Behavior::new([], Self)
    }
}

impl<E: Mob> Task<E> for VillagerCalmDown {
    fn check_extra_start_conditions(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        if ctx.brain.has_value(HURT_BY) {
            return false;
        }
        let here = ctx.mob.position();
        let attacker_close = ctx
            .brain
            .get(HURT_BY_ENTITY)
            .and_then(|id| ctx.level.entity(*id))
            .is_some_and(|e| e.position.distance_to_sqr(here) <= SCARED_DISTANCE_SQR);
        !attacker_close
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        ctx.brain.erase(HURT_BY);
        ctx.brain.erase(HURT_BY_ENTITY);
        ctx.activities.request_schedule();
    }

    fn used_memories(&self) -> Vec<MemoryId> {
        vec![HURT_BY.id(), HURT_BY_ENTITY.id()]
    }
}

// ---------------------------------------------------------------------------
// FleeFromAttacker
// ---------------------------------------------------------------------------

/// Pick a walk target away from whoever last hurt the agent.
#[derive(Debug)]
pub struct FleeFromAttacker {
    speed_modifier: f64,
    desired_distance: f64,
}

impl FleeFromAttacker {
    pub fn create(speed_modifier: f64, desired_distance: i32) -> Behavior<Self> {
        Behavior::new(
            [(HURT_BY_ENTITY.id(), MemoryStatus::ValuePresent)],
            Self {
                speed_modifier,
                desired_distance: f64::from(desired_distance),
            },
        )
    }

    fn attacker<E>(ctx: &BehaviorContext<'_, E>) -> Option<EntitySnapshot> {
        let id = *ctx.brain.get(HURT_BY_ENTITY)?;
        ctx.level.entity(id)
    }
}

impl<E: Mob> Task<E> for FleeFromAttacker {
    fn check_extra_start_conditions(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        Self::attacker(ctx)
            .is_some_and(|a| a.position.distance_to(ctx.mob.position()) < self.desired_distance)
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        let Some(attacker) = Self::attacker(ctx) else {
            return;
        };
        let from = ctx.mob.block_position();
        let away = (0..10).find_map(|_| {
            random_pos::land_pos_away(&*ctx.level, from, attacker.position, 16, 7, ctx.random)
        });
        if let Some(pos) = away {
            ctx.brain
                .set(WALK_TARGET, WalkTarget::block(pos, self.speed_modifier, 0));
        }
    }

    fn used_memories(&self) -> Vec<MemoryId> {
        vec![WALK_TARGET.id()]
    }
}
