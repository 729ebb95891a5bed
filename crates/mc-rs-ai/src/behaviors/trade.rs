//! Villagers sharing food and profession items with each other.

use mc_rs_world::item::Item;
use mc_rs_world::pos::Vec3;
use tracing::trace;

use crate::behavior::{Behavior, BehaviorContext, Task};
use crate::level::{EntityKind, EntitySnapshot, PositionTracker, Sound, WalkTarget};
use crate::memory::keys::{INTERACTION_TARGET, LOOK_TARGET, NEAREST_VISIBLE_VILLAGERS, WALK_TARGET};
use crate::memory::{MemoryId, MemoryStatus};
use crate::mob::{Profession, VillagerMob};

/// Items worth food points.
const FOOD: [Item; 4] = [Item::Bread, Item::Potato, Item::Carrot, Item::Beetroot];

/// Closer than this (squared) the villagers exchange items.
const TRADE_DISTANCE_SQR: f64 = 5.0;

/// Stacks at or below this size are kept whole.
const KEEP_AT_LEAST: u32 = 24;

const APPROACH_SPEED: f64 = 0.5;

#[derive(Debug, Default)]
pub struct TradeWithVillager {
    trades: Vec<Item>,
}

impl TradeWithVillager {
    pub fn create() -> Behavior<Self> {
        Behavior::new(
            [
                (INTERACTION_TARGET.id(), MemoryStatus::ValuePresent),
                (NEAREST_VISIBLE_VILLAGERS.id(), MemoryStatus::ValuePresent),
            ],
            Self::default(),
        )
    }

    fn partner<E>(ctx: &BehaviorContext<'_, E>) -> Option<EntitySnapshot> {
        let id = *ctx.brain.get(INTERACTION_TARGET)?;
        ctx.level
            .entity(id)
            .filter(|e| e.kind == EntityKind::Villager)
    }
}

/// Items `partner` asks for that `own` does not.
fn willing_to_trade(own: Profession, partner: Profession) -> Vec<Item> {
    let mine = own.requested_items();
    partner
        .requested_items()
        .iter()
        .copied()
        .filter(|item| !mine.contains(item))
        .collect()
}

/// Look at and walk toward the partner.
fn lock_gaze_and_approach<E>(ctx: &mut BehaviorContext<'_, E>, partner: &EntitySnapshot) {
    let tracker = PositionTracker::entity(partner);
    ctx.brain.set(LOOK_TARGET, tracker.clone());
    ctx.brain.set(
        WALK_TARGET,
        WalkTarget {
            target: tracker,
            speed_modifier: APPROACH_SPEED,
            close_enough_dist: 2,
        },
    );
}

/// Throw part of the first stack of any of `items` toward `toward`.
///
/// Large stacks are halved. Smaller ones give away only what exceeds
/// [`KEEP_AT_LEAST`].
fn throw_half_stack<E: VillagerMob>(ctx: &mut BehaviorContext<'_, E>, items: &[Item], toward: Vec3) {
    let inventory = ctx.mob.inventory();
    let picked = (0..inventory.size()).find_map(|slot| {
        let stack = inventory.get(slot).filter(|s| items.contains(&s.item))?;
        let amount = if stack.count > stack.item.max_stack_size() / 2 {
            stack.count / 2
        } else if stack.count > KEEP_AT_LEAST {
            stack.count - KEEP_AT_LEAST
        } else {
            return None;
        };
        Some((slot, amount))
    });
    let Some((slot, amount)) = picked else {
        return;
    };
    if let Some(stack) = ctx.mob.inventory_mut().take_from_slot(slot, amount) {
        let from = ctx.mob.eye_position() - Vec3::new(0.0, 0.3, 0.0);
        trace!(item = ?stack.item, count = stack.count, "villager threw items");
        ctx.level.throw_item(from, stack, toward);
        ctx.level.play_sound(from, Sound::VillagerTrade);
    }
}

impl<E: VillagerMob> Task<E> for TradeWithVillager {
    fn check_extra_start_conditions(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        Self::partner(ctx).is_some()
    }

    fn can_still_use(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        Self::partner(ctx).is_some()
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        let Some(partner) = Self::partner(ctx) else {
            return;
        };
        lock_gaze_and_approach(ctx, &partner);
        self.trades = willing_to_trade(ctx.mob.profession(), partner.profession.unwrap_or_default());
    }

    fn tick(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        let Some(partner) = Self::partner(ctx) else {
            return;
        };
        if ctx.mob.position().distance_to_sqr(partner.position) > TRADE_DISTANCE_SQR {
            return;
        }
        lock_gaze_and_approach(ctx, &partner);
        let toward = partner.position;
        let partner_profession = partner.profession.unwrap_or_default();

        if ctx.mob.has_excess_food()
            && (ctx.mob.profession() == Profession::Farmer || partner.wants_more_food)
        {
            throw_half_stack(ctx, &FOOD, toward);
        }
        if partner_profession == Profession::Farmer
            && ctx.mob.inventory().count_item(Item::Wheat) > Item::Wheat.max_stack_size() / 2
        {
            throw_half_stack(ctx, &[Item::Wheat], toward);
        }
        if !self.trades.is_empty() && ctx.mob.inventory().has_any_of(&self.trades) {
            let trades = self.trades.clone();
            throw_half_stack(ctx, &trades, toward);
        }
    }

    fn stop(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        ctx.brain.erase(INTERACTION_TARGET);
        self.trades.clear();
    }

    fn used_memories(&self) -> Vec<MemoryId> {
        vec![LOOK_TARGET.id(), WALK_TARGET.id()]
    }
}
