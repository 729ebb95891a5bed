//! AI tick system: runs every villager brain against the shared world.

use bevy_ecs::prelude::*;
use rand::rngs::StdRng;
use tracing::debug;

use mc_rs_ai::level::{EntityKind, EntitySnapshot};
use mc_rs_ai::mob::{Mob, VillagerMob};
use mc_rs_world::physics::VILLAGER_WIDTH;

use crate::components::{Dead, Villager, VillagerBrain};
use crate::game_world::{
    apply_damage, AiRandom, DayTime, GameEvent, GameRules, OutgoingEvents, TickCounter, WorldBlocks, WorldRandom,
};

use super::level::{GameLevel, LevelEffects};

fn snapshot(villager: &Villager) -> EntitySnapshot {
    EntitySnapshot {
        id: villager.id,
        kind: EntityKind::Villager,
        position: villager.position,
        width: VILLAGER_WIDTH,
        eye_height: villager.eye_position().y - villager.position.y,
        profession: Some(villager.profession),
        wants_more_food: villager.wants_more_food(),
        sleeping: villager.is_sleeping(),
    }
}

/// Run `f` with a [`GameLevel`] over the world's blocks and a snapshot of
/// the living villagers. `f` also gets the AI random source. The level's
/// side effects are applied to the world afterwards.
pub(crate) fn with_level<R>(
    world: &mut World,
    f: impl FnOnce(&mut World, &mut GameLevel<'_>, &mut StdRng) -> R,
) -> Option<R> {
    let snapshots: Vec<EntitySnapshot> = world
        .query_filtered::<&Villager, Without<Dead>>()
        .iter(world)
        .map(snapshot)
        .collect();
    let day_time = world.resource::<DayTime>().0;
    let mob_griefing = world.resource::<GameRules>().mob_griefing;

    let mut blocks = world.remove_resource::<WorldBlocks>()?;
    let (Some(mut ai_random), Some(mut world_random)) =
        (world.remove_resource::<AiRandom>(), world.remove_resource::<WorldRandom>())
    else {
        world.insert_resource(blocks);
        return None;
    };

    let mut effects = LevelEffects::default();
    let result = {
        let mut level = GameLevel::new(
            &mut blocks.0,
            &snapshots,
            day_time,
            mob_griefing,
            &mut world_random.0,
            &mut effects,
        );
        f(world, &mut level, &mut ai_random.0)
    };

    world.insert_resource(blocks);
    world.insert_resource(ai_random);
    world.insert_resource(world_random);
    apply_effects(world, effects);
    Some(result)
}

fn apply_effects(world: &mut World, effects: LevelEffects) {
    let LevelEffects {
        events,
        spawned_items,
        hits,
    } = effects;
    world.resource_mut::<OutgoingEvents>().events.extend(events);
    for item in spawned_items {
        world.spawn(item);
    }
    for hit in hits {
        apply_damage(world, hit.target, hit.attacker, hit.amount);
    }
}

/// Tick the brain of every living villager.
pub fn system_ai_tick(world: &mut World) {
    let game_time = world.resource::<TickCounter>().0;

    let changes = with_level(world, |world, level, random| {
        let mut changes = Vec::new();
        let mut query = world.query_filtered::<(&mut Villager, &mut VillagerBrain), Without<Dead>>();
        for (mut villager, mut brain) in query.iter_mut(world) {
            let before = brain.0.activities().active();
            brain.0.tick(&mut *level, &mut *villager, &mut *random, game_time);
            let after = brain.0.activities().active();
            if before != after {
                debug!(villager = villager.id, from = ?before, to = ?after, "activity changed");
                changes.push(GameEvent::ActivityChanged {
                    villager: villager.id,
                    from: before,
                    to: after,
                });
            }
        }
        changes
    });

    if let Some(changes) = changes {
        world.resource_mut::<OutgoingEvents>().events.extend(changes);
    }
}

/// Stop every running behavior of the dead villagers before they are
/// despawned, so beds and other claimed state are released.
pub fn system_stop_dead_brains(world: &mut World) {
    let game_time = world.resource::<TickCounter>().0;
    with_level(world, |world, level, random| {
        let mut query = world.query_filtered::<(&mut Villager, &mut VillagerBrain), With<Dead>>();
        for (mut villager, mut brain) in query.iter_mut(world) {
            brain.0.stop_all(&mut *level, &mut *villager, &mut *random, game_time);
        }
    });
}
