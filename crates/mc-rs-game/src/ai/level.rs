//! World access handed to villager brains during the AI tick.
//!
//! Block changes are applied to the store immediately so later villagers in
//! the same tick see them. Everything that touches other ECS entities
//! (spawned items, damage) is collected in [`LevelEffects`] and applied by
//! the system once all brains have run.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::trace;

use mc_rs_ai::level::{EntityId, EntitySnapshot, Level, Sound};
use mc_rs_world::block::Block;
use mc_rs_world::item::ItemStack;
use mc_rs_world::pos::{BlockPos, Vec3};
use mc_rs_world::storage::BlockStore;

use crate::components::{DroppedItem, DROP_PICKUP_DELAY, THROWN_PICKUP_DELAY};
use crate::game_world::GameEvent;

/// Speed of a thrown item.
const THROW_SPEED: f64 = 0.3;

/// Damage dealt during the AI tick, applied afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub target: EntityId,
    pub attacker: EntityId,
    pub amount: f32,
}

/// Deferred side effects of one AI tick.
#[derive(Debug, Default)]
pub struct LevelEffects {
    pub events: Vec<GameEvent>,
    pub spawned_items: Vec<DroppedItem>,
    pub hits: Vec<Hit>,
}

/// [`Level`] over the world's block store and a snapshot of its entities.
pub struct GameLevel<'a> {
    blocks: &'a mut BlockStore,
    entities: &'a [EntitySnapshot],
    day_time: u64,
    mob_griefing: bool,
    random: &'a mut StdRng,
    effects: &'a mut LevelEffects,
}

impl<'a> GameLevel<'a> {
    pub fn new(
        blocks: &'a mut BlockStore,
        entities: &'a [EntitySnapshot],
        day_time: u64,
        mob_griefing: bool,
        random: &'a mut StdRng,
        effects: &'a mut LevelEffects,
    ) -> Self {
        Self {
            blocks,
            entities,
            day_time,
            mob_griefing,
            random,
            effects,
        }
    }

    fn spawn_drop(&mut self, pos: BlockPos, stack: ItemStack) {
        let position = pos.center();
        let motion = Vec3::new(
            self.random.gen_range(-0.05..0.05),
            0.2,
            self.random.gen_range(-0.05..0.05),
        );
        self.effects
            .events
            .push(GameEvent::ItemDropped { position, stack });
        self.effects
            .spawned_items
            .push(DroppedItem::new(stack, position, motion, DROP_PICKUP_DELAY));
    }
}

impl Level for GameLevel<'_> {
    fn block(&self, pos: BlockPos) -> Block {
        self.blocks.get_block(pos)
    }

    fn set_block(&mut self, pos: BlockPos, block: Block) -> bool {
        if self.blocks.set_block(pos, block).is_none() {
            return false;
        }
        self.effects.events.push(GameEvent::BlockChanged { pos, block });
        true
    }

    fn destroy_block(&mut self, pos: BlockPos, drop_items: bool, by: Option<EntityId>) -> bool {
        let block = self.blocks.get_block(pos);
        if block.is_air() || !self.set_block(pos, Block::Air) {
            return false;
        }
        trace!(%pos, ?block, ?by, "block destroyed");
        if drop_items {
            for stack in block.drops(self.random) {
                self.spawn_drop(pos, stack);
            }
        }
        true
    }

    fn is_loaded(&self, pos: BlockPos) -> bool {
        self.blocks.is_loaded(pos)
    }

    fn day_time(&self) -> u64 {
        self.day_time
    }

    fn play_sound(&mut self, position: Vec3, sound: Sound) {
        self.effects.events.push(GameEvent::SoundPlayed { position, sound });
    }

    fn throw_item(&mut self, from: Vec3, stack: ItemStack, toward: Vec3) {
        let motion = (toward - from).normalize().scale(THROW_SPEED);
        self.effects
            .events
            .push(GameEvent::ItemDropped { position: from, stack });
        self.effects
            .spawned_items
            .push(DroppedItem::new(stack, from, motion, THROWN_PICKUP_DELAY));
    }

    fn nearby_entities(&self, center: Vec3, radius: f64) -> Vec<EntitySnapshot> {
        let radius_sqr = radius * radius;
        self.entities
            .iter()
            .filter(|e| e.position.distance_to_sqr(center) <= radius_sqr)
            .cloned()
            .collect()
    }

    fn entity(&self, id: EntityId) -> Option<EntitySnapshot> {
        self.entities.iter().find(|e| e.id == id).cloned()
    }

    fn hurt(&mut self, target: EntityId, attacker: EntityId, amount: f32) -> bool {
        if self.entity(target).is_none() {
            return false;
        }
        self.effects.hits.push(Hit {
            target,
            attacker,
            amount,
        });
        true
    }

    fn mob_griefing(&self) -> bool {
        self.mob_griefing
    }
}
