//! End-of-run summary built from the game event stream.

use std::collections::BTreeMap;

use serde::Serialize;

use mc_rs_ai::activity::Activity;
use mc_rs_ai::level::EntityId;
use mc_rs_game::game_world::GameEvent;
use mc_rs_world::block::Block;

#[derive(Debug, Default, Serialize)]
pub struct SimReport {
    pub ticks: u64,
    pub villagers_spawned: u32,
    pub villagers_alive: usize,
    pub deaths: u32,
    pub hurts: u32,
    pub blocks_broken: u32,
    pub crops_planted: u32,
    pub crops_grown: u32,
    pub items_dropped: BTreeMap<String, u32>,
    pub items_picked_up: BTreeMap<String, u32>,
    pub sounds: u32,
    /// How often each activity was entered.
    pub activity_entries: BTreeMap<Activity, u32>,
    /// Activity of every living villager at the end of the run.
    pub final_activities: BTreeMap<EntityId, Activity>,
}

impl SimReport {
    pub fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::VillagerSpawned { .. } => self.villagers_spawned += 1,
            GameEvent::VillagerMoved { .. } => {}
            GameEvent::BlockChanged { block, .. } => match block {
                Block::Air => self.blocks_broken += 1,
                Block::Crop { age: 0, .. } => self.crops_planted += 1,
                Block::Crop { .. } => self.crops_grown += 1,
                _ => {}
            },
            GameEvent::SoundPlayed { .. } => self.sounds += 1,
            GameEvent::ItemDropped { stack, .. } => {
                *self.items_dropped.entry(stack.item.identifier()).or_default() += stack.count;
            }
            GameEvent::ItemPickedUp { stack, .. } => {
                *self.items_picked_up.entry(stack.item.identifier()).or_default() += stack.count;
            }
            GameEvent::ActivityChanged { to, .. } => {
                *self.activity_entries.entry(*to).or_default() += 1;
            }
            GameEvent::VillagerHurt { .. } => self.hurts += 1,
            GameEvent::VillagerDied { .. } => self.deaths += 1,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use mc_rs_world::block::CropKind;
    use mc_rs_world::item::{Item, ItemStack};
    use mc_rs_world::pos::{BlockPos, Vec3};

    use super::*;

    #[test]
    fn counts_a_harvest() {
        let pos = BlockPos::new(1, 4, 1);
        let mut report = SimReport::default();
        for event in [
            GameEvent::BlockChanged { pos, block: Block::Air },
            GameEvent::ItemDropped {
                position: Vec3::ZERO,
                stack: ItemStack::new(Item::Wheat, 1),
            },
            GameEvent::ItemDropped {
                position: Vec3::ZERO,
                stack: ItemStack::new(Item::WheatSeeds, 2),
            },
            GameEvent::ItemPickedUp {
                villager: 1,
                stack: ItemStack::new(Item::Wheat, 1),
            },
            GameEvent::BlockChanged {
                pos,
                block: Block::planted(CropKind::Wheat),
            },
        ] {
            report.record(&event);
        }
        assert_eq!(report.blocks_broken, 1);
        assert_eq!(report.crops_planted, 1);
        assert_eq!(report.items_dropped.get("minecraft:wheat_seeds"), Some(&2));
        assert_eq!(report.items_picked_up.get("minecraft:wheat"), Some(&1));
    }

    #[test]
    fn serializes_activity_maps() {
        let mut report = SimReport::default();
        report.record(&GameEvent::ActivityChanged {
            villager: 1,
            from: Activity::Idle,
            to: Activity::Work,
        });
        report.final_activities.insert(1, Activity::Work);
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["activity_entries"]["work"], 1);
        assert_eq!(value["final_activities"]["1"], "work");
    }
}
