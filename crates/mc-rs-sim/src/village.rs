//! Builds the simulated world: a flat map with one farm village on it.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use mc_rs_ai::mob::Profession;
use mc_rs_ai::BrainError;
use mc_rs_game::game_world::{GameWorld, VillagerSpawn};
use mc_rs_world::flat_generator::{build_farm_village, generate_flat_world, SURFACE_Y};
use mc_rs_world::item::{Item, ItemStack};
use mc_rs_world::pos::{BlockPos, Vec3};

use crate::config::SimConfig;

/// Seeds each farmer starts with.
const STARTING_SEEDS: u32 = 8;

/// Bread handed to every villager, enough to trade a little.
const STARTING_BREAD: u32 = 3;

pub fn build_world(config: &SimConfig) -> Result<GameWorld, BrainError> {
    let sim = &config.simulation;
    let mut blocks = generate_flat_world(config.world.radius);
    let mut rng = StdRng::seed_from_u64(config.world.seed);
    let origin = BlockPos::new(0, SURFACE_Y, 0);
    let village = build_farm_village(
        &mut blocks,
        origin,
        config.world.farm_size,
        sim.farmers,
        sim.villagers,
        &mut rng,
    );
    info!(
        beds = village.beds.len(),
        farms = village.composters.len(),
        farmland = village.farmland.len(),
        "village built"
    );

    let mut world = GameWorld::new(blocks, config.world.seed, config.ai.clone());
    for (i, bed) in village.beds.iter().enumerate() {
        let farmer = i < sim.farmers;
        let mut inventory = vec![ItemStack::new(Item::Bread, STARTING_BREAD)];
        if farmer {
            inventory.push(ItemStack::new(Item::WheatSeeds, STARTING_SEEDS));
        }
        let profession = if farmer {
            Profession::Farmer
        } else if i % 3 == 2 {
            Profession::Nitwit
        } else {
            Profession::None
        };
        // start in a ring around the bell
        let angle = i as f64 * std::f64::consts::TAU / village.beds.len() as f64;
        let position = Vec3::new(2.0 * angle.cos() + 0.5, f64::from(SURFACE_Y + 1), 2.0 * angle.sin() + 0.5);

        world.spawn_villager(VillagerSpawn {
            position,
            profession,
            home: Some(*bed),
            job_site: if farmer { village.composters.get(i).copied() } else { None },
            meeting_point: Some(village.bell),
            inventory,
        })?;
    }
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimConfig {
        SimConfig::parse(
            r#"
            [world]
            seed = 3
            radius = 2

            [simulation]
            villagers = 3
            farmers = 1

            [logging]
            level = "info"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn spawns_every_villager_with_a_home() {
        let mut world = build_world(&config()).unwrap();
        let ids = world.villagers();
        assert_eq!(ids.len(), 3);
        let farmers = ids
            .iter()
            .filter(|id| world.with_villager(**id, |v, _| v.profession) == Some(Profession::Farmer))
            .count();
        assert_eq!(farmers, 1);
    }

    #[test]
    fn farmer_owns_seeds() {
        let mut world = build_world(&config()).unwrap();
        let seeds: u32 = world
            .villagers()
            .into_iter()
            .filter_map(|id| world.villager_inventory(id))
            .map(|inv| inv.count_item(Item::WheatSeeds))
            .sum();
        assert_eq!(seeds, STARTING_SEEDS);
    }
}
