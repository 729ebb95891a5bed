//! Items, stacks and the small inventories carried by villagers.

use serde::{Deserialize, Serialize};

use crate::block::CropKind;

/// Item kinds known to the farm simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Item {
    Wheat,
    WheatSeeds,
    Potato,
    Carrot,
    Beetroot,
    BeetrootSeeds,
    Bread,
    BoneMeal,
    Emerald,
    Bow,
    Crossbow,
    /// Seeds of a pack-registered crop.
    ModdedSeeds(u16),
}

impl Item {
    /// Bedrock-style identifier, e.g. `"minecraft:wheat_seeds"`.
    pub fn identifier(self) -> String {
        match self {
            Item::Wheat => "minecraft:wheat".into(),
            Item::WheatSeeds => "minecraft:wheat_seeds".into(),
            Item::Potato => "minecraft:potato".into(),
            Item::Carrot => "minecraft:carrot".into(),
            Item::Beetroot => "minecraft:beetroot".into(),
            Item::BeetrootSeeds => "minecraft:beetroot_seeds".into(),
            Item::Bread => "minecraft:bread".into(),
            Item::BoneMeal => "minecraft:bone_meal".into(),
            Item::Emerald => "minecraft:emerald".into(),
            Item::Bow => "minecraft:bow".into(),
            Item::Crossbow => "minecraft:crossbow".into(),
            Item::ModdedSeeds(id) => format!("pack:seeds_{id}"),
        }
    }

    pub fn max_stack_size(self) -> u32 {
        match self {
            Item::Bow | Item::Crossbow => 1,
            _ => 64,
        }
    }

    /// The crop this item plants on farmland, if any.
    pub fn plants(self) -> Option<CropKind> {
        match self {
            Item::WheatSeeds => Some(CropKind::Wheat),
            Item::Potato => Some(CropKind::Potatoes),
            Item::Carrot => Some(CropKind::Carrots),
            Item::BeetrootSeeds => Some(CropKind::Beetroots),
            Item::ModdedSeeds(id) => Some(CropKind::Modded(id)),
            _ => None,
        }
    }

    /// Food points a villager gets from eating this item.
    pub fn food_points(self) -> Option<u32> {
        match self {
            Item::Bread => Some(4),
            Item::Potato | Item::Carrot | Item::Beetroot => Some(1),
            _ => None,
        }
    }

    pub fn is_ranged_weapon(self) -> bool {
        matches!(self, Item::Bow | Item::Crossbow)
    }
}

/// A non-empty stack of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: Item,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: Item, count: u32) -> Self {
        Self { item, count }
    }

    /// Split off up to `amount` items, leaving the rest in `self`.
    pub fn split(&mut self, amount: u32) -> ItemStack {
        let taken = amount.min(self.count);
        self.count -= taken;
        ItemStack::new(self.item, taken)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Fixed-size container; empty slots are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleContainer {
    slots: Vec<Option<ItemStack>>,
}

impl Default for SimpleContainer {
    fn default() -> Self {
        Self::new(8)
    }
}

impl SimpleContainer {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    pub fn stacks(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().flatten()
    }

    /// Total count of `item` across all slots.
    pub fn count_item(&self, item: Item) -> u32 {
        self.stacks().filter(|s| s.item == item).map(|s| s.count).sum()
    }

    pub fn has_any_of(&self, items: &[Item]) -> bool {
        self.stacks().any(|s| items.contains(&s.item))
    }

    /// Whether at least part of `stack` would fit.
    pub fn can_add(&self, stack: &ItemStack) -> bool {
        self.slots.iter().any(|slot| match slot {
            None => true,
            Some(s) => s.item == stack.item && s.count < s.item.max_stack_size(),
        })
    }

    /// Merge `stack` into the container. Returns what did not fit.
    pub fn add_item(&mut self, mut stack: ItemStack) -> Option<ItemStack> {
        let max = stack.item.max_stack_size();
        for slot in self.slots.iter_mut().flatten() {
            if slot.item == stack.item && slot.count < max {
                let moved = (max - slot.count).min(stack.count);
                slot.count += moved;
                stack.count -= moved;
                if stack.is_empty() {
                    return None;
                }
            }
        }
        for slot in self.slots.iter_mut() {
            if slot.is_none() {
                let placed = stack.split(max);
                *slot = Some(placed);
                if stack.is_empty() {
                    return None;
                }
            }
        }
        Some(stack)
    }

    /// Remove one item from the first slot holding `item`.
    pub fn remove_one(&mut self, item: Item) -> bool {
        for slot in self.slots.iter_mut() {
            if let Some(stack) = slot {
                if stack.item == item {
                    stack.count -= 1;
                    if stack.is_empty() {
                        *slot = None;
                    }
                    return true;
                }
            }
        }
        false
    }

    /// Take up to `amount` items from the slot at `index`.
    pub fn take_from_slot(&mut self, index: usize, amount: u32) -> Option<ItemStack> {
        let slot = self.slots.get_mut(index)?;
        let stack = slot.as_mut()?;
        let taken = stack.split(amount);
        if stack.is_empty() {
            *slot = None;
        }
        (!taken.is_empty()).then_some(taken)
    }

    /// Index of the first slot holding any of `items`.
    pub fn find_slot(&self, items: &[Item]) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.is_some_and(|s| items.contains(&s.item)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }
}
