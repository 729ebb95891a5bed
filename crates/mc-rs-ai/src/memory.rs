//! Per-agent memory store.
//!
//! A brain remembers facts under typed [`MemoryKey`]s. Only keys registered
//! in the brain's schema can hold values; anything else reads as
//! [`MemoryStatus::Absent`]. Values may carry an expiry tick after which
//! [`Memories::tick`] forgets them.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use tracing::warn;

/// Untyped memory identifier, used for gating tables and schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryId(&'static str);

impl MemoryId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Typed memory identifier. Two keys with the same name address the same slot.
pub struct MemoryKey<T> {
    id: MemoryId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MemoryKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            id: MemoryId::new(name),
            _marker: PhantomData,
        }
    }

    pub const fn id(&self) -> MemoryId {
        self.id
    }
}

impl<T> Clone for MemoryKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MemoryKey<T> {}

impl<T> fmt::Debug for MemoryKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemoryKey({})", self.id)
    }
}

impl<T> From<MemoryKey<T>> for MemoryId {
    fn from(key: MemoryKey<T>) -> Self {
        key.id
    }
}

/// Observable state of a memory slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryStatus {
    /// The key is not part of this brain's schema.
    Absent,
    /// The key is in the schema but currently holds no value.
    Registered,
    /// The key holds a value.
    ValuePresent,
}

struct Slot {
    value: Option<Box<dyn Any + Send + Sync>>,
    /// Last tick at which the value is still present.
    expires_at: Option<u64>,
}

impl Slot {
    fn empty() -> Self {
        Self {
            value: None,
            expires_at: None,
        }
    }

    fn clear(&mut self) {
        self.value = None;
        self.expires_at = None;
    }
}

/// The memory slots of one agent.
#[derive(Default)]
pub struct Memories {
    slots: HashMap<MemoryId, Slot>,
    game_time: u64,
}

impl Memories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with every id in `schema` registered and empty.
    pub fn with_schema(schema: impl IntoIterator<Item = MemoryId>) -> Self {
        let mut memories = Self::new();
        for id in schema {
            memories.register(id);
        }
        memories
    }

    /// Add `id` to the schema. Registering twice keeps the current value.
    pub fn register(&mut self, id: MemoryId) {
        self.slots.entry(id).or_insert_with(Slot::empty);
    }

    /// Whether `id` is part of the schema.
    pub fn is_registered(&self, id: MemoryId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Registered ids, sorted by name.
    pub fn schema(&self) -> Vec<MemoryId> {
        let mut ids: Vec<_> = self.slots.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Tick of the last [`Memories::tick`] call.
    pub fn game_time(&self) -> u64 {
        self.game_time
    }

    /// Advance the clock and forget values whose expiry tick has passed.
    pub fn tick(&mut self, game_time: u64) {
        self.game_time = game_time;
        for slot in self.slots.values_mut() {
            if slot.expires_at.is_some_and(|end| game_time > end) {
                slot.clear();
            }
        }
    }

    /// The current value, if any. Never panics on a missing or empty slot.
    pub fn get<T: 'static>(&self, key: MemoryKey<T>) -> Option<&T> {
        self.slots
            .get(&key.id())?
            .value
            .as_ref()?
            .downcast_ref::<T>()
    }

    /// Mutable access to the current value. Leaves the expiry untouched.
    pub fn get_mut<T: 'static>(&mut self, key: MemoryKey<T>) -> Option<&mut T> {
        self.slots
            .get_mut(&key.id())?
            .value
            .as_mut()?
            .downcast_mut::<T>()
    }

    /// Store `value` with no expiry. Writes to keys outside the schema are dropped.
    pub fn set<T: Send + Sync + 'static>(&mut self, key: MemoryKey<T>, value: T) {
        self.store(key, value, None);
    }

    /// Store `value` so that it stays present for `ttl` more ticks.
    pub fn set_with_expiry<T: Send + Sync + 'static>(&mut self, key: MemoryKey<T>, value: T, ttl: u64) {
        let end = self.game_time.saturating_add(ttl);
        self.store(key, value, Some(end));
    }

    /// Store `value` when `Some`, erase when `None`.
    pub fn set_optional<T: Send + Sync + 'static>(&mut self, key: MemoryKey<T>, value: Option<T>) {
        match value {
            Some(v) => self.set(key, v),
            None => self.erase(key),
        }
    }

    fn store<T: Send + Sync + 'static>(&mut self, key: MemoryKey<T>, value: T, expires_at: Option<u64>) {
        match self.slots.get_mut(&key.id()) {
            Some(slot) => {
                slot.value = Some(Box::new(value));
                slot.expires_at = expires_at;
            }
            None => warn!(memory = %key.id(), "write to unregistered memory ignored"),
        }
    }

    /// Clear the value and its expiry. The key stays registered.
    pub fn erase<T>(&mut self, key: MemoryKey<T>) {
        self.erase_id(key.id());
    }

    /// Clear a slot by id. Erasing an empty or unknown slot is a no-op.
    pub fn erase_id(&mut self, id: MemoryId) {
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.clear();
        }
    }

    /// Shorthand for a VALUE_PRESENT status check.
    pub fn has_value<T>(&self, key: MemoryKey<T>) -> bool {
        self.status(key.id()) == MemoryStatus::ValuePresent
    }

    /// ABSENT outside the schema, REGISTERED when empty, VALUE_PRESENT otherwise.
    pub fn status(&self, id: MemoryId) -> MemoryStatus {
        match self.slots.get(&id) {
            None => MemoryStatus::Absent,
            Some(slot) if slot.value.is_some() => MemoryStatus::ValuePresent,
            Some(_) => MemoryStatus::Registered,
        }
    }

    /// Whether the slot's status is exactly `expected`.
    pub fn check(&self, id: MemoryId, expected: MemoryStatus) -> bool {
        self.status(id) == expected
    }

    /// Ticks left before the value expires, if it has an expiry.
    pub fn time_until_expiry<T>(&self, key: MemoryKey<T>) -> Option<u64> {
        let slot = self.slots.get(&key.id())?;
        slot.value.as_ref()?;
        slot.expires_at.map(|end| end.saturating_sub(self.game_time))
    }
}

impl fmt::Debug for Memories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present: Vec<_> = self
            .schema()
            .into_iter()
            .filter(|id| self.status(*id) == MemoryStatus::ValuePresent)
            .collect();
        f.debug_struct("Memories")
            .field("registered", &self.slots.len())
            .field("present", &present)
            .field("game_time", &self.game_time)
            .finish()
    }
}

/// Memory keys shared by the villager behaviors and sensors.
pub mod keys {
    use mc_rs_world::pos::BlockPos;

    use super::MemoryKey;
    use crate::level::{EntityId, EntitySnapshot, PositionTracker, WalkTarget};
    use crate::navigation::Path;

    pub const WALK_TARGET: MemoryKey<WalkTarget> = MemoryKey::new("walk_target");
    pub const LOOK_TARGET: MemoryKey<PositionTracker> = MemoryKey::new("look_target");
    pub const PATH: MemoryKey<Path> = MemoryKey::new("path");
    /// Tick since which the current walk target has been unreachable.
    pub const CANT_REACH_WALK_TARGET_SINCE: MemoryKey<u64> =
        MemoryKey::new("cant_reach_walk_target_since");
    pub const ATTACK_TARGET: MemoryKey<EntityId> = MemoryKey::new("attack_target");
    pub const ATTACK_COOLING_DOWN: MemoryKey<bool> = MemoryKey::new("attack_cooling_down");
    pub const INTERACTION_TARGET: MemoryKey<EntityId> = MemoryKey::new("interaction_target");
    /// Visible villagers, nearest first.
    pub const NEAREST_VISIBLE_VILLAGERS: MemoryKey<Vec<EntitySnapshot>> =
        MemoryKey::new("nearest_visible_villagers");
    pub const HOME: MemoryKey<BlockPos> = MemoryKey::new("home");
    pub const JOB_SITE: MemoryKey<BlockPos> = MemoryKey::new("job_site");
    /// Work blocks near the agent, e.g. farmland for farmers.
    pub const SECONDARY_JOB_SITE: MemoryKey<Vec<BlockPos>> = MemoryKey::new("secondary_job_site");
    pub const MEETING_POINT: MemoryKey<BlockPos> = MemoryKey::new("meeting_point");
    pub const LAST_WOKEN: MemoryKey<u64> = MemoryKey::new("last_woken");
    pub const LAST_SLEPT: MemoryKey<u64> = MemoryKey::new("last_slept");
    /// Attacker of a recent hit; set with a short expiry.
    pub const HURT_BY: MemoryKey<EntityId> = MemoryKey::new("hurt_by");
    /// Attacker of the last hit, kept until the agent calms down.
    pub const HURT_BY_ENTITY: MemoryKey<EntityId> = MemoryKey::new("hurt_by_entity");
    /// Present while long jumps are on cooldown; cleared by expiry.
    pub const LONG_JUMP_COOLDOWN: MemoryKey<()> = MemoryKey::new("long_jump_cooldown");
    pub const LONG_JUMP_MID_JUMP: MemoryKey<bool> = MemoryKey::new("long_jump_mid_jump");
}
