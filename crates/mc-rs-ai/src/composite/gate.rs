//! Gated groups of child behaviors.

use crate::behavior::{Behavior, BehaviorContext, BehaviorStatus, BoxedBehavior, Task};
use crate::memory::{MemoryId, MemoryStatus};
use crate::weighted::ShufflingList;

/// Order in which a gate offers its children a start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPolicy {
    /// Insertion order.
    Ordered,
    /// Weighted shuffle, redrawn each time the gate starts.
    Shuffled,
}

/// How many children a gate starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunningPolicy {
    /// Only the first child that starts.
    RunOne,
    /// Every child that can start, until one sets an exit memory.
    TryAll,
}

/// Runs a group of child behaviors as one unit.
///
/// Children are started only when the gate starts; while the gate runs its
/// running children are ticked and nothing new is started. The gate keeps
/// running while any child does. On stop it stops the remaining children
/// and erases its exit memories.
pub struct GateBehavior<E> {
    exit_erased: Vec<MemoryId>,
    order: OrderPolicy,
    running: RunningPolicy,
    children: ShufflingList<BoxedBehavior<E>>,
}

impl<E> GateBehavior<E> {
    pub fn new(
        entry_condition: impl IntoIterator<Item = (MemoryId, MemoryStatus)>,
        exit_erased: Vec<MemoryId>,
        order: OrderPolicy,
        running: RunningPolicy,
        children: Vec<(BoxedBehavior<E>, u32)>,
    ) -> Behavior<Self> {
        let mut list = ShufflingList::new();
        for (child, weight) in children {
            list.add(child, weight);
        }
        Behavior::new(
            entry_condition,
            Self {
                exit_erased,
                order,
                running,
                children: list,
            },
        )
    }

    /// Weighted choice of exactly one child per start.
    pub fn run_one(children: Vec<(BoxedBehavior<E>, u32)>) -> Behavior<Self> {
        Self::run_one_with_entry([], children)
    }

    pub fn run_one_with_entry(
        entry_condition: impl IntoIterator<Item = (MemoryId, MemoryStatus)>,
        children: Vec<(BoxedBehavior<E>, u32)>,
    ) -> Behavior<Self> {
        Self::new(
            entry_condition,
            Vec::new(),
            OrderPolicy::Shuffled,
            RunningPolicy::RunOne,
            children,
        )
    }

    /// Names of the children in their current order.
    pub fn child_names(&self) -> Vec<&'static str> {
        self.children.iter().map(|c| c.name()).collect()
    }

    fn any_running(&self) -> bool {
        self.children
            .iter()
            .any(|c| c.status() == BehaviorStatus::Running)
    }
}

impl<E> Task<E> for GateBehavior<E> {
    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        if self.order == OrderPolicy::Shuffled {
            self.children.shuffle(ctx.random);
        }
        match self.running {
            RunningPolicy::RunOne => {
                for child in self.children.iter_mut() {
                    if child.status() == BehaviorStatus::Stopped && child.try_start(ctx) {
                        break;
                    }
                }
            }
            RunningPolicy::TryAll => {
                for child in self.children.iter_mut() {
                    let blocked = self
                        .exit_erased
                        .iter()
                        .any(|id| ctx.brain.status(*id) == MemoryStatus::ValuePresent);
                    if blocked {
                        break;
                    }
                    if child.status() == BehaviorStatus::Stopped {
                        child.try_start(ctx);
                    }
                }
            }
        }
    }

    fn tick(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        for child in self.children.iter_mut() {
            if child.status() == BehaviorStatus::Running {
                child.tick_or_stop(ctx);
            }
        }
    }

    fn can_still_use(&mut self, _ctx: &mut BehaviorContext<'_, E>) -> bool {
        self.any_running()
    }

    fn stop(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        for child in self.children.iter_mut() {
            if child.status() == BehaviorStatus::Running {
                child.do_stop(ctx);
            }
        }
        for id in &self.exit_erased {
            ctx.brain.erase_id(*id);
        }
    }

    fn timed_out(&self, _game_time: u64, _end_timestamp: u64) -> bool {
        false
    }

    fn used_memories(&self) -> Vec<MemoryId> {
        let mut ids = self.exit_erased.clone();
        for child in self.children.iter() {
            ids.extend(child.memories());
        }
        ids
    }

    fn name(&self) -> &'static str {
        "GateBehavior"
    }
}
