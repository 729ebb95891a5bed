//! Predicate-guarded child behaviors.

use crate::behavior::{Behavior, BehaviorContext, Task};
use crate::memory::{MemoryId, MemoryStatus};

/// Runs a child task only while a predicate over the agent holds.
pub struct RunIf<P, T> {
    predicate: P,
    child: T,
    check_while_running: bool,
}

impl<P, T> RunIf<P, T> {
    /// Wrap `child`, adding `entry_condition` to its own. With
    /// `check_while_running` the predicate must keep holding for the child
    /// to continue; otherwise it only gates the start.
    pub fn new(
        entry_condition: impl IntoIterator<Item = (MemoryId, MemoryStatus)>,
        predicate: P,
        child: Behavior<T>,
        check_while_running: bool,
    ) -> Behavior<Self> {
        let (mut entry, task, min, max) = child.into_parts();
        for (id, status) in entry_condition {
            if !entry.contains(&(id, status)) {
                entry.push((id, status));
            }
        }
        Behavior::new(
            entry,
            Self {
                predicate,
                child: task,
                check_while_running,
            },
        )
        .with_duration(min, max)
    }

    pub fn wrap(predicate: P, child: Behavior<T>, check_while_running: bool) -> Behavior<Self> {
        Self::new([], predicate, child, check_while_running)
    }

    pub fn child(&self) -> &T {
        &self.child
    }
}

impl<E, P, T> Task<E> for RunIf<P, T>
where
    P: Fn(&E) -> bool + Send + Sync,
    T: Task<E>,
{
    fn check_extra_start_conditions(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        (self.predicate)(ctx.mob) && self.child.check_extra_start_conditions(ctx)
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        self.child.start(ctx);
    }

    fn tick(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        self.child.tick(ctx);
    }

    fn can_still_use(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        self.check_while_running && (self.predicate)(ctx.mob) && self.child.can_still_use(ctx)
    }

    fn stop(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        self.child.stop(ctx);
    }

    fn timed_out(&self, game_time: u64, end_timestamp: u64) -> bool {
        self.child.timed_out(game_time, end_timestamp)
    }

    fn used_memories(&self) -> Vec<MemoryId> {
        self.child.used_memories()
    }

    fn name(&self) -> &'static str {
        self.child.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{BehaviorControl, BehaviorStatus};
    use crate::memory::MemoryKey;
    use crate::testing::{Harness, TestMob};

    const K1: MemoryKey<u32> = MemoryKey::new("k1");
    const K2: MemoryKey<u32> = MemoryKey::new("k2");

    #[derive(Default)]
    struct Busy {
        allow: bool,
        starts: u32,
    }

    impl Task<TestMob> for Busy {
        fn check_extra_start_conditions(&mut self, _ctx: &mut BehaviorContext<'_, TestMob>) -> bool {
            self.allow
        }
        fn start(&mut self, _ctx: &mut BehaviorContext<'_, TestMob>) {
            self.starts += 1;
        }
        fn can_still_use(&mut self, _ctx: &mut BehaviorContext<'_, TestMob>) -> bool {
            true
        }
    }

    fn on_ground(mob: &TestMob) -> bool {
        mob.on_ground
    }

    #[test]
    fn predicate_short_circuits_start() {
        let mut h = Harness::new(TestMob::default(), &[]);
        let mut b = RunIf::wrap(on_ground, Behavior::new([], Busy { allow: true, starts: 0 }), false);
        h.mob.on_ground = false;
        assert!(!b.try_start(&mut h.ctx(0)));
        h.mob.on_ground = true;
        assert!(b.try_start(&mut h.ctx(1)));
        assert_eq!(b.task().child().starts, 1);
    }

    #[test]
    fn child_condition_still_applies() {
        let mut h = Harness::new(TestMob::default(), &[]);
        let mut b = RunIf::wrap(on_ground, Behavior::new([], Busy::default()), false);
        assert!(!b.try_start(&mut h.ctx(0)));
    }

    #[test]
    fn entry_conditions_are_merged() {
        let child = Behavior::new([(K1.id(), MemoryStatus::ValuePresent)], Busy { allow: true, starts: 0 })
            .with_duration(5, 9);
        let b = RunIf::new([(K2.id(), MemoryStatus::Registered)], on_ground, child, false);
        assert_eq!(b.entry_condition().len(), 2);
        assert_eq!(b.duration(), (5, 9));
        assert_eq!(BehaviorControl::<TestMob>::name(&b), "Busy");
    }

    #[test]
    fn check_while_running_controls_continuation() {
        let mut h = Harness::new(TestMob::default(), &[]);
        let mut watched = RunIf::wrap(on_ground, Behavior::new([], Busy { allow: true, starts: 0 }), true);
        let mut unwatched = RunIf::wrap(on_ground, Behavior::new([], Busy { allow: true, starts: 0 }), false);
        assert!(watched.try_start(&mut h.ctx(0)));
        assert!(unwatched.try_start(&mut h.ctx(0)));

        watched.tick_or_stop(&mut h.ctx(1));
        unwatched.tick_or_stop(&mut h.ctx(1));
        assert_eq!(watched.status(), BehaviorStatus::Running);
        // without the check the wrapper runs a single tick
        assert_eq!(unwatched.status(), BehaviorStatus::Stopped);

        h.mob.on_ground = false;
        watched.tick_or_stop(&mut h.ctx(2));
        assert_eq!(watched.status(), BehaviorStatus::Stopped);
    }
}
