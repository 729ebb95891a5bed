//! Periodic restarts of a child behavior.

use crate::behavior::{Behavior, BehaviorContext, Task};
use crate::memory::MemoryId;
use crate::weighted::TickRange;

/// Lets a child start at most once per sampled interval.
///
/// Each time the child stops a new interval is drawn and the child may not
/// start again before it has elapsed. With `reset_ticks` the first start
/// also waits one interval.
pub struct RunSometimes<T> {
    child: T,
    interval: TickRange,
    reset_ticks: bool,
    next_start: u64,
}

impl<T> RunSometimes<T> {
    pub fn new(child: Behavior<T>, interval: TickRange, reset_ticks: bool) -> Behavior<Self> {
        let (entry, task, min, max) = child.into_parts();
        Behavior::new(
            entry,
            Self {
                child: task,
                interval,
                reset_ticks,
                next_start: 0,
            },
        )
        .with_duration(min, max)
    }

    /// Earliest tick at which the child may start again.
    pub fn next_start(&self) -> u64 {
        self.next_start
    }

    pub fn child(&self) -> &T {
        &self.child
    }
}

impl<E, T: Task<E>> Task<E> for RunSometimes<T> {
    fn check_extra_start_conditions(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        if self.reset_ticks {
            self.reset_ticks = false;
            self.next_start = ctx.game_time + self.interval.sample(ctx.random);
        }
        // the child is not consulted while cooling down
        ctx.game_time >= self.next_start && self.child.check_extra_start_conditions(ctx)
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        self.child.start(ctx);
    }

    fn tick(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        self.child.tick(ctx);
    }

    fn can_still_use(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        self.child.can_still_use(ctx)
    }

    fn stop(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        self.next_start = ctx.game_time + self.interval.sample(ctx.random);
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
    use crate::testing::{Harness, TestMob};

    /// Always eligible, runs a single tick.
    #[derive(Default)]
    struct Trivial {
        starts: u32,
        checks: u32,
    }

    impl Task<TestMob> for Trivial {
        fn check_extra_start_conditions(&mut self, _ctx: &mut BehaviorContext<'_, TestMob>) -> bool {
            self.checks += 1;
            true
        }

        fn start(&mut self, _ctx: &mut BehaviorContext<'_, TestMob>) {
            self.starts += 1;
        }
    }

    #[test]
    fn waits_the_fixed_interval_after_each_stop() {
        let mut h = Harness::new(TestMob::default(), &[]);
        let mut b = RunSometimes::new(Behavior::new([], Trivial::default()), TickRange::fixed(10), false);
        assert!(b.try_start(&mut h.ctx(0)));
        b.tick_or_stop(&mut h.ctx(1));
        assert_eq!(b.status(), BehaviorStatus::Stopped);
        let stopped_at = 1;

        for t in stopped_at..stopped_at + 10 {
            assert!(!b.try_start(&mut h.ctx(t)), "restarted early at {t}");
        }
        assert!(b.try_start(&mut h.ctx(stopped_at + 10)));
        assert_eq!(b.task().child().starts, 2);
    }

    #[test]
    fn child_is_not_checked_while_cooling_down() {
        let mut h = Harness::new(TestMob::default(), &[]);
        let mut b = RunSometimes::new(Behavior::new([], Trivial::default()), TickRange::fixed(10), false);
        assert!(b.try_start(&mut h.ctx(0)));
        b.tick_or_stop(&mut h.ctx(1));
        assert_eq!(b.task().child().checks, 1);

        for t in 2..11 {
            assert!(!b.try_start(&mut h.ctx(t)));
        }
        assert_eq!(b.task().child().checks, 1);

        assert!(b.try_start(&mut h.ctx(11)));
        assert_eq!(b.task().child().checks, 2);
    }

    #[test]
    fn reset_ticks_skips_the_child_until_the_first_interval() {
        let mut h = Harness::new(TestMob::default(), &[]);
        let mut b = RunSometimes::new(Behavior::new([], Trivial::default()), TickRange::fixed(5), true);
        assert!(!b.try_start(&mut h.ctx(0)));
        assert!(!b.try_start(&mut h.ctx(4)));
        assert_eq!(b.task().child().checks, 0);
        assert!(b.try_start(&mut h.ctx(5)));
        assert_eq!(b.task().child().checks, 1);
    }

    #[test]
    fn reset_ticks_delays_the_first_start() {
        let mut h = Harness::new(TestMob::default(), &[]);
        let mut b = RunSometimes::new(Behavior::new([], Trivial::default()), TickRange::fixed(5), true);
        assert!(!b.try_start(&mut h.ctx(100)));
        assert_eq!(b.task().next_start(), 105);
        assert!(!b.try_start(&mut h.ctx(104)));
        assert!(b.try_start(&mut h.ctx(105)));
    }

    #[test]
    fn sampled_intervals_stay_in_range() {
        let mut h = Harness::new(TestMob::default(), &[]);
        let mut b = RunSometimes::new(Behavior::new([], Trivial::default()), TickRange::new(30, 60), false);
        let mut t = 0;
        for _ in 0..50 {
            while !b.try_start(&mut h.ctx(t)) {
                t += 1;
            }
            t += 1;
            b.tick_or_stop(&mut h.ctx(t));
            let gap = b.task().next_start() - t;
            assert!((30..=60).contains(&gap), "gap {gap}");
        }
    }
}
