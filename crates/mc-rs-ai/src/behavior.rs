//! Behavior state machine.
//!
//! A [`Task`] implements the hooks of one kind of work. [`Behavior`] wraps a
//! task with its entry condition, duration window and STOPPED/RUNNING
//! status; the brain drives it through [`BehaviorControl`].

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{trace, warn};

use crate::activity::Activities;
use crate::level::Level;
use crate::memory::{Memories, MemoryId, MemoryStatus};

/// Duration window used when a behavior does not configure one.
pub const DEFAULT_DURATION: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorStatus {
    Stopped,
    Running,
}

/// Everything a behavior may touch during one call.
pub struct BehaviorContext<'a, E> {
    pub level: &'a mut dyn Level,
    pub mob: &'a mut E,
    pub brain: &'a mut Memories,
    pub activities: &'a mut Activities,
    pub random: &'a mut StdRng,
    pub game_time: u64,
}

/// Hooks of one kind of work for agents of type `E`.
///
/// Per-run scratch state lives in the implementing struct; every agent gets
/// its own behavior instances.
pub trait Task<E>: Send + Sync {
    /// Extra start predicate, evaluated after the entry condition holds.
    fn check_extra_start_conditions(&mut self, _ctx: &mut BehaviorContext<'_, E>) -> bool {
        true
    }

    fn start(&mut self, _ctx: &mut BehaviorContext<'_, E>) {}

    fn tick(&mut self, _ctx: &mut BehaviorContext<'_, E>) {}

    /// Whether to keep running. Defaults to a single tick.
    fn can_still_use(&mut self, _ctx: &mut BehaviorContext<'_, E>) -> bool {
        false
    }

    /// Called once when the behavior leaves RUNNING, including out-of-band stops.
    fn stop(&mut self, _ctx: &mut BehaviorContext<'_, E>) {}

    fn timed_out(&self, game_time: u64, end_timestamp: u64) -> bool {
        game_time > end_timestamp
    }

    /// Memories read or written beyond the entry condition.
    fn used_memories(&self) -> Vec<MemoryId> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Last path segment of a type name, keeping generic arguments intact.
fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(i) => &full[i + 2..],
        None => full,
    }
}

/// Object-safe control surface the scheduler and composites use.
pub trait BehaviorControl<E>: Send + Sync {
    fn status(&self) -> BehaviorStatus;

    /// Start if the entry condition and extra conditions hold.
    fn try_start(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool;

    /// Tick if still usable and not timed out, otherwise stop.
    fn tick_or_stop(&mut self, ctx: &mut BehaviorContext<'_, E>);

    /// Stop now. A no-op when already stopped.
    fn do_stop(&mut self, ctx: &mut BehaviorContext<'_, E>);

    /// Every memory this behavior needs in the brain's schema.
    fn memories(&self) -> Vec<MemoryId>;

    fn name(&self) -> &'static str;
}

pub type BoxedBehavior<E> = Box<dyn BehaviorControl<E>>;

/// A task plus its gating and timing state.
#[derive(Debug)]
pub struct Behavior<T> {
    task: T,
    entry_condition: Vec<(MemoryId, MemoryStatus)>,
    status: BehaviorStatus,
    end_timestamp: u64,
    min_duration: u64,
    max_duration: u64,
}

impl<T> Behavior<T> {
    pub fn new(entry_condition: impl IntoIterator<Item = (MemoryId, MemoryStatus)>, task: T) -> Self {
        Self {
            task,
            entry_condition: entry_condition.into_iter().collect(),
            status: BehaviorStatus::Stopped,
            end_timestamp: 0,
            min_duration: DEFAULT_DURATION,
            max_duration: DEFAULT_DURATION,
        }
    }

    /// Run for a uniformly sampled number of ticks in `[min, max]`.
    pub fn with_duration(mut self, min: u64, max: u64) -> Self {
        self.min_duration = min;
        self.max_duration = max.max(min);
        self
    }

    /// Current state. Same as [`BehaviorControl::status`], callable
    /// without naming the agent type.
    pub fn status(&self) -> BehaviorStatus {
        self.status
    }

    /// The wrapped task, for inspecting its per-run state.
    pub fn task(&self) -> &T {
        &self.task
    }

    pub fn task_mut(&mut self) -> &mut T {
        &mut self.task
    }

    /// Memory states required before the task may start.
    pub fn entry_condition(&self) -> &[(MemoryId, MemoryStatus)] {
        &self.entry_condition
    }

    /// Configured `(min, max)` run length in ticks.
    pub fn duration(&self) -> (u64, u64) {
        (self.min_duration, self.max_duration)
    }

    /// Last tick before the behavior times out.
    pub fn end_timestamp(&self) -> u64 {
        self.end_timestamp
    }

    /// Split into entry condition, task and duration window, for wrappers.
    pub fn into_parts(self) -> (Vec<(MemoryId, MemoryStatus)>, T, u64, u64) {
        (
            self.entry_condition,
            self.task,
            self.min_duration,
            self.max_duration,
        )
    }

    fn has_required_memories(&self, memories: &Memories) -> bool {
        self.entry_condition
            .iter()
            .all(|(id, status)| memories.check(*id, *status))
    }

    /// Erase the task type so the behavior can sit in a package.
    pub fn boxed<E>(self) -> BoxedBehavior<E>
    where
        T: Task<E> + 'static,
    {
        Box::new(self)
    }
}

impl<E, T: Task<E>> BehaviorControl<E> for Behavior<T> {
    fn status(&self) -> BehaviorStatus {
        Behavior::status(self)
    }

    fn try_start(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
        if self.status == BehaviorStatus::Running {
            warn!(behavior = self.task.name(), "start requested while already running");
            return false;
        }
        if !self.has_required_memories(ctx.brain) || !self.task.check_extra_start_conditions(ctx) {
            return false;
        }
        self.status = BehaviorStatus::Running;
        let duration = if self.max_duration > self.min_duration {
            ctx.random.gen_range(self.min_duration..=self.max_duration)
        } else {
            self.min_duration
        };
        self.end_timestamp = ctx.game_time + duration;
        trace!(
            behavior = self.task.name(),
            until = self.end_timestamp,
            "behavior started"
        );
        self.task.start(ctx);
        true
    }

    fn tick_or_stop(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        if self.status != BehaviorStatus::Running {
            warn!(behavior = self.task.name(), "tick requested while stopped");
            return;
        }
        if !self.task.timed_out(ctx.game_time, self.end_timestamp) && self.task.can_still_use(ctx) {
            self.task.tick(ctx);
        } else {
            self.do_stop(ctx);
        }
    }

    fn do_stop(&mut self, ctx: &mut BehaviorContext<'_, E>) {
        if self.status == BehaviorStatus::Stopped {
            trace!(behavior = self.task.name(), "stop requested while stopped");
            return;
        }
        self.status = BehaviorStatus::Stopped;
        trace!(behavior = self.task.name(), "behavior stopped");
        self.task.stop(ctx);
    }

    fn memories(&self) -> Vec<MemoryId> {
        let mut ids: Vec<MemoryId> = self
            .entry_condition
            .iter()
            .filter(|(_, status)| *status != MemoryStatus::Absent)
            .map(|(id, _)| *id)
            .collect();
        ids.extend(self.task.used_memories());
        ids.sort();
        ids.dedup();
        ids
    }

    fn name(&self) -> &'static str {
        self.task.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKey;
    use crate::testing::{Harness, TestMob};

    const K1: MemoryKey<u32> = MemoryKey::new("k1");

    /// Counts hook calls and keeps running until `run_for` ticks have passed.
    #[derive(Debug, Default)]
    struct Probe {
        allow_start: bool,
        keep_running: bool,
        starts: u32,
        ticks: u32,
        stops: u32,
        started_at: Option<u64>,
        stopped_at: Option<u64>,
    }

    impl Probe {
        fn running() -> Self {
            Self {
                allow_start: true,
                keep_running: true,
                ..Default::default()
            }
        }
    }

    impl<E> Task<E> for Probe {
        fn check_extra_start_conditions(&mut self, _ctx: &mut BehaviorContext<'_, E>) -> bool {
            self.allow_start
        }

        fn start(&mut self, ctx: &mut BehaviorContext<'_, E>) {
            self.starts += 1;
            self.started_at = Some(ctx.game_time);
        }

        fn tick(&mut self, _ctx: &mut BehaviorContext<'_, E>) {
            self.ticks += 1;
        }

        fn can_still_use(&mut self, _ctx: &mut BehaviorContext<'_, E>) -> bool {
            self.keep_running
        }

        fn stop(&mut self, ctx: &mut BehaviorContext<'_, E>) {
            self.stops += 1;
            self.stopped_at = Some(ctx.game_time);
        }
    }

    fn harness() -> Harness<TestMob> {
        Harness::new(TestMob::default(), &[K1.id()])
    }

    #[test]
    fn entry_condition_gates_start() {
        // requires K1 present; fails until it is set
        let mut h = harness();
        let mut b = Behavior::new([(K1.id(), MemoryStatus::ValuePresent)], Probe::running());
        assert!(!b.try_start(&mut h.ctx(1)));
        assert_eq!(b.status(), BehaviorStatus::Stopped);
        assert_eq!(b.task().starts, 0);

        h.memories.set(K1, 7);
        assert!(b.try_start(&mut h.ctx(2)));
        assert_eq!(b.status(), BehaviorStatus::Running);
        assert_eq!(b.task().starts, 1);
    }

    #[test]
    fn gating_table_is_exact() {
        use MemoryStatus::*;
        let all = [Absent, Registered, ValuePresent];
        for actual in all {
            for required in all {
                let schema = if actual == Absent { vec![] } else { vec![K1.id()] };
                let mut h = Harness::new(TestMob::default(), &schema);
                if actual == ValuePresent {
                    h.memories.set(K1, 1);
                }
                let mut b = Behavior::new([(K1.id(), required)], Probe::running());
                let started = b.try_start(&mut h.ctx(0));
                assert_eq!(
                    started,
                    actual == required,
                    "actual {actual:?} required {required:?}"
                );
            }
        }
    }

    #[test]
    fn extra_condition_failure_has_no_side_effects() {
        let mut h = harness();
        let mut probe = Probe::running();
        probe.allow_start = false;
        let mut b = Behavior::new([], probe);
        assert!(!b.try_start(&mut h.ctx(0)));
        assert_eq!(b.task().starts, 0);
        assert_eq!(b.status(), BehaviorStatus::Stopped);
    }

    #[test]
    fn default_task_runs_a_single_tick() {
        struct Once;
        impl<E> Task<E> for Once {}

        let mut h = harness();
        let mut b = Behavior::new([], Once);
        assert!(b.try_start(&mut h.ctx(0)));
        b.tick_or_stop(&mut h.ctx(1));
        assert_eq!(b.status(), BehaviorStatus::Stopped);
    }

    #[test]
    fn timeout_stops_after_sampled_duration() {
        let mut h = harness();
        for seed in 0..20u64 {
            h.reseed(seed);
            let mut b = Behavior::new([], Probe::running()).with_duration(3, 7);
            let start = 100;
            assert!(b.try_start(&mut h.ctx(start)));
            let mut t = start;
            while b.status() == BehaviorStatus::Running {
                t += 1;
                b.tick_or_stop(&mut h.ctx(t));
            }
            let ticks = b.task().ticks as u64;
            assert!((3..=7).contains(&ticks), "seed {seed}: {ticks} ticks");
            assert_eq!(b.task().stopped_at, Some(start + ticks + 1));
            assert_eq!(b.end_timestamp(), start + ticks);
        }
    }

    #[test]
    fn never_ticks_or_starts_out_of_state() {
        let mut h = harness();
        let mut b = Behavior::new([], Probe::running()).with_duration(1, 1);
        // tick while stopped is ignored
        b.tick_or_stop(&mut h.ctx(0));
        assert_eq!(b.task().ticks, 0);
        assert!(b.try_start(&mut h.ctx(0)));
        // start while running is refused
        assert!(!b.try_start(&mut h.ctx(0)));
        assert_eq!(b.task().starts, 1);
    }

    #[test]
    fn double_stop_is_harmless() {
        let mut h = harness();
        let mut b = Behavior::new([], Probe::running());
        assert!(b.try_start(&mut h.ctx(0)));
        b.do_stop(&mut h.ctx(1));
        b.do_stop(&mut h.ctx(2));
        assert_eq!(b.task().stops, 1);
        // stop immediately after start, before any tick
        assert!(b.try_start(&mut h.ctx(3)));
        b.do_stop(&mut h.ctx(3));
        assert_eq!(b.task().stops, 2);
        assert_eq!(b.task().ticks, 0);
    }

    #[test]
    fn random_drive_never_violates_state_machine() {
        use rand::SeedableRng;

        /// Panics if a hook is called in the wrong state.
        #[derive(Default)]
        struct Strict {
            running: bool,
            flip: bool,
        }

        impl<E> Task<E> for Strict {
            fn check_extra_start_conditions(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
                ctx.random.gen_bool(0.5)
            }
            fn start(&mut self, _ctx: &mut BehaviorContext<'_, E>) {
                assert!(!self.running, "start while running");
                self.running = true;
            }
            fn tick(&mut self, _ctx: &mut BehaviorContext<'_, E>) {
                assert!(self.running, "tick while stopped");
            }
            fn can_still_use(&mut self, ctx: &mut BehaviorContext<'_, E>) -> bool {
                self.flip = !self.flip;
                self.flip || ctx.random.gen_bool(0.7)
            }
            fn stop(&mut self, _ctx: &mut BehaviorContext<'_, E>) {
                assert!(self.running, "stop while stopped");
                self.running = false;
            }
        }

        let mut h = harness();
        let mut driver = StdRng::seed_from_u64(99);
        let mut b = Behavior::new([], Strict::default()).with_duration(0, 5);
        for t in 0..5000 {
            match driver.gen_range(0..3) {
                0 => {
                    b.try_start(&mut h.ctx(t));
                }
                1 => b.tick_or_stop(&mut h.ctx(t)),
                _ => b.do_stop(&mut h.ctx(t)),
            }
            assert_eq!(b.task().running, b.status() == BehaviorStatus::Running);
        }
    }

    #[test]
    fn memories_lists_gated_and_used_keys() {
        const K2: MemoryKey<u32> = MemoryKey::new("k2");
        let b = Behavior::new(
            [
                (K1.id(), MemoryStatus::ValuePresent),
                (K2.id(), MemoryStatus::Absent),
            ],
            Probe::running(),
        );
        assert_eq!(BehaviorControl::<TestMob>::memories(&b), vec![K1.id()]);
        assert_eq!(BehaviorControl::<TestMob>::name(&b), "Probe");
    }
}
