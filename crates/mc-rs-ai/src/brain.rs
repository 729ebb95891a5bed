//! Per-agent brain: memories, activities, sensors and the behavior scheduler.

use rand::rngs::StdRng;
use tracing::{debug, trace};

use crate::activity::{Activities, Activity, ActivityRequest, Schedule};
use crate::behavior::{BehaviorContext, BehaviorStatus, BoxedBehavior};
use crate::error::BrainError;
use crate::level::Level;
use crate::memory::{Memories, MemoryId, MemoryStatus};
use crate::sensor::{ScheduledSensor, Sensor};

struct PrioritizedBehavior<E> {
    activity: Activity,
    priority: u32,
    behavior: BoxedBehavior<E>,
}

/// Everything that decides what one agent does.
pub struct Brain<E> {
    memories: Memories,
    activities: Activities,
    behaviors: Vec<PrioritizedBehavior<E>>,
    sensors: Vec<ScheduledSensor<E>>,
}

impl<E> Brain<E> {
    /// Brain whose memory schema is exactly `schema`.
    pub fn new(schema: impl IntoIterator<Item = MemoryId>) -> Self {
        Self {
            memories: Memories::with_schema(schema),
            activities: Activities::new(),
            behaviors: Vec::new(),
            sensors: Vec::new(),
        }
    }

    fn ensure_registered(&self, owner: &'static str, ids: &[MemoryId]) -> Result<(), BrainError> {
        match ids.iter().find(|id| !self.memories.is_registered(**id)) {
            Some(id) => Err(BrainError::UnregisteredMemory {
                behavior: owner,
                memory: id.name(),
            }),
            None => Ok(()),
        }
    }

    pub fn add_sensor(&mut self, sensor: Box<dyn Sensor<E>>) -> Result<(), BrainError> {
        let scheduled = ScheduledSensor::new(sensor);
        self.ensure_registered(scheduled.name(), &scheduled.outputs())?;
        self.sensors.push(scheduled);
        Ok(())
    }

    /// Add prioritized behaviors to `activity`. Lower priority numbers are
    /// considered first; equal priorities keep insertion order.
    pub fn add_activity(
        &mut self,
        activity: Activity,
        behaviors: Vec<(u32, BoxedBehavior<E>)>,
    ) -> Result<(), BrainError> {
        self.add_activity_with_conditions(activity, behaviors, Vec::new(), Vec::new())
    }

    /// Like [`Brain::add_activity`], with memory requirements for entering
    /// the activity and memories erased when leaving it.
    pub fn add_activity_with_conditions(
        &mut self,
        activity: Activity,
        behaviors: Vec<(u32, BoxedBehavior<E>)>,
        requirements: Vec<(MemoryId, MemoryStatus)>,
        erase_on_exit: Vec<MemoryId>,
    ) -> Result<(), BrainError> {
        if behaviors.is_empty() {
            return Err(BrainError::EmptyActivity(activity));
        }
        for (_, behavior) in &behaviors {
            self.ensure_registered(behavior.name(), &behavior.memories())?;
        }
        let required: Vec<MemoryId> = requirements
            .iter()
            .filter(|(_, s)| *s != MemoryStatus::Absent)
            .map(|(id, _)| *id)
            .chain(erase_on_exit.iter().copied())
            .collect();
        self.ensure_registered("activity requirements", &required)?;

        self.activities.add_requirements(activity, requirements);
        self.activities.add_erase_on_exit(activity, erase_on_exit);
        for (priority, behavior) in behaviors {
            self.behaviors.push(PrioritizedBehavior {
                activity,
                priority,
                behavior,
            });
        }
        self.behaviors.sort_by_key(|b| b.priority);
        Ok(())
    }

    pub fn set_core_activities(&mut self, core: impl IntoIterator<Item = Activity>) {
        self.activities.set_core_activities(core);
    }

    pub fn set_default_activity(&mut self, activity: Activity) {
        self.activities.set_default_activity(activity);
    }

    pub fn set_schedule(&mut self, schedule: Schedule) {
        self.activities.set_schedule(schedule);
    }

    /// Switch to the default activity immediately.
    pub fn use_default_activity(&mut self) {
        let default = self.activities.default_activity();
        self.activities.switch_to(default, &mut self.memories);
    }

    /// Check the wiring once all activities are added.
    pub fn validate(&self) -> Result<(), BrainError> {
        let core = self.activities.core();
        let has_core = !core.is_empty()
            && self
                .behaviors
                .iter()
                .any(|b| core.contains(&b.activity));
        if !has_core {
            return Err(BrainError::MissingCoreActivity);
        }
        self.ensure_registered("activity requirements", &self.activities.referenced_memories())
    }

    pub fn memories(&self) -> &Memories {
        &self.memories
    }

    pub fn memories_mut(&mut self) -> &mut Memories {
        &mut self.memories
    }

    pub fn activities(&self) -> &Activities {
        &self.activities
    }

    pub fn activities_mut(&mut self) -> &mut Activities {
        &mut self.activities
    }

    /// Names of the behaviors currently RUNNING, in priority order.
    pub fn running_behaviors(&self) -> Vec<&'static str> {
        self.behaviors
            .iter()
            .filter(|b| b.behavior.status() == BehaviorStatus::Running)
            .map(|b| b.behavior.name())
            .collect()
    }

    /// Run one scheduler pass for the agent.
    pub fn tick(&mut self, level: &mut dyn Level, mob: &mut E, random: &mut StdRng, game_time: u64) {
        self.memories.tick(game_time);
        let mut ctx = BehaviorContext {
            level,
            mob,
            brain: &mut self.memories,
            activities: &mut self.activities,
            random,
            game_time,
        };

        for sensor in &mut self.sensors {
            sensor.tick(&mut ctx);
        }
        apply_activity_requests(&mut self.behaviors, &mut ctx);

        for entry in &mut self.behaviors {
            if entry.behavior.status() == BehaviorStatus::Running {
                entry.behavior.tick_or_stop(&mut ctx);
            }
        }

        let active = ctx.activities.active_set();
        for entry in &mut self.behaviors {
            if entry.behavior.status() == BehaviorStatus::Stopped && active.contains(&entry.activity) {
                entry.behavior.try_start(&mut ctx);
            }
        }

        apply_activity_requests(&mut self.behaviors, &mut ctx);
    }

    /// Stop every running behavior, e.g. when the agent is removed.
    pub fn stop_all(&mut self, level: &mut dyn Level, mob: &mut E, random: &mut StdRng, game_time: u64) {
        let mut ctx = BehaviorContext {
            level,
            mob,
            brain: &mut self.memories,
            activities: &mut self.activities,
            random,
            game_time,
        };
        for entry in &mut self.behaviors {
            entry.behavior.do_stop(&mut ctx);
        }
    }
}

fn apply_activity_requests<E>(behaviors: &mut [PrioritizedBehavior<E>], ctx: &mut BehaviorContext<'_, E>) {
    let mut requests = ctx.activities.take_requests();
    // an explicit request overrides a schedule refresh raised in the same pass
    if requests.iter().any(|r| *r != ActivityRequest::Schedule) {
        requests.retain(|r| *r != ActivityRequest::Schedule);
    }
    for request in requests {
        let day_time = ctx.level.day_time();
        let Some(next) = ctx.activities.resolve(request, ctx.brain, day_time, ctx.game_time) else {
            continue;
        };
        let Some(previous) = ctx.activities.switch_to(next, ctx.brain) else {
            continue;
        };
        debug!(from = ?previous, to = ?next, "activity changed");
        let active = ctx.activities.active_set();
        for entry in behaviors.iter_mut() {
            if !active.contains(&entry.activity) && entry.behavior.status() == BehaviorStatus::Running {
                trace!(behavior = entry.behavior.name(), "stopped by activity change");
                entry.behavior.do_stop(ctx);
            }
        }
    }
}

impl<E> std::fmt::Debug for Brain<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Brain")
            .field("active", &self.activities.active())
            .field("behaviors", &self.behaviors.len())
            .field("sensors", &self.sensors.len())
            .field("memories", &self.memories)
            .finish()
    }
}
