//! Activities, the daily schedule and activity switching.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::memory::{Memories, MemoryId, MemoryStatus};

/// Ticks in one day.
pub const DAY_LENGTH: u64 = 24000;

/// Named group of behaviors that run together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Core,
    Idle,
    Work,
    Play,
    Rest,
    Meet,
    Panic,
    Hide,
    Fight,
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Day-time keyframes. The activity of a keyframe lasts until the next one
/// and the last keyframe wraps around midnight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schedule {
    keyframes: Vec<(u64, Activity)>,
}

impl Schedule {
    pub fn new(mut keyframes: Vec<(u64, Activity)>) -> Self {
        keyframes.sort_by_key(|(t, _)| *t);
        Self { keyframes }
    }

    /// Adult villager day: idle, work, meet, idle, rest.
    pub fn villager_default() -> Self {
        Self::new(vec![
            (10, Activity::Idle),
            (2000, Activity::Work),
            (9000, Activity::Meet),
            (11000, Activity::Idle),
            (12000, Activity::Rest),
        ])
    }

    /// Scheduled activity at `day_time`; `Idle` when empty.
    pub fn activity_at(&self, day_time: u64) -> Activity {
        let t = day_time % DAY_LENGTH;
        self.keyframes
            .iter()
            .rev()
            .find(|(start, _)| *start <= t)
            .or_else(|| self.keyframes.last())
            .map(|(_, a)| *a)
            .unwrap_or(Activity::Idle)
    }
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

/// Activity change asked for by a behavior, sensor or host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityRequest {
    /// Switch to the activity if its requirements hold, else to the default.
    Set(Activity),
    /// Switch to the scheduled activity; throttled.
    Schedule,
    /// Switch to the first listed activity whose requirements hold.
    FirstValid(Vec<Activity>),
}

/// Active-activity state of one brain.
#[derive(Debug, Clone)]
pub struct Activities {
    core: Vec<Activity>,
    default_activity: Activity,
    active: Activity,
    schedule: Schedule,
    requirements: HashMap<Activity, Vec<(MemoryId, MemoryStatus)>>,
    erase_on_exit: HashMap<Activity, Vec<MemoryId>>,
    schedule_update_interval: u64,
    last_schedule_update: Option<u64>,
    requests: Vec<ActivityRequest>,
}

impl Default for Activities {
    fn default() -> Self {
        Self {
            core: vec![Activity::Core],
            default_activity: Activity::Idle,
            active: Activity::Idle,
            schedule: Schedule::default(),
            requirements: HashMap::new(),
            erase_on_exit: HashMap::new(),
            schedule_update_interval: 20,
            last_schedule_update: None,
            requests: Vec::new(),
        }
    }
}

impl Activities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activities whose behaviors run regardless of the schedule.
    pub fn set_core_activities(&mut self, core: impl IntoIterator<Item = Activity>) {
        self.core = core.into_iter().collect();
    }

    /// Fallback when a requested activity's requirements are not met.
    pub fn set_default_activity(&mut self, activity: Activity) {
        self.default_activity = activity;
    }

    pub fn set_schedule(&mut self, schedule: Schedule) {
        self.schedule = schedule;
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Minimum ticks between two schedule refreshes.
    pub fn set_schedule_update_interval(&mut self, ticks: u64) {
        self.schedule_update_interval = ticks;
    }

    pub fn core(&self) -> &[Activity] {
        &self.core
    }

    pub fn default_activity(&self) -> Activity {
        self.default_activity
    }

    /// The current non-core activity.
    pub fn active(&self) -> Activity {
        self.active
    }

    /// Whether `activity` is core or the active one.
    pub fn is_active(&self, activity: Activity) -> bool {
        self.active == activity || self.core.contains(&activity)
    }

    /// Core activities plus the active one.
    pub fn active_set(&self) -> Vec<Activity> {
        let mut set = self.core.clone();
        if !set.contains(&self.active) {
            set.push(self.active);
        }
        set
    }

    /// Switch to `activity` once the current behavior passes finish.
    pub fn request(&mut self, activity: Activity) {
        self.requests.push(ActivityRequest::Set(activity));
    }

    /// Follow the schedule, subject to the update interval.
    pub fn request_schedule(&mut self) {
        self.requests.push(ActivityRequest::Schedule);
    }

    /// Switch to the first activity whose requirements hold.
    pub fn request_first_valid(&mut self, activities: Vec<Activity>) {
        self.requests.push(ActivityRequest::FirstValid(activities));
    }

    pub fn has_pending_requests(&self) -> bool {
        !self.requests.is_empty()
    }

    pub(crate) fn take_requests(&mut self) -> Vec<ActivityRequest> {
        std::mem::take(&mut self.requests)
    }

    pub(crate) fn add_requirements(
        &mut self,
        activity: Activity,
        requirements: Vec<(MemoryId, MemoryStatus)>,
    ) {
        self.requirements.entry(activity).or_default().extend(requirements);
    }

    pub(crate) fn add_erase_on_exit(&mut self, activity: Activity, memories: Vec<MemoryId>) {
        self.erase_on_exit.entry(activity).or_default().extend(memories);
    }

    pub fn requirements_met(&self, activity: Activity, memories: &Memories) -> bool {
        self.requirements
            .get(&activity)
            .map_or(true, |reqs| reqs.iter().all(|(id, s)| memories.check(*id, *s)))
    }

    /// Memories named by activity requirements and erase lists.
    pub(crate) fn referenced_memories(&self) -> Vec<MemoryId> {
        let mut ids: Vec<MemoryId> = self
            .requirements
            .values()
            .flatten()
            .filter(|(_, s)| *s != MemoryStatus::Absent)
            .map(|(id, _)| *id)
            .chain(self.erase_on_exit.values().flatten().copied())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Activity a request resolves to, or `None` when nothing should change.
    pub(crate) fn resolve(
        &mut self,
        request: ActivityRequest,
        memories: &Memories,
        day_time: u64,
        game_time: u64,
    ) -> Option<Activity> {
        match request {
            ActivityRequest::Set(activity) => Some(self.if_possible(activity, memories)),
            ActivityRequest::Schedule => {
                let due = self
                    .last_schedule_update
                    .map_or(true, |last| game_time.saturating_sub(last) >= self.schedule_update_interval);
                if !due {
                    return None;
                }
                self.last_schedule_update = Some(game_time);
                let scheduled = self.schedule.activity_at(day_time);
                if self.is_active(scheduled) {
                    None
                } else {
                    Some(self.if_possible(scheduled, memories))
                }
            }
            ActivityRequest::FirstValid(list) => list
                .into_iter()
                .find(|a| self.requirements_met(*a, memories))
                .map(|a| self.if_possible(a, memories)),
        }
    }

    fn if_possible(&self, activity: Activity, memories: &Memories) -> Activity {
        if self.requirements_met(activity, memories) {
            activity
        } else {
            self.default_activity
        }
    }

    /// Make `activity` the active one. Erases the exit memories of every
    /// other activity and returns the previous activity, or `None` when it
    /// was already active.
    pub(crate) fn switch_to(&mut self, activity: Activity, memories: &mut Memories) -> Option<Activity> {
        if self.is_active(activity) {
            return None;
        }
        for (other, ids) in &self.erase_on_exit {
            if *other != activity {
                for id in ids {
                    memories.erase_id(*id);
                }
            }
        }
        Some(std::mem::replace(&mut self.active, activity))
    }
}
