use std::fmt;

use chrono::{DateTime, Utc, Weekday};
use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{Clock, Name, ReadError, SyncError, SystemClock, UnknownVariantError, UpdateError};

#[allow(async_fn_in_trait)]
pub trait WorkoutPlanService {
    async fn get_workout_plans(&self) -> Result<WorkoutPlanRecord, ReadError>;
    async fn save_workout_plans(
        &self,
        record: &WorkoutPlanRecord,
    ) -> Result<WorkoutPlanRecord, UpdateError>;
}

#[allow(async_fn_in_trait)]
pub trait WorkoutPlanRepository {
    async fn sync_workout_plans(&self) -> Result<WorkoutPlanRecord, SyncError>;
    async fn read_workout_plans(&self) -> Result<WorkoutPlanRecord, ReadError>;
    async fn save_workout_plans(
        &self,
        record: &WorkoutPlanRecord,
    ) -> Result<WorkoutPlanRecord, UpdateError>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkoutPlanError {
    #[error("workout plan not found")]
    PlanNotFound,
    #[error("no workout plan is being edited")]
    NotEditing,
    #[error("day not found in schedule")]
    DayNotFound,
}

/// Opaque plan id. New plans get a UUID, but any non-empty string from the server is kept as is.
#[derive(Deref, Display, Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlanID(String);

impl PlanID {
    #[must_use]
    pub fn nil() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl From<String> for PlanID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PlanID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutPlan {
    pub id: PlanID,
    pub name: Name,
    pub description: Option<String>,
    pub schedule: Vec<DayWorkout>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

impl WorkoutPlan {
    #[must_use]
    pub fn day(&self, day: Weekday) -> Option<&DayWorkout> {
        self.schedule.iter().find(|d| d.day == day)
    }

    fn day_mut(&mut self, day: Weekday) -> Result<&mut DayWorkout, WorkoutPlanError> {
        self.schedule
            .iter_mut()
            .find(|d| d.day == day)
            .ok_or(WorkoutPlanError::DayNotFound)
    }

    #[must_use]
    pub fn training_days(&self) -> usize {
        self.schedule.iter().filter(|d| !d.is_rest_day).count()
    }
}

/// Seven rest days starting on Monday.
#[must_use]
pub fn default_schedule() -> Vec<DayWorkout> {
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .map(DayWorkout::rest)
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayWorkout {
    pub day: Weekday,
    pub label: String,
    pub icon: String,
    pub exercises: Vec<WorkoutExercise>,
    pub is_rest_day: bool,
    pub muscle_groups: Vec<MuscleGroup>,
}

impl DayWorkout {
    pub const REST_LABEL: &'static str = "Rest Day";
    pub const REST_ICON: &'static str = "🛌";

    #[must_use]
    pub fn rest(day: Weekday) -> Self {
        Self {
            day,
            label: Self::REST_LABEL.to_string(),
            icon: Self::REST_ICON.to_string(),
            exercises: vec![],
            is_rest_day: true,
            muscle_groups: vec![],
        }
    }

    fn toggle_rest(&mut self) {
        if self.is_rest_day {
            self.is_rest_day = false;
        } else {
            *self = Self::rest(self.day);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutExercise {
    pub exercise_id: String,
    pub exercise_name: String,
    pub sets: u32,
    pub reps: u32,
    pub rest_seconds: u32,
    pub notes: Option<String>,
    pub muscle_group: Option<String>,
}

impl WorkoutExercise {
    fn apply(&mut self, update: WorkoutExerciseUpdate) {
        if let Some(exercise_name) = update.exercise_name {
            self.exercise_name = exercise_name;
        }
        if let Some(sets) = update.sets {
            self.sets = sets;
        }
        if let Some(reps) = update.reps {
            self.reps = reps;
        }
        if let Some(rest_seconds) = update.rest_seconds {
            self.rest_seconds = rest_seconds;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
        if let Some(muscle_group) = update.muscle_group {
            self.muscle_group = muscle_group;
        }
    }
}

/// Partial update of an exercise. Nested options allow clearing optional fields.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkoutExerciseUpdate {
    pub exercise_name: Option<String>,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub rest_seconds: Option<u32>,
    pub notes: Option<Option<String>>,
    pub muscle_group: Option<Option<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Legs,
    Core,
    FullBody,
    CardioAndCore,
}

impl MuscleGroup {
    pub const ALL: [MuscleGroup; 9] = [
        MuscleGroup::Chest,
        MuscleGroup::Back,
        MuscleGroup::Shoulders,
        MuscleGroup::Biceps,
        MuscleGroup::Triceps,
        MuscleGroup::Legs,
        MuscleGroup::Core,
        MuscleGroup::FullBody,
        MuscleGroup::CardioAndCore,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            MuscleGroup::Chest => "Chest",
            MuscleGroup::Back => "Back",
            MuscleGroup::Shoulders => "Shoulders",
            MuscleGroup::Biceps => "Biceps",
            MuscleGroup::Triceps => "Triceps",
            MuscleGroup::Legs => "Legs",
            MuscleGroup::Core => "Core",
            MuscleGroup::FullBody => "Full Body",
            MuscleGroup::CardioAndCore => "Cardio & Core",
        }
    }
}

impl TryFrom<&str> for MuscleGroup {
    type Error = UnknownVariantError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        MuscleGroup::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownVariantError::new("muscle group", value))
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Plan being edited. New plans get their id when they are saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditingPlan {
    pub plan: WorkoutPlan,
    pub is_new: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkoutPlanRecord {
    pub plans: Vec<WorkoutPlan>,
    pub active_plan: Option<PlanID>,
    pub editing: Option<EditingPlan>,
}

const NEW_PLAN_NAME: &str = "New Workout Plan";

#[derive(Debug)]
pub struct WorkoutPlanStore<C: Clock = SystemClock> {
    plans: Vec<WorkoutPlan>,
    active_plan: Option<PlanID>,
    editing: Option<EditingPlan>,
    clock: C,
}

impl WorkoutPlanStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for WorkoutPlanStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> WorkoutPlanStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self::restore(WorkoutPlanRecord::default(), clock)
    }

    /// An active plan id without a matching plan is dropped.
    pub fn restore(record: WorkoutPlanRecord, clock: C) -> Self {
        let mut store = Self {
            plans: vec![],
            active_plan: None,
            editing: None,
            clock,
        };
        store.replace(record);
        store
    }

    #[must_use]
    pub fn record(&self) -> WorkoutPlanRecord {
        WorkoutPlanRecord {
            plans: self.plans.clone(),
            active_plan: self.active_plan.clone(),
            editing: self.editing.clone(),
        }
    }

    #[must_use]
    pub fn plans(&self) -> &[WorkoutPlan] {
        &self.plans
    }

    #[must_use]
    pub fn plan(&self, id: &PlanID) -> Option<&WorkoutPlan> {
        self.plans.iter().find(|p| p.id == *id)
    }

    #[must_use]
    pub fn active_plan(&self) -> Option<&WorkoutPlan> {
        self.plan(self.active_plan.as_ref()?)
    }

    #[must_use]
    pub fn editing(&self) -> Option<&EditingPlan> {
        self.editing.as_ref()
    }

    /// Day of the plan being edited.
    #[must_use]
    pub fn day_workout(&self, day: Weekday) -> Option<&DayWorkout> {
        self.editing.as_ref()?.plan.day(day)
    }

    pub fn create_plan(&mut self, name: Name, description: Option<String>) -> PlanID {
        let now = self.clock.now();
        let plan = WorkoutPlan {
            id: PlanID::random(),
            name,
            description,
            schedule: default_schedule(),
            created_at: now,
            updated_at: now,
            is_active: false,
        };
        let id = plan.id.clone();
        self.plans.push(plan);
        id
    }

    pub fn delete_plan(&mut self, id: &PlanID) -> Result<WorkoutPlan, WorkoutPlanError> {
        let index = self
            .plans
            .iter()
            .position(|p| p.id == *id)
            .ok_or(WorkoutPlanError::PlanNotFound)?;
        if self.active_plan.as_ref() == Some(id) {
            self.active_plan = None;
        }
        Ok(self.plans.remove(index))
    }

    pub fn set_active_plan(&mut self, id: &PlanID) -> Result<(), WorkoutPlanError> {
        if self.plan(id).is_none() {
            return Err(WorkoutPlanError::PlanNotFound);
        }
        for plan in &mut self.plans {
            plan.is_active = plan.id == *id;
        }
        self.active_plan = Some(id.clone());
        Ok(())
    }

    pub fn rename_plan(&mut self, id: &PlanID, name: Name) -> Result<(), WorkoutPlanError> {
        let now = self.clock.now();
        let plan = self
            .plans
            .iter_mut()
            .find(|p| p.id == *id)
            .ok_or(WorkoutPlanError::PlanNotFound)?;
        plan.name = name;
        plan.updated_at = now;
        Ok(())
    }

    /// Starts editing a copy of an existing plan, or a new plan if no id is given.
    pub fn start_editing(&mut self, id: Option<&PlanID>) -> Result<(), WorkoutPlanError> {
        self.editing = Some(match id {
            Some(id) => EditingPlan {
                plan: self.plan(id).ok_or(WorkoutPlanError::PlanNotFound)?.clone(),
                is_new: false,
            },
            None => {
                let now = self.clock.now();
                EditingPlan {
                    plan: WorkoutPlan {
                        id: PlanID::nil(),
                        name: Name::from_static(NEW_PLAN_NAME),
                        description: None,
                        schedule: default_schedule(),
                        created_at: now,
                        updated_at: now,
                        is_active: false,
                    },
                    is_new: true,
                }
            }
        });
        Ok(())
    }

    pub fn cancel_editing(&mut self) {
        self.editing = None;
    }

    /// Stores the edited plan and ends editing.
    ///
    /// If the edited plan was deleted in the meantime, editing continues.
    pub fn save_editing(&mut self) -> Result<PlanID, WorkoutPlanError> {
        let editing = self.editing.as_ref().ok_or(WorkoutPlanError::NotEditing)?;
        let mut plan = editing.plan.clone();
        plan.updated_at = self.clock.now();

        let id = if editing.is_new {
            plan.id = PlanID::random();
            let id = plan.id.clone();
            self.plans.push(plan);
            id
        } else {
            let existing = self
                .plans
                .iter_mut()
                .find(|p| p.id == plan.id)
                .ok_or(WorkoutPlanError::PlanNotFound)?;
            plan.is_active = existing.is_active;
            let id = plan.id.clone();
            *existing = plan;
            id
        };

        self.editing = None;
        Ok(id)
    }

    pub fn update_day(
        &mut self,
        day: Weekday,
        label: String,
        icon: String,
        muscle_groups: Vec<MuscleGroup>,
    ) -> Result<(), WorkoutPlanError> {
        let day = self.editing_day(day)?;
        day.label = label;
        day.icon = icon;
        day.muscle_groups = muscle_groups;
        day.is_rest_day = false;
        Ok(())
    }

    /// Switching to a rest day drops all exercises and muscle groups.
    pub fn toggle_rest_day(&mut self, day: Weekday) -> Result<(), WorkoutPlanError> {
        self.editing_day(day)?.toggle_rest();
        Ok(())
    }

    pub fn add_exercises_to_day(
        &mut self,
        day: Weekday,
        exercises: Vec<WorkoutExercise>,
    ) -> Result<(), WorkoutPlanError> {
        self.editing_day(day)?.exercises.extend(exercises);
        Ok(())
    }

    pub fn remove_exercise_from_day(
        &mut self,
        day: Weekday,
        exercise_id: &str,
    ) -> Result<(), WorkoutPlanError> {
        self.editing_day(day)?
            .exercises
            .retain(|e| e.exercise_id != exercise_id);
        Ok(())
    }

    pub fn update_exercise_in_day(
        &mut self,
        day: Weekday,
        exercise_id: &str,
        update: WorkoutExerciseUpdate,
    ) -> Result<(), WorkoutPlanError> {
        if let Some(exercise) = self
            .editing_day(day)?
            .exercises
            .iter_mut()
            .find(|e| e.exercise_id == exercise_id)
        {
            exercise.apply(update);
        }
        Ok(())
    }

    pub fn reorder_exercises_in_day(
        &mut self,
        day: Weekday,
        exercises: Vec<WorkoutExercise>,
    ) -> Result<(), WorkoutPlanError> {
        self.editing_day(day)?.exercises = exercises;
        Ok(())
    }

    /// Replaces the local plans with the locally cached state.
    pub async fn load(&mut self, service: &impl WorkoutPlanService) -> Result<(), ReadError> {
        let record = service.get_workout_plans().await?;
        self.replace(record);
        Ok(())
    }

    pub async fn save(&mut self, service: &impl WorkoutPlanService) -> Result<(), UpdateError> {
        let record = service.save_workout_plans(&self.record()).await?;
        self.replace(record);
        Ok(())
    }

    fn replace(&mut self, record: WorkoutPlanRecord) {
        let active_plan = record
            .active_plan
            .filter(|id| record.plans.iter().any(|p| p.id == *id));
        self.plans = record.plans;
        self.active_plan = active_plan;
        self.editing = record.editing;
    }

    fn editing_day(&mut self, day: Weekday) -> Result<&mut DayWorkout, WorkoutPlanError> {
        self.editing
            .as_mut()
            .ok_or(WorkoutPlanError::NotEditing)?
            .plan
            .day_mut(day)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::{FixedClock, Service, StorageError};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
    }

    fn exercise(id: &str) -> WorkoutExercise {
        WorkoutExercise {
            exercise_id: id.to_string(),
            exercise_name: format!("Exercise {id}"),
            sets: 3,
            reps: 10,
            rest_seconds: 90,
            notes: None,
            muscle_group: None,
        }
    }

    fn exercise_ids(store: &WorkoutPlanStore<&FixedClock>, day: Weekday) -> Vec<String> {
        store
            .day_workout(day)
            .unwrap()
            .exercises
            .iter()
            .map(|e| e.exercise_id.clone())
            .collect()
    }

    fn name(name: &str) -> Name {
        Name::new(name).unwrap()
    }

    #[test]
    fn test_default_schedule() {
        let schedule = default_schedule();
        assert_eq!(schedule.len(), 7);
        assert_eq!(schedule[0].day, Weekday::Mon);
        assert_eq!(schedule[6].day, Weekday::Sun);
        assert!(schedule.iter().all(|d| d.is_rest_day && d.label == "Rest Day"));
    }

    #[rstest]
    #[case("Chest", Ok(MuscleGroup::Chest))]
    #[case("full body", Ok(MuscleGroup::FullBody))]
    #[case("Cardio & Core", Ok(MuscleGroup::CardioAndCore))]
    #[case("Neck", Err(UnknownVariantError::new("muscle group", "Neck")))]
    fn test_muscle_group_try_from(
        #[case] value: &str,
        #[case] expected: Result<MuscleGroup, UnknownVariantError>,
    ) {
        assert_eq!(MuscleGroup::try_from(value), expected);
    }

    #[test]
    fn test_muscle_group_display() {
        for muscle_group in MuscleGroup::ALL {
            assert_eq!(
                MuscleGroup::try_from(muscle_group.to_string().as_str()),
                Ok(muscle_group)
            );
        }
    }

    #[test]
    fn test_plan_id() {
        assert!(PlanID::nil().is_nil());
        assert!(!PlanID::random().is_nil());
        assert_ne!(PlanID::random(), PlanID::random());
        assert_eq!(
            PlanID::from("plan_1700000000_ab12cd").to_string(),
            "plan_1700000000_ab12cd"
        );
        assert_eq!(*PlanID::from(String::from("plan_2")), "plan_2");
    }

    #[test]
    fn test_create_plan() {
        let clock = FixedClock::new(t0());
        let mut store = WorkoutPlanStore::with_clock(&clock);
        let id = store.create_plan(name("Push Pull Legs"), Some("6 days".to_string()));

        let plan = store.plan(&id).unwrap();
        assert!(!id.is_nil());
        assert_eq!(plan.name, name("Push Pull Legs"));
        assert_eq!(plan.schedule, default_schedule());
        assert_eq!(plan.created_at, t0());
        assert!(!plan.is_active);
        assert_eq!(store.plans().len(), 1);
    }

    #[test]
    fn test_set_active_plan() {
        let clock = FixedClock::new(t0());
        let mut store = WorkoutPlanStore::with_clock(&clock);
        let a = store.create_plan(name("A"), None);
        let b = store.create_plan(name("B"), None);

        store.set_active_plan(&a).unwrap();
        store.set_active_plan(&b).unwrap();

        assert_eq!(store.active_plan().map(|p| &p.id), Some(&b));
        assert_eq!(
            store.plans().iter().filter(|p| p.is_active).count(),
            1
        );
        assert_eq!(
            store.set_active_plan(&PlanID::from("plan_7")),
            Err(WorkoutPlanError::PlanNotFound)
        );
        assert_eq!(store.active_plan().map(|p| &p.id), Some(&b));
    }

    #[test]
    fn test_delete_plan() {
        let clock = FixedClock::new(t0());
        let mut store = WorkoutPlanStore::with_clock(&clock);
        let a = store.create_plan(name("A"), None);
        let b = store.create_plan(name("B"), None);
        store.set_active_plan(&a).unwrap();

        assert_eq!(store.delete_plan(&b).map(|p| p.id), Ok(b));
        assert_eq!(store.active_plan().map(|p| &p.id), Some(&a));

        assert_eq!(store.delete_plan(&a).map(|p| p.id), Ok(a.clone()));
        assert_eq!(store.active_plan(), None);
        assert!(store.plans().is_empty());

        assert_eq!(
            store.delete_plan(&a).map(|p| p.id),
            Err(WorkoutPlanError::PlanNotFound)
        );
    }

    #[test]
    fn test_rename_plan() {
        let clock = FixedClock::new(t0());
        let mut store = WorkoutPlanStore::with_clock(&clock);
        let id = store.create_plan(name("A"), None);
        clock.advance(Duration::minutes(1));

        store.rename_plan(&id, name("Upper Lower")).unwrap();

        let plan = store.plan(&id).unwrap();
        assert_eq!(plan.name, name("Upper Lower"));
        assert_eq!(plan.created_at, t0());
        assert_eq!(plan.updated_at, t0() + Duration::minutes(1));
        assert_eq!(
            store.rename_plan(&PlanID::from("plan_7"), name("X")),
            Err(WorkoutPlanError::PlanNotFound)
        );
    }

    #[test]
    fn test_edit_new_plan() {
        let clock = FixedClock::new(t0());
        let mut store = WorkoutPlanStore::with_clock(&clock);

        store.start_editing(None).unwrap();
        let editing = store.editing().unwrap();
        assert!(editing.is_new);
        assert!(editing.plan.id.is_nil());
        assert_eq!(editing.plan.name, name("New Workout Plan"));

        store
            .update_day(
                Weekday::Mon,
                "Upper Body Power".to_string(),
                "💪".to_string(),
                vec![MuscleGroup::Chest, MuscleGroup::Triceps],
            )
            .unwrap();
        store
            .add_exercises_to_day(Weekday::Mon, vec![exercise("bench"), exercise("dips")])
            .unwrap();
        assert!(store.plans().is_empty());

        let id = store.save_editing().unwrap();

        assert!(!id.is_nil());
        assert_eq!(store.editing(), None);
        let plan = store.plan(&id).unwrap();
        let monday = plan.day(Weekday::Mon).unwrap();
        assert!(!monday.is_rest_day);
        assert_eq!(monday.label, "Upper Body Power");
        assert_eq!(monday.exercises.len(), 2);
        assert_eq!(plan.training_days(), 1);
    }

    #[test]
    fn test_edit_existing_plan() {
        let clock = FixedClock::new(t0());
        let mut store = WorkoutPlanStore::with_clock(&clock);
        let id = store.create_plan(name("A"), None);
        store.start_editing(Some(&id)).unwrap();
        store.toggle_rest_day(Weekday::Tue).unwrap();
        store.set_active_plan(&id).unwrap();
        clock.advance(Duration::minutes(5));

        assert_eq!(store.save_editing(), Ok(id.clone()));

        let plan = store.plan(&id).unwrap();
        assert_eq!(store.plans().len(), 1);
        assert!(!plan.day(Weekday::Tue).unwrap().is_rest_day);
        assert!(plan.is_active);
        assert_eq!(plan.updated_at, t0() + Duration::minutes(5));
    }

    #[test]
    fn test_cancel_editing() {
        let clock = FixedClock::new(t0());
        let mut store = WorkoutPlanStore::with_clock(&clock);
        let id = store.create_plan(name("A"), None);
        store.start_editing(Some(&id)).unwrap();
        store.toggle_rest_day(Weekday::Tue).unwrap();
        store.cancel_editing();

        assert_eq!(store.editing(), None);
        assert!(store.plan(&id).unwrap().day(Weekday::Tue).unwrap().is_rest_day);
        assert_eq!(store.save_editing(), Err(WorkoutPlanError::NotEditing));
    }

    #[test]
    fn test_save_editing_deleted_plan() {
        let clock = FixedClock::new(t0());
        let mut store = WorkoutPlanStore::with_clock(&clock);
        let id = store.create_plan(name("A"), None);
        store.start_editing(Some(&id)).unwrap();
        store.delete_plan(&id).unwrap();

        assert_eq!(store.save_editing(), Err(WorkoutPlanError::PlanNotFound));
        assert!(store.editing().is_some());
    }

    #[test]
    fn test_start_editing_unknown_plan() {
        let clock = FixedClock::new(t0());
        let mut store = WorkoutPlanStore::with_clock(&clock);
        assert_eq!(
            store.start_editing(Some(&PlanID::from("plan_1"))),
            Err(WorkoutPlanError::PlanNotFound)
        );
        assert_eq!(store.editing(), None);
    }

    #[test]
    fn test_day_operations_require_editing() {
        let clock = FixedClock::new(t0());
        let mut store = WorkoutPlanStore::with_clock(&clock);
        assert_eq!(
            store.toggle_rest_day(Weekday::Mon),
            Err(WorkoutPlanError::NotEditing)
        );
        assert_eq!(
            store.add_exercises_to_day(Weekday::Mon, vec![exercise("bench")]),
            Err(WorkoutPlanError::NotEditing)
        );
        assert_eq!(store.day_workout(Weekday::Mon), None);
    }

    #[test]
    fn test_day_not_found() {
        let clock = FixedClock::new(t0());
        let mut store = WorkoutPlanStore::with_clock(&clock);
        store.start_editing(None).unwrap();
        if let Some(editing) = store.editing.as_mut() {
            editing.plan.schedule.retain(|d| d.day != Weekday::Sun);
        }
        assert_eq!(
            store.toggle_rest_day(Weekday::Sun),
            Err(WorkoutPlanError::DayNotFound)
        );
    }

    #[test]
    fn test_toggle_rest_day() {
        let clock = FixedClock::new(t0());
        let mut store = WorkoutPlanStore::with_clock(&clock);
        store.start_editing(None).unwrap();
        store
            .update_day(
                Weekday::Wed,
                "Legs".to_string(),
                "🦵".to_string(),
                vec![MuscleGroup::Legs],
            )
            .unwrap();
        store
            .add_exercises_to_day(Weekday::Wed, vec![exercise("squat")])
            .unwrap();

        store.toggle_rest_day(Weekday::Wed).unwrap();

        assert_eq!(
            store.day_workout(Weekday::Wed),
            Some(&DayWorkout::rest(Weekday::Wed))
        );

        store.toggle_rest_day(Weekday::Wed).unwrap();

        let day = store.day_workout(Weekday::Wed).unwrap();
        assert!(!day.is_rest_day);
        assert_eq!(day.label, "Rest Day");
        assert!(day.exercises.is_empty());
    }

    #[test]
    fn test_exercise_operations() {
        let clock = FixedClock::new(t0());
        let mut store = WorkoutPlanStore::with_clock(&clock);
        store.start_editing(None).unwrap();
        store
            .add_exercises_to_day(
                Weekday::Fri,
                vec![exercise("a"), exercise("b"), exercise("c")],
            )
            .unwrap();

        store.remove_exercise_from_day(Weekday::Fri, "b").unwrap();
        assert_eq!(exercise_ids(&store, Weekday::Fri), vec!["a", "c"]);

        store
            .update_exercise_in_day(
                Weekday::Fri,
                "c",
                WorkoutExerciseUpdate {
                    sets: Some(5),
                    notes: Some(Some("slow eccentric".to_string())),
                    ..WorkoutExerciseUpdate::default()
                },
            )
            .unwrap();
        let c = &store.day_workout(Weekday::Fri).unwrap().exercises[1];
        assert_eq!(c.sets, 5);
        assert_eq!(c.reps, 10);
        assert_eq!(c.notes.as_deref(), Some("slow eccentric"));

        store
            .reorder_exercises_in_day(Weekday::Fri, vec![exercise("c"), exercise("a")])
            .unwrap();
        assert_eq!(exercise_ids(&store, Weekday::Fri), vec!["c", "a"]);
    }

    #[test]
    fn test_restore_drops_unknown_active_plan() {
        let clock = FixedClock::new(t0());
        let store = WorkoutPlanStore::restore(
            WorkoutPlanRecord {
                plans: vec![],
                active_plan: Some(PlanID::from("plan_1")),
                editing: None,
            },
            &clock,
        );
        assert_eq!(store.record(), WorkoutPlanRecord::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let service = Service::new(FakeWorkoutPlans::default());
        let clock = FixedClock::new(t0());
        let mut store = WorkoutPlanStore::with_clock(&clock);
        let id = store.create_plan(name("A"), None);
        store.set_active_plan(&id).unwrap();

        store.save(&service).await.unwrap();

        let mut other = WorkoutPlanStore::with_clock(&clock);
        other.load(&service).await.unwrap();
        assert_eq!(other.record(), store.record());
        assert_eq!(other.active_plan().map(|p| &p.id), Some(&id));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_state() {
        let service = Service::new(FakeWorkoutPlans {
            offline: true,
            ..FakeWorkoutPlans::default()
        });
        let clock = FixedClock::new(t0());
        let mut store = WorkoutPlanStore::with_clock(&clock);
        store.create_plan(name("A"), None);

        assert!(matches!(
            store.save(&service).await,
            Err(UpdateError::Storage(StorageError::NoConnection))
        ));
        assert_eq!(store.plans().len(), 1);
    }

    #[derive(Default)]
    struct FakeWorkoutPlans {
        offline: bool,
        record: RefCell<WorkoutPlanRecord>,
    }

    impl WorkoutPlanRepository for FakeWorkoutPlans {
        async fn sync_workout_plans(&self) -> Result<WorkoutPlanRecord, SyncError> {
            Ok(self.record.borrow().clone())
        }

        async fn read_workout_plans(&self) -> Result<WorkoutPlanRecord, ReadError> {
            Ok(self.record.borrow().clone())
        }

        async fn save_workout_plans(
            &self,
            record: &WorkoutPlanRecord,
        ) -> Result<WorkoutPlanRecord, UpdateError> {
            if self.offline {
                return Err(StorageError::NoConnection.into());
            }
            *self.record.borrow_mut() = record.clone();
            Ok(record.clone())
        }
    }
}
