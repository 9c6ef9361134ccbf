use std::collections::{BTreeMap, BTreeSet};

use crate::{ReadError, SyncError};

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn sync_exercises(&self) -> Result<ExerciseSync, SyncError>;
    async fn force_sync_exercises(&self) -> Result<ExerciseSync, SyncError>;
    async fn get_exercise_catalog(&self) -> Result<ExerciseCatalog, ReadError>;
}

/// The catalog is shared by all users and survives the end of a session.
#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    /// Replaces the local catalog if the server announces a different version.
    async fn sync_exercises(&self) -> Result<ExerciseSync, SyncError>;
    /// Replaces the local catalog regardless of its version.
    async fn force_sync_exercises(&self) -> Result<ExerciseSync, SyncError>;
    async fn read_exercise_catalog(&self) -> Result<ExerciseCatalog, ReadError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub force: Option<String>,
    pub level: Option<String>,
    pub mechanic: Option<String>,
    pub equipment: Option<String>,
    pub category: Option<String>,
    pub primary_muscles: Vec<String>,
    pub secondary_muscles: Vec<String>,
    pub instructions: Vec<String>,
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseSync {
    UpToDate { count: usize },
    Synced { count: usize },
}

impl ExerciseSync {
    #[must_use]
    pub fn count(self) -> usize {
        match self {
            ExerciseSync::UpToDate { count } | ExerciseSync::Synced { count } => count,
        }
    }

    #[must_use]
    pub fn synced(self) -> bool {
        matches!(self, ExerciseSync::Synced { .. })
    }
}

/// All criteria must match. Absent criteria match every exercise.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExerciseFilter {
    pub category: Option<String>,
    pub equipment: Option<String>,
    pub level: Option<String>,
    pub primary_muscle: Option<String>,
}

impl ExerciseFilter {
    fn matches(&self, exercise: &Exercise) -> bool {
        matches_field(self.category.as_deref(), exercise.category.as_deref())
            && matches_field(self.equipment.as_deref(), exercise.equipment.as_deref())
            && matches_field(self.level.as_deref(), exercise.level.as_deref())
            && self.primary_muscle.as_deref().is_none_or(|muscle| {
                exercise
                    .primary_muscles
                    .iter()
                    .any(|m| m.eq_ignore_ascii_case(muscle))
            })
    }
}

fn matches_field(wanted: Option<&str>, actual: Option<&str>) -> bool {
    wanted.is_none_or(|wanted| actual == Some(wanted))
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub equipment: Vec<String>,
    pub levels: Vec<String>,
}

/// Local copy of the exercise catalog, ordered by name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExerciseCatalog {
    version: Option<String>,
    exercises: Vec<Exercise>,
}

impl ExerciseCatalog {
    /// Of several exercises with the same id, the last one is kept.
    #[must_use]
    pub fn new(version: Option<String>, exercises: Vec<Exercise>) -> Self {
        let mut exercises = exercises
            .into_iter()
            .map(|exercise| (exercise.id.clone(), exercise))
            .collect::<BTreeMap<_, _>>()
            .into_values()
            .collect::<Vec<_>>();
        exercises.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Self { version, exercises }
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// An empty catalog is never current.
    #[must_use]
    pub fn is_current(&self, version: &str) -> bool {
        !self.is_empty() && self.version.as_deref() == Some(version)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// Case-insensitive search in the exercise names.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Exercise> {
        let query = query.trim().to_lowercase();
        self.exercises
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&query))
            .collect()
    }

    #[must_use]
    pub fn filter(&self, filter: &ExerciseFilter) -> Vec<&Exercise> {
        self.exercises
            .iter()
            .filter(|e| filter.matches(e))
            .collect()
    }

    #[must_use]
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            categories: distinct(self.exercises.iter().map(|e| e.category.as_ref())),
            equipment: distinct(self.exercises.iter().map(|e| e.equipment.as_ref())),
            levels: distinct(self.exercises.iter().map(|e| e.level.as_ref())),
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a String>>) -> Vec<String> {
    values
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
