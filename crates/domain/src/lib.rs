#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod analysis;
mod clock;
mod error;
mod exercise;
mod name;
mod nutrition;
mod onboarding;
mod quota;
mod service;
mod user;
mod workout_plan;

pub use analysis::{
    AiAnalysis, AnalysisActions, AnalysisID, AnalysisPage, AnalysisRecord, AnalysisRepository,
    AnalysisService, AnalysisStatus, AnalysisStore, AnalysisUpdate, DEFAULT_PAGE_SIZE, NewAnalysis,
    Pagination, Score, ScoreError,
};
pub use clock::{Clock, DEFAULT_MAX_AGE, FixedClock, SystemClock, is_stale};
pub use error::{
    CreateError, DeleteError, ReadError, StorageError, SyncError, UnknownVariantError,
    UpdateError, ValidationError,
};
pub use exercise::{
    Exercise, ExerciseCatalog, ExerciseFilter, ExerciseRepository, ExerciseService, ExerciseSync,
    FilterOptions,
};
pub use name::{Name, NameError};
pub use nutrition::{
    ActivityLevel, BiometricProfile, Gender, GoalType, MacroRatio, MacroTargets, bmr,
    daily_calories, fiber_grams, macro_targets, tdee,
};
pub use onboarding::{
    BodyMetrics, OnboardingData, OnboardingDraft, OnboardingRepository, OnboardingService,
    OnboardingUpdate,
};
pub use quota::{
    Allowance, Freshness, QuotaCheck, QuotaMessage, QuotaMirror, QuotaRecord, QuotaRepository,
    QuotaService, QuotaSnapshot, QuotaState, QuotaUsage,
};
pub use service::Service;
pub use user::{User, UserID, UserRepository, UserService};
pub use workout_plan::{
    DayWorkout, EditingPlan, MuscleGroup, PlanID, WorkoutExercise, WorkoutExerciseUpdate,
    WorkoutPlan, WorkoutPlanError, WorkoutPlanRecord, WorkoutPlanRepository, WorkoutPlanService,
    WorkoutPlanStore, default_schedule,
};
