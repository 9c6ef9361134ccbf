use log::{debug, error};

use crate::{
    AiAnalysis, AnalysisID, AnalysisPage, AnalysisRecord, AnalysisRepository, AnalysisService,
    CreateError, DeleteError, ExerciseCatalog, ExerciseRepository, ExerciseService, ExerciseSync,
    Name, NewAnalysis, OnboardingData, OnboardingDraft, OnboardingRepository, OnboardingService,
    OnboardingUpdate, QuotaCheck, QuotaRecord, QuotaRepository, QuotaService, QuotaSnapshot,
    QuotaUsage, ReadError, SyncError, UpdateError, User, UserRepository, UserService,
    WorkoutPlanRecord, WorkoutPlanRepository, WorkoutPlanService,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R> Service<R>
where
    R: OnboardingRepository + WorkoutPlanRepository,
{
    /// Refreshes the locally cached onboarding data and workout plans.
    pub async fn sync(&self) -> Result<(), SyncError> {
        log_on_error!(
            self.repository.sync_onboarding(),
            SyncError,
            "sync",
            "onboarding"
        )?;
        log_on_error!(
            self.repository.sync_workout_plans(),
            SyncError,
            "sync",
            "workout plans"
        )?;
        Ok(())
    }
}

impl<R: UserRepository> UserService for Service<R> {
    async fn register_user(&self, full_name: Name) -> Result<User, CreateError> {
        log_on_error!(
            self.repository.register_user(full_name),
            CreateError,
            "register",
            "user"
        )
    }

    async fn login_user(&self) -> Result<User, ReadError> {
        log_on_error!(self.repository.login_user(), ReadError, "log in", "user")
    }

    async fn get_user(&self) -> Result<User, ReadError> {
        log_on_error!(self.repository.read_user(), ReadError, "get", "user")
    }

    async fn delete_session(&self) -> Result<(), DeleteError> {
        log_on_error!(
            self.repository.delete_session(),
            DeleteError,
            "delete",
            "session"
        )
    }
}

impl<R: OnboardingRepository> OnboardingService for Service<R> {
    async fn get_onboarding(&self) -> Result<Option<OnboardingData>, ReadError> {
        log_on_error!(
            self.repository.read_onboarding(),
            ReadError,
            "get",
            "onboarding"
        )
    }

    async fn update_onboarding(
        &self,
        update: OnboardingUpdate,
    ) -> Result<OnboardingData, UpdateError> {
        log_on_error!(
            self.repository.update_onboarding(update),
            UpdateError,
            "update",
            "onboarding"
        )
    }

    async fn get_onboarding_draft(&self) -> Result<OnboardingDraft, ReadError> {
        log_on_error!(
            self.repository.read_onboarding_draft(),
            ReadError,
            "get",
            "onboarding draft"
        )
    }

    async fn set_onboarding_draft(&self, draft: &OnboardingDraft) -> Result<(), UpdateError> {
        log_on_error!(
            self.repository.write_onboarding_draft(draft),
            UpdateError,
            "set",
            "onboarding draft"
        )
    }
}

impl<R: QuotaRepository> QuotaService for Service<R> {
    async fn get_quota_status(&self) -> Result<QuotaSnapshot, ReadError> {
        log_on_error!(
            self.repository.read_quota_status(),
            ReadError,
            "get",
            "quota status"
        )
    }

    async fn check_quota(&self) -> Result<QuotaCheck, ReadError> {
        log_on_error!(self.repository.check_quota(), ReadError, "check", "quota")
    }

    async fn increment_quota(&self) -> Result<QuotaUsage, UpdateError> {
        log_on_error!(
            self.repository.increment_quota(),
            UpdateError,
            "increment",
            "quota"
        )
    }

    async fn get_cached_quota(&self) -> Result<Option<QuotaRecord>, ReadError> {
        log_on_error!(
            self.repository.read_cached_quota(),
            ReadError,
            "get",
            "cached quota"
        )
    }

    async fn set_cached_quota(&self, record: &QuotaRecord) -> Result<(), UpdateError> {
        log_on_error!(
            self.repository.write_cached_quota(record),
            UpdateError,
            "set",
            "cached quota"
        )
    }
}

impl<R: AnalysisRepository> AnalysisService for Service<R> {
    async fn get_analyses(&self, page: u32, limit: u32) -> Result<AnalysisPage, ReadError> {
        log_on_error!(
            self.repository.read_analyses(page, limit),
            ReadError,
            "get",
            "analyses"
        )
    }

    async fn create_analysis(&self, analysis: NewAnalysis) -> Result<AiAnalysis, CreateError> {
        log_on_error!(
            self.repository.create_analysis(analysis),
            CreateError,
            "create",
            "analysis"
        )
    }

    async fn delete_analysis(&self, id: AnalysisID) -> Result<AnalysisID, DeleteError> {
        log_on_error!(
            self.repository.delete_analysis(id),
            DeleteError,
            "delete",
            "analysis"
        )
    }

    async fn get_cached_analyses(&self) -> Result<Option<AnalysisRecord>, ReadError> {
        log_on_error!(
            self.repository.read_cached_analyses(),
            ReadError,
            "get",
            "cached analyses"
        )
    }

    async fn set_cached_analyses(&self, record: &AnalysisRecord) -> Result<(), UpdateError> {
        log_on_error!(
            self.repository.write_cached_analyses(record),
            UpdateError,
            "set",
            "cached analyses"
        )
    }
}

impl<R: WorkoutPlanRepository> WorkoutPlanService for Service<R> {
    async fn get_workout_plans(&self) -> Result<WorkoutPlanRecord, ReadError> {
        log_on_error!(
            self.repository.read_workout_plans(),
            ReadError,
            "get",
            "workout plans"
        )
    }

    async fn save_workout_plans(
        &self,
        record: &WorkoutPlanRecord,
    ) -> Result<WorkoutPlanRecord, UpdateError> {
        log_on_error!(
            self.repository.save_workout_plans(record),
            UpdateError,
            "save",
            "workout plans"
        )
    }
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn sync_exercises(&self) -> Result<ExerciseSync, SyncError> {
        log_on_error!(
            self.repository.sync_exercises(),
            SyncError,
            "sync",
            "exercises"
        )
    }

    async fn force_sync_exercises(&self) -> Result<ExerciseSync, SyncError> {
        log_on_error!(
            self.repository.force_sync_exercises(),
            SyncError,
            "force sync",
            "exercises"
        )
    }

    async fn get_exercise_catalog(&self) -> Result<ExerciseCatalog, ReadError> {
        log_on_error!(
            self.repository.read_exercise_catalog(),
            ReadError,
            "get",
            "exercise catalog"
        )
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{StorageError, UserID};

    #[tokio::test]
    async fn test_sync() {
        let service = Service::new(FakeRepository::default());
        service.sync().await.unwrap();
        assert_eq!(service.repository().onboarding_syncs.get(), 1);
        assert_eq!(service.repository().workout_plan_syncs.get(), 1);
    }

    #[tokio::test]
    async fn test_sync_stops_at_first_error() {
        let service = Service::new(FakeRepository {
            offline: true,
            ..FakeRepository::default()
        });
        assert!(matches!(
            service.sync().await,
            Err(SyncError::Storage(StorageError::NoConnection))
        ));
        assert_eq!(service.repository().workout_plan_syncs.get(), 0);
    }

    #[derive(Default)]
    struct FakeRepository {
        offline: bool,
        onboarding_syncs: Cell<u32>,
        workout_plan_syncs: Cell<u32>,
    }

    impl OnboardingRepository for FakeRepository {
        async fn sync_onboarding(&self) -> Result<OnboardingData, SyncError> {
            if self.offline {
                return Err(StorageError::NoConnection.into());
            }
            self.onboarding_syncs.set(self.onboarding_syncs.get() + 1);
            Ok(OnboardingData {
                user_id: UserID::from("1"),
                firebase_uid: "firebase-1".to_string(),
                email: "alice@example.com".to_string(),
                full_name: "Alice".to_string(),
                onboarding_completed: false,
                body_metrics: None,
                activity_level: None,
                goal_type: None,
                nutrition_targets: None,
            })
        }

        async fn read_onboarding(&self) -> Result<Option<OnboardingData>, ReadError> {
            unreachable!()
        }

        async fn update_onboarding(
            &self,
            _: OnboardingUpdate,
        ) -> Result<OnboardingData, UpdateError> {
            unreachable!()
        }

        async fn read_onboarding_draft(&self) -> Result<OnboardingDraft, ReadError> {
            unreachable!()
        }

        async fn write_onboarding_draft(&self, _: &OnboardingDraft) -> Result<(), UpdateError> {
            unreachable!()
        }
    }

    impl WorkoutPlanRepository for FakeRepository {
        async fn sync_workout_plans(&self) -> Result<WorkoutPlanRecord, SyncError> {
            self.workout_plan_syncs
                .set(self.workout_plan_syncs.get() + 1);
            Ok(WorkoutPlanRecord::default())
        }

        async fn read_workout_plans(&self) -> Result<WorkoutPlanRecord, ReadError> {
            unreachable!()
        }

        async fn save_workout_plans(
            &self,
            _: &WorkoutPlanRecord,
        ) -> Result<WorkoutPlanRecord, UpdateError> {
            unreachable!()
        }
    }
}
