//! Cached REST
//!
//! The `REST` server acts as the authoritative data source, while a key-value store serves as a
//! local cache for user-specific data. Cached reads never touch the network. Data modifications
//! are only possible if an active connection to the server is available.

use chrono::{DateTime, Utc};
use fytr_app::Settings;
use fytr_domain as domain;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::key_value::{Key, KeyValueStore};
use crate::local_storage::LocalStorage;
use crate::rest::{self, ConversionError, GlooNetSendRequest, REST, SendRequest, convert};

macro_rules! mirror {
    ($self: ident, $method: ident($($arg: expr),*), $key: expr, $dto: ty, $name: literal) => {{
        let rest_result = $self.rest.$method($($arg),*).await;
        if let Ok(ref result) = rest_result {
            $self.write_cache($key, &<$dto>::from(result), $name);
        }

        Ok(rest_result?)
    }};
}

pub struct CachedREST<S: SendRequest, K: KeyValueStore> {
    pub rest: REST<S>,
    pub cache: K,
}

impl CachedREST<GlooNetSendRequest, LocalStorage> {
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            rest: REST::from_settings(
                GlooNetSendRequest::new(settings.request_timeout()),
                settings,
            ),
            cache: LocalStorage,
        }
    }
}

impl<S: SendRequest, K: KeyValueStore> CachedREST<S, K> {
    pub fn with_cache(rest: REST<S>, cache: K) -> Self {
        Self { rest, cache }
    }

    pub fn set_token(&self, token: Option<String>) {
        self.rest.set_token(token);
    }

    /// A failed cache write does not fail the operation, as the server already holds the data.
    fn write_cache<T: Serialize>(&self, key: Key, value: &T, name: &str) {
        if let Err(err) = self.cache.set(key, value) {
            error!("failed to write {name} into cache: {err}");
        }
    }

    fn update_cached_analyses(&self, update: impl FnOnce(&mut domain::AnalysisStore)) {
        match self.cache.get::<AnalysisRecord>(Key::Analyses) {
            Ok(Some(record)) => match domain::AnalysisRecord::try_from(record) {
                Ok(record) => {
                    let mut store = domain::AnalysisStore::restore(record, domain::SystemClock);
                    update(&mut store);
                    self.write_cache(
                        Key::Analyses,
                        &AnalysisRecord::from(&store.record()),
                        "analyses",
                    );
                }
                Err(err) => error!("failed to convert cached analyses: {err}"),
            },
            Ok(None) => {}
            Err(err) => error!("failed to read analyses from cache: {err}"),
        }
    }
}

impl<S: SendRequest, K: KeyValueStore> domain::UserRepository for CachedREST<S, K> {
    async fn register_user(
        &self,
        full_name: domain::Name,
    ) -> Result<domain::User, domain::CreateError> {
        mirror!(self, register_user(&full_name), Key::User, rest::User, "user")
    }

    async fn login_user(&self) -> Result<domain::User, domain::ReadError> {
        mirror!(self, login_user(), Key::User, rest::User, "user")
    }

    async fn read_user(&self) -> Result<domain::User, domain::ReadError> {
        match self.cache.get::<rest::User>(Key::User) {
            Ok(Some(user)) => Ok(user.into()),
            Ok(None) => Err(domain::StorageError::NoSession.into()),
            Err(err) => Err(domain::StorageError::from(err).into()),
        }
    }

    async fn delete_session(&self) -> Result<(), domain::DeleteError> {
        self.rest.set_token(None);
        for key in Key::SESSION_DEPENDENT {
            self.cache.remove(key).map_err(domain::StorageError::from)?;
        }
        Ok(())
    }
}

impl<S: SendRequest, K: KeyValueStore> domain::OnboardingRepository for CachedREST<S, K> {
    async fn sync_onboarding(&self) -> Result<domain::OnboardingData, domain::SyncError> {
        mirror!(
            self,
            read_onboarding(),
            Key::Onboarding,
            rest::OnboardingData,
            "onboarding"
        )
    }

    async fn read_onboarding(&self) -> Result<Option<domain::OnboardingData>, domain::ReadError> {
        let data = self
            .cache
            .get::<rest::OnboardingData>(Key::Onboarding)
            .map_err(domain::StorageError::from)?;
        Ok(data.map(convert).transpose()?)
    }

    /// The server answers an update without the resulting data, so it is fetched afterwards.
    async fn update_onboarding(
        &self,
        update: domain::OnboardingUpdate,
    ) -> Result<domain::OnboardingData, domain::UpdateError> {
        self.rest.update_onboarding(&update).await?;
        let data = self.rest.read_onboarding().await?;
        self.write_cache(
            Key::Onboarding,
            &rest::OnboardingData::from(&data),
            "onboarding",
        );

        match self.cache.get::<rest::User>(Key::User) {
            Ok(Some(mut user)) if user.onboarding_completed != data.onboarding_completed => {
                user.onboarding_completed = data.onboarding_completed;
                self.write_cache(Key::User, &user, "user");
            }
            Ok(_) => {}
            Err(err) => error!("failed to read user from cache: {err}"),
        }

        Ok(data)
    }

    async fn read_onboarding_draft(&self) -> Result<domain::OnboardingDraft, domain::ReadError> {
        let draft = self
            .cache
            .get::<OnboardingDraft>(Key::OnboardingDraft)
            .map_err(domain::StorageError::from)?;
        match draft {
            Some(draft) => Ok(convert(draft)?),
            None => Ok(domain::OnboardingDraft::default()),
        }
    }

    async fn write_onboarding_draft(
        &self,
        draft: &domain::OnboardingDraft,
    ) -> Result<(), domain::UpdateError> {
        self.cache
            .set(Key::OnboardingDraft, &OnboardingDraft::from(draft))
            .map_err(domain::StorageError::from)?;
        Ok(())
    }
}

impl<S: SendRequest, K: KeyValueStore> domain::QuotaRepository for CachedREST<S, K> {
    async fn read_quota_status(&self) -> Result<domain::QuotaSnapshot, domain::ReadError> {
        self.rest.read_quota_status().await
    }

    async fn check_quota(&self) -> Result<domain::QuotaCheck, domain::ReadError> {
        self.rest.check_quota().await
    }

    async fn increment_quota(&self) -> Result<domain::QuotaUsage, domain::UpdateError> {
        self.rest.increment_quota().await
    }

    async fn read_cached_quota(&self) -> Result<Option<domain::QuotaRecord>, domain::ReadError> {
        let record = self
            .cache
            .get::<QuotaRecord>(Key::Quota)
            .map_err(domain::StorageError::from)?;
        Ok(record.map(Into::into))
    }

    async fn write_cached_quota(
        &self,
        record: &domain::QuotaRecord,
    ) -> Result<(), domain::UpdateError> {
        self.cache
            .set(Key::Quota, &QuotaRecord::from(record))
            .map_err(domain::StorageError::from)?;
        Ok(())
    }
}

impl<S: SendRequest, K: KeyValueStore> domain::AnalysisRepository for CachedREST<S, K> {
    async fn read_analyses(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<domain::AnalysisPage, domain::ReadError> {
        self.rest.read_analyses(page, limit).await
    }

    async fn create_analysis(
        &self,
        analysis: domain::NewAnalysis,
    ) -> Result<domain::AiAnalysis, domain::CreateError> {
        let analysis = self.rest.create_analysis(&analysis).await?;
        self.update_cached_analyses(|store| {
            if store.get(&analysis.id).is_none() {
                store.add_analysis(analysis.clone());
            }
        });
        Ok(analysis)
    }

    async fn delete_analysis(
        &self,
        id: domain::AnalysisID,
    ) -> Result<domain::AnalysisID, domain::DeleteError> {
        self.rest.delete_analysis(&id).await?;
        self.update_cached_analyses(|store| {
            store.remove_analysis(&id);
        });
        Ok(id)
    }

    async fn read_cached_analyses(
        &self,
    ) -> Result<Option<domain::AnalysisRecord>, domain::ReadError> {
        let record = self
            .cache
            .get::<AnalysisRecord>(Key::Analyses)
            .map_err(domain::StorageError::from)?;
        Ok(record.map(convert).transpose()?)
    }

    async fn write_cached_analyses(
        &self,
        record: &domain::AnalysisRecord,
    ) -> Result<(), domain::UpdateError> {
        self.cache
            .set(Key::Analyses, &AnalysisRecord::from(record))
            .map_err(domain::StorageError::from)?;
        Ok(())
    }
}

impl<S: SendRequest, K: KeyValueStore> domain::WorkoutPlanRepository for CachedREST<S, K> {
    async fn sync_workout_plans(&self) -> Result<domain::WorkoutPlanRecord, domain::SyncError> {
        mirror!(
            self,
            read_workout_plans(),
            Key::WorkoutPlans,
            rest::WorkoutPlans,
            "workout plans"
        )
    }

    async fn read_workout_plans(&self) -> Result<domain::WorkoutPlanRecord, domain::ReadError> {
        let plans = self
            .cache
            .get::<rest::WorkoutPlans>(Key::WorkoutPlans)
            .map_err(domain::StorageError::from)?;
        match plans {
            Some(plans) => Ok(convert(plans)?),
            None => Ok(domain::WorkoutPlanRecord::default()),
        }
    }

    async fn save_workout_plans(
        &self,
        record: &domain::WorkoutPlanRecord,
    ) -> Result<domain::WorkoutPlanRecord, domain::UpdateError> {
        mirror!(
            self,
            save_workout_plans(record),
            Key::WorkoutPlans,
            rest::WorkoutPlans,
            "workout plans"
        )
    }
}

impl<S: SendRequest, K: KeyValueStore> domain::ExerciseRepository for CachedREST<S, K> {
    /// A failed version check counts as a changed version.
    async fn sync_exercises(&self) -> Result<domain::ExerciseSync, domain::SyncError> {
        match self.rest.read_exercise_version().await {
            Ok(version) => match self.read_exercise_catalog().await {
                Ok(catalog) if catalog.is_current(&version) => {
                    debug!("exercise catalog {version} is up to date");
                    return Ok(domain::ExerciseSync::UpToDate {
                        count: catalog.len(),
                    });
                }
                Ok(_) => {}
                Err(err) => error!("failed to read exercises from cache: {err}"),
            },
            Err(err) => debug!("failed to check exercise version: {err}"),
        }
        self.force_sync_exercises().await
    }

    /// The version is written last, so an interrupted write is repeated by the next sync.
    async fn force_sync_exercises(&self) -> Result<domain::ExerciseSync, domain::SyncError> {
        let catalog = self.rest.read_exercises().await?;
        let exercises = catalog
            .exercises()
            .iter()
            .map(rest::Exercise::from)
            .collect::<Vec<_>>();
        self.cache
            .set(Key::Exercises, &exercises)
            .map_err(domain::StorageError::from)?;
        self.cache
            .set(Key::ExerciseVersion, &catalog.version())
            .map_err(domain::StorageError::from)?;
        debug!(
            "synced {} exercises of catalog {}",
            catalog.len(),
            catalog.version().unwrap_or_default()
        );
        Ok(domain::ExerciseSync::Synced {
            count: catalog.len(),
        })
    }

    async fn read_exercise_catalog(&self) -> Result<domain::ExerciseCatalog, domain::ReadError> {
        let exercises = self
            .cache
            .get::<Vec<rest::Exercise>>(Key::Exercises)
            .map_err(domain::StorageError::from)?
            .unwrap_or_default()
            .into_iter()
            .map(convert)
            .collect::<Result<Vec<domain::Exercise>, _>>()?;
        let version = self
            .cache
            .get::<Option<String>>(Key::ExerciseVersion)
            .map_err(domain::StorageError::from)?
            .flatten();
        Ok(domain::ExerciseCatalog::new(version, exercises))
    }
}

#[derive(Serialize, Deserialize)]
struct OnboardingDraft {
    gender: Option<String>,
    age: Option<String>,
    height: Option<String>,
    weight: Option<String>,
    target_weight: Option<String>,
    goal_type: Option<String>,
    activity_level: Option<String>,
    dietary_preferences: Vec<String>,
    meals_per_day: Option<u8>,
    macro_targets: Option<rest::NutritionTargets>,
    is_completed: bool,
    current_step: usize,
}

impl TryFrom<OnboardingDraft> for domain::OnboardingDraft {
    type Error = ConversionError;

    fn try_from(value: OnboardingDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            gender: value
                .gender
                .as_deref()
                .map(domain::Gender::try_from)
                .transpose()?,
            age: value.age,
            height: value.height,
            weight: value.weight,
            target_weight: value.target_weight,
            goal_type: value
                .goal_type
                .as_deref()
                .map(domain::GoalType::try_from)
                .transpose()?,
            activity_level: value
                .activity_level
                .as_deref()
                .map(domain::ActivityLevel::try_from)
                .transpose()?,
            dietary_preferences: value.dietary_preferences,
            meals_per_day: value.meals_per_day,
            macro_targets: value
                .macro_targets
                .and_then(rest::NutritionTargets::into_macro_targets),
            is_completed: value.is_completed,
            current_step: value.current_step,
        })
    }
}

impl From<&domain::OnboardingDraft> for OnboardingDraft {
    fn from(value: &domain::OnboardingDraft) -> Self {
        Self {
            gender: value.gender.map(|gender| gender.to_string()),
            age: value.age.clone(),
            height: value.height.clone(),
            weight: value.weight.clone(),
            target_weight: value.target_weight.clone(),
            goal_type: value.goal_type.map(|goal| goal.to_string()),
            activity_level: value.activity_level.map(|level| level.to_string()),
            dietary_preferences: value.dietary_preferences.clone(),
            meals_per_day: value.meals_per_day,
            macro_targets: value
                .macro_targets
                .as_ref()
                .map(rest::NutritionTargets::from),
            is_completed: value.is_completed,
            current_step: value.current_step,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct QuotaRecord {
    state: rest::QuotaStatus,
    last_fetched_at: Option<DateTime<Utc>>,
}

impl From<QuotaRecord> for domain::QuotaRecord {
    fn from(value: QuotaRecord) -> Self {
        Self {
            state: value.state.into(),
            last_fetched_at: value.last_fetched_at,
        }
    }
}

impl From<&domain::QuotaRecord> for QuotaRecord {
    fn from(value: &domain::QuotaRecord) -> Self {
        Self {
            state: rest::QuotaStatus::from(&value.state),
            last_fetched_at: value.last_fetched_at,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct AnalysisRecord {
    analyses: Vec<rest::AiAnalysis>,
    pagination: rest::Pagination,
    last_fetched_at: Option<DateTime<Utc>>,
}

impl TryFrom<AnalysisRecord> for domain::AnalysisRecord {
    type Error = ConversionError;

    fn try_from(value: AnalysisRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            analyses: value
                .analyses
                .into_iter()
                .map(domain::AiAnalysis::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            pagination: value.pagination.into(),
            last_fetched_at: value.last_fetched_at,
        })
    }
}

impl From<&domain::AnalysisRecord> for AnalysisRecord {
    fn from(value: &domain::AnalysisRecord) -> Self {
        Self {
            analyses: value.analyses.iter().map(rest::AiAnalysis::from).collect(),
            pagination: value.pagination.into(),
            last_fetched_at: value.last_fetched_at,
        }
    }
}
