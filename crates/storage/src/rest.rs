//! REST
//!
//! Client for the backend API. Requests are sent through a `SendRequest` implementation, which
//! is `GlooNetSendRequest` in the browser. The wire format lives in this module only. Responses
//! are converted into domain types before they leave it.

use std::{cell::RefCell, pin::pin};

use chrono::{DateTime, Duration, Utc, Weekday};
use futures_util::future::{Either, select};
use fytr_app::Settings;
use fytr_domain as domain;
use gloo_timers::future::TimeoutFuture;
use log::debug;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use strum::AsRefStr;

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, SendError>;
}

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub token: Option<String>,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("no connection")]
    NoConnection,
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Other(String),
}

impl From<SendError> for domain::StorageError {
    fn from(value: SendError) -> Self {
        match value {
            SendError::NoConnection | SendError::Timeout => domain::StorageError::NoConnection,
            SendError::Other(message) => domain::StorageError::Other(message.into()),
        }
    }
}

pub struct GlooNetSendRequest {
    timeout: Duration,
}

impl GlooNetSendRequest {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for GlooNetSendRequest {
    fn default() -> Self {
        Self::new(Settings::default().request_timeout())
    }
}

impl SendRequest for GlooNetSendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, SendError> {
        let builder = match request.method {
            Method::Get => gloo_net::http::Request::get(&request.url),
            Method::Post => gloo_net::http::Request::post(&request.url),
            Method::Put => gloo_net::http::Request::put(&request.url),
            Method::Delete => gloo_net::http::Request::delete(&request.url),
        };
        let builder = match request.token {
            Some(ref token) => builder.header("Authorization", &format!("Bearer {token}")),
            None => builder,
        };
        let http_request = match request.body {
            Some(ref body) => builder.json(body),
            None => builder.build(),
        }
        .map_err(|err| SendError::Other(err.to_string()))?;

        let timeout = TimeoutFuture::new(
            u32::try_from(self.timeout.num_milliseconds().max(0)).unwrap_or(u32::MAX),
        );

        match select(pin!(http_request.send()), timeout).await {
            Either::Left((Ok(response), _)) => Ok(Response {
                status: response.status(),
                body: response
                    .text()
                    .await
                    .map_err(|err| SendError::Other(err.to_string()))?,
            }),
            Either::Left((Err(gloo_net::Error::JsError(err)), _)) => {
                debug!("request failed: {err}");
                Err(SendError::NoConnection)
            }
            Either::Left((Err(err), _)) => Err(SendError::Other(err.to_string())),
            Either::Right(((), _)) => Err(SendError::Timeout),
        }
    }
}

pub struct REST<S> {
    pub(crate) sender: S,
    base_url: String,
    token: RefCell<Option<String>>,
}

impl<S: SendRequest> REST<S> {
    pub fn new(sender: S, base_url: &str) -> Self {
        Self {
            sender,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RefCell::new(None),
        }
    }

    pub fn from_settings(sender: S, settings: &Settings) -> Self {
        Self::new(sender, &settings.api_base_url)
    }

    /// Sets the bearer token issued by the identity provider.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.borrow_mut() = token;
    }

    pub async fn register_user(
        &self,
        full_name: &domain::Name,
    ) -> Result<domain::User, domain::CreateError> {
        let response: UserResponse = self
            .fetch(
                Method::Post,
                "user/register",
                Some(json!({ "full_name": full_name.to_string() })),
            )
            .await?;
        Ok(response.user.into())
    }

    pub async fn login_user(&self) -> Result<domain::User, domain::ReadError> {
        let response: UserResponse = self.fetch(Method::Post, "user/login", None).await?;
        Ok(response.user.into())
    }

    pub async fn read_onboarding(&self) -> Result<domain::OnboardingData, domain::ReadError> {
        let response: OnboardingResponse = self.fetch(Method::Get, "onboarding", None).await?;
        Ok(convert(response.data)?)
    }

    pub async fn update_onboarding(
        &self,
        update: &domain::OnboardingUpdate,
    ) -> Result<(), domain::UpdateError> {
        self.send(
            Method::Put,
            "onboarding",
            Some(to_json(&OnboardingUpdate::from(update))?),
        )
        .await?;
        Ok(())
    }

    pub async fn read_quota_status(&self) -> Result<domain::QuotaSnapshot, domain::ReadError> {
        let status: QuotaStatus = self.fetch(Method::Get, "quota/status", None).await?;
        Ok(status.into())
    }

    pub async fn check_quota(&self) -> Result<domain::QuotaCheck, domain::ReadError> {
        let check: QuotaCheck = self.fetch(Method::Post, "quota/check", None).await?;
        Ok(check.into())
    }

    pub async fn increment_quota(&self) -> Result<domain::QuotaUsage, domain::UpdateError> {
        let usage: QuotaUsage = self.fetch(Method::Post, "quota/increment", None).await?;
        Ok(usage.into())
    }

    pub async fn read_analyses(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<domain::AnalysisPage, domain::ReadError> {
        let response: AnalysesResponse = self
            .fetch(
                Method::Get,
                &format!("analysis?page={page}&limit={limit}"),
                None,
            )
            .await?;
        let analyses = response
            .analyses
            .into_iter()
            .map(convert)
            .collect::<Result<Vec<domain::AiAnalysis>, _>>()?;
        let pagination = match response.pagination {
            Some(pagination) => pagination.into(),
            None => domain::Pagination {
                page,
                limit,
                total: u32::try_from(analyses.len()).unwrap_or(u32::MAX),
                total_pages: page,
            },
        };
        Ok(domain::AnalysisPage {
            analyses,
            pagination,
        })
    }

    pub async fn create_analysis(
        &self,
        analysis: &domain::NewAnalysis,
    ) -> Result<domain::AiAnalysis, domain::CreateError> {
        let response: AnalysisResponse = self
            .fetch(
                Method::Post,
                "analysis",
                Some(to_json(&NewAnalysis::from(analysis))?),
            )
            .await?;
        Ok(convert(response.analysis)?)
    }

    pub async fn delete_analysis(
        &self,
        id: &domain::AnalysisID,
    ) -> Result<(), domain::DeleteError> {
        self.send(Method::Delete, &format!("analysis/{id}"), None)
            .await?;
        Ok(())
    }

    pub async fn read_workout_plans(
        &self,
    ) -> Result<domain::WorkoutPlanRecord, domain::ReadError> {
        let response: WorkoutPlanResponse =
            self.fetch(Method::Get, "workout-plan", None).await?;
        match response.plan {
            Some(plans) => Ok(convert(plans)?),
            None => Ok(domain::WorkoutPlanRecord::default()),
        }
    }

    /// The server may answer without the stored plans, in which case the sent plans are returned.
    pub async fn save_workout_plans(
        &self,
        record: &domain::WorkoutPlanRecord,
    ) -> Result<domain::WorkoutPlanRecord, domain::UpdateError> {
        let response: WorkoutPlanResponse = self
            .fetch(
                Method::Post,
                "workout-plan",
                Some(to_json(&WorkoutPlans::from(record))?),
            )
            .await?;
        match response.plan {
            Some(plans) => Ok(convert(plans)?),
            None => Ok(record.clone()),
        }
    }

    pub async fn read_exercise_version(&self) -> Result<String, domain::ReadError> {
        let response: ExerciseVersionResponse =
            self.fetch(Method::Get, "exercises/version", None).await?;
        Ok(response.version)
    }

    /// Fetches the complete catalog together with its version.
    pub async fn read_exercises(&self) -> Result<domain::ExerciseCatalog, domain::ReadError> {
        let response: ExerciseSyncResponse =
            self.fetch(Method::Get, "exercises/sync", None).await?;
        let exercises = response
            .data
            .into_iter()
            .map(convert)
            .collect::<Result<Vec<domain::Exercise>, _>>()?;
        Ok(domain::ExerciseCatalog::new(
            Some(response.version),
            exercises,
        ))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, domain::StorageError> {
        let response = self.send(method, path, body).await?;
        serde_json::from_str(&response.body).map_err(|err| {
            domain::StorageError::Other(format!("deserialization failed: {err}").into())
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response, domain::StorageError> {
        let request = Request {
            method,
            url: format!("{}/{path}", self.base_url),
            token: self.token.borrow().clone(),
            body,
        };
        debug!("{} {}", request.method.as_ref(), request.url);
        let response = self.sender.send_request(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(error_from_response(&response))
        }
    }
}

fn error_from_response(response: &Response) -> domain::StorageError {
    match response.status {
        401 | 403 => domain::StorageError::NoSession,
        status => {
            let message = serde_json::from_str::<ErrorBody>(&response.body)
                .ok()
                .and_then(|body| body.message);
            domain::StorageError::Other(
                match message {
                    Some(message) => format!("{status} {message}"),
                    None => status.to_string(),
                }
                .into(),
            )
        }
    }
}

fn to_json(value: &impl Serialize) -> Result<serde_json::Value, domain::StorageError> {
    serde_json::to_value(value).map_err(|err| {
        domain::StorageError::Other(format!("serialization failed: {err}").into())
    })
}

pub(crate) fn convert<T, U>(value: T) -> Result<U, domain::StorageError>
where
    U: TryFrom<T, Error = ConversionError>,
{
    U::try_from(value).map_err(|err| domain::StorageError::Other(Box::new(err)))
}

#[derive(thiserror::Error, Debug)]
pub enum ConversionError {
    #[error(transparent)]
    UnknownVariant(#[from] domain::UnknownVariantError),
    #[error(transparent)]
    Score(#[from] domain::ScoreError),
    #[error(transparent)]
    Name(#[from] domain::NameError),
    #[error("invalid {0}")]
    Invalid(&'static str),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct UserResponse {
    user: User,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub firebase_uid: String,
    pub email: String,
    pub full_name: String,
    pub onboarding_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for domain::User {
    fn from(value: User) -> Self {
        Self {
            id: value.id.into(),
            firebase_uid: value.firebase_uid,
            email: value.email,
            full_name: value.full_name,
            onboarding_completed: value.onboarding_completed,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<&domain::User> for User {
    fn from(value: &domain::User) -> Self {
        Self {
            id: value.id.to_string(),
            firebase_uid: value.firebase_uid.clone(),
            email: value.email.clone(),
            full_name: value.full_name.clone(),
            onboarding_completed: value.onboarding_completed,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Deserialize)]
struct OnboardingResponse {
    data: OnboardingData,
}

/// The server builds this object from nullable columns, so every field may be `null`.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct BodyMetrics {
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub target_weight_kg: Option<f64>,
}

impl BodyMetrics {
    /// Returns `None` until gender, age, height and weight are all stored.
    ///
    /// A missing target weight defaults to the current weight.
    pub fn into_body_metrics(self) -> Result<Option<domain::BodyMetrics>, ConversionError> {
        let gender = self
            .gender
            .as_deref()
            .map(domain::Gender::try_from)
            .transpose()?;
        let (Some(gender), Some(age_years), Some(height_cm), Some(weight_kg)) =
            (gender, self.age, self.height_cm, self.weight_kg)
        else {
            return Ok(None);
        };
        Ok(Some(domain::BodyMetrics {
            gender,
            age_years,
            height_cm,
            weight_kg,
            target_weight_kg: self.target_weight_kg.unwrap_or(weight_kg),
        }))
    }
}

impl From<&domain::BodyMetrics> for BodyMetrics {
    fn from(value: &domain::BodyMetrics) -> Self {
        Self {
            gender: Some(value.gender.to_string()),
            age: Some(value.age_years),
            height_cm: Some(value.height_cm),
            weight_kg: Some(value.weight_kg),
            target_weight_kg: Some(value.target_weight_kg),
        }
    }
}

/// Every field may be `null`. A missing fiber value is derived from the calories.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct NutritionTargets {
    #[serde(default)]
    pub calories: Option<u32>,
    #[serde(default)]
    pub protein_g: Option<u32>,
    #[serde(default)]
    pub carbs_g: Option<u32>,
    #[serde(default)]
    pub fat_g: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber_g: Option<u32>,
}

impl NutritionTargets {
    /// Returns `None` until calories and all macros are stored.
    #[must_use]
    pub fn into_macro_targets(self) -> Option<domain::MacroTargets> {
        let (Some(calories_kcal), Some(protein_g), Some(carbs_g), Some(fat_g)) =
            (self.calories, self.protein_g, self.carbs_g, self.fat_g)
        else {
            return None;
        };
        Some(domain::MacroTargets {
            calories_kcal,
            protein_g,
            carbs_g,
            fat_g,
            fiber_g: self
                .fiber_g
                .unwrap_or_else(|| domain::fiber_grams(calories_kcal)),
        })
    }
}

impl From<&domain::MacroTargets> for NutritionTargets {
    fn from(value: &domain::MacroTargets) -> Self {
        Self {
            calories: Some(value.calories_kcal),
            protein_g: Some(value.protein_g),
            carbs_g: Some(value.carbs_g),
            fat_g: Some(value.fat_g),
            fiber_g: Some(value.fiber_g),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OnboardingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_metrics: Option<BodyMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition_targets: Option<NutritionTargets>,
}

impl From<&domain::OnboardingUpdate> for OnboardingUpdate {
    fn from(value: &domain::OnboardingUpdate) -> Self {
        Self {
            body_metrics: value.body_metrics.as_ref().map(BodyMetrics::from),
            activity_level: value.activity_level.map(|level| level.to_string()),
            goal_type: value.goal_type.map(|goal| goal.to_string()),
            nutrition_targets: value.nutrition_targets.as_ref().map(NutritionTargets::from),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OnboardingData {
    pub id: String,
    pub firebase_uid: String,
    pub email: String,
    pub full_name: String,
    pub onboarding_completed: bool,
    #[serde(default)]
    pub body_metrics: Option<BodyMetrics>,
    #[serde(default)]
    pub activity_level: Option<String>,
    #[serde(default)]
    pub goal_type: Option<String>,
    #[serde(default)]
    pub nutrition_targets: Option<NutritionTargets>,
}

impl TryFrom<OnboardingData> for domain::OnboardingData {
    type Error = ConversionError;

    fn try_from(value: OnboardingData) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: value.id.into(),
            firebase_uid: value.firebase_uid,
            email: value.email,
            full_name: value.full_name,
            onboarding_completed: value.onboarding_completed,
            body_metrics: value
                .body_metrics
                .map(BodyMetrics::into_body_metrics)
                .transpose()?
                .flatten(),
            activity_level: value
                .activity_level
                .as_deref()
                .map(domain::ActivityLevel::try_from)
                .transpose()?,
            goal_type: value
                .goal_type
                .as_deref()
                .map(domain::GoalType::try_from)
                .transpose()?,
            nutrition_targets: value
                .nutrition_targets
                .and_then(NutritionTargets::into_macro_targets),
        })
    }
}

impl From<&domain::OnboardingData> for OnboardingData {
    fn from(value: &domain::OnboardingData) -> Self {
        Self {
            id: value.user_id.to_string(),
            firebase_uid: value.firebase_uid.clone(),
            email: value.email.clone(),
            full_name: value.full_name.clone(),
            onboarding_completed: value.onboarding_completed,
            body_metrics: value.body_metrics.as_ref().map(BodyMetrics::from),
            activity_level: value.activity_level.map(|level| level.to_string()),
            goal_type: value.goal_type.map(|goal| goal.to_string()),
            nutrition_targets: value.nutrition_targets.as_ref().map(NutritionTargets::from),
        }
    }
}

/// Limits and remaining analyses use `-1` for unlimited.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub limit: i64,
    pub used: u32,
    pub remaining: i64,
    pub is_paid: bool,
    #[serde(default)]
    pub reset_time: Option<DateTime<Utc>>,
}

impl From<QuotaStatus> for domain::QuotaSnapshot {
    fn from(value: QuotaStatus) -> Self {
        Self {
            limit: allowance(value.limit),
            used: value.used,
            remaining: allowance(value.remaining),
            is_paid: value.is_paid,
            reset_time: value.reset_time,
        }
    }
}

impl From<QuotaStatus> for domain::QuotaState {
    fn from(value: QuotaStatus) -> Self {
        domain::QuotaSnapshot::from(value).into()
    }
}

impl From<&domain::QuotaState> for QuotaStatus {
    fn from(value: &domain::QuotaState) -> Self {
        Self {
            limit: sentinel(value.limit),
            used: value.used,
            remaining: sentinel(value.remaining),
            is_paid: value.is_paid,
            reset_time: value.reset_time,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaCheck {
    pub allowed: bool,
    #[serde(flatten)]
    pub status: QuotaStatus,
}

impl From<QuotaCheck> for domain::QuotaCheck {
    fn from(value: QuotaCheck) -> Self {
        Self {
            allowed: value.allowed,
            snapshot: value.status.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuotaUsage {
    pub limit: i64,
    pub used: u32,
    pub remaining: i64,
    pub is_paid: bool,
}

impl From<QuotaUsage> for domain::QuotaUsage {
    fn from(value: QuotaUsage) -> Self {
        Self {
            limit: allowance(value.limit),
            used: value.used,
            remaining: allowance(value.remaining),
            is_paid: value.is_paid,
        }
    }
}

fn allowance(value: i64) -> domain::Allowance {
    if value < 0 {
        domain::Allowance::Unlimited
    } else {
        domain::Allowance::Limited(u32::try_from(value).unwrap_or(u32::MAX))
    }
}

fn sentinel(allowance: domain::Allowance) -> i64 {
    match allowance {
        domain::Allowance::Unlimited => -1,
        domain::Allowance::Limited(value) => i64::from(value),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Deserialize)]
struct AnalysesResponse {
    #[serde(default)]
    analyses: Vec<AiAnalysis>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Deserialize)]
struct AnalysisResponse {
    analysis: AiAnalysis,
}

/// Optional text and list fields may be missing or `null`. Both read as empty.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub id: String,
    pub exercise: String,
    pub recorded_at: DateTime<Utc>,
    pub duration_seconds: u32,
    pub score: u32,
    pub verdict: String,
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub video_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub positives: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub improvements: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ai_coach_tip: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: AnalysisActions,
}

impl TryFrom<AiAnalysis> for domain::AiAnalysis {
    type Error = ConversionError;

    fn try_from(value: AiAnalysis) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            exercise: value.exercise,
            recorded_at: value.recorded_at,
            duration_seconds: value.duration_seconds,
            score: domain::Score::new(value.score)?,
            verdict: value.verdict,
            status: domain::AnalysisStatus::try_from(value.status.as_str())?,
            video_url: value.video_url,
            positives: value.positives,
            improvements: value.improvements,
            ai_coach_tip: value.ai_coach_tip,
            actions: value.actions.into(),
        })
    }
}

impl From<&domain::AiAnalysis> for AiAnalysis {
    fn from(value: &domain::AiAnalysis) -> Self {
        Self {
            id: value.id.to_string(),
            exercise: value.exercise.clone(),
            recorded_at: value.recorded_at,
            duration_seconds: value.duration_seconds,
            score: u32::from(*value.score),
            verdict: value.verdict.clone(),
            status: value.status.to_string(),
            video_url: value.video_url.clone(),
            positives: value.positives.clone(),
            improvements: value.improvements.clone(),
            ai_coach_tip: value.ai_coach_tip.clone(),
            actions: value.actions.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisActions {
    pub can_save: bool,
    pub can_delete: bool,
    pub is_current: bool,
}

impl From<AnalysisActions> for domain::AnalysisActions {
    fn from(value: AnalysisActions) -> Self {
        Self {
            can_save: value.can_save,
            can_delete: value.can_delete,
            is_current: value.is_current,
        }
    }
}

impl From<domain::AnalysisActions> for AnalysisActions {
    fn from(value: domain::AnalysisActions) -> Self {
        Self {
            can_save: value.can_save,
            can_delete: value.can_delete,
            is_current: value.is_current,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewAnalysis {
    pub exercise: String,
    pub recorded_at: DateTime<Utc>,
    pub duration_seconds: u32,
    pub score: u32,
    pub verdict: String,
    pub status: String,
    pub video_url: String,
    pub positives: Vec<String>,
    pub improvements: Vec<String>,
    pub ai_coach_tip: String,
}

impl From<&domain::NewAnalysis> for NewAnalysis {
    fn from(value: &domain::NewAnalysis) -> Self {
        Self {
            exercise: value.exercise.clone(),
            recorded_at: value.recorded_at,
            duration_seconds: value.duration_seconds,
            score: u32::from(*value.score),
            verdict: value.verdict.clone(),
            status: value.status.to_string(),
            video_url: value.video_url.clone(),
            positives: value.positives.clone(),
            improvements: value.improvements.clone(),
            ai_coach_tip: value.ai_coach_tip.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
    pub total_pages: u32,
}

impl From<Pagination> for domain::Pagination {
    fn from(value: Pagination) -> Self {
        Self {
            page: value.page,
            limit: value.limit,
            total: value.total,
            total_pages: value.total_pages,
        }
    }
}

impl From<domain::Pagination> for Pagination {
    fn from(value: domain::Pagination) -> Self {
        Self {
            page: value.page,
            limit: value.limit,
            total: value.total,
            total_pages: value.total_pages,
        }
    }
}

#[derive(Deserialize)]
struct WorkoutPlanResponse {
    #[serde(default)]
    plan: Option<WorkoutPlans>,
}

/// The active and the edited plan are transferred as complete plans.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlans {
    #[serde(default)]
    pub plans: Vec<WorkoutPlan>,
    #[serde(default)]
    pub active_plan: Option<WorkoutPlan>,
    #[serde(default)]
    pub current_editing_plan: Option<WorkoutPlan>,
}

impl TryFrom<WorkoutPlans> for domain::WorkoutPlanRecord {
    type Error = ConversionError;

    fn try_from(value: WorkoutPlans) -> Result<Self, Self::Error> {
        let plans = value
            .plans
            .into_iter()
            .map(domain::WorkoutPlan::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let editing = match value.current_editing_plan {
            Some(plan) => {
                let plan = domain::WorkoutPlan::try_from(plan)?;
                Some(domain::EditingPlan {
                    is_new: plans.iter().all(|p| p.id != plan.id),
                    plan,
                })
            }
            None => None,
        };
        Ok(Self {
            active_plan: value.active_plan.map(|plan| plan.id.into()),
            plans,
            editing,
        })
    }
}

impl From<&domain::WorkoutPlanRecord> for WorkoutPlans {
    fn from(value: &domain::WorkoutPlanRecord) -> Self {
        Self {
            plans: value.plans.iter().map(WorkoutPlan::from).collect(),
            active_plan: value
                .active_plan
                .as_ref()
                .and_then(|id| value.plans.iter().find(|plan| plan.id == *id))
                .map(WorkoutPlan::from),
            current_editing_plan: value
                .editing
                .as_ref()
                .map(|editing| WorkoutPlan::from(&editing.plan)),
        }
    }
}

/// Timestamps are milliseconds since the Unix epoch. Ids are opaque strings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schedule: Vec<DayWorkout>,
    pub created_at: i64,
    pub updated_at: i64,
    pub is_active: bool,
}

impl TryFrom<WorkoutPlan> for domain::WorkoutPlan {
    type Error = ConversionError;

    fn try_from(value: WorkoutPlan) -> Result<Self, Self::Error> {
        if value.id.is_empty() {
            return Err(ConversionError::Invalid("plan id"));
        }
        Ok(Self {
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
            description: value.description,
            schedule: value
                .schedule
                .into_iter()
                .map(domain::DayWorkout::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            created_at: DateTime::from_timestamp_millis(value.created_at)
                .ok_or(ConversionError::Invalid("creation time"))?,
            updated_at: DateTime::from_timestamp_millis(value.updated_at)
                .ok_or(ConversionError::Invalid("update time"))?,
            is_active: value.is_active,
        })
    }
}

impl From<&domain::WorkoutPlan> for WorkoutPlan {
    fn from(value: &domain::WorkoutPlan) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.to_string(),
            description: value.description.clone(),
            schedule: value.schedule.iter().map(DayWorkout::from).collect(),
            created_at: value.created_at.timestamp_millis(),
            updated_at: value.updated_at.timestamp_millis(),
            is_active: value.is_active,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DayWorkout {
    pub day: String,
    pub label: String,
    pub icon: String,
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
    pub is_rest_day: bool,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
}

impl TryFrom<DayWorkout> for domain::DayWorkout {
    type Error = ConversionError;

    fn try_from(value: DayWorkout) -> Result<Self, Self::Error> {
        Ok(Self {
            day: value
                .day
                .parse::<Weekday>()
                .map_err(|_| ConversionError::Invalid("weekday"))?,
            label: value.label,
            icon: value.icon,
            exercises: value.exercises.into_iter().map(Into::into).collect(),
            is_rest_day: value.is_rest_day,
            muscle_groups: value
                .muscle_groups
                .iter()
                .map(|muscle_group| domain::MuscleGroup::try_from(muscle_group.as_str()))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

impl From<&domain::DayWorkout> for DayWorkout {
    fn from(value: &domain::DayWorkout) -> Self {
        Self {
            day: weekday_name(value.day).to_string(),
            label: value.label.clone(),
            icon: value.icon.clone(),
            exercises: value.exercises.iter().map(WorkoutExercise::from).collect(),
            is_rest_day: value.is_rest_day,
            muscle_groups: value
                .muscle_groups
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    pub exercise_id: String,
    pub exercise_name: String,
    pub sets: u32,
    pub reps: u32,
    pub rest_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<String>,
}

impl From<WorkoutExercise> for domain::WorkoutExercise {
    fn from(value: WorkoutExercise) -> Self {
        Self {
            exercise_id: value.exercise_id,
            exercise_name: value.exercise_name,
            sets: value.sets,
            reps: value.reps,
            rest_seconds: value.rest_seconds,
            notes: value.notes,
            muscle_group: value.muscle_group,
        }
    }
}

impl From<&domain::WorkoutExercise> for WorkoutExercise {
    fn from(value: &domain::WorkoutExercise) -> Self {
        Self {
            exercise_id: value.exercise_id.clone(),
            exercise_name: value.exercise_name.clone(),
            sets: value.sets,
            reps: value.reps,
            rest_seconds: value.rest_seconds,
            notes: value.notes.clone(),
            muscle_group: value.muscle_group.clone(),
        }
    }
}

#[derive(Deserialize)]
struct ExerciseVersionResponse {
    version: String,
}

#[derive(Deserialize)]
struct ExerciseSyncResponse {
    version: String,
    data: Vec<Exercise>,
}

/// Columns of the catalog table. Unknown columns are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub force: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub mechanic: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub primary_muscles: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub secondary_muscles: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instructions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_urls: Vec<String>,
}

impl TryFrom<Exercise> for domain::Exercise {
    type Error = ConversionError;

    fn try_from(value: Exercise) -> Result<Self, Self::Error> {
        if value.id.is_empty() {
            return Err(ConversionError::Invalid("exercise id"));
        }
        Ok(Self {
            id: value.id,
            name: value.name,
            force: value.force,
            level: value.level,
            mechanic: value.mechanic,
            equipment: value.equipment,
            category: value.category,
            primary_muscles: value.primary_muscles,
            secondary_muscles: value.secondary_muscles,
            instructions: value.instructions,
            image_urls: value.image_urls,
        })
    }
}

impl From<&domain::Exercise> for Exercise {
    fn from(value: &domain::Exercise) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
            force: value.force.clone(),
            level: value.level.clone(),
            mechanic: value.mechanic.clone(),
            equipment: value.equipment.clone(),
            category: value.category.clone(),
            primary_muscles: value.primary_muscles.clone(),
            secondary_muscles: value.secondary_muscles.clone(),
            instructions: value.instructions.clone(),
            image_urls: value.image_urls.clone(),
        }
    }
}
