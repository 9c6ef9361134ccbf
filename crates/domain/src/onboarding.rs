use crate::{
    ActivityLevel, BiometricProfile, Gender, GoalType, MacroTargets, ReadError, SyncError,
    UpdateError, UserID, ValidationError, nutrition::positive,
};

#[allow(async_fn_in_trait)]
pub trait OnboardingService {
    async fn get_onboarding(&self) -> Result<Option<OnboardingData>, ReadError>;
    async fn update_onboarding(
        &self,
        update: OnboardingUpdate,
    ) -> Result<OnboardingData, UpdateError>;
    async fn get_onboarding_draft(&self) -> Result<OnboardingDraft, ReadError>;
    async fn set_onboarding_draft(&self, draft: &OnboardingDraft) -> Result<(), UpdateError>;

    /// Submits everything collected so far and marks the draft as completed.
    async fn complete_onboarding(
        &self,
        draft: &mut OnboardingDraft,
    ) -> Result<OnboardingData, UpdateError> {
        draft.calculate_macros();
        let data = self.update_onboarding(draft.update()).await?;
        draft.complete();
        self.set_onboarding_draft(draft).await?;
        Ok(data)
    }

    async fn is_onboarding_completed(&self) -> bool {
        matches!(
            self.get_onboarding().await,
            Ok(Some(OnboardingData {
                onboarding_completed: true,
                ..
            }))
        )
    }

    fn validate_age(&self, age: &str) -> Result<u32, ValidationError> {
        match age.trim().parse::<u32>() {
            Ok(parsed_age) => {
                if (10..=120).contains(&parsed_age) {
                    Ok(parsed_age)
                } else {
                    Err(ValidationError::Other(
                        "Age must be between 10 and 120 years".into(),
                    ))
                }
            }
            Err(_) => Err(ValidationError::Other("Age must be a whole number".into())),
        }
    }

    fn validate_height_cm(&self, height: &str) -> Result<f64, ValidationError> {
        validate_measurement(height, "Height", "cm")
    }

    fn validate_weight_kg(&self, weight: &str) -> Result<f64, ValidationError> {
        validate_measurement(weight, "Weight", "kg")
    }
}

#[allow(async_fn_in_trait)]
pub trait OnboardingRepository {
    async fn sync_onboarding(&self) -> Result<OnboardingData, SyncError>;
    async fn read_onboarding(&self) -> Result<Option<OnboardingData>, ReadError>;
    async fn update_onboarding(
        &self,
        update: OnboardingUpdate,
    ) -> Result<OnboardingData, UpdateError>;
    async fn read_onboarding_draft(&self) -> Result<OnboardingDraft, ReadError>;
    async fn write_onboarding_draft(&self, draft: &OnboardingDraft) -> Result<(), UpdateError>;
}

/// State of the multi-step onboarding form.
///
/// Biometric inputs are kept as entered, they are only parsed when a profile is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingDraft {
    pub gender: Option<Gender>,
    pub age: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub target_weight: Option<String>,
    pub goal_type: Option<GoalType>,
    pub activity_level: Option<ActivityLevel>,
    pub dietary_preferences: Vec<String>,
    pub meals_per_day: Option<u8>,
    pub macro_targets: Option<MacroTargets>,
    pub is_completed: bool,
    pub current_step: usize,
}

impl Default for OnboardingDraft {
    fn default() -> Self {
        Self {
            gender: None,
            age: None,
            height: None,
            weight: None,
            target_weight: None,
            goal_type: None,
            activity_level: None,
            dietary_preferences: vec![],
            meals_per_day: Some(3),
            macro_targets: None,
            is_completed: false,
            current_step: 0,
        }
    }
}

impl OnboardingDraft {
    pub fn next_step(&mut self) {
        self.current_step += 1;
    }

    pub fn previous_step(&mut self) {
        self.current_step = self.current_step.saturating_sub(1);
    }

    pub fn set_current_step(&mut self, step: usize) {
        self.current_step = step;
    }

    pub fn complete(&mut self) {
        self.is_completed = true;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn profile(&self) -> BiometricProfile {
        BiometricProfile {
            gender: self.gender,
            age_years: self.age.as_deref().and_then(parse_decimal),
            height_cm: self.height.as_deref().and_then(parse_decimal),
            weight_kg: self.weight.as_deref().and_then(parse_decimal),
            target_weight_kg: self.target_weight.as_deref().and_then(parse_decimal),
            activity_level: self.activity_level,
            goal_type: self.goal_type,
        }
    }

    #[must_use]
    pub fn daily_calories(&self) -> Option<u32> {
        self.profile().daily_calories()
    }

    pub fn calculate_macros(&mut self) -> Option<MacroTargets> {
        self.macro_targets = self.profile().macro_targets();
        self.macro_targets
    }

    /// Collects every section that is complete enough to be submitted.
    #[must_use]
    pub fn update(&self) -> OnboardingUpdate {
        let profile = self.profile();
        OnboardingUpdate {
            // The server stores male and female only.
            body_metrics: BodyMetrics::from_profile(&profile)
                .filter(|metrics| metrics.gender != Gender::Unspecified),
            activity_level: self.activity_level,
            goal_type: self.goal_type,
            nutrition_targets: self.macro_targets,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMetrics {
    pub gender: Gender,
    pub age_years: f64,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub target_weight_kg: f64,
}

impl BodyMetrics {
    /// Requires positive finite measurements. Without a valid target weight, the current weight
    /// is used.
    #[must_use]
    pub fn from_profile(profile: &BiometricProfile) -> Option<Self> {
        let weight_kg = positive(profile.weight_kg)?;
        Some(Self {
            gender: profile.gender?,
            age_years: positive(profile.age_years)?,
            height_cm: positive(profile.height_cm)?,
            weight_kg,
            target_weight_kg: positive(profile.target_weight_kg).unwrap_or(weight_kg),
        })
    }
}

/// Partial update, absent sections are left untouched by the server.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OnboardingUpdate {
    pub body_metrics: Option<BodyMetrics>,
    pub activity_level: Option<ActivityLevel>,
    pub goal_type: Option<GoalType>,
    pub nutrition_targets: Option<MacroTargets>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingData {
    pub user_id: UserID,
    pub firebase_uid: String,
    pub email: String,
    pub full_name: String,
    pub onboarding_completed: bool,
    pub body_metrics: Option<BodyMetrics>,
    pub activity_level: Option<ActivityLevel>,
    pub goal_type: Option<GoalType>,
    pub nutrition_targets: Option<MacroTargets>,
}

impl OnboardingData {
    #[must_use]
    pub fn profile(&self) -> BiometricProfile {
        BiometricProfile {
            gender: self.body_metrics.map(|m| m.gender),
            age_years: self.body_metrics.map(|m| m.age_years),
            height_cm: self.body_metrics.map(|m| m.height_cm),
            weight_kg: self.body_metrics.map(|m| m.weight_kg),
            target_weight_kg: self.body_metrics.map(|m| m.target_weight_kg),
            activity_level: self.activity_level,
            goal_type: self.goal_type,
        }
    }
}

fn parse_decimal(value: &str) -> Option<f64> {
    value
        .replace(',', ".")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

fn validate_measurement(value: &str, what: &str, unit: &str) -> Result<f64, ValidationError> {
    match parse_decimal(value) {
        Some(parsed) => {
            if parsed > 0.0 && parsed <= 300.0 {
                Ok(parsed)
            } else {
                Err(ValidationError::Other(
                    format!("{what} must be between 0 and 300 {unit}").into(),
                ))
            }
        }
        None => Err(ValidationError::Other(
            format!("{what} must be a decimal number").into(),
        )),
    }
}
