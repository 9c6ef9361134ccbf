//! Daily energy and macronutrient targets.
//!
//! The basal metabolic rate follows the Mifflin-St Jeor equation (Mifflin et al., 1990). It is
//! scaled by an activity factor and shifted by a goal-specific calorie adjustment. The resulting
//! calories are split into macronutrients by a fixed ratio table.

use std::fmt;

use crate::UnknownVariantError;

const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
const KCAL_PER_GRAM_CARBS: f64 = 4.0;
const KCAL_PER_GRAM_FAT: f64 = 9.0;
const FIBER_GRAMS_PER_1000_KCAL: f64 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Unspecified,
}

impl Gender {
    #[must_use]
    pub fn bmr_offset(self) -> f64 {
        match self {
            Gender::Male => 5.0,
            Gender::Female => -161.0,
            Gender::Unspecified => -78.0,
        }
    }
}

impl TryFrom<&str> for Gender {
    type Error = UnknownVariantError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "unspecified" | "prefer-not-to-say" => Ok(Gender::Unspecified),
            _ => Err(UnknownVariantError::new("gender", value)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Gender::Male => "male",
                Gender::Female => "female",
                Gender::Unspecified => "unspecified",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
    Athlete,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 6] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
        ActivityLevel::Athlete,
    ];

    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive | ActivityLevel::Athlete => 1.9,
        }
    }
}

impl TryFrom<&str> for ActivityLevel {
    type Error = UnknownVariantError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ActivityLevel::ALL
            .into_iter()
            .find(|level| level.to_string() == value.trim())
            .ok_or_else(|| UnknownVariantError::new("activity level", value))
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ActivityLevel::Sedentary => "sedentary",
                ActivityLevel::Light => "light",
                ActivityLevel::Moderate => "moderate",
                ActivityLevel::Active => "active",
                ActivityLevel::VeryActive => "very-active",
                ActivityLevel::Athlete => "athlete",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalType {
    LoseWeight,
    Maintain,
    GainMuscle,
}

impl GoalType {
    pub const ALL: [GoalType; 3] = [GoalType::LoseWeight, GoalType::Maintain, GoalType::GainMuscle];

    #[must_use]
    pub fn calorie_adjustment(self) -> f64 {
        match self {
            GoalType::LoseWeight => -500.0,
            GoalType::Maintain => 0.0,
            GoalType::GainMuscle => 300.0,
        }
    }

    #[must_use]
    pub fn macro_ratio(self) -> MacroRatio {
        match self {
            GoalType::LoseWeight => MacroRatio {
                protein: 0.40,
                carbs: 0.30,
                fat: 0.30,
            },
            GoalType::GainMuscle => MacroRatio {
                protein: 0.30,
                carbs: 0.40,
                fat: 0.30,
            },
            GoalType::Maintain => MacroRatio {
                protein: 0.30,
                carbs: 0.35,
                fat: 0.35,
            },
        }
    }
}

impl TryFrom<&str> for GoalType {
    type Error = UnknownVariantError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        GoalType::ALL
            .into_iter()
            .find(|goal| goal.to_string() == value.trim())
            .ok_or_else(|| UnknownVariantError::new("goal type", value))
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                GoalType::LoseWeight => "lose-weight",
                GoalType::Maintain => "maintain",
                GoalType::GainMuscle => "gain-muscle",
            }
        )
    }
}

/// Fractions of the daily calories assigned to each macronutrient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroRatio {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Biometric inputs of the calculator.
///
/// Every field is optional, as the profile is filled in step by step during onboarding. Numeric
/// values only count as present if they are finite and positive.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BiometricProfile {
    pub gender: Option<Gender>,
    pub age_years: Option<f64>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub target_weight_kg: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub goal_type: Option<GoalType>,
}

impl BiometricProfile {
    #[must_use]
    pub fn daily_calories(&self) -> Option<u32> {
        daily_calories(self)
    }

    #[must_use]
    pub fn macro_targets(&self) -> Option<MacroTargets> {
        macro_targets(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroTargets {
    pub calories_kcal: u32,
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
    pub fiber_g: u32,
}

#[must_use]
pub fn bmr(gender: Gender, weight_kg: f64, height_cm: f64, age_years: f64) -> f64 {
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years + gender.bmr_offset()
}

#[must_use]
pub fn tdee(bmr: f64, activity_level: ActivityLevel) -> f64 {
    bmr * activity_level.multiplier()
}

/// Returns `None` if any input is missing or the result would not be a positive calorie count.
///
/// A missing goal is treated as maintenance.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn daily_calories(profile: &BiometricProfile) -> Option<u32> {
    let bmr = bmr(
        profile.gender?,
        positive(profile.weight_kg)?,
        positive(profile.height_cm)?,
        positive(profile.age_years)?,
    );
    let adjustment = profile
        .goal_type
        .map_or(0.0, GoalType::calorie_adjustment);
    let calories = (tdee(bmr, profile.activity_level?) + adjustment).round();
    if calories < 1.0 || calories > f64::from(u32::MAX) {
        return None;
    }
    Some(calories as u32)
}

/// Returns `None` if the daily calories are undetermined or no goal is set.
///
/// Each macronutrient is rounded independently, so the grams do not add up exactly to the
/// calories.
#[must_use]
pub fn macro_targets(profile: &BiometricProfile) -> Option<MacroTargets> {
    let calories_kcal = daily_calories(profile)?;
    let ratio = profile.goal_type?.macro_ratio();
    let calories = f64::from(calories_kcal);
    Some(MacroTargets {
        calories_kcal,
        protein_g: grams(calories * ratio.protein, KCAL_PER_GRAM_PROTEIN),
        carbs_g: grams(calories * ratio.carbs, KCAL_PER_GRAM_CARBS),
        fat_g: grams(calories * ratio.fat, KCAL_PER_GRAM_FAT),
        fiber_g: fiber_grams(calories_kcal),
    })
}

/// Fiber target, independent of the macro ratio.
#[must_use]
pub fn fiber_grams(calories_kcal: u32) -> u32 {
    grams(FIBER_GRAMS_PER_1000_KCAL * f64::from(calories_kcal), 1000.0)
}

pub(crate) fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn grams(calories: f64, kcal_per_gram: f64) -> u32 {
    (calories / kcal_per_gram).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn profile(
        gender: Gender,
        age_years: f64,
        height_cm: f64,
        weight_kg: f64,
        activity_level: ActivityLevel,
        goal_type: GoalType,
    ) -> BiometricProfile {
        BiometricProfile {
            gender: Some(gender),
            age_years: Some(age_years),
            height_cm: Some(height_cm),
            weight_kg: Some(weight_kg),
            target_weight_kg: Some(weight_kg),
            activity_level: Some(activity_level),
            goal_type: Some(goal_type),
        }
    }

    #[rstest]
    #[case(Gender::Male, 1780.0)]
    #[case(Gender::Female, 1614.0)]
    #[case(Gender::Unspecified, 1697.0)]
    fn test_bmr(#[case] gender: Gender, #[case] expected: f64) {
        assert_approx_eq!(bmr(gender, 80.0, 180.0, 30.0), expected, 1e-9);
    }

    #[test]
    fn test_tdee() {
        assert_approx_eq!(tdee(1780.0, ActivityLevel::Moderate), 2759.0, 1e-6);
        assert_approx_eq!(tdee(1000.0, ActivityLevel::Sedentary), 1200.0, 1e-6);
        assert_approx_eq!(tdee(1000.0, ActivityLevel::Athlete), 1900.0, 1e-6);
    }

    #[rstest]
    #[case::male_moderate_maintain(
        profile(Gender::Male, 30.0, 180.0, 80.0, ActivityLevel::Moderate, GoalType::Maintain),
        MacroTargets { calories_kcal: 2759, protein_g: 207, carbs_g: 241, fat_g: 107, fiber_g: 39 }
    )]
    #[case::female_light_lose_weight(
        profile(Gender::Female, 25.0, 165.0, 60.0, ActivityLevel::Light, GoalType::LoseWeight),
        MacroTargets { calories_kcal: 1350, protein_g: 135, carbs_g: 101, fat_g: 45, fiber_g: 19 }
    )]
    #[case::unspecified_sedentary_gain_muscle(
        profile(Gender::Unspecified, 30.0, 170.0, 70.0, ActivityLevel::Sedentary, GoalType::GainMuscle),
        MacroTargets { calories_kcal: 2141, protein_g: 161, carbs_g: 214, fat_g: 71, fiber_g: 30 }
    )]
    fn test_macro_targets(#[case] profile: BiometricProfile, #[case] expected: MacroTargets) {
        assert_eq!(macro_targets(&profile), Some(expected));
        assert_eq!(profile.daily_calories(), Some(expected.calories_kcal));
    }

    #[test]
    fn test_daily_calories_very_active_equals_athlete() {
        let very_active = profile(
            Gender::Male,
            20.0,
            190.0,
            95.0,
            ActivityLevel::VeryActive,
            GoalType::Maintain,
        );
        let athlete = BiometricProfile {
            activity_level: Some(ActivityLevel::Athlete),
            ..very_active.clone()
        };
        assert_eq!(daily_calories(&very_active), Some(3881));
        assert_eq!(daily_calories(&athlete), Some(3881));
    }

    #[test]
    fn test_daily_calories_goal_adjustment() {
        for gender in [Gender::Male, Gender::Female, Gender::Unspecified] {
            for activity_level in ActivityLevel::ALL {
                let maintain = profile(
                    gender,
                    41.0,
                    172.5,
                    77.3,
                    activity_level,
                    GoalType::Maintain,
                );
                let lose = BiometricProfile {
                    goal_type: Some(GoalType::LoseWeight),
                    ..maintain.clone()
                };
                let gain = BiometricProfile {
                    goal_type: Some(GoalType::GainMuscle),
                    ..maintain.clone()
                };
                let maintain = daily_calories(&maintain).unwrap();
                assert_eq!(daily_calories(&lose).unwrap() + 500, maintain);
                assert_eq!(daily_calories(&gain).unwrap(), maintain + 300);
            }
        }
    }

    #[test]
    fn test_daily_calories_without_goal() {
        let without_goal = BiometricProfile {
            goal_type: None,
            ..profile(
                Gender::Male,
                30.0,
                180.0,
                80.0,
                ActivityLevel::Moderate,
                GoalType::Maintain,
            )
        };
        assert_eq!(daily_calories(&without_goal), Some(2759));
        assert_eq!(macro_targets(&without_goal), None);
    }

    #[rstest]
    #[case::gender(BiometricProfile { gender: None, ..complete() })]
    #[case::age(BiometricProfile { age_years: None, ..complete() })]
    #[case::height(BiometricProfile { height_cm: None, ..complete() })]
    #[case::weight(BiometricProfile { weight_kg: None, ..complete() })]
    #[case::activity_level(BiometricProfile { activity_level: None, ..complete() })]
    #[case::zero_weight(BiometricProfile { weight_kg: Some(0.0), ..complete() })]
    #[case::negative_age(BiometricProfile { age_years: Some(-3.0), ..complete() })]
    #[case::nan_height(BiometricProfile { height_cm: Some(f64::NAN), ..complete() })]
    #[case::infinite_weight(BiometricProfile { weight_kg: Some(f64::INFINITY), ..complete() })]
    fn test_undetermined(#[case] profile: BiometricProfile) {
        assert_eq!(daily_calories(&profile), None);
        assert_eq!(macro_targets(&profile), None);
    }

    #[test]
    fn test_undetermined_if_not_positive() {
        let tiny = profile(
            Gender::Female,
            90.0,
            20.0,
            5.0,
            ActivityLevel::Sedentary,
            GoalType::LoseWeight,
        );
        assert_eq!(daily_calories(&tiny), None);
        assert_eq!(macro_targets(&tiny), None);
    }

    #[test]
    fn test_target_weight_is_not_required() {
        let profile = BiometricProfile {
            target_weight_kg: None,
            ..complete()
        };
        assert!(macro_targets(&profile).is_some());
    }

    #[test]
    fn test_macro_grams_within_rounding_of_ratio() {
        for goal_type in GoalType::ALL {
            for weight_kg in [48.0, 61.5, 77.3, 92.0, 130.0] {
                let profile = profile(
                    Gender::Female,
                    35.0,
                    168.0,
                    weight_kg,
                    ActivityLevel::Active,
                    goal_type,
                );
                let targets = macro_targets(&profile).unwrap();
                let calories = f64::from(targets.calories_kcal);
                let ratio = goal_type.macro_ratio();
                assert!((f64::from(targets.protein_g) - calories * ratio.protein / 4.0).abs() <= 0.5);
                assert!((f64::from(targets.carbs_g) - calories * ratio.carbs / 4.0).abs() <= 0.5);
                assert!((f64::from(targets.fat_g) - calories * ratio.fat / 9.0).abs() <= 0.5);
            }
        }
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1000, 14)]
    #[case(2759, 39)]
    #[case(1035, 14)]
    #[case(1036, 15)]
    fn test_fiber_grams(#[case] calories_kcal: u32, #[case] expected: u32) {
        assert_eq!(fiber_grams(calories_kcal), expected);
    }

    #[rstest]
    #[case("male", Ok(Gender::Male))]
    #[case("Female", Ok(Gender::Female))]
    #[case("prefer-not-to-say", Ok(Gender::Unspecified))]
    #[case("other", Err(UnknownVariantError::new("gender", "other")))]
    fn test_gender_try_from(
        #[case] value: &str,
        #[case] expected: Result<Gender, UnknownVariantError>,
    ) {
        assert_eq!(Gender::try_from(value), expected);
    }

    #[test]
    fn test_activity_level_round_trip_names() {
        for level in ActivityLevel::ALL {
            assert_eq!(ActivityLevel::try_from(level.to_string().as_str()), Ok(level));
        }
        assert_eq!(
            ActivityLevel::try_from("very-active"),
            Ok(ActivityLevel::VeryActive)
        );
        assert!(ActivityLevel::try_from("couch").is_err());
    }

    #[test]
    fn test_goal_type_names() {
        assert_eq!(GoalType::try_from("lose-weight"), Ok(GoalType::LoseWeight));
        assert_eq!(GoalType::try_from("gain-muscle"), Ok(GoalType::GainMuscle));
        assert_eq!(GoalType::Maintain.to_string(), "maintain");
        assert!(GoalType::try_from("bulk").is_err());
    }

    fn complete() -> BiometricProfile {
        profile(
            Gender::Male,
            30.0,
            180.0,
            80.0,
            ActivityLevel::Moderate,
            GoalType::Maintain,
        )
    }
}
