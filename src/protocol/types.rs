//! Typed payloads carried inside request and response envelopes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Error;
use crate::validation;

/// Member record returned in `data` by a successful login or sign-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub username: String,

    pub member_id: String,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    /// Date of birth as sent by the server
    #[serde(default)]
    pub dob: Option<String>,

    #[serde(default)]
    pub plan_name: Option<String>,

    #[serde(default)]
    pub duration: Option<String>,

    #[serde(default)]
    pub is_active: bool,
}

/// One entry of `get_active_subscriptions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSubscription {
    pub plan_name: String,

    pub duration: String,

    #[serde(default)]
    pub start_date: Option<String>,

    #[serde(default)]
    pub expiry_date: Option<String>,
}

/// One entry of `get_subscription_plans`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub name: String,

    /// Price per duration label, e.g. `"1 Month" -> 500.0`
    #[serde(default)]
    pub pricing: BTreeMap<String, f64>,
}

impl SubscriptionPlan {
    pub fn price_for(&self, duration: &str) -> Option<f64> {
        self.pricing.get(duration).copied()
    }
}

/// A plan and duration picked by the member, with the price quoted for it
#[derive(Debug, Clone, PartialEq)]
pub struct PlanChoice {
    pub plan_name: String,
    pub duration: String,
    pub price: f64,
}

impl PlanChoice {
    /// Quote `duration` of `plan`; fails when the plan has no such duration.
    pub fn quote(plan: &SubscriptionPlan, duration: &str) -> Result<Self, Error> {
        let price = plan.price_for(duration).ok_or_else(|| {
            Error::validation(format!(
                "Plan '{}' or duration '{}' not found.",
                plan.name, duration
            ))
        })?;
        Ok(Self {
            plan_name: plan.name.clone(),
            duration: duration.to_string(),
            price,
        })
    }
}

/// `data` of a successful `check_member`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStatus {
    #[serde(default)]
    pub is_active: bool,
}

/// A court slot on a given day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourtBooking {
    pub court_name: String,
    /// Slot label as listed by the centre, e.g. `"18:00"`
    pub time: String,
    pub date: NaiveDate,
}

impl CourtBooking {
    /// Date as the server stores it, `dd-MM-yyyy`.
    pub fn date_label(&self) -> String {
        self.date.format("%d-%m-%Y").to_string()
    }
}

/// Outcome of `book_gym_class`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassBooking {
    pub message: String,
    /// The class was full and the member was put on its waitlist.
    pub waitlisted: bool,
}

/// One attended class from `get_workout_history`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutEntry {
    pub class_name: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub date: String,
}

/// Input of the sign-up form
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpForm {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), Error> {
        validation::require_non_empty("First name", &self.first_name)?;
        validation::require_non_empty("Last name", &self.last_name)?;
        validation::require_non_empty("Username", &self.username)?;
        validation::require_non_empty("Password", &self.password)?;
        Ok(())
    }
}

/// Input of the account-edit form; `email` may be empty
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoUpdate {
    pub member_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub username: String,
}

impl UserInfoUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        validation::require_non_empty("First name", &self.first_name)?;
        validation::require_non_empty("Last name", &self.last_name)?;
        validation::require_non_empty("Username", &self.username)?;
        validation::validate_phone(&self.phone_number)?;
        Ok(())
    }
}

/// Personal details collected before subscribing
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub dob: String,
}

impl MemberDetails {
    /// Validate against `today`, returning the parsed date of birth.
    pub fn validate(&self, today: NaiveDate) -> Result<NaiveDate, Error> {
        validation::require_non_empty("First name", &self.first_name)?;
        validation::require_non_empty("Last name", &self.last_name)?;
        validation::validate_phone(&self.phone_number)?;
        validation::validate_dob(&self.dob, today)
    }
}
