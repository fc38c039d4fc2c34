//! Wire envelopes exchanged with the club server
//!
//! Every exchange is one JSON object per line: a request carrying an
//! `action` discriminator plus action-specific fields, answered by a
//! response carrying `status`, `message` and an optional payload.

mod types;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

use crate::error::Error;

pub use types::*;

/// Server-side operation requested by a [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "login")]
    Login,
    #[serde(rename = "signUp")]
    SignUp,
    #[serde(rename = "forgotPassword")]
    ForgotPassword,
    #[serde(rename = "get_padel_centers")]
    GetPadelCenters,
    #[serde(rename = "get_classes")]
    GetClasses,
    #[serde(rename = "save_padel_center")]
    SavePadelCenter,
    #[serde(rename = "save_gym_class")]
    SaveGymClass,
    #[serde(rename = "update_padel_center")]
    UpdatePadelCenter,
    #[serde(rename = "update_gym_class")]
    UpdateGymClass,
    #[serde(rename = "delete_padel_center")]
    DeletePadelCenter,
    #[serde(rename = "delete_gym_class")]
    DeleteGymClass,
    #[serde(rename = "get_active_subscriptions")]
    GetActiveSubscriptions,
    #[serde(rename = "update_user_info")]
    UpdateUserInfo,
    #[serde(rename = "subscribe_plan")]
    SubscribePlan,
    #[serde(rename = "get_subscription_plans")]
    GetSubscriptionPlans,
    #[serde(rename = "book_padel_court")]
    BookPadelCourt,
    #[serde(rename = "cancel_padel_booking")]
    CancelPadelBooking,
    #[serde(rename = "book_gym_class")]
    BookGymClass,
    #[serde(rename = "cancel_gym_class")]
    CancelGymClass,
    #[serde(rename = "get_workout_history")]
    GetWorkoutHistory,
    #[serde(rename = "clear_workout_history")]
    ClearWorkoutHistory,
    #[serde(rename = "cancel_membership")]
    CancelMembership,
    #[serde(rename = "renew_subscription")]
    RenewSubscription,
    #[serde(rename = "check_member")]
    CheckMember,
    #[serde(rename = "add_member")]
    AddMember,
    #[serde(rename = "subscribe")]
    Subscribe,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Login => "login",
            Action::SignUp => "signUp",
            Action::ForgotPassword => "forgotPassword",
            Action::GetPadelCenters => "get_padel_centers",
            Action::GetClasses => "get_classes",
            Action::SavePadelCenter => "save_padel_center",
            Action::SaveGymClass => "save_gym_class",
            Action::UpdatePadelCenter => "update_padel_center",
            Action::UpdateGymClass => "update_gym_class",
            Action::DeletePadelCenter => "delete_padel_center",
            Action::DeleteGymClass => "delete_gym_class",
            Action::GetActiveSubscriptions => "get_active_subscriptions",
            Action::UpdateUserInfo => "update_user_info",
            Action::SubscribePlan => "subscribe_plan",
            Action::GetSubscriptionPlans => "get_subscription_plans",
            Action::BookPadelCourt => "book_padel_court",
            Action::CancelPadelBooking => "cancel_padel_booking",
            Action::BookGymClass => "book_gym_class",
            Action::CancelGymClass => "cancel_gym_class",
            Action::GetWorkoutHistory => "get_workout_history",
            Action::ClearWorkoutHistory => "clear_workout_history",
            Action::CancelMembership => "cancel_membership",
            Action::RenewSubscription => "renew_subscription",
            Action::CheckMember => "check_member",
            Action::AddMember => "add_member",
            Action::Subscribe => "subscribe",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which catalogue a manager edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalogue {
    PadelCenters,
    GymClasses,
}

/// Request envelope, serialized flat as `{"action": ..., <fields>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub action: Action,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Request {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            fields: Map::new(),
        }
    }

    /// Add or replace an action-specific field
    pub fn field<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn login(username: &str, password: &str) -> Self {
        Self::new(Action::Login)
            .field("username", username)
            .field("password", password)
    }

    pub fn sign_up(form: &SignUpForm) -> Self {
        Self::new(Action::SignUp)
            .field("firstName", form.first_name.as_str())
            .field("lastName", form.last_name.as_str())
            .field("username", form.username.as_str())
            .field("password", form.password.as_str())
    }

    pub fn forgot_password(username: &str) -> Self {
        Self::new(Action::ForgotPassword).field("username", username)
    }

    pub fn get_padel_centers() -> Self {
        Self::new(Action::GetPadelCenters)
    }

    pub fn get_classes() -> Self {
        Self::new(Action::GetClasses)
    }

    pub fn get_subscription_plans() -> Self {
        Self::new(Action::GetSubscriptionPlans)
    }

    pub fn list(catalogue: Catalogue) -> Self {
        match catalogue {
            Catalogue::PadelCenters => Self::get_padel_centers(),
            Catalogue::GymClasses => Self::get_classes(),
        }
    }

    /// `save_padel_center` / `save_gym_class` with the item under `data`
    pub fn save(catalogue: Catalogue, item: Value) -> Self {
        let action = match catalogue {
            Catalogue::PadelCenters => Action::SavePadelCenter,
            Catalogue::GymClasses => Action::SaveGymClass,
        };
        Self::new(action).field("data", item)
    }

    /// `update_padel_center` / `update_gym_class` with `oldData` and `newData`
    pub fn update(catalogue: Catalogue, old: Value, new: Value) -> Self {
        let action = match catalogue {
            Catalogue::PadelCenters => Action::UpdatePadelCenter,
            Catalogue::GymClasses => Action::UpdateGymClass,
        };
        Self::new(action).field("oldData", old).field("newData", new)
    }

    /// `delete_padel_center` / `delete_gym_class` with the item under `data`
    pub fn delete(catalogue: Catalogue, item: Value) -> Self {
        let action = match catalogue {
            Catalogue::PadelCenters => Action::DeletePadelCenter,
            Catalogue::GymClasses => Action::DeleteGymClass,
        };
        Self::new(action).field("data", item)
    }

    pub fn get_active_subscriptions(member_id: &str) -> Self {
        Self::new(Action::GetActiveSubscriptions).field("memberId", member_id)
    }

    pub fn update_user_info(update: &UserInfoUpdate) -> Self {
        Self::new(Action::UpdateUserInfo)
            .field("memberId", update.member_id.as_str())
            .field("firstName", update.first_name.as_str())
            .field("lastName", update.last_name.as_str())
            .field("email", update.email.as_str())
            .field("phoneNumber", update.phone_number.as_str())
            .field("username", update.username.as_str())
    }

    pub fn subscribe_plan(member_id: &str, plan_name: &str, duration: &str) -> Self {
        Self::new(Action::SubscribePlan)
            .field("memberId", member_id)
            .field("planName", plan_name)
            .field("duration", duration)
    }

    /// Court reservation; `memberName` is what the court schedule displays.
    pub fn book_padel_court(member_id: &str, member_name: &str, booking: &CourtBooking) -> Self {
        Self::new(Action::BookPadelCourt).field(
            "data",
            json!({
                "courtName": booking.court_name,
                "time": booking.time,
                "memberId": member_id,
                "memberName": member_name,
                "date": booking.date_label(),
            }),
        )
    }

    pub fn cancel_padel_booking(member_id: &str, booking: &CourtBooking) -> Self {
        Self::new(Action::CancelPadelBooking).field(
            "data",
            json!({
                "courtName": booking.court_name,
                "time": booking.time,
                "memberId": member_id,
                "date": booking.date_label(),
            }),
        )
    }

    pub fn book_gym_class(member_id: &str, class_name: &str) -> Self {
        Self::new(Action::BookGymClass)
            .field("data", json!({"className": class_name, "memberId": member_id}))
    }

    pub fn cancel_gym_class(member_id: &str, class_name: &str) -> Self {
        Self::new(Action::CancelGymClass)
            .field("data", json!({"className": class_name, "memberId": member_id}))
    }

    pub fn get_workout_history(member_id: &str) -> Self {
        Self::new(Action::GetWorkoutHistory).field("memberId", member_id)
    }

    pub fn clear_workout_history(member_id: &str) -> Self {
        Self::new(Action::ClearWorkoutHistory).field("memberId", member_id)
    }

    pub fn cancel_membership(member_id: &str) -> Self {
        Self::new(Action::CancelMembership).field("data", json!({"memberId": member_id}))
    }

    pub fn renew_subscription(member_id: &str, plan_name: &str, duration: &str) -> Self {
        Self::new(Action::RenewSubscription).field(
            "data",
            json!({"memberId": member_id, "planName": plan_name, "duration": duration}),
        )
    }

    pub fn check_member(member_id: &str, dob: &str) -> Self {
        Self::new(Action::CheckMember).field("data", json!({"memberId": member_id, "dob": dob}))
    }

    /// Register a member record with its first subscription nested under
    /// `subscription`.
    pub fn add_member(member_id: &str, details: &MemberDetails, choice: &PlanChoice) -> Self {
        Self::new(Action::AddMember).field(
            "data",
            json!({
                "memberId": member_id,
                "name": format!("{} {}", details.first_name, details.last_name),
                "phoneNumber": details.phone_number,
                "dob": details.dob,
                "subscription": {
                    "planName": choice.plan_name,
                    "duration": choice.duration,
                    "price": choice.price,
                },
            }),
        )
    }

    pub fn subscribe(member_id: &str, details: &MemberDetails, choice: &PlanChoice) -> Self {
        Self::new(Action::Subscribe).field(
            "data",
            json!({
                "memberId": member_id,
                "firstName": details.first_name,
                "lastName": details.last_name,
                "phoneNumber": details.phone_number,
                "dob": details.dob,
                "planName": choice.plan_name,
                "duration": choice.duration,
                "price": choice.price,
            }),
        )
    }

    /// Serialize to a single line of text, without the terminator.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Response envelope. Fields the client does not model are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Recovered password, present only on a successful `forgotPassword`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Response {
    pub fn success<T: Into<String>>(message: T) -> Self {
        Self {
            status: Status::Success,
            message: Some(message.into()),
            data: None,
            password: None,
            extra: Map::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("No message provided")
    }

    /// Turn `status: "error"` into [`Error::Application`].
    pub fn into_result(self) -> Result<Response, Error> {
        match self.status {
            Status::Success => Ok(self),
            Status::Error => Err(Error::Application(self.message().to_string())),
        }
    }

    /// Decode the `data` payload.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let data = self
            .data
            .clone()
            .ok_or_else(|| Error::general("Response has no data"))?;
        Ok(serde_json::from_value(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn actions_use_wire_names() {
        assert_eq!(serde_json::to_value(Action::SignUp).unwrap(), json!("signUp"));
        assert_eq!(
            serde_json::to_value(Action::GetActiveSubscriptions).unwrap(),
            json!("get_active_subscriptions")
        );
        let parsed: Action = serde_json::from_value(json!("forgotPassword")).unwrap();
        assert_eq!(parsed, Action::ForgotPassword);
        assert_eq!(Action::SubscribePlan.to_string(), "subscribe_plan");
        assert_eq!(
            serde_json::to_value(Action::ClearWorkoutHistory).unwrap(),
            json!(Action::ClearWorkoutHistory.as_str())
        );
    }

    #[test]
    fn login_request_is_flat_and_ordered() {
        let line = Request::login("alice", "pw").to_line().unwrap();
        assert_eq!(line, r#"{"action":"login","username":"alice","password":"pw"}"#);
    }

    #[test]
    fn update_user_info_request_shape() {
        let update = UserInfoUpdate {
            member_id: "42".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            email: "alice@example.com".to_string(),
            phone_number: "+201234567890".to_string(),
            username: "alice".to_string(),
        };
        let value = serde_json::to_value(Request::update_user_info(&update)).unwrap();
        assert_eq!(
            value,
            json!({
                "action": "update_user_info",
                "memberId": "42",
                "firstName": "Alice",
                "lastName": "Smith",
                "email": "alice@example.com",
                "phoneNumber": "+201234567890",
                "username": "alice"
            })
        );
    }

    #[test]
    fn manager_edits_pick_action_by_catalogue() {
        let item = json!({"name": "Court A"});
        let update = Request::update(Catalogue::GymClasses, item.clone(), json!({"name": "Yoga"}));
        assert_eq!(update.action, Action::UpdateGymClass);
        assert_eq!(update.get("oldData"), Some(&item));

        let delete = Request::delete(Catalogue::PadelCenters, item.clone());
        assert_eq!(delete.action, Action::DeletePadelCenter);
        assert_eq!(delete.get("data"), Some(&item));
        assert_eq!(Request::list(Catalogue::GymClasses).action, Action::GetClasses);
    }

    #[test]
    fn court_booking_sends_day_first_date() {
        let booking = CourtBooking {
            court_name: "Court 1".to_string(),
            time: "18:00".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 7, 5).unwrap(),
        };
        let request = Request::book_padel_court("42", "Alice", &booking);
        let value = serde_json::to_value(request).unwrap();
        assert_eq!(
            value,
            json!({
                "action": "book_padel_court",
                "data": {
                    "courtName": "Court 1",
                    "time": "18:00",
                    "memberId": "42",
                    "memberName": "Alice",
                    "date": "05-07-2024"
                }
            })
        );

        let cancel = Request::cancel_padel_booking("42", &booking);
        assert_eq!(cancel.action, Action::CancelPadelBooking);
        assert!(cancel.get("data").unwrap().get("memberName").is_none());
    }

    #[test]
    fn add_member_nests_subscription() {
        let details = MemberDetails {
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            phone_number: "01012345678".to_string(),
            dob: "01-03-2000".to_string(),
        };
        let choice = PlanChoice {
            plan_name: "Gold".to_string(),
            duration: "1 Month".to_string(),
            price: 500.0,
        };
        let data = Request::add_member("42", &details, &choice).get("data").cloned().unwrap();
        assert_eq!(data["name"], "Alice Smith");
        assert_eq!(
            data["subscription"],
            json!({"planName": "Gold", "duration": "1 Month", "price": 500.0})
        );

        let data = Request::subscribe("42", &details, &choice).get("data").cloned().unwrap();
        assert_eq!(data["firstName"], "Alice");
        assert_eq!(data["price"], json!(500.0));
    }

    #[test]
    fn error_response_becomes_application_error() {
        let response: Response =
            serde_json::from_str(r#"{"status":"error","message":"Invalid username or password"}"#)
                .unwrap();
        match response.into_result() {
            Err(Error::Application(msg)) => assert_eq!(msg, "Invalid username or password"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn response_keeps_unknown_fields() {
        let response: Response =
            serde_json::from_str(r#"{"status":"success","message":"ok","count":3}"#).unwrap();
        assert_eq!(response.extra.get("count"), Some(&json!(3)));
        assert!(response.data.is_none());
        assert!(response.data_as::<Vec<Value>>().is_err());
    }

    #[test]
    fn response_without_status_is_rejected() {
        assert!(serde_json::from_str::<Response>("{}").is_err());
    }
}
