//! Identity and subscription of the member using the client
//!
//! [`SessionState`] is a plain value with no I/O. [`SessionHandle`] is the
//! shared, lock-guarded context handed to every screen.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::protocol::{ActiveSubscription, MemberDetails, MemberProfile, UserInfoUpdate};

/// Everything written by a successful login or sign-up
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginData {
    pub username: String,
    pub member_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub phone_number: Option<String>,
    pub dob: Option<String>,
    pub plan_name: Option<String>,
    pub duration: Option<String>,
    pub active: bool,
}

impl From<MemberProfile> for LoginData {
    fn from(profile: MemberProfile) -> Self {
        Self {
            username: profile.username,
            member_id: profile.member_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            role: profile.role,
            phone_number: profile.phone_number,
            dob: profile.dob,
            plan_name: profile.plan_name,
            duration: profile.duration,
            active: profile.is_active,
        }
    }
}

/// Current member record. Every field is unset until populated.
///
/// The active flag is never set while no plan is recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    username: Option<String>,
    member_id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    role: Option<String>,
    phone_number: Option<String>,
    dob: Option<String>,
    email: Option<String>,
    subscribed_plan_name: Option<String>,
    subscribed_duration: Option<String>,
    active: bool,
    subscription_start_date: Option<String>,
    subscription_expiry_date: Option<String>,
}

macro_rules! string_accessors {
    ($($field:ident => $setter:ident),* $(,)?) => {
        $(
            pub fn $field(&self) -> Option<&str> {
                self.$field.as_deref()
            }

            pub fn $setter(&mut self, value: Option<String>) {
                self.$field = value;
            }
        )*
    };
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    string_accessors! {
        username => set_username,
        member_id => set_member_id,
        first_name => set_first_name,
        last_name => set_last_name,
        role => set_role,
        phone_number => set_phone_number,
        dob => set_dob,
        email => set_email,
        subscribed_duration => set_subscribed_duration,
        subscription_start_date => set_subscription_start_date,
        subscription_expiry_date => set_subscription_expiry_date,
    }

    pub fn subscribed_plan_name(&self) -> Option<&str> {
        self.subscribed_plan_name.as_deref()
    }

    /// Clearing the plan also clears the active flag.
    pub fn set_subscribed_plan_name(&mut self, value: Option<String>) {
        if value.is_none() {
            self.active = false;
        }
        self.subscribed_plan_name = value;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Ignored when asked to activate with no plan recorded.
    pub fn set_active(&mut self, active: bool) {
        self.active = active && self.subscribed_plan_name.is_some();
    }

    /// Replace every identity and subscription field at once. Email and the
    /// subscription dates are not part of the login record and are reset.
    pub fn set_login_data(&mut self, data: LoginData) {
        self.username = Some(data.username);
        self.member_id = Some(data.member_id);
        self.first_name = data.first_name;
        self.last_name = data.last_name;
        self.role = data.role;
        self.phone_number = data.phone_number;
        self.dob = data.dob;
        self.active = data.active && data.plan_name.is_some();
        self.subscribed_plan_name = data.plan_name;
        self.subscribed_duration = data.duration;
        self.email = None;
        self.subscription_start_date = None;
        self.subscription_expiry_date = None;
    }

    /// Record a subscription; always marks it active. Dates of any previous
    /// subscription are dropped.
    pub fn set_subscription(&mut self, plan_name: String, duration: String) {
        self.subscribed_plan_name = Some(plan_name);
        self.subscribed_duration = Some(duration);
        self.active = true;
        self.subscription_start_date = None;
        self.subscription_expiry_date = None;
    }

    /// Reset every field; used on logout.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Reset the subscription fields, keeping identity.
    pub fn clear_subscription(&mut self) {
        self.subscribed_plan_name = None;
        self.subscribed_duration = None;
        self.active = false;
        self.subscription_start_date = None;
        self.subscription_expiry_date = None;
    }

    pub fn is_logged_in(&self) -> bool {
        self.username.is_some() && self.member_id.is_some()
    }

    /// Exact, case-sensitive match against the active subscription.
    pub fn is_subscribed_to_plan(&self, plan_name: &str, duration: &str) -> bool {
        self.active
            && self.subscribed_plan_name.as_deref() == Some(plan_name)
            && self.subscribed_duration.as_deref() == Some(duration)
    }

    /// The first entry becomes the current subscription; an empty list
    /// clears it.
    pub fn apply_active_subscriptions(&mut self, subscriptions: &[ActiveSubscription]) {
        match subscriptions.first() {
            Some(sub) => {
                self.set_subscription(sub.plan_name.clone(), sub.duration.clone());
                self.subscription_start_date = sub.start_date.clone();
                self.subscription_expiry_date = sub.expiry_date.clone();
            }
            None => self.clear_subscription(),
        }
    }

    /// Write the edited identity fields after a successful account update.
    pub fn apply_user_info(&mut self, update: &UserInfoUpdate) {
        self.first_name = Some(update.first_name.clone());
        self.last_name = Some(update.last_name.clone());
        self.email = Some(update.email.clone());
        self.phone_number = Some(update.phone_number.clone());
        self.username = Some(update.username.clone());
    }

    pub fn apply_member_details(&mut self, details: &MemberDetails) {
        self.first_name = Some(details.first_name.clone());
        self.last_name = Some(details.last_name.clone());
        self.phone_number = Some(details.phone_number.clone());
        self.dob = Some(details.dob.clone());
    }
}

/// Shared session context, cloned into every screen handler
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<Mutex<SessionState>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the session for reading or mutation.
    pub fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.lock().is_logged_in()
    }

    pub fn member_id(&self) -> Option<String> {
        self.lock().member_id().map(str::to_string)
    }

    pub fn apply_profile(&self, profile: MemberProfile) {
        let mut state = self.lock();
        let email = profile.email.clone();
        state.set_login_data(profile.into());
        state.set_email(email);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login_data() -> LoginData {
        LoginData {
            username: "alice".to_string(),
            member_id: "42".to_string(),
            first_name: Some("Alice".to_string()),
            last_name: Some("Smith".to_string()),
            role: Some("user".to_string()),
            phone_number: Some("+201234567890".to_string()),
            dob: Some("01-03-2000".to_string()),
            plan_name: Some("Gold".to_string()),
            duration: Some("1 Month".to_string()),
            active: true,
        }
    }

    #[test]
    fn new_session_is_empty() {
        let session = SessionState::new();
        assert!(!session.is_logged_in());
        assert!(!session.is_active());
        assert!(session.username().is_none());
    }

    #[test]
    fn login_then_clear() {
        let mut session = SessionState::new();
        session.set_login_data(login_data());
        assert!(session.is_logged_in());
        assert!(session.is_subscribed_to_plan("Gold", "1 Month"));

        session.clear();
        assert!(!session.is_logged_in());
        assert_eq!(session, SessionState::default());
    }

    #[test]
    fn logged_in_needs_both_username_and_member_id() {
        let mut session = SessionState::new();
        session.set_username(Some("alice".to_string()));
        assert!(!session.is_logged_in());
        session.set_member_id(Some("42".to_string()));
        assert!(session.is_logged_in());
    }

    #[test]
    fn set_subscription_forces_active() {
        let mut session = SessionState::new();
        session.set_subscription("Silver".to_string(), "3 Months".to_string());
        assert!(session.is_active());
        assert!(session.is_subscribed_to_plan("Silver", "3 Months"));
        assert!(!session.is_subscribed_to_plan("Silver", "1 Month"));
        assert!(!session.is_subscribed_to_plan("silver", "3 Months"));
    }

    #[test]
    fn inactive_subscription_never_matches() {
        let mut session = SessionState::new();
        session.set_login_data(LoginData {
            active: false,
            ..login_data()
        });
        assert!(!session.is_subscribed_to_plan("Gold", "1 Month"));
    }

    #[test]
    fn clear_subscription_keeps_identity() {
        let mut session = SessionState::new();
        session.set_login_data(login_data());
        session.clear_subscription();

        assert!(session.is_logged_in());
        assert_eq!(session.first_name(), Some("Alice"));
        assert_eq!(session.role(), Some("user"));
        assert!(session.subscribed_plan_name().is_none());
        assert!(session.subscribed_duration().is_none());
        assert!(!session.is_active());
    }

    #[test]
    fn active_requires_a_plan() {
        let mut session = SessionState::new();
        session.set_active(true);
        assert!(!session.is_active());

        session.set_login_data(LoginData {
            plan_name: None,
            ..login_data()
        });
        assert!(!session.is_active());

        session.set_subscription("Gold".to_string(), "1 Year".to_string());
        session.set_subscribed_plan_name(None);
        assert!(!session.is_active());
    }

    #[test]
    fn active_subscriptions_replace_or_clear() {
        let mut session = SessionState::new();
        session.apply_active_subscriptions(&[ActiveSubscription {
            plan_name: "Gold".to_string(),
            duration: "1 Year".to_string(),
            start_date: Some("2024-01-01".to_string()),
            expiry_date: Some("2025-01-01".to_string()),
        }]);
        assert!(session.is_subscribed_to_plan("Gold", "1 Year"));
        assert_eq!(session.subscription_expiry_date(), Some("2025-01-01"));

        session.apply_active_subscriptions(&[]);
        assert!(!session.is_active());
        assert!(session.subscription_start_date().is_none());
    }

    fn gold_until_2025() -> ActiveSubscription {
        ActiveSubscription {
            plan_name: "Gold".to_string(),
            duration: "1 Year".to_string(),
            start_date: Some("2024-01-01".to_string()),
            expiry_date: Some("2025-01-01".to_string()),
        }
    }

    #[test]
    fn new_subscription_drops_previous_dates() {
        let mut session = SessionState::new();
        session.apply_active_subscriptions(&[gold_until_2025()]);

        session.set_subscription("Silver".to_string(), "3 Months".to_string());

        assert!(session.is_subscribed_to_plan("Silver", "3 Months"));
        assert!(session.subscription_start_date().is_none());
        assert!(session.subscription_expiry_date().is_none());
    }

    #[test]
    fn next_login_does_not_inherit_previous_member_details() {
        let mut session = SessionState::new();
        session.set_login_data(login_data());
        session.set_email(Some("alice@example.com".to_string()));
        session.apply_active_subscriptions(&[gold_until_2025()]);

        session.set_login_data(LoginData {
            username: "bob".to_string(),
            member_id: "43".to_string(),
            ..Default::default()
        });

        assert_eq!(session.username(), Some("bob"));
        assert!(session.subscribed_plan_name().is_none());
        assert!(session.subscription_start_date().is_none());
        assert!(session.subscription_expiry_date().is_none());
        assert!(session.email().is_none());
    }

    #[test]
    fn member_details_overwrite_personal_fields() {
        let mut session = SessionState::new();
        session.set_login_data(login_data());
        session.apply_member_details(&MemberDetails {
            first_name: "Alicia".to_string(),
            last_name: "Smith".to_string(),
            phone_number: "01098765432".to_string(),
            dob: "15-06-2000".to_string(),
        });

        assert_eq!(session.first_name(), Some("Alicia"));
        assert_eq!(session.phone_number(), Some("01098765432"));
        assert_eq!(session.dob(), Some("15-06-2000"));
        assert_eq!(session.username(), Some("alice"));
    }

    #[test]
    fn handle_applies_profile_with_email() {
        let handle = SessionHandle::new();
        handle.lock().set_email(Some("old@example.com".to_string()));
        handle.apply_profile(MemberProfile {
            username: "alice".to_string(),
            member_id: "42".to_string(),
            first_name: None,
            last_name: None,
            role: None,
            phone_number: None,
            email: Some("alice@example.com".to_string()),
            dob: None,
            plan_name: None,
            duration: None,
            is_active: false,
        });
        assert_eq!(handle.snapshot().email(), Some("alice@example.com"));
    }

    #[test]
    fn handle_shares_state_between_clones() {
        let handle = SessionHandle::new();
        let screen_copy = handle.clone();
        handle.lock().set_login_data(login_data());
        assert!(screen_copy.is_logged_in());
        assert_eq!(screen_copy.member_id().as_deref(), Some("42"));
    }
}
