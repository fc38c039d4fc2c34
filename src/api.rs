//! One method per server action
//!
//! Each method builds the request, sends it, turns `status: "error"` into
//! [`Error::Application`] and decodes the payload. Only the methods taking a
//! [`SessionHandle`] touch the session, and only after a successful reply.

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;
use crate::fetch::RequestClient;
use crate::protocol::{
    ActiveSubscription, Catalogue, ClassBooking, CourtBooking, MemberDetails, MemberProfile,
    MemberStatus, PlanChoice, Request, Response, SignUpForm, SubscriptionPlan, UserInfoUpdate,
    WorkoutEntry,
};
use crate::session::SessionHandle;
use crate::validation;

/// Result of a login or sign-up
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    /// Server greeting, shown to the user
    pub message: String,
    /// Member record, when the server sends one
    pub profile: Option<MemberProfile>,
}

/// Typed access to every server action
#[derive(Debug, Clone)]
pub struct PadelApi {
    client: RequestClient,
}

impl PadelApi {
    pub fn new(client: RequestClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RequestClient {
        &self.client
    }

    /// Send a request and fail on `status: "error"`.
    pub async fn call(&self, request: Request) -> Result<Response, Error> {
        self.client.send(&request).await?.into_result()
    }

    /// Does not touch the session; apply `profile` with
    /// [`SessionHandle::apply_profile`] when navigating on.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, Error> {
        validation::require_non_empty("Username", username)?;
        validation::require_non_empty("Password", password)?;
        let response = self.call(Request::login(username, password)).await?;
        login_outcome(response)
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> Result<LoginOutcome, Error> {
        form.validate()?;
        let response = self.call(Request::sign_up(form)).await?;
        login_outcome(response)
    }

    /// Returns the recovered password if the server sent one.
    pub async fn forgot_password(&self, username: &str) -> Result<Option<String>, Error> {
        validation::require_non_empty("Username", username)?;
        let response = self.call(Request::forgot_password(username)).await?;
        Ok(response.password)
    }

    pub async fn get_padel_centers(&self) -> Result<Vec<Value>, Error> {
        self.list(Catalogue::PadelCenters).await
    }

    pub async fn get_classes(&self) -> Result<Vec<Value>, Error> {
        self.list(Catalogue::GymClasses).await
    }

    pub async fn list(&self, catalogue: Catalogue) -> Result<Vec<Value>, Error> {
        let response = self.call(Request::list(catalogue)).await?;
        data_list(response)
    }

    pub async fn get_subscription_plans(&self) -> Result<Vec<SubscriptionPlan>, Error> {
        let response = self.call(Request::get_subscription_plans()).await?;
        data_list(response)
    }

    pub async fn save(&self, catalogue: Catalogue, item: Value) -> Result<String, Error> {
        let response = self.call(Request::save(catalogue, item)).await?;
        Ok(response.message().to_string())
    }

    pub async fn update(
        &self,
        catalogue: Catalogue,
        old: Value,
        new: Value,
    ) -> Result<String, Error> {
        let response = self.call(Request::update(catalogue, old, new)).await?;
        Ok(response.message().to_string())
    }

    pub async fn delete(&self, catalogue: Catalogue, item: Value) -> Result<String, Error> {
        let response = self.call(Request::delete(catalogue, item)).await?;
        Ok(response.message().to_string())
    }

    /// An empty list is a valid outcome.
    pub async fn get_active_subscriptions(
        &self,
        member_id: &str,
    ) -> Result<Vec<ActiveSubscription>, Error> {
        let response = self.call(Request::get_active_subscriptions(member_id)).await?;
        data_list(response)
    }

    pub async fn update_user_info(&self, update: &UserInfoUpdate) -> Result<String, Error> {
        update.validate()?;
        let response = self.call(Request::update_user_info(update)).await?;
        Ok(response.message().to_string())
    }

    pub async fn subscribe_plan(
        &self,
        member_id: &str,
        plan_name: &str,
        duration: &str,
    ) -> Result<String, Error> {
        let response = self
            .call(Request::subscribe_plan(member_id, plan_name, duration))
            .await?;
        Ok(response.message().to_string())
    }

    pub async fn book_padel_court(
        &self,
        member_id: &str,
        member_name: &str,
        booking: &CourtBooking,
    ) -> Result<String, Error> {
        let response = self
            .call(Request::book_padel_court(member_id, member_name, booking))
            .await?;
        Ok(response.message().to_string())
    }

    pub async fn cancel_padel_booking(
        &self,
        member_id: &str,
        booking: &CourtBooking,
    ) -> Result<String, Error> {
        let response = self.call(Request::cancel_padel_booking(member_id, booking)).await?;
        Ok(response.message().to_string())
    }

    pub async fn book_gym_class(
        &self,
        member_id: &str,
        class_name: &str,
    ) -> Result<ClassBooking, Error> {
        let response = self.call(Request::book_gym_class(member_id, class_name)).await?;
        let waitlisted = response
            .extra
            .get("waitlisted")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Ok(ClassBooking {
            message: response.message().to_string(),
            waitlisted,
        })
    }

    pub async fn cancel_gym_class(
        &self,
        member_id: &str,
        class_name: &str,
    ) -> Result<String, Error> {
        let response = self.call(Request::cancel_gym_class(member_id, class_name)).await?;
        Ok(response.message().to_string())
    }

    pub async fn get_workout_history(&self, member_id: &str) -> Result<Vec<WorkoutEntry>, Error> {
        let response = self.call(Request::get_workout_history(member_id)).await?;
        data_list(response)
    }

    pub async fn clear_workout_history(&self, member_id: &str) -> Result<String, Error> {
        let response = self.call(Request::clear_workout_history(member_id)).await?;
        Ok(response.message().to_string())
    }

    pub async fn cancel_membership(&self, member_id: &str) -> Result<String, Error> {
        let response = self.call(Request::cancel_membership(member_id)).await?;
        Ok(response.message().to_string())
    }

    pub async fn renew_subscription(
        &self,
        member_id: &str,
        plan_name: &str,
        duration: &str,
    ) -> Result<String, Error> {
        let response = self
            .call(Request::renew_subscription(member_id, plan_name, duration))
            .await?;
        Ok(response.message().to_string())
    }

    /// Whether the server already holds an active member record. An error
    /// reply counts as "not a member".
    pub async fn check_member(&self, member_id: &str, dob: &str) -> Result<bool, Error> {
        let response = self.client.send(&Request::check_member(member_id, dob)).await?;
        if !response.is_success() {
            debug!("check_member for {} failed: {}", member_id, response.message());
            return Ok(false);
        }
        Ok(response.data_as::<MemberStatus>()?.is_active)
    }

    pub async fn add_member(
        &self,
        member_id: &str,
        details: &MemberDetails,
        choice: &PlanChoice,
    ) -> Result<String, Error> {
        let response = self.call(Request::add_member(member_id, details, choice)).await?;
        Ok(response.message().to_string())
    }

    pub async fn subscribe_member(
        &self,
        member_id: &str,
        details: &MemberDetails,
        choice: &PlanChoice,
    ) -> Result<String, Error> {
        let response = self.call(Request::subscribe(member_id, details, choice)).await?;
        Ok(response.message().to_string())
    }

    /// Fetch the member's subscriptions and mirror the first one into the
    /// session; an empty list clears the session's subscription.
    pub async fn refresh_active_subscriptions(
        &self,
        session: &SessionHandle,
    ) -> Result<Vec<ActiveSubscription>, Error> {
        let member_id = session.member_id().ok_or(Error::NotLoggedIn)?;
        let subscriptions = self.get_active_subscriptions(&member_id).await?;
        debug!("Member {} has {} active subscriptions", member_id, subscriptions.len());
        session.lock().apply_active_subscriptions(&subscriptions);
        Ok(subscriptions)
    }

    /// Subscribe the logged-in member and record the subscription on success.
    pub async fn subscribe(
        &self,
        session: &SessionHandle,
        plan_name: &str,
        duration: &str,
    ) -> Result<String, Error> {
        let member_id = session.member_id().ok_or(Error::NotLoggedIn)?;
        let message = self.subscribe_plan(&member_id, plan_name, duration).await?;
        info!("Member {} subscribed to {} ({})", member_id, plan_name, duration);
        session
            .lock()
            .set_subscription(plan_name.to_string(), duration.to_string());
        Ok(message)
    }

    /// Subscribe with the member's personal details: validate them, quote the
    /// price, register the member if the server has no active record, then
    /// subscribe. The session is updated only once the subscription succeeds.
    pub async fn enroll(
        &self,
        session: &SessionHandle,
        plan: &SubscriptionPlan,
        duration: &str,
        details: &MemberDetails,
        today: NaiveDate,
    ) -> Result<String, Error> {
        let member_id = session.member_id().ok_or(Error::NotLoggedIn)?;
        details.validate(today)?;
        let choice = PlanChoice::quote(plan, duration)?;

        if !self.check_member(&member_id, &details.dob).await? {
            info!("Registering member {}", member_id);
            self.add_member(&member_id, details, &choice).await?;
        }
        let message = self.subscribe_member(&member_id, details, &choice).await?;

        info!(
            "Member {} enrolled in {} ({})",
            member_id, choice.plan_name, choice.duration
        );
        let mut state = session.lock();
        state.apply_member_details(details);
        state.set_subscription(choice.plan_name, choice.duration);
        Ok(message)
    }

    /// Book a court for the logged-in member, listed under their first name.
    pub async fn book_court(
        &self,
        session: &SessionHandle,
        booking: &CourtBooking,
    ) -> Result<String, Error> {
        let (member_id, member_name) = {
            let state = session.lock();
            let member_id = state.member_id().ok_or(Error::NotLoggedIn)?.to_string();
            let name = state.first_name().or(state.username()).unwrap_or_default().to_string();
            (member_id, name)
        };
        self.book_padel_court(&member_id, &member_name, booking).await
    }

    pub async fn cancel_court(
        &self,
        session: &SessionHandle,
        booking: &CourtBooking,
    ) -> Result<String, Error> {
        let member_id = session.member_id().ok_or(Error::NotLoggedIn)?;
        self.cancel_padel_booking(&member_id, booking).await
    }

    /// Book a class; needs an active subscription.
    pub async fn book_class(
        &self,
        session: &SessionHandle,
        class_name: &str,
    ) -> Result<ClassBooking, Error> {
        let (member_id, active) = {
            let state = session.lock();
            let member_id = state.member_id().ok_or(Error::NotLoggedIn)?.to_string();
            (member_id, state.is_active())
        };
        if !active {
            warn!(
                "Member {} tried to book '{}' without an active subscription",
                member_id, class_name
            );
            return Err(Error::InactiveMembership);
        }
        self.book_gym_class(&member_id, class_name).await
    }

    pub async fn cancel_class(
        &self,
        session: &SessionHandle,
        class_name: &str,
    ) -> Result<String, Error> {
        let member_id = session.member_id().ok_or(Error::NotLoggedIn)?;
        self.cancel_gym_class(&member_id, class_name).await
    }

    /// An empty history is a valid outcome.
    pub async fn workout_history(
        &self,
        session: &SessionHandle,
    ) -> Result<Vec<WorkoutEntry>, Error> {
        let member_id = session.member_id().ok_or(Error::NotLoggedIn)?;
        self.get_workout_history(&member_id).await
    }

    pub async fn clear_history(&self, session: &SessionHandle) -> Result<String, Error> {
        let member_id = session.member_id().ok_or(Error::NotLoggedIn)?;
        self.clear_workout_history(&member_id).await
    }

    /// Cancel the membership and clear the session's subscription on success.
    pub async fn end_membership(&self, session: &SessionHandle) -> Result<String, Error> {
        let member_id = session.member_id().ok_or(Error::NotLoggedIn)?;
        let message = self.cancel_membership(&member_id).await?;
        info!("Member {} cancelled their membership", member_id);
        session.lock().clear_subscription();
        Ok(message)
    }

    /// Renew the recorded subscription, then reload it from the server so
    /// the new dates land in the session.
    pub async fn renew(&self, session: &SessionHandle) -> Result<String, Error> {
        let (member_id, plan_name, duration) = {
            let state = session.lock();
            let member_id = state.member_id().ok_or(Error::NotLoggedIn)?.to_string();
            match (state.subscribed_plan_name(), state.subscribed_duration()) {
                (Some(plan), Some(duration)) => {
                    (member_id, plan.to_string(), duration.to_string())
                }
                _ => return Err(Error::validation("No subscription to renew.")),
            }
        };
        let message = self.renew_subscription(&member_id, &plan_name, &duration).await?;
        self.refresh_active_subscriptions(session).await?;
        Ok(message)
    }

    /// Update the logged-in member's details; the member id always comes
    /// from the session.
    pub async fn update_profile(
        &self,
        session: &SessionHandle,
        mut update: UserInfoUpdate,
    ) -> Result<String, Error> {
        update.member_id = session.member_id().ok_or(Error::NotLoggedIn)?;
        let message = self.update_user_info(&update).await?;
        session.lock().apply_user_info(&update);
        Ok(message)
    }
}

fn login_outcome(response: Response) -> Result<LoginOutcome, Error> {
    let profile = match response.data {
        Some(ref data) if !data.is_null() => Some(serde_json::from_value(data.clone())?),
        _ => None,
    };
    Ok(LoginOutcome {
        message: response.message().to_string(),
        profile,
    })
}

/// Decode a list payload; a success without `data` counts as empty.
fn data_list<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, Error> {
    match response.data {
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(data) => Ok(serde_json::from_value(data)?),
    }
}
