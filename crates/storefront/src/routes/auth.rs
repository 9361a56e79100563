//! Sign-in route handlers.
//!
//! Members pick a marketplace role, then sign in with the identity provider
//! through the OAuth authorization-code flow:
//! - Role selection: `GET /auth`, `POST /auth/role`
//! - Login: stores state and nonce, redirects to the provider
//! - Callback: exchanges the code, loads the member profile, stores it in the session
//! - Logout: clears the session and redirects to the provider logout

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use gemline_core::MemberRole;
use rand::{Rng, distr::Alphanumeric};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{MemberSession, clear_current_member, set_current_member};
use crate::models::{CurrentMember, session_keys};
use crate::state::AppState;

const CALLBACK_PATH: &str = "/auth/callback";
const DEFAULT_RETURN_TO: &str = "/dashboard";

/// Generate a cryptographically secure random string.
fn generate_random_string(length: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Only same-site paths are accepted as post-login destinations.
fn safe_return_path(next: &str) -> Option<&str> {
    (next.starts_with('/') && !next.starts_with("//") && !next.contains('\\')).then_some(next)
}

/// Sign-in page with `message` shown above the role cards.
fn prompt(message: &str) -> Redirect {
    Redirect::to(&format!("/auth?message={}", urlencoding::encode(message)))
}

// =============================================================================
// Role selection
// =============================================================================

/// Role card display data.
#[derive(Debug, Clone)]
pub struct RoleCard {
    pub value: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub badge: Option<&'static str>,
    pub selected: bool,
}

impl RoleCard {
    fn new(role: MemberRole, selected: MemberRole) -> Self {
        Self {
            value: role.as_str(),
            title: role.title(),
            description: role.description(),
            features: role.features(),
            badge: role.badge(),
            selected: role == selected,
        }
    }
}

/// Query parameters of the sign-in page.
#[derive(Debug, Default, Deserialize)]
pub struct AuthParams {
    pub role: Option<String>,
    pub message: Option<String>,
    pub next: Option<String>,
}

/// Role selection template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/roles.html")]
pub struct RolesTemplate {
    pub member: Option<CurrentMember>,
    pub roles: Vec<RoleCard>,
    pub message: Option<String>,
    pub sign_in_enabled: bool,
}

/// Display the role selection page.
///
/// Signed-in members go straight to the dashboard.
#[instrument(skip(state, member, session))]
pub async fn roles(
    State(state): State<AppState>,
    member: MemberSession,
    session: Session,
    Query(params): Query<AuthParams>,
) -> Response {
    if member.is_signed_in() {
        return Redirect::to(DEFAULT_RETURN_TO).into_response();
    }

    if let Some(next) = params.next.as_deref().and_then(safe_return_path)
        && let Err(e) = session.insert(session_keys::RETURN_TO, next).await
    {
        tracing::warn!(error = %e, "Failed to store return path");
    }

    let selected = params
        .role
        .as_deref()
        .map(MemberRole::from_query_param)
        .unwrap_or_default();

    RolesTemplate {
        member: None,
        roles: MemberRole::ALL
            .into_iter()
            .map(|role| RoleCard::new(role, selected))
            .collect(),
        message: params.message.filter(|m| !m.trim().is_empty()),
        sign_in_enabled: state.identity().is_some(),
    }
    .into_response()
}

/// Role selection form data.
#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}

/// Onboarding step template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/onboarding.html")]
pub struct OnboardingTemplate {
    pub member: Option<CurrentMember>,
    pub role: RoleCard,
    pub sign_in_enabled: bool,
}

/// Store the chosen role and show its onboarding step.
#[instrument(skip(state, session))]
pub async fn select_role(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RoleForm>,
) -> Response {
    let role = form.role.parse::<MemberRole>().unwrap_or_default();

    if let Err(e) = session.insert(session_keys::SELECTED_ROLE, role).await {
        tracing::error!(error = %e, "Failed to store selected role");
        return prompt("Something went wrong, please try again").into_response();
    }

    OnboardingTemplate {
        member: None,
        role: RoleCard::new(role, role),
        sign_in_enabled: state.identity().is_some(),
    }
    .into_response()
}

// =============================================================================
// OAuth flow
// =============================================================================

/// Initiate member login.
///
/// Generates state and nonce parameters, stores them in the session,
/// and redirects to the provider's authorization page.
///
/// # Route
///
/// `GET /auth/login`
#[instrument(skip(state, session))]
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let Some(identity) = state.identity() else {
        return prompt("Sign-in is not available right now").into_response();
    };

    let oauth_state = generate_random_string(32);
    let nonce = generate_random_string(32);

    if let Err(e) = session.insert(session_keys::OAUTH_STATE, &oauth_state).await {
        tracing::error!(error = %e, "Failed to store OAuth state in session");
        return prompt("Something went wrong, please try again").into_response();
    }
    if let Err(e) = session.insert(session_keys::OAUTH_NONCE, &nonce).await {
        tracing::error!(error = %e, "Failed to store OAuth nonce in session");
        return prompt("Something went wrong, please try again").into_response();
    }

    let redirect_uri = state.config().url_for(CALLBACK_PATH);
    match identity.authorization_url(&redirect_uri, &oauth_state, &nonce) {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build authorization URL");
            prompt("Sign-in is not available right now").into_response()
        }
    }
}

/// Query parameters from the provider callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Handle the provider callback.
///
/// # Route
///
/// `GET /auth/callback`
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(identity) = state.identity() else {
        return prompt("Sign-in is not available right now").into_response();
    };

    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!(%error, %description, "Identity provider returned an error");
        return prompt("Sign-in was cancelled").into_response();
    }

    let Some(code) = query.code else {
        tracing::warn!("OAuth callback missing code");
        return prompt("Sign-in failed, please try again").into_response();
    };

    let stored_state: Option<String> = session
        .remove(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();
    let _ = session.remove::<String>(session_keys::OAUTH_NONCE).await;

    if stored_state.is_none() || stored_state != query.state {
        tracing::warn!("OAuth state mismatch");
        return prompt("Sign-in failed, please try again").into_response();
    }

    let redirect_uri = state.config().url_for(CALLBACK_PATH);
    let token = match identity.exchange_code(&code, &redirect_uri).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Failed to exchange authorization code");
            return prompt("Sign-in failed, please try again").into_response();
        }
    };

    let profile = match identity.fetch_member(&token).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load member profile");
            return prompt("Sign-in failed, please try again").into_response();
        }
    };

    let role: MemberRole = session
        .remove(session_keys::SELECTED_ROLE)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    let return_to: Option<String> = session
        .remove(session_keys::RETURN_TO)
        .await
        .ok()
        .flatten();

    let member = CurrentMember::from_member(profile, role, token.id_token);

    if let Err(e) = session.cycle_id().await {
        tracing::warn!(error = %e, "Failed to rotate session ID");
    }
    if let Err(e) = set_current_member(&session, &member).await {
        tracing::error!(error = %e, "Failed to store member in session");
        return prompt("Something went wrong, please try again").into_response();
    }

    set_sentry_user(&member.id, member.email.as_deref());
    add_breadcrumb("auth", "Signed in", Some(&[("role", role.as_str())]));
    tracing::info!(member_id = %member.id, role = %role, "Member signed in");

    let destination = return_to
        .as_deref()
        .and_then(safe_return_path)
        .unwrap_or(DEFAULT_RETURN_TO);
    Redirect::to(destination).into_response()
}

/// Sign the member out.
///
/// Redirects to the provider's logout endpoint when an ID token is known.
///
/// # Route
///
/// `POST /auth/logout`
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    let member = match clear_current_member(&session).await {
        Ok(member) => member,
        Err(e) => {
            tracing::error!(error = %e, "Failed to clear session");
            None
        }
    };

    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "Failed to flush session");
    }
    clear_sentry_user();

    if let (Some(identity), Some(id_token)) =
        (state.identity(), member.and_then(|m| m.id_token))
    {
        match identity.logout_url(&id_token, &state.config().url_for("/")) {
            Ok(url) => return Redirect::to(&url).into_response(),
            Err(e) => tracing::warn!(error = %e, "Failed to build logout URL"),
        }
    }

    Redirect::to("/").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_string() {
        let a = generate_random_string(32);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, generate_random_string(32));
    }

    #[test]
    fn test_safe_return_path() {
        assert_eq!(safe_return_path("/upload"), Some("/upload"));
        assert_eq!(safe_return_path("//evil.test/x"), None);
        assert_eq!(safe_return_path("https://evil.test"), None);
        assert_eq!(safe_return_path("/\\evil.test"), None);
    }

    #[test]
    fn test_role_card_selection() {
        let cards: Vec<_> = MemberRole::ALL
            .into_iter()
            .map(|role| RoleCard::new(role, MemberRole::from_query_param("retailer")))
            .collect();
        let selected: Vec<_> = cards.iter().filter(|c| c.selected).map(|c| c.title).collect();
        assert_eq!(selected, vec!["Premium Retailer"]);
        assert_eq!(cards.len(), 5);
    }

    #[test]
    fn test_prompt_location() {
        let response = prompt("Sign-in failed, please try again").into_response();
        assert_eq!(
            response.headers().get("location").and_then(|v| v.to_str().ok()),
            Some("/auth?message=Sign-in%20failed%2C%20please%20try%20again")
        );
    }
}
