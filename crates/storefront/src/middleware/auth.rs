//! Member session extractor and page gating.
//!
//! [`MemberSession`] is the per-request view of the identity session: it
//! reports whether the session loaded and who is signed in. Member-only
//! handlers call [`MemberSession::require`], which applies
//! [`gemline_core::access::decide`] and turns a refusal into a response.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::FromRequestParts,
    http::{HeaderName, HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use gemline_core::access::{self, Gate, SessionStatus};
use tower_sessions::Session;

use crate::filters;
use crate::models::{CurrentMember, session_keys};

/// Seconds before the loading page retries.
const LOADING_RETRY_SECS: &str = "2";

const REFRESH: HeaderName = HeaderName::from_static("refresh");

/// Per-request member session.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(member: MemberSession) -> Result<impl IntoResponse, GateRejection> {
///     let current = member.require(messages::PROFILE, "/profile")?;
///     Ok(format!("Hello, {}!", current.display_name()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemberSession {
    status: SessionStatus,
    member: Option<CurrentMember>,
}

impl MemberSession {
    /// Session state of this request.
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// The signed-in member, if any.
    #[must_use]
    pub const fn member(&self) -> Option<&CurrentMember> {
        self.member.as_ref()
    }

    /// Whether a member is signed in.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        matches!(self.status, SessionStatus::Authenticated)
    }

    /// Gate a member-only page.
    ///
    /// `next` is the path to come back to after signing in.
    ///
    /// # Errors
    ///
    /// Returns a rejection that renders the loading page or redirects to the
    /// sign-in prompt.
    pub fn require(self, message: &str, next: &str) -> Result<CurrentMember, GateRejection> {
        match (access::decide(self.status, message), self.member) {
            (Gate::Allow, Some(member)) => Ok(member),
            (Gate::Prompt { message }, _) => Err(GateRejection::Prompt {
                message: message.to_string(),
                next: next.to_string(),
            }),
            (Gate::Loading | Gate::Allow, _) => Err(GateRejection::Loading),
        }
    }
}

impl<S> FromRequestParts<S> for MemberSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            tracing::warn!("No session layer on this route");
            return Ok(Self {
                status: SessionStatus::Loading,
                member: None,
            });
        };

        let loaded = session
            .get::<CurrentMember>(session_keys::CURRENT_MEMBER)
            .await;

        Ok(match loaded {
            Ok(member) => Self {
                status: SessionStatus::loaded(member.is_some()),
                member,
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to load member session");
                Self {
                    status: SessionStatus::Loading,
                    member: None,
                }
            }
        })
    }
}

/// Why a member-only page was not rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRejection {
    /// Session state unavailable; show the loading page.
    Loading,
    /// Nobody signed in; prompt with `message`, then return to `next`.
    Prompt { message: String, next: String },
}

impl GateRejection {
    /// Sign-in prompt location for this rejection.
    #[must_use]
    pub fn prompt_location(message: &str, next: &str) -> String {
        format!(
            "/auth?message={}&next={}",
            urlencoding::encode(message),
            urlencoding::encode(next)
        )
    }
}

/// Loading page shown while the session is unavailable.
#[derive(Template, WebTemplate)]
#[template(path = "loading.html")]
pub struct LoadingTemplate {
    pub member: Option<CurrentMember>,
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Loading => {
                let mut response = (
                    StatusCode::SERVICE_UNAVAILABLE,
                    LoadingTemplate { member: None },
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(REFRESH, HeaderValue::from_static(LOADING_RETRY_SECS));
                response
            }
            Self::Prompt { message, next } => {
                Redirect::to(&Self::prompt_location(&message, &next)).into_response()
            }
        }
    }
}

/// Helper to store the signed-in member in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_member(
    session: &Session,
    member: &CurrentMember,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_MEMBER, member).await
}

/// Helper to clear the signed-in member from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_member(
    session: &Session,
) -> Result<Option<CurrentMember>, tower_sessions::session::Error> {
    session
        .remove::<CurrentMember>(session_keys::CURRENT_MEMBER)
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::header;
    use gemline_core::MemberRole;
    use gemline_core::access::messages;

    use super::*;

    fn member() -> CurrentMember {
        CurrentMember {
            id: "m-1".to_string(),
            nickname: Some("opal".to_string()),
            first_name: None,
            photo_url: None,
            email: None,
            email_verified: false,
            member_since: None,
            last_login: None,
            role: MemberRole::Public,
            id_token: None,
        }
    }

    #[test]
    fn test_require_signed_in() {
        let session = MemberSession {
            status: SessionStatus::Authenticated,
            member: Some(member()),
        };
        assert!(session.is_signed_in());
        assert_eq!(session.require(messages::PROFILE, "/profile").unwrap(), member());
    }

    #[test]
    fn test_require_anonymous_prompts() {
        let session = MemberSession {
            status: SessionStatus::Anonymous,
            member: None,
        };
        assert_eq!(
            session.require(messages::DASHBOARD, "/dashboard").unwrap_err(),
            GateRejection::Prompt {
                message: messages::DASHBOARD.to_string(),
                next: "/dashboard".to_string(),
            }
        );
    }

    #[test]
    fn test_require_loading() {
        let session = MemberSession {
            status: SessionStatus::Loading,
            member: None,
        };
        assert_eq!(
            session.require(messages::UPLOAD, "/upload").unwrap_err(),
            GateRejection::Loading
        );
    }

    #[test]
    fn test_prompt_redirect_location() {
        let response = GateRejection::Prompt {
            message: messages::NOTIFICATIONS.to_string(),
            next: "/notifications".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/auth?message=Sign%20in%20to%20view%20notifications&next=%2Fnotifications"
        );
    }

    #[test]
    fn test_loading_response() {
        let response = GateRejection::Loading.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers().get(REFRESH).unwrap(), "2");
    }
}
