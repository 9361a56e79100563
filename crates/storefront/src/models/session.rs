//! Session-related types.
//!
//! Types stored in the session for sign-in state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gemline_core::MemberRole;

use crate::identity::Member;

/// Session-stored member identity.
///
/// Holds only the display fields pages read from the identity provider,
/// plus the role picked during onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentMember {
    pub id: String,
    pub nickname: Option<String>,
    pub first_name: Option<String>,
    pub photo_url: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
    pub member_since: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub role: MemberRole,
    /// Identity provider ID token, kept for the logout hint.
    pub id_token: Option<String>,
}

impl CurrentMember {
    /// Build the session record from a userinfo profile.
    #[must_use]
    pub fn from_member(member: Member, role: MemberRole, id_token: Option<String>) -> Self {
        Self {
            id: member.sub,
            nickname: member.nickname,
            first_name: member.given_name,
            photo_url: member.picture,
            email: member.email,
            email_verified: member.email_verified,
            member_since: member.created_at,
            last_login: member.last_login_at,
            role,
            id_token,
        }
    }

    /// Name shown in greetings: nickname, then first name, then "User".
    #[must_use]
    pub fn display_name(&self) -> &str {
        [self.nickname.as_deref(), self.first_name.as_deref()]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
            .unwrap_or("User")
    }

    /// Initial used for the avatar when there is no photo.
    #[must_use]
    pub fn initial(&self) -> char {
        self.display_name()
            .chars()
            .next()
            .map_or('U', |c| c.to_ascii_uppercase())
    }
}

/// Session keys for sign-in data.
pub mod keys {
    /// Key for storing the signed-in member.
    pub const CURRENT_MEMBER: &str = "current_member";

    /// Key for OAuth state (CSRF protection).
    pub const OAUTH_STATE: &str = "oauth_state";

    /// Key for OAuth nonce (`OpenID` Connect replay protection).
    pub const OAUTH_NONCE: &str = "oauth_nonce";

    /// Key for the role picked on the sign-in page.
    pub const SELECTED_ROLE: &str = "selected_role";

    /// Key for the page to return to after sign-in.
    pub const RETURN_TO: &str = "return_to";
}
