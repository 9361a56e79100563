//! Types for the identity provider's OAuth and userinfo responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// OAuth Types
// ─────────────────────────────────────────────────────────────────────────────

/// Member access token obtained via OAuth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberToken {
    /// The access token for userinfo requests.
    pub access_token: String,
    /// The ID token (`OpenID` Connect), used as logout hint.
    pub id_token: Option<String>,
    /// Token lifetime in seconds.
    pub expires_in: Option<i64>,
    /// Unix timestamp when the token was obtained.
    pub obtained_at: i64,
}

impl MemberToken {
    /// Check if the access token is expired (with 60s buffer).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_in.is_some_and(|expires_in| {
            let now = Utc::now().timestamp();
            now >= self.obtained_at + expires_in - 60
        })
    }
}

/// Raw token response from the OAuth token endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    pub id_token: Option<String>,
    pub expires_in: Option<i64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Member Types
// ─────────────────────────────────────────────────────────────────────────────

/// Member profile as returned by the userinfo endpoint.
///
/// Only the display fields the storefront uses are read; every other claim
/// is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    /// Stable member ID.
    pub sub: String,
    pub nickname: Option<String>,
    pub given_name: Option<String>,
    pub picture: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    /// When the member joined.
    pub created_at: Option<DateTime<Utc>>,
    /// When the member last signed in.
    pub last_login_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_expiry() {
        let now = Utc::now().timestamp();
        let fresh = MemberToken {
            access_token: "a".to_string(),
            id_token: None,
            expires_in: Some(3600),
            obtained_at: now,
        };
        assert!(!fresh.is_expired());

        let stale = MemberToken {
            obtained_at: now - 3590,
            ..fresh.clone()
        };
        assert!(stale.is_expired());

        let forever = MemberToken {
            expires_in: None,
            ..fresh
        };
        assert!(!forever.is_expired());
    }

    #[test]
    fn test_member_ignores_unknown_claims() {
        let member: Member = serde_json::from_value(serde_json::json!({
            "sub": "m-1",
            "nickname": "gemma",
            "email": "gemma@gemline.test",
            "email_verified": true,
            "created_at": "2024-01-05T12:00:00Z",
            "locale": "en-US"
        }))
        .unwrap();
        assert_eq!(member.sub, "m-1");
        assert!(member.email_verified);
        assert!(member.given_name.is_none());
        assert!(member.created_at.is_some());
    }
}
