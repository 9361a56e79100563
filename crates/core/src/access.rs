//! Gate for member-only pages.
//!
//! A gated page is rendered only once the session is known to hold a signed
//! in member. The decision depends on nothing but the session status and
//! the page's prompt message.

/// What the session collaborator reports for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Session state is not available yet.
    Loading,
    /// Session loaded, nobody signed in.
    Anonymous,
    /// Session loaded with a signed-in member.
    Authenticated,
}

impl SessionStatus {
    /// Status for a loaded session.
    #[must_use]
    pub const fn loaded(signed_in: bool) -> Self {
        if signed_in {
            Self::Authenticated
        } else {
            Self::Anonymous
        }
    }
}

/// Outcome of gating a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate<'a> {
    /// Show a loading indicator and nothing else.
    Loading,
    /// Send the visitor to the sign-in prompt with this message.
    Prompt { message: &'a str },
    /// Render the page.
    Allow,
}

/// Decide what a gated page shows for `status`.
#[must_use]
pub const fn decide(status: SessionStatus, message: &str) -> Gate<'_> {
    match status {
        SessionStatus::Loading => Gate::Loading,
        SessionStatus::Anonymous => Gate::Prompt { message },
        SessionStatus::Authenticated => Gate::Allow,
    }
}

/// Prompt messages of the gated pages.
pub mod messages {
    pub const PROFILE: &str = "Sign in to access your profile";
    pub const DASHBOARD: &str = "Sign in to access your dashboard";
    pub const ANALYTICS: &str = "Sign in to access analytics";
    pub const NOTIFICATIONS: &str = "Sign in to view notifications";
    pub const UPLOAD: &str = "Sign in to upload products";
    pub const MODERATION: &str = "Sign in to access moderation tools";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_shows_only_indicator() {
        assert_eq!(decide(SessionStatus::Loading, messages::PROFILE), Gate::Loading);
    }

    #[test]
    fn test_anonymous_gets_prompt_with_message() {
        assert_eq!(
            decide(SessionStatus::loaded(false), messages::UPLOAD),
            Gate::Prompt {
                message: "Sign in to upload products"
            }
        );
    }

    #[test]
    fn test_member_is_allowed() {
        assert_eq!(
            decide(SessionStatus::loaded(true), messages::DASHBOARD),
            Gate::Allow
        );
    }
}
