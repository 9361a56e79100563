//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use gemline_core::MemberRole;
use tracing::instrument;

use crate::filters;
use crate::middleware::MemberSession;
use crate::models::CurrentMember;

// =============================================================================
// Static content
// =============================================================================

/// A selling point shown below the hero.
#[derive(Debug, Clone, Copy)]
pub struct Feature {
    pub icon: &'static str,
    pub title: &'static str,
    pub text: &'static str,
}

const FEATURES: [Feature; 3] = [
    Feature {
        icon: "◆",
        title: "Verified Suppliers",
        text: "Every piece comes from vetted wholesalers and artisans.",
    },
    Feature {
        icon: "◎",
        title: "AI-Enhanced Imagery",
        text: "Compare original and enhanced product photos side by side.",
    },
    Feature {
        icon: "▲",
        title: "3D Previews",
        text: "Inspect pieces from every angle before you buy.",
    },
];

/// Audience card in the "who is it for" section.
#[derive(Debug, Clone)]
pub struct AudienceCard {
    pub title: &'static str,
    pub description: &'static str,
    /// Sign-in link preselecting the matching role.
    pub href: String,
}

fn audience_cards() -> Vec<AudienceCard> {
    [
        ("Wholesale Partners", MemberRole::Wholesaler, "wholesaler"),
        ("Premium Retailers", MemberRole::PremiumRetailer, "retailer"),
        ("Public Customers", MemberRole::Public, "public"),
    ]
    .into_iter()
    .map(|(title, role, param)| AudienceCard {
        title,
        description: role.description(),
        href: format!("/auth?role={param}"),
    })
    .collect()
}

/// Primary call to action of the hero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallToAction {
    pub label: &'static str,
    pub href: &'static str,
}

impl CallToAction {
    /// Dashboard link for members, sign-in for everyone else.
    #[must_use]
    pub const fn for_viewer(signed_in: bool) -> Self {
        if signed_in {
            Self {
                label: "Go to Dashboard",
                href: "/dashboard",
            }
        } else {
            Self {
                label: "Get Started",
                href: "/auth/login",
            }
        }
    }
}

// =============================================================================
// Handler
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub member: Option<CurrentMember>,
    pub cta: CallToAction,
    pub features: &'static [Feature],
    pub audiences: Vec<AudienceCard>,
}

/// Display the home page.
#[instrument(skip(session))]
pub async fn home(session: MemberSession) -> impl IntoResponse {
    HomeTemplate {
        cta: CallToAction::for_viewer(session.is_signed_in()),
        member: session.member().cloned(),
        features: &FEATURES,
        audiences: audience_cards(),
    }
}
