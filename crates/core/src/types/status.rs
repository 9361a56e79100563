//! Status and role enums.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Moderation workflow state of a product.
///
/// Set by the review process outside the storefront; the storefront only
/// reads it. Unrecognised values from the store deserialize as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl ModerationStatus {
    /// Lowercase label used in badges and the store.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processing state of a contact form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Answered,
    Closed,
    #[serde(other)]
    Unknown,
}

/// Marketplace role a member picks during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MemberRole {
    Admin,
    Wholesaler,
    PremiumRetailer,
    IntermediateRetailer,
    #[default]
    Public,
}

impl MemberRole {
    /// All roles in the order they are offered.
    pub const ALL: [Self; 5] = [
        Self::Admin,
        Self::Wholesaler,
        Self::PremiumRetailer,
        Self::IntermediateRetailer,
        Self::Public,
    ];

    /// Map the `role` query parameter of the sign-in page to a role.
    ///
    /// Only the short links used in the footer are recognised; anything else
    /// selects `Public`.
    #[must_use]
    pub fn from_query_param(param: &str) -> Self {
        match param {
            "wholesaler" => Self::Wholesaler,
            "retailer" => Self::PremiumRetailer,
            "admin" => Self::Admin,
            _ => Self::Public,
        }
    }

    /// Stable identifier used in forms and the session.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Wholesaler => "wholesaler",
            Self::PremiumRetailer => "premium-retailer",
            Self::IntermediateRetailer => "intermediate-retailer",
            Self::Public => "public",
        }
    }

    /// Human readable title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Admin => "Platform Administrator",
            Self::Wholesaler => "Wholesale Partner",
            Self::PremiumRetailer => "Premium Retailer",
            Self::IntermediateRetailer => "Intermediate Retailer",
            Self::Public => "Public Customer",
        }
    }

    /// One-line description shown on the role card.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Admin => {
                "Manage the entire platform, moderate content, and oversee operations"
            }
            Self::Wholesaler => "Upload products, manage inventory, and reach verified retailers",
            Self::PremiumRetailer => "Access exclusive collections and premium features",
            Self::IntermediateRetailer => "Standard retail access with essential business tools",
            Self::Public => "Browse and purchase from our curated jewelry collection",
        }
    }

    /// Feature bullet points shown on the role card.
    #[must_use]
    pub const fn features(&self) -> &'static [&'static str] {
        match self {
            Self::Admin => &[
                "Full platform access",
                "Content moderation tools",
                "User management",
                "Analytics dashboard",
                "System configuration",
            ],
            Self::Wholesaler => &[
                "Product upload with AI enhancement",
                "Inventory management",
                "Retailer network access",
                "Bulk pricing tools",
                "Analytics & reporting",
            ],
            Self::PremiumRetailer => &[
                "Exclusive product access",
                "Custom branding options",
                "Priority support",
                "Advanced analytics",
                "VIP pricing tiers",
            ],
            Self::IntermediateRetailer => &[
                "Standard product catalog",
                "Basic branding options",
                "Order management",
                "Customer support",
                "Standard pricing",
            ],
            Self::Public => &[
                "Browse public catalog",
                "Purchase jewelry",
                "Order tracking",
                "Customer support",
                "Wishlist & favorites",
            ],
        }
    }

    /// Optional badge text on the role card.
    #[must_use]
    pub const fn badge(&self) -> Option<&'static str> {
        match self {
            Self::Admin => Some("Admin"),
            Self::Wholesaler => Some("B2B"),
            Self::PremiumRetailer => Some("Premium"),
            Self::IntermediateRetailer | Self::Public => None,
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("invalid member role: {s}"))
    }
}
