//! Newtype IDs for type-safe record references.
//!
//! The content store addresses every record by an opaque string `_id`.
//! Use the `define_id!` macro to create wrappers that prevent accidentally
//! passing a notification ID where a product ID is expected.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Default`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `Display`, `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use gemline_core::define_id;
/// define_id!(RingId);
/// define_id!(ChainId);
///
/// let ring = RingId::new("r-1");
/// let chain = ChainId::new("r-1");
///
/// // Same text, different types:
/// // let _: RingId = chain;
/// assert_eq!(ring.as_str(), chain.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Default,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(SubmissionId);
define_id!(NotificationId);
define_id!(MemberId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_transparently() {
        let id = ProductId::new("abc-123");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"abc-123\""));
    }

    #[test]
    fn test_id_display_and_conversions() {
        let id: MemberId = "m-9".into();
        assert_eq!(id.to_string(), "m-9");
        assert_eq!(id.clone().into_inner(), "m-9".to_string());
        assert_eq!(id, MemberId::from("m-9".to_string()));
    }
}
