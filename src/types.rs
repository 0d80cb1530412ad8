use crate::error::{Error, Result};
use std::fmt;

const MAX_ID_LEN: usize = 128;

fn validate_id(value: &str, kind: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidId(format!("{kind} must not be empty")));
    }
    if trimmed.len() > MAX_ID_LEN {
        return Err(Error::InvalidId(format!(
            "{kind} length must be <= {MAX_ID_LEN}"
        )));
    }
    if !trimmed.chars().all(is_allowed_id_char) {
        return Err(Error::InvalidId(format!(
            "{kind} contains invalid characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn is_allowed_id_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, ':' | '_' | '-')
}

macro_rules! define_id_type {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(Clone, Debug, Eq, PartialEq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            /// Creates a validated identifier.
            pub fn new(value: impl AsRef<str>) -> Result<Self> {
                validate_id(value.as_ref(), $kind).map(Self)
            }

            /// Creates an identifier from a trusted string without validation.
            pub fn from_string(value: String) -> Self {
                Self(value)
            }

            /// Returns the underlying string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<&str> for $name {
            type Error = Error;

            fn try_from(value: &str) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::from_string(value)
            }
        }
    };
}

define_id_type!(
    /// Tenant identifier. All roles and assignments are partitioned by tenant.
    TenantId,
    "tenant id"
);
define_id_type!(
    /// User identifier.
    UserId,
    "user id"
);
define_id_type!(
    /// Role identifier.
    RoleId,
    "role id"
);
define_id_type!(
    /// Branch identifier. A branch is a sub-unit of a tenant; assignments may
    /// be scoped to one branch or left tenant-wide.
    BranchId,
    "branch id"
);
define_id_type!(
    /// Role assignment identifier, immutable once created.
    AssignmentId,
    "assignment id"
);
define_id_type!(
    /// Role template identifier.
    TemplateId,
    "template id"
);

#[cfg(test)]
mod tests {
    use super::{BranchId, TenantId, UserId};
    use crate::error::Error;

    #[test]
    fn id_should_trim_surrounding_whitespace() {
        let tenant = TenantId::new(" tenant_1 ").expect("tenant id");
        assert_eq!(tenant.as_str(), "tenant_1");
    }

    #[test]
    fn id_should_reject_empty_input() {
        let err = UserId::new("   ").expect_err("must reject");
        assert!(matches!(err, Error::InvalidId(_)));
        assert!(err.to_string().contains("user id"));
    }

    #[test]
    fn id_should_reject_invalid_characters() {
        let err = BranchId::new("branch 1").expect_err("must reject");
        assert!(err.to_string().contains("branch id"));
    }

    #[test]
    fn id_should_reject_overlong_input() {
        let err = TenantId::new("t".repeat(200)).expect_err("must reject");
        assert!(err.to_string().contains("length"));
    }
}
