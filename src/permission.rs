use crate::error::{Error, Result};
use std::fmt;

const MAX_CODE_LEN: usize = 128;

/// Permission code, an opaque token such as `ENROLLMENT_CREATE`.
///
/// Codes are matched by exact equality only. There is no wildcard or prefix
/// matching; a code that is never granted is simply unreachable. Input is
/// trimmed and normalized to uppercase so that catalog data and call sites
/// cannot drift apart on casing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PermissionCode(String);

impl PermissionCode {
    /// Parses and validates a permission code.
    pub fn new(value: impl AsRef<str>) -> Result<Self> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidPermission(
                "permission code must not be empty".to_string(),
            ));
        }
        if trimmed.len() > MAX_CODE_LEN {
            return Err(Error::InvalidPermission(format!(
                "permission code length must be <= {MAX_CODE_LEN}"
            )));
        }
        let normalized = trimmed.to_ascii_uppercase();
        if !normalized
            .chars()
            .all(|ch| matches!(ch, 'A'..='Z' | '0'..='9' | '_'))
        {
            return Err(Error::InvalidPermission(
                "permission code contains invalid characters".to_string(),
            ));
        }
        Ok(Self(normalized))
    }

    /// Creates a permission code from a trusted string without validation.
    pub fn from_string(value: String) -> Self {
        Self(value)
    }

    /// Returns the underlying string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PermissionCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for PermissionCode {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<String> for PermissionCode {
    fn from(value: String) -> Self {
        Self::from_string(value)
    }
}

/// Breadth of a permission grant.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scope {
    /// Only resources owned by the acting user.
    #[cfg_attr(feature = "serde", serde(rename = "SELF"))]
    SelfOnly,
    /// Resources within the assignment's branch; a tenant-wide assignment
    /// reaches any branch of its tenant.
    #[cfg_attr(feature = "serde", serde(rename = "BRANCH"))]
    Branch,
    /// Resources anywhere within the assignment's tenant.
    #[cfg_attr(feature = "serde", serde(rename = "TENANT"))]
    Tenant,
    /// No restriction.
    #[cfg_attr(feature = "serde", serde(rename = "ALL"))]
    All,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scope::SelfOnly => "SELF",
            Scope::Branch => "BRANCH",
            Scope::Tenant => "TENANT",
            Scope::All => "ALL",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::{PermissionCode, Scope};
    use crate::error::Error;

    #[test]
    fn code_should_trim_and_uppercase() {
        let code = PermissionCode::try_from(" enrollment_create ").unwrap();
        assert_eq!(code.as_str(), "ENROLLMENT_CREATE");
    }

    #[test]
    fn code_should_reject_empty_input() {
        let result = PermissionCode::try_from("   ");
        assert!(matches!(result, Err(Error::InvalidPermission(_))));
    }

    #[test]
    fn code_should_reject_wildcard_characters() {
        let result = PermissionCode::try_from("ENROLLMENT_*");
        assert!(matches!(result, Err(Error::InvalidPermission(_))));
    }

    #[test]
    fn code_matching_is_exact_equality() {
        let granted = PermissionCode::try_from("enrollment_create").unwrap();
        let required = PermissionCode::try_from("ENROLLMENT_CREATE").unwrap();
        assert_eq!(granted, required);

        let other = PermissionCode::try_from("ENROLLMENT_DELETE").unwrap();
        assert_ne!(granted, other);
    }

    #[test]
    fn scope_display_matches_wire_names() {
        assert_eq!(Scope::SelfOnly.to_string(), "SELF");
        assert_eq!(Scope::All.to_string(), "ALL");
    }
}
