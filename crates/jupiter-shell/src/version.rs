//! # Version Compatibility
//!
//! Client and server are compatible when their semantic-version majors match.
//! Minor, patch and pre-release are ignored.

use semver::Version;

use crate::error::PickServerError;

/// Parses the remote version marker and checks it against the local version.
///
/// Returns the parsed remote version on success.
///
/// # Errors
///
/// * [`PickServerError::InvalidRemoteVersion`] - `remote` is not semver
/// * [`PickServerError::IncompatibleVersion`] - majors differ, either direction
pub fn check_compatibility(local: &Version, remote: &str) -> Result<Version, PickServerError> {
    let trimmed = remote.trim();
    let parsed = Version::parse(trimmed.strip_prefix('v').unwrap_or(trimmed)).map_err(|e| {
        tracing::debug!(raw = %remote, error = %e, "Remote version did not parse");
        PickServerError::InvalidRemoteVersion {
            raw: remote.to_string(),
        }
    })?;

    if parsed.major != local.major {
        return Err(PickServerError::IncompatibleVersion {
            local: local.to_string(),
            remote: parsed.to_string(),
        });
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> Version {
        Version::new(3, 1, 0)
    }

    #[test]
    fn test_same_major_is_compatible() {
        let remote = check_compatibility(&local(), "3.9.9").unwrap();
        assert_eq!(remote, Version::new(3, 9, 9));
    }

    #[test]
    fn test_older_minor_is_compatible() {
        assert!(check_compatibility(&local(), "3.0.0").is_ok());
    }

    #[test]
    fn test_prerelease_is_ignored() {
        assert!(check_compatibility(&local(), "3.2.0-beta.1").is_ok());
    }

    #[test]
    fn test_newer_major_is_incompatible() {
        let err = check_compatibility(&local(), "4.0.0").unwrap_err();
        assert_eq!(
            err,
            PickServerError::IncompatibleVersion {
                local: "3.1.0".to_string(),
                remote: "4.0.0".to_string(),
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("3.1.0") && msg.contains("4.0.0"));
    }

    #[test]
    fn test_older_major_is_incompatible() {
        assert!(matches!(
            check_compatibility(&local(), "2.9.9"),
            Err(PickServerError::IncompatibleVersion { .. })
        ));
    }

    #[test]
    fn test_garbage_is_invalid_remote_version() {
        let err = check_compatibility(&local(), "not-a-version").unwrap_err();
        assert_eq!(
            err,
            PickServerError::InvalidRemoteVersion {
                raw: "not-a-version".to_string()
            }
        );
    }

    #[test]
    fn test_partial_version_is_invalid() {
        assert!(matches!(
            check_compatibility(&local(), "3.1"),
            Err(PickServerError::InvalidRemoteVersion { .. })
        ));
    }
}
