use std::path::{Path, PathBuf};

use crate::application::{ApplicationError, ApplicationResult};

/// Expand `~`, `$VAR` and `${VAR}` in a user supplied path.
///
/// Unknown variables leave the path untouched.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

pub fn ensure_file_exists(path: &Path) -> ApplicationResult<()> {
    if !path.exists() {
        Err(not_a_file(path, "file not found"))
    } else if !path.is_file() {
        Err(not_a_file(path, "not a file"))
    } else {
        Ok(())
    }
}

fn not_a_file(path: &Path, reason: &str) -> ApplicationError {
    ApplicationError::OperationFailed {
        context: path.display().to_string(),
        source: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_tilde() {
        let home = std::env::var("HOME").expect("HOME should be set");
        let expanded = expand_path(Path::new("~/orders/a.toml"));
        assert!(expanded.starts_with(&home));
    }

    #[test]
    fn test_expand_path_unknown_variable_is_untouched() {
        let path = Path::new("$CARTCALC_SURELY_UNSET_VAR/a.toml");
        assert_eq!(expand_path(path), path.to_path_buf());
    }

    #[test]
    fn test_ensure_file_exists_rejects_directory() {
        let dir = std::env::temp_dir();
        assert!(ensure_file_exists(&dir).is_err());
    }
}
