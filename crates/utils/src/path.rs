use std::path::PathBuf;

/// Expand a leading `~` or `~/` to the user's home directory.
///
/// Paths without a tilde prefix are returned unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde_plain_path() {
        assert_eq!(expand_tilde("/var/lib/runlog"), PathBuf::from("/var/lib/runlog"));
        assert_eq!(expand_tilde("relative/path"), PathBuf::from("relative/path"));
    }

    #[test]
    fn test_expand_tilde_prefix() {
        let expanded = expand_tilde("~/runlog/db.sqlite");
        assert!(!expanded.to_string_lossy().contains('~'));
        assert!(expanded.ends_with("runlog/db.sqlite"));
    }
}
