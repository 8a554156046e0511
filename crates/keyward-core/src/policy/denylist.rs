//! Built-in list of commonly used passwords and denylist file loading.
//!
//! Entries are compared against the lower-cased candidate, so they are
//! stored lower-cased as well.

use std::collections::HashSet;
use std::path::Path;

use crate::{Error, Result, TRACING_TARGET_PASSWORD_POLICY};

/// Passwords rejected regardless of composition compliance.
///
/// Drawn from public breach-frequency lists. Many of these pass every
/// composition rule.
pub const COMMON_PASSWORDS: &[&str] = &[
    "123456",
    "123456789",
    "12345678",
    "password",
    "qwerty123",
    "qwerty1!",
    "1q2w3e4r",
    "iloveyou",
    "000000",
    "abc123",
    "password1",
    "password1!",
    "password12!",
    "password123",
    "password123!",
    "password@123",
    "passw0rd",
    "passw0rd!",
    "p@ssw0rd",
    "p@ssw0rd1",
    "p@ssword1",
    "p@ssword123",
    "admin",
    "admin123",
    "admin@123",
    "admin123!",
    "administrator1!",
    "welcome",
    "welcome1",
    "welcome1!",
    "welcome123!",
    "welcome@123",
    "letmein",
    "letmein1!",
    "qwerty",
    "qwerty123!",
    "qwerty@123",
    "qwertyuiop",
    "asdfghjkl",
    "zaq12wsx",
    "zaq1@wsx",
    "1qaz2wsx",
    "1qaz@wsx",
    "!qaz2wsx",
    "changeme",
    "changeme1!",
    "changeme123!",
    "trustno1",
    "monkey",
    "dragon",
    "sunshine",
    "princess",
    "football",
    "football1!",
    "baseball",
    "master",
    "superman",
    "batman",
    "starwars",
    "hello123",
    "hello@123",
    "summer2023!",
    "summer2024!",
    "summer2025!",
    "winter2023!",
    "winter2024!",
    "winter2025!",
    "spring2024!",
    "autumn2024!",
    "january2024!",
    "secret123!",
    "test@123",
    "test1234!",
    "login123!",
    "user@123",
    "root@123",
    "india@123",
    "pass@123",
    "pass@1234",
    "abcd@1234",
    "abc@1234",
    "abcd1234!",
    "company123!",
    "temp1234!",
    "temppass1!",
    "default1!",
];

/// Returns the built-in denylist as an owned set.
pub(crate) fn builtin() -> HashSet<String> {
    COMMON_PASSWORDS.iter().map(|entry| entry.to_string()).collect()
}

/// Normalizes a denylist entry or candidate for comparison.
#[inline]
pub(crate) fn normalize(entry: &str) -> String {
    entry.to_lowercase()
}

/// Parses denylist file contents: one entry per line, blank lines and lines
/// starting with `#` are skipped.
pub(crate) fn parse(contents: &str) -> impl Iterator<Item = String> + '_ {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(normalize)
}

/// Reads additional denylist entries from a file.
pub(crate) fn load(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!(
            target: TRACING_TARGET_PASSWORD_POLICY,
            path = %path.display(),
            error = %e,
            "failed to read denylist file"
        );

        Error::config(format!("cannot read denylist file {}", path.display())).with_source(e)
    })?;

    let entries: Vec<String> = parse(&contents).collect();

    tracing::info!(
        target: TRACING_TARGET_PASSWORD_POLICY,
        path = %path.display(),
        entries = entries.len(),
        "loaded denylist file"
    );

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_builtin_entries_are_normalized() {
        for entry in COMMON_PASSWORDS {
            assert_eq!(*entry, normalize(entry), "{entry} is not lower-cased");
        }
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let contents = "# company specific\n\nAcme2024!\n   \n  Hunter2  \n";
        let entries: Vec<String> = parse(contents).collect();
        assert_eq!(entries, vec!["acme2024!".to_string(), "hunter2".to_string()]);
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "# extra entries")?;
        writeln!(file, "Keyward2024!")?;

        let entries = load(file.path())?;
        assert_eq!(entries, vec!["keyward2024!".to_string()]);
        Ok(())
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let error = load(Path::new("/nonexistent/keyward/denylist.txt")).unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::Config);
    }
}
