//! Persisted YouTube API key.
//!
//! The key is the only state that survives between sessions. It is stored
//! as `{"yt_analysis_key": "..."}` in `~/.tubestat/credentials.json`;
//! `TUBESTAT_API_KEY` overrides the file for a single process.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

/// Fixed key the credential is stored under.
pub const CREDENTIAL_KEY: &str = "yt_analysis_key";

const ENV_API_KEY: &str = "TUBESTAT_API_KEY";

/// Path to the credential file.
pub fn credential_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tubestat").join("credentials.json"))
}

/// Resolve the API key: environment first, then the credential file.
pub fn load_api_key() -> Option<String> {
    load_api_key_from(credential_path().as_deref())
}

/// Like [`load_api_key`], reading from a specific credential file.
pub fn load_api_key_from(path: Option<&Path>) -> Option<String> {
    if let Ok(val) = std::env::var(ENV_API_KEY)
        && !val.trim().is_empty()
    {
        return Some(val.trim().to_string());
    }
    path.and_then(read_api_key)
}

/// Read the stored key from a specific file. Missing or malformed files
/// read as "no key".
pub fn read_api_key(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let value: Value = serde_json::from_str(&content).ok()?;
    value
        .get(CREDENTIAL_KEY)?
        .as_str()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

/// Persist the key to the default credential file.
pub fn save_api_key(key: &str) -> Result<PathBuf> {
    let path = credential_path().context("could not determine home directory")?;
    write_api_key(&path, key)?;
    Ok(path)
}

/// Persist the key to a specific file. An empty key removes the entry.
///
/// Other keys already in the file are preserved.
pub fn write_api_key(path: &Path, key: &str) -> Result<()> {
    let mut map = fs::read_to_string(path)
        .ok()
        .and_then(|c| serde_json::from_str::<Map<String, Value>>(&c).ok())
        .unwrap_or_default();

    let key = key.trim();
    if key.is_empty() {
        map.remove(CREDENTIAL_KEY);
    } else {
        map.insert(CREDENTIAL_KEY.to_string(), Value::String(key.to_string()));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create credential directory")?;
    }
    let json = serde_json::to_string_pretty(&map).context("failed to serialize credentials")?;
    fs::write(path, json).context("failed to write credential file")?;

    Ok(())
}

/// Remove the stored key from the default credential file.
pub fn clear_api_key() -> Result<PathBuf> {
    save_api_key("")
}

/// Mask a key for display: first four characters, then asterisks.
pub fn mask(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    let hidden = key.chars().count().saturating_sub(4).min(12);
    format!("{visible}{}", "*".repeat(hidden))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        assert!(read_api_key(&path).is_none());
        write_api_key(&path, "  AIzaSecret  ").unwrap();
        assert_eq!(read_api_key(&path).as_deref(), Some("AIzaSecret"));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"yt_analysis_key\""));
    }

    #[test]
    fn empty_key_removes_entry_and_keeps_others() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{ "other": 1, "yt_analysis_key": "abc" }"#).unwrap();

        write_api_key(&path, "").unwrap();
        assert!(read_api_key(&path).is_none());
        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["other"], 1);
    }

    #[test]
    fn malformed_file_reads_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "not json").unwrap();
        assert!(read_api_key(&path).is_none());

        // and is replaced on the next write
        write_api_key(&path, "k").unwrap();
        assert_eq!(read_api_key(&path).as_deref(), Some("k"));
    }

    #[test]
    fn mask_hides_tail() {
        assert_eq!(mask("AIzaSyABCDEF"), "AIza********");
        assert_eq!(mask("abc"), "abc");
        assert_eq!(mask(""), "");
    }
}
