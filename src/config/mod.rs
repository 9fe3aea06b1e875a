/// Configuration system for tubestat.
///
/// Layers, lowest precedence first:
///
/// 1. **Built-in defaults** from [`schema::TubestatConfig::default()`]
/// 2. **User global config** at `~/.tubestat/config.toml`
/// 3. **Project local config** at `.tubestat.toml` in the working directory
/// 4. **Environment variables** (`TUBESTAT_*`, `GEMINI_API_KEY`)
///
/// File layers are merged key by key, so a project file that only sets
/// `dashboard.addr` keeps everything the global file set.
///
/// The YouTube API key is not part of this file; see [`credential`].
pub mod credential;
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::TubestatConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> TubestatConfig {
    let paths = [global_config_path(), project_config_path()];
    let mut config = load_layers(paths.iter().flatten().map(PathBuf::as_path));
    apply_env_overrides(&mut config);
    config
}

/// Merge the given TOML files over the defaults, in order.
///
/// Missing or malformed files are skipped; a broken project file should
/// not stop a search.
pub fn load_layers<'a>(paths: impl IntoIterator<Item = &'a Path>) -> TubestatConfig {
    let mut merged = defaults_value();

    for path in paths {
        if let Some(layer) = read_toml_value(path) {
            merge_values(&mut merged, layer);
        }
    }

    merged.try_into().unwrap_or_default()
}

fn defaults_value() -> toml::Value {
    toml::Value::try_from(TubestatConfig::default())
        .unwrap_or_else(|_| toml::Value::Table(toml::map::Map::new()))
}

fn read_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    // Reject layers that would not deserialize on their own.
    value.clone().try_into::<TubestatConfig>().ok()?;
    Some(value)
}

/// Recursively overlay `overlay` onto `base`. Tables merge; everything else
/// replaces.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// `~/.tubestat`, home of the config, credential and event files.
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tubestat"))
}

fn global_config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".tubestat.toml"))
}

/// Path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// - `TUBESTAT_YOUTUBE_URL`: Data API base URL
/// - `TUBESTAT_SUMMARIZER`: enable/disable the trend summary
/// - `TUBESTAT_SUMMARIZER_PROVIDER`: `gemini` or `ollama`
/// - `TUBESTAT_SUMMARIZER_MODEL`: model name
/// - `GEMINI_API_KEY`: Gemini key
/// - `TUBESTAT_LOG`: event log on/off
fn apply_env_overrides(config: &mut TubestatConfig) {
    apply_overrides(config, |name| std::env::var(name).ok());
}

fn apply_overrides(config: &mut TubestatConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("TUBESTAT_YOUTUBE_URL")
        && !val.is_empty()
    {
        config.youtube.api_url = val;
    }

    if let Some(val) = var("TUBESTAT_SUMMARIZER") {
        config.summarizer.enabled = is_truthy(&val);
    }
    if let Some(val) = var("TUBESTAT_SUMMARIZER_PROVIDER")
        && let Some(provider) = parse_provider(&val)
    {
        config.summarizer.provider = provider;
    }
    if let Some(val) = var("TUBESTAT_SUMMARIZER_MODEL")
        && !val.is_empty()
    {
        config.summarizer.model = val;
    }
    if let Some(val) = var("GEMINI_API_KEY")
        && !val.is_empty()
    {
        config.summarizer.api_key = val;
    }

    if let Some(val) = var("TUBESTAT_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
pub fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_provider(val: &str) -> Option<schema::Provider> {
    match val.to_ascii_lowercase().as_str() {
        "gemini" | "google" => Some(schema::Provider::Gemini),
        "ollama" | "local" => Some(schema::Provider::Ollama),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the annotated default config to `~/.tubestat/config.toml`.
///
/// Fails if the file exists, unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    write_default_config(&path, force)?;
    Ok(path)
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, TubestatConfig::default_toml()).context("failed to write config file")?;

    Ok(())
}

/// Set a single dotted key (e.g. `summarizer.provider`) in the global config.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_value_in_file(&path, key, value)
}

/// Set a dotted key in a specific config file, creating it from defaults
/// when missing. The result must still deserialize as a valid config.
pub fn set_value_in_file(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut root = if path.exists() {
        let content = fs::read_to_string(path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config as TOML value")?
    } else {
        defaults_value()
    };

    set_toml_value(&mut root, key, value)?;

    root.clone()
        .try_into::<TubestatConfig>()
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The existing value's type decides how `raw_value` is parsed. Unknown
/// keys are an error; sections missing from a sparse file are created.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((section, leaf)) = key.split_once('.') else {
        anyhow::bail!("config keys take the form section.key, got '{key}'");
    };

    let known = defaults_value();
    let template = known
        .get(section)
        .and_then(|s| s.get(leaf))
        .with_context(|| format!("config key not found: '{key}'"))?;

    let table = root
        .as_table_mut()
        .context("config root is not a table")?
        .entry(section.to_string())
        .or_insert_with(|| toml::Value::Table(toml::map::Map::new()))
        .as_table_mut()
        .with_context(|| format!("expected table at '{section}'"))?;

    let new_value = match template {
        toml::Value::Boolean(_) => toml::Value::Boolean(is_truthy(raw_value)),
        toml::Value::Integer(_) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        toml::Value::Float(_) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// The effective (fully resolved) config as TOML. The Gemini key is masked.
pub fn show_effective_config() -> Result<String> {
    let mut config = load();
    if !config.summarizer.api_key.is_empty() {
        config.summarizer.api_key = credential::mask(&config.summarizer.api_key);
    }
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SortField;
    use schema::Provider;

    #[test]
    fn is_truthy_accepts_variants() {
        for yes in ["1", "true", "TRUE", "yes", "On"] {
            assert!(is_truthy(yes), "{yes}");
        }
        for no in ["0", "false", "no", "off", ""] {
            assert!(!is_truthy(no), "{no}");
        }
    }

    #[test]
    fn parse_provider_handles_variants() {
        assert_eq!(parse_provider("Gemini"), Some(Provider::Gemini));
        assert_eq!(parse_provider("ollama"), Some(Provider::Ollama));
        assert_eq!(parse_provider("local"), Some(Provider::Ollama));
        assert_eq!(parse_provider("openai"), None);
    }

    #[test]
    fn layers_merge_key_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        fs::write(&global, "[summarizer]\nprovider = \"ollama\"\ntop_n = 5\n").unwrap();
        fs::write(&project, "[summarizer]\ntop_n = 3\n[dashboard]\naddr = \"0.0.0.0:80\"\n")
            .unwrap();

        let config = load_layers([global.as_path(), project.as_path()]);
        assert_eq!(config.summarizer.provider, Provider::Ollama);
        assert_eq!(config.summarizer.top_n, 3);
        assert_eq!(config.dashboard.addr, "0.0.0.0:80");
        assert_eq!(config.youtube.max_results, 50);
    }

    #[test]
    fn malformed_layer_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.toml");
        let missing = dir.path().join("missing.toml");
        fs::write(&bad, "[summarizer]\ntop_n = \"many\"\n").unwrap();

        let config = load_layers([bad.as_path(), missing.as_path()]);
        assert_eq!(config.summarizer.top_n, 10);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = TubestatConfig::default();
        apply_overrides(&mut config, |name| match name {
            "TUBESTAT_SUMMARIZER" => Some("off".to_string()),
            "TUBESTAT_SUMMARIZER_PROVIDER" => Some("ollama".to_string()),
            "GEMINI_API_KEY" => Some("g-key".to_string()),
            "TUBESTAT_LOG" => Some("0".to_string()),
            _ => None,
        });
        assert!(!config.summarizer.enabled);
        assert_eq!(config.summarizer.provider, Provider::Ollama);
        assert_eq!(config.summarizer.api_key, "g-key");
        assert!(!config.logging.enabled);
        assert_eq!(config.youtube.api_url, TubestatConfig::default().youtube.api_url);
    }

    #[test]
    fn set_toml_value_parses_by_type() {
        let mut root = defaults_value();
        set_toml_value(&mut root, "summarizer.enabled", "no").unwrap();
        set_toml_value(&mut root, "youtube.max_results", "25").unwrap();
        set_toml_value(&mut root, "summarizer.temperature", "0.2").unwrap();
        set_toml_value(&mut root, "dashboard.default_sort", "vph").unwrap();

        let config: TubestatConfig = root.try_into().unwrap();
        assert!(!config.summarizer.enabled);
        assert_eq!(config.youtube.max_results, 25);
        assert!((config.summarizer.temperature - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.dashboard.default_sort, SortField::Vph);
    }

    #[test]
    fn set_toml_value_rejects_unknown_or_bad_values() {
        let mut root = defaults_value();
        assert!(set_toml_value(&mut root, "nonexistent.key", "v").is_err());
        assert!(set_toml_value(&mut root, "youtube", "v").is_err());
        assert!(set_toml_value(&mut root, "youtube.max_results", "lots").is_err());
    }

    #[test]
    fn set_value_in_sparse_file_creates_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[logging]\nenabled = true\n").unwrap();

        set_value_in_file(&path, "summarizer.provider", "ollama").unwrap();
        let config = load_layers([path.as_path()]);
        assert_eq!(config.summarizer.provider, Provider::Ollama);

        assert!(set_value_in_file(&path, "summarizer.provider", "openai").is_err());
    }

    #[test]
    fn default_config_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        write_default_config(&path, false).unwrap();
        assert!(write_default_config(&path, false).is_err());
        write_default_config(&path, true).unwrap();
        assert_eq!(load_layers([path.as_path()]).dashboard.keyword_limit, 15);
    }
}
