//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.mango/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MangoConfig {
    #[serde(default)]
    pub python: PythonConfig,
    #[serde(default)]
    pub rain: RainConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PythonConfig {
    pub enabled: Option<bool>,
    pub program: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RainConfig {
    pub enabled: Option<bool>,
    pub tick_ms: Option<u64>,
    pub charset: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LinksConfig {
    pub open_in_browser: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LogConfig {
    pub file: Option<String>,
    pub level: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_PYTHON_PROGRAM: &str = "python3";
pub const DEFAULT_RAIN_TICK_MS: u64 = 50;
/// Floor for `rain.tick_ms`.
pub const MIN_RAIN_TICK_MS: u64 = 10;
pub const DEFAULT_RAIN_CHARSET: &str = "01";
pub const DEFAULT_RAIN_COLOR: &str = "#800080";
pub const DEFAULT_LOG_FILE: &str = "mango.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RainSettings {
    pub enabled: bool,
    pub tick: Duration,
    pub charset: String,
    /// Hex colour string; parsed by the TUI since core knows nothing about ratatui.
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// `None` means `py` mode is switched off.
    pub python_program: Option<String>,
    pub rain: RainSettings,
    pub open_links: bool,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

/// Flags from the command line. `None`/`false` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub python: Option<String>,
    pub no_python: bool,
    pub no_rain: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.mango/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".mango").join("config.toml"))
}

/// Load config from an explicit path, or from `~/.mango/config.toml`.
///
/// An explicit path must exist. The default path is generated (commented
/// out) when missing, and `MangoConfig::default()` is returned.
pub fn load_config(explicit: Option<&Path>) -> Result<MangoConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(MangoConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(MangoConfig::default());
    }

    load_config_from(&path)
}

/// Parse the TOML file at `path`.
pub fn load_config_from(path: &Path) -> Result<MangoConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: MangoConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r##"# Mango Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [python]
# enabled = true
# program = "python3"                # Or set MANGO_PYTHON, or pass --python

# [rain]
# enabled = true                     # --no-rain turns it off
# tick_ms = 50
# charset = "01"
# color = "#800080"

# [links]
# open_in_browser = true

# [log]
# file = "mango.log"
# level = "debug"                    # Or set MANGO_LOG_LEVEL
"##;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &MangoConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], with the environment lookup injected.
pub fn resolve_with_env(
    config: &MangoConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Python: CLI switch-off beats everything, then CLI → env → config → default
    let python_enabled = !cli.no_python && config.python.enabled.unwrap_or(true);
    let python_program = python_enabled.then(|| {
        cli.python
            .clone()
            .or_else(|| env("MANGO_PYTHON"))
            .or_else(|| config.python.program.clone())
            .unwrap_or_else(|| DEFAULT_PYTHON_PROGRAM.to_string())
    });

    let tick_ms = config
        .rain
        .tick_ms
        .unwrap_or(DEFAULT_RAIN_TICK_MS)
        .max(MIN_RAIN_TICK_MS);

    let charset = config
        .rain
        .charset
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_RAIN_CHARSET.to_string());

    let rain = RainSettings {
        enabled: !cli.no_rain && config.rain.enabled.unwrap_or(true),
        tick: Duration::from_millis(tick_ms),
        charset,
        color: config
            .rain
            .color
            .clone()
            .unwrap_or_else(|| DEFAULT_RAIN_COLOR.to_string()),
    };

    // Log level: env → config → default
    let log_level = env("MANGO_LOG_LEVEL")
        .or_else(|| config.log.level.clone())
        .and_then(|level| match LevelFilter::from_str(&level) {
            Ok(filter) => Some(filter),
            Err(_) => {
                warn!("Unknown log level {:?}, using default", level);
                None
            }
        })
        .unwrap_or(DEFAULT_LOG_LEVEL);

    ResolvedConfig {
        python_program,
        rain,
        open_links: config.links.open_in_browser.unwrap_or(true),
        log_file: PathBuf::from(
            config
                .log
                .file
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
        ),
        log_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config_parses() {
        let config = MangoConfig::default();
        assert!(config.python.program.is_none());
        assert!(config.rain.enabled.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&MangoConfig::default(), &CliOverrides::default(), no_env);
        assert_eq!(resolved.python_program.as_deref(), Some(DEFAULT_PYTHON_PROGRAM));
        assert!(resolved.rain.enabled);
        assert_eq!(resolved.rain.tick, Duration::from_millis(DEFAULT_RAIN_TICK_MS));
        assert_eq!(resolved.rain.charset, "01");
        assert_eq!(resolved.rain.color, "#800080");
        assert!(resolved.open_links);
        assert_eq!(resolved.log_file, PathBuf::from("mango.log"));
        assert_eq!(resolved.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing, everything else stays default
        let toml_str = r#"
[rain]
charset = "アイウ"
"#;
        let config: MangoConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.rain.charset.as_deref(), Some("アイウ"));
        assert!(config.rain.tick_ms.is_none());
        assert!(config.python.enabled.is_none());
    }

    #[test]
    fn test_full_toml_resolves() {
        let toml_str = r##"
[python]
enabled = true
program = "/opt/python/bin/python3.12"

[rain]
enabled = false
tick_ms = 80
charset = "xyz"
color = "#00ff00"

[links]
open_in_browser = false

[log]
file = "/tmp/mango-test.log"
level = "warn"
"##;
        let config: MangoConfig = toml::from_str(toml_str).unwrap();
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(
            resolved.python_program.as_deref(),
            Some("/opt/python/bin/python3.12")
        );
        assert!(!resolved.rain.enabled);
        assert_eq!(resolved.rain.tick, Duration::from_millis(80));
        assert_eq!(resolved.rain.charset, "xyz");
        assert_eq!(resolved.rain.color, "#00ff00");
        assert!(!resolved.open_links);
        assert_eq!(resolved.log_file, PathBuf::from("/tmp/mango-test.log"));
        assert_eq!(resolved.log_level, LevelFilter::Warn);
    }

    #[test]
    fn test_python_precedence_cli_env_file() {
        let config = MangoConfig {
            python: PythonConfig {
                enabled: None,
                program: Some("from-file".to_string()),
            },
            ..Default::default()
        };

        let env = |key: &str| (key == "MANGO_PYTHON").then(|| "from-env".to_string());
        let resolved = resolve_with_env(&config, &CliOverrides::default(), env);
        assert_eq!(resolved.python_program.as_deref(), Some("from-env"));

        let cli = CliOverrides {
            python: Some("from-cli".to_string()),
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &cli, env);
        assert_eq!(resolved.python_program.as_deref(), Some("from-cli"));

        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.python_program.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_python_can_be_switched_off() {
        let cli = CliOverrides {
            no_python: true,
            ..Default::default()
        };
        let resolved = resolve_with_env(&MangoConfig::default(), &cli, no_env);
        assert!(resolved.python_program.is_none());

        let config = MangoConfig {
            python: PythonConfig {
                enabled: Some(false),
                program: Some("python3".to_string()),
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert!(resolved.python_program.is_none());
    }

    #[test]
    fn test_no_rain_flag_wins_over_file() {
        let config = MangoConfig {
            rain: RainConfig {
                enabled: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            no_rain: true,
            ..Default::default()
        };
        assert!(!resolve_with_env(&config, &cli, no_env).rain.enabled);
    }

    #[test]
    fn test_rain_tick_is_clamped_and_blank_charset_ignored() {
        let config = MangoConfig {
            rain: RainConfig {
                tick_ms: Some(1),
                charset: Some("   ".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.rain.tick, Duration::from_millis(MIN_RAIN_TICK_MS));
        assert_eq!(resolved.rain.charset, DEFAULT_RAIN_CHARSET);
    }

    #[test]
    fn test_log_level_env_wins_and_garbage_falls_back() {
        let config = MangoConfig {
            log: LogConfig {
                file: None,
                level: Some("error".to_string()),
            },
            ..Default::default()
        };
        let env = |key: &str| (key == "MANGO_LOG_LEVEL").then(|| "info".to_string());
        assert_eq!(
            resolve_with_env(&config, &CliOverrides::default(), env).log_level,
            LevelFilter::Info
        );

        let garbage = |key: &str| (key == "MANGO_LOG_LEVEL").then(|| "loud".to_string());
        assert_eq!(
            resolve_with_env(&config, &CliOverrides::default(), garbage).log_level,
            DEFAULT_LOG_LEVEL
        );
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[python]\nprogram = \"pypy3\"").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.python.program.as_deref(), Some("pypy3"));
    }

    #[test]
    fn test_load_config_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[python\nprogram = ").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("config parse error"));
    }

    #[test]
    fn test_load_config_missing_explicit_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_generated_default_config_is_valid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        generate_default_config(&path);

        let config = load_config_from(&path).unwrap();
        assert!(config.python.program.is_none());
        assert!(config.rain.enabled.is_none());
    }
}
