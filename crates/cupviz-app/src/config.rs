// Configuration loading and validation (cupviz.toml).

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use cupviz_core::density::MAX_SIGMA;
use cupviz_core::Normalization;
use cupviz_data::Catalog;
use serde::Deserialize;
use thiserror::Error;

/// File name under `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "cupviz.toml";

/// Smallest accepted figure edge, in pixels.
pub const MIN_FIGURE_EDGE: u32 = 64;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// cupviz.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    /// Selection key -> match event file name.
    #[serde(default)]
    pub games: BTreeMap<String, String>,
    #[serde(default)]
    pub heatmap: HeatmapConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Directory holding every CSV file; relative paths resolve against the
    /// directory the config was loaded from.
    pub dir: PathBuf,
    pub player_events: String,
    pub player_stats: String,
    pub team_stats: String,
    /// Game substituted for unknown selection keys. Unset means unknown keys
    /// are errors.
    #[serde(default)]
    pub fallback_game: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    pub match_bins: (usize, usize),
    pub player_bins: (usize, usize),
    pub sigma: f64,
    pub match_normalization: Normalization,
    pub player_normalization: Normalization,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            match_bins: cupviz_core::density::MATCH_BINS,
            player_bins: cupviz_core::density::PLAYER_BINS,
            sigma: cupviz_core::density::DEFAULT_SIGMA,
            match_normalization: Normalization::Pitch,
            player_normalization: Normalization::Pitch,
        }
    }
}

/// Output sizes as `(width, height)` in pixels.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub match_size: (u32, u32),
    pub player_size: (u32, u32),
    pub passes_size: (u32, u32),
    pub chart_size: (u32, u32),
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            match_size: (1000, 600),
            player_size: (660, 420),
            passes_size: (1200, 800),
            chart_size: (1000, 500),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory searched for `<player>.png|jpg|jpeg`.
    pub portrait_dir: Option<PathBuf>,
    /// URL used for players without an entry in `players`.
    pub default_portrait: Option<String>,
    pub timeout_secs: u64,
    /// Player name -> portrait URL.
    pub players: HashMap<String, String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            portrait_dir: None,
            default_portrait: None,
            timeout_secs: 10,
            players: HashMap::new(),
        }
    }
}

impl Config {
    /// Data catalog with `data.dir` resolved against `base_dir`.
    pub fn catalog(&self, base_dir: &Path) -> Catalog {
        Catalog {
            dir: base_dir.join(&self.data.dir),
            games: self.games.clone(),
            player_events: self.data.player_events.clone(),
            player_stats: self.data.player_stats.clone(),
            team_stats: self.data.team_stats.clone(),
            fallback_game: self.data.fallback_game.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/cupviz.toml` relative to `base_dir`, without
/// copying defaults.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    load_config_file(&base_dir.join("config").join(CONFIG_FILE))
}

/// Load and validate a config file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let text = read_file(path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();
    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Per-user config file (e.g. `~/.config/cupviz/cupviz.toml` on Linux).
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "cupviz").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Config for the current working directory, returned with the directory its
/// relative paths resolve against.
///
/// Uses `config/` (seeded from `defaults/`) when the working directory has
/// either; otherwise falls back to the per-user config file.
pub fn load_config() -> Result<(Config, PathBuf), ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    if cwd.join("defaults").exists() || cwd.join("config").exists() {
        ensure_config_files(&cwd)?;
        return Ok((load_config_from(&cwd)?, cwd));
    }
    match user_config_path() {
        Some(path) if path.exists() => {
            let base = path.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.clone());
            Ok((load_config_file(&path)?, base))
        }
        _ => Err(ConfigError::FileNotFound {
            path: cwd.join("config").join(CONFIG_FILE),
        }),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let hm = &config.heatmap;
    for (name, (bx, by)) in [("heatmap.match_bins", hm.match_bins), ("heatmap.player_bins", hm.player_bins)] {
        if bx == 0 || by == 0 {
            return Err(invalid(name, format!("must be > 0 in both dimensions, got [{bx}, {by}]")));
        }
    }

    if !(0.0..=MAX_SIGMA).contains(&hm.sigma) {
        return Err(invalid(
            "heatmap.sigma",
            format!("must be within 0..={MAX_SIGMA}, got {}", hm.sigma),
        ));
    }

    let r = &config.render;
    let sizes: &[(&str, (u32, u32))] = &[
        ("render.match_size", r.match_size),
        ("render.player_size", r.player_size),
        ("render.passes_size", r.passes_size),
        ("render.chart_size", r.chart_size),
    ];
    for (name, (w, h)) in sizes {
        if *w < MIN_FIGURE_EDGE || *h < MIN_FIGURE_EDGE {
            return Err(invalid(
                name,
                format!("must be at least {MIN_FIGURE_EDGE}x{MIN_FIGURE_EDGE}, got {w}x{h}"),
            ));
        }
    }

    if config.assets.timeout_secs == 0 {
        return Err(invalid("assets.timeout_secs", "must be > 0"));
    }

    if let Some(fallback) = &config.data.fallback_game {
        if !config.games.contains_key(fallback) {
            return Err(invalid(
                "data.fallback_game",
                format!("`{fallback}` is not a key in [games]"),
            ));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
