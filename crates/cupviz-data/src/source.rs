// Data access: the `DataSource` trait the dashboard queries, a CSV-backed
// implementation that reads files on demand, and an in-memory one for
// fixtures.

use std::collections::BTreeMap;
use std::path::PathBuf;

use cupviz_core::Point;
use tracing::{debug, info, warn};

use crate::rows::{self, PlayerEvent, PlayerStat, TeamStat};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("data file {path} is unavailable: {source}")]
    Unavailable {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path} has no usable x/y coordinate columns")]
    MissingColumns { path: String },

    #[error("unknown {kind} `{key}`")]
    UnknownSelection { kind: &'static str, key: String },

    #[error("data directory {0} does not exist")]
    MissingDirectory(String),
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Where the input files live and which game keys map to which file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub dir: PathBuf,
    /// Selection key (e.g. `ARG-AUS`) to match event file name.
    pub games: BTreeMap<String, String>,
    pub player_events: String,
    pub player_stats: String,
    pub team_stats: String,
    /// Game used in place of an unknown key. `None` makes unknown keys an error.
    pub fallback_game: Option<String>,
}

impl Catalog {
    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// File for `game`, substituting the fallback game when one is configured.
    pub fn resolve_game(&self, game: &str) -> Result<&str, DataError> {
        if let Some(file) = self.games.get(game) {
            return Ok(file.as_str());
        }
        match self.fallback_game.as_deref() {
            Some(fallback) => match self.games.get(fallback) {
                Some(file) => {
                    warn!("unknown game '{}', substituting fallback '{}'", game, fallback);
                    Ok(file.as_str())
                }
                None => Err(DataError::UnknownSelection {
                    kind: "fallback game",
                    key: fallback.to_string(),
                }),
            },
            None => Err(DataError::UnknownSelection {
                kind: "game",
                key: game.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Read-only query interface behind every visualization.
pub trait DataSource: Send + Sync {
    /// Game selection keys, in catalog order.
    fn games(&self) -> Vec<String>;

    /// Raw event coordinates for one game.
    fn match_events(&self, game: &str) -> Result<Vec<Point>, DataError>;

    /// Events for one player of one team.
    fn player_events(&self, team: &str, player: &str) -> Result<Vec<PlayerEvent>, DataError>;

    /// Distinct teams in first-seen order.
    fn teams(&self) -> Result<Vec<String>, DataError>;

    /// Distinct players of `team` in first-seen order; empty for an unknown team.
    fn players(&self, team: &str) -> Result<Vec<String>, DataError>;

    fn player_stats(&self) -> Result<Vec<PlayerStat>, DataError>;

    fn team_stats(&self) -> Result<Vec<TeamStat>, DataError>;

    /// Release the source. Queries after `close` are not expected.
    fn close(&self) {}
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !out.iter().any(|seen| seen == v) {
            out.push(v.to_string());
        }
    }
    out
}

fn select_player(events: Vec<PlayerEvent>, team: &str, player: &str) -> Vec<PlayerEvent> {
    events
        .into_iter()
        .filter(|e| e.team == team && e.player == player)
        .collect()
}

// ---------------------------------------------------------------------------
// CSV-backed source
// ---------------------------------------------------------------------------

/// Reads the catalog's files on every query; nothing is cached.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    catalog: Catalog,
}

impl CsvDataSource {
    /// Open a source over `catalog`. Fails if the data directory is missing.
    pub fn open(catalog: Catalog) -> Result<Self, DataError> {
        if !catalog.dir.is_dir() {
            return Err(DataError::MissingDirectory(catalog.dir.display().to_string()));
        }
        info!(
            "opened data source at {} with {} games",
            catalog.dir.display(),
            catalog.games.len()
        );
        Ok(Self { catalog })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn all_player_events(&self) -> Result<Vec<PlayerEvent>, DataError> {
        rows::load_player_events(&self.catalog.path(&self.catalog.player_events))
    }
}

impl DataSource for CsvDataSource {
    fn games(&self) -> Vec<String> {
        self.catalog.games.keys().cloned().collect()
    }

    fn match_events(&self, game: &str) -> Result<Vec<Point>, DataError> {
        let file = self.catalog.resolve_game(game)?;
        let path = self.catalog.path(file);
        let points = rows::load_match_events(&path)?;
        debug!("loaded {} events for '{}' from {}", points.len(), game, path.display());
        Ok(points)
    }

    fn player_events(&self, team: &str, player: &str) -> Result<Vec<PlayerEvent>, DataError> {
        Ok(select_player(self.all_player_events()?, team, player))
    }

    fn teams(&self) -> Result<Vec<String>, DataError> {
        let events = self.all_player_events()?;
        Ok(distinct(events.iter().map(|e| e.team.as_str())))
    }

    fn players(&self, team: &str) -> Result<Vec<String>, DataError> {
        let events = self.all_player_events()?;
        Ok(distinct(
            events
                .iter()
                .filter(|e| e.team == team)
                .map(|e| e.player.as_str()),
        ))
    }

    fn player_stats(&self) -> Result<Vec<PlayerStat>, DataError> {
        rows::load_player_stats(&self.catalog.path(&self.catalog.player_stats))
    }

    fn team_stats(&self) -> Result<Vec<TeamStat>, DataError> {
        rows::load_team_stats(&self.catalog.path(&self.catalog.team_stats))
    }

    fn close(&self) {
        debug!("closed data source at {}", self.catalog.dir.display());
    }
}

// ---------------------------------------------------------------------------
// In-memory source
// ---------------------------------------------------------------------------

/// Fixture source holding every table in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    pub games: BTreeMap<String, Vec<Point>>,
    pub player_events: Vec<PlayerEvent>,
    pub player_stats: Vec<PlayerStat>,
    pub team_stats: Vec<TeamStat>,
    pub fallback_game: Option<String>,
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_game(mut self, key: impl Into<String>, points: Vec<Point>) -> Self {
        self.games.insert(key.into(), points);
        self
    }

    pub fn with_player_events(mut self, events: Vec<PlayerEvent>) -> Self {
        self.player_events = events;
        self
    }

    pub fn with_player_stats(mut self, stats: Vec<PlayerStat>) -> Self {
        self.player_stats = stats;
        self
    }

    pub fn with_team_stats(mut self, stats: Vec<TeamStat>) -> Self {
        self.team_stats = stats;
        self
    }

    pub fn with_fallback_game(mut self, key: impl Into<String>) -> Self {
        self.fallback_game = Some(key.into());
        self
    }
}

impl DataSource for InMemoryDataSource {
    fn games(&self) -> Vec<String> {
        self.games.keys().cloned().collect()
    }

    fn match_events(&self, game: &str) -> Result<Vec<Point>, DataError> {
        if let Some(points) = self.games.get(game) {
            return Ok(points.clone());
        }
        let fallback = self.fallback_game.as_deref().ok_or_else(|| DataError::UnknownSelection {
            kind: "game",
            key: game.to_string(),
        })?;
        let points = self.games.get(fallback).ok_or_else(|| DataError::UnknownSelection {
            kind: "fallback game",
            key: fallback.to_string(),
        })?;
        warn!("unknown game '{}', substituting fallback '{}'", game, fallback);
        Ok(points.clone())
    }

    fn player_events(&self, team: &str, player: &str) -> Result<Vec<PlayerEvent>, DataError> {
        Ok(select_player(self.player_events.clone(), team, player))
    }

    fn teams(&self) -> Result<Vec<String>, DataError> {
        Ok(distinct(self.player_events.iter().map(|e| e.team.as_str())))
    }

    fn players(&self, team: &str) -> Result<Vec<String>, DataError> {
        Ok(distinct(
            self.player_events
                .iter()
                .filter(|e| e.team == team)
                .map(|e| e.player.as_str()),
        ))
    }

    fn player_stats(&self) -> Result<Vec<PlayerStat>, DataError> {
        Ok(self.player_stats.clone())
    }

    fn team_stats(&self) -> Result<Vec<TeamStat>, DataError> {
        Ok(self.team_stats.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
