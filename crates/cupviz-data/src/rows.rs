// Tabular input loading: match event files, the expanded player event file,
// player statistics and team statistics.
//
// Malformed or non-finite rows are skipped with a warning; a file that
// cannot be opened or has no usable header is an error.

use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use cupviz_core::Point;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::DataError;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One action by a player, with an end point for directional events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerEvent {
    pub team: String,
    pub player: String,
    pub start: Point,
    pub end: Option<Point>,
}

/// Season totals for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerStat {
    pub player: String,
    pub goals: u32,
    pub assists: u32,
}

/// Tournament record for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamStat {
    pub team: String,
    pub wins: u32,
    pub losses: u32,
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawPlayerEvent {
    Team: String,
    Player: String,
    X: f64,
    Y: f64,
    #[serde(default)]
    X2: Option<f64>,
    #[serde(default)]
    Y2: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawPlayerStat {
    #[serde(alias = "Player")]
    player: String,
    #[serde(alias = "Goals")]
    goals: f64,
    #[serde(alias = "Assists")]
    assists: f64,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawTeamStat {
    Team: String,
    Wins: f64,
    Losses: f64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Position of the x/y columns when a match file has no `x`/`y` header.
const POSITIONAL_X: usize = 4;
const POSITIONAL_Y: usize = 5;

/// Decode bytes as UTF-8, falling back to Latin-1 so that legacy-encoded
/// names survive instead of failing the whole file.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(bytes.iter().map(|b| char::from(*b)).collect()),
    }
}

fn count(v: f64) -> Option<u32> {
    (v.is_finite() && v >= 0.0).then(|| v.round() as u32)
}

fn read_file(path: &Path) -> Result<Vec<u8>, DataError> {
    std::fs::read(path).map_err(|e| DataError::Unavailable {
        path: path.display().to_string(),
        source: e,
    })
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> DataError + '_ {
    move |e| DataError::Csv {
        path: path.display().to_string(),
        source: e,
    }
}

// ---------------------------------------------------------------------------
// Reader-based loaders (enable testing without temp files)
// ---------------------------------------------------------------------------

/// Match event coordinates. The `x` and `y` columns are found by header name,
/// ignoring case; files without them use the fifth and sixth columns.
pub fn load_match_events_from_reader<R: Read>(rdr: R) -> Result<Vec<Point>, MatchFileError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader.headers().map_err(MatchFileError::Csv)?.clone();

    let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
    let (xi, yi) = match (find("x"), find("y")) {
        (Some(x), Some(y)) => (x, y),
        _ if headers.len() > POSITIONAL_Y => {
            debug!("no x/y header, using columns {POSITIONAL_X} and {POSITIONAL_Y}");
            (POSITIONAL_X, POSITIONAL_Y)
        }
        _ => return Err(MatchFileError::MissingColumns),
    };

    let mut points = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping malformed match event row: {}", e);
                continue;
            }
        };
        let parse = |i: usize| record.get(i).and_then(|v| v.trim().parse::<f64>().ok());
        match (parse(xi), parse(yi)) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => points.push(Point::new(x, y)),
            _ => warn!("skipping match event row {}: missing or non-numeric coordinates", line + 1),
        }
    }
    Ok(points)
}

/// Reasons a match event file cannot be read at all.
#[derive(Debug, thiserror::Error)]
pub enum MatchFileError {
    #[error(transparent)]
    Csv(csv::Error),

    #[error("no `x`/`y` columns and too few columns for positional coordinates")]
    MissingColumns,
}

pub fn load_player_events_from_reader<R: Read>(rdr: R) -> Result<Vec<PlayerEvent>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut events = Vec::new();
    for result in reader.deserialize::<RawPlayerEvent>() {
        match result {
            Ok(raw) => {
                let start = Point::new(raw.X, raw.Y);
                if !start.is_finite() {
                    warn!("skipping event for '{}': non-finite X/Y", raw.Player.trim());
                    continue;
                }
                let end = match (raw.X2, raw.Y2) {
                    (Some(x2), Some(y2)) => Some(Point::new(x2, y2)).filter(Point::is_finite),
                    _ => None,
                };
                events.push(PlayerEvent {
                    team: raw.Team.trim().to_string(),
                    player: raw.Player.trim().to_string(),
                    start,
                    end,
                });
            }
            Err(e) => {
                warn!("skipping malformed player event row: {}", e);
            }
        }
    }
    Ok(events)
}

pub fn load_player_stats_from_reader<R: Read>(rdr: R) -> Result<Vec<PlayerStat>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut stats = Vec::new();
    for result in reader.deserialize::<RawPlayerStat>() {
        match result {
            Ok(raw) => match (count(raw.goals), count(raw.assists)) {
                (Some(goals), Some(assists)) => stats.push(PlayerStat {
                    player: raw.player.trim().to_string(),
                    goals,
                    assists,
                }),
                _ => warn!("skipping stats for '{}': invalid goals/assists", raw.player.trim()),
            },
            Err(e) => {
                warn!("skipping malformed player stats row: {}", e);
            }
        }
    }
    Ok(stats)
}

pub fn load_team_stats_from_reader<R: Read>(rdr: R) -> Result<Vec<TeamStat>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut stats = Vec::new();
    for result in reader.deserialize::<RawTeamStat>() {
        match result {
            Ok(raw) => match (count(raw.Wins), count(raw.Losses)) {
                (Some(wins), Some(losses)) => stats.push(TeamStat {
                    team: raw.Team.trim().to_string(),
                    wins,
                    losses,
                }),
                _ => warn!("skipping team '{}': invalid wins/losses", raw.Team.trim()),
            },
            Err(e) => {
                warn!("skipping malformed team stats row: {}", e);
            }
        }
    }
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

pub fn load_match_events(path: &Path) -> Result<Vec<Point>, DataError> {
    let bytes = read_file(path)?;
    load_match_events_from_reader(bytes.as_slice()).map_err(|e| match e {
        MatchFileError::Csv(source) => DataError::Csv {
            path: path.display().to_string(),
            source,
        },
        MatchFileError::MissingColumns => DataError::MissingColumns {
            path: path.display().to_string(),
        },
    })
}

pub fn load_player_events(path: &Path) -> Result<Vec<PlayerEvent>, DataError> {
    let bytes = read_file(path)?;
    load_player_events_from_reader(bytes.as_slice()).map_err(csv_error(path))
}

/// Player statistics; the file may be legacy-encoded (see [`decode_text`]).
pub fn load_player_stats(path: &Path) -> Result<Vec<PlayerStat>, DataError> {
    let bytes = read_file(path)?;
    let text = decode_text(&bytes);
    load_player_stats_from_reader(text.as_bytes()).map_err(csv_error(path))
}

pub fn load_team_stats(path: &Path) -> Result<Vec<TeamStat>, DataError> {
    let bytes = read_file(path)?;
    load_team_stats_from_reader(bytes.as_slice()).map_err(csv_error(path))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
