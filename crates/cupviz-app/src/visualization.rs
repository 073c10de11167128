// Dashboard: turns a visualization selection into a rendered figure by
// querying the data source, resolving the player portrait, and dispatching
// to the matching renderer.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use cupviz_core::{DensityError, DensityParams, RasterError};
use cupviz_data::{
    AssetResolver, ChainedAssets, CsvDataSource, DataError, DataSource, DirAssetResolver,
    HttpAssetResolver, NoAssets,
};
use image::RgbaImage;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{AssetsConfig, Config, HeatmapConfig};
use crate::figure::Figure;
use crate::figures;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum VizError {
    /// The selection matched no rows.
    #[error("nothing to draw: {0}")]
    NoData(String),

    #[error("invalid heatmap parameters: {0}")]
    InvalidParameters(#[from] DensityError),

    #[error("failed to encode figure: {0}")]
    Rendering(#[from] RasterError),

    #[error(transparent)]
    Data(#[from] DataError),
}

// ---------------------------------------------------------------------------
// Selections
// ---------------------------------------------------------------------------

/// One figure the dashboard can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visualization {
    MatchHeatmap { game: String },
    MatchPositions { game: String },
    PlayerHeatmap { team: String, player: String },
    ChancesCreated { team: String, player: String },
    TopPlayers,
    TeamPerformance,
}

impl Visualization {
    /// Kind names in the order they are offered to users.
    pub const KINDS: [&'static str; 6] = [
        "match-heatmap",
        "match-positions",
        "player-heatmap",
        "chances-created",
        "top-players",
        "team-performance",
    ];

    pub fn kind(&self) -> &'static str {
        match self {
            Visualization::MatchHeatmap { .. } => "match-heatmap",
            Visualization::MatchPositions { .. } => "match-positions",
            Visualization::PlayerHeatmap { .. } => "player-heatmap",
            Visualization::ChancesCreated { .. } => "chances-created",
            Visualization::TopPlayers => "top-players",
            Visualization::TeamPerformance => "team-performance",
        }
    }

    /// Player whose portrait decorates the figure, if any.
    fn portrait_subject(&self) -> Option<&str> {
        match self {
            Visualization::PlayerHeatmap { player, .. }
            | Visualization::ChancesCreated { player, .. } => Some(player),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Shared, read-only rendering context. Safe to use from many tasks at once.
#[derive(Clone)]
pub struct Dashboard {
    config: Arc<Config>,
    source: Arc<dyn DataSource>,
    assets: Arc<dyn AssetResolver>,
}

impl Dashboard {
    pub fn new(config: Config, source: Arc<dyn DataSource>, assets: Arc<dyn AssetResolver>) -> Self {
        Self {
            config: Arc::new(config),
            source,
            assets,
        }
    }

    /// CSV-backed dashboard with portraits resolved per `config.assets`.
    /// Relative paths resolve against `base_dir`.
    pub fn open(config: Config, base_dir: &Path) -> Result<Self, VizError> {
        let source = CsvDataSource::open(config.catalog(base_dir))?;
        let assets = build_assets(&config.assets, base_dir);
        info!(
            games = config.games.len(),
            dir = %source.catalog().dir.display(),
            "dashboard opened"
        );
        Ok(Self::new(config, Arc::new(source), assets))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn games(&self) -> Vec<String> {
        self.source.games()
    }

    pub fn teams(&self) -> Result<Vec<String>, VizError> {
        Ok(self.source.teams()?)
    }

    pub fn players(&self, team: &str) -> Result<Vec<String>, VizError> {
        Ok(self.source.players(team)?)
    }

    /// Render one visualization. Portrait failures are logged and the figure
    /// is drawn without it.
    pub async fn render(&self, viz: &Visualization) -> Result<Figure, VizError> {
        debug!(kind = viz.kind(), "render requested");
        let portrait = match viz.portrait_subject() {
            Some(player) => self.portrait(player).await,
            None => None,
        };

        let heatmap = &self.config.heatmap;
        let render = &self.config.render;
        let figure = match viz {
            Visualization::MatchHeatmap { game } => {
                let points = self.source.match_events(game)?;
                figures::match_heatmap(game, &points, &match_params(heatmap), render.match_size)?
            }
            Visualization::MatchPositions { game } => {
                let points = self.source.match_events(game)?;
                figures::match_positions(game, &points, render.match_size)?
            }
            Visualization::PlayerHeatmap { team, player } => {
                let events = self.source.player_events(team, player)?;
                figures::player_heatmap(
                    player,
                    &events,
                    &player_params(heatmap),
                    render.player_size,
                    portrait.as_ref(),
                )?
            }
            Visualization::ChancesCreated { team, player } => {
                let events = self.source.player_events(team, player)?;
                figures::chances_created(player, &events, render.passes_size, portrait.as_ref())?
            }
            Visualization::TopPlayers => {
                let stats = self.source.player_stats()?;
                // The leading player's portrait accompanies the chart.
                let leader = match stats.first() {
                    Some(top) => self.portrait(&top.player).await,
                    None => None,
                };
                figures::top_players(&stats, render.chart_size, leader.as_ref())?
            }
            Visualization::TeamPerformance => {
                figures::team_performance(&self.source.team_stats()?, render.chart_size)?
            }
        };
        info!(kind = figure.kind, title = %figure.title, "figure rendered");
        Ok(figure)
    }

    async fn portrait(&self, player: &str) -> Option<RgbaImage> {
        let limit = Duration::from_secs(self.config.assets.timeout_secs);
        match tokio::time::timeout(limit, self.assets.resolve(player)).await {
            Ok(Ok(Some(bytes))) => figures::decode_portrait(player, &bytes),
            Ok(Ok(None)) => {
                debug!("no portrait known for '{}'", player);
                None
            }
            Ok(Err(e)) => {
                warn!("portrait for '{}' unavailable: {}", player, e);
                None
            }
            Err(_) => {
                warn!("portrait for '{}' timed out after {:?}", player, limit);
                None
            }
        }
    }

    /// Release the data source.
    pub fn close(&self) {
        self.source.close();
    }
}

fn match_params(hm: &HeatmapConfig) -> DensityParams {
    DensityParams::new(hm.match_bins.0, hm.match_bins.1)
        .with_sigma(hm.sigma)
        .with_normalization(hm.match_normalization)
}

fn player_params(hm: &HeatmapConfig) -> DensityParams {
    DensityParams::new(hm.player_bins.0, hm.player_bins.1)
        .with_sigma(hm.sigma)
        .with_normalization(hm.player_normalization)
}

/// Local portrait directory first, then the URL table.
pub fn build_assets(config: &AssetsConfig, base_dir: &Path) -> Arc<dyn AssetResolver> {
    let mut chain = ChainedAssets::new();
    if let Some(dir) = &config.portrait_dir {
        chain = chain.push(DirAssetResolver::new(base_dir.join(dir)));
    }
    if !config.players.is_empty() || config.default_portrait.is_some() {
        chain = chain.push(HttpAssetResolver::new(
            config.players.clone(),
            config.default_portrait.clone(),
            Duration::from_secs(config.timeout_secs),
        ));
    }
    if chain.is_empty() {
        Arc::new(NoAssets)
    } else {
        Arc::new(chain)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
