// Player portrait lookup. Figures overlay a portrait when one resolves; every
// failure here is recoverable and the caller renders without it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

/// Extensions tried, in order, by [`DirAssetResolver`].
const PORTRAIT_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("request for {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("player name `{0}` cannot be used as a file name")]
    InvalidName(String),
}

/// Resolves a player's portrait to encoded image bytes (PNG or JPEG).
#[async_trait]
pub trait AssetResolver: Send + Sync {
    /// `Ok(None)` when no portrait is known for `player`.
    async fn resolve(&self, player: &str) -> Result<Option<Vec<u8>>, AssetError>;
}

// ---------------------------------------------------------------------------
// NoAssets
// ---------------------------------------------------------------------------

/// Never resolves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

#[async_trait]
impl AssetResolver for NoAssets {
    async fn resolve(&self, _player: &str) -> Result<Option<Vec<u8>>, AssetError> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Fetches portraits from a per-player URL table, falling back to a default
/// URL for players not in the table.
#[derive(Debug, Clone)]
pub struct HttpAssetResolver {
    http: reqwest::Client,
    urls: HashMap<String, String>,
    default_url: Option<String>,
    timeout: Duration,
}

impl HttpAssetResolver {
    pub fn new(urls: HashMap<String, String>, default_url: Option<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            urls,
            default_url,
            timeout,
        }
    }

    fn url_for(&self, player: &str) -> Option<&str> {
        self.urls
            .get(player)
            .or(self.default_url.as_ref())
            .map(String::as_str)
    }
}

#[async_trait]
impl AssetResolver for HttpAssetResolver {
    async fn resolve(&self, player: &str) -> Result<Option<Vec<u8>>, AssetError> {
        let Some(url) = self.url_for(player) else {
            return Ok(None);
        };
        debug!("fetching portrait for '{}' from {}", player, url);

        let http_err = |source| AssetError::Http {
            url: url.to_string(),
            source,
        };
        let response = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(http_err)?;
        Ok(Some(bytes.to_vec()))
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// Reads `<dir>/<player>.png`, `.jpg` or `.jpeg`.
#[derive(Debug, Clone)]
pub struct DirAssetResolver {
    dir: PathBuf,
}

impl DirAssetResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[async_trait]
impl AssetResolver for DirAssetResolver {
    async fn resolve(&self, player: &str) -> Result<Option<Vec<u8>>, AssetError> {
        if !is_plain_file_name(player) {
            return Err(AssetError::InvalidName(player.to_string()));
        }
        for ext in PORTRAIT_EXTENSIONS {
            let path = self.dir.join(format!("{player}.{ext}"));
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    debug!("portrait for '{}' read from {}", player, path.display());
                    return Ok(Some(bytes));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(AssetError::Io {
                        path: path.display().to_string(),
                        source: e,
                    })
                }
            }
        }
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Tries each resolver in order; errors are logged and the next one is tried.
#[derive(Default)]
pub struct ChainedAssets {
    resolvers: Vec<Box<dyn AssetResolver>>,
}

impl ChainedAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, resolver: impl AssetResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

#[async_trait]
impl AssetResolver for ChainedAssets {
    async fn resolve(&self, player: &str) -> Result<Option<Vec<u8>>, AssetError> {
        for resolver in &self.resolvers {
            match resolver.resolve(player).await {
                Ok(Some(bytes)) => return Ok(Some(bytes)),
                Ok(None) => {}
                Err(e) => warn!("portrait lookup for '{}' failed: {}", player, e),
            }
        }
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
