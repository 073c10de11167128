// Input data for the visualizations: CSV tables behind a query trait, and
// player portrait resolution.

pub mod assets;
pub mod rows;
pub mod source;

pub use assets::{AssetError, AssetResolver, ChainedAssets, DirAssetResolver, HttpAssetResolver, NoAssets};
pub use rows::{PlayerEvent, PlayerStat, TeamStat};
pub use source::{Catalog, CsvDataSource, DataError, DataSource, InMemoryDataSource};
