// Integration tests for the dashboard.
//
// These load the fixture configuration and CSV files under tests/fixtures and
// render every visualization end to end through the public API.

use std::path::{Path, PathBuf};

use cupviz_app::config::load_config_file;
use cupviz_app::{Dashboard, Visualization, VizError};
use cupviz_core::RasterImage;
use cupviz_data::DataError;

// ===========================================================================
// Test helpers
// ===========================================================================

/// Directory the fixture config's relative paths resolve against.
fn tests_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests")
}

fn dashboard() -> Dashboard {
    let base = tests_dir();
    let config = load_config_file(&base.join("fixtures").join("cupviz.toml")).unwrap();
    Dashboard::open(config, &base).unwrap()
}

fn player(kind: &str, team: &str, name: &str) -> Visualization {
    let (team, player) = (team.to_string(), name.to_string());
    match kind {
        "player-heatmap" => Visualization::PlayerHeatmap { team, player },
        _ => Visualization::ChancesCreated { team, player },
    }
}

// ===========================================================================
// Listings
// ===========================================================================

#[test]
fn listings_follow_fixture_files() {
    let dash = dashboard();
    assert_eq!(dash.games(), vec!["ARG-AUS".to_string(), "FRA-MAR".to_string()]);
    assert_eq!(dash.teams().unwrap(), vec!["Argentina".to_string(), "France".to_string()]);
    assert_eq!(
        dash.players("Argentina").unwrap(),
        vec!["Messi".to_string(), "Alvarez".to_string()]
    );
    assert!(dash.players("Morocco").unwrap().is_empty());
}

#[test]
fn open_fails_for_missing_data_directory() {
    let base = tests_dir();
    let mut config = load_config_file(&base.join("fixtures").join("cupviz.toml")).unwrap();
    config.data.dir = "no-such-dir".into();
    assert!(matches!(
        Dashboard::open(config, &base),
        Err(VizError::Data(DataError::MissingDirectory(_)))
    ));
}

// ===========================================================================
// Rendering
// ===========================================================================

#[tokio::test]
async fn every_visualization_renders_to_html() {
    let dash = dashboard();
    let selections = [
        Visualization::MatchHeatmap { game: "ARG-AUS".into() },
        Visualization::MatchPositions { game: "FRA-MAR".into() },
        player("player-heatmap", "Argentina", "Messi"),
        player("chances-created", "France", "Mbappe"),
        Visualization::TopPlayers,
        Visualization::TeamPerformance,
    ];
    for viz in &selections {
        let fig = dash.render(viz).await.unwrap();
        let html = fig.to_html().unwrap();
        assert!(html.contains(&format!("data-kind=\"{}\"", viz.kind())));
        assert!(html.contains("data:image/png;base64,"));
    }
}

#[tokio::test]
async fn match_heatmap_uses_configured_size() {
    let dash = dashboard();
    let fig = dash
        .render(&Visualization::MatchHeatmap { game: "ARG-AUS".into() })
        .await
        .unwrap();
    assert_eq!(fig.title, "ARG-AUS heatmap");
    assert_eq!((fig.image.width(), fig.image.height()), (400, 240));
    let scale = fig.scale.unwrap();
    assert!(scale.max > scale.min);
}

#[tokio::test]
async fn positional_columns_used_without_xy_header() {
    let dash = dashboard();
    let fig = dash
        .render(&Visualization::MatchHeatmap { game: "FRA-MAR".into() })
        .await
        .unwrap();
    assert!(fig.scale.unwrap().max > 0.0);
}

#[tokio::test]
async fn unknown_game_uses_fallback() {
    let dash = dashboard();
    let fallback = dash
        .render(&Visualization::MatchHeatmap { game: "BRA-CRO".into() })
        .await
        .unwrap();
    let direct = dash
        .render(&Visualization::MatchHeatmap { game: "ARG-AUS".into() })
        .await
        .unwrap();
    assert_eq!(fallback.scale, direct.scale);
}

#[tokio::test]
async fn player_without_events_is_no_data() {
    let dash = dashboard();
    let err = dash
        .render(&player("player-heatmap", "Morocco", "Ziyech"))
        .await
        .unwrap_err();
    assert!(matches!(err, VizError::NoData(_)));
}

#[tokio::test]
async fn charts_keep_row_order_in_labels() {
    let dash = dashboard();
    let fig = dash.render(&Visualization::TopPlayers).await.unwrap();
    assert_eq!(fig.labels, vec!["Mbappe", "Messi", "Alvarez", "Giroud"]);
    let fig = dash.render(&Visualization::TeamPerformance).await.unwrap();
    assert_eq!(fig.labels, vec!["Argentina", "France", "Morocco", "Croatia"]);
}

#[tokio::test]
async fn summary_and_png_agree() {
    let dash = dashboard();
    let fig = dash
        .render(&player("chances-created", "Argentina", "Messi"))
        .await
        .unwrap();
    let json = serde_json::to_value(fig.summary().unwrap()).unwrap();
    assert_eq!(json["kind"], "chances-created");
    assert_eq!(json["title"], "Messi's Line-Breaking Passes");
    assert_eq!(json["width"], 480);

    let decoded = RasterImage::from_png(&fig.to_png().unwrap()).unwrap();
    assert_eq!(decoded, fig.image);
}
