// cupviz entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file, stdout carries command output)
// 3. Load config
// 4. Open the dashboard over the configured data directory
// 5. Run the subcommand
// 6. Close the data source

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use cupviz_app::config;
use cupviz_app::{Dashboard, Figure, Visualization};
use tracing::info;

#[derive(Parser)]
#[command(name = "cupviz")]
#[command(about = "World Cup match heatmaps, pass maps and tournament charts", long_about = None)]
struct Cli {
    /// Config file; defaults to config/cupviz.toml or the per-user config
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the selectable games
    Games,

    /// List teams present in the player event file
    Teams,

    /// List the players of one team
    Players {
        #[arg(long)]
        team: String,
    },

    /// Render one figure
    Render {
        kind: Kind,

        /// Game key, for match views
        #[arg(long)]
        game: Option<String>,

        /// Team, for player views
        #[arg(long)]
        team: Option<String>,

        /// Player, for player views
        #[arg(long)]
        player: Option<String>,

        #[arg(long, value_enum, default_value = "html")]
        format: Format,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    MatchHeatmap,
    MatchPositions,
    PlayerHeatmap,
    ChancesCreated,
    TopPlayers,
    TeamPerformance,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// `<figure>` fragment with the image inline
    Html,
    /// `data:image/png;base64,...`
    Uri,
    /// Raw PNG bytes
    Png,
    /// JSON summary with the image inline
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Parse arguments
    let cli = Cli::parse();

    // 2. Initialize tracing
    init_tracing()?;
    info!("cupviz starting up");

    // 3. Load config
    let (config, base_dir) = match &cli.config {
        Some(path) => {
            let config = config::load_config_file(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (config, base)
        }
        None => config::load_config().context("failed to load configuration")?,
    };
    info!("Config loaded: {} games, data in {}", config.games.len(), config.data.dir.display());

    // 4. Open the dashboard
    let dashboard = Dashboard::open(config, &base_dir).context("failed to open data directory")?;

    // 5. Run the subcommand
    let result = run(&dashboard, cli.command).await;

    // 6. Cleanup
    dashboard.close();
    info!("cupviz finished");
    result
}

async fn run(dashboard: &Dashboard, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Games => print_lines(&dashboard.games()),
        Commands::Teams => print_lines(&dashboard.teams().context("failed to list teams")?),
        Commands::Players { team } => print_lines(
            &dashboard
                .players(&team)
                .with_context(|| format!("failed to list players of {team}"))?,
        ),
        Commands::Render {
            kind,
            game,
            team,
            player,
            format,
            out,
        } => {
            let viz = selection(kind, game, team, player)?;
            let figure = dashboard
                .render(&viz)
                .await
                .with_context(|| format!("failed to render {}", viz.kind()))?;
            let bytes = encode(&figure, format)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, &bytes)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("{} written to {}", figure.kind, path.display());
                    Ok(())
                }
                None => {
                    std::io::stdout().write_all(&bytes).context("failed to write to stdout")?;
                    Ok(())
                }
            }
        }
    }
}

fn selection(
    kind: Kind,
    game: Option<String>,
    team: Option<String>,
    player: Option<String>,
) -> anyhow::Result<Visualization> {
    let need = |value: Option<String>, flag: &str| match value {
        Some(v) => Ok(v),
        None => bail!("--{flag} is required for this figure"),
    };
    Ok(match kind {
        Kind::MatchHeatmap => Visualization::MatchHeatmap {
            game: need(game, "game")?,
        },
        Kind::MatchPositions => Visualization::MatchPositions {
            game: need(game, "game")?,
        },
        Kind::PlayerHeatmap => Visualization::PlayerHeatmap {
            team: need(team, "team")?,
            player: need(player, "player")?,
        },
        Kind::ChancesCreated => Visualization::ChancesCreated {
            team: need(team, "team")?,
            player: need(player, "player")?,
        },
        Kind::TopPlayers => Visualization::TopPlayers,
        Kind::TeamPerformance => Visualization::TeamPerformance,
    })
}

fn encode(figure: &Figure, format: Format) -> anyhow::Result<Vec<u8>> {
    Ok(match format {
        Format::Html => figure.to_html()?.into_bytes(),
        Format::Uri => {
            let mut uri = figure.to_data_uri()?;
            uri.push('\n');
            uri.into_bytes()
        }
        Format::Png => figure.to_png()?,
        Format::Json => {
            let mut json = serde_json::to_vec_pretty(&figure.summary()?)?;
            json.push(b'\n');
            json
        }
    })
}

fn print_lines(lines: &[String]) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{line}")?;
    }
    Ok(())
}

/// Initialize tracing to log to a file, keeping stdout for command output.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("cupviz.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cupviz=info,cupviz_app=info,cupviz_data=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
