//! arxiv-trends - terminal front-end for the trends API
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin arxiv-trends -- hype --limit 5
//! cargo run --release --bin arxiv-trends -- compare parent:cs --limit 10
//! cargo run --release --bin arxiv-trends -- sync --watch
//! ```
//!
//! ## Environment Variables
//!
//! - TRENDS_API_URL - Base URL of the trends API (default: http://localhost:8000/api)
//! - TRENDS_REQUEST_TIMEOUT_SECS - Per-request timeout (default: 10)
//! - SYNC_POLL_INTERVAL_MS - Delay between sync status polls (default: 2000)
//! - TRENDS_TOP_K - Default ranking / comparison size (default: 10)
//! - TIER_SURGING, TIER_RISING, TIER_GROWING, TIER_COOLING, TIER_DECLINING - tier cut-points
//! - RUST_LOG - Logging level (optional, default: info)

use arxiv_trends::presentation::{
    format_last_sync, leaderboard_rows, parent_option_label, render_aligned_table, stats_summary,
    sync_status_line,
};
use arxiv_trends::{
    DashboardSession, HttpTrendsApi, PollMode, RankDirection, Selection, SyncKind, SyncPoller,
    TrendsApi, TrendsConfig, TrendsError,
};
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "arxiv-trends", about = "Publication trends across arXiv categories")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List parent categories and their subcategories
    Categories,
    /// Hottest categories by hype score
    Hype(RankArgs),
    /// Most declining categories by hype score
    Declining(RankArgs),
    /// Aligned monthly counts for a category or `parent:<id>`
    Compare {
        selection: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Statistics for one category
    Stats { category_id: String },
    /// Show sync status, optionally start a sync and follow it
    Sync {
        /// Start a sync before watching
        #[arg(long)]
        start: bool,
        /// Full resync instead of a quick update
        #[arg(long, requires = "start")]
        full: bool,
        /// Poll until the sync finishes
        #[arg(long)]
        watch: bool,
    },
    /// Check that the API is up
    Health,
}

#[derive(Debug, clap::Args)]
struct RankArgs {
    #[arg(long)]
    limit: Option<usize>,
    /// Restrict to one parent category
    #[arg(long)]
    parent: Option<String>,
    /// Rank locally from per-parent stats using the configured tier bands
    #[arg(long)]
    local: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = TrendsConfig::from_env();
    log::debug!("API: {}", config.api_url);

    let api: Arc<dyn TrendsApi> = Arc::new(HttpTrendsApi::new(&config)?);

    match cli.command {
        Command::Health => {
            let health = api.health().await?;
            println!("{}", health.status);
        }
        Command::Sync { start, full, watch } => run_sync(api, &config, start, full, watch).await?,
        command => {
            let session = DashboardSession::open(api, &config).await?;
            run_view(&session, command).await?;
        }
    }

    Ok(())
}

async fn run_view(session: &DashboardSession, command: Command) -> Result<(), TrendsError> {
    match command {
        Command::Categories => {
            for group in session.catalog().groups() {
                println!("{}  {}", group.id, parent_option_label(group));
                for sub in &group.subcategories {
                    println!("    {:<10} {}", sub.id, sub.name);
                }
            }
        }
        Command::Hype(args) => print_ranking(session, RankDirection::Hottest, args).await?,
        Command::Declining(args) => print_ranking(session, RankDirection::Cooling, args).await?,
        Command::Compare { selection, limit } => {
            let selection = Selection::parse(&selection)?;
            let limit = limit.unwrap_or(session.top_k());
            let view = session.comparison(&selection, limit).await?;

            for stats in &view.stats {
                let summary = stats_summary(stats);
                println!(
                    "{:<10} {:<40} papers {:>8}  avg {:>7}  growth {:>8}  {}",
                    stats.category_id,
                    summary.title,
                    summary.total_papers,
                    summary.monthly_average,
                    summary.growth,
                    summary.direction
                );
            }
            if view.table.is_empty() {
                println!("No data available. Sync data to see trends.");
            } else {
                println!();
                print!("{}", render_aligned_table(&view.table));
            }
        }
        Command::Stats { category_id } => {
            let stats = session.stats(&category_id).await?;
            let summary = stats_summary(&stats);
            println!("{} ({})", summary.title, category_id);
            println!("  Total papers:       {}", summary.total_papers);
            println!("  Monthly average:    {}", summary.monthly_average);
            println!("  Growth since start: {} ({})", summary.growth, summary.direction);
            println!("  Recent growth:      {:.1}%", stats.recent_growth_percent);
        }
        Command::Health | Command::Sync { .. } => {}
    }
    Ok(())
}

async fn print_ranking(
    session: &DashboardSession,
    direction: RankDirection,
    args: RankArgs,
) -> Result<(), TrendsError> {
    let limit = args.limit.unwrap_or(session.top_k());
    let parent = args.parent.as_deref();

    let entries = if args.local {
        session.local_leaderboard(direction, limit, parent).await?
    } else {
        session.leaderboard(direction, limit, parent).await?
    };

    if entries.is_empty() {
        println!("No data available. Sync data to see trends.");
        return Ok(());
    }
    for row in leaderboard_rows(&entries) {
        println!(
            "{:>3}. {:<10} {:<45} {}",
            row.rank, row.category_id, row.category_name, row.badge
        );
    }
    Ok(())
}

async fn run_sync(
    api: Arc<dyn TrendsApi>,
    config: &TrendsConfig,
    start: bool,
    full: bool,
    watch: bool,
) -> Result<(), TrendsError> {
    if start {
        let kind = if full { SyncKind::Full } else { SyncKind::Quick };
        match api.trigger_sync(kind).await {
            Ok(started) => log::info!("🚀 {} ({})", started.message, started.kind),
            Err(TrendsError::SyncInProgress) => log::info!("Sync already in progress, following it"),
            Err(e) => return Err(e),
        }
    }

    if !watch {
        let status = api.sync_status().await?;
        let mut tracker = arxiv_trends::SyncProgressTracker::new();
        tracker.apply(&status);
        println!("{}", sync_status_line(tracker.state()));
        if let Some(last) = tracker.last_sync() {
            println!("Last sync: {}", format_last_sync(last));
        }
        return Ok(());
    }

    let handle = SyncPoller::new(api, config.poll_interval(), PollMode::UntilComplete).spawn();
    let follow = handle.follow(|state| println!("{}", sync_status_line(state)));

    tokio::select! {
        tracker = follow => {
            if let Some(last) = tracker.as_ref().and_then(|t| t.last_sync()) {
                println!("Last sync: {}", format_last_sync(last));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("Interrupted, stopping poller");
        }
    }

    Ok(())
}
