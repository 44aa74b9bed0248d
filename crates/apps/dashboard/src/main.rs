mod commands;
mod demo;
mod summary;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dashboard::{DashboardConfig, DashboardController};
use datasync::SyncClient;
use runtime::KeyboardHub;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::Intent;

#[derive(Parser, Debug)]
#[command(author, version, about = "Global news sentiment dashboard")]
struct Args {
    /// Sentiment API base URL (default: SENTIMENT_API_URL or localhost)
    #[arg(long)]
    api_url: Option<String>,

    /// Seconds between sentiment polls
    #[arg(long)]
    poll_secs: Option<u64>,

    /// Milliseconds the panel stays populated after closing
    #[arg(long)]
    panel_clear_ms: Option<u64>,

    /// Narrow headlines to the active bucket filter
    #[arg(long)]
    filter_headlines: bool,

    /// Serve canned data instead of calling the API
    #[arg(long)]
    demo: bool,

    /// Animation frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the interactive dashboard (default)
    Run,

    /// Ask the backend to start a collection run
    Trigger,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = config_from(&args);
    debug!(?config, "configuration loaded");

    let client = if args.demo {
        info!("demo mode: serving canned data");
        SyncClient::new(Arc::new(demo::fetcher(&config)), config.sync_settings())
    } else {
        SyncClient::http(&config.api_url, config.sync_settings())
            .with_context(|| format!("cannot reach {}", config.api_url))?
    };

    match args.command.unwrap_or(Command::Run) {
        Command::Trigger => {
            let ack = client.trigger_collection().await.context("collection trigger failed")?;
            println!("{} ({})", ack.message, ack.status);
            Ok(())
        }
        Command::Run => run(client, &config, args.fps).await,
    }
}

fn config_from(args: &Args) -> DashboardConfig {
    let mut config = DashboardConfig::from_env();
    if let Some(url) = &args.api_url {
        config.api_url = url.clone();
    }
    if let Some(secs) = args.poll_secs {
        config.poll_interval = Duration::from_secs(secs.max(1));
    }
    if let Some(ms) = args.panel_clear_ms {
        config.panel_clear_delay = Duration::from_millis(ms);
    }
    config.filter_headlines |= args.filter_headlines;
    config
}

async fn run(client: SyncClient, config: &DashboardConfig, fps: u32) -> Result<()> {
    let hub = KeyboardHub::new();
    let mut changes = client.changes();
    let mut controller = DashboardController::new(client, config);
    controller.mount(&hub);
    info!(api = %config.api_url, "dashboard running, type `help` for commands");

    let mut frames = tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(fps.max(1))));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_printed = None;

    loop {
        tokio::select! {
            _ = frames.tick() => {
                let now = Instant::now();
                controller.frame((now - last_frame).as_secs_f64());
                last_frame = now;
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                // Reprint only when something visible changed.
                let text = summary::render(&controller.render());
                if last_printed.as_ref() != Some(&text) {
                    print!("{text}");
                    last_printed = Some(text);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                match commands::parse(&line) {
                    Ok(Some(Intent::Quit)) => break,
                    Ok(Some(intent)) => {
                        apply(&mut controller, &hub, intent);
                        let text = summary::render(&controller.render());
                        print!("{text}");
                        last_printed = Some(text);
                    }
                    Ok(None) => {}
                    Err(err) => warn!("{err:#}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    controller.unmount();
    info!("dashboard stopped");
    Ok(())
}

fn apply(controller: &mut DashboardController, hub: &KeyboardHub, intent: Intent) {
    match intent {
        Intent::Select(code) => controller.select_country(Some(code)),
        Intent::Clear => controller.select_country(None),
        Intent::Filter(bucket) => controller.click_bucket(bucket),
        Intent::Click(pos) => controller.click_at(pos),
        Intent::Hover(pos) => {
            if let Some(code) = controller.pointer_move(pos) {
                println!("hovering {code}");
            }
        }
        Intent::Resize([w, h]) => controller.set_viewport(w, h),
        Intent::TrendHours(hours) => {
            controller.set_trend_hours(hours);
        }
        Intent::Key(event) => {
            let handled = hub.dispatch(&event);
            debug!(?event, handled, "key dispatched");
        }
        Intent::Focus => controller.on_focus(),
        Intent::Refresh => controller.refresh(),
        Intent::View => {}
        Intent::Help => println!("{}", commands::HELP),
        Intent::Quit => {}
    }
}
