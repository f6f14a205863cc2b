use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use vidpull::{
    ConfigOverrides, NoopReporter, ProgressEvent, ProgressReporter, ReqwestClient,
    SharedProgressReporter, SyncError, SyncReport, Syncer, YtDlp, load_config_file,
    resolve_config,
};

// Emoji with fallback for terminals without Unicode support
static CLAPPER: Emoji<'_, '_> = Emoji("🎬 ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static TV: Emoji<'_, '_> = Emoji("📺 ", "[i] ");
static DOWNLOAD: Emoji<'_, '_> = Emoji("📥 ", "[v] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "[=] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static BROOM: Emoji<'_, '_> = Emoji("🧹 ", "[-] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "x ");

/// Mirror recent uploads from video channels into a local media library
#[derive(Parser, Debug)]
#[command(name = "vidpull")]
#[command(about = "Mirror recent uploads from video channels into a local media library")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Channel id to sync (repeatable or comma-separated)
    #[arg(short = 'c', long = "channel")]
    channels: Vec<String>,

    /// Base directory; every channel gets its own folder inside it
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of recent uploads to keep per channel
    #[arg(short = 'n', long)]
    episodes: Option<usize>,

    /// Delete watched videos beyond the most recent ones
    #[arg(long, overrides_with = "no_delete_watched")]
    delete_watched: bool,

    /// Keep watched videos even if the config file enables deletion
    #[arg(long, overrides_with = "delete_watched")]
    no_delete_watched: bool,

    /// Download tool to invoke (default: yt-dlp)
    #[arg(long)]
    downloader: Option<String>,

    /// Repeat the sync every N minutes until interrupted
    #[arg(long, value_name = "MINUTES", value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Quiet mode - suppress progress output
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Progress reporter using indicatif for terminal output
struct IndicatifReporter {
    bar: ProgressBar,
}

impl IndicatifReporter {
    fn new() -> Result<Self> {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos:>3}% {wide_msg}")?
            .progress_chars("█▓░");

        let bar = ProgressBar::new(100);
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));

        Ok(Self { bar })
    }
}

impl ProgressReporter for IndicatifReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::RunStarted { total_channels } => {
                self.bar.reset();
                self.bar.set_message(format!(
                    "Syncing {} channels",
                    total_channels.to_string().cyan()
                ));
            }

            ProgressEvent::FetchingFeed { channel_id, .. } => {
                self.bar
                    .set_message(format!("{SEARCH}Fetching feed: {}", channel_id.cyan()));
            }

            ProgressEvent::FeedParsed {
                channel_title,
                total_entries,
                selected,
                ..
            } => {
                self.bar.println(format!(
                    "{TV}{} • {} entries, {} selected",
                    channel_title.bold().green(),
                    total_entries.to_string().cyan(),
                    selected.to_string().yellow()
                ));
            }

            ProgressEvent::EntrySkipped { entry_title, .. } => {
                self.bar.println(format!(
                    "  {SKIP}{}",
                    truncate_title(&entry_title, 60).dimmed()
                ));
            }

            ProgressEvent::DownloadStarting {
                entry_title,
                entry_index,
                total_selected,
                ..
            } => {
                self.bar.set_message(format!(
                    "{DOWNLOAD}[{}/{}] {}",
                    (entry_index + 1).to_string().cyan(),
                    total_selected.to_string().cyan(),
                    truncate_title(&entry_title, 40)
                ));
            }

            ProgressEvent::DownloadCompleted { entry_title, .. } => {
                self.bar.println(format!(
                    "  {SUCCESS}{}",
                    truncate_title(&entry_title, 60).green()
                ));
            }

            ProgressEvent::DownloadFailed {
                entry_title, error, ..
            } => {
                self.bar.println(format!(
                    "  {FAILURE}{} - {}",
                    truncate_title(&entry_title, 40).red(),
                    error.red()
                ));
            }

            ProgressEvent::RetentionApplied { deleted, .. } => {
                if deleted > 0 {
                    self.bar.println(format!(
                        "  {BROOM}Removed {} watched videos",
                        deleted.to_string().yellow()
                    ));
                }
            }

            ProgressEvent::ChannelFailed { channel_id, error } => {
                self.bar.println(format!(
                    "{FAILURE}{} - {}",
                    channel_id.red().bold(),
                    error.red()
                ));
            }

            ProgressEvent::Progress { percent } => {
                self.bar.set_position(percent.round() as u64);
            }

            ProgressEvent::SyncCompleted {
                downloaded_count,
                skipped_count,
                failed_count,
                deleted_count,
                failed_channels,
            } => {
                self.bar.finish_and_clear();
                println!(
                    "\n{PARTY}{} {} downloaded, {} skipped, {} failed, {} deleted",
                    "Sync complete:".bold().green(),
                    downloaded_count.to_string().green().bold(),
                    skipped_count.to_string().yellow(),
                    if failed_count > 0 {
                        failed_count.to_string().red().bold()
                    } else {
                        failed_count.to_string().green()
                    },
                    deleted_count.to_string().yellow()
                );
                if failed_channels > 0 {
                    println!(
                        "{FAILURE}{} channels could not be synced",
                        failed_channels.to_string().red().bold()
                    );
                }
            }
        }
    }
}

fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() <= max_len {
        title.to_string()
    } else {
        let kept: String = title.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            1 => EnvFilter::new("info"),
            _ => EnvFilter::new("debug"),
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn print_failures(report: &SyncReport) {
    let failed: Vec<_> = report
        .channels
        .iter()
        .flat_map(|channel| {
            channel.outcomes.iter().filter_map(move |(title, outcome)| match outcome {
                vidpull::DownloadOutcome::Failed { reason, .. } => {
                    Some((&channel.title, title, reason))
                }
                _ => None,
            })
        })
        .collect();

    if failed.is_empty() && report.failed_channels.is_empty() {
        return;
    }

    println!("\n{}", "Failures:".red().bold());
    for (channel_id, error) in &report.failed_channels {
        println!("  {CROSS}{} - {}", channel_id.yellow(), error.dimmed());
    }
    for (channel, title, reason) in failed {
        println!(
            "  {CROSS}{} / {} - {}",
            channel.cyan(),
            title.yellow(),
            reason.dimmed()
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let file = args
        .config
        .as_deref()
        .map(load_config_file)
        .transpose()
        .context("Failed to load configuration")?;

    let config = resolve_config(
        file,
        ConfigOverrides {
            channels: args.channels.clone(),
            output_dir: args.output_dir.clone(),
            episode_count: args.episodes,
            delete_watched: match (args.delete_watched, args.no_delete_watched) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
            downloader: args.downloader.clone(),
        },
    )
    .context("No usable configuration")?;

    if !args.quiet {
        println!(
            "\n{}{} {}\n",
            CLAPPER,
            "vidpull".bold().magenta(),
            "- Channel Mirror".dimmed()
        );
    }

    let reporter: SharedProgressReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(IndicatifReporter::new()?)
    };

    let client = ReqwestClient::new().context("Failed to create HTTP client")?;
    let syncer = Syncer::new(client, YtDlp::from_config(&config.downloader), reporter);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping after the current step");
                cancel.cancel();
            }
        });
    }

    let mut all_channels_failed = false;

    loop {
        match syncer.run(&config, &cancel).await {
            Ok(report) => {
                if !args.quiet {
                    print_failures(&report);
                }
                all_channels_failed =
                    report.channels.is_empty() && !report.failed_channels.is_empty();
            }
            Err(SyncError::Cancelled) => {
                if !args.quiet {
                    println!("\n{FAILURE}{}", "Sync cancelled".red().bold());
                }
                break;
            }
            Err(e) => return Err(e).context("Failed to sync channels"),
        }

        let Some(minutes) = args.interval else {
            break;
        };

        info!("Next sync in {minutes} minutes");
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(minutes.saturating_mul(60))) => {}
            _ = cancel.cancelled() => break,
        }
    }

    if !args.quiet {
        println!(
            "\n{FOLDER}Output: {}\n",
            config.output_dir.display().to_string().cyan()
        );
    }

    if all_channels_failed {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_must_be_at_least_one_minute() {
        assert!(Args::try_parse_from(["vidpull", "--interval", "0"]).is_err());

        let args = Args::try_parse_from(["vidpull", "--interval", "60"]).unwrap();
        assert_eq!(args.interval, Some(60));
    }

    #[test]
    fn last_delete_watched_flag_wins() {
        let args =
            Args::try_parse_from(["vidpull", "--delete-watched", "--no-delete-watched"]).unwrap();
        assert!(!args.delete_watched);
        assert!(args.no_delete_watched);

        let args = Args::try_parse_from(["vidpull", "--no-delete-watched", "--delete-watched"])
            .unwrap();
        assert!(args.delete_watched);
        assert!(!args.no_delete_watched);
    }
}
