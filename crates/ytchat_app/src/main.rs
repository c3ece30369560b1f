mod config;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chat_logging::{chat_info, chat_warn};
use clap::{Args, Parser};
use ytchat_core::{ChatEvent, YoutubeId};
use ytchat_engine::{LiveChat, ReqwestFetcher};

use crate::config::{AppConfig, LogTarget, OutputFormat, DEFAULT_CONFIG_FILENAME};

#[derive(Debug, Parser)]
#[command(name = "ytchat", about = "Follow a YouTube live chat from the terminal", version)]
struct Cli {
    #[command(flatten)]
    target: Target,

    /// Base delay between two chat fetches, in milliseconds.
    #[arg(long)]
    interval_ms: Option<u64>,

    /// RON config file; missing files fall back to defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    #[arg(long, value_enum)]
    log: Option<LogTarget>,

    /// trace, debug, info, warn, error or off.
    #[arg(long)]
    log_level: Option<String>,

    #[arg(long, hide = true)]
    base_url: Option<String>,
}

/// Which live page to follow.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct Target {
    #[arg(long)]
    channel_id: Option<String>,
    #[arg(long)]
    live_id: Option<String>,
    /// Channel handle, with or without the leading `@`.
    #[arg(long)]
    handle: Option<String>,
}

impl Target {
    fn into_id(self) -> Option<YoutubeId> {
        self.channel_id
            .map(YoutubeId::ChannelId)
            .or(self.live_id.map(YoutubeId::LiveId))
            .or(self.handle.map(YoutubeId::Handle))
    }
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(interval_ms) = self.interval_ms {
            config.interval_ms = interval_ms;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(log) = self.log {
            config.log = log;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, config_error) = match config::load_config(&cli.config) {
        Ok(loaded) => (loaded.unwrap_or_default(), None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    cli.apply_overrides(&mut config);

    if let Some(destination) = config.log_destination() {
        chat_logging::initialize(&destination, config.level_filter());
    }
    if let Some(err) = config_error {
        chat_warn!("Using default settings: {:#}", err);
    }

    let format = config.format;
    let Some(id) = cli.target.into_id() else {
        bail!("one of --channel-id, --live-id or --handle is required");
    };

    let fetcher =
        Arc::new(ReqwestFetcher::new(config.fetch_settings()).context("failed to build HTTP client")?);
    let (chat, mut events) = LiveChat::new(id, config.poller_config(), fetcher)?;
    chat_info!("Following {:?}", chat.id());

    if !chat.start().await {
        while let Some(event) = events.try_recv() {
            print_event(&event, format)?;
        }
        bail!("could not start following {:?}", chat.id());
    }

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                print_event(&event, format)?;
                if matches!(event, ChatEvent::End { .. }) {
                    break;
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    chat_warn!("Failed to listen for Ctrl-C: {}", err);
                }
                chat.stop(Some("Interrupted".to_string()));
            }
        }
    }

    Ok(())
}

fn print_event(event: &ChatEvent, format: OutputFormat) -> anyhow::Result<()> {
    let line = output::render(event, format)?;
    if matches!(event, ChatEvent::Error(_)) {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_target_is_required() {
        assert!(Cli::try_parse_from(["ytchat"]).is_err());
        assert!(Cli::try_parse_from(["ytchat", "--live-id", "a", "--handle", "b"]).is_err());

        let cli = Cli::try_parse_from(["ytchat", "--handle", "@studio"]).unwrap();
        assert_eq!(cli.target.into_id(), Some(YoutubeId::Handle("@studio".into())));
    }

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::try_parse_from([
            "ytchat",
            "--live-id",
            "abc123",
            "--interval-ms",
            "250",
            "--format",
            "json",
            "--log",
            "off",
        ])
        .unwrap();
        let mut config = AppConfig {
            interval_ms: 5000,
            ..AppConfig::default()
        };
        cli.apply_overrides(&mut config);
        assert_eq!(config.interval_ms, 250);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.log, LogTarget::Off);
        assert_eq!(config.log_level, "info");
    }
}
