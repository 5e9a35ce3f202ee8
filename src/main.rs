use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use parley::core::config::{CliOverrides, StartupLog, load_config, resolve};
use parley::demo::MemoryChats;
use parley::tui::keymap::bindings_with_scroll_step;
use parley::tui::{RunOptions, Terminal};
use simplelog::{ConfigBuilder, WriteLogger};

#[derive(Parser)]
#[command(name = "parley", about = "Keyboard-driven terminal chat client")]
struct Args {
    /// Config file to use instead of ~/.parley/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,

    /// Where to write the log
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Open with the help overlay showing
    #[arg(long)]
    help_overlay: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let mut startup = StartupLog::default();
    let file_config = match load_config(args.config.as_deref(), &mut startup) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("parley: {e}");
            std::process::exit(2);
        }
    };
    let config = resolve(
        &file_config,
        &CliOverrides {
            log_level: args.log_level,
            log_file: args.log_file,
            show_help: args.help_overlay,
        },
        &mut startup,
    );

    // Stdout belongs to the interface, so logs go to a file
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&config.log_file) {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }

    log::info!("Parley starting up");
    startup.replay();
    log::debug!("Resolved config: {:?}", config);

    let chats = MemoryChats::seeded(Duration::from_millis(config.stream_delay_ms));
    let mut overrides = chats.initial_overrides();
    if config.show_help_on_start {
        overrides.show_help = Some(true);
    }
    let options = RunOptions {
        bindings: bindings_with_scroll_step(config.scroll_step),
        overrides,
    };

    let terminal = Terminal::stdio(config.resize_poll_ms);
    let state = parley::tui::run(terminal, Arc::new(chats), options).await?;
    log::info!("Parley exiting with {} chats", state.chats.len());
    Ok(())
}
