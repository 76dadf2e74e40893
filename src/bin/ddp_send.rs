use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::{info, warn};

use efu_ddp_client::config::SenderConfig;
use efu_ddp_client::ddp::{Animator, UdpTarget};
use efu_ddp_client::logging;
use efu_ddp_client::pacing::ThreadSleep;

#[derive(Parser)]
#[command(name = "ddp_send")]
#[command(about = "DDP frame sender\n\nStreams a red ramp to an LED controller as fragmented DDP datagrams over UDP.", long_about = None)]
struct Cli {
    /// Path to configuration file (JSON); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Controller host, overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Controller UDP port, overrides the config file
    #[arg(long)]
    port: Option<u16>,

    /// LED count, must match the controller
    #[arg(long)]
    leds: Option<usize>,

    /// Loop the animation until Ctrl-C
    #[arg(long)]
    repeat: bool,

    /// Do not send a black frame when a repeating animation stops
    #[arg(long)]
    no_blank: bool,

    /// Enable debug output (per-fragment logging)
    #[arg(long)]
    debug: bool,

    /// Enable detailed debug (header hex dumps)
    #[arg(long)]
    ddebug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ddebug implies debug
    logging::init(cli.debug || cli.ddebug, cli.ddebug);

    let mut config = match &cli.config {
        Some(path) => SenderConfig::load(path)?,
        None => SenderConfig::default(),
    };
    if let Some(host) = cli.host {
        config.ddp.host = host;
    }
    if let Some(port) = cli.port {
        config.ddp.port = port;
    }
    if let Some(leds) = cli.leds {
        config.ddp.led_count = leds;
    }
    config.validate()?;

    let target = UdpTarget::open(&config.ddp.host, config.ddp.port)?;
    info!(
        "Streaming {} LEDs ({} bytes/frame) to {}",
        config.ddp.led_count,
        config.ddp.frame_len(),
        target.addr()
    );

    let mut animator = Animator::new(config, target, ThreadSleep);

    // Set up Ctrl-C handler with graceful shutdown
    let running = animator.get_running_flag();
    let result = ctrlc::set_handler(move || {
        running.store(false, Ordering::Relaxed);
    });
    if let Err(e) = result {
        warn!("Could not set Ctrl-C handler: {}", e);
    }

    let frames = animator.run(cli.repeat);
    info!("Sent {} frames", frames);

    if cli.repeat && !cli.no_blank {
        animator.shutdown();
    }

    Ok(())
}
