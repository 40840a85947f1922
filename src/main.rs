mod assets;
mod config;
mod net;
mod surface;

use std::process::ExitCode;

use clap::Parser;

use crate::config::NodeConfig;
use crate::net::Node;

fn main() -> ExitCode {
    // Also installs the `log` bridge, so the stage's records land here too.
    tracing_subscriber::fmt::init();

    let config = NodeConfig::parse();
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "invalid configuration");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "runtime start failed");
            return ExitCode::FAILURE;
        }
    };

    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(
        base_url = %config.base_url,
        scene_id = config.scene_id,
        width = config.width,
        height = config.height,
        tick_ms = config.tick_ms,
        seed,
        "display node starting"
    );

    runtime.block_on(async {
        tokio::select! {
            () = Node::new(config, seed).run() => {}
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => tracing::info!("interrupted, shutting down"),
                Err(e) => tracing::warn!(error = %e, "signal handler failed, shutting down"),
            },
        }
    });
    ExitCode::SUCCESS
}
