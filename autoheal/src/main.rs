//! autoheal Entry Point

use autoheal::cli::{check, Cli, Commands};
use autoheal::{logging, Monitor, MonitorConfig, ShutdownController};
use clap::Parser;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run);

    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    // 設定が揃っていなければ、ネットワークアクセス前に終了する
    let config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match command {
        Commands::Config => {
            print!("{}", check::render_config(&config));
        }
        Commands::Check => match check::execute(&config).await {
            Ok(result) => {
                print!("{}", check::render_result(&result));
                std::process::exit(if result.is_success() { 0 } else { 1 });
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Run => run_monitor(config).await,
    }
}

async fn run_monitor(config: MonitorConfig) {
    let mut monitor = match Monitor::from_config(&config) {
        Ok(monitor) => monitor,
        Err(e) => {
            error!("Failed to start monitor: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        url = %config.health_check_url,
        environment = %config.environment,
        "Starting autoheal"
    );

    let shutdown = ShutdownController::new();
    let signals = tokio::spawn(watch_signals(shutdown.clone()));

    monitor.run(&shutdown).await;

    signals.abort();
    info!("Shutdown complete");
}

/// シャットダウンシグナルを監視
///
/// 最初のシグナルでシャットダウンを要求し、以降のシグナルは無視する。
async fn watch_signals(shutdown: ShutdownController) {
    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler");

    loop {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let sigterm = async {
            terminate.recv().await;
        };

        #[cfg(not(unix))]
        let sigterm = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C, shutting down...");
            }
            _ = sigterm => {
                info!("Received SIGTERM, shutting down...");
            }
        }

        if !shutdown.request_shutdown() {
            debug!("Shutdown already in progress");
        }
    }
}
