//! fan-manager entry point: CLI dispatch, signal handlers, async runtime.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use fan_manager::app::cli::Args;
use fan_manager::app::logging::{init_tracing, level_filter, reload_level};
use fan_manager::config::persistence::load_config;
use fan_manager::config::types::AppConfig;
use fan_manager::control::{FanController, StatusReporter};
use fan_manager::hardware::{IpmiFanGateway, LmSensorsGateway, SensorGateway};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Priority: 1. --log-level flag, 2. LOG_LEVEL env, 3. config file, 4. default (info)
    let explicit_level = args
        .log_level
        .clone()
        .or_else(|| std::env::var("LOG_LEVEL").ok());
    let filter = match explicit_level.as_deref() {
        Some(level) => level_filter(level).unwrap_or_else(|| {
            eprintln!("Invalid log level '{}'. Using INFO. Valid levels: TRACE, DEBUG, INFO, WARN, ERROR, CRITICAL", level);
            "info"
        }),
        None => "info",
    };
    init_tracing(filter);

    let mut config = load_config(args.config.as_deref()).await?;
    if args.dry_run {
        config.control.dry_run = true;
    }

    if explicit_level.is_none() {
        apply_config_level(&config);
    }

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    #[cfg(unix)]
    if unsafe { libc::geteuid() } != 0 && config.ipmi.host.is_none() {
        warn!("Not running as root; local ipmitool access to /dev/ipmi0 will likely fail");
    }

    let timeout = config.control.command_timeout();
    let sensors = Arc::new(LmSensorsGateway::new(config.sensors.clone(), timeout));
    let actuator = Arc::new(IpmiFanGateway::new(
        config.ipmi.clone(),
        timeout,
        config.control.dry_run,
    ));

    if args.show_fans {
        return show_fans(&actuator).await;
    }

    if args.restore_auto {
        actuator
            .restore_auto()
            .await
            .context("Failed to restore BMC auto fan control")?;
        println!("Fan control handed back to the BMC");
        return Ok(());
    }

    if args.test {
        return run_test(sensors.as_ref()).await;
    }

    let status = StatusReporter::new(config.status.file.as_ref().map(PathBuf::from));
    let controller = Arc::new(FanController::new(sensors, actuator.clone(), status));

    if args.once {
        let report = controller.tick().await;
        if let Some(e) = report.actuation_error {
            return Err(e).context("Fan duties were not applied");
        }
        return Ok(());
    }

    info!(
        "fan-manager v{} starting{}",
        env!("CARGO_PKG_VERSION"),
        if config.control.dry_run { " (dry run)" } else { "" }
    );

    #[cfg(unix)]
    spawn_sighup_reload(args.config.clone(), explicit_level.is_some());

    let controller_clone = Arc::clone(&controller);
    tokio::spawn(async move {
        wait_for_shutdown().await;
        info!("Shutdown signal received");
        controller_clone.stop();
    });

    controller.run().await;

    if config.control.restore_auto_on_exit {
        if let Err(e) = actuator.restore_auto().await {
            error!("Failed to restore BMC auto fan control: {}", e);
        }
    }

    info!("fan-manager shutdown complete");
    Ok(())
}

fn apply_config_level(config: &AppConfig) {
    match level_filter(&config.logging.level) {
        Some(filter) => {
            if let Err(e) = reload_level(filter) {
                error!("Failed to apply log level from config: {}", e);
            }
        }
        None => warn!(
            "Invalid logging.level '{}' in config, keeping INFO",
            config.logging.level
        ),
    }
}

async fn run_test(sensors: &dyn SensorGateway) -> Result<()> {
    info!("Running in test mode (no fan writes)");
    let sample = sensors
        .read_temperatures()
        .await
        .context("Failed to read temperatures")?;
    let profile = fan_manager::control::ControlConstants::default().compute_profile(&sample);
    println!(
        "{}",
        fan_manager::control::StatusSnapshot::Applied { sample, profile }
    );
    Ok(())
}

async fn show_fans(actuator: &IpmiFanGateway) -> Result<()> {
    let readbacks = actuator
        .read_fan_config()
        .await
        .context("Failed to read fan configuration from the BMC")?;

    println!("BMC fan configuration ({})", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    for readback in readbacks {
        println!("\n{} [{}]", readback.target, readback.mode);
        for (name, duty) in readback.target.channel_names().iter().zip(&readback.duties) {
            println!("  {:<12} {:>3}%", name, duty);
        }
    }
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    tokio::signal::ctrl_c().await.ok();
}

/// SIGHUP re-reads the config file and applies its log level, unless the
/// level was pinned on the command line or through LOG_LEVEL.
#[cfg(unix)]
fn spawn_sighup_reload(config_path: Option<String>, level_pinned: bool) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sighup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to install SIGHUP handler: {}", e);
            return;
        }
    };

    tokio::spawn(async move {
        loop {
            sighup.recv().await;
            if level_pinned {
                info!("SIGHUP received, log level pinned by flag or LOG_LEVEL; ignoring");
                continue;
            }
            info!("SIGHUP received, reloading log level configuration");
            match load_config(config_path.as_deref()).await {
                Ok(new_config) => {
                    apply_config_level(&new_config);
                    info!("Log level reloaded: {}", new_config.logging.level.to_uppercase());
                }
                Err(e) => error!("Failed to reload config: {}", e),
            }
        }
    });
}
