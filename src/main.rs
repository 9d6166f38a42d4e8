use clap::Parser;
use profilesync::{
    agent::Agent,
    cli::Cli,
    config::AgentConfig,
    observability::{init_observability, log_config_info},
    refresh::CycleReport,
    APP_NAME, VERSION,
};
use tokio::signal;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists; must happen before configuration is read
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();
    let paths = cli.validate()?;

    let config = AgentConfig::load_from_dir(&paths.configuration_directory)?;
    init_observability(&config.observability)?;

    info!(
        app_name = APP_NAME,
        version = VERSION,
        configuration_directory = %paths.configuration_directory.display(),
        logs_directory = ?paths.logs_directory,
        systemd_directory = %paths.systemd_directory.display(),
        "Starting profilesync agent"
    );
    log_config_info(&config);

    let mut agent = Agent::from_config(&config)?;

    if cli.once {
        let report = agent.run_cycle().await;
        log_report(&report);
        report.ensure_success()?;
        return Ok(());
    }

    let mut ticker = interval(config.refresh_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = agent.run_cycle().await;
                log_report(&report);
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!(cycles = agent.cycles_run(), "profilesync agent stopped");
    Ok(())
}

fn log_report(report: &CycleReport) {
    for (profile, version) in report.applied() {
        info!(profile = %profile, version = %version, "Profile ready to apply");
    }
    for failure in report.errors.iter() {
        error!(tag = %failure.tag, error = %failure, "Profile refresh error");
    }
}
