use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use perfdata_tempgraph::error::exit_code;
use perfdata_tempgraph::{pipeline, Settings};

#[derive(Parser, Debug)]
#[command(name = "tempgraph")]
#[command(about = "Chart ambient temperatures from Nagios perfdata and mail the report")]
struct Args {
    /// Path to the configuration file (.ini, .toml, ...)
    #[arg(short, long)]
    config: PathBuf,
}

fn init_tracing() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_tracing() {
        eprintln!("failed to initialise logging: {e}");
    }

    let settings = match Settings::load(&args.config) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(config = %args.config.display(), "configuration error: {e:#}");
            return ExitCode::from(exit_code::CONFIG);
        }
    };

    match pipeline::run(&settings) {
        Ok(report) => {
            tracing::info!(
                records = report.records,
                temperatures = report.readings_with_temperature,
                series = report.series_plotted,
                exported_rows = ?report.exported_rows,
                delivery = %report.delivery,
                retained = report.retained.len(),
                "run complete"
            );
            ExitCode::from(exit_code::OK)
        }
        Err(e) => {
            tracing::error!("run failed: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
