use anyhow::{ anyhow, Context, Result };
use clap::Parser;
use dotenv::dotenv;
use log::{ debug, info };

use fixture_filler::config::FillOptions;
use fixture_filler::implementations::config::FillerConfig;
use fixture_filler::pipeline::FixtureFiller;

mod cli;
use cli::{ ui, FillCli };

#[tokio::main]
async fn main() -> Result<()> {
    // Parse the command line arguments
    let cli = FillCli::parse();

    // Setup logging
    setup_logging(&cli.log_level);

    // EVM_BIN may come from a .env file
    if dotenv().is_err() {
        debug!("No .env file loaded");
    }

    let options = build_options(&cli)?;

    ui::print_info(
        &format!(
            "Filling {} into {}",
            options.filler_path.display(),
            options.output.display()
        )
    );

    let filler = FixtureFiller::new(options);
    let spinner = ui::spinner_with_message("Filling test fixtures...");
    let report = filler.fill().await;
    spinner.finish_and_clear();

    let report = report.context("filling aborted")?;
    ui::print_report(&report);

    if report.is_success() {
        Ok(())
    } else {
        Err(anyhow!("{} filler(s) failed", report.failures.len()))
    }
}

/// Defaults, then the config file, then the command line
fn build_options(cli: &FillCli) -> Result<FillOptions> {
    let mut options = FillOptions::default();
    if let Some(path) = &cli.config {
        let config = FillerConfig::from_file(path).with_context(||
            format!("failed to load config {}", path.display())
        )?;
        config.apply_defaults(&mut options);
    }
    cli.apply(&mut options);
    Ok(options)
}

fn setup_logging(log_level: &str) {
    // Set up the logger based on the log level
    let level = match log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::new().filter_level(level).init();

    info!("Logger initialized with level: {}", log_level);
}
