use colored::*;
use console::Term;
use indicatif::{ ProgressBar, ProgressStyle };
use std::time::Duration;
use textwrap::wrap;

use fixture_filler::pipeline::FillReport;

/// Print a section header
pub fn print_header(title: &str) {
    let title = format!(" {} ", title);
    println!("\n{}\n", title.bold().white().on_blue());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "ERROR:".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "WARNING:".yellow().bold(), message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "SUCCESS:".green().bold(), message);
}

/// Print information
pub fn print_info(message: &str) {
    println!("{} {}", "INFO:".blue().bold(), message);
}

/// Print a formatted result
pub fn print_result(label: &str, value: &str) {
    println!("{}: {}", label.bold(), value);
}

/// Create a spinner with a message
pub fn spinner_with_message(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Print the outcome of a filling run
pub fn print_report(report: &FillReport) {
    print_header("Fill Summary");
    print_result("Started", &report.started_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    print_result("Discovered", &report.discovered.to_string());
    print_result("Filled", &report.filled.len().to_string());
    print_result("Skipped (up to date)", &report.skipped.len().to_string());
    if let Some(elapsed) = report.elapsed {
        print_result("Elapsed", &format!("{:.2}s", elapsed.as_secs_f64()));
    }

    if report.discovered == 0 {
        print_warning("No fillers matched the given filters.");
    }

    if report.failures.is_empty() {
        print_success("All fillers filled.");
        return;
    }

    let width = (Term::stdout().size().1 as usize).saturating_sub(6).max(40);
    print_error(&format!("{} filler(s) failed:", report.failures.len()));
    for failure in &report.failures {
        eprintln!("  {} {}", "✗".red().bold(), failure.address.to_string().bold());
        for line in wrap(&failure.message, width) {
            eprintln!("      {}", line);
        }
    }
}
