use chrono::Local;
use clap::{Parser, Subcommand};
use homeready::telemetry::{self, DEFAULT_LOG_LEVEL};
use homeready::{DEFAULT_OUTPUT_FILE, ReadinessReport, ReportComposer, ReportConfig, ReportError};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "homeready",
    about = "Render a home buying readiness report as PDF. Without a command, reads JSON from stdin.",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the report for a JSON results file
    Generate {
        /// Calculator results as JSON
        input: PathBuf,
        /// Destination PDF (defaults to home_buying_report.pdf)
        output: Option<PathBuf>,
    },
}

fn main() {
    if let Err(err) = telemetry::init(DEFAULT_LOG_LEVEL) {
        eprintln!("warning: {err}");
    }
    match run_cli() {
        Ok(path) => println!("PDF generated: {}", path.display()),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn run_cli() -> Result<PathBuf, ReportError> {
    let cli = Cli::parse();
    let (report, output) = match cli.command {
        Some(Command::Generate { input, output }) => {
            debug!(input = %input.display(), "reading report input");
            let report = ReadinessReport::from_path(&input)?;
            (report, output.unwrap_or_else(default_output))
        }
        None => {
            debug!("reading report input from stdin");
            let report = ReadinessReport::from_reader(std::io::stdin().lock(), "stdin")?;
            (report, default_output())
        }
    };

    if report.generated_at.is_blank() {
        debug!("input has no generatedAt, stamping current time");
    }
    let config = ReportConfig::default().with_fallback_generated_at(generated_now());
    ReportComposer::with_config(config).render_to_path(&report, output)
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

fn generated_now() -> String {
    Local::now().format("%B %d, %Y at %I:%M %p").to_string()
}
