//! CLI binary for pdfproc.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ProcessorConfig`, runs one session and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use pdfproc::{process_file, LifecycleCallback, ProcessorConfig, SessionOutcome, SharedCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI lifecycle callback using indicatif ───────────────────────────────────

/// Terminal callback: a spinner while the upload is in flight and one log
/// line per lifecycle event.
struct CliLifecycleCallback {
    bar: ProgressBar,
}

impl CliLifecycleCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        Arc::new(Self { bar })
    }
}

impl LifecycleCallback for CliLifecycleCallback {
    fn on_file_selected(&self, name: &str, size: u64) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            bold(name),
            dim(&human_bytes(size))
        ));
    }

    fn on_processing_start(&self, name: &str, _size: u64) {
        self.bar.set_prefix("Processing");
        self.bar.set_message(name.to_string());
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_processing_complete(&self, artifact_name: &str, size: u64) {
        self.bar.finish_and_clear();
        eprintln!(
            "  {} {}  {}",
            green("✓"),
            artifact_name,
            dim(&human_bytes(size))
        );
    }

    fn on_processing_failed(&self, _name: &str, message: &str) {
        self.bar.finish_and_clear();
        eprintln!("  {} {}", red("✗"), red(message));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Process a PDF with the local service, save next to the current directory
  pdfproc report.pdf

  # Save into another directory
  pdfproc report.pdf -o out/

  # Use a different service
  pdfproc --endpoint https://pdf.internal/process-pdf report.pdf

  # Machine-readable summary
  pdfproc --json report.pdf

SERVICE CONTRACT:
  POST <endpoint> with a multipart/form-data body holding one part `pdf`.
  A 2xx answer carries the processed PDF; anything else may carry
  {"error": "..."} which is shown verbatim.

  Files are accepted by extension (.pdf). The documented service limit is
  50 MB; larger files are sent anyway with a warning.

ENVIRONMENT VARIABLES:
  PDFPROC_ENDPOINT     Processing endpoint URL
  PDFPROC_OUTPUT_DIR   Directory for processed files
  PDFPROC_TIMEOUT      Request timeout in seconds (default: none)
  RUST_LOG             Override log filter (e.g. pdfproc=debug)
"#;

/// Upload a PDF to a processing service and save the processed file.
#[derive(Parser, Debug)]
#[command(
    name = "pdfproc",
    version,
    about = "Upload a PDF to a processing service and save the processed file",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Directory to save the processed file into.
    #[arg(short, long, env = "PDFPROC_OUTPUT_DIR", default_value = ".")]
    output: PathBuf,

    /// Processing endpoint URL.
    #[arg(long, env = "PDFPROC_ENDPOINT", default_value = pdfproc::config::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in seconds. Waits indefinitely when unset.
    #[arg(long, env = "PDFPROC_TIMEOUT")]
    timeout: Option<u64>,

    /// Print a JSON summary instead of the human-readable one.
    #[arg(long, env = "PDFPROC_JSON")]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "PDFPROC_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFPROC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFPROC_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters; keep library INFO
    // lines out of its way unless asked for.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    let callback: Option<SharedCallback> = if show_progress {
        Some(CliLifecycleCallback::new() as SharedCallback)
    } else {
        None
    };

    let outcome = process_file(&cli.input, &cli.output, &config, callback).await;

    match outcome {
        Ok(SessionOutcome::Saved(summary)) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
                );
            } else if !cli.quiet {
                eprintln!(
                    "{}  {}  →  {}  {}",
                    green("✔"),
                    summary.input_name,
                    bold(&summary.output_path.display().to_string()),
                    dim(&format!("{}ms", summary.duration_ms)),
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Ok(SessionOutcome::Ignored { name, media_type }) => {
            if !cli.quiet {
                eprintln!(
                    "{} {} is {}, not application/pdf; nothing sent",
                    red("✘"),
                    bold(&name),
                    media_type
                );
            }
            Ok(ExitCode::from(2))
        }
        Err(pdfproc::PdfProcError::Processing(e)) => {
            // The callback already printed the message when the spinner is on.
            if !show_progress && !cli.quiet {
                eprintln!("{} {}", red("✘"), e);
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to process {}", display(&cli.input))),
    }
}

/// Map CLI args to `ProcessorConfig`.
fn build_config(cli: &Cli) -> Result<ProcessorConfig> {
    let mut builder = ProcessorConfig::builder().endpoint(cli.endpoint.clone());
    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }
    builder.build().context("Invalid configuration")
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// `1536` → `"1.5 KB"`.
fn human_bytes(n: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{n} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_bytes_units() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(1536), "1.5 KB");
        assert_eq!(human_bytes(2 * 1024 * 1024), "2.0 MB");
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["pdfproc", "report.pdf"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("report.pdf"));
        assert_eq!(cli.endpoint, "http://localhost:3000/process-pdf");
        assert!(cli.timeout.is_none());
        let config = build_config(&cli).unwrap();
        assert_eq!(config.endpoint, cli.endpoint);
    }

    #[test]
    fn cli_rejects_bad_endpoint() {
        let cli =
            Cli::try_parse_from(["pdfproc", "--endpoint", "localhost:3000", "a.pdf"]).unwrap();
        assert!(build_config(&cli).is_err());
    }
}
