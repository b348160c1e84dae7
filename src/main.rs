//! CLI entry point for `emlhtml`.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use emlhtml::config::Config;
use emlhtml::convert::{self, ConversionReport};

#[derive(Parser)]
#[command(
    name = "emlhtml",
    version,
    about = "Convert .eml messages into browsable HTML pages"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a message file or a directory tree of messages
    Convert {
        /// Message file or directory to convert
        input: PathBuf,
        /// Directory that receives the HTML tree
        #[arg(short, long)]
        output: PathBuf,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
        /// Do not copy the original message next to its page
        #[arg(long)]
        no_original: bool,
    },
    /// Show the configuration file location and effective settings
    Config,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = emlhtml::config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Convert {
            input,
            output,
            json,
            no_original,
        } => cmd_convert(&input, &output, json, no_original, &config),
        Commands::Config => cmd_config(&config),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = emlhtml::config::log_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "emlhtml.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Convert `input` into an HTML tree below `output`.
fn cmd_convert(
    input: &Path,
    output: &Path,
    json: bool,
    no_original: bool,
    config: &Config,
) -> anyhow::Result<()> {
    if !input.exists() {
        anyhow::bail!("Input not found: {}", input.display());
    }

    let mut options = config.convert.clone();
    if no_original {
        options.copy_original = false;
    }

    let plan = convert::plan(input, &options)?;

    let pb = ProgressBar::new(plan.message_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Converting [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let report = convert::convert_plan(&plan, output, &options, &|current, total| {
        pb.set_length(total as u64);
        pb.set_position(current as u64);
    })?;
    pb.finish_and_clear();
    let elapsed = start.elapsed();

    if json {
        print_report_json(input, output, &report, elapsed)?;
    } else {
        print_report_table(input, output, &report, elapsed);
    }

    Ok(())
}

/// Print where the configuration lives and what is in effect.
fn cmd_config(config: &Config) -> anyhow::Result<()> {
    match emlhtml::config::config_file_path() {
        Some(path) if path.exists() => println!("# Loaded from {}", path.display()),
        Some(path) => println!("# Not found, using defaults: {}", path.display()),
        None => println!("# No configuration directory, using defaults"),
    }
    println!(
        "# Log file: {}",
        emlhtml::config::log_dir(config).join("emlhtml.log").display()
    );
    println!();
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "emlhtml", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Print the run summary in a human-readable table.
fn print_report_table(input: &Path, output: &Path, report: &ConversionReport, elapsed: Duration) {
    println!();
    println!("  {:<20} {}", "Input", input.display());
    println!("  {:<20} {}", "Output", output.display());
    println!("  {:<20} {}", "Directories", report.directories);
    println!("  {:<20} {}", "Converted", report.converted);
    println!("  {:<20} {}", "Failed", report.failures.len());
    println!("  {:<20} {:.2?}", "Time", elapsed);

    if !report.failures.is_empty() {
        println!();
        println!("  Failures:");
        for failure in &report.failures {
            println!("    {}: {}", failure.path.display(), failure.error);
        }
    }
    println!();
}

/// Print the run summary as JSON.
fn print_report_json(
    input: &Path,
    output: &Path,
    report: &ConversionReport,
    elapsed: Duration,
) -> anyhow::Result<()> {
    let summary = serde_json::json!({
        "input": input.display().to_string(),
        "output": output.display().to_string(),
        "directories": report.directories,
        "converted": report.converted,
        "failed": report.failures.len(),
        "elapsed_ms": elapsed.as_millis() as u64,
        "failures": report.failures,
    });

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
