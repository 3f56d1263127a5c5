//! SensorLog Dashboard CLI
//!
//! Parse, validate, summarize and export sensor logs.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use sensorlog_dashboard::{
    config::Config,
    export::{export_file_name, ExportTable},
    schema::{AlignmentPolicy, SchemaVariant},
    summary::summarize,
    validation::{validate_columns, validate_file_name},
    SensorLogParser, VERSION,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sensorlog")]
#[command(version = VERSION)]
#[command(about = "Sensor log ingestion for motion/distance dashboards", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the per-user config path)
    #[arg(long, global = true)]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a log into aligned series (JSON)
    Parse {
        /// Motion/distance log
        motion: PathBuf,

        /// Prediction log to merge onto the motion log
        #[arg(long)]
        predictions: Option<PathBuf>,

        /// Schema variant (single, dual-missing, dual-literal)
        #[arg(long)]
        variant: Option<SchemaVariant>,

        /// Row-count reconciliation (pad, truncate, reject)
        #[arg(long)]
        alignment: Option<AlignmentPolicy>,

        /// Write JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Check that a file has every required column
    Validate {
        file: PathBuf,

        #[arg(long)]
        variant: Option<SchemaVariant>,
    },

    /// Show summary statistics of a log
    Summary {
        file: PathBuf,

        #[arg(long)]
        variant: Option<SchemaVariant>,
    },

    /// Export logged samples to CSV
    Export {
        file: PathBuf,

        #[arg(long)]
        variant: Option<SchemaVariant>,

        /// Log only the latest sample instead of every sample
        #[arg(long)]
        latest: bool,

        /// Output file (defaults to a timestamped file in the export directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the template CSV for contributors
    Template {
        #[arg(long)]
        variant: Option<SchemaVariant>,
    },

    /// Show configuration
    Config,

    /// Serve the HTTP API
    #[cfg(feature = "server")]
    Serve {
        /// Port to bind (defaults to the configured port)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match load_config(cli.config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {e:#}. Using defaults.");
            Config::default()
        }
    };

    let result = match cli.command {
        Commands::Parse {
            motion,
            predictions,
            variant,
            alignment,
            output,
            pretty,
        } => cmd_parse(
            &config,
            &motion,
            predictions.as_deref(),
            variant,
            alignment,
            output.as_deref(),
            pretty,
        ),
        Commands::Validate { file, variant } => cmd_validate(&config, &file, variant),
        Commands::Summary { file, variant } => cmd_summary(&config, &file, variant),
        Commands::Export {
            file,
            variant,
            latest,
            output,
        } => cmd_export(&config, &file, variant, latest, output),
        Commands::Template { variant } => {
            print!("{}", variant.unwrap_or(config.variant).template_csv());
            Ok(())
        }
        Commands::Config => {
            cmd_config(&config, cli.config_file.as_deref());
            Ok(())
        }
        #[cfg(feature = "server")]
        Commands::Serve { port } => cmd_serve(config, port),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    config.context("could not load configuration")
}

/// Parser for the configured variant, or for `variant` when given.
fn build_parser(
    config: &Config,
    variant: Option<SchemaVariant>,
    alignment: Option<AlignmentPolicy>,
) -> SensorLogParser {
    let mut config = config.clone();
    if let Some(variant) = variant {
        config.variant = variant;
        config.missing_value_policy = None;
        config.prediction_classes = None;
    }
    if let Some(alignment) = alignment {
        config.alignment = alignment;
    }
    config.parser()
}

fn read_log(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))
}

fn cmd_parse(
    config: &Config,
    motion: &Path,
    predictions: Option<&Path>,
    variant: Option<SchemaVariant>,
    alignment: Option<AlignmentPolicy>,
    output: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    let parser = build_parser(config, variant, alignment);
    let motion_text = read_log(motion)?;

    let series = match predictions {
        Some(path) => parser.parse_with_predictions(&motion_text, &read_log(path)?),
        None => parser.parse(&motion_text),
    }
    .with_context(|| format!("could not parse {}", motion.display()))?;

    let json = if pretty {
        serde_json::to_string_pretty(&series)?
    } else {
        serde_json::to_string(&series)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("could not write {}", path.display()))?;
            eprintln!("Wrote {} samples to {:?}", series.len(), path);
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_validate(config: &Config, file: &Path, variant: Option<SchemaVariant>) -> Result<()> {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    validate_file_name(&name)?;

    let parser = build_parser(config, variant, None);
    let report = validate_columns(&read_log(file)?, &parser.options().schema);

    if report.is_valid {
        println!("{}: OK", file.display());
    } else {
        println!(
            "{}: {}",
            file.display(),
            report.error.as_deref().unwrap_or("invalid")
        );
        for column in &report.missing_columns {
            println!("  missing: {column}");
        }
        println!("Run `sensorlog template` to see the expected format.");
    }
    report.into_result()?;
    Ok(())
}

fn cmd_summary(config: &Config, file: &Path, variant: Option<SchemaVariant>) -> Result<()> {
    let series = build_parser(config, variant, None)
        .parse(&read_log(file)?)
        .with_context(|| format!("could not parse {}", file.display()))?;
    let summary = summarize(&series);

    let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));

    println!("Log Summary: {}", file.display());
    println!("============");
    println!();
    println!("  Samples: {}", summary.rows);
    println!("  Duration: {:.2}s", summary.duration_secs);
    println!(
        "  Sample rate: {}",
        summary
            .sample_rate_hz
            .map_or_else(|| "unknown".to_string(), |hz| format!("{hz:.2} Hz"))
    );
    println!();
    println!(
        "  Average acceleration: x {} / y {} / z {}",
        fmt(summary.accel.x.mean),
        fmt(summary.accel.y.mean),
        fmt(summary.accel.z.mean)
    );
    println!(
        "  Average rotation: x {} / y {} / z {}",
        fmt(summary.gyro.x.mean),
        fmt(summary.gyro.y.mean),
        fmt(summary.gyro.z.mean)
    );
    for (rank, value) in summary.accel.top_magnitudes.iter().enumerate() {
        println!("  Acceleration outlier #{}: {value:.3}", rank + 1);
    }
    for (rank, value) in summary.gyro.top_magnitudes.iter().enumerate() {
        println!("  Rotation outlier #{}: {value:.3}", rank + 1);
    }
    println!();
    println!(
        "  Distance: mean {} / min {} / max {} ({} missing)",
        fmt(summary.distance.mean),
        fmt(summary.distance.min),
        fmt(summary.distance.max),
        summary.distance.missing
    );
    Ok(())
}

fn cmd_export(
    config: &Config,
    file: &Path,
    variant: Option<SchemaVariant>,
    latest: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let series = build_parser(config, variant, None)
        .parse(&read_log(file)?)
        .with_context(|| format!("could not parse {}", file.display()))?;

    let mut table = ExportTable::new();
    if latest {
        table.log_latest(&series)?;
    } else {
        table.log_all(&series)?;
    }

    let output_path = match output {
        Some(path) => path,
        None => {
            config.ensure_directories()?;
            config.export_path.join(export_file_name(Utc::now()))
        }
    };
    let file = std::fs::File::create(&output_path)
        .with_context(|| format!("failed to create {}", output_path.display()))?;
    table
        .write_csv(file)
        .with_context(|| format!("could not write {}", output_path.display()))?;

    println!("Exported {} row(s) to {output_path:?}", table.len());
    Ok(())
}

fn cmd_config(config: &Config, path: Option<&Path>) {
    println!("Configuration");
    println!("=============");
    println!();
    println!(
        "Config file: {:?}",
        path.map(Path::to_path_buf).unwrap_or_else(Config::config_path)
    );
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(config).unwrap_or_else(|_| "Error".to_string())
    );
}

#[cfg(feature = "server")]
fn cmd_serve(config: Config, port: Option<u16>) -> Result<()> {
    use sensorlog_dashboard::server::{run, ServerConfig};
    use std::sync::Mutex;

    let port = port.unwrap_or(config.server_port);
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async move {
        let (addr, shutdown_tx) = run(ServerConfig::new(port, config)).await?;
        println!("SensorLog Dashboard v{VERSION} serving on http://{addr}");
        println!("Press Ctrl+C to stop");

        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let stop_tx = Mutex::new(Some(stop_tx));
        ctrlc::set_handler(move || {
            if let Some(tx) = stop_tx.lock().ok().and_then(|mut guard| guard.take()) {
                let _ = tx.send(());
            }
        })
        .context("could not set Ctrl+C handler")?;

        let _ = stop_rx.await;
        let _ = shutdown_tx.send(());
        println!("Server stopped.");
        Ok::<(), anyhow::Error>(())
    })
}
