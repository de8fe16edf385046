//! BLF command-line tool
//!
//! Built on the blf-engine library:
//! - `info`: statistics header, restore-point index and record census
//! - `dump`: one line per record
//! - `convert`: lossless copy into a file with a new container size or
//!   compression level

use anyhow::{bail, Context, Result};
use blf_engine::{BlfFile, OpenMode};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

mod config;
mod report;

use config::{AppConfig, OutputFormat};
use report::{FileReport, RecordLine};

/// BLF - Inspect, dump and re-compress binary bus log files
#[derive(Parser, Debug)]
#[command(name = "blf")]
#[command(about = "Inspect, dump and re-compress binary bus log files", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Skip corrupt objects instead of stopping at the first one
    #[arg(long, global = true)]
    lenient: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show file statistics and the restore-point index
    Info {
        /// Log files to inspect (processed in parallel)
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Read every record and count them per object type
        #[arg(long)]
        census: bool,

        /// List every restore point
        #[arg(long)]
        restore_points: bool,
    },

    /// List the records of a file
    Dump {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Stop after this many records
        #[arg(short = 'n', long, value_name = "COUNT")]
        limit: Option<u64>,

        /// Start at the given restore point instead of the beginning
        #[arg(long, value_name = "INDEX")]
        from_restore_point: Option<usize>,
    },

    /// Copy every record into a new file
    Convert {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Target container size of the new file in bytes
        #[arg(long, value_name = "BYTES")]
        container_size: Option<usize>,

        /// Compression level of the new file (0-9)
        #[arg(short, long, value_name = "LEVEL")]
        level: Option<u32>,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::debug!("BLF CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using engine library v{}", blf_engine::VERSION);

    let app = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    }
    .with_overrides(args.json, args.lenient);

    match &args.command {
        Command::Info {
            files,
            census,
            restore_points,
        } => info(&app, files, *census || app.output.census, *restore_points),
        Command::Dump {
            file,
            limit,
            from_restore_point,
        } => dump(&app, file, *limit, *from_restore_point),
        Command::Convert {
            input,
            output,
            container_size,
            level,
        } => convert(&app, input, output, *container_size, *level),
    }
}

/// Print statistics for every file; files are read in parallel
fn info(app: &AppConfig, files: &[PathBuf], census: bool, show_restore_points: bool) -> Result<()> {
    let results: Vec<(PathBuf, Result<FileReport>)> = files
        .par_iter()
        .map(|path| (path.clone(), report::inspect(path, &app.engine, census)))
        .collect();

    let mut reports = Vec::new();
    let mut failed = 0;
    for (path, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                log::error!("{:?}: {:#}", path, e);
                failed += 1;
            }
        }
    }

    match app.output.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => {
            for report in &reports {
                println!("{}", report.to_text(show_restore_points));
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} files could not be read", failed, files.len());
    }
    Ok(())
}

/// Print one line per record
fn dump(app: &AppConfig, path: &Path, limit: Option<u64>, from_restore_point: Option<usize>) -> Result<()> {
    let mut file = match from_restore_point {
        Some(index) => {
            let points = BlfFile::open_with(path, OpenMode::Read, app.engine.clone())
                .with_context(|| format!("Failed to open {:?}", path))?
                .restore_points()
                .to_vec();
            let point = points.get(index).with_context(|| {
                format!("{:?} has {} restore points, no #{}", path, points.len(), index)
            })?;
            BlfFile::open_at(path, app.engine.clone(), point)
        }
        None => BlfFile::open_with(path, OpenMode::Read, app.engine.clone()),
    }
    .with_context(|| format!("Failed to open {:?}", path))?;

    let mut index = 0u64;
    while limit.map_or(true, |limit| index < limit) {
        let record = match file
            .read()
            .with_context(|| format!("Failed to read record {} of {:?}", index, path))?
        {
            Some(record) => record,
            None => break,
        };
        let line = RecordLine::new(index, &record);
        match app.output.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&line)?),
            OutputFormat::Text => println!("{}", line.to_text()),
        }
        index += 1;
    }

    file.close()
        .with_context(|| format!("Failed to close {:?}", path))?;
    log::info!("Dumped {} records", index);
    Ok(())
}

/// Relay every record into a new file with new container settings
fn convert(
    app: &AppConfig,
    input: &Path,
    output: &Path,
    container_size: Option<usize>,
    level: Option<u32>,
) -> Result<()> {
    let mut target = app.engine.clone();
    if let Some(bytes) = container_size {
        target = target.with_container_size(bytes);
    }
    if let Some(level) = level {
        target = target.with_compression_level(level);
    }

    let mut reader = BlfFile::open_with(input, OpenMode::Read, app.engine.clone())
        .with_context(|| format!("Failed to open {:?}", input))?;
    let mut writer = BlfFile::open_with(output, OpenMode::Write, target)
        .with_context(|| format!("Failed to create {:?}", output))?;

    // Keep the application metadata of the source
    {
        let source = reader.statistics().clone();
        let stats = writer.statistics_mut();
        stats.application_id = source.application_id;
        stats.application_major = source.application_major;
        stats.application_minor = source.application_minor;
        stats.application_build = source.application_build;
        if !source.measurement_start_time.is_zero() {
            stats.measurement_start_time = source.measurement_start_time;
        }
    }

    while let Some(record) = reader
        .read()
        .with_context(|| format!("Failed to read {:?}", input))?
    {
        writer
            .write(record)
            .with_context(|| format!("Failed to write {:?}", output))?;
    }
    reader.close()?;
    writer
        .close()
        .with_context(|| format!("Failed to finalize {:?}", output))?;

    let before = reader.statistics();
    let after = writer.statistics();
    if log::log_enabled!(log::Level::Warn) {
        println!(
            "Converted {} objects: {} -> {} bytes ({:?} -> {:?})",
            after.object_count, before.file_size, after.file_size, input, output
        );
    }
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
