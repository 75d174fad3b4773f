// wmx2obj - World map geometry (wmx) to Wavefront OBJ converter
//
// Usage: wmx2obj <input> <output> [<start-segment> [<end-segment>]]

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use wmx_shared::config::get_config;
use wmx_shared::log::{initialize_logging, map_log_level, WorkerGuard};
use wmx_shared::{CONFIG_ENV_PREFIX, DEFAULT_CONFIG};

use wmx2obj::{convert_to_obj, ConvertError, SegmentRange, SEGMENT_MAX, SEGMENT_MIN};

/// Console log level used when neither the CLI nor the config sets one
const DEFAULT_LOG_LEVEL: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "wmx2obj")]
#[command(about = "Convert world map geometry segments to Wavefront OBJ")]
#[command(version)]
struct Cli {
    /// Console log level override (0=Error, 1=Warn, 2=Info, 3=Debug, 4=Trace)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<i32>,

    /// Configuration file path (default: wmx2obj.conf if present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Binary world map file
    input: PathBuf,

    /// Wavefront OBJ file to create
    output: PathBuf,

    /// First segment to convert (0-834)
    start: Option<u32>,

    /// Last segment to convert (start-834)
    end: Option<u32>,
}

fn load_config(path: Option<&str>) -> anyhow::Result<()> {
    let mut config = get_config().lock();
    match path {
        Some(path) => {
            if !config.set_source(path, CONFIG_ENV_PREFIX) {
                anyhow::bail!("Could not read configuration file {}", path);
            }
        }
        None => {
            // The default file is optional; environment overrides still apply
            config.set_source(DEFAULT_CONFIG, CONFIG_ENV_PREFIX);
        }
    }
    Ok(())
}

fn init_logging(log_level: Option<i32>) -> anyhow::Result<Option<WorkerGuard>> {
    let (log_dir, config_level) = {
        let config = get_config().lock();
        let dir = config.get_string_default("LogsDir", "");
        let level = config.get_int_default("LogLevel", DEFAULT_LOG_LEVEL);
        (if dir.is_empty() { None } else { Some(dir) }, level)
    };
    let console_level = map_log_level(log_level.unwrap_or(config_level));
    initialize_logging(log_dir.as_deref(), console_level)
        .context("Failed to open log directory")
}

fn open_files(cli: &Cli) -> Result<(File, File), ConvertError> {
    let input = File::open(&cli.input).map_err(|source| ConvertError::FileOpen {
        role: "input",
        path: cli.input.display().to_string(),
        source,
    })?;
    let output = File::create(&cli.output).map_err(|source| ConvertError::FileOpen {
        role: "output",
        path: cli.output.display().to_string(),
        source,
    })?;
    Ok((input, output))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    load_config(cli.config.as_deref())?;
    // Dropping the guard flushes the log file, on success and on error
    let _log_guard = init_logging(cli.log_level)?;

    let range = SegmentRange::new(
        cli.start.unwrap_or(SEGMENT_MIN),
        cli.end.unwrap_or(SEGMENT_MAX),
    )?;

    let (input, output) = open_files(&cli)?;
    tracing::debug!(
        "Input '{}', output '{}', config '{}'",
        cli.input.display(),
        cli.output.display(),
        get_config().lock().filename()
    );

    println!(
        "Starting conversion of segments {}-{} to {}",
        range.start(),
        range.end(),
        cli.output.display()
    );

    convert_to_obj(input, BufWriter::new(output), range).context("Conversion failed")?;

    println!("Conversion successful");
    Ok(())
}
