//! The retile command.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use retile::logging::{init_logging, DEFAULT_LOG_DIR, DEFAULT_LOG_FILE};
use retile::storage::DiskStoreProvider;
use retile::{RetileConfig, RetileRequest, RetileSummary, Retiler};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::{FilterArg, Overrides};
use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "retile", version)]
#[command(
    about = "Build the next zoom levels of XYZ tile sets from an existing level",
    long_about = None
)]
pub struct RetileArgs {
    /// JSON configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// First zoom level to split (overrides startZoomLevel)
    #[arg(long)]
    pub start: Option<u32>,

    /// Zoom level to stop at, exclusive (overrides endZoomLevel)
    #[arg(long)]
    pub end: Option<u32>,

    /// Worker threads per zoom level (1 = sequential, 0 = one per CPU)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Source tiles decoded per batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Resampling filter used to scale quadrants up
    #[arg(long, value_enum)]
    pub filter: Option<FilterArg>,

    /// Byte size of blank placeholder tiles
    #[arg(long, value_name = "BYTES")]
    pub blank_size: Option<u64>,

    /// Log and skip tiles that cannot be decoded instead of stopping
    #[arg(long)]
    pub skip_corrupt: bool,

    /// Validate the configuration and print the plan without touching any tile
    #[arg(long)]
    pub dry_run: bool,

    /// Directory for the log file
    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,

    /// Enable debug logging (one line per tile)
    #[arg(short, long)]
    pub verbose: bool,
}

impl RetileArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            start: self.start,
            end: self.end,
            threads: self.threads,
            batch_size: self.batch_size,
            filter: self.filter,
            blank_size: self.blank_size,
            skip_corrupt: self.skip_corrupt,
        }
    }
}

/// Load the configuration, apply overrides and run.
pub fn run(args: &RetileArgs) -> Result<(), CliError> {
    let mut config = RetileConfig::from_file(&args.config)?;
    args.overrides().apply(&mut config);
    config.validate()?;
    let request = config.request();

    if args.dry_run {
        for line in plan_lines(&config, &request) {
            println!("{}", line);
        }
        return Ok(());
    }

    let _logging_guard = init_logging(&args.log_dir, DEFAULT_LOG_FILE, args.verbose)
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;
    info!("Retile v{}", retile::VERSION);
    info!(
        base = %config.base_tile_path.display(),
        filter = config.options.filter.name(),
        threads = config.options.threads,
        batch_size = config.options.batch_size,
        "Configuration loaded"
    );

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received interrupt, stopping after the current tiles...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::SignalHandler(e.to_string()))?;

    let provider = Arc::new(DiskStoreProvider::new(&config.base_tile_path));
    let retiler = Retiler::new(provider, &config.options)?;
    let summary = retiler.run(&request, &cancel)?;

    println!("{}", completion_line(&summary));
    Ok(())
}

/// Lines printed by `--dry-run`.
fn plan_lines(config: &RetileConfig, request: &RetileRequest) -> Vec<String> {
    if request.is_empty() {
        return vec![format!(
            "Nothing to do: start level {} is not below end level {}",
            request.start_level(),
            request.end_level()
        )];
    }

    let mut lines = Vec::new();
    for tile_set in request.tile_sets() {
        lines.push(config.base_tile_path.join(tile_set).display().to_string());
        for level in request.levels() {
            lines.push(format!("  Z{} -> Z{}", level, level + 1));
        }
    }
    lines
}

fn completion_line(summary: &RetileSummary) -> String {
    let mut line = format!(
        "Done: {} tile set(s), {} level(s), {} tiles written, {} blank tiles removed",
        summary.tile_sets.len(),
        summary.levels_built(),
        summary.tiles_written(),
        summary.blank_tiles_removed()
    );
    if summary.tiles_skipped() > 0 {
        line.push_str(&format!(", {} corrupt tiles skipped", summary.tiles_skipped()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use retile::{LevelSummary, ResampleFilter, TileSetSummary};
    use std::ffi::OsString;
    use std::fs;

    const CONFIG: &str = r#"{
        "baseTilePath": "/tiles",
        "retilePaths": ["world", "europe"],
        "startZoomLevel": 5,
        "endZoomLevel": 7
    }"#;

    #[test]
    fn test_parse_minimal_args() {
        let args = RetileArgs::try_parse_from(["retile", "retile.json"]).unwrap();

        assert_eq!(args.config, PathBuf::from("retile.json"));
        assert_eq!(args.log_dir, PathBuf::from("logs"));
        assert!(!args.dry_run);
        assert_eq!(args.overrides(), Overrides::default());
    }

    #[test]
    fn test_parse_all_flags() {
        let args = RetileArgs::try_parse_from([
            "retile",
            "retile.json",
            "--start",
            "3",
            "--end",
            "5",
            "--threads",
            "4",
            "--batch-size",
            "16",
            "--filter",
            "catmull-rom",
            "--blank-size",
            "400",
            "--skip-corrupt",
            "--dry-run",
            "--log-dir",
            "/tmp/retile-logs",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.start, Some(3));
        assert_eq!(args.end, Some(5));
        assert_eq!(args.threads, Some(4));
        assert_eq!(args.batch_size, Some(16));
        assert_eq!(args.filter, Some(FilterArg::CatmullRom));
        assert_eq!(args.blank_size, Some(400));
        assert!(args.skip_corrupt);
        assert!(args.dry_run);
        assert!(args.verbose);
    }

    #[test]
    fn test_config_is_required() {
        assert!(RetileArgs::try_parse_from(["retile"]).is_err());
    }

    #[test]
    fn test_unknown_filter_is_rejected() {
        assert!(RetileArgs::try_parse_from(["retile", "c.json", "--filter", "box"]).is_err());
    }

    #[test]
    fn test_plan_lines() {
        let config = RetileConfig::from_json(CONFIG).unwrap();
        let lines = plan_lines(&config, &config.request());

        assert_eq!(lines.len(), 6);
        assert!(lines[0].ends_with("world"));
        assert_eq!(lines[1], "  Z5 -> Z6");
        assert_eq!(lines[2], "  Z6 -> Z7");
        assert!(lines[3].ends_with("europe"));
    }

    #[test]
    fn test_plan_lines_nothing_to_do() {
        let mut config = RetileConfig::from_json(CONFIG).unwrap();
        config.start_zoom_level = 7;
        let lines = plan_lines(&config, &config.request());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Nothing to do"));
    }

    #[test]
    fn test_completion_line() {
        let summary = RetileSummary {
            tile_sets: vec![TileSetSummary {
                tile_set: "world".to_string(),
                levels: vec![LevelSummary {
                    level: 5,
                    target_level: 6,
                    blank_tiles_removed: 1,
                    source_tiles: 3,
                    tiles_written: 12,
                    tiles_skipped: 0,
                }],
                stopped_before: None,
            }],
        };

        assert_eq!(
            completion_line(&summary),
            "Done: 1 tile set(s), 1 level(s), 12 tiles written, 1 blank tiles removed"
        );
    }

    #[test]
    fn test_dry_run_does_not_touch_tiles() {
        let dir = tempfile::tempdir().unwrap();
        let z5 = dir.path().join("world/Z5");
        fs::create_dir_all(&z5).unwrap();
        fs::write(z5.join("0_0.png"), vec![0u8; 334]).unwrap();
        let config_path = dir.path().join("retile.json");
        fs::write(
            &config_path,
            format!(
                r#"{{"baseTilePath": {:?}, "retilePaths": ["world"], "startZoomLevel": 5, "endZoomLevel": 6}}"#,
                dir.path().to_string_lossy()
            ),
        )
        .unwrap();

        let args = RetileArgs::try_parse_from([
            OsString::from("retile"),
            config_path.clone().into_os_string(),
            OsString::from("--dry-run"),
            OsString::from("--filter"),
            OsString::from("gaussian"),
        ])
        .unwrap();
        run(&args).unwrap();

        assert!(z5.join("0_0.png").exists());
        assert!(!dir.path().join("world/Z6").exists());
        assert_eq!(ResampleFilter::from(args.filter.unwrap()), ResampleFilter::Gaussian);
    }

    #[test]
    fn test_invalid_config_fails_before_running() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("retile.json");
        fs::write(
            &config_path,
            r#"{"baseTilePath": "/tiles", "retilePaths": [], "startZoomLevel": 5, "endZoomLevel": 6}"#,
        )
        .unwrap();

        let args = RetileArgs::try_parse_from([
            OsString::from("retile"),
            config_path.into_os_string(),
            OsString::from("--dry-run"),
        ])
        .unwrap();

        assert!(matches!(run(&args), Err(CliError::Config(_))));
    }
}
