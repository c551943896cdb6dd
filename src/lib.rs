mod annotate;
mod error;
mod export;
mod model;
mod table;
mod track;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use csv::Writer;
use log::{info, warn};
use rayon::prelude::*;
use serde::Deserialize;

pub use annotate::{
    annotate, annotate_with, AnomalyThresholds, DEFAULT_COURSE_CHANGE_DEGREES,
    DEFAULT_SPEED_KNOTS,
};
pub use error::SchemaError;
pub use export::write_track;
pub use model::{AnnotatedPoint, NavigationalStatus, PositionReport, ReservedCode, Track};
pub use table::{RawTable, REQUIRED_COLUMNS};
pub use track::{build_track, parse_timestamp};

static SETTINGS_FILE: &str = ".vessel_track.yaml";

#[derive(Debug)]
pub struct Config {
    paths: Vec<String>,
    mmsi: Option<u64>,
    output_dir: Option<PathBuf>,
    list: bool,
    thresholds: AnomalyThresholds,
}

/// Optional YAML settings, overridden by the command line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
struct Settings {
    thresholds: AnomalyThresholds,
}

fn command() -> Command {
    Command::new("vessel_track")
        .version("0.1")
        .about("build and annotate vessel tracks from AIS position reports [csv]")
        .arg(
            Arg::new("paths")
                .short('f')
                .long("file-path")
                .action(ArgAction::Append)
                .required(true)
                .help("get file path to parse"),
        )
        .arg(
            Arg::new("mmsi")
                .short('m')
                .long("mmsi")
                .value_parser(value_parser!(u64))
                .help("vessel to track, every vessel of the file when omitted"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_parser(value_parser!(PathBuf))
                .help("write the annotated tracks as <file>_<mmsi>.csv"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .action(ArgAction::SetTrue)
                .help("only list the vessels of each file"),
        )
        .arg(
            Arg::new("speed-threshold")
                .long("speed-threshold")
                .value_parser(value_parser!(f64))
                .help("abnormal speed, in knots [default: 20]"),
        )
        .arg(
            Arg::new("course-threshold")
                .long("course-threshold")
                .value_parser(value_parser!(f64))
                .help("abnormal course change, in degrees [default: 45]"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("settings file, default: .vessel_track.yaml"),
        )
}

pub fn get_arg() -> Result<Config> {
    config_from(command().get_matches())
}

fn config_from(matches: ArgMatches) -> Result<Config> {
    let files = matches
        .get_many::<String>("paths")
        .unwrap_or_default()
        .cloned()
        .collect::<Vec<String>>();

    let settings = load_settings(matches.get_one::<String>("config").map(String::as_str))?;

    let mut thresholds = settings.thresholds;
    if let Some(speed) = matches.get_one::<f64>("speed-threshold") {
        thresholds.speed_knots = *speed;
    }
    if let Some(course) = matches.get_one::<f64>("course-threshold") {
        thresholds.course_change_degrees = *course;
    }

    Ok(Config {
        paths: files,
        mmsi: matches.get_one::<u64>("mmsi").copied(),
        output_dir: matches.get_one::<PathBuf>("output-dir").cloned(),
        list: matches.get_flag("list"),
        thresholds,
    })
}

/// Load the settings file, the provided one or the default in the working directory.
fn load_settings(provided: Option<&str>) -> Result<Settings> {
    load_settings_from(provided, Path::new(SETTINGS_FILE))
}

/// A provided file must be valid, an invalid fallback only logs a warning.
fn load_settings_from(provided: Option<&str>, fallback: &Path) -> Result<Settings> {
    if let Some(path) = provided {
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path))?;

        return serde_yaml::from_str(&yaml)
            .with_context(|| format!("invalid settings {}", path));
    }

    match fs::read_to_string(fallback) {
        Ok(yaml) => match serde_yaml::from_str(&yaml) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!("ignoring invalid {}: {}", fallback.display(), e);
                Ok(Settings::default())
            }
        },
        Err(_) => Ok(Settings::default()),
    }
}

pub fn run(config: Config) -> Result<()> {
    info!("config is {:?}", config);

    config
        .paths
        .par_iter()
        .map(|x| process_file(x, &config))
        .collect::<Result<_>>()
}

pub fn process_file(path: &str, config: &Config) -> Result<()> {
    let table = RawTable::from_path(path).with_context(|| format!("failed to load {}", path))?;

    info!("{} has {} rows.", path, table.len());

    let missing = table.missing_columns();
    if !missing.is_empty() {
        return Err(SchemaError { missing }).with_context(|| format!("invalid file {}", path));
    }

    if config.list {
        for id in table.vessel_ids() {
            println!("{}: {}", path, id);
        }
        return Ok(());
    }

    let vessels = match config.mmsi {
        Some(id) => vec![id],
        None => table.vessel_ids(),
    };

    vessels
        .par_iter()
        .map(|id| process_vessel(path, &table, *id, config))
        .collect::<Result<_>>()
}

fn process_vessel(path: &str, table: &RawTable, mmsi: u64, config: &Config) -> Result<()> {
    let track = build_track(table, mmsi)?;
    let points = annotate_with(&track, &config.thresholds);

    println!("{}: {}", path, summary(&track, &points));

    if let Some(dir) = &config.output_dir {
        let out = dir.join(export_name(path, mmsi));
        let wtr = Writer::from_path(&out)
            .with_context(|| format!("failed to create {}", out.display()))?;
        write_track(wtr, &points).with_context(|| format!("failed to write {}", out.display()))?;

        info!("{} written.", out.display());
    }

    Ok(())
}

fn summary(track: &Track, points: &[AnnotatedPoint]) -> String {
    let (start, end) = match (track.start(), track.end()) {
        (Some(s), Some(e)) => (s, e),
        _ => return format!("No data available for MMSI {}", track.mmsi),
    };

    let abnormal = points.iter().filter(|p| p.is_abnormal).count();

    format!(
        "MMSI {} has {} positions ({} dropped), {} abnormal, start ({:.5}, {:.5}) at {}, end ({:.5}, {:.5}) at {}",
        track.mmsi,
        track.len(),
        track.dropped,
        abnormal,
        start.latitude,
        start.longitude,
        start.timestamp,
        end.latitude,
        end.longitude,
        end.timestamp
    )
}

fn export_name(path: &str, mmsi: u64) -> String {
    let stem = Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "track".to_string());

    format!("{}_{}.csv", stem, mmsi)
}
