extern crate clap;
extern crate env_logger;
extern crate gridbrot;
extern crate log;
extern crate num;
extern crate num_cpus;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use env_logger::Builder;
use gridbrot::raster::{raster_dimensions, write_bmp};
use gridbrot::{
    run_distributed, run_sequential, Assignment, Axis, Config, Error, Grid, Report, Seed,
    Strategy, Timing, TimingSummary,
};
use log::{info, LevelFilter};
use num::Complex;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const SEQUENTIAL: &str = "sequential";
const DISTRIBUTED: &str = "distributed";

const PRESET: &str = "preset";
const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const ITERATIONS: &str = "iterations";
const SEED: &str = "seed";
const WORKERS: &str = "workers";
const STRATEGY: &str = "strategy";
const AXIS: &str = "axis";
const ASSIGNMENT: &str = "assignment";
const DETAILED: &str = "detailed";
const VERBOSITY: &str = "verbosity";

const MAX_WORKERS: usize = 1024;

const EXIT_CONFIGURATION: i32 = 1;
const EXIT_IO: i32 = 2;
const EXIT_RUNTIME: i32 = 3;

// Options shared by both subcommands.  Anything left unset falls back
// to the chosen preset.
fn plane_args<'a, 'b>(preset: &'static str) -> Vec<Arg<'a, 'b>> {
    vec![
        Arg::with_name(PRESET)
            .long(PRESET)
            .short("p")
            .takes_value(true)
            .possible_values(&["sequential", "columns", "rows"])
            .default_value(preset)
            .help("Starting configuration"),
        Arg::with_name(SIZE)
            .long(SIZE)
            .short("s")
            .takes_value(true)
            .validator(|s| validate_pair::<usize>(&s, 'x', "Could not parse grid size"))
            .help("Size of the grid, WIDTHxHEIGHT"),
        Arg::with_name(LEFTLOWER)
            .long(LEFTLOWER)
            .short("l")
            .takes_value(true)
            .allow_hyphen_values(true)
            .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
            .help("Left lower corner of the complex plane, re,im"),
        Arg::with_name(RIGHTUPPER)
            .long(RIGHTUPPER)
            .short("r")
            .takes_value(true)
            .allow_hyphen_values(true)
            .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
            .help("Right upper corner of the complex plane, re,im"),
        Arg::with_name(ITERATIONS)
            .long(ITERATIONS)
            .short("i")
            .takes_value(true)
            .validator(move |s| {
                validate_range(
                    &s,
                    1,
                    1_000_000,
                    "Could not parse iteration count",
                    "Iteration count must be between 1 and 1000000",
                )
            })
            .help("Iteration bound per point"),
        Arg::with_name(SEED)
            .long(SEED)
            .takes_value(true)
            .possible_values(&["point", "origin"])
            .help("Start each orbit at the point itself or at zero"),
    ]
}

fn args<'a>() -> ArgMatches<'a> {
    App::new("gridbrot")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Distributed Mandelbrot grid renderer")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name(VERBOSITY)
                .long(VERBOSITY)
                .short("v")
                .takes_value(true)
                .global(true)
                .possible_values(&["off", "error", "warn", "info", "debug", "trace"])
                .help("Log level (overrides RUST_LOG)"),
        )
        .subcommand(
            SubCommand::with_name(SEQUENTIAL)
                .about("Render the whole grid on one worker and write a bitmap")
                .args(&plane_args(SEQUENTIAL))
                .arg(
                    Arg::with_name(OUTPUT)
                        .long(OUTPUT)
                        .short("o")
                        .takes_value(true)
                        .help("Output file"),
                ),
        )
        .subcommand(
            SubCommand::with_name(DISTRIBUTED)
                .about("Split the grid across a fleet of workers and gather the result")
                .args(&plane_args("rows"))
                .arg(
                    Arg::with_name(WORKERS)
                        .long(WORKERS)
                        .short("w")
                        .takes_value(true)
                        .validator(move |s| {
                            validate_range(
                                &s,
                                1,
                                MAX_WORKERS,
                                "Could not parse worker count",
                                &format!("Worker count must be between 1 and {}", MAX_WORKERS),
                            )
                        })
                        .help("Number of workers (default: one per CPU)"),
                )
                .arg(
                    Arg::with_name(STRATEGY)
                        .long(STRATEGY)
                        .takes_value(true)
                        .possible_values(&["equal", "remainder"])
                        .help("Reject uneven splits, or give the leftover to the last worker"),
                )
                .arg(
                    Arg::with_name(AXIS)
                        .long(AXIS)
                        .takes_value(true)
                        .possible_values(&["rows", "columns"])
                        .help("Partition by bands of rows or bands of columns"),
                )
                .arg(
                    Arg::with_name(ASSIGNMENT)
                        .long(ASSIGNMENT)
                        .takes_value(true)
                        .possible_values(&["formula", "scatter"])
                        .default_value("formula")
                        .help("Each worker plans its own slice, or the coordinator scatters them"),
                )
                .arg(
                    Arg::with_name(DETAILED)
                        .long(DETAILED)
                        .short("d")
                        .help("Also report fleet-wide timing totals"),
                ),
        )
        .get_matches()
}

// Layers the command line over a preset.  The validators have already
// run, so a value that fails to parse here simply keeps the preset's.
fn configure(matches: &ArgMatches) -> Result<Config, Error> {
    let preset = matches.value_of(PRESET).unwrap_or(SEQUENTIAL);
    let mut config = Config::preset(preset).unwrap_or_else(Config::sequential)?;

    let (width, height) = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair(s, 'x'))
        .unwrap_or((config.grid.width(), config.grid.height()));
    let leftlower = matches
        .value_of(LEFTLOWER)
        .and_then(parse_complex)
        .unwrap_or_else(|| config.grid.lower_left());
    let rightupper = matches
        .value_of(RIGHTUPPER)
        .and_then(parse_complex)
        .unwrap_or_else(|| config.grid.upper_right());
    config.grid = Grid::new(width, height, leftlower, rightupper)?;

    if let Some(n) = matches.value_of(ITERATIONS).and_then(|s| u32::from_str(s).ok()) {
        config.max_iter = n;
    }
    match matches.value_of(SEED) {
        Some("point") => config.seed = Seed::Point,
        Some("origin") => config.seed = Seed::Origin,
        _ => {}
    }
    if let Some(n) = matches.value_of(WORKERS).and_then(|s| usize::from_str(s).ok()) {
        config.workers = n;
    }
    match matches.value_of(STRATEGY) {
        Some("equal") => config.strategy = Strategy::EqualDivision,
        Some("remainder") => config.strategy = Strategy::RemainderAbsorbing,
        _ => {}
    }
    match matches.value_of(AXIS) {
        Some("rows") => config.axis = Axis::Rows,
        Some("columns") => config.axis = Axis::Columns,
        _ => {}
    }
    if let Some("scatter") = matches.value_of(ASSIGNMENT) {
        config.assignment = Assignment::Scatter;
    }
    if let Some(output) = matches.value_of(OUTPUT) {
        config.output = PathBuf::from(output);
    }
    Ok(config)
}

fn sequential(config: &Config) -> Result<(), Error> {
    raster_dimensions(config.grid.width(), config.grid.height())?;
    let (result, compute) = run_sequential(&config.grid, &config.kernel())?;
    write_bmp(&config.output, &result)?;
    let summary = TimingSummary::single(Timing {
        compute,
        communication: Duration::from_secs(0),
    });
    println!("{}", Report::new(&summary));
    Ok(())
}

fn distributed(config: &Config, detailed: bool) -> Result<(), Error> {
    let outcome = run_distributed(&config.job(), config.workers)?;
    if detailed {
        println!("{}", Report::detailed(&outcome.timing));
    } else {
        println!("{}", Report::new(&outcome.timing));
    }
    info!(
        "slowest compute loop: {:.4}s, total communication: {:.4}s, total compute: {:.4}s",
        outcome.timing.compute_max,
        outcome.timing.communication_total,
        outcome.timing.compute_total
    );
    Ok(())
}

fn main() {
    let matches = args();

    // RUST_LOG applies unless the flag was given explicitly.
    let level = matches
        .value_of(VERBOSITY)
        .or_else(|| matches.subcommand().1.and_then(|sub| sub.value_of(VERBOSITY)))
        .and_then(|v| LevelFilter::from_str(v).ok());
    let mut builder = Builder::from_default_env();
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.init();

    let outcome = match matches.subcommand() {
        (SEQUENTIAL, Some(sub)) => configure(sub).and_then(|c| sequential(&c)),
        (DISTRIBUTED, Some(sub)) => {
            configure(sub).and_then(|c| distributed(&c, sub.is_present(DETAILED)))
        }
        _ => {
            eprintln!("{}", matches.usage());
            std::process::exit(EXIT_CONFIGURATION);
        }
    };

    if let Err(e) = outcome {
        eprintln!("Render failure: {}", e);
        let code = match e {
            ref e if e.is_configuration() => EXIT_CONFIGURATION,
            Error::Io(_) => EXIT_IO,
            _ => EXIT_RUNTIME,
        };
        std::process::exit(code);
    }
}
