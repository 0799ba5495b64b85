// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Renders a fixed viewport with every formula, on the vector and on
//! the scalar path, and prints the throughput of each.

#[macro_use]
extern crate log;

use clap::{App, Arg, ArgMatches};
use num::Complex;
use std::process;
use std::str::FromStr;

use fractile::{
    parse_pair, Formula, FractalError, PaletteSet, Raster, Renderer, Seeding, ViewportConfig,
};

const SIZE: &str = "size";
const RUNS: &str = "runs";
const BEST: &str = "best";
const THREADS: &str = "threads";

fn validate_count(s: String) -> Result<(), String> {
    match usize::from_str(&s) {
        Ok(n) if n >= 1 => Ok(()),
        _ => Err("Expected a positive integer".to_string()),
    }
}

fn args<'a>() -> ArgMatches<'a> {
    App::new("fractile-bench")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Kernel throughput table")
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1920x1080")
                .validator(|s| match parse_pair::<usize>(&s, 'x') {
                    Some(_) => Ok(()),
                    None => Err("Could not parse image size".to_string()),
                })
                .help("Size of the benchmark raster"),
        )
        .arg(
            Arg::with_name(RUNS)
                .long(RUNS)
                .short("r")
                .takes_value(true)
                .default_value("4")
                .validator(validate_count)
                .help("Timed renders per case, after one warm-up"),
        )
        .arg(
            Arg::with_name(BEST)
                .long(BEST)
                .short("b")
                .takes_value(true)
                .default_value("2")
                .validator(validate_count)
                .help("Average the fastest N runs"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(|s| match usize::from_str(&s) {
                    Ok(_) => Ok(()),
                    Err(_) => Err("Could not parse thread count".to_string()),
                })
                .help("Worker threads; 0 uses every CPU"),
        )
        .get_matches()
}

struct Case {
    formula: Formula,
    seeding: Seeding,
}

fn cases() -> Vec<Case> {
    let origin = |formula| Case {
        formula,
        seeding: Seeding::Origin,
    };
    vec![
        origin(Formula::Quadratic),
        Case {
            formula: Formula::Quadratic,
            seeding: Seeding::Parameter,
        },
        origin(Formula::BURNING_SHIP),
        origin(Formula::CELTIC),
        origin(Formula::BUFFALO),
        origin(Formula::MANDELBAR),
        origin(Formula::IntegerPower { exponent: 3 }),
        origin(Formula::RealPower { exponent: 3.5 }),
    ]
}

fn number<T: FromStr>(matches: &ArgMatches, name: &'static str) -> Result<T, FractalError> {
    let input = matches.value_of(name).unwrap_or("");
    T::from_str(input).map_err(|_| FractalError::Parse {
        what: name,
        input: input.to_string(),
    })
}

fn run(matches: &ArgMatches) -> Result<(), FractalError> {
    let size = matches.value_of(SIZE).unwrap_or("");
    let (width, height) = parse_pair::<usize>(size, 'x').ok_or_else(|| FractalError::Parse {
        what: SIZE,
        input: size.to_string(),
    })?;
    let runs: usize = number(matches, RUNS)?;
    let best = number::<usize>(matches, BEST)?.min(runs);

    let mut renderer = Renderer::with_threads(PaletteSet::standard(), number(matches, THREADS)?)?;
    let vector = renderer.vector_path_active();
    let mut raster = Raster::new(width, height);

    println!("fractile benchmark");
    println!(
        "{}x{}, 256 iter, {} threads, {} runs (avg best {})",
        width,
        height,
        renderer.thread_count(),
        runs,
        best
    );
    println!("vector kernels: {}\n", if vector { "yes" } else { "no" });
    println!("{:<30} {:<10} {}", "Label", "Path", "Mpix/s");
    println!("{}", "-".repeat(48));

    for &force_scalar in &[false, true] {
        renderer.set_vector_path_enabled(!force_scalar);
        let path = if renderer.vector_path_active() { "vector" } else { "scalar" };

        for case in cases() {
            let config = ViewportConfig {
                center: Complex::new(-0.5, 0.0),
                view_width: 3.5,
                max_iter: 256,
                formula: case.formula,
                seeding: case.seeding,
                ..ViewportConfig::default()
            };

            renderer.render(&config, &mut raster);
            let mut times: Vec<f64> = (0..runs)
                .map(|_| renderer.render(&config, &mut raster).as_secs_f64())
                .collect();
            times.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let seconds = times.iter().take(best).sum::<f64>() / best as f64;
            let mpix = (width * height) as f64 / seconds.max(1e-9) / 1e6;

            info!("{} on {} path: {:.4}s", config, path, seconds);
            println!("{:<30} {:<10} {:>6.2}", config.to_string(), path, mpix);
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("fractile-bench: {}", e);
        process::exit(1);
    }
}
