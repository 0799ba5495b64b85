// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[macro_use]
extern crate log;

use clap::{App, Arg, ArgMatches};
use num::Complex;
use std::str::FromStr;

use fractile::{
    compute_orbit, parse_pair, ColorMode, Formula, FractalError, PaletteSet, Raster, Renderer,
    Seeding, ViewportConfig,
};

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex { re, im })
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
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

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const CENTER: &str = "center";
const VIEW_WIDTH: &str = "view-width";
const ITERATIONS: &str = "iterations";
const FORMULA: &str = "formula";
const EXPONENT: &str = "exponent";
const REAL_EXPONENT: &str = "real-exponent";
const JULIA: &str = "julia";
const COLOR_MODE: &str = "color-mode";
const PALETTE: &str = "palette";
const OFFSET: &str = "offset";
const THREADS: &str = "threads";
const TILE_SIZE: &str = "tile-size";
const SCALAR: &str = "scalar";
const ORBIT: &str = "orbit";
const ORBIT_STEPS: &str = "orbit-steps";

const FORMULAS: &[&str] = &[
    "mandelbrot",
    "burning-ship",
    "celtic",
    "buffalo",
    "mandelbar",
    "multibrot",
    "multibrot-real",
];

fn args<'a>() -> ArgMatches<'a> {
    App::new("fractile")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Tile-parallel escape-time fractal renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required_unless(ORBIT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output image; the extension picks the format (png, ppm)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| validate_pair::<usize>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(CENTER)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.5,0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse center"))
                .help("Complex coordinate at the center of the image, as re,im"),
        )
        .arg(
            Arg::with_name(VIEW_WIDTH)
                .long(VIEW_WIDTH)
                .short("w")
                .takes_value(true)
                .default_value("3.5")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse view width",
                        "View width must be positive",
                    )
                })
                .help("Width of the view on the complex plane"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("256")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Iteration cap per pixel"),
        )
        .arg(
            Arg::with_name(FORMULA)
                .long(FORMULA)
                .short("f")
                .takes_value(true)
                .possible_values(FORMULAS)
                .default_value("mandelbrot")
                .help("Formula family"),
        )
        .arg(
            Arg::with_name(EXPONENT)
                .long(EXPONENT)
                .short("n")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        2,
                        8,
                        "Could not parse exponent",
                        "Exponent must be between 2 and 8",
                    )
                })
                .help("Integer exponent for mandelbar (default 2) and multibrot (default 3)"),
        )
        .arg(
            Arg::with_name(REAL_EXPONENT)
                .long(REAL_EXPONENT)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("3.5")
                .validator(|s| match f64::from_str(&s) {
                    Ok(n) if n.is_finite() && n != 0.0 => Ok(()),
                    Ok(_) => Err("Real exponent must be finite and non-zero".to_string()),
                    Err(_) => Err("Could not parse real exponent".to_string()),
                })
                .help("Real exponent for multibrot-real"),
        )
        .arg(
            Arg::with_name(JULIA)
                .long(JULIA)
                .short("j")
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse julia parameter"))
                .help("Render the Julia set of this parameter, as re,im"),
        )
        .arg(
            Arg::with_name(COLOR_MODE)
                .long(COLOR_MODE)
                .short("m")
                .takes_value(true)
                .possible_values(&["escape", "stability", "blended"])
                .default_value("escape")
                .help("Color by escape value, Lyapunov exponent, or both"),
        )
        .arg(
            Arg::with_name(PALETTE)
                .long(PALETTE)
                .short("p")
                .takes_value(true)
                .default_value("7")
                .help("Palette index or name"),
        )
        .arg(
            Arg::with_name(OFFSET)
                .long(OFFSET)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| {
                    validate_range(
                        &s,
                        -1_000_000,
                        1_000_000,
                        "Could not parse palette offset",
                        "Palette offset must be between -1000000 and 1000000",
                    )
                })
                .help("Rotates the palette"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("0")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        1024,
                        "Could not parse thread count",
                        "Thread count must be between 0 and 1024",
                    )
                })
                .help("Number of worker threads; 0 uses every CPU"),
        )
        .arg(
            Arg::with_name(TILE_SIZE)
                .long(TILE_SIZE)
                .takes_value(true)
                .default_value("64")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        4096,
                        "Could not parse tile size",
                        "Tile size must be between 1 and 4096",
                    )
                })
                .help("Edge length of the scheduling tiles"),
        )
        .arg(
            Arg::with_name(SCALAR)
                .long(SCALAR)
                .help("Use the scalar kernels even where vector kernels are available"),
        )
        .arg(
            Arg::with_name(ORBIT)
                .long(ORBIT)
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse orbit seed"))
                .help("Print the orbit of this point, as re,im, instead of rendering"),
        )
        .arg(
            Arg::with_name(ORBIT_STEPS)
                .long(ORBIT_STEPS)
                .takes_value(true)
                .default_value("20")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        1_000_000,
                        "Could not parse orbit length",
                        "Orbit length must be between 0 and 1000000",
                    )
                })
                .help("Most iterates to print for --orbit"),
        )
        .get_matches()
}

fn value<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches.value_of(name).unwrap_or("")
}

fn parsed<T: FromStr>(matches: &ArgMatches, name: &'static str) -> Result<T, FractalError> {
    let input = value(matches, name);
    T::from_str(input).map_err(|_| FractalError::Parse {
        what: name,
        input: input.to_string(),
    })
}

fn complex(matches: &ArgMatches, name: &'static str) -> Result<Complex<f64>, FractalError> {
    let input = value(matches, name);
    parse_complex(input).ok_or_else(|| FractalError::Parse {
        what: name,
        input: input.to_string(),
    })
}

fn viewport(matches: &ArgMatches, palettes: &PaletteSet) -> Result<ViewportConfig, FractalError> {
    let name = value(matches, FORMULA);
    let exponent = match matches.value_of(EXPONENT) {
        Some(_) => parsed(matches, EXPONENT)?,
        None if name == "mandelbar" => 2,
        None => 3,
    };
    let formula = Formula::from_name(name, exponent, parsed(matches, REAL_EXPONENT)?)?;

    let palette_name = value(matches, PALETTE);
    let palette = match usize::from_str(palette_name) {
        Ok(index) if index < palettes.len() => index,
        _ => palettes.find(palette_name).ok_or_else(|| FractalError::Parse {
            what: "palette",
            input: palette_name.to_string(),
        })?,
    };

    let mut config = ViewportConfig {
        center: complex(matches, CENTER)?,
        view_width: parsed(matches, VIEW_WIDTH)?,
        max_iter: parsed(matches, ITERATIONS)?,
        formula,
        color_mode: value(matches, COLOR_MODE).parse::<ColorMode>()?,
        palette,
        palette_offset: parsed(matches, OFFSET)?,
        ..ViewportConfig::default()
    };
    if matches.is_present(JULIA) {
        config.seeding = Seeding::Parameter;
        config.parameter = complex(matches, JULIA)?;
    }
    config.validate()?;
    Ok(config)
}

fn run(matches: &ArgMatches) -> Result<(), FractalError> {
    let palettes = PaletteSet::standard();
    let config = viewport(matches, &palettes)?;

    if matches.is_present(ORBIT) {
        let seed = complex(matches, ORBIT)?;
        for z in compute_orbit(seed, &config, parsed(matches, ORBIT_STEPS)?) {
            println!("{},{}", z.re, z.im);
        }
        return Ok(());
    }

    let size = value(matches, SIZE);
    let (width, height) = parse_pair::<usize>(size, 'x').ok_or_else(|| FractalError::Parse {
        what: SIZE,
        input: size.to_string(),
    })?;

    let mut renderer = Renderer::with_threads(palettes, parsed(matches, THREADS)?)?;
    renderer.set_vector_path_enabled(!matches.is_present(SCALAR));
    renderer.set_tile_size(parsed(matches, TILE_SIZE)?);

    let mut raster = Raster::new(width, height);
    let elapsed = renderer.render(&config, &mut raster);
    raster.save(value(matches, OUTPUT))?;

    println!(
        "{}: {}x{} at zoom {:.3}, {} threads, {} kernels, {:.1} ms",
        config,
        width,
        height,
        config.zoom(),
        renderer.thread_count(),
        if renderer.vector_path_active() { "vector" } else { "scalar" },
        elapsed.as_secs_f64() * 1000.0
    );
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        error!("{:?}", e);
        eprintln!("fractile: {}", e);
        std::process::exit(1);
    }
}
