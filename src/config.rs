// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Describes *what* to render: where the viewport sits on the complex
//! plane, which formula to iterate, how the iteration is seeded, and
//! how the results become colors.  A `ViewportConfig` is plain data;
//! the renderer copies it into every tile task, so nothing here is
//! ever shared mutably during a render.

use num::Complex;
use std::fmt;
use std::str::FromStr;

use crate::errors::FractalError;

/// Smallest integer exponent the repeated-multiplication kernels accept.
pub const MIN_INTEGER_EXPONENT: u32 = 2;

/// Largest integer exponent the repeated-multiplication kernels accept.
pub const MAX_INTEGER_EXPONENT: u32 = 8;

/// Where the absolute value is applied in a rectified quadratic.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RectifyStage {
    /// Rectify the components of `z` before squaring (Burning Ship).
    Operands,
    /// Rectify the components of `z²` after squaring (Celtic, Buffalo).
    Squares,
}

/// Which components of a quadratic step get their sign stripped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rectify {
    /// Take the absolute value of the real component.
    pub re: bool,
    /// Take the absolute value of the imaginary component.
    pub im: bool,
    /// Before or after squaring.
    pub stage: RectifyStage,
}

impl Rectify {
    /// `(|Re z| + i|Im z|)² + c`
    pub const BURNING_SHIP: Rectify = Rectify {
        re: true,
        im: true,
        stage: RectifyStage::Operands,
    };

    /// `|Re z²| + i Im z² + c`
    pub const CELTIC: Rectify = Rectify {
        re: true,
        im: false,
        stage: RectifyStage::Squares,
    };

    /// `|Re z²| + i|Im z²| + c`
    pub const BUFFALO: Rectify = Rectify {
        re: true,
        im: true,
        stage: RectifyStage::Squares,
    };

    /// True when neither component is touched, i.e. a plain quadratic.
    pub fn is_identity(&self) -> bool {
        !self.re && !self.im
    }
}

/// The formula family iterated for every pixel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Formula {
    /// `z ← z² + c`
    Quadratic,
    /// A quadratic with some components rectified.
    AbsoluteValue(Rectify),
    /// `z ← conj(z)ⁿ + c`; degree 2 is the Mandelbar (Tricorn).
    Conjugate {
        /// Integer degree, 2..=8.
        degree: u32,
    },
    /// `z ← zⁿ + c` by repeated multiplication.
    IntegerPower {
        /// Integer exponent, 2..=8.
        exponent: u32,
    },
    /// `z ← zⁿ + c` through the polar form, for any non-zero real `n`.
    RealPower {
        /// Real exponent.
        exponent: f64,
    },
}

impl Formula {
    /// Burning Ship preset.
    pub const BURNING_SHIP: Formula = Formula::AbsoluteValue(Rectify::BURNING_SHIP);
    /// Celtic preset.
    pub const CELTIC: Formula = Formula::AbsoluteValue(Rectify::CELTIC);
    /// Buffalo preset.
    pub const BUFFALO: Formula = Formula::AbsoluteValue(Rectify::BUFFALO);
    /// Mandelbar (Tricorn) preset.
    pub const MANDELBAR: Formula = Formula::Conjugate { degree: 2 };

    /// Looks a formula up by the names the command line uses.  The
    /// exponents are only consulted by the families that need them.
    pub fn from_name(name: &str, exponent: u32, real_exponent: f64) -> Result<Formula, FractalError> {
        match name {
            "mandelbrot" => Ok(Formula::Quadratic),
            "burning-ship" => Ok(Formula::BURNING_SHIP),
            "celtic" => Ok(Formula::CELTIC),
            "buffalo" => Ok(Formula::BUFFALO),
            "mandelbar" => Ok(Formula::Conjugate { degree: exponent }),
            "multibrot" => Ok(Formula::IntegerPower { exponent }),
            "multibrot-real" => Ok(Formula::RealPower {
                exponent: real_exponent,
            }),
            _ => Err(FractalError::Parse {
                what: "formula",
                input: name.to_string(),
            }),
        }
    }

    fn label(&self, seeding: Seeding) -> &'static str {
        let julia = seeding == Seeding::Parameter;
        match *self {
            Formula::Quadratic => {
                if julia {
                    "Julia"
                } else {
                    "Mandelbrot"
                }
            }
            Formula::AbsoluteValue(r) if r == Rectify::BURNING_SHIP => {
                if julia {
                    "Burning Ship Julia"
                } else {
                    "Burning Ship"
                }
            }
            Formula::AbsoluteValue(r) if r == Rectify::CELTIC => {
                if julia {
                    "Celtic Julia"
                } else {
                    "Celtic"
                }
            }
            Formula::AbsoluteValue(r) if r == Rectify::BUFFALO => {
                if julia {
                    "Buffalo Julia"
                } else {
                    "Buffalo"
                }
            }
            Formula::AbsoluteValue(_) => {
                if julia {
                    "Rectified Julia"
                } else {
                    "Rectified"
                }
            }
            Formula::Conjugate { .. } => {
                if julia {
                    "Mandelbar Julia"
                } else {
                    "Mandelbar"
                }
            }
            Formula::IntegerPower { .. } => {
                if julia {
                    "Multijulia"
                } else {
                    "Multibrot"
                }
            }
            Formula::RealPower { .. } => {
                if julia {
                    "Multijulia (real)"
                } else {
                    "Multibrot (real)"
                }
            }
        }
    }
}

/// Whether the pixel is the parameter or the starting value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Seeding {
    /// `z₀ = 0`, `c = pixel` (Mandelbrot-style).
    Origin,
    /// `z₀ = pixel`, `c = ViewportConfig::parameter` (Julia-style).
    Parameter,
}

/// How a pixel's measurements turn into a color.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorMode {
    /// Smooth escape value only; interior pixels are black.
    Escape,
    /// Lyapunov exponent for every pixel.
    Stability,
    /// Lyapunov exponent inside the set, smooth escape value outside.
    Blended,
}

impl ColorMode {
    /// True when the kernels have to accumulate the Lyapunov sum.
    pub fn needs_stability(self) -> bool {
        self != ColorMode::Escape
    }
}

impl FromStr for ColorMode {
    type Err = FractalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "escape" => Ok(ColorMode::Escape),
            "stability" => Ok(ColorMode::Stability),
            "blended" => Ok(ColorMode::Blended),
            _ => Err(FractalError::Parse {
                what: "color mode",
                input: s.to_string(),
            }),
        }
    }
}

/// Everything one render pass needs to know.  Read-only for the
/// duration of the pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewportConfig {
    /// Complex coordinate that lands on the center of the raster.
    pub center: Complex<f64>,
    /// Width of the viewport in complex-plane units.  The height
    /// follows from the raster's aspect ratio.
    pub view_width: f64,
    /// Iteration cap; interior points report exactly this value.
    pub max_iter: u32,
    /// The formula family.
    pub formula: Formula,
    /// Mandelbrot-style or Julia-style seeding.
    pub seeding: Seeding,
    /// The fixed `c` used in parameter-seeded mode.
    pub parameter: Complex<f64>,
    /// Escape, stability or blended coloring.
    pub color_mode: ColorMode,
    /// Index into the palette set.
    pub palette: usize,
    /// Rotates the palette lookup.
    pub palette_offset: i32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        ViewportConfig {
            center: Complex::new(0.0, 0.0),
            view_width: 4.0,
            max_iter: 256,
            formula: Formula::Quadratic,
            seeding: Seeding::Origin,
            parameter: Complex::new(-0.7, 0.27015),
            color_mode: ColorMode::Escape,
            palette: 7,
            palette_offset: 0,
        }
    }
}

impl ViewportConfig {
    /// Rejects configurations that cannot describe a meaningful
    /// render.  The kernels themselves stay total regardless, so a
    /// caller that skips this still gets an image, just not a useful
    /// one.
    pub fn validate(&self) -> Result<(), FractalError> {
        if !(self.center.re.is_finite() && self.center.im.is_finite()) {
            return Err(FractalError::invalid("center must be finite"));
        }
        if !(self.view_width.is_finite() && self.view_width > 0.0) {
            return Err(FractalError::invalid("view width must be positive"));
        }
        if self.max_iter == 0 {
            return Err(FractalError::invalid("iteration cap must be at least 1"));
        }
        if self.seeding == Seeding::Parameter
            && !(self.parameter.re.is_finite() && self.parameter.im.is_finite())
        {
            return Err(FractalError::invalid("parameter must be finite"));
        }
        match self.formula {
            Formula::Conjugate { degree: n } | Formula::IntegerPower { exponent: n }
                if n < MIN_INTEGER_EXPONENT || n > MAX_INTEGER_EXPONENT =>
            {
                Err(FractalError::invalid(format!(
                    "integer exponent {} outside {}..={}",
                    n, MIN_INTEGER_EXPONENT, MAX_INTEGER_EXPONENT
                )))
            }
            Formula::RealPower { exponent } if !exponent.is_finite() || exponent == 0.0 => {
                Err(FractalError::invalid("real exponent must be finite and non-zero"))
            }
            _ => Ok(()),
        }
    }

    /// Magnification relative to the default 4-unit-wide view.
    pub fn zoom(&self) -> f64 {
        4.0 / self.view_width
    }

    /// A human-readable name for the formula and seeding mode.
    pub fn fractal_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ViewportConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = self.formula.label(self.seeding);
        match self.formula {
            Formula::Conjugate { degree: n } | Formula::IntegerPower { exponent: n } if n != 2 => {
                write!(f, "{} (n={})", label, n)
            }
            Formula::RealPower { exponent } => write!(f, "{} (n={})", label, exponent),
            _ => write!(f, "{}", label),
        }
    }
}

/// Given a string and a separator, returns the two values
/// separated by the separator: `"640x480"` or `"-0.5,0"`.
pub fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}
