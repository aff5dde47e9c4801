//! Harmonic series evaluation for planetary positions
//!
//! A [`HarmonicSeriesTable`] encodes one body's heliocentric motion as a
//! flat trigonometric series over the mean longitudes of the nine
//! planets. The format is a single `i8` instruction stream plus three
//! coefficient tables (longitude, latitude, radius) consumed in
//! lockstep:
//!
//! - a segment starting with `np > 0` names `np` (harmonic, argument)
//!   pairs followed by a polynomial degree byte; each channel then
//!   consumes `2·(degree+1)` interleaved cosine/sine amplitude
//!   coefficients (highest power first) and accumulates
//!   `poly_c(T)·cos(arg) + poly_s(T)·sin(arg)`;
//! - a segment starting with `np == 0` is a plain polynomial in T; each
//!   channel consumes `degree+1` coefficients (highest power first);
//! - `np < 0` terminates the stream.
//!
//! Longitude and latitude accumulate in arcseconds, radius in AU on top
//! of the body's mean distance. T is measured in ten-thousand-Julian-year
//! units from J2000.0. Summation runs in exact table order; callers that
//! need bit-identical results across runs get them for free, and table
//! authors order terms accordingly.
//!
//! Sines and cosines of argument multiples come from the double-angle
//! identity and a two-term recurrence, one transcendental call per
//! argument; combined arguments are built by iterative angle addition,
//! never re-derived from the raw angle.

use crate::constants::{
    ASEC2RAD, DEG2RAD, J2000, SERIES_JD_MARGIN, SERIES_JD_MAX, SERIES_JD_MIN, TIMESCALE_DAYS,
};
use crate::fundlib::normalize;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod provider;

pub use provider::{BuiltinEphemeris, EphemerisDataProvider, EphemerisSource};

/// Number of fundamental arguments (planetary mean longitudes)
pub const SERIES_ARG_COUNT: usize = 9;

/// Error type for series evaluation
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("epoch JD {jd} outside supported range [{min}, {max}]")]
    EpochOutOfRange { jd: f64, min: f64, max: f64 },

    #[error("no analytic series for body {0:?}")]
    InvalidBody(Body),

    #[error("malformed series table: {0}")]
    MalformedTable(String),
}

/// Result type for series operations
pub type Result<T> = std::result::Result<T, SeriesError>;

/// Solar-system bodies known to the pipeline.
///
/// The nine planet variants carry built-in heliocentric series; Earth is
/// derived from the Earth-Moon barycenter, and Sun and Moon are handled
/// outside the planetary series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Sun,
    Moon,
}

impl Body {
    /// The nine bodies with a heliocentric series, in argument order
    pub const PLANETS: [Body; SERIES_ARG_COUNT] = [
        Body::Mercury,
        Body::Venus,
        Body::Earth,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    /// Index into the fundamental-argument vector, `None` for Sun/Moon
    pub fn series_index(&self) -> Option<usize> {
        Body::PLANETS.iter().position(|p| p == self)
    }
}

/// Heliocentric ecliptic position: longitude and latitude in radians
/// (J2000 ecliptic), radius in AU.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EclipticPosition {
    pub lon: f64,
    pub lat: f64,
    pub r: f64,
}

/// Mean-longitude rates of the nine planets, radians per
/// ten thousand Julian years
static ARG_FREQS: Lazy<[f64; SERIES_ARG_COUNT]> =
    Lazy::new(|| provider::MEAN_ELEMENTS.map(|e| e.n_deg_cy * 100.0 * DEG2RAD));

/// Mean longitudes at J2000.0, radians
static ARG_PHASES: Lazy<[f64; SERIES_ARG_COUNT]> =
    Lazy::new(|| provider::MEAN_ELEMENTS.map(|e| e.l0_deg * DEG2RAD));

/// Reject epochs outside the analytic domain, allowing the margin
/// consumed by light-time retardation and speed finite-differencing at
/// the window edges. The reported bounds are the nominal domain.
pub fn check_epoch(jd_tt: f64) -> Result<()> {
    let min = SERIES_JD_MIN - SERIES_JD_MARGIN;
    let max = SERIES_JD_MAX + SERIES_JD_MARGIN;
    if !(min..=max).contains(&jd_tt) {
        return Err(SeriesError::EpochOutOfRange {
            jd: jd_tt,
            min: SERIES_JD_MIN,
            max: SERIES_JD_MAX,
        });
    }
    Ok(())
}

/// One body's harmonic series in the flat stream format.
///
/// Immutable after construction; the constructor validates the stream so
/// evaluation never walks off a table.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicSeriesTable {
    body: Body,
    max_harmonic: [usize; SERIES_ARG_COUNT],
    arg_tbl: Vec<i8>,
    lon_tbl: Vec<f64>,
    lat_tbl: Vec<f64>,
    rad_tbl: Vec<f64>,
    distance: f64,
}

impl HarmonicSeriesTable {
    pub fn new(
        body: Body,
        max_harmonic: [usize; SERIES_ARG_COUNT],
        arg_tbl: Vec<i8>,
        lon_tbl: Vec<f64>,
        lat_tbl: Vec<f64>,
        rad_tbl: Vec<f64>,
        distance: f64,
    ) -> Result<Self> {
        if body.series_index().is_none() {
            return Err(SeriesError::InvalidBody(body));
        }
        let table = Self {
            body,
            max_harmonic,
            arg_tbl,
            lon_tbl,
            lat_tbl,
            rad_tbl,
            distance,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn body(&self) -> Body {
        self.body
    }

    /// Mean distance in AU, the baseline the radius channel adds to
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Dry-walk the instruction stream, checking the sentinel, the
    /// argument indices and harmonics, and the coefficient counts.
    fn validate(&self) -> Result<()> {
        let mut ai = 0usize;
        let mut ci = 0usize;
        loop {
            let np = *self
                .arg_tbl
                .get(ai)
                .ok_or_else(|| SeriesError::MalformedTable("missing end sentinel".into()))?;
            ai += 1;
            if np < 0 {
                break;
            }
            if np == 0 {
                let deg = self.degree_byte(&mut ai)?;
                ci += deg + 1;
            } else {
                for _ in 0..np {
                    let k = self.stream_byte(&mut ai)?;
                    let j = self.stream_byte(&mut ai)? as usize;
                    if j >= SERIES_ARG_COUNT {
                        return Err(SeriesError::MalformedTable(format!(
                            "argument index {j} out of range"
                        )));
                    }
                    if k == 0 || k.unsigned_abs() as usize > self.max_harmonic[j] {
                        return Err(SeriesError::MalformedTable(format!(
                            "harmonic {k} of argument {j} exceeds declared maximum"
                        )));
                    }
                }
                let deg = self.degree_byte(&mut ai)?;
                ci += 2 * (deg + 1);
            }
        }
        for (name, tbl) in [
            ("longitude", &self.lon_tbl),
            ("latitude", &self.lat_tbl),
            ("radius", &self.rad_tbl),
        ] {
            if tbl.len() != ci {
                return Err(SeriesError::MalformedTable(format!(
                    "{name} table holds {} coefficients, stream consumes {ci}",
                    tbl.len()
                )));
            }
        }
        Ok(())
    }

    fn stream_byte(&self, ai: &mut usize) -> Result<i8> {
        let b = *self
            .arg_tbl
            .get(*ai)
            .ok_or_else(|| SeriesError::MalformedTable("truncated instruction stream".into()))?;
        *ai += 1;
        Ok(b)
    }

    fn degree_byte(&self, ai: &mut usize) -> Result<usize> {
        let b = self.stream_byte(ai)?;
        if b < 0 {
            return Err(SeriesError::MalformedTable(format!("negative degree {b}")));
        }
        Ok(b as usize)
    }

    /// Evaluate the series at a TT epoch, returning the heliocentric
    /// J2000 ecliptic position.
    pub fn evaluate(&self, jd_tt: f64) -> Result<EclipticPosition> {
        check_epoch(jd_tt)?;
        let t = (jd_tt - J2000) / TIMESCALE_DAYS;

        // Sine/cosine multiples of each fundamental argument
        let mut harmonics: Vec<(Vec<f64>, Vec<f64>)> = Vec::with_capacity(SERIES_ARG_COUNT);
        for i in 0..SERIES_ARG_COUNT {
            let angle = normalize(ARG_FREQS[i] * t + ARG_PHASES[i]);
            harmonics.push(harmonic_multiples(angle, self.max_harmonic[i]));
        }

        let mut lon_sum = 0.0;
        let mut lat_sum = 0.0;
        let mut rad_sum = 0.0;

        // Validated at construction; the walk mirrors validate()
        let mut ai = 0usize;
        let mut ci = 0usize;
        loop {
            let np = self.stream_byte(&mut ai)?;
            if np < 0 {
                break;
            }
            if np == 0 {
                let deg = self.degree_byte(&mut ai)?;
                let n = deg + 1;
                lon_sum += horner(&self.lon_tbl[ci..ci + n], t);
                lat_sum += horner(&self.lat_tbl[ci..ci + n], t);
                rad_sum += horner(&self.rad_tbl[ci..ci + n], t);
                ci += n;
                continue;
            }

            // Combined argument via iterative angle addition
            let mut sv = 0.0;
            let mut cv = 1.0;
            let mut first = true;
            for _ in 0..np {
                let k = self.stream_byte(&mut ai)?;
                let j = self.stream_byte(&mut ai)? as usize;
                let m = k.unsigned_abs() as usize;
                let (ref sines, ref cosines) = harmonics[j];
                let sb = if k < 0 { -sines[m - 1] } else { sines[m - 1] };
                let cb = cosines[m - 1];
                if first {
                    sv = sb;
                    cv = cb;
                    first = false;
                } else {
                    let s = sv * cb + cv * sb;
                    cv = cv * cb - sv * sb;
                    sv = s;
                }
            }

            let deg = self.degree_byte(&mut ai)?;
            let n = 2 * (deg + 1);
            for (tbl, sum) in [
                (&self.lon_tbl, &mut lon_sum),
                (&self.lat_tbl, &mut lat_sum),
                (&self.rad_tbl, &mut rad_sum),
            ] {
                let mut cu = 0.0;
                let mut su = 0.0;
                for p in 0..=deg {
                    cu = cu * t + tbl[ci + 2 * p];
                    su = su * t + tbl[ci + 2 * p + 1];
                }
                *sum += cu * cv + su * sv;
            }
            ci += n;
        }

        Ok(EclipticPosition {
            lon: normalize(lon_sum * ASEC2RAD),
            lat: lat_sum * ASEC2RAD,
            r: self.distance + rad_sum,
        })
    }
}

/// Horner evaluation, coefficients highest power first
fn horner(coeffs: &[f64], t: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, c| acc * t + c)
}

/// Sine/cosine of multiples 1..=n of an angle: double-angle identity for
/// the second multiple, two-term recurrence above it.
fn harmonic_multiples(angle: f64, n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut sines = Vec::with_capacity(n);
    let mut cosines = Vec::with_capacity(n);
    if n == 0 {
        return (sines, cosines);
    }
    let (s1, c1) = angle.sin_cos();
    sines.push(s1);
    cosines.push(c1);
    if n >= 2 {
        sines.push(2.0 * s1 * c1);
        cosines.push(2.0 * c1 * c1 - 1.0);
    }
    for j in 2..n {
        sines.push(2.0 * c1 * sines[j - 1] - sines[j - 2]);
        cosines.push(2.0 * c1 * cosines[j - 1] - cosines[j - 2]);
    }
    (sines, cosines)
}
