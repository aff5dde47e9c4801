//! Built-in analytic ephemeris tables
//!
//! The built-in provider constructs one [`HarmonicSeriesTable`] per
//! planet from J2000.0 mean orbital elements: the elliptic expansion of
//! the equation of center and the radius vector to O(e⁴)-O(e⁵), the
//! reduction from the orbital plane to the ecliptic, the latitude
//! expansion, and literal perturbation rows: Newcomb's leading solar
//! perturbations for the Earth-Moon barycenter and the long-period
//! Jupiter-Saturn and Saturn-Uranus inequalities for the giants. No
//! file I/O is involved; an external provider implementing
//! [`EphemerisDataProvider`] can supply higher-precision tables in the
//! same format.
//!
//! The barycenter table is good to a few arcseconds near J2000; the
//! other inner planets sit at roughly an arcminute and the giants at a
//! few arcminutes. Pluto's unperturbed ellipse drifts further.
//! Accuracy-critical callers plug in their own tables.

use super::{Body, HarmonicSeriesTable, Result, SeriesError, SERIES_ARG_COUNT};
use crate::constants::{ASEC2RAD, DEG2RAD};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Arcseconds per radian
const RAD2ASEC: f64 = 1.0 / ASEC2RAD;

/// Where a body state ultimately came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EphemerisSource {
    /// The built-in or user-supplied planetary harmonic series
    PlanetarySeries,
    /// The geocentric lunar series
    LunarSeries,
    /// Derived from other states (Sun, Earth from the barycenter)
    Derived,
}

/// Source of per-body harmonic series tables
pub trait EphemerisDataProvider: Send + Sync {
    fn table(&self, body: Body) -> Result<&HarmonicSeriesTable>;

    fn source(&self) -> EphemerisSource {
        EphemerisSource::PlanetarySeries
    }
}

/// J2000.0 mean orbital elements of one planet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanElements {
    /// Semi-major axis, AU
    pub a: f64,
    /// Eccentricity
    pub e: f64,
    /// Inclination to the ecliptic, degrees
    pub i_deg: f64,
    /// Longitude of the ascending node, degrees
    pub node_deg: f64,
    /// Longitude of perihelion, degrees
    pub peri_deg: f64,
    /// Mean longitude at J2000.0, degrees
    pub l0_deg: f64,
    /// Mean motion, degrees per Julian century
    pub n_deg_cy: f64,
}

/// Mean elements for the equinox and ecliptic of J2000.0
/// (Simon et al. 1994), in [`Body::PLANETS`] order.
#[rustfmt::skip]
pub const MEAN_ELEMENTS: [MeanElements; SERIES_ARG_COUNT] = [
    MeanElements { a:  0.387_098_310, e: 0.205_631_75, i_deg:  7.004_986, node_deg:  48.330_893, peri_deg:  77.456_119, l0_deg: 252.250_906, n_deg_cy: 149_472.674_635_8 },
    MeanElements { a:  0.723_329_820, e: 0.006_771_88, i_deg:  3.394_662, node_deg:  76.679_920, peri_deg: 131.563_707, l0_deg: 181.979_801, n_deg_cy:  58_517.815_676_0 },
    MeanElements { a:  1.000_001_018, e: 0.016_708_62, i_deg:  0.0,       node_deg:   0.0,       peri_deg: 102.937_348, l0_deg: 100.466_449, n_deg_cy:  35_999.372_851_9 },
    MeanElements { a:  1.523_679_342, e: 0.093_400_62, i_deg:  1.849_726, node_deg:  49.558_093, peri_deg: 336.060_234, l0_deg: 355.433_275, n_deg_cy:  19_140.299_331_3 },
    MeanElements { a:  5.202_603_191, e: 0.048_494_85, i_deg:  1.303_270, node_deg: 100.464_441, peri_deg:  14.331_309, l0_deg:  34.351_484, n_deg_cy:   3_034.905_674_6 },
    MeanElements { a:  9.554_909_596, e: 0.055_508_62, i_deg:  2.488_878, node_deg: 113.665_524, peri_deg:  93.056_787, l0_deg:  50.077_471, n_deg_cy:   1_222.113_794_3 },
    MeanElements { a: 19.218_446_062, e: 0.046_295_90, i_deg:  0.773_196, node_deg:  74.005_947, peri_deg: 173.005_159, l0_deg: 314.055_005, n_deg_cy:     428.466_998_3 },
    MeanElements { a: 30.110_386_869, e: 0.008_988_09, i_deg:  1.769_952, node_deg: 131.784_057, peri_deg:  48.123_691, l0_deg: 304.348_665, n_deg_cy:     218.486_200_2 },
    MeanElements { a: 39.481_686_77,  e: 0.248_807_66, i_deg: 17.141_75,  node_deg: 110.303_47,  peri_deg: 224.066_76,  l0_deg: 238.928_81,  n_deg_cy:     145.207_80 },
];

/// Built-in provider holding the generated tables for all nine planets
pub struct BuiltinEphemeris {
    tables: HashMap<Body, HarmonicSeriesTable>,
}

impl BuiltinEphemeris {
    pub fn new() -> Result<Self> {
        let mut tables = HashMap::new();
        for (body, elements) in Body::PLANETS.iter().zip(MEAN_ELEMENTS.iter()) {
            let table = build_planet_table(*body, elements)?;
            debug!("generated series table for {body:?}");
            tables.insert(*body, table);
        }
        Ok(Self { tables })
    }
}

impl EphemerisDataProvider for BuiltinEphemeris {
    fn table(&self, body: Body) -> Result<&HarmonicSeriesTable> {
        self.tables
            .get(&body)
            .ok_or(SeriesError::InvalidBody(body))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Lon,
    Lat,
    Rad,
}

/// Incrementally builds a table in the flat stream format
struct TableBuilder {
    arg_tbl: Vec<i8>,
    lon_tbl: Vec<f64>,
    lat_tbl: Vec<f64>,
    rad_tbl: Vec<f64>,
    max_harmonic: [usize; SERIES_ARG_COUNT],
}

impl TableBuilder {
    fn new() -> Self {
        Self {
            arg_tbl: Vec::new(),
            lon_tbl: Vec::new(),
            lat_tbl: Vec::new(),
            rad_tbl: Vec::new(),
            max_harmonic: [0; SERIES_ARG_COUNT],
        }
    }

    /// Polynomial segment on one channel; coefficients highest power
    /// first, zeros emitted on the other channels.
    fn polynomial(&mut self, channel: Channel, coeffs: &[f64]) {
        let n = coeffs.len();
        self.arg_tbl.push(0);
        self.arg_tbl.push((n - 1) as i8);
        for c in [Channel::Lon, Channel::Lat, Channel::Rad] {
            let tbl = self.channel_tbl(c);
            if c == channel {
                tbl.extend_from_slice(coeffs);
            } else {
                tbl.extend(std::iter::repeat(0.0).take(n));
            }
        }
    }

    /// Degree-zero periodic segment: `cos_amp·cos(arg) + sin_amp·sin(arg)`
    /// on one channel, where arg is the sum of the named harmonics.
    fn harmonic(&mut self, pairs: &[(i8, usize)], channel: Channel, cos_amp: f64, sin_amp: f64) {
        self.arg_tbl.push(pairs.len() as i8);
        for &(k, j) in pairs {
            self.arg_tbl.push(k);
            self.arg_tbl.push(j as i8);
            self.max_harmonic[j] = self.max_harmonic[j].max(k.unsigned_abs() as usize);
        }
        self.arg_tbl.push(0);
        for c in [Channel::Lon, Channel::Lat, Channel::Rad] {
            let tbl = self.channel_tbl(c);
            if c == channel {
                tbl.push(cos_amp);
                tbl.push(sin_amp);
            } else {
                tbl.push(0.0);
                tbl.push(0.0);
            }
        }
    }

    /// `amp·sin(k·arg + phase)` as a single-argument row. A zero
    /// harmonic degenerates to a constant; negative harmonics fold to
    /// positive by flipping phase and amplitude.
    fn sin_single(&mut self, arg: usize, k: i32, amp: f64, phase: f64, channel: Channel) {
        if amp == 0.0 {
            return;
        }
        let (k, amp, phase) = if k < 0 { (-k, -amp, -phase) } else { (k, amp, phase) };
        if k == 0 {
            self.polynomial(channel, &[amp * phase.sin()]);
        } else {
            self.harmonic(&[(k as i8, arg)], channel, amp * phase.sin(), amp * phase.cos());
        }
    }

    /// `amp·cos(k·arg + phase)` as a single-argument row
    fn cos_single(&mut self, arg: usize, k: i32, amp: f64, phase: f64, channel: Channel) {
        if amp == 0.0 {
            return;
        }
        let (k, phase) = if k < 0 { (-k, -phase) } else { (k, phase) };
        if k == 0 {
            self.polynomial(channel, &[amp * phase.cos()]);
        } else {
            self.harmonic(&[(k as i8, arg)], channel, amp * phase.cos(), -amp * phase.sin());
        }
    }

    /// `amp·sin(Σ kᵢ·argᵢ + phase)` over several arguments
    fn sin_combo(&mut self, pairs: &[(i8, usize)], amp: f64, phase: f64, channel: Channel) {
        self.harmonic(pairs, channel, amp * phase.sin(), amp * phase.cos());
    }

    /// `amp·cos(Σ kᵢ·argᵢ + phase)` over several arguments
    fn cos_combo(&mut self, pairs: &[(i8, usize)], amp: f64, phase: f64, channel: Channel) {
        self.harmonic(pairs, channel, amp * phase.cos(), -amp * phase.sin());
    }

    fn channel_tbl(&mut self, channel: Channel) -> &mut Vec<f64> {
        match channel {
            Channel::Lon => &mut self.lon_tbl,
            Channel::Lat => &mut self.lat_tbl,
            Channel::Rad => &mut self.rad_tbl,
        }
    }

    fn finish(mut self, body: Body, distance: f64) -> Result<HarmonicSeriesTable> {
        self.arg_tbl.push(-1);
        HarmonicSeriesTable::new(
            body,
            self.max_harmonic,
            self.arg_tbl,
            self.lon_tbl,
            self.lat_tbl,
            self.rad_tbl,
            distance,
        )
    }
}

/// Generate a planet's table from its mean elements
fn build_planet_table(body: Body, el: &MeanElements) -> Result<HarmonicSeriesTable> {
    let idx = body.series_index().ok_or(SeriesError::InvalidBody(body))?;
    let e = el.e;
    let e2 = e * e;
    let e3 = e2 * e;
    let e4 = e3 * e;
    let e5 = e4 * e;
    let peri = el.peri_deg * DEG2RAD;
    let node = el.node_deg * DEG2RAD;
    let inc = el.i_deg * DEG2RAD;
    let sin_i = inc.sin();
    // tan²(i/2), the reduction-to-ecliptic coefficient
    let q = (inc / 2.0).tan().powi(2);

    let mut b = TableBuilder::new();

    // Mean longitude in arcseconds, linear in T
    b.polynomial(
        Channel::Lon,
        &[el.n_deg_cy * 100.0 * 3600.0, el.l0_deg * 3600.0],
    );

    // Equation of center: ν - M as harmonics of the mean anomaly
    let center = [
        2.0 * e - e3 / 4.0 + 5.0 * e5 / 96.0,
        5.0 * e2 / 4.0 - 11.0 * e4 / 24.0,
        13.0 * e3 / 12.0 - 43.0 * e5 / 64.0,
        103.0 * e4 / 96.0,
        1097.0 * e5 / 960.0,
    ];
    for (j, ck) in center.iter().enumerate() {
        let k = (j + 1) as i32;
        b.sin_single(idx, k, ck * RAD2ASEC, -(k as f64) * peri, Channel::Lon);
    }

    // Reduction from the orbital plane to the ecliptic:
    // -q·sin 2u₀ - q·c₁·[sin(M+2u₀) + sin(M-2u₀)] + (q²/2)·sin 4u₀
    // with u₀ = L - Ω the mean argument of latitude
    b.sin_single(idx, 2, -q * RAD2ASEC, -2.0 * node, Channel::Lon);
    b.sin_single(idx, 3, -q * center[0] * RAD2ASEC, -(peri + 2.0 * node), Channel::Lon);
    b.sin_single(idx, -1, -q * center[0] * RAD2ASEC, 2.0 * node - peri, Channel::Lon);
    b.sin_single(idx, 4, q * q / 2.0 * RAD2ASEC, -4.0 * node, Channel::Lon);

    // Latitude: sin β = sin i · sin u expanded in the mean anomaly
    let lat_rows: [(i32, f64, f64); 5] = [
        (1, 1.0 - e2, -node),
        (0, -e, peri - node),
        (2, e, -(peri + node)),
        (3, 9.0 / 8.0 * e2, -(2.0 * peri + node)),
        (-1, -e2 / 8.0, 2.0 * peri - node),
    ];
    for (k, amp, phase) in lat_rows {
        b.sin_single(idx, k, amp * sin_i * RAD2ASEC, phase, Channel::Lat);
    }

    // Radius vector: r/a expansion; the constant a·(1 + e²/2) is the
    // table's mean distance, the rest are cosine rows
    let distance = el.a * (1.0 + e2 / 2.0);
    let rad_rows: [(i32, f64); 4] = [
        (1, -(e - 3.0 * e3 / 8.0)),
        (2, -(e2 / 2.0 - e4 / 3.0)),
        (3, -3.0 * e3 / 8.0),
        (4, -e4 / 3.0),
    ];
    for (k, amp) in rad_rows {
        b.cos_single(idx, k, el.a * amp, -(k as f64) * peri, Channel::Rad);
    }

    perturbation_rows(body, &mut b);

    b.finish(body, distance)
}

/// Literal perturbation rows for the Earth-Moon barycenter and the
/// giant planets.
///
/// Amplitudes in degrees. For the giants the arguments are integer
/// combinations of the Jupiter, Saturn and Uranus mean anomalies with a
/// literal phase; the great Jupiter-Saturn inequality (2M♃ - 5M♄)
/// dominates. For the barycenter they are Newcomb's leading solar
/// perturbations by Venus and Jupiter plus the 4E−8M+3J long-period
/// term, rewritten over mean longitudes with phases matched to the
/// published arguments at J2000.0.
fn perturbation_rows(body: Body, b: &mut TableBuilder) {
    const VEN: usize = 1;
    const EAR: usize = 2;
    const MAR: usize = 3;
    const JUP: usize = 4;
    const SAT: usize = 5;
    const URA: usize = 6;
    let peri_j = MEAN_ELEMENTS[JUP].peri_deg * DEG2RAD;
    let peri_s = MEAN_ELEMENTS[SAT].peri_deg * DEG2RAD;
    let peri_u = MEAN_ELEMENTS[URA].peri_deg * DEG2RAD;
    let peri = [peri_j, peri_s, peri_u];
    let arg_of = |j: usize| match j {
        JUP => 0,
        SAT => 1,
        _ => 2,
    };
    // Phase of Σ kᵢ·Mᵢ + φ₀ rewritten over mean longitudes
    let fold = |pairs: &[(i8, usize)], phi0_deg: f64| -> f64 {
        let mut phase = phi0_deg * DEG2RAD;
        for &(k, j) in pairs {
            phase -= k as f64 * peri[arg_of(j)];
        }
        phase
    };
    let asec = 3600.0;

    match body {
        Body::Earth => {
            // Newcomb's perturbations of the Sun's longitude: cosine
            // arguments 153.23° + 22518.75°T (Venus), 216.57° + 45037.51°T
            // (Venus, double), 312.69° + 32964.36°T (Jupiter) and the
            // sine argument 231.19° + 20.20°T (4E−8M+3J). The lunar
            // inequality is handled by the barycenter correction, not
            // here.
            let pairs = [(1i8, VEN), (-1i8, EAR)];
            b.cos_combo(&pairs, 0.00134 * asec, 71.7166 * DEG2RAD, Channel::Lon);
            let pairs = [(2i8, VEN), (-2i8, EAR)];
            b.cos_combo(&pairs, 0.00154 * asec, 53.5433 * DEG2RAD, Channel::Lon);
            let pairs = [(1i8, EAR), (-1i8, JUP)];
            b.cos_combo(&pairs, 0.00200 * asec, 246.5750 * DEG2RAD, Channel::Lon);
            let pairs = [(-4i8, EAR), (8i8, MAR), (-3i8, JUP)];
            b.sin_combo(&pairs, 0.00178 * asec, 52.6440 * DEG2RAD, Channel::Lon);
        }
        Body::Jupiter => {
            let rows: [(f64, i8, i8, f64, bool); 7] = [
                (-0.332, 2, -5, -67.6, false),
                (-0.056, 2, -2, 21.0, false),
                (0.042, 3, -5, 21.0, false),
                (-0.036, 1, -2, 0.0, false),
                (0.022, 1, -1, 0.0, true),
                (0.023, 2, -3, 52.0, false),
                (-0.016, 1, -5, -69.0, false),
            ];
            for (amp, kj, ks, phi, is_cos) in rows {
                let pairs = [(kj, JUP), (ks, SAT)];
                let phase = fold(&pairs, phi);
                if is_cos {
                    b.cos_combo(&pairs, amp * asec, phase, Channel::Lon);
                } else {
                    b.sin_combo(&pairs, amp * asec, phase, Channel::Lon);
                }
            }
        }
        Body::Saturn => {
            let lon_rows: [(f64, i8, i8, f64, bool); 5] = [
                (0.812, 2, -5, -67.6, false),
                (-0.229, 2, -4, -2.0, true),
                (0.119, 1, -2, -3.0, false),
                (0.046, 2, -6, -69.0, false),
                (0.014, 1, -3, 32.0, false),
            ];
            for (amp, kj, ks, phi, is_cos) in lon_rows {
                let pairs = [(kj, JUP), (ks, SAT)];
                let phase = fold(&pairs, phi);
                if is_cos {
                    b.cos_combo(&pairs, amp * asec, phase, Channel::Lon);
                } else {
                    b.sin_combo(&pairs, amp * asec, phase, Channel::Lon);
                }
            }
            let pairs = [(2i8, JUP), (-4i8, SAT)];
            b.cos_combo(&pairs, -0.020 * asec, fold(&pairs, -2.0), Channel::Lat);
            let pairs = [(2i8, JUP), (-6i8, SAT)];
            b.sin_combo(&pairs, 0.018 * asec, fold(&pairs, -49.0), Channel::Lat);
        }
        Body::Uranus => {
            let pairs = [(1i8, SAT), (-2i8, URA)];
            b.sin_combo(&pairs, 0.040 * asec, fold(&pairs, 6.0), Channel::Lon);
            let pairs = [(1i8, SAT), (-3i8, URA)];
            b.sin_combo(&pairs, 0.035 * asec, fold(&pairs, 33.0), Channel::Lon);
            let pairs = [(1i8, JUP), (-1i8, URA)];
            b.sin_combo(&pairs, -0.015 * asec, fold(&pairs, 20.0), Channel::Lon);
        }
        _ => {}
    }
}
