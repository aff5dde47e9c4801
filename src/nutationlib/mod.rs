//! Nutation of the Earth's rotation axis
//!
//! Two interchangeable model families compute the nutation in longitude
//! (Δψ) and obliquity (Δε) for an epoch:
//!
//! - the IAU 1980 trigonometric series over the five Delaunay arguments,
//!   with the optional Herring (1987) out-of-phase correction rows;
//! - the IAU 2000 series: 2000B is the 77-term luni-solar table
//!   (IERS Conventions 2010, Table 5.3b) with fixed offsets standing in
//!   for the omitted terms, 2000A is the same luni-solar table plus an
//!   abridged planetary component over 14 fundamental arguments and the
//!   optional IAU 2006 (P03) secular scaling.
//!
//! The caller selects exactly one model per evaluation. The 2000-series
//! sums run in reverse index order, from the smallest terms up, which
//! preserves the low-order bits of the accumulation; that ordering is a
//! contract, not a style choice.

use crate::constants::ASEC2RAD;
use crate::fundlib::{delaunay_args_1980, delaunay_args_2000, planetary_args, FundamentalArgs};
use log::trace;

/// Nutation in longitude and obliquity, radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nutation {
    pub dpsi: f64,
    pub deps: f64,
}

/// Selectable nutation model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NutationModel {
    /// IAU 1980 series
    Iau1980,
    /// IAU 2000B truncated luni-solar series
    Iau2000B,
    /// IAU 2000A: luni-solar plus planetary component
    #[default]
    Iau2000A,
}

/// Nutation model configuration
///
/// The planetary component and the P03 scaling are independent toggles;
/// both default to on and only take effect with [`NutationModel::Iau2000A`].
/// The Herring rows only take effect with [`NutationModel::Iau1980`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutationConfig {
    pub model: NutationModel,
    /// Apply the Herring (1987) correction rows to the 1980 series
    pub herring_corrections: bool,
    /// Include the planetary component of the 2000A model
    pub planetary_terms: bool,
    /// Apply the IAU 2006 (P03) secular corrections to the 2000A output
    pub p03_corrections: bool,
}

impl Default for NutationConfig {
    fn default() -> Self {
        Self {
            model: NutationModel::default(),
            herring_corrections: false,
            planetary_terms: true,
            p03_corrections: true,
        }
    }
}

/// Compute nutation for a TT epoch expressed in Julian centuries from
/// J2000.0, under the selected model.
pub fn nutation(t: f64, config: &NutationConfig) -> Nutation {
    trace!("nutation model {:?} at t={t}", config.model);
    match config.model {
        NutationModel::Iau1980 => nutation_iau1980(t, config.herring_corrections),
        NutationModel::Iau2000B => nutation_iau2000(t, false, false),
        NutationModel::Iau2000A => {
            nutation_iau2000(t, config.planetary_terms, config.p03_corrections)
        }
    }
}

// ---------------------------------------------------------------------------
// IAU 1980 model
// ---------------------------------------------------------------------------

/// The full 106-term IAU 1980 nutation series (Seidelmann 1982).
///
/// Each row: multipliers of (l, l', F, D, Ω) and the amplitudes
/// `(S, S_t, C, C_t)` where Δψ gains `(S + S_t·T)·sin(arg)` and Δε gains
/// `(C + C_t·T)·cos(arg)`, in units of 0.0001″ (T in Julian centuries).
/// Rows are grouped by argument family as in the published table.
#[rustfmt::skip]
const NUT_1980: [(i8, i8, i8, i8, i8, f64, f64, f64, f64); 106] = [
    ( 0,  0,  0,  0,  1, -171996.0, -174.2,  92025.0,  8.9),
    ( 0,  0,  0,  0,  2,    2062.0,    0.2,   -895.0,  0.5),
    (-2,  0,  2,  0,  1,      46.0,    0.0,    -24.0,  0.0),
    ( 2,  0, -2,  0,  0,      11.0,    0.0,      0.0,  0.0),
    (-2,  0,  2,  0,  2,      -3.0,    0.0,      1.0,  0.0),
    ( 1, -1,  0, -1,  0,      -3.0,    0.0,      0.0,  0.0),
    ( 0, -2,  2, -2,  1,      -2.0,    0.0,      1.0,  0.0),
    ( 2,  0, -2,  0,  1,       1.0,    0.0,      0.0,  0.0),
    ( 0,  0,  2, -2,  2,  -13187.0,   -1.6,   5736.0, -3.1),
    ( 0,  1,  0,  0,  0,    1426.0,   -3.4,     54.0, -0.1),
    ( 0,  1,  2, -2,  2,    -517.0,    1.2,    224.0, -0.6),
    ( 0, -1,  2, -2,  2,     217.0,   -0.5,    -95.0,  0.3),
    ( 0,  0,  2, -2,  1,     129.0,    0.1,    -70.0,  0.0),
    ( 2,  0,  0, -2,  0,      48.0,    0.0,      1.0,  0.0),
    ( 0,  0,  2, -2,  0,     -22.0,    0.0,      0.0,  0.0),
    ( 0,  2,  0,  0,  0,      17.0,   -0.1,      0.0,  0.0),
    ( 0,  1,  0,  0,  1,     -15.0,    0.0,      9.0,  0.0),
    ( 0,  2,  2, -2,  2,     -16.0,    0.1,      7.0,  0.0),
    ( 0, -1,  0,  0,  1,     -12.0,    0.0,      6.0,  0.0),
    (-2,  0,  0,  2,  1,      -6.0,    0.0,      3.0,  0.0),
    ( 0, -1,  2, -2,  1,      -5.0,    0.0,      3.0,  0.0),
    ( 2,  0,  0, -2,  1,       4.0,    0.0,     -2.0,  0.0),
    ( 0,  1,  2, -2,  1,       4.0,    0.0,     -2.0,  0.0),
    ( 1,  0,  0, -1,  0,      -4.0,    0.0,      0.0,  0.0),
    ( 2,  1,  0, -2,  0,       1.0,    0.0,      0.0,  0.0),
    ( 0,  0, -2,  2,  1,       1.0,    0.0,      0.0,  0.0),
    ( 0,  1, -2,  2,  0,      -1.0,    0.0,      0.0,  0.0),
    ( 0,  1,  0,  0,  2,       1.0,    0.0,      0.0,  0.0),
    (-1,  0,  0,  1,  1,       1.0,    0.0,      0.0,  0.0),
    ( 0,  1,  2, -2,  0,      -1.0,    0.0,      0.0,  0.0),
    ( 0,  0,  2,  0,  2,   -2274.0,   -0.2,    977.0, -0.5),
    ( 1,  0,  0,  0,  0,     712.0,    0.1,     -7.0,  0.0),
    ( 0,  0,  2,  0,  1,    -386.0,   -0.4,    200.0,  0.0),
    ( 1,  0,  2,  0,  2,    -301.0,    0.0,    129.0, -0.1),
    ( 1,  0,  0, -2,  0,    -158.0,    0.0,     -1.0,  0.0),
    (-1,  0,  2,  0,  2,     123.0,    0.0,    -53.0,  0.0),
    ( 0,  0,  0,  2,  0,      63.0,    0.0,     -2.0,  0.0),
    ( 1,  0,  0,  0,  1,      63.0,    0.1,    -33.0,  0.0),
    (-1,  0,  0,  0,  1,     -58.0,   -0.1,     32.0,  0.0),
    (-1,  0,  2,  2,  2,     -59.0,    0.0,     26.0,  0.0),
    ( 1,  0,  2,  0,  1,     -51.0,    0.0,     27.0,  0.0),
    ( 0,  0,  2,  2,  2,     -38.0,    0.0,     16.0,  0.0),
    ( 2,  0,  0,  0,  0,      29.0,    0.0,     -1.0,  0.0),
    ( 1,  0,  2, -2,  2,      29.0,    0.0,    -12.0,  0.0),
    ( 2,  0,  2,  0,  2,     -31.0,    0.0,     13.0,  0.0),
    ( 0,  0,  2,  0,  0,      26.0,    0.0,     -1.0,  0.0),
    (-1,  0,  2,  0,  1,      21.0,    0.0,    -10.0,  0.0),
    (-1,  0,  0,  2,  1,      16.0,    0.0,     -8.0,  0.0),
    ( 1,  0,  0, -2,  1,     -13.0,    0.0,      7.0,  0.0),
    (-1,  0,  2,  2,  1,     -10.0,    0.0,      5.0,  0.0),
    ( 1,  1,  0, -2,  0,      -7.0,    0.0,      0.0,  0.0),
    ( 0,  1,  2,  0,  2,       7.0,    0.0,     -3.0,  0.0),
    ( 0, -1,  2,  0,  2,      -7.0,    0.0,      3.0,  0.0),
    ( 1,  0,  2,  2,  2,      -8.0,    0.0,      3.0,  0.0),
    ( 1,  0,  0,  2,  0,       6.0,    0.0,      0.0,  0.0),
    ( 2,  0,  2, -2,  2,       6.0,    0.0,     -3.0,  0.0),
    ( 0,  0,  0,  2,  1,      -6.0,    0.0,      3.0,  0.0),
    ( 0,  0,  2,  2,  1,      -7.0,    0.0,      3.0,  0.0),
    ( 1,  0,  2, -2,  1,       6.0,    0.0,     -3.0,  0.0),
    ( 0,  0,  0, -2,  1,      -5.0,    0.0,      3.0,  0.0),
    ( 1, -1,  0,  0,  0,       5.0,    0.0,      0.0,  0.0),
    ( 2,  0,  2,  0,  1,      -5.0,    0.0,      3.0,  0.0),
    ( 0,  1,  0, -2,  0,      -4.0,    0.0,      0.0,  0.0),
    ( 1,  0, -2,  0,  0,       4.0,    0.0,      0.0,  0.0),
    ( 0,  0,  0,  1,  0,      -4.0,    0.0,      0.0,  0.0),
    ( 1,  1,  0,  0,  0,      -3.0,    0.0,      0.0,  0.0),
    ( 1,  0,  2,  0,  0,       3.0,    0.0,      0.0,  0.0),
    ( 1, -1,  2,  0,  2,      -3.0,    0.0,      1.0,  0.0),
    (-1, -1,  2,  2,  2,      -3.0,    0.0,      1.0,  0.0),
    (-2,  0,  0,  0,  1,      -2.0,    0.0,      1.0,  0.0),
    ( 3,  0,  2,  0,  2,      -3.0,    0.0,      1.0,  0.0),
    ( 0, -1,  2,  2,  2,      -3.0,    0.0,      1.0,  0.0),
    ( 1,  1,  2,  0,  2,       2.0,    0.0,     -1.0,  0.0),
    (-1,  0,  2, -2,  1,      -2.0,    0.0,      1.0,  0.0),
    ( 2,  0,  0,  0,  1,       2.0,    0.0,     -1.0,  0.0),
    ( 1,  0,  0,  0,  2,      -2.0,    0.0,      1.0,  0.0),
    ( 3,  0,  0,  0,  0,       2.0,    0.0,      0.0,  0.0),
    ( 0,  0,  2,  1,  2,       2.0,    0.0,     -1.0,  0.0),
    (-1,  0,  0,  0,  2,       1.0,    0.0,     -1.0,  0.0),
    ( 1,  0,  0, -4,  0,      -1.0,    0.0,      0.0,  0.0),
    (-2,  0,  2,  2,  2,       1.0,    0.0,     -1.0,  0.0),
    (-1,  0,  2,  4,  2,      -2.0,    0.0,      1.0,  0.0),
    ( 2,  0,  0, -4,  0,      -1.0,    0.0,      0.0,  0.0),
    ( 1,  1,  2, -2,  2,       1.0,    0.0,     -1.0,  0.0),
    ( 1,  0,  2,  2,  1,      -1.0,    0.0,      1.0,  0.0),
    (-2,  0,  2,  4,  2,      -1.0,    0.0,      1.0,  0.0),
    (-1,  0,  4,  0,  2,       1.0,    0.0,      0.0,  0.0),
    ( 1, -1,  0, -2,  0,       1.0,    0.0,      0.0,  0.0),
    ( 2,  0,  2, -2,  1,       1.0,    0.0,     -1.0,  0.0),
    ( 2,  0,  2,  2,  2,      -1.0,    0.0,      0.0,  0.0),
    ( 1,  0,  0,  2,  1,      -1.0,    0.0,      0.0,  0.0),
    ( 0,  0,  4, -2,  2,       1.0,    0.0,      0.0,  0.0),
    ( 3,  0,  2, -2,  2,       1.0,    0.0,      0.0,  0.0),
    ( 1,  0,  2, -2,  0,      -1.0,    0.0,      0.0,  0.0),
    ( 0,  1,  2,  0,  1,       1.0,    0.0,      0.0,  0.0),
    (-1, -1,  0,  2,  1,       1.0,    0.0,      0.0,  0.0),
    ( 0,  0, -2,  0,  1,      -1.0,    0.0,      0.0,  0.0),
    ( 0,  0,  2, -1,  2,      -1.0,    0.0,      0.0,  0.0),
    ( 0,  1,  0,  2,  0,      -1.0,    0.0,      0.0,  0.0),
    ( 1,  0, -2, -2,  0,      -1.0,    0.0,      0.0,  0.0),
    ( 0, -1,  2,  0,  1,      -1.0,    0.0,      0.0,  0.0),
    ( 1,  1,  0, -2,  1,      -1.0,    0.0,      0.0,  0.0),
    ( 1,  0, -2,  2,  0,      -1.0,    0.0,      0.0,  0.0),
    ( 2,  0,  0,  2,  0,       1.0,    0.0,      0.0,  0.0),
    ( 0,  0,  2,  4,  2,      -1.0,    0.0,      0.0,  0.0),
    ( 0,  1,  0,  1,  0,       1.0,    0.0,      0.0,  0.0),
];

/// Herring (1987) out-of-phase correction rows for the 1980 series.
///
/// Unlike the main table these accumulate cosine into longitude and sine
/// into obliquity. Amplitudes in units of 0.00001″.
const HERRING_1987: [(i8, i8, i8, i8, i8, f64, f64); 2] = [
    (0, 0, 0, 0, 1, -725.0, 213.0),
    (0, 1, 0, 0, 0, 523.0, 208.0),
];

/// Per-argument sine/cosine multiples 1..=n, built with the double-angle
/// identity for the second multiple and the two-term Chebyshev recurrence
/// above that. One transcendental call per argument.
fn harmonic_table(angle: f64, n: usize) -> (Vec<f64>, Vec<f64>) {
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

/// Combine harmonics of several arguments into the sine/cosine of the
/// summed angle by iterative angle addition.
fn combine(
    multipliers: &[i8],
    tables: &[(Vec<f64>, Vec<f64>)],
) -> (f64, f64) {
    let mut sv = 0.0;
    let mut cv = 1.0;
    let mut first = true;
    for (arg_index, &m) in multipliers.iter().enumerate() {
        if m == 0 {
            continue;
        }
        let k = m.unsigned_abs() as usize;
        let (ref sines, ref cosines) = tables[arg_index];
        let sb = if m < 0 { -sines[k - 1] } else { sines[k - 1] };
        let cb = cosines[k - 1];
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
    (sv, cv)
}

fn args_as_array(a: &FundamentalArgs) -> [f64; 5] {
    [a.l, a.lp, a.f, a.d, a.om]
}

fn nutation_iau1980(t: f64, herring: bool) -> Nutation {
    let args = args_as_array(&delaunay_args_1980(t));

    // Highest multiple of each argument used anywhere in the table
    let mut max_mult = [0usize; 5];
    for row in &NUT_1980 {
        let mults = [row.0, row.1, row.2, row.3, row.4];
        for (i, m) in mults.iter().enumerate() {
            max_mult[i] = max_mult[i].max(m.unsigned_abs() as usize);
        }
    }

    let tables: Vec<(Vec<f64>, Vec<f64>)> = args
        .iter()
        .zip(max_mult.iter())
        .map(|(&a, &n)| harmonic_table(a, n))
        .collect();

    let mut dpsi = 0.0;
    let mut deps = 0.0;
    for row in &NUT_1980 {
        let mults = [row.0, row.1, row.2, row.3, row.4];
        let (sin_arg, cos_arg) = combine(&mults, &tables);
        dpsi += (row.5 + row.6 * t) * sin_arg;
        deps += (row.7 + row.8 * t) * cos_arg;
    }
    // Units 0.0001 arcsec
    let mut dpsi = dpsi * 1.0e-4;
    let mut deps = deps * 1.0e-4;

    if herring {
        for row in &HERRING_1987 {
            let mults = [row.0, row.1, row.2, row.3, row.4];
            let (sin_arg, cos_arg) = combine(&mults, &tables);
            // Out-of-phase rule: cosine feeds longitude, sine obliquity
            dpsi += row.5 * 1.0e-5 * cos_arg;
            deps += row.6 * 1.0e-5 * sin_arg;
        }
    }

    Nutation {
        dpsi: dpsi * ASEC2RAD,
        deps: deps * ASEC2RAD,
    }
}

// ---------------------------------------------------------------------------
// IAU 2000A/B models
// ---------------------------------------------------------------------------

/// IAU 2000B luni-solar nutation term coefficients.
///
/// Each row: `[nl, nl', nF, nD, nΩ, S, S', C, C']` where `S, S'` give
/// Δψ = (S + S'·T)·sin(arg) and `C, C'` give Δε = (C + C'·T)·cos(arg),
/// amplitudes stored as i64 in units of 0.1 μas.
///
/// Source: IERS Conventions 2010, Table 5.3b (77 terms); these are also
/// the 77 leading terms of the 2000A luni-solar component.
#[rustfmt::skip]
static NUT_2000_LS: [[i64; 9]; 77] = [
    //  nl  nl'  nF   nD   nΩ       S           S'          C           C'
    [   0,   0,   0,   0,   1, -172064161,  -174666,   92052331,    9086],
    [   0,   0,   2,  -2,   2,  -13170906,    -1675,    5730336,   -3015],
    [   0,   0,   2,   0,   2,   -2276413,     -234,     978459,    -485],
    [   0,   0,   0,   0,   2,    2074554,      207,    -897492,     470],
    [   0,   1,   0,   0,   0,    1475877,    -3633,      73871,    -184],
    [   0,   1,   2,  -2,   2,    -516821,     1226,     224386,    -677],
    [   1,   0,   0,   0,   0,     711159,       73,      -6750,       0],
    [   0,   0,   2,   0,   1,    -387298,     -367,     200728,      18],
    [   1,   0,   2,   0,   2,    -301461,      -36,     129025,     -63],
    [   0,  -1,   2,  -2,   2,     215829,     -494,     -95929,     299],
    [   0,   0,   2,  -2,   1,     128227,      137,     -68982,      -9],
    [  -1,   0,   2,   0,   2,     123457,       11,     -53311,      32],
    [  -1,   0,   0,   2,   0,     156994,       10,      -1235,       0],
    [   1,   0,   0,   0,   1,      63110,       63,     -33228,       0],
    [  -1,   0,   0,   0,   1,     -57976,      -63,      31429,       0],
    [  -1,   0,   2,   2,   2,     -59641,      -11,      25543,     -11],
    [   1,   0,   2,   0,   1,     -51613,      -42,      26366,       0],
    [  -2,   0,   2,   0,   1,      45893,       50,     -24236,     -10],
    [   0,   0,   0,   2,   0,      63384,       11,      -1220,       0],
    [   0,   0,   2,   2,   2,     -38571,       -1,      16452,     -11],
    [   0,  -2,   2,  -2,   2,      32481,        0,     -13870,       0],
    [  -2,   0,   0,   2,   0,     -47722,        0,        477,       0],
    [   2,   0,   2,   0,   2,     -31046,       -1,      13238,     -11],
    [   1,   0,   2,  -2,   2,      28593,        0,     -12338,      10],
    [  -1,   0,   2,   0,   1,      20441,       21,     -10758,       0],
    [   2,   0,   0,   0,   0,      29243,        0,       -609,       0],
    [   0,   0,   2,   0,   0,      25887,        0,       -550,       0],
    [   0,   1,   0,   0,   1,     -14053,      -25,       8551,      -2],
    [  -1,   0,   0,   2,   1,      15164,       10,      -8001,       0],
    [   0,   2,   2,  -2,   2,     -15794,       72,       6850,     -42],
    [   0,   0,  -2,   2,   0,      21783,        0,       -167,       0],
    [   1,   0,   0,  -2,   1,     -12873,      -10,       6953,       0],
    [   0,  -1,   0,   0,   1,     -12654,       11,       6415,       0],
    [  -1,   0,   2,   2,   1,     -10204,        0,       5222,       0],
    [   0,   2,   0,   0,   0,      16707,      -85,        168,      -1],
    [   1,   0,   2,   2,   2,      -7691,        0,       3268,       0],
    [  -2,   0,   2,   0,   0,     -11024,        0,        104,       0],
    [   0,   1,   2,   0,   2,       7566,      -21,      -3250,       0],
    [   0,   0,   2,   2,   1,      -6637,      -11,       3353,       0],
    [   0,  -1,   2,   0,   2,      -7141,       21,       3070,       0],
    [   0,   0,   0,   2,   1,      -6302,      -11,       3272,       0],
    [   1,   0,   2,  -2,   1,       5800,       10,      -3045,       0],
    [   2,   0,   2,  -2,   2,       6443,        0,      -2768,       0],
    [  -2,   0,   0,   2,   1,      -5774,      -11,       3041,       0],
    [   2,   0,   2,   0,   1,      -5350,        0,       2695,       0],
    [   0,  -1,   2,  -2,   1,      -4752,      -11,       2719,       0],
    [   0,   0,   0,  -2,   1,      -4940,      -11,       2720,       0],
    [  -1,  -1,   0,   2,   0,       7350,        0,        -51,       0],
    [   2,   0,   0,  -2,   1,      -4803,      -11,       2556,       0],
    [   1,   0,   0,   2,   0,      -7677,        0,        462,       0],
    [   0,   1,   2,  -2,   1,       5417,        0,      -2520,       0],
    [   1,  -1,   0,   0,   0,       6624,        0,       -468,       0],
    [  -2,   0,   2,   0,   2,      -5433,        0,       2334,       0],
    [   3,   0,   2,   0,   2,      -4632,        0,       1991,       0],
    [   0,  -1,   0,   2,   0,       6106,        0,       -167,       0],
    [   1,  -1,   2,   0,   2,      -3593,        0,       1556,       0],
    [   0,   0,   0,   1,   0,      -4766,        0,        270,       0],
    [  -1,  -1,   2,   2,   2,      -4095,        0,       1793,       0],
    [  -1,   0,   2,   0,   0,       4229,        0,       -101,       0],
    [   0,  -1,   2,   2,   2,      -3372,        0,       1487,       0],
    [   2,   0,   0,   0,   1,      -3353,        0,       1758,       0],
    [   1,   0,   2,   0,   0,      -3523,        0,        246,       0],
    [   1,   1,   0,   0,   0,      -3613,        0,        329,       0],
    [  -1,   0,   2,  -2,   1,       3522,        0,      -1830,       0],
    [   2,   0,   0,   0,  -1,       3312,        0,      -1730,       0],
    [   0,   0,  -2,   2,   1,      -3142,        0,       1704,       0],
    [   0,   1,   0,   0,  -1,      -2927,        0,       1564,       0],
    [   0,   1,   2,   0,   1,      -2887,        0,       1401,       0],
    [   0,  -1,   2,   0,   1,       2451,        0,      -1200,       0],
    [   2,   0,  -2,   0,   0,      -2790,        0,        410,       0],
    [  -1,   0,   0,   2,  -1,       2145,        0,      -1154,       0],
    [   0,   0,   2,  -2,   0,       2816,        0,        286,       0],
    [   0,   1,   0,  -2,   0,       2700,        0,       -258,       0],
    [   1,   0,   0,  -1,   0,      -2330,        0,        -37,       0],
    [   0,   0,   0,   0,   2,       2283,        0,      -1039,       0],
    [   1,   0,  -2,   0,   0,      -2321,        0,        284,       0],
    [  -1,   0,   0,   1,   1,      -2049,        0,       1112,       0],
];

/// Abridged planetary component of the IAU 2000A model.
///
/// Each row: 14 argument multipliers (l, l', F, D, Ω, lMe..lNe, pa)
/// followed by `[S_sin, S_cos, C_sin, C_cos]` amplitudes in 0.1 μas,
/// where Δψ gains `S_sin·sin(arg) + S_cos·cos(arg)` and Δε gains
/// `C_sin·sin(arg) + C_cos·cos(arg)`.
///
/// Only the leading terms of the 687-term MHB2000 planetary series are
/// carried; the omitted tail stays below a few tenths of a
/// milliarcsecond. Full-precision nutation would come from an external
/// data source, not from this built-in table.
#[rustfmt::skip]
static NUT_2000A_PLANETARY: [([i8; 14], [i64; 4]); 10] = [
    (([0, 0, 1, -1, 1,  0, -8, 12,  0, 0, 0, 0, 0, 0]), [ 1440,     0,     0,     0]),
    (([0, 0, 0,  0, 0,  0, -8, 12,  0, 0, 0, 0, 0, 0]), [   56,  -117,   -42,   -40]),
    (([0, 0, 2, -2, 2,  0, -8, 12,  0, 0, 0, 0, 0, 0]), [  125,   -43,     0,   -54]),
    (([0, 0, 0,  0, 0,  0,  0,  0,  0, 2, -5, 0, 0, 0]), [  -38,   -11,    -2,    17]),
    (([0, 0, 1, -1, 1,  0,  0, -1,  0, 2, -5, 0, 0, 0]), [ -323,    59,    26,   144]),
    (([0, 0, 0,  0, 0,  0,  0,  1,  0, -2, 5, 0, 0, 0]), [  417,   141,    63,  -187]),
    (([0, 0, 1, -1, 1,  0,  0, -1,  0, -2, 5, 0, 0, 0]), [ -342,   -55,   -25,   155]),
    (([0, 0, 0,  0, 0,  0,  3, -5,  0, 0, 0, 0, 0, 0]), [ -114,     0,     0,    49]),
    (([0, 0, 0,  0, 0,  0,  0,  2, -2, 0, 0, 0, 0, 0]), [  111,   -25,   -11,   -48]),
    (([0, 0, 0,  0, 1,  0,  0,  0,  0, 0, 0, 0, 0, 2]), [  -95,    28,    12,    41]),
];

/// Fixed offsets (arcsec) compensating the truncation of the 2000B model:
/// Δψ −0.135 mas, Δε +0.388 mas
const NUT_2000B_OFFSET_PSI: f64 = -0.000_135;
const NUT_2000B_OFFSET_EPS: f64 = 0.000_388;

fn nutation_iau2000(t: f64, planetary: bool, p03: bool) -> Nutation {
    let args = args_as_array(&delaunay_args_2000(t));

    let mut dpsi: f64 = 0.0;
    let mut deps: f64 = 0.0;

    // Reverse order: accumulate from the smallest terms to the largest
    for row in NUT_2000_LS.iter().rev() {
        let arg = row[0] as f64 * args[0]
            + row[1] as f64 * args[1]
            + row[2] as f64 * args[2]
            + row[3] as f64 * args[3]
            + row[4] as f64 * args[4];
        let (sin_arg, cos_arg) = arg.sin_cos();
        dpsi += (row[5] as f64 + row[6] as f64 * t) * sin_arg;
        deps += (row[7] as f64 + row[8] as f64 * t) * cos_arg;
    }

    // 0.1 μas to arcsec
    let mut dpsi = dpsi * 1e-7;
    let mut deps = deps * 1e-7;

    if planetary {
        let pargs = planetary_args(t);
        let mut p_dpsi: f64 = 0.0;
        let mut p_deps: f64 = 0.0;
        for (mults, amps) in NUT_2000A_PLANETARY.iter().rev() {
            let mut arg = 0.0;
            for (m, a) in mults.iter().zip(pargs.iter()) {
                if *m != 0 {
                    arg += *m as f64 * a;
                }
            }
            let (sin_arg, cos_arg) = arg.sin_cos();
            p_dpsi += amps[0] as f64 * sin_arg + amps[1] as f64 * cos_arg;
            p_deps += amps[2] as f64 * sin_arg + amps[3] as f64 * cos_arg;
        }
        dpsi += p_dpsi * 1e-7;
        deps += p_deps * 1e-7;
    } else {
        // 2000B: constant offsets stand in for the omitted terms
        dpsi += NUT_2000B_OFFSET_PSI;
        deps += NUT_2000B_OFFSET_EPS;
    }

    if p03 {
        // IAU 2006 adjustment for the J2-rate and P03 precession
        let f = -2.7774e-6 * t;
        dpsi += dpsi * (0.4697e-6 + f);
        deps += deps * f;
    }

    Nutation {
        dpsi: dpsi * ASEC2RAD,
        deps: deps * ASEC2RAD,
    }
}
