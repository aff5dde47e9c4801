//! Fundamental arguments of the Sun, Moon and planets
//!
//! Pure functions of epoch producing the Delaunay angles and planetary
//! mean longitudes that drive the nutation series and the lunar theory.
//! Two numerically distinct parameterizations are provided: the IAU 1980
//! set consumed by the 1980 nutation model, and the Simon et al. (1994)
//! set (as adopted for the IAU 2000 series) consumed by the 2000A/B
//! models. They are close but not interchangeable; each nutation model
//! must be fed its own variant.
//!
//! All angles are returned in radians, normalized to [0, 2π) except the
//! general precession accumulator which is secular by nature.

use crate::constants::{ASEC2RAD, TAU};

/// The five Delaunay arguments for one epoch.
///
/// - `l`: mean anomaly of the Moon
/// - `lp`: mean anomaly of the Sun
/// - `f`: mean argument of latitude of the Moon
/// - `d`: mean elongation of the Moon from the Sun
/// - `om`: mean longitude of the ascending node of the Moon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FundamentalArgs {
    pub l: f64,
    pub lp: f64,
    pub f: f64,
    pub d: f64,
    pub om: f64,
}

/// Normalize an angle in radians to [0, 2π)
pub fn normalize(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

/// Delaunay arguments in the IAU 1980 parameterization.
///
/// `t` = Julian centuries of TT since J2000.0. Polynomials from the
/// IAU 1980 theory of nutation (Seidelmann 1982); the linear terms are
/// expressed as full revolutions plus an arcsecond remainder.
pub fn delaunay_args_1980(t: f64) -> FundamentalArgs {
    const REV: f64 = 1_296_000.0;
    let t2 = t * t;
    let t3 = t2 * t;

    let l = (485_866.733 + (1325.0 * REV + 715_922.633) * t + 31.310 * t2 + 0.064 * t3)
        * ASEC2RAD;
    let lp = (1_287_099.804 + (99.0 * REV + 1_292_581.224) * t - 0.577 * t2 - 0.012 * t3)
        * ASEC2RAD;
    let f = (335_778.877 + (1342.0 * REV + 295_263.137) * t - 13.257 * t2 + 0.011 * t3)
        * ASEC2RAD;
    let d = (1_072_261.307 + (1236.0 * REV + 1_105_601.328) * t - 6.891 * t2 + 0.019 * t3)
        * ASEC2RAD;
    let om = (450_160.280 - (5.0 * REV + 482_890.539) * t + 7.455 * t2 + 0.008 * t3)
        * ASEC2RAD;

    FundamentalArgs {
        l: normalize(l),
        lp: normalize(lp),
        f: normalize(f),
        d: normalize(d),
        om: normalize(om),
    }
}

/// Delaunay arguments in the Simon et al. (1994) parameterization used by
/// the IAU 2000A/B luni-solar series.
///
/// Polynomial coefficients from IERS Conventions 2010, Table 5.2e.
pub fn delaunay_args_2000(t: f64) -> FundamentalArgs {
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let l = (485_868.249036 + 1_717_915_923.2178 * t + 31.8792 * t2 + 0.051_635 * t3
        - 0.000_244_70 * t4)
        * ASEC2RAD;
    let lp = (1_287_104.79305 + 129_596_581.0481 * t - 0.5532 * t2 + 0.000_136 * t3
        - 0.000_011_49 * t4)
        * ASEC2RAD;
    let f = (335_779.526232 + 1_739_527_262.8478 * t - 12.7512 * t2 - 0.001_037 * t3
        + 0.000_004_17 * t4)
        * ASEC2RAD;
    let d = (1_072_260.70369 + 1_602_961_601.2090 * t - 6.3706 * t2 + 0.006_593 * t3
        - 0.000_031_69 * t4)
        * ASEC2RAD;
    let om = (450_160.398036 - 6_962_890.5431 * t + 7.4722 * t2 + 0.007_702 * t3
        - 0.000_059_39 * t4)
        * ASEC2RAD;

    FundamentalArgs {
        l: normalize(l),
        lp: normalize(lp),
        f: normalize(f),
        d: normalize(d),
        om: normalize(om),
    }
}

/// Number of arguments in the planetary nutation argument vector
pub const PLANETARY_ARG_COUNT: usize = 14;

/// The 14-argument vector of the IAU 2000A planetary nutation component:
/// Delaunay `l, lp, f, d, om` followed by the mean longitudes of Mercury
/// through Neptune and the general precession in longitude `pa`.
///
/// Mean longitude polynomials (radians) from the MHB2000 model as adopted
/// in IERS Conventions 2010; `pa` is secular and left unnormalized.
pub fn planetary_args(t: f64) -> [f64; PLANETARY_ARG_COUNT] {
    let d = delaunay_args_2000(t);

    let l_me = normalize(4.402_608_842 + 2_608.790_314_157_4 * t);
    let l_ve = normalize(3.176_146_697 + 1_021.328_554_621_1 * t);
    let l_ea = normalize(1.753_470_314 + 628.307_584_999_1 * t);
    let l_ma = normalize(6.203_480_913 + 334.061_242_670_0 * t);
    let l_ju = normalize(0.599_546_497 + 52.969_096_264_1 * t);
    let l_sa = normalize(0.874_016_757 + 21.329_910_496_0 * t);
    let l_ur = normalize(5.481_293_872 + 7.478_159_856_7 * t);
    let l_ne = normalize(5.311_886_287 + 3.813_303_563_8 * t);
    let pa = 0.024_381_75 * t + 0.000_005_386_91 * t * t;

    [
        d.l, d.lp, d.f, d.d, d.om, l_me, l_ve, l_ea, l_ma, l_ju, l_sa, l_ur, l_ne, pa,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_normalized_range() {
        for &t in &[-20.0, -1.0, 0.0, 0.3, 1.0, 10.0] {
            for args in [delaunay_args_1980(t), delaunay_args_2000(t)] {
                for a in [args.l, args.lp, args.f, args.d, args.om] {
                    assert!((0.0..TAU).contains(&a), "argument {a} out of range at t={t}");
                }
            }
        }
    }

    #[test]
    fn test_parameterizations_agree_closely_at_j2000() {
        // The 1980 and 2000 parameterizations differ by well under an
        // arcsecond near J2000 but are not identical.
        let a = delaunay_args_1980(0.0);
        let b = delaunay_args_2000(0.0);
        for (x, y) in [(a.l, b.l), (a.lp, b.lp), (a.f, b.f), (a.d, b.d), (a.om, b.om)] {
            assert!((x - y).abs() < 10.0 * ASEC2RAD, "{x} vs {y}");
        }
    }

    #[test]
    fn test_solar_anomaly_j2000() {
        // Mean anomaly of the Sun at J2000.0 is about 357.529 degrees
        let args = delaunay_args_2000(0.0);
        assert_relative_eq!(args.lp * 180.0 / PI, 357.529, epsilon = 0.01);
    }

    #[test]
    fn test_node_regression() {
        // The lunar node regresses: om decreases with time
        let a = delaunay_args_2000(0.0);
        let b = delaunay_args_2000(0.01); // ~3.65 days later
        let diff = (b.om - a.om + PI).rem_euclid(TAU) - PI;
        assert!(diff < 0.0, "node should regress, moved by {diff}");
    }

    #[test]
    fn test_planetary_args_earth_longitude() {
        // Earth's mean longitude at J2000.0 is about 100.466 degrees
        let args = planetary_args(0.0);
        assert_relative_eq!(args[7] * 180.0 / PI, 100.466, epsilon = 0.01);
    }

    #[test]
    fn test_general_precession_rate() {
        // General precession accumulates ~5029 arcsec per century
        let args = planetary_args(1.0);
        assert_relative_eq!(args[13] / ASEC2RAD, 5029.0, epsilon = 3.0);
    }
}
