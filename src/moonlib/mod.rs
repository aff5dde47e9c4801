//! Geocentric lunar theory and the Earth-Moon barycenter correction
//!
//! A truncated ELP-style series (the Meeus ch. 47 term set) gives the
//! Moon's geocentric ecliptic-of-date longitude, latitude and distance.
//! Solar-anomaly terms carry the eccentricity factor E once per power of
//! the anomaly. Truncation keeps the result within a few hundredths of a
//! degree and a couple hundred kilometers of the full theory.
//!
//! The planetary series places the Earth-Moon barycenter, not the Earth;
//! [`emb_to_earth`] subtracts the lunar offset scaled by the mass ratio
//! to recover the Earth itself.

use crate::constants::{AU_KM, EARTH_MOON_MASS_RATIO};
use crate::framelib::{ecliptic_to_equatorial, mean_obliquity};
use crate::fundlib::{delaunay_args_1980, normalize};
use crate::precessionlib::{precess, Direction};
use crate::serieslib::{check_epoch, EclipticPosition, Result};
use crate::time::julian_centuries;
use nalgebra::Vector3;

/// Interval used for finite-difference velocities, days
pub const FINITE_DIFF_DAYS: f64 = 1.0e-4;

/// Mean Earth-Moon distance baseline of the series, km
const MEAN_DISTANCE_KM: f64 = 385_000.56;

/// Main problem terms: multipliers of (D, M, M', F), longitude amplitude
/// in 1e-6 degrees, distance amplitude in km. Terms in M gain one factor
/// of E per power.
#[rustfmt::skip]
const MAIN_TERMS: [(i8, i8, i8, i8, f64, f64); 22] = [
    (0,  0,  1,  0,  6_288_774.0, -20_905.355),
    (2,  0, -1,  0,  1_274_027.0,  -3_699.111),
    (2,  0,  0,  0,    658_314.0,  -2_955.968),
    (0,  0,  2,  0,    213_618.0,    -569.925),
    (0,  1,  0,  0,   -185_116.0,      48.888),
    (0,  0,  0,  2,   -114_332.0,      -3.149),
    (2,  0, -2,  0,     58_793.0,     246.158),
    (2, -1, -1,  0,     57_066.0,    -152.138),
    (2,  0,  1,  0,     53_322.0,    -170.733),
    (2, -1,  0,  0,     45_758.0,    -204.586),
    (0,  1, -1,  0,    -40_923.0,    -129.620),
    (1,  0,  0,  0,    -34_720.0,     108.743),
    (0,  1,  1,  0,    -30_383.0,     104.755),
    (2,  0,  0, -2,     15_327.0,      10.321),
    (0,  0,  1,  2,    -12_528.0,       0.0),
    (0,  0,  1, -2,     10_980.0,      79.661),
    (4,  0, -1,  0,     10_675.0,     -34.782),
    (0,  0,  3,  0,     10_034.0,       0.0),
    (4,  0, -2,  0,      8_548.0,       0.0),
    (2,  1, -1,  0,     -7_888.0,       0.0),
    (2,  1,  0,  0,     -6_766.0,       0.0),
    (1,  0, -1,  0,     -5_163.0,       0.0),
];

/// Latitude terms: multipliers of (D, M, M', F), amplitude in 1e-6 degrees
#[rustfmt::skip]
const LATITUDE_TERMS: [(i8, i8, i8, i8, f64); 10] = [
    (0,  0,  0,  1,  5_128_122.0),
    (0,  0,  1,  1,    280_602.0),
    (0,  0,  1, -1,    277_693.0),
    (2,  0,  0, -1,    173_237.0),
    (2,  0, -1,  1,     55_413.0),
    (2,  0, -1, -1,     46_271.0),
    (2,  0,  0,  1,     32_573.0),
    (0,  0,  2,  1,     17_198.0),
    (2,  0,  1, -1,      9_266.0),
    (0,  0,  2, -1,      8_822.0),
];

/// Geocentric Moon in the ecliptic and mean equinox of date.
///
/// Longitude and latitude in radians, distance in AU.
pub fn geocentric_moon(jd_tt: f64) -> Result<EclipticPosition> {
    check_epoch(jd_tt)?;
    let t = julian_centuries(jd_tt);
    let args = delaunay_args_1980(t);
    let (d, m, mp, f) = (args.d, args.lp, args.l, args.f);
    // Mean longitude of the Moon
    let lp = normalize(args.f + args.om);

    // Eccentricity of Earth's orbit decays slowly
    let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t * t;

    let mut sum_l = 0.0;
    let mut sum_r = 0.0;
    for &(kd, km, kmp, kf, l_amp, r_amp) in &MAIN_TERMS {
        let arg = kd as f64 * d + km as f64 * m + kmp as f64 * mp + kf as f64 * f;
        let e_fac = match km.abs() {
            0 => 1.0,
            1 => e,
            _ => e * e,
        };
        sum_l += l_amp * e_fac * arg.sin();
        sum_r += r_amp * e_fac * arg.cos();
    }

    let mut sum_b = 0.0;
    for &(kd, km, kmp, kf, b_amp) in &LATITUDE_TERMS {
        let arg = kd as f64 * d + km as f64 * m + kmp as f64 * mp + kf as f64 * f;
        let e_fac = match km.abs() {
            0 => 1.0,
            1 => e,
            _ => e * e,
        };
        sum_b += b_amp * e_fac * arg.sin();
    }

    // Action of Venus, Jupiter and the flattening of the Earth
    let a1 = (119.75 + 131.849 * t).to_radians();
    let a2 = (53.09 + 479_264.290 * t).to_radians();
    let a3 = (313.45 + 481_266.484 * t).to_radians();
    sum_l += 3958.0 * a1.sin() + 1962.0 * (lp - f).sin() + 318.0 * a2.sin();
    sum_b += -2235.0 * lp.sin()
        + 382.0 * a3.sin()
        + 175.0 * (a1 - f).sin()
        + 175.0 * (a1 + f).sin()
        + 127.0 * (lp - mp).sin()
        - 115.0 * (lp + mp).sin();

    let lon = normalize(lp + (sum_l * 1e-6).to_radians());
    let lat = (sum_b * 1e-6).to_radians();
    let r = (MEAN_DISTANCE_KM + sum_r) / AU_KM;

    Ok(EclipticPosition { lon, lat, r })
}

/// Geocentric Moon as a J2000 equatorial Cartesian vector in AU
pub fn moon_equatorial_j2000(jd_tt: f64) -> Result<Vector3<f64>> {
    let p = geocentric_moon(jd_tt)?;
    let ecl = Vector3::new(
        p.r * p.lat.cos() * p.lon.cos(),
        p.r * p.lat.cos() * p.lon.sin(),
        p.r * p.lat.sin(),
    );
    let t = julian_centuries(jd_tt);
    let eq = ecliptic_to_equatorial(&ecl, mean_obliquity(t));
    Ok(precess(&eq, t, Direction::DateToJ2000))
}

/// Lunar offset of the Earth from the Earth-Moon barycenter,
/// J2000 equatorial AU
fn barycenter_offset(jd_tt: f64) -> Result<Vector3<f64>> {
    Ok(moon_equatorial_j2000(jd_tt)? / (1.0 + EARTH_MOON_MASS_RATIO))
}

/// Convert an Earth-Moon barycenter state to the Earth itself.
///
/// The velocity correction is a backward finite difference over
/// [`FINITE_DIFF_DAYS`]; it is skipped (and the input velocity passed
/// through) when `with_speed` is false.
pub fn emb_to_earth(
    pos: &Vector3<f64>,
    vel: &Vector3<f64>,
    jd_tt: f64,
    with_speed: bool,
) -> Result<(Vector3<f64>, Vector3<f64>)> {
    let off = barycenter_offset(jd_tt)?;
    let p = pos - off;
    let v = if with_speed {
        let off_back = barycenter_offset(jd_tt - FINITE_DIFF_DAYS)?;
        vel - (off - off_back) / FINITE_DIFF_DAYS
    } else {
        *vel
    };
    Ok((p, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{J2000, RAD2DEG};

    #[test]
    fn test_meeus_example() {
        // 1992 April 12.0 TT: longitude 133.163 deg, latitude -3.229 deg,
        // distance 368410 km (truncation tolerances applied)
        let jd = 2_448_724.5;
        let p = geocentric_moon(jd).unwrap();
        let lon = p.lon * RAD2DEG;
        let lat = p.lat * RAD2DEG;
        let dist_km = p.r * AU_KM;
        assert!((lon - 133.1627).abs() < 0.1, "lon {lon}");
        assert!((lat + 3.2291).abs() < 0.1, "lat {lat}");
        assert!((dist_km - 368_409.7).abs() < 350.0, "dist {dist_km}");
    }

    #[test]
    fn test_distance_bounds() {
        for i in 0..60 {
            let jd = J2000 + i as f64 * 11.3;
            let km = geocentric_moon(jd).unwrap().r * AU_KM;
            assert!((350_000.0..410_000.0).contains(&km), "distance {km} km");
        }
    }

    #[test]
    fn test_daily_motion() {
        let a = geocentric_moon(J2000).unwrap();
        let b = geocentric_moon(J2000 + 1.0).unwrap();
        let dlon = normalize(b.lon - a.lon) * RAD2DEG;
        assert!((11.0..16.0).contains(&dlon), "daily motion {dlon} deg");
    }

    #[test]
    fn test_barycenter_offset_magnitude() {
        // Earth sits ~4670 km from the barycenter
        let off = barycenter_offset(J2000).unwrap();
        let km = off.norm() * AU_KM;
        assert!((4_300.0..5_100.0).contains(&km), "offset {km} km");
    }

    #[test]
    fn test_emb_to_earth_speed_flag() {
        let pos = Vector3::new(-0.17, 0.89, 0.38);
        let vel = Vector3::new(-0.017, -0.003, -0.001);
        let (p0, v0) = emb_to_earth(&pos, &vel, J2000, false).unwrap();
        let (p1, v1) = emb_to_earth(&pos, &vel, J2000, true).unwrap();
        assert_eq!(p0, p1);
        assert_eq!(v0, vel, "velocity untouched without the speed flag");
        assert!((v1 - vel).norm() > 0.0, "speed flag corrects the velocity");
        // The Moon moves ~13 deg/day; the Earth's wobble velocity is
        // bounded by the offset times the angular rate
        assert!((v1 - vel).norm() < 1e-5);
    }
}
