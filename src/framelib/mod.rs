//! Reference frames and rotations
//!
//! Obliquity of the ecliptic, the ICRS/J2000 frame bias, the nutation
//! rotation, equatorial/ecliptic conversions and the Cartesian/polar
//! forms of a 6-component state. All rotation matrices here rotate the
//! coordinate *frame* (SOFA convention), so the inverse of every rotation
//! is its transpose.

use crate::constants::{ASEC2RAD, EPS0_J2000_ASEC, TAU};
use nalgebra::{Matrix3, Vector3};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Equatorial coordinates (RA/Dec)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equatorial {
    /// Right ascension in radians
    pub ra: f64,
    /// Declination in radians
    pub dec: f64,
}

impl Equatorial {
    pub fn new(ra: f64, dec: f64) -> Self {
        Equatorial {
            ra: ra.rem_euclid(TAU),
            dec,
        }
    }
}

/// Ecliptic coordinates (longitude/latitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ecliptic {
    /// Ecliptic longitude in radians
    pub lon: f64,
    /// Ecliptic latitude in radians
    pub lat: f64,
}

impl Ecliptic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Ecliptic {
            lon: lon.rem_euclid(TAU),
            lat,
        }
    }
}

/// Frame rotation about the x axis
pub fn rot_x(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
}

/// Frame rotation about the y axis
pub fn rot_y(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c)
}

/// Frame rotation about the z axis
pub fn rot_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Mean obliquity of the ecliptic in radians (Laskar 1986 polynomial)
///
/// `t` = Julian centuries of TT since J2000.0.
pub fn mean_obliquity(t: f64) -> f64 {
    (EPS0_J2000_ASEC - 46.8150 * t - 0.00059 * t * t + 0.001813 * t * t * t) * ASEC2RAD
}

/// Mean obliquity at J2000.0 in radians
pub fn mean_obliquity_j2000() -> f64 {
    EPS0_J2000_ASEC * ASEC2RAD
}

/// Convert an ecliptic vector to equatorial, given the obliquity
pub fn ecliptic_to_equatorial(v: &Vector3<f64>, eps: f64) -> Vector3<f64> {
    rot_x(-eps) * v
}

/// Convert an equatorial vector to ecliptic, given the obliquity
pub fn equatorial_to_ecliptic(v: &Vector3<f64>, eps: f64) -> Vector3<f64> {
    rot_x(eps) * v
}

/// Selectable frame-bias variant for the ICRS/J2000 rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BiasVariant {
    /// IAU 2000 frame bias (default)
    #[default]
    Iau2000,
    /// IAU 2006 refinement
    Iau2006,
}

// IAU 2000 frame bias offsets in arcseconds: equinox offset da0 and
// celestial pole offsets xi0/eta0 (IERS Conventions 2003).
const BIAS_2000: (f64, f64, f64) = (-0.014_60, -0.016_617_0, -0.006_819_2);

// Fukushima-Williams angles at J2000.0 for the IAU 2006 formulation,
// arcseconds. The resulting matrix agrees with the 2000 bias to the
// microarcsecond level but is not identical.
const FW_GAMMA_2006_ASEC: f64 = -0.052_928;
const FW_PHI_2006_ASEC: f64 = 84_381.412_819;
const FW_PSI_2006_ASEC: f64 = -0.041_775;
const FW_EPS_2006_ASEC: f64 = 84_381.406;

static BIAS_MATRIX_2000: Lazy<Matrix3<f64>> = Lazy::new(|| {
    let (da0, xi0, eta0) = BIAS_2000;
    // Composed from exact rotations so the matrix is orthogonal and its
    // inverse is the transpose.
    rot_x(-eta0 * ASEC2RAD) * rot_y(xi0 * ASEC2RAD) * rot_z(da0 * ASEC2RAD)
});

static BIAS_MATRIX_2006: Lazy<Matrix3<f64>> = Lazy::new(|| {
    rot_x(-FW_EPS_2006_ASEC * ASEC2RAD)
        * rot_z(-FW_PSI_2006_ASEC * ASEC2RAD)
        * rot_x(FW_PHI_2006_ASEC * ASEC2RAD)
        * rot_z(FW_GAMMA_2006_ASEC * ASEC2RAD)
});

/// Rotate a vector from the ICRS to the dynamical J2000 equator
pub fn icrs_to_j2000(v: &Vector3<f64>, variant: BiasVariant) -> Vector3<f64> {
    let m = match variant {
        BiasVariant::Iau2000 => &*BIAS_MATRIX_2000,
        BiasVariant::Iau2006 => &*BIAS_MATRIX_2006,
    };
    m * v
}

/// Rotate a vector from the dynamical J2000 equator to the ICRS
pub fn j2000_to_icrs(v: &Vector3<f64>, variant: BiasVariant) -> Vector3<f64> {
    let m = match variant {
        BiasVariant::Iau2000 => &*BIAS_MATRIX_2000,
        BiasVariant::Iau2006 => &*BIAS_MATRIX_2006,
    };
    m.transpose() * v
}

/// Nutation rotation matrix, mean-of-date to true-of-date
///
/// `eps` is the mean obliquity; `dpsi`/`deps` the nutation in longitude
/// and obliquity, all in radians.
pub fn nutation_matrix(dpsi: f64, deps: f64, eps: f64) -> Matrix3<f64> {
    rot_x(-(eps + deps)) * rot_z(-dpsi) * rot_x(eps)
}

/// Polar form of a 6-component state: (r, lon, lat) plus derivatives
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarState {
    /// Radial distance
    pub r: f64,
    /// Longitude in radians, [0, 2π)
    pub lon: f64,
    /// Latitude in radians
    pub lat: f64,
    /// Radial velocity per day
    pub dr: f64,
    /// Longitude rate in radians per day
    pub dlon: f64,
    /// Latitude rate in radians per day
    pub dlat: f64,
}

/// Convert a Cartesian position/velocity pair to polar form
pub fn cartesian_to_polar(pos: &Vector3<f64>, vel: &Vector3<f64>) -> PolarState {
    let r = pos.norm();
    if r == 0.0 {
        return PolarState {
            r: 0.0,
            lon: 0.0,
            lat: 0.0,
            dr: 0.0,
            dlon: 0.0,
            dlat: 0.0,
        };
    }
    let rho2 = pos.x * pos.x + pos.y * pos.y;
    let lon = pos.y.atan2(pos.x).rem_euclid(TAU);
    let lat = (pos.z / r).asin();

    let dr = pos.dot(vel) / r;
    let dlon = if rho2 > 0.0 {
        (pos.x * vel.y - pos.y * vel.x) / rho2
    } else {
        0.0
    };
    let cos_lat = lat.cos();
    let dlat = if cos_lat.abs() > 0.0 {
        (vel.z - dr * lat.sin()) / (r * cos_lat)
    } else {
        0.0
    };

    PolarState {
        r,
        lon,
        lat,
        dr,
        dlon,
        dlat,
    }
}

/// Convert a polar state back to Cartesian position and velocity
pub fn polar_to_cartesian(p: &PolarState) -> (Vector3<f64>, Vector3<f64>) {
    let (sin_lon, cos_lon) = p.lon.sin_cos();
    let (sin_lat, cos_lat) = p.lat.sin_cos();

    let pos = Vector3::new(
        p.r * cos_lat * cos_lon,
        p.r * cos_lat * sin_lon,
        p.r * sin_lat,
    );
    let vel = Vector3::new(
        p.dr * cos_lat * cos_lon
            - p.r * sin_lat * p.dlat * cos_lon
            - p.r * cos_lat * sin_lon * p.dlon,
        p.dr * cos_lat * sin_lon - p.r * sin_lat * p.dlat * sin_lon
            + p.r * cos_lat * cos_lon * p.dlon,
        p.dr * sin_lat + p.r * cos_lat * p.dlat,
    );
    (pos, vel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::PI;

    #[test]
    fn test_mean_obliquity_j2000() {
        // 23 deg 26' 21.448"
        let eps = mean_obliquity(0.0);
        assert_relative_eq!(eps * 180.0 / PI, 23.439_291, epsilon = 1e-6);
    }

    #[test]
    fn test_obliquity_decreasing() {
        assert!(mean_obliquity(1.0) < mean_obliquity(0.0));
    }

    #[test]
    fn test_ecliptic_equatorial_roundtrip() {
        let mut rng = StdRng::seed_from_u64(424242);
        let eps = mean_obliquity(0.0);
        for _ in 0..100 {
            let v = Vector3::new(
                rng.gen::<f64>() * 2.0 - 1.0,
                rng.gen::<f64>() * 2.0 - 1.0,
                rng.gen::<f64>() * 2.0 - 1.0,
            );
            let w = equatorial_to_ecliptic(&ecliptic_to_equatorial(&v, eps), eps);
            assert_relative_eq!(v.x, w.x, epsilon = 1e-12);
            assert_relative_eq!(v.y, w.y, epsilon = 1e-12);
            assert_relative_eq!(v.z, w.z, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_ecliptic_pole_maps_correctly() {
        let eps = mean_obliquity(0.0);
        let pole = ecliptic_to_equatorial(&Vector3::new(0.0, 0.0, 1.0), eps);
        assert_relative_eq!(pole.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(pole.y, -eps.sin(), epsilon = 1e-12);
        assert_relative_eq!(pole.z, eps.cos(), epsilon = 1e-12);
    }

    #[test]
    fn test_frame_bias_roundtrip() {
        let mut rng = StdRng::seed_from_u64(424243);
        for variant in [BiasVariant::Iau2000, BiasVariant::Iau2006] {
            for _ in 0..100 {
                let v = Vector3::new(
                    rng.gen::<f64>() * 10.0 - 5.0,
                    rng.gen::<f64>() * 10.0 - 5.0,
                    rng.gen::<f64>() * 10.0 - 5.0,
                );
                let w = j2000_to_icrs(&icrs_to_j2000(&v, variant), variant);
                assert_relative_eq!(v.x, w.x, epsilon = 1e-12);
                assert_relative_eq!(v.y, w.y, epsilon = 1e-12);
                assert_relative_eq!(v.z, w.z, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_frame_bias_is_small() {
        // The bias moves a unit vector by well under an arcsecond
        let v = Vector3::new(1.0, 0.0, 0.0);
        let w = icrs_to_j2000(&v, BiasVariant::Iau2000);
        let angle = v.cross(&w).norm().asin();
        assert!(angle < 0.1 * ASEC2RAD * 10.0, "bias angle {angle}");
        assert!(angle > 0.0);
    }

    #[test]
    fn test_nutation_matrix_orthogonal() {
        let eps = mean_obliquity(0.1);
        let n = nutation_matrix(17.0 * ASEC2RAD, 9.0 * ASEC2RAD, eps);
        let identity = n * n.transpose();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(identity[(i, j)], expected, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_polar_cartesian_roundtrip() {
        let mut rng = StdRng::seed_from_u64(424244);
        for _ in 0..100 {
            let pos = Vector3::new(
                rng.gen::<f64>() * 4.0 - 2.0,
                rng.gen::<f64>() * 4.0 - 2.0,
                rng.gen::<f64>() * 2.0 - 1.0,
            );
            let vel = Vector3::new(
                rng.gen::<f64>() * 0.02 - 0.01,
                rng.gen::<f64>() * 0.02 - 0.01,
                rng.gen::<f64>() * 0.02 - 0.01,
            );
            if pos.norm() < 1e-3 {
                continue;
            }
            let polar = cartesian_to_polar(&pos, &vel);
            let (pos2, vel2) = polar_to_cartesian(&polar);
            assert_relative_eq!(pos.x, pos2.x, epsilon = 1e-10);
            assert_relative_eq!(pos.y, pos2.y, epsilon = 1e-10);
            assert_relative_eq!(pos.z, pos2.z, epsilon = 1e-10);
            assert_relative_eq!(vel.x, vel2.x, epsilon = 1e-10);
            assert_relative_eq!(vel.y, vel2.y, epsilon = 1e-10);
            assert_relative_eq!(vel.z, vel2.z, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_polar_of_unit_x() {
        let polar = cartesian_to_polar(&Vector3::new(1.0, 0.0, 0.0), &Vector3::zeros());
        assert_relative_eq!(polar.r, 1.0, epsilon = 1e-15);
        assert_relative_eq!(polar.lon, 0.0, epsilon = 1e-15);
        assert_relative_eq!(polar.lat, 0.0, epsilon = 1e-15);
    }
}
