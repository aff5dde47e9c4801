//! Precession of the equinoxes
//!
//! IAU 1976 (Lieske et al. 1977) equatorial precession between J2000 and
//! the mean equator and equinox of date. The rotation acts on equatorial
//! Cartesian vectors; velocities precess with the same matrix. The
//! precession rate is far too slow for the matrix's own time derivative
//! to matter at the AU/day level.

use crate::constants::ASEC2RAD;
use crate::framelib::{rot_y, rot_z};
use nalgebra::{Matrix3, Vector3};

/// Direction of a precession transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    J2000ToDate,
    DateToJ2000,
}

/// The IAU 1976 equatorial precession angles ζ, z, θ in radians.
///
/// `t` = Julian centuries of TT since J2000.0.
pub fn precession_angles(t: f64) -> (f64, f64, f64) {
    let t2 = t * t;
    let t3 = t2 * t;
    let zeta = (2306.2181 * t + 0.30188 * t2 + 0.017998 * t3) * ASEC2RAD;
    let z = (2306.2181 * t + 1.09468 * t2 + 0.018203 * t3) * ASEC2RAD;
    let theta = (2004.3109 * t - 0.42665 * t2 - 0.041833 * t3) * ASEC2RAD;
    (zeta, z, theta)
}

/// Precession matrix rotating a J2000 equatorial vector to the mean
/// equator and equinox of date.
pub fn precession_matrix(t: f64) -> Matrix3<f64> {
    let (zeta, z, theta) = precession_angles(t);
    rot_z(-z) * rot_y(theta) * rot_z(-zeta)
}

/// Precess a position vector
pub fn precess(v: &Vector3<f64>, t: f64, direction: Direction) -> Vector3<f64> {
    let m = precession_matrix(t);
    match direction {
        Direction::J2000ToDate => m * v,
        Direction::DateToJ2000 => m.transpose() * v,
    }
}

/// Precess a position/velocity pair with the same rotation
pub fn precess_state(
    pos: &Vector3<f64>,
    vel: &Vector3<f64>,
    t: f64,
    direction: Direction,
) -> (Vector3<f64>, Vector3<f64>) {
    let m = precession_matrix(t);
    match direction {
        Direction::J2000ToDate => (m * pos, m * vel),
        Direction::DateToJ2000 => (m.transpose() * pos, m.transpose() * vel),
    }
}
