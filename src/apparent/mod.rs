//! Apparent-place corrections
//!
//! The three corrections that turn a geometric geocentric vector into an
//! apparent one: light-time (the body is seen where it was one light
//! travel time ago), gravitational deflection by the Sun, and annual
//! aberration from the observer's velocity. Each is independently
//! toggleable by the pipeline; all of them are skipped for a
//! "true position" request.
//!
//! Light time is a single pass: the travel time follows from the
//! geometric distance and the body is re-evaluated once at the retarded
//! epoch. The sub-millisecond error of skipping further iterations is an
//! accepted approximation.
//!
//! Velocities are corrected by finite differences over
//! [`FINITE_DIFF_DAYS`]: one-sided for aberration, symmetric for
//! deflection.

use crate::constants::{AU_LIGHT_S, C_AUDAY, DAY_S, GM_SUN_AU3_D2, SUN_RADIUS_AU};
use crate::moonlib::FINITE_DIFF_DAYS;
use nalgebra::Vector3;
use once_cell::sync::Lazy;

/// Number of samples in the effective-mass grid
pub const MEFF_GRID_POINTS: usize = 101;

/// Fraction of the solar deflection applied for a ray crossing the disc
/// at normalized radius r, sampled on a uniform grid. Zero at disc
/// center, one at the limb; piecewise linear in between.
static MEFF_GRID: Lazy<[f64; MEFF_GRID_POINTS]> = Lazy::new(|| {
    let mut grid = [0.0; MEFF_GRID_POINTS];
    for (i, g) in grid.iter_mut().enumerate() {
        let r = i as f64 / (MEFF_GRID_POINTS - 1) as f64;
        *g = 1.0 - (1.0 - r * r).max(0.0).powf(1.5);
    }
    grid
});

/// Piecewise-linear lookup into the effective-mass grid
pub fn effective_mass_ratio(r: f64) -> f64 {
    if r <= 0.0 {
        return 0.0;
    }
    if r >= 1.0 {
        return 1.0;
    }
    let x = r * (MEFF_GRID_POINTS - 1) as f64;
    let i = x.floor() as usize;
    let frac = x - i as f64;
    MEFF_GRID[i] + frac * (MEFF_GRID[i + 1] - MEFF_GRID[i])
}

/// Light travel time for a geocentric position, in days
pub fn light_time_days(pos: &Vector3<f64>) -> f64 {
    pos.norm() * AU_LIGHT_S / DAY_S
}

/// Gravitational deflection of light by the Sun.
///
/// `pos` is the geocentric body vector, `earth` the heliocentric Earth
/// and `body` the heliocentric body, all in AU. For rays passing inside
/// the apparent solar limb the bend is attenuated by the effective-mass
/// ratio of the crossed disc radius, so a body transiting the disc
/// center is not deflected at all.
pub fn deflect(
    pos: &Vector3<f64>,
    earth: &Vector3<f64>,
    body: &Vector3<f64>,
) -> Vector3<f64> {
    let p_mag = pos.norm();
    let e_mag = earth.norm();
    let q_mag = body.norm();
    if p_mag == 0.0 || e_mag == 0.0 || q_mag < 1e-8 {
        return *pos;
    }
    let u = pos / p_mag;
    let e = earth / e_mag;
    let q = body / q_mag;

    let qe = q.dot(&e);
    if (1.0 + qe).abs() < 1e-12 {
        return *pos;
    }

    let g1 = 2.0 * GM_SUN_AU3_D2 / (C_AUDAY * C_AUDAY * e_mag);
    let dp = g1 * (u.dot(&q) * e - e.dot(&u) * q) / (1.0 + qe);

    // Attenuate inside the apparent solar disc; only rays from behind
    // the Sun can cross it
    let sun_geo = -earth;
    let sun_dist = sun_geo.norm();
    let mut meff = 1.0;
    let cos_sep = u.dot(&(sun_geo / sun_dist)).clamp(-1.0, 1.0);
    if cos_sep > 0.0 && p_mag > sun_dist {
        let sep = cos_sep.acos();
        let limb = (SUN_RADIUS_AU / sun_dist).asin();
        if sep < limb {
            meff = effective_mass_ratio(sep / limb);
        }
    }

    pos + p_mag * meff * dp
}

/// Deflect a position/velocity pair.
///
/// The velocity correction recomputes the deflection at symmetric time
/// offsets with linearly advanced inputs.
pub fn deflect_state(
    pos: &Vector3<f64>,
    vel: &Vector3<f64>,
    earth: &Vector3<f64>,
    earth_vel: &Vector3<f64>,
    body: &Vector3<f64>,
    body_vel: &Vector3<f64>,
) -> (Vector3<f64>, Vector3<f64>) {
    let p = deflect(pos, earth, body);
    let dt = FINITE_DIFF_DAYS;
    let fwd = deflect(
        &(pos + vel * dt),
        &(earth + earth_vel * dt),
        &(body + body_vel * dt),
    );
    let back = deflect(
        &(pos - vel * dt),
        &(earth - earth_vel * dt),
        &(body - body_vel * dt),
    );
    (p, (fwd - back) / (2.0 * dt))
}

/// Annual aberration: relativistic addition of the observer velocity to
/// the light's arrival direction.
pub fn aberrate(pos: &Vector3<f64>, observer_vel: &Vector3<f64>) -> Vector3<f64> {
    let p_mag = pos.norm();
    if p_mag == 0.0 {
        return *pos;
    }
    let u = pos / p_mag;
    let v = observer_vel / C_AUDAY;
    let v2 = v.norm_squared();
    if v2 >= 1.0 {
        return *pos;
    }
    let beta = (1.0 - v2).sqrt();
    let f1 = u.dot(&v);
    let f2 = 1.0 + f1 / (1.0 + beta);
    (beta * pos + f2 * p_mag * v) / (1.0 + f1)
}

/// Aberrate a position/velocity pair; the velocity correction is a
/// one-sided finite difference with the observer velocity held fixed.
pub fn aberrate_state(
    pos: &Vector3<f64>,
    vel: &Vector3<f64>,
    observer_vel: &Vector3<f64>,
) -> (Vector3<f64>, Vector3<f64>) {
    let p = aberrate(pos, observer_vel);
    let dt = FINITE_DIFF_DAYS;
    let fwd = aberrate(&(pos + vel * dt), observer_vel);
    (p, (fwd - p) / dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ASEC2RAD;
    use approx::assert_relative_eq;

    fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        (a.dot(b) / (a.norm() * b.norm())).clamp(-1.0, 1.0).acos()
    }

    #[test]
    fn test_light_time_one_au() {
        let tau = light_time_days(&Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(tau * DAY_S, 499.004_784, epsilon = 1e-2);
    }

    #[test]
    fn test_effective_mass_grid_monotone() {
        assert_eq!(effective_mass_ratio(0.0), 0.0);
        assert_eq!(effective_mass_ratio(1.0), 1.0);
        assert_eq!(effective_mass_ratio(1.5), 1.0);
        let mut prev = 0.0;
        for i in 1..=200 {
            let r = i as f64 / 200.0;
            let m = effective_mass_ratio(r);
            assert!(m >= prev, "grid not monotone at r={r}");
            prev = m;
        }
    }

    #[test]
    fn test_aberration_magnitude() {
        // Earth's orbital speed tilts a perpendicular line of sight by
        // about 20.5 arcseconds
        let pos = Vector3::new(0.0, 0.0, 10.0);
        let vel = Vector3::new(0.017_2, 0.0, 0.0);
        let aberrated = aberrate(&pos, &vel);
        let tilt = angle_between(&pos, &aberrated) / ASEC2RAD;
        assert!((20.0..21.0).contains(&tilt), "tilt {tilt} arcsec");
        // Tilt is toward the velocity
        assert!(aberrated.x > 0.0);
    }

    #[test]
    fn test_aberration_zero_velocity() {
        let pos = Vector3::new(1.2, -0.4, 0.9);
        let out = aberrate(&pos, &Vector3::zeros());
        assert_relative_eq!((out - pos).norm(), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_deflection_grazing_limb() {
        // A ray grazing the solar limb bends by ~1.75 arcsec; this
        // geometry passes just outside the limb
        let earth = Vector3::new(1.0, 0.0, 0.0);
        let limb = (SUN_RADIUS_AU / 1.0).asin();
        let theta = limb * 1.01;
        let pos = 6.0 * Vector3::new(-theta.cos(), theta.sin(), 0.0);
        let body = earth + pos;
        let out = deflect(&pos, &earth, &body);
        let bend = angle_between(&pos, &out) / ASEC2RAD;
        assert!((0.5..3.0).contains(&bend), "bend {bend} arcsec");
    }

    #[test]
    fn test_deflection_through_disc_center() {
        // Straight through the disc center the effective mass vanishes
        let earth = Vector3::new(1.0, 0.0, 0.0);
        let pos = Vector3::new(-6.0, 0.0, 0.0);
        let body = earth + pos;
        let out = deflect(&pos, &earth, &body);
        assert_relative_eq!((out - pos).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_deflection_far_from_sun_is_small() {
        // 90 degrees from the Sun the bend drops to milliarcseconds
        let earth = Vector3::new(1.0, 0.0, 0.0);
        let pos = Vector3::new(0.0, 3.0, 0.0);
        let body = earth + pos;
        let out = deflect(&pos, &earth, &body);
        let bend = angle_between(&pos, &out) / ASEC2RAD;
        assert!(bend < 0.01, "bend {bend} arcsec");
        assert!(bend > 0.0);
    }

    #[test]
    fn test_state_corrections_touch_velocity() {
        let earth = Vector3::new(1.0, 0.0, 0.0);
        let earth_vel = Vector3::new(0.0, 0.017_2, 0.0);
        let pos = Vector3::new(-3.0, 1.0, 0.2);
        let vel = Vector3::new(0.004, -0.002, 0.000_3);
        let body = earth + pos;
        let body_vel = earth_vel + vel;

        let (_, dv) = deflect_state(&pos, &vel, &earth, &earth_vel, &body, &body_vel);
        assert!((dv - vel).norm() < 1e-6, "deflection barely moves velocity");

        let (p, av) = aberrate_state(&pos, &vel, &earth_vel);
        assert!((p - pos).norm() > 0.0);
        assert!((av - vel).norm() < 1e-4);
    }
}
