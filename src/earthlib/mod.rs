//! Earth rotation and observer geometry
//!
//! Greenwich sidereal time and the geocentric state of a topocentric
//! observer. The observer sits on the IERS reference ellipsoid; the
//! derived position/velocity pair is expressed in the J2000 equatorial
//! frame so the pipeline can subtract it from any geocentric state.
//!
//! Deriving the observer state for an epoch walks backwards through the
//! frame chain: Earth-fixed coordinates are spun to the true equator and
//! equinox of date with apparent sidereal time, the rotation rate is
//! attached as a longitude rate in polar form, then the nutation is
//! unwound and the result precessed back to J2000.

use crate::constants::{
    AU_M, DAY_S, DEG2RAD, EARTH_ANGVEL, EARTH_RADIUS, IERS_2010_INVERSE_EARTH_FLATTENING, J2000,
    JULIAN_CENTURY_DAYS,
};
use crate::framelib::{cartesian_to_polar, mean_obliquity, nutation_matrix, polar_to_cartesian};
use crate::fundlib::normalize;
use crate::nutationlib::Nutation;
use crate::precessionlib::{precess_state, Direction};
use crate::time::{julian_centuries, tt_to_ut};
use log::trace;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for observer operations
#[derive(Debug, Error)]
pub enum EarthError {
    #[error("observer location not configured")]
    ObserverNotSet,
}

/// Result type for observer operations
pub type Result<T> = std::result::Result<T, EarthError>;

/// Geographic location on the reference ellipsoid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicPosition {
    /// East longitude, degrees
    pub lon_deg: f64,
    /// Geodetic latitude, degrees
    pub lat_deg: f64,
    /// Altitude above the ellipsoid, meters
    pub altitude_m: f64,
}

/// Greenwich mean sidereal time in radians for a UT1 Julian date
pub fn gmst(jd_ut: f64) -> f64 {
    let d = jd_ut - J2000;
    let t = d / JULIAN_CENTURY_DAYS;
    let deg = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    normalize(deg * DEG2RAD)
}

/// Greenwich apparent sidereal time: GMST plus the equation of the
/// equinoxes. `dpsi` is the nutation in longitude, `eps` the mean
/// obliquity, both in radians.
pub fn gast(jd_ut: f64, dpsi: f64, eps: f64) -> f64 {
    normalize(gmst(jd_ut) + dpsi * eps.cos())
}

/// Observer on the ellipsoid with a one-entry state cache.
///
/// The geocentric state is deterministic in (epoch, location); repeated
/// evaluations at an unchanged key return the cached pair.
#[derive(Debug, Default)]
pub struct ObserverGeometry {
    location: Option<GeographicPosition>,
    cache: Option<ObserverCache>,
}

#[derive(Debug, Clone, Copy)]
struct ObserverCache {
    jd_tt: f64,
    location: GeographicPosition,
    pos: Vector3<f64>,
    vel: Vector3<f64>,
}

impl ObserverGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the geographic location, invalidating the cache
    pub fn set_location(&mut self, lon_deg: f64, lat_deg: f64, altitude_m: f64) {
        self.location = Some(GeographicPosition {
            lon_deg,
            lat_deg,
            altitude_m,
        });
        self.cache = None;
    }

    pub fn location(&self) -> Option<&GeographicPosition> {
        self.location.as_ref()
    }

    /// Geocentric position (AU) and velocity (AU/day) of the observer in
    /// the J2000 equatorial frame.
    pub fn position_velocity(
        &mut self,
        jd_tt: f64,
        nutation: &Nutation,
    ) -> Result<(Vector3<f64>, Vector3<f64>)> {
        let location = self.location.ok_or(EarthError::ObserverNotSet)?;
        if let Some(cache) = &self.cache {
            if cache.jd_tt == jd_tt && cache.location == location {
                trace!("observer state cache hit at jd {jd_tt}");
                return Ok((cache.pos, cache.vel));
            }
        }

        let t = julian_centuries(jd_tt);
        let eps = mean_obliquity(t);
        let theta = gast(tt_to_ut(jd_tt), nutation.dpsi, eps);

        // Geodetic to geocentric on the ellipsoid, meters
        let f = 1.0 / IERS_2010_INVERSE_EARTH_FLATTENING;
        let e2 = 2.0 * f - f * f;
        let lat = location.lat_deg * DEG2RAD;
        let (sin_lat, cos_lat) = lat.sin_cos();
        let n = EARTH_RADIUS / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let r_xy = (n + location.altitude_m) * cos_lat;
        let z = (n * (1.0 - e2) + location.altitude_m) * sin_lat;

        // Spin Earth-fixed coordinates to the true equator and equinox
        let lon_tod = location.lon_deg * DEG2RAD + theta;
        let pos_tod = Vector3::new(r_xy * lon_tod.cos(), r_xy * lon_tod.sin(), z);

        // Attach the rotation rate as a longitude rate
        let mut polar = cartesian_to_polar(&pos_tod, &Vector3::zeros());
        polar.dlon = EARTH_ANGVEL * DAY_S;
        let (pos_tod, vel_tod) = polar_to_cartesian(&polar);

        let pos_tod = pos_tod / AU_M;
        let vel_tod = vel_tod / AU_M;

        // Unwind the nutation, then precess back to J2000
        let unwind = nutation_matrix(nutation.dpsi, nutation.deps, eps).transpose();
        let (pos, vel) = precess_state(
            &(unwind * pos_tod),
            &(unwind * vel_tod),
            t,
            Direction::DateToJ2000,
        );

        self.cache = Some(ObserverCache {
            jd_tt,
            location,
            pos,
            vel,
        });
        Ok((pos, vel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::RAD2DEG;
    use approx::assert_relative_eq;

    fn no_nutation() -> Nutation {
        Nutation {
            dpsi: 0.0,
            deps: 0.0,
        }
    }

    #[test]
    fn test_gmst_at_j2000() {
        // 2000-01-01 12:00 UT: GMST is 280.4606 degrees (18.697 hours)
        let theta = gmst(J2000);
        assert_relative_eq!(theta * RAD2DEG, 280.460_6, epsilon = 0.001);
    }

    #[test]
    fn test_gmst_daily_advance() {
        // Sidereal time gains ~0.9856 degrees on the rotation per day
        let a = gmst(J2000);
        let b = gmst(J2000 + 1.0);
        let advance = normalize(b - a) * RAD2DEG;
        assert_relative_eq!(advance, 0.9856, epsilon = 0.001);
    }

    #[test]
    fn test_gast_equation_of_equinoxes() {
        let dpsi = -13.9 * crate::constants::ASEC2RAD;
        let eps = mean_obliquity(0.0);
        let diff = normalize(gast(J2000, dpsi, eps) - gmst(J2000) + std::f64::consts::PI)
            - std::f64::consts::PI;
        assert!((diff - dpsi * eps.cos()).abs() < 1e-12);
    }

    #[test]
    fn test_observer_not_set() {
        let mut obs = ObserverGeometry::new();
        let err = obs.position_velocity(J2000, &no_nutation()).unwrap_err();
        assert!(matches!(err, EarthError::ObserverNotSet));
    }

    #[test]
    fn test_observer_radius() {
        let mut obs = ObserverGeometry::new();
        obs.set_location(0.0, 0.0, 0.0);
        let (pos, _) = obs.position_velocity(J2000, &no_nutation()).unwrap();
        let r_m = pos.norm() * AU_M;
        assert_relative_eq!(r_m, EARTH_RADIUS, epsilon = 1.0);

        obs.set_location(0.0, 89.99, 0.0);
        let (pos, _) = obs.position_velocity(J2000, &no_nutation()).unwrap();
        let r_polar = pos.norm() * AU_M;
        assert!(r_polar < EARTH_RADIUS - 20_000.0, "polar radius {r_polar}");
        assert!(r_polar > EARTH_RADIUS - 25_000.0, "polar radius {r_polar}");
    }

    #[test]
    fn test_observer_speed() {
        let mut obs = ObserverGeometry::new();
        obs.set_location(12.5, 0.0, 0.0);
        let (_, vel) = obs.position_velocity(J2000, &no_nutation()).unwrap();
        let speed_ms = vel.norm() * AU_M / DAY_S;
        assert!((460.0..470.0).contains(&speed_ms), "equator speed {speed_ms} m/s");

        obs.set_location(12.5, 89.999, 0.0);
        let (_, vel) = obs.position_velocity(J2000, &no_nutation()).unwrap();
        let speed_ms = vel.norm() * AU_M / DAY_S;
        assert!(speed_ms < 1.0, "near-pole speed {speed_ms} m/s");
    }

    #[test]
    fn test_cache_consistency() {
        let mut obs = ObserverGeometry::new();
        obs.set_location(-70.4, -24.6, 2635.0);
        let nut = Nutation {
            dpsi: -6e-5,
            deps: -3e-5,
        };
        let (p1, v1) = obs.position_velocity(J2000 + 100.0, &nut).unwrap();
        let (p2, v2) = obs.position_velocity(J2000 + 100.0, &nut).unwrap();
        assert_eq!(p1, p2);
        assert_eq!(v1, v2);

        obs.set_location(-70.4, -24.6, 0.0);
        let (p3, _) = obs.position_velocity(J2000 + 100.0, &nut).unwrap();
        assert!((p3 - p1).norm() > 0.0, "location change must invalidate");
    }
}
