//! The apparent-position pipeline
//!
//! [`PositionPipeline`] orchestrates the full reduction: raw harmonic
//! series, barycenter handling, light-time, deflection and aberration,
//! frame conversion to the requested equinox, the topocentric shift and
//! the final coordinate form. A [`TransformFlags`] bitmask selects the
//! corrections; the default (empty) mask yields the apparent geocentric
//! position on the true equator and equinox of date, packed in polar
//! form (longitude, latitude, radius). The `CARTESIAN` bit keeps the
//! Cartesian vectors instead.
//!
//! Results are cached per (body, epoch, flag cache class). The two
//! coordinate-form bits (ecliptic, Cartesian) are masked out of the
//! cache key: they only re-express a computed state, so requests
//! differing in form alone share one computation. Cache behaviour is
//! observable through [`PipelineStats`].

use crate::apparent::{aberrate, aberrate_state, deflect, deflect_state, light_time_days};
use crate::earthlib::{EarthError, ObserverGeometry};
use crate::framelib::{
    cartesian_to_polar, ecliptic_to_equatorial, equatorial_to_ecliptic, j2000_to_icrs,
    mean_obliquity, mean_obliquity_j2000, nutation_matrix, BiasVariant,
};
use crate::moonlib::{emb_to_earth, moon_equatorial_j2000, FINITE_DIFF_DAYS};
use crate::nutationlib::{nutation, Nutation, NutationConfig};
use crate::precessionlib::{precess_state, Direction};
use crate::serieslib::{
    check_epoch, Body, EphemerisDataProvider, EphemerisSource, SeriesError,
};
use crate::time::julian_centuries;
use log::{debug, trace};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::{BitAnd, BitOr};
use thiserror::Error;

/// Error type for pipeline evaluation
#[derive(Debug, Error)]
pub enum PositionError {
    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error(transparent)]
    Observer(#[from] EarthError),

    #[error("conflicting flags: {0}")]
    InvalidFlags(String),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PositionError>;

/// Bitmask of requested corrections and output forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TransformFlags(u32);

impl TransformFlags {
    /// Compute velocities alongside positions
    pub const SPEED: TransformFlags = TransformFlags(1);
    /// Shift the origin to the configured observer
    pub const TOPOCENTRIC: TransformFlags = TransformFlags(1 << 1);
    /// Heliocentric instead of geocentric origin
    pub const HELIOCENTRIC: TransformFlags = TransformFlags(1 << 2);
    /// Solar-system barycentric origin
    pub const BARYCENTRIC: TransformFlags = TransformFlags(1 << 3);
    /// Stay in the J2000/ICRS frame instead of the equinox of date
    pub const J2000: TransformFlags = TransformFlags(1 << 4);
    /// Skip the nutation rotation (mean equinox of date)
    pub const NO_NUTATION: TransformFlags = TransformFlags(1 << 5);
    /// Skip annual aberration
    pub const NO_ABERRATION: TransformFlags = TransformFlags(1 << 6);
    /// Skip gravitational deflection
    pub const NO_DEFLECTION: TransformFlags = TransformFlags(1 << 7);
    /// Geometric position: skip light-time, deflection and aberration
    pub const TRUE_POSITION: TransformFlags = TransformFlags(1 << 8);
    /// Express the result on ecliptic instead of equatorial axes
    pub const ECLIPTIC: TransformFlags = TransformFlags(1 << 9);
    /// Keep the Cartesian vectors instead of the polar packing
    pub const CARTESIAN: TransformFlags = TransformFlags(1 << 10);

    pub const fn empty() -> Self {
        TransformFlags(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: TransformFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// The cache-equivalence class: all bits except the coordinate-form
    /// bits, which never require a recomputation.
    pub const fn cache_class(self) -> Self {
        TransformFlags(self.0 & !(Self::ECLIPTIC.0 | Self::CARTESIAN.0))
    }
}

impl BitOr for TransformFlags {
    type Output = TransformFlags;
    fn bitor(self, rhs: Self) -> Self {
        TransformFlags(self.0 | rhs.0)
    }
}

impl BitAnd for TransformFlags {
    type Output = TransformFlags;
    fn bitand(self, rhs: Self) -> Self {
        TransformFlags(self.0 & rhs.0)
    }
}

/// A computed body state.
///
/// With the `CARTESIAN` flag, position in AU and velocity in AU/day on
/// the axes selected by `flags`. Without it the vectors pack the polar
/// form: position (longitude rad, latitude rad, radius AU), velocity
/// (dlon, dlat, dr per day). The velocity is exactly zero unless
/// `SPEED` was requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub epoch_jd_tt: f64,
    pub source: EphemerisSource,
    pub flags: TransformFlags,
}

/// Counters exposing cache behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Total evaluate_body calls
    pub evaluations: u64,
    /// Calls answered from the state cache
    pub cache_hits: u64,
}

/// Pipeline configuration: nutation model and frame-bias variant
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineConfig {
    pub nutation: NutationConfig,
    pub bias: BiasVariant,
}

/// Reduction stages, in mandatory order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Uncomputed,
    Raw,
    BarycenterAdjusted,
    LightTimeApplied,
    FrameConverted,
}

/// Working state threaded through the stages
struct Working {
    pos: Vector3<f64>,
    vel: Vector3<f64>,
    stage: Stage,
}

impl Working {
    fn advance(&mut self, next: Stage) {
        debug_assert!(next > self.stage, "stage order violated");
        trace!("stage {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    body: Body,
    epoch_bits: u64,
    flag_class: u32,
}

/// Inverse masses (Sun/body) used for the solar-system barycenter, in
/// planet order with the Earth entry standing for the Earth-Moon pair
#[rustfmt::skip]
const INVERSE_MASS: [f64; 9] = [
    6_023_600.0,      // Mercury
    408_523.71,       // Venus
    328_900.561_4,    // Earth-Moon barycenter
    3_098_708.0,      // Mars
    1_047.348_6,      // Jupiter
    3_497.898,        // Saturn
    22_902.98,        // Uranus
    19_412.24,        // Neptune
    135_200_000.0,    // Pluto
];

/// The orchestrating pipeline: one calculation context, not shareable
/// across threads without external serialization.
pub struct PositionPipeline<P: EphemerisDataProvider> {
    provider: P,
    config: PipelineConfig,
    observer: ObserverGeometry,
    cache: HashMap<CacheKey, BodyState>,
    stats: PipelineStats,
}

impl<P: EphemerisDataProvider> PositionPipeline<P> {
    pub fn new(provider: P, config: PipelineConfig) -> Self {
        Self {
            provider,
            config,
            observer: ObserverGeometry::new(),
            cache: HashMap::new(),
            stats: PipelineStats::default(),
        }
    }

    /// Configure the topocentric observer
    pub fn set_observer(&mut self, lon_deg: f64, lat_deg: f64, altitude_m: f64) {
        self.observer.set_location(lon_deg, lat_deg, altitude_m);
        // Topocentric cache entries depend on the location
        self.cache
            .retain(|k, _| !TransformFlags(k.flag_class).contains(TransformFlags::TOPOCENTRIC));
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Evaluate a body at a TT epoch under the given flags.
    ///
    /// Identical requests (up to the coordinate-form bits) are answered
    /// from the cache without recomputation.
    pub fn evaluate_body(
        &mut self,
        jd_tt: f64,
        body: Body,
        flags: TransformFlags,
    ) -> Result<BodyState> {
        validate_flags(flags)?;
        check_epoch(jd_tt)?;
        self.stats.evaluations += 1;

        let key = CacheKey {
            body,
            epoch_bits: jd_tt.to_bits(),
            flag_class: flags.cache_class().bits(),
        };
        if let Some(state) = self.cache.get(&key) {
            self.stats.cache_hits += 1;
            trace!("cache hit for {body:?} at jd {jd_tt}");
            return Ok(self.finalize_form(*state, flags));
        }

        debug!("computing {body:?} at jd {jd_tt}, flags {:#x}", flags.bits());
        let state = self.compute(jd_tt, body, flags.cache_class())?;
        self.cache.insert(key, state);
        Ok(self.finalize_form(state, flags))
    }

    /// Full reduction for one cache key
    fn compute(&mut self, jd_tt: f64, body: Body, flags: TransformFlags) -> Result<BodyState> {
        let with_speed = flags.contains(TransformFlags::SPEED);
        let truncate = flags.contains(TransformFlags::TRUE_POSITION);
        let t = julian_centuries(jd_tt);
        let nut = nutation(t, &self.config.nutation);

        let mut work = Working {
            pos: Vector3::zeros(),
            vel: Vector3::zeros(),
            stage: Stage::Uncomputed,
        };

        // Earth is needed for every origin except a raw heliocentric one
        let (earth_pos, earth_vel) = self.earth_heliocentric(jd_tt)?;

        let source = match body {
            Body::Moon => EphemerisSource::LunarSeries,
            Body::Sun | Body::Earth => EphemerisSource::Derived,
            _ => self.provider.source(),
        };

        // Raw geometric state for the requested origin
        let heliocentric = flags.contains(TransformFlags::HELIOCENTRIC);
        let barycentric = flags.contains(TransformFlags::BARYCENTRIC);
        let (pos, vel) = if heliocentric || barycentric {
            self.body_heliocentric(body, jd_tt, &earth_pos, &earth_vel)?
        } else {
            let (hp, hv) = self.body_heliocentric(body, jd_tt, &earth_pos, &earth_vel)?;
            (hp - earth_pos, hv - earth_vel)
        };
        work.pos = pos;
        work.vel = vel;
        work.advance(Stage::Raw);

        // Barycenter stage: shift heliocentric states to the SSB when
        // asked; geocentric differences are origin-independent
        if barycentric {
            let (sun_pos, sun_vel) = self.sun_barycentric(jd_tt)?;
            work.pos += sun_pos;
            work.vel += sun_vel;
        }
        work.advance(Stage::BarycenterAdjusted);

        // Light time, deflection, aberration
        if !truncate {
            let tau = light_time_days(&work.pos);
            let (retard_pos, retard_vel) = if heliocentric || barycentric {
                self.body_heliocentric(body, jd_tt - tau, &earth_pos, &earth_vel)?
            } else {
                let (hp, hv) =
                    self.body_heliocentric(body, jd_tt - tau, &earth_pos, &earth_vel)?;
                (hp - earth_pos, hv - earth_vel)
            };
            work.pos = retard_pos;
            work.vel = retard_vel;
            if barycentric {
                let (sun_pos, sun_vel) = self.sun_barycentric(jd_tt)?;
                work.pos += sun_pos;
                work.vel += sun_vel;
            }

            if !heliocentric && !barycentric {
                let mut aberration_vel = earth_vel;
                if flags.contains(TransformFlags::TOPOCENTRIC) {
                    let (obs_pos, obs_vel) = self.observer.position_velocity(jd_tt, &nut)?;
                    work.pos -= obs_pos;
                    work.vel -= obs_vel;
                    aberration_vel += obs_vel;
                }

                if body != Body::Sun && !flags.contains(TransformFlags::NO_DEFLECTION) {
                    let body_helio = work.pos + earth_pos;
                    let body_helio_vel = work.vel + earth_vel;
                    if with_speed {
                        let (p, v) = deflect_state(
                            &work.pos,
                            &work.vel,
                            &earth_pos,
                            &earth_vel,
                            &body_helio,
                            &body_helio_vel,
                        );
                        work.pos = p;
                        work.vel = v;
                    } else {
                        work.pos = deflect(&work.pos, &earth_pos, &body_helio);
                    }
                }

                if !flags.contains(TransformFlags::NO_ABERRATION) {
                    if with_speed {
                        let (p, v) = aberrate_state(&work.pos, &work.vel, &aberration_vel);
                        work.pos = p;
                        work.vel = v;
                    } else {
                        work.pos = aberrate(&work.pos, &aberration_vel);
                    }
                }
            }
        } else if flags.contains(TransformFlags::TOPOCENTRIC) {
            let (obs_pos, obs_vel) = self.observer.position_velocity(jd_tt, &nut)?;
            work.pos -= obs_pos;
            work.vel -= obs_vel;
        }
        work.advance(Stage::LightTimeApplied);

        // Frame conversion
        if flags.contains(TransformFlags::J2000) {
            work.pos = j2000_to_icrs(&work.pos, self.config.bias);
            work.vel = j2000_to_icrs(&work.vel, self.config.bias);
        } else {
            let (p, v) = precess_state(&work.pos, &work.vel, t, Direction::J2000ToDate);
            work.pos = p;
            work.vel = v;
            if !flags.contains(TransformFlags::NO_NUTATION) {
                let m = nutation_matrix(nut.dpsi, nut.deps, mean_obliquity(t));
                work.pos = m * work.pos;
                work.vel = m * work.vel;
            }
        }
        work.advance(Stage::FrameConverted);

        if !with_speed {
            work.vel = Vector3::zeros();
        }

        Ok(BodyState {
            position: work.pos,
            velocity: work.vel,
            epoch_jd_tt: jd_tt,
            source,
            flags,
        })
    }

    /// Re-express a cached equatorial Cartesian state in the requested
    /// form: optional ecliptic rotation, then the polar packing unless
    /// `CARTESIAN` keeps the vectors.
    fn finalize_form(&self, mut state: BodyState, flags: TransformFlags) -> BodyState {
        if flags.contains(TransformFlags::ECLIPTIC) {
            let eps = if flags.contains(TransformFlags::J2000) {
                mean_obliquity_j2000()
            } else {
                let t = julian_centuries(state.epoch_jd_tt);
                let nut = if flags.contains(TransformFlags::NO_NUTATION) {
                    Nutation {
                        dpsi: 0.0,
                        deps: 0.0,
                    }
                } else {
                    nutation(t, &self.config.nutation)
                };
                mean_obliquity(t) + nut.deps
            };
            state.position = equatorial_to_ecliptic(&state.position, eps);
            state.velocity = equatorial_to_ecliptic(&state.velocity, eps);
        }
        if !flags.contains(TransformFlags::CARTESIAN) {
            let polar = cartesian_to_polar(&state.position, &state.velocity);
            state.position = Vector3::new(polar.lon, polar.lat, polar.r);
            state.velocity = Vector3::new(polar.dlon, polar.dlat, polar.dr);
        }
        state.flags = flags;
        state
    }

    /// Heliocentric J2000 equatorial state of any body
    fn body_heliocentric(
        &self,
        body: Body,
        jd_tt: f64,
        earth_pos: &Vector3<f64>,
        earth_vel: &Vector3<f64>,
    ) -> Result<(Vector3<f64>, Vector3<f64>)> {
        match body {
            Body::Sun => Ok((Vector3::zeros(), Vector3::zeros())),
            Body::Earth => Ok((*earth_pos, *earth_vel)),
            Body::Moon => {
                let geo = moon_equatorial_j2000(jd_tt)?;
                let geo_back = moon_equatorial_j2000(jd_tt - FINITE_DIFF_DAYS)?;
                let vel = (geo - geo_back) / FINITE_DIFF_DAYS;
                Ok((earth_pos + geo, earth_vel + vel))
            }
            _ => self.planet_heliocentric(body, jd_tt),
        }
    }

    /// Heliocentric J2000 equatorial state from a series table
    fn planet_heliocentric(
        &self,
        body: Body,
        jd_tt: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>)> {
        let table = self.provider.table(body)?;
        let pos = ecliptic_series_to_equatorial(table.evaluate(jd_tt)?);
        let back = ecliptic_series_to_equatorial(table.evaluate(jd_tt - FINITE_DIFF_DAYS)?);
        Ok((pos, (pos - back) / FINITE_DIFF_DAYS))
    }

    /// Heliocentric Earth: the barycenter series with the lunar offset
    /// removed
    fn earth_heliocentric(&self, jd_tt: f64) -> Result<(Vector3<f64>, Vector3<f64>)> {
        let (emb_pos, emb_vel) = self.planet_heliocentric(Body::Earth, jd_tt)?;
        Ok(emb_to_earth(&emb_pos, &emb_vel, jd_tt, true)?)
    }

    /// Barycentric position of the Sun from the planetary masses
    fn sun_barycentric(&self, jd_tt: f64) -> Result<(Vector3<f64>, Vector3<f64>)> {
        let mut pos = Vector3::zeros();
        let mut vel = Vector3::zeros();
        let mut total = 1.0;
        for (body, inv_mass) in Body::PLANETS.iter().zip(INVERSE_MASS.iter()) {
            let (p, v) = self.planet_heliocentric(*body, jd_tt)?;
            let mu = 1.0 / inv_mass;
            pos -= p * mu;
            vel -= v * mu;
            total += mu;
        }
        Ok((pos / total, vel / total))
    }
}

/// Convert a J2000 ecliptic series result to equatorial Cartesian
fn ecliptic_series_to_equatorial(p: crate::serieslib::EclipticPosition) -> Vector3<f64> {
    let ecl = Vector3::new(
        p.r * p.lat.cos() * p.lon.cos(),
        p.r * p.lat.cos() * p.lon.sin(),
        p.r * p.lat.sin(),
    );
    ecliptic_to_equatorial(&ecl, mean_obliquity_j2000())
}

fn validate_flags(flags: TransformFlags) -> Result<()> {
    if flags.contains(TransformFlags::HELIOCENTRIC) && flags.contains(TransformFlags::BARYCENTRIC)
    {
        return Err(PositionError::InvalidFlags(
            "heliocentric and barycentric origins are mutually exclusive".into(),
        ));
    }
    if flags.contains(TransformFlags::TOPOCENTRIC)
        && (flags.contains(TransformFlags::HELIOCENTRIC)
            || flags.contains(TransformFlags::BARYCENTRIC))
    {
        return Err(PositionError::InvalidFlags(
            "topocentric shift requires a geocentric origin".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_operations() {
        let flags = TransformFlags::SPEED | TransformFlags::ECLIPTIC;
        assert!(flags.contains(TransformFlags::SPEED));
        assert!(flags.contains(TransformFlags::ECLIPTIC));
        assert!(!flags.contains(TransformFlags::J2000));
        assert_eq!(
            flags & TransformFlags::SPEED,
            TransformFlags::SPEED
        );
    }

    #[test]
    fn test_cache_class_masks_form_bits() {
        let a = TransformFlags::SPEED | TransformFlags::ECLIPTIC;
        let b = TransformFlags::SPEED | TransformFlags::CARTESIAN;
        let c = TransformFlags::SPEED;
        assert_eq!(a.cache_class(), c);
        assert_eq!(b.cache_class(), c);
        assert_ne!(
            (TransformFlags::SPEED | TransformFlags::J2000).cache_class(),
            c
        );
    }

    #[test]
    fn test_flag_conflicts_rejected() {
        assert!(validate_flags(TransformFlags::HELIOCENTRIC | TransformFlags::BARYCENTRIC)
            .is_err());
        assert!(validate_flags(TransformFlags::TOPOCENTRIC | TransformFlags::HELIOCENTRIC)
            .is_err());
        assert!(validate_flags(TransformFlags::TOPOCENTRIC | TransformFlags::SPEED).is_ok());
    }

    #[test]
    fn test_stage_order_enforced() {
        let mut w = Working {
            pos: Vector3::zeros(),
            vel: Vector3::zeros(),
            stage: Stage::Uncomputed,
        };
        w.advance(Stage::Raw);
        w.advance(Stage::BarycenterAdjusted);
        w.advance(Stage::LightTimeApplied);
        w.advance(Stage::FrameConverted);
        assert_eq!(w.stage, Stage::FrameConverted);
    }
}
