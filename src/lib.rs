//! Apparent positions of the Sun, Moon and planets
//!
//! `astropos` reduces analytic planetary and lunar theories to apparent
//! places: harmonic series evaluation, the Earth-Moon barycenter
//! correction, nutation (IAU 1980 and 2000A/B), precession, light-time,
//! gravitational deflection, aberration and topocentric observer
//! geometry, orchestrated by a caching [`PositionPipeline`].
//!
//! ```no_run
//! use astropos::{Body, BuiltinEphemeris, PipelineConfig, PositionPipeline, TransformFlags};
//!
//! # fn main() -> astropos::Result<()> {
//! let provider = BuiltinEphemeris::new()?;
//! let mut pipeline = PositionPipeline::new(provider, PipelineConfig::default());
//! let mars = pipeline.evaluate_body(
//!     2_451_545.0,
//!     Body::Mars,
//!     TransformFlags::SPEED,
//! )?;
//! println!(
//!     "apparent Mars: lon {} rad, r {} AU",
//!     mars.position.x, mars.position.z,
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Epochs are TT Julian dates; the analytic series cover J2000 ± 3000
//! Julian years. All internal states are Cartesian vectors in AU and
//! AU/day on the J2000 equator until the final frame conversion;
//! results default to the polar (longitude, latitude, radius) packing,
//! with `TransformFlags::CARTESIAN` keeping the vectors instead.

pub mod apparent;
pub mod constants;
pub mod earthlib;
pub mod framelib;
pub mod fundlib;
pub mod moonlib;
pub mod nutationlib;
pub mod positions;
pub mod precessionlib;
pub mod serieslib;
pub mod time;

use thiserror::Error;

/// Crate-level error type wrapping the module error taxonomies
#[derive(Debug, Error)]
pub enum AstroposError {
    #[error(transparent)]
    Time(#[from] time::TimeError),

    #[error(transparent)]
    Series(#[from] serieslib::SeriesError),

    #[error(transparent)]
    Observer(#[from] earthlib::EarthError),

    #[error(transparent)]
    Position(#[from] positions::PositionError),
}

/// Result type used at the crate boundary
pub type Result<T> = std::result::Result<T, AstroposError>;

pub use framelib::{BiasVariant, Ecliptic, Equatorial};
pub use nutationlib::{Nutation, NutationConfig, NutationModel};
pub use positions::{
    BodyState, PipelineConfig, PipelineStats, PositionError, PositionPipeline, TransformFlags,
};
pub use serieslib::{
    Body, BuiltinEphemeris, EclipticPosition, EphemerisDataProvider, EphemerisSource,
    HarmonicSeriesTable,
};
