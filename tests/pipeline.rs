//! End-to-end pipeline scenarios

use astropos::constants::{
    ASEC2RAD, AU_KM, J2000, RAD2DEG, SERIES_JD_MAX, SERIES_JD_MIN, TAU,
};
use astropos::nutationlib::NutationModel;
use astropos::positions::PositionError;
use astropos::serieslib::SeriesError;
use astropos::{
    Body, BuiltinEphemeris, NutationConfig, PipelineConfig, PositionPipeline, TransformFlags,
};
use nalgebra::Vector3;

fn pipeline() -> PositionPipeline<BuiltinEphemeris> {
    PositionPipeline::new(BuiltinEphemeris::new().unwrap(), PipelineConfig::default())
}

fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (a.dot(b) / (a.norm() * b.norm())).clamp(-1.0, 1.0).acos()
}

#[test]
fn sun_geometric_j2000() {
    // The geometric geocentric Sun at J2000.0 against the published
    // reference: ecliptic longitude 280.3777 degrees to within 0.001,
    // distance 0.98333 AU to within 0.0001, latitude within arcseconds
    // of the ecliptic
    let mut p = pipeline();
    let flags = TransformFlags::SPEED
        | TransformFlags::J2000
        | TransformFlags::ECLIPTIC
        | TransformFlags::TRUE_POSITION;
    let sun = p.evaluate_body(J2000, Body::Sun, flags).unwrap();

    let lon_deg = sun.position.x * RAD2DEG;
    let lat_deg = sun.position.y * RAD2DEG;
    let r = sun.position.z;
    assert!((lon_deg - 280.3777).abs() < 0.001, "sun longitude {lon_deg}");
    assert!((r - 0.98333).abs() < 1e-4, "sun distance {r}");
    assert!(lat_deg.abs() < 0.005, "sun latitude {lat_deg}");
    // The Sun's apparent motion is ~0.9856 deg/day on average, faster
    // near perihelion
    let daily = sun.velocity.x * RAD2DEG;
    assert!((0.93..1.05).contains(&daily), "sun daily motion {daily}");
}

#[test]
fn aberration_shifts_the_sun() {
    // Apparent minus geometric Sun is dominated by annual aberration,
    // about 20.5 arcseconds
    let mut p = pipeline();
    let apparent = p
        .evaluate_body(J2000, Body::Sun, TransformFlags::CARTESIAN)
        .unwrap();
    let geometric = p
        .evaluate_body(
            J2000,
            Body::Sun,
            TransformFlags::CARTESIAN | TransformFlags::TRUE_POSITION,
        )
        .unwrap();
    let shift = angle_between(&apparent.position, &geometric.position) / ASEC2RAD;
    assert!((19.0..22.0).contains(&shift), "aberration shift {shift} arcsec");
}

#[test]
fn moon_topocentric_parallax() {
    // A Greenwich-meridian observer at latitude 51.5 N at J2000.0 sees
    // the Moon low in the sky; the topocentric place differs from the
    // geocentric one by tens of arcminutes
    let mut p = pipeline();
    p.set_observer(0.0, 51.5, 0.0);
    let geo = p
        .evaluate_body(J2000, Body::Moon, TransformFlags::CARTESIAN)
        .unwrap();
    let topo = p
        .evaluate_body(
            J2000,
            Body::Moon,
            TransformFlags::CARTESIAN | TransformFlags::TOPOCENTRIC,
        )
        .unwrap();
    let arcmin = angle_between(&geo.position, &topo.position) * RAD2DEG * 60.0;
    assert!(arcmin > 10.0, "parallax only {arcmin} arcmin");
    assert!(arcmin < 62.0, "parallax {arcmin} arcmin exceeds the horizontal maximum");
}

#[test]
fn topocentric_without_observer_errors() {
    let mut p = pipeline();
    let err = p
        .evaluate_body(J2000, Body::Moon, TransformFlags::TOPOCENTRIC)
        .unwrap_err();
    assert!(matches!(err, PositionError::Observer(_)), "got {err:?}");
}

#[test]
fn epoch_out_of_range_errors() {
    let mut p = pipeline();
    let err = p
        .evaluate_body(SERIES_JD_MAX + 10.0, Body::Mars, TransformFlags::empty())
        .unwrap_err();
    assert!(matches!(
        err,
        PositionError::Series(SeriesError::EpochOutOfRange { .. })
    ));
}

#[test]
fn domain_edge_epochs_evaluate() {
    // Light-time retardation steps up to ~0.3 day before the requested
    // epoch; the outer planets must still evaluate at the very edge of
    // the supported window
    let mut p = pipeline();
    for body in [Body::Neptune, Body::Pluto] {
        let s = p.evaluate_body(SERIES_JD_MIN, body, TransformFlags::SPEED);
        assert!(s.is_ok(), "{body:?} at the early edge: {s:?}");
        let s = p.evaluate_body(SERIES_JD_MAX, body, TransformFlags::SPEED);
        assert!(s.is_ok(), "{body:?} at the late edge: {s:?}");
    }
}

#[test]
fn cache_idempotence() {
    let mut p = pipeline();
    let flags = TransformFlags::SPEED;
    let a = p.evaluate_body(J2000 + 500.0, Body::Jupiter, flags).unwrap();
    let b = p.evaluate_body(J2000 + 500.0, Body::Jupiter, flags).unwrap();
    assert_eq!(a.position, b.position, "cached result must be bit-identical");
    assert_eq!(a.velocity, b.velocity);

    let stats = p.stats();
    assert_eq!(stats.evaluations, 2);
    assert_eq!(stats.cache_hits, 1);
}

#[test]
fn coordinate_form_shares_cache() {
    // The ecliptic and Cartesian bits only re-express the state; the
    // later requests are served from the cache, and the polar radius
    // matches the Cartesian norm
    let mut p = pipeline();
    let polar = p
        .evaluate_body(J2000 + 123.0, Body::Venus, TransformFlags::SPEED)
        .unwrap();
    let cart = p
        .evaluate_body(
            J2000 + 123.0,
            Body::Venus,
            TransformFlags::SPEED | TransformFlags::CARTESIAN,
        )
        .unwrap();
    let ecl = p
        .evaluate_body(
            J2000 + 123.0,
            Body::Venus,
            TransformFlags::SPEED | TransformFlags::CARTESIAN | TransformFlags::ECLIPTIC,
        )
        .unwrap();
    assert_eq!(p.stats().cache_hits, 2);
    assert!((polar.position.z - cart.position.norm()).abs() < 1e-12);
    assert!((0.0..TAU).contains(&polar.position.x), "longitude {}", polar.position.x);
    assert!((cart.position.norm() - ecl.position.norm()).abs() < 1e-12);
    assert!(cart.position != ecl.position, "axes must differ");
}

#[test]
fn speed_flag_controls_velocity() {
    let mut p = pipeline();
    let without = p
        .evaluate_body(J2000, Body::Sun, TransformFlags::CARTESIAN)
        .unwrap();
    assert_eq!(without.velocity, Vector3::zeros());

    let with = p
        .evaluate_body(
            J2000,
            Body::Sun,
            TransformFlags::CARTESIAN | TransformFlags::SPEED,
        )
        .unwrap();
    let speed = with.velocity.norm();
    assert!((0.015..0.020).contains(&speed), "sun speed {speed} AU/day");
}

#[test]
fn heliocentric_origins() {
    let mut p = pipeline();
    let flags = TransformFlags::CARTESIAN
        | TransformFlags::HELIOCENTRIC
        | TransformFlags::TRUE_POSITION;
    let sun = p.evaluate_body(J2000, Body::Sun, flags).unwrap();
    assert!(sun.position.norm() < 1e-12, "heliocentric sun {:?}", sun.position);

    let earth = p.evaluate_body(J2000, Body::Earth, flags).unwrap();
    let r = earth.position.norm();
    assert!((r - 0.9833).abs() < 5e-4, "earth distance {r}");
}

#[test]
fn barycentric_sun_offset() {
    // Jupiter alone pulls the Sun ~0.005 AU from the barycenter
    let mut p = pipeline();
    let sun = p
        .evaluate_body(
            J2000,
            Body::Sun,
            TransformFlags::CARTESIAN
                | TransformFlags::BARYCENTRIC
                | TransformFlags::TRUE_POSITION,
        )
        .unwrap();
    let r = sun.position.norm();
    assert!((0.001..0.02).contains(&r), "barycentric sun offset {r} AU");
}

#[test]
fn moon_geocentric_distance() {
    let mut p = pipeline();
    let moon = p
        .evaluate_body(
            J2000,
            Body::Moon,
            TransformFlags::CARTESIAN | TransformFlags::TRUE_POSITION,
        )
        .unwrap();
    let km = moon.position.norm() * AU_KM;
    assert!((350_000.0..410_000.0).contains(&km), "moon distance {km} km");
}

#[test]
fn j2000_and_of_date_differ_by_precession() {
    // A century of precession moves the equinox by ~1.4 degrees
    let mut p = pipeline();
    let jd = J2000 + 36_525.0;
    let flags = TransformFlags::CARTESIAN | TransformFlags::TRUE_POSITION;
    let of_date = p.evaluate_body(jd, Body::Mars, flags).unwrap();
    let fixed = p
        .evaluate_body(jd, Body::Mars, flags | TransformFlags::J2000)
        .unwrap();
    let angle = angle_between(&of_date.position, &fixed.position) * RAD2DEG;
    assert!((0.5..2.5).contains(&angle), "frame separation {angle} deg");
}

#[test]
fn nutation_models_agree_through_pipeline() {
    // Swapping the nutation model moves an apparent place by no more
    // than the published amplitude revisions, about ten milliarcseconds
    let provider = BuiltinEphemeris::new().unwrap();
    let mut p1980 = PositionPipeline::new(
        provider,
        PipelineConfig {
            nutation: NutationConfig {
                model: NutationModel::Iau1980,
                ..NutationConfig::default()
            },
            ..PipelineConfig::default()
        },
    );
    let provider = BuiltinEphemeris::new().unwrap();
    let mut p2000 = PositionPipeline::new(
        provider,
        PipelineConfig {
            nutation: NutationConfig {
                model: NutationModel::Iau2000A,
                ..NutationConfig::default()
            },
            ..PipelineConfig::default()
        },
    );

    let jd = J2000 + 3_000.0;
    let flags = TransformFlags::CARTESIAN | TransformFlags::TRUE_POSITION;
    let a = p1980.evaluate_body(jd, Body::Mars, flags).unwrap();
    let b = p2000.evaluate_body(jd, Body::Mars, flags).unwrap();
    let diff = angle_between(&a.position, &b.position) / ASEC2RAD;
    assert!(diff < 0.010, "model disagreement {diff} arcsec");
}

#[test]
fn conflicting_flags_rejected() {
    let mut p = pipeline();
    let err = p
        .evaluate_body(
            J2000,
            Body::Mars,
            TransformFlags::HELIOCENTRIC | TransformFlags::BARYCENTRIC,
        )
        .unwrap_err();
    assert!(matches!(err, PositionError::InvalidFlags(_)));
}

#[test]
fn planet_distance_bounds() {
    let mut p = pipeline();
    let flags = TransformFlags::CARTESIAN | TransformFlags::TRUE_POSITION;
    for &jd in &[J2000 - 10_000.0, J2000, J2000 + 10_000.0] {
        let mars = p.evaluate_body(jd, Body::Mars, flags).unwrap();
        let r = mars.position.norm();
        assert!((0.3..2.8).contains(&r), "mars geocentric distance {r} AU at {jd}");
    }
}

#[test]
fn observer_change_invalidates_topocentric_cache() {
    let mut p = pipeline();
    p.set_observer(0.0, 45.0, 100.0);
    let a = p
        .evaluate_body(J2000, Body::Moon, TransformFlags::TOPOCENTRIC)
        .unwrap();
    p.set_observer(90.0, 45.0, 100.0);
    let b = p
        .evaluate_body(J2000, Body::Moon, TransformFlags::TOPOCENTRIC)
        .unwrap();
    assert!(
        (a.position - b.position).norm() > 0.0,
        "moving the observer must change the topocentric place"
    );
    assert_eq!(p.stats().cache_hits, 0);
}
