//! Constants module for astronomical calculations

use std::f64::consts::PI;

// Astronomical distances
/// Astronomical Unit in meters (per IAU 2012 Resolution B2)
pub const AU_M: f64 = 149_597_870_700.0;
/// Astronomical Unit in kilometers
pub const AU_KM: f64 = 149_597_870.700;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;
/// Days in a Julian century
pub const JULIAN_CENTURY_DAYS: f64 = 36_525.0;
/// Days in ten thousand Julian years, the time unit of the harmonic series
pub const TIMESCALE_DAYS: f64 = 3_652_500.0;

// Angles
/// Arcseconds in a complete circle
pub const ASEC360: f64 = 1_296_000.0;
/// Arcseconds to radians conversion factor
pub const ASEC2RAD: f64 = 4.848_136_811_095_36e-6;
/// Degrees to radians conversion factor
pub const DEG2RAD: f64 = PI / 180.0;
/// Radians to degrees conversion factor
pub const RAD2DEG: f64 = 180.0 / PI;
/// Tau (2*PI) for full circle
pub const TAU: f64 = 2.0 * PI;

// Physics
/// Speed of light in m/s
pub const C: f64 = 299_792_458.0;
/// Heliocentric gravitational constant in m^3/s^2
pub const GS: f64 = 1.327_124_400_179_87e+20;
/// Heliocentric gravitational constant in AU^3/day^2
pub const GM_SUN_AU3_D2: f64 = 2.959_122_082_855_911_5e-4;
/// Light travel time for one AU in seconds
pub const AU_LIGHT_S: f64 = AU_M / C;
/// Speed of light in AU/day
pub const C_AUDAY: f64 = C * DAY_S / AU_M;

// Earth constants
/// Earth's angular velocity in radians/s
pub const EARTH_ANGVEL: f64 = 7.292_115_0e-5;
/// Earth's equatorial radius in meters
pub const EARTH_RADIUS: f64 = 6_378_136.6;
/// IERS 2010 inverse Earth flattening
pub const IERS_2010_INVERSE_EARTH_FLATTENING: f64 = 298.25642;
/// Earth/Moon mass ratio
pub const EARTH_MOON_MASS_RATIO: f64 = 81.300_56;

// Sun constants
/// Solar radius in meters
pub const SUN_RADIUS_M: f64 = 696_000_000.0;
/// Solar radius in AU
pub const SUN_RADIUS_AU: f64 = SUN_RADIUS_M / AU_M;

// Validity window of the analytic series
/// Earliest supported epoch (Julian year -3000)
pub const SERIES_JD_MIN: f64 = J2000 - 3000.0 * 365.25;
/// Latest supported epoch (Julian year +3000)
pub const SERIES_JD_MAX: f64 = J2000 + 3000.0 * 365.25;
/// Margin beyond the window consumed by internal re-evaluation, in days.
/// Light-time retardation reaches ~0.29 day for Pluto near aphelion and
/// speed finite-differencing subtracts another 1e-4 day, so evaluating at
/// the window edge must still be able to step this far outside it.
pub const SERIES_JD_MARGIN: f64 = 0.5;

/// Mean obliquity of the ecliptic at J2000 in arcseconds (Laskar 1986)
pub const EPS0_J2000_ASEC: f64 = 84_381.448;

// Calendar constants
/// First day of Gregorian calendar in Julian day number (1582-10-15)
pub const GREGORIAN_START: i32 = 2_299_161;
