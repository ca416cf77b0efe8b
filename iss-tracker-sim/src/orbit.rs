//! Very rough ISS ground track: a circular orbit at the station's inclination and period over a
//! rotating Earth. Good enough to draw a believable track, not for anything else.

use std::f64::consts::TAU;

const INCLINATION_DEG: f64 = 51.64;
const ORBITAL_PERIOD_SECS: f64 = 5_560.0;
const SIDEREAL_DAY_SECS: f64 = 86_164.1;
/// Longitude of the ascending node at unix time 0
const NODE_LONGITUDE_DEG: f64 = -40.0;

fn wrap_longitude(deg: f64) -> f64 {
    let wrapped = (deg + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can land exactly on 360 due to rounding
    if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Simulated `(latitude, longitude)` in degrees at a unix timestamp
pub fn position_at(unix_secs: i64) -> (f64, f64) {
    let t = unix_secs as f64;
    let inclination = INCLINATION_DEG.to_radians();

    // Argument of latitude, angle travelled since the ascending node
    let u = TAU * (t / ORBITAL_PERIOD_SECS).fract();

    let latitude = (inclination.sin() * u.sin()).asin().to_degrees();
    let node_offset = (inclination.cos() * u.sin()).atan2(u.cos()).to_degrees();
    let earth_rotation = 360.0 * t / SIDEREAL_DAY_SECS;

    let longitude = wrap_longitude(NODE_LONGITUDE_DEG + node_offset - earth_rotation);

    (latitude, longitude)
}
