/// Great-circle helpers shared by the query builder and listing storage

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Relative slack on the chord threshold so points exactly on the radius survive rounding
const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// Haversine distance between two (lat, lng) points in degrees
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Geo-point on the unit sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl UnitVector {
    pub fn from_lat_lng(lat: f64, lng: f64) -> Self {
        let phi = lat.to_radians();
        let lambda = lng.to_radians();
        Self {
            x: phi.cos() * lambda.cos(),
            y: phi.cos() * lambda.sin(),
            z: phi.sin(),
        }
    }
}

/// Largest squared chord between two unit vectors that are at most `radius_km` apart.
///
/// Chord length is `2 * sin(theta / 2)` for central angle `theta`, so comparing squared
/// chords is exactly the haversine comparison and stays precise for small radii.
pub fn max_chord_squared(radius_km: f64) -> f64 {
    let half_angle = (radius_km / EARTH_RADIUS_KM / 2.0).min(std::f64::consts::FRAC_PI_2);
    let chord = 2.0 * half_angle.sin();
    chord * chord * (1.0 + BOUNDARY_TOLERANCE)
}

/// Distance rounded to two decimals for display
pub fn round_km(distance_km: f64) -> f64 {
    (distance_km * 100.0).round() / 100.0
}
