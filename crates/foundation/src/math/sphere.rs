use std::f64::consts::PI;

use super::Vec3;

/// Geographic coordinate in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl GeoPoint {
    pub const fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat_deg) && (-180.0..=180.0).contains(&self.lon_deg)
    }

    pub fn project(self, radius: f64) -> Vec3 {
        project(self.lat_deg, self.lon_deg, radius)
    }
}

/// Projects a latitude/longitude pair onto a sphere of `radius`.
///
/// Y is the polar axis. Longitude is offset by +180° so that the prime
/// meridian lands where an equirectangular texture has its center column.
///
/// Inputs outside `lat ∈ [-90, 90]`, `lon ∈ [-180, 180]` still produce a
/// point on the sphere, but it will not line up with the texture; callers are
/// expected to pass valid coordinates.
pub fn project(lat_deg: f64, lon_deg: f64, radius: f64) -> Vec3 {
    let phi = (90.0 - lat_deg) * PI / 180.0;
    let theta = (lon_deg + 180.0) * PI / 180.0;

    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();

    Vec3::new(
        -radius * sin_phi * cos_theta,
        radius * cos_phi,
        radius * sin_phi * sin_theta,
    )
}

#[cfg(test)]
mod tests {
    use super::{GeoPoint, project};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn points_lie_on_the_sphere() {
        for lat in (-90..=90).step_by(15) {
            for lon in (-180..=180).step_by(20) {
                for radius in [0.5, 1.0, 2.0, 100.0] {
                    let p = project(lat as f64, lon as f64, radius);
                    assert_close(p.length(), radius, 1e-9 * radius);
                }
            }
        }
    }

    #[test]
    fn poles_sit_on_the_polar_axis() {
        let north = project(90.0, 37.0, 2.0);
        assert_close(north.x, 0.0, 1e-12);
        assert_close(north.y, 2.0, 1e-12);
        assert_close(north.z, 0.0, 1e-12);

        let south = project(-90.0, -120.0, 2.0);
        assert_close(south.y, -2.0, 1e-12);
    }

    #[test]
    fn prime_meridian_faces_positive_x() {
        // theta = 180°, so x = -r·cos(180°) = r.
        let p = project(0.0, 0.0, 1.0);
        assert_close(p.x, 1.0, 1e-12);
        assert_close(p.y, 0.0, 1e-12);
        assert_close(p.z, 0.0, 1e-12);
    }

    #[test]
    fn ninety_east_faces_negative_z() {
        let p = project(0.0, 90.0, 1.0);
        assert_close(p.x, 0.0, 1e-12);
        assert_close(p.z, -1.0, 1e-12);
    }

    #[test]
    fn validity_bounds() {
        assert!(GeoPoint::new(35.7, 139.7).is_valid());
        assert!(GeoPoint::new(-90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -181.0).is_valid());
    }
}
