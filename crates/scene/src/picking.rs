use foundation::math::Vec3;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir.scale(t)
    }
}

/// Distance along the (normalized) ray to the nearest non-negative hit on a
/// sphere, or `None` if the ray misses or the sphere is behind the origin.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f64) -> Option<f64> {
    let dir = ray.dir.normalized()?;
    let oc = ray.origin - center;
    let b = oc.dot(dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }

    let s = disc.sqrt();
    let near = -b - s;
    let far = -b + s;
    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        // Origin is inside the sphere.
        Some(far)
    } else {
        None
    }
}
