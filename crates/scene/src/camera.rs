//! Orbit camera around the globe with drag rotation, inertia, and smooth zoom.
//!
//! The camera orbits the origin; the globe's own idle rotation is handled by
//! the scene and is independent of where the camera sits.

use foundation::math::Vec3;

use crate::picking::Ray;

/// Closest the camera may get to the globe center (scene units).
pub const MIN_DISTANCE: f64 = 3.0;

/// Farthest the camera may get from the globe center (scene units).
pub const MAX_DISTANCE: f64 = 10.0;

pub const DEFAULT_DISTANCE: f64 = 6.0;

/// Vertical field of view used for picking rays.
pub const DEFAULT_FOV_Y_RAD: f64 = 45.0 * std::f64::consts::PI / 180.0;

/// Radians of orbit per pixel dragged.
const ROTATE_SPEED: f64 = 0.005;

/// Damping factor for angular velocity decay (per second).
const ANGULAR_DAMPING: f64 = 4.0;

/// Below this per-frame velocity inertia stops.
const ANGULAR_VELOCITY_THRESHOLD: f64 = 1e-4;

/// Zoom smoothing factor (higher = faster response).
const ZOOM_SMOOTHING: f64 = 8.0;

/// Keeps the camera off the poles so the up vector stays well defined.
const MAX_PITCH_RAD: f64 = std::f64::consts::FRAC_PI_2 - 0.05;

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    yaw_rad: f64,
    pitch_rad: f64,
    distance: f64,
    target_distance: f64,

    /// Per-frame (at 60 Hz) angular velocity `[yaw, pitch]`.
    velocity: [f64; 2],
    inertia_active: bool,

    viewport_px: [f64; 2],
    fov_y_rad: f64,

    dragging: bool,
    last_pos_px: [f64; 2],
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            yaw_rad: 0.0,
            pitch_rad: 0.0,
            distance: DEFAULT_DISTANCE,
            target_distance: DEFAULT_DISTANCE,
            velocity: [0.0, 0.0],
            inertia_active: false,
            viewport_px: [1280.0, 720.0],
            fov_y_rad: DEFAULT_FOV_Y_RAD,
            dragging: false,
            last_pos_px: [0.0, 0.0],
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_viewport(&mut self, width_px: f64, height_px: f64) {
        self.viewport_px = [width_px.max(1.0), height_px.max(1.0)];
    }

    pub fn viewport(&self) -> [f64; 2] {
        self.viewport_px
    }

    pub fn on_pointer_down(&mut self, pos_px: [f64; 2]) {
        self.stop_inertia();
        self.dragging = true;
        self.last_pos_px = pos_px;
    }

    pub fn on_pointer_move(&mut self, pos_px: [f64; 2]) {
        if !self.dragging {
            return;
        }
        let dx = pos_px[0] - self.last_pos_px[0];
        let dy = pos_px[1] - self.last_pos_px[1];
        self.last_pos_px = pos_px;

        // Dragging right swings the camera left so the globe follows the pointer.
        let d_yaw = -dx * ROTATE_SPEED;
        let d_pitch = dy * ROTATE_SPEED;
        self.rotate_by(d_yaw, d_pitch);
        self.velocity = [d_yaw, d_pitch];
    }

    pub fn on_pointer_up(&mut self) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        let [vy, vp] = self.velocity;
        self.inertia_active = vy.abs().max(vp.abs()) > ANGULAR_VELOCITY_THRESHOLD;
        if !self.inertia_active {
            self.velocity = [0.0, 0.0];
        }
    }

    /// Positive delta zooms out, negative zooms in.
    pub fn on_wheel(&mut self, delta: f64) {
        let zoom_factor = (delta * 0.002).exp();
        self.target_distance = (self.target_distance * zoom_factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn update(&mut self, dt: f64) {
        let dt = dt.clamp(0.0, 0.1);

        if self.inertia_active && !self.dragging {
            let step = dt * 60.0;
            self.rotate_by(self.velocity[0] * step, self.velocity[1] * step);

            let decay = (-ANGULAR_DAMPING * dt).exp();
            self.velocity = [self.velocity[0] * decay, self.velocity[1] * decay];
            if self.velocity[0].abs().max(self.velocity[1].abs()) < ANGULAR_VELOCITY_THRESHOLD {
                self.stop_inertia();
            }
        }

        let zoom_alpha = 1.0 - (-ZOOM_SMOOTHING * dt).exp();
        self.distance += (self.target_distance - self.distance) * zoom_alpha;
        self.distance = self.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn stop_inertia(&mut self) {
        self.inertia_active = false;
        self.velocity = [0.0, 0.0];
    }

    pub fn is_inertia_active(&self) -> bool {
        self.inertia_active
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn yaw_rad(&self) -> f64 {
        self.yaw_rad
    }

    pub fn pitch_rad(&self) -> f64 {
        self.pitch_rad
    }

    pub fn eye_position(&self) -> Vec3 {
        let (sp, cp) = self.pitch_rad.sin_cos();
        let (sy, cy) = self.yaw_rad.sin_cos();
        Vec3::new(
            self.distance * cp * sy,
            self.distance * sp,
            self.distance * cp * cy,
        )
    }

    /// World-space ray through a pixel of the viewport.
    pub fn ray_through(&self, pos_px: [f64; 2]) -> Option<Ray> {
        let eye = self.eye_position();
        let forward = (-eye).normalized()?;
        let right = forward.cross(Vec3::UP).normalized()?;
        let up = right.cross(forward);

        let [w, h] = self.viewport_px;
        let ndc_x = 2.0 * pos_px[0] / w - 1.0;
        let ndc_y = 1.0 - 2.0 * pos_px[1] / h;
        let tan_half = (self.fov_y_rad * 0.5).tan();
        let aspect = w / h;

        let dir = forward + right.scale(ndc_x * tan_half * aspect) + up.scale(ndc_y * tan_half);
        Some(Ray::new(eye, dir.normalized()?))
    }

    fn rotate_by(&mut self, d_yaw: f64, d_pitch: f64) {
        self.yaw_rad = (self.yaw_rad + d_yaw).rem_euclid(std::f64::consts::TAU);
        self.pitch_rad = (self.pitch_rad + d_pitch).clamp(-MAX_PITCH_RAD, MAX_PITCH_RAD);
    }
}
