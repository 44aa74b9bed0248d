//! Interactive globe: markers, idle rotation, hover and click handling.

use std::collections::BTreeMap;

use foundation::CountryCode;
use foundation::color::Rgb;
use foundation::math::Vec3;
use runtime::{EventBus, Frame};
use tracing::debug;

use crate::camera::OrbitCamera;
use crate::countries::country_center;
use crate::marker::{Marker, MarkerVisual, SelectIntent};
use crate::picking::{Ray, ray_sphere};

pub const GLOBE_RADIUS: f64 = 2.0;

/// Markers float slightly above the surface.
pub const MARKER_LIFT: f64 = 1.01;

/// Marker sphere radius before emphasis scaling.
pub const MARKER_BASE_RADIUS: f64 = 0.03;

/// Idle rotation about the vertical axis (radians per second).
pub const DEFAULT_ROTATION_SPEED: f64 = 0.1;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    Select(Option<CountryCode>),
    CursorChanged(Cursor),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AmbientLight {
    pub color: Rgb,
    pub intensity: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub color: Rgb,
    pub intensity: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Lighting {
    pub ambient: AmbientLight,
    pub key: DirectionalLight,
    pub fill: DirectionalLight,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: Rgb::new(255, 255, 255),
                intensity: 0.5,
            },
            key: DirectionalLight {
                position: Vec3::new(5.0, 3.0, 5.0),
                color: Rgb::new(255, 255, 255),
                intensity: 1.0,
            },
            fill: DirectionalLight {
                position: Vec3::new(-5.0, -3.0, -5.0),
                color: Rgb::new(96, 165, 250),
                intensity: 0.3,
            },
        }
    }
}

/// One entry of the per-frame render list.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerInstance {
    pub code: CountryCode,
    pub position: Vec3,
    pub visual: MarkerVisual,
}

/// Idle rotation for one frame. Hovering any marker freezes the globe so the
/// target does not slide out from under the pointer.
pub fn rotation_step(any_hovered: bool, speed_rad_s: f64, dt_s: f64) -> f64 {
    if any_hovered { 0.0 } else { speed_rad_s * dt_s }
}

#[derive(Debug)]
pub struct GlobeScene {
    radius: f64,
    rotation_rad: f64,
    rotation_speed: f64,
    markers: BTreeMap<CountryCode, Marker>,
    selected: Option<CountryCode>,
    cursor: Cursor,
    lighting: Lighting,
    camera: OrbitCamera,
    events: EventBus<SceneEvent>,
}

impl Default for GlobeScene {
    fn default() -> Self {
        Self::new(GLOBE_RADIUS)
    }
}

impl GlobeScene {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            rotation_rad: 0.0,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            markers: BTreeMap::new(),
            selected: None,
            cursor: Cursor::Default,
            lighting: Lighting::default(),
            camera: OrbitCamera::new(),
            events: EventBus::new(),
        }
    }

    pub fn with_rotation_speed(mut self, rad_per_s: f64) -> Self {
        self.rotation_speed = rad_per_s;
        self
    }

    /// Replace the marker set. Countries without a known center are skipped.
    /// Hover state survives for countries that stay on the globe.
    ///
    /// Returns the number of markers placed.
    pub fn sync_markers<I>(&mut self, countries: I) -> usize
    where
        I: IntoIterator<Item = (CountryCode, f64)>,
    {
        let mut next = BTreeMap::new();
        for (code, score) in countries {
            let Some(center) = country_center(&code) else {
                debug!(%code, "no center for country, skipping marker");
                continue;
            };
            let anchor = center.project(self.radius * MARKER_LIFT);
            let mut marker = Marker::new(code.clone(), score, anchor);
            if let Some(prev) = self.markers.get(&code) {
                marker.state.hovered = prev.state.hovered;
            }
            marker.state.selected = self.selected.as_ref() == Some(&code);
            next.insert(code, marker);
        }
        self.markers = next;
        self.refresh_cursor();
        self.markers.len()
    }

    pub fn set_selected(&mut self, selected: Option<&CountryCode>) {
        self.selected = selected.cloned();
        for (code, marker) in self.markers.iter_mut() {
            marker.state.selected = Some(code) == selected;
        }
    }

    pub fn selected(&self) -> Option<&CountryCode> {
        self.selected.as_ref()
    }

    pub fn pointer_enter(&mut self, code: &CountryCode) -> bool {
        let changed = self
            .markers
            .get_mut(code)
            .is_some_and(|m| m.pointer_enter());
        self.refresh_cursor();
        changed
    }

    pub fn pointer_leave(&mut self, code: &CountryCode) -> bool {
        let changed = self
            .markers
            .get_mut(code)
            .is_some_and(|m| m.pointer_leave());
        self.refresh_cursor();
        changed
    }

    /// Click on a marker. Emits and returns the resulting selection intent.
    pub fn click(&mut self, code: &CountryCode) -> Option<SelectIntent> {
        let intent = self.markers.get(code)?.click();
        self.events.emit(SceneEvent::Select(intent.0.clone()));
        Some(intent)
    }

    /// Hover tracking from a pointer ray; `None` means the pointer left the view.
    pub fn pointer_move(&mut self, ray: Option<&Ray>) -> Option<CountryCode> {
        let hit = ray.and_then(|r| self.pick(r));
        let stale: Vec<CountryCode> = self
            .markers
            .values()
            .filter(|m| m.state.hovered && Some(&m.code) != hit.as_ref())
            .map(|m| m.code.clone())
            .collect();
        for code in &stale {
            self.pointer_leave(code);
        }
        if let Some(code) = &hit {
            self.pointer_enter(code);
        }
        hit
    }

    /// Click at the current pointer ray. Returns `None` if no marker was hit.
    pub fn click_at(&mut self, ray: &Ray) -> Option<SelectIntent> {
        let code = self.pick(ray)?;
        self.click(&code)
    }

    /// Nearest visible marker along the ray. Markers behind the globe are
    /// occluded; equal distances resolve to the lower country code.
    pub fn pick(&self, ray: &Ray) -> Option<CountryCode> {
        let globe_t = ray_sphere(ray, Vec3::ZERO, self.radius);
        let mut best: Option<(f64, &CountryCode)> = None;
        for marker in self.markers.values() {
            let center = self.world_position(marker);
            let radius = MARKER_BASE_RADIUS * marker.visual().scale;
            let Some(t) = ray_sphere(ray, center, radius) else {
                continue;
            };
            if globe_t.is_some_and(|g| g < t) {
                continue;
            }
            if best.is_none_or(|(bt, _)| t < bt) {
                best = Some((t, &marker.code));
            }
        }
        best.map(|(_, code)| code.clone())
    }

    /// Advance idle rotation and camera inertia. Returns the rotation applied.
    pub fn advance(&mut self, frame: &Frame) -> f64 {
        let step = rotation_step(self.any_hovered(), self.rotation_speed, frame.dt_s);
        self.rotation_rad = (self.rotation_rad + step).rem_euclid(std::f64::consts::TAU);
        self.camera.update(frame.dt_s);
        step
    }

    pub fn any_hovered(&self) -> bool {
        self.markers.values().any(|m| m.state.hovered)
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn rotation_rad(&self) -> f64 {
        self.rotation_rad
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn marker(&self, code: &CountryCode) -> Option<&Marker> {
        self.markers.get(code)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn world_position(&self, marker: &Marker) -> Vec3 {
        marker.anchor.rotate_y(self.rotation_rad)
    }

    pub fn render_list(&self) -> Vec<MarkerInstance> {
        self.markers
            .values()
            .map(|m| MarkerInstance {
                code: m.code.clone(),
                position: self.world_position(m),
                visual: m.visual(),
            })
            .collect()
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        self.events.drain()
    }

    fn refresh_cursor(&mut self) {
        let cursor = if self.any_hovered() { Cursor::Pointer } else { Cursor::Default };
        if cursor != self.cursor {
            self.cursor = cursor;
            self.events.emit(SceneEvent::CursorChanged(cursor));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::{EMPHASIZED_SCALE, IDLE_SCALE};
    use foundation::color_for;
    use pretty_assertions::assert_eq;
    use runtime::FrameClock;

    fn cc(s: &str) -> CountryCode {
        CountryCode::parse(s).unwrap()
    }

    fn scene_with(codes: &[(&str, f64)]) -> GlobeScene {
        let mut scene = GlobeScene::default();
        scene.sync_markers(codes.iter().map(|(c, s)| (cc(c), *s)));
        scene
    }

    fn ray_at(scene: &GlobeScene, code: &str) -> Ray {
        let marker = scene.marker(&cc(code)).unwrap();
        let target = scene.world_position(marker);
        let origin = target.scale(3.0);
        Ray::new(origin, target - origin)
    }

    #[test]
    fn countries_without_center_are_dropped() {
        let scene = scene_with(&[("JP", 0.4), ("EU", 0.1), ("US", -0.2)]);
        assert_eq!(scene.len(), 2);
        assert!(scene.marker(&cc("EU")).is_none());
    }

    #[test]
    fn markers_sit_just_above_the_surface() {
        let scene = scene_with(&[("BR", 0.0)]);
        let m = scene.marker(&cc("BR")).unwrap();
        assert!((m.anchor.length() - GLOBE_RADIUS * MARKER_LIFT).abs() < 1e-9);
    }

    #[test]
    fn hover_freezes_rotation() {
        let mut scene = scene_with(&[("JP", 0.4)]);
        let mut clock = FrameClock::new();

        let step = scene.advance(&clock.tick(0.05));
        assert!((step - DEFAULT_ROTATION_SPEED * 0.05).abs() < 1e-12);

        scene.pointer_enter(&cc("JP"));
        let frozen = scene.rotation_rad();
        for _ in 0..10 {
            assert_eq!(scene.advance(&clock.tick(0.05)), 0.0);
        }
        assert_eq!(scene.rotation_rad(), frozen);

        scene.pointer_leave(&cc("JP"));
        assert!(scene.advance(&clock.tick(0.05)) > 0.0);
    }

    #[test]
    fn rotation_step_is_pure() {
        assert_eq!(rotation_step(true, 0.5, 1.0), 0.0);
        assert_eq!(rotation_step(false, 0.5, 0.2), 0.1);
    }

    #[test]
    fn hover_emphasizes_and_sets_cursor() {
        let mut scene = scene_with(&[("FR", 0.3)]);
        assert!(scene.pointer_enter(&cc("FR")));
        assert_eq!(scene.cursor(), Cursor::Pointer);
        assert_eq!(scene.marker(&cc("FR")).unwrap().visual().scale, EMPHASIZED_SCALE);

        scene.pointer_leave(&cc("FR"));
        assert_eq!(scene.cursor(), Cursor::Default);
        assert_eq!(scene.marker(&cc("FR")).unwrap().visual().scale, IDLE_SCALE);
        assert_eq!(
            scene.drain_events(),
            vec![
                SceneEvent::CursorChanged(Cursor::Pointer),
                SceneEvent::CursorChanged(Cursor::Default),
            ]
        );
    }

    #[test]
    fn cursor_stays_pointer_while_any_marker_is_hovered() {
        let mut scene = scene_with(&[("FR", 0.3), ("DE", 0.1)]);
        scene.pointer_enter(&cc("FR"));
        scene.pointer_enter(&cc("DE"));
        scene.pointer_leave(&cc("FR"));
        assert_eq!(scene.cursor(), Cursor::Pointer);
    }

    #[test]
    fn click_selects_then_deselects() {
        let mut scene = scene_with(&[("JP", 0.4), ("US", 0.1)]);
        assert_eq!(scene.click(&cc("JP")), Some(SelectIntent(Some(cc("JP")))));

        scene.set_selected(Some(&cc("JP")));
        assert!(scene.marker(&cc("JP")).unwrap().state.selected);
        assert_eq!(scene.click(&cc("JP")), Some(SelectIntent(None)));
        assert_eq!(scene.click(&cc("US")), Some(SelectIntent(Some(cc("US")))));

        assert_eq!(
            scene.drain_events(),
            vec![
                SceneEvent::Select(Some(cc("JP"))),
                SceneEvent::Select(None),
                SceneEvent::Select(Some(cc("US"))),
            ]
        );
    }

    #[test]
    fn selection_survives_marker_resync() {
        let mut scene = scene_with(&[("JP", 0.4)]);
        scene.set_selected(Some(&cc("JP")));
        scene.pointer_enter(&cc("JP"));
        scene.sync_markers([(cc("JP"), -0.6), (cc("KR"), 0.0)]);

        let jp = scene.marker(&cc("JP")).unwrap();
        assert!(jp.state.selected && jp.state.hovered);
        assert_eq!(jp.visual().color, color_for(-0.6));
        assert!(!scene.marker(&cc("KR")).unwrap().state.selected);
    }

    #[test]
    fn picking_hits_marker_facing_the_ray() {
        let mut scene = scene_with(&[("JP", 0.4), ("BR", 0.1)]);
        let ray = ray_at(&scene, "JP");
        assert_eq!(scene.pick(&ray), Some(cc("JP")));
        assert_eq!(scene.pointer_move(Some(&ray)), Some(cc("JP")));
        assert!(scene.marker(&cc("JP")).unwrap().state.hovered);

        scene.pointer_move(None);
        assert!(!scene.any_hovered());
    }

    #[test]
    fn markers_behind_the_globe_are_occluded() {
        let scene = scene_with(&[("BR", 0.1)]);
        let marker = scene.marker(&cc("BR")).unwrap();
        let target = scene.world_position(marker);
        // Shoot from the antipode through the globe center.
        let origin = -target.scale(3.0);
        let ray = Ray::new(origin, target - origin);
        assert_eq!(scene.pick(&ray), None);
    }

    #[test]
    fn render_list_follows_rotation() {
        let mut scene = scene_with(&[("AU", 0.2)]).with_rotation_speed(1.0);
        let before = scene.render_list()[0].position;
        scene.advance(&FrameClock::new().tick(0.1));
        let after = scene.render_list()[0].position;
        assert!((before.y - after.y).abs() < 1e-12);
        assert!((before - after).length() > 1e-3);
    }
}
