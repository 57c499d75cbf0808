use rand::Rng;

use crate::geo::{world_to_lng_lat, MAX_LATITUDE};
use crate::model::LocationRecord;
use crate::render::Viewport;

use super::transition::Transition;

pub const FLY_TO_ZOOM: f64 = 11.8;
pub const FLY_TO_BEARING_MIN: i32 = -120;
pub const FLY_TO_BEARING_MAX: i32 = 240;
pub const MAX_PITCH: f64 = 60.0;
pub const TRANSITION_MS: f64 = 4000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Degrees from vertical.
    pub pitch: f64,
    /// Degrees clockwise from north.
    pub bearing: f64,
    pub transition_duration_ms: f64,
}

impl CameraState {
    pub const fn initial() -> Self {
        Self {
            longitude: -3.74922,
            latitude: 40.463669,
            zoom: 5.8,
            min_zoom: 2.0,
            max_zoom: 15.0,
            pitch: 40.5,
            bearing: -45.0,
            transition_duration_ms: TRANSITION_MS,
        }
    }

    /// Close-up of a record, seen from a random direction.
    pub fn fly_to_target<R: Rng>(record: &LocationRecord, rng: &mut R) -> Self {
        Self {
            longitude: record.longitude(),
            latitude: record.latitude(),
            zoom: FLY_TO_ZOOM,
            bearing: random_bearing(rng),
            ..Self::initial()
        }
    }

    pub fn clamped(self) -> Self {
        Self {
            zoom: self.zoom.clamp(self.min_zoom, self.max_zoom),
            pitch: self.pitch.clamp(0.0, MAX_PITCH),
            latitude: self.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            ..self
        }
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Uniform integer bearing in `[FLY_TO_BEARING_MIN, FLY_TO_BEARING_MAX]`.
pub fn random_bearing<R: Rng>(rng: &mut R) -> f64 {
    rng.gen_range(FLY_TO_BEARING_MIN..=FLY_TO_BEARING_MAX) as f64
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub view: CameraState,
    transition: Option<Transition>,
    /// Canvas size in CSS pixels, kept current by the map view.
    pub size: [f64; 2],
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            view: CameraState::initial(),
            transition: None,
            size: [1280.0, 720.0],
        }
    }
}

impl Camera {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(&self.view, self.size[0], self.size[1])
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Animate from the current view to `target` over its transition duration.
    pub fn transition_to(&mut self, target: CameraState, now_ms: f64) {
        let target = target.clamped();
        if target.transition_duration_ms <= 0.0 {
            self.transition = None;
            self.view = target;
            return;
        }
        self.transition = Some(Transition::new(self.view, target, now_ms, self.size));
    }

    pub fn reset(&mut self, now_ms: f64) {
        tracing::debug!("camera reset");
        self.transition_to(CameraState::initial(), now_ms);
    }

    pub fn fly_to<R: Rng>(&mut self, record: &LocationRecord, now_ms: f64, rng: &mut R) {
        let target = CameraState::fly_to_target(record, rng);
        tracing::debug!(
            "fly to {:?} at ({}, {}) bearing {}",
            record.name,
            target.longitude,
            target.latitude,
            target.bearing
        );
        self.transition_to(target, now_ms);
    }

    /// Advance any transition; returns true while still animating.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some(tr) = &self.transition else {
            return false;
        };
        let (view, done) = tr.sample(now_ms);
        self.view = view;
        if done {
            self.transition = None;
        }
        !done
    }

    pub fn cancel_transition(&mut self) {
        self.transition = None;
    }

    fn set_center_world(&mut self, world: [f64; 2]) {
        let (lng, lat) = world_to_lng_lat(world);
        self.view.longitude = lng;
        self.view.latitude = lat;
        self.view = self.view.clamped();
    }

    /// Drag the ground point under `from` to `to` (screen pixels).
    pub fn pan(&mut self, from: [f64; 2], to: [f64; 2]) {
        self.cancel_transition();
        let vp = self.viewport();
        if let (Some(a), Some(b)) = (vp.unproject(from), vp.unproject(to)) {
            self.set_center_world([vp.center[0] + a[0] - b[0], vp.center[1] + a[1] - b[1]]);
        }
    }

    pub fn pan_by_pixels(&mut self, dx: f64, dy: f64) {
        let mid = [self.size[0] * 0.5, self.size[1] * 0.5];
        self.pan(mid, [mid[0] + dx, mid[1] + dy]);
    }

    /// Zoom by `delta` levels, keeping the ground point under `anchor` fixed.
    pub fn zoom_around(&mut self, delta: f64, anchor: [f64; 2]) {
        self.cancel_transition();
        let before = self.viewport().unproject(anchor);
        self.view.zoom = (self.view.zoom + delta).clamp(self.view.min_zoom, self.view.max_zoom);
        let vp = self.viewport();
        if let (Some(a), Some(b)) = (before, vp.unproject(anchor)) {
            self.set_center_world([vp.center[0] + a[0] - b[0], vp.center[1] + a[1] - b[1]]);
        }
    }

    pub fn zoom_by(&mut self, delta: f64) {
        let mid = [self.size[0] * 0.5, self.size[1] * 0.5];
        self.zoom_around(delta, mid);
    }

    pub fn rotate(&mut self, d_bearing: f64, d_pitch: f64) {
        self.cancel_transition();
        self.view.bearing += d_bearing;
        self.view.pitch = (self.view.pitch + d_pitch).clamp(0.0, MAX_PITCH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pedriza() -> LocationRecord {
        LocationRecord {
            coordinates: (-3.88, 40.75),
            value: 12.0,
            name: "Pedriza".into(),
        }
    }

    #[test]
    fn reset_always_lands_on_default() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut cam = Camera::default();
        cam.fly_to(&pedriza(), 0.0, &mut rng);
        cam.tick(4000.0);
        cam.rotate(33.0, -10.0);
        cam.zoom_by(2.0);
        cam.reset(10_000.0);
        assert!(cam.is_transitioning());
        assert!(!cam.tick(14_000.0));
        assert_eq!(cam.view, CameraState::initial());
    }

    #[test]
    fn fly_to_targets_record() {
        let mut rng = StdRng::seed_from_u64(1);
        let target = CameraState::fly_to_target(&pedriza(), &mut rng);
        assert_eq!(target.longitude, -3.88);
        assert_eq!(target.latitude, 40.75);
        assert_eq!(target.zoom, FLY_TO_ZOOM);
        assert_eq!(target.pitch, 40.5);
        assert_eq!(target.transition_duration_ms, 4000.0);
    }

    #[test]
    fn fly_to_bearing_covers_inclusive_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..50_000 {
            let b = CameraState::fly_to_target(&pedriza(), &mut rng).bearing;
            assert!((-120.0..=240.0).contains(&b));
            assert_eq!(b.fract(), 0.0);
            seen_min |= b == -120.0;
            seen_max |= b == 240.0;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = Camera::default();
        cam.zoom_by(100.0);
        assert_eq!(cam.view.zoom, 15.0);
        cam.zoom_by(-100.0);
        assert_eq!(cam.view.zoom, 2.0);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut cam = Camera::default();
        cam.size = [800.0, 600.0];
        let anchor = [200.0, 450.0];
        let before = cam.viewport().unproject(anchor).unwrap();
        cam.zoom_around(1.5, anchor);
        let after = cam.viewport().unproject(anchor).unwrap();
        assert_abs_diff_eq!(before[0], after[0], epsilon = 1e-9);
        assert_abs_diff_eq!(before[1], after[1], epsilon = 1e-9);
    }

    #[test]
    fn pan_moves_ground_with_cursor() {
        let mut cam = Camera::default();
        cam.size = [800.0, 600.0];
        let grabbed = cam.viewport().unproject([300.0, 400.0]).unwrap();
        cam.pan([300.0, 400.0], [350.0, 380.0]);
        let now_under = cam.viewport().unproject([350.0, 380.0]).unwrap();
        assert_abs_diff_eq!(grabbed[0], now_under[0], epsilon = 1e-9);
        assert_abs_diff_eq!(grabbed[1], now_under[1], epsilon = 1e-9);
    }

    #[test]
    fn interaction_cancels_transition() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut cam = Camera::default();
        cam.fly_to(&pedriza(), 0.0, &mut rng);
        assert!(cam.is_transitioning());
        cam.rotate(0.0, 5.0);
        assert!(!cam.is_transitioning());
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = Camera::default();
        cam.rotate(0.0, 90.0);
        assert_eq!(cam.view.pitch, MAX_PITCH);
        cam.rotate(0.0, -180.0);
        assert_eq!(cam.view.pitch, 0.0);
    }
}
