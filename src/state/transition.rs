// Camera and layer animations driven by the frame loop.

use crate::geo::{lng_lat_to_world, scale_to_zoom, world_to_lng_lat, zoom_to_scale};

use super::camera::CameraState;

/// Curvature of the zoom-out/zoom-in path (van Wijk & Nuij).
const RHO: f64 = 1.414;
/// Below this on-screen travel the path degenerates to a linear move.
const EPSILON: f64 = 0.01;

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Camera state at fraction `t` of an optimal fly-to path from `start` to `end`.
///
/// `size` is the viewport in pixels; the path zooms out proportionally to the
/// distance travelled relative to the larger viewport dimension.
pub fn fly_to_interpolate(
    start: &CameraState,
    end: &CameraState,
    t: f64,
    size: [f64; 2],
) -> CameraState {
    let t = t.clamp(0.0, 1.0);
    let mut out = CameraState {
        pitch: lerp(start.pitch, end.pitch, t),
        bearing: lerp(start.bearing, end.bearing, t),
        min_zoom: end.min_zoom,
        max_zoom: end.max_zoom,
        transition_duration_ms: end.transition_duration_ms,
        ..*start
    };
    if t >= 1.0 {
        return *end;
    }

    let start_xy = lng_lat_to_world(start.longitude, start.latitude);
    let end_xy = lng_lat_to_world(end.longitude, end.latitude);
    let delta = [end_xy[0] - start_xy[0], end_xy[1] - start_xy[1]];
    let start_scale = zoom_to_scale(start.zoom);
    let w0 = size[0].max(size[1]).max(1.0);
    let w1 = w0 / zoom_to_scale(end.zoom - start.zoom);
    let u1 = (delta[0] * delta[0] + delta[1] * delta[1]).sqrt() * start_scale;

    if u1 < EPSILON {
        out.zoom = lerp(start.zoom, end.zoom, t);
        let (lng, lat) = world_to_lng_lat([
            start_xy[0] + delta[0] * t,
            start_xy[1] + delta[1] * t,
        ]);
        out.longitude = lng;
        out.latitude = lat;
        return out;
    }

    let rho2 = RHO * RHO;
    let b0 = (w1 * w1 - w0 * w0 + rho2 * rho2 * u1 * u1) / (2.0 * w0 * rho2 * u1);
    let b1 = (w1 * w1 - w0 * w0 - rho2 * rho2 * u1 * u1) / (2.0 * w1 * rho2 * u1);
    let r0 = ((b0 * b0 + 1.0).sqrt() - b0).ln();
    let r1 = ((b1 * b1 + 1.0).sqrt() - b1).ln();
    let total = (r1 - r0) / RHO;
    let s = t * total;

    let w = r0.cosh() / (r0 + RHO * s).cosh();
    let u = w0 * ((r0.cosh() * (r0 + RHO * s).tanh() - r0.sinh()) / rho2) / u1;

    out.zoom = start.zoom + scale_to_zoom(1.0 / w);
    let (lng, lat) = world_to_lng_lat([start_xy[0] + delta[0] * u, start_xy[1] + delta[1] * u]);
    out.longitude = lng;
    out.latitude = lat;
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub start: CameraState,
    pub end: CameraState,
    pub start_ms: f64,
    pub duration_ms: f64,
    size: [f64; 2],
}

impl Transition {
    pub fn new(start: CameraState, end: CameraState, now_ms: f64, size: [f64; 2]) -> Self {
        Self {
            start,
            end,
            start_ms: now_ms,
            duration_ms: end.transition_duration_ms,
            size,
        }
    }

    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn sample(&self, now_ms: f64) -> (CameraState, bool) {
        let t = self.progress(now_ms);
        (fly_to_interpolate(&self.start, &self.end, t, self.size), t >= 1.0)
    }
}

/// Linear tween of a single scalar, used for the elevation grow-in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    start_ms: f64,
    duration_ms: f64,
}

impl Tween {
    pub fn settled(value: f64) -> Self {
        Self {
            from: value,
            to: value,
            start_ms: 0.0,
            duration_ms: 0.0,
        }
    }

    pub fn value(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return self.to;
        }
        let t = ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0);
        lerp(self.from, self.to, t)
    }

    /// Start moving toward `to` from wherever the tween currently is.
    pub fn retarget(&mut self, to: f64, now_ms: f64, duration_ms: f64) {
        if to == self.to {
            return;
        }
        self.from = self.value(now_ms);
        self.to = to;
        self.start_ms = now_ms;
        self.duration_ms = duration_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn target() -> CameraState {
        CameraState {
            longitude: 2.17,
            latitude: 41.38,
            zoom: 11.8,
            bearing: 120.0,
            ..CameraState::initial()
        }
    }

    #[test]
    fn endpoints_are_exact() {
        let start = CameraState::initial();
        let end = target();
        let first = fly_to_interpolate(&start, &end, 0.0, [1280.0, 720.0]);
        assert_abs_diff_eq!(first.longitude, start.longitude, epsilon = 1e-9);
        assert_abs_diff_eq!(first.latitude, start.latitude, epsilon = 1e-9);
        assert_abs_diff_eq!(first.zoom, start.zoom, epsilon = 1e-9);
        assert_eq!(fly_to_interpolate(&start, &end, 1.0, [1280.0, 720.0]), end);
    }

    #[test]
    fn long_flights_zoom_out_midway() {
        let start = CameraState {
            zoom: 11.8,
            ..CameraState::initial()
        };
        let mid = fly_to_interpolate(&start, &target(), 0.5, [1280.0, 720.0]);
        assert!(mid.zoom < 11.8);
        assert!(mid.longitude > start.longitude && mid.longitude < 2.17);
    }

    #[test]
    fn stationary_flight_interpolates_zoom_linearly() {
        let start = CameraState::initial();
        let end = CameraState {
            zoom: 7.8,
            ..start
        };
        let mid = fly_to_interpolate(&start, &end, 0.5, [800.0, 600.0]);
        assert_abs_diff_eq!(mid.zoom, 6.8, epsilon = 1e-9);
        assert_abs_diff_eq!(mid.longitude, start.longitude, epsilon = 1e-9);
    }

    #[test]
    fn transition_finishes_after_duration() {
        let tr = Transition::new(CameraState::initial(), target(), 1000.0, [800.0, 600.0]);
        let (_, done) = tr.sample(3000.0);
        assert!(!done);
        let (view, done) = tr.sample(5000.0);
        assert!(done);
        assert_eq!(view, target());
    }

    #[test]
    fn tween_retargets_from_current_value() {
        let mut tw = Tween::settled(0.0);
        tw.retarget(50.0, 0.0, 5000.0);
        assert_abs_diff_eq!(tw.value(2500.0), 25.0, epsilon = 1e-9);
        tw.retarget(0.0, 2500.0, 5000.0);
        assert_abs_diff_eq!(tw.value(2500.0), 25.0, epsilon = 1e-9);
        assert_abs_diff_eq!(tw.value(7500.0), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(tw.value(20_000.0), 0.0, epsilon = 1e-9);
    }
}
