// Perspective web-mercator viewport.
//
// Points live in a local pixel frame centered on the camera target (x east,
// y south, z up), are rotated by the bearing and then seen by a pinhole camera
// tilted by the pitch, ALTITUDE viewport heights above the target.

use glam::{DMat3, DVec3};

use crate::geo::{lng_lat_to_world, units_per_meter, zoom_to_scale, TILE_SIZE};
use crate::state::CameraState;

pub const ALTITUDE: f64 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub center: [f64; 2],
    pub scale: f64,
    /// Pixels per meter at the center latitude.
    pub pixels_per_meter: f64,
    rotation: DMat3,
    eye: DVec3,
    forward: DVec3,
    up: DVec3,
    distance: f64,
}

impl Viewport {
    pub fn new(view: &CameraState, width: f64, height: f64) -> Self {
        let scale = zoom_to_scale(view.zoom);
        let distance = ALTITUDE * height.max(1.0);
        let (s, c) = view.pitch.to_radians().sin_cos();
        Self {
            width,
            height,
            center: lng_lat_to_world(view.longitude, view.latitude),
            scale,
            pixels_per_meter: units_per_meter(view.latitude) * scale,
            rotation: DMat3::from_rotation_z(-view.bearing.to_radians()),
            eye: DVec3::new(0.0, distance * s, distance * c),
            forward: DVec3::new(0.0, -s, -c),
            up: DVec3::new(0.0, -c, s),
            distance,
        }
    }

    pub fn to_local(&self, world: [f64; 2], z_meters: f64) -> DVec3 {
        DVec3::new(
            (world[0] - self.center[0]) * self.scale,
            (world[1] - self.center[1]) * self.scale,
            z_meters * self.pixels_per_meter,
        )
    }

    pub fn camera_position(&self) -> DVec3 {
        self.rotation.transpose() * self.eye
    }

    /// Distance along the view axis; larger is farther away.
    pub fn depth(&self, local: DVec3) -> f64 {
        (self.rotation * local - self.eye).dot(self.forward)
    }

    pub fn project_local(&self, local: DVec3) -> Option<[f64; 2]> {
        let v = self.rotation * local - self.eye;
        let depth = v.dot(self.forward);
        if depth <= self.distance * 1e-3 {
            return None;
        }
        let x = self.width * 0.5 + self.distance * v.x / depth;
        let y = self.height * 0.5 - self.distance * v.dot(self.up) / depth;
        Some([x, y])
    }

    pub fn project(&self, world: [f64; 2], z_meters: f64) -> Option<[f64; 2]> {
        self.project_local(self.to_local(world, z_meters))
    }

    pub fn project_lng_lat(&self, lng: f64, lat: f64) -> Option<[f64; 2]> {
        self.project(lng_lat_to_world(lng, lat), 0.0)
    }

    /// Ground-plane world point under a screen pixel, if the ray hits the ground.
    pub fn unproject(&self, screen: [f64; 2]) -> Option<[f64; 2]> {
        let a = (screen[0] - self.width * 0.5) / self.distance;
        let b = -(screen[1] - self.height * 0.5) / self.distance;
        let dir = DVec3::X * a + self.forward + self.up * b;
        if dir.z >= -1e-9 {
            return None;
        }
        let hit = self.eye + dir * (-self.eye.z / dir.z);
        let local = self.rotation.transpose() * DVec3::new(hit.x, hit.y, 0.0);
        Some([
            self.center[0] + local.x / self.scale,
            self.center[1] + local.y / self.scale,
        ])
    }

    /// Approximate visible world bounds at ground level: `[min_x, min_y, max_x, max_y]`.
    pub fn ground_bounds(&self) -> [f64; 4] {
        let corners = [
            [0.0, 0.0],
            [self.width, 0.0],
            [0.0, self.height],
            [self.width, self.height],
            [0.0, self.height * 0.5],
            [self.width, self.height * 0.5],
        ];
        let mut b = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
        // Corners above the horizon miss the ground; fall back to a wide span.
        let span = TILE_SIZE / self.scale * 4.0;
        for c in corners {
            let p = self.unproject(c).unwrap_or([
                self.center[0] + span * (c[0] / self.width - 0.5) * 2.0,
                self.center[1] - span,
            ]);
            b[0] = b[0].min(p[0]);
            b[1] = b[1].min(p[1]);
            b[2] = b[2].max(p[0]);
            b[3] = b[3].max(p[1]);
        }
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn view(pitch: f64, bearing: f64) -> CameraState {
        CameraState {
            pitch,
            bearing,
            ..CameraState::initial()
        }
    }

    #[test]
    fn center_projects_to_middle() {
        for (p, b) in [(0.0, 0.0), (40.5, -45.0), (60.0, 200.0)] {
            let v = Viewport::new(&view(p, b), 800.0, 600.0);
            let [x, y] = v.project(v.center, 0.0).unwrap();
            assert_abs_diff_eq!(x, 400.0, epsilon = 1e-6);
            assert_abs_diff_eq!(y, 300.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn top_down_is_plain_scaling() {
        let v = Viewport::new(&view(0.0, 0.0), 800.0, 600.0);
        let p = v.project([v.center[0] + 10.0 / v.scale, v.center[1] + 5.0 / v.scale], 0.0);
        let [x, y] = p.unwrap();
        assert_abs_diff_eq!(x, 410.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y, 305.0, epsilon = 1e-6);
    }

    #[test]
    fn bearing_ninety_puts_east_up() {
        let v = Viewport::new(&view(0.0, 90.0), 800.0, 600.0);
        let [x, y] = v.project([v.center[0] + 20.0 / v.scale, v.center[1]], 0.0).unwrap();
        assert_abs_diff_eq!(x, 400.0, epsilon = 1e-6);
        assert!(y < 300.0);
    }

    #[test]
    fn unproject_inverts_project_on_ground() {
        let v = Viewport::new(&view(40.5, -45.0), 1024.0, 768.0);
        for screen in [[100.0, 700.0], [512.0, 384.0], [900.0, 300.0]] {
            let world = v.unproject(screen).unwrap();
            let back = v.project(world, 0.0).unwrap();
            assert_abs_diff_eq!(back[0], screen[0], epsilon = 1e-6);
            assert_abs_diff_eq!(back[1], screen[1], epsilon = 1e-6);
        }
    }

    #[test]
    fn elevation_lifts_points_on_screen() {
        let v = Viewport::new(&view(40.5, 0.0), 800.0, 600.0);
        let ground = v.project(v.center, 0.0).unwrap();
        let raised = v.project(v.center, 10_000.0).unwrap();
        assert!(raised[1] < ground[1]);
    }

    #[test]
    fn camera_sits_behind_the_target_against_the_bearing() {
        // Looking east, the camera hangs back to the west of the target.
        let v = Viewport::new(&view(45.0, 90.0), 800.0, 600.0);
        let eye = v.camera_position();
        assert!(eye.x < 0.0);
        assert_abs_diff_eq!(eye.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(eye.length(), ALTITUDE * 600.0, epsilon = 1e-6);
    }

    #[test]
    fn far_points_are_deeper() {
        let v = Viewport::new(&view(40.5, 0.0), 800.0, 600.0);
        let near = v.depth(v.to_local([v.center[0], v.center[1] + 1.0], 0.0));
        let far = v.depth(v.to_local([v.center[0], v.center[1] - 1.0], 0.0));
        assert!(far > near);
    }
}
