// Blinn-Phong face shading from the configured lights and material.

use glam::DVec3;

use crate::config::{LightingEffect, Material, Rgb};
use crate::geo::lng_lat_to_world;

use super::Viewport;

#[derive(Debug, Clone)]
pub struct SceneLights {
    ambient: DVec3,
    /// (position, color * intensity)
    points: Vec<(DVec3, DVec3)>,
    eye: DVec3,
    material: Material,
}

fn scaled(color: Rgb, intensity: f64) -> DVec3 {
    DVec3::new(color[0] as f64, color[1] as f64, color[2] as f64) / 255.0 * intensity
}

impl SceneLights {
    pub fn new(effect: &LightingEffect, material: Material, viewport: &Viewport) -> Self {
        let points = effect
            .point_lights
            .iter()
            .map(|l| {
                let world = lng_lat_to_world(l.position[0], l.position[1]);
                (viewport.to_local(world, l.position[2]), scaled(l.color, l.intensity))
            })
            .collect();
        Self {
            ambient: scaled(effect.ambient.color, effect.ambient.intensity),
            points,
            eye: viewport.camera_position(),
            material,
        }
    }

    /// Lit color of a face with outward `normal`, centered at `pos` (local frame).
    pub fn shade(&self, base: Rgb, pos: DVec3, normal: DVec3) -> Rgb {
        let n = normal.normalize_or_zero();
        let surface = scaled(base, 1.0);
        let view = (self.eye - pos).normalize_or_zero();
        let m = &self.material;
        let spec_color = scaled(m.specular_color, 1.0);

        let mut out = m.ambient * surface * self.ambient;
        for (light_pos, light_color) in &self.points {
            let l = (*light_pos - pos).normalize_or_zero();
            let lambert = n.dot(l).max(0.0);
            let specular = if lambert > 0.0 {
                n.dot((l + view).normalize_or_zero()).max(0.0).powf(m.shininess)
            } else {
                0.0
            };
            out += (lambert * m.diffuse * surface + specular * spec_color) * *light_color;
        }
        let c = (out.clamp(DVec3::ZERO, DVec3::ONE) * 255.0).round();
        [c.x as u8, c.y as u8, c.z as u8]
    }
}
