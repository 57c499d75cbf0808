// Canvas 2D drawing of the basemap backdrop and extruded hexagons.

use glam::DVec3;
use web_sys::CanvasRenderingContext2d;

use crate::config::Rgb;
use crate::geo::{world_to_lng_lat, MAX_LATITUDE};

use super::hexbin::HexGrid;
use super::layer::HexagonLayer;
use super::lighting::SceneLights;
use super::picking::PickBuffer;
use super::Viewport;

/// Off-screen slack before a prism is culled, in pixels.
const CULL_MARGIN: f64 = 64.0;
const GRATICULE_COLOR: &str = "rgba(255,255,255,0.06)";

#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub polygon: Vec<[f64; 2]>,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prism {
    pub bin: usize,
    pub depth: f64,
    /// Visible sides first, top last.
    pub faces: Vec<Face>,
}

fn project_all(viewport: &Viewport, pts: &[DVec3]) -> Option<Vec<[f64; 2]>> {
    pts.iter().map(|p| viewport.project_local(*p)).collect()
}

fn on_screen(viewport: &Viewport, poly: &[[f64; 2]]) -> bool {
    let (w, h) = (viewport.width, viewport.height);
    let min_x = poly.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
    let max_x = poly.iter().map(|p| p[0]).fold(f64::NEG_INFINITY, f64::max);
    let min_y = poly.iter().map(|p| p[1]).fold(f64::INFINITY, f64::min);
    let max_y = poly.iter().map(|p| p[1]).fold(f64::NEG_INFINITY, f64::max);
    max_x >= -CULL_MARGIN && min_x <= w + CULL_MARGIN && max_y >= -CULL_MARGIN && min_y <= h + CULL_MARGIN
}

/// Project, cull, shade and depth-sort every bin; far prisms come first.
pub fn build_prisms(
    layer: &HexagonLayer,
    viewport: &Viewport,
    lights: &SceneLights,
    elevation_scale: f64,
) -> Vec<Prism> {
    let radius = layer.hex_radius();
    let eye = viewport.camera_position();
    let mut prisms = Vec::with_capacity(layer.bins().len());

    for (idx, bin) in layer.bins().iter().enumerate() {
        let height = (bin.elevation * elevation_scale).max(0.0);
        let corners = HexGrid::vertices(bin.center, radius);
        let bottom: Vec<DVec3> = corners.iter().map(|c| viewport.to_local(*c, 0.0)).collect();
        let top: Vec<DVec3> = corners.iter().map(|c| viewport.to_local(*c, height)).collect();
        let center = viewport.to_local(bin.center, 0.0);
        let top_center = viewport.to_local(bin.center, height);

        let Some(top_screen) = project_all(viewport, &top) else {
            continue;
        };
        let Some(bottom_screen) = project_all(viewport, &bottom) else {
            continue;
        };
        if !on_screen(viewport, &top_screen) && !on_screen(viewport, &bottom_screen) {
            continue;
        }

        let mut faces = Vec::with_capacity(4);
        if top_center.z - center.z > 0.5 {
            for k in 0..6 {
                let k2 = (k + 1) % 6;
                let edge = (bottom[k] + bottom[k2]) * 0.5;
                let mid = DVec3::new(edge.x, edge.y, top_center.z * 0.5);
                let normal = DVec3::new(mid.x - center.x, mid.y - center.y, 0.0);
                if normal.dot(eye - mid) <= 0.0 {
                    continue;
                }
                faces.push(Face {
                    polygon: vec![bottom_screen[k], bottom_screen[k2], top_screen[k2], top_screen[k]],
                    color: lights.shade(bin.color, mid, normal),
                });
            }
        }
        faces.push(Face {
            polygon: top_screen,
            color: lights.shade(bin.color, top_center, DVec3::Z),
        });

        let mid_height = DVec3::new(center.x, center.y, top_center.z * 0.5);
        prisms.push(Prism {
            bin: idx,
            depth: viewport.depth(mid_height),
            faces,
        });
    }

    prisms.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    prisms
}

fn css(c: Rgb) -> String {
    format!("rgb({},{},{})", c[0], c[1], c[2])
}

fn fill_polygon(ctx: &CanvasRenderingContext2d, poly: &[[f64; 2]]) {
    let Some(first) = poly.first() else {
        return;
    };
    ctx.begin_path();
    ctx.move_to(first[0], first[1]);
    for p in &poly[1..] {
        ctx.line_to(p[0], p[1]);
    }
    ctx.close_path();
    ctx.fill();
}

/// Faint lines of longitude/latitude so the map reads as a map without tiles.
fn draw_graticule(ctx: &CanvasRenderingContext2d, viewport: &Viewport) {
    let [x0, y0, x1, y1] = viewport.ground_bounds();
    let (lng0, lat1) = world_to_lng_lat([x0, y0]);
    let (lng1, lat0) = world_to_lng_lat([x1, y1]);
    let lng0 = lng0.max(-180.0);
    let lng1 = lng1.min(180.0);
    let lat0 = lat0.max(-MAX_LATITUDE);
    let lat1 = lat1.min(MAX_LATITUDE);
    if !(lng0 < lng1 && lat0 < lat1) {
        return;
    }
    let step = if lng1 - lng0 > 60.0 { 10.0 } else { 1.0 };
    let sample = step / 8.0;

    ctx.set_stroke_style_str(GRATICULE_COLOR);
    ctx.set_line_width(1.0);
    let stroke_line = |pts: &mut dyn Iterator<Item = Option<[f64; 2]>>| {
        let mut started = false;
        ctx.begin_path();
        for p in pts {
            match p {
                Some([x, y]) if started => ctx.line_to(x, y),
                Some([x, y]) => {
                    ctx.move_to(x, y);
                    started = true;
                }
                None => started = false,
            }
        }
        ctx.stroke();
    };

    let mut lng = (lng0 / step).floor() * step;
    while lng <= lng1 {
        let n = ((lat1 - lat0) / sample).ceil() as usize;
        stroke_line(&mut (0..=n).map(|i| viewport.project_lng_lat(lng, lat0 + i as f64 * sample)));
        lng += step;
    }
    let mut lat = (lat0 / step).floor() * step;
    while lat <= lat1 {
        let n = ((lng1 - lng0) / sample).ceil() as usize;
        stroke_line(&mut (0..=n).map(|i| viewport.project_lng_lat(lng0 + i as f64 * sample, lat)));
        lat += step;
    }
}

pub fn paint(
    ctx: &CanvasRenderingContext2d,
    viewport: &Viewport,
    background: &str,
    prisms: &[Prism],
    picks: &mut PickBuffer,
) {
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
    ctx.set_fill_style_str(background);
    ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);
    draw_graticule(ctx, viewport);

    picks.clear();
    for prism in prisms {
        for face in &prism.faces {
            ctx.set_fill_style_str(&css(face.color));
            fill_polygon(ctx, &face.polygon);
            picks.push(prism.bin, face.polygon.clone());
        }
    }
}
