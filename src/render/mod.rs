// Heatmap rendering: hexagon aggregation, projection, lighting and canvas drawing.
//
// The rest of the app only hands this module a record slice, a camera state
// and an elevation scale; it never reaches into binning or projection.

pub mod hexbin;
pub mod layer;
pub mod lighting;
pub mod painter;
pub mod picking;
pub mod scale;
pub mod viewport;

pub use layer::{HexagonLayer, StyledBin};
pub use viewport::Viewport;

use web_sys::CanvasRenderingContext2d;

use crate::config::{HexagonLayerConfig, LightingEffect, DEFAULT_BACKGROUND};
use crate::model::LocationRecord;

use lighting::SceneLights;
use picking::PickBuffer;

pub struct Renderer {
    layer: HexagonLayer,
    lighting: LightingEffect,
    background: String,
    picks: PickBuffer,
}

impl Renderer {
    pub fn new(layer: HexagonLayerConfig, lighting: LightingEffect) -> Self {
        Self {
            layer: HexagonLayer::new(layer),
            lighting,
            background: DEFAULT_BACKGROUND.to_string(),
            picks: PickBuffer::default(),
        }
    }

    pub fn set_data(&mut self, records: &[LocationRecord]) {
        self.layer.set_data(records);
        self.picks.clear();
    }

    pub fn set_background(&mut self, color: String) {
        self.background = color;
    }

    pub fn render(&mut self, ctx: &CanvasRenderingContext2d, viewport: &Viewport, elevation_scale: f64) {
        let lights = SceneLights::new(&self.lighting, self.layer.config().material, viewport);
        let prisms = painter::build_prisms(&self.layer, viewport, &lights, elevation_scale);
        painter::paint(ctx, viewport, &self.background, &prisms, &mut self.picks);
    }

    /// Bin drawn topmost at screen point `p` in the last frame.
    pub fn pick(&self, p: [f64; 2]) -> Option<&StyledBin> {
        self.picks.pick(p).and_then(|i| self.layer.bins().get(i))
    }
}
