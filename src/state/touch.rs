// Pointer/touch gesture state for the map canvas
#[derive(Default, Debug, Clone)]
pub struct DragState {
    pub active: bool,
    /// Rotating (right button or modifier) instead of panning.
    pub rotating: bool,
    pub last_x: f64,
    pub last_y: f64,
}

#[derive(Default, Debug, Clone)]
pub struct TouchState {
    pub single_active: bool,
    pub pinch: bool,
    pub start_pinch_dist: f64,
    pub start_zoom: f64,
    pub last_touch_x: f64,
    pub last_touch_y: f64,
}

impl TouchState {
    pub fn pinch_zoom(&self, dist: f64) -> f64 {
        if self.start_pinch_dist <= 0.0 || dist <= 0.0 {
            return self.start_zoom;
        }
        self.start_zoom + (dist / self.start_pinch_dist).log2()
    }
}
