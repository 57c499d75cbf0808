pub mod camera;
pub mod touch;
pub mod transition;

pub use camera::{Camera, CameraState};
pub use touch::{DragState, TouchState};
pub use transition::Tween;
