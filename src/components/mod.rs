pub mod app;
pub mod map_view;
pub mod side_panel;
pub mod title;
pub mod tooltip;
