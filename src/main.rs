mod components;
mod config;
mod error;
mod geo;
mod loader;
mod model;
mod render;
mod state;
mod util;

use components::app::{App, AppProps};

fn main() {
    console_error_panic_hook::set_once();
    #[cfg(target_family = "wasm")]
    tracing_wasm::set_as_global_default();
    yew::Renderer::<App>::with_props(AppProps::default()).render();
}
