use super::map_view::{CameraHandle, MapView};
use super::side_panel::SidePanel;
use super::title::Title;
use crate::config::{
    MapConfig, DATA_URL, DEFAULT_COVERAGE, DEFAULT_RADIUS, DEFAULT_UPPER_PERCENTILE, MAP_STYLE,
};
use crate::loader::fetch_dataset;
use crate::model::{Dataset, DatasetAction, LocationRecord};
use crate::state::Camera;
use crate::util::now_ms;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

fn default_map_style() -> String {
    MAP_STYLE.to_string()
}

#[derive(Properties, PartialEq, Clone)]
pub struct AppProps {
    #[prop_or_else(default_map_style)]
    pub map_style: String,
    /// Hexagon radius in meters.
    #[prop_or(DEFAULT_RADIUS)]
    pub radius: f64,
    #[prop_or(DEFAULT_UPPER_PERCENTILE)]
    pub upper_percentile: f64,
    #[prop_or(DEFAULT_COVERAGE)]
    pub coverage: f64,
}

impl Default for AppProps {
    fn default() -> Self {
        let cfg = MapConfig::default();
        Self {
            map_style: cfg.map_style,
            radius: cfg.radius,
            upper_percentile: cfg.upper_percentile,
            coverage: cfg.coverage,
        }
    }
}

impl AppProps {
    fn map_config(&self) -> MapConfig {
        MapConfig {
            map_style: self.map_style.clone(),
            radius: self.radius,
            upper_percentile: self.upper_percentile,
            coverage: self.coverage,
        }
    }
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let dataset = use_reducer(Dataset::default);
    let camera = use_mut_ref(Camera::default);

    // One-shot dataset fetch; the map stays empty until it lands
    {
        let dataset = dataset.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match fetch_dataset(DATA_URL).await {
                    Ok(records) => dataset.dispatch(DatasetAction::Loaded(records)),
                    Err(err) => tracing::warn!(%err, "climbing areas unavailable"),
                }
            });
            || ()
        });
    }

    let on_reset = {
        let camera = camera.clone();
        Callback::from(move |_: ()| camera.borrow_mut().reset(now_ms()))
    };
    let on_select = {
        let camera = camera.clone();
        Callback::from(move |record: LocationRecord| {
            camera
                .borrow_mut()
                .fly_to(&record, now_ms(), &mut rand::thread_rng());
        })
    };
    let on_search = {
        let dataset = dataset.clone();
        Callback::from(move |query: String| dataset.dispatch(DatasetAction::Filter(query)))
    };

    html! {
        <div style="position:relative; width:100vw; height:100vh; overflow:hidden; background:#0e0e0e;">
            <MapView
                records={dataset.displayed.clone()}
                camera={CameraHandle(camera.clone())}
                config={props.map_config()}
            />
            <Title />
            <SidePanel
                info={dataset.info.clone()}
                records={dataset.displayed.clone()}
                {on_reset}
                {on_search}
                {on_select}
            />
        </div>
    }
}
