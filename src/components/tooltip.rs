use crate::render::StyledBin;
use yew::prelude::*;

const CURSOR_OFFSET_PX: f64 = 12.0;

/// What the hovered hexagon shows, and where.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverInfo {
    pub name: String,
    pub count: f64,
    pub x: f64,
    pub y: f64,
}

impl HoverInfo {
    pub fn from_bin(bin: &StyledBin, x: f64, y: f64) -> Self {
        Self {
            name: bin.name.clone(),
            count: bin.elevation_value,
            x,
            y,
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct TooltipProps {
    pub info: HoverInfo,
}

#[function_component(Tooltip)]
pub fn tooltip(props: &TooltipProps) -> Html {
    let info = &props.info;
    let style = format!(
        "position:absolute; left:{}px; top:{}px; pointer-events:none; z-index:30; \
         background:#f3f3f3; color:#111; font-size:0.8em; padding:6px 10px; \
         border-radius:4px; box-shadow:0 2px 6px rgba(0,0,0,0.4);",
        info.x + CURSOR_OFFSET_PX,
        info.y + CURSOR_OFFSET_PX
    );
    html! {
        <div style={style}>
            <h2 style="margin:0 0 4px 0;">{ info.name.clone() }</h2>
            <div><p style="margin:0;"><b>{ info.count.to_string() }</b>{ " Vías" }</p></div>
        </div>
    }
}
