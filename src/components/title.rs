use yew::prelude::*;

#[function_component(Title)]
pub fn title() -> Html {
    html! {
        <div style="position:absolute; top:12px; right:24px; z-index:20; pointer-events:none; \
                    color:#f3f3f3; font-family:sans-serif; text-shadow:0 1px 4px rgba(0,0,0,0.8);">
            <h1 style="margin:0; font-size:1.6em; font-weight:600;">{ "Spanish Climb Areas" }</h1>
        </div>
    }
}
