use crate::model::{LocationRecord, RecordList};
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct SidePanelProps {
    pub info: String,
    pub records: RecordList,
    pub on_reset: Callback<()>,
    pub on_search: Callback<String>,
    pub on_select: Callback<LocationRecord>,
}

// Reset control, search box, result count and the clickable list of areas
#[function_component(SidePanel)]
pub fn side_panel(props: &SidePanelProps) -> Html {
    let on_reset_click = {
        let cb = props.on_reset.clone();
        Callback::from(move |_e: MouseEvent| cb.emit(()))
    };
    let on_input = {
        let cb = props.on_search.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            cb.emit(input.value());
        })
    };

    html! {
        <div style="position:absolute; top:12px; left:12px; bottom:12px; width:260px; z-index:20; \
                    display:flex; flex-direction:column; gap:6px; padding:10px; overflow-y:auto; \
                    background:rgba(20,20,24,0.85); color:#ddd; font-family:sans-serif; \
                    font-size:13px; border-radius:6px;">
            <div
                style="cursor:pointer; padding:6px 8px; text-align:center; background:#333; border-radius:4px;"
                onclick={on_reset_click}
            >
                { "Reset position" }
            </div>
            <div>
                <input
                    type="text"
                    placeholder="Search climb area"
                    oninput={on_input}
                    style="width:100%; box-sizing:border-box; padding:6px 8px; border-radius:4px; \
                           border:1px solid #555; background:#1a1a1a; color:#eee;"
                />
            </div>
            <div style="opacity:0.75; padding:2px 4px;">{ props.info.clone() }</div>
            { for props.records.iter().enumerate().map(|(index, record)| {
                let on_select = props.on_select.clone();
                let picked = record.clone();
                let onclick = Callback::from(move |_e: MouseEvent| on_select.emit(picked.clone()));
                html! {
                    <div key={index} style="cursor:pointer; padding:4px 6px; border-bottom:1px solid #2a2a2a;" {onclick}>
                        { record.name.clone() }
                    </div>
                }
            }) }
        </div>
    }
}
