use crate::config::{
    HexagonLayerConfig, LightingEffect, MapConfig, ELEVATION_SCALE, ELEVATION_SCALE_TRANSITION_MS,
};
use crate::loader::fetch_basemap_background;
use crate::model::RecordList;
use crate::render::Renderer;
use crate::state::{Camera, DragState, TouchState, Tween};
use crate::util::now_ms;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlInputElement, TouchEvent};
use yew::prelude::*;

use super::tooltip::{HoverInfo, Tooltip};

const KEY_PAN_PX: f64 = 100.0;
const WHEEL_ZOOM_RATE: f64 = 0.002;
const DRAG_BEARING_RATE: f64 = 0.3;
const DRAG_PITCH_RATE: f64 = 0.25;

/// Shared camera; equality is identity so handing it down never re-renders.
#[derive(Clone)]
pub struct CameraHandle(pub Rc<RefCell<Camera>>);

impl PartialEq for CameraHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Properties, PartialEq)]
pub struct MapViewProps {
    pub records: RecordList,
    pub camera: CameraHandle,
    pub config: MapConfig,
}

fn new_renderer(config: &MapConfig) -> Renderer {
    Renderer::new(
        HexagonLayerConfig::from_map_config(config),
        LightingEffect::default(),
    )
}

fn touch_point(canvas: &HtmlCanvasElement, t: &web_sys::Touch) -> [f64; 2] {
    let rect = canvas.get_bounding_client_rect();
    [
        t.client_x() as f64 - rect.left(),
        t.client_y() as f64 - rect.top(),
    ]
}

#[function_component(MapView)]
pub fn map_view(props: &MapViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let camera = props.camera.0.clone();
    let renderer = use_mut_ref(|| new_renderer(&props.config));
    let records_ref = use_mut_ref(|| props.records.clone());
    let elevation = use_mut_ref(|| Tween::settled(0.0));
    // Forces one redraw on the next frame.
    let dirty = use_mut_ref(|| true);
    let last_scale = use_mut_ref(|| f64::NAN);
    let drag = use_mut_ref(DragState::default);
    let touch_state = use_mut_ref(TouchState::default);
    let hover_ref = use_mut_ref(|| None::<HoverInfo>);
    let hover = use_state(|| None::<HoverInfo>);

    // Layer settings changed: rebuild the renderer around the current data
    {
        let renderer = renderer.clone();
        let records_ref = records_ref.clone();
        let dirty = dirty.clone();
        let hover_ref = hover_ref.clone();
        let hover = hover.clone();
        use_effect_with(props.config.clone(), move |config| {
            let mut r = new_renderer(config);
            r.set_data(&records_ref.borrow());
            *renderer.borrow_mut() = r;
            *hover_ref.borrow_mut() = None;
            hover.set(None);
            *dirty.borrow_mut() = true;
            || ()
        });
    }
    // Basemap style only contributes the background color
    {
        let renderer = renderer.clone();
        let dirty = dirty.clone();
        use_effect_with(props.config.map_style.clone(), move |url| {
            let url = url.clone();
            spawn_local(async move {
                match fetch_basemap_background(&url).await {
                    Ok(Some(color)) => {
                        tracing::debug!(%color, "basemap background");
                        renderer.borrow_mut().set_background(color);
                        *dirty.borrow_mut() = true;
                    }
                    Ok(None) => tracing::debug!("basemap style has no background layer"),
                    Err(err) => tracing::warn!(%err, "basemap style unavailable"),
                }
            });
            || ()
        });
    }
    // Displayed records changed: re-aggregate and grow the columns in
    {
        let renderer = renderer.clone();
        let records_ref = records_ref.clone();
        let elevation = elevation.clone();
        let dirty = dirty.clone();
        let hover_ref = hover_ref.clone();
        let hover = hover.clone();
        use_effect_with(props.records.clone(), move |records| {
            *records_ref.borrow_mut() = records.clone();
            renderer.borrow_mut().set_data(records);
            let target = if records.is_empty() {
                0.0
            } else {
                ELEVATION_SCALE
            };
            elevation
                .borrow_mut()
                .retarget(target, now_ms(), ELEVATION_SCALE_TRANSITION_MS);
            *hover_ref.borrow_mut() = None;
            hover.set(None);
            *dirty.borrow_mut() = true;
            || ()
        });
    }
    // Canvas setup, frame loop and input listeners
    {
        let canvas_ref = canvas_ref.clone();
        let camera = camera.clone();
        let renderer = renderer.clone();
        let elevation = elevation.clone();
        let dirty = dirty.clone();
        let last_scale = last_scale.clone();
        let drag = drag.clone();
        let touch_state = touch_state.clone();
        let hover_ref = hover_ref.clone();
        let hover = hover.clone();
        use_effect_with((), move |_| {
            let window = web_sys::window();
            let canvas = canvas_ref.cast::<HtmlCanvasElement>();
            let (Some(window), Some(canvas)) = (window, canvas) else {
                tracing::error!("map canvas unavailable");
                return Box::new(|| ()) as Box<dyn FnOnce()>;
            };

            let apply_canvas_size = {
                let canvas = canvas.clone();
                let window = window.clone();
                let camera = camera.clone();
                let dirty = dirty.clone();
                move || {
                    let width = window
                        .inner_width()
                        .ok()
                        .and_then(|v| v.as_f64())
                        .unwrap_or(800.0);
                    let height = window
                        .inner_height()
                        .ok()
                        .and_then(|v| v.as_f64())
                        .unwrap_or(600.0);
                    canvas.set_width(width.max(1.0) as u32);
                    canvas.set_height(height.max(1.0) as u32);
                    camera.borrow_mut().size = [width.max(1.0), height.max(1.0)];
                    *dirty.borrow_mut() = true;
                }
            };
            apply_canvas_size();

            // Draw only when something moved: input, a camera flight, or the elevation tween
            let draw: Rc<dyn Fn()> = {
                let canvas = canvas.clone();
                let camera = camera.clone();
                let renderer = renderer.clone();
                let elevation = elevation.clone();
                let dirty = dirty.clone();
                let last_scale = last_scale.clone();
                Rc::new(move || {
                    if !canvas.is_connected() {
                        return;
                    }
                    let Some(ctx) = canvas
                        .get_context("2d")
                        .ok()
                        .flatten()
                        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
                    else {
                        return;
                    };
                    let now = now_ms();
                    let mut cam = camera.borrow_mut();
                    let was_flying = cam.is_transitioning();
                    cam.tick(now);
                    let scale = elevation.borrow().value(now);
                    let scale_changed = *last_scale.borrow() != scale;
                    let mut d = dirty.borrow_mut();
                    if !(*d || was_flying || scale_changed) {
                        return;
                    }
                    *d = false;
                    *last_scale.borrow_mut() = scale;
                    let viewport = cam.viewport();
                    drop(cam);
                    renderer.borrow_mut().render(&ctx, &viewport, scale);
                })
            };

            let raf_id = Rc::new(RefCell::new(None));
            let closure_cell: Rc<RefCell<Option<Closure<dyn FnMut()>>>> =
                Rc::new(RefCell::new(None));
            {
                let raf_id_loop = raf_id.clone();
                let window_loop = window.clone();
                let closure_cell_loop = closure_cell.clone();
                let draw = draw.clone();
                *closure_cell.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                    draw();
                    if let Some(cb) = closure_cell_loop.borrow().as_ref() {
                        if let Ok(id) = window_loop.request_animation_frame(cb.as_ref().unchecked_ref())
                        {
                            *raf_id_loop.borrow_mut() = Some(id);
                        }
                    }
                }) as Box<dyn FnMut()>));
                if let Some(cb) = closure_cell.borrow().as_ref() {
                    if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        *raf_id.borrow_mut() = Some(id);
                    }
                }
            }

            let set_hover = {
                let hover_ref = hover_ref.clone();
                let hover = hover.clone();
                move |next: Option<HoverInfo>| {
                    if *hover_ref.borrow() != next {
                        *hover_ref.borrow_mut() = next.clone();
                        hover.set(next);
                    }
                }
            };

            // Wheel zoom around the cursor
            let wheel_cb = {
                let camera = camera.clone();
                let dirty = dirty.clone();
                Closure::wrap(Box::new(move |e: web_sys::WheelEvent| {
                    e.prevent_default();
                    let anchor = [e.offset_x() as f64, e.offset_y() as f64];
                    camera
                        .borrow_mut()
                        .zoom_around(-e.delta_y() * WHEEL_ZOOM_RATE, anchor);
                    *dirty.borrow_mut() = true;
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref())
                .ok();

            // Mouse drag: left pans, right button or shift/ctrl rotates and tilts
            let mousedown_cb = {
                let drag = drag.clone();
                let set_hover = set_hover.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    let mut d = drag.borrow_mut();
                    d.active = true;
                    d.rotating = e.button() == 2 || e.shift_key() || e.ctrl_key();
                    d.last_x = e.offset_x() as f64;
                    d.last_y = e.offset_y() as f64;
                    drop(d);
                    set_hover(None);
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("mousedown", mousedown_cb.as_ref().unchecked_ref())
                .ok();

            let mousemove_cb = {
                let camera = camera.clone();
                let renderer = renderer.clone();
                let dirty = dirty.clone();
                let drag = drag.clone();
                let set_hover = set_hover.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    let x = e.offset_x() as f64;
                    let y = e.offset_y() as f64;
                    let mut d = drag.borrow_mut();
                    if d.active {
                        let (dx, dy) = (x - d.last_x, y - d.last_y);
                        let mut cam = camera.borrow_mut();
                        if d.rotating {
                            cam.rotate(dx * DRAG_BEARING_RATE, -dy * DRAG_PITCH_RATE);
                        } else {
                            cam.pan([d.last_x, d.last_y], [x, y]);
                        }
                        d.last_x = x;
                        d.last_y = y;
                        *dirty.borrow_mut() = true;
                        return;
                    }
                    drop(d);
                    let picked = renderer
                        .borrow()
                        .pick([x, y])
                        .map(|bin| HoverInfo::from_bin(bin, x, y));
                    set_hover(picked);
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("mousemove", mousemove_cb.as_ref().unchecked_ref())
                .ok();

            let mouseup_cb = {
                let drag = drag.clone();
                Closure::wrap(Box::new(move |_e: web_sys::MouseEvent| {
                    drag.borrow_mut().active = false;
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("mouseup", mouseup_cb.as_ref().unchecked_ref())
                .ok();

            let mouseleave_cb = {
                let set_hover = set_hover.clone();
                Closure::wrap(Box::new(move |_e: web_sys::MouseEvent| {
                    set_hover(None);
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback(
                    "mouseleave",
                    mouseleave_cb.as_ref().unchecked_ref(),
                )
                .ok();

            let contextmenu_cb = Closure::wrap(Box::new(move |e: web_sys::Event| {
                e.prevent_default();
            }) as Box<dyn FnMut(_)>);
            canvas
                .add_event_listener_with_callback(
                    "contextmenu",
                    contextmenu_cb.as_ref().unchecked_ref(),
                )
                .ok();

            // Keyboard navigation, ignored while typing in the search box
            let keydown_cb = {
                let camera = camera.clone();
                let dirty = dirty.clone();
                Closure::wrap(Box::new(move |e: web_sys::KeyboardEvent| {
                    if e
                        .target()
                        .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                        .is_some()
                    {
                        return;
                    }
                    let mut cam = camera.borrow_mut();
                    match e.key().as_str() {
                        "ArrowLeft" => cam.pan_by_pixels(-KEY_PAN_PX, 0.0),
                        "ArrowRight" => cam.pan_by_pixels(KEY_PAN_PX, 0.0),
                        "ArrowUp" => cam.pan_by_pixels(0.0, -KEY_PAN_PX),
                        "ArrowDown" => cam.pan_by_pixels(0.0, KEY_PAN_PX),
                        "+" | "=" => cam.zoom_by(1.0),
                        "-" | "_" => cam.zoom_by(-1.0),
                        _ => return,
                    }
                    e.prevent_default();
                    *dirty.borrow_mut() = true;
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref())
                .ok();

            let resize_cb = {
                let apply_canvas_size = apply_canvas_size.clone();
                Closure::wrap(Box::new(move |_e: web_sys::Event| {
                    apply_canvas_size();
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
                .ok();

            // Touch: one finger pans, two fingers pinch-zoom around their midpoint
            let touch_start_cb = {
                let canvas = canvas.clone();
                let camera = camera.clone();
                let touch_state = touch_state.clone();
                let set_hover = set_hover.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let touches = e.touches();
                    let mut ts = touch_state.borrow_mut();
                    if let (Some(t0), Some(t1)) = (touches.item(0), touches.item(1)) {
                        let a = touch_point(&canvas, &t0);
                        let b = touch_point(&canvas, &t1);
                        ts.pinch = true;
                        ts.single_active = false;
                        ts.start_pinch_dist = ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt();
                        ts.start_zoom = camera.borrow().view.zoom;
                    } else if let Some(t0) = touches.item(0) {
                        let p = touch_point(&canvas, &t0);
                        ts.single_active = true;
                        ts.pinch = false;
                        ts.last_touch_x = p[0];
                        ts.last_touch_y = p[1];
                    }
                    drop(ts);
                    set_hover(None);
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback(
                    "touchstart",
                    touch_start_cb.as_ref().unchecked_ref(),
                )
                .ok();

            let touch_move_cb = {
                let canvas = canvas.clone();
                let camera = camera.clone();
                let touch_state = touch_state.clone();
                let dirty = dirty.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    e.prevent_default();
                    let touches = e.touches();
                    let mut ts = touch_state.borrow_mut();
                    let mut cam = camera.borrow_mut();
                    if ts.pinch {
                        if let (Some(t0), Some(t1)) = (touches.item(0), touches.item(1)) {
                            let a = touch_point(&canvas, &t0);
                            let b = touch_point(&canvas, &t1);
                            let dist = ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt();
                            let mid = [(a[0] + b[0]) * 0.5, (a[1] + b[1]) * 0.5];
                            let delta = ts.pinch_zoom(dist) - cam.view.zoom;
                            cam.zoom_around(delta, mid);
                            *dirty.borrow_mut() = true;
                        }
                    } else if ts.single_active {
                        if let Some(t0) = touches.item(0) {
                            let p = touch_point(&canvas, &t0);
                            cam.pan([ts.last_touch_x, ts.last_touch_y], p);
                            ts.last_touch_x = p[0];
                            ts.last_touch_y = p[1];
                            *dirty.borrow_mut() = true;
                        }
                    }
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("touchmove", touch_move_cb.as_ref().unchecked_ref())
                .ok();

            let touch_end_cb = {
                let touch_state = touch_state.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let remaining = e.touches().length();
                    let mut ts = touch_state.borrow_mut();
                    if remaining < 2 {
                        ts.pinch = false;
                    }
                    if remaining == 0 {
                        ts.single_active = false;
                    }
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("touchend", touch_end_cb.as_ref().unchecked_ref())
                .ok();
            canvas
                .add_event_listener_with_callback(
                    "touchcancel",
                    touch_end_cb.as_ref().unchecked_ref(),
                )
                .ok();

            // Cleanup
            Box::new(move || {
                let _ = canvas.remove_event_listener_with_callback(
                    "wheel",
                    wheel_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "mousedown",
                    mousedown_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "mousemove",
                    mousemove_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "mouseleave",
                    mouseleave_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "contextmenu",
                    contextmenu_cb.as_ref().unchecked_ref(),
                );
                let _ = window.remove_event_listener_with_callback(
                    "mouseup",
                    mouseup_cb.as_ref().unchecked_ref(),
                );
                let _ = window.remove_event_listener_with_callback(
                    "keydown",
                    keydown_cb.as_ref().unchecked_ref(),
                );
                let _ = window.remove_event_listener_with_callback(
                    "resize",
                    resize_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchstart",
                    touch_start_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchmove",
                    touch_move_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchend",
                    touch_end_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchcancel",
                    touch_end_cb.as_ref().unchecked_ref(),
                );
                if let Some(id) = *raf_id.borrow() {
                    let _ = window.cancel_animation_frame(id);
                }
                // Break the loop's self-reference so the closure can drop.
                closure_cell.borrow_mut().take();
                let _keep_alive = (
                    &wheel_cb,
                    &mousedown_cb,
                    &mousemove_cb,
                    &mouseup_cb,
                    &mouseleave_cb,
                    &contextmenu_cb,
                    &keydown_cb,
                    &resize_cb,
                    &touch_start_cb,
                    &touch_move_cb,
                    &touch_end_cb,
                );
            }) as Box<dyn FnOnce()>
        });
    }

    html! {
        <div style="position:absolute; inset:0;">
            <canvas
                ref={canvas_ref}
                style="display:block; width:100%; height:100%; touch-action:none; cursor:grab;"
            />
            if let Some(info) = (*hover).clone() {
                <Tooltip info={info} />
            }
        </div>
    }
}
