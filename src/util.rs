// Browser wall-clock time.

pub fn now_ms() -> f64 {
    js_sys::Date::now()
}
