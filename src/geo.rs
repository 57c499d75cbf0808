// Web-mercator helpers shared by the camera and the renderer.
//
// World coordinates are 512 units across at zoom 0, x growing east and y
// growing south (screen orientation).

use std::f64::consts::PI;

pub const TILE_SIZE: f64 = 512.0;
pub const EARTH_CIRCUMFERENCE: f64 = 40_075_016.686;
pub const MAX_LATITUDE: f64 = 85.051_129;

pub fn lng_lat_to_world(lng: f64, lat: f64) -> [f64; 2] {
    let phi = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = TILE_SIZE * (lng + 180.0) / 360.0;
    let y = TILE_SIZE * 0.5 * (1.0 - (PI / 4.0 + phi / 2.0).tan().ln() / PI);
    [x, y]
}

pub fn world_to_lng_lat(world: [f64; 2]) -> (f64, f64) {
    let lng = world[0] / TILE_SIZE * 360.0 - 180.0;
    let k = PI * (1.0 - 2.0 * world[1] / TILE_SIZE);
    let lat = (2.0 * k.exp().atan() - PI / 2.0).to_degrees();
    (lng, lat)
}

/// World units per meter at the given latitude, zoom 0.
pub fn units_per_meter(lat: f64) -> f64 {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    TILE_SIZE / (EARTH_CIRCUMFERENCE * lat.to_radians().cos())
}

pub fn zoom_to_scale(zoom: f64) -> f64 {
    2f64.powf(zoom)
}

pub fn scale_to_zoom(scale: f64) -> f64 {
    scale.log2()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn origin_maps_to_world_center() {
        let [x, y] = lng_lat_to_world(0.0, 0.0);
        assert_abs_diff_eq!(x, 256.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 256.0, epsilon = 1e-9);
    }

    #[test]
    fn north_is_up() {
        let madrid = lng_lat_to_world(-3.7, 40.4);
        let sevilla = lng_lat_to_world(-5.98, 37.39);
        assert!(madrid[1] < sevilla[1]);
        assert!(madrid[0] > sevilla[0]);
    }

    #[test]
    fn world_round_trips_to_lng_lat() {
        let (lng, lat) = world_to_lng_lat(lng_lat_to_world(-3.74922, 40.463669));
        assert_abs_diff_eq!(lng, -3.74922, epsilon = 1e-9);
        assert_abs_diff_eq!(lat, 40.463669, epsilon = 1e-9);
    }

    #[test]
    fn meters_shrink_toward_equator() {
        assert!(units_per_meter(60.0) > units_per_meter(0.0));
        assert_abs_diff_eq!(
            units_per_meter(0.0) * EARTH_CIRCUMFERENCE,
            TILE_SIZE,
            epsilon = 1e-9
        );
    }
}
