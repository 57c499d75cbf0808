// Construction-time configuration for the heatmap.
//
// Everything here is immutable once built; the renderer receives these
// structs by value instead of reading module-level globals.

/// Source feed of climbing schools.
pub const DATA_URL: &str =
    "https://raw.githubusercontent.com/menusal/dataviz/main/escuelas_escalada.csv";

pub const MAP_STYLE: &str =
    "https://basemaps.cartocdn.com/gl/dark-matter-nolabels-gl-style/style.json";

/// Used until (or unless) the basemap style provides its own background.
pub const DEFAULT_BACKGROUND: &str = "#0e0e0e";

pub const DEFAULT_RADIUS: f64 = 2000.0;
pub const DEFAULT_UPPER_PERCENTILE: f64 = 100.0;
pub const DEFAULT_COVERAGE: f64 = 1.0;

/// Elevation scale applied once data is present, and its grow-in duration.
pub const ELEVATION_SCALE: f64 = 50.0;
pub const ELEVATION_SCALE_TRANSITION_MS: f64 = 5000.0;

pub type Rgb = [u8; 3];

/// Six-step ramp, cold to hot.
pub const COLOR_RANGE: [Rgb; 6] = [
    [1, 152, 189],
    [73, 227, 206],
    [216, 254, 181],
    [254, 237, 177],
    [254, 173, 84],
    [209, 55, 78],
];

/// Top-level map settings exposed as `App` properties.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub map_style: String,
    /// Hexagon radius in meters.
    pub radius: f64,
    /// Bins whose color value lies above this percentile are hidden.
    pub upper_percentile: f64,
    /// Fraction of the bin radius the drawn hexagon covers.
    pub coverage: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            map_style: MAP_STYLE.to_string(),
            radius: DEFAULT_RADIUS,
            upper_percentile: DEFAULT_UPPER_PERCENTILE,
            coverage: DEFAULT_COVERAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: f64,
    pub diffuse: f64,
    pub shininess: f64,
    pub specular_color: Rgb,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: 0.64,
            diffuse: 0.6,
            shininess: 32.0,
            specular_color: [51, 51, 51],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Rgb,
    pub intensity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Rgb,
    pub intensity: f64,
    /// `[longitude, latitude, altitude_meters]`
    pub position: [f64; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightingEffect {
    pub ambient: AmbientLight,
    pub point_lights: Vec<PointLight>,
}

impl Default for LightingEffect {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: [255, 255, 255],
                intensity: 1.0,
            },
            point_lights: vec![
                PointLight {
                    color: [255, 255, 255],
                    intensity: 0.8,
                    position: [-0.144528, 49.739968, 80000.0],
                },
                PointLight {
                    color: [255, 255, 255],
                    intensity: 0.8,
                    position: [-3.807751, 54.104682, 8000.0],
                },
            ],
        }
    }
}

/// Declarative description of the extruded hexagon layer.
#[derive(Debug, Clone, PartialEq)]
pub struct HexagonLayerConfig {
    pub radius: f64,
    pub coverage: f64,
    pub upper_percentile: f64,
    /// Output range of the elevation scale, in meters before `elevation_scale`.
    pub elevation_range: [f64; 2],
    pub color_range: Vec<Rgb>,
    pub material: Material,
}

impl HexagonLayerConfig {
    pub fn from_map_config(cfg: &MapConfig) -> Self {
        Self {
            radius: cfg.radius,
            coverage: cfg.coverage,
            upper_percentile: cfg.upper_percentile,
            ..Default::default()
        }
    }
}

impl Default for HexagonLayerConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            coverage: DEFAULT_COVERAGE,
            upper_percentile: DEFAULT_UPPER_PERCENTILE,
            elevation_range: [0.0, 5000.0],
            color_range: COLOR_RANGE.to_vec(),
            material: Material::default(),
        }
    }
}
