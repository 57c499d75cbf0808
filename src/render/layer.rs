// Extruded hexagon heatmap layer: aggregation plus color/elevation styling.

use crate::config::{HexagonLayerConfig, Rgb};
use crate::model::LocationRecord;

use super::hexbin::{aggregate, HexGrid};
use super::scale::{extent, upper_percentile_cutoff, LinearScale, QuantizeScale};

#[derive(Debug, Clone, PartialEq)]
pub struct StyledBin {
    pub center: [f64; 2],
    pub color: Rgb,
    /// Meters, before the animated elevation scale is applied.
    pub elevation: f64,
    pub color_value: f64,
    pub elevation_value: f64,
    pub count: usize,
    /// Name of the bin's first record, for the tooltip.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HexagonLayer {
    config: HexagonLayerConfig,
    grid: HexGrid,
    bins: Vec<StyledBin>,
}

impl HexagonLayer {
    pub fn new(config: HexagonLayerConfig) -> Self {
        Self {
            config,
            grid: HexGrid::new(0.0),
            bins: Vec::new(),
        }
    }

    pub fn config(&self) -> &HexagonLayerConfig {
        &self.config
    }

    pub fn bins(&self) -> &[StyledBin] {
        &self.bins
    }

    pub fn hex_radius(&self) -> f64 {
        self.grid.radius * self.config.coverage
    }

    /// Re-aggregate and restyle for a new displayed collection.
    pub fn set_data(&mut self, records: &[LocationRecord]) {
        let agg = aggregate(records, self.config.radius);
        self.grid = agg.grid;

        let mut drawable: Vec<_> = agg
            .bins
            .into_iter()
            .filter(|b| b.color_value.is_finite() && b.elevation_value.is_finite())
            .collect();
        let kept: usize = drawable.iter().map(|b| b.points.len()).sum();
        let dropped = records.len().saturating_sub(kept);
        if dropped > 0 {
            tracing::debug!("{} records not drawn (non-finite coordinates or values)", dropped);
        }

        let mut sorted: Vec<f64> = drawable.iter().map(|b| b.color_value).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        if let Some(cutoff) = upper_percentile_cutoff(&sorted, self.config.upper_percentile) {
            drawable.retain(|b| b.color_value <= cutoff);
        }

        let color_scale = QuantizeScale {
            domain: extent(drawable.iter().map(|b| b.color_value)).unwrap_or([0.0, 0.0]),
            steps: self.config.color_range.len(),
        };
        let elevation_scale = LinearScale {
            domain: extent(drawable.iter().map(|b| b.elevation_value)).unwrap_or([0.0, 0.0]),
            range: self.config.elevation_range,
        };
        let fallback: Rgb = [255, 255, 255];

        self.bins = drawable
            .into_iter()
            .map(|b| StyledBin {
                center: b.center,
                color: self
                    .config
                    .color_range
                    .get(color_scale.index(b.color_value))
                    .copied()
                    .unwrap_or(fallback),
                elevation: elevation_scale.map(b.elevation_value),
                color_value: b.color_value,
                elevation_value: b.elevation_value,
                count: b.points.len(),
                name: records[b.points[0]].name.clone(),
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::COLOR_RANGE;

    fn rec(x: f64, y: f64, value: f64, name: &str) -> LocationRecord {
        LocationRecord {
            coordinates: (x, y),
            value,
            name: name.into(),
        }
    }

    fn spread() -> Vec<LocationRecord> {
        (0..10)
            .map(|i| rec(-8.0 + i as f64, 40.0, (i + 1) as f64 * 10.0, &format!("area {i}")))
            .collect()
    }

    #[test]
    fn colors_span_the_ramp() {
        let mut layer = HexagonLayer::new(HexagonLayerConfig::default());
        layer.set_data(&spread());
        assert_eq!(layer.bins().len(), 10);
        assert_eq!(layer.bins()[0].color, COLOR_RANGE[0]);
        assert_eq!(layer.bins()[9].color, COLOR_RANGE[5]);
        assert_eq!(layer.bins()[0].elevation, 0.0);
        assert_eq!(layer.bins()[9].elevation, 5000.0);
        assert_eq!(layer.bins()[3].name, "area 3");
    }

    #[test]
    fn upper_percentile_hides_top_bins() {
        let mut layer = HexagonLayer::new(HexagonLayerConfig {
            upper_percentile: 80.0,
            ..Default::default()
        });
        layer.set_data(&spread());
        assert_eq!(layer.bins().len(), 8);
        assert!(layer.bins().iter().all(|b| b.color_value <= 80.0));
    }

    #[test]
    fn nan_values_are_not_drawn() {
        let mut layer = HexagonLayer::new(HexagonLayerConfig::default());
        layer.set_data(&[rec(-3.7, 40.4, f64::NAN, "broken"), rec(1.0, 41.0, 5.0, "ok")]);
        assert_eq!(layer.bins().len(), 1);
        assert_eq!(layer.bins()[0].name, "ok");
    }

    #[test]
    fn coverage_shrinks_drawn_radius() {
        let mut full = HexagonLayer::new(HexagonLayerConfig::default());
        let mut half = HexagonLayer::new(HexagonLayerConfig {
            coverage: 0.5,
            ..Default::default()
        });
        full.set_data(&spread());
        half.set_data(&spread());
        assert!((half.hex_radius() * 2.0 - full.hex_radius()).abs() < 1e-12);
    }

    #[test]
    fn empty_data_clears_bins() {
        let mut layer = HexagonLayer::new(HexagonLayerConfig::default());
        layer.set_data(&spread());
        layer.set_data(&[]);
        assert!(layer.bins().is_empty());
    }
}
