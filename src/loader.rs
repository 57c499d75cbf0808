// Dataset and basemap fetching.

use csv::{ReaderBuilder, StringRecord};
use gloo_net::http::Request;
use serde::Deserialize;

use crate::error::LoadError;
use crate::model::LocationRecord;

const LAT: &str = "lat";
const LNG: &str = "lng";
const NUM: &str = "num";
const ESCUELA: &str = "escuela";

/// Lenient numeric coercion: blank is zero, anything unparsable is NaN.
pub fn coerce_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Positions of the feed's columns within the header row.
struct Columns {
    lat: usize,
    lng: usize,
    num: usize,
    escuela: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            lat: find(LAT)?,
            lng: find(LNG)?,
            num: find(NUM)?,
            escuela: find(ESCUELA)?,
        })
    }

    // Ragged rows are kept: an absent number is NaN, an absent name is empty.
    fn record(&self, row: &StringRecord) -> LocationRecord {
        let number = |idx: usize| row.get(idx).map(coerce_number).unwrap_or(f64::NAN);
        LocationRecord {
            coordinates: (number(self.lat), number(self.lng)),
            value: number(self.num),
            name: row.get(self.escuela).unwrap_or_default().to_string(),
        }
    }
}

pub fn parse_csv(text: &str) -> Result<Vec<LocationRecord>, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());
    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut out = Vec::new();
    for row in rdr.records() {
        out.push(columns.record(&row?));
    }
    Ok(out)
}

async fn fetch_text(url: &str) -> Result<String, LoadError> {
    let resp = Request::get(url).send().await?;
    if !resp.ok() {
        return Err(LoadError::Status {
            status: resp.status(),
            url: url.to_string(),
        });
    }
    Ok(resp.text().await?)
}

pub async fn fetch_dataset(url: &str) -> Result<Vec<LocationRecord>, LoadError> {
    let text = fetch_text(url).await?;
    parse_csv(&text)
}

/// The parts of a Mapbox-GL style document the map draws from.
#[derive(Debug, Deserialize)]
pub struct MapStyle {
    #[serde(default)]
    layers: Vec<StyleLayer>,
}

#[derive(Debug, Deserialize)]
struct StyleLayer {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    paint: Option<LayerPaint>,
}

#[derive(Debug, Deserialize)]
struct LayerPaint {
    // A plain color string, or an expression we do not evaluate.
    #[serde(rename = "background-color")]
    background_color: Option<serde_json::Value>,
}

impl MapStyle {
    pub fn background(&self) -> Option<String> {
        self.layers
            .iter()
            .find(|layer| layer.kind == "background")?
            .paint
            .as_ref()?
            .background_color
            .as_ref()?
            .as_str()
            .map(str::to_string)
    }
}

pub async fn fetch_basemap_background(url: &str) -> Result<Option<String>, LoadError> {
    let text = fetch_text(url).await?;
    let style: MapStyle = serde_json::from_str(&text)?;
    Ok(style.background())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_example_row() {
        let csv = "lat,lng,num,escuela\n40.4,-3.7,12,Pedriza\n";
        let recs = parse_csv(csv).unwrap();
        assert_eq!(
            recs,
            vec![LocationRecord {
                coordinates: (40.4, -3.7),
                value: 12.0,
                name: "Pedriza".into(),
            }]
        );
    }

    #[test]
    fn n_rows_yield_n_records_in_any_column_order() {
        let csv = "escuela,num,extra,lng,lat\nA,1,x,2,3\nB,4,y,5,6\nC,7,z,8,9\n";
        let recs = parse_csv(csv).unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[2].coordinates, (9.0, 8.0));
        assert_eq!(recs[1].value, 4.0);
    }

    #[test]
    fn malformed_numbers_become_nan_and_blank_is_zero() {
        let csv = "lat,lng,num,escuela\nabc, ,n/a,Broken\n";
        let recs = parse_csv(csv).unwrap();
        assert!(recs[0].coordinates.0.is_nan());
        assert_eq!(recs[0].coordinates.1, 0.0);
        assert!(recs[0].value.is_nan());
        assert_eq!(recs[0].name, "Broken");
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "lat,lng,escuela\n1,2,A\n";
        assert!(matches!(parse_csv(csv), Err(LoadError::MissingColumn(c)) if c == "num"));
    }

    #[test]
    fn long_row_keeps_known_columns() {
        let csv = "lat,lng,num,escuela\n-3.7,40.4,12,Pedriza\n-4.0,41.0,5,Bad,extra\n1.0,41.2,7,Siurana\n";
        let recs = parse_csv(csv).unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[1].coordinates, (-4.0, 41.0));
        assert_eq!(recs[1].value, 5.0);
        assert_eq!(recs[1].name, "Bad");
        assert_eq!(recs[2].name, "Siurana");
    }

    #[test]
    fn short_row_yields_nan_and_empty_name() {
        let csv = "lat,lng,num,escuela\n-3.7,40.4,12,Pedriza\n-4.0,41.0\n1.0,41.2,7,Siurana\n";
        let recs = parse_csv(csv).unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[1].coordinates, (-4.0, 41.0));
        assert!(recs[1].value.is_nan());
        assert_eq!(recs[1].name, "");
        assert_eq!(recs[2].value, 7.0);
    }

    #[test]
    fn empty_body_with_header_is_empty_dataset() {
        assert!(parse_csv("lat,lng,num,escuela\n").unwrap().is_empty());
    }

    #[test]
    fn reads_background_layer_color() {
        let style = serde_json::json!({
            "version": 8,
            "layers": [
                { "id": "bg", "type": "background", "paint": { "background-color": "#0e0e0e" } },
                { "id": "water", "type": "fill", "paint": { "fill-color": "#000" } }
            ]
        });
        let style: MapStyle = serde_json::from_value(style).unwrap();
        assert_eq!(style.background().as_deref(), Some("#0e0e0e"));
        let bare: MapStyle = serde_json::from_value(serde_json::json!({ "version": 8 })).unwrap();
        assert_eq!(bare.background(), None);
    }

    #[test]
    fn expression_background_is_ignored() {
        let style: MapStyle = serde_json::from_value(serde_json::json!({
            "layers": [
                { "type": "background", "paint": { "background-color": ["interpolate", ["linear"], ["zoom"], 0, "#000", 10, "#111"] } }
            ]
        }))
        .unwrap();
        assert_eq!(style.background(), None);
    }
}
