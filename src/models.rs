use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display format of an indicator's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    #[default]
    Number,
    Percent,
}

/// Optional qualitative scale annotation (e.g. "0 = worst, 10 = best").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorScale {
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "lowLabel")]
    pub low_label: String,
    #[serde(default, rename = "highLabel")]
    pub high_label: String,
    #[serde(default, rename = "gradientClass")]
    pub gradient_class: String,
}

/// Metadata for one statistical indicator, loaded once at startup.
///
/// Category grouping order follows first-seen order in the source list,
/// not alphabetical order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorMeta {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default = "default_decimals")]
    pub decimals: i32,
    #[serde(default)]
    pub format: ValueFormat,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, rename = "sourceUrl")]
    pub source_url: String,
    #[serde(default)]
    pub scale: Option<IndicatorScale>,
}

fn default_decimals() -> i32 {
    2
}

fn default_category() -> String {
    "Other".to_string()
}

impl IndicatorMeta {
    /// Axis/selector label: `"Label [unit]"` when a unit is present.
    pub fn display_label(&self) -> String {
        let unit = self.unit.trim();
        if unit.is_empty() {
            self.label.clone()
        } else {
            format!("{} [{}]", self.label, unit)
        }
    }
}

/// One country, keyed by its 3-letter code. Immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryMeta {
    #[serde(rename = "country_code")]
    pub code: String,
    #[serde(rename = "country_name")]
    pub name: String,
    #[serde(default)]
    pub flag: String,
    #[serde(default)]
    pub continent: String,
}

impl CountryMeta {
    /// Display label: flag glyph + name, trimmed when either is missing.
    pub fn label(&self) -> String {
        build_country_label(&self.name, &self.flag)
    }
}

/// Build the `"🇩🇪 Germany"` style label used everywhere a country is shown.
pub fn build_country_label(name: &str, flag: &str) -> String {
    let name = name.trim();
    let flag = flag.trim();
    if flag.is_empty() {
        name.to_string()
    } else {
        format!("{flag} {name}").trim().to_string()
    }
}

/// Year tag of a data point: a concrete year, or the synthetic marker for
/// rows produced by averaging across all years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Year {
    Exact(i32),
    Avg,
}

impl Year {
    pub fn as_exact(&self) -> Option<i32> {
        match self {
            Year::Exact(y) => Some(*y),
            Year::Avg => None,
        }
    }
}

impl std::fmt::Display for Year {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Year::Exact(y) => write!(f, "{y}"),
            Year::Avg => write!(f, "avg"),
        }
    }
}

impl Serialize for Year {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Year::Exact(y) => serializer.serialize_i32(*y),
            Year::Avg => serializer.serialize_str("avg"),
        }
    }
}

/// The API serializes years as integers; averaged rows use the string
/// sentinel `"avg"`. Accept both and normalize.
impl<'de> Deserialize<'de> for Year {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        struct YearVisitor;

        impl<'de> Visitor<'de> for YearVisitor {
            type Value = Year;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an integer year or the string \"avg\"")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Year::Exact(v as i32))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Year::Exact(v as i32))
            }

            fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
                if s == "avg" {
                    Ok(Year::Avg)
                } else {
                    s.parse::<i32>().map(Year::Exact).map_err(E::custom)
                }
            }
        }

        deserializer.deserialize_any(YearVisitor)
    }
}

/// One point of a paired-indicator view: one (country, year) observation
/// where both selected indicators are non-null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub country_code: String,
    pub year: Year,
    pub x_value: f64,
    pub y_value: f64,
    #[serde(default)]
    pub s_value: Option<f64>,
}

/// One table row: every indicator column for one country in one year.
///
/// The wire format is a flat JSON object; the fixed columns are named and
/// the remaining keys are indicator columns (number or null).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub country_code: String,
    #[serde(default)]
    pub country_name: String,
    #[serde(default)]
    pub country_display_name: String,
    #[serde(default)]
    pub continent: Option<String>,
    #[serde(default)]
    pub flag: String,
    pub year: i32,
    #[serde(flatten)]
    pub values: BTreeMap<String, Option<f64>>,
}

impl RawRow {
    pub fn value(&self, index_id: &str) -> Option<f64> {
        self.values.get(index_id).copied().flatten()
    }
}

/// One time-series row: selected indicator columns for one (country, year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    pub country_code: String,
    pub year: i32,
    #[serde(flatten)]
    pub values: BTreeMap<String, Option<f64>>,
}

impl TimeSeriesRow {
    pub fn value(&self, index_id: &str) -> Option<f64> {
        self.values.get(index_id).copied().flatten()
    }
}

/// Year span answer; both fields are null when no data matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct YearRange {
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

impl YearRange {
    pub fn bounds(&self) -> Option<(i32, i32)> {
        match (self.min_year, self.max_year) {
            (Some(lo), Some(hi)) => Some((lo, hi)),
            _ => None,
        }
    }
}

/// Value extent answer for one indicator; null when no data matches.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueRange {
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

impl ValueRange {
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match (self.min_value, self.max_value) {
            (Some(lo), Some(hi)) => Some((lo, hi)),
            _ => None,
        }
    }
}

/// Country outline for the choropleth: one or more closed rings of
/// (longitude, latitude) pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldShape {
    pub code: String,
    pub rings: Vec<Vec<[f64; 2]>>,
}

/// GeoJSON wire types, only as deep as the choropleth needs.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: serde_json::Value,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
    #[serde(other)]
    Other,
}

impl Feature {
    /// ISO alpha-3 code from the feature id or the usual property spellings.
    pub fn country_code(&self) -> Option<String> {
        if let Some(id) = &self.id
            && id.len() == 3
        {
            return Some(id.clone());
        }
        for key in ["ISO_A3", "iso_a3", "ADM0_A3", "adm0_a3", "SOV_A3"] {
            if let Some(code) = self.properties.get(key).and_then(|v| v.as_str())
                && code != "-99"
            {
                return Some(code.to_string());
            }
        }
        None
    }

    /// Outer rings of the feature's polygons. Interior holes are dropped;
    /// the map fill does not render them.
    pub fn rings(&self) -> Vec<Vec<[f64; 2]>> {
        match &self.geometry {
            Some(Geometry::Polygon { coordinates }) => {
                coordinates.first().cloned().into_iter().collect()
            }
            Some(Geometry::MultiPolygon { coordinates }) => coordinates
                .iter()
                .filter_map(|poly| poly.first().cloned())
                .collect(),
            _ => Vec::new(),
        }
    }
}
