//! Slide content: title, bullets, and an optional chart.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use slidecast_common::error::{SlidecastError, SlidecastResult};

/// One slide's structured content.
///
/// Every field is optional on the wire; missing fields take the defaults
/// `text = "Title"`, no bullets, no visual, no chart data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideSpec {
    /// Slide title.
    #[serde(default = "default_title", alias = "SLIDE_TEXT")]
    pub text: String,

    /// Bullet points, in display order.
    #[serde(default, alias = "SLIDE_BULLETS")]
    pub bullets: Vec<String>,

    /// Which visual accompanies the text.
    #[serde(default, alias = "VISUAL_TYPE")]
    pub visual_kind: VisualKind,

    /// Chart values keyed by label, in insertion order.
    #[serde(default, alias = "VISUAL_DATA")]
    pub visual_data: ChartData,
}

fn default_title() -> String {
    "Title".to_string()
}

impl Default for SlideSpec {
    fn default() -> Self {
        Self {
            text: default_title(),
            bullets: Vec::new(),
            visual_kind: VisualKind::None,
            visual_data: ChartData::default(),
        }
    }
}

impl SlideSpec {
    /// Slide with a title and nothing else.
    pub fn titled(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Whether this slide carries a bar chart.
    ///
    /// A chart is drawn only for `BarChart` slides with at least one datum.
    pub fn has_chart(&self) -> bool {
        self.visual_kind == VisualKind::BarChart && !self.visual_data.is_empty()
    }

    /// Reject chart data that cannot be drawn.
    ///
    /// Values must be finite and non-negative so that normalized bar
    /// heights stay within `[0, 100]` percent.
    pub fn validate(&self) -> SlidecastResult<()> {
        for datum in self.visual_data.iter() {
            if !datum.value.is_finite() {
                return Err(SlidecastError::invalid_slide_data(format!(
                    "chart value for {:?} is not finite",
                    datum.label
                )));
            }
            if datum.value < 0.0 {
                return Err(SlidecastError::invalid_slide_data(format!(
                    "chart value for {:?} is negative ({})",
                    datum.label, datum.value
                )));
            }
        }
        Ok(())
    }
}

/// Visual shown next to the slide text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum VisualKind {
    /// Text only.
    #[default]
    None,
    /// Vertical bar chart from `visual_data`.
    BarChart,
    /// A visual this renderer does not draw; kept for round-tripping.
    Other(String),
}

impl VisualKind {
    /// Parse the loose spellings producers emit (`"Bar Chart"`,
    /// `"bar_chart"`, `"Text_Only"`, ...).
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "" | "none" | "textonly" | "text" => Self::None,
            "barchart" | "bar" => Self::BarChart,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "None",
            Self::BarChart => "BarChart",
            Self::Other(raw) => raw,
        }
    }
}

impl Serialize for VisualKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VisualKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::parse).unwrap_or_default())
    }
}

/// A single labelled chart value.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDatum {
    pub label: String,
    pub value: f64,
}

/// Ordered chart data. On the wire this is a JSON object mapping label to
/// number; key order is preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData(Vec<ChartDatum>);

impl ChartData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, replacing an existing label in place.
    pub fn insert(&mut self, label: impl Into<String>, value: f64) {
        let label = label.into();
        match self.0.iter_mut().find(|d| d.label == label) {
            Some(existing) => existing.value = value,
            None => self.0.push(ChartDatum { label, value }),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChartDatum> {
        self.0.iter()
    }

    /// Largest value, or `None` when there is no data.
    pub fn max_value(&self) -> Option<f64> {
        self.0.iter().map(|d| d.value).reduce(f64::max)
    }
}

impl<L: Into<String>> FromIterator<(L, f64)> for ChartData {
    fn from_iter<I: IntoIterator<Item = (L, f64)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (label, value) in iter {
            data.insert(label, value);
        }
        data
    }
}

impl<'a> IntoIterator for &'a ChartData {
    type Item = &'a ChartDatum;
    type IntoIter = std::slice::Iter<'a, ChartDatum>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for ChartData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for datum in &self.0 {
            map.serialize_entry(&datum.label, &datum.value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ChartData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChartDataVisitor;

        impl<'de> Visitor<'de> for ChartDataVisitor {
            type Value = ChartData;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping chart labels to numbers")
            }

            fn visit_unit<E: de::Error>(self) -> Result<ChartData, E> {
                Ok(ChartData::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ChartData, A::Error> {
                let mut data = ChartData::new();
                while let Some((label, value)) = access.next_entry::<String, serde_json::Value>()? {
                    let number = value.as_f64().ok_or_else(|| {
                        de::Error::custom(format!("chart value for {label:?} is not a number"))
                    })?;
                    data.insert(label, number);
                }
                Ok(data)
            }
        }

        deserializer.deserialize_any(ChartDataVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults_apply_to_empty_object() {
        let slide: SlideSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(slide, SlideSpec::default());
        assert_eq!(slide.text, "Title");
        assert!(!slide.has_chart());
    }

    #[test]
    fn test_legacy_keys_are_accepted() {
        let slide: SlideSpec = serde_json::from_str(
            r#"{
                "SLIDE_TEXT": "Sales",
                "SLIDE_BULLETS": ["North", "South"],
                "VISUAL_TYPE": "Bar Chart",
                "VISUAL_DATA": { "A": 10, "B": 20, "C": 5 }
            }"#,
        )
        .unwrap();

        assert_eq!(slide.text, "Sales");
        assert_eq!(slide.bullets, vec!["North", "South"]);
        assert_eq!(slide.visual_kind, VisualKind::BarChart);
        let labels: Vec<_> = slide.visual_data.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
        assert!(slide.has_chart());
    }

    #[test]
    fn test_visual_data_keeps_insertion_order() {
        let slide: SlideSpec = serde_json::from_str(
            r#"{ "visualKind": "BarChart", "visualData": { "zeta": 1, "alpha": 2, "mid": 3 } }"#,
        )
        .unwrap();
        let labels: Vec<_> = slide.visual_data.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_visual_kind_spellings() {
        assert_eq!(VisualKind::parse("Bar Chart"), VisualKind::BarChart);
        assert_eq!(VisualKind::parse("bar_chart"), VisualKind::BarChart);
        assert_eq!(VisualKind::parse("BarChart"), VisualKind::BarChart);
        assert_eq!(VisualKind::parse("Text_Only"), VisualKind::None);
        assert_eq!(
            VisualKind::parse("Pie Chart"),
            VisualKind::Other("Pie Chart".to_string())
        );
    }

    #[test]
    fn test_null_visual_fields_take_defaults() {
        let slide: SlideSpec =
            serde_json::from_str(r#"{ "visualKind": null, "visualData": null }"#).unwrap();
        assert_eq!(slide.visual_kind, VisualKind::None);
        assert!(slide.visual_data.is_empty());
    }

    #[test]
    fn test_non_numeric_chart_value_is_rejected() {
        let result: Result<SlideSpec, _> =
            serde_json::from_str(r#"{ "visualData": { "A": "ten" } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_and_negative() {
        let mut slide = SlideSpec::titled("x");
        slide.visual_kind = VisualKind::BarChart;
        slide.visual_data = [("A", f64::NAN)].into_iter().collect();
        assert!(slide.validate().is_err());

        slide.visual_data = [("A", f64::INFINITY)].into_iter().collect();
        assert!(slide.validate().is_err());

        slide.visual_data = [("A", -1.0)].into_iter().collect();
        assert!(slide.validate().is_err());

        slide.visual_data = [("A", 0.0), ("B", 3.5)].into_iter().collect();
        assert!(slide.validate().is_ok());
    }

    #[test]
    fn test_chart_needs_bar_chart_kind() {
        let mut slide = SlideSpec::titled("x");
        slide.visual_data = [("A", 1.0)].into_iter().collect();
        assert!(!slide.has_chart());
        slide.visual_kind = VisualKind::Other("Line".to_string());
        assert!(!slide.has_chart());
        slide.visual_kind = VisualKind::BarChart;
        assert!(slide.has_chart());
    }

    #[test]
    fn test_insert_replaces_duplicate_label() {
        let mut data = ChartData::new();
        data.insert("A", 1.0);
        data.insert("B", 2.0);
        data.insert("A", 5.0);
        assert_eq!(data.len(), 2);
        assert_eq!(data.max_value(), Some(5.0));
    }

    proptest! {
        #[test]
        fn prop_finite_non_negative_data_validates(
            values in prop::collection::vec(0.0f64..1e9, 0..12)
        ) {
            let mut slide = SlideSpec::titled("p");
            slide.visual_kind = VisualKind::BarChart;
            slide.visual_data = values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("L{i}"), *v))
                .collect();
            prop_assert!(slide.validate().is_ok());
        }
    }
}
