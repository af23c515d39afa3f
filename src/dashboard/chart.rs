//! Plotly figure specs and their HTML embedding.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// A Plotly figure as produced by `fig.to_plotly_json()`: trace list plus layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub layout: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: String,
    pub values: Vec<f64>,
    pub color: Option<String>,
}

impl Figure {
    /// Donut chart labelled with label and percentage inside each slice.
    pub fn donut(title: &str, labels: &[String], values: &[f64]) -> Self {
        let trace = json!({
            "type": "pie",
            "labels": labels,
            "values": values,
            "hole": 0.3,
            "textposition": "inside",
            "textinfo": "label+percent",
        });
        Self {
            data: vec![trace],
            layout: base_layout(title),
        }
    }

    /// One bar trace per series, stacked over the shared categories.
    pub fn stacked_bar(
        title: &str,
        x_title: &str,
        y_title: &str,
        categories: &[String],
        series: &[BarSeries],
    ) -> Self {
        let data = series
            .iter()
            .map(|s| {
                let mut trace = json!({
                    "type": "bar",
                    "name": s.name,
                    "x": categories,
                    "y": s.values,
                });
                if let (Some(color), Some(obj)) = (&s.color, trace.as_object_mut()) {
                    obj.insert("marker".to_string(), json!({ "color": color }));
                }
                trace
            })
            .collect();
        let mut layout = base_layout(title);
        layout.insert("barmode".to_string(), json!("stack"));
        layout.insert("xaxis".to_string(), json!({ "title": { "text": x_title } }));
        layout.insert("yaxis".to_string(), json!({ "title": { "text": y_title } }));
        Self { data, layout }
    }

    /// Single-series bar chart.
    pub fn bar(title: &str, x_title: &str, y_title: &str, x: &[String], y: &[f64]) -> Self {
        Self::stacked_bar(
            title,
            x_title,
            y_title,
            x,
            &[BarSeries {
                name: y_title.to_string(),
                values: y.to_vec(),
                color: Some("#5c6bc0".to_string()),
            }],
        )
    }

    pub fn trace_names(&self) -> Vec<String> {
        self.data
            .iter()
            .filter_map(|t| t.get("name").and_then(Value::as_str).map(str::to_string))
            .collect()
    }
}

fn base_layout(title: &str) -> Map<String, Value> {
    let mut layout = Map::new();
    layout.insert("title".to_string(), json!({ "text": title }));
    layout.insert("height".to_string(), json!(500));
    layout.insert("font".to_string(), json!({ "size": 11 }));
    layout
}

/// Turns figures into HTML snippets for one document. The Plotly bundle is
/// referenced from its CDN on the first embed only.
#[derive(Debug, Default)]
pub struct ChartEmbedder {
    next_id: usize,
    library_included: bool,
}

impl ChartEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn embed(&mut self, fig: &Figure) -> Result<String> {
        let id = format!("chart-{}", self.next_id);
        self.next_id += 1;

        let mut html = String::new();
        if !self.library_included {
            html.push_str(&format!(
                "<script src=\"{}\" charset=\"utf-8\"></script>\n",
                PLOTLY_CDN
            ));
            self.library_included = true;
        }
        html.push_str(&format!(
            "<div id=\"{id}\" class=\"plotly-graph-div\"></div>\n\
             <script type=\"text/javascript\">Plotly.newPlot(\"{id}\", {data}, {layout}, {{\"responsive\": true}});</script>\n",
            id = id,
            data = serde_json::to_string(&fig.data)?,
            layout = serde_json::to_string(&fig.layout)?,
        ));
        Ok(html)
    }

    pub fn charts_embedded(&self) -> usize {
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_loads_once() {
        let mut embedder = ChartEmbedder::new();
        let fig = Figure::donut("t", &["a".to_string()], &[1.0]);
        let first = embedder.embed(&fig).unwrap();
        let second = embedder.embed(&fig).unwrap();
        assert!(first.contains(PLOTLY_CDN));
        assert!(!second.contains(PLOTLY_CDN));
        assert!(first.contains("\"chart-0\""));
        assert!(second.contains("\"chart-1\""));
        assert_eq!(embedder.charts_embedded(), 2);
    }

    #[test]
    fn test_donut_shape() {
        let fig = Figure::donut("Reasons", &["x".to_string(), "y".to_string()], &[2.0, 1.0]);
        assert_eq!(fig.data[0]["hole"], 0.3);
        assert_eq!(fig.data[0]["textinfo"], "label+percent");
        assert_eq!(fig.layout["title"]["text"], "Reasons");
    }

    #[test]
    fn test_stacked_bar_keeps_series_colors() {
        let fig = Figure::stacked_bar(
            "t",
            "x",
            "y",
            &["A".to_string()],
            &[BarSeries {
                name: "ok".to_string(),
                values: vec![3.0],
                color: Some("#66bb6a".to_string()),
            }],
        );
        assert_eq!(fig.layout["barmode"], "stack");
        assert_eq!(fig.data[0]["marker"]["color"], "#66bb6a");
        assert_eq!(fig.trace_names(), vec!["ok".to_string()]);
    }

    #[test]
    fn test_deserializes_plotly_json() {
        let raw = r#"{"data":[{"type":"heatmap","z":[[1,2]]}],"layout":{"title":{"text":"h"}}}"#;
        let fig: Figure = serde_json::from_str(raw).unwrap();
        assert_eq!(fig.data.len(), 1);
        assert_eq!(fig.layout["title"]["text"], "h");
    }
}
