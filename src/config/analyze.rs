use crate::analyzer::AnalysisParams;
use crate::types::{Location, SceneInput};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime configuration of the `rooftop_report` tool.
#[derive(Debug, Deserialize)]
pub struct RuntimeConfig {
    #[serde(rename = "input")]
    pub input: PathBuf,
    #[serde(default = "default_meters_per_pixel")]
    pub meters_per_pixel: f64,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub params: AnalysisParams,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Full report (run + trace) as pretty JSON.
    pub report_json: PathBuf,
    /// Optional grayscale rendering of roofs, obstacles and panels.
    #[serde(default)]
    pub layout_png: Option<PathBuf>,
    /// Drop the pipeline trace from the JSON report.
    #[serde(default)]
    pub summary_only: bool,
}

fn default_meters_per_pixel() -> f64 {
    SceneInput::DEFAULT_METERS_PER_PIXEL
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    parse_config(&data).map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

pub fn parse_config(data: &str) -> Result<RuntimeConfig, serde_json::Error> {
    serde_json::from_str(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_falls_back_to_defaults() {
        let cfg = parse_config(
            r#"{ "input": "roof.png", "output": { "report_json": "out/report.json" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.input, PathBuf::from("roof.png"));
        assert_eq!(cfg.meters_per_pixel, 0.15);
        assert_eq!(cfg.location.latitude, 28.6139);
        assert!(cfg.output.layout_png.is_none());
        assert!(!cfg.output.summary_only);
        assert_eq!(cfg.params.panel.width_m, 1.0);
    }

    #[test]
    fn nested_overrides_are_applied() {
        let cfg = parse_config(
            r#"{
                "input": "roof.png",
                "meters_per_pixel": 0.3,
                "location": { "latitude": -33.9, "longitude": 18.4 },
                "params": { "panel": { "width_m": 1.1 }, "edge_margin_m": 0.8 },
                "output": { "report_json": "r.json", "layout_png": "l.png" }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.meters_per_pixel, 0.3);
        assert_eq!(cfg.location.latitude, -33.9);
        assert_eq!(cfg.params.panel.width_m, 1.1);
        assert_eq!(cfg.params.panel.height_m, 1.7);
        assert_eq!(cfg.params.edge_margin_m, 0.8);
        assert_eq!(cfg.output.layout_png, Some(PathBuf::from("l.png")));
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = load_config(Path::new("/nonexistent/rooftop.json")).unwrap_err();
        assert!(err.contains("/nonexistent/rooftop.json"));
    }
}
