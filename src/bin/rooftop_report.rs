use rooftop_solar::config::analyze::{load_config, OutputConfig};
use rooftop_solar::image::io::{
    load_grayscale_image, render_layout_mask, save_grayscale_u8, write_json_file,
};
use rooftop_solar::{AnalysisReport, RooftopAnalyzer, SceneInput};
use std::env;
use std::path::Path;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let gray = load_grayscale_image(&config.input)?;
    let analyzer = RooftopAnalyzer::new(config.params).map_err(|e| e.to_string())?;
    let scene = SceneInput::new(gray.as_view())
        .with_scale(config.meters_per_pixel)
        .with_location(config.location);
    let report = analyzer.process(&scene).map_err(|e| e.to_string())?;

    write_outputs(&report, &config.output, gray.width(), gray.height())?;
    print_summary(&report);
    Ok(())
}

fn write_outputs(
    report: &AnalysisReport,
    output: &OutputConfig,
    width: usize,
    height: usize,
) -> Result<(), String> {
    if output.summary_only {
        write_json_file(&output.report_json, &report.run)?;
    } else {
        write_json_file(&output.report_json, report)?;
    }
    println!("Saved report to {}", output.report_json.display());

    if let Some(path) = &output.layout_png {
        let mask = render_layout_mask(&report.run, width, height);
        save_grayscale_u8(&mask, path)?;
        println!("Saved layout mask to {}", path.display());
    }
    Ok(())
}

fn print_summary(report: &AnalysisReport) {
    let summary = &report.run.summary;
    println!(
        "{} roof(s), {} panels, {:.2} kW, {:.0} kWh/year, {:.0} kg CO2/year ({:.1} ms)",
        summary.region_count,
        summary.total_panels,
        summary.total_capacity_kw,
        summary.total_annual_kwh,
        summary.total_co2_offset_kg_year,
        report.trace.timings.total_ms
    );
    for roof in report.run.ranked() {
        println!(
            "  roof {}: {:.1} m² usable, {:?}, {} panels, score {:.0} ({:?})",
            roof.region_id.0,
            roof.usable_area_m2,
            roof.slope_class,
            roof.layout.len(),
            roof.suitability.score,
            roof.suitability.rating
        );
    }
}

fn usage() -> String {
    "Usage: rooftop_report <config.json>".to_string()
}
