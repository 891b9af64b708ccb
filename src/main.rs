use rooftop_solar::image::ImageU8;
use rooftop_solar::{AnalysisParams, RooftopAnalyzer, SceneInput};

fn main() {
    // Demo: a bright 160×100 px roof with a dark chimney on a dark background.
    let (w, h) = (320usize, 240usize);
    let mut gray = vec![40u8; w * h];
    for y in 70..170 {
        for x in 80..240 {
            gray[y * w + x] = 200;
        }
    }
    for y in 110..122 {
        for x in 150..162 {
            gray[y * w + x] = 70;
        }
    }
    let image = ImageU8::new(w, h, &gray);

    let analyzer = match RooftopAnalyzer::new(AnalysisParams::default()) {
        Ok(analyzer) => analyzer,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };
    match analyzer.analyze(&SceneInput::new(image)) {
        Ok(run) => println!(
            "roofs={} panels={} capacity_kw={:.2} annual_kwh={:.0}",
            run.summary.region_count,
            run.summary.total_panels,
            run.summary.total_capacity_kw,
            run.summary.total_annual_kwh
        ),
        Err(err) => eprintln!("analysis failed: {err}"),
    }
}
