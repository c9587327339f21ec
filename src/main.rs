use std::env;

use string_art::config::{self, RuntimeConfig};
use string_art::export::{
    render_scheme, render_simulation, total_thread_length_mm, write_instructions_csv,
    write_instructions_txt, SchemeOptions, SimulationOptions,
};
use string_art::io::{save_field_png, save_rgb_png, write_json_file};
use string_art::layout::CircleLayout;
use string_art::prep;
use string_art::types::RouteReport;
use string_art::Router;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let program = env::args()
        .next()
        .unwrap_or_else(|| "string-art".to_string());
    let config = config::parse_cli(&program)?;

    let field =
        prep::prepare_image(&config.input_path, &config.prep).map_err(|e| e.to_string())?;

    let mut params = config.router.clone();
    if config.output.residual_png.is_some() {
        params.keep_residual = true;
    }
    let router = Router::new(params, field).map_err(|e| e.to_string())?;
    let layout = router.layout().clone();
    let report = router.run();

    print_summary(&config, &report, &layout);
    write_artifacts(&config, &report, &layout).map_err(|e| e.to_string())?;
    Ok(())
}

fn print_summary(config: &RuntimeConfig, report: &RouteReport, layout: &CircleLayout) {
    let length_m = total_thread_length_mm(report, layout, config.scale) / 1000.0;
    println!("Routing summary");
    println!("  input: {}", config.input_path.display());
    println!("  nails: {}", layout.len());
    println!("  steps: {}", report.steps.len());
    println!("  state: {:?} ({:?})", report.state, report.reason);
    println!(
        "  residual mean: {:.4} -> {:.4}",
        report.residual_before.mean, report.residual_after.mean
    );
    println!(
        "  residual max:  {:.4} -> {:.4}",
        report.residual_before.max, report.residual_after.max
    );
    println!(
        "  thread length: {length_m:.2} m (recommend {:.2} m with margin)",
        length_m * 1.2
    );
    println!("  elapsed_ms: {:.3}", report.elapsed_ms);
}

fn write_artifacts(
    config: &RuntimeConfig,
    report: &RouteReport,
    layout: &CircleLayout,
) -> Result<(), string_art::RouteError> {
    let output = &config.output;

    if let Some(path) = &output.instructions_csv {
        write_instructions_csv(path, report, layout, config.scale)?;
        println!("Instructions written to {}", path.display());
    }
    if let Some(path) = &output.instructions_txt {
        write_instructions_txt(path, report)?;
        println!("Instructions written to {}", path.display());
    }
    if let Some(path) = &output.scheme_png {
        save_rgb_png(&render_scheme(layout, &SchemeOptions::default()), path)?;
        println!("Nail scheme written to {}", path.display());
    }
    if let Some(path) = &output.simulation_png {
        let sim = render_simulation(report, layout, &SimulationOptions::default());
        save_rgb_png(&sim, path)?;
        println!("Simulation written to {}", path.display());
    }
    if let Some(path) = &output.report_json {
        write_json_file(path, report)?;
        println!("Report written to {}", path.display());
    }
    if let Some(path) = &output.residual_png {
        if let Some(residual) = &report.final_residual {
            save_field_png(residual, path)?;
            println!("Residual written to {}", path.display());
        }
    }
    Ok(())
}
