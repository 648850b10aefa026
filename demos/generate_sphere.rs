//! Generate a random spherical Voronoi tessellation and report on it
//!
//! Usage: cargo run --release --example generate_sphere -- [count] [target] [output.obj]

use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;

use rust_voronoi_sweep::*;
use tracing::Level;

fn parse_arg(args: &[String], index: usize, name: &str) -> Result<Option<usize>> {
    match args.get(index) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| VoronoiError::InvalidConfig(format!("{} must be a positive integer, got {:?}", name, raw))),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let args: Vec<String> = std::env::args().collect();
    let count = parse_arg(&args, 1, "count")?.unwrap_or(10_000);
    let target = parse_arg(&args, 2, "target")?;
    let output = args.get(3);

    let mut builder = GeneratorConfigBuilder::new().seed(42);
    if let Some(target) = target {
        builder = builder.target_cells(target)?;
    }
    let config = builder.build()?;

    let start = Instant::now();
    let tessellation = Tessellation::generate_random(count, config)?;
    let elapsed = start.elapsed();

    println!("Sites:           {}", tessellation.cell_count());
    println!("Target:          {}", tessellation.target_cells());
    println!("Completed cells: {}", tessellation.completed_cells());
    println!("Unresolved:      {}", tessellation.unresolved_cells().len());
    println!("Generation time: {:?}", elapsed);
    println!();

    for stats in tessellation.sweep_stats() {
        println!(
            "  {}: {:>8} site events, {:>8} circle events, {:>8} corners, {:>8} slots, {:?}",
            stats.direction, stats.site_events, stats.circle_events, stats.corners, stats.slots_used, stats.elapsed
        );
    }
    println!();

    let report = check_closure(&tessellation, 0.01);
    println!(
        "Closure: {} ({} cells, {} corners checked, {} violations)",
        if report.is_valid() { "ok" } else { "FAILED" },
        report.cells_checked,
        report.corners_checked,
        report.violations.len()
    );

    if let Some(path) = output {
        let file = File::create(path)?;
        write_obj(&tessellation, BufWriter::new(file))?;
        println!("Wrote {}", path);
    }

    Ok(())
}
