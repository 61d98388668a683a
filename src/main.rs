//! Turing patterns CLI - Export model evolutions from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use turing_viz::{
    compute::TuringModel,
    export::{AnimationExporter, SnapshotExporter},
    schema::RunConfig,
};

fn print_usage(program: &str) {
    eprintln!("Usage: {} <run.json> <animate|snapshot> <target> [steps]", program);
    eprintln!();
    eprintln!("Evolve the three-species model and export images.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  run.json   Path to run configuration file");
    eprintln!("  animate    Write every step as a frame of <target> (GIF)");
    eprintln!("  snapshot   Write <target>_{{Tplus,Tp,Tminus}}.png of the final state");
    eprintln!("             into the configured snapshot.output_dir");
    eprintln!("  steps      Number of steps (default: from configuration)");
    eprintln!();
    eprintln!("Print an example configuration with --example.");
}

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "--example" {
        print_example_config();
        return;
    }

    if args.len() < 4 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let config_path = PathBuf::from(&args[1]);
    let command = args[2].as_str();
    let target = &args[3];

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: RunConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    let steps = match args.get(4) {
        Some(s) => s.parse().unwrap_or_else(|e| {
            eprintln!("Invalid step count '{}': {}", s, e);
            std::process::exit(1);
        }),
        None => config.steps,
    };

    println!("Turing Pattern Export");
    println!("=====================");
    println!("Grid: {}x{}", config.model.width, config.model.height);
    println!(
        "dt: {} ({} substeps per step)",
        config.model.dt, config.model.substeps
    );
    println!("Steps: {}", steps);
    println!();

    let mut model = TuringModel::new(config.model);
    let start = Instant::now();

    let result = match command {
        "animate" => AnimationExporter::new(config.animation)
            .export(&mut model, target, steps)
            .map(|stats| println!("Animation: {}", stats)),
        "snapshot" => SnapshotExporter::new(config.snapshot)
            .export(&mut model, target, steps)
            .map(|report| {
                println!("Snapshot at t = {:.2}:", report.time);
                for path in report.paths() {
                    println!("  {}", path.display());
                }
            }),
        other => {
            eprintln!("Unknown command '{}'", other);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Export failed: {}", e);
        std::process::exit(1);
    }

    let elapsed = start.elapsed();
    println!(
        "Time: {:.2}s ({:.1} steps/s)",
        elapsed.as_secs_f32(),
        steps as f32 / elapsed.as_secs_f32()
    );
}

fn print_example_config() {
    let config = RunConfig::default();

    println!("Example configuration (run.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
