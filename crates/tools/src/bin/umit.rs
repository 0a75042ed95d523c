//! Umit - A-scan analysis of ultrasonic thickness captures
//!
//! Entry point for the analyze, plot and generate commands

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use umit_core::filter::BiquadCascade;
use umit_core::prelude::*;
use umit_tools::analyze::{summary, AnalyzeConfig, MeasureAnalyzer};
use umit_tools::common::init_logging;
use umit_tools::config::UmitConfig;
use umit_tools::plot::{run_plot, PlotConfig};
use umit_tools::synth::{self, SynthConfig};

/// Umit A-scan tool
#[derive(Parser)]
#[command(name = "umit")]
#[command(about = "Ultrasonic thickness A-scan analysis")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Settings file (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the envelope, gate peaks and thickness of a capture
    Ascan(AnalyzeConfig),
    /// Compute the drawing geometry of a capture
    Plot(PlotConfig),
    /// Generate a synthetic capture
    Generate(SynthConfig),
    /// Show processing parameters
    Info,
}

fn show_info(settings: &UmitConfig) {
    let sampling = settings.sampling;
    let stages = BiquadCascade::for_sampling(&sampling)
        .map(|cascade| cascade.order().to_string())
        .unwrap_or_else(|_| "unsupported".to_string());

    println!("\n=== Umit A-scan ===");
    println!("Version: 0.1.0");

    println!("\n=== Processing ===");
    println!("  • Buffer length:      {} samples", BUFFER_LENGTH);
    println!("  • Spike threshold:    {}", MAX_VALUE);
    println!("  • Center frequency:   {} MHz", sampling.center_frequency_hz / 1e6);
    println!("  • Sampling frequency: {} MHz", sampling.sampling_frequency_mhz());
    println!("  • Biquad stages:      {}", stages);
    println!("  • Envelope mode:      {:?}", settings.envelope_mode);

    println!("\n=== Default gates ===");
    for (name, gate) in [("A", settings.gate_a), ("B", settings.gate_b)] {
        println!(
            "  • Gate {}: start {} µs, width {} µs, threshold {}%",
            name, gate.start_us, gate.width_us, gate.threshold_percent
        );
    }

    println!("\n=== Example Usage ===");
    println!("  Generate: umit generate -o measure.json --thickness-mm 12");
    println!("  Analyze:  umit ascan -i measure.json -o analysis.json");
    println!("  Plot:     umit plot -i measure.json --width 800 --height 528");
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug)?;

    let settings = UmitConfig::load(cli.config.as_deref())?;
    info!("Umit A-scan tool starting");

    match cli.command {
        Commands::Ascan(config) => {
            let analyzer = MeasureAnalyzer::new(config, settings)?;
            let analysis = analyzer.run()?;
            println!("{}", summary(&analysis));
        }

        Commands::Plot(config) => {
            let geometry = run_plot(&config, &settings)?;
            if config.output.is_some() {
                println!("✓ Plot geometry: {} curve points", geometry.curve.len());
            }
        }

        Commands::Generate(config) => {
            let record = synth::run(&config, &settings.sampling)?;
            println!(
                "✓ Synthetic capture: {} points written to {:?}",
                record.points.len(),
                config.output
            );
        }

        Commands::Info => show_info(&settings),
    }

    Ok(())
}
