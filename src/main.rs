use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use control_tower::analytics::SampleRng;
use control_tower::export;
use control_tower::report::Report;
use control_tower::session::DashboardSession;

/// Delivery-performance report over a shipment-records file.
#[derive(Parser)]
#[command(name = "control-tower", version, about)]
struct Args {
    /// Shipment data file (.csv, .json, .parquet)
    data_file: PathBuf,

    /// Restrict to these markets (repeatable; default: all observed)
    #[arg(long = "market", value_name = "MARKET")]
    markets: Vec<String>,

    /// Restrict to these shipping modes (repeatable)
    #[arg(long = "mode", value_name = "MODE")]
    modes: Vec<String>,

    /// Restrict to these customer segments (repeatable)
    #[arg(long = "segment", value_name = "SEGMENT")]
    segments: Vec<String>,

    /// Write the filtered records to this CSV file
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Emit the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Seed for the scatter sample (defaults to the clock)
    #[arg(long, value_name = "SEED")]
    sample_seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut session = DashboardSession::new();
    session
        .open(&args.data_file)
        .with_context(|| format!("loading {}", args.data_file.display()))?;

    // Flags narrow the default everything-selected state; dimensions with no
    // flag keep the full observed value set.
    if !args.markets.is_empty() {
        session.filters.markets = args.markets.iter().cloned().collect();
    }
    if !args.modes.is_empty() {
        session.filters.shipping_modes = args.modes.iter().cloned().collect();
    }
    if !args.segments.is_empty() {
        session.filters.customer_segments = args.segments.iter().cloned().collect();
    }
    session.refilter();

    let visible = session.visible_records();
    log::info!(
        "{} of {} records pass the active filters",
        visible.len(),
        session.dataset().map_or(0, |d| d.len())
    );

    let mut rng = match args.sample_seed {
        Some(seed) => SampleRng::new(seed),
        None => SampleRng::from_entropy(),
    };

    let report = match Report::build(&visible, &mut rng) {
        Ok(report) => report,
        Err(e) => {
            // Recoverable: tell the user, render nothing.
            eprintln!("{e}; adjust the filters and try again");
            std::process::exit(1);
        }
    };

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.to_text());
    }

    if let Some(path) = &args.export {
        export::export_csv(path, &visible)
            .with_context(|| format!("exporting to {}", path.display()))?;
        log::info!("wrote {} filtered records to {}", visible.len(), path.display());
    }

    Ok(())
}
