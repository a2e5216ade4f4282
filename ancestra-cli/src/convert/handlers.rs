use std::path::Path;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use clap::ArgMatches;

use ancestra_core::ReferencePanel;
use ancestra_core::models::DataSource;
use ancestra_reconcile::output::write_reconciled_csv;
use ancestra_reconcile::{read_vendor_calls, reconcile_calls};

pub fn run_convert(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .expect("An input file is required.");
    let source = matches
        .get_one::<String>("source")
        .expect("A source format is required.");
    let panel = matches
        .get_one::<String>("panel")
        .expect("A reference panel is required.");
    let output = matches
        .get_one::<String>("output")
        .expect("An output path is required.");

    let source = DataSource::from_str(source).map_err(|e| anyhow!(e))?;
    let panel = ReferencePanel::from_file(Path::new(panel))?;
    println!("Loaded reference panel with {} records", panel.len());

    let calls = read_vendor_calls(Path::new(input), source)?;
    let (rows, stats) = reconcile_calls(&calls, &panel, true);
    write_reconciled_csv(&rows, Path::new(output))?;

    println!(
        "Reconciled {}/{} calls ({:.2}%) into {}",
        stats.matched_rows,
        stats.total_calls,
        stats.rate() * 100.0,
        output
    );

    Ok(())
}
