use std::path::Path;

use anyhow::Result;
use clap::ArgMatches;

use ancestra_reconcile::output::read_reconciled_csv;
use ancestra_reconcile::vcf::write_vcf;

pub fn run_vcf(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .expect("An input CSV is required.");
    let output = matches
        .get_one::<String>("output")
        .expect("An output path is required.");

    let rows = read_reconciled_csv(Path::new(input))?;
    write_vcf(&rows, Path::new(output))?;
    println!("Wrote VCF for {} reconciled rows to {}", rows.len(), output);

    Ok(())
}
