use std::path::Path;

use anyhow::Result;
use clap::ArgMatches;

use ancestra_store::{ReportId, ReportStore};

pub fn run_admixture(matches: &ArgMatches) -> Result<()> {
    let (store, report) = open(matches)?;

    let components = store.get_admixture(&report)?;
    if components.is_empty() {
        println!("No ancestry record for report {}", report);
        return Ok(());
    }

    let mut sorted: Vec<(&String, &f64)> = components.iter().collect();
    sorted.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
    for (name, percent) in sorted {
        println!("{}: {:.2}%", name, percent);
    }
    Ok(())
}

pub fn run_haplogroup(matches: &ArgMatches) -> Result<()> {
    let (store, report) = open(matches)?;

    match store.get_haplogroup(&report)? {
        Some((y_hap, mt_hap)) => {
            println!("Y:  {}", y_hap);
            println!("MT: {}", mt_hap);
        }
        None => println!("No haplogroup record for report {}", report),
    }
    Ok(())
}

fn open(matches: &ArgMatches) -> Result<(ReportStore, ReportId)> {
    let db = matches
        .get_one::<String>("db")
        .expect("A database path is required.");
    let report = matches
        .get_one::<String>("report")
        .expect("A report identifier is required.");
    Ok((
        ReportStore::open(Path::new(db))?,
        ReportId::new(report)?,
    ))
}
