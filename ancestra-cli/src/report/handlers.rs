use std::path::Path;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use clap::ArgMatches;

use ancestra_core::models::DataSource;
use ancestra_pipeline::{Pipeline, PipelineConfig};
use ancestra_store::{ReportId, ReportStore, WriteMode};

use super::cli::*;

pub fn run_report(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some((REPORT_CREATE, matches)) => create(matches),
        Some((REPORT_DELETE, matches)) => delete(matches),
        Some((REPORT_RENAME, matches)) => rename(matches),
        Some((REPORT_SET_DEFAULT, matches)) => set_default(matches),
        Some((REPORT_LIST, matches)) => list(matches),
        Some((REPORT_INFO, matches)) => info(matches),
        Some((REPORT_EXPORT, matches)) => export(matches),
        _ => unreachable!("Report subcommand not found"),
    }
}

fn open_store(matches: &ArgMatches) -> Result<ReportStore> {
    let db = matches
        .get_one::<String>("db")
        .expect("A database path is required.");
    Ok(ReportStore::open(Path::new(db))?)
}

fn report_id(matches: &ArgMatches) -> Result<ReportId> {
    let id = matches
        .get_one::<String>("id")
        .expect("A report identifier is required.");
    Ok(ReportId::new(id)?)
}

fn create(matches: &ArgMatches) -> Result<()> {
    let config = matches
        .get_one::<String>("config")
        .expect("A config file is required.");
    let input = matches
        .get_one::<String>("input")
        .expect("An input file is required.");
    let source = matches
        .get_one::<String>("source")
        .expect("A source format is required.");
    let name = matches
        .get_one::<String>("name")
        .expect("A report name is required.");
    let mode = if matches.get_flag("force") {
        WriteMode::Overwrite
    } else {
        WriteMode::CreateOnly
    };

    let source = DataSource::from_str(source).map_err(|e| anyhow!(e))?;
    let config = PipelineConfig::from_file(Path::new(config))?;
    let mut pipeline = Pipeline::open(config)?;
    pipeline.create_report(
        Path::new(input),
        source,
        name,
        matches.get_flag("default"),
        mode,
    )?;

    Ok(())
}

fn delete(matches: &ArgMatches) -> Result<()> {
    let mut store = open_store(matches)?;
    let id = report_id(matches)?;
    store.delete_report(&id)?;
    println!("Deleted report {}", id);
    Ok(())
}

fn rename(matches: &ArgMatches) -> Result<()> {
    let mut store = open_store(matches)?;
    let id = report_id(matches)?;
    let name = matches
        .get_one::<String>("name")
        .expect("A report name is required.");
    store.rename_report(&id, name)?;
    println!("Renamed report {} to {}", id, name);
    Ok(())
}

fn set_default(matches: &ArgMatches) -> Result<()> {
    let mut store = open_store(matches)?;
    let id = report_id(matches)?;
    store.set_default_report(&id)?;
    println!("Report {} is now the default", id);
    Ok(())
}

fn list(matches: &ArgMatches) -> Result<()> {
    let store = open_store(matches)?;
    if matches.get_flag("ids") {
        for id in store.list_report_ids()? {
            println!("{}", id);
        }
        return Ok(());
    }
    for report in store.list_reports()? {
        let marker = if report.is_default { "*" } else { " " };
        println!(
            "{} {}  {}  {}  {} variants  {}",
            marker,
            report.report_id,
            report.name,
            report.data_source,
            report.total_variants,
            report.upload_date
        );
    }
    Ok(())
}

fn info(matches: &ArgMatches) -> Result<()> {
    let store = open_store(matches)?;
    let id = report_id(matches)?;
    match store.get_report(&id)? {
        Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
        None => println!("Report not found: {}", id),
    }
    Ok(())
}

fn export(matches: &ArgMatches) -> Result<()> {
    let config = matches
        .get_one::<String>("config")
        .expect("A config file is required.");
    let id = report_id(matches)?;

    let config = PipelineConfig::from_file(Path::new(config))?;
    let pipeline = Pipeline::open(config)?;
    match pipeline.export_rawdata(&id)? {
        Some(path) => println!("{}", path.display()),
        None => println!("No archived raw data for report {}", id),
    }
    Ok(())
}
