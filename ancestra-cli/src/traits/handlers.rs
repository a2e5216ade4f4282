use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use ancestra_store::{ReportId, ReportStore};
use ancestra_traits::TraitDefinition;

use super::cli::*;

pub fn run_trait(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some((TRAIT_ADD, matches)) => add(matches),
        Some((TRAIT_REMOVE, matches)) => remove(matches),
        Some((TRAIT_IMPORT, matches)) => import(matches),
        Some((TRAIT_EXPORT, matches)) => export(matches),
        Some((TRAIT_RESULTS, matches)) => results(matches),
        _ => unreachable!("Trait subcommand not found"),
    }
}

fn open_store(matches: &ArgMatches) -> Result<ReportStore> {
    let db = matches
        .get_one::<String>("db")
        .expect("A database path is required.");
    Ok(ReportStore::open(Path::new(db))?)
}

fn read_definitions(path: &str) -> Result<Vec<TraitDefinition>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read trait file: {}", path))?;
    // accept either a single definition or an array of them
    if let Ok(single) = serde_json::from_str::<TraitDefinition>(&text) {
        return Ok(vec![single]);
    }
    serde_json::from_str(&text).with_context(|| format!("Failed to parse trait file: {}", path))
}

fn add(matches: &ArgMatches) -> Result<()> {
    let mut store = open_store(matches)?;
    let file = matches
        .get_one::<String>("file")
        .expect("A trait definition file is required.");

    for definition in read_definitions(file)? {
        let id = store.add_user_trait(definition)?;
        println!("Added trait {}", id);
    }
    Ok(())
}

fn remove(matches: &ArgMatches) -> Result<()> {
    let mut store = open_store(matches)?;
    let id = matches
        .get_one::<String>("id")
        .expect("A trait identifier is required.");
    store.delete_trait(id)?;
    println!("Deleted trait {}", id);
    Ok(())
}

fn import(matches: &ArgMatches) -> Result<()> {
    let mut store = open_store(matches)?;
    let file = matches
        .get_one::<String>("file")
        .expect("A trait definitions file is required.");

    let definitions = read_definitions(file)?;
    store.import_traits(&definitions)?;
    println!("Imported {} traits", definitions.len());
    Ok(())
}

fn export(matches: &ArgMatches) -> Result<()> {
    let store = open_store(matches)?;
    let definitions = store.export_user_traits()?;
    let json = serde_json::to_string_pretty(&definitions)?;

    match matches.get_one::<String>("output") {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write trait export: {}", path))?;
            println!("Exported {} traits to {}", definitions.len(), path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn results(matches: &ArgMatches) -> Result<()> {
    let store = open_store(matches)?;
    let report = matches
        .get_one::<String>("report")
        .expect("A report identifier is required.");
    let report = ReportId::new(report)?;

    let outcomes = store.trait_outcomes(&report)?;
    println!("{}", serde_json::to_string_pretty(&outcomes)?);
    Ok(())
}
