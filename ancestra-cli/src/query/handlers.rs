use std::path::Path;

use anyhow::Result;
use clap::ArgMatches;

use ancestra_store::{ReportId, ReportStore};

use super::cli::*;

pub fn run_query(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some((QUERY_RSID, matches)) => rsid(matches),
        Some((QUERY_CLINVAR, matches)) => clinvar(matches),
        _ => unreachable!("Query subcommand not found"),
    }
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

fn rsid(matches: &ArgMatches) -> Result<()> {
    let (store, report) = open(matches)?;
    let rsids: Vec<String> = matches
        .get_many::<String>("rsids")
        .expect("At least one rsid is required.")
        .cloned()
        .collect();

    for (rsid, variant) in store.variants_by_rsid(&report, &rsids)? {
        match variant {
            Some(variant) => println!("{}", serde_json::to_string(&variant)?),
            None => println!("{}", miss_line(&rsid)),
        }
    }
    Ok(())
}

fn miss_line(rsid: &str) -> serde_json::Value {
    serde_json::json!({ "rsid": rsid, "found": false })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("rs123")]
    #[case(r#"rs"1\2"#)]
    fn test_miss_line_is_valid_json(#[case] rsid: &str) {
        let line = miss_line(rsid).to_string();
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["rsid"], rsid);
        assert_eq!(parsed["found"], false);
    }
}

fn clinvar(matches: &ArgMatches) -> Result<()> {
    let (store, report) = open(matches)?;
    let rows = store.clinvar_variants(&report, matches.get_flag("indels"))?;
    for row in &rows {
        println!("{}", serde_json::to_string(row)?);
    }
    println!("{} classified variants", rows.len());
    Ok(())
}
