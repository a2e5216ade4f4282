use std::path::Path;

use anyhow::Result;
use clap::ArgMatches;

use ancestra_pipeline::{Pipeline, PipelineConfig};
use ancestra_store::WriteMode;

pub fn run_init(matches: &ArgMatches) -> Result<()> {
    let config = matches
        .get_one::<String>("config")
        .expect("A config file is required.");
    let name = matches
        .get_one::<String>("name")
        .expect("A user name is required.");
    let email = matches
        .get_one::<String>("email")
        .expect("A user email is required.");
    let template = matches
        .get_one::<String>("template")
        .expect("A template raw-data file is required.");
    let traits = matches.get_one::<String>("traits");
    let mode = if matches.get_flag("force") {
        WriteMode::Overwrite
    } else {
        WriteMode::CreateOnly
    };

    let config = PipelineConfig::from_file(Path::new(config))?;
    let mut pipeline = Pipeline::open(config)?;
    pipeline.init_database(
        name,
        email,
        Path::new(template),
        traits.map(Path::new),
        mode,
    )?;

    Ok(())
}
