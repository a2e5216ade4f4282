use clap::{Arg, Command};

pub const TRAIT_CMD: &str = "trait";
pub const TRAIT_ADD: &str = "add";
pub const TRAIT_REMOVE: &str = "remove";
pub const TRAIT_IMPORT: &str = "import";
pub const TRAIT_EXPORT: &str = "export";
pub const TRAIT_RESULTS: &str = "results";

fn db_arg() -> Arg {
    Arg::new("db")
        .long("db")
        .required(true)
        .help("SQLite database path")
}

pub fn create_trait_cli() -> Command {
    Command::new(TRAIT_CMD)
        .about("Manage trait definitions and compute per-report results")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(TRAIT_ADD)
                .about("Add a user-defined trait from a JSON definition")
                .arg(db_arg())
                .arg(
                    Arg::new("file")
                        .long("file")
                        .short('f')
                        .required(true)
                        .help("Trait definition JSON"),
                ),
        )
        .subcommand(
            Command::new(TRAIT_REMOVE)
                .about("Delete a user-defined trait")
                .arg(db_arg())
                .arg(
                    Arg::new("id")
                        .long("id")
                        .required(true)
                        .help("Trait identifier (TRA_...)"),
                ),
        )
        .subcommand(
            Command::new(TRAIT_IMPORT)
                .about("Import trait definitions from a JSON array, keeping their ids")
                .arg(db_arg())
                .arg(
                    Arg::new("file")
                        .long("file")
                        .short('f')
                        .required(true)
                        .help("Trait definitions JSON"),
                ),
        )
        .subcommand(
            Command::new(TRAIT_EXPORT)
                .about("Export user-defined traits as a JSON array")
                .arg(db_arg())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output path; stdout when omitted"),
                ),
        )
        .subcommand(
            Command::new(TRAIT_RESULTS)
                .about("Evaluate every trait against one report")
                .arg(db_arg())
                .arg(
                    Arg::new("report")
                        .long("report")
                        .short('r')
                        .required(true)
                        .help("Report identifier (RPT_...)"),
                ),
        )
}
