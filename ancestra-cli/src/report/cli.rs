use clap::{Arg, ArgAction, Command};

pub const REPORT_CMD: &str = "report";
pub const REPORT_CREATE: &str = "create";
pub const REPORT_DELETE: &str = "delete";
pub const REPORT_RENAME: &str = "rename";
pub const REPORT_SET_DEFAULT: &str = "set-default";
pub const REPORT_LIST: &str = "list";
pub const REPORT_INFO: &str = "info";
pub const REPORT_EXPORT: &str = "export";

fn db_arg() -> Arg {
    Arg::new("db")
        .long("db")
        .required(true)
        .help("SQLite database path")
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .help("Report identifier (RPT_...)")
}

pub fn create_report_cli() -> Command {
    Command::new(REPORT_CMD)
        .about("Create and manage reports")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(REPORT_CREATE)
                .about("Run the full pipeline for an uploaded raw-data file")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .required(true)
                        .help("Pipeline config TOML"),
                )
                .arg(
                    Arg::new("input")
                        .long("input")
                        .short('i')
                        .required(true)
                        .help("Vendor raw-data file"),
                )
                .arg(
                    Arg::new("source")
                        .long("source")
                        .short('s')
                        .required(true)
                        .help("Vendor format: 23andme, ancestry, or generic"),
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .required(true)
                        .help("Report display name"),
                )
                .arg(
                    Arg::new("default")
                        .long("default")
                        .action(ArgAction::SetTrue)
                        .help("Make this the default report"),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .action(ArgAction::SetTrue)
                        .help("Overwrite existing stage artifacts"),
                ),
        )
        .subcommand(
            Command::new(REPORT_DELETE)
                .about("Delete a report and all of its rows")
                .arg(db_arg())
                .arg(id_arg()),
        )
        .subcommand(
            Command::new(REPORT_RENAME)
                .about("Rename a report")
                .arg(db_arg())
                .arg(id_arg())
                .arg(
                    Arg::new("name")
                        .long("name")
                        .required(true)
                        .help("New display name"),
                ),
        )
        .subcommand(
            Command::new(REPORT_SET_DEFAULT)
                .about("Make a report the default")
                .arg(db_arg())
                .arg(id_arg()),
        )
        .subcommand(
            Command::new(REPORT_LIST)
                .about("List all reports")
                .arg(db_arg())
                .arg(
                    Arg::new("ids")
                        .long("ids")
                        .action(ArgAction::SetTrue)
                        .help("Print report identifiers only, one per line"),
                ),
        )
        .subcommand(
            Command::new(REPORT_INFO)
                .about("Show one report's metadata as JSON")
                .arg(db_arg())
                .arg(id_arg()),
        )
        .subcommand(
            Command::new(REPORT_EXPORT)
                .about("Locate the archived raw-data file behind a report")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .required(true)
                        .help("Pipeline config TOML"),
                )
                .arg(id_arg()),
        )
}
