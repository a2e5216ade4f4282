use clap::{Arg, ArgAction, Command};

pub const QUERY_CMD: &str = "query";
pub const QUERY_RSID: &str = "rsid";
pub const QUERY_CLINVAR: &str = "clinvar";

fn db_arg() -> Arg {
    Arg::new("db")
        .long("db")
        .required(true)
        .help("SQLite database path")
}

fn report_arg() -> Arg {
    Arg::new("report")
        .long("report")
        .short('r')
        .required(true)
        .help("Report identifier (RPT_...)")
}

pub fn create_query_cli() -> Command {
    Command::new(QUERY_CMD)
        .about("Query a report's variant table")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(QUERY_RSID)
                .about("Look up variants by rsid")
                .arg(db_arg())
                .arg(report_arg())
                .arg(
                    Arg::new("rsids")
                        .required(true)
                        .num_args(1..)
                        .help("rsids to look up"),
                ),
        )
        .subcommand(
            Command::new(QUERY_CLINVAR)
                .about("List variants with a recognized ClinVar significance class")
                .arg(db_arg())
                .arg(report_arg())
                .arg(
                    Arg::new("indels")
                        .long("indels")
                        .action(ArgAction::SetTrue)
                        .help("Include indel sites"),
                ),
        )
}
