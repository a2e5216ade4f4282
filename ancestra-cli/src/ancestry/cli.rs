use clap::{Arg, Command};

pub const ADMIXTURE_CMD: &str = "admixture";
pub const HAPLOGROUP_CMD: &str = "haplogroup";

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

pub fn create_admixture_cli() -> Command {
    Command::new(ADMIXTURE_CMD)
        .about("Show a report's ancestry component percentages")
        .arg(db_arg())
        .arg(report_arg())
}

pub fn create_haplogroup_cli() -> Command {
    Command::new(HAPLOGROUP_CMD)
        .about("Show a report's Y and mitochondrial haplogroup labels")
        .arg(db_arg())
        .arg(report_arg())
}
