use clap::{Arg, Command};

pub const CONVERT_CMD: &str = "convert";

pub fn create_convert_cli() -> Command {
    Command::new(CONVERT_CMD)
        .about("Reconcile a vendor raw-data file against the reference panel into the canonical CSV")
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .required(true)
                .help("Vendor raw-data file (plain or gzip)"),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .short('s')
                .required(true)
                .help("Vendor format: 23andme, ancestry, or generic"),
        )
        .arg(
            Arg::new("panel")
                .long("panel")
                .short('p')
                .required(true)
                .help("Reference-panel file"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .required(true)
                .help("Path for the reconciled CSV"),
        )
}
