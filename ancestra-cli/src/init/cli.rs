use clap::{Arg, ArgAction, Command};

pub const INIT_CMD: &str = "init";

pub fn create_init_cli() -> Command {
    Command::new(INIT_CMD)
        .about("Bootstrap the database: user, template report and builtin traits")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .required(true)
                .help("Pipeline config TOML"),
        )
        .arg(
            Arg::new("name")
                .long("name")
                .required(true)
                .help("User display name"),
        )
        .arg(
            Arg::new("email")
                .long("email")
                .required(true)
                .help("User email"),
        )
        .arg(
            Arg::new("template")
                .long("template")
                .required(true)
                .help("Template raw-data file (23andMe format)"),
        )
        .arg(
            Arg::new("traits")
                .long("traits")
                .help("Builtin trait definitions JSON"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Rebuild template artifacts even when present"),
        )
}
