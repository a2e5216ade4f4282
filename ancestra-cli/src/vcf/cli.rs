use clap::{Arg, Command};

pub const VCF_CMD: &str = "vcf";

pub fn create_vcf_cli() -> Command {
    Command::new(VCF_CMD)
        .about("Emit a VCF from a reconciled CSV for the haplogroup classifier")
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .required(true)
                .help("Reconciled CSV produced by convert"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .required(true)
                .help("Output VCF path (bgzf-compressed and tabix-indexed when it ends in .gz)"),
        )
}
