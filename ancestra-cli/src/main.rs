mod ancestry;
mod convert;
mod init;
mod query;
mod report;
mod traits;
mod vcf;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "ancestra";
    pub const BIN_NAME: &str = "ancestra";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Consumer genotype report engine: vendor-file reconciliation, per-report variant storage, trait formulas and lineage annotations.")
        .subcommand_required(true)
        .subcommand(convert::cli::create_convert_cli())
        .subcommand(vcf::cli::create_vcf_cli())
        .subcommand(init::cli::create_init_cli())
        .subcommand(report::cli::create_report_cli())
        .subcommand(query::cli::create_query_cli())
        .subcommand(traits::cli::create_trait_cli())
        .subcommand(ancestry::cli::create_admixture_cli())
        .subcommand(ancestry::cli::create_haplogroup_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // RECONCILIATION
        //
        Some((convert::cli::CONVERT_CMD, matches)) => {
            convert::handlers::run_convert(matches)?;
        }

        //
        // VCF EMISSION
        //
        Some((vcf::cli::VCF_CMD, matches)) => {
            vcf::handlers::run_vcf(matches)?;
        }

        //
        // DATABASE BOOTSTRAP
        //
        Some((init::cli::INIT_CMD, matches)) => {
            init::handlers::run_init(matches)?;
        }

        //
        // REPORT MANAGEMENT
        //
        Some((report::cli::REPORT_CMD, matches)) => {
            report::handlers::run_report(matches)?;
        }

        //
        // VARIANT QUERIES
        //
        Some((query::cli::QUERY_CMD, matches)) => {
            query::handlers::run_query(matches)?;
        }

        //
        // TRAITS
        //
        Some((traits::cli::TRAIT_CMD, matches)) => {
            traits::handlers::run_trait(matches)?;
        }

        //
        // LINEAGE ANNOTATIONS
        //
        Some((ancestry::cli::ADMIXTURE_CMD, matches)) => {
            ancestry::handlers::run_admixture(matches)?;
        }
        Some((ancestry::cli::HAPLOGROUP_CMD, matches)) => {
            ancestry::handlers::run_haplogroup(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
