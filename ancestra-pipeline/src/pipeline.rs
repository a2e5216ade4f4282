//! The report-creation orchestrator.
//!
//! Stage order for a new report: reconcile, variant table, ancestry,
//! haplogroup, raw-data archive, metadata row. The metadata row goes in
//! last, so a crash mid-run leaves partial tables but no `reports` entry;
//! retrying with [`WriteMode::Overwrite`] replaces whatever was written.
//! Scratch files live in a per-run temporary directory that is removed on
//! every exit path.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use ancestra_core::ReferencePanel;
use ancestra_core::models::DataSource;
use ancestra_reconcile::{read_vendor_calls, reconcile_calls, vcf::write_vcf};
use ancestra_store::{ReportId, ReportRecord, ReportStore, WriteMode};
use ancestra_traits::TraitDefinition;

use crate::ancestry::run_ancestry;
use crate::config::PipelineConfig;
use crate::haplogroup::run_haplogroup;

/// Template fixtures shown before any real upload exists.
const TEMPLATE_ADMIXTURE: [(&str, f64); 4] = [
    ("Omotic", 0.01),
    ("North_Sea_Germanic", 0.02),
    ("West_African", 13.28),
    ("East_Asian", 86.69),
];
const TEMPLATE_Y_HAP: &str = "O2a2a1a1a";
const TEMPLATE_MT_HAP: &str = "F1a1";

pub struct Pipeline {
    config: PipelineConfig,
    store: ReportStore,
    panel: ReferencePanel,
}

impl Pipeline {
    /// Open the store and load the reference panel.
    pub fn open(config: PipelineConfig) -> Result<Pipeline> {
        let store = ReportStore::open(&config.db_path)
            .with_context(|| format!("Failed to open database: {:?}", config.db_path))?;
        let panel = ReferencePanel::from_file(&config.panel_path)
            .with_context(|| format!("Failed to load reference panel: {:?}", config.panel_path))?;
        Ok(Pipeline {
            config,
            store,
            panel,
        })
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ReportStore {
        &mut self.store
    }

    /// Run the whole pipeline for one uploaded file and return the
    /// inserted report record.
    pub fn create_report(
        &mut self,
        input: &Path,
        source: DataSource,
        name: &str,
        make_default: bool,
        mode: WriteMode,
    ) -> Result<ReportRecord> {
        let user_id = self
            .store
            .primary_user()?
            .context("Database has no user; run init first")?;

        let report_id = ReportId::random();
        let scratch = self.scratch_dir()?;

        println!("Creating report {} from {:?}", report_id, input);
        let rows = self.reconcile(input, source)?;
        let total = self
            .store
            .create_variant_table(&report_id, &rows, mode)
            .context("Failed to store variant table")?;

        if let Some(ancestry) = self.config.ancestry.clone() {
            let components = run_ancestry(
                &ancestry,
                input,
                source,
                scratch.path(),
                self.config.tool_timeout(),
            )?;
            self.store.upsert_admixture(&report_id, &components, mode)?;
        } else {
            println!("No ancestry estimator configured, skipping stage");
        }

        if let Some(haplogroup) = self.config.haplogroup.clone() {
            let vcf_file = scratch.path().join("calls.vcf.gz");
            write_vcf(&rows, &vcf_file)?;
            let call = run_haplogroup(
                &haplogroup,
                &vcf_file,
                scratch.path(),
                self.config.tool_timeout(),
            )?;
            self.store
                .upsert_haplogroup(&report_id, &call.y_hap, &call.mt_hap, mode)?;
        } else {
            println!("No haplogroup classifier configured, skipping stage");
        }

        let extension = self.archive_rawdata(input, &report_id)?;

        let record = self.store.insert_report(ReportRecord {
            report_id,
            user_id,
            file_format: extension,
            data_source: source.to_string(),
            name: name.to_string(),
            is_default: make_default,
            total_variants: total,
            upload_date: chrono::Utc::now().to_rfc3339(),
        })?;

        println!(
            "Report {} committed with {} variants",
            record.report_id, record.total_variants
        );
        Ok(record)
    }

    /// Bootstrap a fresh database: user, template report fixtures and
    /// builtin traits. Idempotent under `CreateOnly`; `Overwrite` rebuilds
    /// the template artifacts in place.
    pub fn init_database(
        &mut self,
        name: &str,
        email: &str,
        template_raw: &Path,
        traits_json: Option<&Path>,
        mode: WriteMode,
    ) -> Result<()> {
        let user_id = self.store.ensure_user(email, name)?;
        let template = ReportId::template();

        if mode.overwrite() || !self.store.has_admixture(&template)? {
            let components = TEMPLATE_ADMIXTURE
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect();
            self.store
                .upsert_admixture(&template, &components, WriteMode::Overwrite)?;
        }
        if mode.overwrite() || !self.store.has_haplogroup(&template)? {
            self.store.upsert_haplogroup(
                &template,
                TEMPLATE_Y_HAP,
                TEMPLATE_MT_HAP,
                WriteMode::Overwrite,
            )?;
        }

        // template data ships in 23andMe format; no external stages here
        if mode.overwrite() || !self.store.variant_table_exists(&template)? {
            let rows = self.reconcile(template_raw, DataSource::TwentyThreeAndMe)?;
            let total =
                self.store
                    .create_variant_table(&template, &rows, WriteMode::Overwrite)?;
            if self.store.get_report(&template)?.is_none() {
                self.store.insert_report(ReportRecord {
                    report_id: template.clone(),
                    user_id: user_id.clone(),
                    file_format: "txt".to_string(),
                    data_source: DataSource::TwentyThreeAndMe.to_string(),
                    name: "EXAMPLE".to_string(),
                    is_default: true,
                    total_variants: total,
                    upload_date: chrono::Utc::now().to_rfc3339(),
                })?;
            }
        }

        if let Some(path) = traits_json {
            if mode.overwrite() || self.store.list_traits()?.is_empty() {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read traits file: {:?}", path))?;
                let definitions: Vec<TraitDefinition> = serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse traits file: {:?}", path))?;
                self.store.import_traits(&definitions)?;
                println!("Seeded {} builtin traits", definitions.len());
            }
        }

        println!("Database initialized for user {}", user_id);
        Ok(())
    }

    /// Locate the archived raw-data file behind a report. The template
    /// report has no archived upload and refuses export.
    pub fn export_rawdata(&self, report_id: &ReportId) -> Result<Option<PathBuf>> {
        if report_id.is_template() {
            bail!("The template report has no raw data to export");
        }

        let rawdata_id = report_id.rawdata_id();
        let entries = match std::fs::read_dir(&self.config.rawdata_dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(None),
        };
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            if file_name.to_string_lossy().starts_with(&rawdata_id) {
                return Ok(Some(entry.path()));
            }
        }
        Ok(None)
    }

    fn reconcile(
        &self,
        input: &Path,
        source: DataSource,
    ) -> Result<Vec<ancestra_core::models::ReconciledVariant>> {
        let calls = read_vendor_calls(input, source)
            .with_context(|| format!("Failed to parse vendor file: {:?}", input))?;
        let (rows, stats) = reconcile_calls(&calls, &self.panel, true);
        println!(
            "Reconciled {}/{} calls ({:.2}%)",
            stats.matched_rows,
            stats.total_calls,
            stats.rate() * 100.0
        );
        Ok(rows)
    }

    fn scratch_dir(&self) -> Result<tempfile::TempDir> {
        std::fs::create_dir_all(&self.config.scratch_dir)?;
        let scratch = tempfile::Builder::new()
            .prefix("ancestra-")
            .tempdir_in(&self.config.scratch_dir)
            .context("Failed to create scratch directory")?;
        Ok(scratch)
    }

    fn archive_rawdata(&self, input: &Path, report_id: &ReportId) -> Result<String> {
        let extension = input
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "txt".to_string());

        std::fs::create_dir_all(&self.config.rawdata_dir)?;
        let target = self
            .config
            .rawdata_dir
            .join(format!("{}.{}", report_id.rawdata_id(), extension));
        std::fs::copy(input, &target)
            .with_context(|| format!("Failed to archive raw data to {:?}", target))?;
        Ok(extension)
    }
}
