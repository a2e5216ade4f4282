//! The report store and all of its operations.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use rusqlite::{Connection, OptionalExtension, params};

use ancestra_core::models::{ReconciledVariant, Zygosity};
use ancestra_traits::{GenotypeRecord, TraitDefinition, TraitOutcome, evaluate_trait};

use crate::admixture::is_known_component;
use crate::error::StoreError;
use crate::ids::ReportId;
use crate::report::{ReportRecord, VariantPage, WriteMode};

const VARIANT_COLUMNS: &str =
    "chromosome, position, ref, alt, gene, rsid, gnomad_af, clnsig, clndn, genotype, gt";

const CLINVAR_CLASSES: [&str; 5] = [
    "Pathogenic",
    "Likely_pathogenic",
    "Benign",
    "Likely_benign",
    "Uncertain_significance",
];

/// Owner of the single database connection. All metadata writes serialize
/// through it; concurrent report creation is safe only because each report
/// writes to its own variant table.
pub struct ReportStore {
    conn: Connection,
}

impl ReportStore {
    /// Open (and create if needed) the store at the given path and make
    /// sure the shared tables exist.
    pub fn open<T: AsRef<Path>>(path: T) -> Result<ReportStore, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let conn = Connection::open(path)?;
        let store = ReportStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store, used by tests and dry runs.
    pub fn open_in_memory() -> Result<ReportStore, StoreError> {
        let store = ReportStore {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT UNIQUE NOT NULL,
                user_id TEXT UNIQUE NOT NULL,
                name TEXT,
                created_at TEXT
            );
            CREATE TABLE IF NOT EXISTS reports (
                report_id TEXT PRIMARY KEY,
                user_id TEXT,
                file_format TEXT,
                data_source TEXT,
                name TEXT,
                select_default INTEGER,
                total_snps INTEGER,
                upload_date TEXT
            );
            CREATE TABLE IF NOT EXISTS traits (
                id TEXT PRIMARY KEY,
                name TEXT,
                description TEXT,
                icon TEXT,
                confidence TEXT,
                is_default INTEGER,
                created_at TEXT,
                category TEXT,
                rsids TEXT,
                formula TEXT,
                score_thresholds TEXT,
                result TEXT,
                reference TEXT
            );
            CREATE TABLE IF NOT EXISTS haplogroup (
                report_id TEXT PRIMARY KEY,
                y_hap TEXT,
                mt_hap TEXT
            );
            CREATE TABLE IF NOT EXISTS admixture (
                report_id TEXT PRIMARY KEY,
                components TEXT
            );",
        )?;
        Ok(())
    }

    /// Return the existing user id for an email, or create the user with a
    /// fresh `ID_`-prefixed identifier.
    pub fn ensure_user(&mut self, email: &str, name: &str) -> Result<String, StoreError> {
        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT user_id FROM users WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(user_id) = existing {
            return Ok(user_id);
        }

        let user_id = format!("ID_{}", ancestra_core::utils::random_id_suffix());
        self.conn.execute(
            "INSERT INTO users (email, user_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![email, user_id, name, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(user_id)
    }

    /// First user in the store; the deployment model is single-user.
    pub fn primary_user(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .conn
            .query_row("SELECT user_id FROM users LIMIT 1", [], |row| row.get(0))
            .optional()?)
    }
}

// variant tables
impl ReportStore {
    pub fn variant_table_exists(&self, report_id: &ReportId) -> Result<bool, StoreError> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![report_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Create the report's variant table and fill it in one transaction.
    /// `CreateOnly` rejects an existing table; `Overwrite` drops it first.
    pub fn create_variant_table(
        &mut self,
        report_id: &ReportId,
        rows: &[ReconciledVariant],
        mode: WriteMode,
    ) -> Result<u64, StoreError> {
        if self.variant_table_exists(report_id)? {
            if !mode.overwrite() {
                return Err(StoreError::TableExists(report_id.to_string()));
            }
            self.conn
                .execute(&format!(r#"DROP TABLE "{}""#, report_id.as_str()), [])?;
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            &format!(
                r#"CREATE TABLE "{}" (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    chromosome TEXT,
                    position INTEGER,
                    ref TEXT,
                    alt TEXT,
                    gene TEXT,
                    rsid TEXT,
                    gnomad_af REAL,
                    clnsig TEXT,
                    clndn TEXT,
                    genotype TEXT,
                    gt TEXT
                )"#,
                report_id.as_str()
            ),
            [],
        )?;
        {
            let mut stmt = tx.prepare(&format!(
                r#"INSERT INTO "{}" ({})
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"#,
                report_id.as_str(),
                VARIANT_COLUMNS
            ))?;
            for row in rows {
                stmt.execute(params![
                    row.chrom,
                    row.pos,
                    row.ref_allele,
                    row.alt_allele,
                    row.gene,
                    row.rsid,
                    row.gnomad_af,
                    row.clnsig,
                    row.clndn,
                    row.genotype,
                    row.zygosity.to_string(),
                ])?;
            }
        }
        tx.commit()?;

        Ok(rows.len() as u64)
    }

    pub fn drop_variant_table(&mut self, report_id: &ReportId) -> Result<(), StoreError> {
        self.conn.execute(
            &format!(r#"DROP TABLE IF EXISTS "{}""#, report_id.as_str()),
            [],
        )?;
        Ok(())
    }

    pub fn variant_count(&self, report_id: &ReportId) -> Result<u64, StoreError> {
        Ok(self.conn.query_row(
            &format!(r#"SELECT COUNT(*) FROM "{}""#, report_id.as_str()),
            [],
            |row| row.get(0),
        )?)
    }

    /// Look up each rsid's first matching row. Missing rsids (and a
    /// missing table) yield `None` entries rather than errors.
    pub fn variants_by_rsid(
        &self,
        report_id: &ReportId,
        rsids: &[String],
    ) -> Result<Vec<(String, Option<ReconciledVariant>)>, StoreError> {
        if !self.variant_table_exists(report_id)? {
            return Ok(rsids.iter().map(|r| (r.clone(), None)).collect());
        }

        let mut stmt = self.conn.prepare(&format!(
            r#"SELECT {} FROM "{}" WHERE rsid = ?1"#,
            VARIANT_COLUMNS,
            report_id.as_str()
        ))?;

        let mut result = Vec::with_capacity(rsids.len());
        for rsid in rsids {
            let variant = stmt
                .query_row(params![rsid], row_to_variant)
                .optional()?;
            result.push((rsid.clone(), variant));
        }
        Ok(result)
    }

    /// Genotype records for the trait engine: rsids absent from the report
    /// are simply left out of the map.
    pub fn genotype_records(
        &self,
        report_id: &ReportId,
        rsids: &[String],
    ) -> Result<HashMap<String, GenotypeRecord>, StoreError> {
        let mut records = HashMap::new();
        for (rsid, variant) in self.variants_by_rsid(report_id, rsids)? {
            if let Some(variant) = variant {
                records.insert(
                    rsid,
                    GenotypeRecord {
                        reference: variant.reference_genotype(),
                        subject: variant.genotype,
                    },
                );
            }
        }
        Ok(records)
    }

    pub fn variant_by_site(
        &self,
        report_id: &ReportId,
        chrom: &str,
        pos: u64,
        ref_allele: &str,
        alt_allele: &str,
    ) -> Result<Option<ReconciledVariant>, StoreError> {
        if !self.variant_table_exists(report_id)? {
            return Ok(None);
        }
        Ok(self
            .conn
            .query_row(
                &format!(
                    r#"SELECT {} FROM "{}"
                       WHERE chromosome = ?1 AND position = ?2 AND ref = ?3 AND alt = ?4"#,
                    VARIANT_COLUMNS,
                    report_id.as_str()
                ),
                params![chrom, pos, ref_allele, alt_allele],
                row_to_variant,
            )
            .optional()?)
    }

    /// Paged full-table scan; `page` is 1-based.
    pub fn variant_page(
        &self,
        report_id: &ReportId,
        page: u64,
        page_size: u64,
    ) -> Result<VariantPage, StoreError> {
        let page = page.max(1);
        let page_size = page_size.max(1);

        if !self.variant_table_exists(report_id)? {
            return Ok(VariantPage {
                rows: Vec::new(),
                total: 0,
                page,
                page_size,
                total_pages: 0,
            });
        }

        let total = self.variant_count(report_id)?;
        let mut stmt = self.conn.prepare(&format!(
            r#"SELECT {} FROM "{}" LIMIT ?1 OFFSET ?2"#,
            VARIANT_COLUMNS,
            report_id.as_str()
        ))?;
        let rows = stmt
            .query_map(params![page_size, (page - 1) * page_size], row_to_variant)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VariantPage {
            rows,
            total,
            page,
            page_size,
            total_pages: total.div_ceil(page_size),
        })
    }

    /// Rows with a recognized ClinVar significance class. Compound
    /// `a/b` annotations are classified by their first segment; indel
    /// sites are excluded unless asked for.
    pub fn clinvar_variants(
        &self,
        report_id: &ReportId,
        include_indels: bool,
    ) -> Result<Vec<ReconciledVariant>, StoreError> {
        if !self.variant_table_exists(report_id)? {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            r#"SELECT {} FROM "{}" WHERE clnsig IS NOT NULL AND clndn IS NOT NULL"#,
            VARIANT_COLUMNS,
            report_id.as_str()
        ))?;
        let mut rows = stmt
            .query_map([], row_to_variant)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.retain(|row| {
            let class = row
                .clnsig
                .as_deref()
                .unwrap_or("")
                .split('/')
                .next()
                .unwrap_or("");
            CLINVAR_CLASSES.contains(&class)
        });
        if !include_indels {
            rows.retain(|row| {
                row.ref_allele != "I"
                    && row.ref_allele != "D"
                    && row.alt_allele != "I"
                    && row.alt_allele != "D"
            });
        }
        Ok(rows)
    }
}

// report metadata
impl ReportStore {
    /// Insert the metadata row for a finished report.
    ///
    /// The template report is pre-seeded and counted, so the first real
    /// upload (report count 1 before insert) always becomes the default;
    /// inserting any default clears the flag on every other report.
    pub fn insert_report(&mut self, mut record: ReportRecord) -> Result<ReportRecord, StoreError> {
        let tx = self.conn.transaction()?;

        let count: u64 = tx.query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))?;
        if count == 1 {
            record.is_default = true;
        }
        if record.is_default {
            tx.execute("UPDATE reports SET select_default = 0", [])?;
        }

        tx.execute(
            "INSERT INTO reports
             (report_id, user_id, file_format, data_source, name, select_default, total_snps, upload_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.report_id.as_str(),
                record.user_id,
                record.file_format,
                record.data_source,
                record.name,
                record.is_default,
                record.total_variants,
                record.upload_date,
            ],
        )?;
        tx.commit()?;

        Ok(record)
    }

    /// Delete a non-template report: variant table, ancestry row and
    /// haplogroup row go first, then the metadata row; default status
    /// migrates to the most recently uploaded remaining report last.
    pub fn delete_report(&mut self, report_id: &ReportId) -> Result<(), StoreError> {
        if report_id.is_template() {
            return Err(StoreError::TemplateProtected);
        }

        let tx = self.conn.transaction()?;
        let was_default: Option<bool> = tx
            .query_row(
                "SELECT select_default FROM reports WHERE report_id = ?1",
                params![report_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(was_default) = was_default else {
            return Err(StoreError::ReportNotFound(report_id.to_string()));
        };

        tx.execute(
            &format!(r#"DROP TABLE IF EXISTS "{}""#, report_id.as_str()),
            [],
        )?;
        tx.execute(
            "DELETE FROM admixture WHERE report_id = ?1",
            params![report_id.as_str()],
        )?;
        tx.execute(
            "DELETE FROM haplogroup WHERE report_id = ?1",
            params![report_id.as_str()],
        )?;
        tx.execute(
            "DELETE FROM reports WHERE report_id = ?1",
            params![report_id.as_str()],
        )?;

        if was_default {
            tx.execute(
                "UPDATE reports SET select_default = 1 WHERE report_id =
                 (SELECT report_id FROM reports ORDER BY upload_date DESC LIMIT 1)",
                [],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Make exactly this report the default.
    pub fn set_default_report(&mut self, report_id: &ReportId) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let exists: Option<String> = tx
            .query_row(
                "SELECT report_id FROM reports WHERE report_id = ?1",
                params![report_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(StoreError::ReportNotFound(report_id.to_string()));
        }

        tx.execute(
            "UPDATE reports SET select_default = 1 WHERE report_id = ?1",
            params![report_id.as_str()],
        )?;
        tx.execute(
            "UPDATE reports SET select_default = 0 WHERE report_id <> ?1",
            params![report_id.as_str()],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn rename_report(&mut self, report_id: &ReportId, name: &str) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE reports SET name = ?1 WHERE report_id = ?2",
            params![name, report_id.as_str()],
        )?;
        if changed == 0 {
            return Err(StoreError::ReportNotFound(report_id.to_string()));
        }
        Ok(())
    }

    pub fn get_report(&self, report_id: &ReportId) -> Result<Option<ReportRecord>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT report_id, user_id, file_format, data_source, name,
                        select_default, total_snps, upload_date
                 FROM reports WHERE report_id = ?1",
                params![report_id.as_str()],
                row_to_report,
            )
            .optional()?)
    }

    pub fn list_reports(&self) -> Result<Vec<ReportRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT report_id, user_id, file_format, data_source, name,
                    select_default, total_snps, upload_date
             FROM reports ORDER BY upload_date",
        )?;
        let reports = stmt
            .query_map([], row_to_report)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reports)
    }

    pub fn list_report_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT report_id FROM reports ORDER BY upload_date")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    pub fn default_report(&self) -> Result<Option<ReportRecord>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT report_id, user_id, file_format, data_source, name,
                        select_default, total_snps, upload_date
                 FROM reports WHERE select_default = 1 LIMIT 1",
                [],
                row_to_report,
            )
            .optional()?)
    }
}

// traits
impl ReportStore {
    /// Insert a trait definition as-is (seeding and import paths).
    pub fn add_trait(&mut self, definition: &TraitDefinition) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO traits
             (id, name, description, icon, confidence, is_default, created_at,
              category, rsids, formula, score_thresholds, result, reference)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                definition.id,
                serde_json::to_string(&definition.name)?,
                serde_json::to_string(&definition.description)?,
                definition.icon,
                definition.confidence,
                definition.is_default,
                definition.created_at,
                definition.category,
                serde_json::to_string(&definition.rsids)?,
                definition.formula,
                serde_json::to_string(&definition.score_thresholds)?,
                serde_json::to_string(&definition.result)?,
                serde_json::to_string(&definition.reference)?,
            ],
        )?;
        Ok(())
    }

    /// Add a user-defined trait: the caller's id/created_at are replaced
    /// and the builtin flag forced off. Returns the generated id.
    pub fn add_user_trait(&mut self, mut definition: TraitDefinition) -> Result<String, StoreError> {
        definition.id = TraitDefinition::new_user_id();
        definition.is_default = false;
        definition.created_at = TraitDefinition::timestamp_now();
        self.add_trait(&definition)?;
        Ok(definition.id)
    }

    /// Delete a user trait; builtin traits are protected.
    pub fn delete_trait(&mut self, trait_id: &str) -> Result<(), StoreError> {
        let is_default: Option<bool> = self
            .conn
            .query_row(
                "SELECT is_default FROM traits WHERE id = ?1",
                params![trait_id],
                |row| row.get(0),
            )
            .optional()?;
        match is_default {
            None => Err(StoreError::TraitNotFound(trait_id.to_string())),
            Some(true) => Err(StoreError::TraitProtected(trait_id.to_string())),
            Some(false) => {
                self.conn
                    .execute("DELETE FROM traits WHERE id = ?1", params![trait_id])?;
                Ok(())
            }
        }
    }

    pub fn get_trait(&self, trait_id: &str) -> Result<Option<TraitDefinition>, StoreError> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, name, description, icon, confidence, is_default, created_at,
                        category, rsids, formula, score_thresholds, result, reference
                 FROM traits WHERE id = ?1",
                params![trait_id],
                row_to_raw_trait,
            )
            .optional()?;
        raw.map(raw_to_trait).transpose()
    }

    pub fn list_traits(&self) -> Result<Vec<TraitDefinition>, StoreError> {
        self.collect_traits("SELECT id, name, description, icon, confidence, is_default, created_at, category, rsids, formula, score_thresholds, result, reference FROM traits ORDER BY created_at")
    }

    /// Non-builtin traits, the trait-export payload.
    pub fn export_user_traits(&self) -> Result<Vec<TraitDefinition>, StoreError> {
        self.collect_traits("SELECT id, name, description, icon, confidence, is_default, created_at, category, rsids, formula, score_thresholds, result, reference FROM traits WHERE is_default = 0 ORDER BY created_at")
    }

    /// Import trait definitions, preserving their ids.
    pub fn import_traits(&mut self, definitions: &[TraitDefinition]) -> Result<(), StoreError> {
        for definition in definitions {
            self.add_trait(definition)?;
        }
        Ok(())
    }

    fn collect_traits(&self, sql: &str) -> Result<Vec<TraitDefinition>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let raw = stmt
            .query_map([], row_to_raw_trait)?
            .collect::<Result<Vec<_>, _>>()?;
        raw.into_iter().map(raw_to_trait).collect()
    }

    /// Evaluate every stored trait against one report's genotypes.
    pub fn trait_outcomes(&self, report_id: &ReportId) -> Result<Vec<TraitOutcome>, StoreError> {
        let traits = self.list_traits()?;

        let mut rsids: Vec<String> = traits.iter().flat_map(|t| t.rsids.clone()).collect();
        rsids.sort();
        rsids.dedup();
        let records = self.genotype_records(report_id, &rsids)?;

        traits
            .iter()
            .map(|definition| Ok(evaluate_trait(definition, &records)?))
            .collect()
    }
}

// ancestry + haplogroup singletons
impl ReportStore {
    pub fn has_admixture(&self, report_id: &ReportId) -> Result<bool, StoreError> {
        let count: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM admixture WHERE report_id = ?1",
            params![report_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn upsert_admixture(
        &mut self,
        report_id: &ReportId,
        components: &HashMap<String, f64>,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        for name in components.keys() {
            if !is_known_component(name) {
                return Err(StoreError::UnknownComponent(name.clone()));
            }
        }

        if self.has_admixture(report_id)? {
            if !mode.overwrite() {
                return Err(StoreError::RecordExists(report_id.to_string()));
            }
            self.conn.execute(
                "DELETE FROM admixture WHERE report_id = ?1",
                params![report_id.as_str()],
            )?;
        }

        self.conn.execute(
            "INSERT INTO admixture (report_id, components) VALUES (?1, ?2)",
            params![report_id.as_str(), serde_json::to_string(components)?],
        )?;
        Ok(())
    }

    /// Component map for a report; empty when no record exists.
    pub fn get_admixture(&self, report_id: &ReportId) -> Result<HashMap<String, f64>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT components FROM admixture WHERE report_id = ?1",
                params![report_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(HashMap::new()),
        }
    }

    pub fn has_haplogroup(&self, report_id: &ReportId) -> Result<bool, StoreError> {
        let count: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM haplogroup WHERE report_id = ?1",
            params![report_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn upsert_haplogroup(
        &mut self,
        report_id: &ReportId,
        y_hap: &str,
        mt_hap: &str,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        if self.has_haplogroup(report_id)? {
            if !mode.overwrite() {
                return Err(StoreError::RecordExists(report_id.to_string()));
            }
            self.conn.execute(
                "DELETE FROM haplogroup WHERE report_id = ?1",
                params![report_id.as_str()],
            )?;
        }

        self.conn.execute(
            "INSERT INTO haplogroup (report_id, y_hap, mt_hap) VALUES (?1, ?2, ?3)",
            params![report_id.as_str(), y_hap, mt_hap],
        )?;
        Ok(())
    }

    /// The (Y-line, mito-line) labels for a report, if analyzed.
    pub fn get_haplogroup(
        &self,
        report_id: &ReportId,
    ) -> Result<Option<(String, String)>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT y_hap, mt_hap FROM haplogroup WHERE report_id = ?1",
                params![report_id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?)
    }
}

fn row_to_variant(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReconciledVariant> {
    let zygosity: String = row.get(10)?;
    let zygosity = Zygosity::from_str(&zygosity).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            10,
            rusqlite::types::Type::Text,
            std::io::Error::other(e).into(),
        )
    })?;

    Ok(ReconciledVariant {
        chrom: row.get(0)?,
        pos: row.get(1)?,
        ref_allele: row.get(2)?,
        alt_allele: row.get(3)?,
        gene: row.get(4)?,
        rsid: row.get(5)?,
        gnomad_af: row.get(6)?,
        clnsig: row.get(7)?,
        clndn: row.get(8)?,
        genotype: row.get(9)?,
        zygosity,
    })
}

fn row_to_report(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReportRecord> {
    let report_id: String = row.get(0)?;
    let report_id = ReportId::new(&report_id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            std::io::Error::other(e.to_string()).into(),
        )
    })?;

    Ok(ReportRecord {
        report_id,
        user_id: row.get(1)?,
        file_format: row.get(2)?,
        data_source: row.get(3)?,
        name: row.get(4)?,
        is_default: row.get(5)?,
        total_variants: row.get(6)?,
        upload_date: row.get(7)?,
    })
}

/// Trait row with the JSON columns still serialized.
struct RawTrait {
    id: String,
    name: String,
    description: String,
    icon: String,
    confidence: String,
    is_default: bool,
    created_at: String,
    category: String,
    rsids: String,
    formula: String,
    score_thresholds: String,
    result: String,
    reference: String,
}

fn row_to_raw_trait(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTrait> {
    Ok(RawTrait {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        icon: row.get(3)?,
        confidence: row.get(4)?,
        is_default: row.get(5)?,
        created_at: row.get(6)?,
        category: row.get(7)?,
        rsids: row.get(8)?,
        formula: row.get(9)?,
        score_thresholds: row.get(10)?,
        result: row.get(11)?,
        reference: row.get(12)?,
    })
}

fn raw_to_trait(raw: RawTrait) -> Result<TraitDefinition, StoreError> {
    Ok(TraitDefinition {
        id: raw.id,
        name: serde_json::from_str(&raw.name)?,
        description: serde_json::from_str(&raw.description)?,
        icon: raw.icon,
        confidence: raw.confidence,
        is_default: raw.is_default,
        created_at: raw.created_at,
        category: raw.category,
        rsids: serde_json::from_str(&raw.rsids)?,
        formula: raw.formula,
        score_thresholds: serde_json::from_str(&raw.score_thresholds)?,
        result: serde_json::from_str(&raw.result)?,
        reference: serde_json::from_str(&raw.reference)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ancestra_traits::Value;
    use ancestra_traits::model::{ThresholdEntry, ThresholdValue, Thresholds};
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn store() -> ReportStore {
        ReportStore::open_in_memory().unwrap()
    }

    fn variant(rsid: &str, chrom: &str, pos: u64, genotype: &str) -> ReconciledVariant {
        ReconciledVariant {
            chrom: chrom.to_string(),
            pos,
            ref_allele: "C".to_string(),
            alt_allele: "T".to_string(),
            gene: "LCT".to_string(),
            rsid: rsid.to_string(),
            gnomad_af: Some(0.42),
            clnsig: None,
            clndn: None,
            genotype: genotype.to_string(),
            zygosity: Zygosity::classify("C", genotype).unwrap(),
        }
    }

    fn record(id: &ReportId, name: &str, uploaded: &str, default: bool) -> ReportRecord {
        ReportRecord {
            report_id: id.clone(),
            user_id: "ID_USER000001".to_string(),
            file_format: "txt".to_string(),
            data_source: "23andme".to_string(),
            name: name.to_string(),
            is_default: default,
            total_variants: 0,
            upload_date: uploaded.to_string(),
        }
    }

    fn seeded(store: &mut ReportStore) {
        store
            .insert_report(record(
                &ReportId::template(),
                "Template",
                "2024-01-01T00:00:00Z",
                true,
            ))
            .unwrap();
    }

    fn builtin_trait(id: &str) -> TraitDefinition {
        TraitDefinition {
            id: id.to_string(),
            name: HashMap::from([("default".to_string(), id.to_string())]),
            description: HashMap::new(),
            icon: "dna".to_string(),
            confidence: "high".to_string(),
            is_default: true,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            category: "nutrition".to_string(),
            rsids: vec!["rs4988235".to_string()],
            formula: "SCORE(rs4988235:CT=5,CC=0,TT=10)".to_string(),
            score_thresholds: Thresholds(vec![
                ThresholdEntry {
                    label: "high".to_string(),
                    value: ThresholdValue::Cutoff(5.0),
                },
                ThresholdEntry {
                    label: "low".to_string(),
                    value: ThresholdValue::Cutoff(0.0),
                },
            ]),
            result: HashMap::from([
                ("high".to_string(), "High".to_string()),
                ("low".to_string(), "Low".to_string()),
            ]),
            reference: Vec::new(),
        }
    }

    #[rstest]
    fn test_first_upload_becomes_default(mut store: ReportStore) {
        seeded(&mut store);

        let first = ReportId::random();
        let inserted = store
            .insert_report(record(&first, "First", "2024-02-01T00:00:00Z", false))
            .unwrap();
        assert!(inserted.is_default);

        let template = store.get_report(&ReportId::template()).unwrap().unwrap();
        assert!(!template.is_default);
    }

    #[rstest]
    fn test_list_report_ids_in_upload_order(mut store: ReportStore) {
        seeded(&mut store);
        let first = ReportId::random();
        let second = ReportId::random();
        store
            .insert_report(record(&second, "Second", "2024-03-01T00:00:00Z", false))
            .unwrap();
        store
            .insert_report(record(&first, "First", "2024-02-01T00:00:00Z", false))
            .unwrap();

        let ids = store.list_report_ids().unwrap();
        assert_eq!(
            ids,
            vec![
                ReportId::template().to_string(),
                first.to_string(),
                second.to_string(),
            ]
        );
    }

    #[rstest]
    fn test_inserting_default_clears_previous_default(mut store: ReportStore) {
        seeded(&mut store);
        let first = ReportId::random();
        store
            .insert_report(record(&first, "First", "2024-02-01T00:00:00Z", false))
            .unwrap();

        let second = ReportId::random();
        store
            .insert_report(record(&second, "Second", "2024-03-01T00:00:00Z", true))
            .unwrap();

        assert!(!store.get_report(&first).unwrap().unwrap().is_default);
        assert!(store.get_report(&second).unwrap().unwrap().is_default);
        assert_eq!(
            store.default_report().unwrap().unwrap().report_id,
            second
        );
    }

    #[rstest]
    fn test_deleting_default_promotes_most_recent(mut store: ReportStore) {
        seeded(&mut store);
        let first = ReportId::random();
        let second = ReportId::random();
        let third = ReportId::random();
        store
            .insert_report(record(&first, "First", "2024-02-01T00:00:00Z", false))
            .unwrap();
        store
            .insert_report(record(&second, "Second", "2024-03-01T00:00:00Z", true))
            .unwrap();
        store
            .insert_report(record(&third, "Third", "2024-04-01T00:00:00Z", true))
            .unwrap();

        store.delete_report(&third).unwrap();

        assert_eq!(
            store.default_report().unwrap().unwrap().report_id,
            second
        );
        assert!(store.get_report(&third).unwrap().is_none());
    }

    #[rstest]
    fn test_template_report_cannot_be_deleted(mut store: ReportStore) {
        seeded(&mut store);
        let err = store.delete_report(&ReportId::template()).unwrap_err();
        assert!(matches!(err, StoreError::TemplateProtected));
    }

    #[rstest]
    fn test_delete_removes_variant_table_and_sidecars(mut store: ReportStore) {
        seeded(&mut store);
        let id = ReportId::random();
        store
            .insert_report(record(&id, "First", "2024-02-01T00:00:00Z", false))
            .unwrap();
        store
            .create_variant_table(
                &id,
                &[variant("rs4988235", "2", 136608646, "CT")],
                WriteMode::CreateOnly,
            )
            .unwrap();
        store
            .upsert_haplogroup(&id, "R1b", "H1", WriteMode::CreateOnly)
            .unwrap();

        store.delete_report(&id).unwrap();

        assert!(!store.variant_table_exists(&id).unwrap());
        assert!(!store.has_haplogroup(&id).unwrap());
    }

    #[rstest]
    fn test_set_default_report(mut store: ReportStore) {
        seeded(&mut store);
        let first = ReportId::random();
        let second = ReportId::random();
        store
            .insert_report(record(&first, "First", "2024-02-01T00:00:00Z", false))
            .unwrap();
        store
            .insert_report(record(&second, "Second", "2024-03-01T00:00:00Z", true))
            .unwrap();

        store.set_default_report(&first).unwrap();
        assert!(store.get_report(&first).unwrap().unwrap().is_default);
        assert!(!store.get_report(&second).unwrap().unwrap().is_default);

        let missing = ReportId::random();
        assert!(matches!(
            store.set_default_report(&missing).unwrap_err(),
            StoreError::ReportNotFound(_)
        ));
    }

    #[rstest]
    fn test_rename_report(mut store: ReportStore) {
        seeded(&mut store);
        store
            .rename_report(&ReportId::template(), "Renamed")
            .unwrap();
        assert_eq!(
            store
                .get_report(&ReportId::template())
                .unwrap()
                .unwrap()
                .name,
            "Renamed"
        );
    }

    #[rstest]
    fn test_create_only_rejects_existing_table(mut store: ReportStore) {
        let id = ReportId::random();
        let rows = [variant("rs4988235", "2", 136608646, "CT")];
        store
            .create_variant_table(&id, &rows, WriteMode::CreateOnly)
            .unwrap();

        let err = store
            .create_variant_table(&id, &rows, WriteMode::CreateOnly)
            .unwrap_err();
        assert!(matches!(err, StoreError::TableExists(_)));

        store
            .create_variant_table(&id, &rows, WriteMode::Overwrite)
            .unwrap();
        assert_eq!(store.variant_count(&id).unwrap(), 1);
    }

    #[rstest]
    fn test_rsid_lookup_fills_misses_with_none(mut store: ReportStore) {
        let id = ReportId::random();
        store
            .create_variant_table(
                &id,
                &[variant("rs4988235", "2", 136608646, "CT")],
                WriteMode::CreateOnly,
            )
            .unwrap();

        let found = store
            .variants_by_rsid(&id, &["rs4988235".to_string(), "rs0".to_string()])
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].1.as_ref().unwrap().genotype, "CT");
        assert!(found[1].1.is_none());

        let missing_table = ReportId::random();
        let found = store
            .variants_by_rsid(&missing_table, &["rs4988235".to_string()])
            .unwrap();
        assert!(found[0].1.is_none());
    }

    #[rstest]
    fn test_variant_page_bounds(mut store: ReportStore) {
        let id = ReportId::random();
        let rows: Vec<ReconciledVariant> = (0..5)
            .map(|i| variant(&format!("rs{}", i), "1", 1000 + i, "CT"))
            .collect();
        store
            .create_variant_table(&id, &rows, WriteMode::CreateOnly)
            .unwrap();

        let page = store.variant_page(&id, 2, 2).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0].rsid, "rs2");

        let past_end = store.variant_page(&id, 4, 2).unwrap();
        assert!(past_end.rows.is_empty());
    }

    #[rstest]
    fn test_clinvar_filter(mut store: ReportStore) {
        let id = ReportId::random();
        let mut pathogenic = variant("rs1", "1", 100, "TT");
        pathogenic.clnsig = Some("Pathogenic/Likely_pathogenic".to_string());
        pathogenic.clndn = Some("Hemochromatosis".to_string());
        let mut unclassed = variant("rs2", "1", 200, "CT");
        unclassed.clnsig = Some("drug_response".to_string());
        unclassed.clndn = Some("Warfarin_response".to_string());
        let mut indel = variant("rs3", "1", 300, "DD");
        indel.ref_allele = "I".to_string();
        indel.alt_allele = "D".to_string();
        indel.zygosity = Zygosity::Hom;
        indel.clnsig = Some("Benign".to_string());
        indel.clndn = Some("Cystic_fibrosis".to_string());

        store
            .create_variant_table(
                &id,
                &[pathogenic, unclassed, indel],
                WriteMode::CreateOnly,
            )
            .unwrap();

        let snvs = store.clinvar_variants(&id, false).unwrap();
        assert_eq!(snvs.len(), 1);
        assert_eq!(snvs[0].rsid, "rs1");

        let with_indels = store.clinvar_variants(&id, true).unwrap();
        assert_eq!(with_indels.len(), 2);
    }

    #[rstest]
    fn test_variant_by_site(mut store: ReportStore) {
        let id = ReportId::random();
        store
            .create_variant_table(
                &id,
                &[variant("rs4988235", "2", 136608646, "CT")],
                WriteMode::CreateOnly,
            )
            .unwrap();

        let hit = store
            .variant_by_site(&id, "2", 136608646, "C", "T")
            .unwrap();
        assert_eq!(hit.unwrap().rsid, "rs4988235");

        let miss = store.variant_by_site(&id, "2", 136608646, "C", "G").unwrap();
        assert!(miss.is_none());
    }

    #[rstest]
    fn test_builtin_trait_is_protected(mut store: ReportStore) {
        store.add_trait(&builtin_trait("lactose")).unwrap();

        assert!(matches!(
            store.delete_trait("lactose").unwrap_err(),
            StoreError::TraitProtected(_)
        ));
        assert!(matches!(
            store.delete_trait("missing").unwrap_err(),
            StoreError::TraitNotFound(_)
        ));
    }

    #[rstest]
    fn test_user_trait_lifecycle(mut store: ReportStore) {
        store.add_trait(&builtin_trait("lactose")).unwrap();

        let mut custom = builtin_trait("ignored");
        custom.is_default = true; // overridden by add_user_trait
        let id = store.add_user_trait(custom).unwrap();
        assert!(id.starts_with("TRA_"));

        let stored = store.get_trait(&id).unwrap().unwrap();
        assert!(!stored.is_default);
        assert_eq!(stored.formula, "SCORE(rs4988235:CT=5,CC=0,TT=10)");

        let exported = store.export_user_traits().unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].id, id);
        assert_eq!(store.list_traits().unwrap().len(), 2);

        store.delete_trait(&id).unwrap();
        assert!(store.get_trait(&id).unwrap().is_none());
    }

    #[rstest]
    fn test_import_preserves_trait_ids(mut store: ReportStore) {
        let definitions = vec![builtin_trait("TRA_IMPORTED01")];
        store.import_traits(&definitions).unwrap();
        assert!(store.get_trait("TRA_IMPORTED01").unwrap().is_some());
    }

    #[rstest]
    fn test_trait_outcomes_against_report(mut store: ReportStore) {
        store.add_trait(&builtin_trait("lactose")).unwrap();
        let id = ReportId::random();
        store
            .create_variant_table(
                &id,
                &[variant("rs4988235", "2", 136608646, "CT")],
                WriteMode::CreateOnly,
            )
            .unwrap();

        let outcomes = store.trait_outcomes(&id).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].value, Value::Score(5.0));
        assert_eq!(outcomes[0].result.as_deref(), Some("High"));
        assert_eq!(outcomes[0].reference_genotypes, vec!["CC"]);
        assert_eq!(outcomes[0].subject_genotypes, vec!["CT"]);
    }

    #[rstest]
    fn test_admixture_rejects_unknown_components(mut store: ReportStore) {
        let id = ReportId::random();
        let bogus = HashMap::from([("Atlantean".to_string(), 100.0)]);
        assert!(matches!(
            store
                .upsert_admixture(&id, &bogus, WriteMode::CreateOnly)
                .unwrap_err(),
            StoreError::UnknownComponent(_)
        ));
    }

    #[rstest]
    fn test_admixture_singleton_per_report(mut store: ReportStore) {
        let id = ReportId::random();
        let first = HashMap::from([("Celtic".to_string(), 60.0), ("Baltic".to_string(), 40.0)]);
        store
            .upsert_admixture(&id, &first, WriteMode::CreateOnly)
            .unwrap();

        assert!(matches!(
            store
                .upsert_admixture(&id, &first, WriteMode::CreateOnly)
                .unwrap_err(),
            StoreError::RecordExists(_)
        ));

        let second = HashMap::from([("Celtic".to_string(), 100.0)]);
        store
            .upsert_admixture(&id, &second, WriteMode::Overwrite)
            .unwrap();
        assert_eq!(store.get_admixture(&id).unwrap(), second);

        let missing = ReportId::random();
        assert!(store.get_admixture(&missing).unwrap().is_empty());
    }

    #[rstest]
    fn test_haplogroup_singleton_per_report(mut store: ReportStore) {
        let id = ReportId::random();
        store
            .upsert_haplogroup(&id, "R1b", "H1", WriteMode::CreateOnly)
            .unwrap();

        assert!(matches!(
            store
                .upsert_haplogroup(&id, "I1", "U5", WriteMode::CreateOnly)
                .unwrap_err(),
            StoreError::RecordExists(_)
        ));

        store
            .upsert_haplogroup(&id, "I1", "U5", WriteMode::Overwrite)
            .unwrap();
        assert_eq!(
            store.get_haplogroup(&id).unwrap(),
            Some(("I1".to_string(), "U5".to_string()))
        );
    }

    #[rstest]
    fn test_ensure_user_is_idempotent_per_email(mut store: ReportStore) {
        let first = store.ensure_user("a@example.com", "A").unwrap();
        let again = store.ensure_user("a@example.com", "A").unwrap();
        assert_eq!(first, again);
        assert!(first.starts_with("ID_"));

        let other = store.ensure_user("b@example.com", "B").unwrap();
        assert_ne!(first, other);
        assert_eq!(store.primary_user().unwrap(), Some(first));
    }
}
