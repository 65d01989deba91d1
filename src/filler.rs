//! Form field discovery, filling and the batch loop.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use lopdf::{Document, Object, ObjectId, StringFormat};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::FillError;
use crate::rules::{self, FormRecord};

/// Read-only snapshot of one widget, used for discovery and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub value: String,
}

/// AcroForm field type (`/FT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Choice,
    Button,
    Signature,
    Unknown,
}

/// Outcome of one batch run. A failed iteration never aborts the batch,
/// so a report can carry both written files and failures.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<(usize, FillError)>,
}

/// Fills copies of a contract template with generated data.
///
/// Owns the random source explicitly; [`FormFiller::with_seed`] gives a
/// fully reproducible variant for tests.
pub struct FormFiller {
    rng: StdRng,
}

impl Default for FormFiller {
    fn default() -> Self {
        Self::new()
    }
}

impl FormFiller {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Enumerate every named widget in the template, in page order.
    ///
    /// The template is opened read-only and never modified.
    pub fn discover_fields(&self, template: &Path) -> Result<Vec<FieldDescriptor>, FillError> {
        let doc = load_template(template)?;
        let mut fields = Vec::new();
        for (_, page_id) in doc.get_pages() {
            for widget_id in widget_refs(&doc, page_id)? {
                let dict = doc.get_dictionary(widget_id)?;
                let Some(name) = field_name(dict) else {
                    debug!("skipping unnamed widget {widget_id:?}");
                    continue;
                };
                let kind = field_kind(dict);
                let value = field_value(dict);
                debug!("found field: {name} ({kind:?})");
                fields.push(FieldDescriptor { name, kind, value });
            }
        }
        Ok(fields)
    }

    /// Generate one record of synthetic contract data.
    pub fn generate_record(&mut self) -> FormRecord {
        rules::generate_record(&mut self.rng)
    }

    /// Fill one copy of the template with freshly generated data.
    ///
    /// Failures are logged with full detail and returned; the caller
    /// decides whether to continue.
    pub fn fill_form(&mut self, template: &Path, output: &Path) -> Result<(), FillError> {
        let record = self.generate_record();
        self.fill_with_record(template, output, &record)
    }

    /// Apply a specific record to the template and save the result.
    ///
    /// Widgets whose name has no matching key are left untouched; a
    /// template without widgets still produces an unmodified copy.
    pub fn fill_with_record(
        &mut self,
        template: &Path,
        output: &Path,
        record: &FormRecord,
    ) -> Result<(), FillError> {
        match apply_record(template, output, record) {
            Ok(()) => {
                info!("created {}", output.display());
                Ok(())
            }
            Err(e) => {
                error!("failed to fill {}: {e}", output.display());
                Err(e)
            }
        }
    }

    /// Produce `count` filled contracts under `out_dir`.
    ///
    /// The directory is created if absent. Field discovery runs once up
    /// front for diagnostics and its failure aborts the batch; after that
    /// each iteration is isolated, with failures recorded in the report.
    pub fn generate_batch(
        &mut self,
        template: &Path,
        out_dir: &Path,
        count: usize,
    ) -> Result<BatchReport, FillError> {
        info!("starting batch of {count} contracts from {}", template.display());
        fs::create_dir_all(out_dir)?;

        let fields = self.discover_fields(template)?;
        info!("found {} form fields:", fields.len());
        for field in &fields {
            info!("  {} ({:?})", field.name, field.kind);
        }

        let mut report = BatchReport::default();
        for i in 0..count {
            let output = out_dir.join(format!("boat_contract_{}.pdf", i + 1));
            match self.fill_form(template, &output) {
                Ok(()) => {
                    report.written.push(output);
                    if report.written.len() % 10 == 0 {
                        info!("generated {} contracts", report.written.len());
                    }
                }
                Err(e) => {
                    error!("contract {} skipped: {e}", i + 1);
                    report.failures.push((i + 1, e));
                }
            }
        }
        Ok(report)
    }
}

fn load_template(template: &Path) -> Result<Document, FillError> {
    if !template.exists() {
        return Err(FillError::TemplateNotFound(
            template.display().to_string(),
        ));
    }
    Ok(Document::load(template)?)
}

fn apply_record(template: &Path, output: &Path, record: &FormRecord) -> Result<(), FillError> {
    let mut doc = load_template(template)?;
    let mut filled = 0usize;

    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    for page_id in pages {
        for widget_id in widget_refs(&doc, page_id)? {
            let Some(name) = field_name(doc.get_dictionary(widget_id)?) else {
                continue;
            };
            let Some(value) = record.get(&name) else {
                continue;
            };
            let text = pdf_text(value);
            let dict = doc.get_object_mut(widget_id)?.as_dict_mut()?;
            dict.set("V", text);
            // Stale appearance streams would keep showing the old value.
            dict.remove(b"AP");
            debug!("filled field {name}");
            filled += 1;
        }
    }

    if filled > 0 {
        set_need_appearances(&mut doc)?;
    }
    doc.save(output)?;
    Ok(())
}

/// Collect the page's widget annotations as object ids.
///
/// Inline annotation dictionaries cannot be updated through the object
/// table, so only indirect references are returned.
fn widget_refs(doc: &Document, page_id: ObjectId) -> Result<Vec<ObjectId>, FillError> {
    let page = doc.get_dictionary(page_id)?;
    let annots = match page.get(b"Annots") {
        Ok(obj) => obj,
        Err(_) => return Ok(Vec::new()),
    };
    let annots = match annots {
        Object::Reference(id) => doc.get_object(*id)?,
        other => other,
    };

    let mut ids = Vec::new();
    for entry in annots.as_array()? {
        let Object::Reference(id) = entry else {
            debug!("skipping inline annotation on page {page_id:?}");
            continue;
        };
        let dict = doc.get_dictionary(*id)?;
        if matches!(dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Widget") {
            ids.push(*id);
        }
    }
    Ok(ids)
}

fn field_name(dict: &lopdf::Dictionary) -> Option<String> {
    match dict.get(b"T") {
        Ok(Object::String(bytes, _)) => Some(decode_field_text(bytes)),
        _ => None,
    }
}

fn field_kind(dict: &lopdf::Dictionary) -> FieldKind {
    match dict.get(b"FT") {
        Ok(Object::Name(n)) if n == b"Tx" => FieldKind::Text,
        Ok(Object::Name(n)) if n == b"Ch" => FieldKind::Choice,
        Ok(Object::Name(n)) if n == b"Btn" => FieldKind::Button,
        Ok(Object::Name(n)) if n == b"Sig" => FieldKind::Signature,
        _ => FieldKind::Unknown,
    }
}

fn field_value(dict: &lopdf::Dictionary) -> String {
    match dict.get(b"V") {
        Ok(Object::String(bytes, _)) => decode_field_text(bytes),
        _ => String::new(),
    }
}

/// Decode a PDF text string: UTF-16BE when the BOM is present, UTF-8
/// (lossy) otherwise.
fn decode_field_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        if let Ok(s) = String::from_utf16(&units) {
            return s;
        }
    }
    String::from_utf8_lossy(bytes).into_owned()
}

/// Encode a value for `/V`: plain literal for ASCII, UTF-16BE with BOM
/// for anything else (umlauts, the euro sign).
fn pdf_text(value: &str) -> Object {
    if value.is_ascii() {
        Object::string_literal(value)
    } else {
        let mut bytes = Vec::with_capacity(2 + value.len() * 2);
        bytes.extend_from_slice(&[0xFE, 0xFF]);
        for unit in value.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

fn set_need_appearances(doc: &mut Document) -> Result<(), FillError> {
    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    let acro_form = doc.get_dictionary(catalog_id)?.get(b"AcroForm").ok().cloned();
    match acro_form {
        Some(Object::Reference(id)) => {
            doc.get_object_mut(id)?
                .as_dict_mut()?
                .set("NeedAppearances", true);
        }
        Some(Object::Dictionary(mut dict)) => {
            dict.set("NeedAppearances", true);
            doc.get_object_mut(catalog_id)?
                .as_dict_mut()?
                .set("AcroForm", dict);
        }
        _ => {}
    }
    Ok(())
}
