//! End-to-end tests against small AcroForm templates built with lopdf.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{dictionary, Document, Object};

use formfill::{FieldKind, FillError, FormFiller, FIELD_RULES};

/// Build a one-page template with one text widget per name.
fn template_with_fields(dir: &Path, names: &[&str]) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut widget_ids = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let y = 700 - 30 * i as i64;
        let id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Tx",
            "T" => Object::string_literal(*name),
            "Rect" => vec![50i64.into(), y.into(), 300i64.into(), (y + 20).into()],
        });
        widget_ids.push(id);
    }

    let annots: Vec<Object> = widget_ids.iter().map(|id| Object::Reference(*id)).collect();
    let mut page = dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0i64.into(), 0i64.into(), 595i64.into(), 842i64.into()],
    };
    if !annots.is_empty() {
        page.set("Annots", annots);
    }
    let page_id = doc.add_object(page);

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1i64,
        }),
    );

    let fields: Vec<Object> = widget_ids.iter().map(|id| Object::Reference(*id)).collect();
    let acro_form_id = doc.add_object(dictionary! { "Fields" => fields });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => acro_form_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join("template.pdf");
    doc.save(&path).unwrap();
    path
}

fn field_values(filler: &FormFiller, path: &Path) -> HashMap<String, String> {
    filler
        .discover_fields(path)
        .unwrap()
        .into_iter()
        .map(|f| (f.name, f.value))
        .collect()
}

#[test]
fn discovery_lists_widgets_in_page_order() {
    let dir = tempfile::tempdir().unwrap();
    let template = template_with_fields(dir.path(), &["Werft", "Kaufpreis", "Bootsname"]);

    let filler = FormFiller::with_seed(1);
    let fields = filler.discover_fields(&template).unwrap();

    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["Werft", "Kaufpreis", "Bootsname"]);
    for field in &fields {
        assert_eq!(field.kind, FieldKind::Text);
        assert!(field.value.is_empty());
    }
}

#[test]
fn discovery_never_mutates_the_template() {
    let dir = tempfile::tempdir().unwrap();
    let template = template_with_fields(dir.path(), &["Werft"]);
    let before = fs::read(&template).unwrap();

    FormFiller::with_seed(1).discover_fields(&template).unwrap();

    assert_eq!(fs::read(&template).unwrap(), before);
}

#[test]
fn filling_skips_widgets_without_a_matching_key() {
    let dir = tempfile::tempdir().unwrap();
    let template = template_with_fields(dir.path(), &["Werft", "Interne_Notiz"]);
    let output = dir.path().join("out.pdf");

    let mut filler = FormFiller::with_seed(7);
    filler.fill_form(&template, &output).unwrap();

    let values = field_values(&filler, &output);
    assert!(!values["Werft"].is_empty());
    assert!(values["Interne_Notiz"].is_empty());
}

#[test]
fn fill_with_record_round_trips_values() {
    let dir = tempfile::tempdir().unwrap();
    let template = template_with_fields(dir.path(), &["Werft", "VKäufer_Ort", "Kaufpreis"]);
    let output = dir.path().join("out.pdf");

    let record: HashMap<String, String> = [
        ("Werft", "Hanse Yachts"),
        ("VKäufer_Ort", "München"),
        ("Kaufpreis", "15,000 €"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let mut filler = FormFiller::with_seed(7);
    filler.fill_with_record(&template, &output, &record).unwrap();

    let values = field_values(&filler, &output);
    assert_eq!(values["Werft"], "Hanse Yachts");
    assert_eq!(values["VKäufer_Ort"], "München");
    assert_eq!(values["Kaufpreis"], "15,000 €");
}

#[test]
fn widget_free_template_still_saves_a_copy() {
    let dir = tempfile::tempdir().unwrap();
    let template = template_with_fields(dir.path(), &[]);
    let output = dir.path().join("out.pdf");

    let mut filler = FormFiller::with_seed(7);
    filler.fill_form(&template, &output).unwrap();

    assert!(output.exists());
    assert!(filler.discover_fields(&output).unwrap().is_empty());
}

#[test]
fn batch_writes_sequentially_named_files() {
    let dir = tempfile::tempdir().unwrap();
    let field_names: Vec<&str> = FIELD_RULES.iter().map(|(name, _)| *name).collect();
    let template = template_with_fields(dir.path(), &field_names);
    let out_dir = dir.path().join("filled");

    let mut filler = FormFiller::with_seed(7);
    let report = filler.generate_batch(&template, &out_dir, 3).unwrap();

    assert_eq!(report.written.len(), 3);
    assert!(report.failures.is_empty());
    for i in 1..=3 {
        let path = out_dir.join(format!("boat_contract_{i}.pdf"));
        assert!(path.exists(), "missing {}", path.display());
        let values = field_values(&filler, &path);
        for name in &field_names {
            assert!(!values[*name].is_empty(), "unfilled field {name}");
        }
    }

    // A pre-existing output directory must not fail the batch.
    let report = filler.generate_batch(&template, &out_dir, 1).unwrap();
    assert_eq!(report.written.len(), 1);
}

#[test]
fn empty_batch_creates_the_directory_and_nothing_else() {
    let dir = tempfile::tempdir().unwrap();
    let template = template_with_fields(dir.path(), &["Werft"]);
    let out_dir = dir.path().join("filled");

    let report = FormFiller::with_seed(7)
        .generate_batch(&template, &out_dir, 0)
        .unwrap();

    assert!(report.written.is_empty());
    assert!(report.failures.is_empty());
    assert!(out_dir.is_dir());
    assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 0);
}

#[test]
fn corrupt_template_fails_everywhere() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("broken.pdf");
    fs::write(&template, b"not a pdf").unwrap();

    let mut filler = FormFiller::with_seed(7);
    assert!(filler.discover_fields(&template).is_err());
    assert!(filler
        .fill_form(&template, &dir.path().join("out.pdf"))
        .is_err());
    // The upfront diagnostic discovery propagates instead of being skipped.
    assert!(filler
        .generate_batch(&template, &dir.path().join("filled"), 2)
        .is_err());
}

#[test]
fn missing_template_is_reported_as_such() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no_such.pdf");

    let err = FormFiller::with_seed(7)
        .discover_fields(&missing)
        .unwrap_err();
    assert!(matches!(err, FillError::TemplateNotFound(_)));
}
