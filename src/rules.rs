//! Declarative mapping from form field names to value generators.
//!
//! `FIELD_RULES` is the single source of truth for which fields get filled
//! and how. Supporting a different template means editing this table, not
//! the filler logic.

use std::collections::HashMap;

use chrono::{Duration, Local, NaiveDate};
use fake::faker::address::raw::{BuildingNumber, CityName, PostCode, StreetName};
use fake::faker::name::raw::{FirstName, Name};
use fake::faker::phone_number::raw::PhoneNumber;
use fake::locales::DE_DE;
use fake::Fake;
use rand::Rng;

/// One complete set of generated values, keyed by field name.
pub type FormRecord = HashMap<String, String>;

/// How to produce the value for a single field.
#[derive(Debug, Clone, Copy)]
pub enum FieldRule {
    /// Full personal name.
    FullName,
    /// Street name plus building number.
    StreetAddress,
    PostCode,
    City,
    /// Date of birth, `DD.MM.YYYY`, age 18 to 80 at generation time.
    BirthDate,
    Phone,
    /// Boat display name; a plain first name works well here.
    BoatName,
    /// Uniform pick from a fixed list.
    Pick(&'static [&'static str]),
    /// Integer in `[lo, hi]` wrapped in a fixed prefix/suffix.
    Int {
        lo: i64,
        hi: i64,
        prefix: &'static str,
        suffix: &'static str,
    },
    /// Decimal in `[lo, hi)` formatted to two fraction digits.
    Decimal { lo: f64, hi: f64 },
    /// Fixed prefix plus a random 5-digit number.
    Serial(&'static str),
    /// The shared base price, thousands-grouped with a currency symbol.
    PriceGrouped,
    /// The same base price as a plain numeral plus the currency word.
    PriceWords,
    /// Random city plus the current date, `DD.MM.YYYY`.
    CityWithDate,
}

const SHIPYARDS: &[&str] = &["Bavaria Yachtbau", "Dehler", "Hanse Yachts"];
const ENGINE_MAKERS: &[&str] = &["Volvo Penta", "Mercury Marine", "Yamaha Marine"];

/// Field names as they appear in the contract template.
pub const FIELD_RULES: &[(&str, FieldRule)] = &[
    ("VKäufer_Name", FieldRule::FullName),
    ("VKäufer_Straße", FieldRule::StreetAddress),
    ("VKäufer_PLZ", FieldRule::PostCode),
    ("VKäufer_Ort", FieldRule::City),
    ("VKäufer Gebdatum", FieldRule::BirthDate),
    ("VKäufer_Tel", FieldRule::Phone),
    ("Käufer_Name", FieldRule::FullName),
    ("Käufer_Straße", FieldRule::StreetAddress),
    ("Käufer_PLZ", FieldRule::PostCode),
    ("Käufer_Ort", FieldRule::City),
    ("Käufer Gebdatum", FieldRule::BirthDate),
    ("Käufer_Tel", FieldRule::Phone),
    ("Werft", FieldRule::Pick(SHIPYARDS)),
    (
        "Boot_Modell",
        FieldRule::Int {
            lo: 28,
            hi: 50,
            prefix: "Sport ",
            suffix: "",
        },
    ),
    ("Bootsname", FieldRule::BoatName),
    ("LüA", FieldRule::Decimal { lo: 5.0, hi: 15.0 }),
    ("BüA", FieldRule::Decimal { lo: 2.0, hi: 4.5 }),
    (
        "Boot_Baujahr",
        FieldRule::Int {
            lo: 2010,
            hi: 2023,
            prefix: "",
            suffix: "",
        },
    ),
    ("WIN", FieldRule::Serial("DEX")),
    ("Motor", FieldRule::Pick(ENGINE_MAKERS)),
    (
        "Motor_Leistung",
        FieldRule::Int {
            lo: 20,
            hi: 300,
            prefix: "",
            suffix: " PS",
        },
    ),
    (
        "B_Stunden",
        FieldRule::Int {
            lo: 100,
            hi: 2000,
            prefix: "",
            suffix: "",
        },
    ),
    ("MotNr", FieldRule::Serial("ENG")),
    ("Kaufpreis", FieldRule::PriceGrouped),
    ("Kaufpreis_Worte", FieldRule::PriceWords),
    ("OrtDatum", FieldRule::CityWithDate),
];

/// Generate one record covering every entry of [`FIELD_RULES`].
///
/// The base price is sampled once so both price fields present the same
/// amount; every other field is sampled independently.
pub fn generate_record<R: Rng>(rng: &mut R) -> FormRecord {
    let today = Local::now().date_naive();
    let price = rng.gen_range(15_000..=150_000i64);
    FIELD_RULES
        .iter()
        .map(|(name, rule)| ((*name).to_string(), render(rule, rng, price, today)))
        .collect()
}

fn render<R: Rng>(rule: &FieldRule, rng: &mut R, price: i64, today: NaiveDate) -> String {
    match rule {
        FieldRule::FullName => Name(DE_DE).fake_with_rng(rng),
        FieldRule::StreetAddress => format!(
            "{} {}",
            StreetName(DE_DE).fake_with_rng::<String, _>(rng),
            BuildingNumber(DE_DE).fake_with_rng::<String, _>(rng)
        ),
        FieldRule::PostCode => PostCode(DE_DE).fake_with_rng(rng),
        FieldRule::City => CityName(DE_DE).fake_with_rng(rng),
        FieldRule::BirthDate => birth_date(rng, today),
        FieldRule::Phone => PhoneNumber(DE_DE).fake_with_rng(rng),
        FieldRule::BoatName => FirstName(DE_DE).fake_with_rng(rng),
        FieldRule::Pick(options) => options[rng.gen_range(0..options.len())].to_string(),
        FieldRule::Int {
            lo,
            hi,
            prefix,
            suffix,
        } => format!("{prefix}{}{suffix}", rng.gen_range(*lo..=*hi)),
        FieldRule::Decimal { lo, hi } => format!("{:.2}", rng.gen_range(*lo..*hi)),
        FieldRule::Serial(prefix) => format!("{prefix}{}", rng.gen_range(10_000..=99_999)),
        FieldRule::PriceGrouped => format!("{} €", group_thousands(price)),
        FieldRule::PriceWords => format!("{price} Euro"),
        FieldRule::CityWithDate => format!(
            "{}, {}",
            CityName(DE_DE).fake_with_rng::<String, _>(rng),
            today.format("%d.%m.%Y")
        ),
    }
}

// Sampled in days; the bounds keep the derived age inside [18, 80] even
// across leap years.
fn birth_date<R: Rng>(rng: &mut R, today: NaiveDate) -> String {
    let age_days = rng.gen_range(18 * 366..=80 * 365);
    (today - Duration::days(age_days))
        .format("%d.%m.%Y")
        .to_string()
}

fn group_thousands(n: i64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
