//! Per-type synthetic value generators.
//!
//! Every generator draws from an explicitly passed [`Rng`] so a seeded
//! `StdRng` makes the whole synthesizer reproducible under test.

use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde_json::Value;

use crate::config::GenerationConfig;
use crate::fields::FieldType;

// ─── Word lists ───────────────────────────────────────────────────────────────

const FIRST_NAMES: &[&str] = &[
    "John", "Jane", "Mike", "Sarah", "David", "Lisa", "Chris", "Emma",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis",
];
const EMAIL_DOMAINS: &[&str] = &["gmail.com", "yahoo.com", "outlook.com", "company.com"];
const STREETS: &[&str] = &["Main St", "Oak Ave", "Park Rd", "First St", "Second Ave"];
const CITIES: &[&str] = &[
    "San Francisco",
    "New York",
    "Austin",
    "Boston",
    "Seattle",
    "Los Angeles",
    "Chicago",
    "Miami",
    "Denver",
    "Atlanta",
];
const COUNTRIES: &[&str] = &[
    "United States",
    "Canada",
    "United Kingdom",
    "Germany",
    "France",
    "Australia",
    "Japan",
    "Brazil",
];
const COMPANY_PREFIXES: &[&str] = &[
    "Tech", "Smart", "Digital", "Cloud", "Data", "AI", "Quantum", "Cyber",
];
const COMPANY_SUFFIXES: &[&str] = &[
    "Hub", "Labs", "Solutions", "Works", "Pro", "Flow", "Systems", "Dynamics",
];
const JOB_TITLES: &[&str] = &[
    "Software Engineer",
    "Product Manager",
    "Data Analyst",
    "Sales Director",
    "Marketing Specialist",
    "Operations Manager",
    "UX Designer",
    "Account Executive",
];
const STATUSES: &[&str] = &["active", "inactive", "pending", "completed"];
const CATEGORIES: &[&str] = &[
    "Electronics",
    "Clothing",
    "Home & Garden",
    "Sports",
    "Books",
    "Toys",
    "Beauty",
    "Automotive",
];
/// (sentence prefix, filler used when the request carries no context).
const DESCRIPTION_TEMPLATES: &[(&str, &str)] = &[
    ("Innovative solution for ", "modern businesses"),
    ("Advanced platform focusing on ", "user experience"),
    ("Next-generation technology for ", "digital transformation"),
];
const PLACEHOLDERS: &[&str] = &["Value A", "Value B", "Value C", "Value D"];

// ─── Random helpers ───────────────────────────────────────────────────────────

fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

/// Random integer in the inclusive range.
fn int_range<R: Rng>(rng: &mut R, min: i64, max: i64) -> i64 {
    rng.gen_range(min..=max)
}

/// Random ISO calendar date uniformly distributed between Jan 1 of
/// `start_year` and Dec 31 of `end_year`.
fn date_in_years<R: Rng>(rng: &mut R, start_year: i32, end_year: i32) -> String {
    let start = NaiveDate::from_ymd_opt(start_year, 1, 1).expect("valid start of year");
    let end = NaiveDate::from_ymd_opt(end_year, 12, 31).expect("valid end of year");
    let span = (end - start).num_days().max(0);
    let date = start + Duration::days(rng.gen_range(0..=span));
    date.format("%Y-%m-%d").to_string()
}

// ─── Composite generators ─────────────────────────────────────────────────────

pub fn person_name<R: Rng>(rng: &mut R) -> String {
    format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
}

/// Email derived from a freshly generated person name, e.g. `jane.davis@gmail.com`.
pub fn email<R: Rng>(rng: &mut R) -> String {
    let name = person_name(rng).to_lowercase().replace(' ', ".");
    format!("{}@{}", name, pick(rng, EMAIL_DOMAINS))
}

pub fn phone<R: Rng>(rng: &mut R) -> String {
    format!(
        "+1-{}-{}-{}",
        int_range(rng, 100, 999),
        int_range(rng, 100, 999),
        int_range(rng, 1000, 9999)
    )
}

pub fn street_address<R: Rng>(rng: &mut R) -> String {
    format!("{} {}", int_range(rng, 100, 9999), pick(rng, STREETS))
}

pub fn company_name<R: Rng>(rng: &mut R) -> String {
    format!("{}{}", pick(rng, COMPANY_PREFIXES), pick(rng, COMPANY_SUFFIXES))
}

fn description<R: Rng>(rng: &mut R, context: Option<&str>) -> String {
    let (prefix, filler) = DESCRIPTION_TEMPLATES[rng.gen_range(0..DESCRIPTION_TEMPLATES.len())];
    let subject = match context {
        Some(ctx) if !ctx.trim().is_empty() => ctx.trim(),
        _ => filler,
    };
    format!("{prefix}{subject}")
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

/// Produce one value for a column of the given type.
pub fn generate_value<R: Rng>(
    field_type: FieldType,
    context: Option<&str>,
    cfg: &GenerationConfig,
    rng: &mut R,
) -> Value {
    match field_type {
        FieldType::Name => Value::from(person_name(rng)),
        FieldType::FirstName => Value::from(pick(rng, FIRST_NAMES)),
        FieldType::LastName => Value::from(pick(rng, LAST_NAMES)),
        FieldType::Email => Value::from(email(rng)),
        FieldType::Phone => Value::from(phone(rng)),
        FieldType::Age => Value::from(int_range(rng, 18, 80)),
        FieldType::Address => Value::from(street_address(rng)),
        FieldType::City => Value::from(pick(rng, CITIES)),
        FieldType::Country => Value::from(pick(rng, COUNTRIES)),
        FieldType::Company => Value::from(company_name(rng)),
        FieldType::JobTitle => Value::from(pick(rng, JOB_TITLES)),
        FieldType::Salary => Value::from(int_range(rng, 30_000, 150_000)),
        FieldType::Date => Value::from(date_in_years(
            rng,
            cfg.date_start_year,
            cfg.date_end_year,
        )),
        FieldType::Price => {
            let raw = rng.gen_range(10.0_f64..=1000.0);
            Value::from((raw * 100.0).round() / 100.0)
        }
        FieldType::Description => Value::from(description(rng, context)),
        FieldType::Status => Value::from(pick(rng, STATUSES)),
        FieldType::Category => Value::from(pick(rng, CATEGORIES)),
        FieldType::Count => Value::from(int_range(rng, 0, 50)),
        FieldType::Text => Value::from(pick(rng, PLACEHOLDERS)),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
