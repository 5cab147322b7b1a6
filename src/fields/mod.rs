//! Field inference — maps a free-text prompt to an ordered list of named,
//! typed columns.
//!
//! The catalog is an ordered association list scanned in declaration order;
//! matching is substring search over the lower-cased prompt, with matched
//! keywords excised so compound phrases are claimed once. Result order is
//! catalog order, not prompt order, so repeated prompts produce identical
//! field lists.

use serde::{Deserialize, Serialize};

// ─── Field types ──────────────────────────────────────────────────────────────

/// The closed set of column types the synthesizer knows how to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Name,
    FirstName,
    LastName,
    Email,
    Phone,
    Age,
    Address,
    City,
    Country,
    Company,
    JobTitle,
    Salary,
    Date,
    Price,
    Description,
    Status,
    Category,
    /// Small non-negative count (orders placed, items owned, …).
    Count,
    /// Fallback for column names nothing else matches.
    Text,
}

/// A named, typed column descriptor. Ephemeral — built per generation
/// request and consumed read-only by the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    /// Infer a type for an explicitly supplied column name.
    ///
    /// Used by the explicit-fields override path, where the caller names the
    /// columns and we only have to guess what goes in them. Unrecognized
    /// names fall back to [`FieldType::Text`].
    pub fn from_name(name: &str) -> Self {
        let lower = name.trim().to_lowercase();
        let field_type = NAME_HINTS
            .iter()
            .find(|(hints, _)| hints.iter().any(|h| lower.contains(h)))
            .map(|(_, ty)| *ty)
            .unwrap_or(FieldType::Text);
        Self::new(name.trim(), field_type)
    }
}

// ─── Keyword catalog ──────────────────────────────────────────────────────────

/// One catalog entry: any keyword appearing in the prompt adds a column with
/// the canonical name and type. Declaration order is the output order.
struct CatalogEntry {
    keywords: &'static [&'static str],
    name: &'static str,
    field_type: FieldType,
}

/// Ordered catalog of known field patterns. New column kinds are added here,
/// not in `interpret`. Within an entry, longer keywords come first so a
/// compound phrase is claimed whole (see `interpret`).
static FIELD_CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        keywords: &["customer name", "full name", "name"],
        name: "name",
        field_type: FieldType::Name,
    },
    CatalogEntry {
        keywords: &["first name", "firstname"],
        name: "firstName",
        field_type: FieldType::FirstName,
    },
    CatalogEntry {
        keywords: &["last name", "lastname", "surname"],
        name: "lastName",
        field_type: FieldType::LastName,
    },
    CatalogEntry {
        keywords: &["email address", "email"],
        name: "email",
        field_type: FieldType::Email,
    },
    CatalogEntry {
        keywords: &["phone number", "mobile", "phone"],
        name: "phone",
        field_type: FieldType::Phone,
    },
    CatalogEntry {
        keywords: &["age"],
        name: "age",
        field_type: FieldType::Age,
    },
    CatalogEntry {
        keywords: &["street address", "address"],
        name: "address",
        field_type: FieldType::Address,
    },
    CatalogEntry {
        keywords: &["city"],
        name: "city",
        field_type: FieldType::City,
    },
    CatalogEntry {
        keywords: &["country"],
        name: "country",
        field_type: FieldType::Country,
    },
    CatalogEntry {
        keywords: &["company", "organization"],
        name: "company",
        field_type: FieldType::Company,
    },
    CatalogEntry {
        keywords: &["job", "job title", "position"],
        name: "jobTitle",
        field_type: FieldType::JobTitle,
    },
    CatalogEntry {
        keywords: &["salary", "income"],
        name: "salary",
        field_type: FieldType::Salary,
    },
    CatalogEntry {
        keywords: &["created date", "birth date", "date"],
        name: "date",
        field_type: FieldType::Date,
    },
    CatalogEntry {
        keywords: &["price", "cost", "amount"],
        name: "price",
        field_type: FieldType::Price,
    },
    CatalogEntry {
        keywords: &["description"],
        name: "description",
        field_type: FieldType::Description,
    },
    CatalogEntry {
        keywords: &["status"],
        name: "status",
        field_type: FieldType::Status,
    },
    CatalogEntry {
        keywords: &["category"],
        name: "category",
        field_type: FieldType::Category,
    },
    CatalogEntry {
        keywords: &["purchase history", "orders"],
        name: "purchaseHistory",
        field_type: FieldType::Count,
    },
];

/// Hints for typing explicitly named columns. Compound names ("first_name",
/// "company_name") must be tried before the bare "name" catch-all.
static NAME_HINTS: &[(&[&str], FieldType)] = &[
    (&["first name", "firstname", "first_name"], FieldType::FirstName),
    (
        &["last name", "lastname", "last_name", "surname"],
        FieldType::LastName,
    ),
    (&["email"], FieldType::Email),
    (&["phone", "mobile"], FieldType::Phone),
    (&["company", "organization"], FieldType::Company),
    (&["job", "position", "title"], FieldType::JobTitle),
    (&["age"], FieldType::Age),
    (&["address"], FieldType::Address),
    (&["city"], FieldType::City),
    (&["country"], FieldType::Country),
    (&["salary", "income"], FieldType::Salary),
    (&["date"], FieldType::Date),
    (&["price", "cost", "amount"], FieldType::Price),
    (&["description"], FieldType::Description),
    (&["status"], FieldType::Status),
    (&["category"], FieldType::Category),
    (&["orders", "count"], FieldType::Count),
    (&["name"], FieldType::Name),
];

// ─── Interpretation ───────────────────────────────────────────────────────────

/// Map a free-text prompt to an ordered field list.
///
/// Never fails: prompts matching nothing (including the empty string) fall
/// back to the default `[name, email, age]` triple. Duplicate canonical
/// names are collapsed — the first catalog hit wins.
///
/// A matched keyword is excised from the working text, so a compound phrase
/// belongs to the entry that claims it first: "email address" produces an
/// email column, not an email column plus an address column.
pub fn interpret(prompt: &str) -> Vec<FieldSpec> {
    let mut text = prompt.to_lowercase();
    let mut fields: Vec<FieldSpec> = Vec::new();

    for entry in FIELD_CATALOG {
        if let Some(keyword) = entry.keywords.iter().find(|kw| text.contains(*kw)) {
            if !fields.iter().any(|f| f.name == entry.name) {
                fields.push(FieldSpec::new(entry.name, entry.field_type));
            }
            text = text.replace(keyword, " ");
        }
    }

    if fields.is_empty() {
        fields.push(FieldSpec::new("name", FieldType::Name));
        fields.push(FieldSpec::new("email", FieldType::Email));
        fields.push(FieldSpec::new("age", FieldType::Age));
    }

    fields
}

// ─── Tests ────────────────────────────────────────────────────────────────────
