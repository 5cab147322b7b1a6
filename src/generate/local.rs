//! Local generation backend — prompt interpretation plus the synthesis
//! loop. Pure CPU work over an injectable random source; the only failure
//! mode is the count bounds check.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

use super::{values, Generate, GenerateError, GenerateRequest, Record};
use crate::config::GenerationConfig;
use crate::fields::{self, FieldSpec};

/// Resolve the column list for a request: explicit field names win,
/// otherwise the prompt is interpreted. Duplicate names are collapsed
/// (first occurrence wins) so every record keeps one value per column.
pub fn resolve_fields(request: &GenerateRequest) -> Vec<FieldSpec> {
    if let Some(names) = &request.fields {
        let mut specs: Vec<FieldSpec> = Vec::new();
        for name in names {
            if name.trim().is_empty() {
                continue;
            }
            let spec = FieldSpec::from_name(name);
            if !specs.iter().any(|s| s.name == spec.name) {
                specs.push(spec);
            }
        }
        if !specs.is_empty() {
            return specs;
        }
    }
    fields::interpret(&request.prompt)
}

/// Produce `count` records, each `id = i + 1` plus one value per field in
/// field order. `count = 0` yields an empty batch; negative or above-cap
/// counts are rejected.
pub fn synthesize<R: Rng>(
    fields: &[FieldSpec],
    count: i64,
    context: Option<&str>,
    cfg: &GenerationConfig,
    rng: &mut R,
) -> Result<Vec<Record>, GenerateError> {
    if count < 0 || count > cfg.max_count {
        return Err(GenerateError::CountOutOfRange {
            count,
            max: cfg.max_count,
        });
    }

    let mut records = Vec::with_capacity(count as usize);
    for i in 0..count {
        let mut record = Record::new();
        record.insert("id".to_string(), Value::from(i + 1));
        for field in fields {
            record.insert(
                field.name.clone(),
                values::generate_value(field.field_type, context, cfg, rng),
            );
        }
        records.push(record);
    }
    Ok(records)
}

/// The offline backend: interpret + synthesize with an entropy-seeded RNG.
pub struct LocalGenerator {
    cfg: GenerationConfig,
}

impl LocalGenerator {
    pub fn new(cfg: GenerationConfig) -> Self {
        Self { cfg }
    }
}

#[async_trait]
impl Generate for LocalGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<Record>, GenerateError> {
        let fields = resolve_fields(request);
        let mut rng = StdRng::from_entropy();
        synthesize(
            &fields,
            request.count,
            request.context.as_deref(),
            &self.cfg,
            &mut rng,
        )
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
