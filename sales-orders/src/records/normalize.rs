//! Field normalizer: raw input record -> canonical record
//!
//! For each field in the entity's coercion table the canonical key is tried
//! first, then its alias; the first present, non-falsy value wins and is
//! coerced to the field's kind. Anything else gets the kind's default.

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::error::ValidationError;

use super::{CanonicalRecord, Entity, FieldKind, FieldSpec, FieldValue, RawRecord, RawValue};

/// How coercion failures are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Form entry: a value that cannot be coerced is a validation error
    Strict,
    /// Import: a value that cannot be coerced falls back to the default
    Lenient,
}

/// Output of a normalization pass
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub record: CanonicalRecord,
    /// Fields whose supplied value was malformed and replaced by the default
    pub replaced: Vec<&'static str>,
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Pure transformation from raw records to canonical records
#[derive(Debug, Clone, Copy)]
pub struct FieldNormalizer {
    today: NaiveDate,
}

impl FieldNormalizer {
    /// Normalizer whose date defaults are `today`
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Normalizer using the local calendar date
    pub fn for_today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn normalize(
        &self,
        entity: Entity,
        input: &RawRecord,
        coercion: Coercion,
    ) -> Result<Normalized, ValidationError> {
        let mut record = CanonicalRecord::new(entity);
        let mut replaced = Vec::new();

        for spec in entity.fields() {
            let value = match resolve(spec, input) {
                None => spec.kind.default_value(self.today),
                Some(raw) => match coerce(spec.kind, raw) {
                    Some(value) => value,
                    None if coercion == Coercion::Strict => {
                        return Err(ValidationError::InvalidValue {
                            field: spec.name,
                            expected: spec.kind.expected(),
                            value: raw.to_text(),
                        });
                    }
                    None => {
                        log::debug!(
                            "{} field '{}': cannot read '{}' as {}, using default",
                            entity,
                            spec.name,
                            raw,
                            spec.kind.expected()
                        );
                        replaced.push(spec.name);
                        spec.kind.default_value(self.today)
                    }
                },
            };
            record.set(spec.name, value);
        }

        Ok(Normalized { record, replaced })
    }

    /// Lenient normalization never fails
    pub fn normalize_lenient(&self, entity: Entity, input: &RawRecord) -> Normalized {
        self.normalize(entity, input, Coercion::Lenient)
            .unwrap_or_else(|_| Normalized {
                record: self.defaults(entity),
                replaced: Vec::new(),
            })
    }

    /// Record with every field at its default
    pub fn defaults(&self, entity: Entity) -> CanonicalRecord {
        let mut record = CanonicalRecord::new(entity);
        for spec in entity.fields() {
            record.set(spec.name, spec.kind.default_value(self.today));
        }
        record
    }
}

/// First present, non-falsy candidate among the canonical key and its alias
fn resolve<'a>(spec: &FieldSpec, input: &'a RawRecord) -> Option<&'a RawValue> {
    spec.keys()
        .filter_map(|key| input.get(key))
        .find(|value| !is_absent(spec.kind, value))
}

fn is_absent(kind: FieldKind, value: &RawValue) -> bool {
    if value.is_falsy() {
        return true;
    }
    // "0" typed into a numeric column reads the same as a 0 cell
    match (kind, value) {
        (FieldKind::Integer | FieldKind::Decimal, RawValue::Text(s)) => {
            matches!(s.trim().parse::<f64>(), Ok(n) if n == 0.0)
        }
        _ => false,
    }
}

/// Coerce a raw value to the field's kind; `None` when it cannot be read
pub fn coerce(kind: FieldKind, value: &RawValue) -> Option<FieldValue> {
    match kind {
        FieldKind::Text => Some(FieldValue::Text(value.to_text())),
        FieldKind::Integer => parse_integer(value).map(FieldValue::Integer),
        FieldKind::Decimal => parse_decimal(value).map(FieldValue::Decimal),
        FieldKind::Date => parse_date(value).map(FieldValue::Date),
    }
}

fn parse_integer(value: &RawValue) -> Option<i64> {
    match value {
        RawValue::Int(i) => Some(*i),
        RawValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
        RawValue::Text(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                // "3.0" from a CSV exported by a spreadsheet
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

fn parse_decimal(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Int(i) => Some(*i as f64),
        RawValue::Float(f) if f.is_finite() => Some(*f),
        RawValue::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn parse_date(value: &RawValue) -> Option<NaiveDate> {
    match value {
        RawValue::Date(d) => Some(*d),
        RawValue::Text(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

/// Parse the date formats accepted from forms and import files
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}
