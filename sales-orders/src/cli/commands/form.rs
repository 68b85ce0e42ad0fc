//! Interactive form entry

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use is_terminal::IsTerminal;

use crate::records::{DATE_FORMAT, Entity, FieldKind, FieldSpec, RawRecord, RawValue};

/// Prompt when asked to, or when no field flag was given on a terminal
pub fn should_prompt(interactive: bool, form: &RawRecord) -> bool {
    interactive || (form.is_empty() && std::io::stdin().is_terminal())
}

/// Ask for every field of `entity`, starting from `prefill`
pub fn prompt_form(entity: Entity, today: NaiveDate, prefill: &RawRecord) -> Result<RawRecord> {
    let theme = ColorfulTheme::default();
    let mut record = RawRecord::new();

    for spec in entity.fields() {
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(label(spec))
            .allow_empty(true);

        if let Some(initial) = initial_text(spec, prefill, today) {
            input = input.with_initial_text(initial);
        }

        let value = input
            .interact_text()
            .with_context(|| format!("Failed to read {}", spec.name))?;
        record.insert(spec.name, value);
    }

    Ok(record)
}

/// Prompt label, e.g. "Join date (YYYY-MM-DD)"
fn label(spec: &FieldSpec) -> String {
    let mut text = spec.name.replace('_', " ");
    if let Some(first) = text.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    match spec.kind {
        FieldKind::Date => format!("{} (YYYY-MM-DD)", text),
        _ => text,
    }
}

/// Previously entered value, or today for date fields
fn initial_text(spec: &FieldSpec, prefill: &RawRecord, today: NaiveDate) -> Option<String> {
    spec.keys()
        .filter_map(|key| prefill.get(key))
        .map(RawValue::to_text)
        .find(|text| !text.is_empty())
        .or_else(|| {
            (spec.kind == FieldKind::Date).then(|| today.format(DATE_FORMAT).to_string())
        })
}
