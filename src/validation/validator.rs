use super::ValidationError;
use super::schema::{FieldKind, FieldSpec, Schema};
use crate::sanitize::{Sanitized, sanitize};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

/// A record whose every field passed its schema rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    values: BTreeMap<&'static str, FieldValue>,
}

impl Record {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            FieldValue::Text(s) => Some(s),
            FieldValue::Integer(_) => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name)? {
            FieldValue::Integer(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

/// Check `body` against `schema` and return the normalized record.
///
/// Rules run one at a time across all fields, in this order:
/// presence, integer parsing, sentinel selection, markup. The first
/// violation is returned and nothing else is evaluated.
pub fn validate(schema: &Schema, body: &Value) -> Result<Record, ValidationError> {
    let object = body.as_object().ok_or(ValidationError::NotAnObject)?;

    let mut present = collect_present(schema, object)?;

    for (spec, raw) in &present {
        if let (FieldKind::Integer, Some(raw)) = (spec.kind, raw) {
            raw.parse::<i64>()
                .map_err(|_| ValidationError::NotAnInteger(spec.name.to_string()))?;
        }
    }

    for (spec, raw) in &present {
        if let (FieldKind::Enum { sentinel }, Some(raw)) = (spec.kind, raw)
            && raw.eq_ignore_ascii_case(sentinel)
        {
            return Err(ValidationError::NoneSelected(spec.name.to_string()));
        }
    }

    for (spec, raw) in present.iter_mut() {
        let Some(value) = raw.as_deref() else {
            continue;
        };
        let cleaned = match sanitize(value, spec.markup) {
            Sanitized::Rejected => {
                return Err(ValidationError::MarkupDetected(spec.name.to_string()));
            }
            Sanitized::Clean(cleaned) => cleaned.trim().to_string(),
        };
        if cleaned.is_empty() {
            if spec.required {
                return Err(ValidationError::EmptyAfterSanitization(
                    spec.name.to_string(),
                ));
            }
            *raw = None;
        } else {
            *raw = Some(cleaned);
        }
    }

    let mut record = Record::default();
    for (spec, raw) in present {
        let Some(raw) = raw else {
            continue;
        };
        let value = match spec.kind {
            FieldKind::Integer => FieldValue::Integer(
                raw.parse()
                    .map_err(|_| ValidationError::NotAnInteger(spec.name.to_string()))?,
            ),
            FieldKind::Text | FieldKind::Enum { .. } => FieldValue::Text(raw),
        };
        record.values.insert(spec.name, value);
    }
    Ok(record)
}

/// Presence pass: pull every schema field out of the body as trimmed text.
fn collect_present(
    schema: &Schema,
    object: &Map<String, Value>,
) -> Result<Vec<(&'static FieldSpec, Option<String>)>, ValidationError> {
    schema
        .fields()
        .iter()
        .map(|spec| {
            let raw = match object.get(spec.name) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.trim().to_string()),
                Some(Value::Number(n)) => Some(n.to_string()),
                Some(_) => return Err(ValidationError::UnsupportedType(spec.name.to_string())),
            }
            .filter(|s| !s.is_empty());

            if spec.required && raw.is_none() {
                return Err(ValidationError::Missing(spec.name.to_string()));
            }
            Ok((spec, raw))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::BACKROOM_SCHEMA;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "level": "Level 0",
            "entities": "none observed",
            "danger_level": "1",
            "entry_method": "noclip",
            "investigation_status": "ongoing",
            "description": "Endless yellow rooms."
        })
    }

    fn with(field: &str, value: Value) -> Value {
        let mut body = valid_body();
        body[field] = value;
        body
    }

    #[test]
    fn accepts_and_normalizes_a_complete_record() {
        let mut body = valid_body();
        body["level"] = json!("  Level 0  ");
        body["danger_level"] = json!(3);

        let record = validate(&BACKROOM_SCHEMA, &body).unwrap();
        assert_eq!(record.text("level"), Some("Level 0"));
        assert_eq!(record.integer("danger_level"), Some(3));
        assert_eq!(record.text("description"), Some("Endless yellow rooms."));
        assert_eq!(record.text("entry_method"), Some("noclip"));
        assert_eq!(record.get("entities"), Some(&FieldValue::Text("none observed".into())));
    }

    #[test]
    fn rejects_non_object_bodies() {
        assert_eq!(
            validate(&BACKROOM_SCHEMA, &json!(["level"])),
            Err(ValidationError::NotAnObject)
        );
    }

    #[test]
    fn missing_or_blank_required_field_is_rejected() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("level");
        assert_eq!(
            validate(&BACKROOM_SCHEMA, &body),
            Err(ValidationError::Missing("level".into()))
        );

        assert_eq!(
            validate(&BACKROOM_SCHEMA, &with("description", json!("   "))),
            Err(ValidationError::Missing("description".into()))
        );
        assert_eq!(
            validate(&BACKROOM_SCHEMA, &with("level", Value::Null)),
            Err(ValidationError::Missing("level".into()))
        );
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let mut body = valid_body();
        let obj = body.as_object_mut().unwrap();
        obj.remove("entities");
        obj.insert("investigation_status".into(), json!(""));

        let record = validate(&BACKROOM_SCHEMA, &body).unwrap();
        assert_eq!(record.get("entities"), None);
        assert_eq!(record.get("investigation_status"), None);
    }

    #[test]
    fn non_numeric_integer_is_rejected_not_coerced() {
        for bad in [json!("abc"), json!("12abc"), json!("1.5"), json!("NaN"), json!(2.5)] {
            assert_eq!(
                validate(&BACKROOM_SCHEMA, &with("danger_level", bad.clone())),
                Err(ValidationError::NotAnInteger("danger_level".into())),
                "{bad}"
            );
        }
    }

    #[test]
    fn unsupported_json_types_are_rejected() {
        assert_eq!(
            validate(&BACKROOM_SCHEMA, &with("level", json!(true))),
            Err(ValidationError::UnsupportedType("level".into()))
        );
        assert_eq!(
            validate(&BACKROOM_SCHEMA, &with("entities", json!({"a": 1}))),
            Err(ValidationError::UnsupportedType("entities".into()))
        );
    }

    #[test]
    fn sentinel_selection_is_rejected() {
        assert_eq!(
            validate(&BACKROOM_SCHEMA, &with("entry_method", json!("None"))),
            Err(ValidationError::NoneSelected("entry_method".into()))
        );
    }

    #[test]
    fn markup_in_strict_field_rejects_the_request() {
        assert_eq!(
            validate(
                &BACKROOM_SCHEMA,
                &with("level", json!("<script>alert(1)</script>safe"))
            ),
            Err(ValidationError::MarkupDetected("level".into()))
        );
        assert_eq!(
            validate(&BACKROOM_SCHEMA, &with("entities", json!("<b>smilers</b>"))),
            Err(ValidationError::MarkupDetected("entities".into()))
        );
    }

    #[test]
    fn permissive_field_has_scripts_stripped() {
        let record = validate(
            &BACKROOM_SCHEMA,
            &with("description", json!("<script>alert(1)</script>safe")),
        )
        .unwrap();
        assert_eq!(record.text("description"), Some("safe"));

        let record = validate(
            &BACKROOM_SCHEMA,
            &with("description", json!("<em>humming</em> lights")),
        )
        .unwrap();
        assert_eq!(record.text("description"), Some("<em>humming</em> lights"));
    }

    #[test]
    fn permissive_field_rejects_deeply_nested_script_fragments() {
        let depth = 10_000;
        let payload = format!("{}<script>{}", "<scr".repeat(depth), "ipt>".repeat(depth));
        assert_eq!(
            validate(&BACKROOM_SCHEMA, &with("description", json!(payload))),
            Err(ValidationError::MarkupDetected("description".into()))
        );
    }

    #[test]
    fn required_field_emptied_by_sanitization_is_rejected() {
        assert_eq!(
            validate(
                &BACKROOM_SCHEMA,
                &with("description", json!("<script>alert(1)</script>"))
            ),
            Err(ValidationError::EmptyAfterSanitization("description".into()))
        );
    }

    #[test]
    fn presence_is_checked_before_type_rules() {
        let body = json!({
            "danger_level": "abc",
            "entry_method": "none",
            "description": "x"
        });
        assert_eq!(
            validate(&BACKROOM_SCHEMA, &body),
            Err(ValidationError::Missing("level".into()))
        );
    }
}
