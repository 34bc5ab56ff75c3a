use crate::sanitize::MarkupPolicy;

/// Shape a field's value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    /// Selector whose `sentinel` option means "nothing chosen".
    Enum { sentinel: &'static str },
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub markup: MarkupPolicy,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            markup: MarkupPolicy::Reject,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            markup: MarkupPolicy::Reject,
        }
    }

    /// Switch this field to script stripping instead of rejection.
    pub const fn permissive(mut self) -> Self {
        self.markup = MarkupPolicy::StripScripts;
        self
    }
}

/// Ordered set of field rules applied to one kind of record.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    fields: &'static [FieldSpec],
}

impl Schema {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }
}

pub const NONE_SELECTED: &str = "none";

/// Catalog entry fields. `description` is free text and keeps harmless formatting.
const BACKROOM_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("level", FieldKind::Text),
    FieldSpec::optional("entities", FieldKind::Text),
    FieldSpec::required("danger_level", FieldKind::Integer),
    FieldSpec::required(
        "entry_method",
        FieldKind::Enum {
            sentinel: NONE_SELECTED,
        },
    ),
    FieldSpec::optional(
        "investigation_status",
        FieldKind::Enum {
            sentinel: NONE_SELECTED,
        },
    ),
    FieldSpec::required("description", FieldKind::Text).permissive(),
];

pub const BACKROOM_SCHEMA: Schema = Schema::new(BACKROOM_FIELDS);
