//! Semantics field tree (`semantics.json`).
//!
//! A library's semantics is an ordered list of [`Field`]s describing the
//! parameters an author can edit. One attribute, `options`, is polymorphic on
//! the wire: `select` fields carry `[{"value": .., "label": ..}]` while
//! `library` fields carry `["H5P.Text 1.1", ...]`. Options are therefore
//! decoded only after the field's `type` is known, into [`FieldOptions`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::SchemaError;

/// Type tag of a semantics field.
///
/// Tags outside the core vocabulary (e.g. `image`, `video`) are kept
/// verbatim in [`FieldType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Nested group of child fields.
    Group,
    /// Free text.
    Text,
    /// Checkbox.
    Boolean,
    /// One value out of a fixed list of `(value, label)` options.
    Select,
    /// Repeated instances of a single field template.
    List,
    /// Numeric input.
    Number,
    /// Embedded sub-content driven by one of a list of libraries.
    Library,
    /// Any other tag.
    Other(String),
}

impl FieldType {
    /// Wire representation of the tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Group => "group",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Select => "select",
            Self::List => "list",
            Self::Number => "number",
            Self::Library => "library",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        match tag {
            "group" => Self::Group,
            "text" => Self::Text,
            "boolean" => Self::Boolean,
            "select" => Self::Select,
            "list" => Self::List,
            "number" => Self::Number,
            "library" => Self::Library,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from(tag.as_str()))
    }
}

/// One choice of a `select` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Stored value.
    pub value: String,
    /// Label shown to the author.
    pub label: String,
}

impl SelectOption {
    /// Create an option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Decoded `options` attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOptions {
    /// Options of a `select` field.
    Select(Vec<SelectOption>),
    /// Library references of a `library` field.
    Library(Vec<String>),
    /// Options whose shape does not match the field type. Kept raw so the
    /// field re-encodes unchanged.
    Unrecognized(Value),
}

impl FieldOptions {
    /// Decode raw `options` for a field of type `field_type`.
    ///
    /// Never yields a partially decoded list: any element that does not fit
    /// the shape demanded by the type makes the whole value
    /// [`FieldOptions::Unrecognized`].
    pub fn decode(field_type: &FieldType, raw: Value) -> Self {
        let decoded = match field_type {
            FieldType::Select => decode_select(&raw).map(Self::Select),
            FieldType::Library => decode_library(&raw).map(Self::Library),
            _ => None,
        };
        decoded.unwrap_or(Self::Unrecognized(raw))
    }

    /// Whether this shape is the one `field_type` requires.
    pub fn matches(&self, field_type: &FieldType) -> bool {
        matches!(
            (self, field_type),
            (Self::Select(_), FieldType::Select) | (Self::Library(_), FieldType::Library)
        )
    }
}

impl Serialize for FieldOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Select(options) => options.serialize(serializer),
            Self::Library(libraries) => libraries.serialize(serializer),
            Self::Unrecognized(raw) => raw.serialize(serializer),
        }
    }
}

fn decode_select(raw: &Value) -> Option<Vec<SelectOption>> {
    raw.as_array()?
        .iter()
        .map(|item| {
            let object = item.as_object()?;
            // Anything beyond value/label could not be written back.
            if object.len() != 2 {
                return None;
            }
            Some(SelectOption {
                value: object.get("value")?.as_str()?.to_string(),
                label: object.get("label")?.as_str()?.to_string(),
            })
        })
        .collect()
}

fn decode_library(raw: &Value) -> Option<Vec<String>> {
    raw.as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

/// Conditional visibility (`showWhen` widget).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowWhen {
    /// Rules that must hold for the field to be shown.
    pub rules: Vec<ShowRule>,
    /// Keys this model does not know about (e.g. `detach`, `nullWhenHidden`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single `showWhen` rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowRule {
    /// Path of the field the rule looks at.
    pub field: String,
    /// Value (or list of values) the field must equal.
    pub equals: Value,
}

/// One node of a semantics tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "FieldRepr")]
pub struct Field {
    /// Parameter name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Type tag.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Label shown to the author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Help text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Editor importance hint (`low`, `medium`, `high`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importance: Option<String>,
    /// Whether the author may leave the field empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    /// Default value, any JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Whether the value is shared by all instances of the library.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common: Option<bool>,
    /// Editor widget override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
    /// Placeholder text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Children of a `group` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Field>>,
    /// Whether a group starts expanded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,

    /// Singular noun for list items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Lower bound (list length or number value).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Number>,
    /// Upper bound (list length or number value).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Number>,
    /// Number of list items created by default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_num: Option<u32>,
    /// Template of a `list` item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Box<Field>>,

    /// Lower bound of a `number` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Number>,
    /// Upper bound of a `number` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Number>,
    /// Step of a `number` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<Number>,
    /// Unit label of a `number` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Maximum length of a `text` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// HTML tags allowed in a `text` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Conditional visibility rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_when: Option<ShowWhen>,

    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<FieldOptions>,

    /// Attributes this model does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wire shape of a field before `options` is interpreted.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldRepr {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    field_type: FieldType,
    label: Option<String>,
    description: Option<String>,
    importance: Option<String>,
    optional: Option<bool>,
    #[serde(default, deserialize_with = "present_value")]
    default: Option<Value>,
    common: Option<bool>,
    widget: Option<String>,
    placeholder: Option<String>,
    fields: Option<Vec<Field>>,
    expanded: Option<bool>,
    entity: Option<String>,
    min: Option<Number>,
    max: Option<Number>,
    default_num: Option<u32>,
    field: Option<Box<Field>>,
    min_value: Option<Number>,
    max_value: Option<Number>,
    step: Option<Number>,
    unit: Option<String>,
    max_length: Option<u32>,
    tags: Option<Vec<String>>,
    show_when: Option<ShowWhen>,
    options: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only a missing key is `None`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl From<FieldRepr> for Field {
    fn from(repr: FieldRepr) -> Self {
        let options = repr
            .options
            .map(|raw| FieldOptions::decode(&repr.field_type, raw));

        Self {
            name: repr.name,
            field_type: repr.field_type,
            label: repr.label,
            description: repr.description,
            importance: repr.importance,
            optional: repr.optional,
            default: repr.default,
            common: repr.common,
            widget: repr.widget,
            placeholder: repr.placeholder,
            fields: repr.fields,
            expanded: repr.expanded,
            entity: repr.entity,
            min: repr.min,
            max: repr.max,
            default_num: repr.default_num,
            field: repr.field,
            min_value: repr.min_value,
            max_value: repr.max_value,
            step: repr.step,
            unit: repr.unit,
            max_length: repr.max_length,
            tags: repr.tags,
            show_when: repr.show_when,
            options,
            extra: repr.extra,
        }
    }
}

impl Field {
    /// Create a bare field.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            label: None,
            description: None,
            importance: None,
            optional: None,
            default: None,
            common: None,
            widget: None,
            placeholder: None,
            fields: None,
            expanded: None,
            entity: None,
            min: None,
            max: None,
            default_num: None,
            field: None,
            min_value: None,
            max_value: None,
            step: None,
            unit: None,
            max_length: None,
            tags: None,
            show_when: None,
            options: None,
            extra: Map::new(),
        }
    }

    /// A `group` field with the given children.
    pub fn group(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            fields: Some(fields),
            ..Self::new(name, FieldType::Group)
        }
    }

    /// A `list` field repeating `template`.
    pub fn list(name: impl Into<String>, entity: impl Into<String>, template: Field) -> Self {
        Self {
            entity: Some(entity.into()),
            field: Some(Box::new(template)),
            ..Self::new(name, FieldType::List)
        }
    }

    /// A `select` field.
    pub fn select(name: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self {
            options: Some(FieldOptions::Select(options)),
            ..Self::new(name, FieldType::Select)
        }
    }

    /// A `library` field accepting the given library references.
    pub fn library(name: impl Into<String>, libraries: Vec<String>) -> Self {
        Self {
            options: Some(FieldOptions::Library(libraries)),
            ..Self::new(name, FieldType::Library)
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Mark the field optional.
    pub fn optional(mut self) -> Self {
        self.optional = Some(true);
        self
    }

    /// The decoded options, checked against the type tag.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::AmbiguousOptions`] when options are present but
    /// their shape does not belong to this field's type.
    pub fn options(&self) -> Result<Option<&FieldOptions>, SchemaError> {
        match &self.options {
            None => Ok(None),
            Some(options) if options.matches(&self.field_type) => Ok(Some(options)),
            Some(_) => Err(SchemaError::AmbiguousOptions {
                field: self.name.clone(),
                field_type: self.field_type.to_string(),
            }),
        }
    }

    /// Options of a `select` field; `None` for any other type or shape.
    pub fn select_options(&self) -> Option<&[SelectOption]> {
        match (&self.field_type, &self.options) {
            (FieldType::Select, Some(FieldOptions::Select(options))) => Some(options),
            _ => None,
        }
    }

    /// Library references of a `library` field; `None` for any other type or shape.
    pub fn library_options(&self) -> Option<&[String]> {
        match (&self.field_type, &self.options) {
            (FieldType::Library, Some(FieldOptions::Library(libraries))) => Some(libraries),
            _ => None,
        }
    }

    /// Replace the options of a `select` field.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::AmbiguousOptions`] if the field is not a `select`.
    pub fn set_select_options(&mut self, options: Vec<SelectOption>) -> Result<(), SchemaError> {
        if self.field_type != FieldType::Select {
            return Err(self.ambiguous());
        }
        self.options = Some(FieldOptions::Select(options));
        Ok(())
    }

    /// Replace the library references of a `library` field.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::AmbiguousOptions`] if the field is not a `library`.
    pub fn set_library_options(&mut self, libraries: Vec<String>) -> Result<(), SchemaError> {
        if self.field_type != FieldType::Library {
            return Err(self.ambiguous());
        }
        self.options = Some(FieldOptions::Library(libraries));
        Ok(())
    }

    /// Direct children: group members, then the list template.
    pub fn children(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .flatten()
            .chain(self.field.as_deref())
    }

    fn ambiguous(&self) -> SchemaError {
        SchemaError::AmbiguousOptions {
            field: self.name.clone(),
            field_type: self.field_type.to_string(),
        }
    }
}

/// The ordered field list of a library (`semantics.json`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Semantics(pub Vec<Field>);

impl Semantics {
    /// Decode `semantics.json` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Json`] if the bytes are not a JSON array of fields.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SchemaError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encode as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Json`] if serialization fails.
    pub fn to_vec_pretty(&self) -> Result<Vec<u8>, SchemaError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Top-level fields in order.
    pub fn fields(&self) -> &[Field] {
        &self.0
    }

    /// Top-level field by name.
    pub fn find(&self, name: &str) -> Option<&Field> {
        self.0.iter().find(|f| f.name == name)
    }

    /// Every field of the tree, depth first, paired with its dotted path.
    ///
    /// Group members are addressed as `group.child`, a list template as
    /// `list[]`.
    pub fn walk(&self) -> Vec<(String, &Field)> {
        let mut out = Vec::new();
        for field in &self.0 {
            walk_into(field, field.name.clone(), &mut out);
        }
        out
    }

    /// Every field whose options do not match its type, with its path.
    pub fn ambiguous_options(&self) -> Vec<(String, SchemaError)> {
        self.walk()
            .into_iter()
            .filter_map(|(path, field)| field.options().err().map(|e| (path, e)))
            .collect()
    }
}

fn walk_into<'a>(field: &'a Field, path: String, out: &mut Vec<(String, &'a Field)>) {
    for child in field.fields.iter().flatten() {
        walk_into(child, format!("{path}.{}", child.name), out);
    }
    if let Some(template) = field.field.as_deref() {
        walk_into(template, format!("{path}[]"), out);
    }
    out.push((path, field));
}

impl From<Vec<Field>> for Semantics {
    fn from(fields: Vec<Field>) -> Self {
        Self(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> Field {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_library_options_decode() {
        let field = decode(json!({
            "name": "question",
            "type": "library",
            "options": ["Quiz.MultiChoice 1.16", "Quiz.TrueFalse 1.8"]
        }));

        assert_eq!(
            field.library_options(),
            Some(&["Quiz.MultiChoice 1.16".to_string(), "Quiz.TrueFalse 1.8".to_string()][..])
        );
        assert!(field.select_options().is_none());
        assert!(field.options().unwrap().is_some());
    }

    #[test]
    fn test_select_options_decode() {
        let field = decode(json!({
            "name": "type",
            "type": "select",
            "options": [
                {"value": "auto", "label": "Automatic"},
                {"value": "single", "label": "Single answer"}
            ]
        }));

        let options = field.select_options().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[1], SelectOption::new("single", "Single answer"));
        assert!(field.library_options().is_none());
    }

    #[test]
    fn test_select_shape_under_library_type_is_not_decoded() {
        let field = decode(json!({
            "name": "content",
            "type": "library",
            "options": [{"value": "a", "label": "A"}]
        }));

        assert!(field.library_options().is_none());
        assert!(field.select_options().is_none());
        assert!(matches!(
            field.options(),
            Err(SchemaError::AmbiguousOptions { .. })
        ));
    }

    #[test]
    fn test_library_shape_under_select_type_is_not_decoded() {
        let field = decode(json!({
            "name": "mode",
            "type": "select",
            "options": ["H5P.Text 1.1"]
        }));

        assert!(field.select_options().is_none());
        assert!(field.library_options().is_none());
    }

    #[test]
    fn test_mixed_list_is_never_partially_decoded() {
        let field = decode(json!({
            "name": "mode",
            "type": "select",
            "options": [{"value": "a", "label": "A"}, "b", {"value": 3, "label": "C"}]
        }));
        assert!(field.select_options().is_none());

        let field = decode(json!({
            "name": "content",
            "type": "library",
            "options": ["H5P.Text 1.1", 7]
        }));
        assert!(field.library_options().is_none());
    }

    #[test]
    fn test_unrecognized_options_reencode_unchanged() {
        let raw = json!({
            "name": "content",
            "type": "library",
            "options": [{"value": "a", "label": "A"}, "b"]
        });
        let field = decode(raw.clone());
        assert_eq!(serde_json::to_value(&field).unwrap(), raw);
    }

    #[test]
    fn test_nested_tree_keeps_unknown_attributes() {
        let raw = json!([{
            "name": "answers",
            "type": "list",
            "min": 1,
            "defaultNum": 2,
            "entity": "option",
            "widgets": [{"name": "VerticalTabs", "label": "Default"}],
            "field": {
                "name": "answer",
                "type": "group",
                "fields": [
                    {"name": "text", "type": "text", "widget": "html", "tags": ["strong", "em"]},
                    {"name": "correct", "type": "boolean", "default": false},
                    {"name": "fraction", "type": "number", "step": 0.5, "optional": false}
                ]
            }
        }]);

        let semantics: Semantics = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&semantics).unwrap(), raw);

        let answers = semantics.find("answers").unwrap();
        assert!(answers.extra.contains_key("widgets"));
        assert_eq!(answers.children().count(), 1);
    }

    #[test]
    fn test_walk_paths() {
        let semantics = Semantics::from(vec![
            Field::new("question", FieldType::Text),
            Field::list(
                "answers",
                "option",
                Field::group(
                    "answer",
                    vec![
                        Field::new("text", FieldType::Text),
                        Field::new("correct", FieldType::Boolean),
                    ],
                ),
            ),
        ]);

        let paths: Vec<String> = semantics.walk().into_iter().map(|(p, _)| p).collect();
        assert!(paths.contains(&"question".to_string()));
        assert!(paths.contains(&"answers[]".to_string()));
        assert!(paths.contains(&"answers[].correct".to_string()));
    }

    #[test]
    fn test_ambiguous_options_are_collected() {
        let semantics: Semantics = serde_json::from_value(json!([
            {"name": "ok", "type": "select", "options": [{"value": "a", "label": "A"}]},
            {"name": "group", "type": "group", "fields": [
                {"name": "bad", "type": "library", "options": [{"value": "a", "label": "A"}]}
            ]}
        ]))
        .unwrap();

        let problems = semantics.ambiguous_options();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].0, "group.bad");
    }

    #[test]
    fn test_setters_refuse_wrong_type() {
        let mut field = Field::new("title", FieldType::Text);
        assert!(field.set_select_options(vec![SelectOption::new("a", "A")]).is_err());

        let mut field = Field::select("mode", Vec::new());
        field
            .set_select_options(vec![SelectOption::new("a", "A")])
            .unwrap();
        assert_eq!(field.select_options().unwrap().len(), 1);
    }

    #[test]
    fn test_other_types_round_trip() {
        let field = decode(json!({"name": "media", "type": "image"}));
        assert_eq!(field.field_type, FieldType::Other("image".to_string()));
        assert_eq!(serde_json::to_value(&field).unwrap()["type"], "image");
    }

    #[test]
    fn test_null_default_is_kept() {
        let raw = json!([
            {"name": "x", "type": "text", "default": null},
            {"name": "y", "type": "text"}
        ]);
        let semantics: Semantics = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(semantics.fields()[0].default, Some(Value::Null));
        assert_eq!(semantics.fields()[1].default, None);
        assert_eq!(serde_json::to_value(&semantics).unwrap(), raw);
    }
}
