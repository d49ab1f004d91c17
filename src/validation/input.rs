//! Normalized request input shared by every rule set.

use std::collections::HashMap;

/// A text field value after trimming. Repeated or `name[]` fields become lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValue {
    Text(String),
    List(Vec<String>),
}

/// An uploaded file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Raw form input: text fields plus uploaded files, keyed by field name.
///
/// Strings are trimmed on the way in and empty strings are dropped, so an
/// absent field and a blank one look the same to the rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    fields: HashMap<String, InputValue>,
    files: HashMap<String, Vec<UploadedFile>>,
}

fn normalize_key(key: &str) -> (&str, bool) {
    key.strip_suffix("[]").map_or((key, false), |base| (base, true))
}

impl FormInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text value. A second value under the same key, or a key ending
    /// in `[]`, turns the field into a list.
    pub fn push_text(&mut self, key: &str, value: &str) {
        let (key, is_list) = normalize_key(key);
        let value = value.trim();

        if value.is_empty() {
            if is_list {
                self.fields
                    .entry(key.to_string())
                    .or_insert_with(|| InputValue::List(Vec::new()));
            }
            return;
        }

        match self.fields.remove(key) {
            None if is_list => {
                self.fields
                    .insert(key.to_string(), InputValue::List(vec![value.to_string()]));
            }
            None => {
                self.fields
                    .insert(key.to_string(), InputValue::Text(value.to_string()));
            }
            Some(InputValue::Text(existing)) => {
                self.fields.insert(
                    key.to_string(),
                    InputValue::List(vec![existing, value.to_string()]),
                );
            }
            Some(InputValue::List(mut items)) => {
                items.push(value.to_string());
                self.fields.insert(key.to_string(), InputValue::List(items));
            }
        }
    }

    /// Adds an uploaded file. Empty parts with no file name (an untouched
    /// file input) are ignored.
    pub fn push_file(&mut self, key: &str, file: UploadedFile) {
        if file.file_name.is_empty() && file.bytes.is_empty() {
            return;
        }
        let (key, _) = normalize_key(key);
        self.files.entry(key.to_string()).or_default().push(file);
    }

    #[must_use]
    pub fn with_text(mut self, key: &str, value: &str) -> Self {
        self.push_text(key, value);
        self
    }

    #[must_use]
    pub fn with_file(mut self, key: &str, file: UploadedFile) -> Self {
        self.push_file(key, file);
        self
    }

    /// Builds input from a JSON object. Numbers and booleans become text,
    /// arrays become lists and nulls are absent.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut input = Self::new();
        let Some(object) = value.as_object() else {
            return input;
        };

        for (key, value) in object {
            match value {
                serde_json::Value::Array(items) => {
                    input
                        .fields
                        .insert(key.clone(), InputValue::List(Vec::new()));
                    for item in items {
                        if let Some(text) = json_scalar(item) {
                            input.push_text(&format!("{key}[]"), &text);
                        }
                    }
                }
                other => {
                    if let Some(text) = json_scalar(other) {
                        input.push_text(key, &text);
                    }
                }
            }
        }

        input
    }

    #[must_use]
    pub fn value(&self, key: &str) -> Option<&InputValue> {
        self.fields.get(key)
    }

    /// Single text value, if present.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(InputValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    /// List value. A single text value reads as a one-element list.
    #[must_use]
    pub fn list(&self, key: &str) -> Vec<&str> {
        match self.fields.get(key) {
            Some(InputValue::Text(value)) => vec![value.as_str()],
            Some(InputValue::List(items)) => items.iter().map(String::as_str).collect(),
            None => Vec::new(),
        }
    }

    #[must_use]
    pub fn files(&self, key: &str) -> &[UploadedFile] {
        self.files.get(key).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn has_files(&self, key: &str) -> bool {
        !self.files(key).is_empty()
    }
}

fn json_scalar(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        // Kept as text so the type rules reject it.
        serde_json::Value::Object(_) => Some(value.to_string()),
        serde_json::Value::Null | serde_json::Value::Array(_) => None,
    }
}
