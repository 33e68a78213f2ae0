use std::path::Path;

use serde_yaml::{
    Mapping, Value,
    value::{Tag, TaggedValue},
};

use crate::error::Error;

/// Tag carried by TOML datetimes while they sit in the document tree, so they
/// stay leaves and are written back as datetimes.
pub const DATETIME_TAG: &str = "datetime";

/// Text format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// Picks the format from the extension of `path`. Anything that is not
    /// `.toml` is read as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }

    /// Default file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yml",
            Self::Toml => "toml",
        }
    }

    /// Parses `text` into a mapping. Blank input is an empty mapping.
    pub fn parse(self, text: &str) -> Result<Mapping, Error> {
        if text.trim().is_empty() {
            return Ok(Mapping::new());
        }

        let value: Value = match self {
            Self::Yaml => serde_yaml::from_str(text)?,
            Self::Toml => Value::Mapping(from_toml_table(toml::from_str(text)?)),
        };

        match value {
            Value::Mapping(map) => Ok(map),
            Value::Null => Ok(Mapping::new()),
            other => Err(Error::InvalidDocument(format!(
                "expected a mapping at the document root, found {}",
                kind(&other)
            ))),
        }
    }

    pub fn emit(self, root: &Mapping) -> Result<String, Error> {
        match self {
            Self::Yaml => Ok(serde_yaml::to_string(root)?),
            Self::Toml => Ok(toml::to_string_pretty(&to_toml_table(None, root)?)?),
        }
    }
}

fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(datetime) => Value::Tagged(Box::new(TaggedValue {
            tag: Tag::new(DATETIME_TAG),
            value: Value::String(datetime.to_string()),
        })),
        toml::Value::Array(items) => Value::Sequence(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => Value::Mapping(from_toml_table(table)),
    }
}

fn from_toml_table(table: toml::Table) -> Mapping {
    table
        .into_iter()
        .map(|(key, value)| (Value::String(key), from_toml(value)))
        .collect()
}

fn to_toml_table(prefix: Option<&str>, map: &Mapping) -> Result<toml::Table, Error> {
    let mut table = toml::Table::new();

    for (key, value) in map {
        let key = match key {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(Error::InvalidDocument(format!(
                    "TOML keys must be strings, found {}",
                    kind(other)
                )));
            }
        };

        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        let value = to_toml(&path, value)?;
        table.insert(key, value);
    }

    Ok(table)
}

fn to_toml(path: &str, value: &Value) -> Result<toml::Value, Error> {
    let value = match value {
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::String(s) => toml::Value::String(s.clone()),
        Value::Number(n) => match (n.as_i64(), n.is_u64(), n.as_f64()) {
            (Some(i), _, _) => toml::Value::Integer(i),
            (None, true, _) => return Err(unsupported(path, "integer does not fit in TOML")),
            (None, false, Some(f)) => toml::Value::Float(f),
            (None, false, None) => return Err(unsupported(path, "number has no TOML form")),
        },
        Value::Sequence(items) => toml::Value::Array(
            items
                .iter()
                .map(|item| to_toml(path, item))
                .collect::<Result<_, _>>()?,
        ),
        Value::Mapping(map) => toml::Value::Table(to_toml_table(Some(path), map)?),
        Value::Tagged(tagged) if tagged.tag == Tag::new(DATETIME_TAG) => match &tagged.value {
            Value::String(s) => toml::Value::Datetime(
                s.parse()
                    .map_err(|err| unsupported(path, format!("invalid datetime: {err}")))?,
            ),
            other => {
                return Err(unsupported(
                    path,
                    format!("datetime must be a string, found {}", kind(other)),
                ));
            }
        },
        Value::Tagged(tagged) => to_toml(path, &tagged.value)?,
        Value::Null => return Err(unsupported(path, "TOML has no null value")),
    };

    Ok(value)
}

fn unsupported(path: &str, reason: impl std::fmt::Display) -> Error {
    Error::InvalidDocument(format!("`{path}`: {reason}"))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
