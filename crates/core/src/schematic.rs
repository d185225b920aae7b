//! The intermediate artifact passed from a frontend to a backend, and its
//! JSON document form.
//!
//! The engine never looks inside `body`; only the frontend that produced a
//! schematic and the backend that consumes it agree on its shape.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schematic {
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub body: Value,
}

impl Schematic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            body: Value::Null,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }
}

/// Convert a schematic into its JSON document
pub fn serialize(schematic: &Schematic) -> Result<Value> {
    Ok(serde_json::to_value(schematic)?)
}

/// Rebuild a schematic from a JSON document.
///
/// The document must be a JSON object.
pub fn deserialize(document: Value) -> Result<Schematic> {
    if !document.is_object() {
        return Err(Error::InvalidSchematic(
            "expected a JSON object at the top level".to_string(),
        ));
    }
    serde_json::from_value(document).map_err(|e| Error::InvalidSchematic(e.to_string()))
}

pub fn to_pretty_string(schematic: &Schematic) -> Result<String> {
    let document = serialize(schematic)?;
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parse a schematic document from a reader
pub fn read_from<R: Read>(reader: R) -> Result<Schematic> {
    let document: Value = serde_json::from_reader(reader).map_err(|e| {
        if e.is_io() {
            Error::Io(e.into())
        } else {
            Error::InvalidSchematic(e.to_string())
        }
    })?;
    deserialize(document)
}

/// Write a pretty-printed schematic document, terminated by a newline
pub fn write_to<W: Write>(schematic: &Schematic, mut writer: W) -> Result<()> {
    let text = to_pretty_string(schematic)?;
    writer.write_all(text.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
