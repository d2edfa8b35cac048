use std::path::PathBuf;
use thiserror::Error;

use crate::types::LinkClass;

#[derive(Debug, Error)]
pub enum Error {
    /// Required field missing, empty, or of the wrong shape
    #[error("Schema error in '{field}': {message}")]
    Schema { field: String, message: String },

    #[error("Locale error in '{field}': {message}")]
    Locale { field: String, message: String },

    #[error("Path '{path}' escapes the base path")]
    PathEscape { path: String },

    #[error("Broken {class} link in '{source_id}': '{target}' does not match any known route")]
    BrokenLink {
        class: LinkClass,
        source_id: String,
        target: String,
    },

    #[error("Unknown theme '{id}' in '{field}'")]
    UnknownTheme { field: String, id: String },

    #[error("Site assembly failed: {0}")]
    Assembly(#[source] Box<Error>),

    #[error("IO error reading '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn schema(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Schema {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn locale(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Locale {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Wrap into `Assembly` unless already wrapped
    pub fn into_assembly(self) -> Self {
        match self {
            Error::Assembly(_) => self,
            other => Error::Assembly(Box::new(other)),
        }
    }

    /// The underlying component failure, looking through `Assembly`
    pub fn root(&self) -> &Error {
        match self {
            Error::Assembly(inner) => inner.root(),
            other => other,
        }
    }
}

impl Error {
    /// Convert a TOML decode failure, using the error span to name the key
    pub fn from_toml(err: toml::de::Error, source: &str) -> Self {
        let message = err.message().to_string();
        let field = missing_field(&message)
            .map(str::to_string)
            .or_else(|| err.span().and_then(|span| key_path_at(source, span.start)))
            .unwrap_or_else(|| "site.toml".to_string());
        Error::Schema { field, message }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        let message = err.to_string();
        let field = missing_field(&message).unwrap_or("site.json").to_string();
        Error::Schema { field, message }
    }
}

/// Pull the field name out of serde's "missing field `x`" message
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.split("missing field `").nth(1)?;
    rest.split('`').next()
}

/// Dotted key path of the `key = value` pair whose key or value starts at `offset`
fn key_path_at(source: &str, offset: usize) -> Option<String> {
    let before = source.get(..offset)?;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let prefix = before[line_start..].trim_end();
    let line = match prefix.strip_suffix('=') {
        Some(line) => line,
        // Span starts at the key itself
        None if prefix.is_empty() => {
            let rest = &source[offset..];
            let rest = rest.split('\n').next().unwrap_or(rest);
            rest.split_once('=')?.0
        }
        None => return None,
    };

    // Walk inline tables opened on this line
    let mut keys: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in line.chars() {
        match c {
            '{' => {
                keys.push(assigned_key(&current));
                current.clear();
            }
            '}' => {
                keys.pop();
                current.clear();
            }
            ',' => current.clear(),
            _ => current.push(c),
        }
    }
    let key = assigned_key(&current);
    if key.is_empty() {
        return None;
    }
    keys.push(key);

    let table = before[..line_start].lines().rev().find_map(|line| {
        let line = line.trim();
        line.strip_prefix("[[")
            .and_then(|l| l.strip_suffix("]]"))
            .or_else(|| line.strip_prefix('[').and_then(|l| l.strip_suffix(']')))
    });
    if let Some(table) = table {
        keys.insert(0, table.trim().to_string());
    }
    Some(keys.join("."))
}

fn assigned_key(text: &str) -> String {
    let key = text.rsplit_once('=').map_or(text, |(key, _)| key);
    key.trim().trim_matches('"').to_string()
}

pub type Result<T> = std::result::Result<T, Error>;
