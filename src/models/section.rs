// Per-category result as it appears on the wire: the data itself or `{"error": "..."}`

use serde::{Deserialize, Serialize};

use crate::error::SourceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section<T> {
    Ok(T),
    Err { error: String },
}

impl<T> Section<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Section::Err {
            error: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Section::Ok(_))
    }

    pub fn as_ok(&self) -> Option<&T> {
        match self {
            Section::Ok(v) => Some(v),
            Section::Err { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Section::Ok(_) => None,
            Section::Err { error } => Some(error),
        }
    }
}

impl<T> From<Result<T, SourceError>> for Section<T> {
    fn from(r: Result<T, SourceError>) -> Self {
        match r {
            Ok(v) => Section::Ok(v),
            Err(e) => Section::error(e.to_string()),
        }
    }
}
