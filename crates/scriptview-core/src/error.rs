//! Load error taxonomy.
//!
//! The `Display` text of each variant is the diagnostic shown to the user.
//! Technical detail (decoder messages, I/O errors) is kept in fields and
//! sources for logging.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a file's text could not be turned into records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text is not syntactically valid JSON.
    #[error("JSONの解析に失敗しました")]
    Malformed { detail: String },

    /// The text decoded, but the top-level value is not an array.
    #[error("JSONは配列形式である必要があります")]
    NotAnArray { found: &'static str },
}

/// Why one delivered file did not become a document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("JSONファイルを選択してください")]
    Ineligible,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("ファイルの読み込みに失敗しました")]
    Read(#[source] std::io::Error),
}

impl LoadError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LoadError::Ineligible => FailureKind::Ineligible,
            LoadError::Parse(ParseError::Malformed { .. }) => FailureKind::Malformed,
            LoadError::Parse(ParseError::NotAnArray { .. }) => FailureKind::WrongShape,
            LoadError::Read(_) => FailureKind::Read,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Read(err)
    }
}

/// Coarse class of a [`crate::LoadFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Ineligible,
    Malformed,
    WrongShape,
    Read,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Ineligible => "ineligible",
            FailureKind::Malformed => "malformed",
            FailureKind::WrongShape => "wrong_shape",
            FailureKind::Read => "read",
        }
    }
}
