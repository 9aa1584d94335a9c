//! File-type tags describing what a reassembled payload contains.

use serde::{Deserialize, Serialize};

/// Semantic content of a BBQr payload, carried as one header character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    /// Partially signed Bitcoin transaction (`P`).
    Psbt,
    /// Signed, consensus-encoded Bitcoin transaction (`T`).
    Transaction,
    /// JSON document (`J`).
    Json,
    /// CBOR document (`C`).
    Cbor,
    /// UTF-8 text (`U`).
    UnicodeText,
    /// Executable (`X`).
    Executable,
    /// Opaque binary data (`B`).
    Binary,
}

impl FileType {
    /// Every tag recognised by the codec.
    pub const ALL: [Self; 7] = [
        Self::Psbt,
        Self::Transaction,
        Self::Json,
        Self::Cbor,
        Self::UnicodeText,
        Self::Executable,
        Self::Binary,
    ];

    /// Header character for this type.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Psbt => 'P',
            Self::Transaction => 'T',
            Self::Json => 'J',
            Self::Cbor => 'C',
            Self::UnicodeText => 'U',
            Self::Executable => 'X',
            Self::Binary => 'B',
        }
    }

    /// Look up a type from its header character.
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.code() == code)
    }

    /// Human readable label used in summaries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Psbt => "PSBT (Partially Signed Bitcoin Transaction)",
            Self::Transaction => "Bitcoin Transaction",
            Self::Json => "JSON",
            Self::Cbor => "CBOR",
            Self::UnicodeText => "Unicode Text",
            Self::Executable => "Executable",
            Self::Binary => "Binary",
        }
    }

    /// Whether the payload is expected to be valid UTF-8 text.
    #[must_use]
    pub const fn is_text(self) -> bool { matches!(self, Self::Json | Self::UnicodeText) }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
