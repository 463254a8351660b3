//! Namespaced definition keys.
//!
//! A [`Namespace`] is the stable string identity a definition is persisted
//! and sent over the wire under (e.g. `minecraft:stone_block`). Caller-supplied
//! keys are validated; keys derived from display names are not, since host
//! display names may carry characters the validator rejects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default namespace used when a key omits an explicit namespace.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Longest accepted `namespace:path` key, in bytes, separator included.
pub const MAX_KEY_LEN: usize = 256;

/// Which side of the `:` a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPart {
    /// Before the `:`.
    Namespace,
    /// After the `:`.
    Path,
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Namespace => write!(f, "namespace"),
            KeyPart::Path => write!(f, "path"),
        }
    }
}

/// Error returned when a caller-supplied key is not a valid [`Namespace`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamespaceError {
    /// Nothing but whitespace.
    #[error("identifier is empty")]
    Empty,
    /// One side of the `:` is blank, as in `":stone"` or `"customies:"`.
    #[error("identifier {key:?} has an empty {part}")]
    MissingPart {
        /// Offending input.
        key: String,
        /// Blank side.
        part: KeyPart,
    },
    /// The whole key exceeds [`MAX_KEY_LEN`].
    #[error("identifier {key:?} is {len} bytes long (limit 256)")]
    TooLong {
        /// Offending input.
        key: String,
        /// Its length in bytes.
        len: usize,
    },
    /// A character outside `a-z 0-9 _ - .` (plus `/` in paths).
    #[error("identifier {key:?} has {ch:?} in its {part}")]
    InvalidChar {
        /// Offending input.
        key: String,
        /// Side containing the character.
        part: KeyPart,
        /// First rejected character.
        ch: char,
    },
}

/// A namespaced key of the form `namespace:path`.
///
/// Ordering is lexical by `(namespace, path)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Namespace {
    namespace: String,
    path: String,
}

impl Namespace {
    /// Parse a key, using [`DEFAULT_NAMESPACE`] when the input has no `:`.
    pub fn parse(input: &str) -> Result<Self, NamespaceError> {
        Self::parse_with_default_namespace(input, DEFAULT_NAMESPACE)
    }

    /// Parse a key using a caller-provided default namespace.
    pub fn parse_with_default_namespace(
        input: &str,
        default_namespace: &str,
    ) -> Result<Self, NamespaceError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(NamespaceError::Empty);
        }

        let (namespace, path) = input
            .split_once(':')
            .map(|(ns, p)| (ns.trim(), p.trim()))
            .unwrap_or((default_namespace, input));

        let key = || input.to_string();
        let len = namespace.len() + 1 + path.len();
        if len > MAX_KEY_LEN {
            return Err(NamespaceError::TooLong { key: key(), len });
        }
        for (part, text) in [(KeyPart::Namespace, namespace), (KeyPart::Path, path)] {
            if text.is_empty() {
                return Err(NamespaceError::MissingPart { key: key(), part });
            }
            if let Some(ch) = text.chars().find(|&c| !allowed_in(part, c)) {
                return Err(NamespaceError::InvalidChar { key: key(), part, ch });
            }
        }

        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Derive the default key for a definition from its display name.
    ///
    /// The path is the lowercased name with spaces replaced by underscores:
    /// `"Stone Block"` becomes `minecraft:stone_block`. Never fails.
    pub fn from_display_name(display_name: &str, default_namespace: &str) -> Self {
        Self {
            namespace: default_namespace.to_string(),
            path: display_name.replace(' ', "_").to_lowercase(),
        }
    }

    /// [`Namespace::from_display_name`] under [`DEFAULT_NAMESPACE`].
    pub fn derive(display_name: &str) -> Self {
        Self::from_display_name(display_name, DEFAULT_NAMESPACE)
    }

    /// Namespace component (before the `:`).
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Path component (after the `:`).
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for Namespace {
    type Err = NamespaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Normalize a user-facing name for catalog and alias lookups.
///
/// Lowercases, replaces spaces with underscores and strips a leading
/// `minecraft:` prefix, so `"Minecraft:Iron_Sword"` and `"iron sword"` both
/// become `iron_sword`.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase().replace(' ', "_");
    match lowered.strip_prefix("minecraft:") {
        Some(rest) => rest.to_string(),
        None => lowered,
    }
}

fn allowed_in(part: KeyPart, c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.') || (part == KeyPart::Path && c == '/')
}
