//! Numeric identities and the per-kind type id allocator.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::definition::DefinitionKind;

/// Stable numeric identity of a definition within its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wire-level identity. Supplied by the caller, never allocated here.
///
/// Vanilla catalogs use negative ids for some block items, so this is signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuntimeId(pub i32);

impl fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The allocator ran past `u32::MAX` for a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} type id space exhausted")]
pub struct IdSpaceExhausted {
    /// Kind whose counter overflowed.
    pub kind: DefinitionKind,
}

/// Issues strictly increasing type ids per kind, starting one past the
/// highest id reserved for vanilla content.
///
/// Custom and vanilla ids share one numeric space; anything above the floor
/// is custom.
#[derive(Debug, Clone)]
pub struct IdentifierAllocator {
    first_unused_item: u32,
    first_unused_block: u32,
    next_item: Option<u32>,
    next_block: Option<u32>,
}

impl IdentifierAllocator {
    /// Create an allocator whose first ids are `first_unused_* + 1`.
    pub fn new(first_unused_item: u32, first_unused_block: u32) -> Self {
        Self {
            first_unused_item,
            first_unused_block,
            next_item: first_unused_item.checked_add(1),
            next_block: first_unused_block.checked_add(1),
        }
    }

    /// Consume and return the next id for `kind`.
    pub fn next(&mut self, kind: DefinitionKind) -> Result<TypeId, IdSpaceExhausted> {
        let slot = match kind {
            DefinitionKind::Item => &mut self.next_item,
            DefinitionKind::Block => &mut self.next_block,
        };
        let id = slot.ok_or(IdSpaceExhausted { kind })?;
        *slot = id.checked_add(1);
        Ok(TypeId(id))
    }

    /// The id the next call to [`IdentifierAllocator::next`] would return.
    pub fn peek(&self, kind: DefinitionKind) -> Option<TypeId> {
        match kind {
            DefinitionKind::Item => self.next_item,
            DefinitionKind::Block => self.next_block,
        }
        .map(TypeId)
    }

    /// Highest id reserved for vanilla content of `kind`.
    pub fn floor(&self, kind: DefinitionKind) -> u32 {
        match kind {
            DefinitionKind::Item => self.first_unused_item,
            DefinitionKind::Block => self.first_unused_block,
        }
    }

    /// Whether `id` lies in the custom range for `kind`.
    pub fn is_custom(&self, kind: DefinitionKind, id: TypeId) -> bool {
        id.0 > self.floor(kind)
    }
}
