use std::fmt;

use registrar_core::{
    DefinitionKind, IdSpaceExhausted, Namespace, NamespaceError, Signature, TypeId, ValueKind,
};
use thiserror::Error;

/// Which half of a codec pair a callback fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackRole {
    /// Definition to persisted form.
    Serialize,
    /// Persisted form to definition.
    Deserialize,
}

impl fmt::Display for CallbackRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackRole::Serialize => write!(f, "serialize"),
            CallbackRole::Deserialize => write!(f, "deserialize"),
        }
    }
}

/// Errors that abort a registration before any state is written.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// The type id is taken and the caller did not ask to force.
    #[error("{kind} {type_id} is already registered")]
    DuplicateRegistration {
        /// Registry the collision happened in.
        kind: DefinitionKind,
        /// Colliding id.
        type_id: TypeId,
    },
    /// A supplied callback does not have the shape its slot requires.
    #[error("invalid {role} callback: expected {expected}, found {found}")]
    InvalidCallbackSignature {
        /// Slot the callback was supplied for.
        role: CallbackRole,
        /// Required shape.
        expected: Signature,
        /// Declared shape.
        found: Signature,
    },
    /// A caller-supplied namespace failed validation.
    #[error("invalid namespace: {0}")]
    InvalidNamespace(#[from] NamespaceError),
    /// The id allocator overflowed.
    #[error(transparent)]
    IdSpaceExhausted(#[from] IdSpaceExhausted),
}

/// Errors raised while running codec callbacks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// Nothing registered under the definition's type id.
    #[error("no serializer registered for {kind} {type_id}")]
    NoSerializer {
        /// Registry searched.
        kind: DefinitionKind,
        /// Missing id.
        type_id: TypeId,
    },
    /// Nothing registered under the persisted form's namespace.
    #[error("no deserializer registered for {namespace}")]
    NoDeserializer {
        /// Missing key.
        namespace: Namespace,
    },
    /// A callback was handed a value it cannot accept.
    #[error("{role} callback received {found}, expected {expected}")]
    UnexpectedInput {
        /// Slot of the callback.
        role: CallbackRole,
        /// Accepted kind.
        expected: ValueKind,
        /// Received kind.
        found: ValueKind,
    },
    /// A callback produced a value of the wrong kind.
    #[error("{role} callback returned {found}, expected {expected}")]
    UnexpectedOutput {
        /// Slot of the callback.
        role: CallbackRole,
        /// Required kind.
        expected: ValueKind,
        /// Returned kind.
        found: ValueKind,
    },
    /// The callback itself reported a failure.
    #[error("callback failed: {0}")]
    Callback(String),
}
