//! Serialize/deserialize callback pairs keyed by type id and namespace.
//!
//! Callbacks are type-erased over [`CodecValue`] and carry a declared
//! [`Signature`], so a registry can reject a callback of the wrong shape at
//! registration time instead of when the first value flows through it.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use registrar_core::{CodecValue, Definition, Namespace, PersistedForm, Signature, TypeId};
use tracing::debug;

use crate::{CallbackRole, CodecError, RegistryError};

type CallbackFn = dyn Fn(CodecValue) -> Result<CodecValue, CodecError> + Send + Sync;

/// A codec callback with its declared shape.
#[derive(Clone)]
pub struct Callback {
    signature: Signature,
    func: Arc<CallbackFn>,
}

impl Callback {
    /// Wrap an arbitrary function declaring `signature`.
    ///
    /// This is the entry point for hosts that build callbacks dynamically; the
    /// declared signature is checked when the callback is registered.
    pub fn new<F>(signature: Signature, func: F) -> Self
    where
        F: Fn(CodecValue) -> Result<CodecValue, CodecError> + Send + Sync + 'static,
    {
        Self {
            signature,
            func: Arc::new(func),
        }
    }

    /// A correctly shaped serializer for `D`.
    pub fn serializer<D, F>(func: F) -> Self
    where
        D: Definition,
        F: Fn(&D) -> D::Persisted + Send + Sync + 'static,
    {
        Self::try_serializer::<D, _, Infallible>(move |definition| Ok(func(definition)))
    }

    /// A serializer for `D` that can refuse a definition.
    ///
    /// An `Err` surfaces from [`CodecRegistry::serialize`] as
    /// [`CodecError::Callback`].
    pub fn try_serializer<D, F, E>(func: F) -> Self
    where
        D: Definition,
        F: Fn(&D) -> Result<D::Persisted, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Self::new(D::KIND.serialize_signature(), move |value| {
            let definition = D::from_value(value).map_err(|other| CodecError::UnexpectedInput {
                role: CallbackRole::Serialize,
                expected: D::VALUE_KIND,
                found: other.kind(),
            })?;
            func(&definition)
                .map(PersistedForm::into_value)
                .map_err(|err| CodecError::Callback(err.to_string()))
        })
    }

    /// A correctly shaped deserializer for `D`.
    pub fn deserializer<D, F>(func: F) -> Self
    where
        D: Definition,
        F: Fn(&D::Persisted) -> D + Send + Sync + 'static,
    {
        Self::try_deserializer::<D, _, Infallible>(move |data| Ok(func(data)))
    }

    /// A deserializer for `D` that can reject persisted data.
    pub fn try_deserializer<D, F, E>(func: F) -> Self
    where
        D: Definition,
        F: Fn(&D::Persisted) -> Result<D, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Self::new(D::KIND.deserialize_signature(), move |value| {
            let data = D::Persisted::from_value(value).map_err(|other| {
                CodecError::UnexpectedInput {
                    role: CallbackRole::Deserialize,
                    expected: <D::Persisted as PersistedForm>::VALUE_KIND,
                    found: other.kind(),
                }
            })?;
            func(&data)
                .map(Definition::into_value)
                .map_err(|err| CodecError::Callback(err.to_string()))
        })
    }

    /// Declared shape.
    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Invoke the callback.
    pub fn call(&self, value: CodecValue) -> Result<CodecValue, CodecError> {
        (self.func)(value)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Callbacks that passed [`CodecRegistry::validate`].
///
/// Installing them cannot fail, which lets callers validate before mutating
/// anything else.
#[derive(Debug, Clone)]
pub struct ValidatedCodecs<D: Definition> {
    serialize: Option<Callback>,
    deserialize: Option<Callback>,
    _marker: PhantomData<fn() -> D>,
}

/// Serialize/deserialize pairs for one definition kind.
///
/// Writes overwrite: registering a key that already has a callback replaces
/// it rather than failing. Each deserializer remembers the type id that
/// installed it, so [`CodecRegistry::forget`] never drops a namespace another
/// definition has since claimed.
pub struct CodecRegistry<D: Definition> {
    serializers: HashMap<TypeId, Callback>,
    deserializers: HashMap<Namespace, (TypeId, Callback)>,
    _marker: PhantomData<fn() -> D>,
}

impl<D: Definition> CodecRegistry<D> {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            serializers: HashMap::new(),
            deserializers: HashMap::new(),
            _marker: PhantomData,
        }
    }

    /// Check callback shapes against this kind's expected signatures.
    pub fn validate(
        serialize: Option<Callback>,
        deserialize: Option<Callback>,
    ) -> Result<ValidatedCodecs<D>, RegistryError> {
        check_signature(
            CallbackRole::Serialize,
            D::KIND.serialize_signature(),
            serialize.as_ref(),
        )?;
        check_signature(
            CallbackRole::Deserialize,
            D::KIND.deserialize_signature(),
            deserialize.as_ref(),
        )?;
        Ok(ValidatedCodecs {
            serialize,
            deserialize,
            _marker: PhantomData,
        })
    }

    /// Validate and install a codec pair for `definition` under `namespace`.
    pub fn register(
        &mut self,
        namespace: &Namespace,
        definition: &D,
        serialize: Option<Callback>,
        deserialize: Option<Callback>,
    ) -> Result<(), RegistryError> {
        let codecs = Self::validate(serialize, deserialize)?;
        self.install(namespace, definition, codecs);
        Ok(())
    }

    /// Install validated callbacks, synthesizing defaults for missing ones.
    ///
    /// The default serializer emits the minimal persisted form for
    /// `namespace`; the default deserializer ignores its input and returns a
    /// clone of `definition`.
    pub fn install(&mut self, namespace: &Namespace, definition: &D, codecs: ValidatedCodecs<D>) {
        let type_id = definition.type_id();

        let serialize = codecs.serialize.unwrap_or_else(|| {
            let namespace = namespace.clone();
            Callback::serializer::<D, _>(move |_| D::Persisted::minimal(namespace.clone()))
        });
        let deserialize = codecs.deserialize.unwrap_or_else(|| {
            let definition = definition.clone();
            Callback::deserializer::<D, _>(move |_| definition.clone())
        });

        if self.serializers.remove(&type_id).is_some() {
            debug!(kind = %D::KIND, %type_id, "Replacing serializer");
        }
        self.serializers.insert(type_id, serialize);

        if let Some((owner, _)) = self.deserializers.remove(namespace) {
            debug!(kind = %D::KIND, %namespace, %owner, "Replacing deserializer");
        }
        self.deserializers.insert(namespace.clone(), (type_id, deserialize));
    }

    /// Drop the serializer for `type_id`, and the deserializer for
    /// `namespace` if `type_id` still owns it.
    pub fn forget(&mut self, type_id: TypeId, namespace: &Namespace) {
        self.serializers.remove(&type_id);
        if self.deserializer_owner(namespace) == Some(type_id) {
            self.deserializers.remove(namespace);
        }
    }

    /// Type id whose registration installed the deserializer for `namespace`.
    pub fn deserializer_owner(&self, namespace: &Namespace) -> Option<TypeId> {
        self.deserializers.get(namespace).map(|(owner, _)| *owner)
    }

    /// Run the serializer registered for `definition`'s type id.
    pub fn serialize(&self, definition: &D) -> Result<D::Persisted, CodecError> {
        let type_id = definition.type_id();
        let callback = self
            .serializers
            .get(&type_id)
            .ok_or(CodecError::NoSerializer {
                kind: D::KIND,
                type_id,
            })?;
        let output = callback.call(definition.clone().into_value())?;
        D::Persisted::from_value(output).map_err(|other| CodecError::UnexpectedOutput {
            role: CallbackRole::Serialize,
            expected: <D::Persisted as PersistedForm>::VALUE_KIND,
            found: other.kind(),
        })
    }

    /// Run the deserializer registered for `data`'s namespace.
    pub fn deserialize(&self, data: &D::Persisted) -> Result<D, CodecError> {
        let namespace = data.namespace();
        let (_, callback) = self.deserializers.get(namespace).ok_or_else(|| {
            CodecError::NoDeserializer {
                namespace: namespace.clone(),
            }
        })?;
        let output = callback.call(data.clone().into_value())?;
        D::from_value(output).map_err(|other| CodecError::UnexpectedOutput {
            role: CallbackRole::Deserialize,
            expected: D::VALUE_KIND,
            found: other.kind(),
        })
    }

    /// Whether a serializer exists for `type_id`.
    pub fn has_serializer(&self, type_id: TypeId) -> bool {
        self.serializers.contains_key(&type_id)
    }

    /// Whether a deserializer exists for `namespace`.
    pub fn has_deserializer(&self, namespace: &Namespace) -> bool {
        self.deserializers.contains_key(namespace)
    }
}

impl<D: Definition> Default for CodecRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_signature(
    role: CallbackRole,
    expected: Signature,
    callback: Option<&Callback>,
) -> Result<(), RegistryError> {
    match callback {
        Some(cb) if cb.signature() != expected => Err(RegistryError::InvalidCallbackSignature {
            role,
            expected,
            found: cb.signature(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrar_core::{
        BlockDefinition, BlockStateData, DefinitionKind, ItemDefinition, RuntimeId, SavedItemData,
        StateValue, ValueKind,
    };

    fn ruby() -> ItemDefinition {
        ItemDefinition::new(TypeId(2001), "Ruby")
    }

    #[test]
    fn default_codecs_round_trip_by_id() {
        let mut codecs = CodecRegistry::new();
        let ns = Namespace::derive("Ruby");
        codecs.register(&ns, &ruby(), None, None).unwrap();

        let saved = codecs.serialize(&ruby()).unwrap();
        assert_eq!(saved, SavedItemData::new(ns));
        let restored = codecs.deserialize(&saved).unwrap();
        assert_eq!(restored.type_id, ruby().type_id);
    }

    #[test]
    fn custom_callbacks_are_used() {
        let mut codecs = CodecRegistry::new();
        let ns = Namespace::parse("customies:lamp").unwrap();
        let block = BlockDefinition::new(TypeId(1001), "Lamp", RuntimeId(9000));
        let ser_ns = ns.clone();
        let ser = Callback::serializer::<BlockDefinition, _>(move |b| {
            let mut data = BlockStateData::new(ser_ns.clone());
            data.states.insert("lit".into(), StateValue::Bool(b.states.contains_key("lit")));
            data
        });
        let template = block.clone();
        let de = Callback::deserializer::<BlockDefinition, _>(move |data| {
            let mut restored = template.clone();
            restored.states = data.states.clone();
            restored
        });
        codecs.register(&ns, &block, Some(ser), Some(de)).unwrap();

        let data = codecs.serialize(&block).unwrap();
        assert_eq!(data.states.get("lit"), Some(&StateValue::Bool(false)));
        let restored = codecs.deserialize(&data).unwrap();
        assert_eq!(restored.states.get("lit"), Some(&StateValue::Bool(false)));
    }

    #[test]
    fn rejects_swapped_callbacks_before_mutation() {
        let mut codecs = CodecRegistry::<ItemDefinition>::new();
        let ns = Namespace::derive("Ruby");
        let backwards = Callback::deserializer::<ItemDefinition, _>(|_| ruby());

        let err = codecs
            .register(&ns, &ruby(), Some(backwards), None)
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::InvalidCallbackSignature {
                role: CallbackRole::Serialize,
                expected: Signature::new(ValueKind::Item, ValueKind::SavedItem),
                found: Signature::new(ValueKind::SavedItem, ValueKind::Item),
            }
        );
        assert!(!codecs.has_serializer(TypeId(2001)));
        assert!(!codecs.has_deserializer(&ns));
    }

    #[test]
    fn rejects_callbacks_for_the_other_kind() {
        let block_de = Callback::deserializer::<BlockDefinition, _>(|data| {
            BlockDefinition::new(TypeId(1), data.name.path(), RuntimeId(0))
        });
        let err = CodecRegistry::<ItemDefinition>::validate(None, Some(block_de)).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidCallbackSignature {
                role: CallbackRole::Deserialize,
                ..
            }
        ));
    }

    #[test]
    fn re_registering_replaces_instead_of_failing() {
        let mut codecs = CodecRegistry::new();
        let ns = Namespace::derive("Ruby");
        codecs.register(&ns, &ruby(), None, None).unwrap();

        let mut tagged = SavedItemData::new(ns.clone());
        tagged.meta = 3;
        let out = tagged.clone();
        let ser = Callback::serializer::<ItemDefinition, _>(move |_| out.clone());
        codecs.register(&ns, &ruby(), Some(ser), None).unwrap();

        assert_eq!(codecs.serialize(&ruby()).unwrap().meta, 3);
    }

    #[test]
    fn lying_callbacks_fail_at_call_time() {
        let mut codecs = CodecRegistry::<ItemDefinition>::new();
        let ns = Namespace::derive("Ruby");
        let liar = Callback::new(DefinitionKind::Item.serialize_signature(), Ok);
        codecs.register(&ns, &ruby(), Some(liar), None).unwrap();
        assert_eq!(
            codecs.serialize(&ruby()).unwrap_err(),
            CodecError::UnexpectedOutput {
                role: CallbackRole::Serialize,
                expected: ValueKind::SavedItem,
                found: ValueKind::Item,
            }
        );
    }

    #[test]
    fn unknown_keys_report_missing_codecs() {
        let codecs = CodecRegistry::<ItemDefinition>::new();
        assert!(matches!(
            codecs.serialize(&ruby()),
            Err(CodecError::NoSerializer { .. })
        ));
        assert!(matches!(
            codecs.deserialize(&SavedItemData::new(Namespace::derive("Ruby"))),
            Err(CodecError::NoDeserializer { .. })
        ));
    }

    #[test]
    fn forget_leaves_namespaces_claimed_by_others() {
        let mut codecs = CodecRegistry::new();
        let gem = Namespace::parse("minecraft:gem").unwrap();
        let jade = ItemDefinition::new(TypeId(2002), "Jade");
        codecs.register(&gem, &ruby(), None, None).unwrap();
        codecs.register(&gem, &jade, None, None).unwrap();
        assert_eq!(codecs.deserializer_owner(&gem), Some(TypeId(2002)));

        codecs.forget(TypeId(2001), &gem);
        assert!(!codecs.has_serializer(TypeId(2001)));
        assert_eq!(
            codecs.deserialize(&SavedItemData::new(gem.clone())).unwrap().type_id,
            TypeId(2002)
        );

        codecs.forget(TypeId(2002), &gem);
        assert!(!codecs.has_deserializer(&gem));
    }

    #[test]
    fn failing_callbacks_report_their_reason() {
        let mut codecs = CodecRegistry::new();
        let ns = Namespace::derive("Ruby");
        let ser = Callback::try_serializer::<ItemDefinition, _, _>(|item| {
            if item.properties.contains_key("cursed") {
                Err("cursed items cannot be saved")
            } else {
                Ok(SavedItemData::new(Namespace::derive("Ruby")))
            }
        });
        let de = Callback::try_deserializer::<ItemDefinition, _, _>(|data| {
            if data.meta < 0 {
                Err(format!("negative meta {}", data.meta))
            } else {
                Ok(ruby())
            }
        });
        codecs.register(&ns, &ruby(), Some(ser), Some(de)).unwrap();

        assert!(codecs.serialize(&ruby()).is_ok());
        assert_eq!(
            codecs.serialize(&ruby().with_property("cursed", "yes")),
            Err(CodecError::Callback("cursed items cannot be saved".to_string()))
        );

        let mut bad = SavedItemData::new(ns);
        bad.meta = -1;
        assert_eq!(
            codecs.deserialize(&bad),
            Err(CodecError::Callback("negative meta -1".to_string()))
        );
    }
}
