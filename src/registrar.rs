//! Registration facade.
//!
//! One [`Registrar`] owns every lookup structure for items and blocks and
//! keeps them in step. A registration call moves through
//! [`RegistrationStage`]s; only `Validating` and `CheckingDuplicate` can fail,
//! so a call either writes nothing or writes everything.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use registrar_catalog::LazyCatalog;
use registrar_core::{
    BlockDefinition, BlockStateData, Definition, DefinitionKind, IdentifierAllocator,
    ItemDefinition, Namespace, RuntimeId, SavedItemData, TypeId,
};
use registrar_registry::{
    AliasMap, BlockCaches, Callback, CodecError, CodecRegistry, DefinitionStore, NameDictionary,
    RegistryError,
};
use registrar_replication::{
    CaptureRecord, ReplicationError, ReplicationHandle, ReplicationTask, ReplicationWorker,
};
use tracing::{debug, trace, warn};

use crate::{RegistrarConfig, RegistrarError};

/// A registrar shared between threads. Every call holds the lock for its
/// whole duration, which is the supported way to register concurrently.
pub type SharedRegistrar = Arc<Mutex<Registrar>>;

/// Progress of a single registration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStage {
    /// Resolving the namespace and checking callback shapes.
    Validating,
    /// Looking for a type id collision.
    CheckingDuplicate,
    /// Writing the definition store.
    WritingDefinition,
    /// Writing the codec registry.
    WritingCodecs,
    /// Writing the name dictionary.
    WritingDictionary,
    /// All writes finished.
    Done,
    /// Failed before any write.
    Aborted,
}

struct StageTracker {
    kind: DefinitionKind,
    type_id: TypeId,
    stage: RegistrationStage,
}

impl StageTracker {
    fn new(kind: DefinitionKind, type_id: TypeId) -> Self {
        Self {
            kind,
            type_id,
            stage: RegistrationStage::Validating,
        }
    }

    fn enter(&mut self, stage: RegistrationStage) {
        trace!(kind = %self.kind, type_id = %self.type_id, from = ?self.stage, to = ?stage, "Registration stage");
        self.stage = stage;
    }
}

/// Optional arguments to [`Registrar::register_item`] and
/// [`Registrar::register_block`].
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    /// Overwrite an existing registration with the same type id.
    pub force: bool,
    /// Explicit namespace; `None` or an empty string derives one from the name.
    pub namespace: Option<String>,
    /// Custom serializer.
    pub serialize: Option<Callback>,
    /// Custom deserializer.
    pub deserialize: Option<Callback>,
}

impl RegisterOptions {
    /// Defaults: no force, derived namespace, default codecs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow overwriting an existing registration.
    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    /// Register under `namespace` instead of the derived one.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Use `callback` as the serializer.
    pub fn serializer(mut self, callback: Callback) -> Self {
        self.serialize = Some(callback);
        self
    }

    /// Use `callback` as the deserializer.
    pub fn deserializer(mut self, callback: Callback) -> Self {
        self.deserialize = Some(callback);
        self
    }
}

/// Item and block registries for one server process.
pub struct Registrar {
    config: RegistrarConfig,
    ids: IdentifierAllocator,
    items: DefinitionStore<ItemDefinition>,
    item_codecs: CodecRegistry<ItemDefinition>,
    item_dictionary: NameDictionary<ItemDefinition>,
    item_bindings: HashMap<TypeId, (Namespace, RuntimeId)>,
    item_aliases: AliasMap<ItemDefinition>,
    blocks: BlockCaches,
    pending_blocks: Vec<CaptureRecord>,
    catalog: LazyCatalog,
    last_stage: Option<RegistrationStage>,
}

impl Registrar {
    /// Empty registrar. The catalog is not read until the first lookup.
    pub fn new(config: RegistrarConfig) -> Self {
        let catalog = LazyCatalog::new(config.catalog_path.clone());
        Self::with_catalog(config, catalog)
    }

    /// Empty registrar using an already constructed catalog.
    pub fn with_catalog(config: RegistrarConfig, catalog: LazyCatalog) -> Self {
        Self {
            ids: IdentifierAllocator::new(config.first_unused_item_id, config.first_unused_block_id),
            config,
            items: DefinitionStore::new(),
            item_codecs: CodecRegistry::new(),
            item_dictionary: NameDictionary::new(),
            item_bindings: HashMap::new(),
            item_aliases: AliasMap::new(),
            blocks: BlockCaches::new(),
            pending_blocks: Vec::new(),
            catalog,
            last_stage: None,
        }
    }

    /// Wrap in a [`SharedRegistrar`].
    pub fn into_shared(self) -> SharedRegistrar {
        Arc::new(Mutex::new(self))
    }

    /// Active configuration.
    pub fn config(&self) -> &RegistrarConfig {
        &self.config
    }

    /// Final stage reached by the most recent registration call.
    pub fn last_stage(&self) -> Option<RegistrationStage> {
        self.last_stage
    }

    /// Register `item` and bind it to `runtime_id` for the wire layer.
    ///
    /// Fails with [`RegistryError::DuplicateRegistration`] if the type id is
    /// taken and `options.force` is unset, or with
    /// [`RegistryError::InvalidCallbackSignature`] if a callback has the
    /// wrong shape. Either way nothing is written.
    pub fn register_item(
        &mut self,
        item: ItemDefinition,
        runtime_id: RuntimeId,
        options: RegisterOptions,
    ) -> Result<(), RegistrarError> {
        let mut stage = StageTracker::new(DefinitionKind::Item, item.type_id());
        let result = self.register_item_staged(item, runtime_id, options, &mut stage);
        self.finish(stage, result)
    }

    fn register_item_staged(
        &mut self,
        item: ItemDefinition,
        runtime_id: RuntimeId,
        options: RegisterOptions,
        stage: &mut StageTracker,
    ) -> Result<(), RegistrarError> {
        let type_id = item.type_id();

        let namespace = self.resolve_namespace(item.name(), options.namespace.as_deref())?;
        let codecs = CodecRegistry::<ItemDefinition>::validate(options.serialize, options.deserialize)?;

        stage.enter(RegistrationStage::CheckingDuplicate);
        self.items.check(type_id, options.force)?;

        stage.enter(RegistrationStage::WritingDefinition);
        if let Some(previous) = self.items.replace(item.clone()) {
            warn!(%type_id, replaced = %previous.name, "Overwriting item registration");
            self.item_aliases.remove_alias(previous.name(), type_id);
            if let Some((old, old_runtime_id)) = self.item_bindings.remove(&type_id) {
                self.item_codecs.forget(type_id, &old);
                self.item_dictionary.unbind(&old, old_runtime_id, type_id);
            }
        }
        self.item_aliases.override_alias(item.name(), item.clone());

        stage.enter(RegistrationStage::WritingCodecs);
        self.item_codecs.install(&namespace, &item, codecs);

        stage.enter(RegistrationStage::WritingDictionary);
        self.item_dictionary.bind(namespace.clone(), runtime_id, item);

        debug!(%type_id, %namespace, %runtime_id, "Registered item");
        self.item_bindings.insert(type_id, (namespace, runtime_id));
        Ok(())
    }

    /// Register `block` under its state id and queue it for replication.
    ///
    /// Same failure modes as [`Registrar::register_item`], plus
    /// [`RegistrarError::Snapshot`] if the block cannot be captured.
    pub fn register_block(
        &mut self,
        block: BlockDefinition,
        options: RegisterOptions,
    ) -> Result<(), RegistrarError> {
        let mut stage = StageTracker::new(DefinitionKind::Block, block.type_id());
        let result = self.register_block_staged(block, options, &mut stage);
        self.finish(stage, result)
    }

    fn register_block_staged(
        &mut self,
        block: BlockDefinition,
        options: RegisterOptions,
        stage: &mut StageTracker,
    ) -> Result<(), RegistrarError> {
        let type_id = block.type_id();
        let state_id = block.state_id;

        let namespace = self.resolve_namespace(block.name(), options.namespace.as_deref())?;
        let codecs = CodecRegistry::<BlockDefinition>::validate(
            options.serialize.clone(),
            options.deserialize.clone(),
        )?;
        let capture = CaptureRecord::capture(
            &block,
            namespace.clone(),
            options.serialize,
            options.deserialize,
        )?;

        stage.enter(RegistrationStage::CheckingDuplicate);
        self.blocks.store.check(type_id, options.force)?;

        stage.enter(RegistrationStage::WritingDefinition);
        if let Some(previous) = self.blocks.replace_definition(block.clone()) {
            warn!(%type_id, replaced = %previous.name, "Overwriting block registration");
        }

        stage.enter(RegistrationStage::WritingCodecs);
        self.blocks.install_codecs(&namespace, &block, codecs);

        stage.enter(RegistrationStage::WritingDictionary);
        debug!(%type_id, %namespace, %state_id, "Registered block");
        self.blocks.bind_state(namespace, block);
        self.pending_blocks.push(capture);
        Ok(())
    }

    fn finish(
        &mut self,
        mut stage: StageTracker,
        result: Result<(), RegistrarError>,
    ) -> Result<(), RegistrarError> {
        match &result {
            Ok(()) => stage.enter(RegistrationStage::Done),
            Err(err) => {
                debug!(kind = %stage.kind, type_id = %stage.type_id, at = ?stage.stage, %err, "Registration aborted");
                stage.enter(RegistrationStage::Aborted);
            }
        }
        self.last_stage = Some(stage.stage);
        result
    }

    fn resolve_namespace(
        &self,
        display_name: &str,
        requested: Option<&str>,
    ) -> Result<Namespace, RegistryError> {
        match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Ok(Namespace::parse_with_default_namespace(
                raw,
                &self.config.default_namespace,
            )?),
            None => Ok(Namespace::from_display_name(
                display_name,
                &self.config.default_namespace,
            )),
        }
    }

    /// Allocate the next custom item type id.
    pub fn next_item_id(&mut self) -> Result<TypeId, RegistryError> {
        Ok(self.ids.next(DefinitionKind::Item)?)
    }

    /// Allocate the next custom block type id.
    pub fn next_block_id(&mut self) -> Result<TypeId, RegistryError> {
        Ok(self.ids.next(DefinitionKind::Block)?)
    }

    /// Whether `type_id` lies above the vanilla item range.
    pub fn is_custom_item(&self, type_id: TypeId) -> bool {
        self.ids.is_custom(DefinitionKind::Item, type_id)
    }

    /// Whether `type_id` lies above the vanilla block range.
    pub fn is_custom_block(&self, type_id: TypeId) -> bool {
        self.ids.is_custom(DefinitionKind::Block, type_id)
    }

    /// Registered item with `type_id`.
    pub fn item_by_type_id(&self, type_id: TypeId) -> Option<&ItemDefinition> {
        self.items.get(type_id)
    }

    /// Registered block with `type_id`.
    pub fn block_by_type_id(&self, type_id: TypeId) -> Option<&BlockDefinition> {
        self.blocks.store.get(type_id)
    }

    /// Vanilla runtime id for `name`, from the catalog.
    pub fn runtime_id_by_name(&self, name: &str) -> Option<RuntimeId> {
        self.catalog.lookup(name)
    }

    /// A fresh copy of the item registered under display name `name`.
    pub fn parse_item(&self, name: &str) -> Option<ItemDefinition> {
        self.item_aliases.parse(name)
    }

    /// Runtime id bound to an item namespace.
    pub fn item_runtime_id(&self, namespace: &Namespace) -> Option<RuntimeId> {
        self.item_dictionary.runtime_id(namespace)
    }

    /// Item bound to `runtime_id`.
    pub fn item_by_runtime_id(&self, runtime_id: RuntimeId) -> Option<&ItemDefinition> {
        self.item_dictionary.definition(runtime_id)
    }

    /// State id bound to a block namespace.
    pub fn block_runtime_id(&self, namespace: &Namespace) -> Option<RuntimeId> {
        self.blocks.states.runtime_id(namespace)
    }

    /// Namespace an item was registered under.
    pub fn item_namespace(&self, type_id: TypeId) -> Option<&Namespace> {
        self.item_bindings.get(&type_id).map(|(namespace, _)| namespace)
    }

    /// Namespace a block was registered under.
    pub fn block_namespace(&self, type_id: TypeId) -> Option<&Namespace> {
        self.blocks.namespace(type_id)
    }

    /// Persist an item through its registered serializer.
    pub fn serialize_item(&self, item: &ItemDefinition) -> Result<SavedItemData, CodecError> {
        self.item_codecs.serialize(item)
    }

    /// Rebuild an item through the deserializer for its namespace.
    pub fn deserialize_item(&self, data: &SavedItemData) -> Result<ItemDefinition, CodecError> {
        self.item_codecs.deserialize(data)
    }

    /// Persist a block through its registered serializer.
    pub fn serialize_block(&self, block: &BlockDefinition) -> Result<BlockStateData, CodecError> {
        self.blocks.codecs.serialize(block)
    }

    /// Rebuild a block through the deserializer for its namespace.
    pub fn deserialize_block(&self, data: &BlockStateData) -> Result<BlockDefinition, CodecError> {
        self.blocks.codecs.deserialize(data)
    }

    /// Registered items, ordered by type id.
    pub fn items(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.items.iter()
    }

    /// Registered blocks, ordered by type id.
    pub fn blocks(&self) -> impl Iterator<Item = &BlockDefinition> {
        self.blocks.store.iter()
    }

    /// Block registrations captured since the last replication.
    pub fn pending_replication(&self) -> usize {
        self.pending_blocks.len()
    }

    /// Start a replication worker using the configured name and queue size.
    pub fn spawn_replication_worker(&self) -> Result<ReplicationWorker, ReplicationError> {
        let cfg = &self.config.replication;
        ReplicationWorker::spawn(cfg.worker_name.clone(), cfg.queue_capacity)
    }

    /// Submit every pending block capture to `worker` as one task.
    ///
    /// Drop the returned handle for fire-and-forget, or wait on it to learn
    /// how many records applied.
    pub fn start_replication(&mut self, worker: &ReplicationWorker) -> ReplicationHandle {
        let records = std::mem::take(&mut self.pending_blocks);
        debug!(worker = worker.name(), records = records.len(), "Submitting replication task");
        worker.submit(ReplicationTask::new(records))
    }
}
