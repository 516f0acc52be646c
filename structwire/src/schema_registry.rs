//! Process-wide store of compiled [`ObjectSerializerProgram`]s, plus
//! idempotent "has this named schema group already been loaded" bookkeeping
//! for [`crate::struct_serializer::StructSerializer::register_schema`]/
//! `load_schema`.
//!
//! Grounded on the same `once_cell::sync::Lazy` + `RwLock` shape as
//! [`crate::registry::GLOBAL_REGISTRY`], kept as a separate singleton
//! because it is keyed by record type rather than by every value type.

use std::{
	any::TypeId,
	collections::HashMap,
	sync::{Arc, Mutex, RwLock},
};

use once_cell::sync::Lazy;

use crate::{
	error::{CodecError, CodecErrorKind, MappingError, MappingErrorKind},
	program::ObjectSerializerProgram,
	registry::{global, TypeTag},
};

struct SchemaRegistryInner {
	programs: HashMap<TypeId, Arc<ObjectSerializerProgram>>,
}

/// The process-wide compiled-program store.
pub struct SchemaRegistry {
	inner: RwLock<SchemaRegistryInner>,
	/// One lock per schema-group name, held for the duration of that name's
	/// `load` closure — serializes concurrent `register_schema`/`load_schema`
	/// callers for the same name and only flips to "loaded" after `load`
	/// returns `Ok`, so a failed load neither masks itself as success nor
	/// lets a second caller observe a partially-published group. Kept apart
	/// from `inner` so a `load` closure's own `install` calls (which take
	/// `inner`) never nest under this lock.
	load_locks: Mutex<HashMap<&'static str, Arc<Mutex<bool>>>>,
}

impl SchemaRegistry {
	fn new() -> Self {
		Self {
			inner: RwLock::new(SchemaRegistryInner { programs: HashMap::new() }),
			load_locks: Mutex::new(HashMap::new()),
		}
	}

	/// Install a freshly compiled program. Fails if the type already has one
	/// installed — reinstalling would silently change the wire format for a
	/// type other code may already be relying on.
	pub fn install(&self, program: ObjectSerializerProgram) -> Result<(), MappingError> {
		let mut inner = self.inner.write().expect("schema registry lock poisoned");
		if inner.programs.contains_key(&program.type_id) {
			return Err(MappingError::new(MappingErrorKind::AlreadySpecialized {
				type_name: program.type_name,
			}));
		}
		tracing::debug!(type_name = program.type_name, "installing struct serializer program");
		inner.programs.insert(program.type_id, Arc::new(program));
		Ok(())
	}

	pub fn is_registered(&self, type_id: TypeId) -> bool {
		self.inner.read().expect("schema registry lock poisoned").programs.contains_key(&type_id)
	}

	pub fn program_for(&self, type_id: TypeId, type_name: &'static str) -> Result<Arc<ObjectSerializerProgram>, CodecError> {
		self.inner
			.read()
			.expect("schema registry lock poisoned")
			.programs
			.get(&type_id)
			.cloned()
			.ok_or_else(|| CodecError::new(CodecErrorKind::UnregisteredType { type_name }))
	}

	pub fn program_for_tag(&self, tag: TypeTag) -> Result<Arc<ObjectSerializerProgram>, CodecError> {
		let type_id = global()
			.type_for_tag(tag)
			.ok_or(CodecError::new(CodecErrorKind::UnregisteredTag { tag: tag.0 }))?;
		self.inner
			.read()
			.expect("schema registry lock poisoned")
			.programs
			.get(&type_id)
			.cloned()
			.ok_or(CodecError::new(CodecErrorKind::UnregisteredTag { tag: tag.0 }))
	}

	/// Run `load` for `name` exactly once across the process. Concurrent
	/// callers for the same `name` block on each other rather than racing:
	/// the first caller to arrive runs `load` while holding that name's
	/// lock, and only marks the name loaded once `load` returns `Ok`, so a
	/// later caller either waits for that successful load to finish
	/// publishing or — if `load` failed — gets to retry it itself rather
	/// than silently observing a masked success.
	pub fn load_once<F>(&self, name: &'static str, load: F) -> Result<(), MappingError>
	where
		F: FnOnce() -> Result<(), MappingError>,
	{
		let lock = Arc::clone(
			self.load_locks
				.lock()
				.expect("schema load-lock map poisoned")
				.entry(name)
				.or_insert_with(|| Arc::new(Mutex::new(false))),
		);
		let mut loaded = lock.lock().expect("schema load lock poisoned");
		if *loaded {
			return Ok(());
		}
		load()?;
		*loaded = true;
		Ok(())
	}
}

/// The process-wide schema registry singleton.
pub static GLOBAL_SCHEMA_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::new);

/// Convenience accessor for [`GLOBAL_SCHEMA_REGISTRY`].
pub fn global_schema() -> &'static SchemaRegistry {
	&GLOBAL_SCHEMA_REGISTRY
}
