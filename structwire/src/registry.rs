//! The process-wide value-serializer registry (§4.1).
//!
//! Grounded on the teacher's `SchemaBuilder::already_built_types:
//! HashMap<TypeId, SchemaKey>` de-duplication idiom
//! (`serde_avro_derive/src/lib.rs`), generalized into a process-wide,
//! append-only singleton published via `once_cell::sync::Lazy` the way this
//! spec's "process-wide, read-mostly" registry requires.

use std::{
	any::TypeId,
	collections::HashMap,
	sync::{Arc, RwLock},
};

use once_cell::sync::Lazy;

use crate::{
	builtin::{
		bytes::ByteArrayCodec,
		integers::{
			BoolCodec, CharCodec, F32Codec, F64Codec, I128Codec, I16Codec, I32Codec, I64Codec, I8Codec, U128Codec,
			U16Codec, U32Codec, U64Codec, U8Codec,
		},
		text::StringCodec,
		timespan::DurationTicksCodec,
	},
	config::EngineConfig,
	error::{MappingError, MappingErrorKind},
	value_serializer::ValueSerializer,
};

/// A monotonically-assigned 16-bit identifier for a specialized record type.
///
/// Ids never recycle, even if hypothetically a record type could be
/// "un-specialized" (it cannot be, by design — specialization is one-way for
/// the lifetime of the process).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeTag(pub u16);

struct RegistryInner {
	by_type: HashMap<TypeId, Arc<dyn ValueSerializer>>,
	type_names: HashMap<TypeId, &'static str>,
	specializations: HashMap<TypeId, TypeTag>,
	reverse_specializations: HashMap<TypeTag, TypeId>,
	next_tag: u16,
}

impl RegistryInner {
	fn new() -> Self {
		let mut inner = Self {
			by_type: HashMap::new(),
			type_names: HashMap::new(),
			specializations: HashMap::new(),
			reverse_specializations: HashMap::new(),
			next_tag: 0,
		};
		inner.register_builtins();
		inner
	}

	fn register_builtins(&mut self) {
		macro_rules! builtin {
			($ty:ty, $codec:expr) => {
				self.by_type.insert(TypeId::of::<$ty>(), Arc::new($codec));
				self.type_names.insert(TypeId::of::<$ty>(), stringify!($ty));
			};
		}
		builtin!(i8, I8Codec);
		builtin!(i16, I16Codec);
		builtin!(i32, I32Codec);
		builtin!(i64, I64Codec);
		builtin!(i128, I128Codec);
		builtin!(u8, U8Codec);
		builtin!(u16, U16Codec);
		builtin!(u32, U32Codec);
		builtin!(u64, U64Codec);
		builtin!(u128, U128Codec);
		builtin!(f32, F32Codec);
		builtin!(f64, F64Codec);
		builtin!(bool, BoolCodec);
		builtin!(char, CharCodec);
		builtin!(String, StringCodec);
		builtin!(Vec<u8>, ByteArrayCodec);
		builtin!(std::time::Duration, DurationTicksCodec);
	}
}

/// The process-wide value-serializer registry.
///
/// All methods take `&self` and synchronize internally: the registry is
/// meant to be reached through the [`global`] singleton and shared freely
/// across threads.
pub struct EngineRegistry {
	inner: RwLock<RegistryInner>,
	config: RwLock<EngineConfig>,
}

impl EngineRegistry {
	fn new() -> Self {
		Self {
			inner: RwLock::new(RegistryInner::new()),
			config: RwLock::new(EngineConfig::default()),
		}
	}

	/// The current guard rails applied during deserialization.
	pub fn config(&self) -> EngineConfig {
		*self.config.read().expect("registry config lock poisoned")
	}

	/// Replace the guard rails applied during deserialization.
	pub fn set_config(&self, config: EngineConfig) {
		*self.config.write().expect("registry config lock poisoned") = config;
	}

	/// Register a value-serializer for `type_id`. Fails with
	/// `DuplicateSerializer` if one is already registered for that type.
	pub fn register(
		&self,
		type_id: TypeId,
		type_name: &'static str,
		serializer: Arc<dyn ValueSerializer>,
	) -> Result<(), MappingError> {
		let mut inner = self.inner.write().expect("registry lock poisoned");
		if inner.by_type.contains_key(&type_id) {
			return Err(MappingError::new(MappingErrorKind::DuplicateSerializer { type_name }));
		}
		tracing::debug!(type_name, "registering value-serializer");
		inner.by_type.insert(type_id, serializer);
		inner.type_names.insert(type_id, type_name);
		Ok(())
	}

	/// Register a value-serializer for `type_id` if none is registered yet;
	/// otherwise a no-op. Used by the analyzer's recursive extension, which
	/// must be idempotent.
	pub fn register_if_absent(&self, type_id: TypeId, type_name: &'static str, serializer: Arc<dyn ValueSerializer>) {
		let mut inner = self.inner.write().expect("registry lock poisoned");
		if inner.by_type.contains_key(&type_id) {
			return;
		}
		tracing::debug!(type_name, "extending registry with generic specialization");
		inner.by_type.insert(type_id, serializer);
		inner.type_names.insert(type_id, type_name);
	}

	/// `true` if a value-serializer is registered for `type_id`.
	pub fn is_extendable(&self, type_id: TypeId) -> bool {
		let inner = self.inner.read().expect("registry lock poisoned");
		!inner.by_type.contains_key(&type_id)
	}

	/// Look up the value-serializer for `type_id`.
	pub fn get_for_type(&self, type_id: TypeId, type_name: &'static str) -> Result<Arc<dyn ValueSerializer>, MappingError> {
		let inner = self.inner.read().expect("registry lock poisoned");
		inner
			.by_type
			.get(&type_id)
			.cloned()
			.ok_or(MappingError::new(MappingErrorKind::UnsupportedType { type_name }))
	}

	/// `true` if a value-serializer is registered for `type_id` (the codec
	/// registry's half of `StructSerializer::supports_type`).
	pub fn supports_type(&self, type_id: TypeId) -> bool {
		let inner = self.inner.read().expect("registry lock poisoned");
		inner.by_type.contains_key(&type_id)
	}

	/// Assign the next monotonically increasing specialization-type-id to
	/// `type_id`. Fails with `AlreadySpecialized` if it already has one.
	pub fn specialize(&self, type_id: TypeId, type_name: &'static str) -> Result<TypeTag, MappingError> {
		let mut inner = self.inner.write().expect("registry lock poisoned");
		if inner.specializations.contains_key(&type_id) {
			return Err(MappingError::new(MappingErrorKind::AlreadySpecialized { type_name }));
		}
		let tag = TypeTag(inner.next_tag);
		inner.next_tag = inner
			.next_tag
			.checked_add(1)
			.expect("ran out of 16-bit specialization-type-ids");
		tracing::debug!(type_name, tag = tag.0, "specializing record type");
		inner.specializations.insert(type_id, tag);
		inner.reverse_specializations.insert(tag, type_id);
		Ok(tag)
	}

	/// The specialization-type-id for `type_id`, if it has been specialized.
	pub fn tag_for_type(&self, type_id: TypeId) -> Option<TypeTag> {
		self.inner.read().expect("registry lock poisoned").specializations.get(&type_id).copied()
	}

	/// The type that was specialized as `tag`, if any.
	pub fn type_for_tag(&self, tag: TypeTag) -> Option<TypeId> {
		self.inner
			.read()
			.expect("registry lock poisoned")
			.reverse_specializations
			.get(&tag)
			.copied()
	}
}

/// The process-wide registry singleton.
pub static GLOBAL_REGISTRY: Lazy<EngineRegistry> = Lazy::new(EngineRegistry::new);

/// Convenience accessor for [`GLOBAL_REGISTRY`].
pub fn global() -> &'static EngineRegistry {
	&GLOBAL_REGISTRY
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builtins_are_registered() {
		assert!(global().supports_type(TypeId::of::<i32>()));
		assert!(global().supports_type(TypeId::of::<String>()));
		assert!(!global().supports_type(TypeId::of::<Vec<i32>>()));
	}

	#[test]
	fn duplicate_registration_is_rejected() {
		let registry = EngineRegistry::new();
		let id = TypeId::of::<i32>();
		assert!(registry.register(id, "i32", Arc::new(I32Codec)).is_err());
	}
}
