//! [`StructSerializer`]: the process-wide façade (§6) tying mapping,
//! compilation, and interpretation together behind one entry point per
//! record type.
//!
//! Grounded on the teacher's top-level `SchemaRegistry`/`serde_avro_fast`
//! facade: one process-wide surface that callers reach for by type, never
//! threading a registry handle of their own through application code.

use std::{
	any::{Any, TypeId},
	marker::PhantomData,
	sync::Arc,
};

use crate::{
	compiler,
	config::EngineConfig,
	error::{CodecError, CodecErrorKind, MappingError},
	interpreter,
	mapping::MapperBuilder,
	reflect::Reflected,
	registry::{global, TypeTag},
	schema_registry::global_schema,
	value_serializer::{take, take_mut, ValueSerializer},
};

/// Process-wide façade over the registry, mapper, compiler, and
/// interpreter. Every method is a free-standing associated function: the
/// façade carries no state of its own beyond the process-wide singletons it
/// delegates to.
pub struct StructSerializer;

impl StructSerializer {
	/// Build and install a record type's mapping, in one step, via a
	/// caller-supplied builder closure. Fails if `T` is already registered.
	///
	/// Also registers `T` as a [`ValueSerializer`] in the value-serializer
	/// registry, so it can be nested inside another record's `Option<T>`/
	/// `Vec<T>`/`HashMap<_, T>` slot the same way a primitive can.
	pub fn define_struct<T, F>(configure: F) -> Result<(), MappingError>
	where
		T: Reflected + Send + Sync,
		F: FnOnce(MapperBuilder<T>) -> MapperBuilder<T>,
	{
		let mapping = configure(MapperBuilder::<T>::new()).build()?;
		let program = compiler::compile(mapping)?;
		global_schema().install(program)?;
		global().register_if_absent(TypeId::of::<T>(), T::type_name(), Arc::new(RecordValueSerializer::<T>::new()));
		Ok(())
	}

	/// Register `T` with its default mapping (every `pub` field, default
	/// construction) if it has not already been registered. Used by
	/// generated `Reflectable` impls for record types reached only through
	/// a nested slot, which never call `define_struct` themselves.
	pub fn ensure_struct_registered<T>() -> Result<(), MappingError>
	where
		T: Reflected + Send + Sync,
	{
		if global_schema().is_registered(TypeId::of::<T>()) {
			return Ok(());
		}
		Self::define_struct::<T, _>(|builder| builder.public_fields())
	}

	/// `true` if `T` has an installed mapping.
	pub fn supports_type<T: 'static>() -> bool {
		global_schema().is_registered(TypeId::of::<T>())
	}

	pub fn serialize<T: Reflected>(value: &T, buf: &mut [u8], offset: &mut usize) -> Result<(), CodecError> {
		let program = global_schema().program_for(TypeId::of::<T>(), T::type_name())?;
		interpreter::serialize(&program, value as &dyn Any, buf, offset)
	}

	pub fn deserialize<T: Reflected>(buf: &[u8], offset: &mut usize) -> Result<T, CodecError> {
		let program = global_schema().program_for(TypeId::of::<T>(), T::type_name())?;
		let config = global().config();
		let boxed = interpreter::deserialize(&program, buf, offset, &config)?;
		Ok(*boxed
			.downcast::<T>()
			.expect("installed program's type_id matches the requested type"))
	}

	/// Deserialize into an already-constructed `target`, skipping
	/// activation — for reusing a pooled instance.
	pub fn deserialize_into<T: Reflected>(target: &mut T, buf: &[u8], offset: &mut usize) -> Result<(), CodecError> {
		let program = global_schema().program_for(TypeId::of::<T>(), T::type_name())?;
		let config = global().config();
		interpreter::deserialize_into(&program, target as &mut dyn Any, buf, offset, &config)
	}

	pub fn get_size_from_value<T: Reflected>(value: &T) -> Result<u16, CodecError> {
		let program = global_schema().program_for(TypeId::of::<T>(), T::type_name())?;
		interpreter::size_from_value(&program, value as &dyn Any)
	}

	pub fn get_size_from_buffer<T: Reflected>(buf: &[u8], offset: usize) -> Result<u16, CodecError> {
		let program = global_schema().program_for(TypeId::of::<T>(), T::type_name())?;
		let config = global().config();
		interpreter::size_from_buffer(&program, buf, offset, &config)
	}

	/// Assign `T` a process-wide [`TypeTag`] for use with
	/// [`Self::serialize_tagged`]/[`Self::deserialize_tagged`].
	pub fn specialize<T: Reflected>() -> Result<TypeTag, MappingError> {
		global().specialize(TypeId::of::<T>(), T::type_name())
	}

	/// Write a 2-byte [`TypeTag`] prefix ahead of `value`'s own encoding, so
	/// a reader that does not statically know `T` can still dispatch to the
	/// right program via [`Self::deserialize_tagged`].
	pub fn serialize_tagged<T: Reflected>(value: &T, buf: &mut [u8], offset: &mut usize) -> Result<(), CodecError> {
		let tag = global()
			.tag_for_type(TypeId::of::<T>())
			.ok_or(CodecError::new(CodecErrorKind::UnregisteredType { type_name: T::type_name() }))?;
		take_mut(buf, *offset, 2)?.copy_from_slice(&tag.0.to_ne_bytes());
		*offset += 2;
		Self::serialize(value, buf, offset)
	}

	/// Read a 2-byte [`TypeTag`] prefix and dispatch to its program,
	/// returning the type-erased instance alongside the tag that selected
	/// it.
	pub fn deserialize_tagged(buf: &[u8], offset: &mut usize) -> Result<(TypeTag, Box<dyn Any>), CodecError> {
		let prefix = take(buf, *offset, 2)?;
		let tag = TypeTag(u16::from_ne_bytes([prefix[0], prefix[1]]));
		*offset += 2;
		let config = global().config();
		let program = global_schema().program_for_tag(tag)?;
		let instance = interpreter::deserialize(&program, buf, offset, &config)?;
		Ok((tag, instance))
	}

	/// Run `load` — typically a block of `define_struct`/`specialize` calls
	/// for a related group of record types — exactly once per process no
	/// matter how many times `register_schema` is called with the same
	/// `name`. Intended for call sites that always need the group ready
	/// before proceeding, e.g. a module's initialization path.
	pub fn register_schema<F>(name: &'static str, load: F) -> Result<(), MappingError>
	where
		F: FnOnce() -> Result<(), MappingError>,
	{
		global_schema().load_once(name, load)
	}

	/// Same idempotency guarantee as [`Self::register_schema`], for call
	/// sites that only conditionally need the group and want to express
	/// that as "load if not already loaded" rather than an upfront
	/// registration step.
	pub fn load_schema<F>(name: &'static str, load: F) -> Result<(), MappingError>
	where
		F: FnOnce() -> Result<(), MappingError>,
	{
		Self::register_schema(name, load)
	}
}

/// Adapts a record type's compiled program to the [`ValueSerializer`]
/// interface, so it can sit in the same registry slot as a primitive codec
/// once nested inside another record's `Option<T>`/`Vec<T>`/`HashMap<_, T>`.
struct RecordValueSerializer<T> {
	_marker: PhantomData<fn() -> T>,
}

impl<T> RecordValueSerializer<T> {
	fn new() -> Self {
		Self { _marker: PhantomData }
	}
}

impl<T: Reflected + Send + Sync> ValueSerializer for RecordValueSerializer<T> {
	fn type_name(&self) -> &'static str {
		T::type_name()
	}

	fn serialize(&self, value: &dyn Any, buf: &mut [u8], offset: &mut usize) -> Result<(), CodecError> {
		let program = global_schema().program_for(TypeId::of::<T>(), T::type_name())?;
		let value = value
			.downcast_ref::<T>()
			.ok_or_else(|| CodecError::malformed("value did not match the expected record type"))?;
		interpreter::serialize(&program, value as &dyn Any, buf, offset)
	}

	fn deserialize(&self, buf: &[u8], offset: &mut usize, config: &EngineConfig) -> Result<Box<dyn Any>, CodecError> {
		let program = global_schema().program_for(TypeId::of::<T>(), T::type_name())?;
		interpreter::deserialize(&program, buf, offset, config)
	}

	fn size_from_value(&self, value: &dyn Any) -> Result<u16, CodecError> {
		let program = global_schema().program_for(TypeId::of::<T>(), T::type_name())?;
		let value = value
			.downcast_ref::<T>()
			.ok_or_else(|| CodecError::malformed("value did not match the expected record type"))?;
		interpreter::size_from_value(&program, value as &dyn Any)
	}

	fn size_from_buffer(&self, buf: &[u8], offset: usize, config: &EngineConfig) -> Result<u16, CodecError> {
		let program = global_schema().program_for(TypeId::of::<T>(), T::type_name())?;
		interpreter::size_from_buffer(&program, buf, offset, config)
	}
}
