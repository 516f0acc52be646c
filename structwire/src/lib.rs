//! A binary object serialization engine: compiles record descriptions (slots
//! plus an activation strategy) into specialized serialize/deserialize/size
//! routines, the way a networking layer needs to turn typed Rust values into
//! wire bytes and back without going through a generic self-describing
//! format on every call.
//!
//! # Getting started
//!
//! ```
//! use structwire_derive::Reflected;
//!
//! #[derive(Reflected, Debug, PartialEq, Default)]
//! struct Point {
//! 	x: i32,
//! 	y: i32,
//! }
//!
//! structwire::define_struct::<Point, _>(|builder| builder.public_fields())
//! 	.expect("failed to register Point");
//!
//! let point = Point { x: 1, y: 2 };
//! let size = structwire::get_size_from_value(&point).unwrap() as usize;
//! let mut buf = vec![0u8; size];
//! structwire::serialize(&point, &mut buf, &mut 0).unwrap();
//! assert_eq!(structwire::deserialize::<Point>(&buf, &mut 0).unwrap(), point);
//! ```
//!
//! # Layered architecture
//!
//! - [`registry`] — the process-wide value-serializer registry, pre-loaded
//!   with every primitive and lazily extended for generic categories.
//! - [`analyzer`] — [`Reflectable`], the recursive registry-extension walk,
//!   expressed through Rust generics rather than a type-erased graph walk.
//! - [`reflect`] — [`Reflected`], the static per-type metadata surface that
//!   `#[derive(Reflected)]` (in the `structwire_derive` crate) implements.
//! - [`mapping`] — [`MapperBuilder`], turning a type's metadata plus a
//!   chosen activation strategy into an [`ObjectSerializationMapping`].
//! - [`compiler`]/[`program`] — lowering a mapping into a flat op sequence.
//! - [`interpreter`] — running that op sequence against a buffer.
//! - [`struct_serializer`] — [`StructSerializer`], the process-wide façade
//!   this crate's free functions delegate to.

pub mod analyzer;
pub mod bitfield;
pub mod builtin;
pub mod compiler;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod mapping;
pub mod program;
pub mod reflect;
pub mod registry;
pub mod schema_registry;
pub mod struct_serializer;
pub mod value_serializer;

pub use analyzer::Reflectable;
pub use config::EngineConfig;
pub use error::{CodecError, CodecErrorKind, MappingError, MappingErrorKind};
pub use mapping::{MapperBuilder, ObjectActivator, ObjectSerializationMapping, SerializationValue};
pub use reflect::{ConstructorDescriptor, Reflected, SlotDescriptor, SlotKind};
pub use registry::TypeTag;
pub use struct_serializer::StructSerializer;
pub use value_serializer::ValueSerializer;

/// Start building a mapping for `T` without installing it. Most callers want
/// [`define_struct`] instead; this is for call sites that need to inspect or
/// compose a [`MapperBuilder`] before committing to it.
pub fn map<T: Reflected>() -> MapperBuilder<T> {
	MapperBuilder::new()
}

/// Build and install `T`'s mapping via `configure`, in one step. See
/// [`StructSerializer::define_struct`].
pub fn define_struct<T, F>(configure: F) -> Result<(), MappingError>
where
	T: Reflected,
	F: FnOnce(MapperBuilder<T>) -> MapperBuilder<T>,
{
	StructSerializer::define_struct(configure)
}

/// See [`StructSerializer::serialize`].
pub fn serialize<T: Reflected>(value: &T, buf: &mut [u8], offset: &mut usize) -> Result<(), CodecError> {
	StructSerializer::serialize(value, buf, offset)
}

/// See [`StructSerializer::deserialize`].
pub fn deserialize<T: Reflected>(buf: &[u8], offset: &mut usize) -> Result<T, CodecError> {
	StructSerializer::deserialize(buf, offset)
}

/// See [`StructSerializer::deserialize_into`].
pub fn deserialize_into<T: Reflected>(target: &mut T, buf: &[u8], offset: &mut usize) -> Result<(), CodecError> {
	StructSerializer::deserialize_into(target, buf, offset)
}

/// See [`StructSerializer::get_size_from_value`].
pub fn get_size_from_value<T: Reflected>(value: &T) -> Result<u16, CodecError> {
	StructSerializer::get_size_from_value(value)
}

/// See [`StructSerializer::get_size_from_buffer`].
pub fn get_size_from_buffer<T: Reflected>(buf: &[u8], offset: usize) -> Result<u16, CodecError> {
	StructSerializer::get_size_from_buffer(buf, offset)
}

/// See [`StructSerializer::supports_type`].
pub fn supports_type<T: 'static>() -> bool {
	StructSerializer::supports_type::<T>()
}

/// See [`StructSerializer::register_schema`].
pub fn register_schema<F>(name: &'static str, load: F) -> Result<(), MappingError>
where
	F: FnOnce() -> Result<(), MappingError>,
{
	StructSerializer::register_schema(name, load)
}

/// See [`StructSerializer::load_schema`].
pub fn load_schema<F>(name: &'static str, load: F) -> Result<(), MappingError>
where
	F: FnOnce() -> Result<(), MappingError>,
{
	StructSerializer::load_schema(name, load)
}
