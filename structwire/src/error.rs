//! Error taxonomy for schema-load-time (§`MappingError`) and encode/decode-time
//! (§`CodecError`) failures.
//!
//! Both follow the same shape as the teacher crate's `SchemaError`/`SerError`: a
//! public opaque struct wrapping a private `thiserror` enum, so new failure kinds
//! can be added without breaking callers who only match on `Display`/`source`.

use std::fmt;

/// Any error raised while mapping, compiling, or installing a record type.
///
/// These are always raised synchronously at schema-load time and are fatal only
/// for the mapping being built; they never appear once a type has been
/// installed into the [`StructSerializer`](crate::struct_serializer::StructSerializer).
#[derive(thiserror::Error)]
#[error(transparent)]
pub struct MappingError(Box<MappingErrorKind>);

impl fmt::Debug for MappingError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&*self.0, f)
	}
}

impl MappingError {
	pub(crate) fn new(kind: MappingErrorKind) -> Self {
		Self(Box::new(kind))
	}

	/// The specific kind of mapping failure, for callers that want to branch on it.
	pub fn kind(&self) -> &MappingErrorKind {
		&self.0
	}
}

/// The specific reason a mapping, compilation, or registration failed.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum MappingErrorKind {
	#[error("no value-serializer is registered for `{type_name}`")]
	UnsupportedType { type_name: &'static str },

	#[error("a value-serializer supporting `{type_name}` is already registered")]
	DuplicateSerializer { type_name: &'static str },

	#[error("`{type_name}` has already been assigned a specialization-type-id")]
	AlreadySpecialized { type_name: &'static str },

	#[error("`{type_name}` has no parameterless constructor and no activation strategy was selected")]
	NoDefaultConstructor { type_name: &'static str },

	#[error(
		"`{type_name}` has no constructor whose parameter names match the requested sequence {hints:?}"
	)]
	NoMatchingConstructor {
		type_name: &'static str,
		hints: Vec<&'static str>,
	},

	#[error("invalid mapping for `{type_name}`: {reason}")]
	InvalidMapping {
		type_name: &'static str,
		reason: &'static str,
	},

	#[error(
		"serialize and deserialize programs for `{type_name}` disagree on their value-serializer sequence ({serialize_len} vs {deserialize_len} slots)"
	)]
	ProgramMismatch {
		type_name: &'static str,
		serialize_len: usize,
		deserialize_len: usize,
	},
}

/// Any error raised while serializing, deserializing, or sizing a value.
///
/// These never mutate registry state and only ever abort the current call.
#[derive(thiserror::Error)]
#[error(transparent)]
pub struct CodecError(Box<CodecErrorKind>);

impl fmt::Debug for CodecError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&*self.0, f)
	}
}

impl CodecError {
	pub(crate) fn new(kind: CodecErrorKind) -> Self {
		Self(Box::new(kind))
	}

	pub fn kind(&self) -> &CodecErrorKind {
		&self.0
	}
}

/// The specific reason an encode/decode operation failed.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum CodecErrorKind {
	#[error("buffer too small: need at least {needed} bytes at offset {offset}, buffer has {available}")]
	BufferTooSmall {
		offset: usize,
		needed: usize,
		available: usize,
	},

	#[error("malformed buffer: {reason}")]
	MalformedBuffer { reason: &'static str },

	#[error("no record type with specialization-type-id {tag} is registered")]
	UnregisteredTag { tag: u16 },

	#[error("`{type_name}` is not registered with the struct serializer")]
	UnregisteredType { type_name: &'static str },
}

impl CodecError {
	pub(crate) fn buffer_too_small(offset: usize, needed: usize, available: usize) -> Self {
		Self::new(CodecErrorKind::BufferTooSmall {
			offset,
			needed,
			available,
		})
	}

	pub(crate) fn malformed(reason: &'static str) -> Self {
		Self::new(CodecErrorKind::MalformedBuffer { reason })
	}
}
