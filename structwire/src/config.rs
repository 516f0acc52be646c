//! Process-wide guard rails applied during deserialization.
//!
//! Modeled on the teacher's `DeserializerConfig`/`SerializerConfig`
//! (`de/mod.rs`, `ser/mod.rs`): a small, cheaply-cloned struct that bounds how
//! much a single length prefix is allowed to make the engine allocate, so a
//! corrupt or hostile buffer cannot be used to drive unbounded memory use
//! before `MalformedBuffer` is raised.

/// Guard rails consulted while reading length-prefixed values (arrays, maps,
/// strings) out of a buffer.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
	/// Maximum number of elements accepted from an array's length prefix.
	pub max_array_len: u16,
	/// Maximum number of entries accepted from a map's length prefix.
	pub max_map_len: u16,
	/// Maximum number of UTF-16 code units accepted from a string's length prefix.
	pub max_string_utf16_len: u16,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			max_array_len: u16::MAX,
			max_map_len: u16::MAX,
			max_string_utf16_len: u16::MAX,
		}
	}
}

impl EngineConfig {
	/// A config with no guard rails beyond the wire format's own `u16` limits.
	pub fn permissive() -> Self {
		Self::default()
	}
}
