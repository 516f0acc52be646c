//! `Vec<u8>` fast path: encoded exactly as the generic array-of-`u8` would
//! be (2-byte count, bytes back to back), but without the per-element
//! indirection through a byte-at-a-time `ValueSerializer` call.

use std::any::Any;

use crate::{
	config::EngineConfig,
	error::CodecError,
	value_serializer::{take, take_mut, ValueSerializer},
};

/// `ValueSerializer` for `Vec<u8>`.
#[derive(Default, Debug)]
pub struct ByteArrayCodec;

impl ValueSerializer for ByteArrayCodec {
	fn type_name(&self) -> &'static str {
		"Vec<u8>"
	}

	fn serialize(&self, value: &dyn Any, buf: &mut [u8], offset: &mut usize) -> Result<(), CodecError> {
		let value = value
			.downcast_ref::<Vec<u8>>()
			.ok_or_else(|| CodecError::malformed("value did not match the expected slot type"))?;
		let count =
			u16::try_from(value.len()).map_err(|_| CodecError::malformed("byte array too long for a u16 count"))?;
		take_mut(buf, *offset, 2)?.copy_from_slice(&count.to_ne_bytes());
		*offset += 2;
		take_mut(buf, *offset, value.len())?.copy_from_slice(value);
		*offset += value.len();
		Ok(())
	}

	fn deserialize(
		&self,
		buf: &[u8],
		offset: &mut usize,
		config: &EngineConfig,
	) -> Result<Box<dyn Any>, CodecError> {
		let prefix = take(buf, *offset, 2)?;
		let count = u16::from_ne_bytes([prefix[0], prefix[1]]);
		if count > config.max_array_len {
			return Err(CodecError::malformed("byte array length prefix exceeds configured maximum"));
		}
		*offset += 2;
		let payload = take(buf, *offset, count as usize)?.to_vec();
		*offset += count as usize;
		Ok(Box::new(payload))
	}

	fn size_from_value(&self, value: &dyn Any) -> Result<u16, CodecError> {
		let value = value
			.downcast_ref::<Vec<u8>>()
			.ok_or_else(|| CodecError::malformed("value did not match the expected slot type"))?;
		u16::try_from(value.len() + 2).map_err(|_| CodecError::malformed("byte array too long for a u16 size"))
	}

	fn size_from_buffer(&self, buf: &[u8], offset: usize, _config: &EngineConfig) -> Result<u16, CodecError> {
		let prefix = take(buf, offset, 2)?;
		let count = u16::from_ne_bytes([prefix[0], prefix[1]]);
		count
			.checked_add(2)
			.ok_or_else(|| CodecError::malformed("byte array size overflows u16"))
	}
}
