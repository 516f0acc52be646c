//! `String` codec: 2-byte length prefix (byte length of the encoded payload,
//! native-endian like every other count prefix in this wire format) followed
//! by UTF-16-LE code units, per spec §6.

use std::any::Any;

use crate::{
	config::EngineConfig,
	error::CodecError,
	value_serializer::{take, take_mut, ValueSerializer},
};

/// `ValueSerializer` for `String`.
#[derive(Default, Debug)]
pub struct StringCodec;

impl ValueSerializer for StringCodec {
	fn type_name(&self) -> &'static str {
		"String"
	}

	fn serialize(&self, value: &dyn Any, buf: &mut [u8], offset: &mut usize) -> Result<(), CodecError> {
		let value = value
			.downcast_ref::<String>()
			.ok_or_else(|| CodecError::malformed("value did not match the expected slot type"))?;
		let units: Vec<u16> = value.encode_utf16().collect();
		let byte_len = units.len() * 2;
		let byte_len_u16 = u16::try_from(byte_len)
			.map_err(|_| CodecError::malformed("string too long for a u16 length prefix"))?;
		take_mut(buf, *offset, 2)?.copy_from_slice(&byte_len_u16.to_ne_bytes());
		*offset += 2;
		let payload = take_mut(buf, *offset, byte_len)?;
		for (chunk, unit) in payload.chunks_exact_mut(2).zip(units.iter()) {
			chunk.copy_from_slice(&unit.to_le_bytes());
		}
		*offset += byte_len;
		Ok(())
	}

	fn deserialize(
		&self,
		buf: &[u8],
		offset: &mut usize,
		config: &EngineConfig,
	) -> Result<Box<dyn Any>, CodecError> {
		let prefix = take(buf, *offset, 2)?;
		let byte_len = u16::from_ne_bytes([prefix[0], prefix[1]]);
		if byte_len > config.max_string_utf16_len.saturating_mul(2) {
			return Err(CodecError::malformed("string length prefix exceeds configured maximum"));
		}
		*offset += 2;
		let payload = take(buf, *offset, byte_len as usize)?;
		if byte_len % 2 != 0 {
			return Err(CodecError::malformed("string byte length is not a multiple of 2"));
		}
		let units: Vec<u16> = payload
			.chunks_exact(2)
			.map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
			.collect();
		let s = String::from_utf16(&units).map_err(|_| CodecError::malformed("invalid UTF-16 in string payload"))?;
		*offset += byte_len as usize;
		Ok(Box::new(s))
	}

	fn size_from_value(&self, value: &dyn Any) -> Result<u16, CodecError> {
		let value = value
			.downcast_ref::<String>()
			.ok_or_else(|| CodecError::malformed("value did not match the expected slot type"))?;
		let byte_len = value.encode_utf16().count() * 2;
		u16::try_from(byte_len + 2).map_err(|_| CodecError::malformed("string too long for a u16 size"))
	}

	fn size_from_buffer(&self, buf: &[u8], offset: usize, _config: &EngineConfig) -> Result<u16, CodecError> {
		let prefix = take(buf, offset, 2)?;
		let byte_len = u16::from_ne_bytes([prefix[0], prefix[1]]);
		byte_len
			.checked_add(2)
			.ok_or_else(|| CodecError::malformed("string size overflows u16"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hi_round_trip_matches_spec_scenario() {
		let codec = StringCodec;
		let mut buf = [0u8; 6];
		let mut offset = 0;
		codec.serialize(&"Hi".to_owned(), &mut buf, &mut offset).unwrap();
		assert_eq!(buf, [4, 0, 72, 0, 105, 0]);
		assert_eq!(offset, 6);

		let size = codec.size_from_value(&"Hi".to_owned()).unwrap();
		assert_eq!(size, 6);

		let mut offset = 0;
		let decoded = codec
			.deserialize(&buf, &mut offset, &EngineConfig::default())
			.unwrap();
		assert_eq!(*decoded.downcast::<String>().unwrap(), "Hi");
	}
}
