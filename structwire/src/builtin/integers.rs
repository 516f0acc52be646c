//! Fixed-width native-endian codecs for integers, floats, and `bool`.
//!
//! One small marker type per primitive, mirroring the teacher's one-module-
//! per-value-category shape (`de/deserializer/types/boolean.rs`,
//! `.../decimal.rs`) but collapsed into a single macro since every numeric
//! primitive here shares the exact same `to_ne_bytes`/`from_ne_bytes` shape.

use std::any::Any;

use crate::{config::EngineConfig, error::CodecError, value_serializer::ValueSerializer};

macro_rules! fixed_width_codec {
	($codec:ident, $ty:ty, $size:expr) => {
		#[doc = concat!("`ValueSerializer` for `", stringify!($ty), "`.")]
		#[derive(Default, Debug)]
		pub struct $codec;

		impl ValueSerializer for $codec {
			fn type_name(&self) -> &'static str {
				stringify!($ty)
			}

			fn serialize(&self, value: &dyn Any, buf: &mut [u8], offset: &mut usize) -> Result<(), CodecError> {
				let value = downcast::<$ty>(value)?;
				let bytes = value.to_ne_bytes();
				crate::value_serializer::take_mut(buf, *offset, $size)?.copy_from_slice(&bytes);
				*offset += $size;
				Ok(())
			}

			fn deserialize(
				&self,
				buf: &[u8],
				offset: &mut usize,
				_config: &EngineConfig,
			) -> Result<Box<dyn Any>, CodecError> {
				let slice = crate::value_serializer::take(buf, *offset, $size)?;
				let mut bytes = [0u8; $size];
				bytes.copy_from_slice(slice);
				*offset += $size;
				Ok(Box::new(<$ty>::from_ne_bytes(bytes)))
			}

			fn size_from_value(&self, _value: &dyn Any) -> Result<u16, CodecError> {
				Ok($size)
			}

			fn size_from_buffer(&self, buf: &[u8], offset: usize, _config: &EngineConfig) -> Result<u16, CodecError> {
				if offset + $size > buf.len() {
					return Err(CodecError::buffer_too_small(offset, $size, buf.len().saturating_sub(offset)));
				}
				Ok($size)
			}
		}
	};
}

fn downcast<T: 'static>(value: &dyn Any) -> Result<&T, CodecError> {
	value
		.downcast_ref::<T>()
		.ok_or_else(|| CodecError::malformed("value did not match the expected slot type"))
}

fixed_width_codec!(I8Codec, i8, 1);
fixed_width_codec!(I16Codec, i16, 2);
fixed_width_codec!(I32Codec, i32, 4);
fixed_width_codec!(I64Codec, i64, 8);
fixed_width_codec!(I128Codec, i128, 16);
fixed_width_codec!(U8Codec, u8, 1);
fixed_width_codec!(U16Codec, u16, 2);
fixed_width_codec!(U32Codec, u32, 4);
fixed_width_codec!(U64Codec, u64, 8);
fixed_width_codec!(U128Codec, u128, 16);
fixed_width_codec!(F32Codec, f32, 4);
fixed_width_codec!(F64Codec, f64, 8);

/// `ValueSerializer` for `bool`: one byte, `0` or `1`.
#[derive(Default, Debug)]
pub struct BoolCodec;

impl ValueSerializer for BoolCodec {
	fn type_name(&self) -> &'static str {
		"bool"
	}

	fn serialize(&self, value: &dyn Any, buf: &mut [u8], offset: &mut usize) -> Result<(), CodecError> {
		let value = *downcast::<bool>(value)?;
		crate::value_serializer::take_mut(buf, *offset, 1)?[0] = value as u8;
		*offset += 1;
		Ok(())
	}

	fn deserialize(
		&self,
		buf: &[u8],
		offset: &mut usize,
		_config: &EngineConfig,
	) -> Result<Box<dyn Any>, CodecError> {
		let byte = crate::value_serializer::take(buf, *offset, 1)?[0];
		*offset += 1;
		Ok(Box::new(byte != 0))
	}

	fn size_from_value(&self, _value: &dyn Any) -> Result<u16, CodecError> {
		Ok(1)
	}

	fn size_from_buffer(&self, buf: &[u8], offset: usize, _config: &EngineConfig) -> Result<u16, CodecError> {
		if offset >= buf.len() {
			return Err(CodecError::buffer_too_small(offset, 1, 0));
		}
		Ok(1)
	}
}

/// `ValueSerializer` for `char`: fixed 2 bytes, the UTF-16 code unit (per the
/// wire format's "`Char`: fixed 2 bytes"). Characters outside the BMP cannot
/// be represented and are rejected at serialize time.
#[derive(Default, Debug)]
pub struct CharCodec;

impl ValueSerializer for CharCodec {
	fn type_name(&self) -> &'static str {
		"char"
	}

	fn serialize(&self, value: &dyn Any, buf: &mut [u8], offset: &mut usize) -> Result<(), CodecError> {
		let value = *downcast::<char>(value)?;
		let mut units = [0u16; 2];
		let encoded = value.encode_utf16(&mut units);
		if encoded.len() != 1 {
			return Err(CodecError::malformed("char does not fit in a single UTF-16 code unit"));
		}
		crate::value_serializer::take_mut(buf, *offset, 2)?.copy_from_slice(&encoded[0].to_ne_bytes());
		*offset += 2;
		Ok(())
	}

	fn deserialize(
		&self,
		buf: &[u8],
		offset: &mut usize,
		_config: &EngineConfig,
	) -> Result<Box<dyn Any>, CodecError> {
		let slice = crate::value_serializer::take(buf, *offset, 2)?;
		let unit = u16::from_ne_bytes([slice[0], slice[1]]);
		*offset += 2;
		let c = char::decode_utf16([unit])
			.next()
			.unwrap()
			.map_err(|_| CodecError::malformed("invalid UTF-16 code unit for char"))?;
		Ok(Box::new(c))
	}

	fn size_from_value(&self, _value: &dyn Any) -> Result<u16, CodecError> {
		Ok(2)
	}

	fn size_from_buffer(&self, buf: &[u8], offset: usize, _config: &EngineConfig) -> Result<u16, CodecError> {
		if offset + 2 > buf.len() {
			return Err(CodecError::buffer_too_small(offset, 2, buf.len().saturating_sub(offset)));
		}
		Ok(2)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn i32_round_trip() {
		let codec = I32Codec;
		let mut buf = [0u8; 4];
		let mut offset = 0;
		codec.serialize(&7i32, &mut buf, &mut offset).unwrap();
		assert_eq!(offset, 4);
		assert_eq!(buf, [7, 0, 0, 0]);
		let mut offset = 0;
		let value = codec.deserialize(&buf, &mut offset, &EngineConfig::default()).unwrap();
		assert_eq!(*value.downcast::<i32>().unwrap(), 7);
	}

	#[test]
	fn bool_round_trip() {
		let codec = BoolCodec;
		let mut buf = [0u8; 1];
		let mut offset = 0;
		codec.serialize(&true, &mut buf, &mut offset).unwrap();
		assert_eq!(buf, [1]);
		let mut offset = 0;
		let value = codec.deserialize(&buf, &mut offset, &EngineConfig::default()).unwrap();
		assert!(*value.downcast::<bool>().unwrap());
	}
}
