//! `Vec<T>` as an array value-serializer: 2-byte unsigned element count
//! followed by elements back-to-back, per spec §6.

use std::{any::Any, marker::PhantomData, sync::Arc};

use crate::{
	config::EngineConfig,
	error::CodecError,
	value_serializer::{take, take_mut, ValueSerializer},
};

pub struct ArrayCodec<T> {
	element: Arc<dyn ValueSerializer>,
	_marker: PhantomData<fn() -> T>,
}

impl<T> ArrayCodec<T> {
	pub fn new(element: Arc<dyn ValueSerializer>) -> Self {
		Self {
			element,
			_marker: PhantomData,
		}
	}
}

impl<T: 'static> ValueSerializer for ArrayCodec<T> {
	fn type_name(&self) -> &'static str {
		"Vec<T>"
	}

	fn serialize(&self, value: &dyn Any, buf: &mut [u8], offset: &mut usize) -> Result<(), CodecError> {
		let value = value
			.downcast_ref::<Vec<T>>()
			.ok_or_else(|| CodecError::malformed("value did not match the expected slot type"))?;
		let count = u16::try_from(value.len())
			.map_err(|_| CodecError::malformed("array too long for a u16 element count"))?;
		take_mut(buf, *offset, 2)?.copy_from_slice(&count.to_ne_bytes());
		*offset += 2;
		for element in value {
			self.element.serialize(element, buf, offset)?;
		}
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
			return Err(CodecError::malformed("array length prefix exceeds configured maximum"));
		}
		*offset += 2;
		let mut out = Vec::with_capacity(count as usize);
		for _ in 0..count {
			let boxed = self.element.deserialize(buf, offset, config)?;
			let typed = *boxed
				.downcast::<T>()
				.map_err(|_| CodecError::malformed("element value-serializer returned the wrong type"))?;
			out.push(typed);
		}
		Ok(Box::new(out))
	}

	fn size_from_value(&self, value: &dyn Any) -> Result<u16, CodecError> {
		let value = value
			.downcast_ref::<Vec<T>>()
			.ok_or_else(|| CodecError::malformed("value did not match the expected slot type"))?;
		let mut total: u32 = 2;
		for element in value {
			total += self.element.size_from_value(element)? as u32;
		}
		u16::try_from(total).map_err(|_| CodecError::malformed("array too large for a u16 size"))
	}

	fn size_from_buffer(&self, buf: &[u8], offset: usize, config: &EngineConfig) -> Result<u16, CodecError> {
		let prefix = take(buf, offset, 2)?;
		let count = u16::from_ne_bytes([prefix[0], prefix[1]]);
		let mut cursor = offset + 2;
		for _ in 0..count {
			cursor += self.element.size_from_buffer(buf, cursor, config)? as usize;
		}
		u16::try_from(cursor - offset).map_err(|_| CodecError::malformed("array too large for a u16 size"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::builtin::integers::I32Codec;

	#[test]
	fn three_elements_matches_spec_scenario() {
		let codec = ArrayCodec::<i32>::new(Arc::new(I32Codec));
		let mut buf = [0u8; 14];
		let mut offset = 0;
		codec.serialize(&vec![1i32, 2, 3], &mut buf, &mut offset).unwrap();
		assert_eq!(offset, 14);
		assert_eq!(&buf[0..2], &[3, 0]);
		assert_eq!(&buf[2..6], &[1, 0, 0, 0]);
		assert_eq!(&buf[6..10], &[2, 0, 0, 0]);
		assert_eq!(&buf[10..14], &[3, 0, 0, 0]);
	}
}
