//! `HashMap<K, V>` as a map value-serializer: 2-byte unsigned entry count
//! followed by `<key><value>` pairs, per spec §6.

use std::{
	any::Any,
	collections::HashMap,
	hash::Hash,
	marker::PhantomData,
	sync::Arc,
};

use crate::{
	config::EngineConfig,
	error::CodecError,
	value_serializer::{take, take_mut, ValueSerializer},
};

pub struct MapCodec<K, V> {
	key: Arc<dyn ValueSerializer>,
	value: Arc<dyn ValueSerializer>,
	_marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> MapCodec<K, V> {
	pub fn new(key: Arc<dyn ValueSerializer>, value: Arc<dyn ValueSerializer>) -> Self {
		Self {
			key,
			value,
			_marker: PhantomData,
		}
	}
}

impl<K: Eq + Hash + 'static, V: 'static> ValueSerializer for MapCodec<K, V> {
	fn type_name(&self) -> &'static str {
		"HashMap<K, V>"
	}

	fn serialize(&self, value: &dyn Any, buf: &mut [u8], offset: &mut usize) -> Result<(), CodecError> {
		let value = value
			.downcast_ref::<HashMap<K, V>>()
			.ok_or_else(|| CodecError::malformed("value did not match the expected slot type"))?;
		let count =
			u16::try_from(value.len()).map_err(|_| CodecError::malformed("map too large for a u16 entry count"))?;
		take_mut(buf, *offset, 2)?.copy_from_slice(&count.to_ne_bytes());
		*offset += 2;
		for (key, entry_value) in value {
			self.key.serialize(key, buf, offset)?;
			self.value.serialize(entry_value, buf, offset)?;
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
		if count > config.max_map_len {
			return Err(CodecError::malformed("map length prefix exceeds configured maximum"));
		}
		*offset += 2;
		let mut out = HashMap::with_capacity(count as usize);
		for _ in 0..count {
			let boxed_key = self.key.deserialize(buf, offset, config)?;
			let key = *boxed_key
				.downcast::<K>()
				.map_err(|_| CodecError::malformed("key value-serializer returned the wrong type"))?;
			let boxed_value = self.value.deserialize(buf, offset, config)?;
			let entry_value = *boxed_value
				.downcast::<V>()
				.map_err(|_| CodecError::malformed("value value-serializer returned the wrong type"))?;
			out.insert(key, entry_value);
		}
		Ok(Box::new(out))
	}

	fn size_from_value(&self, value: &dyn Any) -> Result<u16, CodecError> {
		let value = value
			.downcast_ref::<HashMap<K, V>>()
			.ok_or_else(|| CodecError::malformed("value did not match the expected slot type"))?;
		let mut total: u32 = 2;
		for (key, entry_value) in value {
			total += self.key.size_from_value(key)? as u32;
			total += self.value.size_from_value(entry_value)? as u32;
		}
		u16::try_from(total).map_err(|_| CodecError::malformed("map too large for a u16 size"))
	}

	fn size_from_buffer(&self, buf: &[u8], offset: usize, config: &EngineConfig) -> Result<u16, CodecError> {
		let prefix = take(buf, offset, 2)?;
		let count = u16::from_ne_bytes([prefix[0], prefix[1]]);
		let mut cursor = offset + 2;
		for _ in 0..count {
			cursor += self.key.size_from_buffer(buf, cursor, config)? as usize;
			cursor += self.value.size_from_buffer(buf, cursor, config)? as usize;
		}
		u16::try_from(cursor - offset).map_err(|_| CodecError::malformed("map too large for a u16 size"))
	}
}
