//! `Option<T>` as a composable value-serializer.
//!
//! When `Option<T>` is a direct record slot, the interpreter never calls into
//! this codec: absence is conveyed by the enclosing record's null-mask, per
//! spec §6, and the interpreter reads/writes the inner `T` directly. This
//! codec exists for the case the distilled spec's wire format section leaves
//! implicit — `Option<T>` nested inside an array element or map value, where
//! there is no enclosing null-mask bit available. There, presence is carried
//! by one inline byte ahead of the (optional) payload; this is a documented
//! supplement, not part of the direct-record-slot wire shape.

use std::{any::Any, marker::PhantomData, sync::Arc};

use crate::{
	config::EngineConfig,
	error::CodecError,
	value_serializer::{take, take_mut, ValueSerializer},
};

pub struct NullableCodec<T> {
	inner: Arc<dyn ValueSerializer>,
	_marker: PhantomData<fn() -> T>,
}

impl<T> NullableCodec<T> {
	pub fn new(inner: Arc<dyn ValueSerializer>) -> Self {
		Self {
			inner,
			_marker: PhantomData,
		}
	}
}

impl<T: 'static> ValueSerializer for NullableCodec<T> {
	fn type_name(&self) -> &'static str {
		"Option<T>"
	}

	fn serialize(&self, value: &dyn Any, buf: &mut [u8], offset: &mut usize) -> Result<(), CodecError> {
		let value = value
			.downcast_ref::<Option<T>>()
			.ok_or_else(|| CodecError::malformed("value did not match the expected slot type"))?;
		match value {
			None => {
				take_mut(buf, *offset, 1)?[0] = 0;
				*offset += 1;
			}
			Some(inner) => {
				take_mut(buf, *offset, 1)?[0] = 1;
				*offset += 1;
				self.inner.serialize(inner, buf, offset)?;
			}
		}
		Ok(())
	}

	fn deserialize(
		&self,
		buf: &[u8],
		offset: &mut usize,
		config: &EngineConfig,
	) -> Result<Box<dyn Any>, CodecError> {
		let present = take(buf, *offset, 1)?[0];
		*offset += 1;
		let value: Option<T> = match present {
			0 => None,
			_ => {
				let boxed = self.inner.deserialize(buf, offset, config)?;
				let typed = *boxed
					.downcast::<T>()
					.map_err(|_| CodecError::malformed("inner value-serializer returned the wrong type"))?;
				Some(typed)
			}
		};
		Ok(Box::new(value))
	}

	fn size_from_value(&self, value: &dyn Any) -> Result<u16, CodecError> {
		let value = value
			.downcast_ref::<Option<T>>()
			.ok_or_else(|| CodecError::malformed("value did not match the expected slot type"))?;
		match value {
			None => Ok(1),
			Some(inner) => Ok(1 + self.inner.size_from_value(inner)?),
		}
	}

	fn size_from_buffer(&self, buf: &[u8], offset: usize, config: &EngineConfig) -> Result<u16, CodecError> {
		let present = take(buf, offset, 1)?[0];
		if present == 0 {
			return Ok(1);
		}
		Ok(1 + self.inner.size_from_buffer(buf, offset + 1, config)?)
	}
}
