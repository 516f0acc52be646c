//! `Duration` codec: encoded as `i64` ticks (100ns units), matching the wire
//! format's "timespan as ticks" primitive without pulling in a calendar crate
//! the engine otherwise has no use for (see SPEC_FULL.md §6).

use std::{any::Any, time::Duration};

use crate::{
	config::EngineConfig,
	error::CodecError,
	value_serializer::{take, take_mut, ValueSerializer},
};

const TICKS_PER_SECOND: i128 = 10_000_000;

/// `ValueSerializer` for `std::time::Duration`, encoded as 100ns ticks.
#[derive(Default, Debug)]
pub struct DurationTicksCodec;

impl ValueSerializer for DurationTicksCodec {
	fn type_name(&self) -> &'static str {
		"std::time::Duration"
	}

	fn serialize(&self, value: &dyn Any, buf: &mut [u8], offset: &mut usize) -> Result<(), CodecError> {
		let value = value
			.downcast_ref::<Duration>()
			.ok_or_else(|| CodecError::malformed("value did not match the expected slot type"))?;
		let ticks = duration_to_ticks(*value)?;
		take_mut(buf, *offset, 8)?.copy_from_slice(&ticks.to_ne_bytes());
		*offset += 8;
		Ok(())
	}

	fn deserialize(
		&self,
		buf: &[u8],
		offset: &mut usize,
		_config: &EngineConfig,
	) -> Result<Box<dyn Any>, CodecError> {
		let slice = take(buf, *offset, 8)?;
		let mut bytes = [0u8; 8];
		bytes.copy_from_slice(slice);
		*offset += 8;
		Ok(Box::new(ticks_to_duration(i64::from_ne_bytes(bytes))))
	}

	fn size_from_value(&self, _value: &dyn Any) -> Result<u16, CodecError> {
		Ok(8)
	}

	fn size_from_buffer(&self, buf: &[u8], offset: usize, _config: &EngineConfig) -> Result<u16, CodecError> {
		if offset + 8 > buf.len() {
			return Err(CodecError::buffer_too_small(offset, 8, buf.len().saturating_sub(offset)));
		}
		Ok(8)
	}
}

fn duration_to_ticks(d: Duration) -> Result<i64, CodecError> {
	let ticks = (d.as_secs() as i128) * TICKS_PER_SECOND + (d.subsec_nanos() as i128) / 100;
	i64::try_from(ticks).map_err(|_| CodecError::malformed("duration too large to represent as ticks"))
}

fn ticks_to_duration(ticks: i64) -> Duration {
	let ticks = ticks.max(0) as u64;
	Duration::from_nanos(ticks * 100)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn one_second_is_ten_million_ticks() {
		let codec = DurationTicksCodec;
		let mut buf = [0u8; 8];
		let mut offset = 0;
		codec
			.serialize(&Duration::from_secs(1), &mut buf, &mut offset)
			.unwrap();
		assert_eq!(i64::from_ne_bytes(buf), 10_000_000);
	}
}
