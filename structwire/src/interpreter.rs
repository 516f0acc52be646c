//! Runs a compiled [`ObjectSerializerProgram`] against a buffer (§4.5):
//! the null-mask prologue, then the wire-ordered value sequence, with one
//! virtual call into each slot's [`crate::value_serializer::ValueSerializer`].
//!
//! This module is deliberately the "interpreter" end of the spec's
//! interpreter/codegen spectrum rather than a generated-and-compiled routine
//! per type: each op dispatches through a function pointer or trait object
//! chosen once at mapping time, so there is exactly one indirect call per
//! slot on the hot path and nothing left to resolve at this layer.

use std::any::Any;

use crate::{
	bitfield::BitField,
	compiler::{ActivationOp, SlotOp},
	config::EngineConfig,
	error::CodecError,
	program::ObjectSerializerProgram,
	value_serializer::{take, take_mut},
};

/// Write one instance of `program`'s record type to `buf` starting at
/// `*offset`, advancing `*offset` past the bytes written.
pub fn serialize(program: &ObjectSerializerProgram, instance: &dyn Any, buf: &mut [u8], offset: &mut usize) -> Result<(), CodecError> {
	let mask = build_null_mask(program, instance);
	take_mut(buf, *offset, mask.byte_len())?.copy_from_slice(mask.as_bytes());
	*offset += mask.byte_len();

	for op in &program.serialize_ops {
		let raw = (op.get)(instance);
		if op.is_null_assignable {
			if !present(op, raw) {
				continue;
			}
			let inner = (op.null_inner.expect("null-assignable slot carries null_inner"))(raw);
			op.serializer.serialize(inner, buf, offset)?;
		} else {
			op.serializer.serialize(raw, buf, offset)?;
		}
	}
	Ok(())
}

/// Number of bytes `serialize` would write for `instance`.
pub fn size_from_value(program: &ObjectSerializerProgram, instance: &dyn Any) -> Result<u16, CodecError> {
	let mask = build_null_mask(program, instance);
	let mut total: u32 = mask.byte_len() as u32;
	for op in &program.serialize_ops {
		let raw = (op.get)(instance);
		if op.is_null_assignable {
			if !present(op, raw) {
				continue;
			}
			let inner = (op.null_inner.expect("null-assignable slot carries null_inner"))(raw);
			total += op.serializer.size_from_value(inner)? as u32;
		} else {
			total += op.serializer.size_from_value(raw)? as u32;
		}
	}
	u16::try_from(total).map_err(|_| CodecError::malformed("record size overflows u16"))
}

/// Number of bytes `deserialize` would consume starting at `offset`, without
/// materializing an instance.
pub fn size_from_buffer(program: &ObjectSerializerProgram, buf: &[u8], offset: usize, config: &EngineConfig) -> Result<u16, CodecError> {
	let mask_len = program.value_ranges.null_mask_byte_len();
	let mask = BitField::from_bytes(take(buf, offset, mask_len)?.to_vec());
	let mut total: u32 = mask_len as u32;
	let mut cursor = offset + mask_len;
	let mut nullable_index = 0usize;
	for op in &program.serialize_ops {
		if op.is_null_assignable {
			let idx = nullable_index;
			nullable_index += 1;
			if mask.get_bit(idx) {
				continue;
			}
		}
		let size = op.serializer.size_from_buffer(buf, cursor, config)? as u32;
		total += size;
		cursor += size as usize;
	}
	u16::try_from(total).map_err(|_| CodecError::malformed("record size overflows u16"))
}

/// Read one instance of `program`'s record type from `buf` starting at
/// `*offset`, advancing `*offset` past the bytes consumed.
pub fn deserialize(
	program: &ObjectSerializerProgram,
	buf: &[u8],
	offset: &mut usize,
	config: &EngineConfig,
) -> Result<Box<dyn Any>, CodecError> {
	let mask_len = program.value_ranges.null_mask_byte_len();
	let mask = BitField::from_bytes(take(buf, *offset, mask_len)?.to_vec());
	*offset += mask_len;

	let mut nullable_index = 0usize;
	let mut instance = match &program.activation {
		ActivationOp::Default { construct } => construct(),
		ActivationOp::Parametrized { invoke, inputs } => {
			let mut args = Vec::with_capacity(inputs.len());
			for op in inputs {
				args.push(decode_slot(op, &mask, &mut nullable_index, buf, offset, config)?);
			}
			invoke(args)
		}
		ActivationOp::Indirect { factory } => factory(),
	};

	for op in &program.post_construction_ops {
		let value = decode_slot(op, &mask, &mut nullable_index, buf, offset, config)?;
		(op.set.expect("post-construction slot always has a setter"))(instance.as_mut(), value);
	}

	Ok(instance)
}

/// Read one instance of `program`'s record type from `buf` into an
/// already-constructed `target`, skipping activation entirely — for callers
/// reusing a pooled instance rather than allocating a fresh one.
///
/// Fails if any of the record's slots has no setter (only reachable through
/// a constructor), since there is then no way to write into an existing
/// instance.
pub fn deserialize_into(
	program: &ObjectSerializerProgram,
	target: &mut dyn Any,
	buf: &[u8],
	offset: &mut usize,
	config: &EngineConfig,
) -> Result<(), CodecError> {
	if program.serialize_ops.iter().any(|op| op.set.is_none()) {
		return Err(CodecError::malformed(
			"a slot on this record has no setter; it cannot be deserialized into an existing instance",
		));
	}

	let mask_len = program.value_ranges.null_mask_byte_len();
	let mask = BitField::from_bytes(take(buf, *offset, mask_len)?.to_vec());
	*offset += mask_len;

	let mut nullable_index = 0usize;
	for op in &program.serialize_ops {
		let value = decode_slot(op, &mask, &mut nullable_index, buf, offset, config)?;
		(op.set.expect("checked above"))(target, value);
	}
	Ok(())
}

fn present(op: &SlotOp, raw: &dyn Any) -> bool {
	(op.null_is_present.expect("null-assignable slot carries null_is_present"))(raw)
}

fn build_null_mask(program: &ObjectSerializerProgram, instance: &dyn Any) -> BitField {
	let mut mask = BitField::with_bit_count(program.value_ranges.nullable_values_count);
	let mut nullable_index = 0usize;
	for op in &program.serialize_ops {
		if !op.is_null_assignable {
			continue;
		}
		let raw = (op.get)(instance);
		let absent = !present(op, raw);
		mask.set_bit(nullable_index, absent);
		nullable_index += 1;
	}
	mask
}

fn decode_slot(
	op: &SlotOp,
	mask: &BitField,
	nullable_index: &mut usize,
	buf: &[u8],
	offset: &mut usize,
	config: &EngineConfig,
) -> Result<Box<dyn Any>, CodecError> {
	if op.is_null_assignable {
		let idx = *nullable_index;
		*nullable_index += 1;
		let wrap = op.null_wrap.expect("null-assignable slot carries null_wrap");
		if mask.get_bit(idx) {
			return Ok(wrap(None));
		}
		let inner = op.serializer.deserialize(buf, offset, config)?;
		Ok(wrap(Some(inner)))
	} else {
		op.serializer.deserialize(buf, offset, config)
	}
}
