//! The compiled, per-type artifact (§3) that [`crate::interpreter`] turns
//! into the three callable routines.

use std::any::TypeId;

use crate::compiler::{ActivationOp, SlotOp};

/// Layout of the null-mask prologue and value sequence for one record type.
pub struct ObjectSerializationValueRanges {
	/// How many of the type's values are `Option<_>` and therefore occupy a
	/// bit in the null mask.
	pub nullable_values_count: usize,
	/// Total number of values (nullable and non-nullable) carried on the
	/// wire for one instance of this record.
	pub serialization_values_count: usize,
}

impl ObjectSerializationValueRanges {
	/// Number of bytes the null-mask prologue occupies on the wire.
	pub fn null_mask_byte_len(&self) -> usize {
		crate::bitfield::BitField::byte_len_for_bits(self.nullable_values_count)
	}
}

/// The compiled serialize/deserialize/size program for one record type,
/// produced by [`crate::compiler::compile`] and consumed by
/// [`crate::interpreter`].
pub struct ObjectSerializerProgram {
	pub type_id: TypeId,
	pub type_name: &'static str,
	pub value_ranges: ObjectSerializationValueRanges,
	/// Every value, in wire order, with a getter — used to both serialize
	/// and size from an existing instance.
	pub serialize_ops: Vec<SlotOp>,
	pub activation: ActivationOp,
	/// The values the activator does not already consume, in wire order,
	/// each with a setter — applied to the freshly-activated instance.
	pub post_construction_ops: Vec<SlotOp>,
}
