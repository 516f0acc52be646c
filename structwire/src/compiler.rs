//! Lowers a built [`ObjectSerializationMapping`] into an
//! [`ObjectSerializerProgram`] (§4.3): a flat op sequence the interpreter can
//! run without any further reflection.

use std::{any::Any, any::TypeId, sync::Arc};

use crate::{
	error::{MappingError, MappingErrorKind},
	mapping::{ObjectActivator, ObjectSerializationMapping, SerializationValue},
	program::{ObjectSerializationValueRanges, ObjectSerializerProgram},
	value_serializer::ValueSerializer,
};

/// One value's read/write access and resolved codec, shared by the
/// serialize and deserialize op lists.
pub struct SlotOp {
	pub get: fn(&dyn Any) -> &dyn Any,
	pub set: Option<fn(&mut dyn Any, Box<dyn Any>)>,
	pub is_null_assignable: bool,
	pub serializer: Arc<dyn ValueSerializer>,
	pub value_type: TypeId,
	pub null_is_present: Option<fn(&dyn Any) -> bool>,
	pub null_inner: Option<fn(&dyn Any) -> &dyn Any>,
	pub null_wrap: Option<fn(Option<Box<dyn Any>>) -> Box<dyn Any>>,
}

impl SlotOp {
	fn from_value(value: &SerializationValue) -> Self {
		Self {
			get: value.get,
			set: value.set,
			is_null_assignable: value.is_null_assignable,
			serializer: Arc::clone(&value.serializer),
			value_type: value.value_type,
			null_is_present: value.null_is_present,
			null_inner: value.null_inner,
			null_wrap: value.null_wrap,
		}
	}
}

/// How a deserialize program brings the record into existence, lowered from
/// [`ObjectActivator`].
pub enum ActivationOp {
	Default {
		construct: fn() -> Box<dyn Any>,
	},
	Parametrized {
		invoke: fn(Vec<Box<dyn Any>>) -> Box<dyn Any>,
		/// The activator's own input slots, in constructor-parameter order —
		/// deserialized first and fed to `invoke`.
		inputs: Vec<SlotOp>,
	},
	Indirect {
		factory: Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>,
	},
}

/// Lower a mapping into a program, checking that the serialize and
/// deserialize op lists agree on their value-serializer type sequence.
pub fn compile(mapping: ObjectSerializationMapping) -> Result<ObjectSerializerProgram, MappingError> {
	let ObjectSerializationMapping {
		type_id,
		type_name,
		values,
		activator_input_count,
		activator,
	} = mapping;

	let nullable_values_count = values.iter().filter(|v| v.is_null_assignable).count();
	let serialization_values_count = values.len();

	let serialize_ops: Vec<SlotOp> = values.iter().map(SlotOp::from_value).collect();

	let (activation_inputs, post_construction): (Vec<_>, Vec<_>) = {
		let mut iter = values.iter();
		let inputs: Vec<&SerializationValue> = (&mut iter).take(activator_input_count).collect();
		let rest: Vec<&SerializationValue> = iter.collect();
		(inputs, rest)
	};

	let activation = match activator {
		ObjectActivator::Default { construct } => ActivationOp::Default { construct },
		ObjectActivator::Parametrized { invoke } => ActivationOp::Parametrized {
			invoke,
			inputs: activation_inputs.iter().map(|v| SlotOp::from_value(v)).collect(),
		},
		ObjectActivator::Indirect { factory } => ActivationOp::Indirect { factory },
	};
	let post_construction_ops: Vec<SlotOp> = post_construction.into_iter().map(SlotOp::from_value).collect();

	check_value_serializer_type_sequence(type_name, &serialize_ops, &activation, &post_construction_ops)?;

	Ok(ObjectSerializerProgram {
		type_id,
		type_name,
		value_ranges: ObjectSerializationValueRanges {
			nullable_values_count,
			serialization_values_count,
		},
		serialize_ops,
		activation,
		post_construction_ops,
	})
}

/// The serialize program visits every value in wire order; the deserialize
/// program visits the same values via the activator's inputs followed by
/// `post_construction_ops`. Both must name the same types in the same order,
/// or the null mask and byte offsets one program expects would not match
/// what the other produces.
fn check_value_serializer_type_sequence(
	type_name: &'static str,
	serialize_ops: &[SlotOp],
	activation: &ActivationOp,
	post_construction_ops: &[SlotOp],
) -> Result<(), MappingError> {
	let serialize_sequence: Vec<TypeId> = serialize_ops.iter().map(|op| op.value_type).collect();

	let mut deserialize_sequence: Vec<TypeId> = Vec::with_capacity(serialize_sequence.len());
	if let ActivationOp::Parametrized { inputs, .. } = activation {
		deserialize_sequence.extend(inputs.iter().map(|op| op.value_type));
	}
	deserialize_sequence.extend(post_construction_ops.iter().map(|op| op.value_type));

	if serialize_sequence != deserialize_sequence {
		return Err(MappingError::new(MappingErrorKind::ProgramMismatch {
			type_name,
			serialize_len: serialize_sequence.len(),
			deserialize_len: deserialize_sequence.len(),
		}));
	}
	Ok(())
}
