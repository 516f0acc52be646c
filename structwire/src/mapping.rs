//! Builder surface (§4.2): turns a [`Reflected`] type's static metadata into a
//! type-erased [`ObjectSerializationMapping`], resolving activation strategy
//! and slot ordering and running the distilled spec's validation algorithm.
//!
//! Grounded on the teacher's `SchemaBuilder` (`serde_avro_derive/src/lib.rs`):
//! a fluent, per-type builder that is consumed once by `.build()` into an
//! immutable artifact, with every failure mode surfaced as one
//! `MappingError` rather than a panic.

use std::{any::Any, any::TypeId, marker::PhantomData, sync::Arc};

use crate::{
	error::{MappingError, MappingErrorKind},
	reflect::{ConstructorDescriptor, Reflected, SlotDescriptor, SlotKind},
	value_serializer::ValueSerializer,
};

/// One resolved slot in a built mapping: a [`SlotDescriptor`] paired with the
/// value-serializer the analyzer resolved for it.
pub struct SerializationValue {
	pub name: &'static str,
	pub kind: SlotKind,
	pub value_type: TypeId,
	pub value_type_name: &'static str,
	pub is_null_assignable: bool,
	pub get: fn(&dyn Any) -> &dyn Any,
	pub set: Option<fn(&mut dyn Any, Box<dyn Any>)>,
	pub serializer: Arc<dyn ValueSerializer>,
	pub null_is_present: Option<fn(&dyn Any) -> bool>,
	pub null_inner: Option<fn(&dyn Any) -> &dyn Any>,
	pub null_wrap: Option<fn(Option<Box<dyn Any>>) -> Box<dyn Any>>,
}

/// How a record is brought into existence during deserialization.
///
/// The distilled spec's "StructZero" activator variant is not modeled
/// separately here: a parameterless, slot-free construction is just the
/// `Default` case with an empty post-construction slot list (see
/// DESIGN.md's Open Questions).
pub enum ObjectActivator {
	/// Calls a parameterless constructor, then writes every slot.
	Default { construct: fn() -> Box<dyn Any> },
	/// Calls a constructor with the listed parameter slots' deserialized
	/// values, in order, then writes any remaining slots.
	Parametrized {
		invoke: fn(Vec<Box<dyn Any>>) -> Box<dyn Any>,
	},
	/// Calls a user-supplied factory closure that returns a fully-formed
	/// instance, then writes any remaining slots (usually none).
	Indirect {
		factory: Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>,
	},
}

/// The immutable, type-erased result of building a [`MapperBuilder`]: enough
/// to compile a serialize/deserialize/size program for one record type.
pub struct ObjectSerializationMapping {
	pub type_id: TypeId,
	pub type_name: &'static str,
	/// Every slot, in final wire order: activator-consumed slots first (in
	/// constructor parameter order), then post-construction slots (in
	/// discovery order). This order is shared verbatim by the serialize and
	/// deserialize programs (§4.3).
	pub values: Vec<SerializationValue>,
	/// Number of leading entries in `values` that the activator consumes
	/// directly, rather than writing through `set` after construction.
	pub activator_input_count: usize,
	pub activator: ObjectActivator,
}

/// Fluent builder for one record type's [`ObjectSerializationMapping`],
/// consuming `T`'s `#[derive(Reflected)]`-generated metadata.
pub struct MapperBuilder<T: Reflected> {
	_marker: PhantomData<fn() -> T>,
	explicit_values: Vec<(&'static str, SlotKind)>,
	include_public_fields: bool,
	include_public_properties: bool,
	parametrized_hints: Option<Vec<&'static str>>,
	indirect_factory: Option<Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>>,
}

impl<T: Reflected> Default for MapperBuilder<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Reflected> MapperBuilder<T> {
	pub fn new() -> Self {
		Self {
			_marker: PhantomData,
			explicit_values: Vec::new(),
			include_public_fields: false,
			include_public_properties: false,
			parametrized_hints: None,
			indirect_factory: None,
		}
	}

	/// Auto-discover every `Field`-kind slot not already named by
	/// [`Self::values`].
	pub fn public_fields(mut self) -> Self {
		self.include_public_fields = true;
		self
	}

	/// Auto-discover every `Property`-kind slot not already named by
	/// [`Self::values`].
	pub fn public_properties(mut self) -> Self {
		self.include_public_properties = true;
		self
	}

	/// Name specific slots explicitly, in wire order, ahead of any
	/// auto-discovery. Later calls append.
	pub fn values(mut self, hints: &[(&'static str, SlotKind)]) -> Self {
		self.explicit_values.extend_from_slice(hints);
		self
	}

	/// Activate via the constructor whose parameter names match `hints`
	/// exactly, in order.
	pub fn parametrized_activation(mut self, hints: &[&'static str]) -> Self {
		self.parametrized_hints = Some(hints.to_vec());
		self
	}

	/// Activate via a user-supplied factory closure rather than any
	/// constructor discovered from `T`.
	pub fn indirect_activation(mut self, factory: Arc<dyn Fn() -> T + Send + Sync>) -> Self {
		self.indirect_factory = Some(Arc::new(move || Box::new(factory()) as Box<dyn Any>));
		self
	}

	/// Resolve activation, slot discovery, and ordering into an immutable
	/// mapping, per §4.2's validation algorithm.
	pub fn build(self) -> Result<ObjectSerializationMapping, MappingError> {
		let type_name = T::type_name();
		let all_slots = T::slots();

		// Step 1: explicit values, in the order given, each must name a real slot.
		let mut discovered: Vec<&SlotDescriptor> = Vec::with_capacity(all_slots.len());
		for (name, kind) in &self.explicit_values {
			let slot = find_slot(all_slots, name, Some(*kind)).ok_or(MappingError::new(MappingErrorKind::InvalidMapping {
				type_name,
				reason: "an explicitly named value does not match any known slot",
			}))?;
			discovered.push(slot);
		}

		// Step 2: auto-discovered properties, skipping anything already named.
		if self.include_public_properties {
			for slot in all_slots.iter().filter(|s| s.kind == SlotKind::Property) {
				if !discovered.iter().any(|d| d.name == slot.name) {
					discovered.push(slot);
				}
			}
		}

		// Step 3: auto-discovered fields, skipping anything already named.
		if self.include_public_fields {
			for slot in all_slots.iter().filter(|s| s.kind == SlotKind::Field) {
				if !discovered.iter().any(|d| d.name == slot.name) {
					discovered.push(slot);
				}
			}
		}

		// Step 4: resolve the activator.
		let (activator, activator_slots) = if let Some(hints) = &self.parametrized_hints {
			let ctor = find_constructor(T::constructors(), hints).ok_or(MappingError::new(
				MappingErrorKind::NoMatchingConstructor {
					type_name,
					hints: hints.clone(),
				},
			))?;
			let mut param_slots = Vec::with_capacity(hints.len());
			for name in hints {
				let slot = find_slot(all_slots, name, None).ok_or(MappingError::new(MappingErrorKind::InvalidMapping {
					type_name,
					reason: "a constructor parameter name does not match any known slot",
				}))?;
				param_slots.push(slot);
			}
			(
				ObjectActivator::Parametrized { invoke: ctor.invoke },
				param_slots,
			)
		} else if let Some(factory) = &self.indirect_factory {
			(
				ObjectActivator::Indirect {
					factory: Arc::clone(factory),
				},
				Vec::new(),
			)
		} else {
			let construct = T::default_constructor().ok_or(MappingError::new(MappingErrorKind::NoDefaultConstructor {
				type_name,
			}))?;
			(ObjectActivator::Default { construct }, Vec::new())
		};

		// Step 5: the post-construction slot set is everything discovered that
		// the activator did not already consume.
		let post_construction: Vec<&SlotDescriptor> = discovered
			.into_iter()
			.filter(|slot| !activator_slots.iter().any(|a| a.name == slot.name))
			.collect();

		// Validation: a slot with no setter can only be written by the
		// activator, never after construction.
		for slot in &post_construction {
			if slot.set.is_none() {
				return Err(MappingError::new(MappingErrorKind::InvalidMapping {
					type_name,
					reason: "a read-only slot was mapped outside of activation",
				}));
			}
		}

		let activator_input_count = activator_slots.len();
		let mut values = Vec::with_capacity(activator_input_count + post_construction.len());
		for slot in activator_slots.into_iter().chain(post_construction) {
			values.push(SerializationValue {
				name: slot.name,
				kind: slot.kind,
				value_type: slot.value_type,
				value_type_name: slot.value_type_name,
				is_null_assignable: slot.is_null_assignable,
				get: slot.get,
				set: slot.set,
				serializer: (slot.ensure_serializer)(),
				null_is_present: slot.null_is_present,
				null_inner: slot.null_inner,
				null_wrap: slot.null_wrap,
			});
		}

		Ok(ObjectSerializationMapping {
			type_id: TypeId::of::<T>(),
			type_name,
			values,
			activator_input_count,
			activator,
		})
	}
}

fn find_slot<'a>(slots: &'a [SlotDescriptor], name: &str, kind: Option<SlotKind>) -> Option<&'a SlotDescriptor> {
	slots
		.iter()
		.find(|s| s.name == name && kind.map_or(true, |k| s.kind == k))
}

fn find_constructor<'a>(
	constructors: &'a [ConstructorDescriptor],
	hints: &[&'static str],
) -> Option<&'a ConstructorDescriptor> {
	constructors.iter().find(|c| c.param_names == hints)
}

#[cfg(test)]
mod tests {
	use super::*;
	use once_cell::sync::OnceCell;

	// A hand-written `Reflected` impl standing in for what
	// `#[derive(Reflected)]` would generate, so the builder can be exercised
	// before the derive macro exists.
	#[derive(Debug, PartialEq, Eq)]
	struct Point {
		x: i32,
		y: i32,
	}

	impl Point {
		fn get_x(v: &dyn Any) -> &dyn Any {
			&v.downcast_ref::<Point>().unwrap().x
		}
		fn set_x(v: &mut dyn Any, value: Box<dyn Any>) {
			v.downcast_mut::<Point>().unwrap().x = *value.downcast::<i32>().unwrap();
		}
		fn get_y(v: &dyn Any) -> &dyn Any {
			&v.downcast_ref::<Point>().unwrap().y
		}
		fn set_y(v: &mut dyn Any, value: Box<dyn Any>) {
			v.downcast_mut::<Point>().unwrap().y = *value.downcast::<i32>().unwrap();
		}

		fn ensure_i32() -> Arc<dyn ValueSerializer> {
			crate::registry::global()
				.get_for_type(TypeId::of::<i32>(), "i32")
				.expect("i32 is a built-in")
		}
	}

	impl Reflected for Point {
		fn type_name() -> &'static str {
			"Point"
		}

		fn slots() -> &'static [SlotDescriptor] {
			static SLOTS: OnceCell<Vec<SlotDescriptor>> = OnceCell::new();
			SLOTS.get_or_init(|| {
				vec![
					SlotDescriptor {
						name: "x",
						kind: SlotKind::Field,
						value_type: TypeId::of::<i32>(),
						value_type_name: "i32",
						is_null_assignable: false,
						get: Point::get_x,
						set: Some(Point::set_x),
						ensure_serializer: Point::ensure_i32,
						null_is_present: None,
						null_inner: None,
						null_wrap: None,
					},
					SlotDescriptor {
						name: "y",
						kind: SlotKind::Field,
						value_type: TypeId::of::<i32>(),
						value_type_name: "i32",
						is_null_assignable: false,
						get: Point::get_y,
						set: Some(Point::set_y),
						ensure_serializer: Point::ensure_i32,
						null_is_present: None,
						null_inner: None,
						null_wrap: None,
					},
				]
			})
		}

		fn constructors() -> &'static [ConstructorDescriptor] {
			static CTORS: OnceCell<Vec<ConstructorDescriptor>> = OnceCell::new();
			CTORS.get_or_init(|| {
				vec![ConstructorDescriptor {
					param_names: &["x", "y"],
					invoke: |mut args| {
						let y = *args.pop().unwrap().downcast::<i32>().unwrap();
						let x = *args.pop().unwrap().downcast::<i32>().unwrap();
						Box::new(Point { x, y })
					},
				}]
			})
		}

		fn default_constructor() -> Option<fn() -> Box<dyn Any>> {
			Some(|| Box::new(Point { x: 0, y: 0 }))
		}
	}

	#[test]
	fn default_activation_orders_fields_after_empty_activator_prefix() {
		let mapping = MapperBuilder::<Point>::new().public_fields().build().unwrap();
		assert_eq!(mapping.activator_input_count, 0);
		assert_eq!(mapping.values.len(), 2);
		assert_eq!(mapping.values[0].name, "x");
		assert_eq!(mapping.values[1].name, "y");
		assert!(matches!(mapping.activator, ObjectActivator::Default { .. }));
	}

	#[test]
	fn parametrized_activation_consumes_its_params_and_nothing_else() {
		let mapping = MapperBuilder::<Point>::new()
			.parametrized_activation(&["x", "y"])
			.build()
			.unwrap();
		assert_eq!(mapping.activator_input_count, 2);
		assert_eq!(mapping.values.len(), 2);
		assert!(matches!(mapping.activator, ObjectActivator::Parametrized { .. }));
	}

	#[test]
	fn unknown_constructor_hints_are_rejected() {
		let err = MapperBuilder::<Point>::new()
			.parametrized_activation(&["x", "z"])
			.build()
			.unwrap_err();
		assert!(matches!(err.kind(), MappingErrorKind::NoMatchingConstructor { .. }));
	}

	#[test]
	fn explicit_values_suppress_auto_discovery_duplicates() {
		let mapping = MapperBuilder::<Point>::new()
			.values(&[("y", SlotKind::Field)])
			.public_fields()
			.build()
			.unwrap();
		assert_eq!(mapping.values.len(), 2);
		assert_eq!(mapping.values[0].name, "y");
		assert_eq!(mapping.values[1].name, "x");
	}
}
