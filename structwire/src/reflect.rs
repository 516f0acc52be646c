//! Compile-time struct introspection surface: the target of
//! `#[derive(Reflected)]` (in `structwire_derive`).
//!
//! Grounded on the teacher's `BuildSchema` trait and its `append_schema` /
//! `SchemaBuilder` pair (`serde_avro_derive/src/lib.rs`): a derive-generated
//! `impl` exposing enough static metadata for the rest of the engine (the
//! [`crate::mapping`] builder) to work with the type without further macro
//! involvement.

use std::any::{Any, TypeId};

/// Whether a [`SlotDescriptor`] came from a plain struct field or a
/// `#[structwire(getter = ..., setter = ...)]`-declared property.
///
/// Rust has no first-class "property" language feature distinct from a
/// field, so `Property` slots only ever come from explicit attributes; every
/// auto-discovered `pub` field is `Field` (see DESIGN.md's Open Questions).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotKind {
	Field,
	Property,
}

/// One named slot on a record, as produced by `#[derive(Reflected)]`.
pub struct SlotDescriptor {
	pub name: &'static str,
	pub kind: SlotKind,
	pub value_type: TypeId,
	pub value_type_name: &'static str,
	/// `true` exactly when the slot's Rust type is `Option<_>` — the only
	/// null-assignable shape in this engine, collapsing the distilled spec's
	/// separate "reference-typed" and "`Nullable<T>`" cases into one (see
	/// DESIGN.md's Open Questions).
	///
	/// When `true`, `value_type`/`value_type_name`/`ensure_serializer`
	/// describe the *inner* `T`, not the `Option<T>` wrapper — presence is
	/// carried by the record's null mask, not by the inner value-serializer,
	/// so the interpreter never reaches for `Option<T>`'s own
	/// `NullableCodec` (that one is reserved for `Option<T>` nested inside
	/// arrays/maps, see `crate::builtin::nullable`). `get`/`set` still
	/// operate on the whole `Option<T>` slot; `null_is_present`/`null_inner`/
	/// `null_wrap` bridge between the two views.
	pub is_null_assignable: bool,
	/// Read the slot's value out of a `&dyn Any` known to be the record
	/// type. For a null-assignable slot this returns `&Option<T>`, not `&T`.
	pub get: fn(&dyn Any) -> &dyn Any,
	/// Write the slot's value into a `&mut dyn Any` known to be the record
	/// type. `None` for read-only property slots, which may then only be
	/// used as activator (constructor) inputs. For a null-assignable slot
	/// this expects a boxed `Option<T>`, not a boxed `T`.
	pub set: Option<fn(&mut dyn Any, Box<dyn Any>)>,
	/// Resolve (and, for generic categories, lazily extend the registry
	/// with) this slot's value-serializer. Generated per-field by the derive
	/// macro as `|| <FieldType as Reflectable>::ensure_registered()` — this
	/// is the concrete mechanism behind §4.4's recursive analyzer walk (see
	/// `crate::analyzer`). For a null-assignable slot, `FieldType` is the
	/// inner `T`.
	pub ensure_serializer: fn() -> std::sync::Arc<dyn crate::value_serializer::ValueSerializer>,
	/// Given the `&dyn Any` that `get` returned (a `&Option<T>`), whether it
	/// is `Some`. `None` for non-null-assignable slots.
	pub null_is_present: Option<fn(&dyn Any) -> bool>,
	/// Given the `&dyn Any` that `get` returned (a `&Option<T>`) known to be
	/// `Some`, the inner `&T` as `&dyn Any`. `None` for non-null-assignable
	/// slots.
	pub null_inner: Option<fn(&dyn Any) -> &dyn Any>,
	/// Wrap an optional boxed inner `T` into a boxed `Option<T>` suitable
	/// for `set`. `None` for non-null-assignable slots.
	pub null_wrap: Option<fn(Option<Box<dyn Any>>) -> Box<dyn Any>>,
}

/// One constructor a record type exposes for parametrized activation.
pub struct ConstructorDescriptor {
	pub param_names: &'static [&'static str],
	/// Invoke the constructor with boxed, already-deserialized parameter
	/// values in declared order, producing a boxed record instance.
	pub invoke: fn(Vec<Box<dyn Any>>) -> Box<dyn Any>,
}

/// Compile-time metadata surface implemented by `#[derive(Reflected)]`.
pub trait Reflected: Sized + 'static {
	fn type_name() -> &'static str;
	fn slots() -> &'static [SlotDescriptor];
	fn constructors() -> &'static [ConstructorDescriptor];
	/// `Some` if the type has a parameterless constructor (a derived
	/// `Default` impl, or an explicit `#[structwire(default)]` constructor).
	fn default_constructor() -> Option<fn() -> Box<dyn Any>>;
}
