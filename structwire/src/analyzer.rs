//! Recursive registry extension (§4.4).
//!
//! The distilled spec describes the analyzer as a graph walk over referenced
//! slot types, erased-typed, extending the registry for not-yet-registered
//! generic specializations. In idiomatic Rust the same recursive walk is
//! better expressed through generics than through a type-erased worklist:
//! [`Reflectable::ensure_registered`] is implemented once per generic shape
//! (`Option<T>`, `Vec<T>`, `HashMap<K, V>`, primitives, and — via the derive
//! macro — user records), and the compiler resolves each slot's recursion by
//! simply calling `FieldType::ensure_registered()` with `FieldType` known at
//! the call site. This is grounded on `schema/self_referential.rs`'s
//! "walk once before freezing" shape, redirected at generic-category
//! extension instead of cycle resolution.
//!
//! Idempotence falls out of [`crate::registry::EngineRegistry::register_if_absent`]:
//! repeated calls to `ensure_registered` for the same type are no-ops past
//! the first.

use std::{any::TypeId, collections::HashMap, hash::Hash, sync::Arc};

use crate::{
	builtin::{ArrayCodec, MapCodec, NullableCodec},
	registry::global,
	value_serializer::ValueSerializer,
};

/// A type whose value-serializer can be resolved (and, for generic
/// categories, lazily composed from its type parameters) without any
/// additional runtime configuration.
///
/// Implemented for every built-in primitive, for `Option<T>`/`Vec<T>`/
/// `HashMap<K, V>` over any `Reflectable` type parameters, and for any
/// `#[derive(Reflected)]` record type.
pub trait Reflectable: 'static {
	fn ensure_registered() -> Arc<dyn ValueSerializer>;
}

macro_rules! reflectable_builtin {
	($ty:ty) => {
		impl Reflectable for $ty {
			fn ensure_registered() -> Arc<dyn ValueSerializer> {
				global()
					.get_for_type(TypeId::of::<$ty>(), stringify!($ty))
					.expect("built-in primitive is always registered")
			}
		}
	};
}

reflectable_builtin!(i8);
reflectable_builtin!(i16);
reflectable_builtin!(i32);
reflectable_builtin!(i64);
reflectable_builtin!(i128);
reflectable_builtin!(u8);
reflectable_builtin!(u16);
reflectable_builtin!(u32);
reflectable_builtin!(u64);
reflectable_builtin!(u128);
reflectable_builtin!(f32);
reflectable_builtin!(f64);
reflectable_builtin!(bool);
reflectable_builtin!(char);
reflectable_builtin!(String);
reflectable_builtin!(std::time::Duration);

// `Vec<u8>` is *not* given its own `reflectable_builtin!` entry: it would
// overlap with the blanket `impl<T: Reflectable> Reflectable for Vec<T>`
// below. It still gets the eager `ByteArrayCodec` fast path, because that
// impl only ever builds a new codec when the registry doesn't already have
// one for the concrete `Vec<T>` in question — and `Vec<u8>` is registered
// eagerly in `EngineRegistry::register_builtins`.

impl<T: Reflectable> Reflectable for Option<T> {
	fn ensure_registered() -> Arc<dyn ValueSerializer> {
		let id = TypeId::of::<Option<T>>();
		if global().is_extendable(id) {
			let inner = T::ensure_registered();
			global().register_if_absent(id, "Option<T>", Arc::new(NullableCodec::<T>::new(inner)));
		}
		global()
			.get_for_type(id, "Option<T>")
			.expect("just ensured registration above")
	}
}

impl<T: Reflectable> Reflectable for Vec<T> {
	fn ensure_registered() -> Arc<dyn ValueSerializer> {
		let id = TypeId::of::<Vec<T>>();
		if global().is_extendable(id) {
			let element = T::ensure_registered();
			global().register_if_absent(id, "Vec<T>", Arc::new(ArrayCodec::<T>::new(element)));
		}
		global().get_for_type(id, "Vec<T>").expect("just ensured registration above")
	}
}

impl<K: Reflectable + Eq + Hash, V: Reflectable> Reflectable for HashMap<K, V> {
	fn ensure_registered() -> Arc<dyn ValueSerializer> {
		let id = TypeId::of::<HashMap<K, V>>();
		if global().is_extendable(id) {
			let key = K::ensure_registered();
			let value = V::ensure_registered();
			global().register_if_absent(id, "HashMap<K, V>", Arc::new(MapCodec::<K, V>::new(key, value)));
		}
		global()
			.get_for_type(id, "HashMap<K, V>")
			.expect("just ensured registration above")
	}
}
