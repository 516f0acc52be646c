//! Internal macros crate backing `structwire_derive`.
//!
//! Use [`structwire_derive`] instead of depending on this crate directly.

mod reflected;

use darling::FromDeriveInput;

#[proc_macro_derive(Reflected, attributes(structwire))]
/// Derive [`structwire::Reflected`] for a named struct, generating the
/// per-field slot metadata [`structwire::StructSerializer`] needs to map,
/// compile, and run a serialize/deserialize/size program for it.
///
/// # Example
///
/// ```
/// use structwire_derive::Reflected;
///
/// #[derive(Reflected, Default)]
/// struct Point {
/// 	x: i32,
/// 	y: i32,
/// }
/// ```
///
/// # Field attributes
///
/// - `#[structwire(skip)]` — omit this field from `slots()` entirely.
/// - `#[structwire(readonly)]` — no setter is generated; the slot can then
///   only be mapped via `parametrized_activation`.
/// - `#[structwire(getter = "path::to::fn", setter = "path::to::fn")]` —
///   produce a `Property` slot instead of a `Field` slot, reading and
///   writing through the given functions instead of the field directly.
///
/// # Struct attributes
///
/// - `#[structwire(constructor(args = "a, b"))]` — expose one
///   [`structwire::ConstructorDescriptor`] whose parameters are the named
///   fields, in order, for use with `parametrized_activation`.
/// - `#[structwire(no_default)]` — don't generate a parameterless
///   constructor; `default_constructor()` returns `None` and the type can
///   only be mapped with `parametrized_activation`/`indirect_activation`.
///   Without this attribute the type must implement `Default`.
pub fn reflected_derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let derive_input = syn::parse_macro_input!(input as syn::DeriveInput);

	match FromDeriveInput::from_derive_input(&derive_input).map(reflected::reflected_impl) {
		Err(e) => e.write_errors().into(),
		Ok(Ok(tokens)) => tokens.into(),
		Ok(Err(e)) => e.into_compile_error().into(),
	}
}
