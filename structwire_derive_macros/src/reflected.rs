use {
	proc_macro2::{Span, TokenStream},
	quote::{format_ident, quote},
	syn::{ext::IdentExt as _, spanned::Spanned as _, Error},
};

#[derive(darling::FromDeriveInput)]
#[darling(attributes(structwire), supports(struct_named))]
pub(crate) struct ReflectedDeriveInput {
	ident: syn::Ident,
	data: darling::ast::Data<darling::util::Ignored, ReflectedDeriveField>,

	constructor: Option<ConstructorArgs>,
	no_default: darling::util::Flag,
}

#[derive(darling::FromField)]
#[darling(attributes(structwire))]
pub(crate) struct ReflectedDeriveField {
	ident: Option<syn::Ident>,
	ty: syn::Type,

	skip: darling::util::Flag,
	readonly: darling::util::Flag,
	getter: Option<syn::Path>,
	setter: Option<syn::Path>,
}

#[derive(darling::FromMeta, Clone)]
pub(crate) struct ConstructorArgs {
	args: syn::LitStr,
}

pub(crate) fn reflected_impl(input: ReflectedDeriveInput) -> Result<TokenStream, Error> {
	let ident = &input.ident;
	let type_name = ident.to_string();

	let all_fields = match input.data {
		darling::ast::Data::Struct(fields) => fields.fields,
		darling::ast::Data::Enum(_) => {
			return Err(Error::new(Span::call_site(), "Reflected only supports named structs"))
		}
	};
	let fields: Vec<&ReflectedDeriveField> = all_fields.iter().filter(|f| !f.skip.is_present()).collect();

	let mut helper_fns = TokenStream::new();
	let mut slot_exprs = Vec::with_capacity(fields.len());

	for field in &fields {
		let field_ident = field
			.ident
			.as_ref()
			.ok_or_else(|| Error::new(Span::call_site(), "tuple struct fields are not supported"))?;
		let field_name = field_ident.unraw().to_string();
		let field_ty = &field.ty;
		let inner_ty = option_inner(field_ty);
		let is_null = inner_ty.is_some();
		let value_ty = inner_ty.unwrap_or(field_ty);
		let value_ty_name = quote!(#value_ty).to_string();

		let get_fn = format_ident!("__structwire_get_{}", field_ident);
		let ensure_fn = format_ident!("__structwire_ensure_{}", field_ident);

		let get_body = match &field.getter {
			Some(getter) => quote! {
				#getter(v.downcast_ref::<#ident>().unwrap()) as &dyn ::std::any::Any
			},
			None => quote! {
				&v.downcast_ref::<#ident>().unwrap().#field_ident as &dyn ::std::any::Any
			},
		};
		helper_fns.extend(quote! {
			fn #get_fn(v: &dyn ::std::any::Any) -> &dyn ::std::any::Any {
				#get_body
			}
			fn #ensure_fn() -> ::std::sync::Arc<dyn structwire::ValueSerializer> {
				<#value_ty as structwire::Reflectable>::ensure_registered()
			}
		});

		let set_expr = if field.readonly.is_present() {
			quote! { None }
		} else {
			let set_fn = format_ident!("__structwire_set_{}", field_ident);
			let set_body = match &field.setter {
				Some(setter) => quote! {
					#setter(v.downcast_mut::<#ident>().unwrap(), *value.downcast::<#field_ty>().unwrap());
				},
				None => quote! {
					v.downcast_mut::<#ident>().unwrap().#field_ident = *value.downcast::<#field_ty>().unwrap();
				},
			};
			helper_fns.extend(quote! {
				fn #set_fn(v: &mut dyn ::std::any::Any, value: Box<dyn ::std::any::Any>) {
					#set_body
				}
			});
			quote! { Some(#set_fn) }
		};

		let kind = if field.getter.is_some() || field.setter.is_some() {
			quote! { structwire::SlotKind::Property }
		} else {
			quote! { structwire::SlotKind::Field }
		};

		let (null_is_present_expr, null_inner_expr, null_wrap_expr) = if let Some(inner) = inner_ty {
			let null_is_present_fn = format_ident!("__structwire_null_is_present_{}", field_ident);
			let null_inner_fn = format_ident!("__structwire_null_inner_{}", field_ident);
			let null_wrap_fn = format_ident!("__structwire_null_wrap_{}", field_ident);
			helper_fns.extend(quote! {
				fn #null_is_present_fn(v: &dyn ::std::any::Any) -> bool {
					v.downcast_ref::<::std::option::Option<#inner>>().unwrap().is_some()
				}
				fn #null_inner_fn(v: &dyn ::std::any::Any) -> &dyn ::std::any::Any {
					v.downcast_ref::<::std::option::Option<#inner>>().unwrap().as_ref().unwrap() as &dyn ::std::any::Any
				}
				fn #null_wrap_fn(inner: ::std::option::Option<Box<dyn ::std::any::Any>>) -> Box<dyn ::std::any::Any> {
					Box::new(inner.map(|b| *b.downcast::<#inner>().unwrap()))
				}
			});
			(quote! { Some(#null_is_present_fn) }, quote! { Some(#null_inner_fn) }, quote! { Some(#null_wrap_fn) })
		} else {
			(quote! { None }, quote! { None }, quote! { None })
		};

		slot_exprs.push(quote! {
			structwire::SlotDescriptor {
				name: #field_name,
				kind: #kind,
				value_type: ::std::any::TypeId::of::<#value_ty>(),
				value_type_name: #value_ty_name,
				is_null_assignable: #is_null,
				get: #get_fn,
				set: #set_expr,
				ensure_serializer: #ensure_fn,
				null_is_present: #null_is_present_expr,
				null_inner: #null_inner_expr,
				null_wrap: #null_wrap_expr,
			}
		});
	}

	let (constructors_body, constructor_helper_fns) = match &input.constructor {
		Some(ctor) => build_constructor(ident, &fields, ctor)?,
		None => (quote! { &[] }, TokenStream::new()),
	};
	helper_fns.extend(constructor_helper_fns);

	let default_constructor_body = if input.no_default.is_present() {
		quote! { None }
	} else {
		helper_fns.extend(quote! {
			fn __structwire_default_ctor() -> Box<dyn ::std::any::Any> {
				Box::new(<#ident as ::std::default::Default>::default())
			}
		});
		quote! { Some(__structwire_default_ctor) }
	};

	Ok(quote! {
		const _: () = {
			#helper_fns

			impl structwire::Reflected for #ident {
				fn type_name() -> &'static str {
					#type_name
				}

				fn slots() -> &'static [structwire::SlotDescriptor] {
					static SLOTS: ::std::sync::OnceLock<::std::vec::Vec<structwire::SlotDescriptor>> =
						::std::sync::OnceLock::new();
					SLOTS.get_or_init(|| vec![#(#slot_exprs),*])
				}

				fn constructors() -> &'static [structwire::ConstructorDescriptor] {
					#constructors_body
				}

				fn default_constructor() -> ::std::option::Option<fn() -> Box<dyn ::std::any::Any>> {
					#default_constructor_body
				}
			}

			impl structwire::Reflectable for #ident {
				fn ensure_registered() -> ::std::sync::Arc<dyn structwire::ValueSerializer> {
					structwire::StructSerializer::ensure_struct_registered::<#ident>()
						.expect("failed to lazily register a nested record type");
					structwire::registry::global()
						.get_for_type(
							::std::any::TypeId::of::<#ident>(),
							<#ident as structwire::Reflected>::type_name(),
						)
						.expect("just ensured registration above")
				}
			}
		};
	})
}

/// Returns `Some(inner)` if `ty` is exactly `Option<inner>`.
fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
	let syn::Type::Path(type_path) = ty else {
		return None;
	};
	let segment = type_path.path.segments.last()?;
	if segment.ident != "Option" {
		return None;
	}
	let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
		return None;
	};
	match args.args.first()? {
		syn::GenericArgument::Type(inner) => Some(inner),
		_ => None,
	}
}

/// Build the single parametrized constructor a `#[structwire(constructor(args =
/// "a, b"))]` struct-level attribute describes. Every field the argument list
/// does not name is initialized via `Default::default()`, since a Rust struct
/// literal must set every field up front; the mapping's post-construction
/// setters immediately overwrite those defaults.
fn build_constructor(
	ident: &syn::Ident,
	fields: &[&ReflectedDeriveField],
	ctor: &ConstructorArgs,
) -> Result<(TokenStream, TokenStream), Error> {
	let arg_names: Vec<String> = ctor
		.args
		.value()
		.split(',')
		.map(|s| s.trim().to_owned())
		.filter(|s| !s.is_empty())
		.collect();

	let mut field_inits = Vec::with_capacity(fields.len());
	let mut pops = Vec::with_capacity(arg_names.len());
	for name in arg_names.iter().rev() {
		let field = fields
			.iter()
			.find(|f| f.ident.as_ref().map(|i| i.unraw().to_string()) == Some(name.clone()))
			.ok_or_else(|| {
				Error::new(
					ctor.args.span(),
					format!("constructor argument `{name}` does not match any field"),
				)
			})?;
		let field_ident = field.ident.as_ref().expect("checked above");
		let field_ty = &field.ty;
		pops.push(quote! {
			let #field_ident = *args.pop().unwrap().downcast::<#field_ty>()
				.expect("constructor argument had an unexpected type");
		});
	}
	for field in fields {
		let field_ident = field.ident.as_ref().expect("named struct field");
		if arg_names.iter().any(|n| *n == field_ident.unraw().to_string()) {
			field_inits.push(quote! { #field_ident });
		} else {
			field_inits.push(quote! { #field_ident: ::std::default::Default::default() });
		}
	}

	let invoke_fn = format_ident!("__structwire_ctor_invoke");
	let helper = quote! {
		fn #invoke_fn(mut args: ::std::vec::Vec<Box<dyn ::std::any::Any>>) -> Box<dyn ::std::any::Any> {
			#(#pops)*
			Box::new(#ident { #(#field_inits),* })
		}
	};
	let body = quote! {
		static CTORS: ::std::sync::OnceLock<::std::vec::Vec<structwire::ConstructorDescriptor>> =
			::std::sync::OnceLock::new();
		CTORS.get_or_init(|| vec![structwire::ConstructorDescriptor {
			param_names: &[#(#arg_names),*],
			invoke: #invoke_fn,
		}])
	};
	Ok((body, helper))
}
