// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Expr, ExprLit, Fields, FnArg, ItemTrait, Lit,
    Meta, TraitItem,
};

/// Per-field options parsed from `#[bean(...)]`.
#[derive(Default)]
struct FieldOptions {
    rename: Option<String>,
    skip: bool,
    read_only: bool,
    required: bool,
}

/// `#[derive(Bean)]` macro: generates the property table plus `ToValue`/`FromValue`
///
/// Every named field becomes a property whose name is the field name in
/// lowerCamelCase. Field types must implement `ToValue` (and `FromValue`
/// unless the field is read-only). The struct must implement `Default`.
///
/// Field attributes:
/// - `#[bean(rename = "name")]`: explicit property name
/// - `#[bean(skip)]`: not a property
/// - `#[bean(read_only)]`: no setter
/// - `#[bean(required)]`: null or absent values are an error
///
/// Example:
/// ```ignore
/// use lode::Bean;
///
/// #[derive(Bean, Default)]
/// struct Order {
///     order_id: u64,                 // "orderId"
///     #[bean(rename = "qty")]
///     quantity: u32,
///     #[bean(read_only)]
///     created: chrono::NaiveDateTime,
///     #[bean(skip)]
///     scratch: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(Bean, attributes(bean))]
pub fn derive_bean(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            _ => {
                return syn::Error::new_spanned(&input, "Only named fields are supported")
                    .to_compile_error()
                    .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "Only structs are supported")
                .to_compile_error()
                .into()
        }
    };

    let mut properties = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            return syn::Error::new_spanned(field, "Field must have a name")
                .to_compile_error()
                .into();
        };
        let options = match parse_field_options(&field.attrs) {
            Ok(options) => options,
            Err(err) => return err.to_compile_error().into(),
        };
        if options.skip {
            continue;
        }

        let field_type = &field.ty;
        let key = options
            .rename
            .unwrap_or_else(|| to_lower_camel(&field_name.unraw().to_string()));
        let type_str = quote!(#field_type).to_string().replace(' ', "");

        let setter = if options.read_only {
            quote! {}
        } else {
            quote! {
                .with_setter(|value: &::lode::Value| -> ::lode::Result<::lode::beans::Assign<Self>> {
                    let coerced: #field_type = ::lode::FromValue::from_value(value)?;
                    Ok(::std::boxed::Box::new(move |bean: &mut Self| bean.#field_name = coerced))
                })
            }
        };
        let required = if options.required {
            quote! { .required() }
        } else {
            quote! {}
        };

        properties.push(quote! {
            ::lode::Property::new(
                #key,
                #type_str,
                |bean: &Self| -> ::lode::Value { ::lode::ToValue::to_value(&bean.#field_name) },
            )
            #setter
            #required
        });
    }

    let expanded = quote! {
        impl #impl_generics ::lode::Bean for #name #ty_generics #where_clause {
            fn bean_type() -> ::lode::BeanType<Self> {
                ::lode::BeanType::new(#type_name, vec![#(#properties),*])
            }
        }

        impl #impl_generics ::lode::ToValue for #name #ty_generics #where_clause {
            fn to_value(&self) -> ::lode::Value {
                ::lode::beans::bean_to_value(self)
            }
        }

        impl #impl_generics ::lode::FromValue for #name #ty_generics #where_clause {
            fn from_value(value: &::lode::Value) -> ::lode::Result<Self> {
                ::lode::beans::bean_from_value(value)
            }
        }
    };

    TokenStream::from(expanded)
}

/// `#[view]` attribute on a trait: generates `<Trait>View`, a typed view over a generic map
///
/// Each method must take `&self` only and return `lode::Result<T>` where
/// `T: FromValue`. The property read by a method is its name with any
/// `get_`/`is_` prefix removed, in lowerCamelCase. Methods with a default
/// body keep it and are not bound to a property.
///
/// Method attributes:
/// - `#[key = "name"]`: explicit property name
/// - `#[required]`: null or absent values are an error
///
/// The generated view also implements `FromValue` and `ToValue`, and
/// `Box<dyn Trait>` implements `FromValue`, so views nest.
///
/// Example:
/// ```ignore
/// use lode::view;
///
/// #[view]
/// trait Person {
///     fn name(&self) -> lode::Result<String>;
///     #[key = "yearOfBirth"]
///     fn born(&self) -> lode::Result<i32>;
///     #[required]
///     fn is_active(&self) -> lode::Result<bool>;   // "active"
/// }
///
/// let person = PersonView::new(value);
/// ```
#[proc_macro_attribute]
pub fn view(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[view] takes no arguments",
        )
        .to_compile_error()
        .into();
    }
    let mut item = parse_macro_input!(item as ItemTrait);

    if !item.generics.params.is_empty() {
        return syn::Error::new_spanned(&item.generics, "Generic traits are not supported")
            .to_compile_error()
            .into();
    }

    let trait_ident = item.ident.clone();
    let trait_name = trait_ident.to_string();
    let view_ident = format_ident!("{}View", trait_ident);
    let vis = item.vis.clone();

    let mut accessors = Vec::new();
    let mut methods = Vec::new();

    for trait_item in &mut item.items {
        let TraitItem::Fn(method) = trait_item else {
            return syn::Error::new_spanned(trait_item, "Only methods are supported")
                .to_compile_error()
                .into();
        };

        let (key, required) = match take_method_options(&mut method.attrs) {
            Ok(options) => options,
            Err(err) => return err.to_compile_error().into(),
        };
        if method.default.is_some() {
            continue;
        }

        let sig = &method.sig;
        if !sig.generics.params.is_empty() || sig.asyncness.is_some() {
            return syn::Error::new_spanned(sig, "View methods must be plain accessors")
                .to_compile_error()
                .into();
        }
        let by_ref_self = matches!(
            sig.inputs.first(),
            Some(FnArg::Receiver(r)) if r.reference.is_some() && r.mutability.is_none()
        );
        if !by_ref_self || sig.inputs.len() != 1 {
            return syn::Error::new_spanned(sig, "View methods take only `&self`")
                .to_compile_error()
                .into();
        }

        let method_name = sig.ident.unraw().to_string();
        let key = key.unwrap_or_else(|| property_name(&method_name));
        let required = if required {
            quote! { .required() }
        } else {
            quote! {}
        };
        accessors.push(quote! {
            ::lode::Accessor::new(#method_name, #key) #required
        });
        methods.push(quote! {
            #sig {
                self.view.call(#method_name)
            }
        });
    }

    let doc = format!("Typed view implementing [`{}`] over a generic map.", trait_name);

    let expanded = quote! {
        #item

        #[doc = #doc]
        #[derive(Clone, Debug)]
        #vis struct #view_ident {
            view: ::lode::TypedView,
        }

        impl #view_ident {
            /// Wraps `source`. Nothing is read or coerced until a method is called.
            #vis fn new(source: ::lode::Value) -> Self {
                Self {
                    view: ::lode::TypedView::new::<Self>(source),
                }
            }

            #vis fn typed_view(&self) -> &::lode::TypedView {
                &self.view
            }
        }

        impl ::lode::ViewSpec for #view_ident {
            fn view_type() -> ::lode::ViewType {
                ::lode::ViewType::new(#trait_name, vec![#(#accessors),*])
            }
        }

        impl #trait_ident for #view_ident {
            #(#methods)*
        }

        impl ::lode::FromValue for #view_ident {
            fn from_value(value: &::lode::Value) -> ::lode::Result<Self> {
                ::lode::TypedView::wrap::<Self>(value).map(|view| Self { view })
            }
        }

        impl ::lode::ToValue for #view_ident {
            fn to_value(&self) -> ::lode::Value {
                self.view.source().clone()
            }
        }

        impl ::lode::FromValue for ::std::boxed::Box<dyn #trait_ident> {
            fn from_value(value: &::lode::Value) -> ::lode::Result<Self> {
                let view = <#view_ident as ::lode::FromValue>::from_value(value)?;
                Ok(::std::boxed::Box::new(view))
            }
        }
    };

    TokenStream::from(expanded)
}

fn parse_field_options(attrs: &[Attribute]) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("bean")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                options.rename = Some(lit.value());
            } else if meta.path.is_ident("skip") {
                options.skip = true;
            } else if meta.path.is_ident("read_only") {
                options.read_only = true;
            } else if meta.path.is_ident("required") {
                options.required = true;
            } else {
                return Err(meta.error("expected `rename`, `skip`, `read_only` or `required`"));
            }
            Ok(())
        })?;
    }
    Ok(options)
}

/// Removes `#[key = "..."]` and `#[required]` from a view method.
fn take_method_options(attrs: &mut Vec<Attribute>) -> syn::Result<(Option<String>, bool)> {
    let mut key = None;
    let mut required = false;
    let mut error = None;

    attrs.retain(|attr| {
        if attr.path().is_ident("required") {
            required = true;
            return false;
        }
        if attr.path().is_ident("key") {
            match &attr.meta {
                Meta::NameValue(nv) => match &nv.value {
                    Expr::Lit(ExprLit {
                        lit: Lit::Str(s), ..
                    }) => key = Some(s.value()),
                    other => {
                        error = Some(syn::Error::new_spanned(other, "expected a string literal"))
                    }
                },
                other => error = Some(syn::Error::new_spanned(other, "expected `#[key = \"...\"]`")),
            }
            return false;
        }
        true
    });

    match error {
        Some(err) => Err(err),
        None => Ok((key, required)),
    }
}

/// Accessor-derived property name: `get_first_name` -> `firstName`.
fn property_name(method: &str) -> String {
    let stripped = ["get_", "is_"]
        .iter()
        .find_map(|prefix| method.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(method);
    to_lower_camel(stripped)
}

/// `sensor_id` -> `sensorId`.
fn to_lower_camel(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = false;
    for c in snake.trim_start_matches('_').chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
