//! `#[derive(Shape)]` expansion
//!
//! Emits the static directive table, `from_fields`, and a `WireValue` impl so
//! the shape can nest inside other shapes, lists, maps and unions.

use crate::attrs::{pascal_case, ContainerAttrs, FieldAttrs};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, GenericArgument, PathArguments, Type};

pub fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Shape cannot be derived for generic types",
        ));
    }

    let ident = &input.ident;
    let container = ContainerAttrs::parse(&input.attrs)?;
    let name = container.name.unwrap_or_else(|| ident.to_string());

    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "Shape can only be derived for structs",
            ))
        }
    };

    let members: Vec<&syn::Field> = match &data.fields {
        Fields::Named(fields) => fields.named.iter().collect(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                ident,
                "Shape requires named fields",
            ))
        }
    };

    let mut rows = Vec::with_capacity(members.len());
    let mut inits = Vec::with_capacity(members.len());

    for (index, field) in members.iter().enumerate() {
        let member = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "Shape requires named fields"))?;
        let attrs = FieldAttrs::parse(&field.attrs)?;
        let member_name = member.to_string();
        let wire = attrs
            .rename
            .clone()
            .unwrap_or_else(|| pascal_case(&member_name));
        let aliases = &attrs.aliases;
        let inner = option_inner(&field.ty);
        let optional = inner.is_some();
        let required = !optional;

        let directive = if attrs.idempotency_token {
            if !inner.is_some_and(is_string) {
                return Err(syn::Error::new_spanned(
                    &field.ty,
                    "idempotency_token members must be `Option<String>`",
                ));
            }
            format_ident!("IdempotencyToken")
        } else {
            format_ident!("Member")
        };

        let encode = match (&attrs.with, optional) {
            (None, false) => quote! {
                |s, cx| ::jsonwire_core::WireValue::to_wire(&s.#member, cx).map(Some)
            },
            (None, true) => quote! {
                |s, cx| s.#member.as_ref().map(|v| ::jsonwire_core::WireValue::to_wire(v, cx)).transpose()
            },
            (Some(with), false) => quote! {
                |s, _cx| #with::encode(&s.#member).map(Some)
            },
            (Some(with), true) => quote! {
                |s, _cx| s.#member.as_ref().map(#with::encode).transpose()
            },
        };

        let decode = match (&attrs.with, optional) {
            (None, false) => quote! { fields.required(#index)? },
            (None, true) => quote! { fields.optional(#index)? },
            (Some(with), false) => quote! { fields.required_with(#index, #with::decode)? },
            (Some(with), true) => quote! { fields.optional_with(#index, #with::decode)? },
        };

        rows.push(quote! {
            ::jsonwire_core::Field {
                member: #member_name,
                wire: #wire,
                aliases: &[#(#aliases),*],
                required: #required,
                directive: ::jsonwire_core::Directive::#directive,
                encode: #encode,
            }
        });
        inits.push(quote! { #member: #decode });
    }

    let construct = match &data.fields {
        Fields::Unit => quote! {
            let _ = fields;
            Ok(#ident)
        },
        _ => quote! {
            Ok(#ident { #(#inits),* })
        },
    };

    Ok(quote! {
        impl ::jsonwire_core::Shape for #ident {
            const NAME: &'static str = #name;

            fn fields() -> &'static [::jsonwire_core::Field<Self>] {
                const FIELDS: &[::jsonwire_core::Field<#ident>] = &[#(#rows),*];
                FIELDS
            }

            fn from_fields(
                fields: &::jsonwire_core::Fields<'_, Self>,
            ) -> ::jsonwire_core::Result<Self> {
                #construct
            }
        }

        impl ::jsonwire_core::WireValue for #ident {
            fn to_wire(
                &self,
                cx: &::jsonwire_core::EncodeContext<'_>,
            ) -> ::jsonwire_core::Result<::jsonwire_core::Value> {
                ::jsonwire_core::encode_shape(self, cx)
            }

            fn from_wire(value: &::jsonwire_core::Value) -> ::jsonwire_core::Result<Self> {
                ::jsonwire_core::decode_shape(value)
            }
        }
    })
}

/// `Option<T>` -> `Some(T)`
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

fn is_string(ty: &Type) -> bool {
    matches!(ty, Type::Path(path) if path.path.segments.last().is_some_and(|s| s.ident == "String"))
}
