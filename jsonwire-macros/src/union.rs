//! `#[derive(Union)]` expansion

use crate::attrs::{ContainerAttrs, VariantAttrs};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

pub fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Union cannot be derived for generic types",
        ));
    }

    let ident = &input.ident;
    let container = ContainerAttrs::parse(&input.attrs)?;
    let name = container.name.unwrap_or_else(|| ident.to_string());

    let data = match &input.data {
        Data::Enum(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "Union can only be derived for enums",
            ))
        }
    };

    let mut known = Vec::new();
    let mut keys = Vec::new();
    let mut unknown = None;

    for variant in &data.variants {
        let single = matches!(&variant.fields, Fields::Unnamed(f) if f.unnamed.len() == 1);
        if !single {
            return Err(syn::Error::new_spanned(
                variant,
                "Union variants must hold exactly one unnamed value",
            ));
        }

        let attrs = VariantAttrs::parse(&variant.attrs)?;
        if attrs.unknown {
            if unknown.is_some() {
                return Err(syn::Error::new_spanned(
                    variant,
                    "only one variant can be marked #[wire(unknown)]",
                ));
            }
            unknown = Some(&variant.ident);
            continue;
        }

        keys.push(attrs.rename.unwrap_or_else(|| variant.ident.to_string()));
        known.push(&variant.ident);
    }

    let unknown = unknown.ok_or_else(|| {
        syn::Error::new_spanned(
            ident,
            "Union requires a variant marked #[wire(unknown)] holding `UnknownVariant`",
        )
    })?;

    Ok(quote! {
        impl ::jsonwire_core::Union for #ident {
            const NAME: &'static str = #name;
            const VARIANTS: &'static [&'static str] = &[#(#keys),*];

            fn variant_key(&self) -> &str {
                match self {
                    #(Self::#known(_) => #keys,)*
                    Self::#unknown(variant) => &variant.key,
                }
            }

            fn encode_variant(
                &self,
                cx: &::jsonwire_core::EncodeContext<'_>,
            ) -> ::jsonwire_core::Result<::jsonwire_core::Value> {
                match self {
                    #(Self::#known(value) => ::jsonwire_core::WireValue::to_wire(value, cx),)*
                    Self::#unknown(variant) => Ok(variant.value.clone()),
                }
            }

            fn decode_variant(
                key: &str,
                value: &::jsonwire_core::Value,
            ) -> ::jsonwire_core::Result<Self> {
                match key {
                    #(#keys => ::jsonwire_core::WireValue::from_wire(value).map(Self::#known),)*
                    other => Ok(Self::#unknown(::jsonwire_core::UnknownVariant {
                        key: other.to_owned(),
                        value: value.clone(),
                    })),
                }
            }

            fn unknown(variant: ::jsonwire_core::UnknownVariant) -> Self {
                Self::#unknown(variant)
            }
        }

        impl ::jsonwire_core::WireValue for #ident {
            fn to_wire(
                &self,
                cx: &::jsonwire_core::EncodeContext<'_>,
            ) -> ::jsonwire_core::Result<::jsonwire_core::Value> {
                ::jsonwire_core::encode_union(self, cx)
            }

            fn from_wire(value: &::jsonwire_core::Value) -> ::jsonwire_core::Result<Self> {
                ::jsonwire_core::decode_union(value)
            }
        }
    })
}
