//! `#[wire(...)]` attribute parsing

use syn::{Attribute, LitStr, Path};

/// Container attributes: `#[wire(name = "...")]`
#[derive(Default)]
pub struct ContainerAttrs {
    pub name: Option<String>,
}

impl ContainerAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("wire")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    out.name = Some(meta.value()?.parse::<LitStr>()?.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported container attribute, expected `name`"))
                }
            })?;
        }
        Ok(out)
    }
}

/// Member attributes
#[derive(Default)]
pub struct FieldAttrs {
    /// `rename = "WireName"`
    pub rename: Option<String>,
    /// `alias = "other"`, repeatable
    pub aliases: Vec<String>,
    /// `with = "module::path"`: a module exposing `encode` and `decode`
    pub with: Option<Path>,
    /// `idempotency_token`
    pub idempotency_token: bool,
}

impl FieldAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("wire")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    out.rename = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("alias") {
                    out.aliases.push(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("with") {
                    out.with = Some(meta.value()?.parse::<LitStr>()?.parse::<Path>()?);
                } else if meta.path.is_ident("idempotency_token") {
                    out.idempotency_token = true;
                } else {
                    return Err(meta.error(
                        "unsupported field attribute, expected `rename`, `alias`, `with` or `idempotency_token`",
                    ));
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

/// Variant attributes
#[derive(Default)]
pub struct VariantAttrs {
    pub rename: Option<String>,
    /// Marks the variant holding `UnknownVariant`
    pub unknown: bool,
}

impl VariantAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("wire")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    out.rename = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("unknown") {
                    out.unknown = true;
                } else {
                    return Err(meta.error("unsupported variant attribute, expected `rename` or `unknown`"));
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

/// `role_arn` -> `RoleArn`
pub fn pascal_case(member: &str) -> String {
    member
        .trim_start_matches("r#")
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("arn"), "Arn");
        assert_eq!(pascal_case("role_arn"), "RoleArn");
        assert_eq!(pascal_case("max_results"), "MaxResults");
        assert_eq!(pascal_case("r#type"), "Type");
        assert_eq!(pascal_case("dead_letter_arns"), "DeadLetterArns");
    }
}
