//! Proc macros for the config-migrator crate.
//!
//! This crate provides the `#[derive(Resource)]` macro

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, Expr, Lit, parse_macro_input, spanned::Spanned};

/// Options parsed from the `#[resource(...)]` attribute.
struct ResourceOptions {
    path: String,
    name: String,
}

impl ResourceOptions {
    fn from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut path = None;
        let mut name = None;

        for attr in attrs {
            if attr.path().is_ident("resource") {
                attr.parse_nested_meta(|meta| {
                    let key = if meta.path.is_ident("path") {
                        &mut path
                    } else if meta.path.is_ident("name") {
                        &mut name
                    } else {
                        return Err(syn::Error::new(
                            meta.path.span(),
                            format!("unknown resource attribute: {:?}", meta.path.get_ident()),
                        ));
                    };

                    let value: Expr = meta.value()?.parse()?;
                    match value {
                        Expr::Lit(expr_lit) => match expr_lit.lit {
                            Lit::Str(lit_str) => *key = Some(lit_str.value()),
                            other => {
                                return Err(syn::Error::new(
                                    other.span(),
                                    "resource attributes must be strings",
                                ));
                            }
                        },
                        other => {
                            return Err(syn::Error::new(
                                other.span(),
                                "resource attributes must be literals",
                            ));
                        }
                    }
                    Ok(())
                })?;
            }
        }

        let path = path.ok_or_else(|| {
            syn::Error::new(
                proc_macro2::Span::call_site(),
                "missing required attribute: #[resource(path = \"...\")]",
            )
        })?;

        let name = match name {
            Some(name) => name,
            None => path.rsplit(['/', '\\']).next().unwrap_or(&path).to_string(),
        };

        Ok(Self { path, name })
    }
}

/// Derive macro for the `Resource` trait.
///
/// Embeds the file at `path` (relative to the crate's `Cargo.toml`) into the
/// binary and registers it under `name`, so it can later be opened with
/// `BundledTemplate::new(name)`. `name` defaults to the file name of `path`.
///
/// # Example
///
/// ```rust,ignore
/// use config_migrator::Resource;
///
/// #[derive(Resource)]
/// #[resource(path = "resources/config.yml")]
/// struct DefaultConfig;
/// ```
///
/// This expands to roughly:
///
/// ```rust,ignore
/// impl config_migrator::Resource for DefaultConfig {
///     const NAME: &'static str = "config.yml";
///     const CONTENTS: &'static [u8] =
///         include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/", "resources/config.yml"));
/// }
///
/// config_migrator::inventory::submit! {
///     config_migrator::RegisteredResource::new::<DefaultConfig>()
/// }
/// ```
#[proc_macro_derive(Resource, attributes(resource))]
pub fn derive_resource(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_resource_impl(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_resource_impl(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let options = ResourceOptions::from_attrs(&input.attrs)?;
    let ident = &input.ident;
    let path = &options.path;
    let name = &options.name;

    Ok(quote! {
        impl ::config_migrator::Resource for #ident {
            const NAME: &'static str = #name;
            const CONTENTS: &'static [u8] =
                include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/", #path));
        }

        ::config_migrator::inventory::submit! {
            ::config_migrator::RegisteredResource::new::<#ident>()
        }
    })
}
