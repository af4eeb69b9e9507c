//! Derive macro for declapi request types.
//!
//! `#[derive(ApiRequest)]` builds the binding table of a struct with named fields
//! from its attributes.
//!
//! # Type attributes
//!
//! - `#[method(verb = "POST", auth = "bearer")]`: HTTP verb (`GET`, `POST`, `PUT`,
//!   default `GET`) and authorization requirement (`none`, `bearer`, `basic`, default `none`)
//! - `#[endpoint("/users/{id}")]`: path template
//!
//! Both are needed for the request to be sent, without them the request fails
//! at runtime with a missing descriptor error.
//!
//! # Field attributes
//!
//! - `#[path_param]`: substitutes `{field}` in the path template
//! - `#[query_param]` / `#[query_param(name = "q")]`: appended to the query string
//! - `#[body_param]` / `#[body_param(keep_value)]`: JSON body member, or the whole body;
//!   add `bytes` (`#[body_param(keep_value, bytes)]`) when the field type is a byte
//!   sequence the macro cannot recognize by name, e.g. an alias or a newtype implementing `RawBytes`
//! - `#[header]` / `#[header(name = "X-Trace")]`: request header
//! - `#[auth_key]` / `#[auth_key(auto)]`: authorization key, `auto` falls back to the client default key
//! - `#[nullable]`: allows a header field to hold no value
//!
//! A field may carry several role attributes, they are applied in attribute order.
//! Fields without role attributes are not part of the request.
//!
//! ```ignore
//! #[derive(ApiRequest)]
//! #[method(verb = "PUT", auth = "bearer")]
//! #[endpoint("/files/{id}")]
//! struct UploadFile {
//!     #[path_param]
//!     id: u64,
//!     #[body_param(keep_value)]
//!     content: Vec<u8>,
//!     #[header(name = "X-Trace")]
//!     #[nullable]
//!     trace: Option<String>,
//!     #[auth_key(auto)]
//!     token: Option<String>,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    Attribute, Data, DeriveInput, Field, Fields, GenericArgument, Ident, LitStr, Meta,
    PathArguments, Type, parse_macro_input,
};

/// Derives `declapi_core::ApiRequest`.
///
/// See the crate documentation for the supported attributes.
#[proc_macro_derive(
    ApiRequest,
    attributes(
        method,
        endpoint,
        path_param,
        query_param,
        body_param,
        header,
        auth_key,
        nullable
    )
)]
pub fn derive_api_request(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match impl_derive_api_request(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Parsed `#[method(..)]` attribute.
struct MethodAttrs {
    verb: Ident,
    auth: Ident,
}

/// Parsed field roles and modifiers.
struct FieldAttrs {
    roles: Vec<TokenStream2>,
    nullable: bool,
    bytes: bool,
}

fn impl_derive_api_request(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let request_name = struct_name.unraw().to_string();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "ApiRequest derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "ApiRequest derive only supports structs",
            ));
        }
    };

    let method = parse_method_attrs(&input.attrs)?;
    let endpoint = parse_endpoint_attr(&input.attrs)?;

    let descriptor = match (method, endpoint) {
        (Some(MethodAttrs { verb, auth }), Some(path)) => quote! {
            ::core::option::Option::Some(
                ::declapi_core::EndpointDescriptor::new(#path)
                    .with_verb(::declapi_core::HttpVerb::#verb)
                    .with_auth(::declapi_core::AuthScheme::#auth)
            )
        },
        _ => quote! { ::core::option::Option::None },
    };

    let mut bound_fields = Vec::new();
    for field in fields {
        let attrs = parse_field_attrs(field)?;
        if attrs.roles.is_empty() {
            continue;
        }
        bound_fields.push(generate_bound_field(field, &attrs));
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::declapi_core::ApiRequest for #struct_name #ty_generics #where_clause {
            fn request_name() -> &'static str {
                #request_name
            }

            fn descriptor() -> ::core::option::Option<::declapi_core::EndpointDescriptor> {
                #descriptor
            }

            fn fields(
                &self,
            ) -> ::core::result::Result<
                ::std::vec::Vec<::declapi_core::BoundField>,
                ::declapi_core::ApiClientError,
            > {
                ::core::result::Result::Ok(::std::vec![#(#bound_fields),*])
            }
        }
    })
}

fn parse_method_attrs(attrs: &[Attribute]) -> syn::Result<Option<MethodAttrs>> {
    let mut result = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("method")) {
        if result.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate #[method] attribute"));
        }

        let mut verb = Ident::new("Get", Span::call_site());
        let mut auth = Ident::new("None", Span::call_site());

        if let Meta::List(_) = &attr.meta {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("verb") {
                    let value: LitStr = meta.value()?.parse()?;
                    let variant = match value.value().to_ascii_uppercase().as_str() {
                        "GET" => "Get",
                        "POST" => "Post",
                        "PUT" => "Put",
                        _ => {
                            return Err(syn::Error::new_spanned(
                                &value,
                                "unsupported verb, expected \"GET\", \"POST\", or \"PUT\"",
                            ));
                        }
                    };
                    verb = Ident::new(variant, value.span());
                    Ok(())
                } else if meta.path.is_ident("auth") {
                    let value: LitStr = meta.value()?.parse()?;
                    let variant = match value.value().to_ascii_lowercase().as_str() {
                        "none" => "None",
                        "bearer" => "Bearer",
                        "basic" => "Basic",
                        _ => {
                            return Err(syn::Error::new_spanned(
                                &value,
                                "unsupported auth, expected \"none\", \"bearer\", or \"basic\"",
                            ));
                        }
                    };
                    auth = Ident::new(variant, value.span());
                    Ok(())
                } else {
                    Err(meta.error("unsupported #[method] key, expected `verb` or `auth`"))
                }
            })?;
        }

        result = Some(MethodAttrs { verb, auth });
    }

    Ok(result)
}

fn parse_endpoint_attr(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut result = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("endpoint")) {
        if result.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate #[endpoint] attribute"));
        }
        let path: LitStr = attr.parse_args()?;
        result = Some(path);
    }

    Ok(result)
}

fn parse_field_attrs(field: &Field) -> syn::Result<FieldAttrs> {
    let mut roles = Vec::new();
    let mut nullable = false;
    let mut bytes = false;

    for attr in &field.attrs {
        let path = attr.path();
        if path.is_ident("path_param") {
            attr.meta.require_path_only()?;
            roles.push(quote! { ::declapi_core::FieldRole::PathParam });
        } else if path.is_ident("query_param") {
            let name = parse_optional_name(attr, "query_param")?;
            let name = option_tokens(name.as_ref());
            roles.push(quote! { ::declapi_core::FieldRole::QueryParam { name: #name } });
        } else if path.is_ident("header") {
            let name = parse_optional_name(attr, "header")?;
            let name = option_tokens(name.as_ref());
            roles.push(quote! { ::declapi_core::FieldRole::Header { name: #name } });
        } else if path.is_ident("body_param") {
            let (keep_value, raw_bytes) = parse_body_param(attr)?;
            bytes |= raw_bytes;
            roles.push(quote! { ::declapi_core::FieldRole::BodyParam { keep_value: #keep_value } });
        } else if path.is_ident("auth_key") {
            let auto = parse_optional_flag(attr, "auto")?;
            roles.push(quote! { ::declapi_core::FieldRole::AuthKey { auto: #auto } });
        } else if path.is_ident("nullable") {
            attr.meta.require_path_only()?;
            nullable = true;
        }
    }

    Ok(FieldAttrs {
        roles,
        nullable,
        bytes,
    })
}

/// Parses `#[attr]` or `#[attr(name = "...")]`.
fn parse_optional_name(attr: &Attribute, attr_name: &str) -> syn::Result<Option<LitStr>> {
    let mut name = None;
    if let Meta::List(_) = &attr.meta {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error(format!("unsupported #[{attr_name}] key, expected `name`")))
            }
        })?;
    }
    Ok(name)
}

/// Parses `#[attr]` or `#[attr(flag)]`.
fn parse_optional_flag(attr: &Attribute, flag: &str) -> syn::Result<bool> {
    let mut result = false;
    if let Meta::List(_) = &attr.meta {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(flag) {
                result = true;
                Ok(())
            } else {
                Err(meta.error(format!("unsupported flag, expected `{flag}`")))
            }
        })?;
    }
    Ok(result)
}

/// Parses `#[body_param]`, with the optional `keep_value` and `bytes` flags.
fn parse_body_param(attr: &Attribute) -> syn::Result<(bool, bool)> {
    let mut keep_value = false;
    let mut bytes = false;
    if let Meta::List(_) = &attr.meta {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("keep_value") {
                keep_value = true;
                Ok(())
            } else if meta.path.is_ident("bytes") {
                bytes = true;
                Ok(())
            } else {
                Err(meta.error("unsupported flag, expected `keep_value` or `bytes`"))
            }
        })?;
    }
    Ok((keep_value, bytes))
}

fn option_tokens(value: Option<&LitStr>) -> TokenStream2 {
    match value {
        Some(value) => quote! { ::core::option::Option::Some(#value) },
        None => quote! { ::core::option::Option::None },
    }
}

fn generate_bound_field(field: &Field, attrs: &FieldAttrs) -> TokenStream2 {
    let Some(field_ident) = &field.ident else {
        return syn::Error::new_spanned(field, "expected a named field").to_compile_error();
    };
    let field_name = field_ident.unraw().to_string();
    let roles = &attrs.roles;

    let raw_bytes = attrs.bytes || is_byte_type(&field.ty);

    let mut binding = quote! { ::declapi_core::FieldBinding::new(#field_name, &[#(#roles),*]) };
    if attrs.nullable {
        binding = quote! { #binding.nullable() };
    }
    if raw_bytes {
        binding = quote! { #binding.raw_bytes() };
    }

    let value = if raw_bytes {
        quote! { ::declapi_core::FieldValue::from_bytes(&self.#field_ident) }
    } else {
        quote! {
            ::declapi_core::FieldValue::from_serialize(&self.#field_ident).map_err(|error| {
                ::declapi_core::ApiClientError::Serialization {
                    field: BINDING.name,
                    error,
                }
            })?
        }
    };

    quote! {
        {
            const BINDING: ::declapi_core::FieldBinding = #binding;
            ::declapi_core::BoundField::new(BINDING, #value)
        }
    }
}

/// Recognizes `Vec<u8>`, `[u8; N]`, `[u8]`, `Bytes`, and references or `Option` of those.
fn is_byte_type(ty: &Type) -> bool {
    match ty {
        Type::Array(array) => is_u8(&array.elem),
        Type::Slice(slice) => is_u8(&slice.elem),
        Type::Reference(reference) => is_byte_type(&reference.elem),
        Type::Paren(paren) => is_byte_type(&paren.elem),
        Type::Group(group) => is_byte_type(&group.elem),
        Type::Path(type_path) => {
            let Some(segment) = type_path.path.segments.last() else {
                return false;
            };
            match segment.ident.to_string().as_str() {
                "Bytes" => true,
                "Vec" => first_type_argument(&segment.arguments).is_some_and(is_u8),
                "Option" => first_type_argument(&segment.arguments).is_some_and(is_byte_type),
                _ => false,
            }
        }
        _ => false,
    }
}

fn is_u8(ty: &Type) -> bool {
    matches!(ty, Type::Path(type_path) if type_path.qself.is_none() && type_path.path.is_ident("u8"))
}

fn first_type_argument(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(arguments) = arguments else {
        return None;
    };
    arguments.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}
