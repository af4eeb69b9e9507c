//! Request assembly: turns an [`ApiRequest`] instance into an [`AssembledRequest`].
//!
//! Fields are walked in declaration order, and the roles of each field in the order
//! they were declared. That order is visible: it drives the query string and the
//! header list.

use indexmap::IndexMap;
use tracing::debug;

use super::auth::SecureString;
use super::error::RequestValidationError;
use super::metadata::{ApiRequest, AuthScheme, FieldRole, FieldValue, HttpVerb};
use super::path::{QueryString, encode_component, replace_path_param, unresolved_params};
use super::ApiClientError;

/// Name of the header carrying the authorization key.
pub const AUTHORIZATION: &str = "Authorization";

/// Body of an assembled request.
#[derive(Clone, PartialEq, Eq, Default, derive_more::Debug)]
pub enum RequestBody {
    /// No body, always the case for `GET`.
    #[default]
    Empty,
    /// JSON object built from the non-unique body fields.
    Json(String),
    /// Unique body field rendered as text.
    Text(String),
    /// Unique body field holding raw bytes.
    #[debug("Bytes({} bytes)", _0.len())]
    Bytes(Vec<u8>),
}

impl RequestBody {
    /// Whether the request carries no body.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The body content, if any.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Empty => None,
            Self::Json(text) | Self::Text(text) => Some(text.as_bytes()),
            Self::Bytes(bytes) => Some(bytes),
        }
    }
}

/// A fully resolved request, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledRequest {
    verb: HttpVerb,
    url: String,
    headers: Vec<(String, String)>,
    body: RequestBody,
}

impl AssembledRequest {
    /// Creates a request from already resolved parts.
    ///
    /// Mostly useful to exercise a custom [`HttpTransport`](crate::HttpTransport).
    pub fn new(
        verb: HttpVerb,
        url: impl Into<String>,
        headers: Vec<(String, String)>,
        body: RequestBody,
    ) -> Self {
        Self {
            verb,
            url: url.into(),
            headers,
            body,
        }
    }

    /// HTTP verb.
    pub fn verb(&self) -> HttpVerb {
        self.verb
    }

    /// Base URL, substituted path, and query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Headers, in field declaration order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body to send.
    pub fn body(&self) -> &RequestBody {
        &self.body
    }
}

/// What the assembler needs from the client.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyContext<'a> {
    /// Prefix of every URL.
    pub base_url: &'a str,
    /// Fallback for `auto` auth key fields.
    pub default_key: Option<&'a SecureString>,
}

/// Builds the request described by `request`.
///
/// # Errors
///
/// Returns a validation error when the instance violates its metadata,
/// or a serialization error when a field value cannot be converted.
pub fn assemble<R>(request: &R, context: AssemblyContext<'_>) -> Result<AssembledRequest, ApiClientError>
where
    R: ApiRequest + ?Sized,
{
    let request_name = R::request_name();
    let descriptor = R::descriptor().ok_or(RequestValidationError::MissingDescriptor {
        request: request_name,
    })?;

    let mut path = descriptor.path.to_string();
    let mut query = QueryString::default();
    let mut headers = Vec::new();
    let mut json_body = IndexMap::new();
    let mut unique_body: Option<RequestBody> = None;
    let mut auth_added = false;

    for field in request.fields()? {
        let binding = field.binding;
        let value = &field.value;

        for role in binding.roles {
            match *role {
                FieldRole::BodyParam { keep_value: true } => {
                    if unique_body.is_some() {
                        return Err(RequestValidationError::DuplicateUniqueBody {
                            request: request_name,
                            field: binding.name,
                        }
                        .into());
                    }
                    let body = match value {
                        FieldValue::Bytes(bytes) => RequestBody::Bytes(bytes.clone()),
                        FieldValue::Null if binding.raw_bytes => RequestBody::Bytes(Vec::new()),
                        other => RequestBody::Text(other.to_text()),
                    };
                    unique_body = Some(body);
                }
                FieldRole::BodyParam { keep_value: false } => {
                    if !value.is_null() {
                        json_body.insert(binding.name, value.to_json());
                    }
                }
                FieldRole::PathParam => {
                    let encoded = encode_component(&value.to_text());
                    path = replace_path_param(&path, binding.name, &encoded);
                }
                FieldRole::QueryParam { name } => {
                    query.push(name.unwrap_or(binding.name), &value.to_text());
                }
                FieldRole::Header { name } => {
                    if value.is_null() {
                        if !binding.nullable {
                            return Err(RequestValidationError::NullHeaderNotNullable {
                                request: request_name,
                                field: binding.name,
                            }
                            .into());
                        }
                        continue;
                    }
                    let header_name = name.unwrap_or(binding.name);
                    headers.push((header_name.to_string(), value.to_text()));
                }
                FieldRole::AuthKey { auto } => {
                    if descriptor.auth == AuthScheme::None {
                        continue;
                    }
                    let key = if value.is_null() {
                        if !auto {
                            return Err(RequestValidationError::AuthKeyRequired {
                                request: request_name,
                                field: Some(binding.name),
                            }
                            .into());
                        }
                        let default_key =
                            context
                                .default_key
                                .ok_or(RequestValidationError::DefaultKeyUnset {
                                    request: request_name,
                                    field: binding.name,
                                })?;
                        default_key.as_str().to_string()
                    } else {
                        value.to_text()
                    };
                    let header_value = format!("{} {key}", descriptor.auth.label());
                    headers.push((AUTHORIZATION.to_string(), header_value));
                    auth_added = true;
                }
            }
        }
    }

    if descriptor.auth.is_required() && !auth_added {
        return Err(RequestValidationError::AuthKeyRequired {
            request: request_name,
            field: None,
        }
        .into());
    }

    let unresolved = unresolved_params(&path);
    if !unresolved.is_empty() {
        debug!(request = request_name, ?unresolved, "path placeholders left untouched");
    }

    let body = match descriptor.verb {
        HttpVerb::Get => RequestBody::Empty,
        HttpVerb::Post | HttpVerb::Put => match unique_body {
            Some(body) => body,
            None => RequestBody::Json(serde_json::to_string(&json_body).map_err(|error| {
                ApiClientError::Serialization {
                    field: "body",
                    error,
                }
            })?),
        },
    };

    let url = [context.base_url, &path, query.as_str()].concat();

    Ok(AssembledRequest {
        verb: descriptor.verb,
        url,
        headers,
        body,
    })
}
