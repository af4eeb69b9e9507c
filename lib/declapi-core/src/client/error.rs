/// Errors raised while checking a request instance against its declared metadata.
///
/// These are always produced before any network activity: fixing the request
/// instance (or its attributes) is enough to recover.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum RequestValidationError {
    /// The request type has no endpoint descriptor.
    ///
    /// With the derive macro, both `#[method(..)]` and `#[endpoint(..)]` are required.
    #[display("Request '{request}' requires both a method and an endpoint declaration")]
    MissingDescriptor {
        /// Name of the request type.
        request: &'static str,
    },

    /// More than one body field is marked `keep_value`.
    #[display("Request '{request}' has several unique body fields, '{field}' is one too many")]
    DuplicateUniqueBody {
        /// Name of the request type.
        request: &'static str,
        /// The second field claiming the unique body.
        field: &'static str,
    },

    /// A header field holds no value and is not marked `#[nullable]`.
    #[display("Header field '{field}' of '{request}' is null but not marked as nullable")]
    NullHeaderNotNullable {
        /// Name of the request type.
        request: &'static str,
        /// The offending header field.
        field: &'static str,
    },

    /// The endpoint requires authorization but no key could be provided.
    ///
    /// `field` is `None` when the request type has no auth key field at all.
    #[display("Request '{request}' requires an authorization key{}", display_field(field))]
    AuthKeyRequired {
        /// Name of the request type.
        request: &'static str,
        /// The auth key field holding no value, if any.
        field: Option<&'static str>,
    },

    /// An `auto` auth key field fell back to the default key, but none is configured.
    #[display("Field '{field}' of '{request}' falls back to the default authorization key, which is not set")]
    DefaultKeyUnset {
        /// Name of the request type.
        request: &'static str,
        /// The auto auth key field.
        field: &'static str,
    },
}

fn display_field(field: &Option<&'static str>) -> String {
    field
        .map(|name| format!(" (field '{name}' is null)"))
        .unwrap_or_default()
}

/// Errors that can occur when using the [`ApiClient`](crate::ApiClient).
///
/// Variants fall into three classes: validation failures raised before the request
/// is sent, transport failures while exchanging with the server, and decode failures
/// when the response does not fit the requested type.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ApiClientError {
    /// The request instance violates its declared metadata.
    #[display("Invalid request: {_0}")]
    Validation(RequestValidationError),

    /// A field value could not be converted to JSON.
    #[display("Failed to serialize field '{field}': {error}")]
    #[from(skip)]
    Serialization {
        /// The field being converted.
        field: &'static str,
        /// The underlying serialization error.
        error: serde_json::Error,
    },

    /// The configured base URL is not an absolute URL.
    #[display("Invalid base URL '{url}': {error}")]
    #[from(skip)]
    InvalidBaseUrl {
        /// The rejected base URL.
        url: String,
        /// The parse error.
        error: url::ParseError,
    },

    /// The assembled URL could not be parsed.
    UrlError(url::ParseError),

    /// A header field name is not a valid HTTP header name.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// A header field value contains characters not allowed in HTTP headers.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// HTTP client error from the underlying reqwest library.
    ///
    /// Occurs when the connection fails, times out, or the response body cannot be read.
    #[display("Transport error: {_0}")]
    Transport(reqwest::Error),

    /// The response text does not fit the requested type.
    #[display("Failed to decode '{target}' at '{path}': {error}\n{body}")]
    #[from(skip)]
    Decode {
        /// Name of the requested type.
        target: &'static str,
        /// JSON path where decoding failed.
        path: String,
        /// The underlying JSON error.
        error: serde_json::Error,
        /// The response text that failed to decode.
        body: String,
    },
}

impl ApiClientError {
    /// Returns `true` when the request was rejected before being sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Serialization { .. })
    }

    /// Returns `true` for network or IO failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns `true` when the response could not be decoded.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Returns the validation error, if this is one.
    pub fn as_validation(&self) -> Option<&RequestValidationError> {
        match self {
            Self::Validation(error) => Some(error),
            _ => None,
        }
    }
}
