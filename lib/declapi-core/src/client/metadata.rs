use serde::Serialize;

use super::ApiClientError;

/// HTTP verb of an endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display)]
pub enum HttpVerb {
    /// `GET`, any computed body is dropped.
    #[default]
    #[display("GET")]
    Get,
    /// `POST`
    #[display("POST")]
    Post,
    /// `PUT`
    #[display("PUT")]
    Put,
}

impl From<HttpVerb> for http::Method {
    fn from(value: HttpVerb) -> Self {
        match value {
            HttpVerb::Get => Self::GET,
            HttpVerb::Post => Self::POST,
            HttpVerb::Put => Self::PUT,
        }
    }
}

/// Authorization requirement of an endpoint.
///
/// Anything but [`AuthScheme::None`] makes an `Authorization: <scheme> <key>` header mandatory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AuthScheme {
    /// No authorization header.
    #[default]
    None,
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `Authorization: Basic <key>`, see [`basic_credentials`](crate::basic_credentials).
    Basic,
}

impl AuthScheme {
    /// The scheme label put in front of the key.
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Bearer => "Bearer",
            Self::Basic => "Basic",
        }
    }

    /// Whether this scheme requires an authorization key.
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Type-level metadata of a request: verb, auth requirement, and path template.
///
/// The path template may contain `{name}` placeholders, substituted by path parameter fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    /// HTTP verb.
    pub verb: HttpVerb,
    /// Authorization requirement.
    pub auth: AuthScheme,
    /// Path template, e.g. `/users/{id}`.
    pub path: &'static str,
}

impl EndpointDescriptor {
    /// Creates a `GET` endpoint without authorization.
    pub const fn new(path: &'static str) -> Self {
        Self {
            verb: HttpVerb::Get,
            auth: AuthScheme::None,
            path,
        }
    }

    /// Sets the HTTP verb.
    #[must_use]
    pub const fn with_verb(mut self, verb: HttpVerb) -> Self {
        self.verb = verb;
        self
    }

    /// Sets the authorization requirement.
    #[must_use]
    pub const fn with_auth(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }
}

/// Role of a field in the assembled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Substitutes `{field_name}` in the path template.
    PathParam,
    /// Appended to the query string.
    QueryParam {
        /// External name, defaults to the field name.
        name: Option<&'static str>,
    },
    /// Member of the JSON body, or the whole body when `keep_value` is set.
    BodyParam {
        /// Marks the field as the unique raw body.
        keep_value: bool,
    },
    /// Sent as a request header.
    Header {
        /// Header name, defaults to the field name.
        name: Option<&'static str>,
    },
    /// Authorization key, only used when the endpoint requires authorization.
    AuthKey {
        /// Fall back to the client default key when the field holds no value.
        auto: bool,
    },
}

/// Field-level metadata: name, roles (in declaration order), nullability, and value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBinding {
    /// Field name, as declared.
    pub name: &'static str,
    /// Roles of the field, processed in order.
    pub roles: &'static [FieldRole],
    /// Allows a null header value (the header is then left out).
    pub nullable: bool,
    /// The field holds a byte sequence: a null unique body is sent as empty bytes.
    pub raw_bytes: bool,
}

impl FieldBinding {
    /// Creates a non-nullable binding.
    pub const fn new(name: &'static str, roles: &'static [FieldRole]) -> Self {
        Self {
            name,
            roles,
            nullable: false,
            raw_bytes: false,
        }
    }

    /// Marks the binding as nullable.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the binding as holding raw bytes.
    #[must_use]
    pub const fn raw_bytes(mut self) -> Self {
        self.raw_bytes = true;
        self
    }
}

/// Runtime value of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// No value (`Option::None` or JSON `null`).
    Null,
    /// Raw byte sequence.
    Bytes(Vec<u8>),
    /// Any other value, in its JSON form.
    Json(serde_json::Value),
}

impl FieldValue {
    /// Converts a serializable value, `None` and unit become [`FieldValue::Null`].
    ///
    /// # Errors
    ///
    /// Fails when the value cannot be represented as JSON (e.g. maps with non-string keys).
    pub fn from_serialize<T>(value: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value)?;
        let result = if value.is_null() {
            Self::Null
        } else {
            Self::Json(value)
        };
        Ok(result)
    }

    /// Converts a raw byte sequence, absent bytes become [`FieldValue::Null`].
    pub fn from_bytes<T>(value: &T) -> Self
    where
        T: RawBytes + ?Sized,
    {
        value
            .raw_bytes()
            .map_or(Self::Null, |bytes| Self::Bytes(bytes.to_vec()))
    }

    /// Whether the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Textual form used in paths, query strings, headers, and unique text bodies.
    ///
    /// Strings are used verbatim, arrays are joined with `,`, objects are rendered
    /// as compact JSON, bytes as lossy UTF-8, and null as an empty string.
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Self::Json(value) => json_to_text(value),
        }
    }

    /// JSON form used as a member of the body object.
    pub(crate) fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bytes(bytes) => serde_json::Value::from(bytes.as_slice()),
            Self::Json(value) => value.clone(),
        }
    }
}

fn json_to_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Bool(flag) => flag.to_string(),
        serde_json::Value::Number(number) => number.to_string(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(json_to_text)
            .collect::<Vec<_>>()
            .join(","),
        serde_json::Value::Object(_) => value.to_string(),
    }
}

/// Types holding a raw byte sequence.
///
/// Fields of these types are sent verbatim when marked as the unique body.
/// The derive macro recognizes `Vec<u8>`, `[u8; N]`, `Bytes`, and `Option` of those.
/// Other implementors (aliases, newtypes) are marked with `#[body_param(bytes)]`.
pub trait RawBytes {
    /// The bytes, if any.
    fn raw_bytes(&self) -> Option<&[u8]>;
}

impl RawBytes for [u8] {
    fn raw_bytes(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl<const N: usize> RawBytes for [u8; N] {
    fn raw_bytes(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl RawBytes for Vec<u8> {
    fn raw_bytes(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl RawBytes for bytes::Bytes {
    fn raw_bytes(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl<T> RawBytes for Option<T>
where
    T: RawBytes,
{
    fn raw_bytes(&self) -> Option<&[u8]> {
        self.as_ref().and_then(RawBytes::raw_bytes)
    }
}

impl<T> RawBytes for &T
where
    T: RawBytes + ?Sized,
{
    fn raw_bytes(&self) -> Option<&[u8]> {
        (**self).raw_bytes()
    }
}

/// A field binding together with the value read from an instance.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundField {
    /// Field metadata.
    pub binding: FieldBinding,
    /// Field value.
    pub value: FieldValue,
}

impl BoundField {
    /// Binds a value to its metadata.
    pub fn new(binding: FieldBinding, value: FieldValue) -> Self {
        Self { binding, value }
    }
}

/// A request type: endpoint metadata plus per-field bindings.
///
/// Usually derived with `#[derive(ApiRequest)]`, but can be written by hand:
///
/// ```rust
/// use declapi_core::{
///     ApiClientError, ApiRequest, AuthScheme, BoundField, EndpointDescriptor, FieldBinding,
///     FieldRole, FieldValue, HttpVerb,
/// };
///
/// struct GetUser {
///     id: u64,
///     token: Option<String>,
/// }
///
/// const ID: FieldBinding = FieldBinding::new("id", &[FieldRole::PathParam]);
/// const TOKEN: FieldBinding = FieldBinding::new("token", &[FieldRole::AuthKey { auto: true }]);
///
/// impl ApiRequest for GetUser {
///     fn descriptor() -> Option<EndpointDescriptor> {
///         Some(EndpointDescriptor::new("/users/{id}").with_auth(AuthScheme::Bearer))
///     }
///
///     fn fields(&self) -> Result<Vec<BoundField>, ApiClientError> {
///         Ok(vec![
///             BoundField::new(ID, FieldValue::from_serialize(&self.id).map_err(|error| {
///                 ApiClientError::Serialization { field: ID.name, error }
///             })?),
///             BoundField::new(TOKEN, FieldValue::from_serialize(&self.token).map_err(|error| {
///                 ApiClientError::Serialization { field: TOKEN.name, error }
///             })?),
///         ])
///     }
/// }
/// ```
pub trait ApiRequest {
    /// Name used in error messages.
    fn request_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// The endpoint descriptor, `None` when the type lacks endpoint metadata.
    fn descriptor() -> Option<EndpointDescriptor>;

    /// The bound fields, in declaration order.
    ///
    /// # Errors
    ///
    /// Fails when a field value cannot be converted.
    fn fields(&self) -> Result<Vec<BoundField>, ApiClientError>;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case::string(json!("hello world"), "hello world")]
    #[case::integer(json!(42), "42")]
    #[case::float(json!(1.5), "1.5")]
    #[case::boolean(json!(true), "true")]
    #[case::array(json!(["rust", "web", 3]), "rust,web,3")]
    #[case::object(json!({"a": 1}), r#"{"a":1}"#)]
    fn should_render_json_as_text(#[case] value: serde_json::Value, #[case] expected: &str) {
        assert_eq!(FieldValue::Json(value).to_text(), expected);
    }

    #[test]
    fn should_convert_none_to_null() {
        let value: Option<String> = None;
        let field = FieldValue::from_serialize(&value).expect("serialize");
        assert!(field.is_null());
        assert_eq!(field.to_text(), "");
    }

    #[test]
    fn should_convert_bytes() {
        let raw = vec![0xCA, 0xFE];
        assert_eq!(FieldValue::from_bytes(&raw), FieldValue::Bytes(vec![0xCA, 0xFE]));

        let absent: Option<Vec<u8>> = None;
        assert_eq!(FieldValue::from_bytes(&absent), FieldValue::Null);

        let fixed = *b"abc";
        assert_eq!(FieldValue::from_bytes(&fixed).to_text(), "abc");

        let shared = bytes::Bytes::from_static(b"xyz");
        assert_eq!(FieldValue::from_bytes(&shared), FieldValue::Bytes(b"xyz".to_vec()));
    }

    #[test]
    fn should_expose_auth_labels() {
        assert_eq!(AuthScheme::None.label(), "");
        assert_eq!(AuthScheme::Bearer.label(), "Bearer");
        assert_eq!(AuthScheme::Basic.label(), "Basic");
        assert!(!AuthScheme::None.is_required());
        assert!(AuthScheme::Basic.is_required());
    }

    #[test]
    fn should_build_descriptor() {
        const DESCRIPTOR: EndpointDescriptor = EndpointDescriptor::new("/users/{id}")
            .with_verb(HttpVerb::Put)
            .with_auth(AuthScheme::Bearer);

        assert_eq!(DESCRIPTOR.verb, HttpVerb::Put);
        assert_eq!(DESCRIPTOR.auth, AuthScheme::Bearer);
        assert_eq!(DESCRIPTOR.path, "/users/{id}");
        assert_eq!(http::Method::from(DESCRIPTOR.verb), http::Method::PUT);
        assert_eq!(HttpVerb::Post.to_string(), "POST");
    }
}
