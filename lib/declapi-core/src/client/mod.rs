use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use tracing::debug;

mod builder;
pub use self::builder::ApiClientBuilder;

mod metadata;
pub use self::metadata::{
    ApiRequest, AuthScheme, BoundField, EndpointDescriptor, FieldBinding, FieldRole, FieldValue,
    HttpVerb, RawBytes,
};

mod path;

mod assembler;
pub use self::assembler::{AUTHORIZATION, AssembledRequest, AssemblyContext, RequestBody, assemble};

mod transport;
pub use self::transport::{HttpTransport, RawResponse, ReqwestTransport};

mod decode;
pub use self::decode::{decode, lenient_bool};

mod auth;
pub use self::auth::{CredentialsError, SecureString, basic_credentials};

mod error;
pub use self::error::{ApiClientError, RequestValidationError};

/// HTTP client sending declaratively described requests.
///
/// `ApiClient` holds the base URL, a default authorization key, and a shared
/// transport. Clones share the transport (and its connection pool) and the
/// default key: rotating the key on one clone is seen by all of them.
///
/// Use [`ApiClientBuilder`] to create instances.
///
/// # Example
///
/// ```rust,no_run
/// use declapi_core::{ApiClient, ApiRequest};
/// use serde::Deserialize;
///
/// #[derive(ApiRequest)]
/// #[method(verb = "GET", auth = "bearer")]
/// #[endpoint("/users/{id}")]
/// struct GetUser {
///     #[path_param]
///     id: u64,
///     #[auth_key(auto)]
///     token: Option<String>,
/// }
///
/// #[derive(Deserialize)]
/// struct User {
///     name: String,
/// }
///
/// # fn example() -> Result<(), declapi_core::ApiClientError> {
/// let client = ApiClient::builder()
///     .with_base_url("https://api.example.com")
///     .with_default_auth_key("my-api-token")
///     .build()?;
///
/// let user: User = client.send_as(&GetUser { id: 42, token: None })?;
/// # Ok(())
/// # }
/// ```
///
/// # Thread Safety
///
/// The default key is protected by a read-write lock; assembly works on a snapshot
/// of it, so concurrent sends never observe a partially rotated key.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Arc<str>,
    default_auth_key: Arc<RwLock<Option<SecureString>>>,
    transport: Arc<dyn HttpTransport>,
}

// Create
impl ApiClient {
    /// Creates a builder with the default configuration.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Creates a client for `base_url` without a default key.
    ///
    /// # Errors
    ///
    /// Fails when the base URL is not absolute.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiClientError> {
        Self::builder().with_base_url(base_url).build()
    }
}

// Configuration
impl ApiClient {
    /// The base URL, without trailing `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A copy of the current default authorization key.
    pub fn default_auth_key(&self) -> Option<SecureString> {
        self.default_auth_key.read().clone()
    }

    /// Replaces the default authorization key.
    pub fn set_default_auth_key(&self, key: impl Into<SecureString>) {
        let key = key.into();
        debug!(%key, "rotating default authorization key");
        *self.default_auth_key.write() = Some(key);
    }

    /// Removes the default authorization key.
    pub fn clear_default_auth_key(&self) {
        self.default_auth_key.write().take();
    }
}

// Send
impl ApiClient {
    /// Builds the request without sending it.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the instance violates its metadata.
    pub fn assemble<R>(&self, request: &R) -> Result<AssembledRequest, ApiClientError>
    where
        R: ApiRequest + ?Sized,
    {
        let default_key = self.default_auth_key();
        assemble(
            request,
            AssemblyContext {
                base_url: &self.base_url,
                default_key: default_key.as_ref(),
            },
        )
    }

    /// Sends the request and returns the status code and the response text.
    ///
    /// Non-2xx statuses are not errors.
    ///
    /// # Errors
    ///
    /// Returns a validation error before anything is sent, or a transport error.
    pub fn send_raw<R>(&self, request: &R) -> Result<RawResponse, ApiClientError>
    where
        R: ApiRequest + ?Sized,
    {
        let assembled = self.assemble(request)?;
        self.transport.execute(&assembled)
    }

    /// Sends the request and returns the response text.
    ///
    /// # Errors
    ///
    /// Returns a validation error before anything is sent, or a transport error.
    pub fn send<R>(&self, request: &R) -> Result<String, ApiClientError>
    where
        R: ApiRequest + ?Sized,
    {
        self.send_raw(request).map(|response| response.body)
    }

    /// Sends the request and decodes the response text into `T`.
    ///
    /// # Errors
    ///
    /// Returns a validation, transport, or decode error.
    pub fn send_as<T, R>(&self, request: &R) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
        R: ApiRequest + ?Sized,
    {
        let text = self.send(request)?;
        decode(&text)
    }
}
