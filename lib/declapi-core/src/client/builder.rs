use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use url::Url;

use super::auth::SecureString;
use super::transport::{HttpTransport, ReqwestTransport};
use super::{ApiClient, ApiClientError};

/// Builder for creating [`ApiClient`] instances.
///
/// # Default Configuration
///
/// - **Base URL**: `http://127.0.0.1`
/// - **Default authorization key**: none
/// - **Timeout**: none (reqwest default)
/// - **Transport**: a [`ReqwestTransport`] over a fresh blocking client
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use declapi_core::ApiClient;
///
/// # fn example() -> Result<(), declapi_core::ApiClientError> {
/// let client = ApiClient::builder()
///     .with_base_url("https://api.example.com/v1")
///     .with_default_auth_key("my-api-token")
///     .with_timeout(Duration::from_secs(10))
///     .with_user_agent("my-app/1.0")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ApiClientBuilder {
    base_url: String,
    default_auth_key: Option<SecureString>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1".to_string(),
            default_auth_key: None,
            timeout: None,
            user_agent: None,
            transport: None,
        }
    }
}

impl ApiClientBuilder {
    /// Builds the final `ApiClient`.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    /// - the base URL is not an absolute URL
    /// - the underlying reqwest client cannot be created (e.g. TLS backend initialization)
    pub fn build(self) -> Result<ApiClient, ApiClientError> {
        let Self {
            base_url,
            default_auth_key,
            timeout,
            user_agent,
            transport,
        } = self;

        Url::parse(&base_url).map_err(|error| ApiClientError::InvalidBaseUrl {
            url: base_url.clone(),
            error,
        })?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let transport = match transport {
            Some(transport) => transport,
            None => {
                let mut builder = reqwest::blocking::Client::builder();
                if let Some(timeout) = timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(user_agent) = user_agent {
                    builder = builder.user_agent(user_agent);
                }
                Arc::new(ReqwestTransport::new(builder.build()?))
            }
        };

        Ok(ApiClient {
            base_url: Arc::from(base_url),
            default_auth_key: Arc::new(RwLock::new(default_auth_key)),
            transport,
        })
    }

    /// Sets the base URL, prefixed to every endpoint path.
    ///
    /// A trailing `/` is removed, endpoint templates are expected to start with `/`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the key used by `auto` auth key fields holding no value.
    ///
    /// It can be rotated later with [`ApiClient::set_default_auth_key`].
    #[must_use]
    pub fn with_default_auth_key(mut self, key: impl Into<SecureString>) -> Self {
        self.default_auth_key = Some(key.into());
        self
    }

    /// Sets the timeout of the reqwest client.
    ///
    /// Ignored when a custom transport is provided.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the `User-Agent` of the reqwest client.
    ///
    /// Ignored when a custom transport is provided.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Uses a custom transport instead of the reqwest one.
    #[must_use]
    pub fn with_transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }
}
