//! # Declapi Core
//!
//! Build HTTP requests from annotated Rust structs.
//!
//! A request type declares its endpoint (verb, authorization, path template) and the
//! role of each field (path parameter, query parameter, body member, header,
//! authorization key). The [`ApiClient`] turns an instance into a concrete request,
//! validates it, sends it, and hands back the response text or a decoded value.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use declapi_core::{ApiClient, ApiRequest};
//! use serde::Deserialize;
//!
//! #[derive(ApiRequest)]
//! #[method(verb = "POST", auth = "bearer")]
//! #[endpoint("/orgs/{org}/users")]
//! struct CreateUser {
//!     #[path_param]
//!     org: String,
//!     #[body_param]
//!     name: String,
//!     #[body_param]
//!     age: u32,
//!     #[header(name = "X-Request-Id")]
//!     #[nullable]
//!     request_id: Option<String>,
//!     #[auth_key(auto)]
//!     token: Option<String>,
//! }
//!
//! #[derive(Deserialize)]
//! struct Created {
//!     id: u64,
//! }
//!
//! # fn main() -> Result<(), declapi_core::ApiClientError> {
//! let client = ApiClient::builder()
//!     .with_base_url("https://api.example.com")
//!     .with_default_auth_key("my-api-token")
//!     .build()?;
//!
//! let request = CreateUser {
//!     org: "acme".to_string(),
//!     name: "Alice".to_string(),
//!     age: 30,
//!     request_id: None,
//!     token: None,
//! };
//!
//! // POST https://api.example.com/orgs/acme/users
//! // Authorization: Bearer my-api-token
//! // {"name":"Alice","age":30}
//! let created: Created = client.send_as(&request)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Inspecting a request
//!
//! [`ApiClient::assemble`] builds the request without sending it:
//!
//! ```rust
//! use declapi_core::{ApiClient, ApiRequest};
//!
//! #[derive(ApiRequest)]
//! #[method]
//! #[endpoint("/search")]
//! struct Search {
//!     #[query_param(name = "q")]
//!     text: String,
//!     #[query_param]
//!     page: u32,
//! }
//!
//! # fn main() -> Result<(), declapi_core::ApiClientError> {
//! let client = ApiClient::new("http://localhost:8080")?;
//! let assembled = client.assemble(&Search { text: "rust http".to_string(), page: 2 })?;
//!
//! assert_eq!(assembled.url(), "http://localhost:8080/search?q=rust%20http&page=2");
//! assert!(assembled.body().is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Every operation returns [`ApiClientError`]. Validation failures
//! ([`RequestValidationError`]) are raised before anything is sent; transport
//! failures and decode failures are reported as distinct variants.
//!
//! All commonly used types are re-exported from the crate root.

mod client;

pub use self::client::{
    AUTHORIZATION, ApiClient, ApiClientBuilder, ApiClientError, ApiRequest, AssembledRequest,
    AssemblyContext, AuthScheme, BoundField, CredentialsError, EndpointDescriptor, FieldBinding,
    FieldRole, FieldValue, HttpTransport, HttpVerb, RawBytes, RawResponse, RequestBody,
    RequestValidationError, ReqwestTransport, SecureString, assemble, basic_credentials, decode,
    lenient_bool,
};

#[cfg(feature = "derive")]
pub use declapi_macro::ApiRequest;
