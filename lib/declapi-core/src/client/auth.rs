use std::fmt;

use base64::Engine;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Errors that can occur while preparing credentials.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum CredentialsError {
    /// Basic authentication username contains a colon.
    #[display("Basic auth username cannot contain a colon: {username}")]
    InvalidUsername {
        /// The rejected username.
        username: String,
    },
}

/// Secure wrapper for sensitive string data that automatically zeroes memory on drop.
///
/// Used for the client default authorization key and for Basic credentials.
/// `Debug` never shows the value and `Display` masks it.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string value.
    ///
    /// # Security Note
    /// The returned reference should not be stored for extended periods
    /// to minimize exposure time of sensitive data.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `SecureString` and returns the inner `String`.
    pub fn into_string(mut self) -> String {
        std::mem::take(&mut self.0)
    }

    /// Masks sensitive data for display/logging purposes.
    pub(crate) fn mask_sensitive(value: &str) -> String {
        let count = value.chars().count();
        if count <= 8 {
            "***".to_string()
        } else {
            let head: String = value.chars().take(4).collect();
            let tail: String = value.chars().skip(count - 4).collect();
            format!("{head}...{tail}")
        }
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::mask_sensitive(&self.0))
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

/// Builds the key of a Basic endpoint: `base64(username:password)` (RFC 7617).
///
/// Basic endpoints put the key verbatim after the scheme, so the encoded
/// credentials are what an auth key field (or the default key) should hold.
///
/// ```rust
/// use declapi_core::basic_credentials;
///
/// let key = basic_credentials("user", "pass")?;
/// assert_eq!(key.as_str(), "dXNlcjpwYXNz");
/// # Ok::<(), declapi_core::CredentialsError>(())
/// ```
pub fn basic_credentials(username: &str, password: &str) -> Result<SecureString, CredentialsError> {
    if username.contains(':') {
        return Err(CredentialsError::InvalidUsername {
            username: username.to_string(),
        });
    }

    let mut credentials = format!("{username}:{password}");
    let encoded = base64::engine::general_purpose::STANDARD.encode(&credentials);
    credentials.zeroize();

    Ok(SecureString::new(encoded))
}
