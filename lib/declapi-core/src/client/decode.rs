use std::any::type_name;
use std::fmt;

use serde::de::{self, DeserializeOwned, Deserializer, Visitor};

use super::ApiClientError;

/// Decodes a response text into `T`.
///
/// Members unknown to `T` are ignored, so servers may add fields without breaking callers.
///
/// # Errors
///
/// Returns [`ApiClientError::Decode`] with the target type, the JSON path of the failure,
/// and the offending text.
pub fn decode<T>(text: &str) -> Result<T, ApiClientError>
where
    T: DeserializeOwned,
{
    let deserializer = &mut serde_json::Deserializer::from_str(text);
    serde_path_to_error::deserialize(deserializer).map_err(|err| ApiClientError::Decode {
        target: type_name::<T>(),
        path: err.path().to_string(),
        error: err.into_inner(),
        body: text.to_string(),
    })
}

/// Lenient boolean, for use with `#[serde(deserialize_with = "lenient_bool")]`.
///
/// Accepts JSON booleans, the strings `"true"`/`"false"` in any case, and the numbers `0`/`1`.
///
/// ```rust
/// use declapi_core::lenient_bool;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Flags {
///     #[serde(deserialize_with = "lenient_bool")]
///     active: bool,
/// }
///
/// let flags: Flags = declapi_core::decode(r#"{"active": "TRUE"}"#)?;
/// assert!(flags.active);
/// # Ok::<(), declapi_core::ApiClientError>(())
/// ```
///
/// # Errors
///
/// Fails on any other value.
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientBoolVisitor)
}

struct LenientBoolVisitor;

impl Visitor<'_> for LenientBoolVisitor {
    type Value = bool;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a boolean, \"true\", \"false\", 0, or 1")
    }

    fn visit_bool<E>(self, value: bool) -> Result<bool, E>
    where
        E: de::Error,
    {
        Ok(value)
    }

    fn visit_u64<E>(self, value: u64) -> Result<bool, E>
    where
        E: de::Error,
    {
        match value {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(E::invalid_value(de::Unexpected::Unsigned(value), &self)),
        }
    }

    fn visit_i64<E>(self, value: i64) -> Result<bool, E>
    where
        E: de::Error,
    {
        match value {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(E::invalid_value(de::Unexpected::Signed(value), &self)),
        }
    }

    fn visit_str<E>(self, value: &str) -> Result<bool, E>
    where
        E: de::Error,
    {
        if value.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if value.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(E::invalid_value(de::Unexpected::Str(value), &self))
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct User {
        id: u32,
        name: String,
        tags: Vec<String>,
    }

    #[derive(Debug, Deserialize)]
    struct Flag {
        #[serde(deserialize_with = "lenient_bool")]
        value: bool,
    }

    #[test]
    fn should_round_trip_known_fields() {
        let user = User {
            id: 7,
            name: "Alice".to_string(),
            tags: vec!["admin".to_string()],
        };
        let text = serde_json::to_string(&user).expect("serialize");

        let decoded: User = decode(&text).expect("decode");
        assert_eq!(decoded, user);
    }

    #[test]
    fn should_ignore_unknown_members() {
        let text = r#"{"id": 1, "name": "Bob", "tags": [], "created_at": "2024-01-01", "extra": {"a": 1}}"#;

        let decoded: User = decode(text).expect("decode");
        assert_eq!(decoded.name, "Bob");
    }

    #[test]
    fn should_report_path_and_body_on_failure() {
        let text = r#"{"id": 1, "name": "Bob", "tags": [1]}"#;

        match decode::<User>(text) {
            Err(ApiClientError::Decode {
                target, path, body, ..
            }) => {
                assert!(target.ends_with("User"));
                assert_eq!(path, "tags[0]");
                assert_eq!(body, text);
            }
            other => panic!("expected a decode error, got {other:?}"),
        }
    }

    #[test]
    fn should_fail_on_malformed_text() {
        let error = decode::<User>("<html>oops</html>").unwrap_err();
        assert!(error.is_decode());
    }

    #[rstest]
    #[case(r#"{"value": true}"#, true)]
    #[case(r#"{"value": false}"#, false)]
    #[case(r#"{"value": "True"}"#, true)]
    #[case(r#"{"value": "false"}"#, false)]
    #[case(r#"{"value": 1}"#, true)]
    #[case(r#"{"value": 0}"#, false)]
    fn should_decode_lenient_bool(#[case] text: &str, #[case] expected: bool) {
        let flag: Flag = decode(text).expect("decode");
        assert_eq!(flag.value, expected);
    }

    #[rstest]
    #[case(r#"{"value": "yes"}"#)]
    #[case(r#"{"value": 2}"#)]
    #[case(r#"{"value": null}"#)]
    fn should_reject_other_bool_forms(#[case] text: &str) {
        assert!(decode::<Flag>(text).is_err());
    }
}
