use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;

/// Regular expression for matching path parameters in the format `{param_name}`.
#[allow(clippy::expect_used)]
static RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?<name>\w+)}").expect("a valid regex"));

/// Everything but RFC 3986 unreserved characters.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a path segment value, a query name, or a query value.
pub(crate) fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Replace every `{param_name}` occurrence, other placeholders are left untouched.
pub(crate) fn replace_path_param(path: &str, param_name: &str, value: &str) -> String {
    let pattern = ["{", param_name, "}"].concat();
    path.replace(&pattern, value)
}

/// Names of the placeholders still present in the path.
pub(crate) fn unresolved_params(path: &str) -> Vec<&str> {
    RE.captures_iter(path)
        .filter_map(|caps| caps.name("name"))
        .map(|found| found.as_str())
        .collect()
}

/// Query string under construction, `?` before the first pair and `&` afterwards.
#[derive(Debug, Default)]
pub(crate) struct QueryString {
    buffer: String,
}

impl QueryString {
    pub(crate) fn push(&mut self, name: &str, value: &str) {
        let separator = if self.buffer.is_empty() { '?' } else { '&' };
        self.buffer.push(separator);
        self.buffer.push_str(&encode_component(name));
        self.buffer.push('=');
        self.buffer.push_str(&encode_component(value));
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.buffer
    }
}
