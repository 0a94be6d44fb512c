//! Percent-encoding and query parsing for registration URIs.

use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left intact by the encoder: the RFC 3986 unreserved set plus
/// `!'()*`. The redirect-receiving side of the provider was built against a
/// platform encoder with exactly this keep-set, so it must not change.
const KEEP: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'!')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*');

pub(crate) fn encode(value: &str) -> Cow<'_, str> {
    utf8_percent_encode(value, KEEP).into()
}

/// Extract and percent-decode a single query parameter from a raw URI.
///
/// Returns `None` when the URI has no query component or the parameter is
/// absent. Tolerates URIs that would not parse as absolute URLs, since the
/// redirect callback may arrive as an opaque string.
pub(crate) fn query_param(uri: &str, name: &str) -> Option<String> {
    let uri = uri.split_once('#').map_or(uri, |(head, _)| head);
    let (_, query) = uri.split_once('?')?;
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key == name {
            return Some(percent_decode_str(value).decode_utf8_lossy().into_owned());
        }
    }
    None
}
