use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::s3_validator::BucketName;

/// Everything except the RFC 3986 unreserved characters gets escaped.
const URI_COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encodes a single path segment or query component.
#[inline]
pub fn uri_encode(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT_ENCODE_SET).to_string()
}

/// Encodes an object key segment by segment, keeping the `/` separators.
/// Empty segments are preserved, so `a//b` stays `a//b`.
pub fn encode_object_key(key: &str) -> String {
    key.split('/').map(uri_encode).collect::<Vec<_>>().join("/")
}

/// Returns `bucket/` without a key, otherwise `bucket/<encoded key>`.
pub fn build_resource_path(bucket: &BucketName, key: Option<&str>) -> String {
    match key {
        None => format!("{}/", bucket),
        Some(key) => format!("{}/{}", bucket, encode_object_key(key)),
    }
}

/// Renders `(name, value)` pairs as a query string. A pair with an empty value
/// is written as the bare name, which is how S3 sub-resources (`?acl`) look.
pub fn encode_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| {
            if value.is_empty() {
                uri_encode(name)
            } else {
                format!("{}={}", uri_encode(name), uri_encode(value))
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}
