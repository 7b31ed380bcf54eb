//! Canonical request and string-to-sign construction for both signature versions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use reqwest::Method;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::s3_clock::{to_amz_date, to_signer_date};
use crate::s3_constant::{S3_ALGO_VALUE, S3_TERMINATOR};
use crate::s3_path::uri_encode;
use crate::Policy;

/// Query parameters that are part of the V2 canonicalized resource.
const V2_SUB_RESOURCES: &[&str] = &[
    "acl",
    "cors",
    "delete",
    "lifecycle",
    "location",
    "logging",
    "notification",
    "partNumber",
    "policy",
    "requestPayment",
    "response-cache-control",
    "response-content-disposition",
    "response-content-encoding",
    "response-content-language",
    "response-content-type",
    "response-expires",
    "restore",
    "tagging",
    "torrent",
    "uploadId",
    "uploads",
    "versionId",
    "versioning",
    "versions",
    "website",
];

/// Lower-cased header names mapped to their normalized values, in name order.
pub type CanonicalHeaders = BTreeMap<String, Vec<String>>;

/// Lower-cases names, trims values and collapses runs of spaces. Values of
/// headers whose names only differ by case are kept in input order.
pub fn canonicalize_headers<'h, I>(headers: I) -> CanonicalHeaders
where
    I: IntoIterator<Item = (&'h str, &'h str)>,
{
    let mut canonical = CanonicalHeaders::new();
    for (name, value) in headers {
        let value = value
            .split(' ')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        canonical
            .entry(name.to_lowercase())
            .or_default()
            .push(value.trim().to_string());
    }
    canonical
}

/// The pieces of a request that go into a V4 canonical request.
#[derive(Debug, Clone)]
pub struct CanonicalInput<'a> {
    pub method: &'a Method,
    /// Encoded absolute path, exactly as sent.
    pub path: &'a str,
    pub query: Vec<(String, String)>,
    pub headers: CanonicalHeaders,
    pub body: Option<&'a [u8]>,
}

pub trait CanonicalRequest {
    fn payload_hex(&self) -> String;
    fn signed_header(&self) -> String;
    fn canonical_header(&self) -> String;
    fn canonical_query(&self) -> String;
    fn canonical_request(&self, include_payload: bool) -> String;

    #[inline]
    fn canonical_hex(&self, include_payload: bool) -> String {
        sha256_hex(self.canonical_request(include_payload).as_bytes())
    }
}

impl CanonicalRequest for CanonicalInput<'_> {
    fn payload_hex(&self) -> String {
        sha256_hex(self.body.unwrap_or(b""))
    }

    fn signed_header(&self) -> String {
        self.headers.keys().cloned().collect::<Vec<_>>().join(";")
    }

    fn canonical_header(&self) -> String {
        let mut res = String::new();
        for (name, values) in &self.headers {
            res.push_str(name);
            res.push(':');
            res.push_str(&values.join(","));
            res.push('\n');
        }
        res
    }

    fn canonical_query(&self) -> String {
        let mut pairs = self
            .query
            .iter()
            .map(|(name, value)| (uri_encode(name), uri_encode(value)))
            .collect::<Vec<_>>();
        pairs.sort();
        pairs
            .into_iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn canonical_request(&self, include_payload: bool) -> String {
        let payload = if include_payload {
            self.payload_hex()
        } else {
            crate::s3_constant::S3_UNSIGNED_PAYLOAD.to_string()
        };
        format!(
            "{method}\n{path}\n{query}\n{headers}\n{signed_headers}\n{payload}",
            method = self.method.as_str(),
            path = self.path,
            query = self.canonical_query(),
            headers = self.canonical_header(),
            signed_headers = self.signed_header(),
            payload = payload,
        )
    }
}

/// What a V4 string-to-sign is computed over.
#[derive(Debug, Clone)]
pub enum StringToSignType<'a> {
    AuthorizationHeader((&'a CanonicalInput<'a>, &'a str, DateTime<Utc>)),
    QueryParamsPresigned((&'a CanonicalInput<'a>, &'a str, DateTime<Utc>)),
    PostUploadPresigned(&'a Policy),
}

impl<'a> StringToSignType<'a> {
    pub fn new_authorization_header(
        req: &'a CanonicalInput<'a>,
        scope: &'a str,
        date: DateTime<Utc>,
    ) -> Self {
        Self::AuthorizationHeader((req, scope, date))
    }

    pub fn new_query_param_presigned(
        req: &'a CanonicalInput<'a>,
        scope: &'a str,
        date: DateTime<Utc>,
    ) -> Self {
        Self::QueryParamsPresigned((req, scope, date))
    }

    pub fn new_post_presigned(policy: &'a Policy) -> Self {
        Self::PostUploadPresigned(policy)
    }

    pub fn string_to_sign(self) -> Result<String> {
        let s = match self {
            StringToSignType::AuthorizationHeader((req, scope, date)) => {
                log::debug!("canonical request:\n{}", req.canonical_request(true));
                string_to_sign(&req.canonical_hex(true), scope, date)
            }
            StringToSignType::QueryParamsPresigned((req, scope, date)) => {
                log::debug!("canonical request:\n{}", req.canonical_request(false));
                string_to_sign(&req.canonical_hex(false), scope, date)
            }
            StringToSignType::PostUploadPresigned(policy) => policy.encode()?,
        };
        log::debug!("string to sign:\n{}", s);
        Ok(s)
    }
}

/// `date/region/service/aws4_request`
#[inline]
pub fn scope(date: DateTime<Utc>, region: &str, service: &str) -> String {
    format!(
        "{date}/{region}/{service}/{terminator}",
        date = to_signer_date(date),
        region = region,
        service = service,
        terminator = S3_TERMINATOR,
    )
}

#[inline]
fn string_to_sign(canonical_hex: &str, scope: &str, date: DateTime<Utc>) -> String {
    format!(
        "{algo}\n{date}\n{scope}\n{hash}",
        algo = S3_ALGO_VALUE,
        date = to_amz_date(date),
        scope = scope,
        hash = canonical_hex,
    )
}

#[inline]
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// `x-amz-*` headers, one `name:value\n` line each, in name order.
pub fn canonical_amz_headers_v2(headers: &CanonicalHeaders) -> String {
    headers
        .iter()
        .filter(|(name, _)| name.starts_with("x-amz-"))
        .map(|(name, values)| format!("{}:{}\n", name, values.join(",")))
        .collect()
}

/// The resource path followed by the recognized sub-resources, sorted by name.
/// Sub-resource values are not encoded.
pub fn canonical_resource_v2(resource: &str, query: &[(String, String)]) -> String {
    let mut sub_resources = query
        .iter()
        .filter(|(name, _)| V2_SUB_RESOURCES.contains(&name.as_str()))
        .collect::<Vec<_>>();
    if sub_resources.is_empty() {
        return resource.to_string();
    }
    sub_resources.sort_by(|a, b| a.0.cmp(&b.0));

    let params = sub_resources
        .iter()
        .map(|(name, value)| {
            if value.is_empty() {
                name.clone()
            } else {
                format!("{}={}", name, value)
            }
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", resource, params)
}

/// ```text
/// HTTP-Verb \n Content-MD5 \n Content-Type \n Date-or-Expires \n
/// CanonicalizedAmzHeaders CanonicalizedResource
/// ```
pub fn string_to_sign_v2(
    method: &Method,
    headers: &CanonicalHeaders,
    date: &str,
    resource: &str,
) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .map(|values| values.join(","))
            .unwrap_or_default()
    };
    format!(
        "{method}\n{md5}\n{content_type}\n{date}\n{amz}{resource}",
        method = method.as_str(),
        md5 = header("content-md5"),
        content_type = header("content-type"),
        date = date,
        amz = canonical_amz_headers_v2(headers),
        resource = resource,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(method: &'a Method, path: &'a str, headers: CanonicalHeaders) -> CanonicalInput<'a> {
        CanonicalInput {
            method,
            path,
            query: Vec::new(),
            headers,
            body: None,
        }
    }

    #[test]
    fn test_canonicalize_headers_normalizes() {
        let headers = canonicalize_headers(vec![
            ("X-Amz-Meta-Tag", "  a   b  "),
            ("Host", "example.com"),
            ("x-amz-meta-tag", "c"),
        ]);
        assert_eq!(headers.keys().collect::<Vec<_>>(), ["host", "x-amz-meta-tag"]);
        assert_eq!(headers["x-amz-meta-tag"], vec!["a b", "c"]);
    }

    #[test]
    fn test_canonical_request_layout() {
        let method = Method::GET;
        let headers = canonicalize_headers(vec![
            ("Host", "examplebucket.s3.amazonaws.com"),
            ("Range", "bytes=0-9"),
        ]);
        let mut req = input(&method, "/test.txt", headers);
        req.query = vec![
            ("prefix".to_string(), "J".to_string()),
            ("max-keys".to_string(), "2".to_string()),
            ("acl".to_string(), String::new()),
        ];

        assert_eq!(req.signed_header(), "host;range");
        assert_eq!(req.canonical_query(), "acl=&max-keys=2&prefix=J");
        assert_eq!(
            req.canonical_request(true),
            format!(
                "GET\n/test.txt\nacl=&max-keys=2&prefix=J\nhost:examplebucket.s3.amazonaws.com\nrange:bytes=0-9\n\nhost;range\n{}",
                crate::s3_constant::S3_EMPTY_PAYLOAD_SHA256
            )
        );
        assert!(req.canonical_request(false).ends_with("\nUNSIGNED-PAYLOAD"));
    }

    #[test]
    fn test_canonical_query_encodes_before_sorting() {
        let method = Method::GET;
        let mut req = input(&method, "/", CanonicalHeaders::new());
        req.query = vec![
            ("b".to_string(), "x y".to_string()),
            ("a~".to_string(), "1/2".to_string()),
        ];
        assert_eq!(req.canonical_query(), "a~=1%2F2&b=x%20y");
    }

    #[test]
    fn test_payload_hex() {
        let method = Method::PUT;
        let mut req = input(&method, "/", CanonicalHeaders::new());
        assert_eq!(req.payload_hex(), crate::s3_constant::S3_EMPTY_PAYLOAD_SHA256);
        req.body = Some(b"Welcome to Amazon S3.");
        assert_eq!(
            req.payload_hex(),
            "44ce7dd67c959e0d3524ffac1771dfbba87d2b6b4b4e99e42034a8b803f8b072"
        );
    }

    #[test]
    fn test_canonical_resource_v2() {
        let query = vec![
            ("versionId".to_string(), "3".to_string()),
            ("acl".to_string(), String::new()),
            ("prefix".to_string(), "photos".to_string()),
        ];
        assert_eq!(
            canonical_resource_v2("/johnsmith/", &query),
            "/johnsmith/?acl&versionId=3"
        );
        assert_eq!(canonical_resource_v2("/", &[]), "/");
    }

    #[test]
    fn test_string_to_sign_v2_layout() {
        let headers = canonicalize_headers(vec![
            ("Content-Type", "image/jpeg"),
            ("X-Amz-Meta-ReviewedBy", "joe@johnsmith.net"),
            ("X-Amz-Meta-ReviewedBy", "jane@johnsmith.net"),
            ("x-amz-acl", "public-read"),
        ]);
        let s = string_to_sign_v2(
            &Method::PUT,
            &headers,
            "Tue, 27 Mar 2007 21:06:08 +0000",
            "/static.johnsmith.net/db-backup.dat.gz",
        );
        assert_eq!(
            s,
            "PUT\n\nimage/jpeg\nTue, 27 Mar 2007 21:06:08 +0000\n\
             x-amz-acl:public-read\n\
             x-amz-meta-reviewedby:joe@johnsmith.net,jane@johnsmith.net\n\
             /static.johnsmith.net/db-backup.dat.gz"
        );
    }

    #[test]
    fn test_scope() {
        use chrono::TimeZone;
        let date = Utc.with_ymd_and_hms(2013, 5, 24, 0, 0, 0).unwrap();
        assert_eq!(
            scope(date, "us-east-1", "s3"),
            "20130524/us-east-1/s3/aws4_request"
        );
    }
}
