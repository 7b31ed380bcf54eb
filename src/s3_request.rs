use std::collections::BTreeMap;
use std::fmt;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::s3_path::{build_resource_path, encode_object_key, encode_query};
use crate::s3_validator::BucketName;

/// Which signing algorithm a request is authenticated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SignatureVersion {
    /// HMAC-SHA1 over a fixed field concatenation, keyed by the raw secret.
    V2,
    /// HMAC-SHA256 with a key scoped to date, region and service.
    #[default]
    V4,
}

impl fmt::Display for SignatureVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V2 => f.write_str("V2"),
            Self::V4 => f.write_str("V4"),
        }
    }
}

/// Describes one API call before addressing and signing.
///
/// Built once by an operation factory and only read afterwards. The `with_*`
/// methods consume and return the descriptor so it can be shaped in one
/// expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: Method,
    bucket: Option<BucketName>,
    key: Option<String>,
    query: Vec<(String, String)>,
    headers: BTreeMap<String, String>,
    body: Option<Vec<u8>>,
    use_virtual_host: bool,
    signature: SignatureVersion,
}

impl RequestDescriptor {
    /// A request against the service root, e.g. listing all buckets.
    /// Virtual-host addressing is off since there is no bucket to put in the host.
    #[inline]
    pub fn service(method: Method) -> Self {
        Self {
            method,
            bucket: None,
            key: None,
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
            use_virtual_host: false,
            signature: SignatureVersion::default(),
        }
    }

    #[inline]
    pub fn bucket(method: Method, bucket: BucketName) -> Self {
        Self {
            bucket: Some(bucket),
            use_virtual_host: true,
            ..Self::service(method)
        }
    }

    #[inline]
    pub fn object(method: Method, bucket: BucketName, key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::bucket(method, bucket)
        }
    }

    /// Appends a query parameter; an empty value renders as a bare sub-resource name.
    #[inline]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets a header, replacing any earlier one whose name differs only by case.
    #[inline]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
        self
    }

    #[inline]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Requests virtual-host addressing. Ignored without a bucket.
    #[inline]
    pub fn with_virtual_host(mut self, enabled: bool) -> Self {
        self.use_virtual_host = enabled && self.bucket.is_some();
        self
    }

    #[inline]
    pub fn with_signature(mut self, signature: SignatureVersion) -> Self {
        self.signature = signature;
        self
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[inline]
    pub fn bucket_name(&self) -> Option<&BucketName> {
        self.bucket.as_ref()
    }

    #[inline]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    #[inline]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    #[inline]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    #[inline]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    #[inline]
    pub fn use_virtual_host(&self) -> bool {
        self.use_virtual_host
    }

    #[inline]
    pub fn signature(&self) -> SignatureVersion {
        self.signature
    }

    /// The resource path plus query, without a leading slash:
    /// `""` for the service root, `bucket/` for a bucket, `bucket/a/b%20c.txt?acl`
    /// for an object sub-resource.
    pub fn path(&self) -> String {
        let mut path = match &self.bucket {
            Some(bucket) => build_resource_path(bucket, self.key.as_deref()),
            None => String::new(),
        };
        if !self.query.is_empty() {
            path.push('?');
            path.push_str(&encode_query(&self.query));
        }
        path
    }

    /// Path below the bucket, encoded, with a leading slash. This is what goes
    /// after the host when the bucket is addressed virtually.
    pub(crate) fn object_path(&self) -> String {
        match &self.key {
            Some(key) => format!("/{}", encode_object_key(key)),
            None => "/".to_string(),
        }
    }

    /// Encoded absolute path for path-style addressing.
    pub(crate) fn path_style_path(&self) -> String {
        match &self.bucket {
            Some(bucket) => format!("/{}", build_resource_path(bucket, self.key.as_deref())),
            None => "/".to_string(),
        }
    }
}
