//! Turns a descriptor and its signature into the request handed to a transport.

use std::collections::BTreeMap;

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Method, Url};

use crate::error::{Advisory, Error, Result};
use crate::s3::ClientConfig;
use crate::s3_constant::{AUTHORIZATION_KEY, HOST_KEY};
use crate::s3_path::encode_query;
use crate::s3_request::RequestDescriptor;
use crate::s3_signer::SignResult;

/// Where a request goes: host plus encoded path, and the path-style resource
/// that V2 signs regardless of addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub host: String,
    pub path: String,
    pub resource: String,
    pub virtual_host: bool,
    pub advisory: Option<Advisory>,
}

/// Chooses between `bucket.endpoint/key` and `endpoint/bucket/key`.
///
/// Virtual-host addressing is used only when the config and the descriptor
/// both ask for it and the bucket is DNS compatible. An incompatible bucket
/// falls back to path-style with an advisory.
pub fn resolve_address(config: &ClientConfig, descriptor: &RequestDescriptor) -> Address {
    let resource = descriptor.path_style_path();
    let path_style = |advisory: Option<Advisory>| Address {
        host: config.endpoint.clone(),
        path: resource.clone(),
        resource: resource.clone(),
        virtual_host: false,
        advisory,
    };

    let bucket = match descriptor.bucket_name() {
        Some(bucket) if config.virtual_host && descriptor.use_virtual_host() => bucket,
        _ => return path_style(None),
    };

    match bucket.virtual_host_compatibility(config.https) {
        Ok(()) => Address {
            host: format!("{}.{}", bucket, config.endpoint),
            path: descriptor.object_path(),
            resource: resource.clone(),
            virtual_host: true,
            advisory: None,
        },
        Err(reason) => {
            let advisory = Advisory::VirtualHostIncompatible {
                bucket: bucket.to_string(),
                reason,
            };
            log::warn!("{}", advisory);
            path_style(Some(advisory))
        }
    }
}

/// A fully authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: Method,
    pub url: String,
    pub host: String,
    /// Encoded path and query, as sent after the host.
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
    pub advisories: Vec<Advisory>,
}

impl SignedRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Builds a `reqwest::Request` carrying the same method, url, headers and body.
    pub fn into_reqwest(self) -> Result<reqwest::Request> {
        let url = Url::parse(&self.url).map_err(|source| Error::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;

        let mut req = reqwest::Request::new(self.method, url);
        for (name, value) in self.headers {
            let invalid = || Error::InvalidHeader {
                name: name.clone(),
                value: value.clone(),
            };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(&value).map_err(|_| invalid())?;
            req.headers_mut().insert(header_name, header_value);
        }
        if let Some(body) = self.body {
            *req.body_mut() = Some(body.into());
        }

        Ok(req)
    }
}

/// Headers only the signer may set. Caller values are dropped even when the
/// signer emits nothing for them (presigned URLs, V2 `Host`).
const SIGNER_OWNED: [&str; 2] = [HOST_KEY, AUTHORIZATION_KEY];

/// Merges signer output into the descriptor. Signer headers win over
/// descriptor headers with the same (case-insensitive) name.
pub fn assemble(
    config: &ClientConfig,
    descriptor: &RequestDescriptor,
    address: Address,
    signed: SignResult,
    mut advisories: Vec<Advisory>,
) -> SignedRequest {
    let mut headers: BTreeMap<String, String> = signed.headers.into_iter().collect();
    for (name, value) in descriptor.headers() {
        let owned = SIGNER_OWNED
            .iter()
            .any(|owned| owned.eq_ignore_ascii_case(name));
        if !owned && !headers.keys().any(|key| key.eq_ignore_ascii_case(name)) {
            headers.insert(name.clone(), value.clone());
        }
    }

    let mut query = descriptor.query().to_vec();
    query.extend(signed.query_additions);
    let mut path = address.path;
    if !query.is_empty() {
        path.push('?');
        path.push_str(&encode_query(&query));
    }

    if let Some(advisory) = address.advisory {
        advisories.insert(0, advisory);
    }

    SignedRequest {
        method: descriptor.method().clone(),
        url: format!("{}://{}{}", config.scheme(), address.host, path),
        host: address.host,
        path,
        headers,
        body: descriptor.body().map(|body| body.to_vec()),
        advisories,
    }
}
