use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Method;
use sha1::Sha1;
use sha2::Sha256;

use crate::error::{Error, Result};
use crate::s3_clock::{to_amz_date, to_http_date, to_signer_date};
use crate::s3_constant::*;
use crate::s3_credentials::Credentials;
use crate::s3_request::SignatureVersion;
use crate::s3_string_to_sign::{
    canonical_resource_v2, canonicalize_headers, scope, sha256_hex, string_to_sign_v2,
    CanonicalInput, CanonicalRequest, StringToSignType,
};
use crate::s3_validator::Region;
use crate::Policy;

type HmacSha256 = Hmac<Sha256>;
type HmacSha1 = Hmac<Sha1>;

/// An addressed request, ready to be signed.
#[derive(Debug, Clone, Copy)]
pub struct SigningRequest<'a> {
    pub method: &'a Method,
    pub host: &'a str,
    /// Encoded absolute path as it goes on the wire.
    pub path: &'a str,
    /// `/bucket/key` (or `/` for the service root), whatever the addressing style.
    pub resource: &'a str,
    pub query: &'a [(String, String)],
    pub headers: &'a BTreeMap<String, String>,
    pub body: Option<&'a [u8]>,
}

impl<'a> SigningRequest<'a> {
    /// Caller headers that the signer does not emit itself.
    fn extra_headers(&self, authoritative: &[&str]) -> Vec<(&'a str, &'a str)> {
        self.headers
            .iter()
            .filter(|(name, _)| {
                !authoritative
                    .iter()
                    .any(|owned| owned.eq_ignore_ascii_case(name))
            })
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect()
    }
}

/// Authentication material produced by a [`Signer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignResult {
    pub headers: Vec<(String, String)>,
    pub query_additions: Vec<(String, String)>,
}

pub trait Signer {
    /// Signs with an `Authorization` header.
    fn sign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<SignResult>;

    /// Signs with query parameters, valid for `expires` seconds from `now`.
    fn presign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        now: DateTime<Utc>,
        expires: u32,
    ) -> Result<SignResult>;
}

/// Derives the V4 key `HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")`.
pub fn signing_key(
    secret_key: &str,
    date: DateTime<Utc>,
    region: &str,
    service: &str,
) -> Result<Vec<u8>> {
    let date_key = hmac_sha256(
        format!("AWS4{}", secret_key).as_bytes(),
        to_signer_date(date).as_bytes(),
    )?;
    let date_region_key = hmac_sha256(&date_key, region.as_bytes())?;
    let date_region_service_key = hmac_sha256(&date_region_key, service.as_bytes())?;
    hmac_sha256(&date_region_service_key, S3_TERMINATOR.as_bytes())
}

#[inline]
fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut h = HmacSha256::new_from_slice(key)?;
    h.update(data);
    Ok(h.finalize().into_bytes().to_vec())
}

/// `Base64(HMAC-SHA1(secret, string_to_sign))`
pub fn sign_v2_string(secret_key: &str, string_to_sign: &str) -> Result<String> {
    let mut h = HmacSha1::new_from_slice(secret_key.as_bytes())?;
    h.update(string_to_sign.as_bytes());
    Ok(BASE64.encode(h.finalize().into_bytes()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerV4 {
    region: Region,
    service: String,
}

impl SignerV4 {
    #[inline]
    pub fn new(region: Region, service: impl Into<String>) -> Self {
        Self {
            region,
            service: service.into(),
        }
    }

    #[inline]
    pub fn region(&self) -> Region {
        self.region
    }

    #[inline]
    fn scope(&self, date: DateTime<Utc>) -> String {
        scope(date, self.region.as_str(), &self.service)
    }

    /// `access_key/date/region/service/aws4_request`
    #[inline]
    pub fn credential(&self, access_key: &str, date: DateTime<Utc>) -> String {
        format!("{}/{}", access_key, self.scope(date))
    }

    /// Hex HMAC of `string_to_sign` under the key derived for `date`.
    pub fn signature(
        &self,
        secret_key: &str,
        date: DateTime<Utc>,
        string_to_sign: &str,
    ) -> Result<String> {
        let key = signing_key(secret_key, date, self.region.as_str(), &self.service)?;
        Ok(hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?))
    }

    /// Signs a browser-upload policy. Returns the string-to-sign (the base64
    /// policy) and its signature.
    pub fn sign_policy(
        &self,
        policy: &Policy,
        secret_key: &str,
        date: DateTime<Utc>,
    ) -> Result<(String, String)> {
        let string_to_sign = StringToSignType::new_post_presigned(policy).string_to_sign()?;
        let signature = self.signature(secret_key, date, &string_to_sign)?;
        Ok((string_to_sign, signature))
    }

    #[inline]
    fn format_authorization(
        &self,
        access_key: &str,
        signed_headers: &str,
        signature: &str,
        date: DateTime<Utc>,
    ) -> String {
        format!(
            "{algo} Credential={cred}, SignedHeaders={signed_headers}, Signature={sign}",
            algo = S3_ALGO_VALUE,
            cred = self.credential(access_key, date),
            signed_headers = signed_headers,
            sign = signature,
        )
    }
}

impl Signer for SignerV4 {
    fn sign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<SignResult> {
        let mut headers = vec![
            (HOST_KEY.to_string(), request.host.to_string()),
            (
                S3_CONTENT_KEY.to_string(),
                sha256_hex(request.body.unwrap_or(b"")),
            ),
            (S3_DATE_KEY.to_string(), to_amz_date(now)),
        ];
        if let Some(token) = &credentials.session_token {
            headers.push((S3_SECURITY_TOKEN_KEY.to_string(), token.clone()));
        }

        let authoritative = [
            HOST_KEY,
            S3_CONTENT_KEY,
            S3_DATE_KEY,
            S3_SECURITY_TOKEN_KEY,
            AUTHORIZATION_KEY,
        ];
        let mut pairs: Vec<(&str, &str)> = request.extra_headers(&authoritative);
        pairs.extend(headers.iter().map(|(name, value)| (name.as_str(), value.as_str())));
        let canonical = CanonicalInput {
            method: request.method,
            path: request.path,
            query: request.query.to_vec(),
            headers: canonicalize_headers(pairs),
            body: request.body,
        };

        let scope = self.scope(now);
        let string_to_sign =
            StringToSignType::new_authorization_header(&canonical, &scope, now).string_to_sign()?;
        let signature = self.signature(&credentials.secret_key, now, &string_to_sign)?;
        let authorization = self.format_authorization(
            &credentials.access_key,
            &canonical.signed_header(),
            &signature,
            now,
        );
        headers.push((AUTHORIZATION_KEY.to_string(), authorization));

        Ok(SignResult {
            headers,
            query_additions: Vec::new(),
        })
    }

    fn presign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        now: DateTime<Utc>,
        expires: u32,
    ) -> Result<SignResult> {
        if !(1..=MAX_PRESIGN_EXPIRES).contains(&expires) {
            return Err(Error::InvalidExpiry(expires));
        }

        let mut additions = vec![
            (S3_ALGO_KEY.to_string(), S3_ALGO_VALUE.to_string()),
            (
                S3_CRED_KEY.to_string(),
                self.credential(&credentials.access_key, now),
            ),
            (S3_DATE_KEY.to_string(), to_amz_date(now)),
            (S3_EXPIRES_KEY.to_string(), expires.to_string()),
            (S3_SIGNED_HEADERS_KEY.to_string(), "host".to_string()),
        ];
        if let Some(token) = &credentials.session_token {
            additions.push((S3_SECURITY_TOKEN_KEY.to_string(), token.clone()));
        }

        let mut query = request.query.to_vec();
        query.extend(additions.iter().cloned());
        let canonical = CanonicalInput {
            method: request.method,
            path: request.path,
            query,
            headers: canonicalize_headers([("host", request.host)]),
            body: None,
        };

        let scope = self.scope(now);
        let string_to_sign =
            StringToSignType::new_query_param_presigned(&canonical, &scope, now)
                .string_to_sign()?;
        let signature = self.signature(&credentials.secret_key, now, &string_to_sign)?;
        additions.push((S3_SIGNATURE_KEY.to_string(), signature));

        Ok(SignResult {
            headers: Vec::new(),
            query_additions: additions,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignerV2;

impl SignerV2 {
    const AUTHORITATIVE: [&'static str; 3] = [DATE_KEY, S3_SECURITY_TOKEN_KEY, AUTHORIZATION_KEY];
}

impl Signer for SignerV2 {
    fn sign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<SignResult> {
        let mut headers = vec![(DATE_KEY.to_string(), to_http_date(now))];
        if let Some(token) = &credentials.session_token {
            headers.push((S3_SECURITY_TOKEN_KEY.to_string(), token.clone()));
        }

        let mut pairs: Vec<(&str, &str)> = request.extra_headers(&Self::AUTHORITATIVE);
        pairs.extend(headers.iter().map(|(name, value)| (name.as_str(), value.as_str())));
        let canonical = canonicalize_headers(pairs);
        // An x-amz-date header replaces Date in the string to sign.
        let date = if canonical.contains_key("x-amz-date") {
            String::new()
        } else {
            to_http_date(now)
        };
        let resource = canonical_resource_v2(request.resource, request.query);
        let string_to_sign = string_to_sign_v2(request.method, &canonical, &date, &resource);
        log::debug!("string to sign:\n{}", string_to_sign);

        let signature = sign_v2_string(&credentials.secret_key, &string_to_sign)?;
        headers.push((
            AUTHORIZATION_KEY.to_string(),
            format!("AWS {}:{}", credentials.access_key, signature),
        ));

        Ok(SignResult {
            headers,
            query_additions: Vec::new(),
        })
    }

    fn presign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        now: DateTime<Utc>,
        expires: u32,
    ) -> Result<SignResult> {
        if expires == 0 {
            return Err(Error::InvalidExpiry(expires));
        }
        let expires_at = (now.timestamp() + i64::from(expires)).to_string();

        let mut additions = vec![
            (V2_ACCESS_KEY_QUERY.to_string(), credentials.access_key.clone()),
            (V2_EXPIRES_QUERY.to_string(), expires_at.clone()),
        ];
        let mut pairs: Vec<(&str, &str)> = request.extra_headers(&Self::AUTHORITATIVE);
        if let Some(token) = &credentials.session_token {
            pairs.push(("x-amz-security-token", token.as_str()));
            additions.push(("x-amz-security-token".to_string(), token.clone()));
        }

        let canonical = canonicalize_headers(pairs);
        let resource = canonical_resource_v2(request.resource, request.query);
        let string_to_sign = string_to_sign_v2(request.method, &canonical, &expires_at, &resource);
        log::debug!("string to sign:\n{}", string_to_sign);

        let signature = sign_v2_string(&credentials.secret_key, &string_to_sign)?;
        additions.push((V2_SIGNATURE_QUERY.to_string(), signature));

        Ok(SignResult {
            headers: Vec::new(),
            query_additions: additions,
        })
    }
}

/// Picks the signer for a [`SignatureVersion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSigner {
    V2(SignerV2),
    V4(SignerV4),
}

impl RequestSigner {
    /// V4 scopes its key to a region, so it cannot be built without one.
    pub fn new(version: SignatureVersion, region: Option<Region>, service: &str) -> Result<Self> {
        match version {
            SignatureVersion::V2 => Ok(Self::V2(SignerV2)),
            SignatureVersion::V4 => {
                let region = region.ok_or_else(|| {
                    Error::MissingSigningContext(
                        "V4 signing requires a region to scope the signing key".to_string(),
                    )
                })?;
                Ok(Self::V4(SignerV4::new(region, service)))
            }
        }
    }

    #[inline]
    pub fn version(&self) -> SignatureVersion {
        match self {
            Self::V2(_) => SignatureVersion::V2,
            Self::V4(_) => SignatureVersion::V4,
        }
    }
}

impl Signer for RequestSigner {
    fn sign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<SignResult> {
        match self {
            Self::V2(signer) => signer.sign(request, credentials, now),
            Self::V4(signer) => signer.sign(request, credentials, now),
        }
    }

    fn presign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        now: DateTime<Utc>,
        expires: u32,
    ) -> Result<SignResult> {
        match self {
            Self::V2(signer) => signer.presign(request, credentials, now, expires),
            Self::V4(signer) => signer.presign(request, credentials, now, expires),
        }
    }
}
