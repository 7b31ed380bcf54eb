use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Which bucket name rule a candidate broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketNameViolation {
    /// Contains a character outside `[a-zA-Z0-9._-]`.
    Charset,
    /// Does not start with a letter or digit.
    FirstCharacter,
    /// Shorter than 3 or longer than 255 characters.
    Length,
    /// Looks like a dotted-quad IPv4 address.
    IpAddressShape,
}

impl fmt::Display for BucketNameViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Charset => "may only contain letters, digits, '.', '_' and '-'",
            Self::FirstCharacter => "must start with a letter or digit",
            Self::Length => "must be between 3 and 255 characters long",
            Self::IpAddressShape => "must not be formatted as an IP address",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid bucket name {value:?}: {violation}")]
    InvalidBucketName {
        value: String,
        violation: BucketNameViolation,
    },

    #[error("invalid region {0:?}: not a known region code")]
    InvalidRegion(String),

    #[error("missing signing context: {0}")]
    MissingSigningContext(String),

    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid endpoint {0:?}: expected host[:port] without a path or query")]
    InvalidEndpoint(String),

    #[error("invalid header {name:?}: {value:?}")]
    InvalidHeader { name: String, value: String },

    #[error("invalid presign expiry of {0} seconds")]
    InvalidExpiry(u32),

    #[error("invalid post policy: {0}")]
    InvalidPostPolicy(#[from] serde_json::Error),

    #[error("sign error: {0}")]
    SignError(String),
}

impl From<hmac::digest::InvalidLength> for Error {
    fn from(e: hmac::digest::InvalidLength) -> Self {
        Self::SignError(e.to_string())
    }
}

/// Why a bucket cannot be addressed as `bucket.endpoint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VirtualHostIncompatibility {
    UppercaseOrUnderscore,
    NotDnsLabel,
    /// Dotted names break wildcard certificates.
    DottedOverTls,
}

impl fmt::Display for VirtualHostIncompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::UppercaseOrUnderscore => "contains uppercase letters or underscores",
            Self::NotDnsLabel => "is not a valid DNS name",
            Self::DottedOverTls => "contains dots and the endpoint uses https",
        };
        f.write_str(msg)
    }
}

/// Non-fatal findings recorded while building a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Advisory {
    /// Virtual-host addressing was requested but path-style was used instead.
    VirtualHostIncompatible {
        bucket: String,
        reason: VirtualHostIncompatibility,
    },
    /// The signing clock disagrees with the wall clock by more than the service tolerates.
    ClockSkewRisk {
        skew_seconds: i64,
        tolerance_seconds: i64,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VirtualHostIncompatible { bucket, reason } => write!(
                f,
                "bucket {:?} {}, falling back to path-style addressing",
                bucket, reason
            ),
            Self::ClockSkewRisk {
                skew_seconds,
                tolerance_seconds,
            } => write!(
                f,
                "signing clock is {}s away from wall clock (tolerance {}s), request may be rejected",
                skew_seconds, tolerance_seconds
            ),
        }
    }
}
