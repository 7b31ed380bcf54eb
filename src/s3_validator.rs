//! Bucket name validation and region normalization.
//!
//! Both run once, when the value is constructed. Everything downstream takes the
//! validated types and never re-checks them.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{BucketNameViolation, Error, Result, VirtualHostIncompatibility};

lazy_static! {
    static ref BUCKET_CHARSET_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9._-]+$").unwrap();
    static ref IPV4_SHAPE_REGEX: Regex = Regex::new(r"^\d+\.\d+\.\d+\.\d+$").unwrap();
    static ref DNS_BUCKET_REGEX: Regex = Regex::new(r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$").unwrap();
}

const MIN_BUCKET_LEN: usize = 3;
const MAX_BUCKET_LEN: usize = 255;

/// A bucket name that passed [`validate_bucket_name`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct BucketName(String);

impl BucketName {
    #[inline]
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        validate_bucket_name(raw)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks the stricter rules a bucket must follow to be used as a DNS label
    /// in `bucket.endpoint`.
    pub fn virtual_host_compatibility(
        &self,
        https: bool,
    ) -> std::result::Result<(), VirtualHostIncompatibility> {
        let name = self.as_str();
        if name.chars().any(|c| c.is_ascii_uppercase() || c == '_') {
            return Err(VirtualHostIncompatibility::UppercaseOrUnderscore);
        }
        if !DNS_BUCKET_REGEX.is_match(name)
            || name.contains("..")
            || name.contains(".-")
            || name.contains("-.")
        {
            return Err(VirtualHostIncompatibility::NotDnsLabel);
        }
        if https && name.contains('.') {
            return Err(VirtualHostIncompatibility::DottedOverTls);
        }
        Ok(())
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BucketName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<BucketName> for String {
    fn from(bucket: BucketName) -> Self {
        bucket.0
    }
}

impl FromStr for BucketName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        validate_bucket_name(s)
    }
}

/// Validates a bucket name, stopping at the first broken rule.
///
/// Rules are checked in order: character set, first character, length, and
/// finally that the name is not shaped like an IPv4 address.
pub fn validate_bucket_name(raw: impl Into<String>) -> Result<BucketName> {
    let raw = raw.into();

    let violation = if !BUCKET_CHARSET_REGEX.is_match(&raw) {
        Some(BucketNameViolation::Charset)
    } else if !raw.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        Some(BucketNameViolation::FirstCharacter)
    } else if !(MIN_BUCKET_LEN..=MAX_BUCKET_LEN).contains(&raw.len()) {
        Some(BucketNameViolation::Length)
    } else if IPV4_SHAPE_REGEX.is_match(&raw) {
        Some(BucketNameViolation::IpAddressShape)
    } else {
        None
    };

    match violation {
        Some(violation) => Err(Error::InvalidBucketName {
            value: raw,
            violation,
        }),
        None => Ok(BucketName(raw)),
    }
}

macro_rules! regions {
    ($($variant:ident => $code:literal,)+) => {
        /// A known region code. The legacy `US` and `EU` aliases are folded into
        /// their canonical codes by [`normalize_region`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum Region {
            $($variant,)+
        }

        impl Region {
            pub const ALL: &'static [Region] = &[$(Region::$variant,)+];

            #[inline]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Region::$variant => $code,)+
                }
            }
        }
    };
}

regions! {
    UsEast1 => "us-east-1",
    UsEast2 => "us-east-2",
    UsWest1 => "us-west-1",
    UsWest2 => "us-west-2",
    UsGovEast1 => "us-gov-east-1",
    UsGovWest1 => "us-gov-west-1",
    CaCentral1 => "ca-central-1",
    SaEast1 => "sa-east-1",
    EuWest1 => "eu-west-1",
    EuWest2 => "eu-west-2",
    EuWest3 => "eu-west-3",
    EuCentral1 => "eu-central-1",
    EuCentral2 => "eu-central-2",
    EuNorth1 => "eu-north-1",
    EuSouth1 => "eu-south-1",
    EuSouth2 => "eu-south-2",
    ApEast1 => "ap-east-1",
    ApSouth1 => "ap-south-1",
    ApSouth2 => "ap-south-2",
    ApNortheast1 => "ap-northeast-1",
    ApNortheast2 => "ap-northeast-2",
    ApNortheast3 => "ap-northeast-3",
    ApSoutheast1 => "ap-southeast-1",
    ApSoutheast2 => "ap-southeast-2",
    ApSoutheast3 => "ap-southeast-3",
    ApSoutheast4 => "ap-southeast-4",
    MeSouth1 => "me-south-1",
    MeCentral1 => "me-central-1",
    IlCentral1 => "il-central-1",
    AfSouth1 => "af-south-1",
    CnNorth1 => "cn-north-1",
    CnNorthwest1 => "cn-northwest-1",
}

/// Maps a raw region string to a [`Region`], folding `US` and `EU` into
/// `us-east-1` and `eu-west-1`.
pub fn normalize_region(raw: &str) -> Result<Region> {
    let canonical = match raw {
        "US" => "us-east-1",
        "EU" => "eu-west-1",
        other => other,
    };

    Region::ALL
        .iter()
        .copied()
        .find(|region| region.as_str() == canonical)
        .ok_or_else(|| Error::InvalidRegion(raw.to_string()))
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        normalize_region(s)
    }
}

impl TryFrom<String> for Region {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        normalize_region(&value)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.as_str().to_string()
    }
}
