//! One descriptor factory per API call.

use std::fmt;

use reqwest::Method;

use crate::s3_constant::{CONTENT_TYPE_KEY, S3_ACL_KEY};
use crate::s3_request::{RequestDescriptor, SignatureVersion};
use crate::s3_validator::{BucketName, Region};

/// Predefined grants accepted in the `x-amz-acl` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CannedAcl {
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    BucketOwnerRead,
    BucketOwnerFullControl,
}

impl CannedAcl {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::PublicRead => "public-read",
            Self::PublicReadWrite => "public-read-write",
            Self::AuthenticatedRead => "authenticated-read",
            Self::BucketOwnerRead => "bucket-owner-read",
            Self::BucketOwnerFullControl => "bucket-owner-full-control",
        }
    }
}

impl fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for a single list-objects call. Following `marker` across pages
/// is up to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsParams {
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub marker: Option<String>,
    pub max_keys: Option<u32>,
}

/// `GET /` on the service endpoint. Addressed path-style and signed with V2.
#[inline]
pub fn list_buckets() -> RequestDescriptor {
    RequestDescriptor::service(Method::GET).with_signature(SignatureVersion::V2)
}

pub fn list_objects(bucket: BucketName, params: &ListObjectsParams) -> RequestDescriptor {
    let mut desc = RequestDescriptor::bucket(Method::GET, bucket);
    if let Some(delimiter) = &params.delimiter {
        desc = desc.with_query("delimiter", delimiter.as_str());
    }
    if let Some(marker) = &params.marker {
        desc = desc.with_query("marker", marker.as_str());
    }
    if let Some(max_keys) = params.max_keys {
        desc = desc.with_query("max-keys", max_keys.to_string());
    }
    if let Some(prefix) = &params.prefix {
        desc = desc.with_query("prefix", prefix.as_str());
    }
    desc
}

/// `PUT /bucket`. Outside `us-east-1` the location goes in the body.
pub fn create_bucket(bucket: BucketName, location: Option<Region>) -> RequestDescriptor {
    let desc = RequestDescriptor::bucket(Method::PUT, bucket);
    match location {
        Some(region) if region != Region::UsEast1 => desc.with_body(format!(
            "<CreateBucketConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
             <LocationConstraint>{}</LocationConstraint>\
             </CreateBucketConfiguration>",
            region
        )),
        _ => desc,
    }
}

#[inline]
pub fn delete_bucket(bucket: BucketName) -> RequestDescriptor {
    RequestDescriptor::bucket(Method::DELETE, bucket)
}

#[inline]
pub fn head_bucket(bucket: BucketName) -> RequestDescriptor {
    RequestDescriptor::bucket(Method::HEAD, bucket)
}

#[inline]
pub fn get_bucket_location(bucket: BucketName) -> RequestDescriptor {
    RequestDescriptor::bucket(Method::GET, bucket).with_query("location", "")
}

#[inline]
pub fn get_bucket_acl(bucket: BucketName) -> RequestDescriptor {
    RequestDescriptor::bucket(Method::GET, bucket).with_query("acl", "")
}

#[inline]
pub fn put_bucket_acl(bucket: BucketName, acl: CannedAcl) -> RequestDescriptor {
    RequestDescriptor::bucket(Method::PUT, bucket)
        .with_query("acl", "")
        .with_header(S3_ACL_KEY, acl.as_str())
}

#[inline]
pub fn get_object(bucket: BucketName, key: &str) -> RequestDescriptor {
    RequestDescriptor::object(Method::GET, bucket, key)
}

pub fn put_object(
    bucket: BucketName,
    key: &str,
    body: impl Into<Vec<u8>>,
    content_type: Option<&str>,
) -> RequestDescriptor {
    let desc = RequestDescriptor::object(Method::PUT, bucket, key).with_body(body);
    match content_type {
        Some(content_type) => desc.with_header(CONTENT_TYPE_KEY, content_type),
        None => desc,
    }
}

#[inline]
pub fn head_object(bucket: BucketName, key: &str) -> RequestDescriptor {
    RequestDescriptor::object(Method::HEAD, bucket, key)
}

#[inline]
pub fn delete_object(bucket: BucketName, key: &str) -> RequestDescriptor {
    RequestDescriptor::object(Method::DELETE, bucket, key)
}

#[inline]
pub fn get_object_acl(bucket: BucketName, key: &str) -> RequestDescriptor {
    RequestDescriptor::object(Method::GET, bucket, key).with_query("acl", "")
}

#[inline]
pub fn put_object_acl(bucket: BucketName, key: &str, acl: CannedAcl) -> RequestDescriptor {
    RequestDescriptor::object(Method::PUT, bucket, key)
        .with_query("acl", "")
        .with_header(S3_ACL_KEY, acl.as_str())
}
