//! Builds wire-ready, authenticated requests for S3 compatible object storage.
//!
//! An operation factory describes the call as a [`RequestDescriptor`], [`S3`]
//! picks virtual-host or path-style addressing, a V2 or V4 [`Signer`] produces
//! the authentication material, and the result is a [`SignedRequest`] that any
//! HTTP transport can send.

pub mod error;
pub mod s3;
pub mod s3_assembler;
pub mod s3_clock;
pub mod s3_constant;
pub mod s3_credentials;
pub mod s3_operation;
pub mod s3_path;
pub mod s3_post_policy;
pub mod s3_request;
pub mod s3_signer;
pub mod s3_string_to_sign;
pub mod s3_validator;

pub use error::*;
pub use s3::*;
pub use s3_assembler::*;
pub use s3_clock::*;
pub use s3_constant::*;
pub use s3_credentials::*;
pub use s3_operation::{CannedAcl, ListObjectsParams};
pub use s3_path::*;
pub use s3_post_policy::*;
pub use s3_request::*;
pub use s3_signer::*;
pub use s3_string_to_sign::*;
pub use s3_validator::*;
