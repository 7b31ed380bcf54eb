pub const S3_ALGO_KEY: &str = "X-Amz-Algorithm";
pub const S3_CRED_KEY: &str = "X-Amz-Credential";
pub const S3_DATE_KEY: &str = "X-Amz-Date";
pub const S3_SIGNATURE_KEY: &str = "X-Amz-Signature";
pub const S3_EXPIRES_KEY: &str = "X-Amz-Expires";
pub const S3_SIGNED_HEADERS_KEY: &str = "X-Amz-SignedHeaders";
pub const S3_CONTENT_KEY: &str = "X-Amz-Content-Sha256";
pub const S3_SECURITY_TOKEN_KEY: &str = "X-Amz-Security-Token";
pub const S3_ALGO_VALUE: &str = "AWS4-HMAC-SHA256";
pub const S3_TERMINATOR: &str = "aws4_request";
pub const S3_UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
pub const S3_EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

pub const HOST_KEY: &str = "Host";
pub const DATE_KEY: &str = "Date";
pub const AUTHORIZATION_KEY: &str = "Authorization";
pub const CONTENT_TYPE_KEY: &str = "Content-Type";
pub const S3_ACL_KEY: &str = "x-amz-acl";

pub const V2_ACCESS_KEY_QUERY: &str = "AWSAccessKeyId";
pub const V2_EXPIRES_QUERY: &str = "Expires";
pub const V2_SIGNATURE_QUERY: &str = "Signature";

/// Longest validity a V4 presigned URL may carry (7 days).
pub const MAX_PRESIGN_EXPIRES: u32 = 604_800;

/// Largest clock difference the service accepts before answering `RequestTimeTooSkewed`.
pub const CLOCK_SKEW_TOLERANCE_SECONDS: i64 = 15 * 60;

pub const DEFAULT_SERVICE: &str = "s3";
pub const DEFAULT_ENDPOINT: &str = "s3.amazonaws.com";
