//! Authentication module.
//!
//! This module provides:
//! - Credential decoding and validation with secure secret storage
//! - Nonce generation for replay attack prevention
//! - HMAC-SHA1 signature generation for Aliyun requests

mod credentials;
mod nonce;
mod signature;

pub use credentials::{BearerToken, Credential, SignedCredential, decode, encode};
pub use nonce::{FixedNonce, NonceProvider, TimestampNonce};
pub use signature::{
    SignedRequest, canonical_query, compute_signature, encode_uri_component, format_timestamp,
    percent_encode, sign_request, sign_request_at, string_to_sign,
};
