#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Runtime support for generated Google API clients
//!
//! Generated client code calls into this crate for the parts of a request
//! that are the same for every API:
//! - **URI templates**: expanding `{name}` / `{+name}` path expressions with
//!   per-call values ([`uri_template`])
//! - **URL resolution**: combining a service base URL with a templated method
//!   path without expanding it ([`resolve`])
//! - **Error responses**: turning non-2xx responses into a structured
//!   [`Error`] with a stable, human-readable message ([`response`])
//! - **Variants**: decoding `"type"`-tagged JSON objects into typed shapes
//!   ([`variant`])
//! - **Uploads**: chunk-size alignment and media options ([`media`])
//!
//! The crate performs no I/O besides draining a response body handed to it.
//!
//! # Example
//!
//! ```ignore
//! use googleapi::{check_response, resolve::resolve_relative, uri_template::{expand, expand_url}};
//! use url::Url;
//!
//! // Once, when the client is built
//! let template = resolve_relative("https://storage.googleapis.com/storage/v1/", "b/{bucket}/o/{object}")?;
//!
//! // Per call; `expand` takes a path without query, `expand_url` a full URL
//! let url = expand(&template, &[("bucket", "my-bucket"), ("object", "dir/file.txt")]);
//! let listing = expand_url(&Url::parse(&format!("{template}?alt=json"))?, &[("bucket", "b")]);
//! let response = check_response(transport.get(&url).await?).await?;
//! ```

pub mod call_option;
mod error;
pub mod fields;
pub mod json;
pub mod media;
pub mod resolve;
mod response;
pub mod uri_template;
pub mod variant;

pub use call_option::{CallOption, apply_call_options};
pub use error::{Error, ErrorItem};
pub use fields::{Field, combine_fields};
pub use media::{
    DEFAULT_UPLOAD_CHUNK_SIZE, MAX_UPLOAD_CHUNK_SIZE, MIN_UPLOAD_CHUNK_SIZE, MediaOption,
    MediaOptions, process_media_options, round_chunk_size,
};
pub use resolve::{ResolveError, ResolveErrorKind, resolve_relative};
pub use response::{
    MEDIA_ERROR_BODY_LIMIT, ServerResponse, check_media_response, check_response,
    check_response_with_body,
};
pub use uri_template::{ExpansionMode, Expansions, expand, expand_url};
pub use variant::{Variant, convert_variant, variant_type};
