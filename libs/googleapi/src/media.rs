//! Upload configuration: chunk sizes and per-call media options.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

/// Chunk sizes must be a multiple of this (256 KiB).
pub const MIN_UPLOAD_CHUNK_SIZE: usize = 256 * 1024;

/// Chunk size used when none is configured (16 MiB).
pub const DEFAULT_UPLOAD_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Largest chunk size that is still a multiple of [`MIN_UPLOAD_CHUNK_SIZE`].
pub const MAX_UPLOAD_CHUNK_SIZE: usize = usize::MAX - usize::MAX % MIN_UPLOAD_CHUNK_SIZE;

/// Rounds `size` up to the next multiple of [`MIN_UPLOAD_CHUNK_SIZE`].
///
/// `0` stays `0` and disables chunking: the media is sent in a single request.
/// Sizes whose rounded value would overflow saturate at [`MAX_UPLOAD_CHUNK_SIZE`].
///
/// ```
/// use googleapi::media::round_chunk_size;
///
/// assert_eq!(round_chunk_size(0), 0);
/// assert_eq!(round_chunk_size(1), 262_144);
/// assert_eq!(round_chunk_size(262_144), 262_144);
/// ```
#[must_use]
pub fn round_chunk_size(size: usize) -> usize {
    size.div_ceil(MIN_UPLOAD_CHUNK_SIZE)
        .checked_mul(MIN_UPLOAD_CHUNK_SIZE)
        .unwrap_or(MAX_UPLOAD_CHUNK_SIZE)
}

/// Options controlling how media is uploaded.
///
/// Deserializable from host configuration; durations are human readable
/// (`"30s"`, `"2m 30s"`) and `chunk_size` is rounded with [`round_chunk_size`].
///
/// ```
/// use googleapi::media::MediaOptions;
///
/// let opts: MediaOptions = serde_json::from_str(
///     r#"{"chunk_size": 1000000, "chunk_retry_deadline": "1m"}"#,
/// )?;
/// assert_eq!(opts.chunk_size, 1_048_576);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaOptions {
    /// Content type of the media; `None` lets the transport sniff it
    pub content_type: Option<String>,

    /// Send an empty `Content-Type` instead of sniffing one
    pub force_empty_content_type: bool,

    /// Bytes per upload request, `0` uploads in a single request
    #[serde(deserialize_with = "deserialize_chunk_size")]
    pub chunk_size: usize,

    /// How long a single chunk may keep being retried
    #[serde(with = "duration_serde")]
    pub chunk_retry_deadline: Option<Duration>,

    /// Timeout for transferring a single chunk
    #[serde(with = "duration_serde")]
    pub chunk_transfer_timeout: Option<Duration>,
}

impl Default for MediaOptions {
    fn default() -> Self {
        Self {
            content_type: None,
            force_empty_content_type: false,
            chunk_size: DEFAULT_UPLOAD_CHUNK_SIZE,
            chunk_retry_deadline: None,
            chunk_transfer_timeout: None,
        }
    }
}

/// A single per-call media option.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MediaOption {
    /// Content type of the media; an empty string forces an empty `Content-Type`
    ContentType(String),
    /// Requested chunk size, rounded up to a multiple of [`MIN_UPLOAD_CHUNK_SIZE`]
    ChunkSize(usize),
    /// See [`MediaOptions::chunk_retry_deadline`]
    ChunkRetryDeadline(Duration),
    /// See [`MediaOptions::chunk_transfer_timeout`]
    ChunkTransferTimeout(Duration),
}

impl MediaOption {
    /// Applies this option to `opts`.
    pub fn apply(&self, opts: &mut MediaOptions) {
        match self {
            Self::ContentType(content_type) => {
                opts.force_empty_content_type = content_type.is_empty();
                opts.content_type = Some(content_type.clone());
            }
            Self::ChunkSize(size) => opts.chunk_size = round_chunk_size(*size),
            Self::ChunkRetryDeadline(deadline) => opts.chunk_retry_deadline = Some(*deadline),
            Self::ChunkTransferTimeout(timeout) => opts.chunk_transfer_timeout = Some(*timeout),
        }
    }
}

/// Builds [`MediaOptions`] from defaults plus `options`, later options winning.
#[must_use]
pub fn process_media_options(options: &[MediaOption]) -> MediaOptions {
    let mut opts = MediaOptions::default();
    for option in options {
        option.apply(&mut opts);
    }
    opts
}

fn deserialize_chunk_size<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    usize::deserialize(deserializer).map(round_chunk_size)
}

/// Serde adapter for `Option<Duration>` as humantime strings.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    #[allow(clippy::ref_option)] // serde requires &T signature
    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => {
                serializer.serialize_str(&humantime::format_duration(*duration).to_string())
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| {
                humantime::parse_duration(&raw).map_err(|_| {
                    de::Error::invalid_value(de::Unexpected::Str(&raw), &"a duration")
                })
            })
            .transpose()
    }
}
