//! Transport decoding of captured response bodies.
//!
//! The declared `Content-Encoding` of an intercepted response is not always
//! truthful: browsers frequently hand back bodies that were already inflated
//! while keeping the original header. Decoding therefore falls back to the raw
//! bytes whenever the declared algorithm rejects the stream.

use std::io::Read;

use flate2::read::GzDecoder;
use serde::Deserialize;
use serde_json::Value;

use crate::error::DecodeError;
use crate::model::FeedRecord;

/// Status code the endpoint uses for success.
pub const SUCCESS_CODE: i64 = 0;

/// Transport encodings recognized on captured responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Identity,
    Gzip,
    Brotli,
}

impl ContentEncoding {
    /// Parses a `Content-Encoding` label. Unknown labels are treated as identity.
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return ContentEncoding::Identity;
        };
        let label = label.trim();
        if label.eq_ignore_ascii_case("gzip") || label.eq_ignore_ascii_case("x-gzip") {
            ContentEncoding::Gzip
        } else if label.eq_ignore_ascii_case("br") {
            ContentEncoding::Brotli
        } else {
            ContentEncoding::Identity
        }
    }

    fn decompress(self, raw: &[u8]) -> std::io::Result<Vec<u8>> {
        match self {
            ContentEncoding::Identity => Ok(raw.to_vec()),
            ContentEncoding::Gzip => {
                let mut out = Vec::new();
                GzDecoder::new(raw).read_to_end(&mut out)?;
                Ok(out)
            }
            ContentEncoding::Brotli => {
                let mut out = Vec::new();
                brotli::BrotliDecompress(&mut std::io::Cursor::new(raw), &mut out)?;
                Ok(out)
            }
        }
    }
}

/// Top-level response of the items endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEnvelope {
    #[serde(default = "missing_code")]
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    /// Error envelopes may carry `"data": null`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: FeedPage,
}

/// One page of the feed. Elements stay raw until [`FeedPage::records`] so a
/// malformed element is dropped alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub list: Vec<Value>,
}

impl FeedPage {
    /// Converts each element separately, in page order.
    pub fn records(self) -> impl Iterator<Item = Result<FeedRecord, serde_json::Error>> {
        self.list.into_iter().map(serde_json::from_value)
    }
}

fn missing_code() -> i64 {
    -1
}

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

impl FeedEnvelope {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// Decodes raw bytes under `label` into UTF-8 text.
///
/// If the declared decompression fails, the raw bytes are tried as UTF-8
/// before giving up.
pub fn decode_text(raw: &[u8], label: Option<&str>) -> Result<String, DecodeError> {
    let encoding = ContentEncoding::from_label(label);
    match encoding.decompress(raw) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => Err(DecodeError::Utf8(e.utf8_error())),
        },
        Err(e) => {
            tracing::debug!(
                ?encoding,
                error = %e,
                "decompression failed, retrying body as plain text"
            );
            Ok(std::str::from_utf8(raw)?.to_owned())
        }
    }
}

/// Decodes raw bytes under `label` and parses the feed envelope.
pub fn decode(raw: &[u8], label: Option<&str>) -> Result<FeedEnvelope, DecodeError> {
    let text = decode_text(raw, label)?;
    Ok(serde_json::from_str(&text)?)
}
