use std::collections::BTreeMap;

use aisread_verify::{Checksum, VerificationError};
use serde::Serialize;

/// Response headers as `(name, value)` pairs.
pub type Headers = Vec<(String, String)>;

pub(crate) const CONTENT_LENGTH: &str = "content-length";
pub(crate) const AIS_CHECKSUM_TYPE: &str = "ais-checksum-type";
pub(crate) const AIS_CHECKSUM_VALUE: &str = "ais-checksum-value";
pub(crate) const AIS_ACCESS_TIME: &str = "ais-atime";
pub(crate) const AIS_VERSION: &str = "ais-version";
pub(crate) const AIS_CUSTOM_MD: &str = "ais-custom-md";
pub(crate) const AIS_BUCKET_NAME: &str = "ais-bucket-name";
pub(crate) const AIS_BUCKET_PROVIDER: &str = "ais-bucket-provider";
pub(crate) const AIS_OBJ_NAME: &str = "ais-name";
pub(crate) const AIS_LOCATION: &str = "ais-location";
pub(crate) const AIS_MIRROR_PATHS: &str = "ais-mirror-paths";
pub(crate) const AIS_MIRROR_COPIES: &str = "ais-mirror-copies";
pub(crate) const AIS_PRESENT: &str = "ais-present";

/// Case-insensitive header lookup.
pub fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

fn header_string(headers: &[(String, String)], name: &str) -> String {
    header(headers, name).unwrap_or_default().to_string()
}

/// Object metadata parsed from HEAD or GET response headers.
///
/// A snapshot: every response produces a new value that replaces the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectAttributes {
    /// Content length, unknown when the header is absent or malformed.
    pub size:            Option<u64>,
    pub checksum_type:   String,
    pub checksum_value:  String,
    pub access_time:     String,
    pub version:         String,
    pub custom_metadata: BTreeMap<String, String>,
}

impl ObjectAttributes {
    pub fn from_headers(headers: &[(String, String)]) -> Self {
        Self {
            size:            header(headers, CONTENT_LENGTH).and_then(|v| v.trim().parse().ok()),
            checksum_type:   header_string(headers, AIS_CHECKSUM_TYPE),
            checksum_value:  header_string(headers, AIS_CHECKSUM_VALUE),
            access_time:     header_string(headers, AIS_ACCESS_TIME),
            version:         header_string(headers, AIS_VERSION),
            custom_metadata: header(headers, AIS_CUSTOM_MD)
                .map(parse_custom)
                .unwrap_or_default(),
        }
    }

    /// The checksum to validate content against.
    ///
    /// `Ok(None)` when the object carries no checksum. Types this build cannot
    /// hash come back as [`VerificationError::Unsupported`].
    pub fn checksum(&self) -> Result<Option<Checksum>, VerificationError> {
        let kind = self.checksum_type.trim();
        if kind.is_empty() || kind.eq_ignore_ascii_case("none") || self.checksum_value.is_empty() {
            return Ok(None);
        }
        Checksum::parse(kind, &self.checksum_value).map(Some)
    }
}

// Comma-separated `key=value` list; entries without exactly one `=` are skipped.
fn parse_custom(raw: &str) -> BTreeMap<String, String> {
    raw.split(',')
        .filter_map(|entry| {
            let mut parts = entry.trim().split('=');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(value), None) => Some((key.to_string(), value.to_string())),
                _ => None,
            }
        })
        .collect()
}

/// Attributes plus the placement details the cluster reports for an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectProps {
    #[serde(flatten)]
    pub attributes:      ObjectAttributes,
    pub bucket_name:     String,
    pub bucket_provider: String,
    pub name:            String,
    pub location:        String,
    pub mirror_paths:    Vec<String>,
    pub mirror_copies:   u32,
    pub present:         bool,
}

impl ObjectProps {
    pub fn from_headers(headers: &[(String, String)]) -> Self {
        Self {
            attributes:      ObjectAttributes::from_headers(headers),
            bucket_name:     header_string(headers, AIS_BUCKET_NAME),
            bucket_provider: header_string(headers, AIS_BUCKET_PROVIDER),
            name:            header_string(headers, AIS_OBJ_NAME),
            location:        header_string(headers, AIS_LOCATION),
            mirror_paths:    header(headers, AIS_MIRROR_PATHS)
                .map(|raw| {
                    raw.trim()
                        .trim_start_matches('[')
                        .trim_end_matches(']')
                        .split(',')
                        .map(str::trim)
                        .filter(|path| !path.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            mirror_copies:   header(headers, AIS_MIRROR_COPIES)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
            present:         header(headers, AIS_PRESENT) == Some("true"),
        }
    }
}
