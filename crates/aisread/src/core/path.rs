use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left as-is in object names, `encodeURIComponent` style.
///
/// `/` stays literal: object names are hierarchical and the cluster routes on
/// the full path.
const OBJECT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Bucket names are a single path segment.
const BUCKET_ENCODE_SET: &AsciiSet = &OBJECT_ENCODE_SET.add(b'/');

/// Build the object endpoint for a bucket/object pair.
///
/// Trailing slashes on `endpoint` are ignored so `http://host:8080/` and
/// `http://host:8080` produce the same URL. Bucket and object names are
/// percent-encoded, so `?`, `#` and spaces stay part of the path.
pub fn object_url(endpoint: &str, bucket: &str, object: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    let object = object.trim_start_matches('/');
    format!(
        "{endpoint}/v1/objects/{}/{}",
        utf8_percent_encode(bucket, BUCKET_ENCODE_SET),
        utf8_percent_encode(object, OBJECT_ENCODE_SET)
    )
}
