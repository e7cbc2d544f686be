use crate::data::ByteRange;

/// What a GET at a given offset has to ask the server for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    /// Whole object, no `Range` header.
    Full,
    /// `bytes=<start>-`
    From(u64),
    /// `bytes=<start>-<end>`, end inclusive.
    Window(u64, u64),
    /// The offset is past the requested window; nothing is left to fetch.
    Empty,
}

impl RangeSpec {
    /// Resolve the range for a read that has already delivered `offset` bytes
    /// of an optional caller-supplied window.
    pub fn resolve(window: Option<&ByteRange>, offset: u64) -> Self {
        match window {
            None if offset == 0 => RangeSpec::Full,
            None => RangeSpec::From(offset),
            Some(range) => {
                let start = range.start.saturating_add(offset);
                match range.end {
                    Some(end) if start > end => RangeSpec::Empty,
                    Some(end) => RangeSpec::Window(start, end),
                    None => RangeSpec::From(start),
                }
            }
        }
    }

    /// Value for the `Range` request header, if one is needed.
    pub fn header_value(&self) -> Option<String> {
        match self {
            RangeSpec::Full | RangeSpec::Empty => None,
            RangeSpec::From(start) => Some(format!("bytes={start}-")),
            RangeSpec::Window(start, end) => Some(format!("bytes={start}-{end}")),
        }
    }
}
