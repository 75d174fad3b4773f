use std::io;

/// Errors that abort a conversion run.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("bad arguments: {0}")]
    Argument(String),

    #[error("failed to open {role} file '{path}': {source}")]
    FileOpen {
        role: &'static str,
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("seek to segment {segment} failed: {source}")]
    Seek {
        segment: u32,
        #[source]
        source: io::Error,
    },

    #[error("read of segment {segment} failed{}: {source}", eof_note(.eof))]
    Read {
        segment: u32,
        eof: bool,
        #[source]
        source: io::Error,
    },

    #[error(
        "block offset too large: segment {segment} block {block} offset {offset:#x} (max {max:#x})"
    )]
    InvalidBlockOffset {
        segment: u32,
        block: usize,
        offset: u32,
        max: usize,
    },

    #[error(
        "block records out of bounds: segment {segment} block {block} \
         needs {end:#x} bytes (segment is {size:#x})"
    )]
    InvalidRecordBounds {
        segment: u32,
        block: usize,
        end: usize,
        size: usize,
    },

    #[error("write to output failed: {0}")]
    Write(#[source] io::Error),
}

impl ConvertError {
    /// True if the error came from a truncated input stream
    pub fn is_eof(&self) -> bool {
        matches!(self, ConvertError::Read { eof: true, .. })
    }
}

fn eof_note(eof: &bool) -> &'static str {
    if *eof { " (EOF was reached)" } else { "" }
}
