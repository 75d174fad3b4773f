// Segment layer
// Reads fixed-size segments sequentially from a seekable input stream

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::error::ConvertError;
use crate::{SEGMENT_BOUNDS, SEGMENT_SIZE, SEGMENTS_PER_ROW};

/// Reusable buffer holding exactly one raw segment.
pub struct SegmentBuffer {
    data: Box<[u8]>,
}

impl SegmentBuffer {
    pub fn new() -> Self {
        SegmentBuffer {
            data: vec![0u8; SEGMENT_SIZE].into_boxed_slice(),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Default for SegmentBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Position of a segment in the world map grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    pub row: u32,
    pub col: u32,
}

impl GridPosition {
    pub fn from_index(index: u32) -> Self {
        GridPosition {
            row: index / SEGMENTS_PER_ROW,
            col: index % SEGMENTS_PER_ROW,
        }
    }

    /// World offset `(x, z)` of the segment's corner in map units
    pub fn world_offset(&self) -> (u64, u64) {
        (
            u64::from(self.col) * SEGMENT_BOUNDS,
            u64::from(self.row) * SEGMENT_BOUNDS,
        )
    }
}

/// Sequential segment reader.
///
/// The stream is positioned once with [`SegmentReader::seek_to_segment`]; every
/// [`SegmentReader::read_segment`] afterwards consumes the following segment.
pub struct SegmentReader<R> {
    inner: R,
    next_segment: u32,
}

impl<R: Read + Seek> SegmentReader<R> {
    pub fn new(inner: R) -> Self {
        SegmentReader {
            inner,
            next_segment: 0,
        }
    }

    pub fn seek_to_segment(&mut self, index: u32) -> Result<(), ConvertError> {
        let pos = u64::from(index) * SEGMENT_SIZE as u64;
        self.inner
            .seek(SeekFrom::Start(pos))
            .map_err(|source| ConvertError::Seek {
                segment: index,
                source,
            })?;
        self.next_segment = index;
        Ok(())
    }

    /// Fill `buffer` with the next segment and return its file index.
    pub fn read_segment(&mut self, buffer: &mut SegmentBuffer) -> Result<u32, ConvertError> {
        let segment = self.next_segment;
        self.inner
            .read_exact(buffer.as_mut_slice())
            .map_err(|source| ConvertError::Read {
                segment,
                eof: source.kind() == ErrorKind::UnexpectedEof,
                source,
            })?;
        self.next_segment += 1;
        Ok(segment)
    }
}
