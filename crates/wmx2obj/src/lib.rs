// wmx2obj - World map geometry (wmx) to Wavefront OBJ converter
//
// Decoding layers, innermost first:
// - segment: fixed-size segment reads from the input stream
// - block:   offset table resolution and block record views
// - emit:    OBJ face/vertex lines and global vertex numbering
// - convert: segment range iteration and world offsets

pub mod block;
pub mod convert;
pub mod emit;
pub mod error;
pub mod segment;

#[cfg(test)]
pub(crate) mod test_support;

pub use convert::{convert_to_obj, ConversionStats, SegmentRange};
pub use error::ConvertError;

/// Size of one segment in the input file
pub const SEGMENT_SIZE: usize = 0x9000;
pub const SEGMENT_MIN: u32 = 0;
pub const SEGMENT_MAX: u32 = 834;
pub const SEGMENTS_PER_ROW: u32 = 32;
/// Width of a segment in map units
pub const SEGMENT_BOUNDS: u64 = 8192;

pub const BLOCKS_PER_SEGMENT: usize = 16;
pub const BLOCKS_PER_ROW: usize = 4;
pub const BLOCK_SIZE: usize = SEGMENT_SIZE / BLOCKS_PER_SEGMENT;
/// Largest offset table entry that keeps a block inside its segment
pub const BLOCK_OFFSET_MAX: usize = SEGMENT_SIZE - BLOCK_SIZE;
/// Width of a block in map units
pub const BLOCK_BOUNDS: u64 = SEGMENT_BOUNDS / BLOCKS_PER_ROW as u64;

/// Leading group id before the block offset table
pub const GROUP_ID_SIZE: usize = 4;
pub const BLOCK_OFFSET_SIZE: usize = 4;
pub const BLOCK_HEADER_SIZE: usize = 4;
pub const POLYGON_SIZE: usize = 16;
pub const VERTEX_SIZE: usize = 8;
pub const VERTICES_PER_POLYGON: usize = 3;
