// Conversion driver
// Walks an inclusive segment range, decoding every block in order and
// threading the global vertex numbering through the whole run.

use std::io::{Read, Seek, Write};

use crate::block::{block_world_offset, decode_block};
use crate::emit::{GeometryEmitter, VertexIndexState};
use crate::error::ConvertError;
use crate::segment::{GridPosition, SegmentBuffer, SegmentReader};
use crate::{BLOCKS_PER_SEGMENT, SEGMENT_MAX, SEGMENT_MIN, SEGMENTS_PER_ROW};

/// Inclusive range of segment indices to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentRange {
    start: u32,
    end: u32,
}

impl SegmentRange {
    pub fn new(start: u32, end: u32) -> Result<Self, ConvertError> {
        if start > SEGMENT_MAX {
            return Err(ConvertError::Argument(format!(
                "start segment {start} out of range {SEGMENT_MIN}-{SEGMENT_MAX}"
            )));
        }
        if end > SEGMENT_MAX {
            return Err(ConvertError::Argument(format!(
                "end segment {end} out of range {start}-{SEGMENT_MAX}"
            )));
        }
        if end < start {
            return Err(ConvertError::Argument(format!(
                "end segment {end} is before start segment {start}"
            )));
        }
        Ok(SegmentRange { start, end })
    }

    /// Every segment of the map
    pub fn full() -> Self {
        SegmentRange {
            start: SEGMENT_MIN,
            end: SEGMENT_MAX,
        }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Grid index used for the world offset of the first segment.
    ///
    /// Keeps the model close to the origin: ranges spanning several rows start
    /// at the start segment's column, single-row ranges start at column 0. The
    /// index then advances by one per segment.
    pub fn first_grid_index(&self) -> u32 {
        if self.start / SEGMENTS_PER_ROW != self.end / SEGMENTS_PER_ROW {
            self.start % SEGMENTS_PER_ROW
        } else {
            0
        }
    }
}

/// Totals for a finished run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConversionStats {
    pub segments: u32,
    pub blocks: u32,
    pub faces: u64,
    pub vertices: u64,
    /// Final value of the global vertex counter
    pub vert_max: u64,
}

/// Owns the emitter and the vertex numbering state for one run.
pub struct ConversionDriver<W> {
    emitter: GeometryEmitter<W>,
    state: VertexIndexState,
    segments: u32,
    blocks: u32,
}

impl<W: Write> ConversionDriver<W> {
    pub fn new(output: W) -> Self {
        ConversionDriver {
            emitter: GeometryEmitter::new(output),
            state: VertexIndexState::new(),
            segments: 0,
            blocks: 0,
        }
    }

    pub fn stats(&self) -> ConversionStats {
        ConversionStats {
            segments: self.segments,
            blocks: self.blocks,
            faces: self.emitter.faces_written(),
            vertices: self.emitter.vertices_written(),
            vert_max: self.state.vert_max(),
        }
    }

    /// Read and convert every segment of `range`, then flush the output.
    pub fn run<R: Read + Seek>(
        &mut self,
        input: R,
        range: SegmentRange,
    ) -> Result<ConversionStats, ConvertError> {
        let mut reader = SegmentReader::new(input);
        reader.seek_to_segment(range.start())?;

        let mut buffer = SegmentBuffer::new();
        let mut grid_index = range.first_grid_index();

        for _ in range.start()..=range.end() {
            let segment = reader.read_segment(&mut buffer).inspect_err(|err| {
                tracing::error!("{}", err);
            })?;
            self.convert_segment(buffer.as_slice(), segment, grid_index)?;
            grid_index += 1;
        }

        self.emitter.flush()?;
        Ok(self.stats())
    }

    /// Convert all blocks of one raw segment placed at `grid_index` in the world.
    pub fn convert_segment(
        &mut self,
        data: &[u8],
        segment: u32,
        grid_index: u32,
    ) -> Result<(), ConvertError> {
        let grid = GridPosition::from_index(grid_index);
        let (x, z) = grid.world_offset();
        tracing::debug!(
            "Segment {} -> grid {} (row {}, col {})",
            segment,
            grid_index,
            grid.row,
            grid.col
        );

        for pos in 0..BLOCKS_PER_SEGMENT {
            let block = decode_block(data, segment, pos).inspect_err(|err| {
                tracing::error!("{}", err);
            })?;
            let (bx, bz) = block_world_offset(pos);
            tracing::trace!(
                "Segment {} block {}: offset={:#x} triangles={} vertices={} base={}",
                segment,
                pos,
                block.offset,
                block.num_triangles(),
                block.num_vertices(),
                self.state.vert_max()
            );

            self.state.begin_block();
            self.emitter.emit_block(block, (x + bx, z + bz), &mut self.state)?;
            self.state.finish_block();
            self.blocks += 1;
        }

        self.segments += 1;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.emitter.into_inner()
    }
}

/// Convert `range` of `input` into OBJ text on `output`.
///
/// On error the output holds everything emitted before the failing block.
pub fn convert_to_obj<R, W>(
    input: R,
    output: W,
    range: SegmentRange,
) -> Result<ConversionStats, ConvertError>
where
    R: Read + Seek,
    W: Write,
{
    tracing::info!(
        "Converting segments {}-{} ({} segments)",
        range.start(),
        range.end(),
        range.len()
    );
    let stats = ConversionDriver::new(output).run(input, range)?;
    tracing::info!(
        "Wrote {} vertices and {} faces from {} blocks in {} segments",
        stats.vertices,
        stats.faces,
        stats.blocks,
        stats.segments
    );
    Ok(stats)
}
