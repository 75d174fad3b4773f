// Block layer
// Resolves a block through the segment's offset table and exposes its raw
// triangle and vertex records as borrowed views into the segment buffer.

use byteorder::{ByteOrder, LittleEndian};
use wmx_shared::util::ByteReader;

use crate::error::ConvertError;
use crate::{
    BLOCK_BOUNDS, BLOCK_HEADER_SIZE, BLOCK_OFFSET_MAX, BLOCK_OFFSET_SIZE, BLOCKS_PER_ROW,
    BLOCKS_PER_SEGMENT, GROUP_ID_SIZE, POLYGON_SIZE, VERTEX_SIZE, VERTICES_PER_POLYGON,
};

/// Triangle record; only the three local vertex indices are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangleRecord {
    pub indices: [u8; VERTICES_PER_POLYGON],
}

impl TriangleRecord {
    fn from_bytes(bytes: &[u8]) -> Self {
        TriangleRecord {
            indices: [bytes[0], bytes[1], bytes[2]],
        }
    }
}

/// Vertex record holding raw (unfolded) 16-bit x, y, z coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexRecord {
    pub raw: [u16; 3],
}

impl VertexRecord {
    fn from_bytes(bytes: &[u8]) -> Self {
        VertexRecord {
            raw: [
                LittleEndian::read_u16(&bytes[0..2]),
                LittleEndian::read_u16(&bytes[2..4]),
                LittleEndian::read_u16(&bytes[4..6]),
            ],
        }
    }
}

/// World offset `(x, z)` of block `pos` relative to its segment's corner
pub fn block_world_offset(pos: usize) -> (u64, u64) {
    (
        (pos % BLOCKS_PER_ROW) as u64 * BLOCK_BOUNDS,
        (pos / BLOCKS_PER_ROW) as u64 * BLOCK_BOUNDS,
    )
}

/// A decoded block header with views over its record lists.
#[derive(Debug, Clone, Copy)]
pub struct BlockView<'a> {
    pub position: usize,
    /// Resolved byte offset of the block header within the segment
    pub offset: usize,
    polygons: &'a [u8],
    vertices: &'a [u8],
}

impl<'a> BlockView<'a> {
    pub fn num_triangles(&self) -> usize {
        self.polygons.len() / POLYGON_SIZE
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / VERTEX_SIZE
    }

    pub fn triangles(self) -> impl Iterator<Item = TriangleRecord> + 'a {
        self.polygons
            .chunks_exact(POLYGON_SIZE)
            .map(TriangleRecord::from_bytes)
    }

    pub fn vertices(self) -> impl Iterator<Item = VertexRecord> + 'a {
        self.vertices
            .chunks_exact(VERTEX_SIZE)
            .map(VertexRecord::from_bytes)
    }
}

/// Decode block `pos` of a segment.
///
/// `segment` is only used to label errors. Fails with `InvalidBlockOffset` when
/// the offset table entry exceeds `BLOCK_OFFSET_MAX`, and with
/// `InvalidRecordBounds` when the header or records would run past the end of
/// `data`.
pub fn decode_block(data: &[u8], segment: u32, pos: usize) -> Result<BlockView<'_>, ConvertError> {
    debug_assert!(pos < BLOCKS_PER_SEGMENT);

    let out_of_bounds = |end: usize| ConvertError::InvalidRecordBounds {
        segment,
        block: pos,
        end,
        size: data.len(),
    };

    let offset_loc = GROUP_ID_SIZE + pos * BLOCK_OFFSET_SIZE;
    let offset = ByteReader::at(data, offset_loc)
        .and_then(|mut reader| reader.read_u32())
        .map_err(|_| out_of_bounds(offset_loc + BLOCK_OFFSET_SIZE))?;

    if offset as usize > BLOCK_OFFSET_MAX {
        return Err(ConvertError::InvalidBlockOffset {
            segment,
            block: pos,
            offset,
            max: BLOCK_OFFSET_MAX,
        });
    }
    let offset = offset as usize;

    let mut reader =
        ByteReader::at(data, offset).map_err(|_| out_of_bounds(offset + BLOCK_HEADER_SIZE))?;
    let (num_polys, num_verts) =
        read_header(&mut reader).map_err(|_| out_of_bounds(offset + BLOCK_HEADER_SIZE))?;

    let polygons_len = num_polys * POLYGON_SIZE;
    let vertices_len = num_verts * VERTEX_SIZE;
    let end = offset + BLOCK_HEADER_SIZE + polygons_len + vertices_len;
    if end > data.len() {
        return Err(out_of_bounds(end));
    }

    let polygons = reader.read_slice(polygons_len).map_err(|_| out_of_bounds(end))?;
    let vertices = reader.read_slice(vertices_len).map_err(|_| out_of_bounds(end))?;

    Ok(BlockView {
        position: pos,
        offset,
        polygons,
        vertices,
    })
}

/// Triangle count, vertex count, then two reserved bytes
fn read_header(reader: &mut ByteReader<'_>) -> std::io::Result<(usize, usize)> {
    let num_polys = reader.read_u8()?;
    let num_verts = reader.read_u8()?;
    reader.skip(BLOCK_HEADER_SIZE - 2)?;
    Ok((usize::from(num_polys), usize::from(num_verts)))
}
