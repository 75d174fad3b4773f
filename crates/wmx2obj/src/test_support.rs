// In-memory segment fixtures for unit tests

use crate::{
    BLOCK_HEADER_SIZE, BLOCK_OFFSET_SIZE, BLOCKS_PER_SEGMENT, GROUP_ID_SIZE, POLYGON_SIZE,
    SEGMENT_SIZE, VERTEX_SIZE,
};

#[derive(Default)]
struct BlockLayout {
    triangles: Vec<[u8; 3]>,
    vertices: Vec<[u16; 3]>,
}

/// Builds one raw segment. Blocks without content point at a shared empty header.
pub struct SegmentBuilder {
    blocks: Vec<Option<BlockLayout>>,
    offset_overrides: Vec<(usize, u32)>,
}

impl SegmentBuilder {
    pub fn new() -> Self {
        SegmentBuilder {
            blocks: (0..BLOCKS_PER_SEGMENT).map(|_| None).collect(),
            offset_overrides: Vec::new(),
        }
    }

    pub fn block(&mut self, pos: usize, triangles: &[[u8; 3]], vertices: &[[u16; 3]]) -> &mut Self {
        self.blocks[pos] = Some(BlockLayout {
            triangles: triangles.to_vec(),
            vertices: vertices.to_vec(),
        });
        self
    }

    /// Force the raw offset table entry of `pos`
    pub fn offset(&mut self, pos: usize, offset: u32) -> &mut Self {
        self.offset_overrides.push((pos, offset));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = vec![0u8; SEGMENT_SIZE];
        let table_end = GROUP_ID_SIZE + BLOCKS_PER_SEGMENT * BLOCK_OFFSET_SIZE;
        let empty_offset = table_end;
        let mut cursor = table_end + BLOCK_HEADER_SIZE;

        for (pos, layout) in self.blocks.iter().enumerate() {
            let offset = match layout {
                Some(layout) => {
                    let start = cursor;
                    data[cursor] = layout.triangles.len() as u8;
                    data[cursor + 1] = layout.vertices.len() as u8;
                    cursor += BLOCK_HEADER_SIZE;
                    for triangle in &layout.triangles {
                        data[cursor..cursor + 3].copy_from_slice(triangle);
                        data[cursor + 3..cursor + POLYGON_SIZE].fill(0xCD);
                        cursor += POLYGON_SIZE;
                    }
                    for vertex in &layout.vertices {
                        for (i, coord) in vertex.iter().enumerate() {
                            data[cursor + i * 2..cursor + i * 2 + 2]
                                .copy_from_slice(&coord.to_le_bytes());
                        }
                        data[cursor + 6..cursor + VERTEX_SIZE].fill(0xEE);
                        cursor += VERTEX_SIZE;
                    }
                    start
                }
                None => empty_offset,
            };
            write_offset(&mut data, pos, offset as u32);
        }

        for &(pos, offset) in &self.offset_overrides {
            write_offset(&mut data, pos, offset);
        }
        data
    }
}

fn write_offset(data: &mut [u8], pos: usize, offset: u32) {
    let loc = GROUP_ID_SIZE + pos * BLOCK_OFFSET_SIZE;
    data[loc..loc + BLOCK_OFFSET_SIZE].copy_from_slice(&offset.to_le_bytes());
}

/// A single triangle over three vertices in block 0
pub fn minimal_segment() -> Vec<u8> {
    SegmentBuilder::new()
        .block(0, &[[0, 1, 2]], &[[0, 0, 0], [1000, 0, 0], [0, 500, 2000]])
        .build()
}
