// Geometry emitter
// Writes OBJ `f` and `v` lines for decoded block records.

use std::io::Write;

use crate::block::{BlockView, TriangleRecord, VertexRecord};
use crate::error::ConvertError;
use crate::BLOCK_BOUNDS;

/// Map units to OBJ units
pub const SCALE: f64 = 0.001;

/// Coordinates past the block bounds are folded back via 16-bit two's complement.
pub fn fold_into_bounds(v: u16) -> u64 {
    let v = u32::from(v);
    if u64::from(v) <= BLOCK_BOUNDS {
        u64::from(v)
    } else {
        u64::from((!v).wrapping_add(1) & 0xFFFF)
    }
}

/// Running global vertex numbering shared by every block of a run.
///
/// OBJ indices are 1-based, so both counters start at 1. Local index `i` of the
/// current block maps to `prev_vert_max + i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexIndexState {
    vert_max: u64,
    prev_vert_max: u64,
}

impl VertexIndexState {
    pub fn new() -> Self {
        VertexIndexState {
            vert_max: 1,
            prev_vert_max: 1,
        }
    }

    pub fn vert_max(&self) -> u64 {
        self.vert_max
    }

    pub fn prev_vert_max(&self) -> u64 {
        self.prev_vert_max
    }

    /// Rebase local indices on the highest index seen so far
    pub fn begin_block(&mut self) {
        self.prev_vert_max = self.vert_max;
    }

    /// Global index for a local one. Only a strictly greater index raises `vert_max`.
    pub fn resolve(&mut self, local: u8) -> u64 {
        let global = self.prev_vert_max + u64::from(local);
        if global > self.vert_max {
            self.vert_max = global;
        }
        global
    }

    /// Unconditional padding step after every block. Legacy output numbering
    /// depends on it, so it must not be "fixed".
    pub fn finish_block(&mut self) {
        self.vert_max += 1;
    }
}

impl Default for VertexIndexState {
    fn default() -> Self {
        Self::new()
    }
}

/// OBJ line writer with running totals.
pub struct GeometryEmitter<W> {
    out: W,
    faces_written: u64,
    vertices_written: u64,
}

impl<W: Write> GeometryEmitter<W> {
    pub fn new(out: W) -> Self {
        GeometryEmitter {
            out,
            faces_written: 0,
            vertices_written: 0,
        }
    }

    pub fn faces_written(&self) -> u64 {
        self.faces_written
    }

    pub fn vertices_written(&self) -> u64 {
        self.vertices_written
    }

    /// Write `f a b c` with indices in record order (winding is preserved).
    pub fn write_face(
        &mut self,
        state: &mut VertexIndexState,
        triangle: &TriangleRecord,
    ) -> Result<[u64; 3], ConvertError> {
        let [a, b, c] = triangle.indices.map(|local| state.resolve(local));
        writeln!(self.out, "f {a} {b} {c}").map_err(ConvertError::Write)?;
        self.faces_written += 1;
        Ok([a, b, c])
    }

    /// Write `v x y z`. `origin` is the `(x, z)` world offset of the block; y
    /// carries no offset.
    pub fn write_vertex(
        &mut self,
        origin: (u64, u64),
        vertex: &VertexRecord,
    ) -> Result<(), ConvertError> {
        let [bx, by, bz] = vertex.raw.map(fold_into_bounds);
        let x = (origin.0 + bx) as f64 * SCALE;
        let y = by as f64 * SCALE;
        let z = (origin.1 + bz) as f64 * SCALE;
        writeln!(self.out, "v {x:.3} {y:.3} {z:.3}").map_err(ConvertError::Write)?;
        self.vertices_written += 1;
        Ok(())
    }

    /// All faces of the block, then all of its vertices.
    pub fn emit_block(
        &mut self,
        block: BlockView<'_>,
        origin: (u64, u64),
        state: &mut VertexIndexState,
    ) -> Result<(), ConvertError> {
        for triangle in block.triangles() {
            self.write_face(state, &triangle)?;
        }
        for vertex in block.vertices() {
            self.write_vertex(origin, &vertex)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ConvertError> {
        self.out.flush().map_err(ConvertError::Write)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn output(emitter: GeometryEmitter<Vec<u8>>) -> String {
        String::from_utf8(emitter.into_inner()).unwrap()
    }

    #[test]
    fn test_fold_within_bounds() {
        assert_eq!(fold_into_bounds(0), 0);
        assert_eq!(fold_into_bounds(1), 1);
        assert_eq!(fold_into_bounds(2047), 2047);
        assert_eq!(fold_into_bounds(2048), 2048);
    }

    #[test]
    fn test_fold_twos_complement() {
        assert_eq!(fold_into_bounds(65535), 1);
        assert_eq!(fold_into_bounds(65534), 2);
        assert_eq!(fold_into_bounds((65536_u32 - 100) as u16), 100);
        assert_eq!(fold_into_bounds(2049), 65536 - 2049);
        for v in 2049..=u16::MAX {
            assert_eq!(fold_into_bounds(v), u64::from(v.wrapping_neg()));
        }
    }

    #[test]
    fn test_face_uses_block_base() {
        let mut state = VertexIndexState::new();
        let mut emitter = GeometryEmitter::new(Vec::new());
        state.begin_block();
        let indices = emitter
            .write_face(&mut state, &TriangleRecord { indices: [0, 1, 2] })
            .unwrap();
        assert_eq!(indices, [1, 2, 3]);
        assert_eq!(state.vert_max(), 3);
        assert_eq!(output(emitter), "f 1 2 3\n");
    }

    #[test]
    fn test_equal_index_does_not_raise_max() {
        let mut state = VertexIndexState::new();
        state.begin_block();
        assert_eq!(state.resolve(4), 5);
        assert_eq!(state.vert_max(), 5);
        assert_eq!(state.resolve(4), 5);
        assert_eq!(state.resolve(0), 1);
        assert_eq!(state.vert_max(), 5);
    }

    #[test]
    fn test_padding_after_block() {
        let mut state = VertexIndexState::new();

        // Empty block still pads
        state.begin_block();
        state.finish_block();
        assert_eq!(state.vert_max(), 2);

        state.begin_block();
        assert_eq!(state.prev_vert_max(), 2);
        assert_eq!(state.resolve(2), 4);
        state.finish_block();
        assert_eq!(state.vert_max(), 5);
    }

    #[test]
    fn test_vert_max_is_monotonic() {
        let mut state = VertexIndexState::new();
        let mut seed: u32 = 0x1234_5678;
        for _ in 0..200 {
            let before = state.vert_max();
            state.begin_block();
            assert!(state.prev_vert_max() <= state.vert_max());

            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let count = seed >> 28;
            for _ in 0..count {
                seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                state.resolve((seed >> 24) as u8);
                assert!(state.prev_vert_max() <= state.vert_max());
            }
            state.finish_block();
            assert!(state.vert_max() > before);
        }
    }

    #[test]
    fn test_vertex_line() {
        let mut emitter = GeometryEmitter::new(Vec::new());
        let origin = (8192 + 2048, 4096);
        emitter
            .write_vertex(origin, &VertexRecord { raw: [100, 0xFFFF, 2048] })
            .unwrap();
        emitter
            .write_vertex((0, 0), &VertexRecord { raw: [0, 0, 0] })
            .unwrap();
        assert_eq!(emitter.vertices_written(), 2);
        assert_eq!(
            output(emitter),
            "v 10.340 0.001 6.144\nv 0.000 0.000 0.000\n"
        );
    }

    #[test]
    fn test_large_coordinates_keep_three_decimals() {
        let mut emitter = GeometryEmitter::new(Vec::new());
        let origin = (31 * 8192 + 3 * 2048, 26 * 8192 + 3 * 2048);
        emitter
            .write_vertex(origin, &VertexRecord { raw: [2049, 1234, 2047] })
            .unwrap();
        // 2049 folds to 63487
        assert_eq!(output(emitter), "v 323.583 1.234 221.183\n");
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_error() {
        let mut emitter = GeometryEmitter::new(FailingWriter);
        let mut state = VertexIndexState::new();
        let err = emitter
            .write_face(&mut state, &TriangleRecord { indices: [0, 1, 2] })
            .unwrap_err();
        assert!(matches!(err, ConvertError::Write(_)));
        assert_eq!(emitter.faces_written(), 0);
    }
}
