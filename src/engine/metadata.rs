use glam::DVec2;

use crate::geometry::Direction;
use crate::scene::NodeId;

/// Per-body bookkeeping owned by the engine, rebuilt on `update_metadata`
/// and mutated every frame.
///
/// `contiguous` holds registry indices, not node ids, and is kept
/// symmetric: if A records B in its Down slot, B records A in its Up slot.
#[derive(Debug, Clone)]
pub(crate) struct BodyState {
    pub node: NodeId,
    /// Global position at the start of the previous frame, for static
    /// detection and overlap rollback.
    pub last_position: DVec2,
    /// Touching neighbor per direction, indexed by `Direction::index`.
    pub contiguous: [Option<usize>; 4],
    pub static_frames: usize,
    pub is_static: bool,
    pub is_stand: bool,
    /// Contact chain id for this frame; 0 means unconnected.
    pub connection: u64,
}

impl BodyState {
    pub fn new(node: NodeId, position: DVec2) -> Self {
        BodyState {
            node,
            last_position: position,
            contiguous: [None; 4],
            static_frames: 0,
            is_static: false,
            is_stand: false,
            connection: 0,
        }
    }

    /// Clears the per-frame contact state. Static bodies keep their stand
    /// flag so a sleeping stack does not wake itself by losing support.
    pub fn reset_contacts(&mut self) {
        self.contiguous = [None; 4];
        self.connection = 0;
        if !self.is_static {
            self.is_stand = false;
        }
    }

    pub fn contact(&self, direction: Direction) -> Option<usize> {
        self.contiguous[direction.index()]
    }
}
