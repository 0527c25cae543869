bitflags::bitflags! {
    /// Buffers addressed by a clear.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ClearMask: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

impl ClearMask {
    /// API bitfield for the selected buffers.
    pub fn token(self) -> u32 {
        let mut token = 0;
        if self.contains(ClearMask::COLOR) {
            token |= gl::COLOR_BUFFER_BIT;
        }
        if self.contains(ClearMask::DEPTH) {
            token |= gl::DEPTH_BUFFER_BIT;
        }
        if self.contains(ClearMask::STENCIL) {
            token |= gl::STENCIL_BUFFER_BIT;
        }
        token
    }
}
