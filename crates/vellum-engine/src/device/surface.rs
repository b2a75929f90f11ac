use std::ops::BitOr;

/// Drawing target handed out by [`Device::create_surface`](super::Device::create_surface).
///
/// The handle is plain data; the device owns the pixels behind it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SurfaceHandle {
    pub id: u32,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
}

/// Buffers affected by [`Device::clear`](super::Device::clear).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ClearMask(u8);

impl ClearMask {
    pub const COLOR: ClearMask = ClearMask(0b01);
    pub const STENCIL: ClearMask = ClearMask(0b10);
    pub const ALL: ClearMask = ClearMask(0b11);

    #[inline]
    pub const fn contains(self, other: ClearMask) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for ClearMask {
    type Output = ClearMask;

    #[inline]
    fn bitor(self, rhs: ClearMask) -> ClearMask {
        ClearMask(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_combines() {
        assert_eq!(ClearMask::COLOR | ClearMask::STENCIL, ClearMask::ALL);
        assert!(ClearMask::ALL.contains(ClearMask::STENCIL));
        assert!(!ClearMask::COLOR.contains(ClearMask::STENCIL));
    }
}
