//! Device interface + software backend.
//!
//! The canvas never touches pixels. It records [`Batch`]es of device-space
//! primitives and hands them to a [`Device`], which owns surfaces and does
//! the rasterization. [`SoftwareDevice`] is the CPU implementation used by
//! the demo and the tests.

mod init;
mod pixmap;
mod software;
mod surface;

pub use init::RasterConfig;
pub use pixmap::Pixmap;
pub use software::SoftwareDevice;
pub use surface::{ClearMask, SurfaceHandle};

use crate::canvas::Batch;
use crate::paint::Color;

/// Rendering backend consumed by [`Canvas`](crate::canvas::Canvas).
///
/// Errors are backend-specific and travel as `anyhow::Error`; the canvas
/// wraps them in [`Error::Device`](crate::error::Error::Device).
pub trait Device {
    /// Allocates a drawing target. `sample_count` of 1 means no multisampling.
    fn create_surface(&mut self, name: &str, width: u32, height: u32, sample_count: u32) -> anyhow::Result<SurfaceHandle>;

    /// Resets the buffers selected by `mask`. Color is filled with `color`.
    fn clear(&mut self, surface: &SurfaceHandle, color: Color, mask: ClearMask);

    /// Draws every primitive of `batch`, in order, onto `surface`.
    fn submit(&mut self, surface: &SurfaceHandle, batch: &Batch) -> anyhow::Result<()>;
}

impl<D: Device + ?Sized> Device for &mut D {
    fn create_surface(&mut self, name: &str, width: u32, height: u32, sample_count: u32) -> anyhow::Result<SurfaceHandle> {
        (**self).create_surface(name, width, height, sample_count)
    }

    fn clear(&mut self, surface: &SurfaceHandle, color: Color, mask: ClearMask) {
        (**self).clear(surface, color, mask)
    }

    fn submit(&mut self, surface: &SurfaceHandle, batch: &Batch) -> anyhow::Result<()> {
        (**self).submit(surface, batch)
    }
}

impl<D: Device + ?Sized> Device for Box<D> {
    fn create_surface(&mut self, name: &str, width: u32, height: u32, sample_count: u32) -> anyhow::Result<SurfaceHandle> {
        (**self).create_surface(name, width, height, sample_count)
    }

    fn clear(&mut self, surface: &SurfaceHandle, color: Color, mask: ClearMask) {
        (**self).clear(surface, color, mask)
    }

    fn submit(&mut self, surface: &SurfaceHandle, batch: &Batch) -> anyhow::Result<()> {
        (**self).submit(surface, batch)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// What a [`RecordingDevice`] saw, in call order.
    #[derive(Debug, Clone)]
    pub(crate) enum Call {
        Clear(Color, ClearMask),
        Submit(Batch),
    }

    /// Device that keeps every call instead of drawing.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingDevice {
        pub calls: Vec<Call>,
        pub fail_submit: bool,
        pub fail_create: bool,
    }

    impl RecordingDevice {
        pub(crate) fn submits(&self) -> Vec<&Batch> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Submit(b) => Some(b),
                    Call::Clear(..) => None,
                })
                .collect()
        }
    }

    impl Device for RecordingDevice {
        fn create_surface(&mut self, name: &str, width: u32, height: u32, sample_count: u32) -> anyhow::Result<SurfaceHandle> {
            anyhow::ensure!(!self.fail_create, "surface creation refused");
            Ok(SurfaceHandle { id: 0, name: name.to_owned(), width, height, sample_count })
        }

        fn clear(&mut self, _surface: &SurfaceHandle, color: Color, mask: ClearMask) {
            self.calls.push(Call::Clear(color, mask));
        }

        fn submit(&mut self, _surface: &SurfaceHandle, batch: &Batch) -> anyhow::Result<()> {
            anyhow::ensure!(!self.fail_submit, "queue lost");
            self.calls.push(Call::Submit(batch.clone()));
            Ok(())
        }
    }
}
