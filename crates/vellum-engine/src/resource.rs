//! Shared, explicitly releasable resources.
//!
//! Shaders, path effects and text blobs are immutable once built and are
//! referenced (not copied) by paints and draw calls. A [`Handle`] is an
//! `Arc` around the payload plus a release flag shared by every clone:
//! `release()` marks the resource dead for future draws, while snapshots
//! already taken keep their own `Arc` and stay valid until flushed.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// Payload types that can live behind a [`Handle`].
pub trait Resource {
    /// Name used in `UseAfterRelease` errors.
    const KIND: &'static str;
}

pub struct Handle<T: Resource> {
    value: Arc<T>,
    released: Arc<AtomicBool>,
}

impl<T: Resource> Handle<T> {
    pub(crate) fn new(value: T) -> Self {
        Self { value: Arc::new(value), released: Arc::new(AtomicBool::new(false)) }
    }

    /// Borrows the payload, or fails if any clone of this handle was released.
    pub fn get(&self) -> Result<&T> {
        if self.is_released() {
            return Err(Error::UseAfterRelease(T::KIND));
        }
        Ok(&self.value)
    }

    /// Marks the resource as released for every clone of this handle.
    ///
    /// Dropping the last handle frees the payload; calling this is only
    /// needed to make later use an error.
    pub fn release(&self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            log::trace!("{} released", T::KIND);
        }
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// True when both handles refer to the same resource.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }

    /// A strong reference to the payload, checked for release.
    pub(crate) fn share(&self) -> Result<Arc<T>> {
        self.get()?;
        Ok(Arc::clone(&self.value))
    }
}

impl<T: Resource> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self { value: Arc::clone(&self.value), released: Arc::clone(&self.released) }
    }
}

impl<T: Resource + fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("kind", &T::KIND)
            .field("released", &self.is_released())
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Dummy(u32);

    impl Resource for Dummy {
        const KIND: &'static str = "dummy";
    }

    #[test]
    fn release_is_shared_between_clones() {
        let a = Handle::new(Dummy(7));
        let b = a.clone();
        assert_eq!(b.get().unwrap().0, 7);
        a.release();
        assert!(b.is_released());
        assert!(matches!(b.get(), Err(Error::UseAfterRelease("dummy"))));
    }

    #[test]
    fn shared_payload_outlives_release() {
        let h = Handle::new(Dummy(3));
        let arc = h.share().unwrap();
        h.release();
        drop(h);
        assert_eq!(arc.0, 3);
    }

    #[test]
    fn ptr_eq_tracks_identity() {
        let a = Handle::new(Dummy(1));
        let b = Handle::new(Dummy(1));
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }
}
