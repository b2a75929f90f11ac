use crate::render::RenderablePrimitive;

/// Primitives recorded since the last flush, in call order.
///
/// Performance characteristics:
/// - `push()` is O(1)
/// - `clear()` keeps the allocation for the next frame
#[derive(Debug, Clone, Default)]
pub struct Batch {
    primitives: Vec<RenderablePrimitive>,
}

impl Batch {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, primitive: RenderablePrimitive) {
        self.primitives.push(primitive);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Primitives in submission order: later entries composite on top.
    #[inline]
    pub fn primitives(&self) -> &[RenderablePrimitive] {
        &self.primitives
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, RenderablePrimitive> {
        self.primitives.iter()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.primitives.clear();
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a RenderablePrimitive;
    type IntoIter = std::slice::Iter<'a, RenderablePrimitive>;

    fn into_iter(self) -> Self::IntoIter {
        self.primitives.iter()
    }
}
