//! Text: typeface interface, shaped text blobs and a fontdue backend.
//!
//! Text is drawn as geometry. A [`TextBlob`] holds glyph outlines, and the
//! canvas fills or strokes them like any other path.

mod blob;
mod font;
mod typeface;

pub use blob::{TextBlob, TextBlobBuilder, TextBlobData};
pub use font::{FontLoadError, FontdueTypeface};
pub use typeface::{Glyph, GlyphRun, Typeface};

#[cfg(test)]
pub(crate) use blob::tests::{BoxTypeface, box_paint};
