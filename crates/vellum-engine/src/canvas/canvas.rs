use std::sync::Arc;

use crate::coords::{Matrix, RRect, Rect};
use crate::device::{ClearMask, Device, SurfaceHandle};
use crate::error::{Error, Result};
use crate::geometry::{Path, PathDirection};
use crate::paint::{Color, Paint, Style};
use crate::render::{PrimitivePaint, RenderablePrimitive, Tessellator};
use crate::text::{TextBlob, TextBlobBuilder};

use super::{Batch, CanvasConfig, ClipOp, ClipRegion};

/// Whether draws are pending for the device.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum CanvasState {
    /// Nothing recorded since the last flush.
    #[default]
    Idle,
    /// At least one primitive waits in the batch.
    Recording,
}

#[derive(Debug, Clone)]
struct SaveRecord {
    matrix: Matrix,
    clip: Arc<ClipRegion>,
}

/// Immediate-mode drawing frontend bound to one device surface.
///
/// Draw calls are tessellated right away into device-space primitives and
/// collected in a [`Batch`]; [`flush`](Self::flush) hands the batch to the
/// device in call order. Matrix and clip live on a save/restore stack and
/// never affect primitives that were already recorded.
///
/// Failed calls leave the canvas exactly as it was.
#[derive(Debug)]
pub struct Canvas<D: Device> {
    device: D,
    surface: SurfaceHandle,
    config: CanvasConfig,
    tessellator: Tessellator,

    matrix: Matrix,
    clip: Arc<ClipRegion>,
    stack: Vec<SaveRecord>,

    batch: Batch,
    state: CanvasState,
}

impl<D: Device> Canvas<D> {
    /// Creates a canvas drawing to a new `width x height` surface of `device`.
    pub fn make(device: D, name: &str, width: u32, height: u32, sample_count: u32) -> Result<Self> {
        Self::make_with_config(device, name, width, height, sample_count, CanvasConfig::default())
    }

    pub fn make_with_config(
        mut device: D,
        name: &str,
        width: u32,
        height: u32,
        sample_count: u32,
        config: CanvasConfig,
    ) -> Result<Self> {
        let surface = device
            .create_surface(name, width, height, sample_count)
            .map_err(|e| Error::Device(e.context(format!("creating surface {name:?}"))))?;
        log::debug!("canvas {name:?}: {width}x{height}, {sample_count} samples, tolerance {}", config.tolerance);
        Ok(Self {
            device,
            surface,
            tessellator: Tessellator::new(config.tolerance),
            config,
            matrix: Matrix::IDENTITY,
            clip: Arc::new(ClipRegion::wide_open()),
            stack: Vec::new(),
            batch: Batch::new(),
            state: CanvasState::Idle,
        })
    }

    // ── accessors ────────────────────────────────────────────────────────

    #[inline]
    pub fn device(&self) -> &D {
        &self.device
    }

    #[inline]
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Consumes the canvas. Pending draws are discarded; flush first.
    pub fn into_device(self) -> D {
        if !self.batch.is_empty() {
            log::warn!("canvas dropped with {} unflushed primitives", self.batch.len());
        }
        self.device
    }

    #[inline]
    pub fn surface(&self) -> &SurfaceHandle {
        &self.surface
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.surface.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.surface.height
    }

    #[inline]
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> CanvasState {
        self.state
    }

    /// Primitives recorded since the last flush.
    #[inline]
    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    // ── save / restore ───────────────────────────────────────────────────

    /// Pushes the current matrix and clip. Returns the save count before
    /// the push.
    pub fn save(&mut self) -> usize {
        let count = self.save_count();
        self.stack.push(SaveRecord { matrix: self.matrix, clip: Arc::clone(&self.clip) });
        count
    }

    /// Pops the state pushed by the matching [`save`](Self::save).
    pub fn restore(&mut self) -> Result<()> {
        let record = self.stack.pop().ok_or(Error::StackUnderflow)?;
        self.matrix = record.matrix;
        self.clip = record.clip;
        Ok(())
    }

    /// Number of saved states plus one for the base state.
    #[inline]
    pub fn save_count(&self) -> usize {
        self.stack.len() + 1
    }

    /// Restores until `save_count() == count`. Counts below one restore
    /// everything.
    pub fn restore_to_count(&mut self, count: usize) {
        let keep = count.max(1) - 1;
        if let Some(record) = self.stack.get(keep).cloned() {
            self.stack.truncate(keep);
            self.matrix = record.matrix;
            self.clip = record.clip;
        }
    }

    // ── matrix ───────────────────────────────────────────────────────────

    /// Pre-concatenates `m`: it applies to geometry before the current
    /// matrix does.
    pub fn concat(&mut self, m: &Matrix) {
        self.matrix = self.matrix.pre_concat(m);
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.concat(&Matrix::translate(dx, dy));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.concat(&Matrix::scale(sx, sy));
    }

    /// Rotation in degrees about the local origin.
    pub fn rotate(&mut self, degrees: f32) {
        self.concat(&Matrix::rotate(degrees));
    }

    pub fn rotate_about(&mut self, degrees: f32, px: f32, py: f32) {
        self.concat(&Matrix::rotate_about(degrees, px, py));
    }

    pub fn skew(&mut self, kx: f32, ky: f32) {
        self.concat(&Matrix::skew(kx, ky));
    }

    #[inline]
    pub fn set_matrix(&mut self, m: Matrix) {
        self.matrix = m;
    }

    #[inline]
    pub fn reset_matrix(&mut self) {
        self.matrix = Matrix::IDENTITY;
    }

    #[inline]
    pub fn total_matrix(&self) -> Matrix {
        self.matrix
    }

    // ── clip ─────────────────────────────────────────────────────────────

    /// Combines the clip with `rect` under the current matrix.
    pub fn clip_rect(&mut self, rect: Rect, op: ClipOp) {
        self.clip_path(&Path::rect(rect, PathDirection::Cw), op);
    }

    /// Combines the clip with the interior of `path` under the current
    /// matrix. The visible region only ever shrinks until `restore`.
    pub fn clip_path(&mut self, path: &Path, op: ClipOp) {
        let mesh = self.tessellator.fill(path, &self.matrix);
        Arc::make_mut(&mut self.clip).apply(op, mesh);
        log::trace!("clip {op:?}: bounds {:?}", self.clip.bounds());
    }

    /// Device-space bounds of the visible region; `None` when unclipped.
    #[inline]
    pub fn clip_bounds(&self) -> Option<Rect> {
        self.clip.bounds()
    }

    #[inline]
    pub fn clip_region(&self) -> &ClipRegion {
        &self.clip
    }

    // ── draws ────────────────────────────────────────────────────────────

    pub fn draw_rect(&mut self, rect: Rect, paint: &Paint) -> Result<()> {
        self.record(&Path::rect(rect, PathDirection::Cw), paint)
    }

    pub fn draw_rrect(&mut self, rrect: &RRect, paint: &Paint) -> Result<()> {
        self.record(&Path::rrect(rrect, PathDirection::Cw), paint)
    }

    /// Rounded rect with the same `(rx, ry)` on every corner.
    pub fn draw_round_rect(&mut self, rect: Rect, rx: f32, ry: f32, paint: &Paint) -> Result<()> {
        let rrect = RRect::from_rect_xy(rect, rx, ry)?;
        self.draw_rrect(&rrect, paint)
    }

    /// Fails on a negative radius; a zero radius draws nothing.
    pub fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, paint: &Paint) -> Result<()> {
        let path = Path::circle(cx, cy, radius, PathDirection::Cw)?;
        self.record(&path, paint)
    }

    pub fn draw_oval(&mut self, rect: Rect, paint: &Paint) -> Result<()> {
        self.record(&Path::oval(rect, PathDirection::Cw), paint)
    }

    /// Segment from `(x0, y0)` to `(x1, y1)`, always stroked.
    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, paint: &Paint) -> Result<()> {
        let mut path = Path::new();
        path.move_to(x0, y0).line_to(x1, y1);
        if paint.style() == Style::Stroke {
            return self.record(&path, paint);
        }
        let mut stroke = paint.clone();
        stroke.set_style(Style::Stroke);
        self.record(&path, &stroke)
    }

    pub fn draw_path(&mut self, path: &Path, paint: &Paint) -> Result<()> {
        self.record(path, paint)
    }

    /// Draws `blob` with its baseline origin at `(x, y)`.
    pub fn draw_text_blob(&mut self, blob: &TextBlob, x: f32, y: f32, paint: &Paint) -> Result<()> {
        let path = blob.get()?.to_path(x, y);
        self.record(&path, paint)
    }

    /// Shapes `text` with the paint's typeface and size and draws it with
    /// its baseline origin at `(x, y)`.
    pub fn draw_simple_text(&mut self, text: &str, x: f32, y: f32, paint: &Paint) -> Result<()> {
        let blob = TextBlobBuilder::new().build_text_blob(text, paint)?;
        self.draw_text_blob(&blob, x, y, paint)
    }

    /// Snapshots `paint`, applies its path effect, tessellates under the
    /// current matrix and appends the primitive with the current clip.
    fn record(&mut self, path: &Path, paint: &Paint) -> Result<()> {
        let resolved = PrimitivePaint::resolve(paint, &self.matrix)?;
        let effected = match paint.path_effect() {
            Some(effect) => {
                let tolerance = self.tessellator.local_tolerance(&self.matrix);
                effect.apply_with_tolerance(path, paint, tolerance)?
            }
            None => None,
        };
        let path = effected.as_ref().unwrap_or(path);

        let meshes = self.tessellator.tessellate(path, paint, &self.matrix);
        let primitive = RenderablePrimitive::new(meshes, resolved, Arc::clone(&self.clip));
        log::trace!("recorded primitive #{}: bounds {:?}", self.batch.len(), primitive.bounds());

        if self.state == CanvasState::Idle {
            log::debug!("canvas {:?}: recording", self.surface.name);
            self.state = CanvasState::Recording;
        }
        self.batch.push(primitive);
        Ok(())
    }

    // ── submission ───────────────────────────────────────────────────────

    /// Submits recorded primitives in call order and returns to `Idle`.
    ///
    /// A no-op while `Idle`. If the device fails, the batch is dropped and
    /// the error returned; the canvas stays usable.
    pub fn flush(&mut self) -> Result<()> {
        if self.state == CanvasState::Idle {
            return Ok(());
        }
        let count = self.batch.len();
        let submitted = self.device.submit(&self.surface, &self.batch);
        self.batch.clear();
        self.state = CanvasState::Idle;

        match submitted {
            Ok(()) => {
                log::debug!("canvas {:?}: flushed {count} primitives", self.surface.name);
                Ok(())
            }
            Err(e) => {
                log::warn!("canvas {:?}: dropped {count} primitives: {e:#}", self.surface.name);
                Err(Error::Device(e))
            }
        }
    }

    /// Fills the whole surface with `color`, ignoring matrix and clip.
    ///
    /// Pending draws are flushed first so they land underneath, never on
    /// top of, the cleared surface. The clear happens even if that flush
    /// fails; the flush error is returned.
    pub fn clear(&mut self, color: Color) -> Result<()> {
        let flushed = self.flush();
        self.device.clear(&self.surface, color, ClearMask::ALL);
        flushed
    }
}
