use anyhow::{Context, ensure};
use tiny_skia::Mask;

use crate::canvas::Batch;
use crate::coords::{Rect, Vec2};
use crate::effect::BlurMask;
use crate::paint::Color;
use crate::render::{RenderablePrimitive, Span};

use super::pixmap::to_premul_u8;
use super::{ClearMask, Device, Pixmap, RasterConfig, SurfaceHandle};

/// CPU reference backend: scanline coverage with a regular `n x n`
/// sample grid per pixel, composited by tiny-skia.
///
/// Each primitive's coverage is the union of its meshes, so a fill and a
/// stroke of the same shape in one primitive never blend twice. Blur mask
/// filters run on that coverage before the clip is applied.
#[derive(Debug, Default)]
pub struct SoftwareDevice {
    config: RasterConfig,
    surfaces: Vec<Pixmap>,
}

impl SoftwareDevice {
    pub fn new(config: RasterConfig) -> Self {
        Self { config, surfaces: Vec::new() }
    }

    #[inline]
    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    /// Pixels behind `surface`, if it was created by this device.
    pub fn pixmap(&self, surface: &SurfaceHandle) -> Option<&Pixmap> {
        self.surfaces.get(surface.id as usize)
    }

    fn pixmap_mut(&mut self, surface: &SurfaceHandle) -> anyhow::Result<&mut Pixmap> {
        self.surfaces
            .get_mut(surface.id as usize)
            .with_context(|| format!("surface {:?} (id {}) does not belong to this device", surface.name, surface.id))
    }

    fn samples_for(&self, surface: &SurfaceHandle, prim: &RenderablePrimitive) -> u32 {
        if surface.sample_count > 1 && prim.paint().anti_alias {
            self.config.samples_per_axis.clamp(1, 16)
        } else {
            1
        }
    }
}

impl Device for SoftwareDevice {
    fn create_surface(&mut self, name: &str, width: u32, height: u32, sample_count: u32) -> anyhow::Result<SurfaceHandle> {
        ensure!(width > 0 && height > 0, "surface {name:?} must have a non-zero size, got {width}x{height}");
        ensure!(sample_count >= 1, "surface {name:?} needs at least one sample");
        let id = u32::try_from(self.surfaces.len()).context("too many surfaces")?;
        let pixmap = Pixmap::new(width, height, self.config.background)
            .with_context(|| format!("surface {name:?} of {width}x{height} is too large"))?;
        self.surfaces.push(pixmap);
        log::debug!("software surface {name:?} created: {width}x{height}, {sample_count} samples");
        Ok(SurfaceHandle { id, name: name.to_owned(), width, height, sample_count })
    }

    fn clear(&mut self, surface: &SurfaceHandle, color: Color, mask: ClearMask) {
        // No stencil buffer here; coverage is computed analytically.
        if !mask.contains(ClearMask::COLOR) {
            return;
        }
        match self.pixmap_mut(surface) {
            Ok(pm) => pm.fill(color),
            Err(e) => log::warn!("clear ignored: {e:#}"),
        }
    }

    fn submit(&mut self, surface: &SurfaceHandle, batch: &Batch) -> anyhow::Result<()> {
        let samples: Vec<u32> = batch.iter().map(|p| self.samples_for(surface, p)).collect();
        let pm = self.pixmap_mut(surface)?;
        for (prim, n) in batch.iter().zip(samples) {
            rasterize(pm, prim, n)?;
        }
        log::debug!("submitted {} primitives to {:?}", batch.len(), surface.name);
        Ok(())
    }
}

/// Whole-pixel rectangle, `x0..x1` by `y0..y1`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct PixelRect {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl PixelRect {
    fn round_out(r: Rect) -> Self {
        Self {
            x0: r.left().floor() as i32,
            y0: r.top().floor() as i32,
            x1: r.right().ceil() as i32,
            y1: r.bottom().ceil() as i32,
        }
    }

    fn outset(self, e: i32) -> Self {
        Self { x0: self.x0 - e, y0: self.y0 - e, x1: self.x1 + e, y1: self.y1 + e }
    }

    #[inline]
    fn width(&self) -> usize {
        (self.x1 - self.x0).max(0) as usize
    }

    #[inline]
    fn height(&self) -> usize {
        (self.y1 - self.y0).max(0) as usize
    }
}

fn rasterize(pm: &mut Pixmap, prim: &RenderablePrimitive, n: u32) -> anyhow::Result<()> {
    let surface = Rect::new(0.0, 0.0, pm.width() as f32, pm.height() as f32);
    let Some(area) = prim.clipped_bounds().and_then(|b| b.intersect(surface)) else {
        log::trace!("primitive culled");
        return Ok(());
    };
    let region = PixelRect::round_out(area);
    let (w, h) = (region.width(), region.height());
    if w == 0 || h == 0 {
        return Ok(());
    }

    let cov = match &prim.paint().mask_filter {
        Some(blur) => blurred_coverage(prim, blur, region, n),
        None => coverage(region, n, |y| prim.spans(y)),
    };

    let mut mask = Mask::new(pm.width(), pm.height()).context("allocating coverage mask")?;
    let mut src = tiny_skia::Pixmap::new(w as u32, h as u32).context("allocating primitive source")?;
    let stride = pm.width() as usize;
    let mask_data = mask.data_mut();
    let src_px = src.pixels_mut();
    for row in 0..h {
        let py = region.y0 + row as i32;
        for col in 0..w {
            let c = cov[row * w + col];
            if c <= 0.0 {
                continue;
            }
            let px = region.x0 + col as i32;
            mask_data[py as usize * stride + px as usize] = (c * 255.0).round().clamp(0.0, 255.0) as u8;
            let center = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
            src_px[row * w + col] = to_premul_u8(prim.color_at(center));
        }
    }
    pm.composite(region.x0, region.y0, src.as_ref(), prim.paint().blend_mode, &mask);
    log::trace!("rasterized primitive over {w}x{h} px");
    Ok(())
}

/// Fraction of the `n x n` samples inside `spans` for every pixel of
/// `region`, row-major.
fn coverage(region: PixelRect, n: u32, spans: impl Fn(f32) -> Vec<Span>) -> Vec<f32> {
    let w = region.width();
    let n_i = n as i64;
    let n_f = n as f32;
    let per_pixel = (n * n) as f32;
    let (lo, hi) = ((region.x0 as i64 * n_i) as f32, (region.x1 as i64 * n_i) as f32);
    let mut out = vec![0.0f32; w * region.height()];
    let mut counts = vec![0u32; w];

    for (row, py) in (region.y0..region.y1).enumerate() {
        counts.fill(0);
        for sy in 0..n {
            let y = py as f32 + (sy as f32 + 0.5) / n_f;
            for (a, b) in spans(y) {
                // Sample columns j sit at (j + 0.5) / n.
                let ja = (a * n_f - 0.5).ceil().max(lo) as i64;
                let jb = (b * n_f - 0.5).ceil().min(hi) as i64;
                for j in ja..jb {
                    counts[(j.div_euclid(n_i) - region.x0 as i64) as usize] += 1;
                }
            }
        }
        for (dst, &c) in out[row * w..(row + 1) * w].iter_mut().zip(&counts) {
            *dst = c as f32 / per_pixel;
        }
    }
    out
}

/// Geometry coverage blurred over `region`, then clipped.
///
/// Coverage is gathered over `region` grown by the kernel extent so that
/// shapes just outside it still bleed in.
fn blurred_coverage(prim: &RenderablePrimitive, blur: &BlurMask, region: PixelRect, n: u32) -> Vec<f32> {
    let e = blur.extent() as i32;
    let padded = region.outset(e);
    let pw = padded.width();
    let mut cov = coverage(padded, n, |y| prim.geometry_spans(y));
    blur.filter_mask(&mut cov, pw, padded.height());

    let (w, h) = (region.width(), region.height());
    let mut out = Vec::with_capacity(w * h);
    let e = e as usize;
    for row in 0..h {
        let start = (row + e) * pw + e;
        out.extend_from_slice(&cov[start..start + w]);
    }

    if !prim.clip().is_wide_open() {
        let row_span = vec![(region.x0 as f32, region.x1 as f32)];
        let clip = coverage(region, n, |y| prim.clip().clip_spans(y, row_span.clone()));
        out.iter_mut().zip(clip).for_each(|(c, k)| *c *= k);
    }
    out
}
