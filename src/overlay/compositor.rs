// 变暗合成：截图整体盖一层半透明黑色蒙版，限制区域之外再叠一层；
// 选区内部在每帧绘制时从未变暗的截图重新取像素。
use tiny_skia::{IntSize, Paint, Pixmap, Transform};

use crate::capture::Snapshot;
use crate::error::{GrabError, Result};
use crate::geometry::Rect;
use crate::overlay::drawing::{blit_packed, blit_rgba, pack_rgba, stroke_rect};

/// 约 25% 不透明度
pub const DEFAULT_MASK_ALPHA: u8 = 64;
pub const RUBBER_BAND_COLOR: u32 = 0xFFFFFFFF;

pub struct Composite {
    width: u32,
    height: u32,
    dim: Vec<u32>,
}

impl Composite {
    /// `bounds` 为截图像素坐标下的限制区域。
    pub fn build(snapshot: &Snapshot, bounds: Rect, mask_alpha: u8) -> Result<Self> {
        let (w, h) = (snapshot.width(), snapshot.height());
        let size = IntSize::from_wh(w, h).ok_or(GrabError::EmptyCapture {
            width: w,
            height: h,
        })?;
        let mut data = snapshot.image().as_raw().clone();
        // tiny-skia 要求预乘 alpha；屏幕像素本应不透明，统一置为 255
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        let mut pixmap =
            Pixmap::from_vec(data, size).ok_or(GrabError::InvalidBuffer { width: w, height: h })?;

        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, mask_alpha);
        paint.anti_alias = false;

        let full = snapshot.bounds();
        fill(&mut pixmap, full, &paint);
        for band in outside_bands(full, bounds) {
            fill(&mut pixmap, band, &paint);
        }

        let px: &[[u8; 4]] = bytemuck::cast_slice(pixmap.data());
        let dim = px.iter().copied().map(pack_rgba).collect();
        Ok(Self {
            width: w,
            height: h,
            dim,
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.dim.get((y * self.width + x) as usize).copied()
    }

    /// 绘制一帧（窗口像素）。`selection` 同为窗口像素；尺寸与截图不一致时最近邻采样。
    pub fn render_frame(
        &self,
        snapshot: &Snapshot,
        frame: &mut [u32],
        width: u32,
        height: u32,
        selection: Rect,
    ) {
        let expected = width as usize * height as usize;
        if frame.len() < expected || width == 0 || height == 0 {
            return;
        }
        let whole = Rect::new(0, 0, width, height);
        blit_packed(
            frame,
            width,
            height,
            &self.dim,
            self.width,
            self.height,
            whole,
        );
        if selection.is_empty() {
            return;
        }
        let rgba: &[[u8; 4]] = bytemuck::cast_slice(snapshot.image().as_raw().as_slice());
        blit_rgba(
            frame,
            width,
            height,
            rgba,
            snapshot.width(),
            snapshot.height(),
            selection,
        );
        stroke_rect(frame, width, height, selection, RUBBER_BAND_COLOR);
    }
}

fn fill(pixmap: &mut Pixmap, r: Rect, paint: &Paint) {
    if let Some(rect) = tiny_skia::Rect::from_xywh(
        r.x as f32,
        r.y as f32,
        r.width as f32,
        r.height as f32,
    ) {
        pixmap.fill_rect(rect, paint, Transform::identity(), None);
    }
}

/// full 中位于 inner 之外的部分，拆为上/下/左/右四条互不重叠的带
pub fn outside_bands(full: Rect, inner: Rect) -> Vec<Rect> {
    let Some(inner) = full.intersect(&inner) else {
        return vec![full];
    };
    let bands = [
        Rect::from_ltrb(full.x, full.y, full.right(), inner.y),
        Rect::from_ltrb(full.x, inner.bottom(), full.right(), full.bottom()),
        Rect::from_ltrb(full.x, inner.y, inner.x, inner.bottom()),
        Rect::from_ltrb(inner.right(), inner.y, full.right(), inner.bottom()),
    ];
    bands.into_iter().filter(|b| !b.is_empty()).collect()
}
