//! 与 GUI 工具包无关的截图会话。
//!
//! [`CaptureSession`] 持有未变暗的 [`Snapshot`]、拖拽状态机和完成回调。
//! 窗口适配层以窗口像素投递 [`InputEvent`]；确认时选区按每个轴
//! `截图尺寸 / 显示尺寸` 换算到截图像素（尺寸一致即 1:1），
//! 裁剪结果只交给回调一次。

use image::RgbaImage;
use log::{info, warn};

use crate::capture::Snapshot;
use crate::error::{GrabError, Result};
use crate::geometry::{Point, Rect};
use crate::overlay::selection::{InputEvent, SelectionOutcome, SelectionTracker};

pub type CompletionCallback = Box<dyn FnOnce(RgbaImage)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Completed,
    Abandoned,
}

pub struct CaptureSession {
    snapshot: Snapshot,
    display: (u32, u32),
    limit: Option<Rect>,
    tracker: SelectionTracker,
    on_complete: Option<CompletionCallback>,
    status: SessionStatus,
}

impl CaptureSession {
    pub fn new<F>(
        snapshot: Snapshot,
        display: (u32, u32),
        limit: Option<Rect>,
        on_complete: F,
    ) -> Result<Self>
    where
        F: FnOnce(RgbaImage) + 'static,
    {
        let bounds = effective_bounds(display, limit)?;
        info!(
            "capture session {}x{} snapshot, display {}x{}, bounds {:?}",
            snapshot.width(),
            snapshot.height(),
            display.0,
            display.1,
            bounds
        );
        Ok(Self {
            snapshot,
            display,
            limit,
            tracker: SelectionTracker::new(bounds),
            on_complete: Some(Box::new(on_complete)),
            status: SessionStatus::Active,
        })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn display_size(&self) -> (u32, u32) {
        self.display
    }

    /// 当前生效的限制区域（窗口像素）
    pub fn bounds(&self) -> Rect {
        self.tracker.bounds()
    }

    pub fn selection(&self) -> Rect {
        self.tracker.selection()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// 窗口像素 -> 截图像素 的缩放比
    pub fn scale_factors(&self) -> (f64, f64) {
        (
            self.snapshot.width() as f64 / self.display.0 as f64,
            self.snapshot.height() as f64 / self.display.1 as f64,
        )
    }

    /// 窗口尺寸变化（如 DPI 切换）；零尺寸（最小化）忽略。
    pub fn resize(&mut self, display: (u32, u32)) {
        if display.0 == 0 || display.1 == 0 || display == self.display {
            return;
        }
        match effective_bounds(display, self.limit) {
            Ok(bounds) => {
                let sx = display.0 as f64 / self.display.0 as f64;
                let sy = display.1 as f64 / self.display.1 as f64;
                self.display = display;
                self.tracker.rescale(bounds, sx, sy);
            }
            Err(e) => warn!("ignore resize to {}x{}: {e}", display.0, display.1),
        }
    }

    pub fn handle(&mut self, event: InputEvent) -> SessionStatus {
        if self.status != SessionStatus::Active {
            return self.status;
        }
        match self.tracker.handle(event) {
            SelectionOutcome::Confirmed(rect) => self.complete(rect),
            SelectionOutcome::Abandoned => self.abandon(),
            SelectionOutcome::Updated | SelectionOutcome::Unchanged => {}
        }
        self.status
    }

    /// 关闭窗口等外部放弃；回调不会被调用。
    pub fn abandon(&mut self) {
        if self.status == SessionStatus::Active {
            info!("capture session abandoned");
            self.status = SessionStatus::Abandoned;
            self.on_complete = None;
        }
    }

    /// 选区（窗口像素）映射到截图像素
    pub fn crop_rect(&self, selection: Rect) -> Rect {
        let (sx, sy) = self.scale_factors();
        let mut r = selection.scale(sx, sy);
        if !selection.is_empty() {
            r.width = r.width.max(1);
            r.height = r.height.max(1);
        }
        r
    }

    fn complete(&mut self, selection: Rect) {
        let crop = self.crop_rect(selection);
        let Some(image) = self.snapshot.crop(crop) else {
            warn!("selection {selection:?} maps outside the snapshot, ignored");
            return;
        };
        info!(
            "selection confirmed: {:?} -> {}x{} at ({}, {})",
            selection,
            image.width(),
            image.height(),
            crop.x,
            crop.y
        );
        self.status = SessionStatus::Completed;
        if let Some(cb) = self.on_complete.take() {
            cb(image);
        }
    }
}

/// 限制区域与显示区域取交集；无限制时为整个显示区域。
pub fn effective_bounds(display: (u32, u32), limit: Option<Rect>) -> Result<Rect> {
    if display.0 == 0 || display.1 == 0 {
        return Err(GrabError::EmptyCapture {
            width: display.0,
            height: display.1,
        });
    }
    let screen = Rect::new(0, 0, display.0, display.1);
    match limit {
        None => Ok(screen),
        Some(limit) => screen.intersect(&limit).ok_or(GrabError::EmptyBounds),
    }
}

/// 截图像素坐标 -> 屏幕绝对坐标
pub fn screen_position(snapshot: &Snapshot, crop: Rect) -> Point {
    let o = snapshot.origin();
    Point::new(o.x + crop.x, o.y + crop.y)
}
