use image::{imageops, RgbaImage};
use log::{debug, info, warn};
use screenshots::Screen;

use crate::error::{GrabError, Result};
use crate::geometry::{Point, Rect};

/// 多显示器策略：二者互斥，不混用。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayPolicy {
    /// 只截取包含 (0, 0) 的主屏；检测到多屏时仅警告。
    #[default]
    PrimaryOnly,
    /// 截取所有屏幕并拼接为一张虚拟桌面图，原点可能为负。
    VirtualDesktop,
}

/// 一次会话的原始截图（RGBA，未变暗）。创建后不可变。
#[derive(Debug, Clone)]
pub struct Snapshot {
    image: RgbaImage,
    origin: Point,
}

impl Snapshot {
    pub fn new(image: RgbaImage, origin: Point) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(GrabError::EmptyCapture {
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(Self { image, origin })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// 截图左上角对应的屏幕坐标
    #[inline]
    pub fn origin(&self) -> Point {
        self.origin
    }

    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }

    /// 从原始截图裁剪 `rect`（截图像素坐标），超出部分先钳制；无交集返回 None。
    pub fn crop(&self, rect: Rect) -> Option<RgbaImage> {
        let r = self.bounds().intersect(&rect)?;
        Some(imageops::crop_imm(&self.image, r.x as u32, r.y as u32, r.width, r.height).to_image())
    }
}

/// 按策略截屏。无显示器、空图或后端失败都直接返回错误，不做降级。
pub fn capture_snapshot(policy: DisplayPolicy, force_bgra: bool) -> Result<Snapshot> {
    let screens = Screen::all().map_err(|e| GrabError::Capture(format!("enumerate screens: {e}")))?;
    if screens.is_empty() {
        return Err(GrabError::NoDisplay);
    }
    match policy {
        DisplayPolicy::PrimaryOnly => {
            if screens.len() > 1 {
                warn!(
                    "{} displays detected, only the primary display will be captured",
                    screens.len()
                );
            }
            let screen = Screen::from_point(0, 0)
                .map_err(|e| GrabError::Capture(format!("detect primary screen: {e}")))?;
            let part = capture_screen(&screen, force_bgra)?;
            info!(
                "captured primary display {}x{} at ({}, {})",
                part.image.width(),
                part.image.height(),
                part.origin.x,
                part.origin.y
            );
            Snapshot::new(part.image, part.origin)
        }
        DisplayPolicy::VirtualDesktop => {
            let mut parts = Vec::with_capacity(screens.len());
            for screen in &screens {
                match capture_screen(screen, force_bgra) {
                    Ok(part) => parts.push(part),
                    Err(e) => warn!(
                        "skip display {} at ({}, {}): {e}",
                        screen.display_info.id, screen.display_info.x, screen.display_info.y
                    ),
                }
            }
            let snapshot = compose_virtual_desktop(parts)?;
            info!(
                "captured virtual desktop {}x{} at ({}, {})",
                snapshot.width(),
                snapshot.height(),
                snapshot.origin.x,
                snapshot.origin.y
            );
            Ok(snapshot)
        }
    }
}

/// 单个显示器的截图及其屏幕原点
#[derive(Debug, Clone)]
pub struct DisplayCapture {
    pub origin: Point,
    pub image: RgbaImage,
}

fn capture_screen(screen: &Screen, force_bgra: bool) -> Result<DisplayCapture> {
    let info = &screen.display_info;
    // screenshots 自带的 image 版本可能与本 crate 不同，这里只取原始字节
    let img = screen
        .capture()
        .map_err(|e| GrabError::Capture(format!("display {}: {e}", info.id)))?;
    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return Err(GrabError::EmptyCapture {
            width: w,
            height: h,
        });
    }
    let mut raw = img.into_raw();
    if force_bgra {
        bgra_to_rgba_in_place(&mut raw);
    }
    let image =
        RgbaImage::from_raw(w, h, raw).ok_or(GrabError::InvalidBuffer { width: w, height: h })?;
    debug!("display {} captured {w}x{h}", info.id);
    Ok(DisplayCapture {
        origin: Point::new(info.x, info.y),
        image,
    })
}

/// 拼接所有显示器：画布为各屏幕矩形的并集，未覆盖处保持透明黑。
pub fn compose_virtual_desktop(parts: Vec<DisplayCapture>) -> Result<Snapshot> {
    let min_x = parts.iter().map(|p| p.origin.x).min().ok_or(GrabError::NoDisplay)?;
    let min_y = parts.iter().map(|p| p.origin.y).min().ok_or(GrabError::NoDisplay)?;
    let max_x = parts
        .iter()
        .map(|p| p.origin.x + p.image.width() as i32)
        .max()
        .ok_or(GrabError::NoDisplay)?;
    let max_y = parts
        .iter()
        .map(|p| p.origin.y + p.image.height() as i32)
        .max()
        .ok_or(GrabError::NoDisplay)?;

    if parts.len() == 1 {
        let part = parts.into_iter().next().ok_or(GrabError::NoDisplay)?;
        return Snapshot::new(part.image, part.origin);
    }

    let mut combined = RgbaImage::new((max_x - min_x) as u32, (max_y - min_y) as u32);
    for part in &parts {
        let ox = (part.origin.x - min_x) as i64;
        let oy = (part.origin.y - min_y) as i64;
        imageops::replace(&mut combined, &part.image, ox, oy);
    }
    Snapshot::new(combined, Point::new(min_x, min_y))
}

fn bgra_to_rgba_in_place(buf: &mut [u8]) {
    for px in buf.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, c: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(c))
    }

    #[test]
    fn test_bgra_to_rgba_conversion() {
        // 单像素 BGRA: Blue=10, Green=20, Red=30, Alpha=255 -> RGBA: 30,20,10,255
        let mut buf = vec![10u8, 20, 30, 255, 1, 2, 3, 4];
        bgra_to_rgba_in_place(&mut buf);
        assert_eq!(buf, vec![30, 20, 10, 255, 3, 2, 1, 4]);
    }

    #[test]
    fn snapshot_rejects_empty_image() {
        assert!(matches!(
            Snapshot::new(RgbaImage::new(0, 10), Point::default()),
            Err(GrabError::EmptyCapture {
                width: 0,
                height: 10
            })
        ));
    }

    #[test]
    fn crop_clamps_to_snapshot() {
        let mut img = solid(10, 10, [0, 0, 0, 255]);
        img.put_pixel(8, 8, Rgba([9, 9, 9, 255]));
        let snap = Snapshot::new(img, Point::default()).unwrap();
        let out = snap.crop(Rect::new(8, 8, 5, 5)).unwrap();
        assert_eq!(out.dimensions(), (2, 2));
        assert_eq!(out.get_pixel(0, 0), &Rgba([9, 9, 9, 255]));
        assert!(snap.crop(Rect::new(20, 20, 5, 5)).is_none());
    }

    #[test]
    fn virtual_desktop_handles_negative_offsets() {
        let parts = vec![
            DisplayCapture {
                origin: Point::new(0, 0),
                image: solid(4, 3, [255, 0, 0, 255]),
            },
            DisplayCapture {
                origin: Point::new(-2, -1),
                image: solid(2, 2, [0, 255, 0, 255]),
            },
        ];
        let snap = compose_virtual_desktop(parts).unwrap();
        assert_eq!(snap.origin(), Point::new(-2, -1));
        assert_eq!((snap.width(), snap.height()), (6, 4));
        // 左上为副屏
        assert_eq!(snap.image().get_pixel(0, 0), &Rgba([0, 255, 0, 255]));
        // 主屏 (0,0) 映射到 (2,1)
        assert_eq!(snap.image().get_pixel(2, 1), &Rgba([255, 0, 0, 255]));
        // 未覆盖区域
        assert_eq!(snap.image().get_pixel(0, 3), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn virtual_desktop_single_display_keeps_origin() {
        let parts = vec![DisplayCapture {
            origin: Point::new(1920, 0),
            image: solid(3, 3, [1, 2, 3, 255]),
        }];
        let snap = compose_virtual_desktop(parts).unwrap();
        assert_eq!(snap.origin(), Point::new(1920, 0));
        assert_eq!(snap.width(), 3);
    }

    #[test]
    fn virtual_desktop_without_displays_fails() {
        assert!(matches!(
            compose_virtual_desktop(Vec::new()),
            Err(GrabError::NoDisplay)
        ));
    }

    #[test]
    #[ignore = "needs a real display"]
    fn test_fullscreen_runtime_capture() {
        let snap = capture_snapshot(DisplayPolicy::PrimaryOnly, false).unwrap();
        assert!(snap.width() > 0 && snap.height() > 0);
    }
}
