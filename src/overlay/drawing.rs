// 帧缓冲绘制：frame 为 softbuffer 的 0xAARRGGBB 像素，行宽 = width
use crate::geometry::Rect;

#[inline]
pub fn pack_rgba(px: [u8; 4]) -> u32 {
    let [r, g, b, a] = px;
    u32::from_le_bytes([b, g, r, a])
}

/// 帧矩形与 (0,0,width,height) 的交集
fn clip(width: u32, height: u32, region: Rect) -> Option<Rect> {
    Rect::new(0, 0, width, height).intersect(&region)
}

/// 源坐标（最近邻）：帧与源同尺寸时为恒等映射
#[inline]
fn src_coord(dst: u32, dst_len: u32, src_len: u32) -> u32 {
    if dst_len == src_len {
        dst
    } else {
        ((dst as u64 * src_len as u64) / dst_len as u64).min(src_len as u64 - 1) as u32
    }
}

/// 把 src（已打包像素）按比例采样到 frame 的 region 区域
pub fn blit_packed(
    frame: &mut [u32],
    width: u32,
    height: u32,
    src: &[u32],
    src_w: u32,
    src_h: u32,
    region: Rect,
) {
    let Some(r) = clip(width, height, region) else {
        return;
    };
    let same = width == src_w && height == src_h;
    for y in r.y as u32..r.bottom() as u32 {
        let dst_row = (y * width) as usize;
        if same {
            let start = dst_row + r.x as usize;
            let end = start + r.width as usize;
            frame[start..end].copy_from_slice(&src[start..end]);
            continue;
        }
        let sy = src_coord(y, height, src_h);
        let src_row = (sy * src_w) as usize;
        for x in r.x as u32..r.right() as u32 {
            let sx = src_coord(x, width, src_w);
            frame[dst_row + x as usize] = src[src_row + sx as usize];
        }
    }
}

/// 同 blit_packed，但源为 RGBA 字节；按需转换，不额外缓存整幅亮图
pub fn blit_rgba(
    frame: &mut [u32],
    width: u32,
    height: u32,
    rgba: &[[u8; 4]],
    src_w: u32,
    src_h: u32,
    region: Rect,
) {
    let Some(r) = clip(width, height, region) else {
        return;
    };
    for y in r.y as u32..r.bottom() as u32 {
        let dst_row = (y * width) as usize;
        let src_row = (src_coord(y, height, src_h) * src_w) as usize;
        for x in r.x as u32..r.right() as u32 {
            let sx = src_coord(x, width, src_w) as usize;
            frame[dst_row + x as usize] = pack_rgba(rgba[src_row + sx]);
        }
    }
}

pub fn stroke_rect(frame: &mut [u32], width: u32, height: u32, rect: Rect, color: u32) {
    if rect.is_empty() {
        return;
    }
    let (sw, sh) = (width as i32, height as i32);
    let (x, y) = (rect.x, rect.y);
    let (right, bottom) = (rect.right() - 1, rect.bottom() - 1);
    for xx in x.max(0)..=right.min(sw - 1) {
        if y >= 0 && y < sh {
            frame[(y * sw + xx) as usize] = color;
        }
        if bottom >= 0 && bottom < sh {
            frame[(bottom * sw + xx) as usize] = color;
        }
    }
    for yy in y.max(0)..=bottom.min(sh - 1) {
        if x >= 0 && x < sw {
            frame[(yy * sw + x) as usize] = color;
        }
        if right >= 0 && right < sw {
            frame[(yy * sw + right) as usize] = color;
        }
    }
}
