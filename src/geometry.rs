//! 选区相关的整数几何：点、矩形、钳制与缩放。
//! 所有坐标均为像素；矩形的右/下边界为开区间（`right() = x + width`）。

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// 由 left/top/right/bottom 构造；边界顺序颠倒时自动规范化。
    pub fn from_ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::from_points(Point::new(left, top), Point::new(right, bottom))
    }

    /// 两点张成的轴对齐矩形，宽高为坐标差的绝对值。
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: a.x.abs_diff(b.x),
            height: a.y.abs_diff(b.y),
        }
    }

    // 边界在 i64 中计算后饱和到 i32，超宽矩形不会溢出
    #[inline]
    pub fn right(&self) -> i32 {
        saturate(self.x as i64 + self.width as i64)
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        saturate(self.y as i64 + self.height as i64)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// `other` 是否完全落在 self 内（含边界）。
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect::from_ltrb(left, top, right, bottom))
    }

    /// 分量钳制到 `[x, right] × [y, bottom]`；远端边界可取到，
    /// 这样拖到边缘时选区正好覆盖整个限制区域。
    pub fn clamp_point(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(self.x, self.right()),
            p.y.clamp(self.y, self.bottom()),
        )
    }

    /// 两条边分别按比例缩放后取整。
    pub fn scale(&self, sx: f64, sy: f64) -> Rect {
        let left = (self.x as f64 * sx).round() as i32;
        let top = (self.y as f64 * sy).round() as i32;
        let right = (self.right() as f64 * sx).round() as i32;
        let bottom = (self.bottom() as f64 * sy).round() as i32;
        Rect::from_ltrb(left, top, right, bottom)
    }
}

#[inline]
fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_normalizes_any_corner_order() {
        let expected = Rect::new(10, 20, 30, 40);
        assert_eq!(
            Rect::from_points(Point::new(10, 20), Point::new(40, 60)),
            expected
        );
        assert_eq!(
            Rect::from_points(Point::new(40, 60), Point::new(10, 20)),
            expected
        );
        assert_eq!(
            Rect::from_points(Point::new(40, 20), Point::new(10, 60)),
            expected
        );
    }

    #[test]
    fn clamp_point_reaches_far_edge() {
        let bounds = Rect::from_ltrb(100, 100, 600, 600);
        assert_eq!(bounds.clamp_point(Point::new(50, 50)), Point::new(100, 100));
        assert_eq!(
            bounds.clamp_point(Point::new(700, 700)),
            Point::new(600, 600)
        );
        assert_eq!(
            bounds.clamp_point(Point::new(300, -20)),
            Point::new(300, 100)
        );
        assert_eq!(
            bounds.clamp_point(Point::new(250, 350)),
            Point::new(250, 350)
        );
    }

    #[test]
    fn intersect_disjoint_is_none() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert_eq!(a.intersect(&b), None);
        let c = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersect(&c), Some(Rect::new(5, 5, 5, 5)));
    }

    #[test]
    fn scale_rounds_both_edges() {
        let r = Rect::new(10, 10, 100, 50);
        assert_eq!(r.scale(1.0, 1.0), r);
        assert_eq!(r.scale(2.0, 1.5), Rect::new(20, 15, 200, 75));
        assert_eq!(Rect::new(1, 1, 1, 1).scale(1.25, 1.25), Rect::new(1, 1, 2, 2));
    }

    #[test]
    fn empty_and_contains_rect() {
        assert!(Rect::new(3, 3, 0, 5).is_empty());
        assert!(!Rect::new(3, 3, 1, 1).is_empty());
        let r = Rect::new(0, 0, 4, 4);
        assert!(r.contains_rect(&Rect::new(1, 1, 3, 3)));
        assert!(!r.contains_rect(&Rect::new(1, 1, 4, 3)));
    }

    #[test]
    fn wide_rect_edges_saturate() {
        let wide = Rect::from_ltrb(-2_000_000_000, 0, 2_000_000_000, 10);
        assert_eq!(wide.width, 4_000_000_000);
        assert_eq!(wide.right(), 2_000_000_000);
        assert_eq!(Rect::new(i32::MAX - 1, 0, 10, 1).right(), i32::MAX);
        let screen = Rect::new(0, 0, 1920, 1080);
        assert_eq!(screen.intersect(&wide), Some(Rect::new(0, 0, 1920, 10)));
    }
}
