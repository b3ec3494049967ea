// winit 不提供双击事件，这里按时间间隔与位移阈值自行合成
use std::time::{Duration, Instant};

use crate::geometry::Point;

pub const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(500);
pub const DOUBLE_CLICK_SLOP: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickKind {
    Single,
    Double,
}

#[derive(Clone, Debug)]
pub struct ClickTracker {
    last: Option<(Instant, Point)>,
    interval: Duration,
    slop: i32,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_INTERVAL, DOUBLE_CLICK_SLOP)
    }
}

impl ClickTracker {
    pub fn new(interval: Duration, slop: i32) -> Self {
        Self {
            last: None,
            interval,
            slop,
        }
    }

    /// 记录一次主键按下。第二次命中后清空，三连击不会产生两个双击。
    pub fn register(&mut self, at: Instant, pos: Point) -> ClickKind {
        if let Some((t, p)) = self.last {
            let close = (pos.x - p.x).abs() <= self.slop && (pos.y - p.y).abs() <= self.slop;
            if close && at.saturating_duration_since(t) <= self.interval {
                self.last = None;
                return ClickKind::Double;
            }
        }
        self.last = Some((at, pos));
        ClickKind::Single
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_quick_presses_make_double() {
        let mut c = ClickTracker::default();
        let t0 = Instant::now();
        assert_eq!(c.register(t0, Point::new(10, 10)), ClickKind::Single);
        assert_eq!(
            c.register(t0 + Duration::from_millis(200), Point::new(12, 9)),
            ClickKind::Double
        );
        // 第三次重新计数
        assert_eq!(
            c.register(t0 + Duration::from_millis(300), Point::new(12, 9)),
            ClickKind::Single
        );
    }

    #[test]
    fn slow_or_distant_presses_stay_single() {
        let mut c = ClickTracker::default();
        let t0 = Instant::now();
        c.register(t0, Point::new(10, 10));
        assert_eq!(
            c.register(t0 + Duration::from_millis(800), Point::new(10, 10)),
            ClickKind::Single
        );
        assert_eq!(
            c.register(t0 + Duration::from_millis(900), Point::new(30, 10)),
            ClickKind::Single
        );
    }

    #[test]
    fn reset_forgets_previous_press() {
        let mut c = ClickTracker::default();
        let t0 = Instant::now();
        c.register(t0, Point::new(1, 1));
        c.reset();
        assert_eq!(
            c.register(t0 + Duration::from_millis(50), Point::new(1, 1)),
            ClickKind::Single
        );
    }
}
