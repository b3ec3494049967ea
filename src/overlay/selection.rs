use log::debug;

use crate::geometry::{Point, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

/// 与具体 GUI 工具包无关的输入事件，坐标为窗口内像素。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Press(Point, PointerButton),
    Move(Point),
    Release(Point, PointerButton),
    DoubleClick(Point, PointerButton),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

/// 单次事件处理的结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionOutcome {
    Unchanged,
    Updated,
    Confirmed(Rect),
    Abandoned,
}

// SelectionTracker: 橡皮筋选区状态机；选区始终位于 bounds 内且宽高非负
#[derive(Clone, Debug)]
pub struct SelectionTracker {
    bounds: Rect,
    state: DragState,
    origin: Point,
    selection: Rect,
}

impl SelectionTracker {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            state: DragState::Idle,
            origin: bounds.origin(),
            selection: Rect::new(bounds.x, bounds.y, 0, 0),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn selection(&self) -> Rect {
        self.selection
    }

    /// 窗口尺寸变化：起点与选区按 新/旧 比例换算后再钳制进新的限制区域，
    /// 保证选区仍指向截图上的同一块区域。
    pub fn rescale(&mut self, bounds: Rect, sx: f64, sy: f64) {
        self.bounds = bounds;
        let origin = Point::new(
            (self.origin.x as f64 * sx).round() as i32,
            (self.origin.y as f64 * sy).round() as i32,
        );
        self.origin = bounds.clamp_point(origin);
        let scaled = self.selection.scale(sx, sy);
        let a = bounds.clamp_point(scaled.origin());
        let b = bounds.clamp_point(Point::new(scaled.right(), scaled.bottom()));
        self.selection = Rect::from_points(a, b);
    }

    pub fn handle(&mut self, event: InputEvent) -> SelectionOutcome {
        match event {
            InputEvent::Press(p, PointerButton::Primary) => {
                // 已有选区时不允许重新拖拽
                if !self.selection.is_empty() {
                    return SelectionOutcome::Unchanged;
                }
                self.origin = self.bounds.clamp_point(p);
                self.selection = Rect::new(self.origin.x, self.origin.y, 0, 0);
                self.state = DragState::Dragging;
                debug!("drag start at ({}, {})", self.origin.x, self.origin.y);
                SelectionOutcome::Updated
            }
            InputEvent::Press(_, PointerButton::Secondary) => {
                if self.selection.is_empty() && self.state == DragState::Idle {
                    return SelectionOutcome::Abandoned;
                }
                self.reset();
                debug!("selection cleared");
                SelectionOutcome::Updated
            }
            InputEvent::Move(p) => {
                if self.state != DragState::Dragging {
                    return SelectionOutcome::Unchanged;
                }
                let current = self.bounds.clamp_point(p);
                let next = Rect::from_points(self.origin, current);
                if next == self.selection {
                    return SelectionOutcome::Unchanged;
                }
                self.selection = next;
                debug_assert!(self.bounds.contains_rect(&self.selection));
                SelectionOutcome::Updated
            }
            InputEvent::Release(_, PointerButton::Primary) => {
                if self.state != DragState::Dragging {
                    return SelectionOutcome::Unchanged;
                }
                self.state = DragState::Idle;
                debug!("drag end, selection {:?}", self.selection);
                SelectionOutcome::Updated
            }
            InputEvent::DoubleClick(_, PointerButton::Primary) => {
                if self.selection.is_empty() {
                    return SelectionOutcome::Unchanged;
                }
                self.state = DragState::Idle;
                SelectionOutcome::Confirmed(self.selection)
            }
            _ => SelectionOutcome::Unchanged,
        }
    }

    fn reset(&mut self) {
        self.state = DragState::Idle;
        self.origin = self.bounds.origin();
        self.selection = Rect::new(self.bounds.x, self.bounds.y, 0, 0);
    }
}
