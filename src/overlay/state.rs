use std::num::NonZeroU32;
use std::time::Instant;

use anyhow::{anyhow, Context as _, Result};
use image::RgbaImage;
use log::{debug, info, warn};
use softbuffer::{Context, Surface};
use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorIcon, Fullscreen, Window, WindowAttributes, WindowId, WindowLevel},
};

use crate::capture::{capture_snapshot, DisplayPolicy};
use crate::config::GrabberConfig;
use crate::geometry::Point;
use crate::overlay::click::{ClickKind, ClickTracker};
use crate::overlay::compositor::Composite;
use crate::overlay::selection::{InputEvent, PointerButton};
use crate::session::{CaptureSession, SessionStatus};

// OverlayAction: 会话结束时通知驱动程序
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayAction {
    None,
    Completed,
    Abandoned,
}

// CaptureOverlay: winit 窗口适配层。截图、选区与裁剪都在 CaptureSession 中，
// 这里只负责窗口、softbuffer 呈现和事件翻译
pub struct CaptureOverlay {
    pub window: &'static Window,
    _context: Context<&'static Window>,
    surface: Surface<&'static Window, &'static Window>,
    owner: Option<&'static Window>,
    session: CaptureSession,
    composite: Composite,
    mask_alpha: u8,
    clicks: ClickTracker,
    // 收到第一个 CursorMoved 之前为 None，此前的鼠标按键被忽略
    last_cursor: Option<Point>,
    visible: bool,
}

impl CaptureOverlay {
    /// 截屏并显示全屏置顶覆盖层。截屏失败直接返回错误，不创建窗口。
    pub fn new<F>(
        active: &ActiveEventLoop,
        owner: Option<&'static Window>,
        config: &GrabberConfig,
        on_complete: F,
    ) -> Result<Self>
    where
        F: FnOnce(RgbaImage) + 'static,
    {
        let snapshot = capture_snapshot(config.display_policy, config.force_bgra)
            .context("capture display")?;
        let origin = snapshot.origin();
        let snap_size = (snapshot.width(), snapshot.height());

        let mut attrs = WindowAttributes::default()
            .with_title("Screen Grabber")
            .with_decorations(false)
            .with_resizable(false)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_visible(false)
            // 物理像素，避免 DPI 缩放二次放大
            .with_inner_size(PhysicalSize::new(snap_size.0, snap_size.1))
            .with_position(PhysicalPosition::new(origin.x, origin.y));
        if config.display_policy == DisplayPolicy::PrimaryOnly {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(active.primary_monitor())));
        }
        #[cfg(target_os = "windows")]
        {
            use winit::platform::windows::WindowAttributesExtWindows;
            attrs = attrs.with_skip_taskbar(true);
        }
        let window = active.create_window(attrs)?;
        let window: &'static Window = Box::leak(Box::new(window));

        let context = Context::new(window).map_err(|e| anyhow!("overlay ctx: {e}"))?;
        let surface =
            Surface::new(&context, window).map_err(|e| anyhow!("overlay surface: {e}"))?;

        let inner = window.inner_size();
        let display = if inner.width == 0 || inner.height == 0 {
            snap_size
        } else {
            (inner.width, inner.height)
        };
        let session = CaptureSession::new(snapshot, display, config.bounds, on_complete)?;
        let composite = Composite::build(
            session.snapshot(),
            session.crop_rect(session.bounds()),
            config.mask_alpha,
        )?;

        window.set_cursor(CursorIcon::Crosshair);
        window.set_visible(true);
        window.focus_window();
        window.request_redraw();
        info!(
            "overlay shown at ({}, {}), display {}x{}",
            origin.x, origin.y, display.0, display.1
        );

        Ok(Self {
            window,
            _context: context,
            surface,
            owner,
            session,
            composite,
            mask_alpha: config.mask_alpha,
            clicks: ClickTracker::default(),
            last_cursor: None,
            visible: true,
        })
    }

    pub fn id(&self) -> WindowId {
        self.window.id()
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn handle_event(&mut self, event: &WindowEvent) -> OverlayAction {
        if !self.visible {
            return OverlayAction::None;
        }
        let before = self.session.selection();
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let p = Point::new(position.x as i32, position.y as i32);
                self.last_cursor = Some(p);
                self.session.handle(InputEvent::Move(p));
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let input = translate_mouse(
                    &mut self.clicks,
                    *state,
                    *button,
                    self.last_cursor,
                    Instant::now(),
                );
                match input {
                    Some(input) => {
                        self.session.handle(input);
                    }
                    None => debug!("mouse {button:?} {state:?} before cursor position, ignored"),
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                self.session.abandon();
            }
            WindowEvent::Resized(size) => {
                self.session.resize((size.width, size.height));
                self.rebuild_composite();
                self.window.request_redraw();
            }
            _ => {}
        }

        match self.session.status() {
            SessionStatus::Active => {
                if self.session.selection() != before {
                    self.window.request_redraw();
                }
                OverlayAction::None
            }
            SessionStatus::Completed => {
                self.finish();
                OverlayAction::Completed
            }
            SessionStatus::Abandoned => {
                self.finish();
                OverlayAction::Abandoned
            }
        }
    }

    pub fn redraw(&mut self) -> Result<()> {
        if !self.visible {
            return Ok(());
        }
        let size = self.window.inner_size();
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(());
        };
        self.surface
            .resize(w, h)
            .map_err(|e| anyhow!("overlay surface resize: {e}"))?;
        let mut frame = self
            .surface
            .buffer_mut()
            .map_err(|e| anyhow!("overlay buffer: {e}"))?;
        self.composite.render_frame(
            self.session.snapshot(),
            &mut frame,
            w.get(),
            h.get(),
            self.session.selection(),
        );
        frame
            .present()
            .map_err(|e| anyhow!("overlay present: {e}"))?;
        Ok(())
    }

    // 限制区域随显示尺寸换算到截图像素，需要重建蒙版
    fn rebuild_composite(&mut self) {
        let bounds = self.session.crop_rect(self.session.bounds());
        match Composite::build(self.session.snapshot(), bounds, self.mask_alpha) {
            Ok(c) => self.composite = c,
            Err(e) => warn!("rebuild composite failed: {e}"),
        }
    }

    // 隐藏覆盖层并把焦点交还给调用方窗口
    fn finish(&mut self) {
        self.visible = false;
        self.window.set_visible(false);
        self.window.set_cursor(CursorIcon::Default);
        if let Some(owner) = self.owner {
            owner.focus_window();
        }
        debug!("overlay closed: {:?}", self.session.status());
    }
}

/// winit 鼠标按键 -> InputEvent。主键第二次快速按下合成为 DoubleClick；
/// 光标位置未知时返回 None。
fn translate_mouse(
    clicks: &mut ClickTracker,
    state: ElementState,
    button: MouseButton,
    cursor: Option<Point>,
    now: Instant,
) -> Option<InputEvent> {
    let p = cursor?;
    let button = map_button(button);
    let input = match state {
        ElementState::Pressed if button == PointerButton::Primary => {
            match clicks.register(now, p) {
                ClickKind::Double => InputEvent::DoubleClick(p, button),
                ClickKind::Single => InputEvent::Press(p, button),
            }
        }
        ElementState::Pressed => {
            clicks.reset();
            InputEvent::Press(p, button)
        }
        ElementState::Released => InputEvent::Release(p, button),
    };
    Some(input)
}

fn map_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        _ => PointerButton::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const LEFT: MouseButton = MouseButton::Left;

    #[test]
    fn second_quick_primary_press_is_double_click() {
        let mut clicks = ClickTracker::default();
        let t0 = Instant::now();
        let p = Some(Point::new(40, 40));
        assert_eq!(
            translate_mouse(&mut clicks, ElementState::Pressed, LEFT, p, t0),
            Some(InputEvent::Press(Point::new(40, 40), PointerButton::Primary))
        );
        assert_eq!(
            translate_mouse(&mut clicks, ElementState::Released, LEFT, p, t0),
            Some(InputEvent::Release(Point::new(40, 40), PointerButton::Primary))
        );
        assert_eq!(
            translate_mouse(
                &mut clicks,
                ElementState::Pressed,
                LEFT,
                p,
                t0 + Duration::from_millis(150)
            ),
            Some(InputEvent::DoubleClick(Point::new(40, 40), PointerButton::Primary))
        );
    }

    #[test]
    fn secondary_press_resets_click_tracker() {
        let mut clicks = ClickTracker::default();
        let t0 = Instant::now();
        let p = Some(Point::new(5, 5));
        translate_mouse(&mut clicks, ElementState::Pressed, LEFT, p, t0);
        assert_eq!(
            translate_mouse(&mut clicks, ElementState::Pressed, MouseButton::Right, p, t0),
            Some(InputEvent::Press(Point::new(5, 5), PointerButton::Secondary))
        );
        // 右键打断后，左键重新计为单击
        assert_eq!(
            translate_mouse(
                &mut clicks,
                ElementState::Pressed,
                LEFT,
                p,
                t0 + Duration::from_millis(100)
            ),
            Some(InputEvent::Press(Point::new(5, 5), PointerButton::Primary))
        );
    }

    #[test]
    fn press_before_cursor_known_is_ignored() {
        let mut clicks = ClickTracker::default();
        let t0 = Instant::now();
        assert_eq!(
            translate_mouse(&mut clicks, ElementState::Pressed, LEFT, None, t0),
            None
        );
        // 被忽略的按下不参与双击计数
        assert_eq!(
            translate_mouse(
                &mut clicks,
                ElementState::Pressed,
                LEFT,
                Some(Point::new(0, 0)),
                t0 + Duration::from_millis(50)
            ),
            Some(InputEvent::Press(Point::new(0, 0), PointerButton::Primary))
        );
    }

    #[test]
    fn other_buttons_map_to_other() {
        assert_eq!(map_button(MouseButton::Middle), PointerButton::Other);
        assert_eq!(map_button(MouseButton::Right), PointerButton::Secondary);
    }
}
