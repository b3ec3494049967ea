use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use log::{error, info, warn};
use winit::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes},
};

use screen_grabber::config::GrabberConfig;
use screen_grabber::output::save_png;
use screen_grabber::overlay::{CaptureOverlay, OverlayAction};
use screen_grabber::session::screen_position;

type SaveResult = Rc<RefCell<Option<Result<PathBuf>>>>;

#[allow(deprecated)]
fn main() -> Result<()> {
    env_logger::init();
    let config = GrabberConfig::from_env()?;
    info!("starting screen_grabber ({config:?})");

    let event_loop = EventLoop::new()?;
    let saved: SaveResult = Rc::new(RefCell::new(None));
    let mut owner: Option<&'static Window> = None;
    let mut overlay: Option<CaptureOverlay> = None;
    let mut startup_error: Option<anyhow::Error> = None;

    event_loop.run(|event, elwt| match event {
        Event::Resumed => {
            if overlay.is_some() || startup_error.is_some() {
                return;
            }
            match open_overlay(elwt, &config, saved.clone()) {
                Ok((o, ov)) => {
                    owner = Some(o);
                    overlay = Some(ov);
                }
                Err(e) => {
                    startup_error = Some(e);
                    elwt.exit();
                }
            }
        }
        Event::WindowEvent {
            event: WindowEvent::RedrawRequested,
            window_id,
        } => {
            if let Some(ov) = &mut overlay {
                if ov.id() == window_id {
                    if let Err(e) = ov.redraw() {
                        warn!("overlay redraw failed: {e:#}");
                    }
                }
            }
        }
        Event::WindowEvent { event, window_id } => {
            if let Some(ov) = &mut overlay {
                if ov.id() == window_id {
                    match ov.handle_event(&event) {
                        OverlayAction::Completed => {
                            let session = ov.session();
                            let crop = session.crop_rect(session.selection());
                            let pos = screen_position(session.snapshot(), crop);
                            info!(
                                "selection {}x{} at screen ({}, {})",
                                crop.width, crop.height, pos.x, pos.y
                            );
                            elwt.exit();
                        }
                        OverlayAction::Abandoned => elwt.exit(),
                        OverlayAction::None => {}
                    }
                }
            }
            // 关闭宿主窗口等同于放弃本次截图
            if matches!(event, WindowEvent::CloseRequested)
                && owner.map(|w| w.id()) == Some(window_id)
            {
                elwt.exit();
            }
        }
        _ => {}
    })?;

    if let Some(e) = startup_error {
        return Err(e);
    }
    let outcome = saved.borrow_mut().take();
    match outcome {
        Some(Ok(path)) => info!("done: {}", path.display()),
        Some(Err(e)) => return Err(e),
        None => info!("capture abandoned, nothing saved"),
    }
    Ok(())
}

// 宿主窗口：不可见的 1x1 窗口，截图完成后焦点交还给它
fn open_overlay(
    elwt: &ActiveEventLoop,
    config: &GrabberConfig,
    saved: SaveResult,
) -> Result<(&'static Window, CaptureOverlay)> {
    let attrs = WindowAttributes::default()
        .with_title("Screen Grabber")
        .with_inner_size(LogicalSize::new(1.0, 1.0))
        .with_visible(false);
    let owner: &'static Window = Box::leak(Box::new(elwt.create_window(attrs)?));

    let dir = config.output_dir.clone();
    let overlay = CaptureOverlay::new(elwt, Some(owner), config, move |image| {
        let result = save_png(&image, &dir).map_err(|e| anyhow!("save selection: {e}"));
        if let Err(e) = &result {
            error!("{e:#}");
        }
        *saved.borrow_mut() = Some(result);
    })?;
    Ok((owner, overlay))
}
