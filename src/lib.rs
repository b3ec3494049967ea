//! 区域截图：全屏截图、变暗蒙版、橡皮筋选区，双击裁剪。

pub mod capture;
pub mod config;
pub mod error;
pub mod geometry;
pub mod output;
pub mod overlay;
pub mod session;

pub use capture::{capture_snapshot, DisplayPolicy, Snapshot};
pub use config::GrabberConfig;
pub use error::GrabError;
pub use geometry::{Point, Rect};
pub use session::{CaptureSession, SessionStatus};
