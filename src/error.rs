use thiserror::Error;

/// 截图会话的错误类型。窗口/驱动层用 anyhow 包装。
#[derive(Debug, Error)]
pub enum GrabError {
    #[error("no display detected")]
    NoDisplay,

    #[error("display capture returned an empty image ({width}x{height})")]
    EmptyCapture { width: u32, height: u32 },

    #[error("display capture failed: {0}")]
    Capture(String),

    #[error("bounds limit does not intersect the displayed area")]
    EmptyBounds,

    #[error("pixel buffer does not match {width}x{height} RGBA")]
    InvalidBuffer { width: u32, height: u32 },

    #[error("invalid config value for {var}: {reason}")]
    Config { var: &'static str, reason: String },

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GrabError>;
