use std::env;
use std::path::PathBuf;

use crate::capture::DisplayPolicy;
use crate::error::{GrabError, Result};
use crate::geometry::Rect;
use crate::overlay::compositor::DEFAULT_MASK_ALPHA;

pub const ENV_BOUNDS: &str = "GRABBER_BOUNDS";
pub const ENV_DISPLAY_POLICY: &str = "GRABBER_DISPLAY_POLICY";
pub const ENV_MASK_ALPHA: &str = "GRABBER_MASK_ALPHA";
pub const ENV_FORCE_BGRA: &str = "GRABBER_FORCE_BGRA";
pub const ENV_OUTPUT_DIR: &str = "GRABBER_OUTPUT_DIR";

/// 截图会话配置。组件本身不读环境变量，由驱动程序通过 `from_env` 构造。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrabberConfig {
    /// 选区限制 (窗口像素)，None 表示整个屏幕
    pub bounds: Option<Rect>,
    pub display_policy: DisplayPolicy,
    pub mask_alpha: u8,
    /// 后端返回 BGRA 时置为 true
    pub force_bgra: bool,
    pub output_dir: PathBuf,
}

impl Default for GrabberConfig {
    fn default() -> Self {
        Self {
            bounds: None,
            display_policy: DisplayPolicy::PrimaryOnly,
            mask_alpha: DEFAULT_MASK_ALPHA,
            force_bgra: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl GrabberConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 可注入的变量来源，便于测试
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup(ENV_BOUNDS) {
            cfg.bounds = Some(parse_bounds(&v)?);
        }
        if let Some(v) = lookup(ENV_DISPLAY_POLICY) {
            cfg.display_policy = parse_policy(&v)?;
        }
        if let Some(v) = lookup(ENV_MASK_ALPHA) {
            cfg.mask_alpha = v.trim().parse().map_err(|e| GrabError::Config {
                var: ENV_MASK_ALPHA,
                reason: format!("{v:?}: {e}"),
            })?;
        }
        cfg.force_bgra = lookup(ENV_FORCE_BGRA).is_some();
        if let Some(v) = lookup(ENV_OUTPUT_DIR) {
            if !v.trim().is_empty() {
                cfg.output_dir = PathBuf::from(v);
            }
        }
        Ok(cfg)
    }
}

/// "left,top,right,bottom"
fn parse_bounds(v: &str) -> Result<Rect> {
    let err = |reason: String| GrabError::Config {
        var: ENV_BOUNDS,
        reason,
    };
    let parts = v
        .split(',')
        .map(|s| s.trim().parse::<i32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| err(format!("{v:?}: {e}")))?;
    let [l, t, r, b] = parts[..] else {
        return Err(err(format!("{v:?}: expected left,top,right,bottom")));
    };
    let rect = Rect::from_ltrb(l, t, r, b);
    if rect.width > i32::MAX as u32 || rect.height > i32::MAX as u32 {
        return Err(err(format!("{v:?}: span wider than {}", i32::MAX)));
    }
    if rect.is_empty() {
        return Err(err(format!("{v:?}: empty rectangle")));
    }
    Ok(rect)
}

fn parse_policy(v: &str) -> Result<DisplayPolicy> {
    match v.trim().to_ascii_lowercase().as_str() {
        "primary" => Ok(DisplayPolicy::PrimaryOnly),
        "virtual" => Ok(DisplayPolicy::VirtualDesktop),
        other => Err(GrabError::Config {
            var: ENV_DISPLAY_POLICY,
            reason: format!("{other:?}: expected primary or virtual"),
        }),
    }
}
