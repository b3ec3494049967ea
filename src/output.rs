use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use image::{ImageFormat, RgbaImage};
use log::info;

use crate::error::Result;

/// `YYYY_MM_DD_HH_MM_SS.png`
pub fn timestamp_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y_%m_%d_%H_%M_%S.png").to_string()
}

/// 以当前本地时间命名保存到 dir，返回写入路径
pub fn save_png(image: &RgbaImage, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(timestamp_file_name(&Local::now()));
    image.save_with_format(&path, ImageFormat::Png)?;
    info!(
        "saved {}x{} selection to {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(path)
}
