// Screenshot functionality
//
// Renders the displayed frame slot to a PNG file at a requested size.

use super::slots::FrameSlot;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during screenshot operations
#[derive(Debug, Error)]
pub enum ScreenshotError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// Requested output size has a zero dimension
    #[error("invalid screenshot size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// Save `frame` as a PNG scaled to `width` x `height`
///
/// Scaling is nearest neighbour. Parent directories are created.
///
/// # Arguments
///
/// * `path` - Destination file
/// * `frame` - The frame currently shown on the display
/// * `width` - Output width in pixels
/// * `height` - Output height in pixels
pub fn save_frame(
    path: &Path,
    frame: &FrameSlot,
    width: u32,
    height: u32,
) -> Result<(), ScreenshotError> {
    if width == 0 || height == 0 {
        return Err(ScreenshotError::InvalidSize { width, height });
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let rgb_data = scale_to_rgb(frame, width as usize, height as usize);
    save_png(path, &rgb_data, width, height)
}

/// Build a timestamped screenshot path inside `directory`
///
/// Creates a path like: `<directory>/<rom_name>/screenshot_20250101_120000.png`
pub fn timestamped_path(directory: &Path, rom_name: Option<&str>) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let folder = rom_name
        .map(sanitize_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "default".to_string());

    directory
        .join(folder)
        .join(format!("screenshot_{}.png", timestamp))
}

fn sanitize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Expand an RGB565 pixel to RGB888
#[inline]
pub fn rgb565_to_rgb888(pixel: u16) -> [u8; 3] {
    let r = ((pixel >> 11) & 0x1F) as u8;
    let g = ((pixel >> 5) & 0x3F) as u8;
    let b = (pixel & 0x1F) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

fn scale_to_rgb(frame: &FrameSlot, width: usize, height: usize) -> Vec<u8> {
    let mut rgb_data = Vec::with_capacity(width * height * 3);

    for y in 0..height {
        let src_y = y * frame.height() / height;
        for x in 0..width {
            let src_x = x * frame.width() / width;
            rgb_data.extend_from_slice(&rgb565_to_rgb888(frame.pixel(src_x, src_y)));
        }
    }

    rgb_data
}

fn save_png(path: &Path, data: &[u8], width: u32, height: u32) -> Result<(), ScreenshotError> {
    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;

    Ok(())
}
