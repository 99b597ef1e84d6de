// 该文件是 Resampler （重采样） 项目的一部分。
// src/output/save_image_file.rs - 保存图像文件
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use image::RgbImage;
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{AsNhwcFrame, NhwcFrame, RGB_CHANNELS},
  output::{Render, ensure_parent_dir},
};

pub struct SaveImageFileOutput {
  path: String,
}

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(image::ImageError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("帧形状 {0:?} 无法保存为 RGB 图像")]
  UnsupportedShape([usize; 4]),
}

impl FromUrlWithScheme for SaveImageFileOutput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveImageFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    Ok(SaveImageFileOutput {
      path: uri.path().to_string(),
    })
  }
}

/// 将批大小为 1 的 RGB 帧转换为图像，数值取整并截断到 0..=255
pub fn frame_to_rgb_image(frame: &NhwcFrame) -> Result<RgbImage, SaveImageFileError> {
  if frame.batch() != 1 || frame.channels() != RGB_CHANNELS {
    return Err(SaveImageFileError::UnsupportedShape(frame.shape()));
  }

  let raw = frame
    .as_nhwc()
    .iter()
    .map(|v| v.round().clamp(0.0, 255.0) as u8)
    .collect();
  RgbImage::from_raw(frame.width() as u32, frame.height() as u32, raw)
    .ok_or(SaveImageFileError::UnsupportedShape(frame.shape()))
}

impl SaveImageFileOutput {
  fn save_image(&self, image: RgbImage) -> Result<(), SaveImageFileError> {
    ensure_parent_dir(&self.path).map_err(SaveImageFileError::IoError)?;

    image
      .save(&self.path)
      .map_err(SaveImageFileError::ImageError)?;

    warn!("保存图像到文件: {}", self.path);

    Ok(())
  }
}

impl Render<NhwcFrame> for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render(&self, frame: &NhwcFrame) -> Result<(), Self::Error> {
    let image = frame_to_rgb_image(frame)?;
    self.save_image(image)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn values_are_rounded_and_clamped() {
    let frame = NhwcFrame::from_raw([1, 1, 2, 3], vec![-3.0, 0.4, 0.6, 254.6, 300.0, 128.0]).unwrap();
    let image = frame_to_rgb_image(&frame).unwrap();
    assert_eq!(image.dimensions(), (2, 1));
    assert_eq!(image.as_raw(), &vec![0, 0, 1, 255, 255, 128]);
  }

  #[test]
  fn non_rgb_frames_are_rejected() {
    let frame = NhwcFrame::with_shape(2, 1, 1, 3);
    assert!(matches!(
      frame_to_rgb_image(&frame),
      Err(SaveImageFileError::UnsupportedShape([2, 1, 1, 3]))
    ));
  }
}
