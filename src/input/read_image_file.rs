// 该文件是 Resampler （重采样） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{NhwcFrame, RGB_CHANNELS},
};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
}

/// 读取单张图像文件，只产出一帧
pub struct ImageFileInput {
  image: Option<RgbImage>,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    let path = url.path();
    let image = ImageReader::open(path)?.decode()?;
    debug!("读取图像 {}: {}x{}", path, image.width(), image.height());

    Ok(ImageFileInput {
      image: Some(image.into()),
    })
  }
}

impl From<RgbImage> for ImageFileInput {
  fn from(image: RgbImage) -> Self {
    Self { image: Some(image) }
  }
}

impl Iterator for ImageFileInput {
  type Item = NhwcFrame;

  fn next(&mut self) -> Option<Self::Item> {
    self.image.take().map(NhwcFrame::from)
  }
}

impl From<RgbImage> for NhwcFrame {
  fn from(image: RgbImage) -> Self {
    let (width, height) = image.dimensions();
    let mut frame = NhwcFrame::with_shape(1, height as usize, width as usize, RGB_CHANNELS);

    // RgbImage 的内存布局即为 HWC
    for (dst, src) in frame.as_mut().iter_mut().zip(image.as_raw()) {
      *dst = *src as f32;
    }
    frame
  }
}

#[cfg(test)]
mod tests {
  use image::Rgb;

  use super::*;
  use crate::frame::AsNhwcFrame;

  #[test]
  fn rgb_image_becomes_single_batch_frame() {
    let mut image = RgbImage::new(2, 1);
    image.put_pixel(0, 0, Rgb([1, 2, 3]));
    image.put_pixel(1, 0, Rgb([4, 5, 6]));

    let mut input = ImageFileInput::from(image);
    let frame = input.next().unwrap();
    assert_eq!(frame.shape(), [1, 1, 2, 3]);
    assert_eq!(frame.as_nhwc(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert!(input.next().is_none());
  }

  #[test]
  fn rejects_other_scheme() {
    let url = Url::parse("json:///tmp/a.json").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(ImageFileInputError::SchemaMismatch)
    ));
  }
}
