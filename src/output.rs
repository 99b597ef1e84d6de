// 该文件是 Resampler （重采样） 项目的一部分。
// src/output.rs - 输出定义
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

use std::path::Path;

use thiserror::Error;
use url::Url;

use crate::frame::NhwcFrame;
use crate::{FromUrl, FromUrlWithScheme};

pub trait Render<Frame>: Sized {
  type Error;
  fn render(&self, frame: &Frame) -> Result<(), Self::Error>;
}

#[cfg(feature = "save_image_file")]
mod save_image_file;
#[cfg(feature = "save_image_file")]
pub use self::save_image_file::{SaveImageFileError, SaveImageFileOutput};

mod json_tensor;
pub use self::json_tensor::{JsonTensorOutput, JsonTensorOutputError};

/// 创建输出文件所在目录
pub(crate) fn ensure_parent_dir(path: &str) -> std::io::Result<()> {
  if let Some(parent) = Path::new(path).parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)?;
  }
  Ok(())
}

#[derive(Error, Debug)]
pub enum OutputError {
  #[cfg(feature = "save_image_file")]
  #[error("保存图像文件错误: {0}")]
  SaveImageFileError(#[from] SaveImageFileError),
  #[error("JSON 张量输出错误: {0}")]
  JsonTensorOutputError(#[from] JsonTensorOutputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum OutputWrapper {
  #[cfg(feature = "save_image_file")]
  SaveImageFileOutput(SaveImageFileOutput),
  JsonTensorOutput(JsonTensorOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      #[cfg(feature = "save_image_file")]
      SaveImageFileOutput::SCHEME => {
        let output = SaveImageFileOutput::from_url(url)?;
        Ok(OutputWrapper::SaveImageFileOutput(output))
      }
      JsonTensorOutput::SCHEME => {
        let output = JsonTensorOutput::from_url(url)?;
        Ok(OutputWrapper::JsonTensorOutput(output))
      }
      other => {
        tracing::error!("不支持的输出方案: {}", other);
        Err(OutputError::SchemeMismatch)
      }
    }
  }
}

impl Render<NhwcFrame> for OutputWrapper {
  type Error = OutputError;

  fn render(&self, frame: &NhwcFrame) -> Result<(), Self::Error> {
    match self {
      #[cfg(feature = "save_image_file")]
      OutputWrapper::SaveImageFileOutput(output) => {
        output.render(frame).map_err(OutputError::from)
      }
      OutputWrapper::JsonTensorOutput(output) => output.render(frame).map_err(OutputError::from),
    }
  }
}
