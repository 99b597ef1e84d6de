// 该文件是 Resampler （重采样） 项目的一部分。
// src/output/json_tensor.rs - 以 JSON 保存张量
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

use std::{
  fs::File,
  io::{BufWriter, Write},
};

use serde_json::json;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{AsNhwcFrame, NhwcFrame},
  output::{Render, ensure_parent_dir},
};

#[derive(Error, Debug)]
pub enum JsonTensorOutputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

/// 写出 `{ "shape": [...], "data": [...] }`
pub struct JsonTensorOutput {
  path: String,
}

impl FromUrlWithScheme for JsonTensorOutput {
  const SCHEME: &'static str = "json";
}

impl FromUrl for JsonTensorOutput {
  type Error = JsonTensorOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(JsonTensorOutputError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    Ok(JsonTensorOutput {
      path: uri.path().to_string(),
    })
  }
}

impl Render<NhwcFrame> for JsonTensorOutput {
  type Error = JsonTensorOutputError;

  fn render(&self, frame: &NhwcFrame) -> Result<(), Self::Error> {
    ensure_parent_dir(&self.path)?;
    let value = json!({
      "shape": frame.shape(),
      "data": frame.as_nhwc(),
    });
    let mut writer = BufWriter::new(File::create(&self.path)?);
    serde_json::to_writer(&mut writer, &value)?;
    writer.flush()?;
    info!("保存张量到文件: {}", self.path);
    Ok(())
  }
}
