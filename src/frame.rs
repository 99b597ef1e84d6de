// 该文件是 Resampler （重采样） 项目的一部分。
// src/frame.rs - NHWC 帧定义
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

use crate::tensor::{DType, TensorData, TensorError, TensorInfo, checked_shape_size, shape_size};

pub const RGB_CHANNELS: usize = 3;

pub trait AsNhwcFrame {
  fn as_nhwc(&self) -> &[f32];
}

/// 运行时形状的 f32 NHWC 帧
#[derive(Debug, Clone, PartialEq)]
pub struct NhwcFrame {
  shape: [usize; 4],
  data: Box<[f32]>,
}

impl NhwcFrame {
  pub fn with_shape(batch: usize, height: usize, width: usize, channels: usize) -> Self {
    let size = shape_size(&[batch, height, width, channels]);
    Self {
      shape: [batch, height, width, channels],
      data: vec![0.0; size].into_boxed_slice(),
    }
  }

  pub fn from_raw(shape: [usize; 4], data: Vec<f32>) -> Result<Self, TensorError> {
    let expected =
      checked_shape_size(&shape).ok_or_else(|| TensorError::SizeOverflow(shape.to_vec()))?;
    if data.len() != expected {
      return Err(TensorError::LengthMismatch {
        shape: shape.to_vec(),
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      shape,
      data: data.into_boxed_slice(),
    })
  }

  pub fn shape(&self) -> [usize; 4] {
    self.shape
  }

  pub fn batch(&self) -> usize {
    self.shape[0]
  }

  pub fn height(&self) -> usize {
    self.shape[1]
  }

  pub fn width(&self) -> usize {
    self.shape[2]
  }

  pub fn channels(&self) -> usize {
    self.shape[3]
  }
}

impl AsMut<[f32]> for NhwcFrame {
  fn as_mut(&mut self) -> &mut [f32] {
    &mut self.data
  }
}

impl AsNhwcFrame for NhwcFrame {
  fn as_nhwc(&self) -> &[f32] {
    &self.data
  }
}

impl From<NhwcFrame> for TensorInfo {
  fn from(frame: NhwcFrame) -> Self {
    TensorInfo {
      shape: frame.shape.into(),
      data: TensorData::F32(frame.data),
    }
  }
}

impl TryFrom<&TensorInfo> for NhwcFrame {
  type Error = TensorError;

  fn try_from(info: &TensorInfo) -> Result<Self, Self::Error> {
    let shape: [usize; 4] = info
      .shape()
      .try_into()
      .map_err(|_| TensorError::RankMismatch {
        expected: 4,
        actual: info.rank(),
      })?;
    let data = info.as_f32().ok_or(TensorError::DTypeMismatch {
      expected: DType::Float32,
      actual: info.dtype(),
    })?;
    NhwcFrame::from_raw(shape, data.to_vec())
  }
}
