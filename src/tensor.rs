// 该文件是 Resampler （重采样） 项目的一部分。
// src/tensor.rs - 张量缓冲区与元素类型
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

use std::fmt;

use thiserror::Error;

/// 外部张量注册表中的不透明标识
pub type TensorId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
  Float32,
  Int32,
  Bool,
}

impl DType {
  pub fn size_of(&self) -> usize {
    match self {
      DType::Float32 | DType::Int32 => 4,
      DType::Bool => 1,
    }
  }
}

impl fmt::Display for DType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      DType::Float32 => "float32",
      DType::Int32 => "int32",
      DType::Bool => "bool",
    };
    f.write_str(name)
  }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
  #[error("数据长度不匹配: 形状 {shape:?} 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch {
    shape: Vec<usize>,
    expected: usize,
    actual: usize,
  },
  #[error("维度数不匹配: 期望 {expected}, 实际 {actual}")]
  RankMismatch { expected: usize, actual: usize },
  #[error("元素类型不匹配: 期望 {expected}, 实际 {actual}")]
  DTypeMismatch { expected: DType, actual: DType },
  #[error("形状 {0:?} 的元素个数超出 usize 范围")]
  SizeOverflow(Vec<usize>),
}

/// 连续、行优先存储的样本
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
  F32(Box<[f32]>),
  I32(Box<[i32]>),
  Bool(Box<[u8]>),
}

impl TensorData {
  fn zeros(dtype: DType, len: usize) -> Self {
    match dtype {
      DType::Float32 => TensorData::F32(vec![0.0; len].into_boxed_slice()),
      DType::Int32 => TensorData::I32(vec![0; len].into_boxed_slice()),
      DType::Bool => TensorData::Bool(vec![0; len].into_boxed_slice()),
    }
  }

  pub fn dtype(&self) -> DType {
    match self {
      TensorData::F32(_) => DType::Float32,
      TensorData::I32(_) => DType::Int32,
      TensorData::Bool(_) => DType::Bool,
    }
  }

  pub fn len(&self) -> usize {
    match self {
      TensorData::F32(data) => data.len(),
      TensorData::I32(data) => data.len(),
      TensorData::Bool(data) => data.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// 形状 + 数据，对应注册表解析出的 (指针, 长度, 元素类型)
#[derive(Debug, Clone, PartialEq)]
pub struct TensorInfo {
  pub(crate) shape: Box<[usize]>,
  pub(crate) data: TensorData,
}

/// 形状元素个数之积，0 阶张量为 1；溢出时为 `None`
pub fn checked_shape_size(shape: &[usize]) -> Option<usize> {
  shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// 同 [`checked_shape_size`]，溢出时饱和到 `usize::MAX`
pub fn shape_size(shape: &[usize]) -> usize {
  checked_shape_size(shape).unwrap_or(usize::MAX)
}

impl TensorInfo {
  pub fn zeros(shape: &[usize], dtype: DType) -> Self {
    Self {
      shape: shape.into(),
      data: TensorData::zeros(dtype, shape_size(shape)),
    }
  }

  pub fn new(shape: &[usize], data: TensorData) -> Result<Self, TensorError> {
    let expected =
      checked_shape_size(shape).ok_or_else(|| TensorError::SizeOverflow(shape.to_vec()))?;
    if data.len() != expected {
      return Err(TensorError::LengthMismatch {
        shape: shape.to_vec(),
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      shape: shape.into(),
      data,
    })
  }

  pub fn from_f32(shape: &[usize], values: Vec<f32>) -> Result<Self, TensorError> {
    Self::new(shape, TensorData::F32(values.into_boxed_slice()))
  }

  pub fn from_i32(shape: &[usize], values: Vec<i32>) -> Result<Self, TensorError> {
    Self::new(shape, TensorData::I32(values.into_boxed_slice()))
  }

  pub fn shape(&self) -> &[usize] {
    &self.shape
  }

  pub fn rank(&self) -> usize {
    self.shape.len()
  }

  pub fn size(&self) -> usize {
    shape_size(&self.shape)
  }

  pub fn dtype(&self) -> DType {
    self.data.dtype()
  }

  pub fn byte_len(&self) -> usize {
    self.size() * self.dtype().size_of()
  }

  pub fn data(&self) -> &TensorData {
    &self.data
  }

  pub fn data_mut(&mut self) -> &mut TensorData {
    &mut self.data
  }

  pub fn as_f32(&self) -> Option<&[f32]> {
    match &self.data {
      TensorData::F32(data) => Some(data),
      _ => None,
    }
  }

  pub fn as_f32_mut(&mut self) -> Option<&mut [f32]> {
    match &mut self.data {
      TensorData::F32(data) => Some(data),
      _ => None,
    }
  }

  pub fn into_data(self) -> TensorData {
    self.data
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zeros_allocates_shape_product() {
    let info = TensorInfo::zeros(&[2, 3, 4, 1], DType::Float32);
    assert_eq!(info.size(), 24);
    assert_eq!(info.byte_len(), 96);
    assert_eq!(info.as_f32().map(|d| d.len()), Some(24));
  }

  #[test]
  fn scalar_has_size_one() {
    let info = TensorInfo::zeros(&[], DType::Bool);
    assert_eq!(info.rank(), 0);
    assert_eq!(info.size(), 1);
  }

  #[test]
  fn from_f32_rejects_wrong_length() {
    let err = TensorInfo::from_f32(&[2, 2], vec![1.0, 2.0, 3.0]).unwrap_err();
    assert_eq!(
      err,
      TensorError::LengthMismatch {
        shape: vec![2, 2],
        expected: 4,
        actual: 3,
      }
    );
  }

  #[test]
  fn oversized_shape_is_rejected() {
    let shape = [1 << 32, 1 << 32, 1];
    assert_eq!(checked_shape_size(&shape), None);
    assert_eq!(shape_size(&shape), usize::MAX);
    assert_eq!(
      TensorInfo::from_f32(&shape, Vec::new()),
      Err(TensorError::SizeOverflow(shape.to_vec()))
    );
  }

  #[test]
  fn typed_views_follow_dtype() {
    let mut info = TensorInfo::from_i32(&[3], vec![1, 2, 3]).unwrap();
    assert_eq!(info.dtype(), DType::Int32);
    assert!(info.as_f32().is_none());
    assert!(info.as_f32_mut().is_none());
    assert_eq!(DType::Int32.to_string(), "int32");
  }
}
