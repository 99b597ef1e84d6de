// 该文件是 Resampler （重采样） 项目的一部分。
// src/kernels.rs - 计算内核
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

use thiserror::Error;

use crate::{registry::RegistryError, tensor::DType};

pub trait Kernel {
  type Input;
  type Output;
  type Error;

  fn run(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 缓冲区用途，用于错误信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffer {
  Input,
  Output,
}

impl std::fmt::Display for Buffer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Buffer::Input => f.write_str("输入"),
      Buffer::Output => f.write_str("输出"),
    }
  }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KernelError {
  #[error("形状无效: {0}")]
  InvalidShape(String),
  #[error("{which}缓冲区大小不匹配: 期望 {expected}, 实际 {actual}")]
  BufferSize {
    which: Buffer,
    expected: usize,
    actual: usize,
  },
  #[error("元素类型不匹配: 期望 {expected}, 实际 {actual}")]
  DTypeMismatch { expected: DType, actual: DType },
  #[error("无效的维度排列: {0:?}")]
  InvalidPermutation(Vec<usize>),
  #[error("注册表错误: {0}")]
  Registry(#[from] RegistryError),
}

impl KernelError {
  pub fn invalid_shape(msg: impl Into<String>) -> Self {
    KernelError::InvalidShape(msg.into())
  }
}

pub(crate) fn check_len(which: Buffer, expected: usize, actual: usize) -> Result<(), KernelError> {
  if expected != actual {
    tracing::error!("{}缓冲区大小不匹配: 期望 {}, 实际 {}", which, expected, actual);
    return Err(KernelError::BufferSize {
      which,
      expected,
      actual,
    });
  }
  Ok(())
}

mod resize_bilinear;
pub use self::resize_bilinear::{
  DEFAULT_PARALLEL_THRESHOLD, ResizeBilinear, ResizeBilinearBuilder, ResizeParams,
  resize_bilinear, resize_bilinear_by_id,
};

mod transpose;
pub use self::transpose::{remove_one_size_dims, transpose, transpose_by_id, transposed_shape};
