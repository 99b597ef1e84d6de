// 该文件是 Resampler （重采样） 项目的一部分。
// src/registry.rs - 张量注册表
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

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, error};

use crate::tensor::{DType, TensorId, TensorInfo};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
  #[error("未知的张量标识: {0}")]
  UnknownTensor(TensorId),
  #[error("输入与输出指向同一张量: {0}")]
  Aliased(TensorId),
}

/// 由宿主运行时提供的张量解析接口
///
/// 返回的视图在一次内核调用期间保持有效。
pub trait TensorRegistry {
  fn resolve(&self, id: TensorId) -> Result<&TensorInfo, RegistryError>;

  /// 同时取得只读输入与可写输出，两者不得指向同一张量
  fn resolve_io(
    &mut self,
    input: TensorId,
    output: TensorId,
  ) -> Result<(&TensorInfo, &mut TensorInfo), RegistryError>;
}

/// 进程内注册表
#[derive(Debug, Default)]
pub struct MemoryRegistry {
  tensors: HashMap<TensorId, TensorInfo>,
  next_id: TensorId,
}

impl MemoryRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(&mut self, info: TensorInfo) -> TensorId {
    let id = self.next_id;
    self.next_id += 1;
    debug!(
      "注册张量 {}: 形状 {:?}, 类型 {}",
      id,
      info.shape(),
      info.dtype()
    );
    self.tensors.insert(id, info);
    id
  }

  /// 预分配一个全零输出张量
  pub fn make_output(&mut self, shape: &[usize], dtype: DType) -> TensorId {
    self.register(TensorInfo::zeros(shape, dtype))
  }

  pub fn dispose(&mut self, id: TensorId) -> Option<TensorInfo> {
    self.tensors.remove(&id)
  }

  pub fn len(&self) -> usize {
    self.tensors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tensors.is_empty()
  }
}

impl TensorRegistry for MemoryRegistry {
  fn resolve(&self, id: TensorId) -> Result<&TensorInfo, RegistryError> {
    self.tensors.get(&id).ok_or_else(|| {
      error!("无法解析张量标识 {}", id);
      RegistryError::UnknownTensor(id)
    })
  }

  fn resolve_io(
    &mut self,
    input: TensorId,
    output: TensorId,
  ) -> Result<(&TensorInfo, &mut TensorInfo), RegistryError> {
    if input == output {
      error!("输入与输出张量标识相同: {}", input);
      return Err(RegistryError::Aliased(input));
    }

    match self.tensors.get_disjoint_mut([&input, &output]) {
      [Some(i), Some(o)] => Ok((&*i, o)),
      [None, _] => {
        error!("无法解析张量标识 {}", input);
        Err(RegistryError::UnknownTensor(input))
      }
      [_, None] => {
        error!("无法解析张量标识 {}", output);
        Err(RegistryError::UnknownTensor(output))
      }
    }
  }
}
