// 该文件是 Resampler （重采样） 项目的一部分。
// src/kernels/transpose.rs - 维度转置内核
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

use tracing::{debug, error};

use crate::{
  kernels::{Buffer, KernelError, check_len},
  registry::TensorRegistry,
  tensor::{TensorData, TensorId, checked_shape_size},
};

fn check_permutation(perm: &[usize], rank: usize) -> Result<(), KernelError> {
  let mut seen = vec![false; rank];
  let valid = perm.len() == rank
    && perm
      .iter()
      .all(|&axis| axis < rank && !std::mem::replace(&mut seen[axis], true));
  if !valid {
    error!("维度排列 {:?} 不是 0..{} 的排列", perm, rank);
    return Err(KernelError::InvalidPermutation(perm.to_vec()));
  }
  Ok(())
}

pub fn transposed_shape(shape: &[usize], perm: &[usize]) -> Vec<usize> {
  perm.iter().map(|&axis| shape[axis]).collect()
}

/// 去掉大小为 1 的维度，并把剩余排列重新编号为 0..n
pub fn remove_one_size_dims(shape: &[usize], perm: &[usize]) -> (Vec<usize>, Vec<usize>) {
  let new_shape: Vec<usize> = shape.iter().copied().filter(|&d| d != 1).collect();
  let mut new_perm: Vec<usize> = perm
    .iter()
    .copied()
    .filter(|&axis| shape[axis] != 1)
    .collect();

  // 保留的轴按原编号从小到大依次映射到 0..n
  let mut order: Vec<usize> = (0..new_perm.len()).collect();
  order.sort_by_key(|&j| new_perm[j]);
  for (rank, j) in order.into_iter().enumerate() {
    new_perm[j] = rank;
  }

  (new_shape, new_perm)
}

fn row_major_strides(shape: &[usize]) -> Vec<usize> {
  let mut strides = vec![1; shape.len()];
  for i in (0..shape.len().saturating_sub(1)).rev() {
    strides[i] = strides[i + 1] * shape[i + 1];
  }
  strides
}

/// 按 `perm` 转置，`output` 形状为 `shape[perm[i]]`
pub fn transpose<T: Copy>(
  input: &[T],
  shape: &[usize],
  perm: &[usize],
  output: &mut [T],
) -> Result<(), KernelError> {
  check_permutation(perm, shape.len())?;
  let size = checked_shape_size(shape).ok_or_else(|| {
    error!("形状 {:?} 的元素个数溢出", shape);
    KernelError::invalid_shape(format!("形状 {:?} 的元素个数溢出", shape))
  })?;
  check_len(Buffer::Input, size, input.len())?;
  check_len(Buffer::Output, size, output.len())?;

  let (shape, perm) = remove_one_size_dims(shape, perm);
  debug!("转置: 化简后形状 {:?}, 排列 {:?}", shape, perm);

  if perm.iter().enumerate().all(|(i, &axis)| i == axis) {
    output.copy_from_slice(input);
    return Ok(());
  }

  let in_strides = row_major_strides(&shape);
  let out_shape = transposed_shape(&shape, &perm);
  // 沿输出第 k 维前进一步时输入偏移的增量
  let steps: Vec<usize> = perm.iter().map(|&axis| in_strides[axis]).collect();

  let mut coords = vec![0usize; out_shape.len()];
  let mut offset = 0usize;
  for out in output.iter_mut() {
    *out = input[offset];
    for k in (0..out_shape.len()).rev() {
      coords[k] += 1;
      offset += steps[k];
      if coords[k] < out_shape[k] {
        break;
      }
      offset -= steps[k] * out_shape[k];
      coords[k] = 0;
    }
  }

  Ok(())
}

pub fn transpose_by_id<R: TensorRegistry>(
  registry: &mut R,
  x_id: TensorId,
  perm: &[usize],
  out_id: TensorId,
) -> Result<(), KernelError> {
  let (x, out) = registry.resolve_io(x_id, out_id)?;
  check_permutation(perm, x.rank())?;

  let expected = transposed_shape(x.shape(), perm);
  if out.shape() != expected.as_slice() {
    error!(
      "输出张量 {} 形状 {:?} 与转置结果 {:?} 不一致",
      out_id,
      out.shape(),
      expected
    );
    return Err(KernelError::invalid_shape(format!(
      "输出形状 {:?} 与转置结果 {:?} 不一致",
      out.shape(),
      expected
    )));
  }

  let shape = x.shape();
  match (x.data(), out.data_mut()) {
    (TensorData::F32(a), TensorData::F32(b)) => transpose(&a[..], shape, perm, &mut b[..]),
    (TensorData::I32(a), TensorData::I32(b)) => transpose(&a[..], shape, perm, &mut b[..]),
    (TensorData::Bool(a), TensorData::Bool(b)) => transpose(&a[..], shape, perm, &mut b[..]),
    (a, b) => {
      error!("转置输入类型 {} 与输出类型 {} 不一致", a.dtype(), b.dtype());
      Err(KernelError::DTypeMismatch {
        expected: a.dtype(),
        actual: b.dtype(),
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;
  use crate::{
    registry::MemoryRegistry,
    tensor::{DType, TensorInfo, shape_size},
  };

  /// 逐元素按坐标搬运的参考实现
  fn reference<T: Copy + Default>(input: &[T], shape: &[usize], perm: &[usize]) -> Vec<T> {
    let out_shape = transposed_shape(shape, perm);
    let in_strides = row_major_strides(shape);
    let out_strides = row_major_strides(&out_shape);
    let mut output = vec![T::default(); input.len()];
    for (i, value) in input.iter().enumerate() {
      let mut rem = i;
      let mut coords = vec![0; shape.len()];
      for (d, stride) in in_strides.iter().enumerate() {
        coords[d] = rem / stride;
        rem %= stride;
      }
      let index: usize = perm
        .iter()
        .zip(&out_strides)
        .map(|(&axis, stride)| coords[axis] * stride)
        .sum();
      output[index] = *value;
    }
    output
  }

  #[test]
  fn transposes_matrix() {
    let input = [1, 2, 3, 4, 5, 6];
    let mut output = [0; 6];
    transpose(&input, &[2, 3], &[1, 0], &mut output).unwrap();
    assert_eq!(output, [1, 4, 2, 5, 3, 6]);
  }

  #[test]
  fn swaps_inner_axes() {
    let input: Vec<i32> = (0..24).collect();
    let mut output = vec![0; 24];
    transpose(&input, &[2, 3, 4], &[0, 2, 1], &mut output).unwrap();
    assert_eq!(output, reference(&input, &[2, 3, 4], &[0, 2, 1]));
    assert_eq!(&output[..6], &[0, 4, 8, 1, 5, 9]);
  }

  #[test]
  fn size_one_dims_are_dropped() {
    assert_eq!(
      remove_one_size_dims(&[1, 3, 1, 2], &[3, 2, 1, 0]),
      (vec![3, 2], vec![1, 0])
    );
    assert_eq!(
      remove_one_size_dims(&[2, 1, 3], &[1, 0, 2]),
      (vec![2, 3], vec![0, 1])
    );

    let input: Vec<f32> = (0..6).map(|v| v as f32).collect();
    let mut output = vec![0.0; 6];
    transpose(&input, &[1, 3, 1, 2], &[3, 2, 1, 0], &mut output).unwrap();
    assert_eq!(output, reference(&input, &[1, 3, 1, 2], &[3, 2, 1, 0]));
  }

  #[test]
  fn rejects_bad_permutation() {
    let mut output = [0; 4];
    for perm in [&[0, 0][..], &[0][..], &[0, 2][..]] {
      assert_eq!(
        transpose(&[1, 2, 3, 4], &[2, 2], perm, &mut output),
        Err(KernelError::InvalidPermutation(perm.to_vec()))
      );
    }
  }

  #[test]
  fn oversized_shape_is_invalid() {
    let mut output = [0; 1];
    assert!(matches!(
      transpose(&[], &[1 << 32, 1 << 32], &[1, 0], &mut output),
      Err(KernelError::InvalidShape(_))
    ));
  }

  #[test]
  fn by_id_checks_shape_and_dtype() {
    let mut registry = MemoryRegistry::new();
    let x = registry.register(TensorInfo::from_i32(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap());
    let out = registry.make_output(&[3, 2], DType::Int32);
    transpose_by_id(&mut registry, x, &[1, 0], out).unwrap();
    assert_eq!(
      registry.resolve(out).unwrap().data(),
      &TensorData::I32(vec![1, 4, 2, 5, 3, 6].into_boxed_slice())
    );

    let wrong_shape = registry.make_output(&[2, 3], DType::Int32);
    assert!(matches!(
      transpose_by_id(&mut registry, x, &[1, 0], wrong_shape),
      Err(KernelError::InvalidShape(_))
    ));

    let wrong_type = registry.make_output(&[3, 2], DType::Float32);
    assert_eq!(
      transpose_by_id(&mut registry, x, &[1, 0], wrong_type),
      Err(KernelError::DTypeMismatch {
        expected: DType::Int32,
        actual: DType::Float32,
      })
    );
  }

  fn shape_and_perm() -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    prop::collection::vec(1usize..=4, 0..=5).prop_flat_map(|shape| {
      let rank = shape.len();
      (Just(shape), Just((0..rank).collect::<Vec<_>>()).prop_shuffle())
    })
  }

  proptest! {
    #[test]
    fn prop_matches_reference((shape, perm) in shape_and_perm()) {
      let input: Vec<i32> = (0..shape_size(&shape) as i32).collect();
      let mut output = vec![0; input.len()];
      transpose(&input, &shape, &perm, &mut output).unwrap();
      prop_assert_eq!(output, reference(&input, &shape, &perm));
    }

    #[test]
    fn prop_inverse_restores_input((shape, perm) in shape_and_perm()) {
      let input: Vec<i32> = (0..shape_size(&shape) as i32).collect();
      let mut once = vec![0; input.len()];
      transpose(&input, &shape, &perm, &mut once).unwrap();

      let mut inverse = vec![0; perm.len()];
      for (i, &axis) in perm.iter().enumerate() {
        inverse[axis] = i;
      }
      let mut twice = vec![0; input.len()];
      transpose(&once, &transposed_shape(&shape, &perm), &inverse, &mut twice).unwrap();
      prop_assert_eq!(twice, input);
    }
  }
}
