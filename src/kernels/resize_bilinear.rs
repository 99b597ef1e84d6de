// 该文件是 Resampler （重采样） 项目的一部分。
// src/kernels/resize_bilinear.rs - 双线性缩放内核
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

use rayon::prelude::*;
use tracing::{debug, error};

use crate::{
  frame::{AsNhwcFrame, NhwcFrame},
  kernels::{Buffer, Kernel, KernelError, check_len},
  registry::TensorRegistry,
  tensor::{DType, TensorId, checked_shape_size},
};

/// 输出元素数超过该值时按行并行
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64 * 1024;

/// 缩放参数，布局均为 NHWC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
  pub batch: usize,
  pub old_height: usize,
  pub old_width: usize,
  pub channels: usize,
  pub new_height: usize,
  pub new_width: usize,
  pub align_corners: bool,
}

fn positive(name: &str, value: i32) -> Result<usize, KernelError> {
  if value <= 0 {
    error!("{} 必须为正数, 实际为 {}", name, value);
    return Err(KernelError::invalid_shape(format!(
      "{} 必须为正数, 实际为 {}",
      name, value
    )));
  }
  Ok(value as usize)
}

impl ResizeParams {
  /// 从导出接口的整数参数构造，`align_corners > 0` 视为真
  pub fn from_raw(
    batch: i32,
    old_height: i32,
    old_width: i32,
    channels: i32,
    new_height: i32,
    new_width: i32,
    align_corners: i32,
  ) -> Result<Self, KernelError> {
    Ok(Self {
      batch: positive("batch", batch)?,
      old_height: positive("old_height", old_height)?,
      old_width: positive("old_width", old_width)?,
      channels: positive("channels", channels)?,
      new_height: positive("new_height", new_height)?,
      new_width: positive("new_width", new_width)?,
      align_corners: align_corners > 0,
    })
  }

  pub fn validate(&self) -> Result<(), KernelError> {
    let dims = [
      ("batch", self.batch),
      ("old_height", self.old_height),
      ("old_width", self.old_width),
      ("channels", self.channels),
      ("new_height", self.new_height),
      ("new_width", self.new_width),
    ];
    for (name, value) in dims {
      if value == 0 {
        error!("{} 必须为正数", name);
        return Err(KernelError::invalid_shape(format!("{} 必须为正数", name)));
      }
    }
    Ok(())
  }

  pub fn input_shape(&self) -> [usize; 4] {
    [self.batch, self.old_height, self.old_width, self.channels]
  }

  pub fn output_shape(&self) -> [usize; 4] {
    [self.batch, self.new_height, self.new_width, self.channels]
  }

  /// 输入元素个数，乘积溢出时返回 `InvalidShape`
  pub fn input_len(&self) -> Result<usize, KernelError> {
    element_count(&self.input_shape())
  }

  /// 输出元素个数，乘积溢出时返回 `InvalidShape`
  pub fn output_len(&self) -> Result<usize, KernelError> {
    element_count(&self.output_shape())
  }
}

fn element_count(shape: &[usize; 4]) -> Result<usize, KernelError> {
  checked_shape_size(shape).ok_or_else(|| {
    error!("形状 {:?} 的元素个数溢出", shape);
    KernelError::invalid_shape(format!("形状 {:?} 的元素个数溢出", shape))
  })
}

/// 单个空间轴上每个输出坐标的采样位置与权重
///
/// 源坐标 `i * in / out` 按整数除法拆成整数部分与余数，
/// 下标因此总是精确的，对齐角点时首尾坐标恰好落在首尾样本上。
/// 权重 `余数 / out` 以 f32 计算。
#[derive(Debug)]
struct AxisSampler {
  lo: Box<[usize]>,
  hi: Box<[usize]>,
  weight: Box<[f32]>,
}

impl AxisSampler {
  fn new(old: usize, new: usize, align_corners: bool) -> Self {
    let (effective_in, effective_out) = if align_corners && new > 1 {
      (old - 1, new - 1)
    } else {
      (old, new)
    };
    debug!(
      "轴缩放: {} -> {}, 有效尺寸 {} / {}, 比例 {:.6}",
      old,
      new,
      effective_in,
      effective_out,
      effective_in as f32 / effective_out as f32
    );

    let mut lo = Vec::with_capacity(new);
    let mut hi = Vec::with_capacity(new);
    let mut weight = Vec::with_capacity(new);
    for i in 0..new {
      let scaled = i * effective_in;
      let i0 = (scaled / effective_out).min(old - 1);
      let i1 = (i0 + 1).min(old - 1);
      let w = if i0 == i1 {
        0.0
      } else {
        let rem = scaled - i0 * effective_out;
        (rem as f32 / effective_out as f32).clamp(0.0, 1.0)
      };
      lo.push(i0);
      hi.push(i1);
      weight.push(w);
    }

    Self {
      lo: lo.into_boxed_slice(),
      hi: hi.into_boxed_slice(),
      weight: weight.into_boxed_slice(),
    }
  }
}

fn resize_row(
  input: &[f32],
  params: &ResizeParams,
  ys: &AxisSampler,
  xs: &AxisSampler,
  row_index: usize,
  row: &mut [f32],
) {
  let channels = params.channels;
  let in_row_stride = params.old_width * channels;
  let b = row_index / params.new_height;
  let y = row_index % params.new_height;

  let image = b * params.old_height * in_row_stride;
  let top = image + ys.lo[y] * in_row_stride;
  let bottom = image + ys.hi[y] * in_row_stride;
  let wy = ys.weight[y];

  for (x, pixel) in row.chunks_exact_mut(channels).enumerate() {
    let left = xs.lo[x] * channels;
    let right = xs.hi[x] * channels;
    let wx = xs.weight[x];

    for (c, out) in pixel.iter_mut().enumerate() {
      let top_left = input[top + left + c];
      let top_right = input[top + right + c];
      let bottom_left = input[bottom + left + c];
      let bottom_right = input[bottom + right + c];

      let t = top_left * (1.0 - wx) + top_right * wx;
      let bm = bottom_left * (1.0 - wx) + bottom_right * wx;
      *out = t * (1.0 - wy) + bm * wy;
    }
  }
}

fn execute(
  input: &[f32],
  params: &ResizeParams,
  output: &mut [f32],
  parallel_threshold: usize,
) -> Result<(), KernelError> {
  params.validate()?;
  let input_len = params.input_len()?;
  let output_len = params.output_len()?;
  check_len(Buffer::Input, input_len, input.len())?;
  check_len(Buffer::Output, output_len, output.len())?;

  debug!(
    "双线性缩放: {:?} -> {:?}, 对齐角点: {}",
    params.input_shape(),
    params.output_shape(),
    params.align_corners
  );

  let ys = AxisSampler::new(params.old_height, params.new_height, params.align_corners);
  let xs = AxisSampler::new(params.old_width, params.new_width, params.align_corners);
  let row_len = params.new_width * params.channels;

  if output.len() > parallel_threshold {
    debug!("按行并行执行, 共 {} 行", params.batch * params.new_height);
    output
      .par_chunks_mut(row_len)
      .enumerate()
      .for_each(|(i, row)| resize_row(input, params, &ys, &xs, i, row));
  } else {
    output
      .chunks_mut(row_len)
      .enumerate()
      .for_each(|(i, row)| resize_row(input, params, &ys, &xs, i, row));
  }

  Ok(())
}

/// 将 NHWC 输入按双线性插值缩放写入预分配的输出
///
/// 前置条件不满足时在写入任何输出之前返回错误。
pub fn resize_bilinear(
  input: &[f32],
  params: &ResizeParams,
  output: &mut [f32],
) -> Result<(), KernelError> {
  execute(input, params, output, DEFAULT_PARALLEL_THRESHOLD)
}

fn float32_required(id: TensorId, actual: DType) -> KernelError {
  error!("双线性缩放仅支持 float32, 张量 {} 为 {}", id, actual);
  KernelError::DTypeMismatch {
    expected: DType::Float32,
    actual,
  }
}

/// 以张量标识调用的入口，参数与导出符号一致
#[allow(clippy::too_many_arguments)]
pub fn resize_bilinear_by_id<R: TensorRegistry>(
  registry: &mut R,
  x_id: TensorId,
  batch: i32,
  old_height: i32,
  old_width: i32,
  channels: i32,
  new_height: i32,
  new_width: i32,
  align_corners: i32,
  out_id: TensorId,
) -> Result<(), KernelError> {
  let params = ResizeParams::from_raw(
    batch,
    old_height,
    old_width,
    channels,
    new_height,
    new_width,
    align_corners,
  )?;
  let (x, out) = registry.resolve_io(x_id, out_id)?;

  if x.shape() != params.input_shape() {
    error!(
      "输入张量 {} 形状 {:?} 与参数 {:?} 不一致",
      x_id,
      x.shape(),
      params.input_shape()
    );
    return Err(KernelError::invalid_shape(format!(
      "输入形状 {:?} 与参数 {:?} 不一致",
      x.shape(),
      params.input_shape()
    )));
  }
  if out.shape() != params.output_shape() {
    error!(
      "输出张量 {} 形状 {:?} 与参数 {:?} 不一致",
      out_id,
      out.shape(),
      params.output_shape()
    );
    return Err(KernelError::invalid_shape(format!(
      "输出形状 {:?} 与参数 {:?} 不一致",
      out.shape(),
      params.output_shape()
    )));
  }

  let input = x.as_f32().ok_or_else(|| float32_required(x_id, x.dtype()))?;
  let out_dtype = out.dtype();
  let output = out
    .as_f32_mut()
    .ok_or_else(|| float32_required(out_id, out_dtype))?;
  resize_bilinear(input, &params, output)
}

/// 可配置的双线性缩放内核
#[derive(Debug, Clone)]
pub struct ResizeBilinear {
  new_height: usize,
  new_width: usize,
  align_corners: bool,
  parallel_threshold: usize,
}

pub struct ResizeBilinearBuilder {
  new_height: usize,
  new_width: usize,
  align_corners: bool,
  parallel_threshold: usize,
}

impl ResizeBilinearBuilder {
  pub fn new(new_height: usize, new_width: usize) -> Self {
    Self {
      new_height,
      new_width,
      align_corners: false,
      parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
    }
  }

  pub fn align_corners(mut self, align_corners: bool) -> Self {
    self.align_corners = align_corners;
    self
  }

  pub fn parallel_threshold(mut self, threshold: usize) -> Self {
    self.parallel_threshold = threshold;
    self
  }

  pub fn build(self) -> Result<ResizeBilinear, KernelError> {
    if self.new_height == 0 || self.new_width == 0 {
      error!(
        "目标尺寸必须为正数, 实际为 {}x{}",
        self.new_width, self.new_height
      );
      return Err(KernelError::invalid_shape(format!(
        "目标尺寸必须为正数, 实际为 {}x{}",
        self.new_width, self.new_height
      )));
    }

    Ok(ResizeBilinear {
      new_height: self.new_height,
      new_width: self.new_width,
      align_corners: self.align_corners,
      parallel_threshold: self.parallel_threshold,
    })
  }
}

impl ResizeBilinear {
  pub fn builder(new_height: usize, new_width: usize) -> ResizeBilinearBuilder {
    ResizeBilinearBuilder::new(new_height, new_width)
  }

  pub fn params_for(
    &self,
    batch: usize,
    old_height: usize,
    old_width: usize,
    channels: usize,
  ) -> ResizeParams {
    ResizeParams {
      batch,
      old_height,
      old_width,
      channels,
      new_height: self.new_height,
      new_width: self.new_width,
      align_corners: self.align_corners,
    }
  }

  pub fn resize_into(
    &self,
    input: &[f32],
    params: &ResizeParams,
    output: &mut [f32],
  ) -> Result<(), KernelError> {
    execute(input, params, output, self.parallel_threshold)
  }
}

impl Kernel for ResizeBilinear {
  type Input = NhwcFrame;
  type Output = NhwcFrame;
  type Error = KernelError;

  fn run(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let params = self.params_for(
      input.batch(),
      input.height(),
      input.width(),
      input.channels(),
    );
    params.output_len()?;
    let mut output = NhwcFrame::with_shape(
      params.batch,
      params.new_height,
      params.new_width,
      params.channels,
    );
    self.resize_into(input.as_nhwc(), &params, output.as_mut())?;
    Ok(output)
  }
}
