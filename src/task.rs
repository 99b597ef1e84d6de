// 该文件是 Resampler （重采样） 项目的一部分。
// src/task.rs - 任务调度
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

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::{kernels::Kernel, output::Render};

pub trait Task<I, K, O>: Sized {
  type Error;
  fn run_task(self, input: I, kernel: K, output: O) -> Result<(), Self::Error>;
}

pub struct OneShotTask;

impl<
  F,
  D,
  KE: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  K: Kernel<Input = F, Output = D, Error = KE>,
  O: Render<D, Error = RE>,
> Task<I, K, O> for OneShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, kernel: K, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始计算...");
    let now = Instant::now();
    let result = kernel.run(&frame)?;
    info!("计算完成，耗时: {:.2?}", now.elapsed());
    output.render(&result)?;
    info!("输出完成，耗时: {:.2?}", now.elapsed());

    Ok(())
  }
}

/// 对同一输入重复执行，统计平均耗时（跳过前两次预热）
#[derive(Debug)]
pub struct RepeatShotTask {
  repeat: usize,
}

impl Default for RepeatShotTask {
  fn default() -> Self {
    Self { repeat: 1000 }
  }
}

impl RepeatShotTask {
  pub fn with_repeat(mut self, repeat: usize) -> Self {
    self.repeat = repeat;
    self
  }
}

/// 跳过前两次预热后的平均耗时
pub fn mean_after_warmup(times: &[Duration]) -> Option<Duration> {
  const WARMUP: usize = 2;
  let measured = times.get(WARMUP..).filter(|t| !t.is_empty())?;
  Some(measured.iter().sum::<Duration>() / measured.len() as u32)
}

impl<
  F,
  D,
  KE: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  K: Kernel<Input = F, Output = D, Error = KE>,
  O: Render<D, Error = RE>,
> Task<I, K, O> for RepeatShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, kernel: K, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始计算...");
    let mut times = Vec::with_capacity(self.repeat);
    let mut last = None;
    for i in 0..self.repeat {
      let now = Instant::now();
      let result = kernel.run(&frame)?;
      let elapsed = now.elapsed();
      info!("({})计算完成，耗时: {:.2?}", i, elapsed);
      times.push(elapsed);
      last = Some(result);
    }

    match mean_after_warmup(&times) {
      Some(mean) => warn!("平均计算时间: {:.2?}", mean),
      None => warn!("重复次数 {} 不足以统计平均时间", self.repeat),
    }

    if let Some(result) = last {
      output.render(&result)?;
      info!("输出完成");
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use super::*;
  use crate::{
    frame::{AsNhwcFrame, NhwcFrame},
    kernels::ResizeBilinear,
  };

  #[derive(Default)]
  struct Collect(RefCell<Vec<NhwcFrame>>);

  impl Render<NhwcFrame> for &Collect {
    type Error = std::convert::Infallible;

    fn render(&self, frame: &NhwcFrame) -> Result<(), Self::Error> {
      self.0.borrow_mut().push(frame.clone());
      Ok(())
    }
  }

  fn kernel() -> ResizeBilinear {
    ResizeBilinear::builder(2, 2).build().unwrap()
  }

  #[test]
  fn one_shot_renders_once() {
    let sink = Collect::default();
    let frame = NhwcFrame::from_raw([1, 1, 1, 1], vec![5.0]).unwrap();
    OneShotTask
      .run_task(std::iter::once(frame), kernel(), &sink)
      .unwrap();

    let frames = sink.0.borrow();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].as_nhwc(), &[5.0; 4]);
  }

  #[test]
  fn repeat_shot_renders_last_result() {
    let sink = Collect::default();
    let frame = NhwcFrame::from_raw([1, 1, 1, 1], vec![1.0]).unwrap();
    RepeatShotTask::default()
      .with_repeat(4)
      .run_task(std::iter::once(frame), kernel(), &sink)
      .unwrap();
    assert_eq!(sink.0.borrow().len(), 1);
  }

  #[test]
  fn empty_input_is_an_error() {
    let sink = Collect::default();
    assert!(
      OneShotTask
        .run_task(std::iter::empty::<NhwcFrame>(), kernel(), &sink)
        .is_err()
    );
  }

  #[test]
  fn mean_skips_warmup() {
    let ms = Duration::from_millis;
    assert_eq!(mean_after_warmup(&[ms(100), ms(100)]), None);
    assert_eq!(
      mean_after_warmup(&[ms(100), ms(50), ms(2), ms(4)]),
      Some(ms(3))
    );
  }
}
