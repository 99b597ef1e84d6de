// 该文件是 Resampler （重采样） 项目的一部分。
// src/bin/simple_oneshot.rs - 单次缩放
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use resampler::{
  FromUrl,
  input::InputWrapper,
  kernels::{DEFAULT_PARALLEL_THRESHOLD, ResizeBilinear},
  output::OutputWrapper,
  task::{OneShotTask, Task},
};
use tracing::info;

/// Resampler 单次缩放参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源，例如 image:///path/to/input.png
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径，例如 image:///path/to/output.png 或 json:///path/to/output.json
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
  /// 目标高度
  #[arg(long, value_name = "PIXELS")]
  pub height: usize,
  /// 目标宽度
  #[arg(long, value_name = "PIXELS")]
  pub width: usize,
  /// 对齐首尾像素
  #[arg(long, default_value_t = false)]
  pub align_corners: bool,
  /// 输出元素数超过该值时并行计算
  #[arg(long, default_value_t = DEFAULT_PARALLEL_THRESHOLD, value_name = "ELEMENTS")]
  pub parallel_threshold: usize,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);
  info!("目标尺寸: {}x{}", args.width, args.height);

  let input = InputWrapper::from_url(&args.input)?;
  let kernel = ResizeBilinear::builder(args.height, args.width)
    .align_corners(args.align_corners)
    .parallel_threshold(args.parallel_threshold)
    .build()?;
  let output = OutputWrapper::from_url(&args.output)?;

  OneShotTask.run_task(input, kernel, output)?;

  Ok(())
}
