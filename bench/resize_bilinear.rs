// 该文件是 Resampler （重采样） 项目的一部分。
// bench/resize_bilinear.rs - 双线性缩放基准
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

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use resampler::kernels::{ResizeBilinear, ResizeParams};

criterion_group! {
  name = resize_benchmarks;
  config = Criterion::default().sample_size(50);
  targets = resize_benchmark,
}
criterion_main!(resize_benchmarks);

struct ResizeCase {
  name: &'static str,
  batch: usize,
  channels: usize,
  in_height: usize,
  in_width: usize,
  out_height: usize,
  out_width: usize,
}

fn resize_benchmark(c: &mut Criterion) {
  let cases = [
    ResizeCase {
      name: "c3_b1_360x540_to_640x640",
      batch: 1,
      channels: 3,
      in_height: 360,
      in_width: 540,
      out_height: 640,
      out_width: 640,
    },
    ResizeCase {
      name: "c3_b1_1080x1920_to_384x384",
      batch: 1,
      channels: 3,
      in_height: 1080,
      in_width: 1920,
      out_height: 384,
      out_width: 384,
    },
    ResizeCase {
      name: "c16_b4_32x32_to_64x64",
      batch: 4,
      channels: 16,
      in_height: 32,
      in_width: 32,
      out_height: 64,
      out_width: 64,
    },
  ];

  let mut group = c.benchmark_group("resize_bilinear");
  for case in cases {
    let input = vec![0.5f32; case.batch * case.in_height * case.in_width * case.channels];
    let throughput = (case.batch * case.out_height * case.out_width * case.channels) as u64;
    group.throughput(Throughput::Elements(throughput));

    for (mode, threshold) in [("sequential", usize::MAX), ("parallel", 0)] {
      let kernel = ResizeBilinear::builder(case.out_height, case.out_width)
        .parallel_threshold(threshold)
        .build()
        .expect("目标尺寸为正数");
      let params: ResizeParams =
        kernel.params_for(case.batch, case.in_height, case.in_width, case.channels);
      let mut output = vec![0.0f32; params.output_len().unwrap()];

      group.bench_function(format!("{}::{}", case.name, mode), |b| {
        b.iter(|| {
          kernel
            .resize_into(black_box(&input), &params, &mut output)
            .expect("形状一致");
          black_box(&output);
        });
      });
    }
  }
  group.finish();
}
