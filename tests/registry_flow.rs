// 该文件是 Resampler （重采样） 项目的一部分。
// tests/registry_flow.rs - 注册表入口与输出集成测试
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

use resampler::{
  FromUrl,
  frame::NhwcFrame,
  kernels::{KernelError, resize_bilinear_by_id, transpose_by_id},
  output::{JsonTensorOutput, OutputWrapper, Render},
  registry::{MemoryRegistry, RegistryError, TensorRegistry},
  tensor::{DType, TensorInfo},
};
use url::Url;

#[test]
fn resize_then_transpose_by_id() {
  let mut registry = MemoryRegistry::new();
  // 1x2x2x2: 两个通道
  let x = registry.register(
    TensorInfo::from_f32(
      &[1, 2, 2, 2],
      vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0],
    )
    .unwrap(),
  );
  let resized = registry.make_output(&[1, 3, 3, 2], DType::Float32);
  resize_bilinear_by_id(&mut registry, x, 1, 2, 2, 2, 3, 3, 1, resized).unwrap();

  let values = registry.resolve(resized).unwrap().as_f32().unwrap().to_vec();
  let first: Vec<f32> = values.iter().step_by(2).copied().collect();
  let second: Vec<f32> = values.iter().skip(1).step_by(2).copied().collect();
  assert_eq!(first, vec![1.0, 1.5, 2.0, 2.0, 2.5, 3.0, 3.0, 3.5, 4.0]);
  assert_eq!(second, vec![10.0, 15.0, 20.0, 20.0, 25.0, 30.0, 30.0, 35.0, 40.0]);

  // NHWC -> NCHW
  let nchw = registry.make_output(&[1, 2, 3, 3], DType::Float32);
  transpose_by_id(&mut registry, resized, &[0, 3, 1, 2], nchw).unwrap();
  let planes = registry.resolve(nchw).unwrap().as_f32().unwrap();
  assert_eq!(&planes[..9], first.as_slice());
  assert_eq!(&planes[9..], second.as_slice());
}

#[test]
fn aliased_ids_are_rejected_before_writing() {
  let mut registry = MemoryRegistry::new();
  let x = registry.register(TensorInfo::from_f32(&[1, 2, 2, 1], vec![1.0; 4]).unwrap());

  assert_eq!(
    resize_bilinear_by_id(&mut registry, x, 1, 2, 2, 1, 2, 2, 0, x),
    Err(KernelError::Registry(RegistryError::Aliased(x)))
  );
  assert_eq!(
    registry.resolve(x).unwrap().as_f32().unwrap(),
    &[1.0; 4]
  );
}

#[test]
fn json_output_writes_shape_and_data() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("nested").join("out.json");
  let url = Url::from_file_path(&path).unwrap();
  let url = Url::parse(&format!("json://{}", url.path())).unwrap();

  let frame = NhwcFrame::from_raw([1, 1, 2, 1], vec![0.5, 1.5]).unwrap();
  JsonTensorOutput::from_url(&url).unwrap().render(&frame).unwrap();
  let text = std::fs::read_to_string(&path).unwrap();
  let value: serde_json::Value = serde_json::from_str(&text).unwrap();
  assert_eq!(value["shape"], serde_json::json!([1, 1, 2, 1]));
  assert_eq!(value["data"], serde_json::json!([0.5, 1.5]));

  assert!(OutputWrapper::from_url(&Url::parse("ftp://host/x").unwrap()).is_err());
}
