// 该文件是 Shenhe （审核） 项目的一部分。
// src/frame.rs - 图像字节与 NHWC 张量定义
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

use ndarray::{Array4, ArrayView4};

pub const RGB_CHANNELS: usize = 3;

/// 未解码的图像数据，附带来源名称用于日志与输出
#[derive(Debug, Clone)]
pub struct ImageBytes {
  pub source: String,
  pub data: Vec<u8>,
}

impl ImageBytes {
  pub fn new(source: impl Into<String>, data: Vec<u8>) -> Self {
    Self {
      source: source.into(),
      data,
    }
  }
}

/// 预处理后的浮点张量，形状为 `[1, H, W, 3]`，取值范围 [0, 1]
#[derive(Debug, Clone)]
pub struct NhwcTensor {
  data: Array4<f32>,
}

impl NhwcTensor {
  pub fn batch(&self) -> usize {
    self.data.shape()[0]
  }

  pub fn height(&self) -> usize {
    self.data.shape()[1]
  }

  pub fn width(&self) -> usize {
    self.data.shape()[2]
  }

  pub fn channels(&self) -> usize {
    self.data.shape()[3]
  }

  pub fn view(&self) -> ArrayView4<'_, f32> {
    self.data.view()
  }
}

impl From<Array4<f32>> for NhwcTensor {
  fn from(data: Array4<f32>) -> Self {
    Self { data }
  }
}
