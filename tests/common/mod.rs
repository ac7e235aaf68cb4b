// 该文件是 Shenhe （审核） 项目的一部分。
// tests/common/mod.rs - 集成测试共用的假模型
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

#![allow(dead_code)]

use std::{
  io::Cursor,
  sync::{Arc, Mutex},
};

use image::{ImageFormat, Rgb, RgbImage};
use shenhe::{
  config::PipelineConfig,
  frame::NhwcTensor,
  model::{Predictor, RawOutput},
  pipeline::Pipeline,
};

#[derive(Debug, thiserror::Error)]
#[error("模拟推理失败")]
pub struct Broken;

/// 返回固定输出并记录每次收到的输入尺寸
pub struct FakePredictor {
  hw: Option<(usize, usize)>,
  output: Option<RawOutput>,
  seen: Seen,
}

/// 每次推理收到的 (batch, height, width, channels)
pub type Seen = Arc<Mutex<Vec<(usize, usize, usize, usize)>>>;

impl FakePredictor {
  pub fn new(hw: Option<(usize, usize)>, output: RawOutput) -> Self {
    Self {
      hw,
      output: Some(output),
      seen: Seen::default(),
    }
  }

  pub fn broken(hw: Option<(usize, usize)>) -> Self {
    Self {
      hw,
      output: None,
      seen: Seen::default(),
    }
  }

  pub fn seen(&self) -> Seen {
    self.seen.clone()
  }
}

impl Predictor for FakePredictor {
  type Error = Broken;

  fn input_hw(&self) -> Option<(usize, usize)> {
    self.hw
  }

  fn run(&self, input: &NhwcTensor) -> Result<RawOutput, Self::Error> {
    self.seen.lock().unwrap().push((
      input.batch(),
      input.height(),
      input.width(),
      input.channels(),
    ));
    self.output.clone().ok_or(Broken)
  }
}

pub fn pipeline(
  gore: FakePredictor,
  nsfw: FakePredictor,
) -> Pipeline<FakePredictor, FakePredictor> {
  Pipeline::new(gore, nsfw, PipelineConfig::default()).unwrap()
}

/// 编码一张纯色 PNG
pub fn png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
  let img = RgbImage::from_pixel(width, height, Rgb(color));
  let mut buf = Vec::new();
  img
    .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
    .unwrap();
  buf
}
