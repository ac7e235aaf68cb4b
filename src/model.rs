// 该文件是 Shenhe （审核） 项目的一部分。
// src/model.rs - 分类模型适配器
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

use crate::frame::NhwcTensor;

/// 无法从模型声明中得到输入尺寸时使用的 (高, 宽)
pub const DEFAULT_INPUT_HW: (usize, usize) = (224, 224);

/// 已加载的分类模型
pub trait Predictor {
  type Error;

  /// 模型声明的输入 (高, 宽)，无法确定时返回 `None`
  fn input_hw(&self) -> Option<(usize, usize)>;

  fn input_size(&self) -> (usize, usize) {
    self.input_hw().unwrap_or(DEFAULT_INPUT_HW)
  }

  /// 对单个批次执行推理，返回去掉单例维度的原始输出
  fn run(&self, input: &NhwcTensor) -> Result<RawOutput, Self::Error>;
}

/// 根据模型声明的输入形状解析 (高, 宽)
///
/// 4 维形状按 `[N, H, W, C]`，3 维形状按 `[H, W, C]` 解析；
/// 其他维数或动态维度（小于等于 0）均视为未知。
pub fn resolve_input_hw(dims: Option<&[i64]>) -> Option<(usize, usize)> {
  let (h, w) = match dims? {
    [_, h, w, _] => (*h, *w),
    [h, w, _] => (*h, *w),
    _ => return None,
  };

  if h <= 0 || w <= 0 {
    return None;
  }

  Some((h as usize, w as usize))
}

/// 模型对一张图像的原始输出
#[derive(Debug, Clone, PartialEq)]
pub struct RawOutput {
  shape: Box<[usize]>,
  data: Box<[f32]>,
}

impl RawOutput {
  /// 去掉所有大小为 1 的维度
  pub fn squeeze(shape: &[i64], data: Vec<f32>) -> Self {
    let shape: Vec<usize> = shape
      .iter()
      .filter(|&&d| d != 1)
      .map(|&d| d.max(0) as usize)
      .collect();
    Self {
      shape: shape.into_boxed_slice(),
      data: data.into_boxed_slice(),
    }
  }

  pub fn scalar(value: f32) -> Self {
    Self {
      shape: Box::new([]),
      data: Box::new([value]),
    }
  }

  pub fn vector(values: Vec<f32>) -> Self {
    Self {
      shape: Box::new([values.len()]),
      data: values.into_boxed_slice(),
    }
  }

  pub fn shape(&self) -> &[usize] {
    &self.shape
  }

  /// 按行主序展平后的数据
  pub fn flatten(&self) -> &[f32] {
    &self.data
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }
}

mod onnx;
pub use self::onnx::{OnnxPredictor, OnnxPredictorBuilder, OnnxPredictorError};
