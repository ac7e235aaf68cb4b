// 该文件是 Shenhe （审核） 项目的一部分。
// src/decision/interpret.rs - 模型原始输出解释
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

use serde::Serialize;
use tracing::debug;

use crate::model::RawOutput;

/// 排名列表保留的类别数量
pub const TOP_K: usize = 3;

/// 原始输出之和落在该区间内时视为已经是概率分布
pub const DISTRIBUTION_SUM_RANGE: (f32, f32) = (0.98, 1.02);

const SOFTMAX_EPSILON: f64 = 1e-9;

/// 多分类输出的归一化方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ScoreMode {
  /// 根据输出之和自动判断
  #[default]
  Auto,
  /// 输出已经是概率
  Probabilities,
  /// 输出是 logits，总是执行 softmax
  Logits,
  /// 与 `Auto` 相同地判断，但接近归一化的输出按总和缩放为严格的概率分布
  Renormalize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassScore {
  pub label: String,
  pub prob: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterpretedOutput {
  Scalar {
    score: f32,
  },
  Multi {
    /// 按概率降序排列的前 `TOP_K` 项
    topk: Vec<ClassScore>,
    probs: Vec<f32>,
    labels: Option<Vec<String>>,
  },
}

impl InterpretedOutput {
  pub fn scalar_score(&self) -> Option<f32> {
    match self {
      InterpretedOutput::Scalar { score } => Some(*score),
      InterpretedOutput::Multi { .. } => None,
    }
  }

  pub fn top1(&self) -> Option<&ClassScore> {
    match self {
      InterpretedOutput::Scalar { .. } => None,
      InterpretedOutput::Multi { topk, .. } => topk.first(),
    }
  }
}

/// 解释一个模型的原始输出
///
/// 单个元素按标量分数处理，不做 softmax；多个元素按多分类处理。
pub fn interpret(raw: &RawOutput, labels: Option<&[String]>, mode: ScoreMode) -> InterpretedOutput {
  let values = raw.flatten();

  if values.len() == 1 {
    return InterpretedOutput::Scalar { score: values[0] };
  }

  let probs = normalize(values, mode);

  let mut order: Vec<usize> = (0..probs.len()).collect();
  order.sort_by(|&a, &b| probs[b].total_cmp(&probs[a]));

  let topk: Vec<ClassScore> = order
    .iter()
    .take(TOP_K)
    .map(|&i| ClassScore {
      label: label_of(labels, i),
      prob: probs[i],
    })
    .collect();

  debug!("多分类输出: probs={:?}, topk={:?}", probs, topk);

  InterpretedOutput::Multi {
    topk,
    probs,
    labels: labels.map(|l| l.to_vec()),
  }
}

fn label_of(labels: Option<&[String]>, index: usize) -> String {
  match labels.and_then(|l| l.get(index)) {
    Some(label) => label.clone(),
    None => format!("class{}", index),
  }
}

fn normalize(values: &[f32], mode: ScoreMode) -> Vec<f32> {
  match mode {
    ScoreMode::Auto if looks_like_distribution(values) => values.to_vec(),
    ScoreMode::Auto | ScoreMode::Logits => softmax(values),
    ScoreMode::Probabilities => values.to_vec(),
    ScoreMode::Renormalize if looks_like_distribution(values) => {
      rescale(values).unwrap_or_else(|| softmax(values))
    }
    ScoreMode::Renormalize => softmax(values),
  }
}

fn looks_like_distribution(values: &[f32]) -> bool {
  let sum: f32 = values.iter().sum();
  (DISTRIBUTION_SUM_RANGE.0..=DISTRIBUTION_SUM_RANGE.1).contains(&sum)
}

/// 按总和缩放，使已经接近归一化的分布严格求和为 1
fn rescale(values: &[f32]) -> Option<Vec<f32>> {
  if values.iter().any(|&v| v < 0.0 || !v.is_finite()) {
    return None;
  }
  let sum: f64 = values.iter().map(|&v| v as f64).sum();
  if sum <= 0.0 {
    return None;
  }
  Some(values.iter().map(|&v| (v as f64 / sum) as f32).collect())
}

/// 数值稳定的 softmax：先减去最大值，分母加上 epsilon
pub fn softmax(values: &[f32]) -> Vec<f32> {
  if values.is_empty() {
    return Vec::new();
  }

  let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;
  let exps: Vec<f64> = values.iter().map(|&v| (v as f64 - max).exp()).collect();
  let denom: f64 = exps.iter().sum::<f64>() + SOFTMAX_EPSILON;
  exps.into_iter().map(|e| (e / denom) as f32).collect()
}
