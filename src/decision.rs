// 该文件是 Shenhe （审核） 项目的一部分。
// src/decision.rs - 判定结果
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
use tracing::warn;

use crate::config::PipelineConfig;

mod fusion;
mod interpret;
mod sensitive;

pub use self::fusion::fuse;
pub use self::interpret::{
  ClassScore, DISTRIBUTION_SUM_RANGE, InterpretedOutput, ScoreMode, TOP_K, interpret, softmax,
};
pub use self::sensitive::extract_sensitive_probability;

/// 单张图像的最终判定记录，所有字段在序列化时都会出现
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
  pub gore_score: Option<f32>,
  pub nsfw_top_label: Option<String>,
  pub nsfw_top_prob: Option<f32>,
  pub nsfw_sensitive_class: String,
  pub nsfw_sensitive_prob: f32,
  pub threshold: f32,
  pub is_sensitive: bool,
}

impl Decision {
  /// 由两个模型的解释结果组装判定
  ///
  /// 血腥模型只有标量输出参与融合；非标量输出被排除并记录警告。
  pub fn from_outputs(
    gore: &InterpretedOutput,
    nsfw: &InterpretedOutput,
    config: &PipelineConfig,
  ) -> Self {
    let gore_score = gore.scalar_score();
    if gore_score.is_none() && config.use_gore_in_final {
      warn!("血腥模型输出不是标量, 不参与最终判定");
    }

    let nsfw_sensitive_prob = extract_sensitive_probability(nsfw, &config.sensitive_class);
    let is_sensitive = fuse(
      nsfw_sensitive_prob,
      gore_score,
      config.threshold,
      config.use_gore_in_final,
    );

    let top = nsfw.top1();

    Decision {
      gore_score,
      nsfw_top_label: top.map(|c| c.label.clone()),
      nsfw_top_prob: top.map(|c| c.prob),
      nsfw_sensitive_class: config.sensitive_class.clone(),
      nsfw_sensitive_prob,
      threshold: config.threshold,
      is_sensitive,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::RawOutput;

  fn nsfw(raw: Vec<f32>, config: &PipelineConfig) -> InterpretedOutput {
    interpret(&RawOutput::vector(raw), Some(&config.nsfw_labels), ScoreMode::Auto)
  }

  #[test]
  fn record_serializes_all_keys() {
    let config = PipelineConfig::default();
    let decision = Decision::from_outputs(
      &InterpretedOutput::Multi {
        topk: vec![],
        probs: vec![],
        labels: None,
      },
      &nsfw(vec![], &config),
      &config,
    );

    let value = serde_json::to_value(&decision).unwrap();
    let object = value.as_object().unwrap();
    for key in [
      "gore_score",
      "nsfw_top_label",
      "nsfw_top_prob",
      "nsfw_sensitive_class",
      "nsfw_sensitive_prob",
      "threshold",
      "is_sensitive",
    ] {
      assert!(object.contains_key(key), "缺少字段 {}", key);
    }
    assert!(object["gore_score"].is_null());
    assert!(object["nsfw_top_label"].is_null());
    assert_eq!(object["nsfw_sensitive_prob"], 0.0);
    assert_eq!(object["is_sensitive"], false);
  }

  #[test]
  fn gore_scalar_triggers_verdict() {
    let config = PipelineConfig::default();
    let decision = Decision::from_outputs(
      &InterpretedOutput::Scalar { score: 0.9 },
      &nsfw(vec![0.8, 0.15, 0.05], &config),
      &config,
    );
    assert_eq!(decision.gore_score, Some(0.9));
    assert_eq!(decision.nsfw_top_label.as_deref(), Some("drawings"));
    assert_eq!(decision.nsfw_sensitive_class, "porn");
    assert!((decision.nsfw_sensitive_prob - 0.05).abs() < 1e-6);
    assert!(decision.is_sensitive);
  }

  #[test]
  fn non_scalar_gore_is_excluded() {
    let config = PipelineConfig::default();
    let decision = Decision::from_outputs(
      &interpret(&RawOutput::vector(vec![0.01, 0.99]), None, ScoreMode::Auto),
      &nsfw(vec![0.8, 0.15, 0.05], &config),
      &config,
    );
    assert_eq!(decision.gore_score, None);
    assert!(!decision.is_sensitive);
  }

  #[test]
  fn disabled_gore_still_reports_score() {
    let config = PipelineConfig {
      use_gore_in_final: false,
      ..PipelineConfig::default()
    };
    let decision = Decision::from_outputs(
      &InterpretedOutput::Scalar { score: 0.95 },
      &nsfw(vec![0.8, 0.15, 0.05], &config),
      &config,
    );
    assert_eq!(decision.gore_score, Some(0.95));
    assert!(!decision.is_sensitive);
  }

  #[test]
  fn near_one_sum_below_threshold_stays_benign() {
    let config = PipelineConfig::default();
    let decision = Decision::from_outputs(
      &InterpretedOutput::Scalar { score: 0.0 },
      &nsfw(vec![0.0, 0.49, 0.495], &config),
      &config,
    );
    assert_eq!(decision.nsfw_sensitive_prob, 0.495);
    assert_eq!(decision.nsfw_top_label.as_deref(), Some("porn"));
    assert!(!decision.is_sensitive);
  }
}
