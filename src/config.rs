// 该文件是 Shenhe （审核） 项目的一部分。
// src/config.rs - 推理流水线配置
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

use thiserror::Error;
use tracing::warn;

use crate::{decision::ScoreMode, model::OnnxPredictorError};

/// NSFW 模型训练时的类别顺序
pub const DEFAULT_NSFW_LABELS: [&str; 3] = ["drawings", "hentai", "porn"];
pub const DEFAULT_SENSITIVE_CLASS: &str = "porn";
pub const DEFAULT_THRESHOLD: f32 = 0.5;

#[derive(Error, Debug)]
pub enum ConfigurationError {
  #[error("模型 {model} 加载失败: {source}")]
  ModelLoadError {
    model: String,
    #[source]
    source: OnnxPredictorError,
  },
  #[error("阈值无效: {0}, 必须位于 [0, 1]")]
  InvalidThreshold(f32),
  #[error("敏感类别名称不能为空")]
  EmptySensitiveClass,
}

/// 启动时确定、运行期间不变的判定参数
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
  pub nsfw_labels: Vec<String>,
  pub sensitive_class: String,
  pub threshold: f32,
  pub use_gore_in_final: bool,
  pub gore_score_mode: ScoreMode,
  pub nsfw_score_mode: ScoreMode,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      nsfw_labels: DEFAULT_NSFW_LABELS.iter().map(|s| s.to_string()).collect(),
      sensitive_class: DEFAULT_SENSITIVE_CLASS.to_string(),
      threshold: DEFAULT_THRESHOLD,
      use_gore_in_final: true,
      gore_score_mode: ScoreMode::Auto,
      nsfw_score_mode: ScoreMode::Auto,
    }
  }
}

impl PipelineConfig {
  pub fn validate(&self) -> Result<(), ConfigurationError> {
    if !(0.0..=1.0).contains(&self.threshold) {
      return Err(ConfigurationError::InvalidThreshold(self.threshold));
    }
    if self.sensitive_class.is_empty() {
      return Err(ConfigurationError::EmptySensitiveClass);
    }
    if !self.nsfw_labels.contains(&self.sensitive_class) {
      warn!(
        "敏感类别 {} 不在标签列表 {:?} 中, 将使用 top-1 概率",
        self.sensitive_class, self.nsfw_labels
      );
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_valid() {
    let config = PipelineConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.nsfw_labels, ["drawings", "hentai", "porn"]);
    assert_eq!(config.sensitive_class, "porn");
    assert_eq!(config.threshold, 0.5);
    assert!(config.use_gore_in_final);
  }

  #[test]
  fn threshold_must_be_a_probability() {
    for threshold in [-0.1, 1.5, f32::NAN] {
      let config = PipelineConfig {
        threshold,
        ..PipelineConfig::default()
      };
      assert!(matches!(
        config.validate(),
        Err(ConfigurationError::InvalidThreshold(_))
      ));
    }
  }

  #[test]
  fn sensitive_class_outside_labels_is_allowed() {
    let config = PipelineConfig {
      sensitive_class: "sexy".to_string(),
      ..PipelineConfig::default()
    };
    assert!(config.validate().is_ok());

    let config = PipelineConfig {
      sensitive_class: String::new(),
      ..PipelineConfig::default()
    };
    assert!(matches!(
      config.validate(),
      Err(ConfigurationError::EmptySensitiveClass)
    ));
  }
}
