// 该文件是 Shenhe （审核） 项目的一部分。
// src/args.rs - 命令行参数配置
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

use clap::Args;
use tracing::info;
use url::Url;

use crate::{
  FromUrl,
  config::{ConfigurationError, PipelineConfig},
  decision::ScoreMode,
  model::{OnnxPredictor, OnnxPredictorBuilder},
  pipeline::Pipeline,
};

/// 模型文件参数
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
  /// 血腥检测模型，如 onnx:///opt/models/gore.onnx 或 onnx://models/gore.onnx
  #[arg(
    long,
    value_name = "MODEL",
    default_value = "onnx://models/efficientnet_b3_final.onnx"
  )]
  pub gore_model: Url,

  /// NSFW 三分类模型
  #[arg(
    long,
    value_name = "MODEL",
    default_value = "onnx://models/nsfw_mobilenetv2_3class.onnx"
  )]
  pub nsfw_model: Url,

  /// 每个 ONNX 会话的线程数，缺省由 ONNX Runtime 决定
  #[arg(long, value_name = "COUNT")]
  pub intra_threads: Option<usize>,
}

impl ModelArgs {
  /// 加载两个模型并构建推理流水线，仅在启动时调用一次
  pub fn load_pipeline(
    &self,
    config: PipelineConfig,
  ) -> Result<Pipeline<OnnxPredictor, OnnxPredictor>, ConfigurationError> {
    info!("正在加载模型...");
    let gore = self.load_model("gore", &self.gore_model)?;
    let nsfw = self.load_model("nsfw", &self.nsfw_model)?;
    info!("模型加载完成");
    Pipeline::new(gore, nsfw, config)
  }

  fn load_model(&self, name: &str, url: &Url) -> Result<OnnxPredictor, ConfigurationError> {
    OnnxPredictorBuilder::from_url(url)
      .and_then(|builder| {
        builder
          .name(name)
          .intra_threads(self.intra_threads)
          .build()
      })
      .map_err(|source| ConfigurationError::ModelLoadError {
        model: name.to_string(),
        source,
      })
  }
}

/// 判定参数
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
  /// NSFW 模型的类别标签，顺序必须与训练时一致
  #[arg(
    long,
    value_name = "LABELS",
    value_delimiter = ',',
    default_value = "drawings,hentai,porn"
  )]
  pub nsfw_labels: Vec<String>,

  /// 视为敏感的 NSFW 类别
  #[arg(long, value_name = "CLASS", default_value = "porn")]
  pub sensitive_class: String,

  /// 判定阈值 (0.0 - 1.0)，分数大于等于阈值即为敏感
  #[arg(long, value_name = "THRESHOLD", default_value = "0.5")]
  pub threshold: f32,

  /// 血腥模型分数不参与最终判定
  #[arg(long)]
  pub no_gore_in_final: bool,

  /// NSFW 模型输出的归一化方式
  #[arg(long, value_enum, default_value_t = ScoreMode::Auto)]
  pub nsfw_score_mode: ScoreMode,

  /// 血腥模型输出的归一化方式
  #[arg(long, value_enum, default_value_t = ScoreMode::Auto)]
  pub gore_score_mode: ScoreMode,
}

impl From<PipelineArgs> for PipelineConfig {
  fn from(args: PipelineArgs) -> Self {
    PipelineConfig {
      nsfw_labels: args.nsfw_labels,
      sensitive_class: args.sensitive_class,
      threshold: args.threshold,
      use_gore_in_final: !args.no_gore_in_final,
      gore_score_mode: args.gore_score_mode,
      nsfw_score_mode: args.nsfw_score_mode,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::Parser;

  #[derive(Parser, Debug)]
  struct TestArgs {
    #[command(flatten)]
    models: ModelArgs,
    #[command(flatten)]
    pipeline: PipelineArgs,
  }

  #[test]
  fn defaults_match_pipeline_defaults() {
    let args = TestArgs::parse_from(["test"]);
    let config = PipelineConfig::from(args.pipeline);
    assert_eq!(config, PipelineConfig::default());
    assert_eq!(args.models.gore_model.scheme(), "onnx");
  }

  #[test]
  fn flags_override_defaults() {
    let args = TestArgs::parse_from([
      "test",
      "--nsfw-labels",
      "drawings,hentai,neutral,porn,sexy",
      "--sensitive-class",
      "sexy",
      "--threshold",
      "0.3",
      "--no-gore-in-final",
      "--nsfw-score-mode",
      "logits",
    ]);
    let config = PipelineConfig::from(args.pipeline);
    assert_eq!(config.nsfw_labels.len(), 5);
    assert_eq!(config.sensitive_class, "sexy");
    assert_eq!(config.threshold, 0.3);
    assert!(!config.use_gore_in_final);
    assert_eq!(config.nsfw_score_mode, ScoreMode::Logits);
  }
}
