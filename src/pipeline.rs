// 该文件是 Shenhe （审核） 项目的一部分。
// src/pipeline.rs - 双模型推理流水线
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
use tracing::{debug, error, info};

use crate::{
  config::{ConfigurationError, PipelineConfig},
  decision::{Decision, interpret},
  input::{PreprocessError, preprocess},
  model::{Predictor, RawOutput},
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 对图像字节给出判定
pub trait Classifier {
  type Error;
  fn classify(&self, image: &[u8]) -> Result<Decision, Self::Error>;
}

#[derive(Error, Debug)]
pub enum PipelineError {
  #[error("图像解码错误: {0}")]
  ImageDecodeError(#[source] PreprocessError),
  #[error("预处理错误: {0}")]
  PreprocessError(#[source] PreprocessError),
  #[error("模型 {model} 推理错误: {source}")]
  ModelInferenceError {
    model: &'static str,
    #[source]
    source: BoxError,
  },
}

impl From<PreprocessError> for PipelineError {
  fn from(e: PreprocessError) -> Self {
    match e {
      PreprocessError::ImageDecodeError(_) => PipelineError::ImageDecodeError(e),
      _ => PipelineError::PreprocessError(e),
    }
  }
}

/// 启动时构建一次、在所有请求间共享的只读推理上下文
pub struct Pipeline<G, N> {
  gore: G,
  nsfw: N,
  gore_hw: (usize, usize),
  nsfw_hw: (usize, usize),
  config: PipelineConfig,
}

impl<G: Predictor, N: Predictor> Pipeline<G, N> {
  pub fn new(gore: G, nsfw: N, config: PipelineConfig) -> Result<Self, ConfigurationError> {
    config.validate()?;

    let gore_hw = gore.input_size();
    let nsfw_hw = nsfw.input_size();
    info!("血腥模型输入尺寸: {}x{}", gore_hw.0, gore_hw.1);
    info!("NSFW 模型输入尺寸: {}x{}", nsfw_hw.0, nsfw_hw.1);
    info!(
      "敏感类别: {}, 阈值: {}, 血腥信号参与判定: {}",
      config.sensitive_class, config.threshold, config.use_gore_in_final
    );

    Ok(Self {
      gore,
      nsfw,
      gore_hw,
      nsfw_hw,
      config,
    })
  }

  pub fn gore_input_size(&self) -> (usize, usize) {
    self.gore_hw
  }

  pub fn nsfw_input_size(&self) -> (usize, usize) {
    self.nsfw_hw
  }
}

impl<G, N> Pipeline<G, N>
where
  G: Predictor,
  N: Predictor,
  G::Error: std::error::Error + Send + Sync + 'static,
  N::Error: std::error::Error + Send + Sync + 'static,
{
  /// 解码图像、分别按两个模型的输入尺寸预处理、推理并融合结果
  pub fn predict_image_bytes(&self, image: &[u8]) -> Result<Decision, PipelineError> {
    let now = std::time::Instant::now();

    // 两个模型的输入分辨率可能不同，各自独立预处理
    let gore_raw = run_model("gore", &self.gore, self.gore_hw, image)?;
    let nsfw_raw = run_model("nsfw", &self.nsfw, self.nsfw_hw, image)?;

    let gore_out = interpret(&gore_raw, None, self.config.gore_score_mode);
    let nsfw_out = interpret(
      &nsfw_raw,
      Some(&self.config.nsfw_labels),
      self.config.nsfw_score_mode,
    );

    let decision = Decision::from_outputs(&gore_out, &nsfw_out, &self.config);
    info!(
      "判定完成, 耗时: {:.2?}, 敏感: {}, NSFW: {:.3}, 血腥: {:?}",
      now.elapsed(),
      decision.is_sensitive,
      decision.nsfw_sensitive_prob,
      decision.gore_score
    );

    Ok(decision)
  }
}

fn run_model<P>(
  model: &'static str,
  predictor: &P,
  (height, width): (usize, usize),
  image: &[u8],
) -> Result<RawOutput, PipelineError>
where
  P: Predictor,
  P::Error: std::error::Error + Send + Sync + 'static,
{
  let input = preprocess(image, height, width)?;
  let raw = predictor.run(&input).map_err(|e| {
    error!("模型 {} 推理失败: {}", model, e);
    PipelineError::ModelInferenceError {
      model,
      source: Box::new(e),
    }
  })?;
  debug!("模型 {} 原始输出: shape={:?}", model, raw.shape());
  Ok(raw)
}

impl<G, N> Classifier for Pipeline<G, N>
where
  G: Predictor,
  N: Predictor,
  G::Error: std::error::Error + Send + Sync + 'static,
  N::Error: std::error::Error + Send + Sync + 'static,
{
  type Error = PipelineError;

  fn classify(&self, image: &[u8]) -> Result<Decision, Self::Error> {
    self.predict_image_bytes(image)
  }
}

impl<C: Classifier> Classifier for &C {
  type Error = C::Error;

  fn classify(&self, image: &[u8]) -> Result<Decision, Self::Error> {
    (**self).classify(image)
  }
}
