// 该文件是 Shenhe （审核） 项目的一部分。
// src/model/onnx.rs - 基于 ONNX Runtime 的分类模型
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

use std::{path::PathBuf, sync::Mutex};

use ort::{
  session::{Session, builder::GraphOptimizationLevel},
  value::TensorRef,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::NhwcTensor,
  local_path_from_url,
  model::{DEFAULT_INPUT_HW, Predictor, RawOutput, resolve_input_hw},
};

#[derive(Error, Debug)]
pub enum OnnxPredictorError {
  #[error("模型文件不存在: {0}")]
  ModelNotFound(PathBuf),
  #[error("模型无效: {0}")]
  ModelInvalid(String),
  #[error("ONNX Runtime 错误: {0}")]
  OrtError(#[from] ort::Error),
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
  #[error("会话锁错误: {0}")]
  LockError(String),
}

/// 持有一个 ONNX 会话的分类模型
///
/// ONNX Runtime 会话执行推理时需要独占访问，因此同一模型的推理会被串行化。
pub struct OnnxPredictor {
  name: String,
  session: Mutex<Session>,
  input_hw: Option<(usize, usize)>,
}

pub struct OnnxPredictorBuilder {
  name: String,
  model_path: PathBuf,
  intra_threads: Option<usize>,
}

impl FromUrlWithScheme for OnnxPredictorBuilder {
  const SCHEME: &'static str = "onnx";
}

impl FromUrl for OnnxPredictorBuilder {
  type Error = OnnxPredictorError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(OnnxPredictorError::ModelPathError(format!(
        "模型路径必须使用 {} 方案, 实际为 {}",
        Self::SCHEME,
        url.scheme()
      )));
    }

    let model_path = local_path_from_url(url);
    let name = model_path
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_else(|| "model".to_string());

    Ok(OnnxPredictorBuilder {
      name,
      model_path,
      intra_threads: None,
    })
  }
}

impl OnnxPredictorBuilder {
  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  pub fn intra_threads(mut self, threads: Option<usize>) -> Self {
    self.intra_threads = threads;
    self
  }

  pub fn build(self) -> Result<OnnxPredictor, OnnxPredictorError> {
    info!("[{}] 加载模型文件: {:?}", self.name, self.model_path);
    if !self.model_path.is_file() {
      error!("[{}] 模型文件不存在: {:?}", self.name, self.model_path);
      return Err(OnnxPredictorError::ModelNotFound(self.model_path));
    }

    let mut builder = Session::builder()?.with_optimization_level(GraphOptimizationLevel::Level3)?;
    if let Some(threads) = self.intra_threads {
      builder = builder.with_intra_threads(threads)?;
    }
    let session = builder.commit_from_file(&self.model_path)?;

    if session.inputs.len() != 1 {
      return Err(OnnxPredictorError::ModelInvalid(format!(
        "预期模型输入数量为 1, 实际为 {}",
        session.inputs.len()
      )));
    }
    if session.outputs.is_empty() {
      return Err(OnnxPredictorError::ModelInvalid("模型没有输出".to_string()));
    }

    let input = &session.inputs[0];
    let dims: Option<Vec<i64>> = input
      .input_type
      .tensor_shape()
      .map(|shape| shape.iter().copied().collect());
    debug!("[{}] 模型输入 {}: {:?}", self.name, input.name, dims);

    let input_hw = resolve_input_hw(dims.as_deref());
    match input_hw {
      Some((h, w)) => info!("[{}] 模型输入尺寸: {}x{}", self.name, h, w),
      None => warn!(
        "[{}] 无法解析模型输入尺寸 {:?}, 使用默认值 {}x{}",
        self.name, dims, DEFAULT_INPUT_HW.0, DEFAULT_INPUT_HW.1
      ),
    }

    info!("[{}] 模型加载完成", self.name);
    Ok(OnnxPredictor {
      name: self.name,
      session: Mutex::new(session),
      input_hw,
    })
  }
}

impl Predictor for OnnxPredictor {
  type Error = OnnxPredictorError;

  fn input_hw(&self) -> Option<(usize, usize)> {
    self.input_hw
  }

  fn run(&self, input: &NhwcTensor) -> Result<RawOutput, Self::Error> {
    debug!(
      "[{}] 设置模型输入: [{}, {}, {}, {}]",
      self.name,
      input.batch(),
      input.height(),
      input.width(),
      input.channels()
    );
    let value = TensorRef::from_array_view(input.view())?;

    let mut session = self
      .session
      .lock()
      .map_err(|e| OnnxPredictorError::LockError(e.to_string()))?;

    debug!("[{}] 执行模型推理", self.name);
    let outputs = session.run(ort::inputs![value])?;

    let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
    let dims: Vec<i64> = shape.iter().copied().collect();
    debug!("[{}] 模型输出形状: {:?}", self.name, dims);

    Ok(RawOutput::squeeze(&dims, data.to_vec()))
  }
}
