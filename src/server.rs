// 该文件是 Shenhe （审核） 项目的一部分。
// src/server.rs - HTTP 服务
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

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::{
  decision::Decision,
  pipeline::{Classifier, PipelineError},
};

/// 上传文件的默认大小上限
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// 表单中图像文件的字段名
pub const UPLOAD_FIELD: &str = "file";

#[derive(Error, Debug)]
pub enum ServerError {
  #[error("缺少上传文件字段 file")]
  MissingFile,
  #[error("表单解析错误: {0}")]
  MultipartError(#[from] MultipartError),
  #[error("{0}")]
  PipelineError(#[from] PipelineError),
  #[error("推理任务异常终止: {0}")]
  JoinError(#[from] tokio::task::JoinError),
}

impl ServerError {
  fn status(&self) -> StatusCode {
    match self {
      ServerError::MissingFile => StatusCode::BAD_REQUEST,
      ServerError::MultipartError(e) => e.status(),
      ServerError::PipelineError(PipelineError::ImageDecodeError(_)) => StatusCode::BAD_REQUEST,
      ServerError::PipelineError(
        PipelineError::PreprocessError(_) | PipelineError::ModelInferenceError { .. },
      ) => StatusCode::INTERNAL_SERVER_ERROR,
      ServerError::JoinError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ServerError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!("请求处理失败: {}", self);
    } else {
      warn!("请求被拒绝: {}", self);
    }
    let body = json!({ "success": false, "error": self.to_string() });
    (status, Json(body)).into_response()
  }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
  pub success: bool,
  pub result: Decision,
}

/// 构建路由：`GET /health` 与 `POST /predict`
pub fn router<C>(classifier: Arc<C>, max_upload_bytes: usize) -> Router
where
  C: Classifier<Error = PipelineError> + Send + Sync + 'static,
{
  Router::new()
    .route("/health", get(health))
    .route("/predict", post(predict::<C>))
    .layer(DefaultBodyLimit::max(max_upload_bytes))
    .layer(CorsLayer::very_permissive())
    .layer(TraceLayer::new_for_http())
    .with_state(classifier)
}

/// 运行服务直到收到 Ctrl-C
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
  if let Ok(addr) = listener.local_addr() {
    info!("服务监听于 http://{}", addr);
  }
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    error!("无法监听中断信号: {}", e);
    std::future::pending::<()>().await;
  }
  info!("收到中断信号，准备退出...");
}

async fn health() -> Json<serde_json::Value> {
  Json(json!({ "ok": true }))
}

async fn predict<C>(
  State(classifier): State<Arc<C>>,
  mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ServerError>
where
  C: Classifier<Error = PipelineError> + Send + Sync + 'static,
{
  let mut upload = None;
  while let Some(field) = multipart.next_field().await? {
    if field.name() == Some(UPLOAD_FIELD) {
      let file_name = field.file_name().unwrap_or("upload").to_string();
      let bytes = field.bytes().await?;
      upload = Some((file_name, bytes));
      break;
    }
  }

  let (file_name, bytes) = upload.ok_or(ServerError::MissingFile)?;
  info!("收到图像 {}: {} 字节", file_name, bytes.len());

  // 推理是同步且耗时的，放到阻塞线程池执行
  let result = tokio::task::spawn_blocking(move || classifier.classify(&bytes)).await??;

  Ok(Json(PredictResponse {
    success: true,
    result,
  }))
}
