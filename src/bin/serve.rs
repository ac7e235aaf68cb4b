// 该文件是 Shenhe （审核） 项目的一部分。
// src/bin/serve.rs - HTTP 审核服务
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

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use shenhe::{
  args::{ModelArgs, PipelineArgs},
  server::{self, DEFAULT_MAX_UPLOAD_BYTES},
};

/// Shenhe 图像审核服务
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  #[command(flatten)]
  pub models: ModelArgs,
  #[command(flatten)]
  pub pipeline: PipelineArgs,
  /// 监听地址
  #[arg(long, value_name = "ADDR", default_value = "0.0.0.0:8001")]
  pub listen: String,
  /// 上传文件大小上限（字节）
  #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
  pub max_upload_bytes: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("血腥模型: {}", args.models.gore_model);
  info!("NSFW 模型: {}", args.models.nsfw_model);
  info!("监听地址: {}", args.listen);

  let pipeline = Arc::new(args.models.load_pipeline(args.pipeline.into())?);
  let app = server::router(pipeline, args.max_upload_bytes);

  let listener = TcpListener::bind(&args.listen)
    .await
    .with_context(|| format!("无法绑定地址: {}", args.listen))?;
  server::serve(listener, app).await?;

  info!("服务已退出");
  Ok(())
}
