// 该文件是 Shenhe （审核） 项目的一部分。
// src/output/save_json_lines.rs - 追加写入 JSON Lines 文件
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

use std::{
  fs::{File, OpenOptions},
  io::Write,
  sync::Mutex,
};

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  decision::Decision,
  frame::ImageBytes,
  local_path_from_url,
  output::{Record, Render},
};

#[derive(Error, Debug)]
pub enum SaveJsonLinesError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("文件锁错误")]
  LockError,
}

/// 每张图像的判定追加为文件中的一行
pub struct SaveJsonLinesOutput {
  file: Mutex<File>,
}

impl FromUrlWithScheme for SaveJsonLinesOutput {
  const SCHEME: &'static str = "jsonl";
}

impl FromUrl for SaveJsonLinesOutput {
  type Error = SaveJsonLinesError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(SaveJsonLinesError::SchemeMismatch);
    }

    let path = local_path_from_url(url);
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    info!("判定结果写入文件: {:?}", path);

    Ok(SaveJsonLinesOutput {
      file: Mutex::new(file),
    })
  }
}

impl Render<ImageBytes, Decision> for SaveJsonLinesOutput {
  type Error = SaveJsonLinesError;

  fn render_result(&self, frame: &ImageBytes, result: &Decision) -> Result<(), Self::Error> {
    let line = serde_json::to_string(&Record::new(frame, result))?;
    let mut file = self.file.lock().map_err(|_| SaveJsonLinesError::LockError)?;
    writeln!(file, "{}", line)?;
    file.flush()?;
    Ok(())
  }
}
