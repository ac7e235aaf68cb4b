// 该文件是 Shenhe （审核） 项目的一部分。
// src/input/directory.rs - 目录批量输入
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

use std::{collections::VecDeque, path::PathBuf};

use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::ImageBytes, local_path_from_url};

#[derive(Error, Debug)]
pub enum DirectoryInputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 按文件名顺序逐个读取目录下的普通文件
pub struct DirectoryInput {
  pending: VecDeque<PathBuf>,
}

impl FromUrlWithScheme for DirectoryInput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryInput {
  type Error = DirectoryInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(DirectoryInputError::SchemeMismatch);
    }

    let directory = local_path_from_url(url);
    let mut entries: Vec<PathBuf> = std::fs::read_dir(&directory)?
      .filter_map(|e| e.ok())
      .map(|e| e.path())
      .filter(|p| p.is_file())
      .collect();
    entries.sort();

    info!("目录 {:?} 中共有 {} 个文件", directory, entries.len());

    Ok(DirectoryInput {
      pending: entries.into(),
    })
  }
}

impl Iterator for DirectoryInput {
  type Item = ImageBytes;

  fn next(&mut self) -> Option<Self::Item> {
    while let Some(path) = self.pending.pop_front() {
      match std::fs::read(&path) {
        Ok(data) => return Some(ImageBytes::new(path.display().to_string(), data)),
        Err(e) => warn!("读取文件 {:?} 失败，已跳过: {}", path, e),
      }
    }
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn files_are_listed_in_name_order() {
    let dir = std::env::temp_dir().join(format!("shenhe-dir-input-{}", std::process::id()));
    std::fs::create_dir_all(dir.join("nested")).unwrap();
    std::fs::write(dir.join("b.png"), b"b").unwrap();
    std::fs::write(dir.join("a.png"), b"a").unwrap();

    let url = Url::parse(&format!("folder://{}", dir.display())).unwrap();
    let items: Vec<_> = DirectoryInput::from_url(&url).unwrap().collect();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].data, b"a");
    assert_eq!(items[1].data, b"b");

    std::fs::remove_dir_all(dir).unwrap();
  }
}
