// 该文件是 Shenhe （审核） 项目的一部分。
// src/output.rs - 判定结果输出
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
use thiserror::Error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, decision::Decision, frame::ImageBytes};

pub trait Render<Frame, Output>: Sized {
  type Error;
  fn render_result(&self, frame: &Frame, result: &Output) -> Result<(), Self::Error>;
}

mod print_json;
mod save_json_lines;

pub use self::print_json::{PrintJsonError, PrintJsonOutput};
pub use self::save_json_lines::{SaveJsonLinesError, SaveJsonLinesOutput};

/// 一条输出记录：图像来源与判定结果
#[derive(Debug, Serialize)]
pub struct Record<'a> {
  pub source: &'a str,
  pub result: &'a Decision,
}

impl<'a> Record<'a> {
  pub fn new(frame: &'a ImageBytes, result: &'a Decision) -> Self {
    Self {
      source: &frame.source,
      result,
    }
  }
}

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("标准输出错误: {0}")]
  PrintJsonError(#[from] PrintJsonError),
  #[error("JSON Lines 文件输出错误: {0}")]
  SaveJsonLinesError(#[from] SaveJsonLinesError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

pub enum OutputWrapper {
  PrintJson(PrintJsonOutput),
  SaveJsonLines(SaveJsonLinesOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      PrintJsonOutput::SCHEME => Ok(OutputWrapper::PrintJson(PrintJsonOutput::from_url(url)?)),
      SaveJsonLinesOutput::SCHEME => Ok(OutputWrapper::SaveJsonLines(
        SaveJsonLinesOutput::from_url(url)?,
      )),
      other => Err(OutputError::SchemeMismatch(other.to_string())),
    }
  }
}

impl Render<ImageBytes, Decision> for OutputWrapper {
  type Error = OutputError;

  fn render_result(&self, frame: &ImageBytes, result: &Decision) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::PrintJson(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      OutputWrapper::SaveJsonLines(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
    }
  }
}
