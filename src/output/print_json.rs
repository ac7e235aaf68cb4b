// 该文件是 Shenhe （审核） 项目的一部分。
// src/output/print_json.rs - 标准输出 JSON
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

use std::io::Write;

use thiserror::Error;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  decision::Decision,
  frame::ImageBytes,
  output::{Record, Render},
};

#[derive(Error, Debug)]
pub enum PrintJsonError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 每张图像向标准输出打印一行 JSON，`stdout:?pretty` 时使用缩进格式
pub struct PrintJsonOutput {
  pretty: bool,
}

impl FromUrlWithScheme for PrintJsonOutput {
  const SCHEME: &'static str = "stdout";
}

impl FromUrl for PrintJsonOutput {
  type Error = PrintJsonError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(PrintJsonError::SchemeMismatch);
    }

    let pretty = url.query_pairs().any(|(k, _)| k == "pretty");
    Ok(PrintJsonOutput { pretty })
  }
}

impl PrintJsonOutput {
  pub fn format(&self, record: &Record<'_>) -> Result<String, PrintJsonError> {
    let text = if self.pretty {
      serde_json::to_string_pretty(record)?
    } else {
      serde_json::to_string(record)?
    };
    Ok(text)
  }
}

impl Render<ImageBytes, Decision> for PrintJsonOutput {
  type Error = PrintJsonError;

  fn render_result(&self, frame: &ImageBytes, result: &Decision) -> Result<(), Self::Error> {
    let text = self.format(&Record::new(frame, result))?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", text)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn decision() -> Decision {
    Decision {
      gore_score: Some(0.25),
      nsfw_top_label: Some("drawings".to_string()),
      nsfw_top_prob: Some(0.75),
      nsfw_sensitive_class: "porn".to_string(),
      nsfw_sensitive_prob: 0.125,
      threshold: 0.5,
      is_sensitive: false,
    }
  }

  #[test]
  fn compact_record_is_one_line() {
    let output = PrintJsonOutput::from_url(&Url::parse("stdout:").unwrap()).unwrap();
    let frame = ImageBytes::new("a.png", vec![]);
    let decision = decision();
    let text = output.format(&Record::new(&frame, &decision)).unwrap();
    assert!(!text.contains('\n'));

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["source"], "a.png");
    assert_eq!(value["result"]["nsfw_top_label"], "drawings");
    assert_eq!(value["result"]["is_sensitive"], false);
  }

  #[test]
  fn pretty_query_enables_indentation() {
    let output = PrintJsonOutput::from_url(&Url::parse("stdout:?pretty").unwrap()).unwrap();
    let frame = ImageBytes::new("a.png", vec![]);
    let decision = decision();
    assert!(output.format(&Record::new(&frame, &decision)).unwrap().contains('\n'));
  }
}
