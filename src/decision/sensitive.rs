// 该文件是 Shenhe （审核） 项目的一部分。
// src/decision/sensitive.rs - 敏感类别概率提取
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

use tracing::debug;

use super::InterpretedOutput;

/// 取出敏感类别的概率
///
/// 标量输出直接作为敏感概率。多分类输出在标签数量与概率向量一致且包含该类别时按索引取值，
/// 否则退回到 top-1 概率，没有任何候选时为 0。
pub fn extract_sensitive_probability(output: &InterpretedOutput, sensitive_class: &str) -> f32 {
  match output {
    InterpretedOutput::Scalar { score } => *score,
    InterpretedOutput::Multi {
      topk,
      probs,
      labels,
    } => {
      let by_name = labels
        .as_deref()
        .filter(|labels| !probs.is_empty() && labels.len() == probs.len())
        .and_then(|labels| labels.iter().position(|l| l == sensitive_class))
        .map(|index| probs[index]);

      match by_name {
        Some(prob) => prob,
        None => {
          debug!("未能按名称找到类别 {}, 使用 top-1 概率", sensitive_class);
          topk.first().map(|c| c.prob).unwrap_or(0.0)
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::decision::ClassScore;

  fn labels() -> Option<Vec<String>> {
    Some(
      ["drawings", "hentai", "porn"]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    )
  }

  fn multi(probs: Vec<f32>, labels: Option<Vec<String>>, top: &[(&str, f32)]) -> InterpretedOutput {
    InterpretedOutput::Multi {
      topk: top
        .iter()
        .map(|&(label, prob)| ClassScore {
          label: label.to_string(),
          prob,
        })
        .collect(),
      probs,
      labels,
    }
  }

  #[test]
  fn scalar_score_is_the_probability() {
    let out = InterpretedOutput::Scalar { score: 0.42 };
    assert_eq!(extract_sensitive_probability(&out, "porn"), 0.42);
  }

  #[test]
  fn looks_up_class_by_name() {
    let out = multi(
      vec![0.1, 0.1, 0.8],
      labels(),
      &[("porn", 0.8), ("drawings", 0.1), ("hentai", 0.1)],
    );
    assert_eq!(extract_sensitive_probability(&out, "porn"), 0.8);
  }

  #[test]
  fn name_lookup_wins_over_top1() {
    let out = multi(
      vec![0.1, 0.8, 0.1],
      labels(),
      &[("hentai", 0.8), ("drawings", 0.1), ("porn", 0.1)],
    );
    assert_eq!(extract_sensitive_probability(&out, "porn"), 0.1);
  }

  #[test]
  fn mismatched_labels_fall_back_to_top1() {
    let out = multi(
      vec![0.1, 0.6, 0.2, 0.1],
      labels(),
      &[("class1", 0.6), ("class2", 0.2), ("class0", 0.1)],
    );
    assert_eq!(extract_sensitive_probability(&out, "porn"), 0.6);
  }

  #[test]
  fn unknown_class_falls_back_to_top1() {
    let out = multi(vec![0.2, 0.7, 0.1], labels(), &[("hentai", 0.7)]);
    assert_eq!(extract_sensitive_probability(&out, "gore"), 0.7);
  }

  #[test]
  fn empty_topk_yields_zero() {
    let out = multi(vec![], labels(), &[]);
    assert_eq!(extract_sensitive_probability(&out, "porn"), 0.0);

    let out = multi(vec![], None, &[]);
    assert_eq!(extract_sensitive_probability(&out, "porn"), 0.0);
  }
}
