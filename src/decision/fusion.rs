// 该文件是 Shenhe （审核） 项目的一部分。
// src/decision/fusion.rs - 双模型结果融合
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

/// 融合两个模型的判定，阈值比较包含等号
///
/// NSFW 敏感概率达到阈值即为敏感；启用血腥信号且有可用分数时，两者取逻辑或。
pub fn fuse(nsfw_sensitive_prob: f32, gore_score: Option<f32>, threshold: f32, use_gore: bool) -> bool {
  let nsfw_hit = nsfw_sensitive_prob >= threshold;
  let gore_hit = use_gore && gore_score.is_some_and(|score| score >= threshold);
  nsfw_hit || gore_hit
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn either_signal_triggers() {
    assert!(fuse(0.3, Some(0.6), 0.5, true));
    assert!(fuse(0.6, Some(0.1), 0.5, true));
    assert!(!fuse(0.3, Some(0.1), 0.5, true));
  }

  #[test]
  fn gore_ignored_when_disabled_or_missing() {
    assert!(!fuse(0.3, Some(0.6), 0.5, false));
    assert!(!fuse(0.3, None, 0.5, true));
    assert!(fuse(0.7, None, 0.5, true));
  }

  #[test]
  fn threshold_is_inclusive() {
    assert!(fuse(0.5, None, 0.5, true));
    assert!(fuse(0.0, Some(0.5), 0.5, true));
    assert!(!fuse(0.4999, Some(0.4999), 0.5, true));
  }

  #[test]
  fn verdict_is_monotonic() {
    let steps: Vec<f32> = (0..=20).map(|i| i as f32 / 20.0).collect();
    for &nsfw in &steps {
      for &gore in &steps {
        if fuse(nsfw, Some(gore), 0.5, true) {
          assert!(fuse((nsfw + 0.05).min(1.0), Some(gore), 0.5, true));
          assert!(fuse(nsfw, Some((gore + 0.05).min(1.0)), 0.5, true));
        }
      }
    }
  }
}
