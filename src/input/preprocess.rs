// 该文件是 Shenhe （审核） 项目的一部分。
// src/input/preprocess.rs - 图像解码、缩放与归一化
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

use image::imageops::FilterType;
use ndarray::Array4;
use thiserror::Error;
use tracing::debug;

use crate::frame::{NhwcTensor, RGB_CHANNELS};

#[derive(Error, Debug)]
pub enum PreprocessError {
  #[error("图像解码错误: {0}")]
  ImageDecodeError(#[from] image::ImageError),
  #[error("目标尺寸无效: {0}x{1}")]
  InvalidSize(usize, usize),
  #[error("张量形状错误: {0}")]
  ShapeError(#[from] ndarray::ShapeError),
}

/// 将原始图像字节转换为模型输入
///
/// 解码后统一转换为 RGB，缩放到 `target_width x target_height`，
/// 像素值除以 255 并增加大小为 1 的批次维度，结果形状为 `[1, H, W, 3]`。
pub fn preprocess(
  bytes: &[u8],
  target_height: usize,
  target_width: usize,
) -> Result<NhwcTensor, PreprocessError> {
  let invalid = || PreprocessError::InvalidSize(target_height, target_width);
  if target_height == 0 || target_width == 0 {
    return Err(invalid());
  }
  let height = u32::try_from(target_height).map_err(|_| invalid())?;
  let width = u32::try_from(target_width).map_err(|_| invalid())?;

  let image = image::load_from_memory(bytes)?;
  debug!(
    "图像解码完成: {}x{} {:?}",
    image.width(),
    image.height(),
    image.color()
  );

  let rgb = image.to_rgb8();
  let resized = image::imageops::resize(&rgb, width, height, FilterType::Triangle);

  let data: Vec<f32> = resized
    .into_raw()
    .into_iter()
    .map(|v| v as f32 / 255.0)
    .collect();
  let tensor = Array4::from_shape_vec((1, target_height, target_width, RGB_CHANNELS), data)?;

  Ok(NhwcTensor::from(tensor))
}
