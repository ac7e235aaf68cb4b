// 该文件是 Shenhe （审核） 项目的一部分。
// src/task.rs - 命令行任务
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

use std::{thread, time::Duration};
use tracing::{error, info, warn};

use crate::{decision::Decision, frame::ImageBytes, output::Render, pipeline::Classifier};

pub trait Task<I, C, O>: Sized {
  type Error;
  fn run_task(self, input: I, classifier: C, output: O) -> Result<(), Self::Error>;
}

pub struct OneShotTask;

impl<
  CE: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = ImageBytes>,
  C: Classifier<Error = CE>,
  O: Render<ImageBytes, Decision, Error = RE>,
> Task<I, C, O> for OneShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, classifier: C, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let image = input.next().ok_or_else(|| anyhow::anyhow!("没有输入图像"))?;
    info!("输入图像获取成功: {}, 开始推理...", image.source);
    let now = std::time::Instant::now();
    let result = classifier.classify(&image.data)?;
    info!("推理完成，耗时: {:.2?}", now.elapsed());
    output.render_result(&image, &result)?;

    Ok(())
  }
}

pub struct RepeatShotTask {
  repeat_times: usize,
}

impl Default for RepeatShotTask {
  fn default() -> Self {
    Self { repeat_times: 100 }
  }
}

impl RepeatShotTask {
  pub fn with_repeat_times(mut self, repeat_times: usize) -> Self {
    self.repeat_times = repeat_times.max(1);
    self
  }
}

impl<
  CE: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = ImageBytes>,
  C: Classifier<Error = CE>,
  O: Render<ImageBytes, Decision, Error = RE>,
> Task<I, C, O> for RepeatShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, classifier: C, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let image = input.next().ok_or_else(|| anyhow::anyhow!("没有输入图像"))?;
    info!("输入图像获取成功，开始推理...");
    let mut times = Vec::with_capacity(self.repeat_times);
    let mut last = None;
    for i in 0..self.repeat_times {
      let now = std::time::Instant::now();
      let result = classifier.classify(&image.data)?;
      let elapsed = now.elapsed();
      info!("({})推理完成，耗时: {:.2?}", i, elapsed);
      times.push(elapsed);
      last = Some(result);
    }

    // 前两次包含会话预热，不计入平均值
    let warm = if times.len() > 2 { &times[2..] } else { &times[..] };
    warn!(
      "平均推理时间: {:.2?}",
      warm.iter().sum::<Duration>() / warm.len() as u32
    );

    if let Some(result) = last {
      output.render_result(&image, &result)?;
    }

    Ok(())
  }
}

#[derive(Default, Debug)]
pub struct ContinuousTask {
  frame_number: Option<usize>,
}

impl ContinuousTask {
  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }
}

impl<
  CE: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = ImageBytes>,
  C: Classifier<Error = CE>,
  O: Render<ImageBytes, Decision, Error = RE>,
> Task<I, C, O> for ContinuousTask
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, classifier: C, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let (tx, rx) = std::sync::mpsc::channel();

    ctrlc::set_handler(move || {
      info!("收到中断信号，准备退出...");
      let _ = tx.send(());
      thread::spawn(|| {
        thread::sleep(Duration::from_secs(30));
        warn!("强制退出程序");
        std::process::exit(1);
      });
    })?;

    let mut processed = 0usize;
    let mut sensitive = 0usize;
    let mut failed = 0usize;
    for image in input {
      processed += 1;
      info!("处理第 {} 张图像: {}", processed, image.source);
      // 单张图像失败不影响后续图像
      match classifier.classify(&image.data) {
        Ok(result) => {
          if result.is_sensitive {
            sensitive += 1;
          }
          output.render_result(&image, &result)?;
        }
        Err(e) => {
          failed += 1;
          error!("图像 {} 判定失败: {}", image.source, e);
        }
      }
      if self.frame_number.map(|n| processed >= n).unwrap_or(false) {
        info!("达到指定数量 {}, 退出任务循环", processed);
        break;
      }
      if rx.try_recv().is_ok() {
        warn!("中断信号接收，退出任务循环");
        break;
      }
    }

    info!(
      "任务完成: 共 {} 张, 敏感 {} 张, 失败 {} 张",
      processed, sensitive, failed
    );
    Ok(())
  }
}
