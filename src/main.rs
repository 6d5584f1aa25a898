//! # 看图工具 — 应用入口
//!
//! 本文件仅负责日志初始化、设置读取与终端交互循环。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。
//!
//! 用法：`gallery-viewer [settings.json]`，每输入一行图片路径（或 `file://`、`data:` URI）
//! 即触发一次选图；空行取消，输入结束（Ctrl-D）退出。

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use gallery_viewer::app::{GalleryApp, SelectionOutcome};
use gallery_viewer::error::AppError;
use gallery_viewer::image_loader::BoundedImageLoader;
use gallery_viewer::picker::LinePicker;
use gallery_viewer::settings;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("启动失败: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = settings::load_settings(settings_path.as_deref())?;
    let config = settings.to_loader_config()?;

    log::info!(
        "setup: 显示区域 {}x{}，重采样档位 {}",
        config.target_size.width(),
        config.target_size.height(),
        config.infer_resample_profile().as_str()
    );

    let stdin = io::stdin();
    let mut app = GalleryApp::new(LinePicker::new(stdin.lock()), BoundedImageLoader::new(config));
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "选择图片（输入路径，回车取消）> ")?;
        stdout.flush()?;

        let outcome = app.on_select_image();
        if app.picker().is_closed() {
            writeln!(stdout)?;
            break;
        }

        match outcome {
            SelectionOutcome::Cancelled => writeln!(stdout, "已取消")?,
            SelectionOutcome::Displayed | SelectionOutcome::Unchanged => {
                writeln!(stdout, "{}", app.view())?
            }
        }
    }

    log::info!("已退出");
    Ok(())
}
