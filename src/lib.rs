//! # 看图工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                终端前端 (main.rs)                          │
//! │     env_logger 初始化 ── 读取设置 ── 循环响应选图动作       │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ on_select_image()
//! ┌───────┴──────────────────────────────────────────────────┐
//! │  ┌─ app ──────── GalleryApp（选图 → 加载 → 显示槽）       │
//! │  ├─ picker ───── ImagePicker / LinePicker（可取消）        │
//! │  ├─ display ──── ImageView（调用方持有的输出槽）           │
//! │  ├─ image_loader 受限尺寸加载核心                          │
//! │  │   ├─ resolver   定位符 → 字节流                         │
//! │  │   ├─ probe      只读头信息的尺寸探测                    │
//! │  │   ├─ sample     2 的幂降采样倍率                        │
//! │  │   └─ decoder    按倍率解码 + 资源上限                   │
//! │  ├─ settings ─── JSON 设置 → LoaderConfig                 │
//! │  └─ error ────── AppError（应用外围错误）                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`app`] | 串联一次选图动作，返回 `SelectionOutcome` |
//! | [`picker`] | 选图器 trait 与按行读取的实现 |
//! | [`display`] | 单图显示槽，失败时保持原图 |
//! | [`image_loader`] | 探测尺寸、计算倍率、受限解码 |
//! | [`settings`] | 设置文件读取与校验 |
//! | [`error`] | 应用级统一错误类型 `AppError` |

pub mod app;
pub mod display;
pub mod error;
pub mod image_loader;
pub mod picker;
pub mod settings;
