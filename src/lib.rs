//! Lead AI
//!
//! Webサイト解析の結果をリードとして保存し、絞り込み・並べ替え・
//! 検証・CRM同期・エクスポートを行う。

pub mod analysis;
pub mod cli;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod gateway;
pub mod notice;
pub mod render;
pub mod service;
pub mod store;

pub use lead_ai_common as common;
