//! ファイル操作
//!
//! 文書の読み書き境界

pub mod io;

// 公開API
pub use io::{open_document, save_document, LINE_TERMINATOR};
