//! バッファ管理モジュール
//!
//! ドキュメント本体（ギャップバッファ）と行索引を提供

pub mod gap_buffer;
pub mod line_index;

// 公開API
pub use gap_buffer::GapBuffer;
pub use line_index::LineIndex;
