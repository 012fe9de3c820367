//! 編集機能
//!
//! コマンド履歴と、その上に載る編集サーフェス

pub mod history;
pub mod text_editor;

// 公開API
pub use history::{Command, CommandHistory};
pub use text_editor::{ChangeEvent, ChangeListener, ChangeNotifier, TextEditor};
