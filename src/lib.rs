//! vellum - Gap buffer text editing core
//!
//! ギャップバッファと取り消し可能な編集履歴によるテキスト編集コア

// コアモジュール
pub mod error;

// データ層
pub mod buffer;
pub mod file;

// 編集層
pub mod editor;

// 公開API
pub use buffer::{GapBuffer, LineIndex};
pub use editor::{ChangeEvent, ChangeListener, Command, CommandHistory, TextEditor};
pub use error::{BufferError, FileError, Result, VellumError};
pub use file::{open_document, save_document, LINE_TERMINATOR};
