//! エラーハンドリング
//!
//! vellum 全体で使用される統一されたエラー型を定義

use thiserror::Error;

/// クレート全体のエラー型
#[derive(Error, Debug, Clone)]
pub enum VellumError {
    /// ファイル操作エラー
    #[error("File operation failed")]
    File(#[from] FileError),

    /// バッファ操作エラー
    #[error("Buffer operation failed")]
    Buffer(#[from] BufferError),
}

/// ファイル操作固有のエラー
#[derive(Error, Debug, Clone)]
pub enum FileError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

/// バッファ操作固有のエラー
///
/// ギャップバッファ自体は範囲外要求を黙って無視する設計のため、
/// ここのエラーは範囲検証を行う編集層（`TextEditor`）からのみ発生する
#[derive(Error, Debug, Clone)]
pub enum BufferError {
    #[error("Invalid position: {position}")]
    InvalidPosition { position: usize },

    #[error("Invalid range: {start}..{end}")]
    InvalidRange { start: usize, end: usize },
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, VellumError>;

/// 各モジュール固有のResult型
pub mod file {
    pub type Result<T> = std::result::Result<T, super::FileError>;
}

pub mod buffer {
    pub type Result<T> = std::result::Result<T, super::BufferError>;
}

// std::io::Error から VellumError への変換
impl From<std::io::Error> for VellumError {
    fn from(error: std::io::Error) -> Self {
        VellumError::File(FileError::from(error))
    }
}

// std::io::Error から FileError への変換
//
// パス情報を持たない層からの変換ではエラー種別のみ引き継ぐ。
// パスを知っている呼び出し側は NotFound / PermissionDenied を直接構築する。
impl From<std::io::Error> for FileError {
    fn from(error: std::io::Error) -> Self {
        FileError::Io {
            message: error.to_string(),
        }
    }
}
