//! ファイルI/O操作
//!
//! 文書の読み込みと保存。内部表現は LF 区切り、保存時に
//! プラットフォームの行区切りへ変換する

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::buffer::GapBuffer;
use crate::error::{FileError, Result, VellumError};

/// 保存時の行区切り文字
#[cfg(windows)]
pub const LINE_TERMINATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_TERMINATOR: &str = "\n";

/// ファイルを読み込んでバッファを構築する
///
/// 読み込みが完了するまでバッファは作られない（途中で失敗しても
/// 半端な文書は返さない）。CRLF と孤立 CR は LF に統一する
pub fn open_document<P: AsRef<Path>>(path: P) -> Result<GapBuffer> {
    let path = path.as_ref();

    // ファイル存在チェック
    if !path.exists() {
        return Err(VellumError::File(FileError::NotFound {
            path: path.display().to_string(),
        }));
    }

    // ディレクトリではないことを確認
    if path.is_dir() {
        return Err(VellumError::File(FileError::InvalidPath {
            path: path.display().to_string(),
        }));
    }

    let raw = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => VellumError::File(FileError::PermissionDenied {
            path: path.display().to_string(),
        }),
        _ => e.into(),
    })?;

    let content = if raw.contains(&b'\r') {
        log::warn!(
            "Non-LF line endings in {}, normalizing to LF",
            path.display()
        );
        normalize_line_endings(&raw)
    } else {
        raw
    };

    Ok(GapBuffer::from_bytes(&content))
}

/// バッファをファイルへ保存する
///
/// 行区切りは [`LINE_TERMINATOR`]。最終行の後には付けない。
/// 一時ファイルに書き込んでからアトミックに移動する
pub fn save_document<P: AsRef<Path>>(path: P, buffer: &GapBuffer) -> Result<()> {
    let path = path.as_ref();

    // 親ディレクトリが存在しない場合は作成
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = serialize_lines(buffer);

    let temp_path = generate_temp_path(path)?;
    fs::write(&temp_path, &content)?;
    fs::rename(&temp_path, path).map_err(|e| {
        // 一時ファイル削除を試行
        let _ = fs::remove_file(&temp_path);
        VellumError::File(FileError::Io {
            message: e.to_string(),
        })
    })?;

    Ok(())
}

/// 行区切りを挟みながら全行を直列化する
fn serialize_lines(buffer: &GapBuffer) -> Vec<u8> {
    let mut content = Vec::with_capacity(buffer.len() + buffer.line_count());
    for line_no in 0..buffer.line_count() {
        if line_no > 0 {
            content.extend_from_slice(LINE_TERMINATOR.as_bytes());
        }
        if let Some(line) = buffer.line_bytes(line_no) {
            content.extend_from_slice(&line);
        }
    }
    content
}

/// CRLF / 孤立 CR を LF に変換する
fn normalize_line_endings(content: &[u8]) -> Vec<u8> {
    let mut normalized = Vec::with_capacity(content.len());
    let mut i = 0;
    while i < content.len() {
        match content[i] {
            b'\r' => {
                normalized.push(b'\n');
                if content.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            byte => normalized.push(byte),
        }
        i += 1;
    }
    normalized
}

/// 同一ディレクトリ内に一意な一時ファイル名を生成する
fn generate_temp_path(original: &Path) -> Result<PathBuf> {
    let parent = original.parent().ok_or_else(|| {
        VellumError::File(FileError::InvalidPath {
            path: original.display().to_string(),
        })
    })?;

    let filename = original.file_name().ok_or_else(|| {
        VellumError::File(FileError::InvalidPath {
            path: original.display().to_string(),
        })
    })?;

    let temp_name = format!(".{}_{}", filename.to_string_lossy(), std::process::id());

    Ok(parent.join(temp_name))
}
