//! エディタ操作インターフェース
//!
//! バッファ・履歴・キャレットをまとめた編集サーフェス

use std::path::{Path, PathBuf};

use crate::buffer::GapBuffer;
use crate::editor::history::{Command, CommandHistory};
use crate::error::{BufferError, FileError, Result};
use crate::file;

/// 変更イベント
///
/// 位置はすべてバイトオフセット
#[derive(Debug, Clone)]
pub enum ChangeEvent {
    Inserted {
        position: usize,
        content: Vec<u8>,
    },
    Deleted {
        position: usize,
        content: Vec<u8>,
    },
    CaretMoved {
        old_position: usize,
        new_position: usize,
    },
}

/// 変更通知リスナー
pub trait ChangeListener {
    fn on_change(&mut self, event: &ChangeEvent);
}

/// 変更通知システム
pub struct ChangeNotifier {
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// リスナーを追加
    pub fn add_listener(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    /// 変更を通知
    pub fn notify(&mut self, event: ChangeEvent) {
        for listener in &mut self.listeners {
            listener.on_change(&event);
        }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// テキストエディタのメイン構造体
///
/// 編集はすべて [`Command`] として履歴を経由するため、常に undo/redo
/// できる。キャレットは `0..=len` のバイトオフセットに保たれる
pub struct TextEditor {
    /// テキストバッファ
    buffer: GapBuffer,
    /// 編集履歴
    history: CommandHistory,
    /// キャレット位置（バイトオフセット）
    caret: usize,
    /// 未保存の変更があるか
    modified: bool,
    /// 関連付けられたファイル
    path: Option<PathBuf>,
    /// 変更通知システム
    change_notifier: ChangeNotifier,
}

impl TextEditor {
    /// 空のエディタを作成
    pub fn new() -> Self {
        Self {
            buffer: GapBuffer::new(),
            history: CommandHistory::new(),
            caret: 0,
            modified: false,
            path: None,
            change_notifier: ChangeNotifier::new(),
        }
    }

    /// 文字列からエディタを作成
    pub fn from_str(s: &str) -> Self {
        Self {
            buffer: GapBuffer::from_str(s),
            ..Self::new()
        }
    }

    /// バイト列からエディタを作成
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            buffer: GapBuffer::from_bytes(bytes),
            ..Self::new()
        }
    }

    /// ファイルを読み込んでエディタを作成
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let buffer = file::open_document(path)?;
        Ok(Self {
            buffer,
            path: Some(path.to_path_buf()),
            ..Self::new()
        })
    }

    /// 関連付けられたファイルへ保存
    ///
    /// 保存先が未設定なら `FileError::InvalidPath`
    pub fn save(&mut self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Err(FileError::InvalidPath {
                path: "(no file path set)".to_string(),
            }
            .into());
        };
        file::save_document(&path, &self.buffer)?;
        self.modified = false;
        Ok(())
    }

    /// 保存先を差し替えて保存
    ///
    /// 書き込みが成功した場合のみ保存先を差し替える。失敗時は
    /// 元の関連付けと変更フラグをそのまま残す
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        file::save_document(path, &self.buffer)?;
        self.path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    /// キャレット位置に文字列を挿入
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.apply_insert(s.as_bytes().to_vec(), self.caret);
    }

    /// キャレット位置に文字を挿入
    pub fn insert_char(&mut self, ch: char) {
        let mut encoded = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut encoded));
    }

    /// 指定位置に文字列を挿入
    ///
    /// 位置が文書長を超える場合は `BufferError::InvalidPosition`
    pub fn insert_at(&mut self, s: &str, position: usize) -> Result<()> {
        if position > self.buffer.len() {
            return Err(BufferError::InvalidPosition { position }.into());
        }
        if s.is_empty() {
            return Ok(());
        }
        self.apply_insert(s.as_bytes().to_vec(), position);
        Ok(())
    }

    /// 範囲 `[start, end)` を削除し、削除したバイト列を返す
    ///
    /// 逆転した範囲や文書長を超える範囲は `BufferError::InvalidRange`。
    /// 空範囲は何もしない（履歴にも残らない）
    pub fn delete_range(&mut self, start: usize, end: usize) -> Result<Vec<u8>> {
        if start > end || end > self.buffer.len() {
            return Err(BufferError::InvalidRange { start, end }.into());
        }
        if start == end {
            return Ok(Vec::new());
        }
        Ok(self.apply_delete(start, end))
    }

    /// キャレット直前の 1 バイトを削除
    ///
    /// 文書先頭では何もせず `false`
    pub fn backspace(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        let start = self.caret - 1;
        self.apply_delete(start, start + 1);
        true
    }

    /// キャレット位置の 1 バイトを削除
    ///
    /// 文書末尾では何もせず `false`
    pub fn delete_forward(&mut self) -> bool {
        if self.caret >= self.buffer.len() {
            return false;
        }
        self.apply_delete(self.caret, self.caret + 1);
        true
    }

    /// 直近の編集を取り消す
    ///
    /// 内容の変化は逆向きのイベント（挿入の取り消しは `Deleted`、
    /// 削除の取り消しは `Inserted`）として通知する。キャレットを記録
    /// 位置へ移し `true` を返す。履歴が空なら何も変えない
    pub fn undo(&mut self) -> bool {
        let old_position = self.caret;
        let Some(command) = self.history.undo(&mut self.buffer) else {
            return false;
        };
        let event = match command {
            Command::Insert { position, text } => ChangeEvent::Deleted {
                position: *position,
                content: text.clone(),
            },
            Command::Delete { position, deleted } => ChangeEvent::Inserted {
                position: *position,
                content: deleted.clone(),
            },
        };
        self.finish_history_step(event, old_position)
    }

    /// 直近に取り消した編集をやり直す
    ///
    /// 内容の変化は元の編集と同じ向きのイベントとして通知する
    pub fn redo(&mut self) -> bool {
        let old_position = self.caret;
        let Some(command) = self.history.redo(&mut self.buffer) else {
            return false;
        };
        let event = match command {
            Command::Insert { position, text } => ChangeEvent::Inserted {
                position: *position,
                content: text.clone(),
            },
            Command::Delete { position, deleted } => ChangeEvent::Deleted {
                position: *position,
                content: deleted.clone(),
            },
        };
        self.finish_history_step(event, old_position)
    }

    /// キャレットを移動（文書長に切り詰め）
    pub fn set_caret(&mut self, position: usize) {
        let clamped = position.min(self.buffer.len());
        if clamped == self.caret {
            return;
        }
        let old_position = self.caret;
        self.caret = clamped;
        self.change_notifier.notify(ChangeEvent::CaretMoved {
            old_position,
            new_position: clamped,
        });
    }

    /// 変更リスナーを追加
    pub fn add_change_listener(&mut self, listener: Box<dyn ChangeListener>) {
        self.change_notifier.add_listener(listener);
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// 範囲読み出し（バッファ側の切り詰め規則に従う）
    pub fn read_range(&self, position: usize, length: usize) -> Vec<u8> {
        self.buffer.read_range(position, length)
    }

    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    /// 指定行の内容（行末の改行は含まない）
    pub fn line(&self, line_no: usize) -> Option<Vec<u8>> {
        self.buffer.line_bytes(line_no)
    }

    pub fn line_range(&self, line_no: usize) -> Option<(usize, usize)> {
        self.buffer.line_range(line_no)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_bytes()
    }

    pub fn to_string_lossy(&self) -> String {
        self.buffer.to_string_lossy()
    }

    pub fn buffer(&self) -> &GapBuffer {
        &self.buffer
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn apply_insert(&mut self, text: Vec<u8>, position: usize) {
        let command = Command::Insert {
            position,
            text: text.clone(),
        };
        self.history.execute(command, &mut self.buffer);
        self.caret = self.history.last_cursor_position().unwrap_or(position);
        self.modified = true;
        self.change_notifier.notify(ChangeEvent::Inserted {
            position,
            content: text,
        });
    }

    fn apply_delete(&mut self, start: usize, end: usize) -> Vec<u8> {
        let deleted = self.buffer.read_range(start, end - start);
        let command = Command::Delete {
            position: start,
            deleted: deleted.clone(),
        };
        self.history.execute(command, &mut self.buffer);
        self.caret = self.history.last_cursor_position().unwrap_or(start);
        self.modified = true;
        self.change_notifier.notify(ChangeEvent::Deleted {
            position: start,
            content: deleted.clone(),
        });
        deleted
    }

    fn finish_history_step(&mut self, event: ChangeEvent, old_position: usize) -> bool {
        if let Some(position) = self.history.last_cursor_position() {
            self.caret = position;
        }
        self.modified = true;
        self.change_notifier.notify(event);
        if self.caret != old_position {
            self.change_notifier.notify(ChangeEvent::CaretMoved {
                old_position,
                new_position: self.caret,
            });
        }
        true
    }
}

impl Default for TextEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_basic_char_insertion() {
        let mut editor = TextEditor::new();

        editor.insert_char('a');
        assert_eq!(editor.to_string_lossy(), "a");
        assert_eq!(editor.caret(), 1);
    }

    #[test]
    fn test_utf8_char_insertion() {
        let mut editor = TextEditor::new();

        // キャレットはバイト単位で進む
        editor.insert_char('あ');
        assert_eq!(editor.to_string_lossy(), "あ");
        assert_eq!(editor.caret(), 3);
    }

    #[test]
    fn test_string_insertion() {
        let mut editor = TextEditor::new();

        editor.insert_str("hello world");
        assert_eq!(editor.to_string_lossy(), "hello world");
        assert_eq!(editor.caret(), 11);
        assert!(editor.is_modified());
    }

    #[test]
    fn test_insert_at_explicit_position() {
        let mut editor = TextEditor::from_str("hed");
        assert!(editor.insert_at("llo worl", 2).is_ok());
        assert_eq!(editor.to_string_lossy(), "hello world");
        assert_eq!(editor.caret(), 10);
    }

    #[test]
    fn test_insert_at_rejects_out_of_range() {
        let mut editor = TextEditor::from_str("abc");
        assert!(editor.insert_at("x", 4).is_err());
        assert_eq!(editor.to_string_lossy(), "abc");
        assert!(!editor.is_modified());
    }

    #[test]
    fn test_delete_range_returns_removed_bytes() {
        let mut editor = TextEditor::from_str("hello");
        let deleted = editor.delete_range(1, 3).unwrap();
        assert_eq!(deleted, b"el");
        assert_eq!(editor.to_string_lossy(), "hlo");
        assert_eq!(editor.caret(), 1);
    }

    #[test]
    fn test_delete_range_rejects_bad_spans() {
        let mut editor = TextEditor::from_str("abc");
        assert!(editor.delete_range(2, 1).is_err());
        assert!(editor.delete_range(0, 4).is_err());
        assert_eq!(editor.to_string_lossy(), "abc");
    }

    #[test]
    fn test_empty_delete_leaves_no_history() {
        let mut editor = TextEditor::from_str("abc");
        assert_eq!(editor.delete_range(1, 1).unwrap(), b"");
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_backspace_deletion() {
        let mut editor = TextEditor::from_str("hello");
        editor.set_caret(5);

        assert!(editor.backspace());
        assert_eq!(editor.to_string_lossy(), "hell");
        assert_eq!(editor.caret(), 4);
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut editor = TextEditor::from_str("hello");
        assert!(!editor.backspace());
        assert_eq!(editor.to_string_lossy(), "hello");
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_delete_forward() {
        let mut editor = TextEditor::from_str("hello");

        assert!(editor.delete_forward());
        assert_eq!(editor.to_string_lossy(), "ello");
        assert_eq!(editor.caret(), 0);
    }

    #[test]
    fn test_delete_forward_at_end_is_noop() {
        let mut editor = TextEditor::from_str("hi");
        editor.set_caret(2);
        assert!(!editor.delete_forward());
        assert_eq!(editor.to_string_lossy(), "hi");
    }

    #[test]
    fn test_undo_redo_restores_caret() {
        let mut editor = TextEditor::from_str("hello");

        editor.delete_range(1, 3).unwrap();
        assert_eq!(editor.to_string_lossy(), "hlo");
        assert_eq!(editor.caret(), 1);

        assert!(editor.undo());
        assert_eq!(editor.to_string_lossy(), "hello");
        assert_eq!(editor.caret(), 3);

        assert!(editor.redo());
        assert_eq!(editor.to_string_lossy(), "hlo");
        assert_eq!(editor.caret(), 1);
    }

    #[test]
    fn test_undo_with_empty_history_keeps_caret() {
        let mut editor = TextEditor::from_str("abc");
        editor.set_caret(2);

        assert!(!editor.undo());
        assert!(!editor.redo());
        assert_eq!(editor.caret(), 2);
        assert_eq!(editor.to_string_lossy(), "abc");
    }

    #[test]
    fn test_typing_then_undo_sequence() {
        let mut editor = TextEditor::new();
        editor.insert_str("one ");
        editor.insert_str("two");
        assert_eq!(editor.to_string_lossy(), "one two");

        assert!(editor.undo());
        assert_eq!(editor.to_string_lossy(), "one ");
        assert_eq!(editor.caret(), 4);

        assert!(editor.undo());
        assert_eq!(editor.to_string_lossy(), "");
        assert_eq!(editor.caret(), 0);

        assert!(!editor.undo());
    }

    #[test]
    fn test_set_caret_clamps_to_length() {
        let mut editor = TextEditor::from_str("abc");
        editor.set_caret(100);
        assert_eq!(editor.caret(), 3);
    }

    #[test]
    fn test_line_accessors() {
        let editor = TextEditor::from_str("ab\ncd\n");
        assert_eq!(editor.line_count(), 3);
        assert_eq!(editor.line(0), Some(b"ab".to_vec()));
        assert_eq!(editor.line(1), Some(b"cd".to_vec()));
        assert_eq!(editor.line(2), Some(Vec::new()));
        assert_eq!(editor.line(3), None);
    }

    struct RecordingListener {
        events: Rc<RefCell<Vec<&'static str>>>,
    }

    impl ChangeListener for RecordingListener {
        fn on_change(&mut self, event: &ChangeEvent) {
            let label = match event {
                ChangeEvent::Inserted { .. } => "insert",
                ChangeEvent::Deleted { .. } => "delete",
                ChangeEvent::CaretMoved { .. } => "caret",
            };
            self.events.borrow_mut().push(label);
        }
    }

    #[test]
    fn test_change_listener_receives_events() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut editor = TextEditor::new();
        editor.add_change_listener(Box::new(RecordingListener {
            events: Rc::clone(&events),
        }));

        editor.insert_str("ab");
        editor.delete_range(0, 1).unwrap();
        editor.set_caret(1);

        assert_eq!(*events.borrow(), vec!["insert", "delete", "caret"]);
    }

    /// 内容イベントだけから文書の複製を維持するリスナー
    struct MirrorListener {
        doc: Rc<RefCell<Vec<u8>>>,
    }

    impl ChangeListener for MirrorListener {
        fn on_change(&mut self, event: &ChangeEvent) {
            let mut doc = self.doc.borrow_mut();
            match event {
                ChangeEvent::Inserted { position, content } => {
                    let tail = doc.split_off(*position);
                    doc.extend_from_slice(content);
                    doc.extend_from_slice(&tail);
                }
                ChangeEvent::Deleted { position, content } => {
                    doc.drain(*position..*position + content.len());
                }
                ChangeEvent::CaretMoved { .. } => {}
            }
        }
    }

    #[test]
    fn test_listener_mirror_stays_in_sync_through_undo_redo() {
        let doc = Rc::new(RefCell::new(Vec::new()));
        let mut editor = TextEditor::new();
        editor.add_change_listener(Box::new(MirrorListener {
            doc: Rc::clone(&doc),
        }));

        editor.insert_str("hello");
        editor.delete_range(1, 3).unwrap();
        assert_eq!(*doc.borrow(), b"hlo");

        // 削除の取り消しは Inserted として届く
        assert!(editor.undo());
        assert_eq!(editor.to_bytes(), b"hello");
        assert_eq!(*doc.borrow(), editor.to_bytes());

        // やり直しは元の編集と同じ Deleted として届く
        assert!(editor.redo());
        assert_eq!(editor.to_bytes(), b"hlo");
        assert_eq!(*doc.borrow(), editor.to_bytes());

        // 挿入の取り消しは Deleted として届く
        assert!(editor.undo());
        assert!(editor.undo());
        assert!(editor.is_empty());
        assert_eq!(*doc.borrow(), b"");
    }
}
