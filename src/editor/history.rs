//! 編集履歴
//!
//! 取り消し可能な編集単位（コマンド）と undo/redo スタックの管理

use crate::buffer::GapBuffer;

/// 取り消し可能な編集コマンド
///
/// Insert / Delete の 2 種のみ。Delete は構築時点で対象範囲の
/// バイト列を複製して保持するため、execute で再削除、undo で
/// 同じ内容の再挿入がいつでも行える
#[derive(Debug, Clone)]
pub enum Command {
    Insert { position: usize, text: Vec<u8> },
    Delete { position: usize, deleted: Vec<u8> },
}

impl Command {
    /// 挿入コマンドを作成
    pub fn insert(text: Vec<u8>, position: usize) -> Self {
        Command::Insert { position, text }
    }

    /// 削除コマンドを作成
    ///
    /// 削除予定の範囲を実行前に読み出して複製する。範囲はバッファ側で
    /// 末尾に切り詰められるため、コマンドは常に自身が複製した分だけを
    /// 削除・復元する
    pub fn capture_delete(buffer: &GapBuffer, start: usize, end: usize) -> Self {
        let len = end.saturating_sub(start);
        Command::Delete {
            position: start,
            deleted: buffer.read_range(start, len),
        }
    }

    /// コマンドを実行
    pub fn execute(&self, buffer: &mut GapBuffer) {
        match self {
            Command::Insert { position, text } => {
                buffer.insert(text, *position);
            }
            Command::Delete { position, deleted } => {
                buffer.delete(*position, *position + deleted.len());
            }
        }
    }

    /// コマンドを取り消し
    pub fn undo(&self, buffer: &mut GapBuffer) {
        match self {
            Command::Insert { position, text } => {
                buffer.delete(*position, *position + text.len());
            }
            Command::Delete { position, deleted } => {
                buffer.insert(deleted, *position);
            }
        }
    }

    /// 実行後のカーソル位置
    pub fn cursor_after_execute(&self) -> usize {
        match self {
            Command::Insert { position, text } => position + text.len(),
            Command::Delete { position, .. } => *position,
        }
    }

    /// 取り消し後のカーソル位置
    pub fn cursor_after_undo(&self) -> usize {
        match self {
            Command::Insert { position, .. } => *position,
            Command::Delete { position, deleted } => position + deleted.len(),
        }
    }
}

/// undo/redo スタック
///
/// コマンドの所有権は常にどちらか一方のスタックにある。
/// 新しいコマンドの実行は redo スタックを必ず破棄する
/// （取り消した未来は新しい編集で無効になる）
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    last_cursor: Option<usize>,
    limit: Option<usize>,
}

impl CommandHistory {
    /// 上限なしの履歴を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 保持件数に上限を付けた履歴を作成
    ///
    /// 上限超過時は最古の undo エントリから破棄する。
    /// `limit == 0` は履歴を一切保持しない
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// 直近の execute / undo / redo が記録したカーソル位置
    ///
    /// まだ一度も操作がなければ `None`（位置 0 との混同を避けるため
    /// 番兵値は使わない）
    pub fn last_cursor_position(&self) -> Option<usize> {
        self.last_cursor
    }

    /// コマンドを実行して undo スタックへ積む
    pub fn execute(&mut self, command: Command, buffer: &mut GapBuffer) {
        command.execute(buffer);
        self.last_cursor = Some(command.cursor_after_execute());
        self.redo_stack.clear();
        self.push_undo(command);
    }

    /// 直近のコマンドを取り消す
    ///
    /// 取り消したコマンド（redo スタックへ移った実体）への参照を返す。
    /// 呼び出し側はここから内容変化を組み立てられる。
    /// undo スタックが空なら何もせず `None`
    pub fn undo(&mut self, buffer: &mut GapBuffer) -> Option<&Command> {
        let command = self.undo_stack.pop()?;
        command.undo(buffer);
        self.last_cursor = Some(command.cursor_after_undo());
        self.redo_stack.push(command);
        self.redo_stack.last()
    }

    /// 直近に取り消したコマンドを再実行する
    ///
    /// 再実行したコマンドへの参照を返す。redo スタックが空なら
    /// 何もせず `None`
    pub fn redo(&mut self, buffer: &mut GapBuffer) -> Option<&Command> {
        let command = self.redo_stack.pop()?;
        command.execute(buffer);
        self.last_cursor = Some(command.cursor_after_execute());
        self.push_undo(command);
        self.undo_stack.last()
    }

    /// 履歴とカーソル記録をすべて破棄
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.last_cursor = None;
    }

    fn push_undo(&mut self, command: Command) {
        if let Some(limit) = self.limit {
            if limit == 0 {
                return;
            }
            if self.undo_stack.len() >= limit {
                self.undo_stack.remove(0);
            }
        }
        self.undo_stack.push(command);
    }
}
