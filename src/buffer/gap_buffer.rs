//! ギャップバッファ実装
//!
//! 効率的なテキスト編集のためのギャップバッファデータ構造。
//! ドキュメント内容はバイト列として扱い、ギャップ（空き領域）を
//! 編集位置へ移動させることで局所的な挿入・削除を高速化する

use super::line_index::LineIndex;

/// 構築時にギャップへ確保する余白（バイト単位）
const GAP_SLACK: usize = 1024;

/// ギャップバッファ構造体
///
/// 物理バッファを `[0, gap_start)` と `[gap_end, storage.len())` の
/// 2 つの論理領域に分割し、その間を未使用のギャップとして保持する。
/// 論理的なドキュメント内容は両領域の連結であり、
/// 論理長は `storage.len() - gap_size()` で常に O(1) で求まる
#[derive(Debug, Clone)]
pub struct GapBuffer {
    /// 物理バッファ（空のバッファは最初の挿入まで何も確保しない）
    storage: Vec<u8>,
    /// ギャップの開始位置（バイト単位、論理位置と同一）
    gap_start: usize,
    /// ギャップの終了位置（排他的、バイト単位）
    gap_end: usize,
    /// 行開始位置の索引（内容変更のたびに全再構築）
    line_index: LineIndex,
}

impl GapBuffer {
    /// 新しい空のギャップバッファを作成
    ///
    /// 物理バッファの確保は最初の挿入まで遅延する
    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
            gap_start: 0,
            gap_end: 0,
            line_index: LineIndex::new(),
        }
    }

    /// バイト列からギャップバッファを作成
    ///
    /// 内容長 + 余白分の物理バッファを確保し、内容をギャップ前方に
    /// 置いてギャップを末尾に配置する
    pub fn from_bytes(content: &[u8]) -> Self {
        let total_size = content.len() + GAP_SLACK;
        let mut storage = Vec::with_capacity(total_size);
        storage.extend_from_slice(content);
        storage.resize(total_size, 0);

        let mut buffer = Self {
            storage,
            gap_start: content.len(),
            gap_end: total_size,
            line_index: LineIndex::new(),
        };
        buffer.rebuild_line_index();
        buffer
    }

    /// 読み込み元からギャップバッファを作成
    ///
    /// 読み込みに失敗した場合はエラーを返し、バッファは一切構築しない
    pub fn from_reader<R: std::io::Read>(mut reader: R) -> std::io::Result<Self> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        Ok(Self::from_bytes(&content))
    }

    /// 文字列からギャップバッファを作成
    pub fn from_str(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }

    fn prefix_bytes(&self) -> &[u8] {
        &self.storage[..self.gap_start]
    }

    fn suffix_bytes(&self) -> &[u8] {
        &self.storage[self.gap_end..]
    }

    /// 現在のギャップサイズを取得
    pub fn gap_size(&self) -> usize {
        self.gap_end - self.gap_start
    }

    /// 現在のギャップ位置（論理位置）を取得
    pub fn gap_position(&self) -> usize {
        self.gap_start
    }

    /// 論理長（バイト数）を取得
    pub fn len(&self) -> usize {
        self.storage.len() - self.gap_size()
    }

    /// 空かどうかを判定
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 全内容をバイト列として取得
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.len());
        result.extend_from_slice(self.prefix_bytes());
        result.extend_from_slice(self.suffix_bytes());
        result
    }

    /// 全内容を文字列として取得（不正な UTF-8 は置換文字に変換）
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.to_bytes()).into_owned()
    }

    /// 指定範囲のバイト列を取得
    ///
    /// `pos` から最大 `len` バイトを返す。ドキュメント末尾で切り詰め、
    /// `pos` が論理長以上または `len == 0` の場合は空を返す。
    /// 要求範囲がギャップをまたぐ場合は両領域を継ぎ合わせる
    pub fn read_range(&self, pos: usize, len: usize) -> Vec<u8> {
        if pos >= self.len() || len == 0 {
            return Vec::new();
        }

        let end = pos.saturating_add(len).min(self.len());
        let actual_len = end - pos;
        let mut result = Vec::with_capacity(actual_len);

        if pos < self.gap_start {
            let before_gap = actual_len.min(self.gap_start - pos);
            result.extend_from_slice(&self.storage[pos..pos + before_gap]);

            if before_gap < actual_len {
                let after_gap = actual_len - before_gap;
                result.extend_from_slice(&self.storage[self.gap_end..self.gap_end + after_gap]);
            }
        } else {
            let physical = pos + self.gap_size();
            result.extend_from_slice(&self.storage[physical..physical + actual_len]);
        }

        result
    }

    /// 指定位置にバイト列を挿入
    ///
    /// ギャップを挿入位置へ移動し、不足時は倍々で物理バッファを拡張する。
    /// `pos` は `[0, len()]` に丸められる
    pub fn insert(&mut self, text: &[u8], pos: usize) {
        if text.is_empty() {
            return;
        }

        // 空バッファへの最初の挿入で物理バッファを確保
        if self.storage.is_empty() {
            let total_size = text.len() + GAP_SLACK;
            self.storage = vec![0; total_size];
            self.gap_start = 0;
            self.gap_end = total_size;
        }

        self.move_gap(pos);

        while text.len() > self.gap_size() {
            self.expand();
        }

        self.storage[self.gap_start..self.gap_start + text.len()].copy_from_slice(text);
        self.gap_start += text.len();

        self.rebuild_line_index();
    }

    /// 指定範囲を削除
    ///
    /// `start < end <= len()` を要求する。範囲外・空の範囲は黙って
    /// 無視する（呼び出し側が事前に検証する方針）。削除はギャップを
    /// `start` へ移動して `gap_end` を広げるだけで、データ移動を伴わない
    pub fn delete(&mut self, start: usize, end: usize) {
        if start >= end || start >= self.len() || end > self.len() {
            return;
        }

        self.move_gap(start);
        let delete_size = end - start;
        self.gap_end = (self.gap_end + delete_size).min(self.storage.len());

        self.rebuild_line_index();
    }

    /// ギャップを指定の論理位置へ移動
    ///
    /// `pos` は `[0, len()]` に丸める。移動は重なりを許す一括コピーで行う
    pub fn move_gap(&mut self, pos: usize) {
        if pos == self.gap_start {
            return;
        }

        let pos = pos.min(self.len());

        if pos < self.gap_start {
            // ギャップを左へ移動：[pos, gap_start) をギャップ終端の直前へ
            let move_size = self.gap_start - pos;
            self.storage
                .copy_within(pos..self.gap_start, self.gap_end - move_size);
            self.gap_start = pos;
            self.gap_end -= move_size;
        } else if pos > self.gap_start {
            // ギャップを右へ移動：ギャップ直後の move_size バイトを前へ
            let move_size = pos - self.gap_start;
            self.storage
                .copy_within(self.gap_end..self.gap_end + move_size, self.gap_start);
            self.gap_start += move_size;
            self.gap_end += move_size;
        }
    }

    /// 物理バッファを倍に拡張
    ///
    /// ギャップ前方の領域を新バッファの先頭へ、後方の領域を末尾へ
    /// （末尾からの距離を保って）コピーし、空いた中央を新しいギャップとする。
    /// ギャップ位置（`gap_start`）は変わらない
    fn expand(&mut self) {
        let old_size = self.storage.len();
        let new_size = old_size * 2;
        let after_gap_len = old_size - self.gap_end;
        let new_gap_end = new_size - after_gap_len;

        let mut new_storage = Vec::with_capacity(new_size);
        new_storage.extend_from_slice(&self.storage[..self.gap_start]);
        new_storage.resize(new_gap_end, 0);
        new_storage.extend_from_slice(&self.storage[self.gap_end..]);

        log::debug!("gap buffer expanded: {} -> {} bytes", old_size, new_size);

        self.storage = new_storage;
        self.gap_end = new_gap_end;
    }

    /// 行数を取得
    pub fn line_count(&self) -> usize {
        self.line_index.line_count()
    }

    /// 指定行のバイト範囲 `(開始位置, 長さ)` を取得
    ///
    /// 長さに行末の改行は含まない。`line_no` が行数以上なら `None`
    pub fn line_range(&self, line_no: usize) -> Option<(usize, usize)> {
        self.line_index.line_range(line_no, self.len())
    }

    /// 指定行の内容をバイト列として取得
    pub fn line_bytes(&self, line_no: usize) -> Option<Vec<u8>> {
        self.line_range(line_no)
            .map(|(start, len)| self.read_range(start, len))
    }

    /// 行開始位置のリストを取得
    pub fn line_starts(&self) -> &[usize] {
        self.line_index.starts()
    }

    fn rebuild_line_index(&mut self) {
        self.line_index.rebuild(
            &self.storage[..self.gap_start],
            &self.storage[self.gap_end..],
        );
    }
}

impl Default for GapBuffer {
    fn default() -> Self {
        Self::new()
    }
}
