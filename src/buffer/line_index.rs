//! 行索引
//!
//! ドキュメント内容から導出される行開始位置の索引。
//! 増分更新は行わず、内容変更のたびに全走査で再構築する。
//! 再構築コストはドキュメント長に線形で、エディタが扱う
//! 通常のファイルサイズでは十分軽い

/// 行開始位置の索引
///
/// 先頭行の 0 を必ず含む昇順の論理バイト位置列を保持する。
/// 位置 `i > 0` が行開始となるのは論理位置 `i - 1` が改行（LF）の場合。
/// 内容変更後、次の `rebuild` までは古い状態のままである点に注意
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    /// 空ドキュメント相当の索引を作成
    pub fn new() -> Self {
        Self { starts: vec![0] }
    }

    /// ギャップ前後の 2 領域を走査して索引を再構築
    ///
    /// 後方領域の物理位置は `prefix.len()` を足して論理位置へ変換する
    pub fn rebuild(&mut self, prefix: &[u8], suffix: &[u8]) {
        self.starts.clear();
        self.starts.push(0);

        for (i, &byte) in prefix.iter().enumerate() {
            if byte == b'\n' {
                self.starts.push(i + 1);
            }
        }

        let prefix_len = prefix.len();
        for (i, &byte) in suffix.iter().enumerate() {
            if byte == b'\n' {
                self.starts.push(prefix_len + i + 1);
            }
        }
    }

    /// 行数を取得
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// 指定行のバイト範囲 `(開始位置, 長さ)` を取得
    ///
    /// 行末は次の行開始の直前（改行の手前）、最終行はドキュメント末尾。
    /// 長さに行末の改行は含まない。`line_no` が行数以上なら `None`
    pub fn line_range(&self, line_no: usize, doc_len: usize) -> Option<(usize, usize)> {
        if line_no >= self.starts.len() {
            return None;
        }

        let start = self.starts[line_no];
        let end = if line_no + 1 < self.starts.len() {
            self.starts[line_no + 1] - 1
        } else {
            doc_len
        };

        Some((start, end - start))
    }

    /// 行開始位置のリストを取得
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}
