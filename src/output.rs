use crate::tree::FileInfo;

/// CSS 片段的输出目标。
pub trait CssOutput {
    /// 追加一段已渲染的片段，可附带来源信息。
    fn add(&mut self, chunk: &str, file_info: Option<&FileInfo>, index: Option<usize>);

    /// 是否尚未写入任何片段。
    fn is_empty(&self) -> bool;
}

/// 把片段拼接为字符串的输出目标。
#[derive(Debug, Default)]
pub struct StringOutput {
    buffer: String,
    chunks: usize,
}

impl StringOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl CssOutput for StringOutput {
    fn add(&mut self, chunk: &str, _file_info: Option<&FileInfo>, _index: Option<usize>) {
        self.buffer.push_str(chunk);
        self.chunks += 1;
    }

    fn is_empty(&self) -> bool {
        self.chunks == 0
    }
}
