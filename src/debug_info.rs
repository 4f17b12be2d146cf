//! 行号调试信息：以注释或 `-sass-debug-info` 媒体查询的形式输出来源位置。

use crate::context::{DumpLineNumbers, EvalContext};
use once_cell::sync::Lazy;
use regex::Regex;

static PROTOCOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z]+://").expect("协议前缀正则编译失败"));

/// 节点在源文件中的位置。
#[derive(Debug, Clone, PartialEq)]
pub struct DebugInfo {
    pub line_number: i64,
    pub file_name: String,
}

impl DebugInfo {
    pub fn new<S: Into<String>>(line_number: i64, file_name: S) -> Self {
        Self {
            line_number,
            file_name: file_name.into(),
        }
    }
}

/// 按上下文的输出方式生成调试信息；压缩输出或未开启时为空串。
pub fn debug_info(ctx: &EvalContext, info: &DebugInfo, line_separator: &str) -> String {
    if ctx.compress {
        return String::new();
    }
    match ctx.dump_line_numbers {
        Some(DumpLineNumbers::Comments) => as_comment(info),
        Some(DumpLineNumbers::MediaQuery) => as_media_query(info),
        Some(DumpLineNumbers::All) => {
            format!("{}{line_separator}{}", as_comment(info), as_media_query(info))
        }
        None => String::new(),
    }
}

pub fn as_comment(info: &DebugInfo) -> String {
    format!("/* line {}, {} */\n", info.line_number, info.file_name)
}

pub fn as_media_query(info: &DebugInfo) -> String {
    let with_protocol = if PROTOCOL_RE.is_match(&info.file_name) {
        info.file_name.clone()
    } else {
        format!("file://{}", info.file_name)
    };

    let mut escaped = String::with_capacity(with_protocol.len() * 2);
    for ch in with_protocol.chars() {
        match ch {
            '.' | ':' | '/' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '\\' => escaped.push_str("\\/"),
            _ => escaped.push(ch),
        }
    }

    format!(
        "@media -sass-debug-info{{filename{{font-family:{escaped}}}line{{font-family:\\00003{}}}}}\n",
        info.line_number
    )
}
