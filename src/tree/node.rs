//! 节点公共信息（来源位置、父链接、可见性）与求值 / 输出 / 比较三类能力接口。

use super::{Keyword, Node};
use crate::context::EvalContext;
use crate::error::{LessError, LessResult};
use crate::output::{CssOutput, StringOutput};
use once_cell::sync::{Lazy, OnceCell};
use std::cmp::Ordering;
use std::sync::{Arc, Weak};

/// 节点所在源文件的信息。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileInfo {
    pub filename: String,
    pub current_directory: String,
    pub root_filename: String,
}

impl FileInfo {
    pub fn new<S: Into<String>>(filename: S) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }
}

/// 来源记录。父链接只写一次，并且是弱引用。
#[derive(Debug, Default)]
struct Origin {
    index: usize,
    file_info: Option<Arc<FileInfo>>,
    parent: OnceCell<Weak<Origin>>,
}

impl Origin {
    fn parent(&self) -> Option<Arc<Origin>> {
        self.parent.get().and_then(Weak::upgrade)
    }

    fn index(&self) -> usize {
        if self.index != 0 {
            return self.index;
        }
        self.parent().map(|parent| parent.index()).unwrap_or(0)
    }

    fn file_info(&self) -> Option<Arc<FileInfo>> {
        self.file_info
            .clone()
            .or_else(|| self.parent().and_then(|parent| parent.file_info()))
    }
}

/// 每个节点都携带的公共字段。
///
/// `index` 为 0 表示未设置，此时沿父链接向上查找。克隆得到的节点没有父链接，
/// 但会保留克隆时的有效位置与文件信息。
#[derive(Debug, Default)]
pub struct NodeInfo {
    origin: Arc<Origin>,
    visibility_blocks: Option<u32>,
    node_visible: Option<bool>,
}

impl Clone for NodeInfo {
    fn clone(&self) -> Self {
        Self {
            origin: Arc::new(Origin {
                index: self.index(),
                file_info: self.file_info(),
                parent: OnceCell::new(),
            }),
            visibility_blocks: self.visibility_blocks,
            node_visible: self.node_visible,
        }
    }
}

impl NodeInfo {
    pub fn new(index: usize, file_info: Option<Arc<FileInfo>>) -> Self {
        Self {
            origin: Arc::new(Origin {
                index,
                file_info,
                parent: OnceCell::new(),
            }),
            ..Self::default()
        }
    }

    pub fn index(&self) -> usize {
        self.origin.index()
    }

    pub fn file_info(&self) -> Option<Arc<FileInfo>> {
        self.origin.file_info()
    }

    /// 是否已经设置过父节点（父节点被释放后仍然视为已设置）。
    pub fn has_parent(&self) -> bool {
        self.origin.parent.get().is_some()
    }

    /// 把 `parent` 设为父节点。一个节点只能挂到一个父节点下，且不能挂到自己的后代上。
    pub fn set_parent(&self, parent: &NodeInfo) -> LessResult<()> {
        let mut cursor = Some(parent.origin.clone());
        while let Some(current) = cursor {
            if Arc::ptr_eq(&current, &self.origin) {
                return Err(LessError::eval("节点不能成为自身或祖先节点的子节点"));
            }
            cursor = current.parent();
        }
        self.origin
            .parent
            .set(Arc::downgrade(&parent.origin))
            .map_err(|_| LessError::eval("节点已经拥有父节点"))
    }

    pub fn blocks_visibility(&self) -> bool {
        self.visibility_blocks.unwrap_or(0) != 0
    }

    pub fn add_visibility_block(&mut self) {
        self.visibility_blocks = Some(self.visibility_blocks.unwrap_or(0) + 1);
    }

    pub fn remove_visibility_block(&mut self) {
        self.visibility_blocks = Some(self.visibility_blocks.unwrap_or(0).saturating_sub(1));
    }

    /// 强制可见。
    pub fn ensure_visibility(&mut self) {
        self.node_visible = Some(true);
    }

    pub fn ensure_invisibility(&mut self) {
        self.node_visible = Some(false);
    }

    pub fn is_visible(&self) -> Option<bool> {
        self.node_visible
    }

    pub fn visibility_info(&self) -> (Option<u32>, Option<bool>) {
        (self.visibility_blocks, self.node_visible)
    }

    pub fn copy_visibility_info(&mut self, other: &NodeInfo) {
        self.visibility_blocks = other.visibility_blocks;
        self.node_visible = other.node_visible;
    }
}

/// 可以在上下文中求值的节点。默认约定：返回新实例，不修改自身。
pub trait Evaluable {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node>;
}

/// 可以输出 CSS 的节点。
pub trait GenCss {
    fn gen_css(&self, ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()>;

    fn to_css(&self, ctx: &EvalContext) -> LessResult<String> {
        let mut output = StringOutput::new();
        self.gen_css(ctx, &mut output)?;
        Ok(output.into_string())
    }
}

/// 具备自定义比较规则的节点；`None` 表示不可比较。
pub trait Comparable {
    fn compare(&self, other: &Node) -> Option<Ordering>;
}

/// 遍历节点树的访问者，可以原地替换被访问的节点。
pub trait Visitor {
    fn visit(&mut self, node: &mut Node);
}

/// 基础四则运算。
pub fn operate(op: &str, a: f64, b: f64) -> LessResult<f64> {
    match op {
        "+" => Ok(a + b),
        "-" => Ok(a - b),
        "*" => Ok(a * b),
        "/" | "./" => Ok(a / b),
        _ => Err(LessError::eval(format!("未知的运算符: {op}"))),
    }
}

pub static KEYWORD_TRUE: Lazy<Keyword> = Lazy::new(|| Keyword::new("true"));
pub static KEYWORD_FALSE: Lazy<Keyword> = Lazy::new(|| Keyword::new("false"));

/// 返回 `true` / `false` 关键字节点。
pub fn keyword_bool(value: bool) -> Node {
    let keyword: &Keyword = if value { &KEYWORD_TRUE } else { &KEYWORD_FALSE };
    Node::Keyword(keyword.clone())
}
