use super::{Comparable, Evaluable, GenCss, Node, NodeInfo};
use crate::context::EvalContext;
use crate::error::{LessError, LessResult};
use crate::output::CssOutput;
use std::cmp::Ordering;

/// 标识符，例如 `auto`、`solid`、`true`。
#[derive(Debug, Clone)]
pub struct Keyword {
    pub info: NodeInfo,
    pub value: String,
}

impl Keyword {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self {
            info: NodeInfo::default(),
            value: value.into(),
        }
    }
}

impl Evaluable for Keyword {
    fn eval(&self, _ctx: &mut EvalContext) -> LessResult<Node> {
        Ok(Node::Keyword(self.clone()))
    }
}

impl GenCss for Keyword {
    fn gen_css(&self, _ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        if self.value == "%" {
            return Err(LessError::syntax(
                "Invalid % without number",
                self.info.index(),
                self.info.file_info().map(|file| file.filename.clone()),
            ));
        }
        output.add(&self.value, self.info.file_info().as_deref(), Some(self.info.index()));
        Ok(())
    }
}

/// 原样输出的文本。
#[derive(Debug, Clone)]
pub struct Anonymous {
    pub info: NodeInfo,
    pub value: String,
    pub map_lines: bool,
    pub ruleset_like: bool,
}

impl Anonymous {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self {
            info: NodeInfo::default(),
            value: value.into(),
            map_lines: false,
            ruleset_like: false,
        }
    }

    pub fn ruleset_like(mut self, ruleset_like: bool) -> Self {
        self.ruleset_like = ruleset_like;
        self
    }
}

impl Evaluable for Anonymous {
    fn eval(&self, _ctx: &mut EvalContext) -> LessResult<Node> {
        Ok(Node::Anonymous(self.clone()))
    }
}

impl Comparable for Anonymous {
    fn compare(&self, other: &Node) -> Option<Ordering> {
        let ctx = EvalContext::default();
        let mine = self.to_css(&ctx).ok()?;
        let theirs = other.to_css(&ctx).ok()?;
        (mine == theirs).then_some(Ordering::Equal)
    }
}

impl GenCss for Anonymous {
    fn gen_css(&self, _ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        if !self.value.is_empty() {
            let index = self.map_lines.then(|| self.info.index());
            output.add(&self.value, self.info.file_info().as_deref(), index);
        }
        Ok(())
    }
}

/// `U+0025-00FF` 形式的 unicode-range 描述符，不参与求值。
#[derive(Debug, Clone)]
pub struct UnicodeDescriptor {
    pub info: NodeInfo,
    pub value: String,
}

impl UnicodeDescriptor {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self {
            info: NodeInfo::default(),
            value: value.into(),
        }
    }
}

impl GenCss for UnicodeDescriptor {
    fn gen_css(&self, _ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        output.add(&self.value, None, None);
        Ok(())
    }
}
