use super::{Comparable, Evaluable, GenCss, Node, NodeInfo, Variable};
use crate::context::EvalContext;
use crate::error::LessResult;
use crate::output::CssOutput;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::cmp::Ordering;

static VARIABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@\{([\w-]+)\}").expect("字符串插值正则编译失败"));

/// 带引号的字符串；`escaped` 为真时（`~"..."`）输出不带引号。
#[derive(Debug, Clone)]
pub struct Quoted {
    pub info: NodeInfo,
    pub quote: char,
    pub value: String,
    pub escaped: bool,
}

impl Quoted {
    pub fn new<S: Into<String>>(quote: char, value: S, escaped: bool) -> Self {
        Self {
            info: NodeInfo::default(),
            quote,
            value: value.into(),
            escaped,
        }
    }

    /// 反复替换 `@{name}`，直到文本不再变化。
    fn interpolate(&self, ctx: &mut EvalContext) -> LessResult<String> {
        let mut value = self.value.clone();
        loop {
            let mut failure = None;
            let replaced = VARIABLE_RE.replace_all(&value, |caps: &Captures| {
                match self.resolve(ctx, &caps[1]) {
                    Ok(text) => text,
                    Err(err) => {
                        failure.get_or_insert(err);
                        String::new()
                    }
                }
            });
            if let Some(err) = failure {
                return Err(err);
            }
            if replaced == value {
                return Ok(value);
            }
            value = replaced.into_owned();
        }
    }

    fn resolve(&self, ctx: &mut EvalContext, name: &str) -> LessResult<String> {
        let variable = Variable::new(format!("@{name}")).with_info(self.info.clone());
        match variable.eval(ctx)? {
            Node::Quoted(quoted) => Ok(quoted.value),
            other => other.to_css(ctx),
        }
    }
}

impl Evaluable for Quoted {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        let value = self.interpolate(ctx)?;
        Ok(Node::Quoted(Quoted {
            info: self.info.clone(),
            quote: self.quote,
            value,
            escaped: self.escaped,
        }))
    }
}

impl Comparable for Quoted {
    fn compare(&self, other: &Node) -> Option<Ordering> {
        if let Node::Quoted(other) = other {
            if !self.escaped && !other.escaped {
                return Some(self.value.cmp(&other.value));
            }
        }
        let ctx = EvalContext::default();
        let mine = self.to_css(&ctx).ok()?;
        let theirs = other.to_css(&ctx).ok()?;
        (mine == theirs).then_some(Ordering::Equal)
    }
}

impl GenCss for Quoted {
    fn gen_css(&self, _ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        let quote = self.quote.to_string();
        if !self.escaped {
            output.add(&quote, self.info.file_info().as_deref(), Some(self.info.index()));
        }
        output.add(&self.value, None, None);
        if !self.escaped {
            output.add(&quote, None, None);
        }
        Ok(())
    }
}
