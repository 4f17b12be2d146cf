use super::{keyword_bool, Evaluable, GenCss, Node, NodeInfo};
use crate::compare::compare;
use crate::context::EvalContext;
use crate::error::LessResult;
use crate::output::CssOutput;
use std::cmp::Ordering;

/// 守卫条件 `a op b`，可取反。
#[derive(Debug, Clone)]
pub struct Condition {
    pub info: NodeInfo,
    pub op: String,
    pub lvalue: Box<Node>,
    pub rvalue: Box<Node>,
    pub negate: bool,
}

impl Condition {
    pub fn new(op: &str, lvalue: impl Into<Node>, rvalue: impl Into<Node>, negate: bool) -> Self {
        Self {
            info: NodeInfo::default(),
            op: op.trim().to_string(),
            lvalue: Box::new(lvalue.into()),
            rvalue: Box::new(rvalue.into()),
            negate,
        }
    }

    fn holds(&self, a: &Node, b: &Node) -> bool {
        match self.op.as_str() {
            "and" => a.as_bool() == Some(true) && b.as_bool() == Some(true),
            "or" => a.as_bool() == Some(true) || b.as_bool() == Some(true),
            op => {
                let Some(ordering) = compare(a, b) else {
                    return false;
                };
                match op {
                    "<" => ordering == Ordering::Less,
                    "=" => ordering == Ordering::Equal,
                    ">" => ordering == Ordering::Greater,
                    "<=" | "=<" => ordering != Ordering::Greater,
                    ">=" => ordering != Ordering::Less,
                    _ => false,
                }
            }
        }
    }
}

impl Evaluable for Condition {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        let a = self.lvalue.eval(ctx)?;
        let b = self.rvalue.eval(ctx)?;
        let result = self.holds(&a, &b) != self.negate;
        log::debug!(
            target: "less_tree",
            "条件 {} {} {} => {}",
            a.type_name(),
            self.op,
            b.type_name(),
            result
        );
        Ok(keyword_bool(result))
    }
}

impl GenCss for Condition {
    fn gen_css(&self, _ctx: &EvalContext, _output: &mut dyn CssOutput) -> LessResult<()> {
        Ok(())
    }
}
