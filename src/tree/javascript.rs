use super::{Evaluable, GenCss, Node, NodeInfo};
use crate::context::EvalContext;
use crate::error::{LessError, LessResult};
use crate::output::CssOutput;

/// 内联脚本 `` `expr` ``。本实现不执行脚本，求值总是失败。
#[derive(Debug, Clone)]
pub struct JavaScript {
    pub info: NodeInfo,
    pub expression: String,
    pub escaped: bool,
}

impl JavaScript {
    pub fn new<S: Into<String>>(expression: S, escaped: bool) -> Self {
        Self {
            info: NodeInfo::default(),
            expression: expression.into(),
            escaped,
        }
    }

    fn unsupported(&self, ctx: &EvalContext) -> LessError {
        if ctx.javascript_enabled {
            LessError::Unsupported(format!(
                "evaluating inline JavaScript `{}` is not supported",
                self.expression
            ))
        } else {
            LessError::Unsupported(
                "inline JavaScript is not enabled. Is it set in your options?".to_string(),
            )
        }
    }
}

impl Evaluable for JavaScript {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        Err(self.unsupported(ctx))
    }
}

impl GenCss for JavaScript {
    fn gen_css(&self, ctx: &EvalContext, _output: &mut dyn CssOutput) -> LessResult<()> {
        Err(self.unsupported(ctx))
    }
}
