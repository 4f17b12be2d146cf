use super::{Evaluable, GenCss, Node, NodeInfo};
use crate::context::EvalContext;
use crate::error::LessResult;
use crate::function_caller::FunctionCaller;
use crate::output::CssOutput;

/// 函数调用 `name(args)`。未注册的函数按普通 CSS 函数原样输出。
#[derive(Debug, Clone)]
pub struct Call {
    pub info: NodeInfo,
    pub name: String,
    pub args: Vec<Node>,
    /// `calc()` 内部不做算术。
    pub calc: bool,
}

impl Call {
    pub fn new<S: Into<String>>(name: S, args: Vec<Node>) -> Self {
        let name = name.into();
        Self {
            info: NodeInfo::default(),
            calc: name.eq_ignore_ascii_case("calc"),
            name,
            args,
        }
    }

    fn eval_inner(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        let caller = FunctionCaller::new(
            &self.name,
            Some(&*ctx),
            self.info.index(),
            self.info.file_info(),
        )?;
        if caller.is_valid() {
            return caller.call(ctx, &self.args);
        }

        let args = self
            .args
            .iter()
            .map(|arg| arg.eval(ctx))
            .collect::<LessResult<Vec<_>>>()?;
        Ok(Node::Call(Call {
            info: self.info.clone(),
            name: self.name.clone(),
            args,
            calc: self.calc,
        }))
    }
}

impl Evaluable for Call {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        let math_on = ctx.math_on;
        let in_calc = ctx.in_calc;
        ctx.math_on = !self.calc;
        if self.calc {
            ctx.in_calc = true;
        }

        let result = self.eval_inner(ctx);

        ctx.math_on = math_on;
        ctx.in_calc = in_calc;
        result
    }
}

impl GenCss for Call {
    fn gen_css(&self, ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        output.add(
            &format!("{}(", self.name),
            self.info.file_info().as_deref(),
            Some(self.info.index()),
        );
        let separator = if ctx.compress { "," } else { ", " };
        for (idx, arg) in self.args.iter().enumerate() {
            arg.gen_css(ctx, output)?;
            if idx + 1 < self.args.len() {
                output.add(separator, None, None);
            }
        }
        output.add(")", None, None);
        Ok(())
    }
}
