use super::{DetachedRuleset, Evaluable, GenCss, Node, NodeInfo};
use crate::context::EvalContext;
use crate::error::{LessError, LessResult};
use crate::output::CssOutput;

/// 变量引用 `@name`，以及间接引用 `@@name`。
#[derive(Debug, Clone)]
pub struct Variable {
    pub info: NodeInfo,
    pub name: String,
}

impl Variable {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            info: NodeInfo::default(),
            name: name.into(),
        }
    }

    pub fn with_info(mut self, info: NodeInfo) -> Self {
        self.info = info;
        self
    }

    /// `@@name` 先求出 `@name` 的文本，再以它作为变量名。
    fn resolve_name(&self, ctx: &mut EvalContext) -> LessResult<String> {
        let Some(indirect) = self.name.strip_prefix("@@") else {
            return Ok(self.name.clone());
        };
        let inner = Variable::new(format!("@{indirect}"))
            .with_info(self.info.clone())
            .eval(ctx)?;
        let text = match inner {
            Node::Quoted(quoted) => quoted.value,
            Node::Keyword(keyword) => keyword.value,
            Node::Anonymous(anonymous) => anonymous.value,
            other => other.to_css(ctx)?,
        };
        Ok(format!("@{text}"))
    }

    /// 从最近的帧向外查找声明，并在声明所在的作用域里对其值求值。
    fn lookup(&self, ctx: &mut EvalContext, name: &str) -> LessResult<Node> {
        let frames = ctx.frames.clone();
        for (depth, frame) in frames.iter().enumerate() {
            let found = frame.rules().iter().rev().find_map(|rule| match rule {
                Node::Declaration(declaration)
                    if declaration.variable && declaration.name_text() == Some(name) =>
                {
                    Some(declaration)
                }
                _ => None,
            });
            let Some(declaration) = found else {
                continue;
            };

            if !declaration.important.is_empty() {
                if let Some(scope) = ctx.important_scope.last_mut() {
                    scope.important = Some(declaration.important.clone());
                }
            }
            let mut scope = frames[depth..].to_vec();
            if scope[0].functions.is_none() {
                scope[0].functions = ctx.functions();
            }
            let caller_frames = std::mem::replace(&mut ctx.frames, scope);
            let result = declaration.value.eval(ctx);
            ctx.frames = caller_frames;
            return result;
        }
        Err(LessError::eval(format!("variable {name} is undefined")))
    }
}

impl Evaluable for Variable {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        let name = self.resolve_name(ctx)?;
        if ctx.is_evaluating_variable(&name) {
            return Err(LessError::eval(format!(
                "Recursive variable definition for {name}"
            )));
        }

        ctx.push_variable(&name);
        let result = self.lookup(ctx, &name);
        ctx.pop_variable();
        result
    }
}

impl GenCss for Variable {
    fn gen_css(&self, _ctx: &EvalContext, _output: &mut dyn CssOutput) -> LessResult<()> {
        Ok(())
    }
}

/// 分离规则集的调用点 `@detached();`。
#[derive(Debug, Clone)]
pub struct VariableCall {
    pub info: NodeInfo,
    pub variable: String,
}

impl VariableCall {
    pub fn new<S: Into<String>>(variable: S) -> Self {
        Self {
            info: NodeInfo::default(),
            variable: variable.into(),
        }
    }
}

impl Evaluable for VariableCall {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        let resolved = Variable::new(self.variable.clone())
            .with_info(self.info.clone())
            .eval(ctx)?;
        let detached = match resolved {
            Node::DetachedRuleset(detached) => detached,
            Node::Ruleset(ruleset) => DetachedRuleset::new(Some(ruleset))?,
            _ => {
                return Err(LessError::eval(format!(
                    "Could not evaluate variable call {}",
                    self.variable
                )))
            }
        };
        detached.call_eval(ctx)?.ok_or_else(|| {
            LessError::eval(format!("Could not evaluate variable call {}", self.variable))
        })
    }
}

impl GenCss for VariableCall {
    fn gen_css(&self, _ctx: &EvalContext, _output: &mut dyn CssOutput) -> LessResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Frame, ImportantScope};
    use crate::tree::{Declaration, Dimension, Keyword, Ruleset};
    use std::rc::Rc;

    fn scope(rules: Vec<Node>) -> EvalContext {
        let mut ctx = EvalContext::default();
        ctx.push_frame(Frame::ruleset(Rc::new(Ruleset::new(Vec::new(), rules)), None));
        ctx
    }

    #[test]
    fn later_declaration_wins() {
        let mut ctx = scope(vec![
            Declaration::new("@gap", Dimension::new(1.0, "px").unwrap()).unwrap().into(),
            Declaration::new("@gap", Dimension::new(2.0, "px").unwrap()).unwrap().into(),
        ]);
        let value = Variable::new("@gap").eval(&mut ctx).unwrap();
        assert_eq!(value.to_css(&ctx).unwrap(), "2px");
    }

    #[test]
    fn inner_frame_shadows_outer() {
        let mut ctx = scope(vec![Declaration::new("@c", Keyword::new("outer"))
            .unwrap()
            .into()]);
        ctx.push_frame(Frame::ruleset(
            Rc::new(Ruleset::new(
                Vec::new(),
                vec![Declaration::new("@c", Keyword::new("inner")).unwrap().into()],
            )),
            None,
        ));
        let value = Variable::new("@c").eval(&mut ctx).unwrap();
        assert_eq!(value.to_css(&ctx).unwrap(), "inner");
    }

    #[test]
    fn value_is_evaluated_where_it_was_declared() {
        let mut ctx = scope(vec![
            Declaration::new("@c", Keyword::new("outer")).unwrap().into(),
            Declaration::new("@v", Variable::new("@c")).unwrap().into(),
        ]);
        ctx.push_frame(Frame::ruleset(
            Rc::new(Ruleset::new(
                Vec::new(),
                vec![Declaration::new("@c", Keyword::new("inner")).unwrap().into()],
            )),
            None,
        ));
        let value = Variable::new("@v").eval(&mut ctx).unwrap();
        assert_eq!(value.to_css(&ctx).unwrap(), "outer");
        assert_eq!(ctx.frames.len(), 2);
    }

    #[test]
    fn indirect_lookup() {
        let mut ctx = scope(vec![
            Declaration::new("@primary", Keyword::new("blue")).unwrap().into(),
            Declaration::new("@which", Keyword::new("primary")).unwrap().into(),
        ]);
        let value = Variable::new("@@which").eval(&mut ctx).unwrap();
        assert_eq!(value.to_css(&ctx).unwrap(), "blue");
    }

    #[test]
    fn undefined_and_recursive_variables_fail() {
        let mut ctx = scope(vec![Declaration::new("@a", Variable::new("@a"))
            .unwrap()
            .into()]);
        let err = Variable::new("@missing").eval(&mut ctx).unwrap_err();
        assert!(err.to_string().contains("@missing is undefined"));
        let err = Variable::new("@a").eval(&mut ctx).unwrap_err();
        assert!(err.to_string().contains("Recursive variable definition for @a"));
    }

    #[test]
    fn deposits_important_marker() {
        let mut ctx = scope(vec![Declaration::new("@w", Keyword::new("bold"))
            .unwrap()
            .with_important("!important")
            .into()]);
        ctx.important_scope.push(ImportantScope::default());
        Variable::new("@w").eval(&mut ctx).unwrap();
        assert_eq!(
            ctx.important_scope.pop().unwrap().important.as_deref(),
            Some(" !important")
        );
    }

    #[test]
    fn variable_call_requires_detached_ruleset() {
        let mut ctx = scope(vec![Declaration::new("@x", Keyword::new("nope"))
            .unwrap()
            .into()]);
        let err = VariableCall::new("@x").eval(&mut ctx).unwrap_err();
        assert!(err.to_string().contains("Could not evaluate variable call @x"));
    }
}
