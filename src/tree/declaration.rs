//! 属性声明与变量声明。

use super::{Evaluable, GenCss, Node, NodeInfo, Value, Visitor};
use crate::context::{EvalContext, ImportantScope, MathMode};
use crate::debug_info::{debug_info, DebugInfo};
use crate::error::{LessError, LessResult};
use crate::output::CssOutput;

/// 声明名称：普通文本，或由多段组成的插值名称（如 `@{prefix}-color`）。
#[derive(Debug, Clone)]
pub enum DeclarationName {
    Literal(String),
    Interpolated(Vec<Node>),
}

impl From<&str> for DeclarationName {
    fn from(value: &str) -> Self {
        DeclarationName::Literal(value.to_string())
    }
}

impl From<String> for DeclarationName {
    fn from(value: String) -> Self {
        DeclarationName::Literal(value)
    }
}

impl From<Vec<Node>> for DeclarationName {
    fn from(parts: Vec<Node>) -> Self {
        DeclarationName::Interpolated(parts)
    }
}

#[derive(Debug, Clone)]
pub struct Declaration {
    pub info: NodeInfo,
    pub name: DeclarationName,
    /// 总是 `Value` 容器。
    pub value: Box<Node>,
    /// 空串或 `" !important"`。
    pub important: String,
    pub merge: Option<String>,
    pub inline: bool,
    pub variable: bool,
    pub debug_info: Option<DebugInfo>,
}

fn wrap_value(value: Node) -> Node {
    match value {
        Node::Value(_) => value,
        other => Node::Value(Value::new(vec![other])),
    }
}

fn important_marker(marker: &str) -> String {
    let marker = marker.trim();
    if marker.is_empty() {
        String::new()
    } else {
        format!(" {marker}")
    }
}

impl Declaration {
    /// 以 `@` 开头的普通名称视为变量声明。
    pub fn new(name: impl Into<DeclarationName>, value: impl Into<Node>) -> LessResult<Self> {
        let name = name.into();
        let variable = match &name {
            DeclarationName::Literal(text) if text.is_empty() => {
                return Err(LessError::eval("声明名称不能为空"));
            }
            DeclarationName::Literal(text) => text.starts_with('@'),
            DeclarationName::Interpolated(parts) if parts.is_empty() => {
                return Err(LessError::eval("声明名称不能为空"));
            }
            DeclarationName::Interpolated(_) => false,
        };
        Ok(Self {
            info: NodeInfo::default(),
            name,
            value: Box::new(wrap_value(value.into())),
            important: String::new(),
            merge: None,
            inline: false,
            variable,
            debug_info: None,
        })
    }

    pub fn with_important(mut self, marker: &str) -> Self {
        self.important = important_marker(marker);
        self
    }

    pub fn with_merge(mut self, merge: &str) -> Self {
        self.merge = Some(merge.to_string());
        self
    }

    pub fn with_inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    pub fn with_variable(mut self, variable: bool) -> Self {
        self.variable = variable;
        self
    }

    pub fn with_info(mut self, info: NodeInfo) -> Self {
        self.info = info;
        self
    }

    pub fn with_debug_info(mut self, debug_info: DebugInfo) -> Self {
        self.debug_info = Some(debug_info);
        self
    }

    /// 普通名称的文本；插值名称返回 `None`。
    pub fn name_text(&self) -> Option<&str> {
        match &self.name {
            DeclarationName::Literal(name) => Some(name),
            DeclarationName::Interpolated(_) => None,
        }
    }

    /// 强制 `!important`，不受 important 作用域影响。
    pub fn make_important(&self) -> Declaration {
        Declaration {
            important: important_marker("!important"),
            ..self.clone()
        }
    }

    fn resolve_name(&self, ctx: &mut EvalContext) -> LessResult<(String, bool)> {
        let parts = match &self.name {
            DeclarationName::Literal(name) => return Ok((name.clone(), self.variable)),
            DeclarationName::Interpolated(parts) => parts,
        };
        if let [Node::Keyword(keyword)] = parts.as_slice() {
            return Ok((keyword.value.clone(), false));
        }

        let mut name = String::new();
        for part in parts {
            match part {
                Node::Keyword(keyword) => name.push_str(&keyword.value),
                Node::Anonymous(anonymous) => name.push_str(&anonymous.value),
                other => {
                    let evaluated = other.eval(ctx)?;
                    name.push_str(&evaluated.to_css(ctx)?);
                }
            }
        }
        Ok((name, false))
    }

    fn name_css(&self, ctx: &EvalContext) -> LessResult<String> {
        match &self.name {
            DeclarationName::Literal(name) => Ok(name.clone()),
            DeclarationName::Interpolated(parts) => parts
                .iter()
                .map(|part| part.to_css(ctx))
                .collect::<LessResult<Vec<_>>>()
                .map(|parts| parts.concat()),
        }
    }

    pub(crate) fn accept(&mut self, visitor: &mut dyn Visitor) {
        if let DeclarationName::Interpolated(parts) = &mut self.name {
            parts.iter_mut().for_each(|part| visitor.visit(part));
        }
        visitor.visit(&mut self.value);
    }
}

impl Evaluable for Declaration {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        let (name, variable) = self.resolve_name(ctx)?;

        let math = ctx.math;
        if name == "font" && math == MathMode::Always {
            log::debug!(target: "less_tree", "font shorthand evaluated with parens-division math");
            ctx.math = MathMode::ParensDivision;
        }

        ctx.important_scope.push(ImportantScope::default());
        let evaluated = self.value.eval(ctx);
        let scope = ctx.important_scope.pop().unwrap_or_default();
        ctx.math = math;
        let evaluated = evaluated?;

        if !variable && matches!(evaluated, Node::DetachedRuleset(_)) {
            return Err(LessError::syntax(
                "Rulesets cannot be evaluated on a property.",
                self.info.index(),
                self.info.file_info().map(|file| file.filename.clone()),
            ));
        }

        let important = match scope.important {
            Some(marker) => important_marker(&marker),
            None => self.important.clone(),
        };

        Ok(Node::Declaration(Declaration {
            info: self.info.clone(),
            name: DeclarationName::Literal(name),
            value: Box::new(wrap_value(evaluated)),
            important,
            merge: self.merge.clone(),
            inline: self.inline,
            variable,
            debug_info: self.debug_info.clone(),
        }))
    }
}

impl GenCss for Declaration {
    fn gen_css(&self, ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        let file_info = self.info.file_info();
        let index = self.info.index();

        if let Some(info) = &self.debug_info {
            let prefix = debug_info(ctx, info, "");
            if !prefix.is_empty() {
                output.add(&prefix, file_info.as_deref(), Some(index));
            }
        }

        let separator = if ctx.compress { ":" } else { ": " };
        let name = self.name_css(ctx)?;
        output.add(&format!("{name}{separator}"), file_info.as_deref(), Some(index));

        self.value.gen_css(ctx, output).map_err(|err| match err {
            LessError::Syntax { message, .. } => LessError::Syntax {
                message,
                index,
                filename: file_info.as_ref().map(|file| file.filename.clone()),
            },
            other => other,
        })?;

        let terminator = if self.inline || (ctx.compress && ctx.last_rule.get()) {
            ""
        } else {
            ";"
        };
        output.add(
            &format!("{}{terminator}", self.important),
            file_info.as_deref(),
            Some(index),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DumpLineNumbers, Frame};
    use crate::tree::{
        Anonymous, DetachedRuleset, Dimension, Expression, Keyword, Operation, Ruleset, Variable,
    };
    use std::rc::Rc;

    fn px(value: f64) -> Node {
        Dimension::new(value, "px").unwrap().into()
    }

    fn evaluated(node: Node) -> Declaration {
        match node {
            Node::Declaration(declaration) => declaration,
            other => panic!("expected declaration, got {}", other.type_name()),
        }
    }

    #[test]
    fn construction_detects_variables_and_wraps_value() {
        let variable = Declaration::new("@gap", px(4.0)).unwrap();
        assert!(variable.variable);
        assert!(matches!(*variable.value, Node::Value(_)));

        let property = Declaration::new("margin", px(4.0)).unwrap();
        assert!(!property.variable);
        assert!(Declaration::new("", px(1.0)).is_err());
    }

    #[test]
    fn renders_pretty_and_compressed() {
        let mut ctx = EvalContext::default();
        let declaration = Declaration::new("margin", px(4.0))
            .unwrap()
            .with_important("!important");
        assert_eq!(declaration.to_css(&ctx).unwrap(), "margin: 4px !important;");

        ctx.compress = true;
        assert_eq!(declaration.to_css(&ctx).unwrap(), "margin:4px !important;");
        ctx.last_rule.set(true);
        assert_eq!(declaration.to_css(&ctx).unwrap(), "margin:4px !important");

        let inline = Declaration::new("color", Keyword::new("red"))
            .unwrap()
            .with_inline(true);
        assert_eq!(inline.to_css(&EvalContext::default()).unwrap(), "color: red");
    }

    #[test]
    fn interpolated_names_are_never_variables() {
        let mut ctx = EvalContext::default();
        let single = Declaration::new(vec![Keyword::new("@odd").into()], px(1.0))
            .unwrap()
            .with_variable(true);
        let result = evaluated(single.eval(&mut ctx).unwrap());
        assert_eq!(result.name_text(), Some("@odd"));
        assert!(!result.variable);

        let parts: Vec<Node> = vec![
            Keyword::new("border").into(),
            Anonymous::new("-").into(),
            Keyword::new("width").into(),
        ];
        let result = evaluated(Declaration::new(parts, px(1.0)).unwrap().eval(&mut ctx).unwrap());
        assert_eq!(result.name_text(), Some("border-width"));
        assert!(!result.variable);
    }

    #[test]
    fn font_keeps_slash_under_always_math() {
        let mut ctx = EvalContext::default();
        ctx.math = MathMode::Always;
        let ratio = || {
            Node::from(Expression::new(
                vec![Operation::new("/", px(12.0), Dimension::new(1.5, "").unwrap().into(), false)
                    .into()],
                false,
            ))
        };

        let font = evaluated(Declaration::new("font", ratio()).unwrap().eval(&mut ctx).unwrap());
        assert_eq!(font.to_css(&ctx).unwrap(), "font: 12px/1.5;");
        assert_eq!(ctx.math, MathMode::Always);

        let width = evaluated(Declaration::new("width", ratio()).unwrap().eval(&mut ctx).unwrap());
        assert_eq!(width.to_css(&ctx).unwrap(), "width: 8px;");
    }

    #[test]
    fn property_cannot_hold_a_ruleset() {
        let mut ctx = EvalContext::default();
        let body = Rc::new(Ruleset::new(Vec::new(), Vec::new()));
        let detached = DetachedRuleset::new(Some(body)).unwrap();

        let err = Declaration::new("color", detached.clone())
            .unwrap()
            .eval(&mut ctx)
            .unwrap_err();
        assert!(matches!(err, LessError::Syntax { ref message, .. } if message == "Rulesets cannot be evaluated on a property."));
        assert!(ctx.important_scope.is_empty());

        assert!(Declaration::new("@rules", detached).unwrap().eval(&mut ctx).is_ok());
    }

    #[test]
    fn important_from_nested_scope_overrides() {
        let rules = vec![Declaration::new("@w", Keyword::new("bold"))
            .unwrap()
            .with_important("!important")
            .into()];
        let mut ctx = EvalContext::default();
        ctx.push_frame(Frame::ruleset(Rc::new(Ruleset::new(Vec::new(), rules)), None));

        let result = evaluated(
            Declaration::new("font-weight", Variable::new("@w"))
                .unwrap()
                .eval(&mut ctx)
                .unwrap(),
        );
        assert_eq!(result.important, " !important");
        assert_eq!(result.to_css(&ctx).unwrap(), "font-weight: bold !important;");
    }

    #[test]
    fn make_important_forces_marker() {
        let declaration = Declaration::new("color", Keyword::new("red")).unwrap();
        let important = declaration.make_important();
        assert_eq!(important.important, " !important");
        assert!(declaration.important.is_empty());
    }

    #[test]
    fn debug_info_prefix() {
        let mut ctx = EvalContext::default();
        ctx.dump_line_numbers = Some(DumpLineNumbers::Comments);
        let declaration = Declaration::new("color", Keyword::new("red"))
            .unwrap()
            .with_debug_info(DebugInfo::new(7, "a.less"));
        assert_eq!(
            declaration.to_css(&ctx).unwrap(),
            "/* line 7, a.less */\ncolor: red;"
        );
    }
}
