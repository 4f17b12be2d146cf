//! 值列表、表达式与运算节点。

use super::{Dimension, Evaluable, GenCss, Node, NodeInfo};
use crate::context::{EvalContext, MathMode};
use crate::error::{LessError, LessResult};
use crate::output::CssOutput;

/// 逗号分隔的值列表。
#[derive(Debug, Clone)]
pub struct Value {
    pub info: NodeInfo,
    pub value: Vec<Node>,
}

impl Value {
    pub fn new(value: Vec<Node>) -> Self {
        Self {
            info: NodeInfo::default(),
            value,
        }
    }
}

impl Evaluable for Value {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        if let [single] = self.value.as_slice() {
            return single.eval(ctx);
        }
        let value = self
            .value
            .iter()
            .map(|item| item.eval(ctx))
            .collect::<LessResult<Vec<_>>>()?;
        Ok(Node::Value(Value {
            info: self.info.clone(),
            value,
        }))
    }
}

impl GenCss for Value {
    fn gen_css(&self, ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        let separator = if ctx.compress { "," } else { ", " };
        for (idx, item) in self.value.iter().enumerate() {
            item.gen_css(ctx, output)?;
            if idx + 1 < self.value.len() {
                output.add(separator, None, None);
            }
        }
        Ok(())
    }
}

/// 空格分隔的表达式，例如 `1px solid @color`。
#[derive(Debug, Clone)]
pub struct Expression {
    pub info: NodeInfo,
    pub value: Vec<Node>,
    pub no_spacing: bool,
    /// 书写时带括号。
    pub parens: bool,
    /// 括号出现在运算内部。
    pub parens_in_op: bool,
}

impl Expression {
    pub fn new(value: Vec<Node>, no_spacing: bool) -> Self {
        Self {
            info: NodeInfo::default(),
            value,
            no_spacing,
            parens: false,
            parens_in_op: false,
        }
    }

    pub fn with_parens(mut self, parens: bool, parens_in_op: bool) -> Self {
        self.parens = parens;
        self.parens_in_op = parens_in_op;
        self
    }

    fn eval_children(&self, ctx: &mut EvalContext, double_paren: &mut bool) -> LessResult<Node> {
        match self.value.as_slice() {
            [] => Ok(Node::Expression(self.clone())),
            [single] => {
                if let Node::Expression(inner) = single {
                    *double_paren = inner.parens && !inner.parens_in_op && !ctx.in_calc;
                }
                single.eval(ctx)
            }
            items => {
                let value = items
                    .iter()
                    .map(|item| item.eval(ctx))
                    .collect::<LessResult<Vec<_>>>()?;
                Ok(Node::Expression(Expression {
                    info: self.info.clone(),
                    value,
                    no_spacing: self.no_spacing,
                    parens: false,
                    parens_in_op: false,
                }))
            }
        }
    }
}

impl Evaluable for Expression {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        let math_on = ctx.is_math_on_any();
        let mut double_paren = false;

        if self.parens {
            ctx.in_parenthesis();
        }
        let result = self.eval_children(ctx, &mut double_paren);
        if self.parens {
            ctx.out_of_parenthesis();
        }
        let result = result?;

        if self.parens
            && self.parens_in_op
            && !math_on
            && !double_paren
            && !matches!(result, Node::Dimension(_))
        {
            return Ok(Node::Paren(Paren::new(result)));
        }
        Ok(result)
    }
}

impl GenCss for Expression {
    fn gen_css(&self, ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        for (idx, item) in self.value.iter().enumerate() {
            item.gen_css(ctx, output)?;
            let Some(next) = self.value.get(idx + 1) else {
                continue;
            };
            let comma = matches!(next, Node::Anonymous(anonymous) if anonymous.value == ",");
            if !self.no_spacing && !comma {
                output.add(" ", None, None);
            }
        }
        Ok(())
    }
}

/// 二元运算 `a op b`。
#[derive(Debug, Clone)]
pub struct Operation {
    pub info: NodeInfo,
    pub op: String,
    pub operands: Box<[Node; 2]>,
    pub is_spaced: bool,
}

impl Operation {
    pub fn new(op: &str, left: Node, right: Node, is_spaced: bool) -> Self {
        Self {
            info: NodeInfo::default(),
            op: op.trim().to_string(),
            operands: Box::new([left, right]),
            is_spaced,
        }
    }
}

impl Evaluable for Operation {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        let mut a = self.operands[0].eval(ctx)?;
        let mut b = self.operands[1].eval(ctx)?;

        if !ctx.is_math_on(&self.op) {
            return Ok(Node::Operation(Operation {
                info: self.info.clone(),
                op: self.op.clone(),
                operands: Box::new([a, b]),
                is_spaced: self.is_spaced,
            }));
        }

        let op = if self.op == "./" { "/" } else { self.op.as_str() };
        if let (Node::Dimension(dimension), Node::Color(_)) = (&a, &b) {
            a = Node::Color(dimension.to_color());
        }
        if let (Node::Color(_), Node::Dimension(dimension)) = (&a, &b) {
            b = Node::Color(dimension.to_color());
        }

        match (&a, &b) {
            (Node::Dimension(left), Node::Dimension(right)) => {
                Ok(Node::Dimension(left.operate(ctx, op, right)?))
            }
            (Node::Color(left), Node::Color(right)) => Ok(Node::Color(left.operate(ctx, op, right)?)),
            (Node::Operation(inner), _)
                if inner.op == "/" && ctx.math == MathMode::ParensDivision =>
            {
                Ok(Node::Operation(Operation {
                    info: self.info.clone(),
                    op: self.op.clone(),
                    operands: Box::new([a, b]),
                    is_spaced: self.is_spaced,
                }))
            }
            _ => Err(LessError::eval("Operation on an invalid type")),
        }
    }
}

impl GenCss for Operation {
    fn gen_css(&self, ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        self.operands[0].gen_css(ctx, output)?;
        if self.is_spaced {
            output.add(" ", None, None);
        }
        output.add(&self.op, None, None);
        if self.is_spaced {
            output.add(" ", None, None);
        }
        self.operands[1].gen_css(ctx, output)
    }
}

/// 括号包裹的值。
#[derive(Debug, Clone)]
pub struct Paren {
    pub info: NodeInfo,
    pub value: Box<Node>,
}

impl Paren {
    pub fn new(value: Node) -> Self {
        Self {
            info: NodeInfo::default(),
            value: Box::new(value),
        }
    }
}

impl Evaluable for Paren {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        Ok(Node::Paren(Paren {
            info: self.info.clone(),
            value: Box::new(self.value.eval(ctx)?),
        }))
    }
}

impl GenCss for Paren {
    fn gen_css(&self, ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        output.add("(", None, None);
        self.value.gen_css(ctx, output)?;
        output.add(")", None, None);
        Ok(())
    }
}

/// 取负 `-@value`。
#[derive(Debug, Clone)]
pub struct Negative {
    pub info: NodeInfo,
    pub value: Box<Node>,
}

impl Negative {
    pub fn new(value: Node) -> Self {
        Self {
            info: NodeInfo::default(),
            value: Box::new(value),
        }
    }
}

impl Evaluable for Negative {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        if ctx.is_math_on_any() {
            let minus_one = Dimension::new(-1.0, "")?;
            return Operation::new("*", minus_one.into(), (*self.value).clone(), false).eval(ctx);
        }
        Ok(Node::Negative(Negative {
            info: self.info.clone(),
            value: Box::new(self.value.eval(ctx)?),
        }))
    }
}

impl GenCss for Negative {
    fn gen_css(&self, ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        output.add("-", None, None);
        self.value.gen_css(ctx, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Anonymous, Color, Keyword};

    fn px(value: f64) -> Node {
        Dimension::new(value, "px").unwrap().into()
    }

    fn number(value: f64) -> Node {
        Dimension::new(value, "").unwrap().into()
    }

    #[test]
    fn value_unwraps_single_item_and_joins_lists() {
        let mut ctx = EvalContext::default();
        let single = Value::new(vec![px(1.0)]).eval(&mut ctx).unwrap();
        assert!(matches!(single, Node::Dimension(_)));

        let list: Node = Value::new(vec![px(1.0), px(2.0)]).into();
        assert_eq!(list.to_css(&ctx).unwrap(), "1px, 2px");
        ctx.compress = true;
        assert_eq!(list.to_css(&ctx).unwrap(), "1px,2px");
    }

    #[test]
    fn expression_spacing() {
        let ctx = EvalContext::default();
        let spaced = Expression::new(
            vec![px(1.0), Keyword::new("solid").into(), Anonymous::new(",").into()],
            false,
        );
        assert_eq!(spaced.to_css(&ctx).unwrap(), "1px solid,");
        let tight = Expression::new(vec![Keyword::new("a").into(), Keyword::new("b").into()], true);
        assert_eq!(tight.to_css(&ctx).unwrap(), "ab");
    }

    #[test]
    fn division_only_inside_parens_by_default() {
        let mut ctx = EvalContext::default();
        let division = Operation::new("/", px(10.0), number(4.0), false);

        let plain = Expression::new(vec![division.clone().into()], false);
        let kept = plain.eval(&mut ctx).unwrap();
        assert_eq!(kept.to_css(&ctx).unwrap(), "10px/4");

        let wrapped = Expression::new(vec![division.into()], false).with_parens(true, false);
        let computed = wrapped.eval(&mut ctx).unwrap();
        assert_eq!(computed.to_css(&ctx).unwrap(), "2.5px");
        assert!(!ctx.is_in_parens());
    }

    #[test]
    fn parens_in_operation_kept_when_math_is_off() {
        let mut ctx = EvalContext::default();
        ctx.math = MathMode::Parens;
        let inner = Expression::new(vec![Keyword::new("a").into(), Keyword::new("b").into()], false)
            .with_parens(true, true);
        let result = inner.eval(&mut ctx).unwrap();
        assert_eq!(result.to_css(&ctx).unwrap(), "(a b)");
    }

    #[test]
    fn operation_arithmetic_and_errors() {
        let mut ctx = EvalContext::default();
        let sum = Operation::new(" + ", px(5.0), px(3.0), true).eval(&mut ctx).unwrap();
        assert_eq!(sum.to_css(&ctx).unwrap(), "8px");

        let err = Operation::new("+", Keyword::new("a").into(), px(1.0), false)
            .eval(&mut ctx)
            .unwrap_err();
        assert!(err.to_string().contains("Operation on an invalid type"));

        ctx.math_on = false;
        let kept = Operation::new("+", px(5.0), px(3.0), true).eval(&mut ctx).unwrap();
        assert_eq!(kept.to_css(&ctx).unwrap(), "5px + 3px");
    }

    #[test]
    fn dimension_is_promoted_when_meeting_a_color() {
        let mut ctx = EvalContext::default();
        let color: Node = Color::from_rgb(16.0, 16.0, 16.0).into();
        let result = Operation::new("*", color, number(2.0), false).eval(&mut ctx).unwrap();
        assert_eq!(result.to_css(&ctx).unwrap(), "#202020");
    }

    #[test]
    fn nested_division_is_preserved_under_parens_division() {
        let mut ctx = EvalContext::default();
        let inner = Operation::new("/", px(10.0), number(2.0), false);
        let outer = Operation::new("+", inner.into(), px(1.0), false);
        let result = outer.eval(&mut ctx).unwrap();
        assert_eq!(result.to_css(&ctx).unwrap(), "10px/2+1px");
    }

    #[test]
    fn negative_and_paren() {
        let mut ctx = EvalContext::default();
        let negated = Negative::new(px(6.0)).eval(&mut ctx).unwrap();
        assert_eq!(negated.to_css(&ctx).unwrap(), "-6px");

        ctx.math_on = false;
        let kept = Negative::new(px(6.0)).eval(&mut ctx).unwrap();
        assert!(matches!(kept, Node::Negative(_)));
        assert_eq!(kept.to_css(&ctx).unwrap(), "-6px");

        let paren = Paren::new(px(1.0)).eval(&mut ctx).unwrap();
        assert_eq!(paren.to_css(&ctx).unwrap(), "(1px)");
    }
}
