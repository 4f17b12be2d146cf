//! 内置函数表。函数名统一使用小写注册与查找。

use crate::color;
use crate::context::EvalContext;
use crate::error::{LessError, LessResult};
use crate::tree::{keyword_bool, Anonymous, Color, Dimension, Node};
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// 可被 `Call` 节点调用的函数。
pub trait LessFunction {
    /// 为 `true` 时参数先求值再传入 [`LessFunction::call`]，否则原样传给
    /// [`LessFunction::call_raw`]。
    fn eval_args(&self) -> bool {
        true
    }

    fn call(&self, args: &[Node]) -> LessResult<Node>;

    fn call_raw(&self, ctx: &mut EvalContext, args: &[Node]) -> LessResult<Node> {
        let _ = ctx;
        self.call(args)
    }
}

type EvaluatedFn = fn(&[Node]) -> LessResult<Node>;
type RawFn = fn(&mut EvalContext, &[Node]) -> LessResult<Node>;

/// 以普通函数指针实现的内置函数。
#[derive(Clone, Copy)]
pub enum BuiltinFunction {
    Evaluated(EvaluatedFn),
    Raw(RawFn),
}

impl LessFunction for BuiltinFunction {
    fn eval_args(&self) -> bool {
        matches!(self, BuiltinFunction::Evaluated(_))
    }

    fn call(&self, args: &[Node]) -> LessResult<Node> {
        match self {
            BuiltinFunction::Evaluated(func) => func(args),
            BuiltinFunction::Raw(_) => Err(LessError::eval("该函数需要求值上下文")),
        }
    }

    fn call_raw(&self, ctx: &mut EvalContext, args: &[Node]) -> LessResult<Node> {
        match self {
            BuiltinFunction::Evaluated(func) => func(args),
            BuiltinFunction::Raw(func) => func(ctx, args),
        }
    }
}

#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: IndexMap<String, Rc<dyn LessFunction>>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.functions.keys()).finish()
    }
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置全部内置函数的函数表。
    pub fn builtins() -> Self {
        let mut registry = Self::new();
        registry.add("unit", BuiltinFunction::Evaluated(unit));
        registry.add("convert", BuiltinFunction::Evaluated(convert));
        registry.add("percentage", BuiltinFunction::Evaluated(percentage));
        registry.add("lighten", BuiltinFunction::Evaluated(lighten));
        registry.add("darken", BuiltinFunction::Evaluated(darken));
        registry.add("fade", BuiltinFunction::Evaluated(fade));
        registry.add("boolean", BuiltinFunction::Evaluated(boolean));
        registry.add("if", BuiltinFunction::Raw(if_function));
        registry
    }

    pub fn add(&mut self, name: &str, function: impl LessFunction + 'static) {
        self.functions
            .insert(name.to_lowercase(), Rc::new(function));
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn LessFunction>> {
        self.functions.get(&name.to_lowercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

fn arg<'a>(args: &'a [Node], position: usize, function: &str) -> LessResult<&'a Node> {
    args.get(position)
        .ok_or_else(|| LessError::eval(format!("{function} 缺少第 {} 个参数", position + 1)))
}

fn dimension_arg<'a>(args: &'a [Node], position: usize, function: &str) -> LessResult<&'a Dimension> {
    match arg(args, position, function)? {
        Node::Dimension(dimension) => Ok(dimension),
        other => Err(LessError::eval(format!(
            "{function} 的第 {} 个参数必须是数值，实际为 {}",
            position + 1,
            other.type_name()
        ))),
    }
}

fn color_arg<'a>(args: &'a [Node], position: usize, function: &str) -> LessResult<&'a Color> {
    match arg(args, position, function)? {
        Node::Color(color) => Ok(color),
        other => Err(LessError::eval(format!(
            "{function} 的第 {} 个参数必须是颜色，实际为 {}",
            position + 1,
            other.type_name()
        ))),
    }
}

/// 关键字、字符串或匿名值的文本。
fn text_arg(node: &Node) -> LessResult<String> {
    match node {
        Node::Keyword(keyword) => Ok(keyword.value.clone()),
        Node::Quoted(quoted) => Ok(quoted.value.clone()),
        Node::Anonymous(anonymous) => Ok(anonymous.value.clone()),
        Node::Dimension(dimension) => Ok(dimension.unit.to_string()),
        other => Err(LessError::eval(format!(
            "无法把 {} 用作单位",
            other.type_name()
        ))),
    }
}

/// `unit(5px)` 去掉单位，`unit(5, px)` 替换单位。
fn unit(args: &[Node]) -> LessResult<Node> {
    let dimension = dimension_arg(args, 0, "unit")?;
    let unit = match args.get(1) {
        Some(node) => text_arg(node)?,
        None => String::new(),
    };
    Ok(Dimension::new(dimension.value, unit)?.into())
}

fn convert(args: &[Node]) -> LessResult<Node> {
    let dimension = dimension_arg(args, 0, "convert")?;
    let target = text_arg(arg(args, 1, "convert")?)?;
    Ok(dimension.convert_to(target.as_str()).into())
}

fn percentage(args: &[Node]) -> LessResult<Node> {
    let dimension = dimension_arg(args, 0, "percentage")?;
    Ok(Dimension::new(dimension.value * 100.0, "%")?.into())
}

fn amount(args: &[Node], function: &str) -> LessResult<f64> {
    Ok(dimension_arg(args, 1, function)?.value / 100.0)
}

fn lighten(args: &[Node]) -> LessResult<Node> {
    let color = color_arg(args, 0, "lighten")?;
    let adjusted = color::lighten(color.to_normalized(), amount(args, "lighten")?);
    Ok(Color::from_normalized(adjusted).into())
}

fn darken(args: &[Node]) -> LessResult<Node> {
    let color = color_arg(args, 0, "darken")?;
    let adjusted = color::darken(color.to_normalized(), amount(args, "darken")?);
    Ok(Color::from_normalized(adjusted).into())
}

fn fade(args: &[Node]) -> LessResult<Node> {
    let color = color_arg(args, 0, "fade")?;
    let adjusted = color::fade(color.to_normalized(), amount(args, "fade")?);
    Ok(Color::from_normalized(adjusted).into())
}

fn boolean(args: &[Node]) -> LessResult<Node> {
    let condition = arg(args, 0, "boolean")?;
    Ok(keyword_bool(condition.as_bool() == Some(true)))
}

/// `if(condition, then, else)`：只求值被选中的分支。
fn if_function(ctx: &mut EvalContext, args: &[Node]) -> LessResult<Node> {
    let condition = arg(args, 0, "if")?.eval(ctx)?;
    if condition.as_bool() == Some(true) {
        return arg(args, 1, "if")?.eval(ctx);
    }
    match args.get(2) {
        Some(otherwise) => otherwise.eval(ctx),
        None => Ok(Anonymous::new("").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Condition, Keyword, Variable};

    fn px(value: f64) -> Node {
        Dimension::new(value, "px").unwrap().into()
    }

    fn css(node: &Node) -> String {
        node.to_css(&EvalContext::default()).unwrap()
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = FunctionRegistry::builtins();
        assert_eq!(registry.len(), 8);
        assert!(registry.get("LIGHTEN").is_some());
        assert!(registry.get("missing").is_none());
        assert!(!registry.get("if").unwrap().eval_args());
    }

    #[test]
    fn unit_functions() {
        let registry = FunctionRegistry::builtins();
        let unit = registry.get("unit").unwrap();
        assert_eq!(css(&unit.call(&[px(5.0)]).unwrap()), "5");
        assert_eq!(
            css(&unit.call(&[px(5.0), Keyword::new("em").into()]).unwrap()),
            "5em"
        );

        let convert = registry.get("convert").unwrap();
        let seconds: Node = Dimension::new(2.0, "s").unwrap().into();
        assert_eq!(
            css(&convert.call(&[seconds, Keyword::new("ms").into()]).unwrap()),
            "2000ms"
        );

        let percentage = registry.get("percentage").unwrap();
        let half: Node = Dimension::new(0.5, "").unwrap().into();
        assert_eq!(css(&percentage.call(&[half]).unwrap()), "50%");

        assert!(unit.call(&[Keyword::new("x").into()]).is_err());
    }

    #[test]
    fn color_functions() {
        let registry = FunctionRegistry::builtins();
        let base: Node = Color::parse("#336699").unwrap().into();
        let twenty: Node = Dimension::new(20.0, "%").unwrap().into();

        let lighter = registry.get("lighten").unwrap().call(&[base.clone(), twenty]).unwrap();
        assert_eq!(css(&lighter), "#6699cc");

        let half: Node = Dimension::new(50.0, "%").unwrap().into();
        let faded = registry.get("fade").unwrap().call(&[base, half]).unwrap();
        assert_eq!(css(&faded), "rgba(51, 102, 153, 0.5)");
    }

    #[test]
    fn if_evaluates_only_the_chosen_branch() {
        let registry = FunctionRegistry::builtins();
        let function = registry.get("if").unwrap();
        let mut ctx = EvalContext::default();

        let yes = Condition::new(">", px(2.0), px(1.0), false);
        let result = function
            .call_raw(&mut ctx, &[yes.into(), px(10.0), Variable::new("@undefined").into()])
            .unwrap();
        assert_eq!(css(&result), "10px");

        let no = Condition::new("<", px(2.0), px(1.0), false);
        let result = function.call_raw(&mut ctx, &[no.into(), px(10.0)]).unwrap();
        assert_eq!(css(&result), "");
        assert!(function.call(&[]).is_err());
    }

    #[test]
    fn boolean_reflects_condition_result() {
        let registry = FunctionRegistry::builtins();
        let function = registry.get("boolean").unwrap();
        assert_eq!(
            function.call(&[keyword_bool(true)]).unwrap().as_bool(),
            Some(true)
        );
        assert_eq!(
            function.call(&[Keyword::new("auto").into()]).unwrap().as_bool(),
            Some(false)
        );
    }
}
