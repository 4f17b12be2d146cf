//! 表达式树：所有节点变体及其统一分发。
//!
//! 每个变体只实现自己需要的能力：几乎所有节点都可求值（[`Evaluable`]），
//! 全部节点都可输出 CSS（[`GenCss`]），只有数值、颜色与文本类节点具备
//! 自定义比较（[`Comparable`]）。

mod assignment;
mod call;
mod color;
mod comment;
mod condition;
mod declaration;
mod detached_ruleset;
mod dimension;
mod expression;
mod javascript;
mod keyword;
mod node;
mod query_in_parens;
mod quoted;
mod ruleset;
mod variable;

pub use assignment::{Assignment, Attribute};
pub use call::Call;
pub use color::Color;
pub use comment::Comment;
pub use condition::Condition;
pub use declaration::{Declaration, DeclarationName};
pub use detached_ruleset::DetachedRuleset;
pub use dimension::Dimension;
pub use expression::{Expression, Negative, Operation, Paren, Value};
pub use javascript::JavaScript;
pub use keyword::{Anonymous, Keyword, UnicodeDescriptor};
pub use node::{
    keyword_bool, operate, Comparable, Evaluable, FileInfo, GenCss, NodeInfo, Visitor,
    KEYWORD_FALSE, KEYWORD_TRUE,
};
pub use query_in_parens::QueryInParens;
pub use quoted::Quoted;
pub use ruleset::Ruleset;
pub use variable::{Variable, VariableCall};

use crate::context::EvalContext;
use crate::error::LessResult;
use crate::output::CssOutput;
use std::cmp::Ordering;
use std::rc::Rc;
use std::sync::Arc;

/// 表达式树中的任意节点。
#[derive(Debug, Clone)]
pub enum Node {
    Anonymous(Anonymous),
    Assignment(Assignment),
    Attribute(Attribute),
    Call(Call),
    Color(Color),
    Comment(Comment),
    Condition(Condition),
    Declaration(Declaration),
    DetachedRuleset(DetachedRuleset),
    Dimension(Dimension),
    Expression(Expression),
    JavaScript(JavaScript),
    Keyword(Keyword),
    Negative(Negative),
    Operation(Operation),
    Paren(Paren),
    QueryInParens(QueryInParens),
    Quoted(Quoted),
    Ruleset(Rc<Ruleset>),
    UnicodeDescriptor(UnicodeDescriptor),
    Value(Value),
    Variable(Variable),
    VariableCall(VariableCall),
}

impl Node {
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Anonymous(_) => "Anonymous",
            Node::Assignment(_) => "Assignment",
            Node::Attribute(_) => "Attribute",
            Node::Call(_) => "Call",
            Node::Color(_) => "Color",
            Node::Comment(_) => "Comment",
            Node::Condition(_) => "Condition",
            Node::Declaration(_) => "Declaration",
            Node::DetachedRuleset(_) => "DetachedRuleset",
            Node::Dimension(_) => "Dimension",
            Node::Expression(_) => "Expression",
            Node::JavaScript(_) => "JavaScript",
            Node::Keyword(_) => "Keyword",
            Node::Negative(_) => "Negative",
            Node::Operation(_) => "Operation",
            Node::Paren(_) => "Paren",
            Node::QueryInParens(_) => "QueryInParens",
            Node::Quoted(_) => "Quoted",
            Node::Ruleset(_) => "Ruleset",
            Node::UnicodeDescriptor(_) => "UnicodeDescriptor",
            Node::Value(_) => "Value",
            Node::Variable(_) => "Variable",
            Node::VariableCall(_) => "VariableCall",
        }
    }

    pub fn info(&self) -> &NodeInfo {
        match self {
            Node::Anonymous(n) => &n.info,
            Node::Assignment(n) => &n.info,
            Node::Attribute(n) => &n.info,
            Node::Call(n) => &n.info,
            Node::Color(n) => &n.info,
            Node::Comment(n) => &n.info,
            Node::Condition(n) => &n.info,
            Node::Declaration(n) => &n.info,
            Node::DetachedRuleset(n) => &n.info,
            Node::Dimension(n) => &n.info,
            Node::Expression(n) => &n.info,
            Node::JavaScript(n) => &n.info,
            Node::Keyword(n) => &n.info,
            Node::Negative(n) => &n.info,
            Node::Operation(n) => &n.info,
            Node::Paren(n) => &n.info,
            Node::QueryInParens(n) => &n.info,
            Node::Quoted(n) => &n.info,
            Node::Ruleset(n) => &n.info,
            Node::UnicodeDescriptor(n) => &n.info,
            Node::Value(n) => &n.info,
            Node::Variable(n) => &n.info,
            Node::VariableCall(n) => &n.info,
        }
    }

    pub fn info_mut(&mut self) -> &mut NodeInfo {
        match self {
            Node::Anonymous(n) => &mut n.info,
            Node::Assignment(n) => &mut n.info,
            Node::Attribute(n) => &mut n.info,
            Node::Call(n) => &mut n.info,
            Node::Color(n) => &mut n.info,
            Node::Comment(n) => &mut n.info,
            Node::Condition(n) => &mut n.info,
            Node::Declaration(n) => &mut n.info,
            Node::DetachedRuleset(n) => &mut n.info,
            Node::Dimension(n) => &mut n.info,
            Node::Expression(n) => &mut n.info,
            Node::JavaScript(n) => &mut n.info,
            Node::Keyword(n) => &mut n.info,
            Node::Negative(n) => &mut n.info,
            Node::Operation(n) => &mut n.info,
            Node::Paren(n) => &mut n.info,
            Node::QueryInParens(n) => &mut n.info,
            Node::Quoted(n) => &mut n.info,
            Node::Ruleset(n) => &mut Rc::make_mut(n).info,
            Node::UnicodeDescriptor(n) => &mut n.info,
            Node::Value(n) => &mut n.info,
            Node::Variable(n) => &mut n.info,
            Node::VariableCall(n) => &mut n.info,
        }
    }

    pub fn index(&self) -> usize {
        self.info().index()
    }

    pub fn file_info(&self) -> Option<Arc<FileInfo>> {
        self.info().file_info()
    }

    /// 可求值能力；`UnicodeDescriptor` 是唯一不可求值的节点。
    pub fn as_evaluable(&self) -> Option<&dyn Evaluable> {
        match self {
            Node::Anonymous(n) => Some(n),
            Node::Assignment(n) => Some(n),
            Node::Attribute(n) => Some(n),
            Node::Call(n) => Some(n),
            Node::Color(n) => Some(n),
            Node::Comment(n) => Some(n),
            Node::Condition(n) => Some(n),
            Node::Declaration(n) => Some(n),
            Node::DetachedRuleset(n) => Some(n),
            Node::Dimension(n) => Some(n),
            Node::Expression(n) => Some(n),
            Node::JavaScript(n) => Some(n),
            Node::Keyword(n) => Some(n),
            Node::Negative(n) => Some(n),
            Node::Operation(n) => Some(n),
            Node::Paren(n) => Some(n),
            Node::QueryInParens(n) => Some(n),
            Node::Quoted(n) => Some(n),
            Node::Ruleset(n) => Some(n),
            Node::UnicodeDescriptor(_) => None,
            Node::Value(n) => Some(n),
            Node::Variable(n) => Some(n),
            Node::VariableCall(n) => Some(n),
        }
    }

    pub fn as_gen_css(&self) -> &dyn GenCss {
        match self {
            Node::Anonymous(n) => n,
            Node::Assignment(n) => n,
            Node::Attribute(n) => n,
            Node::Call(n) => n,
            Node::Color(n) => n,
            Node::Comment(n) => n,
            Node::Condition(n) => n,
            Node::Declaration(n) => n,
            Node::DetachedRuleset(n) => n,
            Node::Dimension(n) => n,
            Node::Expression(n) => n,
            Node::JavaScript(n) => n,
            Node::Keyword(n) => n,
            Node::Negative(n) => n,
            Node::Operation(n) => n,
            Node::Paren(n) => n,
            Node::QueryInParens(n) => n,
            Node::Quoted(n) => n,
            Node::Ruleset(n) => n.as_ref(),
            Node::UnicodeDescriptor(n) => n,
            Node::Value(n) => n,
            Node::Variable(n) => n,
            Node::VariableCall(n) => n,
        }
    }

    pub fn as_comparable(&self) -> Option<&dyn Comparable> {
        match self {
            Node::Anonymous(n) => Some(n),
            Node::Color(n) => Some(n),
            Node::Dimension(n) => Some(n),
            Node::Quoted(n) => Some(n),
            _ => None,
        }
    }

    /// 求值；不具备求值能力的节点原样返回。
    pub fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        match self.as_evaluable() {
            Some(evaluable) => evaluable.eval(ctx),
            None => Ok(self.clone()),
        }
    }

    pub fn gen_css(&self, ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        self.as_gen_css().gen_css(ctx, output)
    }

    pub fn to_css(&self, ctx: &EvalContext) -> LessResult<String> {
        self.as_gen_css().to_css(ctx)
    }

    pub fn compare(&self, other: &Node) -> Option<Ordering> {
        crate::compare::compare(self, other)
    }

    /// 把直接子节点依次交给访问者，访问者可以原地替换它们。
    pub fn accept(&mut self, visitor: &mut dyn Visitor) {
        match self {
            Node::Assignment(n) => visitor.visit(&mut n.value),
            Node::Attribute(n) => {
                if let Some(value) = n.value.as_deref_mut() {
                    visitor.visit(value);
                }
            }
            Node::Call(n) => n.args.iter_mut().for_each(|arg| visitor.visit(arg)),
            Node::Condition(n) => {
                visitor.visit(&mut n.lvalue);
                visitor.visit(&mut n.rvalue);
            }
            Node::Declaration(n) => n.accept(visitor),
            Node::DetachedRuleset(n) => n.accept(visitor),
            Node::Expression(n) => n.value.iter_mut().for_each(|item| visitor.visit(item)),
            Node::Negative(n) => visitor.visit(&mut n.value),
            Node::Operation(n) => {
                visitor.visit(&mut n.operands[0]);
                visitor.visit(&mut n.operands[1]);
            }
            Node::Paren(n) => visitor.visit(&mut n.value),
            Node::QueryInParens(n) => n.accept(visitor),
            Node::Ruleset(n) => Rc::make_mut(n)
                .rules_mut()
                .iter_mut()
                .for_each(|rule| visitor.visit(rule)),
            Node::Value(n) => n.value.iter_mut().for_each(|item| visitor.visit(item)),
            _ => {}
        }
    }

    /// 是否暴露一组声明（规则集或标记为规则集形态的匿名值）。
    pub fn is_ruleset_like(&self) -> bool {
        match self {
            Node::Ruleset(_) | Node::DetachedRuleset(_) => true,
            Node::Anonymous(n) => n.ruleset_like,
            _ => false,
        }
    }

    /// 带引号字符串或匿名文本。
    pub fn is_textual(&self) -> bool {
        matches!(self, Node::Quoted(_) | Node::Anonymous(_))
    }

    pub fn blocks_visibility(&self) -> bool {
        self.info().blocks_visibility()
    }

    /// `true` / `false` 关键字对应的布尔值。
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Keyword(keyword) => match keyword.value.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Node {
                fn from(node: $variant) -> Self {
                    Node::$variant(node)
                }
            }
        )*
    };
}

impl_from_variant!(
    Anonymous,
    Assignment,
    Attribute,
    Call,
    Color,
    Comment,
    Condition,
    Declaration,
    DetachedRuleset,
    Dimension,
    Expression,
    JavaScript,
    Keyword,
    Negative,
    Operation,
    Paren,
    QueryInParens,
    Quoted,
    UnicodeDescriptor,
    Value,
    Variable,
    VariableCall,
);

impl From<Ruleset> for Node {
    fn from(ruleset: Ruleset) -> Self {
        Node::Ruleset(Rc::new(ruleset))
    }
}

impl From<Rc<Ruleset>> for Node {
    fn from(ruleset: Rc<Ruleset>) -> Self {
        Node::Ruleset(ruleset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doubler;

    impl Visitor for Doubler {
        fn visit(&mut self, node: &mut Node) {
            let doubled = match node {
                Node::Dimension(dimension) => dimension.value * 2.0,
                _ => return,
            };
            *node = Node::Dimension(Dimension::new(doubled, "px").unwrap());
        }
    }

    #[test]
    fn only_unicode_descriptor_is_not_evaluable() {
        assert!(Node::from(UnicodeDescriptor::new("U+0025-00FF"))
            .as_evaluable()
            .is_none());
        assert!(Node::from(Keyword::new("auto")).as_evaluable().is_some());
    }

    #[test]
    fn non_evaluable_nodes_are_returned_as_is() {
        let mut ctx = EvalContext::default();
        let node = Node::from(UnicodeDescriptor::new("U+26"));
        let evaluated = node.eval(&mut ctx).unwrap();
        assert_eq!(evaluated.to_css(&ctx).unwrap(), "U+26");
    }

    #[test]
    fn accept_replaces_children_in_place() {
        let mut node = Node::from(Value::new(vec![
            Dimension::new(1.0, "px").unwrap().into(),
            Keyword::new("solid").into(),
        ]));
        node.accept(&mut Doubler);
        assert_eq!(node.to_css(&EvalContext::default()).unwrap(), "2px, solid");
    }

    #[test]
    fn keyword_booleans() {
        assert_eq!(keyword_bool(true).as_bool(), Some(true));
        assert_eq!(keyword_bool(false).as_bool(), Some(false));
        assert_eq!(Node::from(Keyword::new("auto")).as_bool(), None);
        assert_eq!(KEYWORD_TRUE.value, "true");
    }
}
