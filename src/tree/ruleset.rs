use super::{Evaluable, GenCss, Node, NodeInfo};
use crate::context::{EvalContext, Frame};
use crate::error::LessResult;
use crate::output::CssOutput;
use crate::serializer::Serializer;
use std::rc::Rc;

/// 选择器加规则体。根规则集没有选择器，直接输出其中的规则。
#[derive(Debug, Clone, Default)]
pub struct Ruleset {
    pub info: NodeInfo,
    pub selectors: Vec<String>,
    rules: Vec<Node>,
    pub root: bool,
}

impl Ruleset {
    pub fn new(selectors: Vec<String>, rules: Vec<Node>) -> Self {
        Self {
            info: NodeInfo::default(),
            selectors,
            rules,
            root: false,
        }
    }

    /// 样式表顶层。
    pub fn root(rules: Vec<Node>) -> Self {
        Self {
            root: true,
            ..Self::new(Vec::new(), rules)
        }
    }

    pub fn rules(&self) -> &[Node] {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut Vec<Node> {
        &mut self.rules
    }

    /// 与外层选择器组合：`&` 替换为外层选择器，否则以后代关系拼接。
    fn combine_selectors(&self, parents: &[String]) -> Vec<String> {
        if parents.is_empty() {
            return self.selectors.iter().map(|s| s.trim().to_string()).collect();
        }
        if self.selectors.is_empty() {
            return parents.to_vec();
        }

        let mut result = Vec::with_capacity(parents.len() * self.selectors.len());
        for parent in parents {
            for child in &self.selectors {
                let selector = if child.contains('&') {
                    child.replace('&', parent).trim().to_string()
                } else {
                    format!("{} {}", parent.trim(), child.trim())
                };
                result.push(selector);
            }
        }
        result
    }

    fn eval_rules(&self, ctx: &mut EvalContext) -> LessResult<Vec<Node>> {
        let mut rules = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let evaluated = rule.eval(ctx)?;
            match (rule, evaluated) {
                (Node::VariableCall(_), Node::Ruleset(called)) => {
                    rules.extend(called.rules().iter().cloned());
                }
                (_, evaluated) => rules.push(evaluated),
            }
        }
        Ok(rules)
    }
}

impl Evaluable for Rc<Ruleset> {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        let selectors = self.combine_selectors(ctx.current_selectors());
        ctx.push_frame(Frame::ruleset(self.clone(), ctx.functions()));
        ctx.push_selectors(selectors.clone());

        let rules = self.eval_rules(ctx);

        ctx.pop_selectors();
        ctx.pop_frame();

        Ok(Node::Ruleset(Rc::new(Ruleset {
            info: self.info.clone(),
            selectors,
            rules: rules?,
            root: self.root,
        })))
    }
}

impl GenCss for Ruleset {
    fn gen_css(&self, ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        Serializer::new(ctx).write(self, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Declaration, DetachedRuleset, Keyword, Variable, VariableCall};

    fn decl(name: &str, value: &str) -> Node {
        Declaration::new(name, Keyword::new(value)).unwrap().into()
    }

    fn selectors(node: &Node) -> Vec<String> {
        match node {
            Node::Ruleset(ruleset) => ruleset.selectors.clone(),
            other => panic!("expected ruleset, got {}", other.type_name()),
        }
    }

    #[test]
    fn nested_selectors_are_combined() {
        let mut ctx = EvalContext::default();
        let inner = Ruleset::new(vec!["&:hover".into(), ".icon".into()], vec![decl("color", "red")]);
        let outer = Rc::new(Ruleset::new(
            vec![".a".into(), ".b".into()],
            vec![inner.into()],
        ));
        let Node::Ruleset(evaluated) = outer.eval(&mut ctx).unwrap() else {
            panic!("expected ruleset");
        };
        assert_eq!(evaluated.selectors, vec![".a", ".b"]);
        assert_eq!(
            selectors(&evaluated.rules()[0]),
            vec![".a:hover", ".a .icon", ".b:hover", ".b .icon"]
        );
        assert!(ctx.frames.is_empty());
    }

    #[test]
    fn variables_resolve_in_own_scope() {
        let mut ctx = EvalContext::default();
        let ruleset = Rc::new(Ruleset::new(
            vec![".a".into()],
            vec![
                Declaration::new("color", Variable::new("@c")).unwrap().into(),
                decl("@c", "red"),
            ],
        ));
        let evaluated = ruleset.eval(&mut ctx).unwrap();
        assert_eq!(evaluated.to_css(&ctx).unwrap(), ".a {\n  color: red;\n}");
    }

    #[test]
    fn frame_is_popped_on_error() {
        let mut ctx = EvalContext::default();
        let ruleset = Rc::new(Ruleset::new(
            vec![".a".into()],
            vec![Declaration::new("color", Variable::new("@missing")).unwrap().into()],
        ));
        assert!(ruleset.eval(&mut ctx).is_err());
        assert!(ctx.frames.is_empty());
        assert!(ctx.current_selectors().is_empty());
    }

    #[test]
    fn variable_call_splices_rules() {
        let mut ctx = EvalContext::default();
        let body = Rc::new(Ruleset::new(Vec::new(), vec![decl("background", "white")]));
        let detached = DetachedRuleset::new(Some(body)).unwrap();
        let root = Rc::new(Ruleset::root(vec![
            Declaration::new("@mixin", detached).unwrap().into(),
            Ruleset::new(
                vec![".box".into()],
                vec![decl("color", "red"), VariableCall::new("@mixin").into()],
            )
            .into(),
        ]));
        let evaluated = root.eval(&mut ctx).unwrap();
        assert_eq!(
            evaluated.to_css(&ctx).unwrap(),
            ".box {\n  color: red;\n  background: white;\n}"
        );
    }
}
