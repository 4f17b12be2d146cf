use super::{Evaluable, GenCss, Node, NodeInfo, Ruleset, Visitor};
use crate::context::{EvalContext, Frame};
use crate::error::{LessError, LessResult};
use crate::output::CssOutput;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone)]
struct QueryState {
    op: String,
    lvalue: Node,
    mvalue: Option<Node>,
    op2: Option<String>,
    rvalue: Option<Node>,
    mvalues: Vec<Node>,
    mvalue_copy: Option<Node>,
}

/// 媒体 / 容器查询里的括号条件，例如 `(width >= 600px)` 或
/// `(400px < width < 800px)`。
///
/// 与其他节点不同，求值会原地修改自身并返回同一个节点：每次求值都把
/// 作用域里各个变量绑定下的中间值追加到候选列表里，克隆共享同一份状态。
#[derive(Debug, Clone)]
pub struct QueryInParens {
    pub info: NodeInfo,
    state: Rc<RefCell<QueryState>>,
}

impl QueryInParens {
    pub fn new(op: &str, lvalue: impl Into<Node>, mvalue: impl Into<Node>) -> Self {
        Self::build(op, lvalue.into(), Some(mvalue.into()))
    }

    /// 只有左值和运算符、缺少中间值的条件，例如解析器从 `(width >=)` 恢复出的节点。
    /// 求值不受影响，输出时报错。
    pub fn without_middle(op: &str, lvalue: impl Into<Node>) -> Self {
        Self::build(op, lvalue.into(), None)
    }

    fn build(op: &str, lvalue: Node, mvalue: Option<Node>) -> Self {
        Self {
            info: NodeInfo::default(),
            state: Rc::new(RefCell::new(QueryState {
                op: op.trim().to_string(),
                lvalue,
                mvalue,
                op2: None,
                rvalue: None,
                mvalues: Vec::new(),
                mvalue_copy: None,
            })),
        }
    }

    /// 追加第二段比较 `op2 rvalue`。
    pub fn with_range(self, op2: &str, rvalue: impl Into<Node>) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.op2 = Some(op2.trim().to_string());
            state.rvalue = Some(rvalue.into());
        }
        self
    }

    pub fn mvalue(&self) -> Option<Node> {
        self.state.borrow().mvalue.clone()
    }

    pub fn mvalues(&self) -> Vec<Node> {
        self.state.borrow().mvalues.clone()
    }

    pub(crate) fn accept(&mut self, visitor: &mut dyn Visitor) {
        let mut state = self.state.borrow_mut();
        visitor.visit(&mut state.lvalue);
        if let Some(mvalue) = state.mvalue.as_mut() {
            visitor.visit(mvalue);
        }
        if let Some(rvalue) = state.rvalue.as_mut() {
            visitor.visit(rvalue);
        }
    }

    fn collect_candidates(ctx: &mut EvalContext, copy: &Node) -> LessResult<Vec<Node>> {
        let bindings: Vec<Node> = ctx
            .frames
            .iter()
            .filter(|frame| frame.is_ruleset_like())
            .flat_map(|frame| frame.rules().iter())
            .filter(|rule| matches!(rule, Node::Declaration(declaration) if declaration.variable))
            .cloned()
            .collect();

        let mut candidates = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let narrowed = Rc::new(Ruleset::new(Vec::new(), vec![binding]));
            ctx.push_frame(Frame::ruleset(narrowed, ctx.functions()));
            let result = copy.eval(ctx);
            ctx.pop_frame();
            candidates.push(result?);
        }
        Ok(candidates)
    }
}

impl Evaluable for QueryInParens {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        let (lvalue, mvalue, rvalue, copy) = {
            let mut state = self.state.borrow_mut();
            if state.mvalue_copy.is_none() {
                state.mvalue_copy = state.mvalue.clone();
            }
            (
                state.lvalue.clone(),
                state.mvalue.clone(),
                state.rvalue.clone(),
                state.mvalue_copy.clone(),
            )
        };

        let lvalue = lvalue.eval(ctx)?;
        let mvalue = mvalue.map(|node| node.eval(ctx)).transpose()?;
        let rvalue = rvalue.map(|node| node.eval(ctx)).transpose()?;
        let candidates = match &copy {
            Some(copy) => Self::collect_candidates(ctx, copy)?,
            None => Vec::new(),
        };

        {
            let mut state = self.state.borrow_mut();
            state.lvalue = lvalue;
            state.mvalue = mvalue;
            state.rvalue = rvalue;
            state.mvalues.extend(candidates);
            if let Some(first) = state.mvalues.first() {
                state.mvalue = Some(first.clone());
            }
        }
        Ok(Node::QueryInParens(self.clone()))
    }
}

impl GenCss for QueryInParens {
    fn gen_css(&self, ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        let state = self.state.borrow();
        let middle = state
            .mvalues
            .first()
            .or(state.mvalue.as_ref())
            .ok_or_else(|| LessError::eval("查询条件缺少中间值"))?;

        state.lvalue.gen_css(ctx, output)?;
        output.add(&format!(" {} ", state.op), None, None);
        middle.gen_css(ctx, output)?;
        if let (Some(op2), Some(rvalue)) = (&state.op2, &state.rvalue) {
            output.add(&format!(" {op2} "), None, None);
            rvalue.gen_css(ctx, output)?;
        }
        Ok(())
    }
}
