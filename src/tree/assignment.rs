use super::{Evaluable, GenCss, Node, NodeInfo};
use crate::context::EvalContext;
use crate::error::LessResult;
use crate::output::CssOutput;

/// 滤镜参数中的赋值 `opacity=50`。
#[derive(Debug, Clone)]
pub struct Assignment {
    pub info: NodeInfo,
    pub key: String,
    pub value: Box<Node>,
}

impl Assignment {
    pub fn new<S: Into<String>>(key: S, value: impl Into<Node>) -> Self {
        Self {
            info: NodeInfo::default(),
            key: key.into(),
            value: Box::new(value.into()),
        }
    }
}

impl Evaluable for Assignment {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        Ok(Node::Assignment(Assignment {
            info: self.info.clone(),
            key: self.key.clone(),
            value: Box::new(self.value.eval(ctx)?),
        }))
    }
}

impl GenCss for Assignment {
    fn gen_css(&self, ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        output.add(&format!("{}=", self.key), None, None);
        self.value.gen_css(ctx, output)
    }
}

/// 属性选择器 `[key op value i]`。
#[derive(Debug, Clone)]
pub struct Attribute {
    pub info: NodeInfo,
    pub key: String,
    pub op: Option<String>,
    pub value: Option<Box<Node>>,
    /// 大小写标志，如 `i`。
    pub cif: Option<String>,
}

impl Attribute {
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self {
            info: NodeInfo::default(),
            key: key.into(),
            op: None,
            value: None,
            cif: None,
        }
    }

    pub fn with_value(mut self, op: &str, value: impl Into<Node>) -> Self {
        self.op = Some(op.to_string());
        self.value = Some(Box::new(value.into()));
        self
    }

    pub fn with_cif(mut self, cif: &str) -> Self {
        self.cif = Some(cif.to_string());
        self
    }
}

impl Evaluable for Attribute {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        let value = match &self.value {
            Some(value) => Some(Box::new(value.eval(ctx)?)),
            None => None,
        };
        Ok(Node::Attribute(Attribute {
            info: self.info.clone(),
            key: self.key.clone(),
            op: self.op.clone(),
            value,
            cif: self.cif.clone(),
        }))
    }
}

impl GenCss for Attribute {
    fn gen_css(&self, ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        output.add("[", None, None);
        output.add(&self.key, None, None);
        if let (Some(op), Some(value)) = (&self.op, &self.value) {
            output.add(op, None, None);
            value.gen_css(ctx, output)?;
        }
        if let Some(cif) = &self.cif {
            output.add(&format!(" {cif}"), None, None);
        }
        output.add("]", None, None);
        Ok(())
    }
}
