use super::{Evaluable, GenCss, Node, NodeInfo, Ruleset, Visitor};
use crate::context::{EvalContext, Frame};
use crate::error::LessResult;
use crate::output::CssOutput;
use std::rc::Rc;

/// 连同词法作用域一起保存的规则集，类似闭包。求值只捕获作用域，
/// 规则体要等到调用点执行 [`DetachedRuleset::call_eval`] 时才求值。
#[derive(Debug, Clone)]
pub struct DetachedRuleset {
    pub info: NodeInfo,
    pub ruleset: Option<Rc<Ruleset>>,
    pub frames: Option<Vec<Frame>>,
}

impl DetachedRuleset {
    /// 规则集的父链接指向新建的分离规则集；已经挂在别处的规则集先复制一份。
    pub fn new(ruleset: Option<Rc<Ruleset>>) -> LessResult<Self> {
        let info = NodeInfo::default();
        let ruleset = match ruleset {
            Some(ruleset) => {
                let ruleset = if ruleset.info.has_parent() {
                    Rc::new(ruleset.as_ref().clone())
                } else {
                    ruleset
                };
                ruleset.info.set_parent(&info)?;
                Some(ruleset)
            }
            None => None,
        };
        Ok(Self {
            info,
            ruleset,
            frames: None,
        })
    }

    pub fn with_frames(mut self, frames: Vec<Frame>) -> Self {
        self.frames = Some(frames);
        self
    }

    /// 在调用点求值规则体。捕获的作用域排在调用方作用域之前。
    pub fn call_eval(&self, ctx: &mut EvalContext) -> LessResult<Option<Node>> {
        let Some(ruleset) = &self.ruleset else {
            return Ok(None);
        };
        let Some(captured) = &self.frames else {
            return ruleset.eval(ctx).map(Some);
        };

        let mut frames = captured.clone();
        frames.extend(ctx.frames.iter().cloned());
        let caller_frames = std::mem::replace(&mut ctx.frames, frames);
        let result = ruleset.eval(ctx);
        ctx.frames = caller_frames;
        result.map(Some)
    }

    pub(crate) fn accept(&mut self, visitor: &mut dyn Visitor) {
        let Some(ruleset) = self.ruleset.take() else {
            return;
        };
        let mut node = Node::Ruleset(ruleset);
        visitor.visit(&mut node);
        self.ruleset = match node {
            Node::Ruleset(ruleset) => Some(ruleset),
            _ => None,
        };
    }
}

impl Evaluable for DetachedRuleset {
    fn eval(&self, ctx: &mut EvalContext) -> LessResult<Node> {
        let frames = match &self.frames {
            Some(frames) => frames.clone(),
            None => ctx.frames.clone(),
        };
        Ok(Node::DetachedRuleset(DetachedRuleset {
            info: self.info.clone(),
            ruleset: self.ruleset.clone(),
            frames: Some(frames),
        }))
    }
}

impl GenCss for DetachedRuleset {
    fn gen_css(&self, _ctx: &EvalContext, _output: &mut dyn CssOutput) -> LessResult<()> {
        Ok(())
    }
}
