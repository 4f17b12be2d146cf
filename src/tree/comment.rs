use super::{Evaluable, GenCss, Node, NodeInfo};
use crate::context::EvalContext;
use crate::debug_info::{debug_info, DebugInfo};
use crate::error::LessResult;
use crate::output::CssOutput;

/// 块注释 `/* */` 或行注释 `//`。
#[derive(Debug, Clone)]
pub struct Comment {
    pub info: NodeInfo,
    pub value: String,
    pub is_line_comment: bool,
    pub debug_info: Option<DebugInfo>,
}

impl Comment {
    pub fn new<S: Into<String>>(value: S, is_line_comment: bool) -> Self {
        Self {
            info: NodeInfo::default(),
            value: value.into(),
            is_line_comment,
            debug_info: None,
        }
    }

    pub fn with_debug_info(mut self, debug_info: DebugInfo) -> Self {
        self.debug_info = Some(debug_info);
        self
    }

    /// 行注释总是静默；压缩输出时只保留 `/*!` 开头的注释。
    pub fn is_silent(&self, ctx: &EvalContext) -> bool {
        let compressed = ctx.compress && !self.value.starts_with("/*!");
        self.is_line_comment || compressed
    }
}

impl Evaluable for Comment {
    fn eval(&self, _ctx: &mut EvalContext) -> LessResult<Node> {
        Ok(Node::Comment(self.clone()))
    }
}

impl GenCss for Comment {
    fn gen_css(&self, ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        if let Some(info) = &self.debug_info {
            let prefix = debug_info(ctx, info, "");
            if !prefix.is_empty() {
                output.add(&prefix, self.info.file_info().as_deref(), Some(self.info.index()));
            }
        }
        output.add(&self.value, None, None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DumpLineNumbers;
    use crate::tree::FileInfo;

    #[test]
    fn silence_rules() {
        let mut ctx = EvalContext::default();
        assert!(Comment::new("// note", true).is_silent(&ctx));
        assert!(!Comment::new("/* note */", false).is_silent(&ctx));

        ctx.compress = true;
        assert!(Comment::new("/* note */", false).is_silent(&ctx));
        assert!(!Comment::new("/*! license */", false).is_silent(&ctx));
    }

    #[derive(Default)]
    struct Chunks(Vec<String>);

    impl CssOutput for Chunks {
        fn add(&mut self, chunk: &str, _file_info: Option<&FileInfo>, _index: Option<usize>) {
            self.0.push(chunk.to_string());
        }

        fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }

    #[test]
    fn debug_info_adds_nothing_when_line_numbers_are_off() {
        let ctx = EvalContext::default();
        let comment = Comment::new("/* a */", false).with_debug_info(DebugInfo::new(3, "a.less"));
        let mut output = Chunks::default();
        comment.gen_css(&ctx, &mut output).unwrap();
        assert_eq!(output.0, vec!["/* a */".to_string()]);
    }

    #[test]
    fn renders_debug_info_prefix() {
        let mut ctx = EvalContext::default();
        ctx.dump_line_numbers = Some(DumpLineNumbers::Comments);
        let comment = Comment::new("/* a */", false).with_debug_info(DebugInfo::new(3, "a.less"));
        assert_eq!(comment.to_css(&ctx).unwrap(), "/* line 3, a.less */\n/* a */");
    }
}
