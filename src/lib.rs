//! less_tree 库入口：LESS 表达式树的求值与 CSS 生成。
//! 解析器产出的节点树经过求值（`Evaluable`）得到新树，再由序列化器输出 CSS 文本。

pub mod color;
pub mod compare;
pub mod context;
pub mod debug_info;
pub mod error;
pub mod function_caller;
pub mod functions;
pub mod output;
mod serializer;
pub mod tree;
pub mod unit;
mod utils;

pub use crate::context::{DumpLineNumbers, EvalContext, MathMode};
pub use crate::error::{LessError, LessResult};
use crate::tree::Node;

/// 求值与输出配置。
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// 是否输出压缩后的 CSS。
    pub compress: bool,
    /// 单位不兼容时报错而不是静默回退。
    pub strict_units: bool,
    pub math: MathMode,
    /// 输出数值时保留的小数位数，`None` 表示不取整。
    pub num_precision: Option<u32>,
    pub dump_line_numbers: Option<DumpLineNumbers>,
    pub javascript_enabled: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            compress: false,
            strict_units: false,
            math: MathMode::default(),
            num_precision: Some(8),
            dump_line_numbers: None,
            javascript_enabled: false,
        }
    }
}

/// 在按 `options` 新建的上下文中求值整棵树。
pub fn evaluate(root: &Node, options: CompileOptions) -> LessResult<Node> {
    let mut ctx = EvalContext::new(&options);
    root.eval(&mut ctx)
}

/// 求值并输出 CSS 文本。
///
/// # 参数
/// * `root` - 通常是 [`tree::Ruleset::root`] 构造的顶层规则集
/// * `options` - 求值与输出配置
pub fn render(root: &Node, options: CompileOptions) -> LessResult<String> {
    let mut ctx = EvalContext::new(&options);
    let evaluated = root.eval(&mut ctx)?;
    evaluated.to_css(&ctx)
}

#[cfg(feature = "node")]
use napi::{Error, Result};
#[cfg(feature = "node")]
use napi_derive::napi;

/// 暴露给 Node.js 的单位换算：`convertDimension(1, "in", "mm")` 返回 `"25.4mm"`。
#[cfg(feature = "node")]
#[napi]
pub fn convert_dimension(value: f64, unit: String, target: String) -> Result<String> {
    use crate::tree::GenCss;

    let dimension = tree::Dimension::new(value, unit.as_str())
        .map_err(|err| Error::from_reason(err.to_string()))?;
    let ctx = EvalContext::new(&CompileOptions::default());
    dimension
        .convert_to(target.as_str())
        .to_css(&ctx)
        .map_err(|err| Error::from_reason(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Declaration, Dimension, GenCss, Keyword, Ruleset, Variable};

    fn stylesheet() -> Node {
        Ruleset::root(vec![
            Declaration::new("@base", Dimension::new(10.0, "px").unwrap())
                .unwrap()
                .into(),
            Ruleset::new(
                vec![".box".into()],
                vec![
                    Declaration::new("margin", Variable::new("@base")).unwrap().into(),
                    Declaration::new("display", Keyword::new("block")).unwrap().into(),
                ],
            )
            .into(),
        ])
        .into()
    }

    #[test]
    fn render_pretty() {
        let css = render(&stylesheet(), CompileOptions::default()).unwrap();
        assert_eq!(css, ".box {\n  margin: 10px;\n  display: block;\n}");
    }

    #[test]
    fn render_compressed() {
        let css = render(
            &stylesheet(),
            CompileOptions {
                compress: true,
                ..CompileOptions::default()
            },
        )
        .unwrap();
        assert_eq!(css, ".box{margin:10px;display:block}");
    }

    #[test]
    fn evaluate_returns_new_tree() {
        let root = stylesheet();
        let evaluated = evaluate(&root, CompileOptions::default()).unwrap();
        let Node::Ruleset(ruleset) = evaluated else {
            panic!("expected ruleset");
        };
        assert!(ruleset.root);
        assert_eq!(ruleset.rules().len(), 2);
    }

    #[test]
    fn default_precision_rounds_output() {
        let third = Dimension::new(1.0 / 3.0, "em").unwrap();
        let ctx = EvalContext::new(&CompileOptions::default());
        assert_eq!(third.to_css(&ctx).unwrap(), "0.33333333em");
    }
}
