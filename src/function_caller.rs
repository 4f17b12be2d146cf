//! `Call` 节点与函数表之间的桥接：按名称查找函数并准备参数。

use crate::context::EvalContext;
use crate::error::{LessError, LessResult};
use crate::functions::LessFunction;
use crate::tree::{Expression, FileInfo, Node};
use std::rc::Rc;
use std::sync::Arc;

pub struct FunctionCaller {
    name: String,
    index: usize,
    file_info: Option<Arc<FileInfo>>,
    function: Option<Rc<dyn LessFunction>>,
}

impl FunctionCaller {
    /// 在最近一层帧的函数表中查找 `name`（忽略大小写）。
    ///
    /// 上下文缺失、没有帧或帧上没有函数表时返回错误；函数不存在时不报错，
    /// 只是得到一个 [`FunctionCaller::is_valid`] 为假的调用器。
    pub fn new(
        name: &str,
        ctx: Option<&EvalContext>,
        index: usize,
        file_info: Option<Arc<FileInfo>>,
    ) -> LessResult<Self> {
        let ctx = ctx.ok_or_else(|| LessError::eval("函数调用缺少求值上下文"))?;
        let frame = ctx
            .frames
            .first()
            .ok_or_else(|| LessError::eval("函数调用时作用域为空"))?;
        let registry = frame
            .functions
            .as_ref()
            .ok_or_else(|| LessError::eval("当前作用域没有函数表"))?;

        let name = name.to_lowercase();
        let function = registry.get(&name);
        if function.is_none() {
            log::trace!(target: "less_tree", "函数 {name} 未注册，按普通 CSS 函数输出");
        }
        Ok(Self {
            name,
            index,
            file_info,
            function,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.function.is_some()
    }

    pub fn call(&self, ctx: &mut EvalContext, args: &[Node]) -> LessResult<Node> {
        let Some(function) = &self.function else {
            return Err(LessError::eval(format!("function {} is not registered", self.name)));
        };
        log::debug!(
            target: "less_tree",
            "调用函数 {}（{} 个参数，位置 {}，文件 {}）",
            self.name,
            args.len(),
            self.index,
            self.file_info
                .as_deref()
                .map(|info| info.filename.as_str())
                .unwrap_or("<unknown>")
        );

        if !function.eval_args() {
            return function.call_raw(ctx, args);
        }

        let mut evaluated = Vec::with_capacity(args.len());
        for arg in args {
            let Some(evaluable) = arg.as_evaluable() else {
                return Err(LessError::eval(format!(
                    "argument of type {} passed to {} cannot be evaluated",
                    arg.type_name(),
                    self.name
                )));
            };
            let value = evaluable.eval(ctx)?;
            if matches!(value, Node::Comment(_)) {
                continue;
            }
            evaluated.push(strip_comments(value));
        }
        function.call(&evaluated)
    }
}

/// 去掉表达式参数中的注释。只剩一项时拆掉表达式外壳，括号包裹的除法除外。
fn strip_comments(value: Node) -> Node {
    let Node::Expression(expression) = value else {
        return value;
    };
    let mut parts: Vec<Node> = expression
        .value
        .iter()
        .filter(|part| !matches!(part, Node::Comment(_)))
        .cloned()
        .collect();

    match parts.len() {
        1 => {
            let division = matches!(&parts[0], Node::Operation(operation) if operation.op == "/");
            if expression.parens && division {
                Node::Expression(expression)
            } else {
                parts.remove(0)
            }
        }
        _ => {
            let mut filtered = Expression::new(parts, expression.no_spacing);
            filtered.info = expression.info;
            Node::Expression(filtered)
        }
    }
}
