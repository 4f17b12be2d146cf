//! 求值上下文：作用域帧栈、!important 作用域与各类求值开关。

use crate::functions::FunctionRegistry;
use crate::tree::{Node, Ruleset};
use crate::CompileOptions;
use std::cell::Cell;
use std::rc::Rc;

/// 算术开关模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum MathMode {
    /// 所有运算符都会计算。
    Always,
    /// 除法只在括号内计算。
    #[default]
    ParensDivision,
    /// 所有运算只在括号内计算。
    Parens,
}

/// 行号调试信息的输出方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpLineNumbers {
    Comments,
    MediaQuery,
    All,
}

/// 一层词法作用域。
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub ruleset: Option<Rc<Ruleset>>,
    pub functions: Option<Rc<FunctionRegistry>>,
}

impl Frame {
    pub fn ruleset(ruleset: Rc<Ruleset>, functions: Option<Rc<FunctionRegistry>>) -> Self {
        Self {
            ruleset: Some(ruleset),
            functions,
        }
    }

    pub fn functions(functions: Rc<FunctionRegistry>) -> Self {
        Self {
            ruleset: None,
            functions: Some(functions),
        }
    }

    pub fn is_ruleset_like(&self) -> bool {
        self.ruleset.is_some()
    }

    /// 规则集帧中的全部规则；非规则集帧为空。
    pub fn rules(&self) -> &[Node] {
        self.ruleset
            .as_deref()
            .map(|ruleset| ruleset.rules())
            .unwrap_or(&[])
    }
}

/// 嵌套求值（如变量引用）写回给外层声明的 !important 标记。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportantScope {
    pub important: Option<String>,
}

/// 贯穿整个求值与输出过程的上下文。
#[derive(Debug)]
pub struct EvalContext {
    /// 作用域帧，最内层在前。
    pub frames: Vec<Frame>,
    pub important_scope: Vec<ImportantScope>,
    pub math: MathMode,
    pub math_on: bool,
    pub in_calc: bool,
    pub strict_units: bool,
    pub compress: bool,
    pub num_precision: Option<u32>,
    pub dump_line_numbers: Option<DumpLineNumbers>,
    pub javascript_enabled: bool,
    /// 输出阶段：当前声明是否为所在块的最后一条。
    pub last_rule: Cell<bool>,
    /// 输出阶段：当前缩进层级。
    pub tab_level: Cell<usize>,
    parens_stack: Vec<bool>,
    selectors: Vec<Vec<String>>,
    variable_stack: Vec<String>,
}

impl Default for EvalContext {
    /// 不带任何帧的空上下文，算术开启，不取整。
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            important_scope: Vec::new(),
            math: MathMode::default(),
            math_on: true,
            in_calc: false,
            strict_units: false,
            compress: false,
            num_precision: None,
            dump_line_numbers: None,
            javascript_enabled: false,
            last_rule: Cell::new(false),
            tab_level: Cell::new(0),
            parens_stack: Vec::new(),
            selectors: Vec::new(),
            variable_stack: Vec::new(),
        }
    }
}

impl EvalContext {
    pub fn new(options: &CompileOptions) -> Self {
        let functions = Rc::new(FunctionRegistry::builtins());
        Self {
            frames: vec![Frame::functions(functions)],
            math: options.math,
            math_on: true,
            strict_units: options.strict_units,
            compress: options.compress,
            num_precision: options.num_precision,
            dump_line_numbers: options.dump_line_numbers,
            javascript_enabled: options.javascript_enabled,
            ..Self::default()
        }
    }

    /// 最近一层帧上的函数表。
    pub fn functions(&self) -> Option<Rc<FunctionRegistry>> {
        self.frames.first().and_then(|frame| frame.functions.clone())
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.insert(0, frame);
    }

    pub fn pop_frame(&mut self) -> Option<Frame> {
        if self.frames.is_empty() {
            None
        } else {
            Some(self.frames.remove(0))
        }
    }

    pub fn in_parenthesis(&mut self) {
        self.parens_stack.push(true);
    }

    pub fn out_of_parenthesis(&mut self) {
        self.parens_stack.pop();
    }

    pub fn is_in_parens(&self) -> bool {
        !self.parens_stack.is_empty()
    }

    /// 运算符 `op` 在当前模式下是否应当计算。
    pub fn is_math_on(&self, op: &str) -> bool {
        if !self.math_on {
            return false;
        }
        if op == "/" && self.math != MathMode::Always && !self.is_in_parens() {
            return false;
        }
        if self.math > MathMode::ParensDivision {
            return self.is_in_parens();
        }
        true
    }

    /// 不区分运算符的算术开关。
    pub fn is_math_on_any(&self) -> bool {
        if !self.math_on {
            return false;
        }
        if self.math > MathMode::ParensDivision {
            return self.is_in_parens();
        }
        true
    }

    /// 按精度取整，先加上极小量避免 1.000000005 之类的误差。
    pub fn fround(&self, value: f64) -> f64 {
        match self.num_precision {
            Some(precision) => {
                let scale = 10f64.powi(precision as i32);
                ((value + 2e-16) * scale).round() / scale
            }
            None => value,
        }
    }

    pub(crate) fn current_selectors(&self) -> &[String] {
        self.selectors.last().map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn push_selectors(&mut self, selectors: Vec<String>) {
        self.selectors.push(selectors);
    }

    pub(crate) fn pop_selectors(&mut self) {
        self.selectors.pop();
    }

    pub(crate) fn is_evaluating_variable(&self, name: &str) -> bool {
        self.variable_stack.iter().any(|current| current == name)
    }

    pub(crate) fn push_variable(&mut self, name: &str) {
        self.variable_stack.push(name.to_string());
    }

    pub(crate) fn pop_variable(&mut self) {
        self.variable_stack.pop();
    }
}
