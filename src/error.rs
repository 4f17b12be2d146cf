use thiserror::Error;

/// 求值与 CSS 生成过程中统一的错误类型。
#[derive(Debug, Error)]
pub enum LessError {
    #[error("无效的数值: {0}")]
    InvalidNumber(String),
    #[error("语法错误: {message} (位置 {index})")]
    Syntax {
        message: String,
        index: usize,
        filename: Option<String>,
    },
    #[error("语义求值失败: {0}")]
    EvalError(String),
    #[error("不支持的操作: {0}")]
    Unsupported(String),
}

pub type LessResult<T> = Result<T, LessError>;

impl LessError {
    pub fn eval<S: Into<String>>(message: S) -> Self {
        LessError::EvalError(message.into())
    }

    pub fn syntax<S: Into<String>>(message: S, index: usize, filename: Option<String>) -> Self {
        LessError::Syntax {
            message: message.into(),
            index,
            filename,
        }
    }

    pub fn invalid_number<S: Into<String>>(input: S) -> Self {
        LessError::InvalidNumber(input.into())
    }
}
