use crate::context::EvalContext;

/// 保持相对缩进的辅助函数。
pub fn indent(level: usize) -> String {
    const INDENT: &str = "  ";
    (0..level).map(|_| INDENT).collect()
}

/// 按上下文精度取整后输出最短的十进制文本，不使用科学计数法。
pub fn format_number(ctx: &EvalContext, value: f64) -> String {
    let value = ctx.fround(value);
    if value == 0.0 {
        return "0".to_string();
    }
    if value.abs() < 0.000001 {
        let fixed = format!("{value:.20}");
        return fixed
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string();
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indent_uses_two_spaces() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "    ");
    }

    #[test]
    fn numbers_avoid_exponents() {
        let ctx = EvalContext::default();
        assert_eq!(format_number(&ctx, 8.0), "8");
        assert_eq!(format_number(&ctx, -0.0), "0");
        assert_eq!(format_number(&ctx, 0.25), "0.25");
        assert_eq!(format_number(&ctx, 0.0000001), "0.0000001");
        assert_eq!(format_number(&ctx, -0.0000002), "-0.0000002");
    }

    #[test]
    fn numbers_follow_precision() {
        let mut ctx = EvalContext::default();
        ctx.num_precision = Some(3);
        assert_eq!(format_number(&ctx, 1.0 / 3.0), "0.333");
        assert_eq!(format_number(&ctx, 0.0000001), "0");
    }
}
