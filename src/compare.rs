//! 跨类型的通用比较。结果为 `None` 时表示不可比较，条件判断中一律视为假。

use crate::context::EvalContext;
use crate::tree::Node;
use std::cmp::Ordering;

/// 比较两个已求值的节点。
///
/// 优先使用节点自身的比较规则；另一侧是带引号字符串或匿名文本时改为比较
/// 两者的文本（字符串不含引号），保证交换左右两侧后结果对称。
pub fn compare(a: &Node, b: &Node) -> Option<Ordering> {
    if let Some(left) = a.as_comparable() {
        if b.is_textual() {
            return compare_css_text(a, b);
        }
        return left.compare(b);
    }
    if let Some(right) = b.as_comparable() {
        return right.compare(a).map(Ordering::reverse);
    }

    if std::ptr::eq(a, b) {
        return Some(Ordering::Equal);
    }

    match (Payload::of(a)?, Payload::of(b)?) {
        (Payload::Text(kind_a, text_a), Payload::Text(kind_b, text_b)) if kind_a == kind_b => {
            Some(text_a.cmp(text_b))
        }
        (Payload::List(kind_a, items_a), Payload::List(kind_b, items_b)) if kind_a == kind_b => {
            let all_equal = items_a.len() == items_b.len()
                && items_a
                    .iter()
                    .zip(items_b)
                    .all(|(x, y)| compare(x, y) == Some(Ordering::Equal));
            all_equal.then_some(Ordering::Equal)
        }
        _ => None,
    }
}

fn compare_css_text(a: &Node, b: &Node) -> Option<Ordering> {
    let ctx = EvalContext::default();
    let left = comparison_text(a, &ctx)?;
    let right = comparison_text(b, &ctx)?;
    Some(left.cmp(&right))
}

/// 带引号字符串按去掉引号后的内容比较，`"a"` 与 `'a'` 相等。
fn comparison_text(node: &Node, ctx: &EvalContext) -> Option<String> {
    match node {
        Node::Quoted(quoted) => Some(quoted.value.clone()),
        other => other.to_css(ctx).ok(),
    }
}

/// 不具备比较能力的节点所包装的原始值。
enum Payload<'a> {
    Text(&'static str, &'a str),
    List(&'static str, &'a [Node]),
}

impl<'a> Payload<'a> {
    fn of(node: &'a Node) -> Option<Self> {
        let kind = node.type_name();
        match node {
            Node::Keyword(keyword) => Some(Payload::Text(kind, &keyword.value)),
            Node::UnicodeDescriptor(descriptor) => Some(Payload::Text(kind, &descriptor.value)),
            Node::Comment(comment) => Some(Payload::Text(kind, &comment.value)),
            Node::Value(value) => Some(Payload::List(kind, &value.value)),
            Node::Expression(expression) => Some(Payload::List(kind, &expression.value)),
            _ => None,
        }
    }
}
