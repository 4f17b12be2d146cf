use crate::context::EvalContext;
use crate::error::LessResult;
use crate::output::CssOutput;
use crate::tree::{Node, Ruleset};
use crate::utils::indent;

/// 一个待输出的块：选择器为空时规则直接输出，不带花括号。
struct Block<'a> {
    selectors: &'a [String],
    items: Vec<&'a Node>,
}

/// 负责将求值后的规则集树展开为最终 CSS 文本。
pub struct Serializer<'a> {
    ctx: &'a EvalContext,
}

impl<'a> Serializer<'a> {
    pub fn new(ctx: &'a EvalContext) -> Self {
        Self { ctx }
    }

    pub fn write(&self, ruleset: &Ruleset, output: &mut dyn CssOutput) -> LessResult<()> {
        let mut blocks = Vec::new();
        self.collect(ruleset, &mut blocks);

        let mut previous_bare = false;
        for (idx, block) in blocks.iter().enumerate() {
            let bare = block.selectors.is_empty();
            if idx > 0 && !self.ctx.compress {
                output.add(if bare || previous_bare { "\n" } else { "\n\n" }, None, None);
            }
            if bare {
                self.write_bare(block, output)?;
            } else {
                self.write_block(block, output)?;
            }
            previous_bare = bare;
        }
        Ok(())
    }

    /// 嵌套规则集被展开到父块之后；没有选择器的规则集里每条规则单独成块，保持原有顺序。
    fn collect<'n>(&self, ruleset: &'n Ruleset, blocks: &mut Vec<Block<'n>>) {
        if ruleset.selectors.is_empty() {
            for rule in ruleset.rules() {
                match rule {
                    Node::Ruleset(child) if is_visible(rule) => self.collect(child, blocks),
                    _ if self.is_rendered(rule) => blocks.push(Block {
                        selectors: &ruleset.selectors,
                        items: vec![rule],
                    }),
                    _ => {}
                }
            }
            return;
        }

        let items: Vec<&Node> = ruleset
            .rules()
            .iter()
            .filter(|rule| self.is_rendered(rule))
            .collect();
        if !items.is_empty() {
            blocks.push(Block {
                selectors: &ruleset.selectors,
                items,
            });
        }
        for rule in ruleset.rules() {
            if let Node::Ruleset(child) = rule {
                if is_visible(rule) {
                    self.collect(child, blocks);
                }
            }
        }
    }

    fn is_rendered(&self, node: &Node) -> bool {
        if !is_visible(node) {
            return false;
        }
        match node {
            Node::Declaration(declaration) => !declaration.variable,
            Node::Comment(comment) => !comment.is_silent(self.ctx),
            Node::Ruleset(_)
            | Node::DetachedRuleset(_)
            | Node::Variable(_)
            | Node::VariableCall(_)
            | Node::Condition(_) => false,
            _ => true,
        }
    }

    fn write_bare(&self, block: &Block<'_>, output: &mut dyn CssOutput) -> LessResult<()> {
        let level = self.ctx.tab_level.get();
        for item in &block.items {
            if !self.ctx.compress {
                output.add(&indent(level), None, None);
            }
            self.write_item(item, true, output)?;
        }
        Ok(())
    }

    fn write_block(&self, block: &Block<'_>, output: &mut dyn CssOutput) -> LessResult<()> {
        let level = self.ctx.tab_level.get();
        let compress = self.ctx.compress;

        if compress {
            output.add(&block.selectors.join(","), None, None);
            output.add("{", None, None);
        } else {
            output.add(&indent(level), None, None);
            output.add(&block.selectors.join(", "), None, None);
            output.add(" {\n", None, None);
        }

        self.ctx.tab_level.set(level + 1);
        let result = self.write_items(block, output);
        self.ctx.tab_level.set(level);
        result?;

        if compress {
            output.add("}", None, None);
        } else {
            output.add(&indent(level), None, None);
            output.add("}", None, None);
        }
        Ok(())
    }

    fn write_items(&self, block: &Block<'_>, output: &mut dyn CssOutput) -> LessResult<()> {
        let level = self.ctx.tab_level.get();
        for (idx, item) in block.items.iter().enumerate() {
            if !self.ctx.compress {
                output.add(&indent(level), None, None);
            }
            self.write_item(item, idx + 1 == block.items.len(), output)?;
            if !self.ctx.compress {
                output.add("\n", None, None);
            }
        }
        Ok(())
    }

    fn write_item(&self, item: &Node, last: bool, output: &mut dyn CssOutput) -> LessResult<()> {
        let previous = self.ctx.last_rule.replace(last);
        let result = item.gen_css(self.ctx, output);
        self.ctx.last_rule.set(previous);
        result
    }
}

fn is_visible(node: &Node) -> bool {
    !node.blocks_visibility() || node.info().is_visible() == Some(true)
}
