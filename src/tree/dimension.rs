//! 带单位的数值。

use super::{operate, Color, Comparable, Evaluable, GenCss, Node, NodeInfo};
use crate::context::EvalContext;
use crate::error::{LessError, LessResult};
use crate::output::CssOutput;
use crate::unit::{ConversionTarget, Unit};
use crate::utils::format_number;
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct Dimension {
    pub info: NodeInfo,
    pub value: f64,
    pub unit: Unit,
}

impl Dimension {
    /// NaN 视为无效数值。
    pub fn new(value: f64, unit: impl Into<Unit>) -> LessResult<Self> {
        if value.is_nan() {
            return Err(LessError::invalid_number("NaN"));
        }
        Ok(Self {
            info: NodeInfo::default(),
            value,
            unit: unit.into(),
        })
    }

    /// 从数值文本构造，例如 `"1.5"`。
    pub fn parse(input: &str, unit: impl Into<Unit>) -> LessResult<Self> {
        let value = input
            .trim()
            .parse::<f64>()
            .map_err(|_| LessError::invalid_number(input))?;
        Self::new(value, unit)
    }

    pub fn with_info(mut self, info: NodeInfo) -> Self {
        self.info = info;
        self
    }

    pub fn to_color(&self) -> Color {
        Color::from_rgb(self.value, self.value, self.value)
    }

    /// 四则运算。结果总是新实例，两个操作数都不会被修改。
    pub fn operate(&self, ctx: &EvalContext, op: &str, other: &Dimension) -> LessResult<Dimension> {
        let mut value = operate(op, self.value, other.value)?;
        let mut unit = self.unit.clone();

        match op {
            "+" | "-" => {
                if unit.is_empty() {
                    unit = other.unit.clone();
                    if !self.unit.backup_unit().is_empty() {
                        unit.set_backup_unit(self.unit.backup_unit());
                    }
                } else if other.unit.is_empty() {
                    // 保留自身单位
                } else {
                    let converted = other.convert_to(ConversionTarget::Groups(self.unit.used_units()));
                    if ctx.strict_units && converted.unit.to_string() != unit.to_string() {
                        log::debug!(
                            target: "less_tree",
                            "strict units rejected {} {op} {}",
                            unit,
                            converted.unit
                        );
                        return Err(LessError::eval(format!(
                            "Incompatible units. Change the units or use the unit function. Bad units: '{}' and '{}'.",
                            unit, converted.unit
                        )));
                    }
                    value = operate(op, self.value, converted.value)?;
                }
            }
            "*" => unit = unit.multiply(&other.unit),
            "/" | "./" => unit = unit.divide(&other.unit),
            _ => {}
        }

        Ok(Dimension {
            info: self.info.clone(),
            value,
            unit,
        })
    }

    /// 把属于目标分组的单位原子换算为目标单位，其余原子保持不变。
    pub fn convert_to(&self, target: impl Into<ConversionTarget>) -> Dimension {
        let mut value = self.value;
        let mut unit = self.unit.clone();

        for (group, target_unit) in target.into().groups() {
            let Some(target_factor) = group.factor(&target_unit) else {
                continue;
            };
            unit.map(|atom, is_denominator| match group.factor(atom) {
                Some(factor) => {
                    if is_denominator {
                        value /= factor / target_factor;
                    } else {
                        value *= factor / target_factor;
                    }
                    target_unit.clone()
                }
                None => atom.to_string(),
            });
        }
        unit.cancel();

        Dimension {
            info: self.info.clone(),
            value,
            unit,
        }
    }

    /// 换算到 px / s / rad 规范单位。
    pub fn unify(&self) -> Dimension {
        self.convert_to(ConversionTarget::canonical())
    }
}

impl Evaluable for Dimension {
    fn eval(&self, _ctx: &mut EvalContext) -> LessResult<Node> {
        Ok(Node::Dimension(self.clone()))
    }
}

impl Comparable for Dimension {
    fn compare(&self, other: &Node) -> Option<Ordering> {
        let Node::Dimension(other) = other else {
            return None;
        };
        if self.unit.is_empty() || other.unit.is_empty() {
            return self.value.partial_cmp(&other.value);
        }
        let a = self.unify();
        let b = other.unify();
        a.unit.compare(&b.unit)?;
        a.value.partial_cmp(&b.value)
    }
}

impl GenCss for Dimension {
    fn gen_css(&self, ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        if ctx.strict_units && !self.unit.is_singular() {
            return Err(LessError::eval(format!(
                "Multiple units in dimension. Correct the units or use the unit function. Bad unit: {}",
                self.unit
            )));
        }

        let value = ctx.fround(self.value);
        let mut text = format_number(ctx, self.value);
        if ctx.compress {
            if value == 0.0 && self.unit.is_length() {
                output.add(&text, None, None);
                return Ok(());
            }
            if value > 0.0 && value < 1.0 {
                text.remove(0);
            }
        }

        text.push_str(self.unit.css_text(ctx.strict_units));
        output.add(&text, None, None);
        Ok(())
    }
}
