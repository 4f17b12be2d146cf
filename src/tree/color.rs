use super::{operate, Comparable, Evaluable, GenCss, Node, NodeInfo};
use crate::color::{format_hex, parse_color, Rgba};
use crate::context::EvalContext;
use crate::error::{LessError, LessResult};
use crate::output::CssOutput;
use crate::utils::format_number;
use std::cmp::Ordering;

/// 颜色值：0~255 通道与透明度，可保留书写时的原始文本。
#[derive(Debug, Clone)]
pub struct Color {
    pub info: NodeInfo,
    pub rgb: [f64; 3],
    pub alpha: f64,
    pub value: Option<String>,
}

impl Color {
    pub fn from_rgb(r: f64, g: f64, b: f64) -> Self {
        Self::from_rgba(r, g, b, 1.0)
    }

    pub fn from_rgba(r: f64, g: f64, b: f64, alpha: f64) -> Self {
        Self {
            info: NodeInfo::default(),
            rgb: [r, g, b],
            alpha,
            value: None,
        }
    }

    /// 解析十六进制或 `rgb()` 文本，并记住原始写法。
    pub fn parse(text: &str) -> LessResult<Self> {
        let rgba =
            parse_color(text).ok_or_else(|| LessError::eval(format!("无法解析颜色: {text}")))?;
        let mut color = Self::from_normalized(rgba);
        color.value = Some(text.trim().to_string());
        Ok(color)
    }

    pub fn from_normalized(rgba: Rgba) -> Self {
        let [r, g, b] = rgba.channels();
        Self::from_rgba(r, g, b, rgba.a)
    }

    pub fn to_normalized(&self) -> Rgba {
        Rgba::from_channels(self.rgb, self.alpha)
    }

    /// 逐通道运算，透明度按叠加规则合成。
    pub fn operate(&self, _ctx: &EvalContext, op: &str, other: &Color) -> LessResult<Color> {
        let alpha = self.alpha * (1.0 - other.alpha) + other.alpha;
        let mut rgb = [0.0; 3];
        for (channel, slot) in rgb.iter_mut().enumerate() {
            *slot = operate(op, self.rgb[channel], other.rgb[channel])?;
        }
        Ok(Color {
            info: self.info.clone(),
            rgb,
            alpha,
            value: None,
        })
    }

    fn rgba_text(&self, ctx: &EvalContext, alpha: f64) -> String {
        let separator = if ctx.compress { "," } else { ", " };
        let channels: Vec<String> = self
            .rgb
            .iter()
            .map(|channel| channel.round().clamp(0.0, 255.0).to_string())
            .collect();
        format!(
            "rgba({}{separator}{})",
            channels.join(separator),
            format_number(ctx, alpha.clamp(0.0, 1.0))
        )
    }
}

impl Evaluable for Color {
    fn eval(&self, _ctx: &mut EvalContext) -> LessResult<Node> {
        Ok(Node::Color(self.clone()))
    }
}

impl Comparable for Color {
    fn compare(&self, other: &Node) -> Option<Ordering> {
        match other {
            Node::Color(other) if self.rgb == other.rgb && self.alpha == other.alpha => {
                Some(Ordering::Equal)
            }
            _ => None,
        }
    }
}

impl GenCss for Color {
    fn gen_css(&self, ctx: &EvalContext, output: &mut dyn CssOutput) -> LessResult<()> {
        let alpha = ctx.fround(self.alpha);
        let css = match &self.value {
            Some(original) if !original.starts_with("rgb") => original.clone(),
            _ if alpha < 1.0 => self.rgba_text(ctx, alpha),
            _ => format_hex(self.to_normalized(), ctx.compress),
        };
        output.add(&css, None, None);
        Ok(())
    }
}
