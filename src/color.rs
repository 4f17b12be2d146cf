//! 颜色文本解析与 HSL 调整，供 `Color` 节点和内置颜色函数使用。
//! 内部统一使用 0~1 的归一化通道值。

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    /// 由 0~255 通道值构造。
    pub fn from_channels(rgb: [f64; 3], alpha: f64) -> Self {
        Self {
            r: rgb[0] / 255.0,
            g: rgb[1] / 255.0,
            b: rgb[2] / 255.0,
            a: alpha,
        }
    }

    /// 转回 0~255 通道值（不取整）。
    pub fn channels(self) -> [f64; 3] {
        [self.r * 255.0, self.g * 255.0, self.b * 255.0]
    }

    fn clamp(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }
}

/// 解析 `#rgb`、`#rrggbb`、`#rrggbbaa`、`rgb()` 与 `rgba()`。
pub fn parse_color(input: &str) -> Option<Rgba> {
    let trimmed = input.trim();
    if let Some(stripped) = trimmed.strip_prefix('#') {
        return parse_hex(stripped);
    }
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.starts_with("rgba") {
        return parse_rgb_function(&lowered, true);
    }
    if lowered.starts_with("rgb") {
        return parse_rgb_function(&lowered, false);
    }
    None
}

pub fn lighten(color: Rgba, amount: f64) -> Rgba {
    let (h, s, l) = rgb_to_hsl(color);
    hsl_to_rgb(h, s, (l + amount).clamp(0.0, 1.0), color.a)
}

pub fn darken(color: Rgba, amount: f64) -> Rgba {
    let (h, s, l) = rgb_to_hsl(color);
    hsl_to_rgb(h, s, (l - amount).clamp(0.0, 1.0), color.a)
}

pub fn fade(color: Rgba, amount: f64) -> Rgba {
    Rgba {
        a: amount.clamp(0.0, 1.0),
        ..color
    }
    .clamp()
}

/// `#rrggbb`；`shorten` 时能缩写的输出 `#rgb`。
pub fn format_hex(color: Rgba, shorten: bool) -> String {
    let c = color.clamp();
    let channels = [to_channel(c.r), to_channel(c.g), to_channel(c.b)];
    let hex: Vec<String> = channels.iter().map(|ch| format!("{ch:02x}")).collect();
    let short = hex.iter().all(|pair| pair[..1] == pair[1..]);
    if shorten && short {
        format!("#{}{}{}", &hex[0][..1], &hex[1][..1], &hex[2][..1])
    } else {
        format!("#{}", hex.concat())
    }
}

pub fn to_channel(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let value = |range: std::ops::Range<usize>| hex.get(range).and_then(hex_value);
    match hex.len() {
        3 => Some(Rgba {
            r: (value(0..1)? * 17) as f64 / 255.0,
            g: (value(1..2)? * 17) as f64 / 255.0,
            b: (value(2..3)? * 17) as f64 / 255.0,
            a: 1.0,
        }),
        6 | 8 => {
            let a = if hex.len() == 8 {
                value(6..8)? as f64 / 255.0
            } else {
                1.0
            };
            Some(Rgba {
                r: value(0..2)? as f64 / 255.0,
                g: value(2..4)? as f64 / 255.0,
                b: value(4..6)? as f64 / 255.0,
                a,
            })
        }
        _ => None,
    }
}

fn parse_rgb_function(input: &str, has_alpha: bool) -> Option<Rgba> {
    let start = input.find('(')? + 1;
    let end = input.rfind(')')?;
    let body = input.get(start..end)?;
    let parts: Vec<&str> = body.split(',').map(|s| s.trim()).collect();
    if (has_alpha && parts.len() != 4) || (!has_alpha && parts.len() != 3) {
        return None;
    }
    let r: u8 = parts[0].parse().ok()?;
    let g: u8 = parts[1].parse().ok()?;
    let b: u8 = parts[2].parse().ok()?;
    let a = if has_alpha {
        parse_alpha(parts[3])?
    } else {
        1.0
    };
    Some(Rgba {
        r: r as f64 / 255.0,
        g: g as f64 / 255.0,
        b: b as f64 / 255.0,
        a,
    })
}

fn parse_alpha(input: &str) -> Option<f64> {
    if let Some(value) = input.strip_suffix('%') {
        let num: f64 = value.parse().ok()?;
        Some((num / 100.0).clamp(0.0, 1.0))
    } else {
        input.parse().ok().map(|v: f64| v.clamp(0.0, 1.0))
    }
}

fn hex_value(hex: &str) -> Option<u8> {
    u8::from_str_radix(hex, 16).ok()
}

fn rgb_to_hsl(color: Rgba) -> (f64, f64, f64) {
    let Rgba { r, g, b, .. } = color;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if (max - r).abs() < f64::EPSILON {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    } / 6.0;

    (h, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64, alpha: f64) -> Rgba {
    if s <= 0.0 {
        return Rgba {
            r: l,
            g: l,
            b: l,
            a: alpha,
        };
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    Rgba {
        r: hue_to_rgb(p, q, h + 1.0 / 3.0),
        g: hue_to_rgb(p, q, h),
        b: hue_to_rgb(p, q, h - 1.0 / 3.0),
        a: alpha,
    }
    .clamp()
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    match t {
        _ if t < 1.0 / 6.0 => p + (q - p) * 6.0 * t,
        _ if t < 1.0 / 2.0 => q,
        _ if t < 2.0 / 3.0 => p + (q - p) * (2.0 / 3.0 - t) * 6.0,
        _ => p,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_functions() {
        let short = parse_color("#fff").unwrap();
        assert_eq!(short.channels(), [255.0, 255.0, 255.0]);
        let long = parse_color("#336699").unwrap();
        assert_eq!(format_hex(long, false), "#336699");
        let alpha = parse_color("rgba(0, 0, 0, 50%)").unwrap();
        assert_eq!(alpha.a, 0.5);
        assert!(parse_color("rgb(1, 2)").is_none());
        assert!(parse_color("#12").is_none());
    }

    #[test]
    fn lighten_and_darken_shift_lightness() {
        let brand = parse_color("#336699").unwrap();
        assert_eq!(format_hex(lighten(brand, 0.2), false), "#6699cc");
        assert_eq!(format_hex(darken(brand, 0.1), false), "#264c73");
        assert_eq!(fade(brand, 1.4).a, 1.0);
    }

    #[test]
    fn hex_shortens_only_when_possible() {
        let white = Rgba::from_channels([255.0, 255.0, 255.0], 1.0);
        assert_eq!(format_hex(white, true), "#fff");
        let brand = Rgba::from_channels([51.0, 102.0, 153.0], 1.0);
        assert_eq!(format_hex(brand, true), "#369");
        let odd = Rgba::from_channels([18.0, 52.0, 86.0], 1.0);
        assert_eq!(format_hex(odd, true), "#123456");
    }
}
