//! 复合单位（分子/分母原子序列）及其约分、换算规则。

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::cmp::Ordering;
use std::f64::consts::PI;
use std::fmt::{self, Display};

/// 可互相换算的三组单位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitGroup {
    Length,
    Duration,
    Angle,
}

impl UnitGroup {
    pub const ALL: [UnitGroup; 3] = [UnitGroup::Length, UnitGroup::Duration, UnitGroup::Angle];

    /// 单位到基准单位（米 / 秒 / 圈）的换算系数表。
    pub fn table(self) -> &'static IndexMap<&'static str, f64> {
        match self {
            UnitGroup::Length => &LENGTH,
            UnitGroup::Duration => &DURATION,
            UnitGroup::Angle => &ANGLE,
        }
    }

    pub fn factor(self, atom: &str) -> Option<f64> {
        self.table().get(atom).copied()
    }

    /// 推断单个单位名所属的分组。
    pub fn of(atom: &str) -> Option<UnitGroup> {
        Self::ALL.into_iter().find(|group| group.factor(atom).is_some())
    }
}

static LENGTH: Lazy<IndexMap<&'static str, f64>> = Lazy::new(|| {
    IndexMap::from([
        ("m", 1.0),
        ("cm", 0.01),
        ("mm", 0.001),
        ("in", 0.0254),
        ("px", 0.0254 / 96.0),
        ("pt", 0.0254 / 72.0),
        ("pc", 0.0254 / 72.0 * 12.0),
    ])
});

static DURATION: Lazy<IndexMap<&'static str, f64>> =
    Lazy::new(|| IndexMap::from([("s", 1.0), ("ms", 0.001)]));

static ANGLE: Lazy<IndexMap<&'static str, f64>> = Lazy::new(|| {
    IndexMap::from([
        ("rad", 1.0 / (2.0 * PI)),
        ("deg", 1.0 / 360.0),
        ("grad", 1.0 / 400.0),
        ("turn", 1.0),
    ])
});

const LENGTH_UNITS: [&str; 14] = [
    "px", "em", "ex", "ch", "rem", "in", "cm", "mm", "pc", "pt", "vw", "vh", "vmin", "vmax",
];

/// 换算目标：单个单位名，或按分组指定的目标单位。
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionTarget {
    Unit(String),
    Groups(IndexMap<UnitGroup, String>),
}

impl ConversionTarget {
    /// 展开为「分组 → 目标单位」映射，单位名只落入其所属分组。
    pub fn groups(&self) -> IndexMap<UnitGroup, String> {
        match self {
            ConversionTarget::Unit(target) => UnitGroup::ALL
                .into_iter()
                .filter(|group| group.factor(target).is_some())
                .map(|group| (group, target.clone()))
                .collect(),
            ConversionTarget::Groups(groups) => groups.clone(),
        }
    }

    /// 比较时使用的规范单位。
    pub fn canonical() -> Self {
        ConversionTarget::Groups(IndexMap::from([
            (UnitGroup::Length, "px".to_string()),
            (UnitGroup::Duration, "s".to_string()),
            (UnitGroup::Angle, "rad".to_string()),
        ]))
    }
}

impl From<&str> for ConversionTarget {
    fn from(value: &str) -> Self {
        ConversionTarget::Unit(value.to_string())
    }
}

impl From<IndexMap<UnitGroup, String>> for ConversionTarget {
    fn from(value: IndexMap<UnitGroup, String>) -> Self {
        ConversionTarget::Groups(value)
    }
}

/// 复合单位。分子、分母在每次修改后都保持字典序。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Unit {
    numerator: Vec<String>,
    denominator: Vec<String>,
    backup_unit: String,
}

impl Unit {
    pub fn new(numerator: &[&str], denominator: &[&str], backup_unit: &str) -> Self {
        Self::from_parts(
            numerator.iter().map(|atom| atom.to_string()).collect(),
            denominator.iter().map(|atom| atom.to_string()).collect(),
            backup_unit.to_string(),
        )
    }

    /// 以拥有所有权的序列构造；备用单位为空时取排序前的第一个分子。
    pub fn from_parts(
        mut numerator: Vec<String>,
        mut denominator: Vec<String>,
        backup_unit: String,
    ) -> Self {
        let backup_unit = if backup_unit.is_empty() {
            numerator.first().cloned().unwrap_or_default()
        } else {
            backup_unit
        };
        numerator.sort();
        denominator.sort();
        Self {
            numerator,
            denominator,
            backup_unit,
        }
    }

    /// 无单位。
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn numerator(&self) -> &[String] {
        &self.numerator
    }

    pub fn denominator(&self) -> &[String] {
        &self.denominator
    }

    pub fn backup_unit(&self) -> &str {
        &self.backup_unit
    }

    pub fn set_backup_unit(&mut self, backup_unit: &str) {
        self.backup_unit = backup_unit.to_string();
    }

    pub fn is(&self, unit: &str) -> bool {
        self.to_string().to_uppercase() == unit.to_uppercase()
    }

    pub fn is_length(&self) -> bool {
        self.numerator.iter().any(|atom| {
            LENGTH_UNITS
                .iter()
                .any(|length| atom.eq_ignore_ascii_case(length))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.numerator.is_empty() && self.denominator.is_empty()
    }

    pub fn is_singular(&self) -> bool {
        self.numerator.len() <= 1 && self.denominator.is_empty()
    }

    /// 对每个原子应用 `mapper(atom, is_denominator)`，随后重新排序。
    pub fn map<F>(&mut self, mut mapper: F)
    where
        F: FnMut(&str, bool) -> String,
    {
        for atom in self.numerator.iter_mut() {
            *atom = mapper(atom, false);
        }
        for atom in self.denominator.iter_mut() {
            *atom = mapper(atom, true);
        }
        self.numerator.sort();
        self.denominator.sort();
    }

    /// 每个换算分组中第一个出现的单位（先分子后分母）。
    pub fn used_units(&self) -> IndexMap<UnitGroup, String> {
        let mut result = IndexMap::new();
        for group in UnitGroup::ALL {
            let found = self
                .numerator
                .iter()
                .chain(self.denominator.iter())
                .find(|atom| group.factor(atom).is_some());
            if let Some(atom) = found {
                result.insert(group, atom.clone());
            }
        }
        result
    }

    /// 分子分母中相同的原子互相抵消。
    pub fn cancel(&mut self) {
        let mut counter: IndexMap<String, i64> = IndexMap::new();
        for atom in self.numerator.drain(..) {
            *counter.entry(atom).or_insert(0) += 1;
        }
        for atom in self.denominator.drain(..) {
            *counter.entry(atom).or_insert(0) -= 1;
        }

        for (atom, count) in counter {
            match count.cmp(&0) {
                Ordering::Greater => {
                    for _ in 0..count {
                        self.numerator.push(atom.clone());
                    }
                }
                Ordering::Less => {
                    for _ in 0..count.abs() {
                        self.denominator.push(atom.clone());
                    }
                }
                Ordering::Equal => {}
            }
        }

        self.numerator.sort();
        self.denominator.sort();
    }

    /// 乘法：分子、分母分别拼接后约分。
    pub fn multiply(&self, other: &Unit) -> Unit {
        let mut unit = self.clone();
        unit.numerator.extend(other.numerator.iter().cloned());
        unit.denominator.extend(other.denominator.iter().cloned());
        unit.numerator.sort();
        unit.denominator.sort();
        unit.cancel();
        unit
    }

    /// 除法：对方的分母进入分子、分子进入分母后约分。
    pub fn divide(&self, other: &Unit) -> Unit {
        let mut unit = self.clone();
        unit.numerator.extend(other.denominator.iter().cloned());
        unit.denominator.extend(other.numerator.iter().cloned());
        unit.numerator.sort();
        unit.denominator.sort();
        unit.cancel();
        unit
    }

    /// 单位字符串一致（忽略大小写）时视为相等，否则不可比较。
    pub fn compare(&self, other: &Unit) -> Option<Ordering> {
        self.is(&other.to_string()).then_some(Ordering::Equal)
    }

    /// 输出时使用的单位文本；严格单位模式下只允许单一分子。
    pub fn css_text(&self, strict_units: bool) -> &str {
        if self.numerator.len() == 1 {
            &self.numerator[0]
        } else if !strict_units && !self.backup_unit.is_empty() {
            &self.backup_unit
        } else if !strict_units && !self.denominator.is_empty() {
            &self.denominator[0]
        } else {
            ""
        }
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        f.write_str(&self.numerator.join("*"))?;
        for atom in &self.denominator {
            f.write_str("/")?;
            f.write_str(atom)?;
        }
        Ok(())
    }
}

impl From<&str> for Unit {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Unit::empty()
        } else {
            Unit::new(&[value], &[], value)
        }
    }
}

impl From<String> for Unit {
    fn from(value: String) -> Self {
        Unit::from(value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sorts_and_keeps_first_backup() {
        let unit = Unit::new(&["px", "em"], &["s"], "");
        assert_eq!(unit.numerator(), &["em".to_string(), "px".to_string()]);
        assert_eq!(unit.backup_unit(), "px");
        assert_eq!(unit.to_string(), "em*px/s");
    }

    #[test]
    fn display_keeps_empty_atoms() {
        let unit = Unit::new(&["", "px"], &[""], "");
        assert_eq!(unit.to_string(), "*px/");
        assert_eq!(Unit::new(&[], &["s"], "").to_string(), "/s");
        assert_eq!(Unit::empty().to_string(), "");
    }

    #[test]
    fn clone_is_independent() {
        let original = Unit::new(&["px"], &["s"], "");
        let mut cloned = original.clone();
        assert_eq!(cloned.to_string(), original.to_string());
        cloned.map(|atom, _| format!("{atom}x"));
        assert_eq!(original.to_string(), "px/s");
        assert_eq!(cloned.to_string(), "pxx/sx");
    }

    #[test]
    fn predicates() {
        assert!(Unit::new(&[], &[], "").is_empty());
        assert!(Unit::new(&["px"], &[], "").is_singular());
        assert!(!Unit::new(&["px", "em"], &[], "").is_singular());
        assert!(Unit::new(&["PX"], &[], "").is_length());
        assert!(!Unit::new(&["s"], &["px"], "").is_length());
        assert!(Unit::new(&["px"], &["s"], "").is("PX/S"));
    }

    #[test]
    fn cancel_removes_matching_atoms() {
        let mut unit = Unit::new(&["px", "px", "em"], &["px", "s", "s"], "");
        unit.cancel();
        assert_eq!(unit.to_string(), "em*px/s/s");

        let mut again = unit.clone();
        again.cancel();
        assert_eq!(again, unit);

        let mut gone = Unit::new(&["px"], &["px"], "");
        gone.cancel();
        assert!(gone.is_empty());
    }

    #[test]
    fn used_units_takes_first_of_each_group() {
        let unit = Unit::new(&["mm", "px"], &["ms", "deg"], "");
        let used = unit.used_units();
        assert_eq!(used.get(&UnitGroup::Length).map(String::as_str), Some("mm"));
        assert_eq!(used.get(&UnitGroup::Duration).map(String::as_str), Some("ms"));
        assert_eq!(used.get(&UnitGroup::Angle).map(String::as_str), Some("deg"));
        assert!(Unit::new(&["em"], &[], "").used_units().is_empty());
    }

    #[test]
    fn compare_by_text() {
        let a = Unit::new(&["px"], &[], "");
        assert_eq!(a.compare(&Unit::new(&["PX"], &[], "")), Some(Ordering::Equal));
        assert_eq!(a.compare(&Unit::new(&["em"], &[], "")), None);
    }

    #[test]
    fn string_target_selects_group() {
        let groups = ConversionTarget::from("ms").groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.get(&UnitGroup::Duration).map(String::as_str), Some("ms"));
        assert!(ConversionTarget::from("em").groups().is_empty());
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn map_propagates_panics() {
        let mut unit = Unit::new(&["px"], &[], "");
        unit.map(|_, _| panic!("boom"));
    }
}
