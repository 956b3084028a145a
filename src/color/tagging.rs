//! Rule-based color tags
//!
//! Maps one color to at most one human-readable tag. Rules are boxes in
//! RGB space, checked in priority order; the first box containing the
//! color names it. Colors outside every box (mid grays, muted tones) get
//! no tag.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ColorSample;

/// Tag vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Cyan,
    Pastel,
    Black,
    White,
}

impl ColorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorTag::Red => "red",
            ColorTag::Green => "green",
            ColorTag::Blue => "blue",
            ColorTag::Yellow => "yellow",
            ColorTag::Purple => "purple",
            ColorTag::Cyan => "cyan",
            ColorTag::Pastel => "pastel",
            ColorTag::Black => "black",
            ColorTag::White => "white",
        }
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive range of one 8-bit channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRange {
    pub min: u8,
    pub max: u8,
}

impl ChannelRange {
    pub const FULL: ChannelRange = ChannelRange { min: 0, max: 255 };

    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    const fn at_most(max: u8) -> Self {
        Self { min: 0, max }
    }

    const fn at_least(min: u8) -> Self {
        Self { min, max: 255 }
    }

    pub fn contains(&self, value: u8) -> bool {
        self.min <= value && value <= self.max
    }
}

/// One entry of the tag table: a conjunction of per-channel ranges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    pub tag: ColorTag,
    pub red: ChannelRange,
    pub green: ChannelRange,
    pub blue: ChannelRange,
}

impl TagRule {
    const fn new(tag: ColorTag, red: ChannelRange, green: ChannelRange, blue: ChannelRange) -> Self {
        Self { tag, red, green, blue }
    }

    pub fn matches(&self, color: ColorSample) -> bool {
        self.red.contains(color.r) && self.green.contains(color.g) && self.blue.contains(color.b)
    }

    /// False when some channel range is empty, so the rule can never fire
    pub fn is_satisfiable(&self) -> bool {
        [self.red, self.green, self.blue].iter().all(|range| range.min <= range.max)
    }
}

/// Built-in rule table, in priority order.
///
/// Every box is disjoint from every other, so a color matches at most one
/// rule. Pastel is the light region (all channels at least 170) minus the
/// white box and is therefore split into three boxes.
pub fn default_rules() -> Vec<TagRule> {
    use ChannelRange as R;

    vec![
        TagRule::new(ColorTag::Red, R::at_least(150), R::at_most(100), R::at_most(100)),
        TagRule::new(ColorTag::Green, R::at_most(100), R::at_least(150), R::at_most(100)),
        TagRule::new(ColorTag::Blue, R::at_most(100), R::at_most(100), R::at_least(150)),
        TagRule::new(ColorTag::Yellow, R::at_least(150), R::at_least(150), R::at_most(100)),
        TagRule::new(ColorTag::Purple, R::at_least(120), R::at_most(100), R::at_least(120)),
        TagRule::new(ColorTag::Cyan, R::at_most(100), R::at_least(150), R::at_least(150)),
        TagRule::new(ColorTag::Black, R::at_most(60), R::at_most(60), R::at_most(60)),
        TagRule::new(ColorTag::White, R::at_least(200), R::at_least(200), R::at_least(200)),
        TagRule::new(ColorTag::Pastel, R::new(170, 199), R::at_least(170), R::at_least(170)),
        TagRule::new(ColorTag::Pastel, R::at_least(200), R::new(170, 199), R::at_least(170)),
        TagRule::new(ColorTag::Pastel, R::at_least(200), R::at_least(200), R::new(170, 199)),
    ]
}

/// Derives a color tag from a single color
#[derive(Debug, Clone)]
pub struct TagDeriver {
    rules: Vec<TagRule>,
}

impl Default for TagDeriver {
    fn default() -> Self {
        Self::new()
    }
}

impl TagDeriver {
    /// Create a tag deriver with the built-in rule table
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Create a tag deriver with a custom rule table (priority order)
    pub fn with_rules(rules: Vec<TagRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[TagRule] {
        &self.rules
    }

    /// First matching tag, or `None` when no rule covers the color
    pub fn tag(&self, color: ColorSample) -> Option<ColorTag> {
        self.rules
            .iter()
            .find(|rule| rule.matches(color))
            .map(|rule| rule.tag)
    }
}
