//! Color themes for gv.

use std::collections::HashMap;

use ratatui::style::Color;
use tracing::warn;

use crate::highlight::StyleId;

/// A complete theme definition.
///
/// Field names are self-documenting (e.g., `bg_elevated` = raised surface
/// background, `text_muted` = muted text color).
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Theme {
    // Base colors
    pub bg: Color,
    pub bg_elevated: Color,
    pub bg_selected: Color,

    // Borders
    pub border_dim: Color,
    pub gutter_sep: Color,

    // Text
    pub text_faint: Color,
    pub text_muted: Color,
    pub text_normal: Color,
    pub text_bright: Color,

    // Accent
    pub accent: Color,
    pub folder: Color,

    // Diff
    pub stat_added: Color,
    pub stat_removed: Color,
    pub diff_delete_bg: Color,
    pub diff_insert_bg: Color,
    pub diff_empty_bg: Color,
    pub file_header_bg: Color,

    // Status
    pub error: Color,
    pub warning: Color,

    // Syntax highlighting
    pub syn_keyword: Color,
    pub syn_type: Color,
    pub syn_function: Color,
    pub syn_string: Color,
    pub syn_number: Color,
    pub syn_comment: Color,
    pub syn_operator: Color,
    pub syn_punctuation: Color,
    pub syn_constant: Color,
    pub syn_property: Color,
    pub syn_attribute: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::builtin_default()
    }
}

impl Theme {
    /// Names of the built-in themes.
    pub const BUILTIN: &'static [&'static str] = &["default", "light"];

    /// Load a built-in theme by name, falling back to `default`.
    pub fn load(name: &str) -> Self {
        match name {
            "default" | "dark" => Self::builtin_default(),
            "light" => Self::light(),
            other => {
                warn!(theme = other, "unknown theme; using default");
                Self::builtin_default()
            }
        }
    }

    /// Default dark theme.
    pub fn builtin_default() -> Self {
        Self {
            bg: Color::Reset,
            bg_elevated: Color::Rgb(36, 36, 44),
            bg_selected: Color::Rgb(45, 45, 55),

            border_dim: Color::Rgb(68, 68, 68),
            gutter_sep: Color::Rgb(58, 58, 68),

            text_faint: Color::Rgb(88, 88, 88),
            text_muted: Color::Rgb(118, 118, 118),
            text_normal: Color::Rgb(188, 188, 188),
            text_bright: Color::Rgb(230, 230, 235),

            accent: Color::Rgb(95, 175, 255),
            folder: Color::Rgb(118, 118, 118),

            stat_added: Color::Rgb(95, 215, 95),
            stat_removed: Color::Rgb(255, 95, 95),
            diff_delete_bg: Color::Rgb(58, 28, 28),
            diff_insert_bg: Color::Rgb(28, 58, 28),
            diff_empty_bg: Color::Rgb(26, 26, 30),
            file_header_bg: Color::Rgb(48, 48, 48),

            error: Color::Rgb(215, 85, 85),
            warning: Color::Rgb(215, 175, 80),

            syn_keyword: Color::Rgb(198, 120, 221),
            syn_type: Color::Rgb(229, 192, 123),
            syn_function: Color::Rgb(97, 175, 239),
            syn_string: Color::Rgb(152, 195, 121),
            syn_number: Color::Rgb(209, 154, 102),
            syn_comment: Color::Rgb(92, 99, 112),
            syn_operator: Color::Rgb(171, 178, 191),
            syn_punctuation: Color::Rgb(120, 120, 135),
            syn_constant: Color::Rgb(86, 182, 194),
            syn_property: Color::Rgb(224, 108, 117),
            syn_attribute: Color::Rgb(229, 192, 123),
        }
    }

    /// Light theme for bright terminals.
    pub fn light() -> Self {
        Self {
            bg: Color::Reset,
            bg_elevated: Color::Rgb(232, 232, 236),
            bg_selected: Color::Rgb(214, 224, 240),

            border_dim: Color::Rgb(190, 190, 196),
            gutter_sep: Color::Rgb(205, 205, 210),

            text_faint: Color::Rgb(170, 170, 176),
            text_muted: Color::Rgb(120, 120, 128),
            text_normal: Color::Rgb(36, 41, 47),
            text_bright: Color::Rgb(0, 0, 0),

            accent: Color::Rgb(9, 105, 218),
            folder: Color::Rgb(110, 119, 129),

            stat_added: Color::Rgb(26, 127, 55),
            stat_removed: Color::Rgb(207, 34, 46),
            diff_delete_bg: Color::Rgb(255, 235, 233),
            diff_insert_bg: Color::Rgb(230, 255, 236),
            diff_empty_bg: Color::Rgb(246, 248, 250),
            file_header_bg: Color::Rgb(221, 225, 230),

            error: Color::Rgb(207, 34, 46),
            warning: Color::Rgb(154, 103, 0),

            syn_keyword: Color::Rgb(207, 34, 46),
            syn_type: Color::Rgb(149, 56, 0),
            syn_function: Color::Rgb(130, 80, 223),
            syn_string: Color::Rgb(10, 48, 105),
            syn_number: Color::Rgb(5, 80, 174),
            syn_comment: Color::Rgb(110, 119, 129),
            syn_operator: Color::Rgb(207, 34, 46),
            syn_punctuation: Color::Rgb(36, 41, 47),
            syn_constant: Color::Rgb(5, 80, 174),
            syn_property: Color::Rgb(5, 80, 174),
            syn_attribute: Color::Rgb(149, 56, 0),
        }
    }

    /// Apply `#rrggbb` overrides keyed by field name.
    ///
    /// Unknown keys and malformed colors are skipped with a warning.
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (key, value) in overrides {
            let Some(color) = parse_hex(value) else {
                warn!(key = %key, value = %value, "invalid theme color");
                continue;
            };
            match self.slot_mut(key) {
                Some(slot) => *slot = color,
                None => warn!(key = %key, "unknown theme color key"),
            }
        }
        self
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Color> {
        let slot = match key {
            "bg" => &mut self.bg,
            "bg_elevated" => &mut self.bg_elevated,
            "bg_selected" => &mut self.bg_selected,
            "border_dim" => &mut self.border_dim,
            "gutter_sep" => &mut self.gutter_sep,
            "text_faint" => &mut self.text_faint,
            "text_muted" => &mut self.text_muted,
            "text_normal" => &mut self.text_normal,
            "text_bright" => &mut self.text_bright,
            "accent" => &mut self.accent,
            "folder" => &mut self.folder,
            "stat_added" => &mut self.stat_added,
            "stat_removed" => &mut self.stat_removed,
            "diff_delete_bg" => &mut self.diff_delete_bg,
            "diff_insert_bg" => &mut self.diff_insert_bg,
            "diff_empty_bg" => &mut self.diff_empty_bg,
            "file_header_bg" => &mut self.file_header_bg,
            "error" => &mut self.error,
            "warning" => &mut self.warning,
            "syn_keyword" => &mut self.syn_keyword,
            "syn_type" => &mut self.syn_type,
            "syn_function" => &mut self.syn_function,
            "syn_string" => &mut self.syn_string,
            "syn_number" => &mut self.syn_number,
            "syn_comment" => &mut self.syn_comment,
            "syn_operator" => &mut self.syn_operator,
            "syn_punctuation" => &mut self.syn_punctuation,
            "syn_constant" => &mut self.syn_constant,
            "syn_property" => &mut self.syn_property,
            "syn_attribute" => &mut self.syn_attribute,
            _ => return None,
        };
        Some(slot)
    }

    /// Foreground color for a syntax style.
    pub fn syntax(&self, style: StyleId) -> Color {
        match style {
            StyleId::Default | StyleId::Variable => self.text_normal,
            StyleId::Keyword => self.syn_keyword,
            StyleId::Type => self.syn_type,
            StyleId::Function => self.syn_function,
            StyleId::String => self.syn_string,
            StyleId::Number => self.syn_number,
            StyleId::Comment => self.syn_comment,
            StyleId::Operator => self.syn_operator,
            StyleId::Punctuation => self.syn_punctuation,
            StyleId::Constant => self.syn_constant,
            StyleId::Property => self.syn_property,
            StyleId::Attribute => self.syn_attribute,
        }
    }
}

/// Parse a `#rrggbb` color string.
fn parse_hex(s: &str) -> Option<Color> {
    let s = s.trim().trim_start_matches('#');
    if s.len() != 6 || !s.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;

    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_known_and_unknown() {
        assert_eq!(Theme::load("light"), Theme::light());
        assert_eq!(Theme::load("nope"), Theme::builtin_default());
        assert!(Theme::BUILTIN.contains(&"default"));
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex("#ff0080"), Some(Color::Rgb(255, 0, 128)));
        assert_eq!(parse_hex("00ff00"), Some(Color::Rgb(0, 255, 0)));
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("#gg0000"), None);
    }

    #[test]
    fn overrides_apply_known_keys_only() {
        let overrides = HashMap::from([
            ("accent".to_string(), "#010203".to_string()),
            ("bogus".to_string(), "#ffffff".to_string()),
            ("error".to_string(), "red".to_string()),
        ]);
        let theme = Theme::builtin_default().with_overrides(&overrides);
        assert_eq!(theme.accent, Color::Rgb(1, 2, 3));
        assert_eq!(theme.error, Theme::builtin_default().error);
    }

    #[test]
    fn syntax_colors_map_through_theme() {
        let theme = Theme::light();
        assert_eq!(theme.syntax(StyleId::Keyword), theme.syn_keyword);
        assert_eq!(theme.syntax(StyleId::Variable), theme.text_normal);
    }
}
