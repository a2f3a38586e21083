use std::fmt::Write as _;

use crate::document::THEME_ATTRIBUTE;
use crate::theme::{Palette, ThemeName, is_hex_color};

/// CSS custom properties for every theme.
///
/// `default` lands on `:root`; the others are keyed on the root marker so the
/// stylesheet follows the theme without any script involvement.
pub fn theme_stylesheet() -> String {
    let mut out = String::new();
    for theme in ThemeName::ALL {
        let selector = match theme {
            ThemeName::Default => ":root".to_string(),
            other => format!(":root[{}=\"{}\"]", THEME_ATTRIBUTE, other.as_str()),
        };
        out.push_str(&selector);
        out.push_str(" {\n");
        push_palette(&mut out, &theme.descriptor().palette);
        out.push_str("}\n");
    }
    out
}

fn push_palette(out: &mut String, palette: &Palette) {
    for (role, color) in palette.roles() {
        let _ = writeln!(out, "  --color-{role}: {color};");
        if let Some((r, g, b)) = hex_to_rgb(color) {
            // Space-separated channels for `rgb(var(--color-x-rgb) / 0.5)`.
            let _ = writeln!(out, "  --color-{role}-rgb: {r} {g} {b};");
        }
    }
}

fn hex_to_rgb(color: &str) -> Option<(u8, u8, u8)> {
    if !is_hex_color(color) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&color[i..i + 2], 16).ok();
    Some((channel(1)?, channel(3)?, channel(5)?))
}

/// Base stylesheet followed by the theme variables.
pub fn bundle_css() -> String {
    let mut bundled = String::with_capacity(crate::builtin::BUILTIN_CSS.len() + 2048);
    bundled.push_str(crate::builtin::BUILTIN_CSS);
    bundled.push('\n');
    bundled.push_str(&theme_stylesheet());
    bundled
}
