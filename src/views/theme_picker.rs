use maud::{Markup, html};

use crate::theme::{THEME_CYCLE_CHORD, ThemeName};

pub fn render(current: ThemeName) -> Markup {
    let hint = format!("Press {THEME_CYCLE_CHORD} to cycle themes");
    html! {
        label class="hp-theme-picker" title=(hint) {
            span class="hp-visually-hidden" { "Color theme" }
            select id="theme-picker" name="theme" {
                @for theme in ThemeName::ALL {
                    @let d = theme.descriptor();
                    option value=(theme.as_str()) title=(d.description) selected[theme == current] {
                        (d.label)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_theme_and_selects_current() {
        let html = render(ThemeName::BlueGulf).into_string();
        for t in ThemeName::ALL {
            assert!(html.contains(&format!(r#"value="{}""#, t.as_str())));
        }
        assert_eq!(html.matches("selected").count(), 1);
        assert!(html.contains("Blue Gulf</option>"));
        assert!(html.contains("Ctrl+Shift+T"));
    }
}
