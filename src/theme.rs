//! Handle the color theme
use ratatui::style::{Color, Modifier, Style, Stylize as _};

use crate::options::AutofillOptions;

/// The color scheme of autofill's UI
///
/// <pre>
/// +---------------------------------+
/// | [Rick Sanchez x] [Morty Smith x] |  --> chip / chip_current & chip_remove
/// | > mor                         v |  --> prompt & query (placeholder) & caret
/// +---------------------------------+
/// | [x] Morty Smith                 |  --> selected & normal & matched
/// |     species: Human              |  --> details
/// | [ ] Evil Morty                  |  --> current & current_match
/// +---------------------------------+  --> border
/// </pre>
#[derive(Copy, Clone, Debug, Default)]
pub struct ColorTheme {
    /// Option names and general text
    pub normal: Style,
    /// Matched text on non-current options
    pub matched: Style,
    /// Highlighted option, non-matched text
    pub current: Style,
    /// Highlighted option, matched text
    pub current_match: Style,
    /// Secondary lines of an option
    pub details: Style,
    /// Query text
    pub query: Style,
    /// Placeholder shown while the query is empty
    pub placeholder: Style,
    /// Prompt prefix
    pub prompt: Style,
    /// Open/closed indicator
    pub caret: Style,
    /// Checkbox of selected options
    pub selected: Style,
    /// Selected value
    pub chip: Style,
    /// Highlighted selected value
    pub chip_current: Style,
    /// Remove mark of a selected value
    pub chip_remove: Style,
    /// Loading and empty messages
    pub info: Style,
    /// Search errors
    pub error: Style,
    /// Popover border
    pub border: Style,
}

impl ColorTheme {
    /// Setup the theme from the options
    pub fn init_from_options(options: &AutofillOptions) -> ColorTheme {
        if let Some(color) = options.color.as_deref() {
            ColorTheme::from_options(color)
        } else {
            match std::env::var_os("NO_COLOR") {
                Some(no_color) if !no_color.is_empty() => ColorTheme::none(),
                _ => ColorTheme::dark256(),
            }
        }
    }

    /// No colors, highlighting relies on modifiers only
    pub fn none() -> Self {
        let base = Self::default();
        Self {
            matched: base.matched.bold(),
            current: base.current.reversed(),
            current_match: base.current_match.reversed().bold(),
            placeholder: base.placeholder.dim(),
            details: base.details.dim(),
            chip_current: base.chip_current.reversed(),
            error: base.error.bold(),
            ..base
        }
    }

    fn bw() -> Self {
        let base = ColorTheme::none();
        ColorTheme {
            matched: base.matched.underlined(),
            current_match: base.current_match.underlined(),
            chip: base.chip.underlined(),
            ..base
        }
    }

    fn default16() -> Self {
        let base = ColorTheme::none();
        ColorTheme {
            matched: base.matched.fg(Color::Green),
            current: Style::default().fg(Color::Yellow),
            current_match: Style::default().fg(Color::Green).bold(),
            details: base.details.fg(Color::White),
            prompt: base.prompt.fg(Color::Blue),
            caret: base.caret.fg(Color::Blue),
            selected: base.selected.fg(Color::Magenta),
            chip: base.chip.fg(Color::Black).bg(Color::Cyan),
            chip_current: Style::default().fg(Color::Black).bg(Color::Yellow),
            chip_remove: base.chip_remove.fg(Color::Red),
            info: base.info.fg(Color::White),
            error: base.error.fg(Color::Red),
            border: base.border.fg(Color::Black),
            ..base
        }
    }

    fn dark256() -> Self {
        let base = ColorTheme::none();
        ColorTheme {
            matched: base.matched.fg(Color::Indexed(108)),
            current: Style::default().bg(Color::Indexed(236)),
            current_match: Style::default().fg(Color::Indexed(151)).bg(Color::Indexed(236)).bold(),
            details: base.details.fg(Color::Indexed(244)),
            prompt: base.prompt.fg(Color::Indexed(110)),
            caret: base.caret.fg(Color::Indexed(110)),
            selected: base.selected.fg(Color::Indexed(168)),
            chip: base.chip.fg(Color::Indexed(254)).bg(Color::Indexed(238)),
            chip_current: Style::default().fg(Color::Indexed(234)).bg(Color::Indexed(186)),
            chip_remove: base.chip_remove.fg(Color::Indexed(161)),
            info: base.info.fg(Color::Indexed(144)),
            error: base.error.fg(Color::Indexed(196)),
            border: base.border.fg(Color::Indexed(59)),
            ..base
        }
    }

    fn light256() -> Self {
        let base = ColorTheme::none();
        ColorTheme {
            matched: base.matched.fg(Color::Indexed(0)).bg(Color::Indexed(220)),
            current: Style::default().bg(Color::Indexed(251)),
            current_match: Style::default().fg(Color::Indexed(66)).bg(Color::Indexed(251)).bold(),
            details: base.details.fg(Color::Indexed(241)),
            prompt: base.prompt.fg(Color::Indexed(25)),
            caret: base.caret.fg(Color::Indexed(25)),
            selected: base.selected.fg(Color::Indexed(168)),
            chip: base.chip.fg(Color::Indexed(235)).bg(Color::Indexed(253)),
            chip_current: Style::default().fg(Color::Indexed(255)).bg(Color::Indexed(31)),
            chip_remove: base.chip_remove.fg(Color::Indexed(161)),
            info: base.info.fg(Color::Indexed(101)),
            error: base.error.fg(Color::Indexed(160)),
            border: base.border.fg(Color::Indexed(145)),
            ..base
        }
    }

    fn set_color(&mut self, name: &str, spec: &str) {
        let spec_parts: Vec<_> = spec.split(['+', ':']).collect();

        let raw_color = spec_parts[0];
        let new_color = if raw_color.len() == 7 && raw_color.starts_with('#') {
            let r = u8::from_str_radix(&raw_color[1..3], 16).unwrap_or(255);
            let g = u8::from_str_radix(&raw_color[3..5], 16).unwrap_or(255);
            let b = u8::from_str_radix(&raw_color[5..7], 16).unwrap_or(255);
            Some(Color::Rgb(r, g, b))
        } else {
            raw_color.parse::<u8>().ok().map(Color::Indexed).or_else(|| {
                debug!("Unknown color '{}'", spec_parts[0]);
                None
            })
        };

        let mut modifier = Modifier::empty();
        for part in spec_parts.iter().skip(1) {
            if matches!(*part, "x" | "regular") {
                modifier = Modifier::empty()
            } else {
                modifier |= match *part {
                    "b" | "bold" => Modifier::BOLD,
                    "u" | "underlined" => Modifier::UNDERLINED,
                    "d" | "dim" => Modifier::DIM,
                    "i" | "italic" => Modifier::ITALIC,
                    "r" | "reverse" => Modifier::REVERSED,
                    m => {
                        debug!("Unknown modifier '{m}'");
                        Modifier::empty()
                    }
                };
            }
        }
        let (component_name, layer) = match name.rsplit_once(['_', '-']) {
            Some((component, layer @ ("fg" | "bg"))) => (component, layer),
            _ => (name, "fg"),
        };

        let style = match component_name {
            "normal" => &mut self.normal,
            "matched" | "hl" => &mut self.matched,
            "current" | "fg+" => &mut self.current,
            "current_match" | "hl+" => &mut self.current_match,
            "details" => &mut self.details,
            "query" => &mut self.query,
            "placeholder" => &mut self.placeholder,
            "prompt" => &mut self.prompt,
            "caret" => &mut self.caret,
            "selected" | "marker" => &mut self.selected,
            "chip" => &mut self.chip,
            "chip_current" | "chip+" => &mut self.chip_current,
            "chip_remove" => &mut self.chip_remove,
            "info" => &mut self.info,
            "error" => &mut self.error,
            "border" => &mut self.border,
            other => {
                debug!("Unknown color component '{other}'");
                return;
            }
        };
        set_style(style, layer, new_color, modifier);
    }

    /// Parses a `--color` value: a base theme name and/or `component:color[:modifier]` pairs
    pub fn from_options(color: &str) -> Self {
        let mut theme = ColorTheme::dark256();
        for pair in color.split(',') {
            if let Some((name, spec)) = pair.split_once(':') {
                theme.set_color(name, spec);
            } else {
                theme = match pair {
                    "light" => ColorTheme::light256(),
                    "16" => ColorTheme::default16(),
                    "bw" => ColorTheme::bw(),
                    "none" | "empty" => ColorTheme::none(),
                    "dark" | "default" => ColorTheme::dark256(),
                    t => {
                        debug!("Unknown color theme '{t}'");
                        ColorTheme::dark256()
                    }
                };
            }
        }
        theme
    }
}

fn set_style(s: &mut Style, layer: &str, color: Option<Color>, modifier: Modifier) {
    if let Some(c) = color {
        *s = match layer {
            "bg" => s.bg(c),
            _ => s.fg(c),
        }
    }
    *s = s.add_modifier(modifier);
}
