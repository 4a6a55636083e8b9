use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};

use crate::core::builtin_providers::find_builtin_provider;

const FALLBACK_PROVIDER_COLOR: Color = Color::LightGreen;

#[derive(Debug, Clone)]
pub struct Theme {
    // Bars
    pub top_bar_style: Style,
    pub bottom_bar_style: Style,
    pub command_line_style: Style,
    pub status_hint_style: Style,

    // Chat pane
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_text_style: Style,
    pub system_error_style: Style,
    pub separator_style: Style,
    pub pending_style: Style,
    pub welcome_title_style: Style,
    pub welcome_key_style: Style,
    pub welcome_hint_style: Style,

    // Borders and input
    pub focused_border_style: Style,
    pub unfocused_border_style: Style,
    pub input_text_style: Style,
    pub placeholder_style: Style,

    // Markdown
    pub md_heading_style: Style,
    pub md_code_style: Style,
    pub md_code_label_style: Style,
    pub md_link_style: Style,
    pub md_quote_style: Style,
    pub md_list_marker_style: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark_default()
    }
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            top_bar_style: Style::default().fg(Color::Black).bg(Color::White),
            bottom_bar_style: Style::default().fg(Color::Black).bg(Color::Green),
            command_line_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
            status_hint_style: Style::default().fg(Color::Black).bg(Color::Yellow),

            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::White),
            assistant_text_style: Style::default().fg(Color::White),
            system_error_style: Style::default().fg(Color::Red),
            separator_style: Style::default().fg(Color::DarkGray),
            pending_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            welcome_title_style: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
            welcome_key_style: Style::default().fg(Color::Cyan),
            welcome_hint_style: Style::default().fg(Color::DarkGray),

            focused_border_style: Style::default().fg(Color::Green),
            unfocused_border_style: Style::default().fg(Color::DarkGray),
            input_text_style: Style::default().fg(Color::White),
            placeholder_style: Style::default().fg(Color::DarkGray),

            md_heading_style: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            md_code_style: Style::default().fg(Color::Yellow),
            md_code_label_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            md_link_style: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::UNDERLINED),
            md_quote_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            md_list_marker_style: Style::default().fg(Color::Cyan),
        }
    }

    /// Accent color for a provider tag, from the provider catalog.
    pub fn provider_color(provider: &str) -> Color {
        find_builtin_provider(provider)
            .and_then(|p| Color::from_str(&p.color).ok())
            .unwrap_or(FALLBACK_PROVIDER_COLOR)
    }

    pub fn provider_prefix_style(&self, provider: &str) -> Style {
        Style::default()
            .fg(Self::provider_color(provider))
            .add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_colors_come_from_catalog() {
        assert_eq!(Theme::provider_color("anthropic"), Color::Red);
        assert_eq!(Theme::provider_color("google"), Color::Green);
        assert_eq!(Theme::provider_color("deepseek"), Color::Blue);
        assert_eq!(Theme::provider_color("perplexity"), Color::Magenta);
        assert_eq!(Theme::provider_color("openai"), Color::White);
        assert_eq!(Theme::provider_color("unknown"), FALLBACK_PROVIDER_COLOR);
    }
}
