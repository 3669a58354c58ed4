use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Single-line text box with an optional validation message in the bottom border.
pub struct InputWidget<'a> {
    label: &'a str,
    value: &'a str,
    focused: bool,
    error: Option<&'a str>,
}

impl<'a> InputWidget<'a> {
    pub fn new(label: &'a str, value: &'a str) -> Self {
        Self {
            label,
            value,
            focused: false,
            error: None,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = field_block(self.label, self.focused, self.error);
        let inner = block.inner(area);
        block.render(area, buf);

        let line = if self.focused {
            Line::from(vec![
                Span::raw(self.value),
                Span::styled(" ", Theme::selected()),
            ])
        } else {
            Line::from(Span::styled(self.value, Theme::normal()))
        };

        Paragraph::new(line).render(inner, buf);
    }
}

/// Option picker cycled with the arrow keys. Shows `placeholder` until something is picked.
pub struct SelectWidget<'a> {
    label: &'a str,
    options: &'a [&'a str],
    selected: Option<usize>,
    placeholder: &'a str,
    focused: bool,
    error: Option<&'a str>,
}

impl<'a> SelectWidget<'a> {
    pub fn new(label: &'a str, options: &'a [&'a str], selected: Option<usize>) -> Self {
        Self {
            label,
            options,
            selected,
            placeholder: "Select...",
            focused: false,
            error: None,
        }
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }
}

impl Widget for SelectWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = field_block(self.label, self.focused, self.error);
        let inner = block.inner(area);
        block.render(area, buf);

        let (value, style) = match self.selected.and_then(|i| self.options.get(i)) {
            Some(v) if self.focused => (format!("< {} >", v), Theme::highlight()),
            Some(v) => (v.to_string(), Theme::normal()),
            None if self.focused => (format!("< {} >", self.placeholder), Theme::dim()),
            None => (self.placeholder.to_string(), Theme::dim()),
        };

        Paragraph::new(Span::styled(value, style)).render(inner, buf);
    }
}

fn field_block<'a>(label: &'a str, focused: bool, error: Option<&'a str>) -> Block<'a> {
    let border_style: Style = match (error, focused) {
        (Some(_), _) => Theme::border_error(),
        (None, true) => Theme::border_focused(),
        (None, false) => Theme::border(),
    };

    let block = Block::default()
        .title(label)
        .borders(Borders::ALL)
        .border_style(border_style);

    match error {
        Some(msg) => block.title_bottom(Line::from(Span::styled(msg, Theme::error()))),
        None => block,
    }
}
