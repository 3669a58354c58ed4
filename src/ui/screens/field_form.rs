use crate::app::{FieldFormState, FormField};
use crate::models::{SoilType, COMMON_CROPS};
use crate::ui::components::{InputWidget, SelectWidget};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct FieldFormScreen<'a> {
    form: &'a FieldFormState,
}

impl<'a> FieldFormScreen<'a> {
    pub fn new(form: &'a FieldFormState) -> Self {
        Self { form }
    }
}

impl Widget for FieldFormScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(17),   // Form (5 fields * 3 lines + borders)
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Add New Field", Theme::title()),
            Span::styled(" - a rotation plan is generated on save", Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        self.render_form(chunks[1], buf);

        let nav = Line::from(vec![
            Span::styled("[Tab/↑↓]", Theme::nav_key()),
            Span::styled("Field ", Theme::nav_label()),
            Span::styled("[←→]", Theme::nav_key()),
            Span::styled("Choose ", Theme::nav_label()),
            Span::styled("[Enter]", Theme::nav_key()),
            Span::styled("Save ", Theme::nav_label()),
            Span::styled("[Esc]", Theme::nav_key()),
            Span::styled("Cancel", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[2], buf);
    }
}

impl FieldFormScreen<'_> {
    fn render_form(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Field")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let constraints: Vec<Constraint> = FormField::all()
            .iter()
            .map(|_| Constraint::Length(3))
            .collect();
        let areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        let soil_labels: Vec<&str> = SoilType::all().iter().map(|s| s.as_str()).collect();

        for (i, field) in FormField::all().iter().enumerate() {
            let focused = *field == self.form.focused;
            let error = self.form.error_for(*field);

            match field {
                FormField::SoilType => {
                    SelectWidget::new(field.label(), &soil_labels, self.form.soil_index)
                        .placeholder("Select soil type...")
                        .focused(focused)
                        .error(error)
                        .render(areas[i], buf);
                }
                FormField::CurrentCrop if self.form.crop.is_empty() => {
                    SelectWidget::new(field.label(), COMMON_CROPS, None)
                        .placeholder("Select or type current crop...")
                        .focused(focused)
                        .error(error)
                        .render(areas[i], buf);
                }
                _ => {
                    let value = match field {
                        FormField::Name => self.form.name.as_str(),
                        FormField::Size => self.form.size.as_str(),
                        FormField::CurrentCrop => self.form.crop.as_str(),
                        _ => self.form.ph.as_str(),
                    };
                    InputWidget::new(field.label(), value)
                        .focused(focused)
                        .error(error)
                        .render(areas[i], buf);
                }
            }
        }
    }
}
