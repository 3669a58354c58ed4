use super::fields::year_line;
use crate::app::App;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget, Wrap},
};

pub struct PlansScreen<'a> {
    app: &'a App,
    selected_index: usize,
}

impl<'a> PlansScreen<'a> {
    pub fn new(app: &'a App) -> Self {
        Self {
            app,
            selected_index: 0,
        }
    }

    pub fn with_selection(mut self, index: usize) -> Self {
        self.selected_index = index;
        self
    }
}

impl Widget for PlansScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(10),   // Content
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Rotation Plans", Theme::title()),
            Span::styled(format!(" ({} saved)", self.app.plans.len()), Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);

        self.render_list(content[0], buf);
        self.render_details(content[1], buf);

        let nav = Line::from(vec![
            Span::styled("[↑↓]", Theme::nav_key()),
            Span::styled("Navigate ", Theme::nav_label()),
            Span::styled("[d]", Theme::nav_key()),
            Span::styled("Delete ", Theme::nav_label()),
            Span::styled("[Esc]", Theme::nav_key()),
            Span::styled("Back", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[2], buf);
    }
}

impl PlansScreen<'_> {
    fn render_list(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Plans")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        if self.app.plans.is_empty() {
            Paragraph::new(Span::styled(
                "Start planning your crop rotations by adding a field.",
                Theme::dim(),
            ))
            .wrap(Wrap { trim: true })
            .render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .app
            .plans
            .iter()
            .enumerate()
            .map(|(i, plan)| {
                let style = if i == self.selected_index {
                    Theme::selected()
                } else {
                    Style::default()
                };

                let line = Line::from(vec![
                    Span::styled(plan.created_at.format("%m/%d ").to_string(), Theme::dim()),
                    Span::styled(self.app.field_name(plan.field_id), Theme::highlight()),
                    Span::raw(" "),
                    Span::styled(plan.summary(), Theme::normal()),
                ]);
                ListItem::new(line).style(style)
            })
            .collect();

        List::new(items).render(inner, buf);
    }

    fn render_details(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Details")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let plan = match self.app.plans.get(self.selected_index) {
            Some(p) => p,
            None => {
                Paragraph::new(Span::styled("Select a plan to view details", Theme::dim()))
                    .render(inner, buf);
                return;
            }
        };

        let mut lines = vec![
            Line::from(Span::styled(
                self.app.field_name(plan.field_id),
                Theme::header(),
            )),
            Line::from(vec![
                Span::styled("Plan ", Theme::dim()),
                Span::styled(plan.id.as_str(), Theme::dim()),
            ]),
            Line::from(vec![
                Span::styled("Created: ", Theme::dim()),
                Span::styled(
                    plan.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
                    Theme::normal(),
                ),
            ]),
            Line::from(""),
        ];
        lines.extend(
            plan.years
                .iter()
                .map(|y| year_line(&self.app.table, y.year, &y.crop)),
        );

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
