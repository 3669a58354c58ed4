use crate::logic::RotationGenerator;
use crate::models::{CropGroup, Field};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget, Wrap},
};

pub struct CropsScreen<'a> {
    generator: RotationGenerator<'a>,
    field: Option<&'a Field>,
    selected_index: usize,
}

impl<'a> CropsScreen<'a> {
    pub fn new(generator: RotationGenerator<'a>) -> Self {
        Self {
            generator,
            field: None,
            selected_index: 0,
        }
    }

    pub fn with_field(mut self, field: Option<&'a Field>) -> Self {
        self.field = field;
        self
    }

    pub fn with_selection(mut self, index: usize) -> Self {
        self.selected_index = index;
        self
    }

    fn selected_group(&self) -> Option<CropGroup> {
        self.generator.table().groups().nth(self.selected_index)
    }
}

impl Widget for CropsScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(8),    // Groups + crops
                Constraint::Length(8), // Selected field
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Crop Groups", Theme::title()),
            Span::styled(" - rotation classification", Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(chunks[1]);

        self.render_groups(content[0], buf);
        self.render_crops(content[1], buf);
        self.render_field_insight(chunks[2], buf);

        let nav = Line::from(vec![
            Span::styled("[↑↓]", Theme::nav_key()),
            Span::styled("Group ", Theme::nav_label()),
            Span::styled("[Esc]", Theme::nav_key()),
            Span::styled("Back", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[3], buf);
    }
}

impl CropsScreen<'_> {
    fn render_groups(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Groups")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let table = self.generator.table();
        let items: Vec<ListItem> = table
            .groups()
            .enumerate()
            .map(|(i, group)| {
                let style = if i == self.selected_index {
                    Theme::selected()
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(group.as_str(), Style::default().fg(group.color())),
                    Span::styled(format!(" ({})", table.crops_in(group).len()), Theme::dim()),
                ]))
                .style(style)
            })
            .collect();

        List::new(items).render(inner, buf);
    }

    fn render_crops(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Crops")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let group = match self.selected_group() {
            Some(g) => g,
            None => return,
        };

        let table = self.generator.table();
        let lines: Vec<Line> = table
            .crops_in(group)
            .iter()
            .map(|crop| {
                let others: Vec<&str> = table
                    .groups_containing(crop)
                    .into_iter()
                    .filter(|g| *g != group)
                    .map(|g| g.as_str())
                    .collect();
                let mut spans = vec![Span::styled(crop.as_str(), Theme::normal())];
                if !others.is_empty() {
                    spans.push(Span::styled(
                        format!("  also {}", others.join(", ")),
                        Theme::dim(),
                    ));
                }
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }

    fn render_field_insight(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Selected Field")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let field = match self.field {
            Some(f) => f,
            None => {
                Paragraph::new(Span::styled("No field selected", Theme::dim())).render(inner, buf);
                return;
            }
        };

        let groups = self.generator.table().groups_containing(&field.current_crop);
        let group_label = if groups.is_empty() {
            "unclassified (next year defaults to a legume)".to_string()
        } else {
            groups
                .iter()
                .map(|g| g.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let pool = self.generator.candidates_after(&field.current_crop);
        let lines = vec![
            Line::from(vec![
                Span::styled(format!("{}: ", field.name), Theme::header()),
                Span::styled(field.current_crop.as_str(), Theme::highlight()),
                Span::styled(format!("  {}", group_label), Theme::dim()),
            ]),
            Line::from(Span::styled(
                format!("Next year may be any of {} crops:", pool.len()),
                Theme::dim(),
            )),
            Line::from(Span::styled(
                pool.into_iter().collect::<Vec<_>>().join(", "),
                Theme::normal(),
            )),
        ];

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
