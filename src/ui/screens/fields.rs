use crate::logic::CropTable;
use crate::models::{Field, RotationPlan};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Widget},
};

pub struct FieldsScreen<'a> {
    pub farm_name: &'a str,
    pub fields: &'a [Field],
    pub table: &'a CropTable,
    pub selected_index: usize,
    pub plan: Option<&'a RotationPlan>,
    pub status_message: Option<&'a str>,
}

impl<'a> FieldsScreen<'a> {
    pub fn new(farm_name: &'a str, fields: &'a [Field], table: &'a CropTable) -> Self {
        Self {
            farm_name,
            fields,
            table,
            selected_index: 0,
            plan: None,
            status_message: None,
        }
    }

    pub fn with_selection(mut self, index: usize) -> Self {
        self.selected_index = index;
        self
    }

    pub fn with_plan(mut self, plan: Option<&'a RotationPlan>) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_status(mut self, status: Option<&'a str>) -> Self {
        self.status_message = status;
        self
    }
}

impl Widget for FieldsScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Min(8),    // Table + plan
                Constraint::Length(1), // Status message
                Constraint::Length(1), // Nav
            ])
            .split(area);

        self.render_header(chunks[0], buf);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        self.render_table(middle[0], buf);
        self.render_plan(middle[1], buf);

        if let Some(msg) = self.status_message {
            let style = if msg.contains("failed") || msg.contains("Error") {
                Theme::warning()
            } else {
                Theme::success()
            };
            Paragraph::new(Span::styled(msg, style)).render(chunks[2], buf);
        }

        let nav = Line::from(vec![
            Span::styled("[1]", Theme::nav_key()),
            Span::styled("Fields ", Theme::nav_label()),
            Span::styled("[2]", Theme::nav_key()),
            Span::styled("Plans ", Theme::nav_label()),
            Span::styled("[3]", Theme::nav_key()),
            Span::styled("Crops ", Theme::nav_label()),
            Span::styled("[a]", Theme::nav_key()),
            Span::styled("Add ", Theme::nav_label()),
            Span::styled("[g]", Theme::nav_key()),
            Span::styled("New Plan ", Theme::nav_label()),
            Span::styled("[d]", Theme::nav_key()),
            Span::styled("Delete ", Theme::nav_label()),
            Span::styled("[q]", Theme::nav_key()),
            Span::styled("Quit", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[3], buf);
    }
}

impl FieldsScreen<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled(
                format!("croprota - {}", self.farm_name),
                Theme::title(),
            ))
            .borders(Borders::BOTTOM)
            .border_style(Theme::border());

        let total_acres: f64 = self.fields.iter().map(|f| f.size_acres).sum();
        let info = format!("{} fields, {:.1} acres", self.fields.len(), total_acres);
        Paragraph::new(Span::styled(info, Theme::dim()))
            .block(block)
            .render(area, buf);
    }

    fn render_table(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Fields")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        if self.fields.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new(Span::styled(
                "No fields yet. Press [a] to add a field and generate your first plan.",
                Theme::dim(),
            ))
            .render(inner, buf);
            return;
        }

        let header_cells = ["Name", "Acres", "Soil", "Crop", "pH"]
            .iter()
            .map(|h| Cell::from(*h).style(Theme::header()));
        let header = Row::new(header_cells).height(1);

        let rows: Vec<Row> = self
            .fields
            .iter()
            .map(|field| {
                let crop_style = match self.table.first_group_containing(&field.current_crop) {
                    Some(group) => Style::default().fg(group.color()),
                    None => Theme::normal(),
                };

                Row::new(vec![
                    Cell::from(field.name.as_str()),
                    Cell::from(format!("{:.1}", field.size_acres)),
                    Cell::from(field.soil_type.as_str()),
                    Cell::from(field.current_crop.as_str()).style(crop_style),
                    Cell::from(format!("{:.1}", field.ph))
                        .style(Style::default().fg(Theme::ph_color(field.ph))),
                ])
            })
            .collect();

        let widths = [
            Constraint::Min(14),
            Constraint::Length(8),
            Constraint::Length(13),
            Constraint::Length(14),
            Constraint::Length(5),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Theme::selected());

        let mut state = TableState::default();
        state.select(Some(self.selected_index));
        ratatui::widgets::StatefulWidget::render(table, area, buf, &mut state);
    }

    fn render_plan(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Rotation Plan")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let plan = match self.plan {
            Some(p) => p,
            None => {
                Paragraph::new(Span::styled("No plan for this field", Theme::dim()))
                    .render(inner, buf);
                return;
            }
        };

        let mut lines = vec![
            Line::from(Span::styled(
                format!("Created {}", plan.created_at.format("%Y-%m-%d %H:%M")),
                Theme::dim(),
            )),
            Line::from(""),
        ];
        lines.extend(plan.years.iter().map(|y| year_line(self.table, y.year, &y.crop)));

        Paragraph::new(lines).render(inner, buf);
    }
}

pub(crate) fn year_line<'a>(table: &CropTable, year: u32, crop: &'a str) -> Line<'a> {
    let groups = table.groups_containing(crop);
    let group_label = if groups.is_empty() {
        "unclassified".to_string()
    } else {
        groups
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let style = groups
        .iter()
        .next()
        .map(|g| Style::default().fg(g.color()))
        .unwrap_or_else(Theme::normal);

    Line::from(vec![
        Span::styled(format!("Year {}: ", year), Theme::dim()),
        Span::styled(crop, style),
        Span::styled(format!("  ({})", group_label), Theme::dim()),
    ])
}
