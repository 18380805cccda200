use snappic_core::upload::{UploadDraft, MAX_COMMENT_CHARS};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Which input of the upload form has the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadField {
    Path,
    Comment,
}

impl UploadField {
    pub fn next(self) -> Self {
        match self {
            UploadField::Path => UploadField::Comment,
            UploadField::Comment => UploadField::Path,
        }
    }
}

pub fn render(frame: &mut Frame, area: Rect, draft: &UploadDraft, field: UploadField, locked: bool) {
    let outer = Block::default()
        .title(" Upload ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(inner);

    let path_block = input_block(" Image file ", field == UploadField::Path && !locked);
    frame.render_widget(Paragraph::new(draft.path.as_str()).block(path_block), rows[0]);

    let counter = format!(" Comment ({}/{MAX_COMMENT_CHARS}) ", draft.comment_chars());
    let comment_block = input_block(&counter, field == UploadField::Comment && !locked);
    frame.render_widget(
        Paragraph::new(draft.comment.as_str()).block(comment_block),
        rows[1],
    );

    let help = Paragraph::new(Line::from(Span::styled(
        "JPG, PNG or WEBP, up to 5MB. Caption is optional.",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(help, rows[2]);
}

fn input_block(title: &str, active: bool) -> Block<'_> {
    let style = if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style)
}
