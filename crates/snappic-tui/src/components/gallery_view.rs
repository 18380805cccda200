use crossterm::event::{KeyCode, KeyEvent};
use snappic_core::{Gallery, GalleryItem, Image, ReconcileReport, TimerPhase};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

const BAR_WIDTH: usize = 20;

/// Scrollable list of gallery entries backed by the reconciled [`Gallery`].
pub struct GalleryView {
    gallery: Gallery,
    list_state: ListState,
}

impl Default for GalleryView {
    fn default() -> Self {
        Self::new()
    }
}

impl GalleryView {
    pub fn new() -> Self {
        Self {
            gallery: Gallery::new(),
            list_state: ListState::default(),
        }
    }

    /// Reconcile against a fresh listing, keeping the cursor on the same
    /// image when it survives.
    pub fn apply(&mut self, images: Vec<Image>) -> ReconcileReport {
        let selected = self.selected().map(|item| item.filename().to_string());
        let previous_idx = self.list_state.selected();

        let report = self.gallery.reconcile(images);

        let restored = selected.and_then(|name| self.gallery.position(&name));
        let idx = match (restored, previous_idx) {
            _ if self.gallery.is_empty() => None,
            (Some(idx), _) => Some(idx),
            (None, Some(prev)) => Some(prev.min(self.gallery.len() - 1)),
            (None, None) => Some(0),
        };
        self.list_state.select(idx);
        report
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn selected(&self) -> Option<&GalleryItem> {
        let idx = self.list_state.selected()?;
        self.gallery.items().get(idx)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let len = self.gallery.len();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if current + 1 < len {
                    self.list_state.select(Some(current + 1));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if current > 0 {
                    self.list_state.select(Some(current - 1));
                }
            }
            KeyCode::Char('g') => self.list_state.select(Some(0)),
            KeyCode::Char('G') => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let title = format!(" Gallery ({}) ", self.gallery.len());
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        if self.gallery.is_empty() {
            let placeholder = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No images yet",
                    Style::default().fg(Color::Gray).bold(),
                )),
                Line::from(Span::styled(
                    "Press u to upload one",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
            frame.render_widget(placeholder, area);
            return;
        }

        let items: Vec<ListItem> = self.gallery.items().iter().map(item_lines).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::Rgb(30, 40, 60)))
            .highlight_symbol("> ");

        let mut state = self.list_state.clone();
        frame.render_stateful_widget(list, area, &mut state);
    }
}

fn item_lines(item: &GalleryItem) -> ListItem<'_> {
    let image = item.image();
    let timer = item.timer();
    let text_style = if timer.is_fading() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let mut header = vec![
        Span::styled(image.display_comment(), text_style.bold()),
        Span::styled(format!("  {}", image.filename), Style::default().fg(Color::DarkGray)),
    ];
    if let Some(at) = image.uploaded_at() {
        header.push(Span::styled(
            format!("  {}", at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let timer_line = Line::from(vec![
        Span::raw("  "),
        Span::styled(timer_bar(timer.ratio()), phase_style(timer.phase)),
        Span::raw(" "),
        Span::styled(timer.label.clone(), phase_style(timer.phase)),
    ]);

    ListItem::new(vec![Line::from(header), timer_line, Line::from("")])
}

fn timer_bar(ratio: f64) -> String {
    let filled = (ratio * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn phase_style(phase: TimerPhase) -> Style {
    match phase {
        TimerPhase::Visible => Style::default().fg(Color::Green),
        TimerPhase::Fading => Style::default().fg(Color::Yellow),
        TimerPhase::Expired => Style::default().fg(Color::DarkGray),
    }
}
