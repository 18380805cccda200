use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use snappic_core::message::{Flash, FlashKind};
use snappic_core::upload::{
    UploadDraft, GENERIC_FAILURE_MESSAGE, NAVIGATE_DELAY, NETWORK_ERROR_MESSAGE, SUCCESS_MESSAGE,
};
use snappic_core::Poller;
use snappic_service::{BlockingHttpService, ServiceError};
use ratatui::prelude::*;
use tracing::{debug, info, warn};

use crate::components::gallery_view::GalleryView;
use crate::components::upload_form::{self, UploadField};

/// Longest the event loop sleeps when nothing is scheduled.
const IDLE_WAKEUP: Duration = Duration::from_secs(1);

/// What the app is currently showing
#[derive(Debug, Clone)]
pub enum Mode {
    /// Live gallery, refreshed by the poller
    Gallery,
    /// Upload form
    Upload {
        draft: UploadDraft,
        field: UploadField,
    },
}

pub struct App {
    service: BlockingHttpService,
    gallery: GalleryView,
    poller: Poller,
    mode: Mode,
    flash: Option<Flash>,
    /// Whether the terminal has focus. Together with the mode this decides
    /// if the gallery counts as visible.
    focused: bool,
    /// Set after a successful upload; the gallery opens once it passes.
    navigate_at: Option<Instant>,
    last_poll_error: Option<String>,
}

impl App {
    pub fn new(service: BlockingHttpService, poll_interval: Duration) -> Result<Self> {
        let mut app = Self {
            service,
            gallery: GalleryView::new(),
            poller: Poller::new(poll_interval)?,
            mode: Mode::Gallery,
            flash: None,
            focused: true,
            navigate_at: None,
            last_poll_error: None,
        };
        app.sync_polling(Instant::now());
        Ok(app)
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn gallery(&self) -> &GalleryView {
        &self.gallery
    }

    pub fn flash(&self) -> Option<&Flash> {
        self.flash.as_ref()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    pub fn last_poll_error(&self) -> Option<&str> {
        self.last_poll_error.as_deref()
    }

    pub fn is_input_mode(&self) -> bool {
        matches!(self.mode, Mode::Upload { .. })
    }

    fn gallery_visible(&self) -> bool {
        self.focused && matches!(self.mode, Mode::Gallery)
    }

    /// Start or stop the poller to match gallery visibility. Becoming
    /// visible fetches right away.
    fn sync_polling(&mut self, now: Instant) {
        if self.gallery_visible() {
            if self.poller.resume(now) {
                debug!("gallery visible, polling resumed");
                self.refresh_gallery();
            }
        } else if self.poller.is_running() {
            debug!("gallery hidden, polling paused");
            self.poller.pause();
        }
    }

    /// Fetch the image list and reconcile. Failures keep the current view.
    pub fn refresh_gallery(&mut self) {
        match self.service.list_images() {
            Ok(images) => {
                let report = self.gallery.apply(images);
                if !report.is_noop() {
                    debug!(
                        added = report.added.len(),
                        removed = report.removed.len(),
                        updated = report.updated,
                        "gallery reconciled"
                    );
                }
                self.last_poll_error = None;
            }
            Err(e) => {
                warn!("error loading gallery: {e}");
                self.last_poll_error = Some(e.to_string());
            }
        }
    }

    /// Terminal focus changed.
    pub fn set_focus(&mut self, focused: bool, now: Instant) {
        if focused == self.focused {
            return;
        }
        self.focused = focused;
        self.sync_polling(now);
    }

    /// Advance timers: expire messages, run a pending navigation, and poll
    /// if due.
    pub fn tick(&mut self, now: Instant) {
        if self.flash.as_ref().is_some_and(|f| f.is_expired(now)) {
            self.flash = None;
        }
        if self.navigate_at.is_some_and(|at| now >= at) {
            self.open_gallery(now);
        }
        if self.poller.take_due(now) {
            self.refresh_gallery();
        }
    }

    /// How long the event loop may wait for input before the next `tick`.
    pub fn next_wakeup(&self, now: Instant) -> Duration {
        let deadlines = [
            self.poller.time_until_due(now),
            self.flash
                .as_ref()
                .map(|f| f.expires_at().saturating_duration_since(now)),
            self.navigate_at.map(|at| at.saturating_duration_since(now)),
        ];
        deadlines
            .into_iter()
            .flatten()
            .fold(IDLE_WAKEUP, |acc, d| acc.min(d))
    }

    fn open_gallery(&mut self, now: Instant) {
        self.navigate_at = None;
        self.mode = Mode::Gallery;
        self.sync_polling(now);
    }

    fn open_upload(&mut self, now: Instant) {
        self.mode = Mode::Upload {
            draft: UploadDraft::default(),
            field: UploadField::Path,
        };
        self.sync_polling(now);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let now = Instant::now();
        match self.mode.clone() {
            Mode::Gallery => self.handle_gallery(key, now),
            Mode::Upload { draft, field } => self.handle_upload(key, draft, field, now),
        }
    }

    fn handle_gallery(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Char('u') => self.open_upload(now),
            KeyCode::Char('r') => self.refresh_gallery(),
            _ => self.gallery.handle_key(key),
        }
    }

    fn handle_upload(&mut self, key: KeyEvent, mut draft: UploadDraft, mut field: UploadField, now: Instant) {
        // After a successful upload the form is done; only leaving is allowed.
        if self.navigate_at.is_some() {
            if key.code == KeyCode::Esc {
                self.open_gallery(now);
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.open_gallery(now);
                return;
            }
            KeyCode::Enter => {
                self.submit_upload(&draft, now);
                return;
            }
            KeyCode::Tab | KeyCode::BackTab => field = field.next(),
            KeyCode::Backspace => {
                match field {
                    UploadField::Path => draft.path.pop(),
                    UploadField::Comment => draft.comment.pop(),
                };
            }
            KeyCode::Char(c) => match field {
                UploadField::Path => draft.path.push(c),
                UploadField::Comment => {
                    draft.push_comment_char(c);
                }
            },
            _ => {}
        }
        self.mode = Mode::Upload { draft, field };
    }

    fn submit_upload(&mut self, draft: &UploadDraft, now: Instant) {
        let form = match draft.validate() {
            Ok(form) => form,
            Err(e) => {
                debug!("upload rejected locally: {e}");
                self.flash = Some(Flash::error(e.to_string(), now));
                return;
            }
        };

        match self.service.upload_image(&form) {
            Ok(_) => {
                info!(file = %form.file_name, "image uploaded");
                self.flash = Some(Flash::success(SUCCESS_MESSAGE, now));
                self.navigate_at = Some(now + NAVIGATE_DELAY);
            }
            Err(e) => {
                warn!(file = %form.file_name, "upload failed: {e}");
                self.flash = Some(Flash::error(upload_failure_message(&e), now));
            }
        }
    }

    //  Rendering

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_title_bar(frame, layout[0]);
        match &self.mode {
            Mode::Gallery => self.gallery.render(frame, layout[1]),
            Mode::Upload { draft, field } => upload_form::render(
                frame,
                layout[1],
                draft,
                *field,
                self.navigate_at.is_some(),
            ),
        }
        self.render_status_bar(frame, layout[2]);
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let (state, state_style) = if self.last_poll_error.is_some() {
            ("offline", Style::default().fg(Color::Red))
        } else if self.poller.is_running() {
            ("live", Style::default().fg(Color::Green))
        } else {
            ("paused", Style::default().fg(Color::DarkGray))
        };
        let title = Line::from(vec![
            Span::styled(" snappic ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("| "),
            Span::styled(self.service.base_url(), Style::default().fg(Color::Yellow)),
            Span::raw(" | "),
            Span::styled(state, state_style),
        ]);
        frame.render_widget(title, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(ref flash) = self.flash {
            let color = match flash.kind {
                FlashKind::Success => Color::Green,
                FlashKind::Error => Color::Red,
            };
            let line = Line::from(Span::styled(
                format!(" {}", flash.text),
                Style::default().fg(color),
            ));
            frame.render_widget(line, area);
            return;
        }

        let hints = match &self.mode {
            Mode::Gallery => vec![
                ("q", "quit"),
                ("j/k", "images"),
                ("u", "upload"),
                ("r", "refresh"),
            ],
            Mode::Upload { .. } => vec![("Tab", "field"), ("Enter", "upload"), ("Esc", "gallery")],
        };

        let mut spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(
                        format!(" {key}"),
                        Style::default().fg(Color::Yellow).bold(),
                    ),
                    Span::raw(format!(" {desc} ")),
                ]
            })
            .collect();

        if let (Mode::Gallery, Some(item)) = (&self.mode, self.gallery.selected()) {
            spans.push(Span::styled(
                format!(" {}", self.service.image_url(item.image())),
                Style::default().fg(Color::DarkGray),
            ));
        }

        frame.render_widget(Line::from(spans), area);
    }
}

/// User-facing text for a failed upload.
pub fn upload_failure_message(err: &ServiceError) -> String {
    match err {
        ServiceError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
        ServiceError::Rejected(msg) if !msg.is_empty() => msg.clone(),
        _ => GENERIC_FAILURE_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_messages() {
        assert_eq!(
            upload_failure_message(&ServiceError::Network("refused".into())),
            "Network error. Please try again."
        );
        assert_eq!(
            upload_failure_message(&ServiceError::Rejected("No file selected".into())),
            "No file selected"
        );
        assert_eq!(
            upload_failure_message(&ServiceError::Rejected(String::new())),
            "Upload failed"
        );
        assert_eq!(
            upload_failure_message(&ServiceError::Internal("500".into())),
            "Upload failed"
        );
    }
}
