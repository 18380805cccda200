use std::io;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use snappic_core::upload::{UploadDraft, SUCCESS_MESSAGE};
use snappic_core::TimerView;
use snappic_service::BlockingHttpService;
use tracing::{debug, info};

use snappic_tui::app::{upload_failure_message, App};
use snappic_tui::config::{Cli, Command};
use snappic_tui::logging::{init_logging, LogTarget};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command() {
        Command::Gallery => {
            init_logging(LogTarget::Quiet(cli.log_file.as_deref()))?;
            info!("snappic gallery starting against {}", cli.server);
            let service = BlockingHttpService::new(&cli.server);
            run_tui(service, &cli)
        }
        Command::Upload { path, comment } => {
            init_logging(LogTarget::Stderr)?;
            upload_once(&cli.server, UploadDraft::new(path.to_string_lossy(), comment))
        }
        Command::List => {
            init_logging(LogTarget::Stderr)?;
            list_once(&cli.server)
        }
    }
}

fn upload_once(server: &str, draft: UploadDraft) -> Result<()> {
    // Validation runs before any request is made.
    let form = match draft.validate() {
        Ok(form) => form,
        Err(e) => bail!("{e}"),
    };
    let service = BlockingHttpService::new(server);
    match service.upload_image(&form) {
        Ok(resp) => {
            println!("{}", resp.message.as_deref().unwrap_or(SUCCESS_MESSAGE));
            Ok(())
        }
        Err(e) => {
            debug!("upload error: {e}");
            bail!("{}", upload_failure_message(&e))
        }
    }
}

fn list_once(server: &str) -> Result<()> {
    let service = BlockingHttpService::new(server);
    let images = service.list_images()?;
    if images.is_empty() {
        println!("No images yet.");
        return Ok(());
    }
    for image in &images {
        let timer = TimerView::evaluate(image.age, image.state);
        println!(
            "{:<10} {:>4.0}%  {:<40} {}",
            timer.label,
            timer.remaining_pct,
            image.filename,
            image.display_comment(),
        );
    }
    Ok(())
}

fn run_tui(service: BlockingHttpService, cli: &Cli) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, service, cli);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    service: BlockingHttpService,
    cli: &Cli,
) -> Result<()> {
    let mut app = App::new(service, cli.poll_interval())?;

    loop {
        app.tick(Instant::now());
        terminal.draw(|frame| app.render(frame))?;

        if !event::poll(app.next_wakeup(Instant::now()))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                // Ctrl+C always quits
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    break;
                }
                // q quits unless we're typing into the upload form
                if key.code == KeyCode::Char('q') && !app.is_input_mode() {
                    break;
                }
                app.handle_key(key);
            }
            Event::FocusGained => app.set_focus(true, Instant::now()),
            Event::FocusLost => app.set_focus(false, Instant::now()),
            _ => {}
        }
    }

    Ok(())
}
