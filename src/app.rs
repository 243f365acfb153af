// src/app.rs
use color_eyre::Result;
use ratatui::{
    crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    DefaultTerminal,
};
use tokio::sync::watch;

use crate::event::{AppEvent, Event, EventHandler};
use crate::log_warn;
use crate::session::{ChatSession, InputEdit, Notification, SessionState};

/// How long a notification stays in the status line, in ticks.
const NOTICE_TICKS: u32 = 20;

/// Lines moved per PageUp/PageDown.
const SCROLL_STEP: u16 = 5;

/// Application.
pub struct App {
    /// Is the application running?
    pub running: bool,
    /// Latest published session state.
    pub state: SessionState,
    /// Chunk highlighted in the side panel.
    pub selected_source: Option<usize>,
    /// Conversation scroll, in lines up from the bottom.
    pub scroll_back: u16,
    /// Notification shown in the status line with its remaining ticks.
    pub notice: Option<(Notification, u32)>,
    /// Increments every tick; drives the streaming indicator.
    pub ticks: u64,
    pub events: EventHandler,
    session: ChatSession,
    state_rx: watch::Receiver<SessionState>,
}

impl App {
    pub fn new(session: ChatSession) -> Self {
        let state_rx = session.watch();
        Self {
            running: true,
            state: session.state(),
            selected_source: None,
            scroll_back: 0,
            notice: None,
            ticks: 0,
            events: EventHandler::new(),
            session,
            state_rx,
        }
    }

    /// Run the application's main loop. The session is disposed before returning.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        let mut needs_redraw = true;

        while self.running {
            if needs_redraw {
                terminal.draw(|frame| frame.render_widget(&self, frame.area()))?;
                needs_redraw = false;
            }

            tokio::select! {
                event = self.events.next() => {
                    needs_redraw = self.handle_event(event?);
                }
                changed = self.state_rx.changed() => {
                    if changed.is_err() {
                        // Session task is gone.
                        self.quit();
                    } else {
                        let state = self.state_rx.borrow_and_update().clone();
                        self.apply_state(state);
                    }
                    needs_redraw = true;
                }
                Some(notice) = self.session.next_notification() => {
                    self.notice = Some((notice, NOTICE_TICKS));
                    needs_redraw = true;
                }
            }
        }

        self.session.dispose().await;
        Ok(())
    }

    /// Returns true when the screen should be redrawn.
    fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Tick => self.tick(),
            Event::Crossterm(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                if let Some(app_event) = map_key(key) {
                    self.events.send(app_event);
                }
                false
            }
            Event::Crossterm(CrosstermEvent::Resize(_, _)) => true,
            Event::Crossterm(_) => false,
            Event::App(app_event) => {
                self.handle_app_event(app_event);
                true
            }
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        let result = match event {
            AppEvent::Submit => {
                self.scroll_back = 0;
                self.session.submit()
            }
            AppEvent::Stop => self.session.stop(),
            AppEvent::Input(ch) => self.session.edit_input(InputEdit::Insert(ch)),
            AppEvent::Backspace => self.session.edit_input(InputEdit::Backspace),
            AppEvent::ClearInput => self.session.edit_input(InputEdit::Clear),
            AppEvent::ToggleTab => self.session.select_tab(self.state.active_tab.toggle()),
            AppEvent::SelectPrevSource => {
                self.select_source(-1);
                Ok(())
            }
            AppEvent::SelectNextSource => {
                self.select_source(1);
                Ok(())
            }
            AppEvent::OpenSelectedSource => match self.selected_chunk_id() {
                Some(page_id) => self.session.view_page(page_id),
                None => Ok(()),
            },
            AppEvent::ScrollUp => {
                self.scroll_back = self.scroll_back.saturating_add(SCROLL_STEP);
                Ok(())
            }
            AppEvent::ScrollDown => {
                self.scroll_back = self.scroll_back.saturating_sub(SCROLL_STEP);
                Ok(())
            }
            AppEvent::Quit => {
                self.quit();
                Ok(())
            }
        };

        if let Err(e) = result {
            log_warn!("Dropped UI action: {}", e);
            self.quit();
        }
    }

    /// Handles the tick event of the terminal.
    fn tick(&mut self) -> bool {
        self.ticks = self.ticks.wrapping_add(1);

        let mut redraw = self.state.is_streaming;
        if let Some((_, remaining)) = self.notice.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.notice = None;
                redraw = true;
            }
        }
        redraw
    }

    fn apply_state(&mut self, state: SessionState) {
        if state.chunks != self.state.chunks {
            self.selected_source = None;
        }
        self.state = state;
    }

    fn select_source(&mut self, step: isize) {
        let count = self.state.chunks.len();
        if count == 0 {
            self.selected_source = None;
            return;
        }

        self.selected_source = Some(match self.selected_source {
            None if step < 0 => count - 1,
            None => 0,
            Some(i) => (i as isize + step).clamp(0, count as isize - 1) as usize,
        });
    }

    fn selected_chunk_id(&self) -> Option<String> {
        self.selected_source
            .and_then(|i| self.state.chunks.get(i))
            .map(|chunk| chunk.source_id.clone())
            .filter(|id| !id.is_empty())
    }

    /// Input is only accepted while the session can send.
    pub fn input_enabled(&self) -> bool {
        self.state.can_send()
    }

    /// Set running to false to quit the application.
    pub fn quit(&mut self) {
        self.running = false;
    }
}

/// Translates a key press into an application event.
pub fn map_key(key: KeyEvent) -> Option<AppEvent> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    let event = match key.code {
        KeyCode::Char('c' | 'C') if ctrl => AppEvent::Quit,
        KeyCode::Char('o' | 'O') if ctrl => AppEvent::OpenSelectedSource,
        KeyCode::Char('u' | 'U') if ctrl => AppEvent::ClearInput,
        KeyCode::Up if ctrl => AppEvent::SelectPrevSource,
        KeyCode::Down if ctrl => AppEvent::SelectNextSource,
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char(ch) => AppEvent::Input(ch),
        KeyCode::Backspace => AppEvent::Backspace,
        KeyCode::Enter => AppEvent::Submit,
        KeyCode::Esc => AppEvent::Stop,
        KeyCode::Tab | KeyCode::BackTab => AppEvent::ToggleTab,
        KeyCode::PageUp => AppEvent::ScrollUp,
        KeyCode::PageDown => AppEvent::ScrollDown,
        _ => return None,
    };
    Some(event)
}
