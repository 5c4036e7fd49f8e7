use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use repodash_core::{RecordSet, RepoRecord};

/// Where the interactive session is. `Scanning` covers the stretch
/// before the scan barrier releases, while the dashboard is not yet
/// interactive; after that the session moves between `Ready` and the
/// modal `DetailShown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Scanning,
    Ready,
    DetailShown,
}

/// Every keyboard action, as an explicit command routed through one
/// dispatch point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CursorDown,
    CursorUp,
    ToggleDetail,
    Dismiss,
    SyncAll,
    Quit,
}

pub fn command_for(key: &KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('n') => Some(Command::CursorDown),
            KeyCode::Char('p') => Some(Command::CursorUp),
            KeyCode::Char('c') => Some(Command::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => Some(Command::CursorDown),
        KeyCode::Up | KeyCode::Char('k') => Some(Command::CursorUp),
        KeyCode::Char(' ') => Some(Command::ToggleDetail),
        KeyCode::Esc => Some(Command::Dismiss),
        KeyCode::Enter => Some(Command::SyncAll),
        KeyCode::Char('q') => Some(Command::Quit),
        _ => None,
    }
}

pub struct App {
    records: Arc<RecordSet>,
    pub state: SessionState,
    pub cursor: usize,
    pub should_quit: bool,
    pub status_note: Option<String>,
}

impl App {
    pub fn new(records: Arc<RecordSet>) -> Self {
        Self {
            records,
            state: SessionState::Scanning,
            cursor: 0,
            should_quit: false,
            status_note: None,
        }
    }

    /// The scan barrier has released; the record set is complete and its
    /// order final.
    pub fn mark_ready(&mut self) {
        if self.state == SessionState::Scanning {
            self.state = SessionState::Ready;
        }
    }

    pub fn records(&self) -> Arc<RecordSet> {
        Arc::clone(&self.records)
    }

    pub fn snapshot(&self) -> Vec<RepoRecord> {
        self.records.snapshot()
    }

    /// Apply one command; returns true when the caller should launch a
    /// sync pass. Sync never changes state — its completion is observed
    /// through record mutation on a later redraw.
    pub fn dispatch(&mut self, command: Command) -> bool {
        match self.state {
            SessionState::Scanning => {
                if command == Command::Quit {
                    self.should_quit = true;
                }
                false
            }
            SessionState::DetailShown => {
                match command {
                    Command::ToggleDetail | Command::Dismiss => {
                        self.state = SessionState::Ready;
                    }
                    Command::Quit => self.should_quit = true,
                    // navigation and sync are suspended while the modal
                    // is open
                    _ => {}
                }
                false
            }
            SessionState::Ready => match command {
                Command::CursorDown => {
                    self.move_cursor(1);
                    false
                }
                Command::CursorUp => {
                    self.move_cursor(-1);
                    false
                }
                Command::ToggleDetail => {
                    if !self.records.is_empty() {
                        self.state = SessionState::DetailShown;
                    }
                    false
                }
                Command::Dismiss => false,
                Command::SyncAll => true,
                Command::Quit => {
                    self.should_quit = true;
                    false
                }
            },
        }
    }

    fn move_cursor(&mut self, step: i64) {
        let len = self.records.len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let max = (len - 1) as i64;
        self.cursor = (self.cursor as i64 + step).clamp(0, max) as usize;
    }

    pub fn note_sync_launched(&mut self, launched: usize) {
        self.status_note = Some(if launched == 0 {
            "nothing to sync".to_string()
        } else {
            format!("sync started for {launched} repos")
        });
    }
}
