use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use scriptview_ingest::{BatchSeq, LoadedBatch, Loader, MergeQueue, RawInput};
use scriptview_session::{Session, SpeakerOrder};

/// Which panel is currently focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Speakers,
    Transcript,
}

impl Panel {
    pub fn next(self) -> Self {
        match self {
            Panel::Speakers => Panel::Transcript,
            Panel::Transcript => Panel::Speakers,
        }
    }
}

/// Application state for the TUI.
pub struct App {
    pub session: Session,
    pub speaker_order: SpeakerOrder,
    pub should_quit: bool,
    pub active_panel: Panel,

    /// Path prompt buffer while adding files.
    pub input: Option<String>,

    pub speaker_cursor: usize,
    pub transcript_scroll: usize,

    loader: Arc<Loader>,
    queue: MergeQueue,
    tx: Sender<LoadedBatch>,
    rx: Receiver<LoadedBatch>,
}

impl App {
    pub fn new(loader: Loader, speaker_order: SpeakerOrder) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            session: Session::new(),
            speaker_order,
            should_quit: false,
            active_panel: Panel::Speakers,
            input: None,
            speaker_cursor: 0,
            transcript_scroll: 0,
            loader: Arc::new(loader),
            queue: MergeQueue::new(),
            tx,
            rx,
        }
    }

    /// Start loading `inputs` as one batch on a background thread.
    pub fn submit(&mut self, inputs: Vec<RawInput>) {
        if inputs.is_empty() {
            return;
        }
        let seq = self.queue.next_ticket();
        let loader = Arc::clone(&self.loader);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let batch = load_or_abandon(seq, inputs, |seq, inputs| loader.load_batch(seq, inputs));
            // Receiver gone means the app is shutting down.
            let _ = tx.send(batch);
        });
    }

    /// Merge any finished batches into the session, in submission order.
    pub fn poll_loads(&mut self) {
        let mut received = false;
        while let Ok(batch) = self.rx.try_recv() {
            self.queue.complete(batch);
            received = true;
        }
        if received {
            self.merge_ready();
        }
    }

    pub fn is_loading(&self) -> bool {
        self.queue.pending() > 0
    }

    pub fn speakers(&self) -> Vec<&str> {
        self.session.speaker_index_by(self.speaker_order)
    }

    /// Rendered transcript height: a header, the records and a spacer per
    /// section.
    pub fn transcript_len(&self) -> usize {
        self.session
            .filtered_view()
            .iter()
            .map(|s| s.records.len() + 2)
            .sum()
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
        use crossterm::event::KeyCode;

        if self.input.is_some() {
            self.handle_prompt_key(key.code);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => self.active_panel = self.active_panel.next(),
            KeyCode::Char('j') | KeyCode::Down => self.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_up(),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if self.active_panel == Panel::Speakers {
                    self.toggle_selected_speaker();
                }
            }
            KeyCode::Char('c') => self.update_session(Session::clear_filter),
            KeyCode::Char('d') => self.update_session(Session::dismiss_failures),
            KeyCode::Char('o') => self.speaker_order = self.speaker_order.toggled(),
            KeyCode::Char('a') => self.input = Some(String::new()),
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, code: crossterm::event::KeyCode) {
        use crossterm::event::KeyCode;

        let Some(buf) = self.input.as_mut() else {
            return;
        };
        match code {
            KeyCode::Char(c) => buf.push(c),
            KeyCode::Backspace => {
                buf.pop();
            }
            KeyCode::Esc => self.input = None,
            KeyCode::Enter => {
                let line = self.input.take().unwrap_or_default();
                let inputs = line.split_whitespace().map(RawInput::from_path).collect();
                self.submit(inputs);
            }
            _ => {}
        }
    }

    fn toggle_selected_speaker(&mut self) {
        let Some(speaker) = self
            .speakers()
            .get(self.speaker_cursor)
            .map(|s| s.to_string())
        else {
            return;
        };
        self.update_session(|s| s.toggle_speaker(&speaker));
    }

    fn update_session(&mut self, transition: impl FnOnce(Session) -> Session) {
        let session = std::mem::take(&mut self.session);
        self.session = transition(session);
        self.clamp_scroll();
    }

    fn merge_ready(&mut self) {
        let session = std::mem::take(&mut self.session);
        self.session = self.queue.drain_into(session);
        self.clamp_scroll();
    }

    fn scroll_down(&mut self) {
        match self.active_panel {
            Panel::Speakers => {
                if self.speaker_cursor + 1 < self.speakers().len() {
                    self.speaker_cursor += 1;
                }
            }
            Panel::Transcript => {
                if self.transcript_scroll + 1 < self.transcript_len() {
                    self.transcript_scroll += 1;
                }
            }
        }
    }

    fn scroll_up(&mut self) {
        let scroll = match self.active_panel {
            Panel::Speakers => &mut self.speaker_cursor,
            Panel::Transcript => &mut self.transcript_scroll,
        };
        *scroll = scroll.saturating_sub(1);
    }

    fn clamp_scroll(&mut self) {
        self.speaker_cursor = self
            .speaker_cursor
            .min(self.speakers().len().saturating_sub(1));
        self.transcript_scroll = self
            .transcript_scroll
            .min(self.transcript_len().saturating_sub(1));
    }

    /// Block until every submitted batch has been merged.
    #[cfg(test)]
    pub fn settle(&mut self) {
        while self.is_loading() {
            let batch = self
                .rx
                .recv_timeout(std::time::Duration::from_secs(5))
                .expect("batch should finish loading");
            self.queue.complete(batch);
            self.merge_ready();
        }
    }
}

/// Run `load`, turning a panic into an all-failure batch so the ticket is
/// still delivered.
fn load_or_abandon<F>(seq: BatchSeq, inputs: Vec<RawInput>, load: F) -> LoadedBatch
where
    F: FnOnce(BatchSeq, Vec<RawInput>) -> LoadedBatch,
{
    let names: Vec<String> = inputs.iter().map(|input| input.name.clone()).collect();
    panic::catch_unwind(AssertUnwindSafe(|| load(seq, inputs))).unwrap_or_else(|_| {
        tracing::error!(batch = seq.get(), files = names.len(), "batch loader panicked");
        LoadedBatch::abandoned(seq, names)
    })
}
