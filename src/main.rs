mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    time::{Duration, SystemTime},
};

use swifttype::{
    controller::{InputOutcome, KeystrokeFeedback, SessionController},
    corpus::{Corpus, Difficulty, TextFilter},
    history::{History, TestResult},
    runtime::{AppEvent, CrosstermEventSource, EventPump},
    settings::{FileSettingsStore, GameSettings, Mode, SettingsStore, Theme},
};

/// The periodic tick drives the countdown and the time-limit check.
const TICK_RATE_MS: u64 = 1000;

/// terminal typing practice with live wpm/accuracy scoring
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Terminal typing practice: themed passages across four difficulty tiers, live WPM and accuracy while you type, and a personal result history."
)]
pub struct Cli {
    /// difficulty tier to draw passages from
    #[clap(short, long, value_enum)]
    difficulty: Option<Difficulty>,

    /// passage category to draw from (see --list-categories)
    #[clap(short, long)]
    category: Option<String>,

    /// completion mode for the test
    #[clap(short, long, value_enum)]
    mode: Option<Mode>,

    /// time limit in seconds (implies --mode time)
    #[clap(short = 's', long)]
    seconds: Option<u64>,

    /// word limit (implies --mode words)
    #[clap(short = 'w', long)]
    words: Option<usize>,

    /// color theme
    #[clap(short, long, value_enum)]
    theme: Option<Theme>,

    /// disable the error bell
    #[clap(long)]
    no_sound: bool,

    /// hide the on-screen keyboard
    #[clap(long)]
    hide_keyboard: bool,

    /// print the available passage categories and exit
    #[clap(long)]
    list_categories: bool,
}

impl Cli {
    /// Layer command-line overrides on top of the persisted settings.
    /// Overrides are for this run only; they are not written back.
    fn apply(&self, mut settings: GameSettings) -> GameSettings {
        if let Some(difficulty) = self.difficulty {
            settings.difficulty = difficulty;
        }
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(seconds) = self.seconds {
            settings.time_limit = seconds;
            if self.mode.is_none() {
                settings.mode = Mode::Time;
            }
        }
        if let Some(words) = self.words {
            settings.word_limit = words;
            if self.mode.is_none() && self.seconds.is_none() {
                settings.mode = Mode::Words;
            }
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if self.no_sound {
            settings.sound_enabled = false;
        }
        if self.hide_keyboard {
            settings.show_keyboard = false;
        }
        settings.sanitized()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
}

/// Rings the terminal bell on a missed keystroke. The controller only
/// reports correctness; whether that becomes audio is decided here.
struct BellFeedback {
    enabled: bool,
}

impl KeystrokeFeedback for BellFeedback {
    fn on_keystroke(&mut self, correct: bool) {
        if self.enabled && !correct {
            let mut stdout = io::stdout();
            let _ = stdout.write_all(b"\x07");
            let _ = stdout.flush();
        }
    }
}

pub struct App {
    pub settings: GameSettings,
    pub controller: SessionController,
    pub corpus: Corpus,
    pub history: History,
    pub state: AppState,
    pub best_wpm: Option<u32>,
    pub new_best: bool,
    category: Option<String>,
    feedback: BellFeedback,
}

impl App {
    /// `None` only when the corpus has nothing to offer at all.
    pub fn new(settings: GameSettings, category: Option<String>) -> Option<Self> {
        let corpus = Corpus::embedded();
        let history = History::new();
        let filter = TextFilter {
            difficulty: Some(settings.difficulty),
            category: category.clone(),
        };
        let text = corpus.select(&filter)?;
        let feedback = BellFeedback {
            enabled: settings.sound_enabled,
        };

        Some(Self {
            controller: SessionController::new(text, &settings),
            best_wpm: history.best_wpm(),
            new_best: false,
            settings,
            corpus,
            history,
            state: AppState::Typing,
            category,
            feedback,
        })
    }

    fn filter(&self) -> TextFilter {
        TextFilter {
            difficulty: Some(self.settings.difficulty),
            category: self.category.clone(),
        }
    }

    /// Discard the current session and start over with a fresh passage.
    /// With no passage to offer, the current screen stays up.
    pub fn new_test(&mut self) {
        if let Some(text) = self.corpus.select(&self.filter()) {
            self.controller.reset(text, &self.settings);
            self.state = AppState::Typing;
            self.new_best = false;
        }
    }

    /// Discard the current session but keep the same passage.
    pub fn retry(&mut self) {
        let text = self.controller.session().text().clone();
        self.controller.reset(text, &self.settings);
        self.state = AppState::Typing;
        self.new_best = false;
    }

    fn handle_typing_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c) => {
                let mut candidate = self.controller.session().input().to_string();
                candidate.push(c);
                let outcome = self.controller.handle_input(&candidate, SystemTime::now());
                if let Some(correct) = outcome.last_char_correct() {
                    self.feedback.on_keystroke(correct);
                }
                if matches!(outcome, InputOutcome::Completed { .. }) {
                    self.finalize();
                }
            }
            KeyCode::Backspace => {
                let mut candidate = self.controller.session().input().to_string();
                if candidate.pop().is_some() {
                    let _ = self.controller.handle_input(&candidate, SystemTime::now());
                }
            }
            _ => {}
        }
    }

    fn on_tick(&mut self) {
        if self.controller.on_tick(SystemTime::now()) {
            self.finalize();
        }
    }

    /// Record the completed test and move to the results screen. A failed
    /// history write loses nothing but the log line.
    fn finalize(&mut self) {
        let session = self.controller.session();
        let stats = *session.stats();
        self.new_best = match self.best_wpm {
            Some(best) => stats.wpm > best,
            None => stats.wpm > 0,
        };

        let result = TestResult::new(
            &session.text().id,
            session.text().difficulty,
            self.settings.mode,
            &stats,
        );
        let _ = self.history.append(&result);
        self.best_wpm = self.history.best_wpm();
        self.state = AppState::Results;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list_categories {
        for category in Corpus::embedded().categories() {
            println!("{category}");
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileSettingsStore::new();
    let settings = cli.apply(store.load());
    let Some(mut app) = App::new(settings, cli.category.clone()) else {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "no passages available").exit();
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let pump = EventPump::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        // The tick timer is armed only while a test is running; the
        // controller additionally ignores stray ticks outside Active, so a
        // tick racing a completion cannot touch the finished session.
        match pump.next_event(app.controller.is_active()) {
            AppEvent::Tick => {
                app.on_tick();
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            AppEvent::Quit => return Ok(()),
            AppEvent::Resize => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            AppEvent::Key(key) => {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                match app.state {
                    AppState::Typing => match key.code {
                        KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        code => app.handle_typing_key(code),
                    },
                    AppState::Results => match key.code {
                        KeyCode::Esc | KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char('n') => app.new_test(),
                        KeyCode::Char('r') => app.retry(),
                        _ => {}
                    },
                }
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
        }
    }
}
