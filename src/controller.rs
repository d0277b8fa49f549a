use crate::corpus::TypingText;
use crate::scoring::{compute_stats, word_count};
use crate::session::{Phase, TypingSession};
use crate::settings::{GameSettings, Mode};
use std::time::SystemTime;

/// Stop condition fixed from the settings when a session starts. Settings
/// changes made mid-session have no effect on a test already underway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionPolicy {
    Time { limit_secs: u64 },
    Words { limit: usize },
    Custom,
}

impl CompletionPolicy {
    pub fn from_settings(settings: &GameSettings) -> Self {
        match settings.mode {
            Mode::Time => Self::Time {
                limit_secs: settings.time_limit,
            },
            Mode::Words => Self::Words {
                limit: settings.word_limit,
            },
            Mode::Custom => Self::Custom,
        }
    }
}

/// What became of one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Buffer updated, session still running. When the edit appended exactly
    /// one character, `last_char_correct` reports whether it matched the
    /// reference, for the external feedback hook.
    Accepted { last_char_correct: Option<bool> },
    /// Buffer updated and a stop condition fired in the same step.
    Completed { last_char_correct: Option<bool> },
    /// Over-length candidate or an edit after completion. State unchanged.
    Rejected,
}

impl InputOutcome {
    pub fn last_char_correct(&self) -> Option<bool> {
        match self {
            Self::Accepted { last_char_correct } | Self::Completed { last_char_correct } => {
                *last_char_correct
            }
            Self::Rejected => None,
        }
    }
}

/// Per-keystroke correctness signal for external feedback (key click, bell,
/// nothing at all). The controller reports; the hook decides.
pub trait KeystrokeFeedback {
    fn on_keystroke(&mut self, correct: bool);
}

/// Orchestrates the one live [`TypingSession`]: the single mutation entry
/// point for input events and timer ticks.
///
/// Nothing here panics or raises on bad input. A typing surface must never
/// lose the session to a stray keystroke, so every invalid event degrades to
/// a no-op that leaves state untouched.
#[derive(Debug)]
pub struct SessionController {
    session: TypingSession,
    policy: CompletionPolicy,
}

impl SessionController {
    pub fn new(text: TypingText, settings: &GameSettings) -> Self {
        Self {
            session: TypingSession::new(text),
            policy: CompletionPolicy::from_settings(settings),
        }
    }

    /// Read-only view for display layers.
    pub fn session(&self) -> &TypingSession {
        &self.session
    }

    pub fn policy(&self) -> CompletionPolicy {
        self.policy
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    pub fn is_completed(&self) -> bool {
        self.session.is_completed()
    }

    /// Discard the current session and start a fresh idle one. This is a new
    /// session record, not a transition: the old session is gone, and the
    /// completion policy is recaptured from the settings as they are now.
    pub fn reset(&mut self, text: TypingText, settings: &GameSettings) {
        self.session = TypingSession::new(text);
        self.policy = CompletionPolicy::from_settings(settings);
    }

    /// Apply one input event: `candidate` is the full buffer as the UI now
    /// sees it, growth or shrinkage (backspace goes through this same path).
    ///
    /// The first accepted event starts the clock. Stop conditions are checked
    /// in order: full reproduction of the reference, then the time limit,
    /// then the word limit. While the session stays active, a live stats
    /// preview is computed with `now` as a provisional end; the session's
    /// real end time is only ever written by a completing transition.
    pub fn handle_input(&mut self, candidate: &str, now: SystemTime) -> InputOutcome {
        if self.session.is_completed() {
            return InputOutcome::Rejected;
        }

        let candidate_len = candidate.chars().count();
        if candidate_len > self.session.reference_len() {
            return InputOutcome::Rejected;
        }

        // An empty buffer before the first keystroke is not an input event;
        // it must not start the clock.
        if self.session.phase() == Phase::Idle && candidate.is_empty() {
            return InputOutcome::Rejected;
        }

        let last_char_correct = self.appended_char_correct(candidate, candidate_len);

        if self.session.phase() == Phase::Idle {
            self.session.activate(now);
        }
        self.session.set_input(candidate.to_string());

        if self.should_complete(candidate, candidate_len, now) {
            self.finish(now);
            return InputOutcome::Completed { last_char_correct };
        }

        self.refresh_live_stats(now);
        InputOutcome::Accepted { last_char_correct }
    }

    /// Periodic 1-second tick while a test is running. Outside `Active` this
    /// is a no-op, which is what makes a stale timer from a finished or
    /// discarded session harmless. Returns true when the tick completed the
    /// session by hitting the time limit.
    pub fn on_tick(&mut self, now: SystemTime) -> bool {
        if !self.session.is_active() {
            return false;
        }

        if self.time_limit_reached(now) {
            self.finish(now);
            return true;
        }

        self.refresh_live_stats(now);
        false
    }

    /// Seconds left on the clock in time mode, `None` otherwise.
    pub fn seconds_remaining(&self, now: SystemTime) -> Option<f64> {
        match self.policy {
            CompletionPolicy::Time { limit_secs } => {
                Some((limit_secs as f64 - self.session.elapsed_secs(now)).max(0.0))
            }
            _ => None,
        }
    }

    /// Words left to type in words mode, `None` otherwise.
    pub fn words_remaining(&self) -> Option<usize> {
        match self.policy {
            CompletionPolicy::Words { limit } => {
                Some(limit.saturating_sub(word_count(self.session.input())))
            }
            _ => None,
        }
    }

    fn appended_char_correct(&self, candidate: &str, candidate_len: usize) -> Option<bool> {
        if candidate_len != self.session.input_len() + 1
            || !candidate.starts_with(self.session.input())
        {
            return None;
        }
        let typed = candidate.chars().last()?;
        let expected = self.session.reference().chars().nth(candidate_len - 1)?;
        Some(typed == expected)
    }

    fn should_complete(&self, candidate: &str, candidate_len: usize, now: SystemTime) -> bool {
        // Full reproduction wins over the mode-specific checks.
        if candidate_len == self.session.reference_len() {
            return true;
        }
        match self.policy {
            CompletionPolicy::Time { .. } => self.time_limit_reached(now),
            CompletionPolicy::Words { limit } => word_count(candidate) >= limit,
            CompletionPolicy::Custom => false,
        }
    }

    fn time_limit_reached(&self, now: SystemTime) -> bool {
        match self.policy {
            CompletionPolicy::Time { limit_secs } => {
                self.session.elapsed_secs(now) >= limit_secs as f64
            }
            _ => false,
        }
    }

    fn refresh_live_stats(&mut self, now: SystemTime) {
        let started = self.session.started_at().unwrap_or(now);
        let live = compute_stats(self.session.input(), self.session.reference(), started, now);
        self.session.set_live_stats(live);
    }

    fn finish(&mut self, now: SystemTime) {
        let started = self.session.started_at().unwrap_or(now);
        let stats = compute_stats(self.session.input(), self.session.reference(), started, now);
        self.session.complete(now, stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Difficulty;
    use assert_matches::assert_matches;
    use std::time::{Duration, UNIX_EPOCH};

    fn text(content: &str) -> TypingText {
        TypingText {
            id: "t".to_string(),
            content: content.to_string(),
            difficulty: Difficulty::Beginner,
            category: "test".to_string(),
            language: "en".to_string(),
            author: None,
            source: None,
        }
    }

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_000 + secs)
    }

    fn custom_settings() -> GameSettings {
        GameSettings {
            mode: Mode::Custom,
            ..GameSettings::default()
        }
    }

    #[test]
    fn test_first_input_activates_and_records_start() {
        let mut ctl = SessionController::new(text("cat"), &custom_settings());
        assert_eq!(ctl.session().phase(), Phase::Idle);

        let outcome = ctl.handle_input("c", at(0));

        assert_matches!(outcome, InputOutcome::Accepted { .. });
        assert!(ctl.is_active());
        assert_eq!(ctl.session().started_at(), Some(at(0)));
        assert_eq!(ctl.session().input(), "c");
    }

    #[test]
    fn test_full_reproduction_completes_immediately() {
        let mut ctl = SessionController::new(text("cat"), &custom_settings());
        ctl.handle_input("c", at(0));
        ctl.handle_input("ca", at(10));
        let outcome = ctl.handle_input("cat", at(30));

        assert_matches!(outcome, InputOutcome::Completed { .. });
        assert!(ctl.is_completed());
        assert_eq!(ctl.session().ended_at(), Some(at(30)));

        let stats = ctl.session().stats();
        assert_eq!(stats.correct_characters, 3);
        assert_eq!(stats.errors, 0);
        assert_eq!(stats.accuracy, 100.0);
        assert_eq!(stats.wpm, 1);
        assert_eq!(stats.time_elapsed, 30);
    }

    #[test]
    fn test_over_length_input_is_a_silent_noop() {
        let mut ctl = SessionController::new(text("cat"), &custom_settings());
        ctl.handle_input("ca", at(0));

        let before_input = ctl.session().input().to_string();
        let outcome = ctl.handle_input("catx", at(5));

        assert_eq!(outcome, InputOutcome::Rejected);
        assert_eq!(ctl.session().input(), before_input);
        assert!(ctl.is_active());
        assert!(!ctl.is_completed());
    }

    #[test]
    fn test_post_completion_edits_are_rejected() {
        let mut ctl = SessionController::new(text("hi"), &custom_settings());
        ctl.handle_input("hi", at(0));
        assert!(ctl.is_completed());

        let stats_before = *ctl.session().stats();
        assert_eq!(ctl.handle_input("h", at(5)), InputOutcome::Rejected);
        assert_eq!(ctl.session().input(), "hi");
        assert_eq!(*ctl.session().stats(), stats_before);
        assert!(ctl.is_completed());
    }

    #[test]
    fn test_backspace_flows_through_the_same_path() {
        let mut ctl = SessionController::new(text("cat"), &custom_settings());
        ctl.handle_input("cb", at(0));

        let outcome = ctl.handle_input("c", at(1));
        assert_matches!(outcome, InputOutcome::Accepted { last_char_correct: None });
        assert_eq!(ctl.session().input(), "c");
        assert!(ctl.is_active());
    }

    #[test]
    fn test_appended_char_correctness_signal() {
        let mut ctl = SessionController::new(text("cat"), &custom_settings());

        let first = ctl.handle_input("c", at(0));
        assert_eq!(first.last_char_correct(), Some(true));

        let second = ctl.handle_input("cb", at(1));
        assert_eq!(second.last_char_correct(), Some(false));

        // Replacing the whole buffer is not a single keystroke.
        let replaced = ctl.handle_input("ca", at(2));
        assert_eq!(replaced.last_char_correct(), None);
    }

    #[test]
    fn test_live_stats_use_provisional_end_only() {
        let mut ctl = SessionController::new(text("cat cat"), &custom_settings());
        ctl.handle_input("c", at(0));
        ctl.handle_input("ca", at(30));

        // Live preview was computed against now=30s...
        assert_eq!(ctl.session().stats().time_elapsed, 30);
        // ...but nothing has ended.
        assert_eq!(ctl.session().ended_at(), None);
        assert!(ctl.is_active());
    }

    #[test]
    fn test_time_mode_completes_on_tick() {
        let settings = GameSettings {
            mode: Mode::Time,
            time_limit: 30,
            ..GameSettings::default()
        };
        let mut ctl = SessionController::new(text("the quick brown fox"), &settings);
        ctl.handle_input("the", at(0));

        assert!(!ctl.on_tick(at(29)));
        assert!(ctl.is_active());

        assert!(ctl.on_tick(at(30)));
        assert!(ctl.is_completed());
        assert_eq!(ctl.session().ended_at(), Some(at(30)));

        // Final stats reflect the partial input that existed at the cutoff.
        let stats = ctl.session().stats();
        assert_eq!(stats.characters_typed, 3);
        assert_eq!(stats.time_elapsed, 30);
    }

    #[test]
    fn test_time_mode_completes_on_input_too() {
        let settings = GameSettings {
            mode: Mode::Time,
            time_limit: 30,
            ..GameSettings::default()
        };
        let mut ctl = SessionController::new(text("the quick brown fox"), &settings);
        ctl.handle_input("t", at(0));

        let outcome = ctl.handle_input("th", at(31));
        assert_matches!(outcome, InputOutcome::Completed { .. });
        assert_eq!(ctl.session().input(), "th");
    }

    #[test]
    fn test_ticks_are_noops_when_not_active() {
        let settings = GameSettings {
            mode: Mode::Time,
            time_limit: 1,
            ..GameSettings::default()
        };
        let mut ctl = SessionController::new(text("abc"), &settings);

        // Idle: the clock has not started, a tick must not start it.
        assert!(!ctl.on_tick(at(100)));
        assert_eq!(ctl.session().phase(), Phase::Idle);
        assert_eq!(ctl.session().started_at(), None);

        ctl.handle_input("a", at(0));
        ctl.on_tick(at(5));
        assert!(ctl.is_completed());
        let ended = ctl.session().ended_at();

        // Completed: stale ticks change nothing.
        assert!(!ctl.on_tick(at(50)));
        assert_eq!(ctl.session().ended_at(), ended);
    }

    #[test]
    fn test_words_mode_completes_at_word_limit() {
        let settings = GameSettings {
            mode: Mode::Words,
            word_limit: 2,
            ..GameSettings::default()
        };
        let mut ctl = SessionController::new(text("hi there you"), &settings);

        assert_matches!(
            ctl.handle_input("hi", at(0)),
            InputOutcome::Accepted { .. }
        );
        assert_matches!(
            ctl.handle_input("hi ", at(1)),
            InputOutcome::Accepted { .. }
        );
        // Second whitespace-delimited token appears: trimmed split counting.
        assert_matches!(
            ctl.handle_input("hi t", at(2)),
            InputOutcome::Completed { .. }
        );
        assert_eq!(ctl.session().stats().characters_typed, 4);
    }

    #[test]
    fn test_custom_mode_ignores_time_and_words() {
        let settings = GameSettings {
            mode: Mode::Custom,
            time_limit: 1,
            word_limit: 1,
            ..GameSettings::default()
        };
        let mut ctl = SessionController::new(text("one two three"), &settings);

        ctl.handle_input("one two", at(0));
        assert!(!ctl.on_tick(at(500)));
        assert!(ctl.is_active());

        let outcome = ctl.handle_input("one two three", at(600));
        assert_matches!(outcome, InputOutcome::Completed { .. });
    }

    #[test]
    fn test_full_reproduction_checked_before_word_limit() {
        let settings = GameSettings {
            mode: Mode::Words,
            word_limit: 50,
            ..GameSettings::default()
        };
        let mut ctl = SessionController::new(text("hi"), &settings);

        let outcome = ctl.handle_input("hi", at(3));
        assert_matches!(outcome, InputOutcome::Completed { .. });
    }

    #[test]
    fn test_reset_builds_a_fresh_session_with_new_policy() {
        let settings = GameSettings {
            mode: Mode::Time,
            time_limit: 30,
            ..GameSettings::default()
        };
        let mut ctl = SessionController::new(text("abc"), &settings);
        ctl.handle_input("ab", at(0));

        let new_settings = GameSettings {
            mode: Mode::Words,
            word_limit: 3,
            ..GameSettings::default()
        };
        ctl.reset(text("xyz"), &new_settings);

        assert_eq!(ctl.session().phase(), Phase::Idle);
        assert_eq!(ctl.session().input(), "");
        assert_eq!(ctl.session().started_at(), None);
        assert_eq!(ctl.policy(), CompletionPolicy::Words { limit: 3 });
        assert_eq!(ctl.session().reference(), "xyz");
    }

    #[test]
    fn test_policy_is_captured_at_start_not_live() {
        let mut settings = GameSettings {
            mode: Mode::Time,
            time_limit: 30,
            ..GameSettings::default()
        };
        let mut ctl = SessionController::new(text("the quick brown fox"), &settings);
        ctl.handle_input("t", at(0));

        // Shell mutates its settings mid-session; the running test keeps the
        // limits it started with.
        settings.time_limit = 5;
        assert!(!ctl.on_tick(at(10)));
        assert!(ctl.is_active());
        assert!(ctl.on_tick(at(30)));
    }

    #[test]
    fn test_empty_buffer_does_not_start_the_clock() {
        let mut ctl = SessionController::new(text("cat"), &custom_settings());

        assert_eq!(ctl.handle_input("", at(0)), InputOutcome::Rejected);
        assert_eq!(ctl.session().phase(), Phase::Idle);
        assert_eq!(ctl.session().started_at(), None);
    }

    #[test]
    fn test_input_length_never_exceeds_reference() {
        let mut ctl = SessionController::new(text("abc"), &custom_settings());
        for candidate in ["a", "ab", "abcd", "abcde", "ab", "abc"] {
            ctl.handle_input(candidate, at(1));
            assert!(ctl.session().input_len() <= ctl.session().reference_len());
        }
    }

    #[test]
    fn test_seconds_and_words_remaining() {
        let settings = GameSettings {
            mode: Mode::Time,
            time_limit: 30,
            ..GameSettings::default()
        };
        let mut ctl = SessionController::new(text("the quick brown fox"), &settings);
        assert_eq!(ctl.seconds_remaining(at(0)), Some(30.0));
        assert_eq!(ctl.words_remaining(), None);

        ctl.handle_input("t", at(0));
        assert_eq!(ctl.seconds_remaining(at(12)), Some(18.0));

        let settings = GameSettings {
            mode: Mode::Words,
            word_limit: 4,
            ..GameSettings::default()
        };
        let mut ctl = SessionController::new(text("the quick brown fox"), &settings);
        ctl.handle_input("the qu", at(0));
        assert_eq!(ctl.words_remaining(), Some(2));
        assert_eq!(ctl.seconds_remaining(at(1)), None);
    }
}
