use crate::corpus::TypingText;
use crate::scoring::TypingStats;
use std::time::SystemTime;

/// Lifecycle of a single typing test. `Completed` is terminal; a new test
/// allocates a fresh session rather than reviving this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Active,
    Completed,
}

/// Mutable state of the one live typing test.
///
/// The buffer and lifecycle fields are only writable from within the crate:
/// every mutation flows through the session controller, which is what keeps
/// the invariants (input never longer than the reference, completed sessions
/// frozen) enforceable in one place.
#[derive(Debug, Clone)]
pub struct TypingSession {
    text: TypingText,
    input: String,
    phase: Phase,
    started_at: Option<SystemTime>,
    ended_at: Option<SystemTime>,
    stats: TypingStats,
}

impl TypingSession {
    /// A fresh idle session bound to `text`, with an empty buffer.
    pub fn new(text: TypingText) -> Self {
        Self {
            text,
            input: String::new(),
            phase: Phase::Idle,
            started_at: None,
            ended_at: None,
            stats: TypingStats::default(),
        }
    }

    pub fn text(&self) -> &TypingText {
        &self.text
    }

    pub fn reference(&self) -> &str {
        &self.text.content
    }

    pub fn reference_len(&self) -> usize {
        self.text.content.chars().count()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_len(&self) -> usize {
        self.input.chars().count()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    /// Set iff the session has received at least one accepted input event.
    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    /// Set iff the session has completed.
    pub fn ended_at(&self) -> Option<SystemTime> {
        self.ended_at
    }

    /// Last-computed metrics: live preview while active, the authoritative
    /// final snapshot once completed.
    pub fn stats(&self) -> &TypingStats {
        &self.stats
    }

    /// Seconds since the first accepted input, zero before that.
    pub fn elapsed_secs(&self, now: SystemTime) -> f64 {
        self.started_at
            .and_then(|start| now.duration_since(start).ok())
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    pub(crate) fn activate(&mut self, now: SystemTime) {
        self.phase = Phase::Active;
        self.started_at = Some(now);
    }

    pub(crate) fn set_input(&mut self, input: String) {
        self.input = input;
    }

    pub(crate) fn set_live_stats(&mut self, stats: TypingStats) {
        self.stats = stats;
    }

    pub(crate) fn complete(&mut self, now: SystemTime, stats: TypingStats) {
        self.phase = Phase::Completed;
        self.ended_at = Some(now);
        self.stats = stats;
    }
}
