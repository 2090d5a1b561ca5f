//! Elapsed recording time with pause/resume.
//!
//! The timer keeps the accumulated duration of every finished segment and the
//! anchor of the running one. A periodic tick recomputes the total, but the
//! value shown to the user is only republished once per [`PUBLISH_INTERVAL`].

mod ticks;

pub use ticks::TickHandle;

use ticks::TickScheduler;

use std::time::{Duration, Instant};

const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1_000;

pub const PUBLISH_INTERVAL: Duration = Duration::from_millis(1000);

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Recording,
    Paused,
    Finished,
}

impl TimerState {
    /// True while a recording is in progress, paused or not.
    pub fn is_recording(self) -> bool {
        matches!(self, TimerState::Recording | TimerState::Paused)
    }

    pub fn is_paused(self) -> bool {
        self == TimerState::Paused
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TimerState::Idle => "Ready",
            TimerState::Recording => "Recording",
            TimerState::Paused => "Paused",
            TimerState::Finished => "Finished",
        }
    }
}

/// Formats milliseconds as `HH:MM:SS`. Fields are truncated, never rounded,
/// and hours are not capped at two digits.
pub fn format_time(ms: u64) -> String {
    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

pub struct RecordingTimer<C: Clock = SystemClock> {
    clock: C,
    state: TimerState,
    accumulated_ms: u64,
    segment_start: Option<Instant>,
    recorded_time_ms: u64,
    last_publish: Option<Instant>,
    ticks: TickScheduler,
    active_tick: Option<TickHandle>,
}

impl RecordingTimer<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for RecordingTimer<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> RecordingTimer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            state: TimerState::Idle,
            accumulated_ms: 0,
            segment_start: None,
            recorded_time_ms: 0,
            last_publish: None,
            ticks: TickScheduler::new(),
            active_tick: None,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// The throttled value shown to the user, in milliseconds.
    pub fn recorded_time(&self) -> u64 {
        self.recorded_time_ms
    }

    /// Time folded in from finished segments only.
    pub fn accumulated(&self) -> u64 {
        self.accumulated_ms
    }

    /// Unthrottled total including the running segment.
    pub fn elapsed(&self) -> u64 {
        self.accumulated_ms + self.running_segment_ms(self.clock.now())
    }

    /// The handle the next tick must carry, if the timer is running.
    pub fn active_tick(&self) -> Option<TickHandle> {
        self.active_tick
    }

    pub fn start(&mut self) {
        if self.state.is_recording() {
            tracing::debug!("Ignoring start while {}", self.state.display_name());
            return;
        }
        let now = self.clock.now();
        self.accumulated_ms = 0;
        self.recorded_time_ms = 0;
        self.last_publish = None;
        self.segment_start = Some(now);
        self.state = TimerState::Recording;
        self.schedule_tick();
        tracing::debug!("Recording timer started");
    }

    pub fn pause(&mut self) {
        if self.state != TimerState::Recording {
            tracing::debug!("Ignoring pause while {}", self.state.display_name());
            return;
        }
        let now = self.clock.now();
        self.accumulated_ms += self.running_segment_ms(now);
        self.segment_start = None;
        self.state = TimerState::Paused;
        self.cancel_tick();
        tracing::debug!(accumulated_ms = self.accumulated(), "Recording timer paused");
    }

    pub fn resume(&mut self) {
        if self.state != TimerState::Paused {
            tracing::debug!("Ignoring resume while {}", self.state.display_name());
            return;
        }
        self.segment_start = Some(self.clock.now());
        self.state = TimerState::Recording;
        self.schedule_tick();
        tracing::debug!("Recording timer resumed");
    }

    /// Abandons the session. The last published time is left as is.
    pub fn stop(&mut self) {
        self.cancel_tick();
        self.accumulated_ms = 0;
        self.segment_start = None;
        if self.state.is_recording() {
            self.state = TimerState::Idle;
            tracing::debug!("Recording timer stopped");
        }
    }

    /// Ends a completed session and clears the displayed time.
    pub fn finish(&mut self) {
        let was_recording = self.state.is_recording();
        self.stop();
        self.recorded_time_ms = 0;
        self.last_publish = None;
        if was_recording {
            self.state = TimerState::Finished;
            tracing::debug!("Recording timer finished");
        }
    }

    /// Advances the timer for one tick. Returns the newly published time, or
    /// `None` when the tick is stale or the publish throttle holds it back.
    pub fn on_tick(&mut self, handle: TickHandle) -> Option<u64> {
        if self.active_tick != Some(handle) || !self.ticks.is_live(handle) {
            tracing::trace!(?handle, "Dropping stale tick");
            return None;
        }
        if self.state != TimerState::Recording {
            return None;
        }

        let now = self.clock.now();
        let due = match self.last_publish {
            Some(last) => now.saturating_duration_since(last) >= PUBLISH_INTERVAL,
            None => true,
        };
        if !due {
            return None;
        }

        let total = self.accumulated_ms + self.running_segment_ms(now);
        self.recorded_time_ms = self.recorded_time_ms.max(total);
        self.last_publish = Some(now);
        Some(self.recorded_time_ms)
    }

    fn running_segment_ms(&self, now: Instant) -> u64 {
        self.segment_start
            .map(|start| now.saturating_duration_since(start).as_millis() as u64)
            .unwrap_or(0)
    }

    fn schedule_tick(&mut self) {
        self.cancel_tick();
        self.active_tick = Some(self.ticks.schedule());
    }

    fn cancel_tick(&mut self) {
        if let Some(handle) = self.active_tick.take() {
            self.ticks.cancel(handle);
        }
    }
}
