//! Frame scheduling: coalesces viewport-driven repaints into display frames.
//!
//! The host owns the real per-frame callback (`requestAnimationFrame`, a winit
//! redraw request, a test clock). It is abstracted as a [`FrameHost`] so the
//! scheduler can be stepped deterministically.

use std::collections::VecDeque;

/// One display frame at 60 Hz.
pub const DEFAULT_THROTTLE_MS: f64 = 16.0;

/// Handle for a requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Host-side frame callback provider.
pub trait FrameHost {
    /// Monotonic clock in milliseconds.
    fn now_ms(&self) -> f64;

    /// Ask for a callback on the next display frame.
    ///
    /// The host later hands the token back to the engine's `on_frame`.
    fn request_frame(&mut self) -> FrameToken;

    /// Cancel a previously requested frame. Unknown tokens are ignored.
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Result of asking the scheduler for a repaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// A new frame was requested from the host.
    Scheduled(FrameToken),
    /// A frame is already pending; the request was folded into it.
    Coalesced,
}

/// What to do when a frame fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAction {
    /// Repaint now.
    Redraw,
    /// Too soon after the previous repaint; another frame was requested.
    Deferred(FrameToken),
    /// The token was cancelled or superseded.
    Stale,
}

/// Keeps at most one frame pending and throttles repaints to one per window.
#[derive(Debug, Clone)]
pub struct RenderScheduler {
    pending: Option<FrameToken>,
    dirty: bool,
    last_redraw_ms: Option<f64>,
    throttle_ms: f64,
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_MS)
    }
}

impl RenderScheduler {
    pub fn new(throttle_ms: f64) -> Self {
        Self {
            pending: None,
            dirty: false,
            last_redraw_ms: None,
            throttle_ms,
        }
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether state changed after the pending frame was requested.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Request a repaint on the next frame.
    pub fn request(&mut self, host: &mut dyn FrameHost) -> ScheduleOutcome {
        if self.pending.is_some() {
            self.dirty = true;
            return ScheduleOutcome::Coalesced;
        }
        let token = host.request_frame();
        self.pending = Some(token);
        ScheduleOutcome::Scheduled(token)
    }

    /// Handle a frame callback from the host.
    pub fn on_frame(&mut self, token: FrameToken, host: &mut dyn FrameHost) -> FrameAction {
        if self.pending != Some(token) {
            return FrameAction::Stale;
        }
        self.pending = None;

        let now = host.now_ms();
        let too_soon = self
            .last_redraw_ms
            .is_some_and(|last| now - last < self.throttle_ms);
        if too_soon {
            self.dirty = true;
            let token = host.request_frame();
            self.pending = Some(token);
            return FrameAction::Deferred(token);
        }

        // The repaint reads the latest state, which covers every coalesced request.
        self.dirty = false;
        self.last_redraw_ms = Some(now);
        FrameAction::Redraw
    }

    /// Drop any pending frame before a synchronous repaint.
    pub fn force(&mut self, host: &mut dyn FrameHost) {
        self.cancel(host);
        self.last_redraw_ms = Some(host.now_ms());
    }

    /// Cancel the pending frame, if any. Safe to call repeatedly.
    ///
    /// Returns `true` when a frame was actually cancelled.
    pub fn cancel(&mut self, host: &mut dyn FrameHost) -> bool {
        self.dirty = false;
        match self.pending.take() {
            Some(token) => {
                host.cancel_frame(token);
                true
            }
            None => false,
        }
    }
}

/// A frame host driven by hand: the caller advances the clock and fires frames.
///
/// Useful for tests and for hosts that poll (e.g. a winit loop reacting to
/// `RedrawRequested`).
#[derive(Debug, Clone, Default)]
pub struct ManualFrameHost {
    now_ms: f64,
    next_token: u64,
    queue: VecDeque<FrameToken>,
    requested: usize,
    cancelled: usize,
}

impl ManualFrameHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms;
    }

    /// Pop the oldest outstanding frame, to be passed to `on_frame`.
    pub fn take_frame(&mut self) -> Option<FrameToken> {
        self.queue.pop_front()
    }

    /// Frames requested and neither fired nor cancelled.
    pub fn outstanding(&self) -> usize {
        self.queue.len()
    }

    /// Total number of `request_frame` calls.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Total number of `cancel_frame` calls that hit an outstanding frame.
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameHost for ManualFrameHost {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn request_frame(&mut self) -> FrameToken {
        self.next_token += 1;
        let token = FrameToken(self.next_token);
        self.queue.push_back(token);
        self.requested += 1;
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        let before = self.queue.len();
        self.queue.retain(|t| *t != token);
        if self.queue.len() != before {
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_coalesce_into_one_frame() {
        let mut host = ManualFrameHost::new();
        let mut scheduler = RenderScheduler::default();

        assert!(matches!(scheduler.request(&mut host), ScheduleOutcome::Scheduled(_)));
        assert_eq!(scheduler.request(&mut host), ScheduleOutcome::Coalesced);
        assert_eq!(scheduler.request(&mut host), ScheduleOutcome::Coalesced);
        assert!(scheduler.is_dirty());
        assert_eq!(host.requested(), 1);

        host.advance(16.0);
        let token = host.take_frame().unwrap();
        assert_eq!(scheduler.on_frame(token, &mut host), FrameAction::Redraw);
        assert!(!scheduler.is_pending());
        assert!(!scheduler.is_dirty());
    }

    #[test]
    fn test_frame_inside_throttle_window_reschedules() {
        let mut host = ManualFrameHost::new();
        let mut scheduler = RenderScheduler::default();

        scheduler.request(&mut host);
        let token = host.take_frame().unwrap();
        assert_eq!(scheduler.on_frame(token, &mut host), FrameAction::Redraw);

        // Next frame fires only 8ms later
        scheduler.request(&mut host);
        host.advance(8.0);
        let token = host.take_frame().unwrap();
        let action = scheduler.on_frame(token, &mut host);
        assert!(matches!(action, FrameAction::Deferred(_)));
        assert!(scheduler.is_dirty());
        assert_eq!(host.outstanding(), 1);

        host.advance(8.0);
        let token = host.take_frame().unwrap();
        assert_eq!(scheduler.on_frame(token, &mut host), FrameAction::Redraw);
        assert!(!scheduler.is_dirty());
    }

    #[test]
    fn test_stale_tokens_are_ignored() {
        let mut host = ManualFrameHost::new();
        let mut scheduler = RenderScheduler::default();
        assert_eq!(scheduler.on_frame(FrameToken(42), &mut host), FrameAction::Stale);

        scheduler.request(&mut host);
        let token = scheduler.pending().unwrap();
        scheduler.force(&mut host);
        assert_eq!(host.cancelled(), 1);
        assert_eq!(scheduler.on_frame(token, &mut host), FrameAction::Stale);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut host = ManualFrameHost::new();
        let mut scheduler = RenderScheduler::default();
        assert!(!scheduler.cancel(&mut host));
        scheduler.request(&mut host);
        assert!(scheduler.cancel(&mut host));
        assert!(!scheduler.cancel(&mut host));
        assert_eq!(host.outstanding(), 0);
        assert_eq!(host.cancelled(), 1);
    }
}
