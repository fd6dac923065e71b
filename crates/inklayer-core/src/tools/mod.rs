//! Drawing session state machine (`Idle → Active → Idle`).

use crate::shapes::{InkPoint, Stroke, StrokeSettings, StrokeTool};

/// An in-progress drawing session.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSession {
    pub tool: StrokeTool,
    pub settings: StrokeSettings,
    /// Accumulated content-space samples (pen only; the eraser keeps its last sample).
    pub points: Vec<InkPoint>,
}

impl ActiveSession {
    /// Last sample, if any.
    pub fn last_point(&self) -> Option<InkPoint> {
        self.points.last().copied()
    }

    /// Turn a finished pen session into a smoothed stroke.
    ///
    /// Eraser sessions and sessions without samples produce nothing.
    pub fn into_stroke(self, smoothing_factor: f64) -> Option<Stroke> {
        if self.tool != StrokeTool::Pen || self.points.is_empty() {
            return None;
        }
        let mut stroke = Stroke::pen(self.points, self.settings);
        stroke.smooth(smoothing_factor);
        Some(stroke)
    }
}

/// State of the drawing session.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    /// Waiting for a pointer down.
    #[default]
    Idle,
    /// A pen or eraser drag is in progress.
    Active(ActiveSession),
}

/// What a newly accepted sample means for the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStep {
    /// No session is active; the sample was dropped.
    Ignored,
    /// Pen sample appended. `from` is the previous sample (`None` for the first one).
    PenSegment {
        from: Option<InkPoint>,
        to: InkPoint,
        settings: StrokeSettings,
    },
    /// Eraser moved to `at`.
    Erase { at: InkPoint, settings: StrokeSettings },
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active(_))
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        match self {
            SessionState::Active(session) => Some(session),
            SessionState::Idle => None,
        }
    }

    /// Open a new session at `point`.
    ///
    /// Returns the session that was still active, if any, so the caller can
    /// commit it instead of losing it.
    pub fn begin(
        &mut self,
        tool: StrokeTool,
        settings: StrokeSettings,
        point: InkPoint,
    ) -> (Option<ActiveSession>, SessionStep) {
        let previous = self.finish();
        *self = SessionState::Active(ActiveSession {
            tool,
            settings,
            points: Vec::new(),
        });
        let step = self.push(point);
        (previous, step)
    }

    /// Feed a content-space sample into the active session.
    pub fn push(&mut self, point: InkPoint) -> SessionStep {
        let SessionState::Active(session) = self else {
            return SessionStep::Ignored;
        };
        match session.tool {
            StrokeTool::Pen => {
                let from = session.last_point();
                session.points.push(point);
                SessionStep::PenSegment {
                    from,
                    to: point,
                    settings: session.settings.clone(),
                }
            }
            StrokeTool::Eraser => {
                session.points.clear();
                session.points.push(point);
                SessionStep::Erase {
                    at: point,
                    settings: session.settings.clone(),
                }
            }
        }
    }

    /// Close the session, returning it if one was active.
    pub fn finish(&mut self) -> Option<ActiveSession> {
        match std::mem::take(self) {
            SessionState::Active(session) => Some(session),
            SessionState::Idle => None,
        }
    }
}
