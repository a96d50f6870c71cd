//! Brush/pan gesture state machine shared by the zoomable charts.
//!
//! Both gestures share one pointer-capture region; which one a drag
//! becomes is decided by the zoom state at press time, not by disabling
//! controls. Brushing is only reachable while unzoomed, panning only
//! while zoomed.
//!
//! States: `Idle` (zoomed or not), `Brushing`, `Panning`.
//! - Idle(unzoomed) --drag--> Brushing --release with selection-->
//!   Idle(zoomed); an empty selection releases back to Idle unchanged.
//! - Idle(zoomed) --drag--> Panning --release--> Idle(zoomed).
//! - Idle(zoomed) --double-click--> Idle(unzoomed).
//!
//! The machine is pure: it consumes plain pointer inputs and emits
//! outputs the renderer converts into [`super::ChartEvent`]s.

/// A brush selection narrower than this (in either dimension) counts as
/// empty and commits nothing.
pub const MIN_BRUSH_PX: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GesturePhase {
    Idle,
    Brushing { start: (f32, f32), current: (f32, f32) },
    Panning { start: (f32, f32), current: (f32, f32) },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureInput {
    PointerDown((f32, f32)),
    PointerMove((f32, f32)),
    PointerUp((f32, f32)),
    DoubleClick,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutput {
    None,
    /// Brush rectangle in flight, for the selection overlay.
    BrushPreview { from: (f32, f32), to: (f32, f32) },
    /// Pointer released over a non-empty selection.
    BrushCommitted { from: (f32, f32), to: (f32, f32) },
    /// Cumulative drag delta from the pan start.
    PanDelta { dx: f32, dy: f32 },
    PanEnded,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureState {
    phase: Option<GesturePhase>,
}

impl GestureState {
    pub fn new() -> Self {
        Self {
            phase: Some(GesturePhase::Idle),
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase.unwrap_or(GesturePhase::Idle)
    }

    /// Advance the machine. `zoomed` is the chart's current zoom state,
    /// sampled at press time to pick the gesture.
    pub fn update(&mut self, input: GestureInput, zoomed: bool) -> GestureOutput {
        let phase = self.phase();
        let (next, output) = match (phase, input) {
            (GesturePhase::Idle, GestureInput::PointerDown(pos)) => {
                if zoomed {
                    (
                        GesturePhase::Panning {
                            start: pos,
                            current: pos,
                        },
                        GestureOutput::None,
                    )
                } else {
                    (
                        GesturePhase::Brushing {
                            start: pos,
                            current: pos,
                        },
                        GestureOutput::None,
                    )
                }
            }
            (GesturePhase::Brushing { start, .. }, GestureInput::PointerMove(pos)) => (
                GesturePhase::Brushing {
                    start,
                    current: pos,
                },
                GestureOutput::BrushPreview {
                    from: start,
                    to: pos,
                },
            ),
            (GesturePhase::Brushing { start, .. }, GestureInput::PointerUp(pos)) => {
                let wide_enough = (pos.0 - start.0).abs() >= MIN_BRUSH_PX
                    && (pos.1 - start.1).abs() >= MIN_BRUSH_PX;
                let output = if wide_enough {
                    GestureOutput::BrushCommitted {
                        from: start,
                        to: pos,
                    }
                } else {
                    GestureOutput::None
                };
                (GesturePhase::Idle, output)
            }
            (GesturePhase::Panning { start, .. }, GestureInput::PointerMove(pos)) => (
                GesturePhase::Panning {
                    start,
                    current: pos,
                },
                GestureOutput::PanDelta {
                    dx: pos.0 - start.0,
                    dy: pos.1 - start.1,
                },
            ),
            (GesturePhase::Panning { .. }, GestureInput::PointerUp(_)) => {
                (GesturePhase::Idle, GestureOutput::PanEnded)
            }
            (GesturePhase::Idle, GestureInput::DoubleClick) => {
                let output = if zoomed {
                    GestureOutput::Reset
                } else {
                    GestureOutput::None
                };
                (GesturePhase::Idle, output)
            }
            // A double-click mid-gesture or a stray move/up in Idle
            // changes nothing.
            (phase, _) => (phase, GestureOutput::None),
        };
        self.phase = Some(next);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brush_commits_only_with_a_selection() {
        let mut g = GestureState::new();
        assert_eq!(
            g.update(GestureInput::PointerDown((10.0, 10.0)), false),
            GestureOutput::None
        );
        assert!(matches!(g.phase(), GesturePhase::Brushing { .. }));
        let out = g.update(GestureInput::PointerUp((11.0, 11.0)), false);
        assert_eq!(out, GestureOutput::None); // empty selection, no-op
        assert_eq!(g.phase(), GesturePhase::Idle);

        g.update(GestureInput::PointerDown((10.0, 10.0)), false);
        let out = g.update(GestureInput::PointerUp((60.0, 40.0)), false);
        assert_eq!(
            out,
            GestureOutput::BrushCommitted {
                from: (10.0, 10.0),
                to: (60.0, 40.0)
            }
        );
    }

    #[test]
    fn drag_pans_only_when_zoomed() {
        let mut g = GestureState::new();
        g.update(GestureInput::PointerDown((5.0, 5.0)), true);
        assert!(matches!(g.phase(), GesturePhase::Panning { .. }));
        assert_eq!(
            g.update(GestureInput::PointerMove((15.0, 2.0)), true),
            GestureOutput::PanDelta { dx: 10.0, dy: -3.0 }
        );
        assert_eq!(
            g.update(GestureInput::PointerUp((15.0, 2.0)), true),
            GestureOutput::PanEnded
        );
    }

    #[test]
    fn double_click_resets_only_when_zoomed() {
        let mut g = GestureState::new();
        assert_eq!(g.update(GestureInput::DoubleClick, false), GestureOutput::None);
        assert_eq!(g.update(GestureInput::DoubleClick, true), GestureOutput::Reset);
    }
}
