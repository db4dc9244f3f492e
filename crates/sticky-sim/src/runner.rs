//! Scroll replay
//!
//! Scroll offsets are queued on a calloop channel and delivered to the page
//! by the event loop, one scroll event per message, the same way a host
//! would forward scroll notifications.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use calloop::channel::{self, Event};
use calloop::EventLoop;
use serde::Serialize;
use sticky::{StuckElement, Transition};

use crate::scene::{BuiltScene, Scene};

/// One scroll notification
#[derive(Debug, Clone, Copy)]
struct ScrollEvent {
    step: usize,
    offset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct TransitionReport {
    pub element: String,
    pub transition: Transition,
}

/// What happened during one scroll event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct StepReport {
    pub step: usize,
    pub requested: f64,

    /// Offset after clamping to the document
    pub offset: f64,

    pub transitions: Vec<TransitionReport>,
    pub registry: Vec<StuckElement>,

    /// Label of the element stuck on top
    pub active: Option<String>,
}

struct SimState {
    scene: BuiltScene,
    reports: Vec<StepReport>,
    error: Option<anyhow::Error>,
    finished: bool,
}

impl SimState {
    fn apply(&mut self, event: ScrollEvent) -> Result<StepReport> {
        let offset = self.scene.doc.scroll_to(event.offset);
        let transitions = self
            .scene
            .page
            .on_scroll()
            .with_context(|| format!("scroll step {} failed", event.step))?;

        let transitions = transitions
            .into_iter()
            .map(|(id, transition)| TransitionReport {
                element: self.scene.label(id),
                transition,
            })
            .collect::<Vec<_>>();

        for report in &transitions {
            tracing::info!(step = event.step, element = %report.element, transition = ?report.transition, "transition");
        }

        Ok(StepReport {
            step: event.step,
            requested: event.offset,
            offset,
            transitions,
            registry: self.scene.page.registry().snapshot(),
            active: self
                .scene
                .page
                .active_controller()
                .map(|id| self.scene.label(id)),
        })
    }
}

/// Build the scene and replay its scroll script through an event loop
pub(crate) fn run(scene: &Scene) -> Result<Vec<StepReport>> {
    let mut event_loop: EventLoop<SimState> =
        EventLoop::try_new().context("failed to create event loop")?;
    let (sender, scroll_source) = channel::channel::<ScrollEvent>();

    event_loop
        .handle()
        .insert_source(scroll_source, |event, _, state: &mut SimState| match event {
            Event::Msg(scroll) => {
                if state.error.is_some() {
                    return;
                }
                match state.apply(scroll) {
                    Ok(report) => state.reports.push(report),
                    Err(e) => state.error = Some(e),
                }
            }
            Event::Closed => state.finished = true,
        })
        .map_err(|e| anyhow!("failed to register scroll source: {}", e.error))?;

    let mut state = SimState {
        scene: scene.build()?,
        reports: Vec::with_capacity(scene.scroll.len()),
        error: None,
        finished: false,
    };

    for (step, &offset) in scene.scroll.iter().enumerate() {
        sender
            .send(ScrollEvent { step, offset })
            .context("scroll channel closed")?;
    }
    drop(sender);

    while !state.finished {
        event_loop
            .dispatch(Some(Duration::from_millis(100)), &mut state)
            .context("event loop dispatch failed")?;
    }

    if let Some(e) = state.error {
        return Err(e);
    }

    tracing::info!(steps = state.reports.len(), "scroll script finished");
    Ok(state.reports)
}

/// Human-readable rendering of a step
pub(crate) fn format_step(report: &StepReport) -> String {
    let mut out = if report.offset == report.requested {
        format!("step {}: scroll {}", report.step, report.offset)
    } else {
        format!(
            "step {}: scroll {} (requested {})",
            report.step, report.offset, report.requested
        )
    };

    for transition in &report.transitions {
        out.push_str(&format!(
            "\n  {}: {}",
            transition.element,
            describe(transition.transition)
        ));
    }

    let stack = report
        .registry
        .iter()
        .map(|entry| {
            if entry.unstuck {
                format!("{}(unstuck)", entry.id)
            } else {
                entry.id.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&format!(
        "\n  stack: [{}] active: {}",
        stack,
        report.active.as_deref().unwrap_or("-")
    ));
    out
}

fn describe(transition: Transition) -> &'static str {
    match transition {
        Transition::None => "unchanged",
        Transition::Stuck => "stuck",
        Transition::Released => "released",
        Transition::Superseded => "superseded",
        Transition::Reactivated => "reactivated",
    }
}
