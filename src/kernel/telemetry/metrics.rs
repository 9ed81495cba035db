use std::collections::{HashMap, VecDeque};

use super::event::{FocusEventKind, TelemetryEvent, UtteranceStage};
use crate::kernel::templates::TemplateFamily;

#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub decision_stats: DecisionStats,
    pub utterance_stats: UtteranceStats,
    pub focus_stats: FocusStats,
}

#[derive(Debug, Clone, Default)]
pub struct DecisionStats {
    pub updates: u64,
    pub duplicates: u64,
    pub announcements: u64,
    pub greetings_due: u64,
    pub by_family: HashMap<TemplateFamily, u64>,
}

#[derive(Debug, Clone, Default)]
pub struct UtteranceStats {
    pub queued: u64,
    pub dropped: u64,
    pub started: u64,
    pub done: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Default)]
pub struct FocusStats {
    pub granted: u64,
    pub delayed: u64,
    pub failed: u64,
    pub released: u64,
}

impl FocusStats {
    /// Every request that reached the arbiter, whatever the answer.
    pub fn requests(&self) -> u64 {
        self.granted + self.delayed + self.failed
    }
}

impl TelemetrySnapshot {
    /// Fold one more event into the counts.
    pub fn apply(&mut self, event: &TelemetryEvent) {
        match event {
            TelemetryEvent::UpdateReceived { .. } => self.decision_stats.updates += 1,
            TelemetryEvent::DuplicateSuppressed => self.decision_stats.duplicates += 1,
            TelemetryEvent::Announced { family, greeting_due } => {
                self.decision_stats.announcements += 1;
                if *greeting_due {
                    self.decision_stats.greetings_due += 1;
                }
                *self.decision_stats.by_family.entry(*family).or_insert(0) += 1;
            }
            TelemetryEvent::UtteranceLifecycle { stage, .. } => match stage {
                UtteranceStage::Queued => self.utterance_stats.queued += 1,
                UtteranceStage::Dropped => self.utterance_stats.dropped += 1,
                UtteranceStage::Started => self.utterance_stats.started += 1,
                UtteranceStage::Done => self.utterance_stats.done += 1,
                UtteranceStage::Failed { .. } => self.utterance_stats.failed += 1,
            },
            TelemetryEvent::Focus(kind) => match kind {
                FocusEventKind::Granted => self.focus_stats.granted += 1,
                FocusEventKind::Delayed => self.focus_stats.delayed += 1,
                FocusEventKind::Failed => self.focus_stats.failed += 1,
                FocusEventKind::Released => self.focus_stats.released += 1,
            },
        }
    }
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();
    for event in events {
        snap.apply(event);
    }
    snap
}
