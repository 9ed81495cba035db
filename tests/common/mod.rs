#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use radio_anchor::kernel::event::FocusChange;
use radio_anchor::voice::{AudioArbiter, FocusHandle, FocusOutcome, SynthesisBackend, VoiceEventSink};
use radio_anchor::{AnchorError, Utterance};

/// Backend that only remembers what it was asked to say.
/// Lifecycle callbacks are driven by the test through `VoiceHandle::events()`.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    pub spoken: Arc<Mutex<Vec<Utterance>>>,
    pub fail_init: bool,
    pub refuse_speak: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<String> {
        self.spoken.lock().unwrap().iter().map(|u| u.text.clone()).collect()
    }

    pub fn utterances(&self) -> Vec<Utterance> {
        self.spoken.lock().unwrap().clone()
    }
}

impl SynthesisBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn init(&mut self, _events: VoiceEventSink) -> radio_anchor::Result<()> {
        if self.fail_init {
            return Err(AnchorError::Backend {
                backend: "recording".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no engine"),
            });
        }
        Ok(())
    }

    fn speak(&mut self, utterance: &Utterance) -> radio_anchor::Result<()> {
        if self.refuse_speak {
            return Err(AnchorError::Backend {
                backend: "recording".into(),
                source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "refused"),
            });
        }
        self.spoken.lock().unwrap().push(utterance.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterCall {
    Request,
    Release(FocusHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Grant,
    Delay,
    Fail,
}

/// Arbiter answering from a script (the last answer repeats) and logging every call.
#[derive(Clone)]
pub struct ScriptedArbiter {
    pub calls: Arc<Mutex<Vec<ArbiterCall>>>,
    answers: Arc<Mutex<Vec<Answer>>>,
    next: u64,
    pub gain_after_delay: bool,
}

impl ScriptedArbiter {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            answers: Arc::new(Mutex::new(answers)),
            next: 0,
            gain_after_delay: false,
        }
    }

    pub fn granting() -> Self {
        Self::new(vec![Answer::Grant])
    }

    pub fn calls(&self) -> Vec<ArbiterCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn requests(&self) -> usize {
        self.calls().iter().filter(|c| **c == ArbiterCall::Request).count()
    }

    pub fn releases(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, ArbiterCall::Release(_))).count()
    }
}

impl AudioArbiter for ScriptedArbiter {
    fn request(&mut self, events: &VoiceEventSink) -> FocusOutcome {
        self.calls.lock().unwrap().push(ArbiterCall::Request);
        let answer = {
            let mut answers = self.answers.lock().unwrap();
            if answers.len() > 1 {
                answers.remove(0)
            } else {
                answers.first().copied().unwrap_or(Answer::Grant)
            }
        };
        self.next += 1;
        let handle = FocusHandle(self.next);
        match answer {
            Answer::Grant => FocusOutcome::Granted(handle),
            Answer::Delay => {
                if self.gain_after_delay {
                    events.focus_changed(FocusChange::Gain);
                }
                FocusOutcome::Delayed(handle)
            }
            Answer::Fail => FocusOutcome::Failed,
        }
    }

    fn release(&mut self, handle: FocusHandle) {
        let mut calls = self.calls.lock().unwrap();
        assert!(
            !calls.contains(&ArbiterCall::Release(handle)),
            "handle {:?} released twice",
            handle
        );
        calls.push(ArbiterCall::Release(handle));
    }
}
