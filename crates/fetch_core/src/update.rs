use crate::{Component, Effect, Msg, Outcome, PollConfig, StateError, WorkerState};

const MISSING_RESOURCE: &str = "remote fetch finished without a resource";
const UNKNOWN_FAILURE: &str = "remote fetch failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    TimedOut,
}

impl PollPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PollPhase::Completed | PollPhase::Failed | PollPhase::TimedOut
        )
    }
}

/// State of one progress poller. Created per invocation, never restarted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    config: PollConfig,
    phase: PollPhase,
    ticks: u32,
    timer_stopped: bool,
}

impl PollState {
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            phase: PollPhase::Idle,
            ticks: 0,
            timer_stopped: false,
        }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn timer_stopped(&self) -> bool {
        self.timer_stopped
    }

    /// Idle -> Running. Any other phase is a lifecycle error.
    pub fn start(&mut self) -> Result<Vec<Effect>, StateError> {
        if self.phase != PollPhase::Idle || self.timer_stopped {
            return Err(StateError::AlreadyStarted {
                component: Component::Poller,
            });
        }
        self.phase = PollPhase::Running;
        Ok(vec![Effect::StartStatus])
    }

    /// Stops the poller.
    ///
    /// A running poller ends as timed out, with the same effects as
    /// [`Msg::Cancel`]. An idle poller can no longer be started. Once the
    /// poller is terminal this does nothing, so it is safe to call again.
    pub fn stop(&mut self) -> Vec<Effect> {
        if self.is_live() {
            return self.finish(Outcome::TimedOut);
        }
        self.timer_stopped = true;
        Vec::new()
    }

    fn is_live(&self) -> bool {
        self.phase == PollPhase::Running && !self.timer_stopped
    }

    fn finish(&mut self, outcome: Outcome) -> Vec<Effect> {
        self.phase = match &outcome {
            Outcome::Completed(_) => PollPhase::Completed,
            Outcome::Failed(_) => PollPhase::Failed,
            Outcome::TimedOut => PollPhase::TimedOut,
        };
        self.timer_stopped = true;
        vec![Effect::StopTimer, Effect::StopStatus, Effect::Deliver(outcome)]
    }
}

/// Pure update function: applies a message to poller state and returns any effects.
///
/// Messages arriving outside the Running phase are ignored, so a tick that
/// races with a terminal transition can never produce a second outcome.
pub fn update(mut state: PollState, msg: Msg) -> (PollState, Vec<Effect>) {
    if !state.is_live() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::Tick(snapshot) => {
            let mut effects = vec![Effect::ShowStatus(snapshot.message.clone())];
            state.ticks = state.ticks.saturating_add(1);
            if let Some(outcome) = decide(&snapshot, state.ticks, state.config.max_ticks()) {
                effects.extend(state.finish(outcome));
            }
            effects
        }
        Msg::Cancel => state.finish(Outcome::TimedOut),
    };

    (state, effects)
}

fn decide(snapshot: &WorkerState, ticks: u32, max_ticks: u32) -> Option<Outcome> {
    if snapshot.done {
        if snapshot.errored {
            let message = snapshot
                .error_message
                .clone()
                .unwrap_or_else(|| UNKNOWN_FAILURE.to_string());
            return Some(Outcome::Failed(message));
        }
        return Some(match &snapshot.result {
            Some(resource) => Outcome::Completed(resource.clone()),
            None => Outcome::Failed(MISSING_RESOURCE.to_string()),
        });
    }
    if ticks >= max_ticks {
        return Some(Outcome::TimedOut);
    }
    None
}
