use super::error::{StateError, StateResult};
use super::{StudioEvent, StudioState};

#[derive(Debug)]
pub struct StateMachine {
    state: StudioState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: StudioState::default(),
        }
    }

    pub fn state(&self) -> StudioState {
        self.state
    }

    pub fn can_transition(&self, event: StudioEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: StudioEvent) -> Option<StudioState> {
        use StudioEvent::*;
        match (self.state, event) {
            (StudioState::Empty | StudioState::Editing, Upload) => Some(StudioState::Editing),
            (StudioState::Editing | StudioState::Cropping, Reset) => Some(StudioState::Empty),
            (StudioState::Editing, BeginCrop) => Some(StudioState::Cropping),
            (StudioState::Cropping, FinishCrop | CancelCrop) => Some(StudioState::Editing),
            (StudioState::Editing, BeginExport) => Some(StudioState::Exporting),
            (StudioState::Exporting, FinishExport) => Some(StudioState::Editing),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: StudioEvent) -> StateResult<StudioState> {
        tracing::debug!(from = ?self.state, event = ?event, "request state transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid state transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        tracing::debug!(from = ?self.state, to = ?next, "state transition applied");
        self.state = next;
        Ok(next)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_transition_tracks_valid_and_invalid_events() {
        let mut machine = StateMachine::new();
        assert!(machine.can_transition(StudioEvent::Upload));
        assert!(!machine.can_transition(StudioEvent::BeginCrop));
        assert!(!machine.can_transition(StudioEvent::BeginExport));

        let _ = machine
            .transition(StudioEvent::Upload)
            .expect("empty -> editing should transition");

        assert!(machine.can_transition(StudioEvent::BeginCrop));
        assert!(machine.can_transition(StudioEvent::BeginExport));
        assert!(machine.can_transition(StudioEvent::Upload));
        assert!(!machine.can_transition(StudioEvent::FinishCrop));
    }

    #[test]
    fn crop_then_export_walks_through_each_state() {
        let mut machine = StateMachine::new();
        let visited: Vec<StudioState> = [
            StudioEvent::Upload,
            StudioEvent::BeginCrop,
            StudioEvent::FinishCrop,
            StudioEvent::BeginExport,
        ]
        .into_iter()
        .map(|event| machine.transition(event).expect("transition should be valid"))
        .collect();

        assert_eq!(
            visited,
            [
                StudioState::Editing,
                StudioState::Cropping,
                StudioState::Editing,
                StudioState::Exporting,
            ]
        );
        assert_eq!(machine.state(), StudioState::Exporting);
    }

    #[test]
    fn exporting_blocks_everything_but_finish() {
        let mut machine = StateMachine::new();
        machine.transition(StudioEvent::Upload).unwrap();
        machine.transition(StudioEvent::BeginExport).unwrap();

        for event in [
            StudioEvent::Upload,
            StudioEvent::Reset,
            StudioEvent::BeginCrop,
            StudioEvent::BeginExport,
        ] {
            assert!(!machine.can_transition(event), "{event:?} should be rejected");
        }
        assert_eq!(
            machine.transition(StudioEvent::FinishExport).unwrap(),
            StudioState::Editing
        );
    }

    #[test]
    fn reset_from_cropping_returns_to_empty() {
        let mut machine = StateMachine::new();
        machine.transition(StudioEvent::Upload).unwrap();
        machine.transition(StudioEvent::BeginCrop).unwrap();
        assert_eq!(
            machine.transition(StudioEvent::Reset).unwrap(),
            StudioState::Empty
        );
        assert!(!machine.state().has_art());
    }

    #[test]
    fn invalid_transition_returns_error_without_changing_state() {
        let mut machine = StateMachine::new();

        let err = machine
            .transition(StudioEvent::FinishExport)
            .expect_err("empty -> finish export should fail");
        assert!(matches!(
            err,
            StateError::InvalidStateTransition {
                from: StudioState::Empty,
                event: StudioEvent::FinishExport
            }
        ));
        assert_eq!(machine.state(), StudioState::Empty);
    }
}
