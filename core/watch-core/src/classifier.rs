//! Maps console text to target states.
//! The first matching rule wins; lower-ranked signals are ignored even when present,
//! so a stale "Working" title can never mask a blocked prompt or a failure.

use crate::notifier::NotificationKind;
use crate::patterns::MarkerTable;
use crate::types::{ClassificationInput, TargetState};

/// State signalled by the input, or `None` when no rule matches.
pub fn classify(table: &MarkerTable, input: ClassificationInput<'_>) -> Option<TargetState> {
    table.first_match(input).map(|rule| rule.state)
}

/// Outcome of applying an observed state to a target's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub next: Option<TargetState>,
    pub notify: Option<NotificationKind>,
}

impl Decision {
    pub const UNCHANGED: Decision = Decision {
        next: None,
        notify: None,
    };

    fn to(state: TargetState, notify: Option<NotificationKind>) -> Self {
        Self {
            next: Some(state),
            notify,
        }
    }
}

pub fn decide(current: TargetState, observed: Option<TargetState>) -> Decision {
    match observed {
        Some(TargetState::AwaitingInput) if current != TargetState::AwaitingInput => Decision::to(
            TargetState::AwaitingInput,
            Some(NotificationKind::ActionRequired),
        ),
        Some(TargetState::HighDemand) if current != TargetState::HighDemand => {
            Decision::to(TargetState::HighDemand, Some(NotificationKind::HighDemand))
        }
        Some(TargetState::Working) if current != TargetState::Working => {
            Decision::to(TargetState::Working, None)
        }
        // Ready only counts as completion after genuine activity.
        Some(TargetState::Ready)
            if matches!(
                current,
                TargetState::Working | TargetState::AwaitingInput
            ) =>
        {
            Decision::to(TargetState::Ready, Some(NotificationKind::TaskFinished))
        }
        _ => Decision::UNCHANGED,
    }
}
