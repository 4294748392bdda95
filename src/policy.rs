//! Stage policy: which actions an order offers in each stage.
//!
//! [`actions_for`] is the single place action availability is decided. The
//! pipeline refuses any command whose kind is not listed for the order's
//! current stage, and the presentation layer renders exactly these actions.

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::domain::{Outcome, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Accept,
    Advance,
    Finalize,
    Reject,
}

/// What an action does to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    MoveTo(Stage),
    Close(Outcome),
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Accept => "accept",
            ActionKind::Advance => "advance",
            ActionKind::Finalize => "finalize",
            ActionKind::Reject => "reject",
        }
    }

    pub fn transition(&self) -> Transition {
        match self {
            ActionKind::Accept => Transition::MoveTo(Stage::Preparing),
            ActionKind::Advance => Transition::MoveTo(Stage::OutForDelivery),
            ActionKind::Finalize => Transition::Close(Outcome::Delivered),
            ActionKind::Reject => Transition::Close(Outcome::Rejected),
        }
    }

    /// Completes "Order #0001 ..." in operator notifications.
    pub fn success_message(&self) -> &'static str {
        match self {
            ActionKind::Accept => "accepted and moved to preparation",
            ActionKind::Advance => "sent out for delivery",
            ActionKind::Finalize => "delivered and closed",
            ActionKind::Reject => "rejected and removed from the board",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual weight the presentation layer gives an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionIntent {
    Primary,
    Destructive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionDescriptor {
    pub kind: ActionKind,
    pub label: &'static str,
    pub intent: ActionIntent,
}

const ACCEPT: ActionDescriptor = ActionDescriptor {
    kind: ActionKind::Accept,
    label: "Accept order",
    intent: ActionIntent::Primary,
};

const ADVANCE: ActionDescriptor = ActionDescriptor {
    kind: ActionKind::Advance,
    label: "Send for delivery",
    intent: ActionIntent::Primary,
};

const FINALIZE: ActionDescriptor = ActionDescriptor {
    kind: ActionKind::Finalize,
    label: "Mark as delivered",
    intent: ActionIntent::Primary,
};

const REJECT: ActionDescriptor = ActionDescriptor {
    kind: ActionKind::Reject,
    label: "Reject order",
    intent: ActionIntent::Destructive,
};

const UNDER_REVIEW_ACTIONS: [ActionDescriptor; 2] = [ACCEPT, REJECT];
const PREPARING_ACTIONS: [ActionDescriptor; 2] = [ADVANCE, REJECT];
const OUT_FOR_DELIVERY_ACTIONS: [ActionDescriptor; 2] = [FINALIZE, REJECT];

/// Ordered actions valid for `stage`. Same stage, same list, every time.
pub fn actions_for(stage: Stage) -> &'static [ActionDescriptor] {
    match stage {
        Stage::UnderReview => &UNDER_REVIEW_ACTIONS,
        Stage::Preparing => &PREPARING_ACTIONS,
        Stage::OutForDelivery => &OUT_FOR_DELIVERY_ACTIONS,
    }
}

pub fn permits(stage: Stage, kind: ActionKind) -> bool {
    actions_for(stage).iter().any(|action| action.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(stage: Stage) -> Vec<ActionKind> {
        actions_for(stage).iter().map(|a| a.kind).collect()
    }

    #[test]
    fn test_actions_per_stage() {
        assert_eq!(kinds(Stage::UnderReview), vec![ActionKind::Accept, ActionKind::Reject]);
        assert_eq!(kinds(Stage::Preparing), vec![ActionKind::Advance, ActionKind::Reject]);
        assert_eq!(kinds(Stage::OutForDelivery), vec![ActionKind::Finalize, ActionKind::Reject]);
    }

    #[test]
    fn test_reject_is_always_destructive_and_last() {
        for stage in Stage::ALL {
            let last = actions_for(stage).last().copied();
            assert_eq!(last, Some(REJECT));
        }
    }

    #[test]
    fn test_permits_matches_transition_graph() {
        assert!(permits(Stage::UnderReview, ActionKind::Accept));
        assert!(!permits(Stage::UnderReview, ActionKind::Advance));
        assert!(!permits(Stage::UnderReview, ActionKind::Finalize));
        assert!(!permits(Stage::Preparing, ActionKind::Accept));
        assert!(!permits(Stage::OutForDelivery, ActionKind::Advance));
        for stage in Stage::ALL {
            assert!(permits(stage, ActionKind::Reject));
        }
    }

    #[test]
    fn test_forward_actions_move_one_stage() {
        for stage in Stage::ALL {
            for action in actions_for(stage) {
                if let Transition::MoveTo(target) = action.kind.transition() {
                    assert!(target > stage, "{} must move {} forward", action.kind, stage);
                }
            }
        }
    }
}
