use thiserror::Error;
use crate::domain::{OrderId, Stage};
use crate::policy::ActionKind;

/// Errors returned by pipeline commands and queries.
///
/// None of these leave the live collection in a changed state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
    #[error("Cannot {action} order {id}: {}", stage_phrase(.stage))]
    InvalidTransition {
        id: OrderId,
        stage: Option<Stage>,
        action: ActionKind,
    },
    #[error("Order not found: {0}")]
    NotFound(OrderId),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl PipelineError {
    /// `reject` on an order that is already gone ends in the same state as a
    /// successful reject.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PipelineError::NotFound(_))
    }
}

fn stage_phrase(stage: &Option<Stage>) -> String {
    match stage {
        Some(stage) => format!("it is {}", stage.title().to_lowercase()),
        None => "it is not on the board".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_message_names_stage() {
        let err = PipelineError::InvalidTransition {
            id: OrderId::from("order_7"),
            stage: Some(Stage::UnderReview),
            action: ActionKind::Finalize,
        };
        assert_eq!(err.to_string(), "Cannot finalize order order_7: it is under review");

        let gone = PipelineError::InvalidTransition {
            id: OrderId::from("order_7"),
            stage: None,
            action: ActionKind::Accept,
        };
        assert_eq!(gone.to_string(), "Cannot accept order order_7: it is not on the board");
    }
}
