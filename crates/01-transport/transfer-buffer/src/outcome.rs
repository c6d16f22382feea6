/// Non-error result of a pop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransferOutcome<T> {
    /// A value in push order. `complete` is set on the final value once the
    /// buffer has drained behind it.
    Value { value: T, complete: bool },
    /// The producer finished and every value has been delivered.
    Complete,
    /// The consumer's cancellation fired while waiting for data.
    Cancelled,
}

impl<T> TransferOutcome<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            TransferOutcome::Value { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            TransferOutcome::Value { value, .. } => Some(value),
            _ => None,
        }
    }

    /// True when no further values will follow this outcome.
    pub fn is_complete(&self) -> bool {
        matches!(
            self,
            TransferOutcome::Complete | TransferOutcome::Value { complete: true, .. }
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransferOutcome::Cancelled)
    }
}
