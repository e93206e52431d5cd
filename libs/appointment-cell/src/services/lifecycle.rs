use crate::models::{AppointmentError, AppointmentStatus};

/// Allowed admin status transitions. `completed` is terminal; a cancelled
/// appointment can be reactivated.
pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    use AppointmentStatus::*;

    matches!(
        (from, to),
        (Scheduled, Completed) | (Scheduled, Cancelled) | (Cancelled, Scheduled)
    )
}

pub fn ensure_transition(
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> Result<(), AppointmentError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(AppointmentError::InvalidStatusTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use AppointmentStatus::*;

    #[test]
    fn scheduled_can_complete_or_cancel() {
        assert!(can_transition(Scheduled, Completed));
        assert!(can_transition(Scheduled, Cancelled));
    }

    #[test]
    fn cancelled_can_be_reactivated() {
        assert!(can_transition(Cancelled, Scheduled));
    }

    #[test]
    fn completed_is_terminal() {
        assert!(!can_transition(Completed, Scheduled));
        assert!(!can_transition(Completed, Cancelled));
    }

    #[test]
    fn no_self_transitions() {
        assert!(!can_transition(Scheduled, Scheduled));
        assert!(!can_transition(Completed, Completed));
        assert!(!can_transition(Cancelled, Cancelled));
    }

    #[test]
    fn invalid_transition_reports_both_states() {
        assert_matches!(
            ensure_transition(Completed, Cancelled),
            Err(AppointmentError::InvalidStatusTransition {
                from: Completed,
                to: Cancelled
            })
        );
    }
}
