//! # Condition Helpers

use crate::constants::{CONDITION_READY, REASON_UPDATE_INITIATED};
use crate::crd::{Condition, ConditionStatus};

/// Insert or replace the condition of the same type
///
/// The existing `lastTransitionTime` is kept when the status did not change,
/// otherwise it is set to `now`. New types are appended.
pub fn upsert_condition(conditions: &mut Vec<Condition>, mut condition: Condition, now: &str) {
    match conditions.iter_mut().find(|c| c.r#type == condition.r#type) {
        Some(existing) => {
            condition.last_transition_time = if existing.status == condition.status {
                existing.last_transition_time.clone()
            } else {
                Some(now.to_string())
            };
            *existing = condition;
        }
        None => {
            condition.last_transition_time = Some(now.to_string());
            conditions.push(condition);
        }
    }
}

/// Mark a spec change as accepted but not yet reconciled
pub fn set_update_initiated(conditions: &mut Vec<Condition>, kind: &str, now: &str) {
    upsert_condition(
        conditions,
        Condition {
            r#type: CONDITION_READY.to_string(),
            status: ConditionStatus::False,
            last_transition_time: None,
            reason: Some(REASON_UPDATE_INITIATED.to_string()),
            message: Some(format!("Update initiated on {kind}")),
        },
        now,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(r#type: &str, status: ConditionStatus, time: &str) -> Condition {
        Condition {
            r#type: r#type.to_string(),
            status,
            last_transition_time: Some(time.to_string()),
            reason: None,
            message: None,
        }
    }

    #[test]
    fn test_upsert_appends_new_type() {
        let mut conditions = vec![condition("Failed", ConditionStatus::False, "t0")];
        set_update_initiated(&mut conditions, "ServiceInstance", "t1");
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[1].r#type, "Ready");
        assert_eq!(conditions[1].last_transition_time.as_deref(), Some("t1"));
        assert_eq!(
            conditions[1].message.as_deref(),
            Some("Update initiated on ServiceInstance")
        );
    }

    #[test]
    fn test_upsert_keeps_time_when_status_unchanged() {
        let mut conditions = vec![condition("Ready", ConditionStatus::False, "t0")];
        set_update_initiated(&mut conditions, "ServiceInstance", "t1");
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].last_transition_time.as_deref(), Some("t0"));
        assert_eq!(conditions[0].reason.as_deref(), Some("UpdateInitiated"));
    }

    #[test]
    fn test_upsert_resets_time_when_status_changes() {
        let mut conditions = vec![condition("Ready", ConditionStatus::True, "t0")];
        set_update_initiated(&mut conditions, "ServiceInstance", "t1");
        assert_eq!(conditions[0].status, ConditionStatus::False);
        assert_eq!(conditions[0].last_transition_time.as_deref(), Some("t1"));
    }
}
