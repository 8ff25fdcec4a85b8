//! Attendance day state machine.
//!
//! A day moves `NONE → CHECKED_IN → CHECKED_OUT`. A checked-out day can be
//! resumed (`CHECKED_OUT → CHECKED_IN`) while the user has corrections left
//! for the calendar month.
//!
//! Timing rules:
//! - a check-in after the late deadline is LATE, and the third LATE mark in a
//!   month becomes ABSENT
//! - a check-out before the minimum hours turns the day ABSENT

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::config::AttendancePolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ApprovalStatus, AttendanceMark, AttendanceRecord, AttendanceState, AuditStep,
    CorrectionCounter, state_of,
};

/// Remark added when repeated lateness turns a day into an absence.
pub const LATE_STRIKE_REMARK: &str = "Multiple Late Arrivals (3rd Strike)";

/// Remark added when a day is closed before the minimum hours.
pub const EARLY_LEAVE_REMARK: &str = "Early Leave (<4h)";

/// The result of an attendance transition.
#[derive(Debug, Clone)]
pub struct AttendanceResult {
    /// The record after the transition.
    pub record: AttendanceRecord,
    /// The audit step recording the transition.
    pub audit_step: AuditStep,
}

/// The result of resuming a checked-out day.
#[derive(Debug, Clone)]
pub struct ResumeResult {
    /// The reopened record.
    pub record: AttendanceRecord,
    /// The user's correction counter after this resume.
    pub corrections: CorrectionCounter,
    /// The audit step recording the resume.
    pub audit_step: AuditStep,
}

fn transition_error(user_id: &str, date: NaiveDate, action: &str, message: &str) -> EngineError {
    EngineError::InvalidAttendanceTransition {
        user_id: user_id.to_string(),
        date,
        action: action.to_string(),
        message: message.to_string(),
    }
}

fn worked_hours(record: &AttendanceRecord, until: NaiveDateTime) -> Decimal {
    let seconds = (until - record.login_time).num_seconds();
    Decimal::from(seconds) / Decimal::from(3600)
}

/// Counts a user's LATE marks in the month of `date`, strictly before `date`.
///
/// Days that were already turned into absences by the strike rule are not
/// counted again.
pub fn count_late_marks(history: &[AttendanceRecord], user_id: &str, date: NaiveDate) -> u32 {
    history
        .iter()
        .filter(|r| r.user_id == user_id)
        .filter(|r| r.date.year() == date.year() && r.date.month() == date.month())
        .filter(|r| r.date < date)
        .filter(|r| r.mark == AttendanceMark::Late)
        .count() as u32
}

/// Opens an attendance day.
///
/// # Arguments
///
/// * `existing` - Today's record for the user, if one exists
/// * `user_id` - The user checking in
/// * `now` - The check-in time
/// * `prior_late_marks` - LATE marks earlier this month (see [`count_late_marks`])
/// * `policy` - The attendance policy
/// * `step_number` - The step number for audit trail sequencing
///
/// # Returns
///
/// A new record, or `InvalidAttendanceTransition` if the user already has a
/// record for the day.
pub fn check_in(
    existing: Option<&AttendanceRecord>,
    user_id: &str,
    now: NaiveDateTime,
    prior_late_marks: u32,
    policy: &AttendancePolicy,
    step_number: u32,
) -> EngineResult<AttendanceResult> {
    let date = now.date();
    let existing = existing.filter(|r| r.date == date);
    if state_of(existing) != AttendanceState::None {
        return Err(transition_error(user_id, date, "check in", "already checked in"));
    }

    let is_late = now.time() > policy.late_after;
    let strike_reached = is_late && prior_late_marks + 1 >= policy.late_strike_limit;

    let (mark, remarks, reasoning) = if strike_reached {
        (
            AttendanceMark::Absent,
            LATE_STRIKE_REMARK.to_string(),
            format!(
                "Checked in at {} after {}; late mark {} of {} this month counts as absent",
                now.time(),
                policy.late_after,
                prior_late_marks + 1,
                policy.late_strike_limit
            ),
        )
    } else if is_late {
        (
            AttendanceMark::Late,
            String::new(),
            format!("Checked in at {} after {}", now.time(), policy.late_after),
        )
    } else {
        (
            AttendanceMark::Present,
            String::new(),
            format!("Checked in at {} on or before {}", now.time(), policy.late_after),
        )
    };

    let record = AttendanceRecord {
        user_id: user_id.to_string(),
        date,
        login_time: now,
        logout_time: None,
        status: ApprovalStatus::Pending,
        mark,
        remarks,
        correction_count: 0,
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "attendance_check_in".to_string(),
        rule_name: "Attendance Check-In".to_string(),
        input: serde_json::json!({
            "user_id": user_id,
            "login_time": now.to_string(),
            "prior_late_marks": prior_late_marks
        }),
        output: serde_json::json!({
            "mark": record.mark,
            "remarks": record.remarks
        }),
        reasoning,
    };

    Ok(AttendanceResult { record, audit_step })
}

/// Closes an open attendance day.
///
/// A day shorter than the policy's minimum hours becomes ABSENT with an
/// early-leave remark; otherwise the check-in mark is kept.
pub fn check_out(
    record: Option<&AttendanceRecord>,
    user_id: &str,
    now: NaiveDateTime,
    policy: &AttendancePolicy,
    step_number: u32,
) -> EngineResult<AttendanceResult> {
    let date = now.date();
    let record = match record {
        Some(r) if r.is_open() => r,
        Some(r) => {
            return Err(transition_error(user_id, r.date, "check out", "already checked out"));
        }
        None => {
            return Err(transition_error(user_id, date, "check out", "no check-in record found"));
        }
    };

    if now < record.login_time {
        return Err(transition_error(
            user_id,
            record.date,
            "check out",
            "check-out time precedes check-in",
        ));
    }

    let hours = worked_hours(record, now);
    let mut updated = record.clone();
    updated.logout_time = Some(now);

    let reasoning = if hours < policy.minimum_hours {
        updated.mark = AttendanceMark::Absent;
        updated.add_remark(EARLY_LEAVE_REMARK);
        format!(
            "Worked {} hours, below the {} hour minimum; marked absent",
            hours.round_dp(2).normalize(),
            policy.minimum_hours
        )
    } else {
        format!(
            "Worked {} hours; mark stays {:?}",
            hours.round_dp(2).normalize(),
            updated.mark
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "attendance_check_out".to_string(),
        rule_name: "Attendance Check-Out".to_string(),
        input: serde_json::json!({
            "user_id": user_id,
            "login_time": record.login_time.to_string(),
            "logout_time": now.to_string()
        }),
        output: serde_json::json!({
            "worked_hours": hours.round_dp(2).normalize().to_string(),
            "mark": updated.mark,
            "remarks": updated.remarks
        }),
        reasoning,
    };

    Ok(AttendanceResult {
        record: updated,
        audit_step,
    })
}

/// Works out the mark a record had at check-in, before any early-leave absence.
fn check_in_mark(record: &AttendanceRecord, policy: &AttendancePolicy) -> AttendanceMark {
    if record.remarks.contains(LATE_STRIKE_REMARK) {
        AttendanceMark::Absent
    } else if record.login_time.time() > policy.late_after {
        AttendanceMark::Late
    } else {
        AttendanceMark::Present
    }
}

/// Reopens a checked-out day.
///
/// The logout time is cleared and the correction counter for the record's
/// month is incremented. An early-leave absence is withdrawn, since the day
/// is no longer over. Fails with `CorrectionLimitReached` once the monthly
/// limit is used up.
pub fn resume_day(
    record: Option<&AttendanceRecord>,
    user_id: &str,
    today: NaiveDate,
    corrections: CorrectionCounter,
    policy: &AttendancePolicy,
    step_number: u32,
) -> EngineResult<ResumeResult> {
    let record = match record {
        Some(r) if !r.is_open() => r,
        Some(r) => {
            return Err(transition_error(user_id, r.date, "resume", "day is still open"));
        }
        None => {
            return Err(transition_error(user_id, today, "resume", "no check-in record found"));
        }
    };

    let counter = corrections.rolled_to(record.date);
    let limit = policy.monthly_correction_limit;
    if counter.used >= limit {
        return Err(EngineError::CorrectionLimitReached {
            user_id: user_id.to_string(),
            used: counter.used,
            limit,
        });
    }

    let counter = CorrectionCounter {
        used: counter.used + 1,
        ..counter
    };

    let mut updated = record.clone();
    updated.logout_time = None;
    updated.correction_count = counter.used;
    if updated.remarks.contains(EARLY_LEAVE_REMARK) {
        updated.remarks = updated
            .remarks
            .split(", ")
            .filter(|r| *r != EARLY_LEAVE_REMARK)
            .collect::<Vec<_>>()
            .join(", ");
        updated.mark = check_in_mark(&updated, policy);
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "attendance_resume".to_string(),
        rule_name: "Attendance Correction".to_string(),
        input: serde_json::json!({
            "user_id": user_id,
            "date": record.date.to_string(),
            "corrections_used": counter.used - 1,
            "limit": limit
        }),
        output: serde_json::json!({
            "corrections_used": counter.used,
            "mark": updated.mark
        }),
        reasoning: format!(
            "Day resumed; correction {} of {} for {}-{:02}",
            counter.used, limit, counter.year, counter.month
        ),
    };

    Ok(ResumeResult {
        record: updated,
        corrections: counter,
        audit_step,
    })
}

/// Records an admin decision on an attendance day.
///
/// The decision must be APPROVED or REJECTED; an optional remark is appended.
pub fn review_attendance(
    record: &AttendanceRecord,
    decision: ApprovalStatus,
    remark: Option<&str>,
    step_number: u32,
) -> EngineResult<AttendanceResult> {
    if decision == ApprovalStatus::Pending {
        return Err(transition_error(
            &record.user_id,
            record.date,
            "review",
            "decision must be APPROVED or REJECTED",
        ));
    }

    let mut updated = record.clone();
    updated.status = decision;
    if let Some(remark) = remark.filter(|r| !r.trim().is_empty()) {
        updated.add_remark(remark.trim());
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "attendance_review".to_string(),
        rule_name: "Attendance Review".to_string(),
        input: serde_json::json!({
            "user_id": record.user_id,
            "date": record.date.to_string(),
            "previous_status": record.status
        }),
        output: serde_json::json!({
            "status": updated.status,
            "remarks": updated.remarks
        }),
        reasoning: format!("Admin set attendance to {:?}", decision),
    };

    Ok(AttendanceResult {
        record: updated,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn policy() -> AttendancePolicy {
        AttendancePolicy {
            late_after: NaiveTime::from_hms_opt(10, 45, 0).unwrap(),
            late_strike_limit: 3,
            minimum_hours: Decimal::from(4),
            monthly_correction_limit: 4,
        }
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn checked_in(at: &str) -> AttendanceRecord {
        check_in(None, "emp_001", dt(at), 0, &policy(), 1)
            .unwrap()
            .record
    }

    fn late_record(day: u32) -> AttendanceRecord {
        AttendanceRecord {
            mark: AttendanceMark::Late,
            ..checked_in(&format!("2026-03-{:02}T11:00:00", day))
        }
    }

    #[test]
    fn test_on_time_check_in_is_present() {
        let result = check_in(None, "emp_001", dt("2026-03-02T10:45:00"), 0, &policy(), 1).unwrap();
        assert_eq!(result.record.mark, AttendanceMark::Present);
        assert_eq!(result.record.state(), AttendanceState::CheckedIn);
        assert_eq!(result.record.status, ApprovalStatus::Pending);
        assert_eq!(result.audit_step.rule_id, "attendance_check_in");
    }

    #[test]
    fn test_check_in_after_deadline_is_late() {
        let result = check_in(None, "emp_001", dt("2026-03-02T10:45:01"), 1, &policy(), 1).unwrap();
        assert_eq!(result.record.mark, AttendanceMark::Late);
        assert!(result.record.remarks.is_empty());
    }

    #[test]
    fn test_third_late_mark_is_absent() {
        let result = check_in(None, "emp_001", dt("2026-03-05T11:30:00"), 2, &policy(), 1).unwrap();
        assert_eq!(result.record.mark, AttendanceMark::Absent);
        assert_eq!(result.record.remarks, LATE_STRIKE_REMARK);
    }

    #[test]
    fn test_on_time_check_in_ignores_prior_late_marks() {
        let result = check_in(None, "emp_001", dt("2026-03-05T09:00:00"), 5, &policy(), 1).unwrap();
        assert_eq!(result.record.mark, AttendanceMark::Present);
    }

    #[test]
    fn test_second_check_in_same_day_rejected() {
        let existing = checked_in("2026-03-02T09:00:00");
        let result = check_in(
            Some(&existing),
            "emp_001",
            dt("2026-03-02T12:00:00"),
            0,
            &policy(),
            1,
        );
        assert!(matches!(
            result,
            Err(EngineError::InvalidAttendanceTransition { .. })
        ));
    }

    #[test]
    fn test_yesterdays_record_does_not_block_check_in() {
        let existing = checked_in("2026-03-01T09:00:00");
        let result = check_in(
            Some(&existing),
            "emp_001",
            dt("2026-03-02T09:00:00"),
            0,
            &policy(),
            1,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_count_late_marks_only_this_month_before_today() {
        let mut history = vec![late_record(2), late_record(3), late_record(10)];
        let mut other_user = late_record(4);
        other_user.user_id = "emp_002".to_string();
        history.push(other_user);
        let mut february = late_record(2);
        february.date = date(2026, 2, 27);
        history.push(february);

        assert_eq!(count_late_marks(&history, "emp_001", date(2026, 3, 10)), 2);
    }

    #[test]
    fn test_check_out_after_minimum_hours_keeps_mark() {
        let record = checked_in("2026-03-02T09:00:00");
        let result = check_out(Some(&record), "emp_001", dt("2026-03-02T13:00:00"), &policy(), 2)
            .unwrap();
        assert_eq!(result.record.mark, AttendanceMark::Present);
        assert_eq!(result.record.state(), AttendanceState::CheckedOut);
        assert_eq!(result.audit_step.output["worked_hours"], "4");
    }

    #[test]
    fn test_early_check_out_is_absent() {
        let record = checked_in("2026-03-02T09:00:00");
        let result = check_out(Some(&record), "emp_001", dt("2026-03-02T12:59:59"), &policy(), 2)
            .unwrap();
        assert_eq!(result.record.mark, AttendanceMark::Absent);
        assert_eq!(result.record.remarks, EARLY_LEAVE_REMARK);
    }

    #[test]
    fn test_early_check_out_appends_to_strike_remark() {
        let record = check_in(None, "emp_001", dt("2026-03-05T11:30:00"), 2, &policy(), 1)
            .unwrap()
            .record;
        let result = check_out(Some(&record), "emp_001", dt("2026-03-05T12:00:00"), &policy(), 2)
            .unwrap();
        assert_eq!(
            result.record.remarks,
            format!("{}, {}", LATE_STRIKE_REMARK, EARLY_LEAVE_REMARK)
        );
    }

    #[test]
    fn test_check_out_without_record_rejected() {
        let result = check_out(None, "emp_001", dt("2026-03-02T18:00:00"), &policy(), 1);
        match result {
            Err(EngineError::InvalidAttendanceTransition { message, .. }) => {
                assert_eq!(message, "no check-in record found");
            }
            other => panic!("Expected InvalidAttendanceTransition, got {:?}", other),
        }
    }

    #[test]
    fn test_double_check_out_rejected() {
        let record = checked_in("2026-03-02T09:00:00");
        let closed = check_out(Some(&record), "emp_001", dt("2026-03-02T18:00:00"), &policy(), 1)
            .unwrap()
            .record;
        let result = check_out(Some(&closed), "emp_001", dt("2026-03-02T19:00:00"), &policy(), 2);
        assert!(result.is_err());
    }

    #[test]
    fn test_resume_reopens_and_counts() {
        let record = checked_in("2026-03-02T09:00:00");
        let closed = check_out(Some(&record), "emp_001", dt("2026-03-02T18:00:00"), &policy(), 1)
            .unwrap()
            .record;
        let counter = CorrectionCounter::for_month_of(date(2026, 3, 1));
        let result = resume_day(
            Some(&closed),
            "emp_001",
            date(2026, 3, 2),
            counter,
            &policy(),
            2,
        )
        .unwrap();
        assert!(result.record.is_open());
        assert_eq!(result.corrections.used, 1);
        assert_eq!(result.record.correction_count, 1);
    }

    #[test]
    fn test_fifth_resume_in_month_rejected() {
        let mut record = checked_in("2026-03-02T09:00:00");
        let mut counter = CorrectionCounter::for_month_of(date(2026, 3, 2));

        for attempt in 1..=5 {
            record = check_out(Some(&record), "emp_001", dt("2026-03-02T18:00:00"), &policy(), 1)
                .unwrap()
                .record;
            let result = resume_day(
                Some(&record),
                "emp_001",
                date(2026, 3, 2),
                counter,
                &policy(),
                2,
            );
            if attempt <= 4 {
                let resumed = result.unwrap();
                record = resumed.record;
                counter = resumed.corrections;
                assert_eq!(counter.used, attempt);
            } else {
                match result {
                    Err(EngineError::CorrectionLimitReached { used, limit, .. }) => {
                        assert_eq!(used, 4);
                        assert_eq!(limit, 4);
                    }
                    other => panic!("Expected CorrectionLimitReached, got {:?}", other),
                }
            }
        }
    }

    #[test]
    fn test_counter_from_previous_month_resets() {
        let record = checked_in("2026-04-01T09:00:00");
        let closed = check_out(Some(&record), "emp_001", dt("2026-04-01T18:00:00"), &policy(), 1)
            .unwrap()
            .record;
        let march = CorrectionCounter {
            year: 2026,
            month: 3,
            used: 4,
        };
        let result = resume_day(
            Some(&closed),
            "emp_001",
            date(2026, 4, 1),
            march,
            &policy(),
            2,
        )
        .unwrap();
        assert_eq!(result.corrections.month, 4);
        assert_eq!(result.corrections.used, 1);
    }

    #[test]
    fn test_resume_open_day_rejected() {
        let record = checked_in("2026-03-02T09:00:00");
        let counter = CorrectionCounter::for_month_of(date(2026, 3, 2));
        let result = resume_day(
            Some(&record),
            "emp_001",
            date(2026, 3, 2),
            counter,
            &policy(),
            1,
        );
        assert!(matches!(
            result,
            Err(EngineError::InvalidAttendanceTransition { .. })
        ));
    }

    #[test]
    fn test_resume_withdraws_early_leave_absence() {
        let record = check_in(None, "emp_001", dt("2026-03-02T11:00:00"), 0, &policy(), 1)
            .unwrap()
            .record;
        let closed = check_out(Some(&record), "emp_001", dt("2026-03-02T12:00:00"), &policy(), 2)
            .unwrap()
            .record;
        assert_eq!(closed.mark, AttendanceMark::Absent);

        let counter = CorrectionCounter::for_month_of(date(2026, 3, 2));
        let resumed = resume_day(
            Some(&closed),
            "emp_001",
            date(2026, 3, 2),
            counter,
            &policy(),
            3,
        )
        .unwrap()
        .record;
        assert_eq!(resumed.mark, AttendanceMark::Late);
        assert!(resumed.remarks.is_empty());
    }

    #[test]
    fn test_review_sets_status_and_remark() {
        let record = checked_in("2026-03-02T09:00:00");
        let result =
            review_attendance(&record, ApprovalStatus::Approved, Some("verified"), 1).unwrap();
        assert_eq!(result.record.status, ApprovalStatus::Approved);
        assert_eq!(result.record.remarks, "verified");
    }

    #[test]
    fn test_review_to_pending_rejected() {
        let record = checked_in("2026-03-02T09:00:00");
        assert!(review_attendance(&record, ApprovalStatus::Pending, None, 1).is_err());
    }
}
