//! Dashboard aggregation.
//!
//! Three role-scoped summaries built from the assignment resolver, the
//! scope filter, and attendance rows. All of them are read-only and
//! degrade to zero/empty values when there is nothing to report; the only
//! error beyond the store's own is a GUARD caller without a linked
//! profile.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::error::ServiceError;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::guard::Guard;
use crate::service::resolver::{ResolvedAssignment, resolve_active};
use crate::service::scope;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "totalGuards": 8,
    "activeGuards": 7,
    "totalSites": 3,
    "activeAssignments": 5,
    "todayAttendance": 4
}))]
pub struct AdminSummary {
    pub total_guards: i64,
    pub active_guards: i64,
    pub total_sites: i64,
    pub active_assignments: i64,
    pub today_attendance: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "guardsOnDuty": 1,
    "sitesManaged": 1,
    "lateToday": 1,
    "absentToday": 1
}))]
pub struct ManagerSummary {
    pub guards_on_duty: i64,
    pub sites_managed: i64,
    pub late_today: i64,
    pub absent_today: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "todayShift": "Day Shift",
    "siteName": "HQ",
    "postName": "Gate A",
    "checkInTime": "09:05:00",
    "checkOutTime": null,
    "status": "LATE"
}))]
pub struct GuardSummary {
    pub today_shift: Option<String>,
    pub site_name: Option<String>,
    pub post_name: Option<String>,
    #[schema(value_type = String, format = "time", nullable = true)]
    pub check_in_time: Option<NaiveTime>,
    #[schema(value_type = String, format = "time", nullable = true)]
    pub check_out_time: Option<NaiveTime>,
    pub status: String,
}

/// System-wide counts for the reference date.
pub async fn admin_summary(pool: &MySqlPool, today: NaiveDate) -> Result<AdminSummary, ServiceError> {
    let total_guards =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM guards WHERE deleted_at IS NULL")
            .fetch_one(pool)
            .await?;

    let active_guards = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM guards WHERE status = 'ACTIVE' AND deleted_at IS NULL",
    )
    .fetch_one(pool)
    .await?;

    let total_sites = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sites")
        .fetch_one(pool)
        .await?;

    // Same effectiveness predicate as the resolver, applied across all guards
    let active_assignments = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM guard_assignments
        WHERE active = TRUE
          AND status = 'ACTIVE'
          AND effective_from <= ?
          AND (effective_to IS NULL OR effective_to >= ?)
        "#,
    )
    .bind(today)
    .bind(today)
    .fetch_one(pool)
    .await?;

    let today_attendance =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance WHERE attendance_date = ?")
            .bind(today)
            .fetch_one(pool)
            .await?;

    Ok(AdminSummary {
        total_guards,
        active_guards,
        total_sites,
        active_assignments,
        today_attendance,
    })
}

/// Team counts for a supervisor's guard set on the reference date.
/// `supervised` is the scope filter's output; an empty set yields an
/// all-zero summary.
pub async fn manager_summary(
    pool: &MySqlPool,
    supervised: &[Guard],
    today: NaiveDate,
) -> Result<ManagerSummary, ServiceError> {
    if supervised.is_empty() {
        return Ok(ManagerSummary {
            guards_on_duty: 0,
            sites_managed: 0,
            late_today: 0,
            absent_today: 0,
        });
    }

    let guard_ids: Vec<u64> = supervised.iter().map(|g| g.id).collect();

    let placeholders = vec!["?"; guard_ids.len()].join(", ");
    let sql = format!(
        "SELECT * FROM attendance WHERE attendance_date = ? AND guard_id IN ({})",
        placeholders
    );

    let mut query = sqlx::query_as::<_, Attendance>(&sql).bind(today);
    for id in &guard_ids {
        query = query.bind(*id);
    }
    let attendance = query.fetch_all(pool).await?;

    let mut resolved: HashMap<u64, Vec<ResolvedAssignment>> = HashMap::new();
    for id in &guard_ids {
        resolved.insert(*id, resolve_active(pool, *id, today).await?);
    }

    Ok(compute_manager_summary(&guard_ids, &attendance, &resolved))
}

/// Pure aggregation over prefetched rows. `attendance` must hold only the
/// supervised guards' rows for the reference date.
fn compute_manager_summary(
    guard_ids: &[u64],
    attendance: &[Attendance],
    resolved: &HashMap<u64, Vec<ResolvedAssignment>>,
) -> ManagerSummary {
    // checked in, not yet checked out
    let guards_on_duty = attendance
        .iter()
        .filter(|a| a.check_in_time.is_some() && a.check_out_time.is_none())
        .count() as i64;

    let late_today = attendance
        .iter()
        .filter(|a| a.late_minutes.unwrap_or(0) > 0)
        .count() as i64;

    // distinct sites via each guard's authoritative (first-ranked)
    // assignment; guards with nothing resolved contribute nothing
    let sites_managed = resolved
        .values()
        .filter_map(|v| v.first())
        .map(|r| r.site_id)
        .collect::<HashSet<_>>()
        .len() as i64;

    // expected (some assignment resolves today) but no attendance row
    let attended: HashSet<u64> = attendance.iter().map(|a| a.guard_id).collect();
    let absent_today = guard_ids
        .iter()
        .filter(|id| resolved.get(id).is_some_and(|v| !v.is_empty()))
        .filter(|id| !attended.contains(id))
        .count() as i64;

    ManagerSummary {
        guards_on_duty,
        sites_managed,
        late_today,
        absent_today,
    }
}

/// Today's shift and attendance for the caller's own guard profile.
/// NotFound when the account has no linked profile.
pub async fn guard_summary(
    pool: &MySqlPool,
    user_id: u64,
    today: NaiveDate,
    tz: Tz,
) -> Result<GuardSummary, ServiceError> {
    let guard = scope::find_own_profile(pool, user_id).await?;

    let active = resolve_active(pool, guard.id, today).await?;

    // At most one row per guard per date is assumed; take the first by id
    // if the store ever returns several.
    let attendance = sqlx::query_as::<_, Attendance>(
        "SELECT * FROM attendance WHERE guard_id = ? AND attendance_date = ? ORDER BY id LIMIT 1",
    )
    .bind(guard.id)
    .bind(today)
    .fetch_optional(pool)
    .await?;

    Ok(build_guard_summary(active.first(), attendance.as_ref(), tz))
}

/// Pure assembly of the guard view. Stored UTC instants are presented as
/// wall-clock times in `tz`; a missing attendance row synthesizes the
/// NOT_CHECKED_IN status.
fn build_guard_summary(
    current: Option<&ResolvedAssignment>,
    attendance: Option<&Attendance>,
    tz: Tz,
) -> GuardSummary {
    let mut summary = GuardSummary {
        today_shift: None,
        site_name: None,
        post_name: None,
        check_in_time: None,
        check_out_time: None,
        status: AttendanceStatus::NotCheckedIn.to_string(),
    };

    if let Some(assignment) = current {
        summary.today_shift = Some(assignment.shift_name.clone());
        summary.site_name = Some(assignment.site_name.clone());
        summary.post_name = Some(assignment.post_name.clone());
    }

    if let Some(att) = attendance {
        summary.check_in_time = att.check_in_time.map(|t| t.with_timezone(&tz).time());
        summary.check_out_time = att.check_out_time.map(|t| t.with_timezone(&tz).time());
        summary.status = att.status.clone();
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn assignment_at(id: u64, guard_id: u64, site_id: u64, site: &str) -> ResolvedAssignment {
        ResolvedAssignment {
            id,
            guard_id,
            site_post_id: 1,
            post_name: "Gate A".into(),
            site_id,
            site_name: site.into(),
            shift_type_id: 1,
            shift_name: "Day Shift".into(),
            shift_start: "09:00:00".parse().unwrap(),
            status: "ACTIVE".into(),
            effective_from: "2024-01-01".parse().unwrap(),
            effective_to: None,
        }
    }

    fn attendance_row(
        guard_id: u64,
        check_in: Option<&str>,
        check_out: Option<&str>,
        late_minutes: Option<i32>,
        status: &str,
    ) -> Attendance {
        let instant = |s: &str| s.parse::<DateTime<Utc>>().unwrap();
        Attendance {
            id: guard_id,
            guard_id,
            attendance_date: "2024-06-15".parse().unwrap(),
            check_in_time: check_in.map(instant),
            check_out_time: check_out.map(instant),
            late_minutes,
            status: status.into(),
            notes: None,
        }
    }

    #[test]
    fn manager_summary_counts_duty_late_absent_and_sites() {
        // G1 checked in late and still on site; G2 is expected but absent
        let guard_ids = vec![1, 2];
        let attendance = vec![attendance_row(
            1,
            Some("2024-06-15T09:05:00Z"),
            None,
            Some(5),
            "LATE",
        )];
        let mut resolved = HashMap::new();
        resolved.insert(1, vec![resolved_assignment_for(1)]);
        resolved.insert(2, vec![resolved_assignment_for(2)]);

        let summary = compute_manager_summary(&guard_ids, &attendance, &resolved);

        assert_eq!(summary.guards_on_duty, 1);
        assert_eq!(summary.absent_today, 1);
        assert_eq!(summary.late_today, 1);
        assert_eq!(summary.sites_managed, 1); // both assignments point at HQ
    }

    fn resolved_assignment_for(guard_id: u64) -> ResolvedAssignment {
        assignment_at(guard_id, guard_id, 1, "HQ")
    }

    #[test]
    fn on_duty_and_absent_are_disjoint() {
        // a guard with an attendance row can never be counted absent
        let guard_ids = vec![1];
        let attendance = vec![attendance_row(
            1,
            Some("2024-06-15T09:00:00Z"),
            None,
            None,
            "PRESENT",
        )];
        let mut resolved = HashMap::new();
        resolved.insert(1, vec![resolved_assignment_for(1)]);

        let summary = compute_manager_summary(&guard_ids, &attendance, &resolved);
        assert_eq!(summary.guards_on_duty, 1);
        assert_eq!(summary.absent_today, 0);
    }

    #[test]
    fn checked_out_guards_leave_the_on_duty_count() {
        let guard_ids = vec![1];
        let attendance = vec![attendance_row(
            1,
            Some("2024-06-15T09:00:00Z"),
            Some("2024-06-15T17:00:00Z"),
            None,
            "PRESENT",
        )];
        let resolved = HashMap::new();

        let summary = compute_manager_summary(&guard_ids, &attendance, &resolved);
        assert_eq!(summary.guards_on_duty, 0);
    }

    #[test]
    fn unassigned_guards_are_not_absent() {
        // no resolved assignment means the guard was not expected today
        let guard_ids = vec![1, 2];
        let attendance = Vec::new();
        let mut resolved = HashMap::new();
        resolved.insert(1, Vec::new());

        let summary = compute_manager_summary(&guard_ids, &attendance, &resolved);
        assert_eq!(summary.absent_today, 0);
        assert_eq!(summary.sites_managed, 0);
    }

    #[test]
    fn sites_managed_counts_distinct_sites_via_the_authoritative_assignment() {
        let guard_ids = vec![1, 2, 3];
        let mut resolved = HashMap::new();
        // guard 1's overlapping second assignment at Depot is not
        // authoritative and must not inflate the count
        resolved.insert(1, vec![assignment_at(1, 1, 1, "HQ"), assignment_at(2, 1, 2, "Depot")]);
        resolved.insert(2, vec![assignment_at(3, 2, 3, "Mall")]);
        resolved.insert(3, Vec::new());

        let summary = compute_manager_summary(&guard_ids, &Vec::new(), &resolved);

        assert_eq!(summary.sites_managed, 2); // HQ + Mall
        let assigned_guards = resolved.values().filter(|v| !v.is_empty()).count() as i64;
        assert!(summary.sites_managed <= assigned_guards);
    }

    #[test]
    fn guards_sharing_a_site_count_it_once() {
        let guard_ids = vec![1, 2];
        let mut resolved = HashMap::new();
        resolved.insert(1, vec![assignment_at(1, 1, 1, "HQ")]);
        resolved.insert(2, vec![assignment_at(2, 2, 1, "HQ")]);

        let summary = compute_manager_summary(&guard_ids, &Vec::new(), &resolved);
        assert_eq!(summary.sites_managed, 1);
    }

    #[test]
    fn empty_scope_is_all_zeros() {
        let summary = compute_manager_summary(&[], &[], &HashMap::new());
        assert_eq!(summary.guards_on_duty, 0);
        assert_eq!(summary.sites_managed, 0);
        assert_eq!(summary.late_today, 0);
        assert_eq!(summary.absent_today, 0);
    }

    #[test]
    fn guard_summary_surfaces_shift_site_post_and_local_times() {
        let assignment = assignment_at(1, 1, 1, "HQ");
        let att = attendance_row(1, Some("2024-06-15T09:05:00Z"), None, Some(5), "LATE");

        let summary = build_guard_summary(Some(&assignment), Some(&att), chrono_tz::UTC);

        assert_eq!(summary.today_shift.as_deref(), Some("Day Shift"));
        assert_eq!(summary.site_name.as_deref(), Some("HQ"));
        assert_eq!(summary.post_name.as_deref(), Some("Gate A"));
        assert_eq!(summary.check_in_time, Some("09:05:00".parse().unwrap()));
        assert_eq!(summary.check_out_time, None);
        assert_eq!(summary.status, "LATE");
    }

    #[test]
    fn guard_summary_converts_instants_to_the_configured_zone() {
        let att = attendance_row(1, Some("2024-06-15T03:05:00Z"), None, None, "PRESENT");

        let summary = build_guard_summary(None, Some(&att), chrono_tz::Asia::Dhaka);

        // 03:05 UTC is 09:05 in Dhaka (+06:00)
        assert_eq!(summary.check_in_time, Some("09:05:00".parse().unwrap()));
    }

    #[test]
    fn missing_attendance_synthesizes_not_checked_in() {
        let assignment = assignment_at(1, 1, 1, "HQ");

        let summary = build_guard_summary(Some(&assignment), None, chrono_tz::UTC);

        assert_eq!(summary.status, "NOT_CHECKED_IN");
        assert_eq!(summary.check_in_time, None);
        assert_eq!(summary.check_out_time, None);
        assert_eq!(summary.today_shift.as_deref(), Some("Day Shift"));
    }

    #[test]
    fn no_assignment_leaves_shift_fields_unset() {
        let summary = build_guard_summary(None, None, chrono_tz::UTC);

        assert_eq!(summary.today_shift, None);
        assert_eq!(summary.site_name, None);
        assert_eq!(summary.post_name, None);
        assert_eq!(summary.status, "NOT_CHECKED_IN");
    }
}
