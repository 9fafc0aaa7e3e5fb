//! Active-assignment resolution.
//!
//! Overlapping effective assignments are allowed by the data model, so the
//! resolver imposes an explicit order: most recent `effective_from` first,
//! `id` descending as the tie-break within a day. The first element is the
//! authoritative assignment for every downstream consumer.

use chrono::{NaiveDate, NaiveTime};
use sqlx::MySqlPool;

use crate::error::ServiceError;

/// An assignment effective on a given date, joined with its post, site,
/// and shift type.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResolvedAssignment {
    pub id: u64,
    pub guard_id: u64,
    pub site_post_id: u64,
    pub post_name: String,
    pub site_id: u64,
    pub site_name: String,
    pub shift_type_id: u64,
    pub shift_name: String,
    pub shift_start: NaiveTime,
    pub status: String,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
}

/// Order assignments most-recent-first: `effective_from` descending, then
/// `id` descending.
pub fn rank_effective(mut rows: Vec<ResolvedAssignment>) -> Vec<ResolvedAssignment> {
    rows.sort_by(|a, b| {
        b.effective_from
            .cmp(&a.effective_from)
            .then(b.id.cmp(&a.id))
    });
    rows
}

/// All of a guard's assignments effective on `on`, ranked. A guard with no
/// matching assignment (or an unknown guard id) yields an empty vector.
pub async fn resolve_active(
    pool: &MySqlPool,
    guard_id: u64,
    on: NaiveDate,
) -> Result<Vec<ResolvedAssignment>, ServiceError> {
    let rows = sqlx::query_as::<_, ResolvedAssignment>(
        r#"
        SELECT
            ga.id,
            ga.guard_id,
            ga.site_post_id,
            sp.post_name,
            s.id AS site_id,
            s.name AS site_name,
            ga.shift_type_id,
            st.name AS shift_name,
            st.start_time AS shift_start,
            ga.status,
            ga.effective_from,
            ga.effective_to
        FROM guard_assignments ga
        JOIN site_posts sp ON sp.id = ga.site_post_id
        JOIN sites s ON s.id = sp.site_id
        JOIN shift_types st ON st.id = ga.shift_type_id
        WHERE ga.guard_id = ?
          AND ga.active = TRUE
          AND ga.status = 'ACTIVE'
          AND ga.effective_from <= ?
          AND (ga.effective_to IS NULL OR ga.effective_to >= ?)
        "#,
    )
    .bind(guard_id)
    .bind(on)
    .bind(on)
    .fetch_all(pool)
    .await?;

    Ok(rank_effective(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(id: u64, from: &str, to: Option<&str>) -> ResolvedAssignment {
        ResolvedAssignment {
            id,
            guard_id: 1,
            site_post_id: 1,
            post_name: "Gate A".into(),
            site_id: 1,
            site_name: "HQ".into(),
            shift_type_id: 1,
            shift_name: "Day Shift".into(),
            shift_start: "09:00:00".parse().unwrap(),
            status: "ACTIVE".into(),
            effective_from: from.parse().unwrap(),
            effective_to: to.map(|d| d.parse().unwrap()),
        }
    }

    #[test]
    fn most_recent_effective_from_wins() {
        let ranked = rank_effective(vec![
            resolved(1, "2024-01-01", None),
            resolved(2, "2024-05-01", None),
            resolved(3, "2024-03-01", Some("2024-12-31")),
        ]);
        let ids: Vec<u64> = ranked.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn same_day_assignments_break_ties_by_id() {
        let ranked = rank_effective(vec![
            resolved(10, "2024-05-01", None),
            resolved(12, "2024-05-01", None),
            resolved(11, "2024-05-01", None),
        ]);
        let ids: Vec<u64> = ranked.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![12, 11, 10]);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(rank_effective(Vec::new()).is_empty());
    }
}
