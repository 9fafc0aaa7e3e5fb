use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Binds a guard to a site post and shift type over a date interval.
/// `effective_to` unset means the assignment is open-ended.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Assignment {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub guard_id: u64,
    #[schema(example = 1)]
    pub site_post_id: u64,
    #[schema(example = 1)]
    pub shift_type_id: u64,
    /// ACTIVE | CANCELLED | COMPLETED
    #[schema(example = "ACTIVE")]
    pub status: String,
    #[schema(example = true)]
    pub active: bool,
    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub effective_from: NaiveDate,
    #[schema(example = "2024-12-31", value_type = String, format = "date", nullable = true)]
    pub effective_to: Option<NaiveDate>,
    #[schema(example = "Covers the morning gate rotation", nullable = true)]
    pub notes: Option<String>,
}

impl Assignment {
    /// Whether this assignment is in effect on `date`. Both the `active`
    /// flag and an ACTIVE status must hold, and the date interval
    /// `[effective_from, effective_to]` must cover the date
    /// (an unset `effective_to` is open-ended).
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.active
            && self.status == "ACTIVE"
            && self.effective_from <= date
            && self.effective_to.map_or(true, |to| to >= date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(from: &str, to: Option<&str>) -> Assignment {
        Assignment {
            id: 1,
            guard_id: 1,
            site_post_id: 1,
            shift_type_id: 1,
            status: "ACTIVE".into(),
            active: true,
            effective_from: from.parse().unwrap(),
            effective_to: to.map(|d| d.parse().unwrap()),
            notes: None,
        }
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn bounded_interval_covers_both_endpoints() {
        let a = assignment("2024-06-01", Some("2024-06-30"));
        assert!(a.is_effective_on(day("2024-06-01")));
        assert!(a.is_effective_on(day("2024-06-15")));
        assert!(a.is_effective_on(day("2024-06-30")));
    }

    #[test]
    fn dates_outside_the_interval_are_excluded() {
        let a = assignment("2024-06-01", Some("2024-06-30"));
        assert!(!a.is_effective_on(day("2024-05-31")));
        assert!(!a.is_effective_on(day("2024-07-01")));
    }

    #[test]
    fn open_ended_interval_covers_any_later_date() {
        let a = assignment("2024-01-01", None);
        assert!(a.is_effective_on(day("2024-01-01")));
        assert!(a.is_effective_on(day("2030-12-31")));
        assert!(!a.is_effective_on(day("2023-12-31")));
    }

    #[test]
    fn inactive_flag_excludes_regardless_of_dates() {
        let mut a = assignment("2024-01-01", None);
        a.active = false;
        assert!(!a.is_effective_on(day("2024-06-15")));
    }

    #[test]
    fn non_active_status_excludes_regardless_of_dates() {
        let mut a = assignment("2024-01-01", None);
        a.status = "CANCELLED".into();
        assert!(!a.is_effective_on(day("2024-06-15")));
    }
}
