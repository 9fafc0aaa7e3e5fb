use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// One record per guard per calendar date. Check-in/out are stored as
/// UTC instants; presentation converts them to the configured zone.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub guard_id: u64,
    #[schema(example = "2024-06-15", value_type = String, format = "date")]
    pub attendance_date: NaiveDate,
    #[schema(example = "2024-06-15T03:05:00Z", value_type = String, format = "date-time", nullable = true)]
    pub check_in_time: Option<DateTime<Utc>>,
    #[schema(example = "2024-06-15T11:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub check_out_time: Option<DateTime<Utc>>,
    /// NULL or 0 means not late
    #[schema(example = 5, nullable = true)]
    pub late_minutes: Option<i32>,
    /// PRESENT | LATE | ABSENT (NOT_CHECKED_IN is synthesized, never stored)
    #[schema(example = "LATE")]
    pub status: String,
    #[schema(nullable = true)]
    pub notes: Option<String>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    NotCheckedIn,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names_match_the_stored_wire_values() {
        assert_eq!(AttendanceStatus::Present.to_string(), "PRESENT");
        assert_eq!(AttendanceStatus::Late.to_string(), "LATE");
        assert_eq!(AttendanceStatus::Absent.to_string(), "ABSENT");
        assert_eq!(AttendanceStatus::NotCheckedIn.to_string(), "NOT_CHECKED_IN");
    }
}
