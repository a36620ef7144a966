use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row of `user_course_data`, keyed by (user_id, course_id). Every sync
/// overwrites all scalar columns for an existing key.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityRow {
    pub user_id: i64,
    pub course_id: i64,
    pub user_name: Option<String>,
    pub user_surname: Option<String>,
    pub user_email: Option<String>,
    pub user_role: Option<String>,
    pub user_external_id: Option<String>,
    pub course_title: Option<String>,
    pub course_category: Option<String>,
    pub course_duration: Option<f64>,
    pub completion_ratio: Option<f64>,
    pub num_video_consumed_minutes: Option<f64>,
    pub course_enroll_date: Option<DateTime<Utc>>,
    pub course_start_date: Option<DateTime<Utc>>,
    pub course_completion_date: Option<DateTime<Utc>>,
    pub course_first_completion_date: Option<DateTime<Utc>>,
    pub course_last_accessed_date: Option<DateTime<Utc>>,
    pub last_activity_date: Option<String>,
    pub is_assigned: Option<bool>,
    pub assigned_by: Option<String>,
    pub user_is_deactivated: Option<bool>,
    pub lms_user_id: Option<String>,
}
