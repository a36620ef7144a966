use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Paginated response envelope shared by the course list and activity
/// endpoints. Records stay raw JSON here; the transformer validates them.
#[derive(Debug, Deserialize)]
pub struct PageEnvelope {
    pub results: Vec<Value>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CourseRecord {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub estimated_content_length: Option<i64>,
    #[serde(default)]
    pub num_lectures: Option<i64>,
    #[serde(default)]
    pub num_videos: Option<i64>,
    #[serde(default)]
    pub mobile_native_deeplink: Option<String>,
    #[serde(default)]
    pub is_practice_test_course: Option<bool>,
    #[serde(default)]
    pub num_quizzes: Option<i64>,
    #[serde(default)]
    pub num_practice_tests: Option<i64>,
    #[serde(default)]
    pub has_closed_caption: Option<bool>,
    #[serde(default)]
    pub last_update_date: Option<String>,
    #[serde(default)]
    pub xapi_activity_id: Option<String>,
    #[serde(default)]
    pub is_custom: Option<bool>,
    #[serde(default)]
    pub is_imported: Option<bool>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub locale: Option<LocaleField>,
    #[serde(default)]
    pub primary_category: Option<TaxonomyField>,
    #[serde(default)]
    pub primary_subcategory: Option<TaxonomyField>,
    #[serde(default)]
    pub topics: Vec<TopicField>,
    #[serde(default)]
    pub promo_video_url: Vec<PromoVideoField>,
    #[serde(default)]
    pub instructors: Vec<String>,
    #[serde(default)]
    pub requirements: Option<ItemList>,
    #[serde(default)]
    pub what_you_will_learn: Option<ItemList>,
    #[serde(default)]
    pub images: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub caption_languages: Vec<String>,
    #[serde(default)]
    pub caption_locales: Vec<CaptionLocaleField>,
}

#[derive(Debug, Deserialize)]
pub struct LocaleField {
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TaxonomyField {
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopicField {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PromoVideoField {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
}

/// The API wraps several string collections as `{ "list": [...] }`; a missing
/// or non-list payload is treated as empty.
#[derive(Debug, Deserialize)]
pub struct ItemList {
    #[serde(default)]
    pub list: Option<Value>,
}

impl ItemList {
    pub fn into_items(self) -> Vec<String> {
        match self.list {
            Some(Value::Array(values)) => values
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CaptionLocaleField {
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub english_title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityRecord {
    pub user_id: i64,
    pub course_id: i64,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_surname: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_role: Option<String>,
    #[serde(default)]
    pub user_external_id: Option<String>,
    #[serde(default)]
    pub course_title: Option<String>,
    #[serde(default)]
    pub course_category: Option<String>,
    #[serde(default)]
    pub course_duration: Option<f64>,
    #[serde(default)]
    pub completion_ratio: Option<f64>,
    #[serde(default)]
    pub num_video_consumed_minutes: Option<f64>,
    #[serde(default)]
    pub course_enroll_date: Option<String>,
    #[serde(default)]
    pub course_start_date: Option<String>,
    #[serde(default)]
    pub course_completion_date: Option<String>,
    #[serde(default)]
    pub course_first_completion_date: Option<String>,
    #[serde(default)]
    pub course_last_accessed_date: Option<String>,
    #[serde(default)]
    pub last_activity_date: Option<String>,
    #[serde(default)]
    pub is_assigned: Option<bool>,
    #[serde(default)]
    pub assigned_by: Option<String>,
    #[serde(default)]
    pub user_is_deactivated: Option<bool>,
    #[serde(default)]
    pub lms_user_id: Option<String>,
}
