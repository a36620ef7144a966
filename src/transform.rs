use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::api::dto::{ActivityRecord, CourseRecord, ItemList};
use crate::error::SyncError;
use crate::models::{
    ActivityRow, CaptionLocale, CourseChildren, CourseRow, Image, PromoVideo, TaxonomyRef, Topic,
};

/// Maps one raw course record onto a typed parent row plus its child
/// collections. Pure; a record missing its required id fails here rather
/// than at write time.
pub fn course_rows(record: &Value) -> Result<(CourseRow, CourseChildren), SyncError> {
    let record: CourseRecord = serde_json::from_value(record.clone())
        .map_err(|e| SyncError::MalformedRecord(format!("course record: {e}")))?;

    let row = CourseRow {
        id: record.id,
        title: record.title,
        description: record.description,
        url: record.url,
        estimated_content_length: record.estimated_content_length,
        num_lectures: record.num_lectures,
        num_videos: record.num_videos,
        mobile_native_deeplink: record.mobile_native_deeplink,
        is_practice_test_course: record.is_practice_test_course,
        num_quizzes: record.num_quizzes,
        num_practice_tests: record.num_practice_tests,
        has_closed_caption: record.has_closed_caption,
        last_update_date: record.last_update_date,
        xapi_activity_id: record.xapi_activity_id,
        is_custom: record.is_custom,
        is_imported: record.is_imported,
        headline: record.headline,
        level: record.level,
        locale: record.locale.and_then(|l| l.locale),
    };

    let mut children = CourseChildren::default();

    if let Some(category) = record.primary_category {
        if let Some(title) = category.title {
            children.categories.push(TaxonomyRef {
                title,
                url: category.url,
            });
        }
    }
    if let Some(subcategory) = record.primary_subcategory {
        if let Some(title) = subcategory.title {
            children.subcategories.push(TaxonomyRef {
                title,
                url: subcategory.url,
            });
        }
    }
    children.topics = record
        .topics
        .into_iter()
        .map(|t| Topic {
            topic_id: t.id,
            title: t.title,
            url: t.url,
        })
        .collect();
    children.promo_videos = record
        .promo_video_url
        .into_iter()
        .map(|v| PromoVideo {
            kind: v.kind,
            label: v.label,
            file: v.file,
        })
        .collect();
    children.instructors = record.instructors;
    children.requirements = record
        .requirements
        .map(ItemList::into_items)
        .unwrap_or_default();
    children.objectives = record
        .what_you_will_learn
        .map(ItemList::into_items)
        .unwrap_or_default();
    children.images = record
        .images
        .into_iter()
        .map(|(size, url)| Image { size, url })
        .collect();
    children.caption_languages = record.caption_languages;
    children.caption_locales = record
        .caption_locales
        .into_iter()
        .map(|c| CaptionLocale {
            locale: c.locale,
            title: c.title,
            english_title: c.english_title,
        })
        .collect();

    Ok((row, children))
}

/// Maps one raw activity record onto a `user_course_data` row. The composite
/// (user_id, course_id) key is required; every other column defaults to null.
pub fn activity_row(record: &Value) -> Result<ActivityRow, SyncError> {
    let record: ActivityRecord = serde_json::from_value(record.clone())
        .map_err(|e| SyncError::MalformedRecord(format!("activity record: {e}")))?;

    Ok(ActivityRow {
        user_id: record.user_id,
        course_id: record.course_id,
        user_name: record.user_name,
        user_surname: record.user_surname,
        user_email: record.user_email,
        user_role: record.user_role,
        user_external_id: record.user_external_id,
        course_title: record.course_title,
        course_category: record.course_category,
        course_duration: record.course_duration,
        completion_ratio: record.completion_ratio,
        num_video_consumed_minutes: record.num_video_consumed_minutes,
        course_enroll_date: parse_timestamp(record.course_enroll_date.as_deref()),
        course_start_date: parse_timestamp(record.course_start_date.as_deref()),
        course_completion_date: parse_timestamp(record.course_completion_date.as_deref()),
        course_first_completion_date: parse_timestamp(
            record.course_first_completion_date.as_deref(),
        ),
        course_last_accessed_date: parse_timestamp(record.course_last_accessed_date.as_deref()),
        last_activity_date: record.last_activity_date,
        is_assigned: record.is_assigned,
        assigned_by: record.assigned_by,
        user_is_deactivated: record.user_is_deactivated,
        lms_user_id: record.lms_user_id,
    })
}

/// ISO-8601, with the API's trailing `Z` accepted.
fn parse_timestamp(ts: Option<&str>) -> Option<DateTime<Utc>> {
    ts.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_course() -> Value {
        json!({
            "id": 4321,
            "title": "Intro to Data Engineering",
            "url": "/course/intro-de/",
            "num_lectures": 42,
            "locale": { "locale": "en_US" },
            "primary_category": { "title": "Development", "url": "/development/" },
            "primary_subcategory": { "title": "Data Science", "url": "/data-science/" },
            "topics": [ { "id": 9, "title": "ETL", "url": "/topic/etl/" } ],
            "promo_video_url": [ { "type": "video/mp4", "label": "720", "file": "https://cdn/x.mp4" } ],
            "instructors": ["Ada Lovelace", "Grace Hopper"],
            "requirements": { "list": ["SQL basics"] },
            "what_you_will_learn": { "list": ["Pipelines", "Modeling"] },
            "images": { "480x270": "https://cdn/img480.jpg", "125_H": "https://cdn/img125.jpg" },
            "caption_languages": ["English"],
            "caption_locales": [ { "locale": "en_US", "title": "English", "english_title": "English" } ]
        })
    }

    #[test]
    fn course_record_maps_to_rows() {
        let (row, children) = course_rows(&sample_course()).unwrap();
        assert_eq!(row.id, 4321);
        assert_eq!(row.title.as_deref(), Some("Intro to Data Engineering"));
        assert_eq!(row.locale.as_deref(), Some("en_US"));
        assert_eq!(children.categories[0].title, "Development");
        assert_eq!(children.subcategories[0].title, "Data Science");
        assert_eq!(children.topics[0].topic_id, 9);
        assert_eq!(children.instructors.len(), 2);
        assert_eq!(children.requirements, vec!["SQL basics"]);
        assert_eq!(children.objectives.len(), 2);
        assert_eq!(children.images.len(), 2);
        assert_eq!(children.caption_locales[0].locale.as_deref(), Some("en_US"));
    }

    #[test]
    fn missing_optional_fields_default() {
        let (row, children) = course_rows(&json!({ "id": 7 })).unwrap();
        assert_eq!(row.id, 7);
        assert!(row.title.is_none());
        assert_eq!(children.row_count(), 0);
    }

    #[test]
    fn missing_course_id_is_fatal() {
        let err = course_rows(&json!({ "title": "No id" })).unwrap_err();
        assert!(matches!(err, SyncError::MalformedRecord(_)));
    }

    #[test]
    fn absent_requirements_list_is_empty() {
        let (_, children) = course_rows(&json!({ "id": 1, "requirements": {} })).unwrap();
        assert!(children.requirements.is_empty());
    }

    #[test]
    fn non_list_requirements_payload_is_empty() {
        let record = json!({ "id": 1, "requirements": { "list": "not a list" } });
        let (row, children) = course_rows(&record).unwrap();
        assert_eq!(row.id, 1);
        assert!(children.requirements.is_empty());
    }

    #[test]
    fn non_string_list_entries_are_dropped() {
        let record = json!({ "id": 2, "what_you_will_learn": { "list": [1, "Pipelines", null] } });
        let (_, children) = course_rows(&record).unwrap();
        assert_eq!(children.objectives, vec!["Pipelines"]);
    }

    #[test]
    fn activity_record_maps_and_parses_dates() {
        let row = activity_row(&json!({
            "user_id": 11,
            "course_id": 4321,
            "user_email": "ada@example.com",
            "completion_ratio": 62.5,
            "course_enroll_date": "2024-03-01T09:30:00Z",
            "course_completion_date": null
        }))
        .unwrap();
        assert_eq!((row.user_id, row.course_id), (11, 4321));
        assert_eq!(row.completion_ratio, Some(62.5));
        let enrolled = row.course_enroll_date.unwrap();
        assert_eq!(enrolled.to_rfc3339(), "2024-03-01T09:30:00+00:00");
        assert!(row.course_completion_date.is_none());
    }

    #[test]
    fn missing_activity_key_is_fatal() {
        let err = activity_row(&json!({ "user_id": 11 })).unwrap_err();
        assert!(matches!(err, SyncError::MalformedRecord(_)));
    }
}
