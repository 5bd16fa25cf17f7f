//! Display labels and relative timestamps.

use chrono::{DateTime, Utc};

use crate::model::{QuestionKind, UnitType};

/// Human-friendly age of `then` as seen from `now`.
///
/// Under a week old renders as minutes/hours/days ago; anything older falls
/// back to the calendar date. Timestamps in the future count as "just now".
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();

    if minutes < 1 {
        "방금 전".to_string()
    } else if minutes < 60 {
        format!("{minutes}분 전")
    } else if elapsed.num_hours() < 24 {
        format!("{}시간 전", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{}일 전", elapsed.num_days())
    } else {
        then.format("%Y.%m.%d").to_string()
    }
}

pub fn unit_type_label(unit_type: UnitType) -> &'static str {
    match unit_type {
        UnitType::Subject => "과목",
        UnitType::Grade => "학년",
        UnitType::Category => "분류",
        UnitType::Unit => "단원",
    }
}

pub fn question_kind_label(kind: QuestionKind) -> &'static str {
    match kind {
        QuestionKind::Objective => "객관식",
        QuestionKind::Subjective => "주관식",
    }
}

pub fn grade_label(grade: u32) -> String {
    format!("{grade}학년")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn relative_time_buckets() {
        let now = now();
        assert_eq!(format_relative_time(now - Duration::seconds(30), now), "방금 전");
        assert_eq!(format_relative_time(now - Duration::minutes(5), now), "5분 전");
        assert_eq!(format_relative_time(now - Duration::minutes(59), now), "59분 전");
        assert_eq!(format_relative_time(now - Duration::hours(3), now), "3시간 전");
        assert_eq!(format_relative_time(now - Duration::days(2), now), "2일 전");
        assert_eq!(format_relative_time(now - Duration::days(10), now), "2024.03.05");
    }

    #[test]
    fn future_is_just_now() {
        let now = now();
        assert_eq!(format_relative_time(now + Duration::hours(1), now), "방금 전");
    }

    #[test]
    fn labels() {
        assert_eq!(unit_type_label(UnitType::Unit), "단원");
        assert_eq!(question_kind_label(QuestionKind::Subjective), "주관식");
        assert_eq!(grade_label(3), "3학년");
    }
}
