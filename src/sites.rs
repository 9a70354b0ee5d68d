//! Built-in schemas and the URL dispatcher

use crate::schema::{FieldSpec, Schema};
use crate::sections::SectionMarker;

/// Host fragment that selects the job board path
pub const JOB_BOARD_HOST: &str = "sokudan.work";

/// Details-section markers in priority order
pub const JOB_CONDITION_MARKERS: &[SectionMarker] = &[
    SectionMarker::new("required", "【必須条件】"),
    SectionMarker::new("preferred", "【歓迎条件】"),
    SectionMarker::new("expected_salary", "【想定報酬】"),
    SectionMarker::new("work_conditions", "【勤務条件】"),
    SectionMarker::new("background", "【募集背景】"),
    SectionMarker::new("job_details", "【業務内容詳細】"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    JobBoard,
    Generic,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::JobBoard => write!(f, "job-board"),
            Route::Generic => write!(f, "generic"),
        }
    }
}

/// Pick the extraction path for `url`
pub fn route(url: &str) -> Route {
    if url.contains(JOB_BOARD_HOST) {
        Route::JobBoard
    } else {
        Route::Generic
    }
}

/// Job board listing page. The info rows have no stable classes, so most
/// fields are found next to their label text. Tag spans match on the exact
/// class string; badges with extra utility classes are not tags.
pub fn job_board_schema() -> Schema {
    Schema::new()
        .field("title", FieldSpec::css("h1"))
        .field("job_type", FieldSpec::css("span[class='inline-block rounded-md']").multiple())
        .field("required_hours", FieldSpec::next_to("稼働時間", "p"))
        .field("salary", FieldSpec::next_to("報酬", "p"))
        .field("area", FieldSpec::next_to("エリア", "p"))
        .field(
            "required_skills",
            FieldSpec::next_to("必須スキル", "span")
                .label_tag("p")
                .multiple(),
        )
        .field(
            "details",
            FieldSpec::next_to("案件詳細", "div.whitespace-pre-line").label_tag("h2"),
        )
        .field("features", FieldSpec::css("span[class='inline-block rounded-full']").multiple())
        .field(
            "publish_date",
            FieldSpec::css("p[class*='text-sokudan-date-in-card-grey']"),
        )
}

/// Any page: title, description, headings, paragraphs and links
pub fn generic_schema() -> Schema {
    let mut schema = Schema::new()
        .field("title", FieldSpec::css("title"))
        .field(
            "meta_description",
            FieldSpec::css("meta[name='description']").attr("content"),
        );
    for level in 1..=6 {
        let tag = format!("h{}", level);
        schema = schema.field(&tag, FieldSpec::css(&tag).multiple());
    }
    schema
        .field("paragraphs", FieldSpec::css("p").multiple())
        .field("links", FieldSpec::css("a").links().multiple())
}
