//! Output records and the reshaping of raw extraction results into them

use crate::extract::ExtractedRecord;
use crate::sections::Sections;
use serde::{Deserialize, Serialize};

const PUBLISH_DATE_LABEL: &str = "公開日";
const PUBLISH_DATE_PREFIX: &str = "公開日 ：";

/// A job listing from the job board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub job_type: Vec<String>,
    pub required_hours: String,
    pub salary: String,
    pub area: String,
    pub required_skills: Vec<String>,
    pub details: String,
    pub conditions: Sections,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub href: String,
}

/// Summary of an arbitrary page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericPageRecord {
    pub url: String,
    pub title: String,
    pub meta_description: String,
    pub headings: Vec<Heading>,
    pub paragraphs: Vec<String>,
    pub links: Vec<Link>,
}

fn text_or_default(raw: &ExtractedRecord, name: &str) -> String {
    raw.text(name).unwrap_or_default().to_string()
}

/// Build a job record from the job board schema's fields
pub fn job_record(raw: &ExtractedRecord, conditions: Sections, url: &str) -> JobRecord {
    let publish_date = raw
        .text("publish_date")
        .filter(|date| date.contains(PUBLISH_DATE_LABEL))
        .map(|date| date.replace(PUBLISH_DATE_PREFIX, "").trim().to_string());

    JobRecord {
        title: text_or_default(raw, "title"),
        job_type: raw.list("job_type"),
        required_hours: text_or_default(raw, "required_hours"),
        salary: text_or_default(raw, "salary"),
        area: text_or_default(raw, "area").replace('\n', " "),
        required_skills: raw.list("required_skills"),
        details: text_or_default(raw, "details"),
        conditions,
        url: url.to_string(),
        features: Some(raw.list("features")),
        publish_date,
    }
}

/// Build a generic page record. Headings come from fields `h1`..`h6` and are
/// grouped by level, lowest first. Links without an `href` are skipped.
pub fn generic_page_record(raw: &ExtractedRecord, url: &str) -> GenericPageRecord {
    let headings = (1..=6u8)
        .flat_map(|level| {
            raw.list(&format!("h{}", level))
                .into_iter()
                .map(move |text| Heading { level, text })
        })
        .collect();

    let links = raw
        .links("links")
        .iter()
        .filter_map(|link| {
            link.href.as_ref().map(|href| Link {
                text: link.text.clone(),
                href: href.clone(),
            })
        })
        .collect();

    GenericPageRecord {
        url: url.to_string(),
        title: text_or_default(raw, "title"),
        meta_description: text_or_default(raw, "meta_description"),
        headings,
        paragraphs: raw.list("paragraphs"),
        links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{FieldValue, RawLink};

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    fn list(items: &[&str]) -> FieldValue {
        FieldValue::List(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_job_record_defaults() {
        let record = job_record(&ExtractedRecord::default(), Sections::new(), "https://x");
        assert_eq!(record.title, "");
        assert!(record.job_type.is_empty());
        assert!(record.required_skills.is_empty());
        assert!(record.conditions.is_empty());
        assert_eq!(record.features, Some(vec![]));
        assert_eq!(record.publish_date, None);
        assert_eq!(record.url, "https://x");
    }

    #[test]
    fn test_job_record_cleanup() {
        let mut raw = ExtractedRecord::default();
        raw.insert("title", text("Backend Engineer"));
        raw.insert("area", text("東京都\n渋谷区"));
        raw.insert("job_type", list(&["エンジニア", "PM"]));
        raw.insert("publish_date", text("公開日 ：2024/05/01"));

        let record = job_record(&raw, Sections::new(), "https://sokudan.work/projects/1");
        assert_eq!(record.title, "Backend Engineer");
        assert_eq!(record.area, "東京都 渋谷区");
        assert_eq!(record.job_type, vec!["エンジニア", "PM"]);
        assert_eq!(record.publish_date.as_deref(), Some("2024/05/01"));
    }

    #[test]
    fn test_publish_date_requires_label() {
        let mut raw = ExtractedRecord::default();
        raw.insert("publish_date", text("2024/05/01"));
        let record = job_record(&raw, Sections::new(), "u");
        assert_eq!(record.publish_date, None);
    }

    #[test]
    fn test_job_record_json_roundtrip() {
        let mut conditions = Sections::new();
        conditions.insert("required".to_string(), "【必須条件】Rust".to_string());
        let record = JobRecord {
            title: "Engineer".to_string(),
            job_type: vec!["開発".to_string()],
            required_hours: "週3日".to_string(),
            salary: "月60万円".to_string(),
            area: "フルリモート".to_string(),
            required_skills: vec!["Rust".to_string(), "SQL".to_string()],
            details: "【必須条件】Rust".to_string(),
            conditions,
            url: "https://sokudan.work/projects/1".to_string(),
            features: Some(vec!["即日OK".to_string()]),
            publish_date: Some("2024/05/01".to_string()),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("週3日"), "non-ASCII must not be escaped");
        let parsed: JobRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_optional_job_fields_omitted() {
        let mut record = job_record(&ExtractedRecord::default(), Sections::new(), "u");
        record.features = None;
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("features").is_none());
        assert!(value.get("publish_date").is_none());
        assert_eq!(value["conditions"], serde_json::json!({}));
    }

    #[test]
    fn test_headings_grouped_by_level() {
        let mut raw = ExtractedRecord::default();
        raw.insert("h2", list(&["Second A", "Second B"]));
        raw.insert("h1", list(&["First"]));
        raw.insert("h4", list(&["Fourth"]));

        let page = generic_page_record(&raw, "https://example.com");
        let got: Vec<(u8, &str)> = page
            .headings
            .iter()
            .map(|h| (h.level, h.text.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![(1, "First"), (2, "Second A"), (2, "Second B"), (4, "Fourth")]
        );
    }

    #[test]
    fn test_links_need_href() {
        let mut raw = ExtractedRecord::default();
        raw.insert(
            "links",
            FieldValue::Links(vec![
                RawLink {
                    text: "Home".to_string(),
                    href: Some("/".to_string()),
                },
                RawLink {
                    text: "Anchor".to_string(),
                    href: None,
                },
                RawLink {
                    text: String::new(),
                    href: Some("/logo".to_string()),
                },
            ]),
        );

        let page = generic_page_record(&raw, "https://example.com");
        assert_eq!(
            page.links,
            vec![
                Link {
                    text: "Home".to_string(),
                    href: "/".to_string()
                },
                Link {
                    text: String::new(),
                    href: "/logo".to_string()
                }
            ]
        );
    }

    #[test]
    fn test_generic_defaults() {
        let page = generic_page_record(&ExtractedRecord::default(), "https://example.com");
        assert_eq!(page.title, "");
        assert_eq!(page.meta_description, "");
        assert!(page.headings.is_empty());
        assert!(page.paragraphs.is_empty());
        assert!(page.links.is_empty());
    }
}
