use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceBreakdown {
    pub name: String,
    pub value: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusBreakdown {
    pub name: String,
    pub value: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagBreakdown {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementBreakdown {
    #[serde(rename = "type")]
    pub interaction_type: String,
    pub positive_count: usize,
    pub neutral_count: usize,
    pub negative_count: usize,
}

impl EngagementBreakdown {
    pub fn total(&self) -> usize {
        self.positive_count + self.neutral_count + self.negative_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBucket {
    pub range: &'static str,
    #[serde(skip)]
    pub min: u8,
    #[serde(skip)]
    pub max: u8,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Info,
    Success,
    Warning,
    Danger,
}

impl InsightKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InsightValue {
    Count(usize),
    Text(String),
}

impl std::fmt::Display for InsightValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightValue::Count(count) => write!(f, "{count}"),
            InsightValue::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightItem {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: &'static str,
    pub description: String,
    pub value: InsightValue,
}
