use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A downloadable file listed next to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub href: String,
    #[serde(default)]
    pub text: String,
}

/// Metadata block as scraped from the task page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskMeta {
    #[serde(rename = "КЭС", default)]
    pub kes: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One scraped task, as read from a line of the input JSONL.
///
/// Fields this crate does not know about are kept in `extra` and written back
/// out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default)]
    pub internal_id: String,
    #[serde(alias = "rawHtml")]
    pub question_html: String,
    #[serde(default, alias = "category", skip_serializing_if = "Option::is_none")]
    pub task_number: Option<u32>,
    #[serde(default, alias = "classificationList", skip_serializing_if = "Vec::is_empty")]
    pub kes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<TaskMeta>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskRecord {
    pub fn new(internal_id: &str, question_html: &str) -> Self {
        Self {
            internal_id: internal_id.to_string(),
            question_html: question_html.to_string(),
            ..Self::default()
        }
    }

    /// Classification strings, from the flat list or else from the metadata block.
    pub fn classifications(&self) -> &[String] {
        if !self.kes.is_empty() {
            return &self.kes;
        }
        self.meta
            .as_ref()
            .map(|meta| meta.kes.as_slice())
            .unwrap_or_default()
    }
}

/// A task after normalization; the raw fragment is not carried over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTask {
    pub internal_id: String,
    #[serde(alias = "cleanedHtml")]
    pub question_html_clean: String,
    #[serde(alias = "markdown")]
    pub question_md: String,
    #[serde(alias = "requiresAttachment")]
    pub requires_attachment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_number: Option<u32>,
    /// Classification codes of the task, first-seen order, no repeats.
    #[serde(default)]
    pub kes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<TaskMeta>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
