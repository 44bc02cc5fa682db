//! Typed Docs and Drive API payloads
//!
//! Required fields fail decoding when missing; container fields that the
//! API omits for empty documents default to empty.

use serde::{Deserialize, Serialize};

/// A Google Docs document (`documents.get` / `documents.create`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub document_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Body,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StructuralElement {
    pub paragraph: Option<Paragraph>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub elements: Vec<ParagraphElement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphElement {
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextRun {
    #[serde(default)]
    pub content: String,
}

impl Document {
    /// Plain text of every paragraph text run, in order, trimmed
    ///
    /// Tables, section breaks and formatting are dropped.
    pub fn plain_text(&self) -> String {
        let text: String = self.body.content.iter()
            .filter_map(|element| element.paragraph.as_ref())
            .flat_map(|paragraph| paragraph.elements.iter())
            .filter_map(|element| element.text_run.as_ref())
            .map(|run| run.content.as_str())
            .collect();
        text.trim().to_string()
    }
}

/// Drive file metadata projected to `files(id, name)`
#[derive(Debug, Clone, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileListResponse {
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

/// `documents.batchUpdate` body
#[derive(Debug, Serialize)]
pub(crate) struct BatchUpdateRequest {
    pub requests: Vec<UpdateRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum UpdateRequest {
    InsertText { location: Location, text: String },
}

#[derive(Debug, Serialize)]
pub(crate) struct Location {
    pub index: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateDocumentRequest<'a> {
    pub title: &'a str,
}

/// Google's JSON error envelope: `{"error": {"code", "message", "status"}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}
