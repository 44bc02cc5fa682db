//! Document operations behind the three tools
//!
//! Each takes the service client it needs, makes the remote call(s) and
//! reshapes the result.

use serde::Serialize;
use crate::Result;
use crate::error::Error;
use crate::google::{DocumentApi, MetadataApi};

pub const DEFAULT_MAX_RESULTS: u32 = 10;

const DOCUMENT_MIME_QUERY: &str = "mimeType='application/vnd.google-apps.document'";
const LIST_FIELDS: &str = "files(id, name)";

/// Index 0 is the implicit start of the body and cannot hold text
const BODY_START_INDEX: u32 = 1;

/// Edit URL for a document id
pub fn document_url(id: &str) -> String {
    format!("https://docs.google.com/document/d/{}/edit", id)
}

/// A document as returned by `list_documents`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRef {
    pub name: String,
    pub id: String,
    pub url: String,
}

/// Result of `create_document`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedDocument {
    pub document_id: String,
    pub title: String,
    pub url: String,
}

/// First page of Google Docs files, at most `max_results` of them
pub async fn list_documents(drive: &dyn MetadataApi, max_results: u32) -> Result<Vec<DocumentRef>> {
    if max_results == 0 {
        return Err(Error::Tool("max_results must be a positive integer".to_string()));
    }

    let files = drive.list_files(DOCUMENT_MIME_QUERY, max_results, LIST_FIELDS).await?;

    files.into_iter()
        .take(max_results as usize)
        .map(|file| {
            if file.id.is_empty() {
                return Err(Error::RemoteApi {
                    status: None,
                    message: format!("Drive returned file {:?} without an id", file.name),
                });
            }
            Ok(DocumentRef {
                url: document_url(&file.id),
                name: file.name,
                id: file.id,
            })
        })
        .collect()
}

/// Plain text of a document, trimmed
pub async fn read_document(docs: &dyn DocumentApi, doc_id: &str) -> Result<String> {
    let document = docs.get_document(doc_id).await?;
    Ok(document.plain_text())
}

/// Create a titled document and insert `content` at the start of its body
///
/// Not atomic: when the insert fails the empty document stays behind and
/// the error carries its id.
pub async fn create_document(docs: &dyn DocumentApi, title: &str, content: &str) -> Result<CreatedDocument> {
    let document = docs.create_document(title).await?;
    let document_id = document.document_id;
    tracing::info!("Created document {}", document_id);

    // The API rejects empty insertText requests
    if !content.is_empty() {
        if let Err(e) = docs.insert_text(&document_id, BODY_START_INDEX, content).await {
            tracing::warn!("Inserting content into {} failed, leaving it empty", document_id);
            return Err(Error::PartialCreate {
                document_id,
                source: Box::new(e),
            });
        }
    }

    Ok(CreatedDocument {
        url: document_url(&document_id),
        document_id,
        title: title.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::google::{Document, DriveFile};

    /// In-memory stand-in for the Docs API
    #[derive(Default)]
    pub(crate) struct FakeDocs {
        docs: Mutex<Vec<(String, String, String)>>,
        pub fail_insert: bool,
        pub gets: AtomicUsize,
    }

    impl FakeDocs {
        pub fn with_document(id: &str, title: &str, text: &str) -> Self {
            let fake = Self::default();
            fake.docs.lock().unwrap().push((id.to_string(), title.to_string(), text.to_string()));
            fake
        }

        pub fn count(&self) -> usize {
            self.docs.lock().unwrap().len()
        }

        fn render(id: &str, title: &str, text: &str) -> Document {
            // Every document body ends with a newline, as in Docs
            serde_json::from_value(json!({
                "documentId": id,
                "title": title,
                "body": {"content": [
                    {"sectionBreak": {}},
                    {"paragraph": {"elements": [{"textRun": {"content": format!("{}\n", text)}}]}}
                ]}
            }))
            .unwrap()
        }
    }

    #[async_trait]
    impl DocumentApi for FakeDocs {
        async fn get_document(&self, document_id: &str) -> Result<Document> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            let docs = self.docs.lock().unwrap();
            docs.iter()
                .find(|(id, _, _)| id == document_id)
                .map(|(id, title, text)| Self::render(id, title, text))
                .ok_or_else(|| Error::RemoteApi {
                    status: Some(404),
                    message: "Requested entity was not found.".to_string(),
                })
        }

        async fn create_document(&self, title: &str) -> Result<Document> {
            let mut docs = self.docs.lock().unwrap();
            let id = format!("doc-{}", docs.len() + 1);
            docs.push((id.clone(), title.to_string(), String::new()));
            Ok(Self::render(&id, title, ""))
        }

        async fn insert_text(&self, document_id: &str, index: u32, text: &str) -> Result<()> {
            assert_eq!(index, 1);
            if self.fail_insert {
                return Err(Error::RemoteApi { status: Some(500), message: "backend error".to_string() });
            }
            let mut docs = self.docs.lock().unwrap();
            let entry = docs.iter_mut()
                .find(|(id, _, _)| id == document_id)
                .ok_or_else(|| Error::RemoteApi { status: Some(404), message: "missing".to_string() })?;
            entry.2.insert_str(0, text);
            Ok(())
        }
    }

    /// Drive fixture returning its files in order, honoring page size
    pub(crate) struct FakeDrive {
        pub files: Vec<DriveFile>,
    }

    impl FakeDrive {
        pub fn with_documents(n: usize) -> Self {
            let files = (1..=n)
                .map(|i| DriveFile { id: format!("id-{}", i), name: format!("Doc {}", i) })
                .collect();
            Self { files }
        }
    }

    #[async_trait]
    impl MetadataApi for FakeDrive {
        async fn list_files(&self, query: &str, page_size: u32, fields: &str) -> Result<Vec<DriveFile>> {
            assert_eq!(query, DOCUMENT_MIME_QUERY);
            assert_eq!(fields, LIST_FIELDS);
            Ok(self.files.iter().take(page_size as usize).cloned().collect())
        }
    }

    #[tokio::test]
    async fn test_list_documents_limits_and_keeps_order() {
        let drive = FakeDrive::with_documents(5);
        let docs = list_documents(&drive, 2).await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "id-1");
        assert_eq!(docs[1].name, "Doc 2");
        assert_eq!(docs[1].url, "https://docs.google.com/document/d/id-2/edit");
    }

    #[tokio::test]
    async fn test_list_documents_never_exceeds_max() {
        let drive = FakeDrive::with_documents(4);
        for n in 1..=6 {
            let docs = list_documents(&drive, n).await.unwrap();
            assert!(docs.len() <= n as usize);
            for doc in &docs {
                assert!(!doc.id.is_empty());
                assert_eq!(doc.url, document_url(&doc.id));
            }
        }
    }

    #[tokio::test]
    async fn test_list_documents_rejects_zero() {
        let drive = FakeDrive::with_documents(1);
        assert!(matches!(list_documents(&drive, 0).await, Err(Error::Tool(_))));
    }

    #[tokio::test]
    async fn test_list_documents_rejects_empty_id() {
        let drive = FakeDrive { files: vec![DriveFile { id: String::new(), name: "ghost".to_string() }] };
        assert!(matches!(list_documents(&drive, 5).await, Err(Error::RemoteApi { .. })));
    }

    #[tokio::test]
    async fn test_read_document_is_idempotent() {
        let docs = FakeDocs::with_document("d1", "Notes", "  Some text  ");
        let first = read_document(&docs, "d1").await.unwrap();
        let second = read_document(&docs, "d1").await.unwrap();
        assert_eq!(first, "Some text");
        assert_eq!(first, second);
        assert_eq!(docs.gets.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_read_missing_document_surfaces_error() {
        let docs = FakeDocs::default();
        let err = read_document(&docs, "bad-id").await.unwrap_err();
        assert_eq!(err.remote_status(), Some(404));
    }

    #[tokio::test]
    async fn test_create_then_read_round_trip() {
        let docs = FakeDocs::default();
        let content = "\n  Meeting notes\nAction items  \n";
        let created = create_document(&docs, "Weekly", content).await.unwrap();

        assert_eq!(created.title, "Weekly");
        assert_eq!(created.url, document_url(&created.document_id));

        let text = read_document(&docs, &created.document_id).await.unwrap();
        assert_eq!(text, content.trim());
    }

    #[tokio::test]
    async fn test_create_with_empty_content_skips_insert() {
        let docs = FakeDocs { fail_insert: true, ..FakeDocs::default() };
        let created = create_document(&docs, "Blank", "").await.unwrap();
        assert_eq!(read_document(&docs, &created.document_id).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_failed_insert_reports_partial_create() {
        let docs = FakeDocs { fail_insert: true, ..FakeDocs::default() };
        let err = create_document(&docs, "Orphan", "text").await.unwrap_err();

        match err {
            Error::PartialCreate { document_id, source } => {
                assert_eq!(document_id, "doc-1");
                assert_eq!(source.remote_status(), Some(500));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // The empty document is left in place
        assert_eq!(docs.count(), 1);
    }

    #[test]
    fn test_created_document_serializes_camel_case() {
        let created = CreatedDocument {
            document_id: "x".to_string(),
            title: "T".to_string(),
            url: document_url("x"),
        };
        assert_eq!(
            serde_json::to_value(&created).unwrap(),
            json!({"documentId": "x", "title": "T", "url": "https://docs.google.com/document/d/x/edit"})
        );
    }

    mod http_fixtures {
        use super::*;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};
        use crate::auth::{Credential, ValidCredential};
        use crate::google::{DocsClient, DriveClient};

        fn credential() -> ValidCredential {
            ValidCredential::new(Credential::new("tok".to_string(), None, Some(3600))).unwrap()
        }

        #[tokio::test]
        async fn test_list_two_of_five_in_fixture_order() {
            let server = MockServer::start().await;
            // Fixture ignores pageSize and returns everything
            Mock::given(method("GET"))
                .and(path("/files"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"files": [
                    {"id": "e", "name": "Echo"},
                    {"id": "a", "name": "Alpha"},
                    {"id": "c", "name": "Charlie"},
                    {"id": "b", "name": "Bravo"},
                    {"id": "d", "name": "Delta"}
                ]})))
                .mount(&server)
                .await;

            let drive = DriveClient::new(&credential()).with_base_url(&server.uri());
            let docs = list_documents(&drive, 2).await.unwrap();

            assert_eq!(docs, vec![
                DocumentRef { name: "Echo".to_string(), id: "e".to_string(), url: document_url("e") },
                DocumentRef { name: "Alpha".to_string(), id: "a".to_string(), url: document_url("a") },
            ]);
        }

        #[tokio::test]
        async fn test_read_bad_id_surfaces_remote_error() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/documents/bad-id"))
                .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                    "error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}
                })))
                .mount(&server)
                .await;

            let docs = DocsClient::new(&credential()).with_base_url(&server.uri());
            let err = read_document(&docs, "bad-id").await.unwrap_err();
            assert!(matches!(err, Error::RemoteApi { status: Some(404), .. }));
        }
    }
}
