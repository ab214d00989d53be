//! In-memory stand-ins for the external services, with fault switches.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use lopdf::{dictionary, Document, Object, Stream};
use uuid::Uuid;

use crate::config::{Config, DEFAULT_MAX_UPLOAD_BYTES};
use crate::errors::AppError;
use crate::mailer::{EmailError, Mailer};
use crate::models::{
    EventRecord, NewEvent, NewNotification, NewSubmission, NotificationRecord, SubmissionRecord,
    User,
};
use crate::state::AppState;
use crate::storage::{object_url, ObjectStore, StoredObject};
use crate::store::DocumentStore;

pub const PUBLIC_URL: &str = "https://resumes.s3.us-east-1.amazonaws.com";

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    puts: AtomicUsize,
    deletes: AtomicUsize,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryObjectStore {
    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().unwrap().is_empty()
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, ct)| ct.clone())
    }

    pub fn insert_raw(&self, key: &str, body: &[u8]) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            (Bytes::copy_from_slice(body), "application/octet-stream".into()),
        );
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, AppError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(AppError::Storage("injected put failure".into()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(StoredObject {
            key: key.to_string(),
            url: object_url(PUBLIC_URL, key),
        })
    }

    async fn get(&self, key: &str) -> Result<Bytes, AppError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(body, _)| body.clone())
            .ok_or_else(|| AppError::Storage(format!("no object under {key}")))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Storage("injected delete failure".into()));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    submissions: Mutex<Vec<SubmissionRecord>>,
    events: Mutex<Vec<EventRecord>>,
    notifications: Mutex<Vec<NotificationRecord>>,
    users: Mutex<Vec<User>>,
    writes: AtomicUsize,
    fail_submission_inserts: AtomicBool,
    timeout_submission_inserts: AtomicBool,
    commit_then_timeout: AtomicBool,
    fail_notification_inserts: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn fail_submission_inserts(&self, fail: bool) {
        self.fail_submission_inserts.store(fail, Ordering::SeqCst);
    }

    /// Submission inserts time out without writing the row.
    pub fn timeout_submission_inserts(&self, on: bool) {
        self.timeout_submission_inserts.store(on, Ordering::SeqCst);
    }

    /// Submission inserts write the row, then report a timeout.
    pub fn commit_then_timeout(&self, on: bool) {
        self.commit_then_timeout.store(on, Ordering::SeqCst);
    }

    pub fn fail_notification_inserts(&self, fail: bool) {
        self.fail_notification_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Inserts and deletes that reached the store.
    pub fn write_calls(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn add_user(&self, email: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: None,
            created_at: Utc::now(),
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn notifications(&self) -> Vec<NotificationRecord> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<SubmissionRecord> {
        self.submissions.lock().unwrap().clone()
    }

    fn check_read(&self) -> Result<(), AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn wrote(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

fn remove_by<T>(rows: &Mutex<Vec<T>>, pred: impl Fn(&T) -> bool) -> bool {
    let mut rows = rows.lock().unwrap();
    let before = rows.len();
    rows.retain(|r| !pred(r));
    rows.len() != before
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert_submission(&self, new: NewSubmission) -> Result<SubmissionRecord, AppError> {
        self.wrote();
        if self.fail_submission_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        if self.timeout_submission_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Timeout("database"));
        }
        let record = SubmissionRecord {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            resume_url: new.resume_url,
            storage_key: new.storage_key,
            original_filename: new.original_filename,
            created_at: Utc::now(),
        };
        self.submissions.lock().unwrap().push(record.clone());
        if self.commit_then_timeout.load(Ordering::SeqCst) {
            return Err(AppError::Timeout("database"));
        }
        Ok(record)
    }

    async fn list_submissions(&self) -> Result<Vec<SubmissionRecord>, AppError> {
        self.check_read()?;
        Ok(self.submissions())
    }

    async fn find_submission(&self, id: Uuid) -> Result<Option<SubmissionRecord>, AppError> {
        self.check_read()?;
        Ok(self.submissions().into_iter().find(|s| s.id == id))
    }

    async fn find_submission_by_storage_key(
        &self,
        storage_key: &str,
    ) -> Result<Option<SubmissionRecord>, AppError> {
        self.check_read()?;
        Ok(self
            .submissions()
            .into_iter()
            .find(|s| s.storage_key == storage_key))
    }

    async fn delete_submission(&self, id: Uuid) -> Result<bool, AppError> {
        self.wrote();
        Ok(remove_by(&self.submissions, |s| s.id == id))
    }

    async fn insert_event(&self, new: NewEvent) -> Result<EventRecord, AppError> {
        self.wrote();
        let record = EventRecord {
            id: Uuid::new_v4(),
            title: new.title,
            date: new.date,
            location: new.location,
            description: new.description,
            owner_id: new.owner_id,
            created_at: Utc::now(),
        };
        self.events.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_events(&self) -> Result<Vec<EventRecord>, AppError> {
        self.check_read()?;
        Ok(self.events.lock().unwrap().clone())
    }

    async fn list_events_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, AppError> {
        self.check_read()?;
        let mut rows: Vec<_> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.date >= from && e.date < to)
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.date);
        Ok(rows)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<EventRecord>, AppError> {
        self.check_read()?;
        Ok(self.events.lock().unwrap().iter().find(|e| e.id == id).cloned())
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool, AppError> {
        self.wrote();
        Ok(remove_by(&self.events, |e| e.id == id))
    }

    async fn insert_notification(
        &self,
        new: NewNotification,
    ) -> Result<NotificationRecord, AppError> {
        self.wrote();
        if self.fail_notification_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        let record = NotificationRecord {
            id: Uuid::new_v4(),
            recipient_id: new.recipient_id,
            message: new.message,
            storage_key: new.storage_key,
            created_at: Utc::now(),
        };
        self.notifications.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_notifications(&self) -> Result<Vec<NotificationRecord>, AppError> {
        self.check_read()?;
        Ok(self.notifications())
    }

    async fn find_notification(&self, id: Uuid) -> Result<Option<NotificationRecord>, AppError> {
        self.check_read()?;
        Ok(self.notifications().into_iter().find(|n| n.id == id))
    }

    async fn delete_notification(&self, id: Uuid) -> Result<bool, AppError> {
        self.wrote();
        Ok(remove_by(&self.notifications, |n| n.id == id))
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.check_read()?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.check_read()?;
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
    attempts: AtomicUsize,
    fail: AtomicBool,
}

impl RecordingMailer {
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmailError::Send("injected mail failure".into()));
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Never answers; every send outlives any sensible timeout.
pub struct HangingMailer;

#[async_trait]
impl Mailer for HangingMailer {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), EmailError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/test".into(),
        s3_bucket: "resumes".into(),
        s3_region: "us-east-1".into(),
        s3_endpoint: None,
        s3_public_url: PUBLIC_URL.into(),
        aws_access_key_id: "test".into(),
        aws_secret_access_key: "test".into(),
        smtp: None,
        mail_from: "Resume Desk <no-reply@example.com>".into(),
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        io_timeout: Duration::from_secs(5),
        reminders_enabled: false,
        port: 0,
        rust_log: "debug".into(),
    }
}

/// Handles to the doubles behind a test `AppState`.
pub struct Harness {
    pub state: AppState,
    pub objects: Arc<MemoryObjectStore>,
    pub documents: Arc<MemoryDocumentStore>,
    pub mailer: Arc<RecordingMailer>,
}

pub fn harness() -> Harness {
    let objects = Arc::new(MemoryObjectStore::default());
    let documents = Arc::new(MemoryDocumentStore::default());
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(
        objects.clone(),
        documents.clone(),
        mailer.clone(),
        test_config(),
    );
    Harness {
        state,
        objects,
        documents,
        mailer,
    }
}

/// A small, valid one-page PDF.
pub fn sample_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let text = "BT /F1 12 Tf 72 720 Td (Jane Doe - Software Engineer) Tj ET\n".repeat(20);
    let content_id = doc.add_object(Stream::new(dictionary! {}, text.into_bytes()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("sample pdf serialises");
    out
}
