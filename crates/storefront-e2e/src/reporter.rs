//! Reporter - journey steps, attachments and Allure output.
//!
//! A [`Reporter`] records a tree of named steps for one journey. Steps nest
//! by scope: [`Reporter::step`] opens a step, awaits the wrapped future and
//! closes the step with a status derived from its result. Attachments land in
//! the innermost open step.
//!
//! When the journey ends, the fixture turns the recorded tree into a
//! [`JourneyOutcome`], which can be written as an Allure result file plus one
//! file per attachment.

use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

use crate::result::{StorefrontError, StorefrontResult};

/// MIME type of browser screenshots
pub const PNG: &str = "image/png";

/// Step or journey status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Completed without error
    Passed,
    /// A journey assertion did not hold
    Failed,
    /// Any other error, or a panic
    Broken,
}

impl Status {
    /// Status for a finished operation
    #[must_use]
    pub fn of<T>(result: &StorefrontResult<T>) -> Self {
        match result {
            Ok(_) => Self::Passed,
            Err(e) => Self::of_error(e),
        }
    }

    /// Status for an error
    #[must_use]
    pub const fn of_error(error: &StorefrontError) -> Self {
        if error.is_assertion() {
            Self::Failed
        } else {
            Self::Broken
        }
    }

    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Binary artifact attached to a step
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    /// Display name
    pub name: String,
    /// File name inside the results directory
    pub source: String,
    /// MIME type
    #[serde(rename = "type")]
    pub mime: String,
    /// Raw content
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Attachment {
    fn new(name: &str, bytes: Vec<u8>, mime: &str) -> Self {
        let ext = match mime {
            PNG => "png",
            "text/plain" => "txt",
            "application/json" => "json",
            _ => "bin",
        };
        Self {
            name: name.to_string(),
            source: format!("{}-attachment.{ext}", Uuid::new_v4()),
            mime: mime.to_string(),
            bytes,
        }
    }
}

/// One recorded step
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    /// Step name
    pub name: String,
    /// Final status
    pub status: Status,
    /// Start time, epoch millis
    pub start: i64,
    /// Stop time, epoch millis
    pub stop: i64,
    /// Nested steps in order
    pub steps: Vec<StepRecord>,
    /// Attachments in order
    pub attachments: Vec<Attachment>,
}

impl StepRecord {
    fn open(name: &str) -> Self {
        let now = now_millis();
        Self {
            name: name.to_string(),
            status: Status::Passed,
            start: now,
            stop: now,
            steps: Vec::new(),
            attachments: Vec::new(),
        }
    }

    fn close(mut self, status: Status) -> Self {
        self.status = status;
        self.stop = now_millis();
        self
    }

    /// This step and its descendants, depth first
    pub fn walk(&self) -> Box<dyn Iterator<Item = &Self> + '_> {
        Box::new(std::iter::once(self).chain(self.steps.iter().flat_map(Self::walk)))
    }
}

#[derive(Debug, Default)]
struct ReporterState {
    steps: Vec<StepRecord>,
    attachments: Vec<Attachment>,
    open: Vec<StepRecord>,
}

impl ReporterState {
    fn push_closed(&mut self, step: StepRecord) {
        match self.open.last_mut() {
            Some(parent) => parent.steps.push(step),
            None => self.steps.push(step),
        }
    }
}

/// Step and attachment recorder for one journey.
///
/// Cloning shares the same recording.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    inner: Arc<Mutex<ReporterState>>,
}

impl Reporter {
    /// Create an empty reporter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ReporterState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `body` as a named step.
    ///
    /// The step is closed with [`Status::of`] the body's result, which is
    /// returned unchanged.
    pub async fn step<T, F>(&self, name: impl Into<String>, body: F) -> StorefrontResult<T>
    where
        F: Future<Output = StorefrontResult<T>>,
    {
        let name = name.into();
        debug!(step = %name, "step started");
        self.lock().open.push(StepRecord::open(&name));

        let result = body.await;
        let status = Status::of(&result);

        let mut state = self.lock();
        if let Some(step) = state.open.pop() {
            let step = step.close(status);
            state.push_closed(step);
        }
        debug!(step = %name, ?status, "step finished");
        result
    }

    /// Attach an artifact to the innermost open step
    pub fn attach(&self, name: &str, bytes: Vec<u8>, mime: &str) {
        let attachment = Attachment::new(name, bytes, mime);
        debug!(name, mime, source = %attachment.source, "attachment added");
        let mut state = self.lock();
        match state.open.last_mut() {
            Some(step) => step.attachments.push(attachment),
            None => state.attachments.push(attachment),
        }
    }

    /// Completed top-level steps
    #[must_use]
    pub fn steps(&self) -> Vec<StepRecord> {
        self.lock().steps.clone()
    }

    /// Names of every attachment recorded so far, in order
    #[must_use]
    pub fn attachment_names(&self) -> Vec<String> {
        let state = self.lock();
        let in_steps = state
            .steps
            .iter()
            .chain(state.open.iter())
            .flat_map(StepRecord::walk)
            .flat_map(|s| s.attachments.iter());
        state
            .attachments
            .iter()
            .chain(in_steps)
            .map(|a| a.name.clone())
            .collect()
    }

    /// Close any step left open by a panic as broken
    pub(crate) fn close_open(&self) {
        let mut state = self.lock();
        while let Some(step) = state.open.pop() {
            let step = step.close(Status::Broken);
            state.push_closed(step);
        }
    }

    /// Close open steps and take the recorded tree
    pub(crate) fn finish(&self) -> (Vec<StepRecord>, Vec<Attachment>) {
        self.close_open();
        let mut state = self.lock();
        (
            std::mem::take(&mut state.steps),
            std::mem::take(&mut state.attachments),
        )
    }
}

/// Final record of one journey
#[derive(Debug, Clone)]
pub struct JourneyOutcome {
    /// Result identifier
    pub uuid: Uuid,
    /// Journey name
    pub name: String,
    /// Feature label
    pub feature: String,
    /// Final status
    pub status: Status,
    /// Failure message
    pub message: Option<String>,
    /// Start time, epoch millis
    pub start: i64,
    /// Stop time, epoch millis
    pub stop: i64,
    /// Recorded steps
    pub steps: Vec<StepRecord>,
    /// Attachments recorded outside any step
    pub attachments: Vec<Attachment>,
}

impl JourneyOutcome {
    /// Check if the journey passed
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        self.status.is_passed()
    }

    /// Find a step anywhere in the tree
    #[must_use]
    pub fn find_step(&self, name: &str) -> Option<&StepRecord> {
        self.steps.iter().flat_map(StepRecord::walk).find(|s| s.name == name)
    }

    /// Every attachment in the tree, in order
    pub fn all_attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter().chain(
            self.steps
                .iter()
                .flat_map(StepRecord::walk)
                .flat_map(|s| s.attachments.iter()),
        )
    }

    /// Allure result document
    #[must_use]
    pub fn to_allure_json(&self) -> serde_json::Value {
        let status_details = self
            .message
            .as_ref()
            .map_or_else(|| serde_json::json!({}), |m| serde_json::json!({ "message": m }));
        serde_json::json!({
            "uuid": self.uuid.to_string(),
            "historyId": format!("{}.{}", self.feature, self.name),
            "name": self.name,
            "fullName": format!("{}: {}", self.feature, self.name),
            "status": self.status,
            "statusDetails": status_details,
            "stage": "finished",
            "start": self.start,
            "stop": self.stop,
            "labels": [
                { "name": "feature", "value": self.feature },
                { "name": "framework", "value": "storefront-e2e" },
            ],
            "steps": self.steps,
            "attachments": self.attachments,
        })
    }

    /// Write `{uuid}-result.json` and every attachment into `dir`
    pub fn write_allure(&self, dir: &Path) -> StorefrontResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        for attachment in self.all_attachments() {
            std::fs::write(dir.join(&attachment.source), &attachment.bytes)?;
        }
        let path = dir.join(format!("{}-result.json", self.uuid));
        std::fs::write(&path, serde_json::to_vec_pretty(&self.to_allure_json())?)?;
        debug!(path = %path.display(), "allure result written");
        Ok(path)
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(reporter: &Reporter, status: Status) -> JourneyOutcome {
        let (steps, attachments) = reporter.finish();
        JourneyOutcome {
            uuid: Uuid::new_v4(),
            name: "search_product".into(),
            feature: "Search".into(),
            status,
            message: None,
            start: 1,
            stop: 2,
            steps,
            attachments,
        }
    }

    mod status_tests {
        use super::*;

        #[test]
        fn test_status_of_result() {
            assert_eq!(Status::of(&Ok::<_, StorefrontError>(())), Status::Passed);
            assert_eq!(
                Status::of::<()>(&Err(StorefrontError::assertion("title mismatch"))),
                Status::Failed
            );
            assert_eq!(
                Status::of::<()>(&Err(StorefrontError::Timeout {
                    waited_for: "url".into(),
                    ms: 5
                })),
                Status::Broken
            );
        }

        #[test]
        fn test_status_serializes_lowercase() {
            assert_eq!(serde_json::to_string(&Status::Broken).unwrap(), "\"broken\"");
        }
    }

    mod step_tests {
        use super::*;

        #[tokio::test]
        async fn test_nested_steps() {
            let reporter = Reporter::new();
            let r = reporter.clone();
            let value = reporter
                .step("outer", async {
                    r.step("inner", async { Ok(7) }).await?;
                    r.attach("page_screenshot", vec![1, 2], PNG);
                    Ok(3)
                })
                .await
                .unwrap();
            assert_eq!(value, 3);

            let steps = reporter.steps();
            assert_eq!(steps.len(), 1);
            assert_eq!(steps[0].name, "outer");
            assert_eq!(steps[0].steps[0].name, "inner");
            assert_eq!(steps[0].attachments[0].name, "page_screenshot");
            assert!(steps[0].attachments[0].source.ends_with("-attachment.png"));
        }

        #[tokio::test]
        async fn test_failed_step_status() {
            let reporter = Reporter::new();
            let result: StorefrontResult<()> = reporter
                .step("check", async { Err(StorefrontError::assertion("no match")) })
                .await;
            assert!(result.is_err());
            assert_eq!(reporter.steps()[0].status, Status::Failed);
        }

        #[test]
        fn test_attachment_outside_step() {
            let reporter = Reporter::new();
            reporter.attach("note", b"hello".to_vec(), "text/plain");
            assert_eq!(reporter.attachment_names(), vec!["note".to_string()]);
        }

        #[test]
        fn test_finish_closes_open_steps_as_broken() {
            let reporter = Reporter::new();
            reporter.lock().open.push(StepRecord::open("interrupted"));
            let (steps, _) = reporter.finish();
            assert_eq!(steps.len(), 1);
            assert_eq!(steps[0].status, Status::Broken);
        }
    }

    mod allure_tests {
        use super::*;

        #[tokio::test]
        async fn test_allure_document() {
            let reporter = Reporter::new();
            let r = reporter.clone();
            reporter
                .step("Open page", async {
                    r.attach("page_screenshot", vec![0x89], PNG);
                    Ok(())
                })
                .await
                .unwrap();
            let outcome = outcome(&reporter, Status::Passed);
            let json = outcome.to_allure_json();

            assert_eq!(json["status"], "passed");
            assert_eq!(json["stage"], "finished");
            assert_eq!(json["labels"][0]["value"], "Search");
            assert_eq!(json["steps"][0]["name"], "Open page");
            assert_eq!(json["steps"][0]["attachments"][0]["type"], "image/png");
            assert!(json["steps"][0]["attachments"][0].get("bytes").is_none());
        }

        #[tokio::test]
        async fn test_write_allure_files() {
            let dir = tempfile::tempdir().unwrap();
            let reporter = Reporter::new();
            let r = reporter.clone();
            reporter
                .step("shot", async {
                    r.attach("page_screenshot", vec![0x89, b'P'], PNG);
                    Ok(())
                })
                .await
                .unwrap();
            let outcome = outcome(&reporter, Status::Passed);
            let path = outcome.write_allure(dir.path()).unwrap();

            assert!(path.ends_with(format!("{}-result.json", outcome.uuid)));
            let source = &outcome.all_attachments().next().unwrap().source;
            assert_eq!(std::fs::read(dir.path().join(source)).unwrap(), vec![0x89, b'P']);

            let written: serde_json::Value =
                serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
            assert_eq!(written["name"], "search_product");
        }

        #[test]
        fn test_find_step() {
            let reporter = Reporter::new();
            let outcome = outcome(&reporter, Status::Broken);
            assert!(outcome.find_step("missing").is_none());
            assert!(!outcome.is_passed());
        }
    }
}
