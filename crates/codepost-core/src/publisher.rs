//! One publish attempt, from settings to notification.
//!
//! Order of operations:
//!
//! 1. load settings (disabled → [`PublishReport::Disabled`], unconfigured →
//!    [`PublishError::ConfigurationMissing`])
//! 2. read problem facts from the page
//! 3. extract the editor buffer (any failure aborts; nothing is sent)
//! 4. build the [`FactSheet`] and render the draft
//! 5. ask the confirmer (dismissed → [`PublishReport::Cancelled`])
//! 6. validate, upsert, notify

use std::sync::Arc;

use editor_bridge::CodeExtractor;
use repo_contents::OutcomeNotification;
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::confirm::{Confirmer, RequestDraft};
use crate::connector::ContentsConnector;
use crate::error::PublishError;
use crate::facts::FactSheet;
use crate::language::extension_for;
use crate::notify::{NotificationId, Notifier};
use crate::obs;
use crate::page::PageFactsProvider;
use crate::settings::{Credentials, Settings, SettingsStore};
use crate::template::{render, render_body};

/// How an attempt ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishReport {
    /// Publishing is switched off in settings
    Disabled,
    /// The user dismissed the draft
    Cancelled,
    /// A write was attempted; `outcome` says whether it landed
    Published {
        outcome: OutcomeNotification,
        notification: NotificationId,
    },
}

/// Render the draft shown for confirmation.
///
/// Path, filename and commit message never substitute `<CODE>`.
pub fn prepare_draft(settings: &Settings, credentials: &Credentials, facts: &FactSheet) -> RequestDraft {
    let filename = format!(
        "{}.{}",
        render(settings.file_template(), facts, false),
        extension_for(facts.language())
    );

    RequestDraft {
        repository: credentials.repository(),
        path: render(settings.path_template(), facts, false),
        filename,
        commit_message: render(settings.commit_template(), facts, false),
        content: render_body(settings.body_template(), facts),
    }
}

/// Collaborators of the publish pipeline.
pub struct Publisher {
    settings: Arc<dyn SettingsStore>,
    page: Arc<dyn PageFactsProvider>,
    extractor: Arc<dyn CodeExtractor>,
    connector: Arc<dyn ContentsConnector>,
    confirmer: Arc<dyn Confirmer>,
    notifier: Arc<dyn Notifier>,
}

impl Publisher {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        page: Arc<dyn PageFactsProvider>,
        extractor: Arc<dyn CodeExtractor>,
        connector: Arc<dyn ContentsConnector>,
        confirmer: Arc<dyn Confirmer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Publisher {
            settings,
            page,
            extractor,
            connector,
            confirmer,
            notifier,
        }
    }

    /// Run one attempt. Remote rejections and transport failures come back
    /// as a `Published` report with the matching outcome kind, not as errors.
    pub async fn publish(&self) -> Result<PublishReport, PublishError> {
        let attempt_id = Uuid::new_v4().to_string();
        self.attempt(&attempt_id)
            .instrument(obs::publish_span(&attempt_id))
            .await
    }

    async fn attempt(&self, attempt_id: &str) -> Result<PublishReport, PublishError> {
        let settings = self.settings.load().await?;
        if !settings.extension_enabled {
            debug!("publishing disabled in settings");
            return Ok(PublishReport::Disabled);
        }
        let credentials = settings.credentials()?;

        let problem = self
            .page
            .read_problem_facts()
            .await
            .map_err(|e| PublishError::Page(format!("{:#}", e)))?;
        obs::emit_publish_started(attempt_id, &problem.problem_no, &problem.language);

        let code = match self.extractor.extract_code().await {
            Ok(code) => code,
            Err(e) => {
                obs::emit_extraction_failed(attempt_id, &e);
                return Err(e.into());
            }
        };

        let facts = FactSheet::capture(&problem, code);
        let draft = prepare_draft(&settings, &credentials, &facts);
        let fallback_path = draft.path.clone();

        let Some(confirmed) = self.confirmer.confirm(draft).await else {
            obs::emit_publish_cancelled(attempt_id);
            return Ok(PublishReport::Cancelled);
        };

        let request = confirmed.into_request(&credentials.owner, &fallback_path)?;
        let client = self.connector.connect(&credentials.token)?;
        let outcome = client.upsert(request).await;

        obs::emit_publish_outcome(attempt_id, outcome.kind, &outcome.target_url);
        let notification = self.notifier.notify(&outcome);

        Ok(PublishReport::Published {
            outcome,
            notification,
        })
    }
}
