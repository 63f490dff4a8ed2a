//! Domain services.
//!
//! Handlers stay thin; document loads, mutations and vendor triggers
//! live here.

pub mod account;
pub mod application;
pub mod media_library;
pub mod profile;

pub use account::AccountService;
pub use application::{
    ApplicationService, BulkApplyOutcome, BulkApplyStatus, CurrentApplication, JobAdDetails,
    JobAdSummary, JobApplications,
};
pub use media_library::MediaLibrary;
pub use profile::ProfileService;

use std::collections::HashMap;

use tracing::warn;

use wlink_mailer::{MailTemplate, MailerClient};

use crate::metrics;

/// Fire a transactional mail without letting a vendor failure bleed
/// into the triggering request.
pub(crate) async fn notify(
    mailer: &MailerClient,
    template: MailTemplate,
    to: &str,
    variables: HashMap<String, String>,
) {
    match mailer.send(template, to, variables).await {
        Ok(()) => metrics::record_notification_sent(template.template_id()),
        Err(e) => warn!(
            template = template.template_id(),
            to, "Notification mail failed: {}", e
        ),
    }
}
