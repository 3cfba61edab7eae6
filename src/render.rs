// Notification rendering: fills the HTML email template with the ranked
// itineraries.

use minijinja::{context, AutoEscape, Environment};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::ranker::Itinerary;

pub const ACTION_URL: &str = "https://your-flight-tracker.com/details";
pub const UNSUBSCRIBE_URL: &str = "https://your-flight-tracker.com/unsubscribe";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Email template {path} is unreadable: {source}")]
    TemplateUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Email template failed to render: {0}")]
    Template(#[from] minijinja::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub subject: String,
    pub html_body: String,
}

pub struct NotificationRenderer {
    template_path: PathBuf,
    action_url: String,
    unsubscribe_url: String,
}

impl NotificationRenderer {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            action_url: ACTION_URL.to_string(),
            unsubscribe_url: UNSUBSCRIBE_URL.to_string(),
        }
    }

    pub fn subject(count: usize, origin: &str, destination: &str) -> String {
        format!(
            "Top {} Cheapest Flights from {} to {}",
            count, origin, destination
        )
    }

    // Render the email for `itineraries`, cheapest first.
    // An empty list renders nothing and is not an error.
    pub fn render(
        &self,
        itineraries: &[Itinerary],
        origin: &str,
        destination: &str,
    ) -> Result<Option<Notification>, RenderError> {
        let Some(cheapest) = itineraries.first() else {
            info!("No flights available to send");
            return Ok(None);
        };

        let template = fs::read_to_string(&self.template_path).map_err(|source| {
            RenderError::TemplateUnreadable {
                path: self.template_path.clone(),
                source,
            }
        })?;

        let subject = Self::subject(itineraries.len(), origin, destination);

        // Every value is HTML-escaped unless the template marks it safe
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        let html_body = env.template_from_str(&template)?.render(context! {
            subject => &subject,
            cheapest_price => cheapest.price.to_string(),
            flights => itineraries,
            action_url => &self.action_url,
            unsubscribe_url => &self.unsubscribe_url,
        })?;

        Ok(Some(Notification { subject, html_body }))
    }
}
