//! Publishing of posts to social-media destinations
//!
//! Each configured platform has a test and a production account. The bot
//! never talks to a platform directly: posts are either logged or handed to a
//! relay endpoint that owns the credentials.

use crate::config::{DestinationConfig, PublishingConfig};
use crate::error::{PvpcError, Result};
use crate::logging::{StructuredLogger, get_logger};
use std::path::PathBuf;
use std::sync::Arc;

/// Image attached to a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub path: PathBuf,
    pub alt_text: String,
}

/// Text plus an optional image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub text: String,
    pub image: Option<ImageAttachment>,
}

impl Post {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image<T: Into<String>, A: Into<String>>(text: T, path: PathBuf, alt_text: A) -> Self {
        Self {
            text: text.into(),
            image: Some(ImageAttachment {
                path,
                alt_text: alt_text.into(),
            }),
        }
    }
}

/// One publishing target
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    /// Platform name, used in logs and errors
    fn platform(&self) -> &str;

    /// Account the post goes to
    fn account(&self) -> &str;

    /// Publish and return a destination-specific receipt
    async fn publish(&self, post: &Post) -> Result<String>;
}

/// A platform paired with the account chosen for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub platform: String,
    pub account: String,
    pub webhook_url: Option<String>,
}

/// Destinations for a run; simulation selects the test accounts.
///
/// Platforms without an account for the selected mode are skipped.
pub fn destinations_for(cfg: &PublishingConfig, simulate: bool) -> Vec<Destination> {
    cfg.destinations
        .iter()
        .filter_map(|d| select_account(d, simulate))
        .collect()
}

fn select_account(d: &DestinationConfig, simulate: bool) -> Option<Destination> {
    let account = if simulate {
        d.test_account.as_ref()
    } else {
        d.production_account.as_ref()
    }?;
    if account.trim().is_empty() {
        return None;
    }
    Some(Destination {
        platform: d.platform.clone(),
        account: account.clone(),
        webhook_url: d.webhook_url.clone(),
    })
}

/// Build one publisher per destination
pub fn build_publishers(destinations: &[Destination]) -> Result<Vec<Arc<dyn Publisher>>> {
    let mut publishers: Vec<Arc<dyn Publisher>> = Vec::with_capacity(destinations.len());
    for d in destinations {
        match d.webhook_url.as_deref() {
            #[cfg(feature = "http")]
            Some(url) => publishers.push(Arc::new(WebhookPublisher::new(d.clone(), url)?)),
            #[cfg(not(feature = "http"))]
            Some(_) => {
                return Err(PvpcError::config(format!(
                    "destination {} needs the http feature for its webhook",
                    d.platform
                )));
            }
            None => publishers.push(Arc::new(LogPublisher::new(d.clone()))),
        }
    }
    Ok(publishers)
}

/// Truncate to at most `limit` characters (Unicode scalar values)
pub fn truncate_message(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Publisher that only writes the post to the log
pub struct LogPublisher {
    destination: Destination,
    logger: StructuredLogger,
}

impl LogPublisher {
    pub fn new(destination: Destination) -> Self {
        let logger = get_logger("publish");
        Self {
            destination,
            logger,
        }
    }
}

#[async_trait::async_trait]
impl Publisher for LogPublisher {
    fn platform(&self) -> &str {
        &self.destination.platform
    }

    fn account(&self) -> &str {
        &self.destination.account
    }

    async fn publish(&self, post: &Post) -> Result<String> {
        self.logger.info(&format!(
            "[{}:{}] {}",
            self.destination.platform,
            self.destination.account,
            post.text.replace('\n', " | ")
        ));
        if let Some(image) = &post.image {
            self.logger.info(&format!(
                "[{}:{}] image {} ({})",
                self.destination.platform,
                self.destination.account,
                image.path.display(),
                image.alt_text
            ));
        }
        Ok(format!(
            "logged for {}@{}",
            self.destination.account, self.destination.platform
        ))
    }
}

/// Publisher relaying posts as JSON to an HTTP endpoint
#[cfg(feature = "http")]
pub struct WebhookPublisher {
    destination: Destination,
    url: String,
    client: reqwest::Client,
    logger: StructuredLogger,
}

#[cfg(feature = "http")]
impl WebhookPublisher {
    pub fn new(destination: Destination, url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            destination,
            url: url.to_string(),
            client,
            logger: get_logger("webhook"),
        })
    }

    async fn body(&self, post: &Post) -> Result<serde_json::Value> {
        let image = match &post.image {
            Some(image) => {
                let content = tokio::fs::read_to_string(&image.path).await?;
                serde_json::json!({
                    "filename": image.path.file_name().map(|n| n.to_string_lossy().to_string()),
                    "alt_text": image.alt_text,
                    "content_type": "image/svg+xml",
                    "content": content,
                })
            }
            None => serde_json::Value::Null,
        };
        Ok(serde_json::json!({
            "platform": self.destination.platform,
            "account": self.destination.account,
            "text": post.text,
            "image": image,
        }))
    }
}

#[cfg(feature = "http")]
#[async_trait::async_trait]
impl Publisher for WebhookPublisher {
    fn platform(&self) -> &str {
        &self.destination.platform
    }

    fn account(&self) -> &str {
        &self.destination.account
    }

    async fn publish(&self, post: &Post) -> Result<String> {
        let body = self.body(post).await?;
        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PvpcError::publish(self.destination.platform.clone(), e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PvpcError::publish(
                self.destination.platform.clone(),
                format!("relay answered {}", status),
            ));
        }
        let receipt = match resp.text().await {
            Ok(text) => text,
            Err(e) => {
                self.logger.warn(&format!(
                    "Relay accepted post for {} but its reply could not be read: {}",
                    self.destination.platform, e
                ));
                String::new()
            }
        };
        self.logger.debug(&format!(
            "Relay accepted post for {}: {}",
            self.destination.platform, receipt
        ));
        Ok(receipt)
    }
}
