use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{NewsfeedError, NewsfeedResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub id: Option<i64>,
    pub title: String,
    pub url: String,
}

impl Feed {
    pub fn new(title: String, url: String) -> Self {
        Self {
            id: None,
            title,
            url,
        }
    }

    /// Build a feed from user input, rejecting blank titles and non-web URLs.
    ///
    /// Both fields are trimmed before they are checked and stored.
    pub fn validated(title: &str, url: &str) -> NewsfeedResult<Self> {
        let title = title.trim();
        let url = url.trim();

        validate_title(title)?;
        validate_url(url)?;

        Ok(Self::new(title.to_string(), url.to_string()))
    }
}

fn validate_title(title: &str) -> NewsfeedResult<()> {
    if title.is_empty() {
        return Err(NewsfeedError::Validation(
            "Name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_url(url: &str) -> NewsfeedResult<()> {
    let parsed = Url::parse(url)
        .map_err(|e| NewsfeedError::Validation(format!("Invalid URL '{}': {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(NewsfeedError::Validation(format!(
                "Unsupported URL scheme '{}': expected http or https",
                other
            )))
        }
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(NewsfeedError::Validation(format!(
            "URL '{}' has no host",
            url
        )));
    }

    Ok(())
}
