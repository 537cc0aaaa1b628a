//! Watch-page retrieval.

use std::time::Duration;

use crate::config::FetchConfig;
use crate::retry::{run_with_retry, FetchError, RetryPolicy};

const ACCEPT_LANGUAGE: &str = "Accept-Language: en-US,en;q=0.9";

/// Blocking page source. The engine runs it on the blocking pool.
pub trait PageFetcher: Send + Sync + 'static {
    fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// libcurl GET with redirects, timeouts and the retry policy.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    connect_timeout: Duration,
    timeout: Duration,
    user_agent: String,
    policy: RetryPolicy,
}

impl CurlFetcher {
    pub fn new(cfg: &FetchConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs.max(1)),
            timeout: Duration::from_secs(cfg.timeout_secs.max(1)),
            user_agent: cfg.user_agent.clone(),
            policy: cfg
                .retry
                .as_ref()
                .map(RetryPolicy::from_config)
                .unwrap_or_default(),
        }
    }

    fn get_once(&self, url: &str) -> Result<String, FetchError> {
        let mut body = Vec::new();
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(5)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        easy.useragent(&self.user_agent)?;
        easy.accept_encoding("")?;
        let mut headers = curl::easy::List::new();
        headers.append(ACCEPT_LANGUAGE)?;
        easy.http_headers(headers)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        if body.is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl PageFetcher for CurlFetcher {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        run_with_retry(&self.policy, || self.get_once(url))
    }
}
