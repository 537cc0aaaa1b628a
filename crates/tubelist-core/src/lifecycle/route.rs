//! Target-page detection from the page location.

use url::Url;

const SUBSCRIPTIONS_PATH: &str = "/feed/subscriptions";

/// Where the page currently is, as far as activation is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The subscription feed. `signature` distinguishes two instances of it.
    Subscriptions { signature: String },
    Other,
}

impl Route {
    pub fn parse(location: &str) -> Self {
        let Ok(url) = Url::parse(location) else {
            return Route::Other;
        };
        if url.path().trim_end_matches('/') != SUBSCRIPTIONS_PATH {
            return Route::Other;
        }
        let mut signature = format!("{}{}", url.host_str().unwrap_or_default(), url.path());
        if let Some(q) = url.query() {
            signature.push('?');
            signature.push_str(q);
        }
        Route::Subscriptions { signature }
    }

    pub fn is_target(&self) -> bool {
        matches!(self, Route::Subscriptions { .. })
    }

    pub fn signature(&self) -> Option<&str> {
        match self {
            Route::Subscriptions { signature } => Some(signature),
            Route::Other => None,
        }
    }
}
