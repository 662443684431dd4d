//! Access to the page the user is currently viewing.

use async_trait::async_trait;

use crate::error::NoActiveTab;

/// Reads the active browser tab.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrowserContextProvider: Send + Sync {
    /// URL of the active tab.
    async fn active_tab_url(&self) -> Result<String, NoActiveTab>;
}
