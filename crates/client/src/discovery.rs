// Attendee event discovery

use miseventos_core::{DiscoveryPage, Result};

use crate::client::Client;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

impl Client {
    /// Published events with their sessions, one page at a time
    pub async fn discover(&self, page: u32, limit: u32) -> Result<DiscoveryPage> {
        let page = page.max(1);
        let limit = if limit == 0 { DEFAULT_PAGE_SIZE } else { limit };
        let result: DiscoveryPage = self
            .get(&format!("/event/?page={}&limit={}", page, limit))
            .await?;
        tracing::debug!(
            page = result.page,
            total_pages = result.total_pages,
            events = result.events.len(),
            "Discovery page fetched"
        );
        Ok(result)
    }
}
