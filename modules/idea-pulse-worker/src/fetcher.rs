use std::time::Duration;

use tracing::{debug, error, info, warn};

use idea_pulse_common::{detect_pii, SearchRecord};

use crate::traits::{Clock, SearchSource};

/// Flat delay after each result, independent of success.
pub const RESULT_PACING: Duration = Duration::from_millis(100);

/// Search every community for `query` and return the redacted records.
///
/// A failing community is logged and skipped; the remaining communities are
/// still searched.
pub async fn fetch(
    source: &dyn SearchSource,
    clock: &dyn Clock,
    query: &str,
    communities: &[String],
    limit: u32,
) -> Vec<SearchRecord> {
    let mut records = Vec::new();

    for community in communities {
        info!(community = community.as_str(), query, "Fetching from r/{community}");

        let posts = match source.search(community, query, limit).await {
            Ok(posts) => posts,
            Err(e) => {
                error!(community = community.as_str(), query, error = %e, "Error fetching from r/{community}");
                continue;
            }
        };

        let found = posts.len();
        let mut with_pii = 0usize;
        for post in posts {
            if !detect_pii(&post.title).is_empty() || !detect_pii(&post.body).is_empty() {
                with_pii += 1;
            }
            match SearchRecord::from_raw(post, community) {
                Ok(record) => records.push(record),
                Err(e) => warn!(community = community.as_str(), error = %e, "Skipping search result"),
            }
            clock.sleep(RESULT_PACING).await;
        }

        debug!(community = community.as_str(), query, found, with_pii, "Community search done");
    }

    records
}
