use serde::{Deserialize, Serialize};

/// Maximum page size Reddit accepts on listing endpoints.
pub const MAX_PAGE_SIZE: u32 = 100;

// --- Search parameters ---

/// Listing sort accepted by `/r/{sub}/search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Relevance,
    Hot,
    Top,
    New,
    Comments,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Relevance => "relevance",
            SortOrder::Hot => "hot",
            SortOrder::Top => "top",
            SortOrder::New => "new",
            SortOrder::Comments => "comments",
        }
    }
}

/// Time window for search results (`t=` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Hour,
    Day,
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Hour => "hour",
            TimeFilter::Day => "day",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::Year => "year",
            TimeFilter::All => "all",
        }
    }
}

/// A subreddit-restricted search. `limit` is the total across all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    pub sort: SortOrder,
    pub time: TimeFilter,
    pub limit: u32,
}

impl SearchParams {
    /// Relevance-ranked, all-time search.
    pub fn all_time(query: &str, limit: u32) -> Self {
        Self {
            query: query.to_string(),
            sort: SortOrder::Relevance,
            time: TimeFilter::All,
            limit,
        }
    }

    /// Query-string pairs for one page, given the cursor and what is still wanted.
    pub(crate) fn page_query(&self, after: Option<&str>, remaining: u32) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("q", self.query.clone()),
            ("restrict_sr", "1".to_string()),
            ("sort", self.sort.as_str().to_string()),
            ("t", self.time.as_str().to_string()),
            ("limit", remaining.min(MAX_PAGE_SIZE).to_string()),
            ("raw_json", "1".to_string()),
        ];
        if let Some(after) = after {
            pairs.push(("after", after.to_string()));
        }
        pairs
    }
}

// --- OAuth ---

/// Response from `/api/v1/access_token`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub scope: Option<String>,
}

// --- Listings ---

/// Generic `{ kind, data }` envelope Reddit wraps every object in.
#[derive(Debug, Clone, Deserialize)]
pub struct Thing<T> {
    pub kind: String,
    pub data: T,
}

/// The `data` half of a `Listing` thing.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingData<T> {
    pub after: Option<String>,
    pub dist: Option<u32>,
    pub children: Vec<Thing<T>>,
}

pub type Listing<T> = Thing<ListingData<T>>;

/// A link/self post (`t3`).
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    /// Reddit reports "[deleted]" for removed accounts; absent on some mod removals.
    pub author: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: i64,
    /// Epoch seconds; Reddit serializes this as a float.
    pub created_utc: f64,
    #[serde(default)]
    pub url: String,
    /// Relative path, e.g. "/r/startups/comments/abc123/title/".
    #[serde(default)]
    pub permalink: String,
    pub subreddit: Option<String>,
}

impl Submission {
    /// Author, or `None` if the account is gone.
    pub fn author_name(&self) -> Option<&str> {
        match self.author.as_deref() {
            None | Some("") | Some("[deleted]") => None,
            Some(name) => Some(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"{
        "kind": "Listing",
        "data": {
            "after": "t3_1abcde",
            "dist": 2,
            "children": [
                {
                    "kind": "t3",
                    "data": {
                        "id": "1abcdd",
                        "title": "Is there a tool for invoice chasing?",
                        "selftext": "I spend hours every week on this.",
                        "author": "founder42",
                        "score": 118,
                        "num_comments": 37,
                        "created_utc": 1700000000.0,
                        "url": "https://www.reddit.com/r/smallbusiness/comments/1abcdd/",
                        "permalink": "/r/smallbusiness/comments/1abcdd/is_there_a_tool/",
                        "subreddit": "smallbusiness",
                        "over_18": false
                    }
                },
                {
                    "kind": "t3",
                    "data": {
                        "id": "1abcde",
                        "title": "Link post",
                        "author": "[deleted]",
                        "score": 3,
                        "num_comments": 0,
                        "created_utc": 1700000100,
                        "url": "https://example.com/article",
                        "permalink": "/r/smallbusiness/comments/1abcde/link_post/"
                    }
                }
            ]
        }
    }"#;

    #[test]
    fn parses_search_listing() {
        let listing: Listing<Submission> = serde_json::from_str(SEARCH_PAGE).unwrap();
        assert_eq!(listing.kind, "Listing");
        assert_eq!(listing.data.after.as_deref(), Some("t3_1abcde"));
        assert_eq!(listing.data.children.len(), 2);

        let first = &listing.data.children[0].data;
        assert_eq!(first.id, "1abcdd");
        assert_eq!(first.num_comments, 37);
        assert_eq!(first.author_name(), Some("founder42"));

        let second = &listing.data.children[1].data;
        assert_eq!(second.selftext, "");
        assert_eq!(second.author_name(), None);
        assert_eq!(second.created_utc, 1700000100.0);
    }

    #[test]
    fn page_query_caps_limit_and_carries_cursor() {
        let params = SearchParams::all_time("pain point", 250);
        let pairs = params.page_query(Some("t3_xyz"), 250);

        assert!(pairs.contains(&("q", "pain point".to_string())));
        assert!(pairs.contains(&("restrict_sr", "1".to_string())));
        assert!(pairs.contains(&("sort", "relevance".to_string())));
        assert!(pairs.contains(&("t", "all".to_string())));
        assert!(pairs.contains(&("limit", "100".to_string())));
        assert!(pairs.contains(&("after", "t3_xyz".to_string())));
    }

    #[test]
    fn first_page_has_no_cursor() {
        let params = SearchParams::all_time("app idea", 50);
        let pairs = params.page_query(None, 50);
        assert!(pairs.iter().all(|(k, _)| *k != "after"));
        assert!(pairs.contains(&("limit", "50".to_string())));
    }
}
