/// Subreddits where founders talk about ideas and problems.
pub const COMMUNITIES: &[&str] = &[
    "startups",
    "entrepreneur",
    "SaaS",
    "indiehackers",
    "business",
    "smallbusiness",
    "marketing",
    "productivity",
];

/// Search phrases that surface ideas and pain points.
pub const QUERIES: &[&str] = &[
    "startup idea",
    "business idea",
    "SaaS idea",
    "app idea",
    "pain point",
    "problem",
    "frustration",
    "challenge",
];

/// The (query × community) grid one job searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    pub queries: Vec<String>,
    pub communities: Vec<String>,
}

impl Targets {
    pub fn new(queries: &[&str], communities: &[&str]) -> Self {
        Self {
            queries: queries.iter().map(|q| q.to_string()).collect(),
            communities: communities.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn search_count(&self) -> usize {
        self.queries.len() * self.communities.len()
    }
}

impl Default for Targets {
    fn default() -> Self {
        Self::new(QUERIES, COMMUNITIES)
    }
}
