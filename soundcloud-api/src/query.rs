//! Query-parameter builders for the paginated search endpoints.

use std::collections::BTreeMap;

use crate::models::Filter;
use crate::models::License;
use crate::models::TrackType;

/// Query parameters sent with a search request.
pub type QueryMap = BTreeMap<String, String>;

pub const LIMIT: &str = "limit";
pub const OFFSET: &str = "offset";

/// Something that can be turned into search parameters.
pub trait Query {
    /// Returns `None` when no search criteria were set.
    fn create_map(&self) -> Option<QueryMap>;
}

/// Search criteria for the `tracks` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackQuery {
    query: Option<String>,
    tags: Option<String>,
    filter: Option<Filter>,
    license: Option<License>,
    bpm: (Option<u32>, Option<u32>),
    duration: (Option<u64>, Option<u64>),
    created_at: (Option<String>, Option<String>),
    ids: Option<String>,
    genres: Option<String>,
    types: Option<String>,
    limit: u32,
}

impl TrackQuery {
    pub fn builder() -> TrackQueryBuilder {
        TrackQueryBuilder {
            inner: TrackQuery {
                limit: Pager::LIMIT_DEFAULT,
                ..Default::default()
            },
        }
    }
}

impl Query for TrackQuery {
    fn create_map(&self) -> Option<QueryMap> {
        let mut map = QueryMap::new();

        let mut put = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                map.insert(key.to_string(), value);
            }
        };

        put("q", self.query.clone());
        put("tags", self.tags.clone());
        put("filter", self.filter.map(|f| f.as_str().to_string()));
        put("license", self.license.map(|l| l.as_str().to_string()));
        put("bpm[from]", self.bpm.0.map(|v| v.to_string()));
        put("bpm[to]", self.bpm.1.map(|v| v.to_string()));
        put("duration[from]", self.duration.0.map(|v| v.to_string()));
        put("duration[to]", self.duration.1.map(|v| v.to_string()));
        put("created_at[from]", self.created_at.0.clone());
        put("created_at[to]", self.created_at.1.clone());
        put("ids", self.ids.clone());
        put("genres", self.genres.clone());
        put("types", self.types.clone());

        if map.is_empty() {
            return None;
        }

        map.insert(LIMIT.to_string(), self.limit.to_string());
        Some(map)
    }
}

/// Builder for [`TrackQuery`].
#[derive(Debug, Clone)]
pub struct TrackQueryBuilder {
    inner: TrackQuery,
}

fn join<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl TrackQueryBuilder {
    /// Free-text search.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.inner.query = Some(query.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inner.tags = Some(join(tags));
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.inner.filter = Some(filter);
        self
    }

    pub fn license(mut self, license: License) -> Self {
        self.inner.license = Some(license);
        self
    }

    pub fn types<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = TrackType>,
    {
        self.inner.types = Some(join(types.into_iter().map(|t| t.as_str())));
        self
    }

    pub fn bpm(mut self, from: u32, to: u32) -> Self {
        self.inner.bpm = (Some(from), Some(to));
        self
    }

    /// Track length bounds, in milliseconds.
    pub fn duration(mut self, from: u64, to: u64) -> Self {
        self.inner.duration = (Some(from), Some(to));
        self
    }

    /// Creation date bounds formatted as `yyyy-mm-dd hh:mm:ss`.
    pub fn created_at(mut self, from: Option<String>, to: Option<String>) -> Self {
        self.inner.created_at = (from, to);
        self
    }

    pub fn ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inner.ids = Some(join(ids));
        self
    }

    pub fn genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inner.genres = Some(join(genres));
        self
    }

    /// Page size, clamped to `1..=LIMIT_MAX`.
    pub fn limit(mut self, limit: u32) -> Self {
        self.inner.limit = Pager::clamp_limit(limit);
        self
    }

    pub fn build(self) -> TrackQuery {
        self.inner
    }
}

/// Simple offset/limit pager over a query map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    map: QueryMap,
    limit: u32,
    offset: u32,
}

impl Pager {
    pub const LIMIT_DEFAULT: u32 = 50;
    pub const LIMIT_MAX: u32 = 200;

    pub fn new(query: &impl Query) -> Self {
        Self::with_page_size(query, Self::LIMIT_DEFAULT)
    }

    pub fn with_page_size(query: &impl Query, page_size: u32) -> Self {
        let mut pager = Self {
            map: query.create_map().unwrap_or_default(),
            limit: Self::LIMIT_DEFAULT,
            offset: 0,
        };
        pager.update_limit(page_size);
        pager.update_offset(0);
        pager
    }

    fn clamp_limit(limit: u32) -> u32 {
        limit.clamp(1, Self::LIMIT_MAX)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// The current parameters.
    pub fn map(&self) -> &QueryMap {
        &self.map
    }

    /// Advances one page and returns the updated parameters.
    pub fn next(&mut self) -> &QueryMap {
        self.update_offset(self.offset.saturating_add(self.limit));
        &self.map
    }

    /// Steps back one page, stopping at the first page.
    pub fn previous(&mut self) -> &QueryMap {
        self.update_offset(self.offset.saturating_sub(self.limit));
        &self.map
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.update_limit(page_size);
    }

    /// Jumps to `offset`; negative offsets return to the start.
    pub fn set_offset(&mut self, offset: i64) {
        let offset = u32::try_from(offset.max(0)).unwrap_or(u32::MAX);
        self.update_offset(offset);
    }

    pub fn reset(&mut self) {
        self.update_offset(0);
        self.update_limit(Self::LIMIT_DEFAULT);
    }

    pub fn return_to_start(&mut self) {
        self.update_offset(0);
    }

    fn update_limit(&mut self, limit: u32) {
        self.limit = Self::clamp_limit(limit);
        self.map.insert(LIMIT.to_string(), self.limit.to_string());
    }

    fn update_offset(&mut self, offset: u32) {
        self.offset = offset;
        self.map.insert(OFFSET.to_string(), offset.to_string());
    }
}
