//! Cursor pagination shared by the in-memory and Postgres stores.
//!
//! A page starts at the cursor row itself (inclusive) and holds at most
//! `take` rows. Rows are ordered by the sort key, then by id, both in the
//! requested direction. An unknown cursor yields an empty page.

use async_graphql::Enum;
use std::cmp::Ordering;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// SQL ordering that matches `Option` ordering in Rust (None sorts low)
    pub fn sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC NULLS FIRST",
            Direction::Desc => "DESC NULLS LAST",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest<S> {
    pub take: i64,
    pub from: Option<Uuid>,
    pub sort: S,
    pub direction: Direction,
}

impl<S> PageRequest<S> {
    pub fn new(take: Option<i32>, from: Option<Uuid>, sort: S, direction: Direction) -> Self {
        let take = take
            .map(i64::from)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(0, MAX_PAGE_SIZE);

        Self {
            take,
            from,
            sort,
            direction,
        }
    }
}

impl<S: Default> Default for PageRequest<S> {
    fn default() -> Self {
        Self::new(None, None, S::default(), Direction::Asc)
    }
}

/// In-memory version of the paging query
pub fn paginate<T, S>(
    mut items: Vec<T>,
    page: &PageRequest<S>,
    compare: impl Fn(&T, &T) -> Ordering,
    id_of: impl Fn(&T) -> Uuid,
) -> Vec<T> {
    items.sort_by(|a, b| {
        let ordering = compare(a, b).then_with(|| id_of(a).cmp(&id_of(b)));
        match page.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    });

    let start = match page.from {
        None => 0,
        Some(cursor) => match items.iter().position(|item| id_of(item) == cursor) {
            Some(index) => index,
            None => return Vec::new(),
        },
    };

    items
        .into_iter()
        .skip(start)
        .take(page.take as usize)
        .collect()
}

/// Wraps a SELECT in the cursor/limit window.
///
/// `base` may use placeholders `$1..$n`; the cursor binds to `$n+1` and the
/// limit to `$n+2`, where `n = base_params`. `order_column` must be a
/// trusted column name.
pub fn paged_sql(base: &str, base_params: usize, order_column: &str, direction: Direction) -> String {
    let dir = direction.sql();
    let cursor = base_params + 1;
    let limit = base_params + 2;

    format!(
        "WITH ordered AS (\
            SELECT base.*, ROW_NUMBER() OVER (ORDER BY base.{order_column} {dir}, base.id {dir}) AS row_pos \
            FROM ({base}) AS base\
        ) \
        SELECT * FROM ordered \
        WHERE ${cursor}::uuid IS NULL OR row_pos >= (SELECT o.row_pos FROM ordered o WHERE o.id = ${cursor}) \
        ORDER BY row_pos \
        LIMIT ${limit}"
    )
}

/// `%query%` for ILIKE, with LIKE wildcards in the query escaped
pub fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Case-insensitive substring match used by the in-memory stores
pub fn matches_query(query: Option<&str>, fields: &[Option<&str>]) -> bool {
    match query.map(str::trim).filter(|q| !q.is_empty()) {
        None => true,
        Some(query) => {
            let needle = query.to_lowercase();
            fields
                .iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
        }
    }
}
