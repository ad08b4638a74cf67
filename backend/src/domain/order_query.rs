//! Predicate composition for order listings.
//!
//! [`build_list_query`] turns the caller's [`QueryFilter`] and optional
//! requester into an [`OrderListQuery`]: a list of [`OrderPredicate`]s that
//! storage adapters AND together, plus the page window. Adapters translate
//! each predicate into their own query language; [`OrderPredicate::matches`]
//! gives the reference semantics used by the in-memory adapter and tests.

use chrono::{DateTime, Utc};
use pagination::{PageRequest, PaginationError};
use serde_json::json;

use super::{Error, Order, OrderStatus, UserId};

/// Caller-supplied listing filter: optional search text plus page window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    /// Free text matched against the order's price and creation time.
    pub query: Option<String>,
    pub page: PageRequest,
}

/// Order columns that can take part in a text search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchColumn {
    /// `orders.price`
    Price,
    /// `orders.created_at`
    CreatedAt,
}

impl SearchColumn {
    /// Columns searched by the listing query text.
    pub const LISTING: [Self; 2] = [Self::Price, Self::CreatedAt];

    /// Text rendering of the column value, mirroring a PostgreSQL
    /// `CAST(column AS TEXT)`.
    pub fn render(self, order: &Order) -> String {
        match self {
            Self::Price => order.price.to_string(),
            Self::CreatedAt => render_timestamptz(order.created_at),
        }
    }
}

// Pooled sessions run with `TimeZone = UTC`, where PostgreSQL prints a
// timestamptz as `2024-03-01 09:30:00+00`, with a fractional part only when
// one is present.
fn render_timestamptz(value: DateTime<Utc>) -> String {
    format!("{}+00", value.format("%Y-%m-%d %H:%M:%S%.f"))
}

/// One conjunct of an order listing filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderPredicate {
    /// `orders.user_id = owner`
    OwnedBy(UserId),
    /// `orders.status` is one of the listed values.
    StatusIn(Vec<OrderStatus>),
    /// Any of `columns` matches `pattern` with `ILIKE` semantics.
    TextMatches {
        columns: Vec<SearchColumn>,
        pattern: String,
    },
}

impl OrderPredicate {
    /// Evaluate the predicate against an order.
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            Self::OwnedBy(owner) => order.user_id == *owner,
            Self::StatusIn(statuses) => statuses.contains(&order.status),
            Self::TextMatches { columns, pattern } => columns
                .iter()
                .any(|column| ilike(&column.render(order), pattern)),
        }
    }
}

/// Fully composed listing request handed to the repository port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderListQuery {
    /// Conjuncts; empty means every order.
    pub predicates: Vec<OrderPredicate>,
    pub limit: i64,
    pub offset: i64,
}

impl OrderListQuery {
    /// True when every predicate holds for `order`.
    pub fn matches(&self, order: &Order) -> bool {
        self.predicates.iter().all(|predicate| predicate.matches(order))
    }
}

/// Compose the listing query for `filter`, scoped to `requester` when given.
///
/// A requester only sees their own orders, and only once they have left the
/// pending state. Search text is wrapped as `%text%`; `%` and `_` typed by
/// the caller keep their wildcard meaning.
///
/// # Errors
///
/// Returns an [`Error::invalid_request`] when the page window overflows.
///
/// # Examples
/// ```
/// use orders_backend::domain::{build_list_query, QueryFilter};
///
/// let query = build_list_query(&QueryFilter::default(), None).expect("valid page");
/// assert!(query.predicates.is_empty());
/// assert_eq!((query.limit, query.offset), (10, 0));
/// ```
pub fn build_list_query(
    filter: &QueryFilter,
    requester: Option<&UserId>,
) -> Result<OrderListQuery, Error> {
    let mut predicates = Vec::new();

    if let Some(owner) = requester {
        predicates.push(OrderPredicate::OwnedBy(*owner));
        predicates.push(OrderPredicate::StatusIn(OrderStatus::OWNER_VISIBLE.to_vec()));
    }

    if let Some(text) = filter.query.as_deref().filter(|text| !text.is_empty()) {
        predicates.push(OrderPredicate::TextMatches {
            columns: SearchColumn::LISTING.to_vec(),
            pattern: format!("%{text}%"),
        });
    }

    let offset = filter.page.offset().map_err(pagination_error)?;

    Ok(OrderListQuery {
        predicates,
        limit: filter.page.limit,
        offset,
    })
}

fn pagination_error(error: PaginationError) -> Error {
    let PaginationError::OffsetOverflow { limit, page } = error;
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": "page",
        "limit": limit,
        "page": page,
        "code": "page_out_of_range",
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LikeToken {
    AnyRun,
    AnyChar,
    Literal(char),
}

// `None` when the pattern ends with a dangling escape, which PostgreSQL
// rejects outright.
fn like_tokens(pattern: &str) -> Option<Vec<LikeToken>> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => LikeToken::AnyRun,
            '_' => LikeToken::AnyChar,
            '\\' => LikeToken::Literal(chars.next()?),
            other => LikeToken::Literal(other),
        });
    }
    Some(tokens)
}

/// Case-insensitive SQL `LIKE`: `%` matches any run, `_` any single
/// character, and `\` makes the next character literal (PostgreSQL's
/// default escape). A pattern ending in a lone `\` matches nothing.
pub fn ilike(text: &str, pattern: &str) -> bool {
    let Some(tokens) = like_tokens(&pattern.to_lowercase()) else {
        return false;
    };
    let text: Vec<char> = text.to_lowercase().chars().collect();

    // Greedy wildcard matching with single-star backtracking.
    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        match tokens.get(p) {
            Some(LikeToken::AnyRun) => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(LikeToken::AnyChar) => {
                t += 1;
                p += 1;
            }
            Some(LikeToken::Literal(c)) if text.get(t) == Some(c) => {
                t += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((star_p, star_t)) => {
                    backtrack = Some((star_p, star_t + 1));
                    p = star_p + 1;
                    t = star_t + 1;
                }
                None => return false,
            },
        }
    }
    tokens
        .get(p..)
        .is_some_and(|rest| rest.iter().all(|token| *token == LikeToken::AnyRun))
}
