//! Builds the fixed single-hop adjacency query over `graph.hop`.
//!
//! Selector values always travel as server-side query parameters
//! (`{name:String}` placeholders). The row limit is the only value written into
//! the query text, and it can only come from a [`HopLimit`], which holds a
//! positive integer.

use std::fmt;

use thiserror::Error;

use super::models::HOP_COLUMNS;

pub const HOP_TABLE: &str = "graph.hop";

pub const DEFAULT_HOP_LIMIT: u64 = 50;

/// Picks which vertices the hop expansion starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HopSelector {
    /// Exact `v_id` match.
    ById(String),
    /// Exact `v_label_en` match.
    ByLabel(String),
    /// `v_label_en` contains the text.
    ByLabelLike(String),
    /// No filter.
    All,
}

impl HopSelector {
    /// Resolves optional request parameters into one selector.
    ///
    /// Precedence is id, then label, then label substring, then unfiltered.
    /// Empty strings are treated as absent.
    pub fn from_params(
        by_v_id: Option<&str>,
        by_v_label_en: Option<&str>,
        by_like_v_label_en: Option<&str>,
    ) -> Self {
        let present = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_string);

        if let Some(id) = present(by_v_id) {
            HopSelector::ById(id)
        } else if let Some(label) = present(by_v_label_en) {
            HopSelector::ByLabel(label)
        } else if let Some(text) = present(by_like_v_label_en) {
            HopSelector::ByLabelLike(text)
        } else {
            HopSelector::All
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("limit must be a positive integer, got '{0}'")]
pub struct InvalidLimit(pub String);

/// Positive row cap applied at the database (top-N, no paging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopLimit(u64);

impl HopLimit {
    pub fn new(value: i64) -> Result<Self, InvalidLimit> {
        if value > 0 {
            Ok(HopLimit(value as u64))
        } else {
            Err(InvalidLimit(value.to_string()))
        }
    }

    /// Parses a limit as it arrives from a query string.
    pub fn parse(raw: &str) -> Result<Self, InvalidLimit> {
        raw.trim()
            .parse::<i64>()
            .map_err(|_| InvalidLimit(raw.to_string()))
            .and_then(Self::new)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Default for HopLimit {
    fn default() -> Self {
        HopLimit(DEFAULT_HOP_LIMIT)
    }
}

impl fmt::Display for HopLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A value for the `{name:String}` placeholder of the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopParam {
    pub name: &'static str,
    pub value: String,
}

/// Query text plus its server-side parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopQuery {
    pub sql: String,
    pub params: Vec<HopParam>,
}

pub fn build_hop_query(selector: &HopSelector, limit: HopLimit) -> HopQuery {
    let (filter, params) = match selector {
        HopSelector::ById(id) => (
            " WHERE v_id = {v_id:String}",
            vec![HopParam {
                name: "v_id",
                value: id.clone(),
            }],
        ),
        HopSelector::ByLabel(label) => (
            " WHERE v_label_en = {v_label_en:String}",
            vec![HopParam {
                name: "v_label_en",
                value: label.clone(),
            }],
        ),
        HopSelector::ByLabelLike(text) => (
            " WHERE v_label_en LIKE {by_like_v_label_en:String}",
            vec![HopParam {
                name: "by_like_v_label_en",
                value: format!("%{}%", text),
            }],
        ),
        HopSelector::All => ("", Vec::new()),
    };

    let sql = format!(
        "SELECT {} FROM {}{} LIMIT {}",
        HOP_COLUMNS.join(", "),
        HOP_TABLE,
        filter,
        limit
    );

    HopQuery { sql, params }
}
