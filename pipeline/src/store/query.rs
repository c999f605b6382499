//! The fixed detection query.
//!
//! Serialises to the store's query DSL:
//! `{"query":{"bool":{"must":[{"match":{..}},..]}},"size":N,"sort":[{"@timestamp":{"order":"desc"}}]}`

use serde::Serialize;
use shared::constants::{CONSOLE_LOGIN_RESULT_FIELD, EVENT_NAME_FIELD, TIMESTAMP_FIELD};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionQuery {
    query: QueryBody,
    size:  usize,
    sort:  Vec<BTreeMap<&'static str, SortClause>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct QueryBody {
    #[serde(rename = "bool")]
    boolean: BoolClause,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct BoolClause {
    must: Vec<MatchClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct MatchClause {
    #[serde(rename = "match")]
    field: BTreeMap<&'static str, &'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct SortClause {
    order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
enum SortOrder {
    Desc,
}

impl DetectionQuery {
    /// Successful console logins, newest first, at most `cap` hits.
    pub fn console_login_success(cap: usize) -> Self {
        let must = [
            (EVENT_NAME_FIELD, "ConsoleLogin"),
            (CONSOLE_LOGIN_RESULT_FIELD, "Success"),
        ]
        .into_iter()
        .map(|(k, v)| MatchClause { field: BTreeMap::from([(k, v)]) })
        .collect();

        DetectionQuery {
            query: QueryBody { boolean: BoolClause { must } },
            size:  cap,
            sort:  vec![BTreeMap::from([(TIMESTAMP_FIELD, SortClause { order: SortOrder::Desc })])],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}
