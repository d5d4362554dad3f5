use indexmap::IndexMap;
use url::form_urlencoded;

use crate::model::filter::{FilterDimension, FilterSpec, SortKey};
use crate::model::task::TaskStatus;

/// Flat string-keyed parameter set, in insertion order
pub type FilterParams = IndexMap<String, String>;

/// Key carrying the sort option
pub const SORT_KEY: &str = "sortBy";

/// Error for parameter sets that name a known key with an unusable value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("unknown status '{0}' in filter parameters")]
    UnknownStatus(String),
    #[error("unknown sort option '{0}' in filter parameters")]
    UnknownSort(String),
}

/// Encode a filter spec into parameters, in canonical key order.
pub fn encode(spec: &FilterSpec) -> FilterParams {
    let mut params = FilterParams::new();
    for dimension in FilterDimension::ALL {
        if let Some(value) = spec.get(dimension)
            && !value.is_empty()
        {
            params.insert(dimension.key().to_string(), value.to_string());
        }
    }
    if let Some(sort) = spec.sort_by {
        params.insert(SORT_KEY.to_string(), sort.key().to_string());
    }
    params
}

/// Decode parameters into a filter spec. `decode(&encode(f)) == Ok(f)` for
/// every spec.
///
/// Unknown keys are dropped and an empty value means the same as an absent
/// key. Ids are not checked against anything; a deleted project's id decodes
/// fine and shows as a placeholder after the join.
pub fn decode(params: &FilterParams) -> Result<FilterSpec, FilterError> {
    decode_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

/// Decode, falling back to the unrestricted filter on malformed input.
pub fn decode_or_default(params: &FilterParams) -> FilterSpec {
    decode(params).unwrap_or_else(|e| {
        tracing::warn!("{e}; showing all tasks");
        FilterSpec::default()
    })
}

/// Render parameters as an `application/x-www-form-urlencoded` query string.
pub fn to_query_string(params: &FilterParams) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish()
}

/// Parse a query string (with or without a leading `?`) into parameters.
/// The first occurrence of a repeated key wins.
pub fn parse_query_string(query: &str) -> FilterParams {
    let query = query.trim().trim_start_matches('?');
    let mut params = FilterParams::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    params
}

/// Shorthand for `to_query_string(&encode(spec))`
pub fn encode_query(spec: &FilterSpec) -> String {
    to_query_string(&encode(spec))
}

/// Shorthand for `decode(&parse_query_string(query))`
pub fn decode_query(query: &str) -> Result<FilterSpec, FilterError> {
    decode(&parse_query_string(query))
}

fn decode_pairs<'a>(
    pairs: impl Iterator<Item = (&'a str, &'a str)>,
) -> Result<FilterSpec, FilterError> {
    let mut spec = FilterSpec::default();
    let mut seen = Vec::new();
    for (key, value) in pairs {
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        if value.is_empty() {
            continue;
        }

        if key == SORT_KEY {
            let sort = SortKey::from_key(value)
                .ok_or_else(|| FilterError::UnknownSort(value.to_string()))?;
            spec.sort_by = Some(sort);
            continue;
        }

        match FilterDimension::from_key(key) {
            Some(FilterDimension::Status) => {
                let status = TaskStatus::from_label(value)
                    .ok_or_else(|| FilterError::UnknownStatus(value.to_string()))?;
                spec.status = Some(status);
            }
            Some(dimension) => spec.set(dimension, value),
            None => {}
        }
    }
    Ok(spec)
}
