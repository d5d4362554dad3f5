use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// A foreign key as the service sends it: a bare id string or a populated
/// document (`{"_id": "...", "name": "..."}`), depending on the endpoint.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRef {
    Id(String),
    Doc {
        #[serde(rename = "_id")]
        id: String,
    },
}

impl RawRef {
    fn into_id(self) -> String {
        match self {
            RawRef::Id(id) | RawRef::Doc { id } => id,
        }
    }
}

/// Deserialize an optional single reference. Empty strings count as unset.
pub fn opt_ref<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawRef>::deserialize(de)?;
    Ok(raw.map(RawRef::into_id).filter(|id| !id.is_empty()))
}

/// Deserialize a list of references, keeping order. `null` is an empty list.
pub fn ref_list<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<RawRef>>::deserialize(de)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(RawRef::into_id)
        .collect())
}

/// Deserialize a list of plain strings where the service may send `null`.
pub fn string_list<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(de)?.unwrap_or_default())
}

/// Deserialize a day count where the service may send `null`, which counts as 0.
pub fn days_or_zero<'de, D>(de: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(de)?.unwrap_or_default())
}

/// Parse a due date in any of the shapes the service and its forms produce:
/// RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (treated as UTC), or a bare date.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Deserialize an optional timestamp. Unparseable values are dropped rather
/// than failing the whole record.
pub fn opt_timestamp<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub fn ser_opt_timestamp<S>(value: &Option<DateTime<Utc>>, ser: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(dt) => ser.serialize_some(&dt.to_rfc3339()),
        None => ser.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "opt_ref")]
        project: Option<String>,
        #[serde(default, deserialize_with = "ref_list")]
        owners: Vec<String>,
    }

    #[test]
    fn bare_and_populated_refs_normalise() {
        let p: Probe = serde_json::from_str(
            r#"{"project": {"_id": "p1", "name": "Apollo"}, "owners": ["u1", {"_id": "u2"}]}"#,
        )
        .unwrap();
        assert_eq!(p.project.as_deref(), Some("p1"));
        assert_eq!(p.owners, vec!["u1", "u2"]);
    }

    #[test]
    fn empty_and_null_refs_are_unset() {
        let p: Probe = serde_json::from_str(r#"{"project": "", "owners": null}"#).unwrap();
        assert_eq!(p.project, None);
        assert!(p.owners.is_empty());

        let p: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(p.project, None);
    }

    #[test]
    fn timestamp_shapes() {
        let a = parse_timestamp("2025-03-04T09:30:00.000Z").unwrap();
        assert_eq!((a.year(), a.month(), a.day(), a.hour()), (2025, 3, 4, 9));

        let b = parse_timestamp("2025-03-04T09:30").unwrap();
        assert_eq!(a, b);

        let c = parse_timestamp("2025-03-04").unwrap();
        assert_eq!(c.hour(), 0);

        assert!(parse_timestamp("next tuesday").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
