use std::fmt;

use serde::Serialize;

use super::task::TaskStatus;

/// A filterable dimension of the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterDimension {
    Project,
    Owner,
    Team,
    Tag,
    Status,
}

impl FilterDimension {
    /// Canonical encoding order
    pub const ALL: [FilterDimension; 5] = [
        FilterDimension::Project,
        FilterDimension::Owner,
        FilterDimension::Team,
        FilterDimension::Tag,
        FilterDimension::Status,
    ];

    /// Query parameter key. Note the tag dimension is plural on the wire.
    pub fn key(self) -> &'static str {
        match self {
            FilterDimension::Project => "project",
            FilterDimension::Owner => "owner",
            FilterDimension::Team => "team",
            FilterDimension::Tag => "tags",
            FilterDimension::Status => "status",
        }
    }

    pub fn from_key(key: &str) -> Option<FilterDimension> {
        FilterDimension::ALL.into_iter().find(|d| d.key() == key)
    }
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Server-side ordering applied to the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SortKey {
    /// Remaining time, ascending
    #[serde(rename = "timeToComplete")]
    TimeToComplete,
}

impl SortKey {
    pub fn key(self) -> &'static str {
        match self {
            SortKey::TimeToComplete => "timeToComplete",
        }
    }

    pub fn from_key(s: &str) -> Option<SortKey> {
        match s {
            "timeToComplete" => Some(SortKey::TimeToComplete),
            _ => None,
        }
    }
}

/// Which tasks a view shows: at most one value per dimension plus an
/// optional sort. `None` means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FilterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    /// Tag name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortKey>,
}

impl FilterSpec {
    /// True when no dimension is restricted and no sort is requested
    pub fn is_unrestricted(&self) -> bool {
        *self == FilterSpec::default()
    }

    /// The selected value for a dimension, in its wire form
    pub fn get(&self, dimension: FilterDimension) -> Option<&str> {
        match dimension {
            FilterDimension::Project => self.project.as_deref(),
            FilterDimension::Owner => self.owner.as_deref(),
            FilterDimension::Team => self.team.as_deref(),
            FilterDimension::Tag => self.tag.as_deref(),
            FilterDimension::Status => self.status.map(TaskStatus::label),
        }
    }

    /// Select a value for one dimension. An empty value clears it, as does a
    /// status label that is not recognised.
    pub fn set(&mut self, dimension: FilterDimension, value: &str) {
        let value = Some(value).filter(|v| !v.is_empty()).map(str::to_string);
        match dimension {
            FilterDimension::Project => self.project = value,
            FilterDimension::Owner => self.owner = value,
            FilterDimension::Team => self.team = value,
            FilterDimension::Tag => self.tag = value,
            FilterDimension::Status => {
                self.status = value.as_deref().and_then(TaskStatus::from_label)
            }
        }
    }

    /// Builder form of [`FilterSpec::set`]
    pub fn with(mut self, dimension: FilterDimension, value: &str) -> Self {
        self.set(dimension, value);
        self
    }

    pub fn with_status(mut self, status: Option<TaskStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn with_sort(mut self, sort_by: Option<SortKey>) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Clear every dimension and the sort
    pub fn reset(&mut self) {
        *self = FilterSpec::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_clear_dimension() {
        let mut f = FilterSpec::default().with(FilterDimension::Owner, "u1");
        assert_eq!(f.get(FilterDimension::Owner), Some("u1"));

        f.set(FilterDimension::Owner, "");
        assert_eq!(f.owner, None);
        assert!(f.is_unrestricted());
    }

    #[test]
    fn status_set_by_label() {
        let f = FilterSpec::default().with(FilterDimension::Status, "In Progress");
        assert_eq!(f.status, Some(TaskStatus::InProgress));
        assert_eq!(f.get(FilterDimension::Status), Some("In Progress"));
    }

    #[test]
    fn reset_clears_sort_too() {
        let mut f = FilterSpec::default()
            .with(FilterDimension::Tag, "urgent")
            .with_sort(Some(SortKey::TimeToComplete));
        f.reset();
        assert!(f.is_unrestricted());
    }

    #[test]
    fn tag_key_is_plural() {
        assert_eq!(FilterDimension::Tag.key(), "tags");
        assert_eq!(FilterDimension::from_key("tags"), Some(FilterDimension::Tag));
        assert_eq!(FilterDimension::from_key("tag"), None);
    }
}
