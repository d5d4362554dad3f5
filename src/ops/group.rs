use indexmap::IndexMap;

use crate::ops::join::DisplayTask;

/// Dimension to group a task list by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupDimension {
    #[default]
    Project,
    Team,
    Status,
}

impl GroupDimension {
    pub fn parse(s: &str) -> Result<GroupDimension, String> {
        match s {
            "project" => Ok(GroupDimension::Project),
            "team" => Ok(GroupDimension::Team),
            "status" => Ok(GroupDimension::Status),
            _ => Err(format!(
                "unknown grouping '{}' (expected: project, team, status)",
                s
            )),
        }
    }

    fn key(self, task: &DisplayTask) -> String {
        match self {
            GroupDimension::Project => task.project.clone(),
            GroupDimension::Team => task.team.clone(),
            GroupDimension::Status => task.status.label().to_string(),
        }
    }
}

pub type TaskGroups = IndexMap<String, Vec<DisplayTask>>;

/// Group tasks by `dimension`. Tasks whose project or team did not resolve
/// share the placeholder key.
///
/// Groups appear in the order their key is first seen and tasks keep their
/// input order within a group. Sorting is the server's job; nothing here
/// reorders.
pub fn group_by<I>(tasks: I, dimension: GroupDimension) -> TaskGroups
where
    I: IntoIterator<Item = DisplayTask>,
{
    let mut groups = TaskGroups::new();
    for task in tasks {
        groups.entry(dimension.key(&task)).or_default().push(task);
    }
    groups
}
