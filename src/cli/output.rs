use indexmap::IndexMap;
use serde::Serialize;

use crate::model::filter::{FilterDimension, FilterSpec};
use crate::model::project::Project;
use crate::model::report::{ClosedBuckets, LastWeekEntry, ReportDimension};
use crate::model::task::TaskStatus;
use crate::model::team::Team;
use crate::ops::dashboard::Dashboard;
use crate::ops::error::DeckError;
use crate::ops::group::TaskGroups;
use crate::ops::join::DisplayTask;
use crate::ops::report::ReportSet;
use crate::util::unicode::{column_width, fit_to_width};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskListJson<'a> {
    /// The filter as a shareable query string
    pub query: String,
    pub tasks: &'a [DisplayTask],
}

#[derive(Serialize)]
pub struct GroupJson<'a> {
    pub name: &'a str,
    pub tasks: &'a [DisplayTask],
}

#[derive(Serialize)]
pub struct DashboardJson<'a> {
    pub projects: &'a [Project],
    pub tasks: &'a [DisplayTask],
    pub counts: IndexMap<&'static str, usize>,
}

#[derive(Serialize)]
pub struct TeamJson<'a> {
    pub id: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub members: Vec<String>,
}

/// One report read: its value, or why it is missing
#[derive(Serialize)]
pub struct ReportJson<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct ReportsJson<'a> {
    pub last_week: ReportJson<&'a [LastWeekEntry]>,
    pub pending_days: ReportJson<u64>,
    pub closed_by_team: ReportJson<&'a ClosedBuckets>,
    pub closed_by_owner: ReportJson<&'a ClosedBuckets>,
    pub closed_by_project: ReportJson<&'a ClosedBuckets>,
}

#[derive(Serialize)]
pub struct LinkJson<'a> {
    pub query: String,
    pub filter: &'a FilterSpec,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn report_json<'a, T, U>(result: &'a Result<T, DeckError>, view: impl FnOnce(&'a T) -> U) -> ReportJson<U>
where
    U: Serialize,
{
    match result {
        Ok(v) => ReportJson {
            value: Some(view(v)),
            error: None,
        },
        Err(e) => ReportJson {
            value: None,
            error: Some(e.to_string()),
        },
    }
}

pub fn reports_to_json(set: &ReportSet) -> ReportsJson<'_> {
    ReportsJson {
        last_week: report_json(&set.last_week, |v| v.as_slice()),
        pending_days: report_json(&set.pending_days, |v| *v),
        closed_by_team: report_json(&set.closed_by_team, |v| v),
        closed_by_owner: report_json(&set.closed_by_owner, |v| v),
        closed_by_project: report_json(&set.closed_by_project, |v| v),
    }
}

pub fn groups_to_json(groups: &TaskGroups) -> Vec<GroupJson<'_>> {
    groups
        .iter()
        .map(|(name, tasks)| GroupJson {
            name,
            tasks: tasks.as_slice(),
        })
        .collect()
}

pub fn dashboard_to_json(dash: &Dashboard) -> DashboardJson<'_> {
    DashboardJson {
        projects: dash.projects(),
        tasks: &dash.tasks,
        counts: dash
            .status_counts()
            .into_iter()
            .map(|(s, n)| (s.label(), n))
            .collect(),
    }
}

pub fn team_to_json(team: &Team, members: Vec<String>) -> TeamJson<'_> {
    TeamJson {
        id: &team.id,
        name: &team.name,
        description: team.description.as_deref(),
        members,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

const MAX_NAME_CELLS: usize = 40;

fn status_char(status: TaskStatus) -> char {
    match status {
        TaskStatus::ToDo => ' ',
        TaskStatus::InProgress => '>',
        TaskStatus::Completed => 'x',
        TaskStatus::Blocked => '-',
    }
}

/// Format a single task as a one-line summary, the name padded to `name_cells`
pub fn format_task_line(task: &DisplayTask, name_cells: usize) -> String {
    let mut line = format!(
        "[{}] {} {:>3}d  {}",
        status_char(task.status),
        fit_to_width(&task.name, name_cells),
        task.time_to_complete,
        task.id
    );
    if !task.owners.is_empty() {
        line.push_str("  ");
        line.push_str(&task.owner_label());
    }
    line
}

fn name_cells<'a, I: IntoIterator<Item = &'a DisplayTask>>(tasks: I) -> usize {
    column_width(tasks.into_iter().map(|t| t.name.as_str()), 4, MAX_NAME_CELLS)
}

pub fn format_task_table(tasks: &[DisplayTask]) -> Vec<String> {
    if tasks.is_empty() {
        return vec!["(no tasks)".to_string()];
    }
    let width = name_cells(tasks);
    tasks.iter().map(|t| format_task_line(t, width)).collect()
}

/// Format grouped tasks, one header per group in group order
pub fn format_groups(groups: &TaskGroups) -> Vec<String> {
    if groups.is_empty() {
        return vec!["(no tasks)".to_string()];
    }
    let width = name_cells(groups.values().flatten());
    let mut lines = Vec::new();
    for (i, (name, tasks)) in groups.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format!("== {} ==", name));
        lines.extend(tasks.iter().map(|t| format_task_line(t, width)));
    }
    lines
}

/// Format detailed task view
pub fn format_task_detail(task: &DisplayTask) -> Vec<String> {
    let mut lines = vec![
        format!("[{}] {} ({})", status_char(task.status), task.name, task.id),
        format!("status: {}", task.status),
        format!("project: {}", task.project),
        format!("team: {}", task.team),
    ];
    if !task.owners.is_empty() {
        lines.push(format!("owners: {}", task.owner_label()));
    }
    if !task.tags.is_empty() {
        lines.push(format!("tags: {}", task.tag_label()));
    }
    if let Some(due) = task.due_date {
        lines.push(format!("due: {}", due.format("%Y-%m-%d %H:%M")));
    }
    let unit = if task.time_to_complete == 1 { "day" } else { "days" };
    lines.push(format!("remaining: {} {}", task.time_to_complete, unit));
    lines
}

pub fn format_dashboard(dash: &Dashboard) -> Vec<String> {
    let mut lines = vec!["== Projects ==".to_string()];
    if dash.projects().is_empty() {
        lines.push("(no projects)".to_string());
    }
    let width = column_width(dash.projects().iter().map(|p| p.name.as_str()), 4, MAX_NAME_CELLS);
    for p in dash.projects() {
        let mut line = fit_to_width(&p.name, width);
        if let Some(status) = &p.status {
            line.push_str("  ");
            line.push_str(status);
        }
        lines.push(line.trim_end().to_string());
    }
    lines.push(String::new());
    lines.push("== Tasks ==".to_string());
    lines.extend(format_task_table(&dash.tasks));
    let counts: Vec<String> = dash
        .status_counts()
        .into_iter()
        .map(|(s, n)| format!("{} {}", n, s.label().to_lowercase()))
        .collect();
    lines.push(String::new());
    lines.push(counts.join(", "));
    lines
}

pub fn format_teams(teams: &[Team]) -> Vec<String> {
    if teams.is_empty() {
        return vec!["(no teams)".to_string()];
    }
    let width = column_width(teams.iter().map(|t| t.name.as_str()), 4, MAX_NAME_CELLS);
    teams
        .iter()
        .map(|t| format!("{}  {}", fit_to_width(&t.name, width), t.id))
        .collect()
}

pub fn format_team_detail(team: &Team, members: &[String]) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", team.name, team.id)];
    if let Some(desc) = team.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(desc.to_string());
    }
    lines.push(String::new());
    lines.push("members:".to_string());
    if members.is_empty() {
        lines.push("  (none)".to_string());
    }
    lines.extend(members.iter().map(|m| format!("  {}", m)));
    lines
}

fn format_buckets(buckets: &ClosedBuckets) -> Vec<String> {
    if buckets.is_empty() {
        return vec!["  (none)".to_string()];
    }
    let width = column_width(buckets.keys().map(String::as_str), 4, MAX_NAME_CELLS);
    buckets
        .iter()
        .map(|(k, n)| format!("  {} {:>3}", fit_to_width(k, width), n))
        .collect()
}

/// Format the five reports. A failed read shows its error in place and the
/// others render normally.
pub fn format_reports(set: &ReportSet) -> Vec<String> {
    let mut lines = vec!["== Completed last week ==".to_string()];
    match &set.last_week {
        Ok(rows) if rows.is_empty() => lines.push("  (none)".to_string()),
        Ok(rows) => {
            let width = column_width(rows.iter().map(|r| r.name.as_str()), 4, MAX_NAME_CELLS);
            lines.extend(
                rows.iter()
                    .map(|r| format!("  {} {:>3}d", fit_to_width(&r.name, width), r.time_to_complete)),
            );
        }
        Err(e) => lines.push(format!("  unavailable: {}", e)),
    }

    lines.push(String::new());
    lines.push("== Pending ==".to_string());
    match &set.pending_days {
        Ok(days) => lines.push(format!("  {} days", days)),
        Err(e) => lines.push(format!("  unavailable: {}", e)),
    }

    for dimension in ReportDimension::ALL {
        lines.push(String::new());
        lines.push(format!("== Closed by {} ==", dimension));
        match set.closed(dimension) {
            Ok(buckets) => lines.extend(format_buckets(buckets)),
            Err(e) => lines.push(format!("  unavailable: {}", e)),
        }
    }
    lines
}

/// Format a decoded filter, one dimension per line
pub fn format_filter(spec: &FilterSpec) -> Vec<String> {
    if spec.is_unrestricted() {
        return vec!["(no filter)".to_string()];
    }
    let mut lines: Vec<String> = FilterDimension::ALL
        .iter()
        .filter_map(|&d| spec.get(d).map(|v| format!("{}: {}", d, v)))
        .collect();
    if let Some(sort) = spec.sort_by {
        lines.push(format!("sort: {}", sort.key()));
    }
    lines
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
