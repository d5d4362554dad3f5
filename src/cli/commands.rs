use clap::{Args, Parser, Subcommand};

use crate::model::filter::{FilterSpec, SortKey};
use crate::model::task::TaskStatus;
use crate::ops::group::GroupDimension;

#[derive(Parser)]
#[command(name = "td", about = concat!("taskdeck v", env!("CARGO_PKG_VERSION"), " - team tasks from the terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login(LoginArgs),
    /// Create an account
    Signup(SignupArgs),
    /// Forget the stored session
    Logout,
    /// Show projects and tasks
    Dashboard,
    /// List tasks matching a filter
    Tasks(TasksArgs),
    /// List tasks grouped by project
    Projects(ProjectsArgs),
    /// Show, add, update, complete or delete a task
    Task(TaskCmd),
    /// Create a project
    Project(ProjectCmd),
    /// List teams
    Teams,
    /// Show or create a team
    Team(TeamCmd),
    /// Show completion reports
    Reports(ReportsArgs),
    /// Encode a filter as a shareable query string, or decode one
    Link(LinkArgs),
    /// View or edit configuration
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Session args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Args)]
pub struct SignupArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

// ---------------------------------------------------------------------------
// Filter args
// ---------------------------------------------------------------------------

/// Flags shared by every command that takes a task filter
#[derive(Args, Clone, Default)]
pub struct FilterArgs {
    /// Restrict to a project id
    #[arg(long)]
    pub project: Option<String>,
    /// Restrict to an owner (user id)
    #[arg(long)]
    pub owner: Option<String>,
    /// Restrict to a team id
    #[arg(long)]
    pub team: Option<String>,
    /// Restrict to a tag name
    #[arg(long)]
    pub tag: Option<String>,
    /// Restrict to a status (todo, in-progress, completed, blocked)
    #[arg(long, value_parser = TaskStatus::parse_label)]
    pub status: Option<TaskStatus>,
    /// Server-side ordering (time)
    #[arg(long, value_parser = parse_sort_key)]
    pub sort: Option<SortKey>,
}

impl FilterArgs {
    pub fn to_spec(&self) -> FilterSpec {
        FilterSpec {
            project: non_empty(&self.project),
            owner: non_empty(&self.owner),
            team: non_empty(&self.team),
            tag: non_empty(&self.tag),
            status: self.status,
            sort_by: self.sort,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse a sort key: the wire name or `time`
pub fn parse_sort_key(s: &str) -> Result<SortKey, String> {
    match s {
        "time" => Ok(SortKey::TimeToComplete),
        _ => SortKey::from_key(s)
            .ok_or_else(|| format!("unknown sort key '{}' (expected: time)", s)),
    }
}

#[derive(Args)]
pub struct TasksArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Use a saved query string instead of the filter flags
    #[arg(long, conflicts_with_all = ["project", "owner", "team", "tag", "status", "sort"])]
    pub query: Option<String>,
}

#[derive(Args)]
pub struct ProjectsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Group by project, team or status
    #[arg(long, default_value = "project", value_parser = GroupDimension::parse)]
    pub group_by: GroupDimension,
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TaskCmd {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Show task details
    Show(TaskIdArg),
    /// Create a task
    Add(TaskAddArgs),
    /// Change fields of a task
    Update(TaskUpdateArgs),
    /// Mark a task completed
    Done(TaskIdArg),
    /// Delete a task
    Delete(TaskIdArg),
}

#[derive(Args)]
pub struct TaskIdArg {
    pub id: String,
}

#[derive(Args)]
pub struct TaskAddArgs {
    /// Task name
    pub name: String,
    /// Project id
    #[arg(long)]
    pub project: String,
    /// Team id
    #[arg(long)]
    pub team: String,
    /// Estimated days to complete (at least 1)
    #[arg(long)]
    pub days: u32,
    /// Due date (YYYY-MM-DD), used together with --due-time
    #[arg(long, requires = "due_time")]
    pub due_date: Option<String>,
    /// Due time (HH:MM), used together with --due-date
    #[arg(long, requires = "due_date")]
    pub due_time: Option<String>,
}

#[derive(Args)]
pub struct TaskUpdateArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub project: Option<String>,
    #[arg(long)]
    pub team: Option<String>,
    /// Owner user id (repeatable; replaces the current owners)
    #[arg(long = "owner")]
    pub owners: Vec<String>,
    /// Tag name (repeatable; replaces the current tags)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    #[arg(long, value_parser = TaskStatus::parse_label)]
    pub status: Option<TaskStatus>,
    /// Remaining days
    #[arg(long)]
    pub days: Option<u32>,
    #[arg(long, requires = "due_time")]
    pub due_date: Option<String>,
    #[arg(long, requires = "due_date")]
    pub due_time: Option<String>,
}

// ---------------------------------------------------------------------------
// Project and team args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a project
    Add(ProjectAddArgs),
}

#[derive(Args)]
pub struct ProjectAddArgs {
    pub name: String,
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Args)]
pub struct TeamCmd {
    #[command(subcommand)]
    pub action: TeamAction,
}

#[derive(Subcommand)]
pub enum TeamAction {
    /// Show a team and the owners of its tasks
    Show(TeamShowArgs),
    /// Create a team
    Add(TeamAddArgs),
}

#[derive(Args)]
pub struct TeamShowArgs {
    /// Team id or name
    pub team: String,
}

#[derive(Args)]
pub struct TeamAddArgs {
    pub name: String,
    /// Defaults to "Team for <name>"
    #[arg(long)]
    pub description: Option<String>,
    /// Member name (repeatable)
    #[arg(long = "member")]
    pub members: Vec<String>,
}

// ---------------------------------------------------------------------------
// Reports, links, config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ReportsArgs {
    /// Compute from the task list instead of the report endpoints
    #[arg(long)]
    pub local: bool,
}

#[derive(Args)]
pub struct LinkArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Decode a query string into its filter
    #[arg(long, conflicts_with_all = ["project", "owner", "team", "tag", "status", "sort"])]
    pub decode: Option<String>,
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Set a key (api.base_url, api.timeout_secs, api.user_agent, report.window_days)
    Set(ConfigSetArgs),
}

#[derive(Args)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}
