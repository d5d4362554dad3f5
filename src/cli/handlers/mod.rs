use std::error::Error;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::api::TaskApi;
use crate::io::config_io::{self, ConfigError};
use crate::io::http::HttpApi;
use crate::io::{paths, session_io};
use crate::model::config::ClientConfig;
use crate::model::filter::FilterSpec;
use crate::model::project::NewProject;
use crate::model::session::Session;
use crate::model::task::TaskDraft;
use crate::model::team::NewTeam;
use crate::ops::cache::CacheSnapshot;
use crate::ops::error::DeckError;
use crate::ops::query::QueryResolver;
use crate::ops::report::{ApiReportSource, LocalReportSource, ReportSource, collect_reports};
use crate::ops::task_ops::{self, TaskEdit};
use crate::ops::{dashboard, filter_codec, group, join, team_ops};

type CmdResult = Result<(), Box<dyn Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub async fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;

    match cli.command {
        // Session
        Commands::Login(args) => cmd_login(args).await,
        Commands::Signup(args) => cmd_signup(args).await,
        Commands::Logout => cmd_logout(),

        // Read commands
        Commands::Dashboard => cmd_dashboard(json).await,
        Commands::Tasks(args) => cmd_tasks(args, json).await,
        Commands::Projects(args) => cmd_projects(args, json).await,
        Commands::Teams => cmd_teams(json).await,
        Commands::Reports(args) => cmd_reports(args, json).await,

        // Task, project and team commands
        Commands::Task(cmd) => match cmd.action {
            TaskAction::Show(args) => cmd_task_show(args, json).await,
            TaskAction::Add(args) => cmd_task_add(args, json).await,
            TaskAction::Update(args) => cmd_task_update(args, json).await,
            TaskAction::Done(args) => cmd_task_done(args, json).await,
            TaskAction::Delete(args) => cmd_task_delete(args).await,
        },
        Commands::Project(cmd) => match cmd.action {
            ProjectAction::Add(args) => cmd_project_add(args, json).await,
        },
        Commands::Team(cmd) => match cmd.action {
            TeamAction::Show(args) => cmd_team_show(args, json).await,
            TeamAction::Add(args) => cmd_team_add(args, json).await,
        },

        // Offline
        Commands::Link(args) => cmd_link(args, json),
        Commands::Config(cmd) => match cmd.action {
            ConfigAction::Show => cmd_config_show(json),
            ConfigAction::Set(args) => cmd_config_set(args),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config() -> Result<ClientConfig, ConfigError> {
    config_io::load_config(&paths::config_path())
}

/// Build the HTTP client from the config file and the stored session
fn connect() -> Result<(HttpApi, ClientConfig), Box<dyn Error>> {
    let config = load_config()?;
    let session = session_io::read_session(&paths::session_path());
    if !session.is_authenticated() {
        tracing::debug!("no stored session; requests are unauthenticated");
    }
    let api = HttpApi::new(&config.api, session)?;
    Ok((api, config))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Refresh tasks and reference data side by side. A task failure is fatal;
/// missing reference data only degrades names to placeholders.
async fn load_view(
    resolver: &mut QueryResolver,
    api: &dyn TaskApi,
    filter: &FilterSpec,
) -> Result<Arc<CacheSnapshot>, DeckError> {
    let (tasks, references) = resolver.refresh_view(api, filter).await;
    tasks?;
    if let Err(e) = references {
        eprintln!("warning: {}; names shown as placeholders", e);
    }
    Ok(resolver.snapshot())
}

/// Resolve the filter for a listing: a saved query string if given,
/// otherwise the flags. A malformed query falls back to no filter.
fn filter_from(args: &FilterArgs, query: Option<&str>) -> FilterSpec {
    match query {
        Some(q) => filter_codec::decode_or_default(&filter_codec::parse_query_string(q)),
        None => args.to_spec(),
    }
}

fn print_link(filter: &FilterSpec) {
    let query = filter_codec::encode_query(filter);
    if !query.is_empty() {
        println!();
        println!("link: ?{}", query);
    }
}

// ---------------------------------------------------------------------------
// Session commands
// ---------------------------------------------------------------------------

async fn cmd_login(args: LoginArgs) -> CmdResult {
    let config = load_config()?;
    let api = HttpApi::new(&config.api, Session::anonymous())?;
    let session = api.login(&args.email, &args.password).await?;
    session_io::write_session(&paths::session_path(), &session)?;
    let who = session
        .name
        .as_deref()
        .or(session.email.as_deref())
        .unwrap_or(&args.email);
    println!("Signed in as {}", who);
    Ok(())
}

async fn cmd_signup(args: SignupArgs) -> CmdResult {
    let config = load_config()?;
    let api = HttpApi::new(&config.api, Session::anonymous())?;
    api.signup(&args.name, &args.email, &args.password).await?;
    println!("Account created for {}. Run `td login` to sign in.", args.email);
    Ok(())
}

fn cmd_logout() -> CmdResult {
    if session_io::clear_session(&paths::session_path())? {
        println!("Signed out");
    } else {
        println!("Not signed in");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

async fn cmd_dashboard(json: bool) -> CmdResult {
    let (api, _) = connect()?;
    let mut resolver = QueryResolver::new();
    let dash = dashboard::load(&mut resolver, &api, &FilterSpec::default()).await?;
    if json {
        print_json(&dashboard_to_json(&dash))
    } else {
        print_lines(&format_dashboard(&dash));
        Ok(())
    }
}

async fn cmd_tasks(args: TasksArgs, json: bool) -> CmdResult {
    let filter = filter_from(&args.filter, args.query.as_deref());
    let (api, _) = connect()?;
    let mut resolver = QueryResolver::new();
    let snapshot = load_view(&mut resolver, &api, &filter).await?;
    let tasks = join::resolve_all(&snapshot.tasks, &snapshot.references);

    if json {
        print_json(&TaskListJson {
            query: filter_codec::encode_query(&snapshot.filter),
            tasks: &tasks,
        })
    } else {
        print_lines(&format_task_table(&tasks));
        print_link(&snapshot.filter);
        Ok(())
    }
}

async fn cmd_projects(args: ProjectsArgs, json: bool) -> CmdResult {
    let filter = args.filter.to_spec();
    let (api, _) = connect()?;
    let mut resolver = QueryResolver::new();
    let snapshot = load_view(&mut resolver, &api, &filter).await?;
    let groups = group::group_by(
        join::resolve_all(&snapshot.tasks, &snapshot.references),
        args.group_by,
    );

    if json {
        print_json(&groups_to_json(&groups))
    } else {
        print_lines(&format_groups(&groups));
        Ok(())
    }
}

async fn cmd_teams(json: bool) -> CmdResult {
    let (api, _) = connect()?;
    let mut resolver = QueryResolver::new();
    resolver.refresh_references(&api).await?;
    let snapshot = resolver.snapshot();
    let teams = &snapshot.references.teams;
    if json {
        print_json(teams)
    } else {
        print_lines(&format_teams(teams));
        Ok(())
    }
}

async fn cmd_reports(args: ReportsArgs, json: bool) -> CmdResult {
    let (api, config) = connect()?;
    let set = if args.local {
        let mut resolver = QueryResolver::new();
        let snapshot = load_view(&mut resolver, &api, &FilterSpec::default()).await?;
        let source = LocalReportSource::new(snapshot, Utc::now(), config.report.window_days);
        collect_reports(&source as &dyn ReportSource).await
    } else {
        let source = ApiReportSource::new(&api);
        collect_reports(&source as &dyn ReportSource).await
    };

    if json {
        print_json(&reports_to_json(&set))?;
    } else {
        print_lines(&format_reports(&set));
    }
    if set.failures().len() == 5 {
        return Err("no reports available".into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

async fn cmd_task_show(args: TaskIdArg, json: bool) -> CmdResult {
    let (api, _) = connect()?;
    let mut resolver = QueryResolver::new();
    let snapshot = load_view(&mut resolver, &api, &FilterSpec::default()).await?;
    let task = task_ops::find_task(&snapshot, &args.id)?;
    let display = join::resolve(task, &snapshot.references);
    if json {
        print_json(&display)
    } else {
        print_lines(&format_task_detail(&display));
        Ok(())
    }
}

async fn cmd_task_add(args: TaskAddArgs, json: bool) -> CmdResult {
    let draft = TaskDraft::new(&args.name, &args.project, &args.team, args.days)?
        .with_due(args.due_date.as_deref(), args.due_time.as_deref())?;
    let (api, _) = connect()?;
    let task = task_ops::create_task(&api, &draft).await?;
    if json {
        print_json(&task)
    } else {
        println!("Created task {}: {}", task.id, task.name);
        Ok(())
    }
}

async fn cmd_task_update(args: TaskUpdateArgs, json: bool) -> CmdResult {
    let edit = TaskEdit {
        name: args.name,
        project: args.project,
        team: args.team,
        owners: Some(args.owners).filter(|o| !o.is_empty()),
        tags: Some(args.tags).filter(|t| !t.is_empty()),
        status: args.status,
        time_to_complete: args.days,
        due: args.due_date.zip(args.due_time),
    };
    if edit.is_empty() {
        return Err("nothing to update (pass at least one field flag)".into());
    }
    edit.check().map_err(DeckError::from)?;

    let (api, _) = connect()?;
    let mut resolver = QueryResolver::new();
    resolver.refresh_tasks(&api, &FilterSpec::default()).await?;
    let snapshot = resolver.snapshot();
    let current = task_ops::find_task(&snapshot, &args.id)?;
    let draft = edit.apply(current).map_err(DeckError::from)?;
    let task = task_ops::update_task(&api, &args.id, &draft).await?;
    if json {
        print_json(&task)
    } else {
        println!("Updated task {}: {}", task.id, task.name);
        Ok(())
    }
}

async fn cmd_task_done(args: TaskIdArg, json: bool) -> CmdResult {
    let (api, _) = connect()?;
    let mut resolver = QueryResolver::new();
    resolver.refresh_tasks(&api, &FilterSpec::default()).await?;
    let snapshot = resolver.snapshot();
    let current = task_ops::find_task(&snapshot, &args.id)?;
    let task = task_ops::mark_complete(&api, current).await?;
    if json {
        print_json(&task)
    } else {
        println!("Completed task {}: {}", task.id, task.name);
        Ok(())
    }
}

async fn cmd_task_delete(args: TaskIdArg) -> CmdResult {
    let (api, _) = connect()?;
    task_ops::delete_task(&api, &args.id).await?;
    println!("Deleted task {}", args.id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Project and team commands
// ---------------------------------------------------------------------------

async fn cmd_project_add(args: ProjectAddArgs, json: bool) -> CmdResult {
    let project = NewProject::new(&args.name, &args.description)?;
    let (api, _) = connect()?;
    let created = task_ops::create_project(&api, &project).await?;
    if json {
        print_json(&created)
    } else {
        println!("Created project {}: {}", created.id, created.name);
        Ok(())
    }
}

async fn cmd_team_show(args: TeamShowArgs, json: bool) -> CmdResult {
    let (api, _) = connect()?;
    let mut resolver = QueryResolver::new();
    let snapshot = load_view(&mut resolver, &api, &FilterSpec::default()).await?;
    let team = team_ops::find_team(&snapshot, &args.team)?;
    let members = team_ops::team_member_names(&team.id, &snapshot);
    if json {
        print_json(&team_to_json(team, members))
    } else {
        print_lines(&format_team_detail(team, &members));
        Ok(())
    }
}

async fn cmd_team_add(args: TeamAddArgs, json: bool) -> CmdResult {
    let team = NewTeam::new(&args.name, args.description.as_deref(), &args.members)?;
    let (api, _) = connect()?;
    let created = team_ops::create_team(&api, &team).await?;
    if json {
        print_json(&created)
    } else {
        println!("Created team {}: {}", created.id, created.name);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Offline commands
// ---------------------------------------------------------------------------

fn cmd_link(args: LinkArgs, json: bool) -> CmdResult {
    let filter = match args.decode.as_deref() {
        Some(q) => filter_codec::decode_query(q).map_err(DeckError::from)?,
        None => args.filter.to_spec(),
    };
    let query = filter_codec::encode_query(&filter);

    if json {
        return print_json(&LinkJson {
            query,
            filter: &filter,
        });
    }
    if args.decode.is_some() {
        print_lines(&format_filter(&filter));
    } else if query.is_empty() {
        println!("(no filter)");
    } else {
        println!("?{}", query);
    }
    Ok(())
}

fn cmd_config_show(json: bool) -> CmdResult {
    let config = load_config()?;
    if json {
        print_json(&config)
    } else {
        print!("{}", toml::to_string_pretty(&config)?);
        Ok(())
    }
}

fn cmd_config_set(args: ConfigSetArgs) -> CmdResult {
    config_io::set_value(&paths::config_path(), &args.key, &args.value)?;
    println!("{} = {}", args.key, args.value);
    Ok(())
}
