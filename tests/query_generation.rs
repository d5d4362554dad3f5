mod common;

use common::FakeApi;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use pretty_assertions::assert_eq;

use taskdeck::model::filter::{FilterDimension, FilterSpec, SortKey};
use taskdeck::model::task::TaskStatus;
use taskdeck::ops::error::DeckError;
use taskdeck::ops::group::{GroupDimension, group_by};
use taskdeck::ops::query::{Applied, QueryResolver};
use taskdeck::ops::{dashboard, join, task_ops, team_ops};

fn ids(resolver: &QueryResolver) -> Vec<String> {
    resolver.snapshot().tasks.iter().map(|t| t.id.clone()).collect()
}

#[tokio::test]
async fn stale_response_does_not_overwrite_newer() {
    let api = FakeApi::seeded();
    let mut resolver = QueryResolver::new();

    let older = resolver.begin(&FilterSpec::default().with(FilterDimension::Team, "tm1"));
    let newer = resolver.begin(&FilterSpec::default().with(FilterDimension::Team, "tm2"));
    assert_eq!(older.generation + 1, newer.generation);

    let older_result = QueryResolver::fetch(&api, &older).await;
    let newer_result = QueryResolver::fetch(&api, &newer).await;

    // Newer lands first, older straggles in afterwards
    let applied = resolver.apply(newer, newer_result).unwrap();
    assert!(!applied.is_stale());
    let applied = resolver.apply(older, older_result).unwrap();
    assert!(matches!(applied, Applied::Stale { generation: 1, latest: 2 }));

    assert_eq!(ids(&resolver), vec!["t3", "t5"]);
    assert_eq!(resolver.snapshot().filter.team.as_deref(), Some("tm2"));
}

#[tokio::test]
async fn responses_applied_in_completion_order() {
    let api = FakeApi::seeded();
    let mut resolver = QueryResolver::new();

    let slow = resolver.begin(&FilterSpec::default().with(FilterDimension::Project, "p1"));
    let fast = resolver.begin(&FilterSpec::default().with(FilterDimension::Project, "p2"));
    api.delay(&slow.params, 40);

    let api_ref = &api;
    let mut inflight = FuturesUnordered::new();
    for pending in [slow, fast] {
        inflight.push(async move {
            let result = QueryResolver::fetch(api_ref, &pending).await;
            (pending, result)
        });
    }

    let mut outcomes = Vec::new();
    while let Some((pending, result)) = inflight.next().await {
        outcomes.push(resolver.apply(pending, result).unwrap().is_stale());
    }

    assert_eq!(outcomes, vec![false, true]);
    assert_eq!(ids(&resolver), vec!["t1", "t3", "t5"]);
}

#[tokio::test]
async fn stale_failure_is_discarded_too() {
    let api = FakeApi::seeded();
    let mut resolver = QueryResolver::new();

    let older = resolver.begin(&FilterSpec::default());
    let newer = resolver.begin(&FilterSpec::default().with_status(Some(TaskStatus::ToDo)));
    let newer_result = QueryResolver::fetch(&api, &newer).await;
    resolver.apply(newer, newer_result).unwrap();

    api.fail("tasks");
    let older_result = QueryResolver::fetch(&api, &older).await;
    assert!(older_result.is_err());
    assert!(resolver.apply(older, older_result).unwrap().is_stale());
    assert_eq!(ids(&resolver), vec!["t2", "t5"]);
}

#[tokio::test]
async fn failed_refresh_keeps_last_good_tasks() {
    let api = FakeApi::seeded();
    let mut resolver = QueryResolver::new();
    resolver
        .refresh_tasks(&api, &FilterSpec::default())
        .await
        .unwrap();
    let before = resolver.snapshot();

    api.fail("tasks");
    let err = resolver
        .refresh_tasks(&api, &FilterSpec::default().with(FilterDimension::Team, "tm2"))
        .await
        .unwrap_err();
    assert!(matches!(err, DeckError::FetchFailed { ref what, .. } if what == "tasks"));

    let after = resolver.snapshot();
    assert_eq!(after.tasks.len(), 5);
    assert_eq!(after.filter, FilterSpec::default());
    assert_eq!(before, after);
}

#[tokio::test]
async fn server_sort_order_survives_grouping() {
    let api = FakeApi::seeded();
    let mut resolver = QueryResolver::new();
    let filter = FilterSpec::default().with_sort(Some(SortKey::TimeToComplete));
    resolver.refresh_view(&api, &filter).await.0.unwrap();

    let snap = resolver.snapshot();
    let groups = group_by(
        join::resolve_all(&snap.tasks, &snap.references),
        GroupDimension::Project,
    );
    let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
    // Sorted by days: t3(0), t5(1), t2(2), t1(5), t4(8); Launch is seen first
    assert_eq!(keys, vec!["Launch", "Brand Refresh"]);
    let launch: Vec<u32> = groups["Launch"].iter().map(|t| t.time_to_complete).collect();
    assert_eq!(launch, vec![0, 1, 5]);
}

#[tokio::test]
async fn reference_failure_leaves_tasks_resolvable() {
    let api = FakeApi::seeded();
    api.fail("users");
    let mut resolver = QueryResolver::new();
    let (tasks, references) = resolver.refresh_view(&api, &FilterSpec::default()).await;
    assert!(tasks.is_ok());
    assert!(references.is_err());

    let snap = resolver.snapshot();
    let shown = join::resolve_all(&snap.tasks, &snap.references);
    assert_eq!(shown.len(), 5);
    assert!(shown.iter().all(|t| t.project == join::NOT_AVAILABLE));
    assert_eq!(shown[1].owners, vec![join::UNKNOWN, join::UNKNOWN]);
}

#[tokio::test]
async fn dashboard_is_all_or_nothing() {
    let api = FakeApi::seeded();
    let mut resolver = QueryResolver::new();
    let dash = dashboard::load(&mut resolver, &api, &FilterSpec::default())
        .await
        .unwrap();
    assert_eq!(dash.projects().len(), 2);
    assert_eq!(dash.tasks[0].project, "Launch");

    api.fail("tags");
    let err = dashboard::load(&mut resolver, &api, &FilterSpec::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DeckError::FetchFailed { .. }));
    // The earlier snapshot is still in place
    assert_eq!(resolver.snapshot().references.tags.len(), 1);
    assert_eq!(resolver.snapshot().tasks.len(), 5);
}

#[tokio::test]
async fn delete_drops_task_and_membership_on_refresh() {
    let api = FakeApi::seeded();
    let mut resolver = QueryResolver::new();
    resolver.refresh_view(&api, &FilterSpec::default()).await.0.unwrap();
    assert_eq!(
        team_ops::team_member_names("tm2", &resolver.snapshot()),
        vec!["Cy"]
    );

    task_ops::delete_task(&api, "t3").await.unwrap();
    task_ops::delete_task(&api, "t5").await.unwrap();
    // Nothing changes until the next refresh
    assert_eq!(resolver.snapshot().tasks.len(), 5);

    resolver
        .refresh_tasks(&api, &FilterSpec::default())
        .await
        .unwrap();
    let snap = resolver.snapshot();
    assert!(snap.task("t3").is_none());
    assert!(team_ops::team_members("tm2", &snap.tasks).is_empty());
    assert_eq!(team_ops::team_members("tm1", &snap.tasks), vec!["u1", "u2"]);
}

#[tokio::test]
async fn write_operations_round_trip_through_service() {
    let api = FakeApi::seeded();
    let mut resolver = QueryResolver::new();

    let draft = taskdeck::model::task::TaskDraft::new("Landing page", "p2", "tm2", 3)
        .unwrap()
        .with_due(Some("2025-09-01"), Some("10:00"))
        .unwrap();
    let created = task_ops::create_task(&api, &draft).await.unwrap();
    assert_eq!(created.status, TaskStatus::ToDo);
    assert!(created.due_date.is_some());

    resolver
        .refresh_tasks(&api, &FilterSpec::default())
        .await
        .unwrap();
    let snap = resolver.snapshot();
    let current = task_ops::find_task(&snap, &created.id).unwrap();
    let done = task_ops::mark_complete(&api, current).await.unwrap();
    assert_eq!(done.status, TaskStatus::Completed);
    assert_eq!(done.time_to_complete, 0);
    assert_eq!(done.name, "Landing page");

    let err = task_ops::delete_task(&api, "missing").await.unwrap_err();
    assert!(matches!(err, DeckError::FetchFailed { .. }));

    api.fail("create_project");
    let project = taskdeck::model::project::NewProject::new("Docs", "").unwrap();
    assert!(task_ops::create_project(&api, &project).await.is_err());
    api.recover("create_project");
    assert_eq!(
        task_ops::create_project(&api, &project).await.unwrap().name,
        "Docs"
    );
}
