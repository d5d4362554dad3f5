use std::sync::Arc;

use crate::model::filter::FilterSpec;
use crate::model::project::Project;
use crate::model::tag::Tag;
use crate::model::task::Task;
use crate::model::team::Team;
use crate::model::user::User;

/// The four reference collections, as last fetched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceData {
    pub projects: Vec<Project>,
    pub teams: Vec<Team>,
    pub users: Vec<User>,
    pub tags: Vec<Tag>,
}

impl ReferenceData {
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn team(&self, id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Tags are looked up by name, which is what tasks store
    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name)
    }
}

/// One consistent view of the cache. Snapshots are immutable; a refresh
/// builds a new one and swaps it in with a single assignment, so a reader
/// holding an earlier snapshot never sees a half-applied update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheSnapshot {
    pub references: Arc<ReferenceData>,
    pub tasks: Arc<Vec<Task>>,
    /// The filter the task set was fetched with
    pub filter: FilterSpec,
}

impl CacheSnapshot {
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }
}

/// Owner of the current snapshot for one view session
#[derive(Debug, Default)]
pub struct EntityCache {
    current: Arc<CacheSnapshot>,
}

impl EntityCache {
    pub fn new() -> Self {
        EntityCache::default()
    }

    /// The current snapshot. Cheap to clone and unaffected by later refreshes.
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        Arc::clone(&self.current)
    }

    /// Swap in a new task set, keeping the reference data.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>, filter: FilterSpec) -> Arc<CacheSnapshot> {
        self.install(CacheSnapshot {
            references: Arc::clone(&self.current.references),
            tasks: Arc::new(tasks),
            filter,
        })
    }

    /// Swap in new reference data, keeping the task set.
    pub fn replace_references(&mut self, references: ReferenceData) -> Arc<CacheSnapshot> {
        self.install(CacheSnapshot {
            references: Arc::new(references),
            tasks: Arc::clone(&self.current.tasks),
            filter: self.current.filter.clone(),
        })
    }

    /// Swap in both halves at once.
    pub fn replace_all(
        &mut self,
        references: ReferenceData,
        tasks: Vec<Task>,
        filter: FilterSpec,
    ) -> Arc<CacheSnapshot> {
        self.install(CacheSnapshot {
            references: Arc::new(references),
            tasks: Arc::new(tasks),
            filter,
        })
    }

    fn install(&mut self, snapshot: CacheSnapshot) -> Arc<CacheSnapshot> {
        tracing::debug!(
            tasks = snapshot.tasks.len(),
            projects = snapshot.references.projects.len(),
            teams = snapshot.references.teams.len(),
            users = snapshot.references.users.len(),
            tags = snapshot.references.tags.len(),
            "cache snapshot replaced"
        );
        self.current = Arc::new(snapshot);
        self.snapshot()
    }
}
