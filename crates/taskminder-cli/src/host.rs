use anyhow::Context;
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taskminder_core::{
    calendar::SystemClock,
    config::Config,
    db::ReminderDb,
    notify::NotificationPresenter,
    paths,
    scheduler::AlarmScheduler,
    settings::ReminderSettings,
    source::YamlTaskSource,
    surface,
    trigger::ReminderTrigger,
};

/// Everything a command needs, wired against the project's database.
///
/// The redb file is locked while a `Host` is alive, so commands open one,
/// act, and drop it.
pub struct Host {
    pub root: PathBuf,
    pub config: Config,
    pub db: Arc<ReminderDb>,
    pub scheduler: Arc<AlarmScheduler<Local>>,
}

impl Host {
    pub fn open(root: &Path) -> anyhow::Result<Self> {
        let config = Config::load(root).context("failed to load .taskminder/config.yaml")?;
        let db_path = paths::db_path(root);
        let db = Arc::new(
            ReminderDb::open(&db_path)
                .with_context(|| format!("cannot open {}", db_path.display()))?,
        );
        let settings = ReminderSettings::new(db.clone());
        let scheduler = Arc::new(AlarmScheduler::new(
            db.clone(),
            settings,
            Arc::new(SystemClock),
            Local,
        ));
        Ok(Self {
            root: root.to_path_buf(),
            config,
            db,
            scheduler,
        })
    }

    pub fn task_source(&self) -> YamlTaskSource {
        YamlTaskSource::new(self.config.tasks_path(&self.root))
    }

    pub fn trigger(&self) -> ReminderTrigger<Local> {
        let surface = surface::from_config(&self.config.notifier, &self.root);
        ReminderTrigger::new(
            self.scheduler.clone(),
            Arc::new(self.task_source()),
            NotificationPresenter::new(surface),
        )
    }
}
