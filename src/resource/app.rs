//! Nextcloud app resource - install, enable, disable or remove an app

use anyhow::Result;
use declarative::{ApplyContext, ApplyResult, Resource, ResourceState};
use occkit::backend::Backend;
use occkit::{AppAction, AppList, AppState, ObservationCache};

/// A Nextcloud app and the lifecycle state it should be in
#[derive(Debug)]
pub struct NextcloudApp<B> {
    pub name: String,
    /// `Absent`, `Enabled` or `Disabled`
    pub desired: AppState,
    backend: B,
    apps: ObservationCache<AppList>,
}

impl<B: Backend> NextcloudApp<B> {
    pub fn new(backend: B, name: &str, desired: AppState) -> Self {
        Self {
            name: name.to_string(),
            desired,
            backend,
            apps: ObservationCache::new(),
        }
    }

    /// Current state, from the cached `app:list`
    fn observe(&mut self) -> Result<AppState> {
        let backend = &self.backend;
        let apps = self.apps.fetch(|| backend.list_apps())?;
        Ok(apps.state(&self.name))
    }

    /// Run one action and forget the stale app list
    fn run(&mut self, action: AppAction, ctx: &mut ApplyContext) -> Result<()> {
        let output = self.backend.app_action(action, &self.name)?;
        ctx.record(&output.stdout, &output.stderr);
        self.apps.invalidate();
        Ok(())
    }
}

fn to_resource_state(state: AppState) -> ResourceState {
    match state {
        AppState::Absent => ResourceState::Absent,
        installed => ResourceState::Present {
            details: Some(installed.label().to_string()),
        },
    }
}

impl<B: Backend + std::fmt::Debug> Resource for NextcloudApp<B> {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("App {}", self.name)
    }

    fn resource_type(&self) -> &'static str {
        "nextcloud_app"
    }

    fn current_state(&mut self) -> Result<ResourceState> {
        Ok(to_resource_state(self.observe()?))
    }

    fn desired_state(&self) -> ResourceState {
        to_resource_state(self.desired)
    }

    fn apply(&mut self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        let current = self.observe()?;

        match (current, self.desired) {
            (AppState::Absent, AppState::Absent)
            | (AppState::Enabled, AppState::Enabled)
            | (AppState::Disabled, AppState::Disabled) => Ok(ApplyResult::NoChange),
            (_, AppState::Absent) => {
                self.run(AppAction::Remove, ctx)?;
                Ok(ApplyResult::Removed)
            }
            (AppState::Absent, AppState::Enabled) => {
                self.run(AppAction::Install, ctx)?;
                // occ normally enables on install
                if self.observe()? != AppState::Enabled {
                    self.run(AppAction::Enable, ctx)?;
                }
                Ok(ApplyResult::Created)
            }
            (AppState::Absent, AppState::Disabled) => {
                self.run(AppAction::Install, ctx)?;
                self.run(AppAction::Disable, ctx)?;
                Ok(ApplyResult::Created)
            }
            (AppState::Enabled, AppState::Disabled) => {
                self.run(AppAction::Disable, ctx)?;
                Ok(ApplyResult::Modified)
            }
            (AppState::Disabled, AppState::Enabled) => {
                self.run(AppAction::Enable, ctx)?;
                Ok(ApplyResult::Modified)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{ApplyOptions, reconcile};
    use occkit::backend::mock::MockBackend;

    const STATES: [AppState; 3] = [AppState::Absent, AppState::Enabled, AppState::Disabled];

    fn backend_with(current: AppState) -> MockBackend {
        match current {
            AppState::Absent => MockBackend::new(),
            state => MockBackend::new().with_app("news", state),
        }
    }

    fn expected_actions(current: AppState, desired: AppState) -> Vec<&'static str> {
        use AppState::{Absent, Disabled, Enabled};
        match (current, desired) {
            (Absent, Absent) | (Enabled, Enabled) | (Disabled, Disabled) => vec![],
            (Absent, Enabled) => vec!["app:install news"],
            (Absent, Disabled) => vec!["app:install news", "app:disable news"],
            (Enabled, Absent) | (Disabled, Absent) => vec!["app:remove news"],
            (Enabled, Disabled) => vec!["app:disable news"],
            (Disabled, Enabled) => vec!["app:enable news"],
        }
    }

    #[test]
    fn test_transition_table() {
        for current in STATES {
            for desired in STATES {
                let mock = backend_with(current);
                let mut app = NextcloudApp::new(&mock, "news", desired);
                let outcome = reconcile(&mut app, ApplyOptions::default()).unwrap();

                let expected = expected_actions(current, desired);
                assert_eq!(
                    mock.mutations(),
                    expected,
                    "{current} -> {desired}"
                );
                assert_eq!(outcome.changed, !expected.is_empty(), "{current} -> {desired}");
                assert_eq!(mock.app_state("news"), desired, "{current} -> {desired}");
            }
        }
    }

    #[test]
    fn test_second_run_is_noop() {
        for current in STATES {
            for desired in STATES {
                let mock = backend_with(current);
                reconcile(
                    &mut NextcloudApp::new(&mock, "news", desired),
                    ApplyOptions::default(),
                )
                .unwrap();
                let before = mock.mutations().len();

                let second = reconcile(
                    &mut NextcloudApp::new(&mock, "news", desired),
                    ApplyOptions::default(),
                )
                .unwrap();
                assert!(!second.changed);
                assert_eq!(mock.mutations().len(), before);
            }
        }
    }

    #[test]
    fn test_install_requeries_app_list() {
        let mock = MockBackend::new();
        let mut app = NextcloudApp::new(&mock, "news", AppState::Enabled);
        reconcile(&mut app, ApplyOptions::default()).unwrap();
        // one list for the diff (cached for apply), one after install
        assert_eq!(mock.count("app:list"), 2);
        assert_eq!(app.apps.fetch_count(), 2);
    }

    #[test]
    fn test_install_left_disabled_is_enabled() {
        let mock = MockBackend::new().install_keeps_disabled();
        let mut app = NextcloudApp::new(&mock, "news", AppState::Enabled);
        let outcome = reconcile(&mut app, ApplyOptions::default()).unwrap();
        assert_eq!(outcome.result, ApplyResult::Created);
        assert_eq!(mock.mutations(), vec!["app:install news", "app:enable news"]);
        assert_eq!(mock.count("app:list"), 2);
        assert_eq!(mock.app_state("news"), AppState::Enabled);
        assert_eq!(outcome.diagnostics.stdout, "news app:install\nnews app:enable\n");
    }

    #[test]
    fn test_single_list_when_nothing_to_do() {
        let mock = MockBackend::new().with_app("news", AppState::Enabled);
        let mut app = NextcloudApp::new(&mock, "news", AppState::Enabled);
        reconcile(&mut app, ApplyOptions::default()).unwrap();
        assert_eq!(mock.calls(), vec!["app:list"]);
    }

    #[test]
    fn test_list_failure_aborts_before_actions() {
        let mock = MockBackend::new().fail("app:list", 1, "Nextcloud is in maintenance mode");
        let mut app = NextcloudApp::new(&mock, "news", AppState::Enabled);
        let err = reconcile(&mut app, ApplyOptions::default()).unwrap_err();
        let err = err.downcast_ref::<occkit::Error>().unwrap();
        assert!(matches!(err, occkit::Error::Observation { .. }));
        assert!(mock.mutations().is_empty());
    }

    #[test]
    fn test_failed_disable_after_install_is_fatal() {
        let mock = MockBackend::new().fail("app:disable", 1, "App is always enabled\n");
        let mut app = NextcloudApp::new(&mock, "news", AppState::Disabled);
        let err = reconcile(&mut app, ApplyOptions::default()).unwrap_err();
        let err = err.downcast_ref::<occkit::Error>().unwrap();
        assert_eq!(err.stderr(), Some("App is always enabled\n"));
        // the install already happened
        assert_eq!(mock.app_state("news"), AppState::Enabled);
    }

    #[test]
    fn test_diagnostics_collect_all_actions() {
        let mock = MockBackend::new();
        let mut app = NextcloudApp::new(&mock, "news", AppState::Disabled);
        let outcome = reconcile(&mut app, ApplyOptions::default()).unwrap();
        assert_eq!(
            outcome.diagnostics.stdout,
            "news app:install\nnews app:disable\n"
        );
    }

    #[test]
    fn test_check_mode_runs_no_actions() {
        let mock = MockBackend::new().with_app("news", AppState::Enabled);
        let mut app = NextcloudApp::new(&mock, "news", AppState::Absent);
        let opts = ApplyOptions { check_mode: true };
        let outcome = reconcile(&mut app, opts).unwrap();
        assert!(outcome.changed);
        assert!(mock.mutations().is_empty());
        assert_eq!(outcome.diff.before(), "enabled");
        assert_eq!(outcome.diff.after(), "absent");
    }
}
