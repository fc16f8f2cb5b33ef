#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Overlay system that repaints the building overview after host changes.
//!
//! Hosts forward change notifications as [`Trigger`] values. The overlay
//! debounces bursts of notifications and, once the host has settled, runs a
//! single pass over every town group: the group's template is loaded, each
//! member town is evaluated and its row is repainted on the
//! [`HighlightSink`]. Failures never escape a pass; they are logged and
//! summarised in the returned [`PassReport`].

mod debounce;

use std::time::Duration;

use building_hints_core::{
    GroupId, HighlightSink, ProviderError, RuleTable, TownDirectory, TownId,
};
use building_hints_store::{KeyValueStorage, StorageError, TemplateError, TemplateStore};
use building_hints_system_evaluation::evaluate;
use tracing::{debug, info, warn};

pub use debounce::Debouncer;

/// Quiet period that must elapse after the last trigger before a pass runs.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Host controller whose request completions affect building levels.
pub const BUILDING_CONTROLLER: &str = "building_place";

/// Change notifications forwarded by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// Nodes were added to or removed from the page.
    DomMutation,
    /// The player navigated to another view.
    Navigation,
    /// A periodic timer fired.
    Timer,
    /// A background request to the game completed.
    RequestCompleted {
        /// Controller that served the request.
        controller: String,
    },
}

impl Trigger {
    /// Reports whether the notification may have changed building levels.
    #[must_use]
    pub fn is_relevant(&self) -> bool {
        match self {
            Self::RequestCompleted { controller } => controller == BUILDING_CONTROLLER,
            Self::DomMutation | Self::Navigation | Self::Timer => true,
        }
    }
}

/// How a pass ended.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every group was visited.
    #[default]
    Completed,
    /// The host could not provide towns or groups.
    ProviderUnavailable(ProviderError),
    /// The template storage could not be read.
    StorageUnavailable(String),
}

/// Summary of a single overlay pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    /// How the pass ended.
    pub outcome: PassOutcome,
    /// Groups whose towns were evaluated.
    pub groups_evaluated: usize,
    /// Groups skipped because no template is stored for them.
    pub groups_without_template: usize,
    /// Groups skipped because their stored template could not be parsed.
    pub malformed_groups: Vec<GroupId>,
    /// Town rows repainted on the sink.
    pub towns_painted: usize,
    /// Group members the host did not report any levels for.
    pub unknown_towns: Vec<TownId>,
}

impl PassReport {
    fn abandoned(outcome: PassOutcome) -> Self {
        Self {
            outcome,
            ..Self::default()
        }
    }
}

/// Host-side integration state of the overlay.
#[derive(Debug)]
pub struct Overlay<'a> {
    rules: RuleTable<'a>,
    debouncer: Debouncer,
    initialized: bool,
}

impl Default for Overlay<'static> {
    fn default() -> Self {
        Self::new(RuleTable::reference(), DEFAULT_DEBOUNCE)
    }
}

impl<'a> Overlay<'a> {
    /// Creates an overlay that evaluates towns against the rule table.
    #[must_use]
    pub fn new(rules: RuleTable<'a>, debounce: Duration) -> Self {
        Self {
            rules,
            debouncer: Debouncer::new(debounce),
            initialized: false,
        }
    }

    /// Marks the host integration as installed. Returns `true` only on the
    /// first call so hosts attach their UI exactly once.
    pub fn initialize(&mut self) -> bool {
        !std::mem::replace(&mut self.initialized, true)
    }

    /// Reports whether the host integration has been installed.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Records a host notification observed at `now`.
    ///
    /// Irrelevant notifications are ignored. Returns whether the trigger
    /// (re)armed the debouncer.
    pub fn notify(&mut self, trigger: &Trigger, now: Duration) -> bool {
        if !trigger.is_relevant() {
            return false;
        }
        self.debouncer.notify(now);
        true
    }

    /// Reports whether a pass is waiting for the debounce interval to elapse.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Runs a pass when the debounce interval has elapsed and the building
    /// overview is displayed.
    pub fn poll<D, S, K>(
        &mut self,
        now: Duration,
        directory: &D,
        templates: &TemplateStore<S>,
        sink: &mut K,
    ) -> Option<PassReport>
    where
        D: TownDirectory + ?Sized,
        S: KeyValueStorage,
        K: HighlightSink + ?Sized,
    {
        if !self.debouncer.poll(now) {
            return None;
        }
        if !directory.overview_loaded() {
            debug!("building overview not displayed; skipping pass");
            return None;
        }
        Some(self.run_pass(directory, templates, sink))
    }

    /// Evaluates every town group and repaints its member towns.
    pub fn run_pass<D, S, K>(
        &self,
        directory: &D,
        templates: &TemplateStore<S>,
        sink: &mut K,
    ) -> PassReport
    where
        D: TownDirectory + ?Sized,
        S: KeyValueStorage,
        K: HighlightSink + ?Sized,
    {
        let towns = match directory.towns() {
            Ok(towns) => towns,
            Err(error) => {
                warn!(%error, "abandoning overlay pass");
                return PassReport::abandoned(PassOutcome::ProviderUnavailable(error));
            }
        };
        let groups = match directory.town_groups() {
            Ok(groups) => groups,
            Err(error) => {
                warn!(%error, "abandoning overlay pass");
                return PassReport::abandoned(PassOutcome::ProviderUnavailable(error));
            }
        };

        let mut report = PassReport::default();
        for (group_id, group) in &groups {
            let template = match templates.load(*group_id) {
                Ok(Some(template)) => template,
                Ok(None) => {
                    report.groups_without_template += 1;
                    continue;
                }
                Err(TemplateError::Malformed { source, .. }) => {
                    warn!(group = group_id.get(), error = %source, "skipping malformed template");
                    report.malformed_groups.push(*group_id);
                    continue;
                }
                Err(TemplateError::Storage(error)) => {
                    return abandon_on_storage(error, report);
                }
            };

            report.groups_evaluated += 1;
            for town_id in group.towns.town_ids() {
                let Some(state) = towns.get(&town_id) else {
                    debug!(town = town_id.get(), group = group_id.get(), "town not reported by host");
                    report.unknown_towns.push(town_id);
                    continue;
                };

                let highlights = evaluate(state, &template, self.rules.rules());
                sink.clear_town(town_id);
                for (building, highlight) in highlights.styled() {
                    sink.highlight(town_id, building, highlight);
                }
                report.towns_painted += 1;
            }
        }

        info!(
            groups = report.groups_evaluated,
            towns = report.towns_painted,
            malformed = report.malformed_groups.len(),
            "overlay pass completed"
        );
        report
    }
}

fn abandon_on_storage(error: StorageError, mut report: PassReport) -> PassReport {
    warn!(%error, "abandoning overlay pass");
    report.outcome = PassOutcome::StorageUnavailable(error.to_string());
    report
}
