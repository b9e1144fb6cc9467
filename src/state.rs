use std::time::Duration;

use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};
use touchflow_config::{reload_class, Config, ReloadClass};

use crate::behaviors;
use crate::gesture::registry::ConsumerRegistry;
use crate::host::Host;
use crate::input::{EventClassifier, TouchpadEvent};

/// Debounce for tuning-only reloads, so a settings slider being dragged
/// does not rebuild the consumer set on every written value.
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(250);

pub struct State {
    pub config: Config,
    pub host: Host,
    pub loop_handle: LoopHandle<'static, State>,
    registry: ConsumerRegistry,
    classifier: EventClassifier,
    /// Single in-flight rebuild timer; a newer change replaces it.
    scheduled_rebuild: Option<RegistrationToken>,
    pending_config: Option<Config>,
    /// The last load failed and the engine runs a stale config; the next
    /// successful load applies even if it compares equal.
    config_load_failed: bool,
}

impl State {
    pub fn new(config: Config, host: Host, loop_handle: LoopHandle<'static, State>) -> Self {
        let hold_swipe_delay = Duration::from_millis(config.tuning.hold_swipe_delay_ms);
        let mut state = Self {
            config,
            host,
            loop_handle,
            registry: ConsumerRegistry::new(hold_swipe_delay),
            classifier: EventClassifier::new(),
            scheduled_rebuild: None,
            pending_config: None,
            config_load_failed: false,
        };
        let slots = behaviors::build_consumers(&state.config);
        state.registry.rebuild(&mut state.host, slots, hold_swipe_delay);
        state
    }

    /// One hardware event, from the input source into the engine.
    pub fn process_event(&mut self, event: TouchpadEvent) {
        if let Some(gesture) = self.classifier.classify(event) {
            self.registry.handle_event(&mut self.host, gesture);
        }
    }

    /// Entry point for the config file watcher.
    pub fn reload_config(&mut self) {
        let loaded = Config::load();
        self.handle_config_load(loaded);
    }

    fn handle_config_load(&mut self, loaded: Result<Config, touchflow_config::Error>) {
        let new = match loaded {
            Ok(config) => config,
            Err(err) => {
                error!(?err, "Failed to reload the configuration, keeping the previous one");
                self.config_load_failed = true;
                return;
            }
        };

        let class = if std::mem::take(&mut self.config_load_failed) {
            ReloadClass::Immediate
        } else {
            reload_class(&self.config, &new)
        };
        match class {
            ReloadClass::Unchanged => (),
            ReloadClass::Debounced => self.schedule_rebuild(new, RELOAD_DEBOUNCE),
            ReloadClass::Immediate => self.schedule_rebuild(new, Duration::ZERO),
        }
    }

    fn schedule_rebuild(&mut self, new: Config, delay: Duration) {
        self.pending_config = Some(new);
        if let Some(token) = self.scheduled_rebuild.take() {
            self.loop_handle.remove(token);
        }
        let token = self
            .loop_handle
            .insert_source(Timer::from_duration(delay), |_, _, state| {
                state.apply_pending_rebuild();
                TimeoutAction::Drop
            });
        match token {
            Ok(token) => self.scheduled_rebuild = Some(token),
            Err(err) => {
                error!(?err, "Failed to schedule the config rebuild, applying now");
                self.apply_pending_rebuild();
            }
        }
    }

    fn apply_pending_rebuild(&mut self) {
        self.scheduled_rebuild = None;
        let Some(config) = self.pending_config.take() else {
            return;
        };
        debug!("Applying reloaded configuration");
        let hold_swipe_delay = Duration::from_millis(config.tuning.hold_swipe_delay_ms);
        let slots = behaviors::build_consumers(&config);
        self.registry.rebuild(&mut self.host, slots, hold_swipe_delay);
        self.config = config;
    }
}
