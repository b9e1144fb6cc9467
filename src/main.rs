// Tracing since it's used project wide for logging
#[macro_use]
extern crate tracing;

use std::str::FromStr;

use calloop::EventLoop;
use touchflow_config::Config;

use crate::state::State;

mod behaviors;
mod config;
mod gesture;
mod host;
mod input;
mod state;
mod utils;

fn main() -> anyhow::Result<()> {
    // Logging.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::from_str(if cfg!(debug_assertions) {
            "debug"
        } else {
            "error,warn,touchflow=info"
        })
        .unwrap()
    });
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .init();

    info!(
        version = std::env!("CARGO_PKG_VERSION"),
        "Starting touchflow."
    );

    let initial_config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            error!(?err, "Failed to load the configuration, starting with defaults");
            Config::default()
        }
    };

    let mut event_loop: EventLoop<'static, State> = EventLoop::try_new()?;
    let loop_handle = event_loop.handle();

    // Touchpad events flow from the session listener thread into the loop.
    let (event_tx, event_channel) = calloop::channel::channel();
    loop_handle
        .insert_source(event_channel, |event, _, state| {
            if let calloop::channel::Event::Msg(event) = event {
                state.process_event(event);
            }
        })
        .map_err(|err| anyhow::anyhow!("Failed to insert the touchpad event source! {err}"))?;
    let _listener = host::session::spawn_event_listener(event_tx)?;

    let host = host::session::host()?;
    let mut state = State::new(initial_config, host, loop_handle.clone());

    let _watcher = config::init_watcher(Config::path()?, &loop_handle)?;

    event_loop
        .run(None, &mut state, |_| ())
        .map_err(|err| anyhow::anyhow!("Failed to run the event loop! {err}"))?;

    Ok(())
}
