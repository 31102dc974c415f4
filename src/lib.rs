// Library surface for headless/integration tests and reuse.
// The binary only adds terminal setup, logging and the event loop.
pub mod app;
pub mod app_dirs;
pub mod breath;
pub mod clock;
pub mod config;
pub mod cue;
pub mod error;
pub mod interpolate;
pub mod plan;
pub mod power;
pub mod runtime;
pub mod session;
pub mod ui;
pub mod util;
pub mod viewport;
