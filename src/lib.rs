#![deny(missing_debug_implementations)]
#![allow(clippy::new_without_default)]

#[macro_use]
pub mod macros;

pub mod adventure;
pub mod catalog;
pub mod cli;
pub mod compile;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod filename;
pub mod folder;
pub mod impl_prelude;
pub mod key;
pub mod lock;
pub mod logging;
pub mod progress;
pub mod rc_string;
pub mod resolver;
pub mod scan;
pub mod serializer;
pub mod store;
pub mod volatile;
pub mod walker;

use crate::impl_prelude::*;

pub const CRATE_TITLE: &str = "compendium-pack";
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Includes the short commit hash and date when built from a git checkout
/// (see `build.rs`), falls back to the plain crate version otherwise.
pub const CRATE_NICE_VERSION: &str = match option_env!("CARGO_PKG_NICE_VERSION") {
  Some(v) => v,
  None => CRATE_VERSION,
};

pub fn init_logging() -> bool {
  let set_logger_result: Result<(), log::SetLoggerError> =
    env_logger::try_init_from_env(env_logger::Env::default().default_filter_or(
      // The logging level of `env_logger` can't be changed once the logger
      // has been installed, so instead let's by default allow all logging
      // levels on the `env_logger` side, we will lower the logging level
      // later on ourselves on the `log` side.
      "trace",
    ));
  let other_logger_already_installed = set_logger_result.is_err();
  info!("{}/{} v{}", CRATE_TITLE, CRATE_NAME, CRATE_VERSION);
  !other_logger_already_installed
}

pub fn report_critical_error(mut error: AnyError) {
  error = error.context(format!(
    "CRITICAL ERROR in thread '{}'",
    std::thread::current().name().unwrap_or("<unnamed>"),
  ));
  if log::log_enabled!(log::Level::Error) {
    error!("{:?}", error);
  } else {
    eprintln!("ERROR: {:?}", error);
  }
}

pub fn report_error(mut error: AnyError) {
  error = error.context(format!(
    "non-critical error in thread '{}'",
    std::thread::current().name().unwrap_or("<unnamed>"),
  ));
  if log::log_enabled!(log::Level::Error) {
    warn!("{:?}", error);
  } else {
    eprintln!("WARN: {:?}", error);
  }
}
