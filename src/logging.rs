//! Banner-message helper for the CLI front-end; actual logger installation
//! lives in `lib.rs::init_logging` (a thin `env_logger` wrapper), since that's
//! the entry point both the library and the binary call.

pub fn print_banner_message() {
  log::info!("{}/{} v{}", crate::CRATE_TITLE, crate::CRATE_NAME, crate::CRATE_NICE_VERSION);
}
