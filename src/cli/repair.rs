use crate::impl_prelude::*;
use crate::lock::{repair_pack, RepairOptions};
use crate::progress::ProgressReporter;

use std::path::PathBuf;

#[derive(Debug)]
pub struct RepairCommand;

impl super::Command for RepairCommand {
  fn name(&self) -> &'static str { "repair" }

  fn create_arg_parser(&self, app: clap::Command) -> clap::Command {
    app
      .about("Runs the sorted store's recovery routine against a pack left behind by a crashed writer.")
      .arg(
        clap::Arg::new("path")
          .value_name("PATH")
          .value_hint(clap::ValueHint::DirPath)
          .allow_invalid_utf8(true)
          .required(true)
          .help("Path to the sorted-store pack directory to repair."),
      )
  }

  fn run(
    &self,
    global_opts: super::GlobalOpts,
    matches: &clap::ArgMatches,
    _progress: Box<dyn ProgressReporter>,
  ) -> AnyResult<()> {
    let path = PathBuf::from(matches.value_of_os("path").unwrap());
    repair_pack(&path, &RepairOptions { log: global_opts.verbose })
  }
}
