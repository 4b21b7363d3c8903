use crate::compile::{compile_pack, CompileOptions};
use crate::impl_prelude::*;
use crate::progress::ProgressReporter;

use std::path::PathBuf;

#[derive(Debug)]
pub struct CompileCommand;

impl super::Command for CompileCommand {
  fn name(&self) -> &'static str { "compile" }

  fn create_arg_parser(&self, app: clap::Command) -> clap::Command {
    app
      .about("Builds a compendium pack from a directory of source files.")
      .arg(
        clap::Arg::new("src")
          .value_name("SRC")
          .value_hint(clap::ValueHint::DirPath)
          .allow_invalid_utf8(true)
          .required(true)
          .help("The directory of source files to compile."),
      )
      .arg(
        clap::Arg::new("dest")
          .value_name("DEST")
          .value_hint(clap::ValueHint::AnyPath)
          .allow_invalid_utf8(true)
          .required(true)
          .help("Path to the pack to write, a directory for the sorted store or a *.db file for --nedb."),
      )
      .arg(
        clap::Arg::new("nedb")
          .long("nedb")
          .help("Build a NeDB-style log store instead of the default LevelDB-style sorted store."),
      )
      .arg(clap::Arg::new("yaml").long("yaml").help("Parse source files as YAML instead of JSON."))
      .arg(
        clap::Arg::new("recursive")
          .short('r')
          .long("recursive")
          .help("Scan the source directory recursively."),
      )
      .arg(
        clap::Arg::new("log")
          .long("log")
          .help("Print a line for every source file as it's compiled."),
      )
  }

  fn run(
    &self,
    _global_opts: super::GlobalOpts,
    matches: &clap::ArgMatches,
    _progress: Box<dyn ProgressReporter>,
  ) -> AnyResult<()> {
    let src = PathBuf::from(matches.value_of_os("src").unwrap());
    let dest = PathBuf::from(matches.value_of_os("dest").unwrap());

    let options = CompileOptions {
      nedb: matches.is_present("nedb"),
      yaml: matches.is_present("yaml"),
      recursive: matches.is_present("recursive"),
      log: matches.is_present("log"),
      transform_entry: None,
    };

    compile_pack(&src, &dest, &options)
  }
}
