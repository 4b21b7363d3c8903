use crate::config::{Config, ConfigResolver};
use crate::extract::{extract_pack, ExtractOptions};
use crate::impl_prelude::*;
use crate::progress::ProgressReporter;
use crate::serializer::{JsonOptions, YamlOptions};

use std::path::PathBuf;

#[derive(Debug)]
pub struct ExtractCommand;

impl super::Command for ExtractCommand {
  fn name(&self) -> &'static str { "extract" }

  fn create_arg_parser(&self, app: clap::Command) -> clap::Command {
    app
      .about("Tears a compendium pack down into a directory of human-editable source files.")
      .arg(
        clap::Arg::new("src")
          .value_name("SRC")
          .value_hint(clap::ValueHint::AnyPath)
          .allow_invalid_utf8(true)
          .required(true)
          .help("Path to the pack to extract, a directory for the sorted store or a *.db file for --nedb."),
      )
      .arg(
        clap::Arg::new("dest")
          .value_name("DEST")
          .value_hint(clap::ValueHint::DirPath)
          .allow_invalid_utf8(true)
          .required(true)
          .help("The directory to write source files into."),
      )
      .arg(
        clap::Arg::new("nedb")
          .long("nedb")
          .help("Read a NeDB-style log store instead of the default LevelDB-style sorted store."),
      )
      .arg(clap::Arg::new("yaml").long("yaml").help("Write source files as YAML instead of JSON."))
      .arg(
        clap::Arg::new("document_type")
          .value_name("TYPE")
          .long("document-type")
          .help("The document type to extract from the log store, resolved to a collection via the configured resolver."),
      )
      .arg(
        clap::Arg::new("collection")
          .value_name("COLLECTION")
          .long("collection")
          .help("The collection to extract from the log store, bypassing document-type resolution."),
      )
      .arg(
        clap::Arg::new("clean")
          .long("clean")
          .help("Remove anything in the destination that isn't part of this extraction."),
      )
      .arg(
        clap::Arg::new("folders")
          .long("folders")
          .help("Nest extracted files into the folder tree recorded in the pack, instead of a flat directory."),
      )
      .arg(
        clap::Arg::new("expand_adventures")
          .long("expand-adventures")
          .help("Split adventure documents into one file per embedded scene/item/etc. instead of a single inlined file."),
      )
      .arg(
        clap::Arg::new("omit_volatile")
          .long("omit-volatile")
          .help("Don't overwrite a file whose only differences from the new content are in volatile fields (e.g. _stats)."),
      )
      .arg(
        clap::Arg::new("log")
          .long("log")
          .help("Print a line for every source file as it's extracted."),
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

    let config = Config::load(&std::env::current_dir().context("failed to get the current directory")?)?;
    let resolver = ConfigResolver::new(&config);

    let options = ExtractOptions {
      nedb: matches.is_present("nedb"),
      yaml: matches.is_present("yaml"),
      yaml_options: YamlOptions::default(),
      json_options: JsonOptions::default(),
      log: matches.is_present("log"),
      document_type: matches.value_of("document_type").map(str::to_owned),
      collection: matches.value_of("collection").map(str::to_owned),
      clean: matches.is_present("clean"),
      folders: matches.is_present("folders"),
      expand_adventures: matches.is_present("expand_adventures"),
      omit_volatile: matches.is_present("omit_volatile"),
      transform_entry: None,
      transform_name: None,
      transform_folder_name: None,
      resolver: Box::new(resolver),
    };

    extract_pack(&src, &dest, &options)
  }
}
