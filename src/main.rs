use compendium_pack::cli::{self, GlobalOpts, ProgressMode};
use compendium_pack::impl_prelude::*;
use compendium_pack::progress::{self, NopProgressReporter, ProgressReporter, TuiProgresReporter};

pub fn main() {
  if let Err(err) = try_main() {
    compendium_pack::report_critical_error(err);
    std::process::exit(1);
  }
}

pub fn try_main() -> AnyResult<()> {
  if std::env::var_os("RUST_LOG").is_none()
    && std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
  {
    std::env::set_var("RUST_LOG", "debug");
  }
  compendium_pack::init_logging();

  let (arg_parser, commands_map) = cli::create_complete_arg_parser();
  let matches = arg_parser.get_matches();

  let global_opts = GlobalOpts::from_matches(&matches);
  if let Some(dir) = &global_opts.cd {
    std::env::set_current_dir(dir)
      .with_context(|| format!("failed to change the working directory to '{}'", dir.display()))?;
  }
  if !global_opts.no_banner_message {
    compendium_pack::logging::print_banner_message();
  }

  let progress: Box<dyn ProgressReporter> = match global_opts.progress_mode {
    ProgressMode::Never => Box::new(NopProgressReporter),
    ProgressMode::Always => Box::new(TuiProgresReporter::new()),
    ProgressMode::Auto => {
      if progress::terminal_size().is_some() {
        Box::new(TuiProgresReporter::new())
      } else {
        Box::new(NopProgressReporter)
      }
    }
  };

  let (command_name, command_matches) =
    matches.subcommand().expect("clap guarantees a subcommand is present here");
  let command = commands_map.get(command_name).expect("clap guarantees the subcommand name is registered");
  command.run(global_opts, command_matches, progress)
}
