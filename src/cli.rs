// src/cli.rs
use std::path::PathBuf;

use color_eyre::eyre::{Result, WrapErr, bail, eyre};

use crate::config::options::{Mode, RunOptions};
use crate::credentials::{CredentialSource, DefaultCredentials};
use crate::directory::DirectoryClient;
use crate::input;
use crate::log;
use crate::progress::{Progress, StderrProgress};
use crate::reconcile::{BatchReport, Outcome, Reconciler, Target};
use crate::session::{Session, Transport};
use crate::specs::PageAdapter;

pub const HELP: &str = include_str!("cli_help.txt");

pub enum Command {
    Run(RunOptions),
    Help,
}

/// Entry point for the binary: parse, run, report.
pub fn main_with_args<I: IntoIterator<Item = String>>(args: I) -> Result<()> {
    let opts = match parse_args(args)? {
        Command::Help => {
            eprintln!("{HELP}");
            return Ok(());
        }
        Command::Run(opts) => opts,
    };

    let report = run(&opts)?;
    for e in &report.entries {
        println!("{}\t{:?}", e.subject, e.outcome);
    }
    println!("{}", report.summary());

    let failed = report.count(|o| matches!(o, Outcome::Failed(_)));
    if failed > 0 {
        bail!("{failed} operation(s) failed; see {}", opts.log_file.display());
    }
    Ok(())
}

/// Log in with the default credential chain and run one batch.
pub fn run(opts: &RunOptions) -> Result<BatchReport> {
    if opts.zap {
        log::zap(&opts.log_file).wrap_err("could not delete previous log")?;
    }
    log::init(&opts.log_file);

    let targets = input::read_targets(&opts.input);
    if targets.is_empty() {
        bail!("no netids or names found in '{}'", opts.input);
    }

    let credential = DefaultCredentials.get_credentials()?;
    let session = Session::open(&credential)?;
    let mut client = DirectoryClient::new(session)?;

    let mut progress = StderrProgress::default();
    Ok(execute(opts, &mut client, &targets, Some(&mut progress))?)
}

/// The batch itself, against whatever transport the client was built on.
pub fn execute<T: Transport, P: PageAdapter>(
    opts: &RunOptions,
    client: &mut DirectoryClient<T, P>,
    targets: &[Target],
    progress: Option<&mut dyn Progress>,
) -> crate::error::Result<BatchReport> {
    logf!(
        "{} {} target(s) {} group {}{}",
        if opts.mode == Mode::Remove { "removing" } else { "adding" },
        targets.len(),
        if opts.mode == Mode::Remove { "from" } else { "to" },
        opts.group,
        if opts.dry_run() { " (dry run)" } else { "" },
    );
    let mut reconciler = Reconciler::new(client, &opts.group, opts.dry_run())?;
    reconciler.run(opts.mode, targets, progress)
}

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command> {
    let mut opts = RunOptions::default();
    let mut args = args.into_iter();

    while let Some(a) = args.next() {
        match a.as_str() {
            "-g" | "--group" => opts.group = args.next().ok_or_else(|| eyre!("Missing value for --group"))?,
            "-i" | "--input" => opts.input = args.next().ok_or_else(|| eyre!("Missing value for --input"))?,
            "-r" | "--remove" => opts.mode = Mode::Remove,
            "-z" | "--zap" => opts.zap = true,
            "--do-it" => opts.do_it = true,
            "--log" => opts.log_file = PathBuf::from(args.next().ok_or_else(|| eyre!("Missing value for --log"))?),
            "-h" | "--help" => return Ok(Command::Help),
            _ => bail!("Unknown arg: {a}"),
        }
    }

    if opts.group.trim().is_empty() {
        bail!("At least one group must be named for this program to run.");
    }
    if opts.input.trim().is_empty() {
        bail!("At least one netid or file containing netids must be named.");
    }
    Ok(Command::Run(opts))
}
