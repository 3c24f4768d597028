use clap::{ArgAction, Args, Parser, Subcommand};
use is_terminal::IsTerminal;
use minus::Pager;
use sos::areas::repository::Repository;
use sos::artifacts::core::PagerWriter;
use sos::artifacts::merge::{
    BlockPreview, FileChoice, MergeChoice, MergeDecider, MergeOperation, MergeOptions,
};
use sos::commands::porcelain::PathFilters;
use sos::commands::porcelain::branch::BranchOptions;
use sos::commands::porcelain::commit::CommitOptions;
use sos::commands::porcelain::config::ConfigAction;
use sos::commands::porcelain::log::LogOptions;
use sos::commands::porcelain::ls::LsOptions;
use sos::commands::porcelain::offline::OfflineOptions;
use sos::commands::porcelain::switch::SwitchOptions;
use sos::commands::porcelain::update::UpdateOptions;
use sos::errors::{RepoError, RepoResult};
use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::str::FromStr;

const LOG_ENV: &str = "SOS_LOG";
const NO_PAGER_ENV: &str = "NO_PAGER";

#[derive(Parser)]
#[command(
    name = "sos",
    version,
    author = "Sami Barbut-Dica",
    about = "Offline version control next to your regular VCS",
    long_about = "sos keeps branches and revisions of a working tree in a local .sos folder, \
    so you can keep committing, branching and merging while the upstream VCS is out of reach.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, global = true, action = ArgAction::Count, help = "More diagnostics on stderr (repeatable)")]
    verbose: u8,
    #[arg(short, long, global = true, help = "Only report errors on stderr")]
    quiet: bool,
}

#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    #[arg(long, value_name = "PATTERN", help = "Only consider files matching this pattern")]
    only: Vec<String>,
    #[arg(long, value_name = "PATTERN", help = "Never consider files matching this pattern")]
    except: Vec<String>,
}

impl From<FilterArgs> for PathFilters {
    fn from(args: FilterArgs) -> Self {
        PathFilters {
            only: args.only,
            except: args.except,
        }
    }
}

/// `--add`, `--rm` and `--ask` style flags of one merge granularity
fn merge_operation(add: bool, remove: bool, ask: bool) -> MergeOperation {
    match (add, remove, ask) {
        (_, _, true) => MergeOperation::ASK,
        (true, false, _) => MergeOperation::INSERT,
        (false, true, _) => MergeOperation::REMOVE,
        _ => MergeOperation::BOTH,
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "offline",
        about = "Start working offline",
        long_about = "Creates the offline repository in the current folder and records the working tree as the first branch."
    )]
    Offline {
        #[arg(index = 1, help = "Name of the first branch")]
        name: Option<String>,
        #[arg(long, help = "Only version files matching tracking patterns")]
        track: bool,
        #[arg(long, help = "Like --track, but patterns are cleared after each commit")]
        picky: bool,
        #[arg(long, help = "Compare file contents instead of modification times")]
        strict: bool,
        #[arg(long, help = "Compress stored file contents")]
        compress: bool,
        #[arg(long, help = "Wipe a leftover offline repository")]
        force: bool,
    },
    #[command(name = "online", about = "Finish working offline and remove the offline repository")]
    Online {
        #[arg(long, action = ArgAction::Count, help = "Ignore dirty branches; twice to ignore local changes too")]
        force: u8,
    },
    #[command(name = "branch", about = "Create a new branch")]
    Branch {
        #[arg(index = 1, help = "Name of the new branch")]
        name: Option<String>,
        #[arg(short, long, help = "Message of the branch's first commit")]
        message: Option<String>,
        #[arg(long, help = "Branch from the last revision instead of the file tree")]
        last: bool,
        #[arg(long, help = "Keep working on the current branch")]
        stay: bool,
    },
    #[command(name = "commit", about = "Record the file tree as a new revision")]
    Commit {
        #[arg(index = 1, help = "Commit message")]
        message: Option<String>,
        #[arg(long, help = "Store the message as a tag")]
        tag: bool,
        #[arg(long, help = "Commit even if nothing changed")]
        force: bool,
        #[command(flatten)]
        filters: FilterArgs,
    },
    #[command(name = "changes", about = "List changes of the file tree against a revision")]
    Changes {
        #[arg(index = 1, help = "Revision to compare against, as [branch]/[revision]")]
        revision: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    #[command(name = "diff", about = "Show line differences of the file tree against a revision")]
    Diff {
        #[arg(index = 1, help = "Revision to compare against, as [branch]/[revision]")]
        revision: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    #[command(name = "switch", about = "Replace the file tree with another branch or revision")]
    Switch {
        #[arg(index = 1, help = "Target as [branch]/[revision]")]
        target: String,
        #[arg(long, help = "Overwrite uncommitted changes")]
        force: bool,
        #[arg(long, help = "Only take over the target's tracking patterns")]
        meta: bool,
        #[command(flatten)]
        filters: FilterArgs,
    },
    #[command(name = "update", about = "Merge another branch or revision into the file tree")]
    Update {
        #[arg(index = 1, help = "Target as [branch]/[revision]")]
        target: String,
        #[arg(long, help = "Proceed with uncommitted changes")]
        force: bool,
        #[arg(long = "add", help = "Only add files the target has")]
        add_files: bool,
        #[arg(long = "rm", help = "Only remove files the target lacks")]
        remove_files: bool,
        #[arg(long = "ask", help = "Ask how to handle each modified file")]
        ask_files: bool,
        #[arg(long, help = "Only add lines")]
        add_lines: bool,
        #[arg(long = "rm-lines", help = "Only remove lines")]
        remove_lines: bool,
        #[arg(long, help = "Ask for each changed block of lines")]
        ask_lines: bool,
        #[arg(long, help = "Only add characters within changed lines")]
        add_chars: bool,
        #[arg(long = "rm-chars", help = "Only remove characters within changed lines")]
        remove_chars: bool,
        #[arg(long, help = "Ask for each changed run of characters")]
        ask_chars: bool,
        #[arg(long, help = "Use the target's line endings")]
        eol: bool,
        #[command(flatten)]
        filters: FilterArgs,
    },
    #[command(name = "delete", about = "Remove a branch")]
    Delete {
        #[arg(index = 1, help = "Branch name or number")]
        branch: String,
    },
    #[command(name = "log", about = "List the commits of the current branch")]
    Log {
        #[arg(long, help = "List the changed files of each commit")]
        changes: bool,
    },
    #[command(name = "status", about = "Show repository mode, branches and file tree state")]
    Status,
    #[command(name = "add", about = "Add a tracking pattern to the current branch")]
    Add {
        #[arg(index = 1, help = "Pattern as folder/glob")]
        pattern: String,
        #[arg(long, help = "Add to the untracking patterns instead")]
        untrack: bool,
        #[arg(long, help = "Add even if no file matches")]
        force: bool,
    },
    #[command(name = "rm", about = "Remove a tracking pattern from the current branch")]
    Rm {
        #[arg(index = 1, help = "Pattern as folder/glob")]
        pattern: String,
        #[arg(long, help = "Remove from the untracking patterns instead")]
        untrack: bool,
    },
    #[command(name = "ls", about = "List files with their tracking state")]
    Ls {
        #[arg(index = 1, help = "Folder to list")]
        folder: Option<String>,
        #[arg(short, long, help = "Descend into subfolders")]
        recursive: bool,
        #[arg(long, help = "List the current branch's tracking patterns")]
        patterns: bool,
        #[arg(long, help = "List tags")]
        tags: bool,
    },
    #[command(name = "config", about = "Show or edit configuration")]
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
        #[arg(long, global = true, help = "Edit the repository's configuration instead of the user's")]
        local: bool,
    },
    #[command(name = "hash-file", about = "Print the content hash and name hash of a file")]
    HashFile {
        #[arg(index = 1)]
        path: String,
    },
    #[command(name = "cat-file", about = "Print a file as stored in a revision")]
    CatFile {
        #[arg(index = 1)]
        path: String,
        #[arg(index = 2, help = "Revision as [branch]/[revision]")]
        revision: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    #[command(about = "Show all settings and where they come from")]
    Show,
    #[command(about = "Set a value; lists are separated by ';'")]
    Set { key: String, value: String },
    #[command(about = "Remove a setting")]
    Unset { key: String },
    #[command(about = "Append to a list setting")]
    Add { key: String, value: String },
    #[command(about = "Remove from a list setting")]
    Rm { key: String, value: String },
}

impl From<ConfigCommand> for ConfigAction {
    fn from(command: ConfigCommand) -> Self {
        match command {
            ConfigCommand::Show => ConfigAction::Show,
            ConfigCommand::Set { key, value } => ConfigAction::Set { key, value },
            ConfigCommand::Unset { key } => ConfigAction::Unset { key },
            ConfigCommand::Add { key, value } => ConfigAction::Add { key, value },
            ConfigCommand::Rm { key, value } => ConfigAction::Remove { key, value },
        }
    }
}

/// Asks merge questions on stderr and reads answers from stdin.
/// End of input keeps mine.
struct TerminalDecider;

impl TerminalDecider {
    fn ask(question: &str) -> String {
        eprint!("{} ", question);
        let _ = std::io::stderr().flush();

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => answer.trim().to_lowercase(),
            Err(error) => {
                tracing::warn!("Unable to read answer: {}", error);
                String::new()
            }
        }
    }
}

impl MergeDecider for TerminalDecider {
    fn resolve_block(&mut self, block: &BlockPreview) -> MergeChoice {
        eprintln!(
            "{} block at {} {}:",
            block.kind.symbol(),
            if block.intra_line { "column" } else { "line" },
            block.mine_start + 1
        );
        eprintln!("  mine:   |{}|", block.mine);
        eprintln!("  theirs: |{}|", block.theirs);

        match Self::ask("Use (m)ine, (t)heirs or (b)oth?").as_str() {
            "t" | "theirs" => MergeChoice::Theirs,
            "b" | "both" => MergeChoice::Both,
            _ => MergeChoice::Mine,
        }
    }

    fn resolve_file(&mut self, path: &str, binary: bool) -> FileChoice {
        let question = if binary {
            format!("Binary file {} differs. Keep (m)ine or take (t)heirs?", path)
        } else {
            format!("File {} differs. Keep (m)ine, take (t)heirs or m(e)rge?", path)
        };

        match Self::ask(&question).as_str() {
            "t" | "theirs" => FileChoice::Theirs,
            "e" | "merge" if !binary => FileChoice::Merge,
            _ => FileChoice::Mine,
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|level| tracing::Level::from_str(&level).ok())
        .unwrap_or(match (quiet, verbose) {
            (true, _) => tracing::Level::ERROR,
            (_, 0) => tracing::Level::WARN,
            (_, 1) => tracing::Level::INFO,
            (_, 2) => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        });

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn uses_pager(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Log { .. } | Commands::Diff { .. } | Commands::Ls { .. }
    ) && std::io::stdout().is_terminal()
        && std::env::var_os(NO_PAGER_ENV).is_none()
}

fn run(command: Commands, writer: Box<dyn Write>) -> RepoResult<()> {
    let cwd = std::env::current_dir()?;
    let repository = match &command {
        Commands::Offline { .. } => Repository::new(&cwd, writer)?,
        _ => Repository::discover(&cwd, writer)?,
    };

    match command {
        Commands::Offline {
            name,
            track,
            picky,
            strict,
            compress,
            force,
        } => repository.offline(
            name.as_deref(),
            &OfflineOptions {
                track,
                picky,
                strict,
                compress,
                force,
            },
        )?,
        Commands::Online { force } => repository.online(force)?,
        Commands::Branch {
            name,
            message,
            last,
            stay,
        } => {
            repository.branch(
                name.as_deref(),
                message.as_deref(),
                &BranchOptions { last, stay },
            )?;
        }
        Commands::Commit {
            message,
            tag,
            force,
            filters,
        } => {
            repository.commit(
                message.as_deref(),
                &CommitOptions {
                    tag,
                    force,
                    filters: filters.into(),
                },
            )?;
        }
        Commands::Changes { revision, filters } => {
            repository.changes(revision.as_deref(), &filters.into())?;
        }
        Commands::Diff { revision, filters } => {
            repository.diff(revision.as_deref(), &filters.into())?
        }
        Commands::Switch {
            target,
            force,
            meta,
            filters,
        } => {
            repository.switch(
                &target,
                &SwitchOptions {
                    force,
                    meta,
                    filters: filters.into(),
                },
            )?;
        }
        Commands::Update {
            target,
            force,
            add_files,
            remove_files,
            ask_files,
            add_lines,
            remove_lines,
            ask_lines,
            add_chars,
            remove_chars,
            ask_chars,
            eol,
            filters,
        } => {
            let options = UpdateOptions {
                file_operation: merge_operation(add_files, remove_files, ask_files),
                merge: MergeOptions {
                    line_operation: merge_operation(add_lines, remove_lines, ask_lines),
                    char_operation: merge_operation(add_chars, remove_chars, ask_chars),
                    use_remote_eol: eol,
                },
                force,
                filters: filters.into(),
            };
            repository.update(&target, &options, &mut TerminalDecider)?;
        }
        Commands::Delete { branch } => {
            repository.delete(&branch)?;
        }
        Commands::Log { changes } => repository.log(&LogOptions { changes })?,
        Commands::Status => repository.status()?,
        Commands::Add {
            pattern,
            untrack,
            force,
        } => repository.add_pattern(&pattern, untrack, force)?,
        Commands::Rm { pattern, untrack } => repository.remove_pattern(&pattern, untrack)?,
        Commands::Ls {
            folder,
            recursive,
            patterns,
            tags,
        } => repository.ls(
            folder.as_deref(),
            &LsOptions {
                recursive,
                patterns,
                tags,
            },
        )?,
        Commands::Config { action, local } => repository.configure(&action.into(), local)?,
        Commands::HashFile { path } => {
            repository.hash_file(&path)?;
        }
        Commands::CatFile { path, revision } => {
            repository.cat_file(&path, revision.as_deref())?
        }
    }

    repository.writer().flush()?;

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let pager = uses_pager(&cli.command).then(Pager::new);
    let writer: Box<dyn Write> = match &pager {
        Some(pager) => Box::new(PagerWriter::new(pager.clone())),
        None => Box::new(std::io::stdout()),
    };

    let result = run(cli.command, writer).and_then(|_| match pager {
        Some(pager) => minus::page_all(pager)
            .map_err(|error| RepoError::Io(anyhow::anyhow!("Unable to run the pager: {}", error))),
        None => Ok(()),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{:#}", error);
            ExitCode::from(error.exit_code())
        }
    }
}
