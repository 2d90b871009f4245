use clap::{CommandFactory, Parser};
use log::{debug, warn};
use std::io::{self, BufRead};
use tasktrash_cli::cli::{Cli, Command, collect_overrides, split_command_line};
use tasktrash_cli::render::{Sections, TerminalRenderer, task_json, tasks_json, view_json};
use tasktrash_core::Command as CoreCommand;
use tasktrash_core::config::{Config, load_config_with_fallback, merge_overrides};
use tasktrash_core::error::AppError;
use tasktrash_core::storage::FileStore;
use tasktrash_core::{Outcome, Task, TodoApp};

type App = TodoApp<FileStore>;

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn load_config(cli: &Cli) -> Result<Config, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error {
        warn!("using default configuration: {err}");
    }
    let overrides = collect_overrides(cli)?;
    Ok(merge_overrides(&loaded.config, &overrides))
}

fn open_app(config: &Config) -> Result<App, AppError> {
    let path = config.resolve_store_path()?;
    debug!("opening store at {}", path.display());
    Ok(TodoApp::open(FileStore::open(path)))
}

fn render_view(app: &App, json: bool, sections: Sections) -> Result<(), AppError> {
    if json {
        println!("{}", view_json(&app.view(), sections));
        return Ok(());
    }

    let stdout = io::stdout();
    let mut renderer = TerminalRenderer::new(stdout.lock(), sections);
    app.render_with(&mut renderer)
}

fn describe(task: &Task) -> String {
    format!("{} ({})", task.text, task.id)
}

fn print_deleted(deleted: &[Task], json: bool) {
    if json {
        println!("{}", tasks_json(deleted));
    } else if deleted.is_empty() {
        println!("Nothing deleted: no matching active task");
    } else {
        for task in deleted {
            println!("Moved to trash: {}", describe(task));
        }
    }
}

fn run_command(
    app: &mut App,
    command: Command,
    json: bool,
    in_session: bool,
) -> Result<(), AppError> {
    if command.needs_session() && !in_session {
        return Err(AppError::invalid_input(
            "selection commands are only available in an interactive session",
        ));
    }

    match command {
        Command::Add { text } => {
            if let Outcome::Added(task) = app.dispatch(CoreCommand::AddTask(text.join(" ")))? {
                if json {
                    println!("{}", task_json(&task));
                } else {
                    println!("Added task: {}", describe(&task));
                }
            }
        }
        Command::Delete { ids } => {
            let deleted = match ids.as_slice() {
                [id] => match app.dispatch(CoreCommand::DeleteOne(*id))? {
                    Outcome::Deleted(deleted) => deleted,
                    _ => Vec::new(),
                },
                _ => app.delete_many(&ids.iter().copied().collect())?,
            };
            print_deleted(&deleted, json);
        }
        Command::Restore { id } => match app.dispatch(CoreCommand::RestoreOne(id))? {
            Outcome::Restored(task) if json => println!("{}", task_json(&task)),
            Outcome::Restored(task) => println!("Restored task: {}", describe(&task)),
            _ if json => println!("null"),
            _ => println!("Nothing restored: task {id} is not in trash"),
        },
        Command::ClearTrash => {
            if let Outcome::TrashCleared { purged } = app.dispatch(CoreCommand::ClearTrash)? {
                if json {
                    println!("{}", serde_json::json!({ "purged": purged }));
                } else {
                    println!("Cleared trash: {purged} task(s) removed");
                }
            }
        }
        Command::List { trash } => {
            let sections = if trash { Sections::TrashOnly } else { Sections::All };
            render_view(app, json, sections)?;
        }
        Command::Toggle { id } => {
            if app.dispatch(CoreCommand::ToggleSelection(id))? == Outcome::Ignored && !json {
                println!("Nothing toggled: task {id} is not active");
            }
            render_view(app, json, Sections::All)?;
        }
        Command::SelectAll => {
            app.dispatch(CoreCommand::SelectAllToggle)?;
            render_view(app, json, Sections::All)?;
        }
        Command::DeleteSelected => {
            match app.dispatch(CoreCommand::DeleteSelected)? {
                Outcome::Deleted(deleted) if !json => {
                    println!("Moved to trash: {} task(s)", deleted.len())
                }
                Outcome::Ignored if !json => println!("Nothing selected"),
                _ => {}
            }
            render_view(app, json, Sections::All)?;
        }
    }

    Ok(())
}

fn run_interactive(config: &Config) -> Result<(), AppError> {
    let mut app = open_app(config)?;

    let mut buf = Vec::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        buf.clear();
        let bytes = stdin_lock.read_until(b'\n', &mut buf)?;

        if bytes == 0 {
            break;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(_) => {
                eprintln!(
                    "ERROR: {}",
                    AppError::invalid_input("input is not valid UTF-8")
                );
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("tasktrash".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if cli.namespace.is_some() || !cli.config_override.is_empty() {
            warn!("configuration flags are ignored inside a session");
        }

        if let Err(err) = run_command(&mut app, cli.command, cli.json, true) {
            eprintln!("ERROR: {}", err);
        }
    }

    debug!("session closed");
    Ok(())
}

fn run_once(cli: Cli) -> Result<(), AppError> {
    let config = load_config(&cli)?;
    let mut app = open_app(&config)?;
    run_command(&mut app, cli.command, cli.json, false)
}

fn main() {
    tasktrash_core::logging::init_logging();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        let config = load_config_with_fallback();
        if let Some(err) = config.error.as_ref() {
            warn!("using default configuration: {err}");
        }
        if let Err(err) = run_interactive(&config.config) {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_once(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
