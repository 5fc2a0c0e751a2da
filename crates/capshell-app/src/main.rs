//! capshell entry point.
//!
//! With no subcommand, takes over the terminal and runs the interactive
//! shell. `run`, `list`, `status` and `health` work without a terminal and
//! print to stdout.

mod cli;
mod modules;

use std::fs::File;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

use capshell_registry::{CommandOutput, ModuleRegistry};
use capshell_shell::builtins::{self, BuiltinContext, BuiltinOutcome};
use capshell_shell::{CommandRouter, ExitKind, Route, ShellSession, run_session};
use capshell_term::input::spawn_input_thread;
use capshell_term::{StdoutBackend, TerminalBackend, Theme};
use capshell_types::config::ShellConfig;
use capshell_types::input::{InputEvent, Key};

use cli::{Cli, Commands};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let config = ShellConfig::resolve(cli.config.as_deref()).context("loading shell config")?;
    let registry = modules::build_registry().context("registering bundled modules")?;
    log::info!("registered modules: {}", registry.list().join(", "));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;

    runtime.block_on(async {
        match cli.command {
            None | Some(Commands::Shell) => shell(registry, config).await,
            Some(command @ Commands::Run { .. }) => {
                let line = command.line().unwrap_or_default();
                run_once(&registry, config, &line).await
            },
            Some(Commands::List) => {
                list(&registry);
                Ok(ExitCode::SUCCESS)
            },
            Some(Commands::Status { json }) => {
                initialize(&registry).await;
                print_statuses(&registry, json)?;
                Ok(ExitCode::SUCCESS)
            },
            Some(Commands::Health { json }) => {
                initialize(&registry).await;
                registry.health_check().await;
                print_statuses(&registry, json)?;
                let healthy = registry.list().iter().all(|name| registry.is_active(name));
                Ok(if healthy { ExitCode::SUCCESS } else { ExitCode::FAILURE })
            },
        }
    })
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

async fn initialize(registry: &ModuleRegistry) {
    if let Err(e) = registry.initialize_all().await {
        log::warn!("{e}");
    }
}

async fn shell(registry: Rc<ModuleRegistry>, config: ShellConfig) -> Result<ExitCode> {
    let backend = StdoutBackend::new();
    if !backend.is_tty() {
        log::warn!("stdout is not a terminal; drawing anyway");
    }
    initialize(&registry).await;

    let (tx, mut rx) = unbounded_channel();
    let input_tx = tx.clone();
    spawn_input_thread(move |event| input_tx.send(event).is_ok());
    forward_signals(tx);

    install_panic_hook();
    let mut session = ShellSession::new(backend, registry, config);
    let exit = run_session(&mut session, &mut rx).await;
    drop(session);

    match exit? {
        ExitKind::Forced => Ok(ExitCode::from(130)),
        ExitKind::Hangup => Ok(ExitCode::from(129)),
        ExitKind::Exit | ExitKind::EndOfInput => {
            println!("Goodbye.");
            Ok(ExitCode::SUCCESS)
        },
    }
}

/// Restore the terminal before the default hook prints the panic.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show,
        );
        original_hook(info);
    }));
}

/// SIGINT becomes an interrupt key; SIGTERM and SIGHUP end the session.
fn forward_signals(tx: UnboundedSender<InputEvent>) {
    let interrupt_tx = tx.clone();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if interrupt_tx.send(Key::Interrupt.into()).is_err() {
                break;
            }
        }
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        for kind in [SignalKind::terminate(), SignalKind::hangup()] {
            let tx = tx.clone();
            match signal(kind) {
                Ok(mut stream) => {
                    tokio::spawn(async move {
                        if stream.recv().await.is_some() {
                            log::info!("termination signal received");
                            let _ = tx.send(InputEvent::Hangup);
                        }
                    });
                },
                Err(e) => log::warn!("cannot listen for {kind:?}: {e}"),
            }
        }
    }
}

/// Dispatch one line through the same router the shell uses.
async fn run_once(registry: &ModuleRegistry, mut config: ShellConfig, line: &str) -> Result<ExitCode> {
    initialize(registry).await;
    let router = CommandRouter::new();

    let output = match router.route(line, registry) {
        Route::Empty => return Ok(ExitCode::SUCCESS),
        Route::Builtin { run, args, .. } => {
            let theme = Theme::named(&config.theme).unwrap_or_default();
            let mut ctx = BuiltinContext {
                registry,
                config: &mut config,
                theme: &theme,
            };
            match run(&mut ctx, &args) {
                Ok(BuiltinOutcome::Output(output)) => Ok(output),
                Ok(BuiltinOutcome::SetTheme(theme)) => {
                    Ok(CommandOutput::text(format!("theme set to {}", theme.name)))
                },
                Ok(BuiltinOutcome::Exit) => Ok(CommandOutput::None),
                Err(e) => Err(e),
            }
        },
        Route::Module { handler, flags, .. } => handler.run(&flags).await,
        Route::ModuleHelp(name) => builtins::module_detail(registry, &name).map(CommandOutput::Text),
        Route::Error { message, hint } => {
            eprintln!("✗ {message} ({hint})");
            return Ok(ExitCode::from(2));
        },
    };

    match output {
        Ok(output) => {
            for line in output.lines() {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        },
        Err(e) => {
            eprintln!("✗ {e}");
            Ok(ExitCode::FAILURE)
        },
    }
}

fn list(registry: &ModuleRegistry) {
    let rows = registry
        .get_all()
        .into_iter()
        .map(|(name, module)| {
            vec![
                name,
                module.version().to_string(),
                module.commands().len().to_string(),
                module.description().to_string(),
            ]
        })
        .collect();
    let table = CommandOutput::Table {
        headers: ["MODULE", "VERSION", "COMMANDS", "DESCRIPTION"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows,
    };
    for line in table.lines() {
        println!("{line}");
    }
}

fn print_statuses(registry: &ModuleRegistry, json: bool) -> Result<()> {
    let statuses = registry.get_all_statuses();
    if json {
        let records: Vec<_> = statuses.values().collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    let table = CommandOutput::Table {
        headers: capshell_registry::StatusRecord::headers(),
        rows: statuses.values().map(|s| s.row()).collect(),
    };
    for line in table.lines() {
        println!("{line}");
    }
    Ok(())
}
