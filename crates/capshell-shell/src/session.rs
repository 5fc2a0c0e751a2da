//! The interactive session state machine.
//!
//! [`ShellSession`] reacts to one [`InputEvent`] at a time and tells the
//! caller what to do next through [`Step`]. Module handlers are not run here:
//! a submitted module command comes back as [`Step::Execute`] and the caller
//! awaits it, then reports the result with [`ShellSession::finish`]. Time is
//! passed in with every event, so the interrupt window can be tested
//! without a clock.

use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use capshell_registry::{CommandHandler, CommandOutput, ModuleRegistry};
use capshell_term::{Border, Color, ProgressBar, Surface, TerminalBackend, Theme};
use capshell_types::config::ShellConfig;
use capshell_types::error::{CapshellError, Result};
use capshell_types::flags::Flags;
use capshell_types::input::{InputEvent, Key};

use crate::builtins::{self, BuiltinContext, BuiltinOutcome};
use crate::completion::complete;
use crate::history::History;
use crate::interrupt::{InterruptGuard, InterruptOutcome};
use crate::layout::{ContentPane, ScreenLayout};
use crate::router::{CommandRouter, Route};

const ERROR_MARKER: &str = "✗";
const HEALTH_GAUGE_WIDTH: usize = 10;
const DEFAULT_HINT: &str = "Tab complete · ↑/↓ history · 'help' for commands · Ctrl+C twice to quit";

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Banner shown, waiting for the first key.
    Welcome,
    /// Editing a line.
    Prompt,
    /// A module command is running.
    Executing,
    /// Finished. The terminal has been released.
    Terminated,
}

/// Why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// `exit` or `quit`.
    Exit,
    /// Ctrl+D or the input stream closed.
    EndOfInput,
    /// Second interrupt inside the force-exit window.
    Forced,
    /// SIGTERM or SIGHUP.
    Hangup,
}

/// A module command the caller has to run.
pub struct PendingCommand {
    pub label: String,
    pub handler: Rc<dyn CommandHandler>,
    pub flags: Flags,
}

impl PendingCommand {
    /// Run the handler to completion.
    pub async fn run(self) -> Result<CommandOutput> {
        self.handler.run(&self.flags).await
    }
}

impl fmt::Debug for PendingCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCommand")
            .field("label", &self.label)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// What the driver should do after an event.
#[derive(Debug)]
pub enum Step {
    Continue,
    Execute(PendingCommand),
    Terminate(ExitKind),
}

/// One interactive session. Owns the terminal surface until it terminates
/// or is dropped; the surface restores the terminal in both cases.
pub struct ShellSession<B: TerminalBackend> {
    surface: Surface<B>,
    registry: Rc<ModuleRegistry>,
    router: CommandRouter,
    config: ShellConfig,
    theme: Theme,
    layout: ScreenLayout,
    pane: ContentPane,
    history: History,
    input: String,
    mode: Mode,
    guard: InterruptGuard,
    running: Option<String>,
    pending_eof: bool,
    exit: Option<ExitKind>,
}

impl<B: TerminalBackend> ShellSession<B> {
    pub fn new(backend: B, registry: Rc<ModuleRegistry>, config: ShellConfig) -> Self {
        let surface = Surface::new(backend);
        let theme = Theme::named(&config.theme).unwrap_or_else(|| {
            log::warn!("unknown theme '{}', using default", config.theme);
            Theme::default()
        });
        let (cols, rows) = surface.size();
        let layout = ScreenLayout::new(cols, rows);
        let pane = ContentPane::new(&layout, config.scroll_batch);
        let guard = InterruptGuard::new(Duration::from_millis(config.force_exit_ms));
        Self {
            surface,
            registry,
            router: CommandRouter::new(),
            config,
            theme,
            layout,
            pane,
            history: History::new(),
            input: String::new(),
            mode: Mode::Welcome,
            guard,
            running: None,
            pending_eof: false,
            exit: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The unsubmitted line on the prompt.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn pane(&self) -> &ContentPane {
        &self.pane
    }

    pub fn layout(&self) -> ScreenLayout {
        self.layout
    }

    pub fn surface(&self) -> &Surface<B> {
        &self.surface
    }

    pub fn exit_kind(&self) -> Option<ExitKind> {
        self.exit
    }

    /// When a pending interrupt window closes, if one is armed.
    pub fn interrupt_deadline(&self) -> Option<Instant> {
        self.guard.deadline()
    }

    /// Take over the terminal and draw the first screen.
    pub fn start(&mut self) -> Result<()> {
        self.surface.acquire()?;
        self.draw_header()?;
        if self.config.welcome {
            self.mode = Mode::Welcome;
            self.draw_welcome()?;
        } else {
            self.mode = Mode::Prompt;
            self.draw_prompt()?;
        }
        self.draw_hint(DEFAULT_HINT, self.theme.muted)?;
        self.surface.flush()?;
        log::info!("shell session started ({} modules)", self.registry.list().len());
        Ok(())
    }

    /// Feed one input event observed at `now`.
    pub fn handle_event(&mut self, event: InputEvent, now: Instant) -> Result<Step> {
        if self.mode == Mode::Terminated {
            return Ok(Step::Continue);
        }
        self.expire_interrupt(now)?;

        let step = match event {
            InputEvent::Hangup => return self.terminate(ExitKind::Hangup),
            InputEvent::Resize { cols, rows } => {
                self.resize(cols, rows)?;
                Step::Continue
            },
            InputEvent::Key(Key::Interrupt) => self.interrupt(now)?,
            InputEvent::Key(key) => match self.mode {
                Mode::Welcome => self.welcome_key(key)?,
                Mode::Prompt => self.prompt_key(key)?,
                Mode::Executing => {
                    if key == Key::EndOfInput {
                        log::debug!("end of input deferred until the running command settles");
                        self.pending_eof = true;
                    }
                    Step::Continue
                },
                Mode::Terminated => Step::Continue,
            },
        };
        if !matches!(step, Step::Terminate(_)) {
            self.surface.flush()?;
        }
        Ok(step)
    }

    /// Report the outcome of the command handed out by [`Step::Execute`].
    pub fn finish(&mut self, result: Result<CommandOutput>) -> Result<Step> {
        if self.mode != Mode::Executing {
            return Ok(Step::Continue);
        }
        let label = self.running.take().unwrap_or_default();
        match result {
            Ok(output) => self.render_output(output)?,
            Err(e) => {
                log::debug!("{label} failed: {e}");
                self.render_error(&e)?;
            },
        }
        self.mode = Mode::Prompt;
        if self.pending_eof {
            return self.terminate(ExitKind::EndOfInput);
        }
        self.draw_prompt()?;
        self.restore_hint()?;
        self.surface.flush()?;
        Ok(Step::Continue)
    }

    /// Disarm the interrupt window if it has elapsed at `now`.
    pub fn expire_interrupt(&mut self, now: Instant) -> Result<()> {
        if self.guard.expire(now) && self.mode != Mode::Terminated {
            self.restore_hint()?;
            self.surface.flush()?;
        }
        Ok(())
    }

    /// Release the terminal without going through the state machine.
    pub fn release(&mut self) -> Result<()> {
        self.surface.release()
    }

    fn terminate(&mut self, kind: ExitKind) -> Result<Step> {
        self.mode = Mode::Terminated;
        self.exit = Some(kind);
        log::info!("shell session ended: {kind:?}");
        self.surface.release()?;
        Ok(Step::Terminate(kind))
    }

    fn interrupt(&mut self, now: Instant) -> Result<Step> {
        match self.guard.on_interrupt(now) {
            InterruptOutcome::ForceExit => self.terminate(ExitKind::Forced),
            InterruptOutcome::Warned => {
                if self.mode == Mode::Prompt {
                    self.input.clear();
                    self.draw_prompt()?;
                }
                let secs = self.guard.window().as_secs_f32();
                let warning = format!("Press Ctrl+C again within {secs:.0}s to force quit");
                self.draw_hint(&warning, self.theme.warning)?;
                Ok(Step::Continue)
            },
        }
    }

    fn welcome_key(&mut self, key: Key) -> Result<Step> {
        if key == Key::EndOfInput {
            return self.terminate(ExitKind::EndOfInput);
        }
        if key.is_printable() {
            self.mode = Mode::Prompt;
            self.pane.clear(&mut self.surface)?;
            self.draw_prompt()?;
        }
        Ok(Step::Continue)
    }

    fn prompt_key(&mut self, key: Key) -> Result<Step> {
        match key {
            Key::Char(c) if key.is_printable() => self.input.push(c),
            Key::Backspace => {
                self.input.pop();
            },
            Key::Escape => self.input.clear(),
            Key::HistoryPrev => {
                if let Some(line) = self.history.older(&self.input) {
                    self.input = line;
                }
            },
            Key::HistoryNext => {
                if let Some(line) = self.history.newer() {
                    self.input = line;
                }
            },
            Key::Tab => self.complete()?,
            Key::Enter => return self.submit(),
            Key::EndOfInput => return self.terminate(ExitKind::EndOfInput),
            Key::Char(_) | Key::Interrupt | Key::Other => {},
        }
        self.draw_prompt()?;
        Ok(Step::Continue)
    }

    fn complete(&mut self) -> Result<()> {
        let names = self.router.builtin_names();
        let completion = complete(&self.input, &names, &self.registry);
        if completion.candidates.len() > 1 {
            let listing = completion.candidates.join("  ");
            self.pane.write_line(&mut self.surface, &listing, self.theme.muted)?;
        }
        self.input = completion.line;
        Ok(())
    }

    fn submit(&mut self) -> Result<Step> {
        let line = std::mem::take(&mut self.input);
        self.history.push(&line);
        let echo = format!("{}{line}", self.config.prompt);
        self.pane.write_line(&mut self.surface, &echo, self.theme.muted)?;

        match self.router.route(&line, &self.registry) {
            Route::Empty => {},
            Route::Builtin { name, run, args } => {
                log::debug!("built-in {name}");
                let mut ctx = BuiltinContext {
                    registry: &self.registry,
                    config: &mut self.config,
                    theme: &self.theme,
                };
                match run(&mut ctx, &args) {
                    Ok(BuiltinOutcome::Output(output)) => self.render_output(output)?,
                    Ok(BuiltinOutcome::SetTheme(theme)) => self.apply_theme(theme)?,
                    Ok(BuiltinOutcome::Exit) => return self.terminate(ExitKind::Exit),
                    Err(e) => self.render_error(&e)?,
                }
                self.sync_config();
            },
            Route::Module { label, handler, flags } => {
                log::debug!("dispatching {label}");
                self.mode = Mode::Executing;
                self.running = Some(label.clone());
                self.draw_executing(&label)?;
                return Ok(Step::Execute(PendingCommand { label, handler, flags }));
            },
            Route::ModuleHelp(name) => match builtins::module_detail(&self.registry, &name) {
                Ok(text) => self.render_output(CommandOutput::Text(text))?,
                Err(e) => self.render_error(&e)?,
            },
            Route::Error { message, hint } => {
                let line = format!("{ERROR_MARKER} {message} ({hint})");
                self.pane.write_line(&mut self.surface, &line, self.theme.error)?;
            },
        }
        self.draw_prompt()?;
        Ok(Step::Continue)
    }

    /// Push config edits that take effect immediately.
    fn sync_config(&mut self) {
        self.pane.set_batch(self.config.scroll_batch);
        if self.guard.window() != Duration::from_millis(self.config.force_exit_ms) {
            self.guard = InterruptGuard::new(Duration::from_millis(self.config.force_exit_ms));
        }
    }

    fn apply_theme(&mut self, theme: Theme) -> Result<()> {
        log::info!("theme set to {}", theme.name);
        self.theme = theme;
        self.draw_header()?;
        let note = format!("theme set to {}", self.theme.name);
        self.pane.write_line(&mut self.surface, &note, self.theme.success)?;
        self.restore_hint()
    }

    fn resize(&mut self, cols: u16, rows: u16) -> Result<()> {
        self.layout = ScreenLayout::new(cols, rows);
        self.pane.resize(&self.layout);
        self.surface.clear_screen()?;
        self.draw_header()?;
        self.pane.redraw(&mut self.surface)?;
        match self.mode {
            Mode::Executing => {
                let label = self.running.clone().unwrap_or_default();
                self.draw_executing(&label)?;
            },
            // The banner lives in the pane and was repainted above.
            Mode::Welcome => {},
            _ => self.draw_prompt()?,
        }
        self.restore_hint()
    }

    // -- Rendering --

    fn render_output(&mut self, output: CommandOutput) -> Result<()> {
        match output {
            CommandOutput::Clear => self.pane.clear(&mut self.surface),
            other => {
                for line in other.lines() {
                    self.pane.write_line(&mut self.surface, &line, self.theme.text)?;
                }
                Ok(())
            },
        }
    }

    /// One line: marker and the first line of the message.
    fn render_error(&mut self, error: &CapshellError) -> Result<()> {
        let message = error.to_string();
        let first = message.lines().next().unwrap_or_default();
        let line = format!("{ERROR_MARKER} {first}");
        self.pane.write_line(&mut self.surface, &line, self.theme.error)
    }

    fn draw_header(&mut self) -> Result<()> {
        let title = format!("capshell {}", env!("CARGO_PKG_VERSION"));
        let border = Border::new(self.layout.cols, 3)
            .style(self.theme.border)
            .title(&title);
        self.surface.draw_border(0, 0, &border, self.theme.accent)?;

        let total = self.registry.list().len();
        let active = self
            .registry
            .list()
            .iter()
            .filter(|name| self.registry.is_active(name))
            .count();
        let summary = format!("{active}/{total} modules active · theme {}", self.theme.name);
        let room = usize::from(self.layout.cols.saturating_sub(4));
        let summary: String = summary.chars().take(room).collect();
        self.surface.print_at(2, 1, &summary)?;

        // Health gauge on the right, when it fits beside the summary.
        let ratio = if total == 0 { 0.0 } else { active as f32 / total as f32 };
        let gauge = ProgressBar::new(ratio, HEALTH_GAUGE_WIDTH)
            .style(self.theme.progress)
            .with_label();
        let gauge_cols = gauge.render().chars().count() + 2;
        if summary.chars().count() + gauge_cols + 4 < usize::from(self.layout.cols) {
            let col = usize::from(self.layout.cols) - gauge_cols;
            self.surface
                .draw_progress(col as u16, 1, &gauge, self.theme.success)?;
        }
        Ok(())
    }

    fn draw_welcome(&mut self) -> Result<()> {
        let count = self.registry.list().len();
        let lines = [
            "Welcome to capshell.".to_string(),
            String::new(),
            format!("{count} capability modules registered. Type 'help' to list them."),
            "Press any key to begin.".to_string(),
        ];
        for line in &lines {
            self.pane.write_line(&mut self.surface, line, self.theme.accent)?;
        }
        Ok(())
    }

    fn draw_prompt(&mut self) -> Result<()> {
        let row = self.layout.prompt_row();
        let prompt = self.config.prompt.clone();
        let prompt_width = prompt.chars().count();
        let room = usize::from(self.layout.cols).saturating_sub(prompt_width + 1);
        let shown: String = {
            let len = self.input.chars().count();
            self.input.chars().skip(len.saturating_sub(room)).collect()
        };

        self.surface.clear_line(row)?;
        self.surface.print_styled(&prompt, self.theme.accent)?;
        self.surface.print(&shown)?;
        let col = (prompt_width + shown.chars().count()).min(usize::from(u16::MAX)) as u16;
        self.surface.move_to(col, row)?;
        self.surface.show_cursor()
    }

    fn draw_executing(&mut self, label: &str) -> Result<()> {
        let row = self.layout.prompt_row();
        self.surface.clear_line(row)?;
        self.surface.hide_cursor()?;
        self.surface.print_styled(&format!("running {label}..."), self.theme.muted)?;
        self.draw_hint("Ctrl+C twice to force quit", self.theme.muted)
    }

    fn draw_hint(&mut self, text: &str, color: Color) -> Result<()> {
        let row = self.layout.hint_row();
        let text: String = text.chars().take(usize::from(self.layout.cols)).collect();
        self.surface.clear_line(row)?;
        self.surface.print_styled(&text, color)?;
        if self.mode == Mode::Prompt {
            // Put the cursor back on the prompt line.
            let col = self.config.prompt.chars().count() + self.input.chars().count();
            let col = col.min(usize::from(self.layout.cols.saturating_sub(1))) as u16;
            self.surface.move_to(col, self.layout.prompt_row())?;
        }
        Ok(())
    }

    fn restore_hint(&mut self) -> Result<()> {
        if self.guard.is_armed() {
            return Ok(());
        }
        match self.mode {
            Mode::Executing => self.draw_hint("Ctrl+C twice to force quit", self.theme.muted),
            _ => self.draw_hint(DEFAULT_HINT, self.theme.muted),
        }
    }
}
