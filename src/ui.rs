use crate::app::{boot_effects, update, AppMsg, Effect, Mutation};
use crate::config::Config;
use crate::model::{ExitChoice, ManagedProgram, VpnStatus};
use crate::services::cli_runner::ProcessRunner;
use crate::services::ghostscale::{GhostscaleCli, VpnTool};
use crate::widgets::exit_picker::draw_exit_picker;
use crate::widgets::header::draw_header;
use crate::widgets::program_list::draw_program_list;
use crate::widgets::status_bar::draw_footer;
use crate::widgets::status_view::draw_status_view;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// What a view currently shows. Every value is the last tool answer; nothing
/// is kept beyond that.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) enum ViewState<T> {
    #[default]
    Loading,
    Displayed(T),
    Error(String),
}

impl<T> ViewState<T> {
    /// Leave an error state so the next answer is shown fresh.
    pub(crate) fn begin_refresh(&mut self) {
        if matches!(self, ViewState::Error(_)) {
            *self = ViewState::Loading;
        }
    }

    /// Record a failed refresh. Rows already on screen stay as they are.
    pub(crate) fn fail(&mut self, message: String) {
        if !matches!(self, ViewState::Displayed(_)) {
            *self = ViewState::Error(message);
        }
    }
}

pub(crate) struct ExitPicker {
    pub(crate) choices: Vec<ExitChoice>,
    pub(crate) selected: usize,
}

impl ExitPicker {
    /// Start on the node currently in use, if it is still offered.
    pub(crate) fn new(choices: Vec<ExitChoice>, active: Option<&str>) -> Self {
        let selected = active
            .and_then(|ip| {
                choices
                    .iter()
                    .position(|c| matches!(c, ExitChoice::Node(n) if n == ip))
            })
            .unwrap_or(0);
        Self { choices, selected }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: Option<u64>,
}

#[derive(Default)]
pub(crate) struct AppState {
    pub(crate) status: ViewState<VpnStatus>,
    pub(crate) programs: ViewState<Vec<ManagedProgram>>,
    pub(crate) selected: usize,
    pub(crate) picker: Option<ExitPicker>,
    pub(crate) toast: Option<Toast>,
    pub(crate) tick: u64,
    pub(crate) boot_done: bool,
    pub(crate) should_quit: bool,
    pub(crate) show_debug: bool,
    // Debug log (rendered in bottom debug pane)
    pub(crate) debug_log: VecDeque<String>,
    pub(crate) theme: crate::theme::Theme,
}

impl AppState {
    pub fn dbg(&mut self, msg: impl Into<String>) {
        const MAX_LOG_LINES: usize = 200;
        if self.debug_log.len() >= MAX_LOG_LINES {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(msg.into());
    }

    pub(crate) fn program_count(&self) -> usize {
        match &self.programs {
            ViewState::Displayed(p) => p.len(),
            _ => 0,
        }
    }

    pub(crate) fn active_exit_node(&self) -> Option<&str> {
        match &self.status {
            ViewState::Displayed(st) => st.active_exit_node.as_deref(),
            _ => None,
        }
    }
}

/// Execute effects in order, one blocking tool call at a time. Follow-up
/// effects go to the back of the queue.
pub(crate) fn run_effects(state: &mut AppState, tool: &dyn VpnTool, effects: Vec<Effect>) {
    let mut queue: VecDeque<Effect> = effects.into();
    while let Some(eff) = queue.pop_front() {
        let msg = match eff {
            Effect::FetchStatus => {
                state.dbg(format!("run: {}", tool.describe(&["status"])));
                AppMsg::LoadedStatus(tool.get_status())
            }
            Effect::FetchPrograms => {
                state.dbg(format!("run: {}", tool.describe(&["list"])));
                AppMsg::LoadedPrograms(tool.list_programs())
            }
            Effect::FetchExits => {
                state.dbg(format!("run: {}", tool.describe(&["exits"])));
                AppMsg::LoadedExits(tool.list_exit_nodes())
            }
            Effect::ToggleProgram { name } => {
                state.dbg(format!("run: {}", tool.describe(&["toggle", name.as_str()])));
                let outcome = tool.toggle_program(&name);
                AppMsg::Mutated {
                    action: Mutation::Toggle(name),
                    outcome,
                }
            }
            Effect::SetExit { ip } => {
                state.dbg(format!("run: {}", tool.describe(&["set-exit", ip.as_str()])));
                let outcome = tool.set_exit(&ip);
                AppMsg::Mutated {
                    action: Mutation::SetExit(ip),
                    outcome,
                }
            }
            Effect::DisableExit => {
                state.dbg(format!("run: {}", tool.describe(&["disable-exit"])));
                AppMsg::Mutated {
                    action: Mutation::DisableExit,
                    outcome: tool.disable_exit(),
                }
            }
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => {
                let expires_at_tick = if seconds == 0 {
                    None
                } else {
                    // ~200ms tick
                    Some(state.tick.saturating_add(seconds.saturating_mul(5)))
                };
                state.toast = Some(Toast {
                    text,
                    level,
                    expires_at_tick,
                });
                continue;
            }
        };
        queue.extend(update(state, msg));
    }
}

pub(crate) fn key_to_msg(state: &AppState, key: KeyEvent) -> Option<AppMsg> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(AppMsg::Quit);
    }
    if state.picker.is_some() {
        return match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(AppMsg::PickerPrev),
            KeyCode::Down | KeyCode::Char('j') => Some(AppMsg::PickerNext),
            KeyCode::Enter => Some(AppMsg::PickerApply),
            KeyCode::Esc | KeyCode::Char('q') => Some(AppMsg::PickerCancel),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(AppMsg::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(AppMsg::SelectPrev),
        KeyCode::Down | KeyCode::Char('j') => Some(AppMsg::SelectNext),
        KeyCode::Home => Some(AppMsg::SelectFirst),
        KeyCode::End => Some(AppMsg::SelectLast),
        KeyCode::Enter | KeyCode::Char(' ') => Some(AppMsg::ToggleSelected),
        KeyCode::Char('e') => Some(AppMsg::OpenExitPicker),
        KeyCode::Char('r') => Some(AppMsg::Refresh),
        KeyCode::Char('d') => Some(AppMsg::ToggleDebug),
        _ => None,
    }
}

fn boot_once(state: &mut AppState, tool: &dyn VpnTool) {
    if !state.boot_done {
        state.boot_done = true;
        run_effects(state, tool, boot_effects());
    }
}

pub fn run() -> Result<()> {
    let cfg = Config::from_env()?;
    let tool = GhostscaleCli::new(ProcessRunner::new(cfg.tool_argv.clone()));
    let mut state = AppState {
        show_debug: cfg.debug_pane,
        theme: crate::theme::Theme::synthwave_dark(),
        ..Default::default()
    };
    state.dbg(format!("tool: {}", cfg.tool_argv.join(" ")));
    let tick_rate = Duration::from_millis(200);

    if cfg.headless {
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend)?;
        for _ in 0..cfg.headless_ticks {
            terminal.draw(|f| ui(f, &mut state))?;
            boot_once(&mut state, &tool);
            state.tick = state.tick.wrapping_add(1);
            std::thread::sleep(tick_rate);
        }
        if cfg.headless_summary {
            let status = match &state.status {
                ViewState::Loading => serde_json::Value::Null,
                ViewState::Displayed(st) => serde_json::json!({
                    "active": st.is_active(),
                    "active_exit_node": st.active_exit_node,
                }),
                ViewState::Error(e) => serde_json::json!({ "error": e }),
            };
            let programs = match &state.programs {
                ViewState::Loading => serde_json::Value::Null,
                ViewState::Displayed(p) => serde_json::Value::Array(
                    p.iter()
                        .map(|p| serde_json::json!({"name": p.name, "status": p.status.as_str()}))
                        .collect(),
                ),
                ViewState::Error(e) => serde_json::json!({ "error": e }),
            };
            let ok = !matches!(state.status, ViewState::Error(_))
                && !matches!(state.programs, ViewState::Error(_));
            let summary = serde_json::json!({
                "ok": ok,
                "status": status,
                "programs": programs,
            });
            println!("{summary}");
        }
        return Ok(());
    }

    // Setup terminal (interactive). The guard restores it on every exit path.
    let _guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;
    let mut last_tick = Instant::now();
    let res = loop {
        // First frame shows the loading state before the blocking boot calls
        if let Err(e) = terminal.draw(|f| ui(f, &mut state)) {
            break Err(e.into());
        }
        boot_once(&mut state, &tool);
        if state.should_quit {
            break Ok(());
        }
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        match event::poll(timeout) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(msg) = key_to_msg(&state, key) {
                        let effects = update(&mut state, msg);
                        run_effects(&mut state, &tool, effects);
                    }
                }
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }
        if state.should_quit {
            break Ok(());
        }
        if last_tick.elapsed() >= tick_rate {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    };
    terminal.show_cursor()?;
    res
}

/// Raw mode plus the alternate screen, undone on drop. Dropping also runs
/// during unwinding, so a panic in the loop leaves a usable shell.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        // Built before entering the alternate screen so a failure there
        // still disables raw mode.
        let guard = TerminalGuard;
        execute!(std::io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
    }
}

fn ui(f: &mut Frame, state: &mut AppState) {
    // Clear expired toast
    if let Some(t) = &state.toast {
        if t.expires_at_tick.is_some_and(|exp| state.tick >= exp) {
            state.toast = None;
        }
    }

    let screen = f.area();
    f.render_widget(Block::default().style(state.theme.base_style()), screen);

    const DEBUG_H: u16 = 6;
    let mut constraints = vec![
        Constraint::Length(2), // Header
        Constraint::Length(3), // Status
        Constraint::Min(3),    // Programs
    ];
    if state.show_debug {
        constraints.push(Constraint::Length(DEBUG_H));
    }
    constraints.push(Constraint::Length(1)); // Footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(screen);

    draw_header(f, chunks[0], state);
    draw_status_view(f, chunks[1], state);
    draw_program_list(f, chunks[2], state);
    let footer_chunk = if state.show_debug {
        draw_debug(f, chunks[3], state);
        chunks[4]
    } else {
        chunks[3]
    };
    let help = if state.picker.is_some() {
        "↑/↓ choose  Enter apply  Esc cancel"
    } else {
        "↑/↓ select  Enter/Space toggle  e exit node  r refresh  d debug  q quit"
    };
    draw_footer(f, footer_chunk, state, help);

    // Popup goes last so it sits above everything
    if state.picker.is_some() {
        draw_exit_picker(f, screen, state);
    }
}

fn draw_debug(f: &mut Frame, area: Rect, state: &AppState) {
    let b = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            "Debug",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ));
    // Take the last lines that fit below the border
    let h = area.height.saturating_sub(1) as usize;
    let start = state.debug_log.len().saturating_sub(h);
    let lines: Vec<Line> = state
        .debug_log
        .iter()
        .skip(start)
        .map(|s| Line::raw(s.clone()))
        .collect();
    let p = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .block(b)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

#[cfg(test)]
pub(crate) fn render_to_string(state: &mut AppState, width: u16, height: u16) -> String {
    let backend = ratatui::backend::TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|f| ui(f, state)).unwrap();
    let buf = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buf.area.height {
        for x in 0..buf.area.width {
            out.push_str(buf[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgramStatus;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn failed_refresh_keeps_displayed_rows() {
        let rows = vec![ManagedProgram {
            name: "vpnApp".into(),
            status: ProgramStatus::Enabled,
        }];
        let mut v = ViewState::Displayed(rows.clone());
        v.fail("bad yaml".into());
        assert_eq!(v, ViewState::Displayed(rows));

        let mut empty: ViewState<Vec<ManagedProgram>> = ViewState::Loading;
        empty.fail("bad yaml".into());
        assert_eq!(empty, ViewState::Error("bad yaml".into()));
        empty.begin_refresh();
        assert_eq!(empty, ViewState::Loading);
    }

    #[test]
    fn terminal_guard_leaves_raw_mode_when_loop_panics() {
        // Without a tty `enter` fails; either way raw mode must be off after.
        let outcome = std::panic::catch_unwind(|| {
            let _guard = TerminalGuard::enter();
            panic!("draw failed");
        });
        assert!(outcome.is_err());
        assert!(!crossterm::terminal::is_raw_mode_enabled().unwrap_or(false));
    }

    #[test]
    fn picker_preselects_active_node() {
        let choices = vec![
            ExitChoice::Disable,
            ExitChoice::Node("1.1.1.1".into()),
            ExitChoice::Node("2.2.2.2".into()),
        ];
        assert_eq!(ExitPicker::new(choices.clone(), Some("2.2.2.2")).selected, 2);
        assert_eq!(ExitPicker::new(choices.clone(), Some("9.9.9.9")).selected, 0);
        assert_eq!(ExitPicker::new(choices, None).selected, 0);
    }

    #[test]
    fn keys_route_to_picker_while_open() {
        let mut st = AppState::default();
        assert!(matches!(
            key_to_msg(&st, press(KeyCode::Esc)),
            Some(AppMsg::Quit)
        ));
        st.picker = Some(ExitPicker::new(vec![ExitChoice::Disable], None));
        assert!(matches!(
            key_to_msg(&st, press(KeyCode::Esc)),
            Some(AppMsg::PickerCancel)
        ));
        assert!(matches!(
            key_to_msg(&st, press(KeyCode::Enter)),
            Some(AppMsg::PickerApply)
        ));
    }

    #[test]
    fn key_release_is_ignored() {
        let st = AppState::default();
        let mut ev = press(KeyCode::Char('r'));
        ev.kind = KeyEventKind::Release;
        assert!(key_to_msg(&st, ev).is_none());
    }

    #[test]
    fn debug_log_is_bounded() {
        let mut st = AppState::default();
        for i in 0..250 {
            st.dbg(format!("line {i}"));
        }
        assert_eq!(st.debug_log.len(), 200);
        assert_eq!(st.debug_log.front().map(String::as_str), Some("line 50"));
    }

    #[test]
    fn first_frame_shows_loading() {
        let mut st = AppState::default();
        let screen = render_to_string(&mut st, 80, 20);
        assert!(screen.contains("Loading status..."));
        assert!(screen.contains("Ghostscale VPN Wrapper Manager"));
    }
}
