use crate::error::ToolError;
use crate::model::{exit_choices, ExitChoice, ExitNode, ManagedProgram, VpnStatus};
use crate::ui::{AppState, ExitPicker, ToastLevel, ViewState};

/// A command that changes state inside the VPN wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Toggle(String),
    SetExit(String),
    DisableExit,
}

pub enum AppMsg {
    Refresh,
    SelectPrev,
    SelectNext,
    SelectFirst,
    SelectLast,
    ToggleSelected,
    OpenExitPicker,
    PickerPrev,
    PickerNext,
    PickerApply,
    PickerCancel,
    ToggleDebug,
    Quit,
    LoadedStatus(Result<VpnStatus, ToolError>),
    LoadedPrograms(Result<Vec<ManagedProgram>, ToolError>),
    LoadedExits(Result<Vec<ExitNode>, ToolError>),
    Mutated {
        action: Mutation,
        outcome: Result<String, ToolError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchStatus,
    FetchPrograms,
    FetchExits,
    ToggleProgram {
        name: String,
    },
    SetExit {
        ip: String,
    },
    DisableExit,
    /// `seconds == 0` keeps the notice until another one replaces it.
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
}

const INFO_SECONDS: u64 = 4;

/// Effects issued once at startup.
pub fn boot_effects() -> Vec<Effect> {
    vec![Effect::FetchStatus, Effect::FetchPrograms]
}

fn error_toast(text: String) -> Effect {
    Effect::ShowToast {
        text,
        level: ToastLevel::Error,
        seconds: 0,
    }
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        Refresh => {
            state.programs.begin_refresh();
            state.status.begin_refresh();
            effects.push(Effect::FetchPrograms);
            effects.push(Effect::FetchStatus);
        }
        SelectPrev => {
            state.selected = state.selected.saturating_sub(1);
        }
        SelectNext => {
            let len = state.program_count();
            if len > 0 {
                state.selected = (state.selected + 1).min(len - 1);
            }
        }
        SelectFirst => state.selected = 0,
        SelectLast => state.selected = state.program_count().saturating_sub(1),
        ToggleSelected => {
            if let ViewState::Displayed(progs) = &state.programs {
                if let Some(p) = progs.get(state.selected) {
                    effects.push(Effect::ToggleProgram {
                        name: p.name.clone(),
                    });
                }
            }
        }
        OpenExitPicker => effects.push(Effect::FetchExits),
        PickerPrev => {
            if let Some(p) = &mut state.picker {
                p.selected = p.selected.saturating_sub(1);
            }
        }
        PickerNext => {
            if let Some(p) = &mut state.picker {
                p.selected = (p.selected + 1).min(p.choices.len().saturating_sub(1));
            }
        }
        PickerApply => {
            if let Some(picker) = state.picker.take() {
                match picker.choices.get(picker.selected) {
                    Some(ExitChoice::Disable) => effects.push(Effect::DisableExit),
                    Some(ExitChoice::Node(ip)) => effects.push(Effect::SetExit { ip: ip.clone() }),
                    None => {}
                }
            }
        }
        PickerCancel => {
            state.picker = None;
        }
        ToggleDebug => state.show_debug = !state.show_debug,
        Quit => state.should_quit = true,
        LoadedStatus(Ok(st)) => {
            state.dbg(match &st.active_exit_node {
                Some(ip) => format!("status: exit node {ip}"),
                None => "status: no exit node".to_string(),
            });
            state.status = ViewState::Displayed(st);
        }
        LoadedStatus(Err(e)) => {
            let msg = e.to_string();
            state.dbg(format!("status failed: {msg}"));
            // A stale exit node is worse than none; always replace.
            state.status = ViewState::Error(msg);
        }
        LoadedPrograms(Ok(progs)) => {
            state.dbg(format!("list: {} programs", progs.len()));
            state.selected = state.selected.min(progs.len().saturating_sub(1));
            state.programs = ViewState::Displayed(progs);
        }
        LoadedPrograms(Err(e)) => {
            let msg = e.to_string();
            state.dbg(format!("list failed: {msg}"));
            state.programs.fail(msg.clone());
            effects.push(error_toast(format!("Program list error: {msg}")));
        }
        LoadedExits(Ok(nodes)) => {
            state.dbg(format!("exits: {} nodes", nodes.len()));
            if !nodes.iter().any(|n| n.online) {
                effects.push(Effect::ShowToast {
                    text: "No exit node is online".to_string(),
                    level: ToastLevel::Info,
                    seconds: INFO_SECONDS,
                });
            }
            let active = state.active_exit_node().map(str::to_string);
            state.picker = Some(ExitPicker::new(exit_choices(&nodes), active.as_deref()));
        }
        LoadedExits(Err(e)) => {
            let msg = e.to_string();
            state.dbg(format!("exits failed: {msg}"));
            effects.push(error_toast(format!("Error loading exits: {msg}")));
        }
        Mutated { action, outcome } => {
            match outcome {
                Ok(text) => {
                    let text = if text.is_empty() {
                        match &action {
                            Mutation::Toggle(name) => format!("Toggled {name}"),
                            Mutation::SetExit(ip) => format!("Exit node set to {ip}"),
                            Mutation::DisableExit => "Exit node disabled".to_string(),
                        }
                    } else {
                        text
                    };
                    state.dbg(format!("{action:?}: {text}"));
                    effects.push(Effect::ShowToast {
                        text,
                        level: ToastLevel::Success,
                        seconds: INFO_SECONDS,
                    });
                }
                Err(e) => {
                    let msg = e.to_string();
                    state.dbg(format!("{action:?} failed: {msg}"));
                    effects.push(error_toast(msg));
                }
            }
            // Refresh whatever the mutation may have changed, even after a failure.
            if let Mutation::Toggle(_) = action {
                effects.push(Effect::FetchPrograms);
            }
            effects.push(Effect::FetchStatus);
        }
    }
    effects
}
