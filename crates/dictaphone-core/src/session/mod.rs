mod controller;
mod dispatch;
mod state;

pub use {
    controller::{ConfirmPrompt, SessionController},
    dispatch::{HoldAction, RecordAction, hold_control, record_control},
    state::{RecordingSession, SessionEvent, SessionStatus, transition},
};
