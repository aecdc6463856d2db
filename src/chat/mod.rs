pub mod controller;
pub mod error;

pub use controller::{ ChatController, ChatSettings, PendingTurn, TurnOutcome };
pub use error::FailureKind;
