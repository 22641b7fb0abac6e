pub mod action;
pub mod event;
pub mod phase;
pub mod power;
pub mod save;
pub mod score;
pub mod session;
pub mod snapshot;
pub mod step;
