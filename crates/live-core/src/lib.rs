pub mod commands;
pub mod dispatch;
pub mod game_state;
pub mod protocol;
pub mod room;
pub mod transcript;
