pub mod connect_screen;
pub mod event_log;
pub mod game_list;
pub mod game_panel;
pub mod participant_row;
