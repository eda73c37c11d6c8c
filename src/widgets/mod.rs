pub mod chrome;
pub mod exit_picker;
pub mod header;
pub mod program_list;
pub mod status_bar;
pub mod status_view;
