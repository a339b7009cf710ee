pub mod cli;
pub mod tui_plot;
