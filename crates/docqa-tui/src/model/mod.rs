pub mod activity;
pub mod preview;
pub mod text_input;
