use super::{App, Screen, pdf_rejection};
use crate::action::Action;

impl App {
    /// Handle input while on the file picker screen.
    pub(super) fn handle_file_picker_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.confirm_quit = true;
            }
            Action::NavigateBack => {
                // Open everything marked with Space, then go back
                let selected = std::mem::take(&mut self.file_picker.selected);
                if !selected.is_empty() {
                    self.open_paths(selected);
                }
                self.file_picker.message = None;
                self.screen = Screen::Main;
            }
            Action::MoveDown => {
                let max = self.file_picker.entries.len().saturating_sub(1);
                if self.file_picker.cursor < max {
                    self.file_picker.cursor += 1;
                }
            }
            Action::MoveUp => {
                self.file_picker.cursor = self.file_picker.cursor.saturating_sub(1);
            }
            Action::PageDown => {
                let page = self.visible_rows.max(1);
                let max = self.file_picker.entries.len().saturating_sub(1);
                self.file_picker.cursor = (self.file_picker.cursor + page).min(max);
            }
            Action::PageUp => {
                let page = self.visible_rows.max(1);
                self.file_picker.cursor = self.file_picker.cursor.saturating_sub(page);
            }
            Action::GoTop => {
                self.file_picker.cursor = 0;
            }
            Action::GoBottom => {
                self.file_picker.cursor = self.file_picker.entries.len().saturating_sub(1);
            }
            Action::ToggleSelect => {
                self.file_picker.message = self.file_picker.toggle_selected().err();
            }
            Action::DrillIn => {
                let Some(entry) = self
                    .file_picker
                    .entries
                    .get(self.file_picker.cursor)
                    .cloned()
                else {
                    return;
                };
                self.file_picker.message = None;
                if entry.is_dir {
                    self.file_picker.enter_directory();
                } else if entry.is_pdf {
                    // Enter on a PDF opens it together with anything already marked
                    let mut paths = std::mem::take(&mut self.file_picker.selected);
                    if !paths.contains(&entry.path) {
                        paths.push(entry.path);
                    }
                    self.open_paths(paths);
                    self.screen = Screen::Main;
                } else {
                    self.file_picker.message = Some(pdf_rejection(&entry.name));
                }
            }
            Action::ToggleHelp => {
                self.show_help = true;
            }
            _ => {}
        }
    }
}
