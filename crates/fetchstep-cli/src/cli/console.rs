//! Terminal reporting sink.

use fetchstep_core::ui::Ui;

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleUi;

impl ConsoleUi {
    pub fn format_say(message: &str) -> String {
        format!("==> {}", message)
    }

    pub fn format_message(message: &str) -> String {
        format!("    {}", message)
    }
}

impl Ui for ConsoleUi {
    fn say(&self, message: &str) {
        println!("{}", Self::format_say(message));
    }

    fn message(&self, message: &str) {
        println!("{}", Self::format_message(message));
    }

    fn error(&self, message: &str) {
        eprintln!("{}", Self::format_say(message));
    }
}
