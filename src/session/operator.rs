use crate::session::controller::SessionOutcome;
use crate::topology::ResumeWarning;
use std::error::Error;
use std::io;

/// The person driving a session: shown choices, asked for input.
pub trait Operator {
    /// Presents a numbered list; `items[0]` is shown as number 1.
    fn show_list(&mut self, title: &str, items: &[String]);

    /// Reads one line of input, without the trailing newline.
    fn ask(&mut self, prompt: &str) -> io::Result<String>;

    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let answer = self.ask(&format!("{} (y/n): ", prompt))?;
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    fn report_success(&mut self, outcome: &SessionOutcome);

    fn report_warning(&mut self, warning: &ResumeWarning);

    fn report_error(&mut self, error: &dyn Error);
}
