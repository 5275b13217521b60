//! Console seam for the interactive menus.
//! `Terminal` prints to stdout and reads answers through `dialoguer`.

use dialoguer::Input;

use crate::error::AdminError;

pub trait Console {
    fn show(&mut self, text: &str);

    /// Prompts and returns the trimmed answer.
    fn ask(&mut self, prompt: &str) -> Result<String, AdminError>;
}

#[derive(Debug, Default)]
pub struct Terminal;

impl Console for Terminal {
    fn show(&mut self, text: &str) {
        println!("{}", text);
    }

    fn ask(&mut self, prompt: &str) -> Result<String, AdminError> {
        let answer: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer.trim().to_string())
    }
}
