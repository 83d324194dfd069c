use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use mathagent_tool_runtime::ToolStep;
use std::io::{self, BufRead, Write};

pub const PROMPT: &str = "Enter a mathematical question or type 'exit' to end the session: ";

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const USER_PROMPT: Color = Color::Green;
    const ASSISTANT_TEXT: Color = Color::Cyan;
    const TOOL_CALL: Color = Color::DarkGrey;
    const ERROR: Color = Color::Red;
    const HEADER: Color = Color::Magenta;
}

/// One line read from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Query(String),
    Blank,
    /// "exit" typed alone (any case), or end of input
    Exit,
}

/// Manages terminal I/O for the interactive REPL.
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl Terminal<io::StdinLock<'static>, io::Stdout> {
    /// Terminal bound to the process's stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print the startup banner.
    pub fn print_banner(&mut self, model: &str) -> Result<()> {
        execute!(
            self.output,
            SetForegroundColor(Colors::HEADER),
            Print("\n📘 Hello! I'm your Math Agent.\n"),
            ResetColor,
            Print("💡 Try operations like: +, -, *, /, %, √ (square root), GCD, LCM\n"),
            SetForegroundColor(Colors::TOOL_CALL),
            Print(format!("Model: {}\n", model)),
            ResetColor,
        )?;
        Ok(())
    }

    /// Prompt for and read one line of user input.
    pub fn read_input(&mut self) -> Result<Input> {
        execute!(
            self.output,
            Print("\n"),
            SetForegroundColor(Colors::USER_PROMPT),
            Print(PROMPT),
            ResetColor,
        )?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            // stdin closed
            execute!(self.output, Print("\n"))?;
            return Ok(Input::Exit);
        }
        Ok(parse_input(&line))
    }

    /// Show a tool execution performed while answering.
    pub fn print_tool_step(&mut self, step: &ToolStep) -> Result<()> {
        let color = if step.result.is_error {
            Colors::ERROR
        } else {
            Colors::TOOL_CALL
        };
        execute!(
            self.output,
            SetForegroundColor(color),
            Print(format!(
                "[tool: {}({}) = {}]\n",
                step.call.name, step.call.input, step.result.content
            )),
            ResetColor,
        )?;
        Ok(())
    }

    pub fn print_answer(&mut self, text: &str) -> Result<()> {
        execute!(
            self.output,
            Print("Answer: "),
            SetForegroundColor(Colors::ASSISTANT_TEXT),
            Print(text.trim_end()),
            ResetColor,
            Print("\n"),
        )?;
        Ok(())
    }

    /// Print a failed question with a hint to try another one.
    pub fn print_error(&mut self, msg: &str) -> Result<()> {
        execute!(
            self.output,
            SetForegroundColor(Colors::ERROR),
            Print(format!(
                "Error: {}. Try a different question, like 'What is 6 * 9?'\n",
                msg
            )),
            ResetColor,
        )?;
        Ok(())
    }

    pub fn print_farewell(&mut self) -> Result<()> {
        execute!(self.output, Print("Goodbye!\n"))?;
        Ok(())
    }
}

fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Input::Blank
    } else if trimmed.eq_ignore_ascii_case("exit") {
        Input::Exit
    } else {
        Input::Query(trimmed.to_string())
    }
}
