// Input validation and the interactive re-prompting loop.
use crate::model::{LookbackPeriod, RecentWindow, TickerSource};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid choice. Please enter '1' for S&P500 or '2' for CSV file.")]
    SourceChoice,
    #[error("Please follow the formats accepted by Yahoo Finance (1mo..11mo, 1y..10y, max).")]
    Period,
    #[error("Invalid input. Please enter '1', '2', or '3'.")]
    WindowChoice,
    #[error("Invalid input. Please enter a valid integer.")]
    NotAnInteger,
    #[error("Please enter an integer greater than 1.")]
    CountTooSmall,
    #[error("File not found: {0}")]
    FileNotFound(String),
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input closed before a valid answer was given")]
    Closed,
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

pub fn parse_source_choice(input: &str) -> Result<TickerSource, ValidationError> {
    match input.trim().to_lowercase().as_str() {
        "1" | "sp500" | "s&p500" => Ok(TickerSource::Sp500),
        "2" | "csv" => Ok(TickerSource::Csv),
        _ => Err(ValidationError::SourceChoice),
    }
}

/// Accepts `1mo`..`11mo`, `1y`..`10y` and `max`, case-insensitively.
pub fn parse_period(input: &str) -> Result<LookbackPeriod, ValidationError> {
    let normalized = input.trim().to_lowercase();
    if normalized == "max" {
        return Ok(LookbackPeriod::Max);
    }
    let parse_n = |digits: &str| -> Option<u8> {
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) || digits.starts_with('0') {
            return None;
        }
        digits.parse().ok()
    };
    if let Some(n) = normalized.strip_suffix("mo").and_then(parse_n) {
        if (1..=11).contains(&n) {
            return Ok(LookbackPeriod::Months(n));
        }
    } else if let Some(n) = normalized.strip_suffix('y').and_then(parse_n) {
        if (1..=10).contains(&n) {
            return Ok(LookbackPeriod::Years(n));
        }
    }
    Err(ValidationError::Period)
}

pub fn parse_window_choice(input: &str) -> Result<RecentWindow, ValidationError> {
    match input.trim().to_lowercase().as_str() {
        "1" | "yesterday" => Ok(RecentWindow::YESTERDAY),
        "2" | "three-days" => Ok(RecentWindow::LAST_THREE_DAYS),
        "3" | "five-days" => Ok(RecentWindow::LAST_FIVE_DAYS),
        _ => Err(ValidationError::WindowChoice),
    }
}

pub fn parse_result_count(input: &str) -> Result<usize, ValidationError> {
    let count: i64 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotAnInteger)?;
    if count > 1 {
        Ok(count as usize)
    } else {
        Err(ValidationError::CountTooSmall)
    }
}

pub fn parse_csv_path(input: &str) -> Result<PathBuf, ValidationError> {
    let path = PathBuf::from(input.trim());
    if path.is_file() {
        Ok(path)
    } else {
        Err(ValidationError::FileNotFound(input.trim().to_string()))
    }
}

/// Asks a question on `output` and reads answers from `input` until `validate` accepts one.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, text: &str) -> Result<(), PromptError> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    pub fn ask<T, F>(&mut self, question: &str, validate: F) -> Result<T, PromptError>
    where
        F: Fn(&str) -> Result<T, ValidationError>,
    {
        let mut line = String::new();
        loop {
            write!(self.output, "{}", question)?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Err(PromptError::Closed);
            }
            match validate(&line) {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.output, "{}", e)?,
            }
        }
    }

    pub fn ask_source(&mut self) -> Result<TickerSource, PromptError> {
        self.say("Choose your source of tickers:")?;
        self.say("1. Wikipedia S&P500 tickers")?;
        self.say("2. Load a list from a CSV file")?;
        self.ask("Enter '1' for S&P500 or '2' for CSV file: ", parse_source_choice)
    }

    pub fn ask_csv_path(&mut self) -> Result<PathBuf, PromptError> {
        self.ask("\nEnter the path to your CSV file: ", parse_csv_path)
    }

    pub fn ask_period(&mut self) -> Result<LookbackPeriod, PromptError> {
        self.say("\nYou're now choosing the period over which the central tendency will be computed.")?;
        self.say("Short periods give a less reliable picture of a ticker's typical volume.")?;
        self.ask("\nEnter the long period you want considered (1mo, 1y, max, etc.): ", parse_period)
    }

    pub fn ask_window(&mut self) -> Result<RecentWindow, PromptError> {
        self.say("\nChoose the recent period for companies:")?;
        self.say("1. Yesterday's trading volume.")?;
        self.say("2. Last three days' average.")?;
        self.say("3. Last five days' average.")?;
        self.ask("Enter '1', '2', or '3': ", parse_window_choice)
    }

    pub fn ask_count(&mut self) -> Result<usize, PromptError> {
        self.ask("\nHow many tickers would you like in the final table: ", parse_result_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_accepts_only_known_ranges() {
        assert_eq!(parse_period(" 1MO "), Ok(LookbackPeriod::Months(1)));
        assert_eq!(parse_period("11mo"), Ok(LookbackPeriod::Months(11)));
        assert_eq!(parse_period("10y"), Ok(LookbackPeriod::Years(10)));
        assert_eq!(parse_period("max"), Ok(LookbackPeriod::Max));
        for bad in ["12mo", "0mo", "11y", "01y", "1d", "ytd", "", "y", "mo", "-1y"] {
            assert_eq!(parse_period(bad), Err(ValidationError::Period), "{}", bad);
        }
        assert_eq!(parse_period("7mo").unwrap().to_string(), "7mo");
    }

    #[test]
    fn window_choices_map_to_offsets() {
        assert_eq!(parse_window_choice("1"), Ok(RecentWindow::new(-2, -1)));
        assert_eq!(parse_window_choice("2\n"), Ok(RecentWindow::new(-4, -1)));
        assert_eq!(parse_window_choice("3"), Ok(RecentWindow::new(-6, -1)));
        assert_eq!(parse_window_choice("4"), Err(ValidationError::WindowChoice));
    }

    #[test]
    fn count_must_exceed_one() {
        assert_eq!(parse_result_count("10"), Ok(10));
        assert_eq!(parse_result_count("1"), Err(ValidationError::CountTooSmall));
        assert_eq!(parse_result_count("-3"), Err(ValidationError::CountTooSmall));
        assert_eq!(parse_result_count("ten"), Err(ValidationError::NotAnInteger));
        assert_eq!(parse_result_count("2.5"), Err(ValidationError::NotAnInteger));
    }

    #[test]
    fn source_choice() {
        assert_eq!(parse_source_choice("1"), Ok(TickerSource::Sp500));
        assert_eq!(parse_source_choice("2"), Ok(TickerSource::Csv));
        assert_eq!(parse_source_choice("3"), Err(ValidationError::SourceChoice));
    }

    #[test]
    fn csv_path_must_exist() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().to_string();
        assert_eq!(parse_csv_path(&path), Ok(file.path().to_path_buf()));
        assert!(matches!(parse_csv_path("nope.csv"), Err(ValidationError::FileNotFound(_))));
    }

    #[test]
    fn ask_reprompts_until_valid() {
        let input = b"0\nabc\n5\n".as_slice();
        let mut output = Vec::new();
        let count = Prompter::new(input, &mut output).ask_count().unwrap();
        assert_eq!(count, 5);

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("greater than 1"));
        assert!(printed.contains("valid integer"));
    }

    #[test]
    fn ask_fails_on_closed_input() {
        let mut output = Vec::new();
        let result = Prompter::new(b"bogus\n".as_slice(), &mut output).ask_period();
        assert!(matches!(result, Err(PromptError::Closed)));
    }
}
