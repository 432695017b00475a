use std::{
    io::{BufRead, Write},
    num::NonZeroU32,
};

use anyhow::Result;

use crate::{
    config::ReminderConfig,
    utils::time::{format_time_of_day, parse_time_of_day},
};

/// Prints `question` and reads one line. Empty answers and end of input both mean "keep".
pub fn prompt(
    input: &mut impl BufRead,
    output: &mut impl Write,
    question: &str,
) -> Result<Option<String>> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    let line = line.trim();
    Ok((!line.is_empty()).then(|| line.to_string()))
}

/// Walks the user through every editable setting and returns the edited copy. Bad answers are
/// reported and leave the previous value in place.
pub fn edit_config(
    current: &ReminderConfig,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<ReminderConfig> {
    let mut config = current.clone();
    writeln!(output, "=== Water Reminder Configuration ===")?;

    let question = format!(
        "Reminder interval in minutes (current: {}): ",
        config.interval_minutes
    );
    if let Some(answer) = prompt(input, output, &question)? {
        match answer.parse::<NonZeroU32>() {
            Ok(interval) => config.interval_minutes = interval,
            Err(_) => writeln!(output, "Invalid interval, keeping current value")?,
        }
    }

    writeln!(
        output,
        "Current active hours: {} - {}",
        format_time_of_day(config.start_time),
        format_time_of_day(config.end_time)
    )?;
    if let Some(answer) = prompt(
        input,
        output,
        "Start time (HH:MM, or press Enter to keep current): ",
    )? {
        match parse_time_of_day(&answer) {
            Ok(start) => config.start_time = start,
            Err(e) => writeln!(output, "{e}, keeping current value")?,
        }
    }
    if let Some(answer) = prompt(
        input,
        output,
        "End time (HH:MM, or press Enter to keep current): ",
    )? {
        match parse_time_of_day(&answer) {
            Ok(end) => config.end_time = end,
            Err(e) => writeln!(output, "{e}, keeping current value")?,
        }
    }
    if config.window_spans_midnight() {
        writeln!(
            output,
            "⚠️  Active hours that cross midnight are not supported, no reminders will be shown \
             until the end time is after the start time."
        )?;
    }

    writeln!(output, "Current message: {}", config.message)?;
    if let Some(answer) = prompt(
        input,
        output,
        "New message (or press Enter to keep current): ",
    )? {
        config.message = answer;
    }

    writeln!(output, "Current title: {}", config.title)?;
    if let Some(answer) = prompt(
        input,
        output,
        "New title (or press Enter to keep current): ",
    )? {
        config.title = answer;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use anyhow::Result;
    use chrono::NaiveTime;

    use super::{edit_config, prompt};
    use crate::config::ReminderConfig;

    fn run(answers: &str) -> Result<(ReminderConfig, String)> {
        let mut input = Cursor::new(answers.to_string());
        let mut output = Vec::new();
        let config = edit_config(&ReminderConfig::default(), &mut input, &mut output)?;
        Ok((config, String::from_utf8(output)?))
    }

    #[test]
    fn empty_answers_keep_everything() -> Result<()> {
        let (config, _) = run("\n\n\n\n\n")?;
        assert_eq!(config, ReminderConfig::default());
        Ok(())
    }

    #[test]
    fn end_of_input_keeps_everything() -> Result<()> {
        let (config, _) = run("")?;
        assert_eq!(config, ReminderConfig::default());
        Ok(())
    }

    #[test]
    fn answers_replace_values() -> Result<()> {
        let (config, output) = run("30\n07:30\n21:15\nSip some water\nHydrate\n")?;
        assert_eq!(config.interval_minutes.get(), 30);
        assert_eq!(config.start_time, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
        assert_eq!(config.end_time, NaiveTime::from_hms_opt(21, 15, 0).unwrap());
        assert_eq!(config.message, "Sip some water");
        assert_eq!(config.title, "Hydrate");
        assert!(output.contains("(current: 60)"));
        Ok(())
    }

    #[test]
    fn invalid_answers_keep_previous_values() -> Result<()> {
        let (config, output) = run("soon\n7pm\n0:99\n\n\n")?;
        let defaults = ReminderConfig::default();
        assert_eq!(config.interval_minutes, defaults.interval_minutes);
        assert_eq!(config.start_time, defaults.start_time);
        assert_eq!(config.end_time, defaults.end_time);
        assert!(output.contains("Invalid interval, keeping current value"));
        assert_eq!(output.matches("keeping current value").count(), 3);
        Ok(())
    }

    #[test]
    fn zero_interval_is_refused() -> Result<()> {
        let (config, output) = run("0\n\n\n\n\n")?;
        assert_eq!(config.interval_minutes.get(), 60);
        assert!(output.contains("Invalid interval"));
        Ok(())
    }

    #[test]
    fn midnight_window_is_flagged_but_kept() -> Result<()> {
        let (config, output) = run("\n22:00\n06:00\n\n\n")?;
        assert!(config.window_spans_midnight());
        assert!(output.contains("cross midnight"));
        Ok(())
    }

    #[test]
    fn prompt_trims_answer() -> Result<()> {
        let mut input = Cursor::new("  hello  \n".to_string());
        let mut output = Vec::new();
        assert_eq!(prompt(&mut input, &mut output, "? ")?, Some("hello".into()));
        assert_eq!(output, b"? ");
        Ok(())
    }
}
