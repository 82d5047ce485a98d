use std::io::Write;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, ClearType},
};

use crate::error::{AppError, Result};

const PASSWORD_ENV: &str = "FINFLOW_PASSWORD";
const PASSWORD_ATTEMPTS: usize = 3;

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn password_from_env() -> Option<String> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|password| !password.is_empty())
}

/// `FINFLOW_PASSWORD` when set, otherwise an interactive masked prompt.
pub fn password(prompt: &str) -> Result<String> {
    match password_from_env() {
        Some(password) => Ok(password),
        None => read_masked(prompt),
    }
}

/// Like [`password`], but asks twice when prompting.
pub fn new_password() -> Result<String> {
    if let Some(password) = password_from_env() {
        return Ok(password);
    }

    let mut out = std::io::stderr();
    for _ in 0..PASSWORD_ATTEMPTS {
        let first = read_masked("Password: ")?;
        if first.is_empty() {
            notice(&mut out, "Password must not be empty.")?;
            continue;
        }
        if read_masked("Confirm password: ")? == first {
            return Ok(first);
        }
        notice(&mut out, "Passwords do not match. Try again.")?;
    }
    Err(AppError::Terminal("too many attempts".to_string()))
}

fn notice(out: &mut std::io::Stderr, message: &str) -> Result<()> {
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    Ok(())
}

fn read_masked(prompt: &str) -> Result<String> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err(AppError::Terminal("interrupted".to_string()));
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

/// Reads one visible line from stdin.
pub fn line(prompt: &str) -> Result<String> {
    let mut out = std::io::stderr();
    write!(out, "{prompt}")?;
    out.flush()?;

    let mut buf = String::new();
    std::io::stdin().read_line(&mut buf)?;
    Ok(buf.trim().to_string())
}
