//! Terminal status line rendering.
//!
//! Pure consumer of session snapshots: the renderer holds no session
//! state beyond its spinner wheel, which it advances itself through the
//! pure [`Wheel::next`]. State colors come from an injected [`Theme`].

use std::time::Duration;

use colored::{Color, Colorize};

use crate::error::ConfigError;
use crate::storage::ColorsConfig;
use crate::timer::{SessionState, Snapshot};

/// Frequency at which the display is updated.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(800);

/// ASCII spinner state. Advancing is a pure function: the caller
/// threads the returned state forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wheel(u8);

impl Wheel {
    pub fn next(self) -> (char, Wheel) {
        let glyph = match self.0 {
            0 => '|',
            1 => '/',
            2 => '-',
            _ => '\\',
        };
        (glyph, Wheel((self.0 + 1) % 4))
    }
}

/// State-to-color mapping, built once from configuration and injected
/// into the renderer.
#[derive(Debug, Clone)]
pub struct Theme {
    pub running: Color,
    pub breaking: Color,
    pub paused: Color,
    pub complete: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            running: Color::Red,
            breaking: Color::Green,
            paused: Color::White,
            complete: Color::Blue,
        }
    }
}

impl Theme {
    /// Resolve configured color names.
    ///
    /// # Errors
    /// Fails on any color name the renderer does not know.
    pub fn from_config(colors: &ColorsConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            running: parse_color(&colors.running)?,
            breaking: parse_color(&colors.breaking)?,
            paused: parse_color(&colors.paused)?,
            complete: parse_color(&colors.complete)?,
        })
    }

    fn for_state(&self, state: SessionState) -> Color {
        match state {
            SessionState::Running => self.running,
            SessionState::Breaking => self.breaking,
            SessionState::Paused => self.paused,
            SessionState::Completed | SessionState::Cancelled => self.complete,
        }
    }
}

fn parse_color(name: &str) -> Result<Color, ConfigError> {
    let color = match name.to_ascii_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        _ => return Err(ConfigError::BadColor(name.to_string())),
    };
    Ok(color)
}

/// Formats one status line per snapshot.
pub struct StatusLine {
    theme: Theme,
    wheel: Wheel,
}

impl StatusLine {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            wheel: Wheel::default(),
        }
    }

    /// Render the snapshot as a single line, advancing the spinner by
    /// one step. Never errors.
    pub fn render(&mut self, snapshot: &Snapshot) -> String {
        let (glyph, wheel) = self.wheel.next();
        self.wheel = wheel;

        let label = snapshot.state.to_string();
        let state = label.as_str().color(self.theme.for_state(snapshot.state));
        let progress = format!("[{}/{}]", snapshot.completed, snapshot.target_pomodoros);

        if snapshot.state.is_terminal() {
            format!("{glyph} {state} {progress} {}", snapshot.message)
        } else {
            format!(
                "{glyph} {state} {progress} {}/{} {}",
                clock(snapshot.elapsed),
                clock(snapshot.target),
                snapshot.message,
            )
        }
    }
}

fn clock(d: Duration) -> String {
    let total = d.as_secs();
    if total >= 3600 {
        format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
    } else {
        format!("{:02}:{:02}", total / 60, total % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(state: SessionState, elapsed: u64, target: u64) -> Snapshot {
        Snapshot {
            state,
            elapsed: Duration::from_secs(elapsed),
            target: Duration::from_secs(target),
            completed: 1,
            target_pomodoros: 4,
            message: "write report".into(),
            at: Utc::now(),
        }
    }

    #[test]
    fn wheel_cycles_deterministically() {
        let mut wheel = Wheel::default();
        let mut glyphs = Vec::new();
        for _ in 0..8 {
            let (glyph, next) = wheel.next();
            glyphs.push(glyph);
            wheel = next;
        }
        assert_eq!(glyphs, vec!['|', '/', '-', '\\', '|', '/', '-', '\\']);
    }

    #[test]
    fn render_shows_state_clock_and_message() {
        let mut line = StatusLine::new(Theme::default());
        let rendered = line.render(&snapshot(SessionState::Running, 754, 1500));
        assert!(rendered.contains("RUNNING"));
        assert!(rendered.contains("[1/4]"));
        assert!(rendered.contains("12:34/25:00"));
        assert!(rendered.contains("write report"));
    }

    #[test]
    fn render_advances_spinner_each_call() {
        let mut line = StatusLine::new(Theme::default());
        let snap = snapshot(SessionState::Running, 0, 1500);
        assert!(line.render(&snap).starts_with('|'));
        assert!(line.render(&snap).starts_with('/'));
        assert!(line.render(&snap).starts_with('-'));
        assert!(line.render(&snap).starts_with('\\'));
        assert!(line.render(&snap).starts_with('|'));
    }

    #[test]
    fn terminal_states_drop_the_clock() {
        let mut line = StatusLine::new(Theme::default());
        let rendered = line.render(&snapshot(SessionState::Completed, 0, 1500));
        assert!(rendered.contains("COMPLETE"));
        assert!(!rendered.contains("25:00"));
    }

    #[test]
    fn long_phases_show_hours() {
        assert_eq!(clock(Duration::from_secs(3725)), "1:02:05");
        assert_eq!(clock(Duration::from_secs(59)), "00:59");
    }

    #[test]
    fn unknown_color_name_is_rejected() {
        let colors = ColorsConfig {
            running: "tomato".into(),
            ..ColorsConfig::default()
        };
        assert!(Theme::from_config(&colors).is_err());

        assert!(Theme::from_config(&ColorsConfig::default()).is_ok());
    }
}
