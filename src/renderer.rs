//! # Session Report Rendering
//!
//! Plain-text table of surf sessions for terminal output. One row per
//! session:
//!
//! ```text
//! Date        Window         Surf     Wind
//! ----------  -------------  -------  --------
//! Tue 03/15   10:35 - 11:35  3-4 ft   5 WNW
//! ```

use crate::SurfSession;
use std::fmt::Write;

const HEADER: &str = "Date        Window         Surf     Wind";
const RULE: &str = "----------  -------------  -------  --------";

/// Render sessions as a fixed-width table.
pub fn format_sessions(sessions: &[SurfSession]) -> String {
    if sessions.is_empty() {
        return "No surf sessions found\n".to_string();
    }

    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(RULE);
    out.push('\n');

    for session in sessions {
        let surf = format!("{:.0}-{:.0} ft", session.surf_min, session.surf_max);
        let wind = format!("{:.0} {}", session.wind_speed, session.wind_direction);
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "{:<10}  {} - {}  {:<7}  {}",
            session.start.format("%a %m/%d").to_string(),
            session.start.format("%H:%M"),
            session.end.format("%H:%M"),
            surf,
            wind
        );
    }
    out
}

/// Print the session table to stdout
pub fn draw_ascii(sessions: &[SurfSession]) {
    print!("{}", format_sessions(sessions));
}
