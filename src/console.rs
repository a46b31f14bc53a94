//! Line-oriented text console for driving a [`Session`].
//!
//! Lets a script or a thin front end play the game over stdin/stdout, one
//! command per line. Replies follow a simple request/response shape:
//!
//! ```text
//! [id] command [args...]
//! =[id] payload        (success)
//! ?[id] message        (failure)
//! ```
//!
//! each followed by a blank line. Lines starting with `#` are ignored.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `list_commands`, `known_command <cmd>`, `quit`
//! - `show` - Print the grid, one row per line
//! - `score` - Current score
//! - `state` - `awaiting_first`, `awaiting_second <col> <row>`, or `game_over`
//! - `select <col> <row>` - Feed one selection to the turn controller
//! - `swap <col> <row> <col> <row>` - A drag between two cells
//! - `hint` - A swap that makes a match, or `none`
//! - `tick <ms>` - Let time pass for score decay
//! - `restart` - Deal a new game

use std::io::{self, BufRead, Write};
use std::time::Duration;

use crate::grid::Coord;
use crate::moves::find_matching_swap;
use crate::session::{Selection, Session, TurnState};

/// The list of known console commands.
const KNOWN_COMMANDS: &[&str] = &[
    "hint",
    "known_command",
    "list_commands",
    "name",
    "quit",
    "restart",
    "score",
    "select",
    "show",
    "state",
    "swap",
    "tick",
    "version",
];

/// Console state: the session being played.
pub struct Console {
    session: Session,
}

impl Console {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let (success, message) = self.execute(&command, &parts[1..]);

            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, "gemgem".to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let known = KNOWN_COMMANDS.contains(&args[0].to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "show" => (true, format!("\n{}", self.session.grid()).trim_end().to_string()),

            "score" => (true, self.session.score().to_string()),

            "state" => (true, describe_state(self.session.state())),

            "select" => match parse_coords::<1>(args) {
                Ok([at]) => (true, describe_selection(&self.session.select(at), &self.session)),
                Err(msg) => (false, msg),
            },

            "swap" => match parse_coords::<2>(args) {
                Ok([from, to]) => {
                    let outcome = self.session.drag(from, to);
                    (true, describe_selection(&outcome, &self.session))
                }
                Err(msg) => (false, msg),
            },

            "hint" => match find_matching_swap(self.session.grid()) {
                Some((a, b)) => (true, format!("{} {} {} {}", a.col, a.row, b.col, b.row)),
                None => (true, "none".to_string()),
            },

            "tick" => match args.first().map(|s| s.parse::<u64>()) {
                Some(Ok(ms)) => {
                    let deducted = self.session.tick(Duration::from_millis(ms));
                    (true, deducted.to_string())
                }
                Some(Err(_)) => (false, "invalid milliseconds".to_string()),
                None => (false, "missing argument".to_string()),
            },

            "restart" => {
                self.session.restart();
                (true, String::new())
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}

/// Parse `N` coordinates from `2 * N` integer arguments.
fn parse_coords<const N: usize>(args: &[&str]) -> Result<[Coord; N], String> {
    if args.len() < 2 * N {
        return Err("missing arguments".to_string());
    }
    let mut coords = [Coord::new(0, 0); N];
    for (i, coord) in coords.iter_mut().enumerate() {
        let col = args[2 * i].parse::<usize>();
        let row = args[2 * i + 1].parse::<usize>();
        match (col, row) {
            (Ok(col), Ok(row)) => *coord = Coord::new(col, row),
            _ => return Err("invalid coordinate".to_string()),
        }
    }
    Ok(coords)
}

fn describe_state(state: TurnState) -> String {
    match state {
        TurnState::AwaitingFirstSelection => "awaiting_first".to_string(),
        TurnState::AwaitingSecondSelection(c) => format!("awaiting_second {} {}", c.col, c.row),
        TurnState::GameOver => "game_over".to_string(),
    }
}

fn describe_selection(selection: &Selection, session: &Session) -> String {
    match selection {
        Selection::Ignored => "ignored".to_string(),
        Selection::Selected(c) => format!("selected {} {}", c.col, c.row),
        Selection::Deselected(err) => format!("deselected: {err}"),
        Selection::Turn(report) if !report.matched() => "bad_swap".to_string(),
        Selection::Turn(report) => {
            let mut text = format!(
                "match +{} cascades {} score {}",
                report.score_delta,
                report.cascades.len(),
                session.score()
            );
            if report.game_over {
                text.push_str(" game_over");
            }
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::grid::Grid;

    fn console() -> Console {
        let grid: Grid = "0 1 3 1\n3 4 5 4\n0 0 1 5\n3 4 0 4".parse().unwrap();
        let config = GameConfig {
            seed: Some(3),
            ..GameConfig::default()
        };
        Console::new(Session::from_grid(config, grid))
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = Console::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = Console::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_known_command() {
        let mut c = console();
        assert_eq!(c.execute("known_command", &["hint"]), (true, "true".to_string()));
        assert_eq!(c.execute("known_command", &["genmove"]), (true, "false".to_string()));
    }

    #[test]
    fn test_show() {
        let mut c = console();
        let (ok, text) = c.execute("show", &[]);
        assert!(ok);
        assert_eq!(text, "\n0 1 3 1\n3 4 5 4\n0 0 1 5\n3 4 0 4");
    }

    #[test]
    fn test_select_flow() {
        let mut c = console();
        assert_eq!(c.execute("select", &["0", "0"]), (true, "selected 0 0".to_string()));
        assert_eq!(c.execute("state", &[]), (true, "awaiting_second 0 0".to_string()));
        assert_eq!(
            c.execute("select", &["3", "3"]),
            (true, "deselected: (0, 0) and (3, 3) are not adjacent".to_string())
        );
        assert_eq!(c.execute("state", &[]), (true, "awaiting_first".to_string()));
    }

    #[test]
    fn test_hint_then_swap() {
        let mut c = console();
        let (ok, hint) = c.execute("hint", &[]);
        assert!(ok);
        let args: Vec<&str> = hint.split_whitespace().collect();
        assert_eq!(args.len(), 4);
        let (ok, reply) = c.execute("swap", &args);
        assert!(ok);
        assert!(reply.starts_with("match +"), "{reply}");
    }

    #[test]
    fn test_bad_arguments() {
        let mut c = console();
        assert!(!c.execute("select", &["1"]).0);
        assert!(!c.execute("select", &["a", "b"]).0);
        assert!(!c.execute("tick", &[]).0);
        assert!(!c.execute("bogus", &[]).0);
    }

    #[test]
    fn test_run_loop() {
        let mut c = console();
        let input = b"# comment\n1 name\nscore\n2 bogus\nquit\nname\n";
        let mut out = Vec::new();
        c.run(&input[..], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "=1 gemgem\n\n= 0\n\n?2 unknown command: bogus\n\n= \n\n");
    }
}
