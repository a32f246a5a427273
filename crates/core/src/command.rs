//! Operator command wire syntax.
//!
//! The command channel collaborator frames text lines; this module
//! gives them meaning. Two forms exist: the literal `STOP`, and a
//! `<lat>,<lng>` target in decimal degrees. Coordinate range checks
//! happen here, at the boundary, so the navigation loop only ever sees
//! valid targets.

use crate::geo::{CoordinateError, GeoCoordinate};

/// A parsed operator command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Halt navigation and stop the motors.
    Stop,
    /// Navigate to the given position.
    SetTarget(GeoCoordinate),
}

/// Why a command line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandParseError {
    /// Not `STOP` and not two comma-separated numbers.
    BadFormat,
    /// Numbers parsed but violate the coordinate range invariants.
    OutOfRange,
}

/// Result of one command-channel poll, as seen by the navigation loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandPoll {
    /// Nothing arrived within the poll timeout.
    None,
    /// A line arrived but failed to parse; the loop owes the status
    /// sink an invalid-format notice.
    Invalid,
    /// A well-formed command.
    Command(Command),
}

/// Parse one command line.
///
/// Leading/trailing whitespace is ignored. `STOP` is matched exactly
/// after trimming; everything else must be `<lat>,<lng>` with both
/// fields finite numbers inside the coordinate ranges.
pub fn parse_line(line: &str) -> Result<Command, CommandParseError> {
    let line = line.trim();
    if line == "STOP" {
        return Ok(Command::Stop);
    }

    let (lat_text, lng_text) = line.split_once(',').ok_or(CommandParseError::BadFormat)?;
    let lat: f64 = lat_text
        .trim()
        .parse()
        .map_err(|_| CommandParseError::BadFormat)?;
    let lng: f64 = lng_text
        .trim()
        .parse()
        .map_err(|_| CommandParseError::BadFormat)?;

    match GeoCoordinate::new(lat, lng) {
        Ok(coord) => Ok(Command::SetTarget(coord)),
        Err(CoordinateError::LatitudeOutOfRange)
        | Err(CoordinateError::LongitudeOutOfRange) => Err(CommandParseError::OutOfRange),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stop() {
        assert_eq!(parse_line("STOP"), Ok(Command::Stop));
        assert_eq!(parse_line("  STOP \r\n"), Ok(Command::Stop));
    }

    #[test]
    fn stop_is_case_sensitive() {
        assert_eq!(parse_line("stop"), Err(CommandParseError::BadFormat));
    }

    #[test]
    fn parses_target_coordinates() {
        let cmd = parse_line("19.504407,-99.146935").unwrap();
        match cmd {
            Command::SetTarget(c) => {
                assert!((c.latitude() - 19.504407).abs() < 1e-9);
                assert!((c.longitude() + 99.146935).abs() < 1e-9);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn tolerates_spaces_around_fields() {
        assert!(parse_line(" 10.5 , 20.25 ").is_ok());
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in ["", "GO", "10.0", "10.0;20.0", "a,b", "10.0,", ",20.0", "1,2,3"] {
            assert_eq!(
                parse_line(line),
                Err(CommandParseError::BadFormat),
                "line {line:?}"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert_eq!(
            parse_line("91.0,0.0"),
            Err(CommandParseError::OutOfRange)
        );
        assert_eq!(
            parse_line("0.0,-180.1"),
            Err(CommandParseError::OutOfRange)
        );
        assert_eq!(parse_line("nan,0.0"), Err(CommandParseError::OutOfRange));
    }
}
