//! Reads puzzle records in the clue-text format: an optional `$`-prefixed
//! header line followed by `2 * n` lines of whitespace-separated run
//! lengths (columns, then rows), an empty line meaning "no runs".
//!
//! Also provides the compact internal buffer encoding (`'a' + len - 1` per
//! run, `'z'` as a line terminator) some callers use to pass a puzzle
//! around as a single string instead of a line-oriented file.

use std::io::BufRead;

use crate::board::MAX_N;
use crate::clue::{Clue, Puzzle};
use crate::error::ParseError;

fn parse_clue_line(line: &str, line_no: usize, n: usize) -> Result<Clue, ParseError> {
    let numbers = line
        .split_whitespace()
        .map(|token| {
            token.parse::<usize>().map_err(|_| ParseError::InvalidToken {
                line: line_no,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<usize>, ParseError>>()?;

    if numbers.is_empty() {
        return Ok(Clue::new(Vec::new()));
    }

    let min_length: usize = numbers.iter().sum::<usize>() + numbers.len() - 1;
    if min_length > n {
        return Err(ParseError::ClueTooLong {
            line: line_no,
            min_length,
            n,
        });
    }
    Ok(Clue::new(numbers))
}

/// Reads the `2n` clue lines of one record from `lines`, having already
/// consumed any header line. `line_no` tracks the file's absolute line
/// number for error messages and is advanced in place.
fn parse_record_body<I>(lines: &mut I, line_no: &mut usize, n: usize) -> Result<Puzzle, ParseError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let mut raw = Vec::with_capacity(2 * n);
    while raw.len() < 2 * n {
        let line = lines.next().ok_or(ParseError::Truncated(*line_no))??;
        *line_no += 1;
        raw.push(line);
    }

    let col_clues = raw[..n]
        .iter()
        .enumerate()
        .map(|(i, l)| parse_clue_line(l.trim(), *line_no - 2 * n + i, n))
        .collect::<Result<Vec<_>, _>>()?;
    let row_clues = raw[n..]
        .iter()
        .enumerate()
        .map(|(i, l)| parse_clue_line(l.trim(), *line_no - n + i, n))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Puzzle::new(col_clues, row_clues))
}

/// Parses one puzzle record from `reader`. Tolerant of a missing `$`
/// header: if the first line doesn't start with `$`, it's treated as the
/// first column's clue line rather than discarded.
pub fn parse_one<R: BufRead>(reader: R, n: usize) -> Result<Puzzle, ParseError> {
    if n > MAX_N {
        return Err(ParseError::BoardTooLarge(n, MAX_N));
    }
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    let first = lines.next().ok_or(ParseError::Truncated(0))??;
    line_no += 1;

    if first.trim_start().starts_with('$') {
        parse_record_body(&mut lines, &mut line_no, n)
    } else {
        let mut rest = std::iter::once(Ok(first)).chain(lines);
        parse_record_body(&mut rest, &mut line_no, n)
    }
}

/// Parses every `$`-headed record in `reader` into a batch of puzzles,
/// stopping at EOF rather than a fixed question count.
pub fn parse_batch<R: BufRead>(reader: R, n: usize) -> Result<Vec<Puzzle>, ParseError> {
    if n > MAX_N {
        return Err(ParseError::BoardTooLarge(n, MAX_N));
    }
    let mut lines = reader.lines();
    let mut line_no = 0usize;
    let mut puzzles = Vec::new();

    loop {
        let header = match lines.next() {
            None => break,
            Some(l) => {
                line_no += 1;
                l?
            }
        };
        if header.trim().is_empty() {
            continue;
        }
        puzzles.push(parse_record_body(&mut lines, &mut line_no, n)?);
    }

    Ok(puzzles)
}

/// Decodes one `'z'`-free buffer token into run lengths: each char encodes
/// `ord(char) - ord('a') + 1`, and the single-char placeholder one below
/// `'a'` (used for an empty line) decodes to `0` and is dropped, yielding
/// an empty clue rather than a spurious zero-length run.
pub fn decode_buffer_token(token: &str) -> Vec<usize> {
    token
        .chars()
        .filter_map(|c| {
            let num = (c as i32) - ('a' as i32) + 1;
            if num > 0 {
                Some(num as usize)
            } else {
                None
            }
        })
        .collect()
}

/// Encodes run lengths into the compact buffer form: one char per run
/// (`'a' + len - 1`), or the empty-line placeholder if there are none,
/// followed by the `'z'` line terminator.
pub fn encode_to_buffer(numbers: &[usize]) -> String {
    let mut out = String::new();
    if numbers.is_empty() {
        out.push((b'a' - 1) as char);
    } else {
        for &len in numbers {
            out.push((b'a' + (len - 1) as u8) as char);
        }
    }
    out.push('z');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_a_headered_record() {
        let text = "$1\n5\n5\n5\n5\n5\n5\n5\n5\n5\n5\n";
        let puzzle = parse_one(Cursor::new(text), 5).unwrap();
        assert_eq!(puzzle.n(), 5);
        assert_eq!(puzzle.col_clue(0).run(1), 5);
        assert_eq!(puzzle.row_clue(4).run(1), 5);
    }

    #[test]
    fn parses_a_record_with_no_header() {
        let text = "5\n5\n5\n5\n5\n5\n5\n5\n5\n5\n";
        let puzzle = parse_one(Cursor::new(text), 5).unwrap();
        assert_eq!(puzzle.col_clue(0).run(1), 5);
    }

    #[test]
    fn empty_line_becomes_empty_clue() {
        let text = "$1\n\n\n\n\n\n\n\n\n\n\n";
        let puzzle = parse_one(Cursor::new(text), 5).unwrap();
        assert_eq!(puzzle.col_clue(0).count(), 0);
    }

    #[test]
    fn truncated_record_is_an_error() {
        let text = "$1\n5\n5\n";
        let err = parse_one(Cursor::new(text), 5).unwrap_err();
        assert!(matches!(err, ParseError::Truncated(_)));
    }

    #[test]
    fn clue_longer_than_board_is_rejected() {
        let text = "$1\n3 3\n5\n5\n5\n5\n5\n5\n5\n5\n5\n";
        let err = parse_one(Cursor::new(text), 5).unwrap_err();
        assert!(matches!(err, ParseError::ClueTooLong { .. }));
    }

    #[test]
    fn invalid_token_is_an_error() {
        let text = "$1\nfoo\n5\n5\n5\n5\n5\n5\n5\n5\n5\n";
        let err = parse_one(Cursor::new(text), 5).unwrap_err();
        assert!(matches!(err, ParseError::InvalidToken { .. }));
    }

    #[test]
    fn batch_reads_multiple_records_until_eof() {
        let text = "$1\n5\n5\n5\n5\n5\n5\n5\n5\n5\n5\n$2\n\n\n\n\n\n\n\n\n\n\n";
        let puzzles = parse_batch(Cursor::new(text), 5).unwrap();
        assert_eq!(puzzles.len(), 2);
        assert_eq!(puzzles[0].col_clue(0).count(), 1);
        assert_eq!(puzzles[1].col_clue(0).count(), 0);
    }

    #[test]
    fn buffer_round_trips_run_lengths() {
        let encoded = encode_to_buffer(&[3, 1, 2]);
        assert_eq!(decode_buffer_token(encoded.trim_end_matches('z')), vec![3, 1, 2]);

        let empty = encode_to_buffer(&[]);
        assert!(decode_buffer_token(empty.trim_end_matches('z')).is_empty());
    }
}
