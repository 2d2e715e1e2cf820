use std::fmt;
use std::str::Lines;

use log::warn;

use crate::errors::DraftError;
use crate::time_util::{TimeRange, format_subtitle_timestamp, parse_subtitle_timestamp};

// @module: SRT cue parsing

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    // @field: Sequence number as written in the file
    pub seq_num: usize,

    // @field: Start time in micro-units
    pub start: i64,

    // @field: End time in micro-units
    pub end: i64,

    // @field: Cue text, lines joined with '\n'
    pub text: String,
}

impl Cue {
    /// Place the cue on a timeline shifted by `offset`
    pub fn timerange(&self, offset: i64) -> Result<TimeRange, DraftError> {
        TimeRange::new(self.start + offset, self.end - self.start)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{} --> {}\n{}\n",
            self.seq_num,
            format_subtitle_timestamp(self.start),
            format_subtitle_timestamp(self.end),
            self.text
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    Index,
    Timestamp,
    Content,
}

/// Lazy cue reader over SRT text.
///
/// Yields cues in file order. The first malformed line produces an error and
/// ends the sequence. Cues whose text is empty are skipped with a warning.
pub struct SubtitleCues<'a> {
    lines: Lines<'a>,
    line_no: usize,
    state: ReadState,
    seq_num: usize,
    start: i64,
    end: i64,
    text: String,
    done: bool,
}

impl<'a> SubtitleCues<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            lines: content.strip_prefix('\u{feff}').unwrap_or(content).lines(),
            line_no: 0,
            state: ReadState::Index,
            seq_num: 0,
            start: 0,
            end: 0,
            text: String::new(),
            done: false,
        }
    }

    fn fail(&mut self, error: DraftError) -> Option<Result<Cue, DraftError>> {
        self.done = true;
        Some(Err(error))
    }

    fn take_cue(&mut self) -> Option<Cue> {
        let text = std::mem::take(&mut self.text);
        let text = text.trim();
        if text.is_empty() {
            warn!("Skipping empty subtitle cue {}", self.seq_num);
            return None;
        }
        Some(Cue {
            seq_num: self.seq_num,
            start: self.start,
            end: self.end,
            text: text.to_string(),
        })
    }

    fn parse_timestamp_line(&self, line: &str) -> Result<(i64, i64), DraftError> {
        let (start, end) = line.split_once("-->").ok_or_else(|| DraftError::InvalidSubtitleFormat {
            line: self.line_no,
            content: line.to_string(),
        })?;
        Ok((parse_subtitle_timestamp(start)?, parse_subtitle_timestamp(end)?))
    }
}

impl Iterator for SubtitleCues<'_> {
    type Item = Result<Cue, DraftError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while let Some(raw) = self.lines.next() {
            self.line_no += 1;
            let line = raw.trim();

            match self.state {
                ReadState::Index => {
                    if line.is_empty() {
                        continue;
                    }
                    match line.parse::<usize>() {
                        Ok(num) if line.chars().all(|c| c.is_ascii_digit()) => {
                            self.seq_num = num;
                            self.state = ReadState::Timestamp;
                        }
                        _ => {
                            let error = DraftError::InvalidSubtitleFormat {
                                line: self.line_no,
                                content: line.to_string(),
                            };
                            return self.fail(error);
                        }
                    }
                }
                ReadState::Timestamp => match self.parse_timestamp_line(line) {
                    Ok((start, end)) => {
                        self.start = start;
                        self.end = end;
                        self.state = ReadState::Content;
                    }
                    Err(e) => return self.fail(e),
                },
                ReadState::Content => {
                    if line.is_empty() {
                        self.state = ReadState::Index;
                        if let Some(cue) = self.take_cue() {
                            return Some(Ok(cue));
                        }
                    } else {
                        self.text.push_str(line);
                        self.text.push('\n');
                    }
                }
            }
        }

        // End of input: flush a trailing cue without a blank separator
        self.done = true;
        if self.state == ReadState::Content {
            return self.take_cue().map(Ok);
        }
        if self.state == ReadState::Timestamp {
            return Some(Err(DraftError::InvalidSubtitleFormat {
                line: self.line_no,
                content: "missing timestamp line".to_string(),
            }));
        }
        None
    }
}

/// Collect every cue, failing on the first malformed one
pub fn parse_cues(content: &str) -> Result<Vec<Cue>, DraftError> {
    SubtitleCues::new(content).collect()
}
