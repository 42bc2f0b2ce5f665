//! Laser trigger stream ("gmask") writer.
//!
//! The modulator reads this stream alongside the motion program and flips the
//! beam when the scan axis crosses each recorded position. Every record is
//! `axis edge active position`, one per line, and the stream opens with the
//! header record `1 0 0 0`.

use crate::tile_layout::ScanDirection;
use std::fmt;
use std::io::{self, Write};

/// One trigger record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerRecord {
    pub axis: u8,
    pub edge: u8,
    pub active: u8,
    pub position: f64,
}

impl TriggerRecord {
    fn scan(edge: u8, active: u8, position: f64) -> Self {
        Self {
            axis: 0,
            edge,
            active,
            position,
        }
    }
}

impl fmt::Display for TriggerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {:.3}",
            self.axis, self.edge, self.active, self.position
        )
    }
}

/// Stateful trigger stream writer
pub struct TriggerWriter<W: Write> {
    sink: W,
    hysteresis: f64,
    begin_row: bool,
}

impl<W: Write> TriggerWriter<W> {
    /// `hysteresis` is added to every position written.
    pub fn new(sink: W, hysteresis: f64) -> Self {
        Self {
            sink,
            hysteresis,
            begin_row: false,
        }
    }

    pub fn preamble(&mut self) -> io::Result<()> {
        writeln!(self.sink, "1 0 0 0")
    }

    /// Mark the next span as the first of a row.
    pub fn begin_row(&mut self, _direction: ScanDirection) {
        self.begin_row = true;
    }

    /// Record one span, `x1` visited before `x2`, in motion coordinates.
    pub fn span(&mut self, direction: ScanDirection, x1: f64, x2: f64) -> io::Result<()> {
        let x1 = x1 + self.hysteresis;
        let x2 = x2 + self.hysteresis;
        let (leading, trailing) = match direction {
            ScanDirection::Forward => (1, 1),
            ScanDirection::Reverse => (0, 0),
        };

        if self.begin_row {
            self.record(TriggerRecord::scan(0, 1 - leading, x1))?;
        }
        self.record(TriggerRecord::scan(0, leading, x1))?;
        self.record(TriggerRecord::scan(1, trailing, x2))?;
        self.begin_row = false;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }

    fn record(&mut self, record: TriggerRecord) -> io::Result<()> {
        writeln!(self.sink, "{}", record)
    }
}

/// Parse one record line, `None` for anything malformed.
pub fn parse_record(line: &str) -> Option<TriggerRecord> {
    let mut fields = line.split_whitespace();
    let record = TriggerRecord {
        axis: fields.next()?.parse().ok()?,
        edge: fields.next()?.parse().ok()?,
        active: fields.next()?.parse().ok()?,
        position: fields.next()?.parse().ok()?,
    };
    if fields.next().is_some() {
        return None;
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(hysteresis: f64, f: F) -> String
    where
        F: FnOnce(&mut TriggerWriter<&mut Vec<u8>>) -> io::Result<()>,
    {
        let mut out = Vec::new();
        {
            let mut writer = TriggerWriter::new(&mut out, hysteresis);
            f(&mut writer).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_preamble() {
        assert_eq!(render(0.0, |w| w.preamble()), "1 0 0 0\n");
    }

    #[test]
    fn test_forward_row() {
        let text = render(0.0, |w| {
            w.begin_row(ScanDirection::Forward);
            w.span(ScanDirection::Forward, 1.0, 2.0)?;
            w.span(ScanDirection::Forward, 3.0, 4.5)
        });
        assert_eq!(
            text,
            "0 0 0 1.000\n0 0 1 1.000\n0 1 1 2.000\n0 0 1 3.000\n0 1 1 4.500\n"
        );
    }

    #[test]
    fn test_reverse_row_inverts_polarity() {
        let text = render(0.0, |w| {
            w.begin_row(ScanDirection::Reverse);
            w.span(ScanDirection::Reverse, 4.5, 3.0)?;
            w.span(ScanDirection::Reverse, 2.0, 1.0)
        });
        assert_eq!(
            text,
            "0 0 1 4.500\n0 0 0 4.500\n0 1 0 3.000\n0 0 0 2.000\n0 1 0 1.000\n"
        );
    }

    #[test]
    fn test_hysteresis_applied_to_every_position() {
        let text = render(-0.25, |w| {
            w.begin_row(ScanDirection::Forward);
            w.span(ScanDirection::Forward, 0.5, 1.5)
        });
        assert_eq!(text, "0 0 0 0.250\n0 0 1 0.250\n0 1 1 1.250\n");
    }

    #[test]
    fn test_parse_record() {
        let record = parse_record("0 1 1 1.250").unwrap();
        assert_eq!(record, TriggerRecord::scan(1, 1, 1.25));
        assert_eq!(record.to_string(), "0 1 1 1.250");
        assert!(parse_record("0 1 1").is_none());
        assert!(parse_record("0 1 1 1.0 9").is_none());
        assert!(parse_record("a b c d").is_none());
    }
}
