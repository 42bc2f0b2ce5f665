//! Motion program writer.
//!
//! Commands render their words in a fixed order (`G X Y Z W I J K M P S`)
//! no matter how they were built, so identical programs are byte-identical.
//! The laser is switched through synchronized digital output 0: `M62 P0`
//! turns it on and `M63 P0` turns it off. Those words are only injected when
//! a command's laser intent differs from the current state.

use rasterkit_core::MeasurementSystem;
use std::fmt;
use std::io::{self, Write};

/// Digital output number wired to the laser enable.
const LASER_OUTPUT: i64 = 0;

/// Numeric word value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Rendered without decimals
    Int(i64),
    /// Rendered with three decimals
    Real(f64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Real(v) => write!(f, "{:.3}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

/// One motion command over the closed word set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Command {
    pub g: Option<Value>,
    pub x: Option<Value>,
    pub y: Option<Value>,
    pub z: Option<Value>,
    pub w: Option<Value>,
    pub i: Option<Value>,
    pub j: Option<Value>,
    pub k: Option<Value>,
    pub m: Option<Value>,
    pub p: Option<Value>,
    pub s: Option<Value>,
    /// Desired laser state while executing this command
    pub laser: Option<bool>,
}

impl Command {
    pub fn new() -> Self {
        Self::default()
    }

    /// Command with a motion mode word.
    pub fn motion(g: i64) -> Self {
        Self {
            g: Some(Value::Int(g)),
            ..Self::default()
        }
    }

    pub fn x(mut self, v: f64) -> Self {
        self.x = Some(v.into());
        self
    }

    pub fn y(mut self, v: f64) -> Self {
        self.y = Some(v.into());
        self
    }

    pub fn z(mut self, v: f64) -> Self {
        self.z = Some(v.into());
        self
    }

    pub fn w(mut self, v: f64) -> Self {
        self.w = Some(v.into());
        self
    }

    pub fn i(mut self, v: f64) -> Self {
        self.i = Some(v.into());
        self
    }

    pub fn j(mut self, v: f64) -> Self {
        self.j = Some(v.into());
        self
    }

    pub fn k(mut self, v: f64) -> Self {
        self.k = Some(v.into());
        self
    }

    pub fn m(mut self, v: i64) -> Self {
        self.m = Some(v.into());
        self
    }

    pub fn p(mut self, v: i64) -> Self {
        self.p = Some(v.into());
        self
    }

    pub fn s(mut self, v: i64) -> Self {
        self.s = Some(v.into());
        self
    }

    pub fn laser(mut self, on: bool) -> Self {
        self.laser = Some(on);
        self
    }

    /// Words in render order.
    fn words(&self) -> [(char, Option<Value>); 11] {
        [
            ('G', self.g),
            ('X', self.x),
            ('Y', self.y),
            ('Z', self.z),
            ('W', self.w),
            ('I', self.i),
            ('J', self.j),
            ('K', self.k),
            ('M', self.m),
            ('P', self.p),
            ('S', self.s),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.words().iter().all(|(_, v)| v.is_none())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (letter, value) in self.words() {
            if let Some(value) = value {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "{}{}", letter, value)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Stateful G-code writer over any byte sink
pub struct GcodeWriter<W: Write> {
    sink: W,
    laser_on: bool,
    units: MeasurementSystem,
}

impl<W: Write> GcodeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self::with_units(sink, MeasurementSystem::default())
    }

    pub fn with_units(sink: W, units: MeasurementSystem) -> Self {
        Self {
            sink,
            laser_on: false,
            units,
        }
    }

    pub fn laser_on(&self) -> bool {
        self.laser_on
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Reset the laser, select units and exact-path mode and set the feed.
    ///
    /// `mask` announces that a trigger stream accompanies this program.
    pub fn preamble(&mut self, feed: f64, mask: bool) -> io::Result<()> {
        self.laser_on = false;
        self.line(&Command::new().m(63).p(LASER_OUTPUT))?;
        self.line(&Command::motion(self.units.gcode_unit_mode() as i64))?;
        self.line(&Command::motion(61))?;
        writeln!(self.sink, "F{}", Value::Real(feed))?;
        if mask {
            self.line(&Command::new().m(101))?;
        }
        self.line(&Command::new().m(3).s(1))
    }

    /// Force the laser off and end the program.
    pub fn epilogue(&mut self) -> io::Result<()> {
        self.laser_on = false;
        self.line(&Command::new().m(63).p(LASER_OUTPUT))?;
        self.line(&Command::new().m(5))?;
        self.line(&Command::new().m(2))?;
        self.sink.flush()
    }

    /// Write a command, injecting a laser transition if its intent requires one.
    pub fn command(&mut self, cmd: Command) -> io::Result<()> {
        let mut cmd = cmd;
        match cmd.laser.take() {
            Some(true) if !self.laser_on => {
                self.laser_on = true;
                cmd.m = Some(Value::Int(62));
                cmd.p = Some(Value::Int(LASER_OUTPUT));
            }
            Some(false) if self.laser_on => {
                self.laser_on = false;
                cmd.m = Some(Value::Int(63));
                cmd.p = Some(Value::Int(LASER_OUTPUT));
            }
            _ => {}
        }

        if cmd.is_empty() {
            return Ok(());
        }
        self.line(&cmd)
    }

    /// Rapid move.
    pub fn jog(&mut self, cmd: Command) -> io::Result<()> {
        self.command(Command {
            g: Some(Value::Int(0)),
            ..cmd
        })
    }

    /// Linear feed move.
    pub fn move_to(&mut self, cmd: Command) -> io::Result<()> {
        self.command(Command {
            g: Some(Value::Int(1)),
            ..cmd
        })
    }

    /// Clockwise arc.
    pub fn turn_cw(&mut self, cmd: Command) -> io::Result<()> {
        self.command(Command {
            g: Some(Value::Int(2)),
            ..cmd
        })
    }

    /// Counter-clockwise arc.
    pub fn turn_ccw(&mut self, cmd: Command) -> io::Result<()> {
        self.command(Command {
            g: Some(Value::Int(3)),
            ..cmd
        })
    }

    /// Switch the laser without moving.
    pub fn laser(&mut self, on: bool) -> io::Result<()> {
        self.command(Command::new().laser(on))
    }

    /// Write a comment line. Parentheses are removed so the text cannot
    /// terminate or nest the comment.
    pub fn comment(&mut self, text: &str) -> io::Result<()> {
        let cleaned: String = text.chars().filter(|c| !matches!(c, '(' | ')')).collect();
        writeln!(self.sink, "({})", cleaned)
    }

    fn line(&mut self, cmd: &Command) -> io::Result<()> {
        writeln!(self.sink, "{}", cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut GcodeWriter<&mut Vec<u8>>) -> io::Result<()>,
    {
        let mut out = Vec::new();
        {
            let mut writer = GcodeWriter::new(&mut out);
            f(&mut writer).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_canonical_word_order() {
        let cmd = Command {
            s: Some(Value::Int(1)),
            i: Some(Value::Real(0.25)),
            x: Some(Value::Real(1.0)),
            g: Some(Value::Int(2)),
            y: Some(Value::Real(-2.5)),
            ..Command::default()
        };
        assert_eq!(cmd.to_string(), "G2 X1.000 Y-2.500 I0.250 S1");
    }

    #[test]
    fn test_laser_transitions_are_lazy() {
        let text = render(|w| {
            w.move_to(Command::new().x(1.0).laser(true))?;
            w.move_to(Command::new().x(2.0).laser(true))?;
            w.move_to(Command::new().x(3.0))?;
            w.move_to(Command::new().x(4.0).laser(false))?;
            w.laser(false)
        });
        assert_eq!(
            text,
            "G1 X1.000 M62 P0\nG1 X2.000\nG1 X3.000\nG1 X4.000 M63 P0\n"
        );
    }

    #[test]
    fn test_laser_only_command() {
        let text = render(|w| {
            w.laser(true)?;
            w.laser(true)?;
            w.laser(false)
        });
        assert_eq!(text, "M62 P0\nM63 P0\n");
    }

    #[test]
    fn test_preamble_and_epilogue() {
        let text = render(|w| {
            w.preamble(120.0, true)?;
            w.epilogue()
        });
        assert_eq!(
            text,
            "M63 P0\nG20\nG61\nF120.000\nM101\nM3 S1\nM63 P0\nM5\nM2\n"
        );

        let text = render(|w| w.preamble(20.0, false));
        assert!(!text.contains("M101"));
    }

    #[test]
    fn test_metric_preamble() {
        let mut out = Vec::new();
        let mut w = GcodeWriter::with_units(&mut out, MeasurementSystem::Metric);
        w.preamble(600.0, false).unwrap();
        drop(w);
        assert!(String::from_utf8(out).unwrap().contains("G21\n"));
    }

    #[test]
    fn test_preamble_resets_laser_state() {
        let text = render(|w| {
            w.laser(true)?;
            w.preamble(60.0, false)?;
            assert!(!w.laser_on());
            w.move_to(Command::new().x(1.0).laser(true))
        });
        assert!(text.ends_with("G1 X1.000 M62 P0\n"));
    }

    #[test]
    fn test_comment_strips_parens() {
        let text = render(|w| w.comment("config: (nested) value ()"));
        assert_eq!(text, "(config: nested value )\n");
    }

    #[test]
    fn test_motion_helpers() {
        let text = render(|w| {
            w.jog(Command::new().x(0.5).y(0.5))?;
            w.turn_ccw(Command::new().x(1.0).y(1.0).j(0.5))
        });
        assert_eq!(text, "G0 X0.500 Y0.500\nG3 X1.000 Y1.000 J0.500\n");
    }
}
