//! Tile cut-out paths.
//!
//! Each tile is outlined clockwise starting from its bottom left corner:
//! up the left edge, across the top, down the right edge, back along the
//! bottom. Rounded corners are quarter-circle G2 arcs.

use crate::gcode_writer::{Command, GcodeWriter};
use std::io::{self, Write};

/// Closed outline of one tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutPath {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
    /// Corner radius, 0 for square corners
    pub radius: f64,
}

impl CutPath {
    /// Outline of a `width` x `height` tile with its bottom left at `x`, `y`.
    pub fn for_tile(x: f64, y: f64, width: f64, height: f64, radius: f64) -> Self {
        Self {
            left: x,
            bottom: y,
            right: x + width,
            top: y + height,
            radius,
        }
    }

    /// Emit the outline. The laser is on for the whole loop and switched off
    /// once at the end.
    pub fn emit<W: Write>(&self, gcode: &mut GcodeWriter<W>) -> io::Result<()> {
        let Self {
            left,
            bottom,
            right,
            top,
            radius: r,
        } = *self;

        if r > 0.0 {
            gcode.jog(Command::new().x(left).y(bottom + r))?;
            gcode.move_to(Command::new().x(left).y(top - r).laser(true))?;
            gcode.turn_cw(Command::new().x(left + r).y(top).i(r))?;
            gcode.move_to(Command::new().x(right - r).y(top))?;
            gcode.turn_cw(Command::new().x(right).y(top - r).j(-r))?;
            gcode.move_to(Command::new().x(right).y(bottom + r))?;
            gcode.turn_cw(Command::new().x(right - r).y(bottom).i(-r))?;
            gcode.move_to(Command::new().x(left + r).y(bottom))?;
            gcode.turn_cw(Command::new().x(left).y(bottom + r).j(r))?;
        } else {
            gcode.jog(Command::new().x(left).y(bottom))?;
            gcode.move_to(Command::new().x(left).y(top).laser(true))?;
            gcode.move_to(Command::new().x(right).y(top))?;
            gcode.move_to(Command::new().x(right).y(bottom))?;
            gcode.move_to(Command::new().x(left).y(bottom))?;
        }
        gcode.laser(false)
    }
}
