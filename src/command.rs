//! Module for skylens' command API
//!
//! Commands are parsed from single lines of text and run against a `Viewer`. A command may
//! produce a line of output.

use crate::error::ViewerError;
use crate::geometry::*;
use crate::input::{InputEvent, PointerSource};
use crate::levels::ScaleMode;
use crate::status_bar::StatusBar;
use crate::transform_state::Axis;
use crate::viewer::Viewer;
use crate::wcs_lock::LockChange;

use std::str::FromStr;
use thiserror::Error;

/// A command on the viewer
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Command {
    /// Resize the viewer surface
    Viewport(Size),
    Scale(f64),
    Pan(Vector),
    /// Astronomical rotation in degrees, from North while locked
    Rotate(f64),
    Flip(Axis),
    /// Lock to the WCS, or unlock
    Lock,
    Reset,
    /// Scale mode of the display levels
    Mode(ScaleMode),
    Wheel { position: Point, zoom_in: bool },
    Down(Point),
    Move(Point),
    Up(PointerSource),
    Leave,
    Frame,
    /// Report the image under a screen position without moving the cursor
    Probe(Point),
    /// Report the view orientation
    State,
    /// Report the orientation indicator
    Compass,
    /// Report the status bar
    Status,
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unknown command `{0}`")]
    Unknown(String),

    #[error("`{command}` expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        command: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid argument `{arg}` for `{command}`")]
    InvalidArgument { command: String, arg: String },

    #[error(transparent)]
    Viewer(#[from] ViewerError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> CommandResult<Self> {
        let mut words = s.split_whitespace();
        let name = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();

        let parser = ArgParser { name, args: &args };

        let command = match name {
            "viewport" => {
                let [w, h] = parser.numbers()?;
                Command::Viewport(Size::new(w, h))
            }
            "scale" => {
                let [scale] = parser.numbers()?;
                Command::Scale(scale)
            }
            "pan" => {
                let [dx, dy] = parser.numbers()?;
                Command::Pan(Vector::new(dx, dy))
            }
            "rotate" => {
                let [degrees] = parser.numbers()?;
                Command::Rotate(degrees)
            }
            "flip" => {
                let [axis] = parser.words()?;
                Command::Flip(match axis {
                    "h" | "horizontal" => Axis::Horizontal,
                    "v" | "vertical" => Axis::Vertical,
                    _ => return Err(parser.invalid(axis)),
                })
            }
            "lock" => parser.none(Command::Lock)?,
            "reset" => parser.none(Command::Reset)?,
            "mode" => {
                let [mode] = parser.words()?;
                Command::Mode(mode.parse().map_err(|_| parser.invalid(mode))?)
            }
            "wheel" => {
                parser.expect(3)?;
                let x = parser.number(args[0])?;
                let y = parser.number(args[1])?;
                let zoom_in = match args[2] {
                    "in" => true,
                    "out" => false,
                    other => return Err(parser.invalid(other)),
                };
                Command::Wheel {
                    position: Point::new(x, y),
                    zoom_in,
                }
            }
            "down" => Command::Down(parser.point()?),
            "move" => Command::Move(parser.point()?),
            "up" => match args.as_slice() {
                [] => Command::Up(PointerSource::Surface),
                ["window"] => Command::Up(PointerSource::Window),
                [other] => return Err(parser.invalid(other)),
                _ => return Err(parser.count(1)),
            },
            "leave" => parser.none(Command::Leave)?,
            "frame" => parser.none(Command::Frame)?,
            "probe" => Command::Probe(parser.point()?),
            "state" => parser.none(Command::State)?,
            "compass" => parser.none(Command::Compass)?,
            "status" => parser.none(Command::Status)?,
            _ => return Err(CommandError::Unknown(name.to_string())),
        };

        Ok(command)
    }
}

impl Command {
    /// Run the command on a viewer
    /// Returns the output of reporting commands
    pub fn run(&self, viewer: &mut Viewer) -> CommandResult<Option<String>> {
        match *self {
            Command::Viewport(size) => viewer.set_viewport(Rect::from_size(size)),
            Command::Scale(scale) => viewer.set_scale(scale)?,
            Command::Pan(delta) => viewer.pan(delta.x, delta.y),
            Command::Rotate(degrees) => viewer.set_rotation_from_north(degrees)?,
            Command::Flip(axis) => viewer.toggle_flip(axis)?,
            Command::Lock => {
                let text = match viewer.lock()? {
                    LockChange::Locked => "locked",
                    LockChange::Unlocked => "unlocked",
                };
                return Ok(Some(text.to_string()));
            }
            Command::Reset => viewer.reset(),
            Command::Mode(mode) => viewer.set_scale_mode(mode),
            Command::Wheel { position, zoom_in } => viewer.handle_input(InputEvent::Wheel {
                position,
                delta_y: if zoom_in { -1.0 } else { 1.0 },
            }),
            Command::Down(position) => viewer.handle_input(InputEvent::PointerDown(position)),
            Command::Move(position) => viewer.handle_input(InputEvent::PointerMove(position)),
            Command::Up(source) => viewer.handle_input(InputEvent::PointerUp(source)),
            Command::Leave => viewer.handle_input(InputEvent::PointerLeave),
            Command::Frame => viewer.handle_input(InputEvent::Frame),
            Command::Probe(position) => {
                let sample = viewer.sample_at(position);

                let mut bar = StatusBar::new();
                bar.update(sample.as_ref(), &viewer.state());

                let text = match sample {
                    Some(_) => bar.left_text().to_string(),
                    None => "no image".to_string(),
                };
                return Ok(Some(text));
            }
            Command::State => {
                let text = format!(
                    "{}, sky rotation: {}, lock {}",
                    viewer.state(),
                    viewer.sky_rotation(),
                    if viewer.can_lock() { "available" } else { "unavailable" },
                );
                return Ok(Some(text));
            }
            Command::Compass => return Ok(Some(viewer.compass().to_string())),
            Command::Status => {
                let mut bar = StatusBar::new();
                bar.update(viewer.cursor(), &viewer.state());

                const STATUS_WIDTH: usize = 120;
                return Ok(Some(bar.render(STATUS_WIDTH).trim_end().to_string()));
            }
        }

        Ok(None)
    }
}

// === Argument parsing ===

struct ArgParser<'a> {
    name: &'a str,
    args: &'a [&'a str],
}

impl<'a> ArgParser<'a> {
    fn count(&self, expected: usize) -> CommandError {
        CommandError::ArgumentCount {
            command: self.name.to_string(),
            expected,
            actual: self.args.len(),
        }
    }

    fn invalid(&self, arg: &str) -> CommandError {
        CommandError::InvalidArgument {
            command: self.name.to_string(),
            arg: arg.to_string(),
        }
    }

    fn expect(&self, expected: usize) -> CommandResult<()> {
        if self.args.len() == expected {
            Ok(())
        } else {
            Err(self.count(expected))
        }
    }

    /// Accept no arguments
    fn none(&self, command: Command) -> CommandResult<Command> {
        self.expect(0)?;
        Ok(command)
    }

    fn number(&self, arg: &str) -> CommandResult<f64> {
        arg.parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .ok_or_else(|| self.invalid(arg))
    }

    fn numbers<const N: usize>(&self) -> CommandResult<[f64; N]> {
        self.expect(N)?;

        let mut out = [0.0; N];
        for (x, arg) in out.iter_mut().zip(self.args) {
            *x = self.number(arg)?;
        }

        Ok(out)
    }

    fn words<const N: usize>(&self) -> CommandResult<[&'a str; N]> {
        self.expect(N)?;

        let mut out = [""; N];
        out.copy_from_slice(self.args);

        Ok(out)
    }

    fn point(&self) -> CommandResult<Point> {
        let [x, y] = self.numbers()?;
        Ok(Point::new(x, y))
    }
}
