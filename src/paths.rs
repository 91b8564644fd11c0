//! Abstract path commands handed to a renderer.
//!
//! A path is a space separated run of tokens, e.g. `"M 10,10 L 20,10 L 20,20 z"`. This
//! is a vocabulary for the rendering collaborator, not a markup format.

use itertools::Itertools;
use std::fmt;
use std::str::FromStr;

use crate::coordinates::Coord;
use crate::errors::*;

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum PathCommand {
    MoveTo(Coord),
    LineTo(Coord),
    /// Control point then end point.
    QuadraticTo(Coord, Coord),
    /// Two control points then end point.
    CubicTo(Coord, Coord, Coord),
    Close,
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PathCommand::MoveTo(p) => write!(f, "M {}", p),
            PathCommand::LineTo(p) => write!(f, "L {}", p),
            PathCommand::QuadraticTo(c, p) => write!(f, "Q {} {}", c, p),
            PathCommand::CubicTo(c1, c2, p) => write!(f, "C {} {} {}", c1, c2, p),
            PathCommand::Close => write!(f, "z"),
        }
    }
}

#[derive(Eq, PartialEq, Clone, Debug, Default)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Path {
        Path::default()
    }

    /// A closed straight-edged outline through `points` in order.
    pub fn polygon(points: &[Coord]) -> Path {
        let mut path = Path::new();
        if let Some((&first, rest)) = points.split_first() {
            path.move_to(first);
            for &point in rest {
                path.line_to(point);
            }
            path.close();
        }
        path
    }

    pub fn move_to(&mut self, point: Coord) -> &mut Path {
        self.commands.push(PathCommand::MoveTo(point));
        self
    }

    pub fn line_to(&mut self, point: Coord) -> &mut Path {
        self.commands.push(PathCommand::LineTo(point));
        self
    }

    pub fn quadratic_to(&mut self, control: Coord, point: Coord) -> &mut Path {
        self.commands.push(PathCommand::QuadraticTo(control, point));
        self
    }

    pub fn cubic_to(&mut self, first_control: Coord, second_control: Coord, point: Coord) -> &mut Path {
        self.commands.push(PathCommand::CubicTo(first_control, second_control, point));
        self
    }

    pub fn close(&mut self) -> &mut Path {
        self.commands.push(PathCommand::Close);
        self
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// End points of every command, in order. Control points are left out.
    pub fn vertices(&self) -> Vec<Coord> {
        self.commands
            .iter()
            .filter_map(|command| match *command {
                PathCommand::MoveTo(p) |
                PathCommand::LineTo(p) |
                PathCommand::QuadraticTo(_, p) |
                PathCommand::CubicTo(_, _, p) => Some(p),
                PathCommand::Close => None,
            })
            .collect()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.commands.iter().join(" "))
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Path> {
        let malformed = || Error::from(ErrorKind::MalformedPath(s.to_string()));

        let mut tokens = s.split_whitespace();
        let mut path = Path::new();
        let next_coord = |tokens: &mut ::std::str::SplitWhitespace| -> Result<Coord> {
            let token = tokens.next().ok_or_else(|| malformed())?;
            token.parse::<Coord>().chain_err(|| ErrorKind::MalformedPath(s.to_string()))
        };

        while let Some(token) = tokens.next() {
            match token {
                "M" => {
                    let p = next_coord(&mut tokens)?;
                    path.move_to(p);
                }
                "L" => {
                    let p = next_coord(&mut tokens)?;
                    path.line_to(p);
                }
                "Q" => {
                    let c = next_coord(&mut tokens)?;
                    let p = next_coord(&mut tokens)?;
                    path.quadratic_to(c, p);
                }
                "C" => {
                    let c1 = next_coord(&mut tokens)?;
                    let c2 = next_coord(&mut tokens)?;
                    let p = next_coord(&mut tokens)?;
                    path.cubic_to(c1, c2, p);
                }
                "z" | "Z" => {
                    path.close();
                }
                _ => return Err(malformed()),
            }
        }

        Ok(path)
    }
}
