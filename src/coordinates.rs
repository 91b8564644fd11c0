use std::convert::From;
use std::fmt;
use std::str::FromStr;

use crate::errors::*;

/// A point in pixel space.
///
/// The canonical text form is `"<x>,<y>"`, integers with no whitespace. `Display` writes
/// it and `FromStr` reads it back.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    pub fn new(x: i64, y: i64) -> Coord {
        Coord { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Coord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Coord> {
        let malformed = || Error::from(ErrorKind::MalformedCoordString(s.to_string()));

        let mut parts = s.split(',');
        let (x_text, y_text) = match (parts.next(), parts.next(), parts.next()) {
            (Some(x), Some(y), None) => (x, y),
            _ => return Err(malformed()),
        };

        let x = x_text.parse::<i64>().map_err(|_| malformed())?;
        let y = y_text.parse::<i64>().map_err(|_| malformed())?;
        Ok(Coord::new(x, y))
    }
}

impl From<(i64, i64)> for Coord {
    fn from(x_y_pair: (i64, i64)) -> Coord {
        Coord::new(x_y_pair.0, x_y_pair.1)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn stringify() {
        assert_eq!(Coord::new(12, 7).to_string(), "12,7");
        assert_eq!(Coord::new(-3, 0).to_string(), "-3,0");
    }

    #[test]
    fn parse() {
        assert_eq!("12,7".parse::<Coord>().unwrap(), Coord::new(12, 7));
        assert_eq!("-140,70".parse::<Coord>().unwrap(), Coord::new(-140, 70));
    }

    #[test]
    fn parse_rejects_malformed_text() {
        let is_malformed = |text: &str| match text.parse::<Coord>() {
            Err(Error(ErrorKind::MalformedCoordString(ref t), _)) => t == text,
            _ => false,
        };
        assert!(is_malformed(""));
        assert!(is_malformed("12"));
        assert!(is_malformed("12,7,3"));
        assert!(is_malformed("a,7"));
        assert!(is_malformed("12,"));
        assert!(is_malformed(" 12,7"));
        assert!(is_malformed("12, 7"));
        assert!(is_malformed("1.5,2"));
    }

    #[test]
    fn from_pair() {
        assert_eq!(Coord::from((4, 9)), Coord::new(4, 9));
    }

    #[test]
    fn stringify_parse_round_trip() {
        fn p(x: i64, y: i64) -> bool {
            let c = Coord::new(x, y);
            c.to_string().parse::<Coord>().map(|parsed| parsed == c).unwrap_or(false)
        }
        quickcheck(p as fn(i64, i64) -> bool)
    }
}
