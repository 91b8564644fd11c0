//! Error types shared by the cave library and the driver.
//!
//! Structural failures (bad grid access, malformed coordinate or path text) propagate
//! to the caller. `DegenerateGeometry` is the one kind the generator recovers from,
//! one semi-wall cell at a time.

// Create the Error, ErrorKind, ResultExt, and Result types.
use error_chain::*;

error_chain! {

    foreign_links {
        Io(::std::io::Error);
        Image(::image::ImageError);
    }

    errors {
        OutOfBounds(row: usize, column: usize, rows: usize, columns: usize) {
            description("grid access out of bounds")
            display("grid position (row {}, column {}) is outside a {} x {} grid",
                    row, column, rows, columns)
        }

        EmptyGrid {
            description("random cell requested from an empty grid")
            display("cannot pick a random cell from a grid with zero rows or columns")
        }

        MalformedCoordString(text: String) {
            description("malformed coordinate string")
            display("malformed coordinate string '{}', expected '<x>,<y>'", text)
        }

        MalformedPath(text: String) {
            description("malformed path string")
            display("malformed path string '{}'", text)
        }

        MalformedColour(text: String) {
            description("malformed fill colour")
            display("malformed fill colour '{}', expected '#rgb' or '#rrggbb'", text)
        }

        DegenerateGeometry(row: usize, column: usize) {
            description("semi-wall triangle is missing a vertex")
            display("semi-wall at (row {}, column {}) has no right angle vertex", row, column)
        }

        InvalidParameters(reason: String) {
            description("invalid cave generation parameters")
            display("invalid cave generation parameters: {}", reason)
        }
    }
}
