use image::{Rgb, RgbImage};
use std::fmt::Write;
use std::path::Path;

use crate::cells::Cell;
use crate::coordinates::Coord;
use crate::errors::*;
use crate::generators::Cave;
use crate::paths;
use crate::units::{CellPixels, ColumnsCount, Height, RowsCount, Width};

const BACKGROUND: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
const GRID_LINE: Rgb<u8> = Rgb([0, 0, 0]);

/// One classified cell as a renderer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRect {
    /// Grid column.
    pub x: usize,
    /// Grid row.
    pub y: usize,
    pub width: u32,
    pub height: u32,
    pub top: i64,
    pub left: i64,
    pub fill: &'static str,
}

impl<'a> From<&'a Cell> for RenderRect {
    fn from(cell: &'a Cell) -> RenderRect {
        RenderRect {
            x: cell.column(),
            y: cell.row(),
            width: cell.width(),
            height: cell.height(),
            top: cell.top(),
            left: cell.left(),
            fill: cell.fill(),
        }
    }
}

/// Everything needed to draw a cave: the cells in row major order and the corner paths.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPayload {
    pub rects: Vec<RenderRect>,
    pub paths: Vec<String>,
    pub width: Width,
    pub height: Height,
    pub cell_size: CellPixels,
}

impl<'a> From<&'a Cave> for RenderPayload {
    fn from(cave: &'a Cave) -> RenderPayload {
        let (RowsCount(rows), ColumnsCount(columns)) = (cave.grid.rows(), cave.grid.columns());
        let CellPixels(size) = cave.cell_size;
        RenderPayload {
            rects: cave.grid.iter().map(RenderRect::from).collect(),
            paths: cave.paths.clone(),
            width: Width(columns as u32 * size),
            height: Height(rows as u32 * size),
            cell_size: cave.cell_size,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct RenderOptions {
    grid_lines: bool,
    path_fill: &'static str,
}

#[derive(Debug, Copy, Clone)]
pub struct RenderOptionsBuilder {
    options: RenderOptions,
}

impl RenderOptionsBuilder {
    pub fn new() -> RenderOptionsBuilder {
        RenderOptionsBuilder {
            options: RenderOptions {
                grid_lines: false,
                path_fill: "#000",
            },
        }
    }
    pub fn grid_lines(mut self, on: bool) -> Self {
        self.options.grid_lines = on;
        self
    }
    pub fn path_fill(mut self, fill: &'static str) -> Self {
        self.options.path_fill = fill;
        self
    }
    pub fn build(self) -> RenderOptions {
        self.options
    }
}

impl Default for RenderOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `#rgb` or `#rrggbb`.
pub fn parse_colour(text: &str) -> Result<Rgb<u8>> {
    let malformed = || Error::from(ErrorKind::MalformedColour(text.to_string()));

    let hex = match text.strip_prefix('#') {
        Some(hex) if hex.chars().all(|c| c.is_ascii_hexdigit()) => hex,
        _ => return Err(malformed()),
    };
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| malformed());

    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, channel_value) in rgb.iter_mut().enumerate() {
                *channel_value = channel(&hex[i..i + 1])? * 17;
            }
            Ok(Rgb(rgb))
        }
        6 => Ok(Rgb([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?])),
        _ => Err(malformed()),
    }
}

/// Rasterise the payload: cell rectangles, then the filled corner paths, then the optional
/// grid overlay.
pub fn render_image(payload: &RenderPayload, options: &RenderOptions) -> Result<RgbImage> {
    let (Width(width), Height(height)) = (payload.width, payload.height);
    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);

    for rect in &payload.rects {
        let colour = parse_colour(rect.fill)?;
        fill_rect(&mut image, rect, colour);
    }

    let path_colour = parse_colour(options.path_fill)?;
    for path_text in &payload.paths {
        let path = path_text.parse::<paths::Path>()?;
        fill_polygon(&mut image, &path.vertices(), path_colour);
    }

    if options.grid_lines {
        draw_grid_lines(&mut image, payload.cell_size);
    }

    Ok(image)
}

/// Rasterise the payload and save it as a PNG file.
pub fn render_png(payload: &RenderPayload, options: &RenderOptions, output_file: &Path) -> Result<()> {
    let image = render_image(payload, options)?;
    image.save(output_file)?;
    Ok(())
}

/// The payload as a standalone SVG document.
pub fn render_svg(payload: &RenderPayload, options: &RenderOptions) -> String {
    let (Width(width), Height(height)) = (payload.width, payload.height);
    let mut svg = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(svg,
                     r#"<svg xmlns="http://www.w3.org/2000/svg" width="{0}" height="{1}" viewBox="0 0 {0} {1}">"#,
                     width,
                     height);
    for rect in &payload.rects {
        let _ = writeln!(svg,
                         r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke-width="0"/>"#,
                         rect.left,
                         rect.top,
                         rect.width,
                         rect.height,
                         rect.fill);
    }
    for path in &payload.paths {
        let _ = writeln!(svg,
                         r#"<path d="{}" fill="{1}" stroke="{1}" stroke-width="0"/>"#,
                         path,
                         options.path_fill);
    }
    if options.grid_lines {
        let CellPixels(size) = payload.cell_size;
        for x in grid_line_offsets(width, size) {
            let _ = writeln!(svg,
                             r#"<line x1="{0}" y1="0" x2="{0}" y2="{1}" stroke="black" stroke-width="1"/>"#,
                             x,
                             height);
        }
        for y in grid_line_offsets(height, size) {
            let _ = writeln!(svg,
                             r#"<line x1="0" y1="{0}" x2="{1}" y2="{0}" stroke="black" stroke-width="1"/>"#,
                             y,
                             width);
        }
    }
    svg.push_str("</svg>\n");
    svg
}

/// Interior cell boundaries along one axis of `extent` pixels.
fn grid_line_offsets(extent: u32, cell_size: u32) -> impl Iterator<Item = u32> {
    (1..).map(move |k| k * cell_size.max(1)).take_while(move |&offset| offset < extent)
}

fn fill_rect(image: &mut RgbImage, rect: &RenderRect, colour: Rgb<u8>) {
    let (left, top) = (rect.left.max(0) as u32, rect.top.max(0) as u32);
    let right = (rect.left + i64::from(rect.width)).min(i64::from(image.width())).max(0) as u32;
    let bottom = (rect.top + i64::from(rect.height)).min(i64::from(image.height())).max(0) as u32;
    for y in top..bottom {
        for x in left..right {
            image.put_pixel(x, y, colour);
        }
    }
}

/// Even-odd fill, sampling each pixel at its centre.
fn fill_polygon(image: &mut RgbImage, vertices: &[Coord], colour: Rgb<u8>) {
    if vertices.len() < 3 {
        return;
    }

    let clamp = |v: i64, max: u32| v.max(0).min(i64::from(max)) as u32;
    let min_x = clamp(vertices.iter().map(|p| p.x).min().unwrap_or(0), image.width());
    let max_x = clamp(vertices.iter().map(|p| p.x).max().unwrap_or(0), image.width());
    let min_y = clamp(vertices.iter().map(|p| p.y).min().unwrap_or(0), image.height());
    let max_y = clamp(vertices.iter().map(|p| p.y).max().unwrap_or(0), image.height());

    for y in min_y..max_y {
        for x in min_x..max_x {
            if contains_point(vertices, f64::from(x) + 0.5, f64::from(y) + 0.5) {
                image.put_pixel(x, y, colour);
            }
        }
    }
}

fn contains_point(vertices: &[Coord], x: f64, y: f64) -> bool {
    let mut inside = false;
    let mut previous = vertices[vertices.len() - 1];
    for &current in vertices {
        let (xi, yi) = (current.x as f64, current.y as f64);
        let (xj, yj) = (previous.x as f64, previous.y as f64);
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        previous = current;
    }
    inside
}

fn draw_grid_lines(image: &mut RgbImage, cell_size: CellPixels) {
    let (width, height) = image.dimensions();
    for x in grid_line_offsets(width, cell_size.0) {
        for y in 0..height {
            image.put_pixel(x, y, GRID_LINE);
        }
    }
    for y in grid_line_offsets(height, cell_size.0) {
        for x in 0..width {
            image.put_pixel(x, y, GRID_LINE);
        }
    }
}
