use caves::{
    generators::{CaveGenerator, GenerationParams},
    renderers::{self, RenderOptionsBuilder, RenderPayload},
    utils,
};
use docopt::Docopt;
use log::info;
use serde_derive::Deserialize;
use std::{fs, path::Path};

const USAGE: &str = "Caves

Usage:
    caves_driver -h | --help
    caves_driver [options]
    caves_driver render (text|image|svg) [options]

Options:
    -h --help              Show this screen.
    --columns=<n>          Number of grid columns [default: 50].
    --rows=<n>             Number of grid rows [default: 50].
    --density=<p>          Percentage chance, 0 to 100, that a cell starts open [default: 55].
    --iterations=<n>       Number of single cell relaxation steps [default: 25000].
    --cell-pixels=<n>      Pixel length of one cell side in image and svg output [default: 70].
    --seed=<n>             Seed for a repeatable cave. A fresh random cave is made if not given.
    --out=<path>           Output file path. Text and svg go to stdout if not given, images to cave.png.
    --grid-lines           Draw the cell boundaries over image and svg output.
";

const DEFAULT_IMAGE_FILE: &str = "cave.png";

#[derive(Debug, Deserialize)]
struct CaveArgs {
    cmd_render: bool,
    cmd_text: bool,
    cmd_image: bool,
    cmd_svg: bool,
    flag_columns: usize,
    flag_rows: usize,
    flag_density: u8,
    flag_iterations: usize,
    flag_cell_pixels: u32,
    flag_seed: Option<u64>,
    flag_out: String,
    flag_grid_lines: bool,
}

mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Cave(::caves::errors::Error, ::caves::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Output {
    Text,
    Image,
    Svg,
}

fn main() -> Result<()> {

    env_logger::init();

    let args: CaveArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    let params = GenerationParams {
        columns: args.flag_columns,
        rows: args.flag_rows,
        cell_size: args.flag_cell_pixels,
        density: args.flag_density,
        iterations: args.flag_iterations,
    };
    let generator = CaveGenerator::new(params)?;

    let mut rng = match args.flag_seed {
        Some(seed) => utils::seeded_rng(seed),
        None => utils::fresh_rng(),
    };
    let cave = generator.generate(&mut rng)?;

    let options = RenderOptionsBuilder::new()
        .grid_lines(args.flag_grid_lines)
        .build();

    match output_kind(&args) {
        Output::Text => write_or_print(&cave.grid.to_string(), &args.flag_out)?,
        Output::Svg => {
            let svg = renderers::render_svg(&RenderPayload::from(&cave), &options);
            write_or_print(&svg, &args.flag_out)?;
        }
        Output::Image => {
            let out = if args.flag_out.is_empty() {
                DEFAULT_IMAGE_FILE
            } else {
                args.flag_out.as_str()
            };
            renderers::render_png(&RenderPayload::from(&cave), &options, Path::new(out))
                .chain_err(|| format!("Failed to write cave image to {}", out))?;
            info!("wrote cave image to {}", out);
        }
    }

    Ok(())
}

/// Small caves read fine as text, so without a render command they are printed rather
/// than rasterised.
fn output_kind(args: &CaveArgs) -> Output {
    let large_grid_cell_count = 25 * 25;

    if args.cmd_render {
        match (args.cmd_text, args.cmd_image, args.cmd_svg) {
            (true, _, _) => Output::Text,
            (_, _, true) => Output::Svg,
            _ => Output::Image,
        }
    } else if args.flag_columns * args.flag_rows < large_grid_cell_count {
        Output::Text
    } else {
        Output::Image
    }
}

fn write_or_print(text: &str, file_name: &str) -> Result<()> {
    if file_name.is_empty() {
        print!("{}", text);
    } else {
        fs::write(file_name, text)
            .chain_err(|| format!("Failed to write cave to file {}", file_name))?;
        info!("wrote cave to {}", file_name);
    }
    Ok(())
}
