use anyhow::Result;
use clap::value_t_or_exit;
use std::path::PathBuf;
use thermal_filter::{arg, args_parser, opt};

pub struct Args {
    pub image: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("thermal-filter")
            .about("Render a photo with a monochrome thermal-camera look.")
            .arg(
                opt!("output")
                    .short("o")
                    .help("Output PNG path.  Default is thermal.png"),
            )
            .arg(
                opt!("config")
                    .short("c")
                    .help("JSON file overriding the pipeline constants"),
            )
            .arg(arg!("image").required(true).help("Input image path"))
            .get_matches();

        let image = value_t_or_exit!(matches, "image", PathBuf);
        let output = matches
            .is_present("output")
            .then(|| value_t_or_exit!(matches.value_of("output"), PathBuf))
            .unwrap_or_else(|| PathBuf::from("thermal.png"));
        let config = matches
            .is_present("config")
            .then(|| value_t_or_exit!(matches.value_of("config"), PathBuf));

        Ok(Args {
            image,
            output,
            config,
        })
    }
}
