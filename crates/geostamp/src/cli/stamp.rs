//! The default command: stamp one photo.

use clap::Args;
use dialoguer::Input;
use geostamp_core::{Config, StampOptions, StampReport, Stamper};
use std::path::{Path, PathBuf};

use super::theme::geostamp_theme;

/// Arguments for stamping a photo.
#[derive(Args, Debug, Default)]
pub struct StampArgs {
    /// Source photo (prompted for when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Source photo, as a flag
    #[arg(short = 'i', long = "input", value_name = "INPUT", conflicts_with = "input")]
    pub input_flag: Option<PathBuf>,

    /// Output path [default: <stem>-P.<FILETYPE> beside the input]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stamp this place instead of looking it up
    #[arg(short, long)]
    pub place: Option<String>,

    /// Font file
    #[arg(short = 'f', long = "fontfamily", value_name = "FONT")]
    pub font_family: Option<PathBuf>,

    /// Font size in pixels
    #[arg(short = 's', long = "fontsize", value_name = "SIZE")]
    pub font_size: Option<u32>,

    /// Margin from the right and bottom edges in pixels
    #[arg(short, long)]
    pub margin: Option<u32>,

    /// Output file type when the output path has no usable extension
    #[arg(short = 't', long = "filetype", value_name = "TYPE")]
    pub filetype: Option<String>,

    /// Crop width
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Crop height
    #[arg(short = 'h', long)]
    pub height: Option<u32>,

    /// Proxy for geocoding requests (e.g. http://127.0.0.1:7890)
    #[arg(long, env = "GEOSTAMP_PROXY")]
    pub proxy: Option<String>,

    /// Reverse-geocoding service base URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Skip place lookup and stamp the timestamp only
    #[arg(long)]
    pub no_geocode: bool,
}

impl StampArgs {
    /// The input path from either the positional argument or `-i`.
    pub fn source(&self) -> Option<PathBuf> {
        self.input.clone().or_else(|| self.input_flag.clone())
    }

    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(font) = &self.font_family {
            config.render.font_family = font.clone();
        }
        if let Some(size) = self.font_size {
            config.render.font_size = size;
        }
        if let Some(margin) = self.margin {
            config.render.margin = margin;
        }
        if let Some(filetype) = &self.filetype {
            config.output.filetype = filetype.clone();
        }
        if let Some(width) = self.width {
            config.crop.width = width;
        }
        if let Some(height) = self.height {
            config.crop.height = height;
        }
        if let Some(proxy) = &self.proxy {
            config.geocoding.proxy = Some(proxy.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.geocoding.endpoint = endpoint.clone();
        }
    }

    fn options(&self) -> StampOptions {
        StampOptions {
            output: self.output.clone(),
            place: self.place.clone(),
            no_geocode: self.no_geocode,
        }
    }
}

/// Execute the stamp command.
pub async fn execute(args: StampArgs, mut config: Config) -> anyhow::Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let input = match args.source() {
        Some(path) => path,
        None => match prompt_for_input()? {
            Some(path) => path,
            None => return Ok(()),
        },
    };

    let options = args.options();
    let stamper = Stamper::new(config);
    let report = stamper.stamp(&input, &options).await?;

    for line in summary_lines(&input, &report, options.place.is_some()) {
        println!("{line}");
    }
    Ok(())
}

/// Lines printed to stdout once a photo is stamped.
fn summary_lines(input: &Path, report: &StampReport, explicit_place: bool) -> Vec<String> {
    let mut lines = Vec::with_capacity(2);
    if !report.has_location && !explicit_place {
        lines.push(format!("[{}] Unknown location.", input.display()));
    }
    lines.push(format!(
        "[{}] {}",
        report.output.display(),
        report.summary_place()
    ));
    lines
}

/// Ask for the source photo. `None` when the prompt is interrupted.
fn prompt_for_input() -> anyhow::Result<Option<PathBuf>> {
    let theme = geostamp_theme();
    let answer = handle_interrupt(
        Input::<String>::with_theme(&theme)
            .with_prompt("Source photo")
            .validate_with(|s: &String| -> Result<(), String> {
                let path = normalize_prompted_path(s);
                if path.is_file() {
                    Ok(())
                } else {
                    Err(format!("No such file: {}", path.display()))
                }
            })
            .interact_text(),
    )?;
    Ok(answer.map(|s| normalize_prompted_path(&s)))
}

/// Handle a dialoguer result, treating Ctrl+C as a clean exit.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Trim whitespace and the quotes a dragged-in file gets, then expand `~`.
fn normalize_prompted_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'');
    PathBuf::from(shellexpand::tilde(trimmed).into_owned())
}
