mod detect;
mod layout;
mod script;
mod simulate;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use ct1_keyboard::{Learner, KEYMAP, LEARN_ORDER};
use layout::Layer;

#[derive(Parser)]
#[command(name = "ct1-cli")]
#[command(about = "CT1 keyboard keymap and scan-cycle tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the base and Fn layers of the built-in keymap
    Layout {
        /// Write an HTML/SVG page to this file instead of printing text
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Run a scan script through the scanner and print every report it sends
    Simulate {
        /// Script file, one scan cycle per line
        script: PathBuf,
    },
    /// Learn which switch carries which key from a scan script
    Detect {
        /// Script file, one scan cycle per line; `back` and `skip` work the
        /// buttons beside the matrix
        script: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Layout { html: Some(path) } => {
            fs::write(&path, layout::generate_html(&KEYMAP))
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Layout written to {}", path.display());
        }
        Command::Layout { html: None } => {
            println!("{}", layout::render_text(&KEYMAP, Layer::Base));
            println!("{}", layout::render_text(&KEYMAP, Layer::Fn));
        }
        Command::Simulate { script: path } => {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let steps = script::parse_script(&contents, &KEYMAP).context("parsing scan script")?;

            let mut printer = simulate::Printer::default();
            let summary = simulate::run(&KEYMAP, &steps, &mut printer);

            println!(
                "{} cycles, {} keyboard reports, {} consumer reports, {} ghost presses suppressed, {} overflows",
                summary.cycles,
                summary.keyboard_reports,
                summary.consumer_reports,
                summary.suppressed,
                summary.overflows,
            );
            println!(
                "Fn lock {}, backlight {}",
                if summary.fn_locked { "on" } else { "off" },
                if summary.backlight { "on" } else { "off" },
            );
        }
        Command::Detect { script: path } => {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let steps = script::parse_script(&contents, &KEYMAP).context("parsing scan script")?;

            let mut learner = Learner::new(LEARN_ORDER);
            detect::run(&mut learner, &steps);

            match learner.prompt() {
                None => println!("All keys have been registered."),
                Some(key) => println!(
                    "{} of {} keys done, stopped at '{}'",
                    learner.position(),
                    LEARN_ORDER.len(),
                    key.display_name()
                ),
            }
            println!("{}", detect::render_table(learner.table()));
            println!("{}", detect::render_skipped(&learner));
        }
    }

    Ok(())
}
