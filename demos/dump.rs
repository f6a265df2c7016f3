#![deny(clippy::all)]
#![forbid(unsafe_code)]

use colored::Colorize;
use error_iter::ErrorIter as _;
use std::process::ExitCode;
use thiserror::Error;
use w4on::{Config, Error as W4onError, Layout, Sequence, ToneCommand};

const USAGE: &str = "Usage: dump [-l<loops>] [-x] <w4on-file>";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing w4on-file argument\n{}", USAGE)]
    MissingFilename,

    #[error("Invalid argument `{0}`\n{}", USAGE)]
    InvalidArgument(String),

    #[error("w4on error")]
    W4on(#[from] W4onError),

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

fn main() -> ExitCode {
    match dump() {
        Err(e) => {
            eprintln!("{} {}", "error:".red(), e);

            for cause in e.sources().skip(1) {
                eprintln!("{} {}", "caused by:".bright_red(), cause);
            }

            ExitCode::FAILURE
        }
        Ok(()) => ExitCode::SUCCESS,
    }
}

fn dump() -> Result<(), Error> {
    let mut loops = 0;
    let mut config = Config::default();
    let mut filename = None;
    for arg in std::env::args().skip(1) {
        if let Some(count) = arg.strip_prefix("-l") {
            loops = count
                .parse::<usize>()
                .map_err(|_| Error::InvalidArgument(arg.clone()))?;
        } else if arg == "-x" {
            config.layout = Layout::EXTENDED;
        } else if arg.starts_with('-') || filename.is_some() {
            return Err(Error::InvalidArgument(arg));
        } else {
            filename = Some(arg);
        }
    }
    let filename = filename.ok_or(Error::MissingFilename)?;

    // Read the w4on file
    let data = std::fs::read(filename)?;
    let mut sequence = Sequence::with_config(&data, config)?;

    for (i, track) in sequence.song().tracks().iter().enumerate() {
        println!(
            "{} #{} {:?} {:?} ({} bytes)",
            "track".bold(),
            i + 1,
            track.channel,
            track.pulse_mode,
            track.data.len()
        );
    }

    // Always plays at least once
    let mut tick = 0_usize;
    for _ in 0..=loops {
        sequence.reset();

        loop {
            let mut tones = Vec::new();
            let playing = sequence.tick(&mut |frequency: u32, duration: u32, volume: u32, flags: u32| {
                tones.push(ToneCommand {
                    frequency,
                    duration,
                    volume,
                    flags,
                })
            });

            for tone in tones {
                print_tone(tick, &tone);
            }
            if !playing {
                break;
            }
            tick += 1;
        }

        for fault in sequence.faults() {
            eprintln!("{} {}", "warning:".yellow(), fault);
        }
        for skipped in sequence.skipped() {
            eprintln!("{} {}", "note:".cyan(), skipped);
        }
    }

    println!("{} {} ticks", "done:".green(), tick);

    Ok(())
}

fn print_tone(tick: usize, tone: &ToneCommand) {
    let slide = match tone.slide_target() {
        0 => String::new(),
        target => format!(" -> {:5}", target),
    };
    println!(
        "{:6} ch{} {:5}{} a{:3} d{:3} s{:3} r{:3} vol {:3}/{:3}",
        tick.to_string().dimmed(),
        tone.flags & 0x3,
        tone.start_freq(),
        slide,
        tone.attack_ticks(),
        tone.decay_ticks(),
        tone.sustain_ticks(),
        tone.release_ticks(),
        tone.sustain_volume(),
        tone.peak_volume(),
    );
}
