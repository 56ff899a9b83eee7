use std::path::PathBuf;
use std::process::ExitCode;

use dotmatrix::RunConfig;

const USAGE: &str = "usage: dotmatrix <rom> [--doctor <trace-file>] [--steps <n>]";

fn main() -> ExitCode {
    env_logger::init();

    let config = match parse_args(std::env::args().skip(1)) {
        Some(config) => config,
        None => {
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = dotmatrix::run(config) {
        log::error!("{err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Option<RunConfig> {
    let rom_path = PathBuf::from(args.next()?);
    let mut doctor_path = None;
    let mut max_instructions = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--doctor" => doctor_path = Some(PathBuf::from(args.next()?)),
            "--steps" => max_instructions = Some(args.next()?.parse().ok()?),
            _ => return None,
        }
    }

    let builder = RunConfig::builder().rom_path(rom_path).doctor_path(doctor_path);
    Some(match max_instructions {
        Some(n) => builder.max_instructions(n).build(),
        None => builder.build(),
    })
}
