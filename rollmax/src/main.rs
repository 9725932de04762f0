use rollmax::cli::{Args, BaseCommand, Command};
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::new(pico_args::Arguments::from_env());

    let cmd = match BaseCommand::try_from_cli_args(args) {
        Ok(cmd) => cmd,
        Err(err) => {
            eprintln!("error: {}", err);
            eprintln!("Try 'rollmax --help' for more information.");
            process::exit(1);
        }
    };

    match cmd.run() {
        Ok(out) => println!("{}", out),
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(1);
        }
    }
}
