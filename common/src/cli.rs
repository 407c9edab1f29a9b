//! A standardized `clap` command builder, in the teacher's `cli::app`
//! style: a single flag-selecting function shared by every Warbots binary
//! rather than each binary hand-rolling its own `Command`.

use clap::{value_parser, Arg, ArgAction, Command};

use crate::conf;

/// Builds a `Command` with the flags named in `included_flags`, one
/// character per flag, in the same spirit as the teacher's
/// `cli::app(name, included_flags)`.
///
/// - `l`: listen address (`host:port`)
/// - `t`: dispatcher tick interval, in seconds
/// - `s`: RNG seed, for deterministic runs
/// - `v`: verbosity (repeatable)
pub fn app(name: &'static str, included_flags: &'static str) -> Command {
    let mut app = Command::new(name).version(conf::APP_VERSION).about(conf::APP_SUBTITLE);

    for c in included_flags.chars() {
        app = app.arg(match c {
            'l' => Arg::new("listen")
                .short('l')
                .long("listen")
                .env("WARBOTS_LISTEN")
                .help("Address to listen on, host:port")
                .default_value("127.0.0.1:7654"),

            't' => Arg::new("tick_interval_secs")
                .short('t')
                .long("tick-interval")
                .env("WARBOTS_TICK_INTERVAL_SECS")
                .help("How often the dispatcher checks deadlines and AI delays, in seconds")
                .value_parser(value_parser!(u64))
                .default_value("1"),

            's' => Arg::new("seed")
                .short('s')
                .long("seed")
                .env("WARBOTS_SEED")
                .help("Fix the RNG seed, for reproducible runs")
                .value_parser(value_parser!(u64)),

            'v' => Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity (repeatable)"),

            c => panic!("Tried to build CLI with unrecognized flag '{}'", c),
        });
    }

    app
}

/// Maps `-v`/`-vv`/`-vvv` to a `tracing` filter directive, the same way the
/// teacher's CLI picks verbosity knobs off of repeated flags.
pub fn verbosity_filter(count: u8) -> &'static str {
    match count {
        0 => "warbotsd=info",
        1 => "warbotsd=debug",
        _ => "warbotsd=trace",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn app_parses_listen_and_verbosity() {
        let matches = app("warbotsd", "lv").get_matches_from(["warbotsd", "-l", "0.0.0.0:9000", "-vv"]);
        assert_eq!(matches.get_one::<String>("listen").unwrap(), "0.0.0.0:9000");
        assert_eq!(matches.get_count("verbose"), 2);
    }
}
