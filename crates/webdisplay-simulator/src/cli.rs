use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, crate_name, crate_version, value_parser};
use webdisplay_core::ViewerConfig;
use webdisplay_core::config::DEFAULT_SOURCE;

/// Everything the simulator needs from the command line.
#[derive(Debug, Clone)]
pub struct Options {
    pub config: ViewerConfig,
    /// Factor applied to the reference profile geometry
    pub zoom: f32,
    /// Directory holding the profiles' background art
    pub assets: PathBuf,
    pub art: bool,
    /// Replay snapshots from this file instead of polling `config.source`
    pub replay: Option<PathBuf>,
}

pub fn command() -> Command {
    Command::new(crate_name!())
        .about("Mirrors the monochrome panel of a remote device")
        .version(crate_version!())
        .arg(
            Arg::new("source")
                .help("URL of the device's frame buffer endpoint")
                .long("source")
                .num_args(1)
                .default_value(DEFAULT_SOURCE),
        )
        .arg(
            Arg::new("refresh-ms")
                .help("polling interval in milliseconds, 0 or less freezes the display")
                .long("refresh-ms")
                .num_args(1)
                .allow_negative_numbers(true)
                .default_value("1000")
                .value_parser(value_parser!(i64)),
        )
        .arg(
            Arg::new("history")
                .help("frames aggregated into the heat map, 1 shows plain pixels")
                .long("history")
                .num_args(1)
                .default_value("1")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("zoom")
                .help("scale of the panel relative to its reference size")
                .long("zoom")
                .num_args(1)
                .default_value("0.5")
                .value_parser(value_parser!(f32)),
        )
        .arg(
            Arg::new("assets")
                .help("directory with PNG renderings of the panels' board artwork (PCD8544.png, SH1106.png)")
                .long("assets")
                .num_args(1)
                .default_value("assets")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("no-art")
                .help("draw panels without background images")
                .long("no-art")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("replay")
                .help("JSON file with one snapshot or an array of snapshots to cycle through")
                .long("replay")
                .num_args(1)
                .value_parser(value_parser!(PathBuf)),
        )
}

pub fn options_from_matches(matches: &ArgMatches) -> Options {
    let mut config = ViewerConfig::default();
    if let Some(source) = matches.get_one::<String>("source") {
        config.source = source.clone();
    }
    if let Some(refresh_ms) = matches.get_one::<i64>("refresh-ms") {
        config.refresh_ms = *refresh_ms;
    }
    if let Some(history) = matches.get_one::<usize>("history") {
        config.history_depth = *history;
    }

    let replay = matches.get_one::<PathBuf>("replay").cloned();
    if let Some(path) = &replay {
        config.source = path.display().to_string();
    }

    Options {
        config,
        zoom: matches.get_one::<f32>("zoom").copied().unwrap_or(0.5),
        assets: matches
            .get_one::<PathBuf>("assets")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("assets")),
        art: !matches.get_flag("no-art"),
        replay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Options {
        let matches = command()
            .try_get_matches_from(std::iter::once("webdisplay-simulator").chain(args.iter().copied()))
            .unwrap();
        options_from_matches(&matches)
    }

    #[test]
    fn test_defaults() {
        let options = parse(&[]);
        assert_eq!(options.config, ViewerConfig::default());
        assert_eq!(options.zoom, 0.5);
        assert!(options.art);
        assert!(options.replay.is_none());
    }

    #[test]
    fn test_negative_refresh_freezes() {
        let options = parse(&["--refresh-ms", "-1", "--history", "8", "--no-art"]);
        assert_eq!(options.config.refresh_ms, -1);
        assert_eq!(options.config.history_depth, 8);
        assert!(!options.art);
    }

    #[test]
    fn test_replay_becomes_source() {
        let options = parse(&["--replay", "frames.json"]);
        assert_eq!(options.replay, Some(PathBuf::from("frames.json")));
        assert_eq!(options.config.source, "frames.json");
    }

    #[test]
    fn test_command_is_consistent() {
        command().debug_assert();
    }
}
