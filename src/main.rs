use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use starfield::{StarFieldConfig, Variant};

fn cli() -> Command {
    Command::new("starfield")
        .about("Animated parallax star field background")
        .arg(
            Arg::new("stars")
                .long("stars")
                .help("Number of stars")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i64)),
        )
        .arg(
            Arg::new("speed")
                .long("speed")
                .help("Depth travelled per frame step")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(f32)),
        )
        .arg(
            Arg::new("glow")
                .long("glow")
                .help("Glow halo radius multiplier")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(f32)),
        )
        .arg(
            Arg::new("shooting-stars")
                .long("shooting-stars")
                .help("Shooting star frequency (reserved)")
                .value_parser(value_parser!(f32)),
        )
        .arg(
            Arg::new("color")
                .long("color")
                .help("Palette entry as rgb(...) or rgba(...); repeat for more")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("minimal")
                .long("minimal")
                .help("Plain stars without twinkle, flares or background wash")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Seed for a reproducible field")
                .value_parser(value_parser!(u64)),
        )
}

fn config_from(matches: &ArgMatches) -> StarFieldConfig {
    let mut config = StarFieldConfig::default();
    if let Some(&stars) = matches.get_one::<i64>("stars") {
        config = config.with_star_count(stars);
    }
    if let Some(&speed) = matches.get_one::<f32>("speed") {
        config = config.with_speed(speed);
    }
    if let Some(&glow) = matches.get_one::<f32>("glow") {
        config = config.with_glow_intensity(glow);
    }
    if let Some(&frequency) = matches.get_one::<f32>("shooting-stars") {
        config = config.with_shooting_star_frequency(frequency);
    }
    if let Some(colors) = matches.get_many::<String>("color") {
        let colors: Vec<&String> = colors.collect();
        config = config.with_palette(&colors);
    }
    if matches.get_flag("minimal") {
        config = config.with_variant(Variant::Minimal);
    }
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config = config.with_seed(seed);
    }
    config
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config_from(&cli().get_matches());
    log::info!(
        "🌌 starting with {} stars, speed {}, {:?}",
        config.star_count,
        config.speed,
        config.variant
    );

    starfield::app::run(config)?;
    Ok(())
}
