use std::env;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use optbind::{Binder, ConvertError, Field, Kind, Scalar, Schema};

#[derive(Debug, Default)]
struct Config {
    dinner_time: Option<Duration>,
}

const HOUR: u64 = 3600;

/// Accept a 24 hour "HH:MM" clock time as a duration since midnight.
fn parse_clock(token: &str) -> Result<Duration, ConvertError> {
    let (hours, minutes) = token
        .split_once(':')
        .ok_or_else(|| ConvertError::new(token, Kind::Duration))?;
    let hours: u64 = hours
        .parse()
        .map_err(|_| ConvertError::new(token, Kind::Duration))?;
    let minutes: u64 = minutes
        .parse()
        .map_err(|_| ConvertError::new(token, Kind::Duration))?;

    if hours >= 24 || minutes >= 60 {
        return Err(ConvertError::new(token, Kind::Duration));
    }

    let mut clock = Duration::from_secs(hours * HOUR + minutes * 60);

    // A dinner time before 14:00 must be on the 12 hour clock.
    if clock < Duration::from_secs(14 * HOUR) {
        clock += Duration::from_secs(12 * HOUR);
    }

    Ok(clock)
}

fn config_binder() -> Binder<Config> {
    let schema = Schema::new().field(Field::scalar(
        "DinnerTime",
        |config: &mut Config, value: Duration| {
            config.dinner_time = Some(value);
        },
    ));

    Binder::builder(schema)
        .mapper(
            Scalar::new("DinnerTime", |config: &mut Config, value: Duration| {
                config.dinner_time = Some(value);
            })
            .transform(parse_clock)
            // Dinner happens between 14:00 and 22:00.
            .validator(|config: &Config| {
                config.dinner_time.map_or(true, |dinner| {
                    dinner >= Duration::from_secs(14 * HOUR)
                        && dinner <= Duration::from_secs(22 * HOUR)
                })
            }),
        )
        .build()
        .expect("the clock binder must configure")
}

fn china_time_of_day() -> Duration {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("the clock must be past the epoch");
    Duration::from_secs((since_epoch.as_secs() + 8 * HOUR) % (24 * HOUR))
}

fn main() {
    let tokens: Vec<String> = env::args().skip(1).collect();
    let config = match config_binder().parse(
        tokens
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .as_slice(),
    ) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    };

    let now = china_time_of_day();

    match config.dinner_time {
        Some(dinner) if now.as_secs() / HOUR == dinner.as_secs() / HOUR => {
            println!("Dinner time!");
        }
        _ => {
            println!(
                "The current time in China is: {}",
                humantime::format_duration(now)
            );
        }
    }
}
