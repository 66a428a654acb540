use std::env;

use optbind::{Binder, Collection, Field, Schema};

#[derive(Debug, Default)]
struct Config {
    names: Vec<String>,
    greet: bool,
}

fn config_binder() -> Binder<Config> {
    let schema = Schema::new()
        .field(
            Field::collection("Names", |config: &mut Config, value: String| {
                config.names.push(value);
            })
            .alias("name")
            .alias("n"),
        )
        .field(Field::scalar("Greet", |config: &mut Config, value: bool| {
            config.greet = value;
        }));

    Binder::builder(schema)
        .mapper(
            Collection::new("Names", |config: &mut Config, value: String| {
                config.names.push(value);
            })
            .required(),
        )
        .build()
        .expect("the greeter binder must configure")
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

    if config.greet {
        for name in &config.names {
            println!("Hey, {name}!");
        }
    }
}
