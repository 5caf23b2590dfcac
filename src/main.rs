use heartfield::{FieldConfig, HeartField};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => match FieldConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("Could not load {}: {}", path, err);
                std::process::exit(2);
            }
        },
        None => FieldConfig::default(),
    };

    if let Err(err) = HeartField::from_config(config).run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
