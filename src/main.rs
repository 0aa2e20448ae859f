use global_rootfinding::Config;

fn main() {
    env_logger::init();
    let config = Config::build();
    if let Err(error) = global_rootfinding::run(&config) {
        log::error!("{error}");
        std::process::exit(1);
    }
}
