/// Initializes the global logger. Call once from the binary entry point.
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
