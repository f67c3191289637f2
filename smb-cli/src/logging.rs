/// Route `log` output through env_logger; `RUST_LOG` wins, otherwise info.
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}
