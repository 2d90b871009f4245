use std::sync::Once;

pub const LOG_ENV_VAR: &str = "TASKTRASH_LOG";
const DEFAULT_FILTER: &str = "warn";

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let env = env_logger::Env::default().filter_or(LOG_ENV_VAR, DEFAULT_FILTER);
        let _ = env_logger::Builder::from_env(env)
            .format_timestamp(None)
            .format_target(true)
            .try_init();
    });
}
