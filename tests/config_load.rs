use serial_test::serial;
use tracing::level_filters::LevelFilter;

// Environment-variable tests share process state; serialize them.

#[test]
#[serial]
fn load_without_sources_yields_defaults() {
    for (key, _) in std::env::vars().filter(|(k, _)| k.starts_with("OPSBOARD")) {
        unsafe { std::env::remove_var(&key) };
    }

    let settings = opsboard::config::load().expect("defaults load");
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert_eq!(settings.pagination.default_page_size, 10);
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.ttl_seconds, 604_800);
}

#[test]
#[serial]
fn environment_overrides_take_effect() {
    unsafe {
        std::env::set_var("OPSBOARD__LOGGING__LEVEL", "debug");
        std::env::set_var("OPSBOARD__CACHE__TTL_SECONDS", "120");
        std::env::set_var("OPSBOARD__PAGINATION__DEFAULT_PAGE_SIZE", "25");
    }

    let settings = opsboard::config::load().expect("env overrides load");

    unsafe {
        std::env::remove_var("OPSBOARD__LOGGING__LEVEL");
        std::env::remove_var("OPSBOARD__CACHE__TTL_SECONDS");
        std::env::remove_var("OPSBOARD__PAGINATION__DEFAULT_PAGE_SIZE");
    }

    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.cache.ttl_seconds, 120);
    assert_eq!(settings.pagination.default_page_size, 25);
}

#[test]
#[serial]
fn invalid_environment_level_fails_loading() {
    unsafe { std::env::set_var("OPSBOARD__LOGGING__LEVEL", "chatty") };
    let result = opsboard::config::load();
    unsafe { std::env::remove_var("OPSBOARD__LOGGING__LEVEL") };
    assert!(result.is_err());
}
