use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Фильтр логов: `-v` поднимает уровень поверх `LOG_LEVEL`/`RUST_LOG`.
pub fn log_filter(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "wp_client=debug,wp_cli=debug,info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Логи идут в stderr, чтобы не мешать выводу `--json`.
pub fn init_logging(verbose: u8, configured: &str) -> Result<()> {
    let directives = log_filter(verbose, configured);
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(verbose > 0)
        .without_time()
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_is_kept_without_verbose() {
        assert_eq!(log_filter(0, "warn"), "warn");
        assert_eq!(log_filter(0, "wp_client=trace"), "wp_client=trace");
    }

    #[test]
    fn verbose_flag_raises_level() {
        assert_eq!(log_filter(1, "warn"), "wp_client=debug,wp_cli=debug,info");
        assert_eq!(log_filter(2, "warn"), "debug");
        assert_eq!(log_filter(5, "warn"), "trace");
    }

    #[test]
    fn every_level_parses_as_filter() {
        for verbose in 0..4 {
            let directives = log_filter(verbose, "warn");
            assert!(EnvFilter::try_new(&directives).is_ok(), "{directives}");
        }
    }
}
