use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive for the output flags
fn default_directive(verbose: bool, silent: bool) -> &'static str {
    if verbose {
        "sbom_tool=debug"
    } else if silent {
        "sbom_tool=error"
    } else {
        "sbom_tool=warn"
    }
}

/// Initialize diagnostic logging on stderr; `RUST_LOG` overrides the flags
pub fn init_logging(verbose: bool, silent: bool, json: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, silent)));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(verbose)
                    .with_file(verbose)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(true, false), "sbom_tool=debug");
        assert_eq!(default_directive(true, true), "sbom_tool=debug");
        assert_eq!(default_directive(false, true), "sbom_tool=error");
        assert_eq!(default_directive(false, false), "sbom_tool=warn");
    }
}
