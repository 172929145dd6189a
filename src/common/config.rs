use super::{ConfigSnafu, Result};

/// If the value begins with an '@', read the following file path,
/// otherwise returns the value.
///
/// prefix is used to provide context in case of an error.
pub(crate) fn key_file_or_string(value: String, prefix: &str) -> Result<String> {
    Ok(match value.strip_prefix('@') {
        Some(key_file) => std::fs::read_to_string(key_file)
            .map_err(|err| {
                ConfigSnafu {
                    message: format!("Failed to read key from {key_file}: {err}"),
                    prefix,
                }
                .build()
            })?
            .trim()
            .into(),
        None => value,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn plain_value_is_returned() {
        assert_eq!(
            key_file_or_string("secret".into(), "test").unwrap(),
            "secret"
        );
    }

    #[test]
    fn at_prefix_reads_and_trims_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  from-file  ").unwrap();
        let value = format!("@{}", file.path().display());

        assert_eq!(key_file_or_string(value, "test").unwrap(), "from-file");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = key_file_or_string("@/nonexistent/token".into(), "digitalocean").unwrap_err();
        assert!(err.to_string().starts_with("digitalocean: Failed to read key"));
    }
}
