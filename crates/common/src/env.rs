use std::{env, str::FromStr};

/// Reads `envvar` and parses it as `T`. Returns `None` if unset or unparsable.
pub fn parse_env<T: FromStr>(envvar: &str) -> Option<T> {
    env::var(envvar).ok().and_then(|s| T::from_str(s.trim()).ok())
}

/// Like [`parse_env`], falling back to `fallback`.
pub fn parse_env_or<T: FromStr>(envvar: &str, fallback: T) -> T {
    parse_env(envvar).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_or() {
        env::set_var("OPINIT_TEST_PARSE_ENV_OK", " 42 ");
        env::set_var("OPINIT_TEST_PARSE_ENV_BAD", "forty-two");

        assert_eq!(parse_env_or("OPINIT_TEST_PARSE_ENV_OK", 7u64), 42);
        assert_eq!(parse_env_or("OPINIT_TEST_PARSE_ENV_BAD", 7u64), 7);
        assert_eq!(parse_env_or("OPINIT_TEST_PARSE_ENV_UNSET", 7u64), 7);
        assert_eq!(parse_env::<u64>("OPINIT_TEST_PARSE_ENV_UNSET"), None);
    }
}
