use super::ConfigError;
use std::fmt::Display;
use std::str::FromStr;

/// Replace `target` with the parsed value of `name`. Unset or blank
/// variables leave the file's value in place.
pub(super) fn override_from_env<T>(name: &str, target: &mut T) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let Ok(raw) = std::env::var(name) else {
        return Ok(());
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(());
    }

    *target = raw
        .parse()
        .map_err(|e| ConfigError::EnvError(format!("Invalid {name}={raw:?}: {e}")))?;
    Ok(())
}
