use serde_json::Value;
use tracing::debug;

use crate::errors::{Error, Result};
use crate::models::Theme;
use crate::store::{self, keys, Store};

/// Theme saved by the last toggle, light if none was saved
///
/// Old stores hold the bare word `light` or `dark` rather than JSON.
pub fn load(store: &dyn Store) -> Result<Theme> {
    let loaded = store::load_record::<Theme, _>(store, keys::THEME, |value| match value {
        Value::String(name) => name.parse(),
        other => Err(Error::InvalidInput(format!("unknown theme {}", other))),
    })?;
    Ok(loaded.map(|loaded| loaded.value).unwrap_or_default())
}

/// Flip between light and dark and remember the choice
pub fn toggle(store: &mut dyn Store, current: Theme) -> Result<Theme> {
    let next = current.toggled();
    store::save(store, keys::THEME, &next)?;
    debug!("Theme set to {}", next.as_str());
    Ok(next)
}
