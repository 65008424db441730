//! Per-node save data.
//!
//! Only the charge is persisted. The draw average, neighbour cache and
//! clock are rebuilt within one search interval after loading.
//!
//! The host's save container is modelled as a JSON object; a handler is
//! stored under the key `"chargeHandler"`:
//!
//! ```json
//! { "chargeHandler": { "charge": 1234.5 } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::charge::ChargeHandler;

/// Key of the handler's entry in the owning block's save container.
pub const CHARGE_HANDLER_KEY: &str = "chargeHandler";

/// Key of the charge value inside the handler's entry.
pub const CHARGE_KEY: &str = "charge";

/// Errors from decoding saved handler data.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save data is not a JSON object")]
    NotAnObject,
}

/// The persisted state of a [`ChargeHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChargeTag {
    #[serde(default)]
    pub charge: f64,
}

impl ChargeHandler {
    pub fn save(&self) -> ChargeTag {
        ChargeTag {
            charge: self.charge(),
        }
    }

    pub fn load(&mut self, tag: &ChargeTag) {
        self.set_charge(tag.charge);
    }

    /// Write this handler into the owning block's save container.
    pub fn write_to_compound(&self, compound: &mut Map<String, Value>) {
        let mut tag = Map::new();
        tag.insert(CHARGE_KEY.to_owned(), Value::from(self.charge()));
        compound.insert(CHARGE_HANDLER_KEY.to_owned(), Value::Object(tag));
    }

    /// Restore the charge from the owning block's save container.
    ///
    /// A missing entry, or a charge that is not a number, reads as `0.0`.
    pub fn read_from_compound(&mut self, compound: &Map<String, Value>) {
        let charge = compound
            .get(CHARGE_HANDLER_KEY)
            .and_then(|tag| tag.get(CHARGE_KEY))
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        self.set_charge(charge);
    }

    /// Restore from a serialized save container.
    pub fn read_from_json(&mut self, json: &str) -> Result<(), PersistError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(compound) => {
                self.read_from_compound(&compound);
                Ok(())
            }
            _ => Err(PersistError::NotAnObject),
        }
    }
}
