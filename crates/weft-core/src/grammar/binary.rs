//! Binary serialization for grammar definitions using postcard.

use super::json::GrammarDefError;
use super::types::GrammarDef;

impl GrammarDef {
    /// Deserialize a grammar definition from binary format.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, GrammarDefError> {
        Ok(postcard::from_bytes(bytes)?)
    }

    /// Serialize the grammar definition to binary format.
    pub fn to_binary(&self) -> Result<Vec<u8>, GrammarDefError> {
        Ok(postcard::to_allocvec(self)?)
    }
}
