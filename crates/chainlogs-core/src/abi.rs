//! Event definitions as ingested from contract ABIs.

use serde::{Deserialize, Serialize};

/// A single event input as declared in the ABI.
///
/// `ty` is always the canonical Solidity type string (`uint256`, `address[]`,
/// `(address,uint256)` for tuples), ready to be joined into a signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbiParameter {
    /// Declared name. May be empty or repeat an earlier name.
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub indexed: bool,
}

impl AbiParameter {
    pub fn new(name: impl Into<String>, ty: impl Into<String>, indexed: bool) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            indexed,
        }
    }
}

/// An event name plus its ordered inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbiEventDef {
    pub name: String,
    pub inputs: Vec<AbiParameter>,
}

impl AbiEventDef {
    pub fn new(name: impl Into<String>, inputs: Vec<AbiParameter>) -> Self {
        Self {
            name: name.into(),
            inputs,
        }
    }

    /// `Name(type1,type2,...)`: types only, parameter names excluded.
    pub fn canonical_signature(&self) -> String {
        let types: Vec<&str> = self.inputs.iter().map(|p| p.ty.as_str()).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// Indexed inputs (topics[1..]) with their declaration position.
    pub fn indexed_inputs(&self) -> Vec<(usize, &AbiParameter)> {
        self.inputs
            .iter()
            .enumerate()
            .filter(|(_, p)| p.indexed)
            .collect()
    }

    /// Non-indexed inputs (data payload) with their declaration position.
    pub fn data_inputs(&self) -> Vec<(usize, &AbiParameter)> {
        self.inputs
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.indexed)
            .collect()
    }
}
