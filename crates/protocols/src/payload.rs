use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entry-function payload handed to a wallet for signing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPayload {
    /// Fully qualified `address::module::function`.
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

impl TransactionPayload {
    pub fn new(function: impl Into<String>, type_arguments: Vec<String>, arguments: Vec<Value>) -> Self {
        Self {
            function: function.into(),
            type_arguments,
            arguments,
        }
    }

    /// Module and function part, e.g. `batch::remove_hyperion`.
    pub fn entry_name(&self) -> &str {
        self.function.splitn(2, "::").nth(1).unwrap_or(&self.function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let payload = TransactionPayload::new("0x1::batch::remove_hyperion", vec![], vec![json!("0xpos")]);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "function": "0x1::batch::remove_hyperion",
                "type_arguments": [],
                "arguments": ["0xpos"],
            })
        );
        assert_eq!(payload.entry_name(), "batch::remove_hyperion");
    }
}
