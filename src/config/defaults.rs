//! Built-in defaults (lowest-precedence layer)

use serde_json::{json, Value};

/// Default directory holding `<id>.json` instance files
pub const DEFAULT_STORE_PATH: &str = "./instances";

/// Built-in configuration layer
pub fn builtin_layer() -> Value {
    json!({
        "store": {
            "path": DEFAULT_STORE_PATH
        },
        "overwrite_target_holidays": true,
        "on_target_failure": "continue",
        "output": "human"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_layer_shape() {
        let layer = builtin_layer();
        assert_eq!(layer["store"]["path"], DEFAULT_STORE_PATH);
        assert_eq!(layer["overwrite_target_holidays"], true);
        assert_eq!(layer["on_target_failure"], "continue");
    }
}
