//! Shared building blocks for the salon backend crates: log setup,
//! process-wide metrics, and small wire types.

pub mod types;
pub mod utils;
pub mod metrics;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn error_body_omits_missing_detail() {
        let body = types::ErrorBody { error: "Not Found".into(), detail: None };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Not Found" }));
    }
}
