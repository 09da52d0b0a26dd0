// Eagle MCP Bridge - Admin Tools
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// health_check never fails the call: an unreachable or rejecting API is a
// report of "unhealthy", not an error.

use super::{CallContext, ToolHandler};
use crate::config::BridgeConfig;
use crate::error::ToolError;
use crate::normalize::Report;
use crate::schema::ToolDescriptor;
use crate::validate::Arguments;

pub struct AdminHandler;

impl ToolHandler for AdminHandler {
    fn prefixes(&self) -> &'static [&'static str] {
        &["health_"]
    }

    fn tools(&self) -> Vec<ToolDescriptor> {
        vec![ToolDescriptor::new("health_check", "Check if the Eagle API is reachable")]
    }

    fn handle(&self, name: &str, args: &Arguments, ctx: &CallContext<'_>) -> Result<Report, ToolError> {
        match name {
            "health_check" => Ok(health(args, ctx)),
            _ => Err(ToolError::unknown_tool(name)),
        }
    }

    fn without_session(&self, name: &str, error: &ToolError, config: &BridgeConfig) -> Option<Report> {
        (name == "health_check").then(|| unhealthy(error, config))
    }
}

fn unhealthy(error: &ToolError, config: &BridgeConfig) -> Report {
    log::warn!("health check failed: {}", error);
    let mut report = Report::new("Eagle API is unhealthy");
    report.value("Reason", error).value("Endpoint", &config.api_url);
    report
}

fn health(args: &Arguments, ctx: &CallContext<'_>) -> Report {
    match ctx.call("health_check", args) {
        Ok(data) => {
            let n = &ctx.normalizer;
            let mut report = Report::new("Eagle API is healthy");
            report
                .field("Version", n.text(data.get("version")))
                .field("Build", n.text(data.get("buildVersion")))
                .field("Platform", n.text(data.get("platform")));
            report
        }
        Err(e) => unhealthy(&e, ctx.config),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockApi;
    use crate::handlers::testing::run;
    use serde_json::json;

    #[test]
    fn healthy_reports_version() {
        let api = MockApi::new().respond_data(
            "/api/application/info",
            json!({"version": "4.0.0", "buildVersion": "20", "platform": "darwin"}),
        );
        let out = run(&AdminHandler, &api, &BridgeConfig::default(), "health_check", json!({})).unwrap();
        assert_eq!(out, "Eagle API is healthy\n- Version: 4.0.0\n- Build: 20\n- Platform: darwin\n");
    }

    #[test]
    fn unreachable_api_is_unhealthy_not_an_error() {
        let api = MockApi::new().fail(
            "/api/application/info",
            ToolError::RemoteUnavailable("connection refused".into()),
        );
        let out = run(&AdminHandler, &api, &BridgeConfig::default(), "health_check", json!({})).unwrap();
        assert!(out.starts_with("Eagle API is unhealthy\n"));
        assert!(out.contains("connection refused"));
        assert!(out.contains("- Endpoint: http://localhost:41595"));
    }

    #[test]
    fn only_health_check_survives_a_missing_session() {
        let config = BridgeConfig::default();
        let err = ToolError::RemoteUnavailable("no client".into());
        let report = AdminHandler.without_session("health_check", &err, &config).unwrap();
        assert_eq!(
            report.render(),
            "Eagle API is unhealthy\n- Reason: Eagle API unreachable: no client\n- Endpoint: http://localhost:41595\n"
        );
        assert!(AdminHandler.without_session("health_status", &err, &config).is_none());
    }
}
