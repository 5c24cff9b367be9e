//! Module system for netvisor-ztp.
//!
//! Modules are the Ansible-facing units of work: each takes a parameter map,
//! drives the switch cli through a session, and reports an aggregate
//! changed/output result. The trait, parameter accessors, and registry
//! follow the same shape for all three provisioning modules.

pub mod ebgp_ospf;
pub mod vlag;
pub mod vlan;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::netvisor::{CliSession, CliTransport, Subprocess};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Parameters passed to a module, as parsed from YAML/JSON.
pub type ModuleParams = HashMap<String, serde_json::Value>;

/// Result of a module execution, mirroring the Ansible exit payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleOutput {
    /// Whether anything on the fabric changed.
    pub changed: bool,
    /// Whether the run should be reported as failed (without aborting).
    #[serde(default)]
    pub failed: bool,
    /// Human-readable summary.
    pub msg: String,
    /// Concatenated step output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    /// The assembled command, for modules that echo it back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Additional payload fields (summaries, tallies).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, serde_json::Value>,
}

impl ModuleOutput {
    pub fn ok(msg: impl Into<String>) -> Self {
        Self {
            changed: false,
            failed: false,
            msg: msg.into(),
            stdout: None,
            command: None,
            data: HashMap::new(),
        }
    }

    pub fn changed(msg: impl Into<String>) -> Self {
        Self {
            changed: true,
            ..Self::ok(msg)
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = Some(stdout.into());
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn with_failed(mut self, failed: bool) -> Self {
        self.failed = failed;
        self
    }
}

/// Execution context handed to every module: the transport the session will
/// run commands through, plus the loaded settings.
#[derive(Clone)]
pub struct ModuleContext {
    pub transport: Arc<dyn CliTransport>,
    pub settings: Settings,
}

impl ModuleContext {
    /// Context running against the real cli binary.
    pub fn new(settings: Settings) -> Self {
        Self {
            transport: Arc::new(Subprocess),
            settings,
        }
    }

    /// Context running against an injected transport (tests).
    pub fn with_transport(transport: Arc<dyn CliTransport>, settings: Settings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Open a session using credentials from the params, when present.
    pub fn session(&self, params: &ModuleParams) -> Result<CliSession> {
        let username = params.get_string("pn_cliusername")?;
        let password = params.get_string("pn_clipassword")?;
        let quiet = params.get_bool_or("pn_quiet", self.settings.quiet);
        Ok(CliSession::new(
            Arc::clone(&self.transport),
            &self.settings.cli_path,
            username.as_deref(),
            password.as_deref(),
            quiet,
        ))
    }
}

/// Trait that all modules implement.
pub trait Module: Send + Sync {
    /// Module name as referenced from playbooks.
    fn name(&self) -> &'static str;

    /// One-line description.
    fn description(&self) -> &'static str;

    /// Parameters that must be present.
    fn required_params(&self) -> &[&'static str] {
        &[]
    }

    /// Cross-parameter validation beyond presence checks.
    fn validate_params(&self, params: &ModuleParams) -> Result<()> {
        let _ = params;
        Ok(())
    }

    /// Execute the module.
    fn execute(&self, params: &ModuleParams, ctx: &ModuleContext) -> Result<ModuleOutput>;
}

/// Helper trait for extracting typed parameters.
pub trait ParamExt {
    fn get_string(&self, key: &str) -> Result<Option<String>>;
    fn get_string_required(&self, key: &str) -> Result<String>;
    fn get_string_or(&self, key: &str, default: &str) -> Result<String>;
    fn get_bool_or(&self, key: &str, default: bool) -> bool;
    fn get_u32_or(&self, key: &str, default: u32) -> Result<u32>;
    fn get_vec_string(&self, key: &str) -> Result<Vec<String>>;
    /// A string parameter restricted to a fixed set of values.
    fn get_choice(&self, key: &str, choices: &[&str]) -> Result<Option<String>>;
}

impl ParamExt for ModuleParams {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
            Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
            Some(serde_json::Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(_) => Err(Error::InvalidParameter(format!("{} must be a string", key))),
        }
    }

    fn get_string_required(&self, key: &str) -> Result<String> {
        self.get_string(key)?
            .ok_or_else(|| Error::MissingParameter(key.to_string()))
    }

    fn get_string_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self.get_string(key)?.unwrap_or_else(|| default.to_string()))
    }

    fn get_bool_or(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => {
                matches!(s.to_lowercase().as_str(), "true" | "yes" | "1" | "on")
            }
            _ => default,
        }
    }

    fn get_u32_or(&self, key: &str, default: u32) -> Result<u32> {
        match self.get_string(key)? {
            None => Ok(default),
            Some(text) => text
                .parse()
                .map_err(|_| Error::InvalidParameter(format!("{} must be a positive integer", key))),
        }
    }

    fn get_vec_string(&self, key: &str) -> Result<Vec<String>> {
        match self.get(key) {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(serde_json::Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        serde_json::Value::String(s) => out.push(s.clone()),
                        other => out.push(other.to_string().trim_matches('"').to_string()),
                    }
                }
                Ok(out)
            }
            Some(serde_json::Value::String(s)) => {
                Ok(s.split(',').map(|part| part.trim().to_string()).collect())
            }
            Some(_) => Err(Error::InvalidParameter(format!("{} must be a list", key))),
        }
    }

    fn get_choice(&self, key: &str, choices: &[&str]) -> Result<Option<String>> {
        match self.get_string(key)? {
            None => Ok(None),
            Some(value) if choices.contains(&value.as_str()) => Ok(Some(value)),
            Some(value) => Err(Error::InvalidParameter(format!(
                "{} must be one of {}, got '{}'",
                key,
                choices.join("/"),
                value
            ))),
        }
    }
}

/// Registry for looking up modules by name.
pub struct ModuleRegistry {
    modules: HashMap<String, Arc<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Registry holding the three provisioning modules.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ebgp_ospf::EbgpOspfModule));
        registry.register(Arc::new(vlag::VlagModule));
        registry.register(Arc::new(vlan::VlanModule));
        registry
    }

    pub fn register(&mut self, module: Arc<dyn Module>) {
        self.modules.insert(module.name().to_string(), module);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Module>> {
        self.modules.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Validate and execute a module by name.
    pub fn execute(
        &self,
        name: &str,
        params: &ModuleParams,
        ctx: &ModuleContext,
    ) -> Result<ModuleOutput> {
        let module = self
            .get(name)
            .ok_or_else(|| Error::ModuleNotFound(name.to_string()))?;

        for required in module.required_params() {
            if !params.contains_key(*required) {
                return Err(Error::MissingParameter((*required).to_string()));
            }
        }
        module.validate_params(params)?;
        module.execute(params, ctx)
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_registry_holds_all_modules() {
        let registry = ModuleRegistry::with_builtins();
        assert_eq!(registry.names(), ["pn_ebgp_ospf", "pn_vlag", "pn_vlan"]);
    }

    #[test]
    fn unknown_module_is_an_error() {
        let registry = ModuleRegistry::with_builtins();
        let ctx = ModuleContext::new(Settings::default());
        let err = registry
            .execute("pn_missing", &ModuleParams::new(), &ctx)
            .unwrap_err();
        assert!(matches!(err, Error::ModuleNotFound(_)));
    }

    #[test]
    fn param_ext_reads_strings_numbers_and_lists() {
        let mut params = ModuleParams::new();
        params.insert("vlan".to_string(), serde_json::json!(4040));
        params.insert("spines".to_string(), serde_json::json!(["s1", "s2"]));
        params.insert("leaves".to_string(), serde_json::json!("l1, l2"));

        assert_eq!(params.get_string("vlan").unwrap(), Some("4040".to_string()));
        assert_eq!(params.get_vec_string("spines").unwrap(), ["s1", "s2"]);
        assert_eq!(params.get_vec_string("leaves").unwrap(), ["l1", "l2"]);
        assert_eq!(params.get_vec_string("absent").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn choice_rejects_values_outside_the_set() {
        let mut params = ModuleParams::new();
        params.insert("mode".to_string(), serde_json::json!("sideways"));
        let err = params
            .get_choice("mode", &["active-active", "active-standby"])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }
}
