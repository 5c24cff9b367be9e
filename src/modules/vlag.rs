//! `pn_vlag`: create or delete a virtual link aggregation group.
//!
//! One command is assembled from the verb and whatever optional knobs are
//! present, run once, and echoed back in the payload alongside the switch's
//! response.

use super::{Module, ModuleContext, ModuleOutput, ModuleParams, ParamExt};
use crate::error::{Error, Result};

pub struct VlagModule;

impl VlagModule {
    /// The command tail after the session prefix.
    fn build_command(&self, params: &ModuleParams) -> Result<String> {
        let verb = params
            .get_choice("pn_vlagcommand", &["vlag-create", "vlag-delete"])?
            .ok_or_else(|| Error::MissingParameter("pn_vlagcommand".to_string()))?;
        let name = params.get_string_required("pn_vlagname")?;
        let mut cmd = format!("{} name {}", verb, name);

        if let Some(port) = params.get_string("pn_vlaglport")? {
            cmd.push_str(&format!(" port {}", port));
        }
        if let Some(peer_port) = params.get_string("pn_vlagpeerport")? {
            cmd.push_str(&format!(" peer-port {}", peer_port));
        }
        if let Some(mode) = params.get_choice("pn_vlagmode", &["active-active", "active-standby"])? {
            cmd.push_str(&format!(" mode {}", mode));
        }
        if let Some(peer) = params.get_string("pn_vlagpeerswitch")? {
            cmd.push_str(&format!(" peer-switch {}", peer));
        }
        if let Some(failover) =
            params.get_choice("pn_vlagfailover", &["failover-move-L2", "failover-ignore-L2"])?
        {
            cmd.push_str(&format!(" {}", failover));
        }
        if let Some(lacp_mode) = params.get_choice("pn_vlaglacpmode", &["off", "passive", "active"])? {
            cmd.push_str(&format!(" lacp-mode {}", lacp_mode));
        }
        if let Some(timeout) = params.get_choice("pn_vlaglacptimeout", &["slow", "fast"])? {
            cmd.push_str(&format!(" lacp-timeout {}", timeout));
        }
        if let Some(fallback) = params.get_choice("pn_vlagfallback", &["individual", "bundled"])? {
            cmd.push_str(&format!(" lacp-fallback {}", fallback));
        }
        if let Some(timeout) = params.get_string("pn_vlagfallbacktimeout")? {
            cmd.push_str(&format!(" lacp-fallback-timeout {}", timeout));
        }

        Ok(cmd)
    }
}

impl Module for VlagModule {
    fn name(&self) -> &'static str {
        "pn_vlag"
    }

    fn description(&self) -> &'static str {
        "Create or delete a VLAG spanning a switch cluster pair"
    }

    fn required_params(&self) -> &[&'static str] {
        &["pn_cliusername", "pn_clipassword", "pn_vlagcommand", "pn_vlagname"]
    }

    fn validate_params(&self, params: &ModuleParams) -> Result<()> {
        let verb = params
            .get_choice("pn_vlagcommand", &["vlag-create", "vlag-delete"])?
            .ok_or_else(|| Error::MissingParameter("pn_vlagcommand".to_string()))?;

        // vlag-create additionally needs both ends of the aggregation.
        if verb == "vlag-create" {
            for key in ["pn_vlaglport", "pn_vlagpeerport"] {
                if params.get_string(key)?.is_none() {
                    return Err(Error::MissingParameter(key.to_string()));
                }
            }
        }
        Ok(())
    }

    fn execute(&self, params: &ModuleParams, ctx: &ModuleContext) -> Result<ModuleOutput> {
        let tail = self.build_command(params)?;
        let session = ctx.session(params)?;
        let command = format!("{}{}", session.prefix(), tail);

        let reply = session.run(&tail)?;
        Ok(ModuleOutput::changed("VLAG command executed")
            .with_stdout(reply.text().trim_end_matches(['\r', '\n']))
            .with_command(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base_params(verb: &str) -> ModuleParams {
        let mut params = ModuleParams::new();
        params.insert("pn_cliusername".to_string(), serde_json::json!("admin"));
        params.insert("pn_clipassword".to_string(), serde_json::json!("admin"));
        params.insert("pn_vlagcommand".to_string(), serde_json::json!(verb));
        params.insert("pn_vlagname".to_string(), serde_json::json!("vlag-1"));
        params
    }

    #[test]
    fn create_command_includes_every_present_flag() {
        let mut params = base_params("vlag-create");
        params.insert("pn_vlaglport".to_string(), serde_json::json!("spine01"));
        params.insert("pn_vlagpeerport".to_string(), serde_json::json!("spine02"));
        params.insert("pn_vlagmode".to_string(), serde_json::json!("active-active"));
        params.insert("pn_vlaglacpmode".to_string(), serde_json::json!("active"));
        params.insert("pn_vlaglacptimeout".to_string(), serde_json::json!("fast"));

        let cmd = VlagModule.build_command(&params).unwrap();
        assert_eq!(
            cmd,
            "vlag-create name vlag-1 port spine01 peer-port spine02 \
             mode active-active lacp-mode active lacp-timeout fast"
        );
    }

    #[test]
    fn delete_command_is_verb_and_name_only() {
        let cmd = VlagModule.build_command(&base_params("vlag-delete")).unwrap();
        assert_eq!(cmd, "vlag-delete name vlag-1");
    }

    #[test]
    fn create_requires_both_ports() {
        let err = VlagModule.validate_params(&base_params("vlag-create")).unwrap_err();
        assert!(matches!(err, Error::MissingParameter(key) if key == "pn_vlaglport"));
    }

    #[test]
    fn delete_needs_no_ports() {
        assert!(VlagModule.validate_params(&base_params("vlag-delete")).is_ok());
    }

    #[test]
    fn bad_mode_is_rejected() {
        let mut params = base_params("vlag-create");
        params.insert("pn_vlaglport".to_string(), serde_json::json!("33"));
        params.insert("pn_vlagpeerport".to_string(), serde_json::json!("33"));
        params.insert("pn_vlagmode".to_string(), serde_json::json!("sideways"));
        assert!(VlagModule.build_command(&params).is_err());
    }
}
