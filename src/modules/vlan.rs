//! `pn_vlan`: create, delete, or modify VLANs on one switch.
//!
//! `pn_vlanid` accepts a combination of comma-separated ids and ranges
//! (`200,210-215`). Each id is handled individually against the switch's
//! existing VLAN table and tallied into a pass/fail summary; an id outside
//! 2..=4092 fails the whole run up front.

use super::{Module, ModuleContext, ModuleOutput, ModuleParams, ParamExt};
use crate::error::{Error, Result};
use crate::netvisor::{CliSession, Topology};

pub const MIN_VLAN_ID: u32 = 2;
pub const MAX_VLAN_ID: u32 = 4092;

/// Expand `200,210-215` into individual ids, first-seen order, deduplicated.
pub fn expand_range(range: &str) -> Result<Vec<u32>> {
    let mut ids = Vec::new();
    for part in range.split(',') {
        let part = part.trim();
        let mut push = |id: u32| {
            if !ids.contains(&id) {
                ids.push(id);
            }
        };
        match part.split_once('-') {
            None => push(
                part.parse()
                    .map_err(|_| Error::InvalidParameter(format!("invalid vlan id '{}'", part)))?,
            ),
            Some((low, high)) => {
                let low: u32 = low.trim().parse().map_err(|_| {
                    Error::InvalidParameter(format!("invalid vlan range '{}'", part))
                })?;
                let high: u32 = high.trim().parse().map_err(|_| {
                    Error::InvalidParameter(format!("invalid vlan range '{}'", part))
                })?;
                if low > high {
                    return Err(Error::InvalidParameter(format!(
                        "invalid vlan range '{}'",
                        part
                    )));
                }
                (low..=high).for_each(push);
            }
        }
    }
    Ok(ids)
}

pub struct VlanModule;

impl VlanModule {
    fn create_command(&self, params: &ModuleParams, vlan_id: u32, scope: &str) -> Result<String> {
        let mut cmd = format!("vlan-create id {} scope {}", vlan_id, scope);
        for (key, flag) in [
            ("pn_vnet", "vnet"),
            ("pn_vxlan", "vxlan"),
            ("pn_vxlan_mode", "vxlan-mode"),
            ("pn_public_vlan", "public-vlan"),
            ("pn_description", "description"),
        ] {
            if let Some(value) = params.get_string(key)? {
                cmd.push_str(&format!(" {} {}", flag, value));
            }
        }
        if let Some(serde_json::Value::Bool(stats)) = params.get("pn_stats") {
            cmd.push_str(if *stats { " stats" } else { " no-stats" });
        }
        for (key, flag) in [("pn_ports", "ports"), ("pn_untagged_ports", "untagged-ports")] {
            if let Some(value) = params.get_string(key)? {
                cmd.push_str(&format!(" {} {}", flag, value));
            }
        }
        Ok(cmd)
    }

    fn modify_command(&self, params: &ModuleParams, vlan_id: u32) -> Result<String> {
        let mut cmd = format!("vlan-modify id {}", vlan_id);
        for (key, flag) in [
            ("pn_vnet", "vnet"),
            ("pn_vxlan", "vxlan"),
            ("pn_public_vlan", "public-vlan"),
            ("pn_description", "description"),
        ] {
            if let Some(value) = params.get_string(key)? {
                cmd.push_str(&format!(" {} {}", flag, value));
            }
        }
        Ok(cmd)
    }
}

/// Per-id tally accumulated across the run.
struct VlanRun {
    switch: String,
    message: String,
    summary: Vec<serde_json::Value>,
    pass_count: u32,
    fail_count: u32,
    any_changed: bool,
}

impl VlanRun {
    fn new(switch: String) -> Self {
        Self {
            switch,
            message: String::new(),
            summary: Vec::new(),
            pass_count: 0,
            fail_count: 0,
            any_changed: false,
        }
    }

    fn pass(&mut self, note: String) {
        self.message.push_str(&note);
        self.message.push('\n');
        self.summary
            .push(serde_json::json!({ "switch": self.switch, "output": note }));
        self.pass_count += 1;
        self.any_changed = true;
    }

    fn fail(&mut self, note: String) {
        self.message.push_str(&note);
        self.message.push('\n');
        self.summary
            .push(serde_json::json!({ "switch": self.switch, "output": note }));
        self.fail_count += 1;
    }

    fn into_output(self) -> ModuleOutput {
        let final_stats = format!(
            "{}Failed: {}  PASS: {}",
            if self.fail_count > 0 { "Failed!   " } else { "Pass!  " },
            self.fail_count,
            self.pass_count
        );
        ModuleOutput {
            changed: self.any_changed,
            failed: self.fail_count > 0,
            msg: self.message,
            stdout: None,
            command: None,
            data: Default::default(),
        }
        .with_data("summary", serde_json::Value::Array(self.summary))
        .with_data("final_stats", serde_json::json!(final_stats))
        .with_data("task", serde_json::json!("VLAN Configuration"))
    }
}

impl Module for VlanModule {
    fn name(&self) -> &'static str {
        "pn_vlan"
    }

    fn description(&self) -> &'static str {
        "Create, delete, or modify VLANs on a Netvisor switch"
    }

    fn required_params(&self) -> &[&'static str] {
        &["pn_action", "pn_vlanid"]
    }

    fn validate_params(&self, params: &ModuleParams) -> Result<()> {
        params
            .get_choice("pn_action", &["create", "delete", "modify"])?
            .ok_or_else(|| Error::MissingParameter("pn_action".to_string()))?;
        params.get_choice("pn_scope", &["fabric", "local", "cluster"])?;
        expand_range(&params.get_string_required("pn_vlanid")?)?;
        Ok(())
    }

    fn execute(&self, params: &ModuleParams, ctx: &ModuleContext) -> Result<ModuleOutput> {
        let action = params.get_string_required("pn_action")?;
        let scope = params.get_string_or("pn_scope", "fabric")?;
        let cliswitch = params.get_string_or("pn_cliswitch", "local")?;
        let vlan_ids = expand_range(&params.get_string_required("pn_vlanid")?)?;

        let session: CliSession = ctx.session(params)?.scoped_to(&cliswitch);
        let topo = Topology::new(&session);

        // Resolve `local` to the fabric node name for reporting.
        let switch_name = if cliswitch == "local" {
            topo.fabric_node_name()?
        } else {
            cliswitch
        };

        for id in &vlan_ids {
            if !(MIN_VLAN_ID..=MAX_VLAN_ID).contains(id) {
                let note = format!(
                    "Invalid VLAN ID {}. VLAN ID must be between {} and {}",
                    id, MIN_VLAN_ID, MAX_VLAN_ID
                );
                return Ok(ModuleOutput::ok(note.clone())
                    .with_failed(true)
                    .with_data("final_stats", serde_json::json!("Failed!"))
                    .with_data("task", serde_json::json!("VLAN Configuration"))
                    .with_data(
                        "summary",
                        serde_json::json!([{ "switch": switch_name, "output": note }]),
                    ));
            }
        }

        let mut existing: Vec<String> = session
            .show("vlan-show format id no-show-headers")?
            .into_values();
        let mut run = VlanRun::new(switch_name.clone());

        for id in vlan_ids {
            let id_text = id.to_string();
            let present = existing.contains(&id_text);
            match (action.as_str(), present) {
                ("create", false) => {
                    session.run(&self.create_command(params, id, &scope)?)?;
                    run.pass(format!("VLAN {} created", id));
                    existing.push(id_text);
                }
                ("create", true) => run.fail(format!("VLAN {} already exists", id)),
                ("delete", true) => {
                    session.run(&format!("vlan-delete id {}", id))?;
                    run.pass(format!("VLAN {} deleted", id));
                    existing.retain(|v| v != &id_text);
                }
                ("modify", true) => {
                    session.run(&self.modify_command(params, id)?)?;
                    run.pass(format!("VLAN {} modified", id));
                }
                (_, false) => run.fail(format!("VLAN {} does not exist", id)),
                _ => unreachable!("action validated against choices"),
            }
        }

        Ok(run.into_output())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn expands_lists_and_ranges() {
        assert_eq!(expand_range("200,210-213").unwrap(), [200, 210, 211, 212, 213]);
        assert_eq!(expand_range("5").unwrap(), [5]);
    }

    #[test]
    fn expansion_deduplicates_in_first_seen_order() {
        assert_eq!(expand_range("210,208-211").unwrap(), [210, 208, 209, 211]);
    }

    #[test]
    fn rejects_garbage_and_inverted_ranges() {
        assert!(expand_range("ten").is_err());
        assert!(expand_range("300-200").is_err());
    }

    #[test]
    fn create_command_carries_optional_flags() {
        let mut params = ModuleParams::new();
        params.insert("pn_description".to_string(), serde_json::json!("storage"));
        params.insert("pn_stats".to_string(), serde_json::json!(true));
        params.insert("pn_ports".to_string(), serde_json::json!("10,11"));

        let cmd = VlanModule.create_command(&params, 200, "fabric").unwrap();
        assert_eq!(
            cmd,
            "vlan-create id 200 scope fabric description storage stats ports 10,11"
        );
    }

    #[test]
    fn stats_false_becomes_no_stats() {
        let mut params = ModuleParams::new();
        params.insert("pn_stats".to_string(), serde_json::json!(false));
        let cmd = VlanModule.create_command(&params, 200, "local").unwrap();
        assert_eq!(cmd, "vlan-create id 200 scope local no-stats");
    }

    #[test]
    fn action_choice_is_validated() {
        let mut params = ModuleParams::new();
        params.insert("pn_action".to_string(), serde_json::json!("purge"));
        params.insert("pn_vlanid".to_string(), serde_json::json!("200"));
        assert!(VlanModule.validate_params(&params).is_err());
    }
}
