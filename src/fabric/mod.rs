//! Fabric provisioning sequences.
//!
//! The eBGP and OSPF sequences from the `pn_ebgp_ospf` module live here,
//! split into per-concern step files. Every step threads a [`ChangeLog`]
//! through: an explicit record of what was changed and what was already in
//! place, from which the module derives its aggregate `changed` flag and
//! output text.

pub mod addressing;
pub mod bgp;
pub mod cluster;
pub mod ospf;

use crate::error::Result;
use crate::netvisor::CliSession;

/// User-facing knobs for the eBGP/OSPF run.
#[derive(Debug, Clone)]
pub struct FabricConfig {
    /// Spine switch hostnames, in inventory order.
    pub spines: Vec<String>,
    /// Leaf switch hostnames, in inventory order.
    pub leaves: Vec<String>,
    /// Base AS: spines get it, leaf clusters count up from it.
    pub bgp_as_base: u32,
    /// Route types redistributed into BGP.
    pub bgp_redistribute: String,
    /// BGP maximum-paths value.
    pub bgp_maxpath: u32,
    /// Whether to request BFD on eBGP/OSPF neighbors.
    pub bfd: bool,
    /// Base range for iBGP interface addressing, e.g. `75.75.75.0/30`.
    pub ibgp_ip_range: String,
    /// VLAN carrying the iBGP interfaces.
    pub ibgp_vlan: String,
    /// OSPF area for derived networks.
    pub ospf_area_id: String,
}

/// One recorded provisioning step.
#[derive(Debug, Clone)]
pub struct Step {
    pub changed: bool,
    pub note: String,
}

/// Ordered record of step outcomes across a run.
///
/// Replaces the original modules' global mutable changed flag: each step
/// appends its outcome and the module reads the aggregate at the end.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    steps: Vec<Step>,
}

impl ChangeLog {
    pub fn changed(&mut self, note: impl Into<String>) {
        self.steps.push(Step {
            changed: true,
            note: note.into(),
        });
    }

    pub fn unchanged(&mut self, note: impl Into<String>) {
        self.steps.push(Step {
            changed: false,
            note: note.into(),
        });
    }

    /// True iff any step changed the fabric.
    pub fn any_changed(&self) -> bool {
        self.steps.iter().any(|s| s.changed)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Concatenated step notes, one per line.
    pub fn render(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.note.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The full eBGP sequence: leaf clusters, AS numbers, redistribution,
/// maxpath, eBGP neighbors, router ids, then iBGP over the cluster links.
pub fn run_ebgp(session: &CliSession, cfg: &FabricConfig) -> Result<ChangeLog> {
    let mut log = ChangeLog::default();
    cluster::form_leaf_clusters(session, cfg, &mut log)?;
    bgp::assign_bgp_as(session, cfg, &mut log)?;
    bgp::set_redistribute(session, cfg, &mut log)?;
    bgp::set_maxpath(session, cfg, &mut log)?;
    bgp::add_ebgp_neighbors(session, cfg, &mut log)?;
    bgp::assign_router_ids(session, &mut log)?;
    bgp::add_ibgp_interfaces(session, cfg, &mut log)?;
    Ok(log)
}

/// The OSPF sequence: neighbors derived from spine L3 ports, then
/// redistribution.
pub fn run_ospf(session: &CliSession, cfg: &FabricConfig) -> Result<ChangeLog> {
    let mut log = ChangeLog::default();
    ospf::add_ospf_neighbors(session, cfg, &mut log)?;
    ospf::set_redistribute(session, &mut log)?;
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_log_aggregates_any_changed() {
        let mut log = ChangeLog::default();
        assert!(!log.any_changed());
        log.unchanged("vlan 4040 already present for switch leaf01!");
        assert!(!log.any_changed());
        log.changed("Added BGP_AS to leaf01-vrouter!");
        assert!(log.any_changed());
        assert_eq!(log.steps().len(), 2);
    }

    #[test]
    fn change_log_renders_notes_in_order() {
        let mut log = ChangeLog::default();
        log.changed("first");
        log.unchanged("second");
        assert_eq!(log.render(), "first\nsecond");
    }
}
