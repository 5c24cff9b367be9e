//! OSPF provisioning steps.
//!
//! Networks are derived, never user-supplied: each spine L3 port's
//! interface address yields the link network (last octet rounded down to a
//! multiple of four) and both endpoint IPs, and the same network is
//! announced from the spine and the leaf vrouter.

use crate::error::Result;
use crate::fabric::addressing::ospf_link;
use crate::fabric::{ChangeLog, FabricConfig};
use crate::netvisor::{CliSession, Topology};

/// Add OSPF neighbors for every spine-to-leaf link.
pub fn add_ospf_neighbors(
    session: &CliSession,
    cfg: &FabricConfig,
    log: &mut ChangeLog,
) -> Result<()> {
    let topo = Topology::new(session);
    if cfg.spines.is_empty() {
        log.unchanged("No spines present!");
        return Ok(());
    }

    for spine in &cfg.spines {
        let spine_vrouter = topo.vrouter_at(spine)?;

        for port in topo.l3_ports(&spine_vrouter)? {
            let far_host = topo.port_hostname(spine, &port)?;
            let far_vrouter = topo.vrouter_at(&far_host)?;
            let link = ospf_link(&topo.interface_ip(&spine_vrouter, &port)?)?;

            let owners = topo.ospf_network_owners(&link.network)?;

            if owners.iter().any(|v| v == &spine_vrouter) {
                log.unchanged(format!(
                    "OSPF Neighbour already added for {}!",
                    spine_vrouter
                ));
            } else {
                if cfg.bfd {
                    enable_ospf_bfd(session, &topo, &spine_vrouter, &link.spine_ip, log)?;
                }
                announce(session, &spine_vrouter, &link.network, cfg, log)?;
            }

            if owners.iter().any(|v| v == &far_vrouter) {
                log.unchanged(format!("OSPF Neighbour already added for {}!", far_vrouter));
            } else {
                if cfg.bfd {
                    enable_ospf_bfd(session, &topo, &far_vrouter, &link.leaf_ip, log)?;
                }
                announce(session, &far_vrouter, &link.network, cfg, log)?;
            }
        }
    }
    Ok(())
}

fn announce(
    session: &CliSession,
    vrouter: &str,
    network: &str,
    cfg: &FabricConfig,
    log: &mut ChangeLog,
) -> Result<()> {
    let reply = session.run(&format!(
        "vrouter-ospf-add vrouter-name {} network {} ospf-area {}",
        vrouter, network, cfg.ospf_area_id
    ))?;
    if reply.is_ack() {
        log.changed(format!("Added ospf for {}", vrouter));
    }
    Ok(())
}

/// Enable OSPF BFD on the nic carrying the interface with the given IP.
fn enable_ospf_bfd(
    session: &CliSession,
    topo: &Topology,
    vrouter: &str,
    ip: &str,
    log: &mut ChangeLog,
) -> Result<()> {
    let nic = topo.interface_nic(vrouter, ip)?;
    let reply = session.run(&format!(
        "vrouter-interface-config-modify vrouter-name {} nic {} ospf-bfd enable",
        vrouter, nic
    ))?;
    if reply.is_ack() {
        log.changed(format!("Added ospf bfd for {}!", vrouter));
    }
    Ok(())
}

/// Redistribute static and connected routes into OSPF on every vrouter.
pub fn set_redistribute(session: &CliSession, log: &mut ChangeLog) -> Result<()> {
    let topo = Topology::new(session);
    for vrouter in topo.vrouter_names()? {
        let reply = session.run(&format!(
            "vrouter-modify name {} ospf-redistribute static,connected",
            vrouter
        ))?;
        if reply.is_ack() {
            log.changed(format!("Added OSPF_REDISTRIBUTE to {}!", vrouter));
        }
    }
    Ok(())
}
