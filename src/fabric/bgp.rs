//! eBGP/iBGP provisioning steps.

use crate::error::Result;
use crate::fabric::addressing::{plan_bgp_as, ClusterPair, IbgpSubnets, VrouterInfo};
use crate::fabric::{ChangeLog, FabricConfig};
use crate::netvisor::{CliSession, Topology};

fn fetch_vrouters(topo: &Topology) -> Result<Vec<VrouterInfo>> {
    let mut vrouters = Vec::new();
    for name in topo.vrouter_names()? {
        let location = topo.vrouter_location(&name)?;
        vrouters.push(VrouterInfo { name, location });
    }
    Ok(vrouters)
}

fn fetch_clusters(topo: &Topology) -> Result<Vec<ClusterPair>> {
    let mut clusters = Vec::new();
    for name in topo.cluster_names()? {
        let (node1, node2) = topo.cluster_nodes(&name)?;
        clusters.push(ClusterPair { node1, node2 });
    }
    Ok(clusters)
}

/// Assign AS numbers: base to spines, incrementing per leaf cluster, both
/// cluster members sharing.
pub fn assign_bgp_as(session: &CliSession, cfg: &FabricConfig, log: &mut ChangeLog) -> Result<()> {
    let topo = Topology::new(session);
    let vrouters = fetch_vrouters(&topo)?;
    if vrouters.is_empty() {
        log.unchanged("No vrouters present/created");
        return Ok(());
    }
    let clusters = fetch_clusters(&topo)?;

    let plan = plan_bgp_as(
        cfg.bgp_as_base,
        &vrouters,
        &clusters,
        &cfg.spines,
        &cfg.leaves,
    );
    for (vrouter, asn) in plan {
        let reply = session.run(&format!("vrouter-modify name {} bgp-as {}", vrouter, asn))?;
        if reply.is_ack() {
            log.changed(format!("Added BGP_AS to {}!", vrouter));
        }
    }
    Ok(())
}

/// Set bgp-redistribute on every vrouter.
pub fn set_redistribute(
    session: &CliSession,
    cfg: &FabricConfig,
    log: &mut ChangeLog,
) -> Result<()> {
    let topo = Topology::new(session);
    for vrouter in topo.vrouter_names()? {
        let reply = session.run(&format!(
            "vrouter-modify name {} bgp-redistribute {}",
            vrouter, cfg.bgp_redistribute
        ))?;
        if reply.is_ack() {
            log.changed(format!("Added BGP_REDISTRIBUTE to {}!", vrouter));
        }
    }
    Ok(())
}

/// Set bgp-max-paths on every vrouter.
pub fn set_maxpath(session: &CliSession, cfg: &FabricConfig, log: &mut ChangeLog) -> Result<()> {
    let topo = Topology::new(session);
    for vrouter in topo.vrouter_names()? {
        let reply = session.run(&format!(
            "vrouter-modify name {} bgp-max-paths {}",
            vrouter, cfg.bgp_maxpath
        ))?;
        if reply.is_ack() {
            log.changed(format!("Added BGP_MAXPATH to {}!", vrouter));
        }
    }
    Ok(())
}

/// True when the switch is a member of some cluster, judged by name
/// membership the way the cluster names embed their node names.
fn in_cluster(topo: &Topology, switch: &str) -> Result<bool> {
    Ok(topo
        .cluster_names()?
        .iter()
        .any(|cluster| cluster.contains(switch)))
}

/// Add eBGP neighbors by walking every vrouter's L3 ports and resolving the
/// far end of each link.
pub fn add_ebgp_neighbors(
    session: &CliSession,
    cfg: &FabricConfig,
    log: &mut ChangeLog,
) -> Result<()> {
    let topo = Topology::new(session);
    let vrouters = topo.vrouter_names()?;
    if vrouters.is_empty() {
        log.unchanged("No vrouters present/created!");
        return Ok(());
    }

    for vrouter in vrouters {
        let switch = topo.vrouter_location(&vrouter)?;

        for port in topo.l3_ports(&vrouter)? {
            let far_host = topo.port_hostname(&switch, &port)?;
            let far_as = topo.bgp_as_at(&far_host)?;
            let far_port = topo.port_rport(&switch, &port)?;
            let far_vrouter = topo.vrouter_at(&far_host)?;
            let far_ip = topo.interface_ip(&far_vrouter, &far_port)?;
            let neighbor_ip = far_ip.split('/').next().unwrap_or(&far_ip).to_string();

            let already = topo.bgp_neighbor_owners(&far_as, &neighbor_ip)?;
            if already.iter().any(|v| v == &vrouter) {
                log.unchanged(format!("BGP Neighbour already added for {}!", vrouter));
                continue;
            }

            let mut cmd = format!(
                "vrouter-bgp-add vrouter-name {} neighbor {} remote-as {}",
                vrouter, neighbor_ip, far_as
            );
            if cfg.bfd {
                cmd.push_str(" bfd");
            }
            // Clustered leaves carry their iBGP peer's routes; weight them
            // down and accept the shared AS in the path.
            if cfg.leaves.contains(&switch) && in_cluster(&topo, &switch)? {
                cmd.push_str(" weight 100 allowas-in");
            }

            if session.run(&cmd)?.is_ack() {
                log.changed(format!("Added BGP Neighbour for {}", vrouter));
            }
        }
    }
    Ok(())
}

/// Set each vrouter's router-id to its loopback IP.
pub fn assign_router_ids(session: &CliSession, log: &mut ChangeLog) -> Result<()> {
    let topo = Topology::new(session);
    let vrouters = topo.vrouter_names()?;
    if vrouters.is_empty() {
        log.unchanged("No vrouters present/created!");
        return Ok(());
    }

    for vrouter in vrouters {
        let loopback = topo.loopback_ip(&vrouter)?;
        let reply = session.run(&format!(
            "vrouter-modify name {} router-id {}",
            vrouter, loopback
        ))?;
        if reply.is_ack() {
            log.changed(format!("Added router id {} to {}!", loopback, vrouter));
        }
    }
    Ok(())
}

/// Create iBGP interfaces and neighbors across every leaf-cluster link,
/// consuming one /30 block per cluster in discovery order.
pub fn add_ibgp_interfaces(
    session: &CliSession,
    cfg: &FabricConfig,
    log: &mut ChangeLog,
) -> Result<()> {
    let topo = Topology::new(session);
    let clusters = topo.cluster_names()?;
    if clusters.is_empty() {
        log.unchanged("No leaf cluster to add ibgp!");
        return Ok(());
    }

    let mut subnets = IbgpSubnets::new(&cfg.ibgp_ip_range)?;
    for cluster in clusters {
        let (node1, node2) = topo.cluster_nodes(&cluster)?;
        if cfg.spines.contains(&node1) || !cfg.leaves.contains(&node1) {
            continue;
        }
        let (ip1, ip2) = subnets.next_pair();
        ibgp_interface_add(session, cfg, &node1, &ip1, &ip2, log)?;
        ibgp_interface_add(session, cfg, &node2, &ip2, &ip1, log)?;
    }
    Ok(())
}

/// One side of an iBGP link: ensure the VLAN, the vrouter interface, and the
/// iBGP neighbor, each idempotently.
fn ibgp_interface_add(
    session: &CliSession,
    cfg: &FabricConfig,
    switch: &str,
    interface_ip: &str,
    neighbor_ip: &str,
    log: &mut ChangeLog,
) -> Result<()> {
    let topo = Topology::new(session);
    let vlan = &cfg.ibgp_vlan;

    if topo.vlan_ids_on(switch)?.iter().any(|id| id == vlan) {
        log.unchanged(format!(
            "vlan {} already present for switch {}!",
            vlan, switch
        ));
    } else {
        session.run(&format!(
            "switch {} vlan-create id {} scope local",
            switch, vlan
        ))?;
        log.changed(format!("Created vlan {} for switch {}!", vlan, switch));
    }

    let vrouter = topo.vrouter_at(switch)?;
    let remote_as = topo.vrouter_bgp_as(&vrouter)?;

    if topo
        .interface_owners(interface_ip, vlan)?
        .iter()
        .any(|v| v == &vrouter)
    {
        log.unchanged(format!(
            "vrouter interface already present for vrouter {}!",
            vrouter
        ));
    } else {
        session.run(&format!(
            "vrouter-interface-add vrouter-name {} ip {} vlan {}",
            vrouter, interface_ip, vlan
        ))?;
        log.changed(format!(
            "Added vrouter interface {} to {}!",
            interface_ip, vrouter
        ));
    }

    let neighbor = neighbor_ip.split('/').next().unwrap_or(neighbor_ip);
    if topo
        .bgp_neighbor_owners(&remote_as, neighbor)?
        .iter()
        .any(|v| v == &vrouter)
    {
        log.unchanged(format!(
            "vrouter ibgp neighbour already present for vrouter {}!",
            vrouter
        ));
    } else {
        session.run(&format!(
            "vrouter-bgp-add vrouter-name {} neighbor {} remote-as {} next-hop-self",
            vrouter, neighbor, remote_as
        ))?;
        log.changed(format!("Added ibgp neighbour {} for {}!", neighbor, vrouter));
    }

    Ok(())
}
