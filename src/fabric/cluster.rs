//! Leaf-cluster auto-discovery and creation.
//!
//! Leaves not yet in any cluster are paired greedily in encounter order:
//! take the first unclustered leaf, walk its LLDP neighbors, and cluster it
//! with the first neighbor that is itself an unclustered leaf. Spine
//! neighbors and already-clustered leaves are skipped.

use crate::error::Result;
use crate::fabric::{ChangeLog, FabricConfig};
use crate::netvisor::{CliSession, Topology};
use tracing::debug;

/// Leaves that are not a member of any existing cluster.
pub fn unclustered_leaves(topo: &Topology, leaves: &[String]) -> Result<Vec<String>> {
    let members = topo.clustered_switches()?;
    Ok(leaves
        .iter()
        .filter(|leaf| !members.contains(leaf))
        .cloned()
        .collect())
}

/// Pair up unclustered leaves over their physical links.
pub fn form_leaf_clusters(
    session: &CliSession,
    cfg: &FabricConfig,
    log: &mut ChangeLog,
) -> Result<()> {
    let topo = Topology::new(session);
    let mut pool = unclustered_leaves(&topo, &cfg.leaves)?;

    while !pool.is_empty() {
        let node1 = pool.remove(0);
        let neighbors = topo.lldp_sys_names(&node1)?;

        for neighbor in neighbors {
            if cfg.spines.contains(&neighbor) {
                debug!(switch = %neighbor, "lldp neighbor is a spine, skipping");
                continue;
            }
            if let Some(pos) = pool.iter().position(|leaf| leaf == &neighbor) {
                let name = format!("{}-to-{}-cluster", node1, neighbor);
                create_cluster(session, &topo, &neighbor, &name, &node1, &neighbor, log)?;
                pool.remove(pos);
                break;
            }
            debug!(switch = %neighbor, "lldp neighbor is not an unclustered leaf");
        }
    }

    Ok(())
}

/// Create one cluster unless a cluster of that name already exists on the
/// first node.
pub fn create_cluster(
    session: &CliSession,
    topo: &Topology,
    switch: &str,
    name: &str,
    node1: &str,
    node2: &str,
    log: &mut ChangeLog,
) -> Result<()> {
    let existing = topo.cluster_names_on(node1)?;
    if existing.iter().any(|c| c == name) {
        log.unchanged(format!("{} already exists!", name));
        return Ok(());
    }

    let reply = session.run(&format!(
        "switch {} cluster-create name {} cluster-node-1 {} cluster-node-2 {}",
        switch, name, node1, node2
    ))?;
    if reply.is_ack() {
        log.changed(format!("{} created successfully!", name));
    }
    Ok(())
}
