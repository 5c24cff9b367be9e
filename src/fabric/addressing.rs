//! Address and AS-number derivation.
//!
//! All of the arithmetic behind fabric provisioning lives here, free of any
//! cli access: BGP AS planning for spines and leaf clusters, iBGP /30 block
//! allocation, and OSPF network derivation from an interface address.

use crate::error::{Error, Result};

/// A vrouter paired with the switch hosting it.
#[derive(Debug, Clone)]
pub struct VrouterInfo {
    pub name: String,
    pub location: String,
}

/// Two physically linked switches forming a cluster.
#[derive(Debug, Clone)]
pub struct ClusterPair {
    pub node1: String,
    pub node2: String,
}

impl ClusterPair {
    /// The other member, if `switch` is one of the pair.
    pub fn peer_of(&self, switch: &str) -> Option<&str> {
        if self.node1 == switch {
            Some(&self.node2)
        } else if self.node2 == switch {
            Some(&self.node1)
        } else {
            None
        }
    }
}

/// Plan the AS number for every vrouter.
///
/// Spine vrouters all get the base AS. Walking the vrouters in discovery
/// order, each not-yet-planned leaf gets the next AS above the base, and its
/// cluster peer (when clustered) gets the same one, so both members of a
/// cluster share an AS and each subsequent cluster (or lone leaf) increments.
pub fn plan_bgp_as(
    base: u32,
    vrouters: &[VrouterInfo],
    clusters: &[ClusterPair],
    spines: &[String],
    leaves: &[String],
) -> Vec<(String, u32)> {
    let mut plan: Vec<(String, u32)> = Vec::new();
    let mut next_leaf_as = base + 1;

    let planned = |plan: &[(String, u32)], name: &str| plan.iter().any(|(n, _)| n == name);

    for vrouter in vrouters {
        if spines.contains(&vrouter.location) {
            plan.push((vrouter.name.clone(), base));
            continue;
        }
        if !leaves.contains(&vrouter.location) || planned(&plan, &vrouter.name) {
            continue;
        }
        plan.push((vrouter.name.clone(), next_leaf_as));
        for cluster in clusters {
            if let Some(peer) = cluster.peer_of(&vrouter.location) {
                let peer_vrouter = vrouters
                    .iter()
                    .find(|v| v.location == peer)
                    .map(|v| v.name.clone())
                    .unwrap_or_else(|| format!("{}-vrouter", peer));
                if !planned(&plan, &peer_vrouter) {
                    plan.push((peer_vrouter, next_leaf_as));
                }
            }
        }
        next_leaf_as += 1;
    }

    plan
}

/// Allocator handing out iBGP interface addresses for leaf clusters.
///
/// From a base range such as `75.75.75.0/30`, cluster *n* (0-based) gets the
/// last-octet pair `4n+1` and `4n+2`, both /30, so every cluster consumes a
/// disjoint block of four addresses.
#[derive(Debug)]
pub struct IbgpSubnets {
    static_part: String,
    subnet_count: u32,
}

impl IbgpSubnets {
    pub fn new(range: &str) -> Result<Self> {
        let octets: Vec<&str> = range.split('.').collect();
        if octets.len() != 4 {
            return Err(Error::AddressParse(range.to_string()));
        }
        Ok(Self {
            static_part: format!("{}.{}.{}.", octets[0], octets[1], octets[2]),
            subnet_count: 0,
        })
    }

    /// Interface addresses for the next cluster, in (node-1, node-2) order.
    pub fn next_pair(&mut self) -> (String, String) {
        let floor = self.subnet_count * 4;
        self.subnet_count += 1;
        (
            format!("{}{}/30", self.static_part, floor + 1),
            format!("{}{}/30", self.static_part, floor + 2),
        )
    }
}

/// OSPF addressing derived from a spine-side interface address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OspfLink {
    /// Network address announced on both ends: last octet rounded down to a
    /// multiple of 4, original netmask kept.
    pub network: String,
    /// Spine-side interface IP, without netmask.
    pub spine_ip: String,
    /// Leaf-side peer IP: spine last octet minus one, without netmask.
    pub leaf_ip: String,
}

/// Derive the OSPF network and both endpoint IPs from `a.b.c.X/m`.
pub fn ospf_link(interface_ip: &str) -> Result<OspfLink> {
    let (addr, netmask) = interface_ip
        .split_once('/')
        .ok_or_else(|| Error::AddressParse(interface_ip.to_string()))?;
    let octets: Vec<&str> = addr.split('.').collect();
    if octets.len() != 4 {
        return Err(Error::AddressParse(interface_ip.to_string()));
    }
    let last: u32 = octets[3]
        .parse()
        .map_err(|_| Error::AddressParse(interface_ip.to_string()))?;
    // A last octet of 0 is the network address itself; no peer below it.
    if last == 0 {
        return Err(Error::AddressParse(interface_ip.to_string()));
    }
    let static_part = format!("{}.{}.{}.", octets[0], octets[1], octets[2]);

    Ok(OspfLink {
        network: format!("{}{}/{}", static_part, last - last % 4, netmask),
        spine_ip: format!("{}{}", static_part, last),
        leaf_ip: format!("{}{}", static_part, last - 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn vrouter(name: &str, location: &str) -> VrouterInfo {
        VrouterInfo {
            name: name.to_string(),
            location: location.to_string(),
        }
    }

    #[test]
    fn spines_share_base_as_and_clusters_increment() {
        let vrouters = vec![
            vrouter("spine01-vrouter", "spine01"),
            vrouter("spine02-vrouter", "spine02"),
            vrouter("leaf01-vrouter", "leaf01"),
            vrouter("leaf02-vrouter", "leaf02"),
            vrouter("leaf03-vrouter", "leaf03"),
            vrouter("leaf04-vrouter", "leaf04"),
        ];
        let clusters = vec![
            ClusterPair {
                node1: "leaf01".to_string(),
                node2: "leaf02".to_string(),
            },
            ClusterPair {
                node1: "leaf03".to_string(),
                node2: "leaf04".to_string(),
            },
        ];
        let plan = plan_bgp_as(
            65000,
            &vrouters,
            &clusters,
            &names(&["spine01", "spine02"]),
            &names(&["leaf01", "leaf02", "leaf03", "leaf04"]),
        );

        let lookup = |name: &str| plan.iter().find(|(n, _)| n == name).unwrap().1;
        assert_eq!(lookup("spine01-vrouter"), 65000);
        assert_eq!(lookup("spine02-vrouter"), 65000);
        // cluster members share an AS
        assert_eq!(lookup("leaf01-vrouter"), 65001);
        assert_eq!(lookup("leaf02-vrouter"), 65001);
        // next cluster gets the incremented AS
        assert_eq!(lookup("leaf03-vrouter"), 65002);
        assert_eq!(lookup("leaf04-vrouter"), 65002);
        // each vrouter planned exactly once
        assert_eq!(plan.len(), 6);
    }

    #[test]
    fn lone_leaf_consumes_its_own_as() {
        let vrouters = vec![
            vrouter("leaf01-vrouter", "leaf01"),
            vrouter("leaf02-vrouter", "leaf02"),
            vrouter("leaf03-vrouter", "leaf03"),
        ];
        let clusters = vec![ClusterPair {
            node1: "leaf01".to_string(),
            node2: "leaf02".to_string(),
        }];
        let plan = plan_bgp_as(
            65000,
            &vrouters,
            &clusters,
            &[],
            &names(&["leaf01", "leaf02", "leaf03"]),
        );
        let lookup = |name: &str| plan.iter().find(|(n, _)| n == name).unwrap().1;
        assert_eq!(lookup("leaf01-vrouter"), 65001);
        assert_eq!(lookup("leaf02-vrouter"), 65001);
        assert_eq!(lookup("leaf03-vrouter"), 65002);
    }

    #[test]
    fn ibgp_blocks_are_disjoint_and_in_order() {
        let mut subnets = IbgpSubnets::new("75.75.75.0/30").unwrap();
        assert_eq!(
            subnets.next_pair(),
            ("75.75.75.1/30".to_string(), "75.75.75.2/30".to_string())
        );
        assert_eq!(
            subnets.next_pair(),
            ("75.75.75.5/30".to_string(), "75.75.75.6/30".to_string())
        );
        assert_eq!(
            subnets.next_pair(),
            ("75.75.75.9/30".to_string(), "75.75.75.10/30".to_string())
        );
    }

    #[test]
    fn ibgp_range_must_have_four_octets() {
        assert!(IbgpSubnets::new("75.75/30").is_err());
    }

    #[test]
    fn ospf_network_rounds_last_octet_down_to_multiple_of_four() {
        let link = ospf_link("104.255.61.38/30").unwrap();
        assert_eq!(
            link,
            OspfLink {
                network: "104.255.61.36/30".to_string(),
                spine_ip: "104.255.61.38".to_string(),
                leaf_ip: "104.255.61.37".to_string(),
            }
        );
    }

    #[test]
    fn ospf_link_on_block_boundary() {
        let link = ospf_link("10.0.0.4/30").unwrap();
        assert_eq!(link.network, "10.0.0.4/30");
        assert_eq!(link.leaf_ip, "10.0.0.3");
    }

    #[test]
    fn ospf_link_rejects_bare_address() {
        assert!(ospf_link("10.0.0.4").is_err());
    }

    #[test]
    fn ospf_link_rejects_zero_last_octet() {
        assert!(matches!(
            ospf_link("10.0.0.0/30").unwrap_err(),
            Error::AddressParse(_)
        ));
    }
}
