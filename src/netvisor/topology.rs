//! Walking fabric state through show commands.
//!
//! Each accessor wraps exactly one `*-show` invocation and decodes the
//! answer. Nothing is cached; the switches are the only source of truth and
//! every question is asked again when a step needs it.

use crate::error::{Error, Result};
use crate::netvisor::session::CliSession;

/// Read-only view of the fabric reached through one cli session.
pub struct Topology<'a> {
    session: &'a CliSession,
}

impl<'a> Topology<'a> {
    pub fn new(session: &'a CliSession) -> Self {
        Self { session }
    }

    fn first_of(&self, tail: &str) -> Result<String> {
        self.session
            .show(tail)?
            .first()
            .map(str::to_string)
            .ok_or_else(|| Error::MalformedOutput {
                command: tail.to_string(),
                reason: "expected at least one value".to_string(),
            })
    }

    /// Names of every vrouter on the fabric.
    pub fn vrouter_names(&self) -> Result<Vec<String>> {
        Ok(self
            .session
            .show("vrouter-show format name no-show-headers")?
            .into_values())
    }

    /// The switch hosting a vrouter.
    pub fn vrouter_location(&self, vrouter: &str) -> Result<String> {
        self.first_of(&format!(
            "vrouter-show name {} format location no-show-headers",
            vrouter
        ))
    }

    /// The vrouter hosted on a switch.
    pub fn vrouter_at(&self, switch: &str) -> Result<String> {
        self.first_of(&format!(
            "vrouter-show location {} format name no-show-headers",
            switch
        ))
    }

    /// The BGP AS configured on a vrouter.
    pub fn vrouter_bgp_as(&self, vrouter: &str) -> Result<String> {
        self.first_of(&format!(
            "vrouter-show name {} format bgp-as no-show-headers",
            vrouter
        ))
    }

    /// The BGP AS of the vrouter hosted on a switch.
    pub fn bgp_as_at(&self, switch: &str) -> Result<String> {
        self.first_of(&format!(
            "vrouter-show location {} format bgp-as no-show-headers",
            switch
        ))
    }

    /// Names of every cluster on the fabric.
    pub fn cluster_names(&self) -> Result<Vec<String>> {
        Ok(self
            .session
            .show("cluster-show format name no-show-headers")?
            .into_values())
    }

    /// Cluster names as seen from a particular switch.
    pub fn cluster_names_on(&self, switch: &str) -> Result<Vec<String>> {
        Ok(self
            .session
            .show(&format!(
                "switch {} cluster-show format name no-show-headers",
                switch
            ))?
            .into_values())
    }

    /// Both member nodes of a named cluster.
    pub fn cluster_nodes(&self, cluster: &str) -> Result<(String, String)> {
        let node1 = self.first_of(&format!(
            "cluster-show name {} format cluster-node-1 no-show-headers",
            cluster
        ))?;
        let node2 = self.first_of(&format!(
            "cluster-show name {} format cluster-node-2 no-show-headers",
            cluster
        ))?;
        Ok((node1, node2))
    }

    /// Every switch that is a member of some cluster, either side.
    pub fn clustered_switches(&self) -> Result<Vec<String>> {
        let mut members = self
            .session
            .show("cluster-show format cluster-node-1 no-show-headers")?
            .into_values();
        members.extend(
            self.session
                .show("cluster-show format cluster-node-2 no-show-headers")?
                .into_values(),
        );
        Ok(members)
    }

    /// LLDP-reported system names adjacent to a switch, deduplicated.
    pub fn lldp_sys_names(&self, switch: &str) -> Result<Vec<String>> {
        Ok(self
            .session
            .show(&format!(
                "switch {} lldp-show format sys-name no-show-headers",
                switch
            ))?
            .unique()
            .into_values())
    }

    /// Distinct L3 ports carrying interfaces of a vrouter.
    pub fn l3_ports(&self, vrouter: &str) -> Result<Vec<String>> {
        Ok(self
            .session
            .show(&format!(
                "vrouter-interface-show vrouter-name {} format l3-port no-show-headers",
                vrouter
            ))?
            .unique()
            .without(vrouter)
            .into_values())
    }

    /// Hostname of the far end of a port.
    pub fn port_hostname(&self, switch: &str, port: &str) -> Result<String> {
        self.first_of(&format!(
            "switch {} port-show port {} format hostname no-show-headers",
            switch, port
        ))
    }

    /// Remote port number of the far end of a port.
    pub fn port_rport(&self, switch: &str, port: &str) -> Result<String> {
        self.first_of(&format!(
            "switch {} port-show port {} format rport no-show-headers",
            switch, port
        ))
    }

    /// Interface IP (with netmask) of a vrouter on an L3 port.
    pub fn interface_ip(&self, vrouter: &str, l3_port: &str) -> Result<String> {
        let tail = format!(
            "vrouter-interface-show vrouter-name {} l3-port {} format ip no-show-headers",
            vrouter, l3_port
        );
        self.session
            .show(&tail)?
            .unique()
            .without(vrouter)
            .first()
            .map(str::to_string)
            .ok_or_else(|| Error::MalformedOutput {
                command: tail,
                reason: "no interface ip for l3 port".to_string(),
            })
    }

    /// The nic carrying a vrouter interface with the given IP.
    pub fn interface_nic(&self, vrouter: &str, ip: &str) -> Result<String> {
        let tail = format!(
            "vrouter-interface-show vrouter-name {} ip {} format nic no-show-headers",
            vrouter, ip
        );
        self.session
            .show(&tail)?
            .unique()
            .without(vrouter)
            .first()
            .map(str::to_string)
            .ok_or_else(|| Error::MalformedOutput {
                command: tail,
                reason: "no nic for interface ip".to_string(),
            })
    }

    /// Vrouters that already carry an interface with this IP and VLAN.
    pub fn interface_owners(&self, ip: &str, vlan: &str) -> Result<Vec<String>> {
        Ok(self
            .session
            .show(&format!(
                "vrouter-interface-show ip {} vlan {} format switch no-show-headers",
                ip, vlan
            ))?
            .into_values())
    }

    /// Loopback IP of a vrouter.
    pub fn loopback_ip(&self, vrouter: &str) -> Result<String> {
        let tail = format!(
            "vrouter-loopback-interface-show vrouter-name {} format ip no-show-headers",
            vrouter
        );
        self.session
            .show(&tail)?
            .without(vrouter)
            .first()
            .map(str::to_string)
            .ok_or_else(|| Error::MalformedOutput {
                command: tail,
                reason: "no loopback interface".to_string(),
            })
    }

    /// Vrouters that already have a BGP neighbor with this remote AS and IP.
    pub fn bgp_neighbor_owners(&self, remote_as: &str, neighbor_ip: &str) -> Result<Vec<String>> {
        Ok(self
            .session
            .show(&format!(
                "vrouter-bgp-show remote-as {} neighbor {} format switch no-show-headers",
                remote_as, neighbor_ip
            ))?
            .into_values())
    }

    /// Vrouters that already announce this OSPF network.
    pub fn ospf_network_owners(&self, network: &str) -> Result<Vec<String>> {
        Ok(self
            .session
            .show(&format!(
                "vrouter-ospf-show network {} format switch no-show-headers",
                network
            ))?
            .into_values())
    }

    /// VLAN ids already configured on a switch.
    pub fn vlan_ids_on(&self, switch: &str) -> Result<Vec<String>> {
        Ok(self
            .session
            .show(&format!(
                "switch {} vlan-show format id no-show-headers",
                switch
            ))?
            .into_values())
    }

    /// The fabric node name of the local switch.
    pub fn fabric_node_name(&self) -> Result<String> {
        let tail = "switch-setup-show format switch-name";
        let out = self.session.show(tail)?;
        // Row reads `switch-name: <name>`; the name is the second token.
        out.values()
            .get(1)
            .map(String::clone)
            .ok_or_else(|| Error::MalformedOutput {
                command: tail.to_string(),
                reason: "expected 'switch-name: <name>' row".to_string(),
            })
    }
}
