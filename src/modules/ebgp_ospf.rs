//! `pn_ebgp_ospf`: Zero Touch Provisioning of the routing underlay.
//!
//! Dispatches on `pn_routing_protocol`: `ebgp` builds the full eBGP underlay
//! (leaf clusters, AS numbers, redistribution, maxpath, neighbors, router
//! ids, iBGP over cluster links); `ospf` derives and announces the link
//! networks from the spines' L3 ports and sets redistribution.

use super::{Module, ModuleContext, ModuleOutput, ModuleParams, ParamExt};
use crate::error::Result;
use crate::fabric::{run_ebgp, run_ospf, FabricConfig};

const BGP_REDISTRIBUTE_CHOICES: &[&str] = &["none", "static", "connected", "rip", "ospf"];

pub struct EbgpOspfModule;

impl EbgpOspfModule {
    fn fabric_config(&self, params: &ModuleParams) -> Result<FabricConfig> {
        Ok(FabricConfig {
            spines: params.get_vec_string("pn_spine_list")?,
            leaves: params.get_vec_string("pn_leaf_list")?,
            bgp_as_base: params.get_u32_or("pn_bgp_as_range", 65000)?,
            bgp_redistribute: params
                .get_choice("pn_bgp_redistribute", BGP_REDISTRIBUTE_CHOICES)?
                .unwrap_or_else(|| "connected".to_string()),
            bgp_maxpath: params.get_u32_or("pn_bgp_maxpath", 16)?,
            bfd: params.get_bool_or("pn_bfd", false),
            ibgp_ip_range: params.get_string_or("pn_ibgp_ip_range", "75.75.75.0/30")?,
            ibgp_vlan: params.get_string_or("pn_ibgp_vlan", "4040")?,
            ospf_area_id: params.get_string_or("pn_ospf_area_id", "0")?,
        })
    }
}

impl Module for EbgpOspfModule {
    fn name(&self) -> &'static str {
        "pn_ebgp_ospf"
    }

    fn description(&self) -> &'static str {
        "Zero Touch Provisioning of an eBGP or OSPF underlay on a spine/leaf fabric"
    }

    fn required_params(&self) -> &[&'static str] {
        &["pn_routing_protocol"]
    }

    fn validate_params(&self, params: &ModuleParams) -> Result<()> {
        params.get_choice("pn_routing_protocol", &["ebgp", "ospf"])?;
        params.get_choice("pn_bgp_redistribute", BGP_REDISTRIBUTE_CHOICES)?;
        self.fabric_config(params)?;
        Ok(())
    }

    fn execute(&self, params: &ModuleParams, ctx: &ModuleContext) -> Result<ModuleOutput> {
        let protocol = params.get_string_required("pn_routing_protocol")?;
        let cfg = self.fabric_config(params)?;
        let session = ctx.session(params)?;

        let log = match protocol.as_str() {
            "ebgp" => run_ebgp(&session, &cfg)?,
            _ => run_ospf(&session, &cfg)?,
        };

        let msg = match protocol.as_str() {
            "ebgp" => "eBGP setup completed successfully.",
            _ => "OSPF setup completed successfully.",
        };

        Ok(ModuleOutput {
            changed: log.any_changed(),
            failed: false,
            msg: msg.to_string(),
            stdout: Some(log.render()),
            command: None,
            data: Default::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::Error;

    #[test]
    fn routing_protocol_is_validated() {
        let module = EbgpOspfModule;
        let mut params = ModuleParams::new();
        params.insert("pn_routing_protocol".to_string(), serde_json::json!("rip"));
        let err = module.validate_params(&params).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn defaults_mirror_the_documented_ones() {
        let module = EbgpOspfModule;
        let mut params = ModuleParams::new();
        params.insert("pn_routing_protocol".to_string(), serde_json::json!("ebgp"));
        let cfg = module.fabric_config(&params).unwrap();
        assert_eq!(cfg.bgp_as_base, 65000);
        assert_eq!(cfg.bgp_redistribute, "connected");
        assert_eq!(cfg.bgp_maxpath, 16);
        assert_eq!(cfg.ibgp_ip_range, "75.75.75.0/30");
        assert_eq!(cfg.ibgp_vlan, "4040");
        assert_eq!(cfg.ospf_area_id, "0");
        assert!(!cfg.bfd);
    }

    #[test]
    fn registry_rejects_missing_protocol() {
        let registry = super::super::ModuleRegistry::with_builtins();
        let ctx = ModuleContext::new(Settings::default());
        let err = registry
            .execute("pn_ebgp_ospf", &ModuleParams::new(), &ctx)
            .unwrap_err();
        assert!(matches!(err, Error::MissingParameter(_)));
    }
}
