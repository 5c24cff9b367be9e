//! netvisor-ztp: Zero Touch Provisioning modules for Pluribus Netvisor
//! fabrics.
//!
//! Three Ansible-style modules drive the switch's `cli` binary to bring up a
//! spine/leaf fabric:
//!
//! - `pn_ebgp_ospf`: eBGP or OSPF underlay, covering leaf-cluster
//!   auto-discovery, AS-number and address derivation, neighbor and
//!   redistribution setup
//! - `pn_vlag`: create/delete virtual link aggregation groups
//! - `pn_vlan`: create/delete/modify VLANs from an id range
//!
//! Everything is synchronous and sequential: commands are assembled as
//! strings, tokenized, run as a child process, and the plain-text tabular
//! output is decoded to decide follow-up actions. The first command the
//! switch rejects aborts the run with its stderr surfaced verbatim.

pub mod config;
pub mod error;
pub mod fabric;
pub mod modules;
pub mod netvisor;
pub mod output;

pub use config::Settings;
pub use error::{Error, Result};
pub use modules::{Module, ModuleContext, ModuleOutput, ModuleParams, ModuleRegistry};
pub use output::ExitPayload;
