//! Typed decoding of `*-show` output.
//!
//! Show commands are always issued with `no-show-headers` and a `format`
//! column list, so the interesting output is whitespace-delimited values,
//! one row per line. Netvisor repeats the vrouter name as a leading column
//! on some tables (`vrouter-interface-show`, `vrouter-loopback-interface-
//! show`); callers strip it with [`ShowOutput::without`].

use crate::netvisor::session::ACK;

/// Decoded tabular output from one show command.
#[derive(Debug, Clone, Default)]
pub struct ShowOutput {
    values: Vec<String>,
}

impl ShowOutput {
    /// Split raw reply text into whitespace-delimited values.
    ///
    /// A bare `Success` acknowledgement decodes as an empty table: a show
    /// command with no matching rows prints nothing.
    pub fn decode(text: &str) -> Self {
        let values: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        if values.len() == 1 && values[0] == ACK {
            return Self { values: Vec::new() };
        }
        Self { values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// First value, or `None` for an empty table.
    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Drop every occurrence of `token`; used for the repeated vrouter-name
    /// column.
    pub fn without(mut self, token: &str) -> Self {
        self.values.retain(|v| v != token);
        self
    }

    /// De-duplicate, keeping first-seen order.
    pub fn unique(mut self) -> Self {
        let mut seen = Vec::new();
        self.values.retain(|v| {
            if seen.contains(v) {
                false
            } else {
                seen.push(v.clone());
                true
            }
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_whitespace_delimited_values() {
        let out = ShowOutput::decode("spine01-vrouter\nspine02-vrouter\nleaf01-vrouter\n");
        assert_eq!(
            out.values(),
            ["spine01-vrouter", "spine02-vrouter", "leaf01-vrouter"]
        );
    }

    #[test]
    fn ack_decodes_as_empty_table() {
        let out = ShowOutput::decode("Success\n");
        assert!(out.is_empty());
        assert_eq!(out.first(), None);
    }

    #[test]
    fn without_strips_repeated_name_column() {
        let out = ShowOutput::decode("leaf01-vrouter 104.255.61.1/24\nleaf01-vrouter 75.75.75.1/30\n")
            .without("leaf01-vrouter");
        assert_eq!(out.values(), ["104.255.61.1/24", "75.75.75.1/30"]);
    }

    #[test]
    fn unique_preserves_first_seen_order() {
        let out = ShowOutput::decode("33 41 33 129 41").unique();
        assert_eq!(out.values(), ["33", "41", "129"]);
    }
}
