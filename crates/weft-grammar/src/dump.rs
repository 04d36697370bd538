//! Human-readable grammar listing.

use std::fmt::Write as _;

use crate::grammar::{Alternative, Grammar};
use crate::node::Wrapping;

impl Grammar {
    /// Lists nodes, states and rules.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "grammar {}", self.name);

        out.push_str("\n[nodes]\n");
        for node in self.nodes.iter() {
            let role = match node.wrapping {
                Wrapping::Full => "",
                Wrapping::Begin => " (region)",
                Wrapping::End => " (end)",
            };
            let _ = write!(out, "N{:<3} {}{role}", node.id.as_u32(), node.name);
            if let Some(tag) = &node.autocomplete {
                let _ = write!(out, " autocomplete={tag}");
            }
            out.push('\n');
        }

        out.push_str("\n[states]\n");
        for (i, state) in self.states.iter().enumerate() {
            let _ = write!(out, "S{i:<3} {}", state.name);
            if let Some(node) = state.node {
                let _ = write!(out, " => {}", self.node_name(node));
            }
            if let Some(embedded) = &state.embedded {
                let _ = write!(out, " embedded={embedded}");
            }
            out.push('\n');
            if let Some(begin) = state.begin {
                let _ = writeln!(out, "     begin R{}", begin.as_u32());
            }
            for end in &state.end {
                let _ = writeln!(out, "     end   R{}", end.as_u32());
            }
            for alternative in &state.alternatives {
                let _ = writeln!(out, "     try   {}", format_alternative(alternative));
            }
        }
        if !self.global.is_empty() {
            out.push_str("global\n");
            for alternative in &self.global {
                let _ = writeln!(out, "     try   {}", format_alternative(alternative));
            }
        }

        out.push_str("\n[rules]\n");
        for (i, rule) in self.rules.iter().enumerate() {
            let _ = write!(out, "R{i:<3} {} {}", rule.path, rule.matcher.source());
            if let Some(node) = rule.node {
                let _ = write!(out, " => {}", self.node_name(node));
            }
            if rule.rematch {
                out.push_str(" rematch");
            }
            out.push('\n');
        }

        out
    }
}

fn format_alternative(alternative: &Alternative) -> String {
    match alternative {
        Alternative::Rule(rule) => format!("R{}", rule.as_u32()),
        Alternative::State(state) => format!("S{}", state.as_u32()),
    }
}
