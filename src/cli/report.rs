//! Plain-text rendering of an allocation.
//!
//! Colors are applied by the caller; everything here is plain strings.

use termtree::Tree;

use crate::application::services::{Allocation, AllocationSummary};

/// Line printed for a circle without links.
pub const NO_ONE: &str = "[No one]";

/// One circle: its title and one line per gift link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub lines: Vec<String>,
}

/// Sections in rotation order: domestic circles, then the international one.
pub fn sections(allocation: &Allocation, show_empty: bool) -> Vec<Section> {
    allocation
        .rotations()
        .iter()
        .filter_map(|rotation| {
            let lines: Vec<String> = rotation.links.iter().map(ToString::to_string).collect();
            if lines.is_empty() && !show_empty {
                return None;
            }
            let lines = if lines.is_empty() {
                vec![NO_ONE.to_string()]
            } else {
                lines
            };
            Some(Section {
                title: rotation.label(),
                lines,
            })
        })
        .collect()
}

pub fn tree(allocation: &Allocation, show_empty: bool) -> Tree<String> {
    let circles = sections(allocation, show_empty)
        .into_iter()
        .map(|section| Tree::new(section.title).with_leaves(section.lines));
    Tree::new(format!("{} participants", allocation.participant_count())).with_leaves(circles)
}

/// Totals of an allocation; flagged participants are printed by the caller.
pub fn summary(allocation: &Allocation) -> Vec<String> {
    summary_lines(&allocation.summary())
}

fn summary_lines(s: &AllocationSummary) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} participants, {} links, {} domestic circles, {} international members",
            s.participants, s.links, s.domestic_circles, s.international_members
        ),
        format!(
            "rejects: {} domestic, {} international",
            s.domestic_rejects, s.international_rejects
        ),
    ];
    if s.forced_repeats > 0 {
        lines.push(format!("interleaver fallback repeats: {}", s.forced_repeats));
    }
    lines
}
