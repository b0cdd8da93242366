//! Classification of bookmark titles against common sectioning patterns.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use super::extract::OutlineNode;

/// Title pattern categories, in match priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "lowercase"))]
pub enum TitlePattern {
    /// Leading digits, whitespace, then text: "1 Introduction".
    Numbered,
    /// Two or more dot-separated digit groups: "1.2 Overview".
    Hierarchical,
    /// A sectioning keyword and a token: "Chapter 1", "Part A".
    Chapter,
}

impl TitlePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            TitlePattern::Numbered => "numbered",
            TitlePattern::Hierarchical => "hierarchical",
            TitlePattern::Chapter => "chapter",
        }
    }
}

/// Patterns are tested in this order and the first match wins. `numbered`
/// demands whitespace immediately after the digit run, so "1.2 Overview"
/// falls through to `hierarchical`.
static PATTERNS: LazyLock<[(TitlePattern, Regex); 3]> = LazyLock::new(|| {
    [
        (
            TitlePattern::Numbered,
            Regex::new(r"^\d+\s+.+").unwrap(),
        ),
        (
            TitlePattern::Hierarchical,
            Regex::new(r"^\d+(\.\d+)+\s*.*").unwrap(),
        ),
        (
            TitlePattern::Chapter,
            Regex::new(r"(?i)^(chapter|part|section)\s+\w+.*").unwrap(),
        ),
    ]
});

/// Match a title against the known patterns, first match wins.
///
/// The title is trimmed before matching.
pub fn match_title(title: &str) -> Option<TitlePattern> {
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    PATTERNS
        .iter()
        .find(|(_, regex)| regex.is_match(title))
        .map(|(pattern, _)| *pattern)
}

/// Aggregate results of one classification pass.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct ClassifyStats {
    /// Valid nodes examined; invalid nodes are never classified.
    pub processed: usize,
    pub matched: usize,
    pub numbered: usize,
    pub hierarchical: usize,
    pub chapter: usize,
    /// Matched share of the processed (valid) nodes, 0-100.
    pub match_percentage: f64,
}

/// Tag every valid node with its matched pattern.
///
/// Invalid nodes keep `pattern = None` and are excluded from the counts.
/// Classification is deterministic: running it again yields the same tags.
pub fn classify_outline(nodes: &mut [OutlineNode]) -> ClassifyStats {
    let mut stats = ClassifyStats::default();

    for node in nodes.iter_mut() {
        if !node.valid {
            node.pattern = None;
            continue;
        }
        stats.processed += 1;
        node.pattern = match_title(&node.title);
        match node.pattern {
            Some(TitlePattern::Numbered) => stats.numbered += 1,
            Some(TitlePattern::Hierarchical) => stats.hierarchical += 1,
            Some(TitlePattern::Chapter) => stats.chapter += 1,
            None => continue,
        }
        stats.matched += 1;
        debug!(title = %node.title, pattern = node.pattern.map(|p| p.as_str()), "title matched");
    }

    stats.match_percentage = if stats.processed > 0 {
        stats.matched as f64 / stats.processed as f64 * 100.0
    } else {
        0.0
    };

    info!(
        processed = stats.processed,
        matched = stats.matched,
        percentage = stats.match_percentage,
        "classification done"
    );
    stats
}

/// Shape metrics over the whole node list.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct StructureAnalysis {
    pub max_level: u32,
    /// Node count per nesting level.
    pub level_distribution: BTreeMap<u32, usize>,
    /// Mean title length in characters, over non-empty titles only.
    pub average_title_length: f64,
    /// (shortest, longest) non-empty title length in characters.
    pub title_length_range: (usize, usize),
    pub has_hierarchy: bool,
}

/// Describe the outline's shape: depth, level spread, title lengths.
///
/// Level metrics cover every node; the title metrics skip empty titles so
/// untitled entries do not drag the lengths down.
pub fn analyze_structure(nodes: &[OutlineNode]) -> StructureAnalysis {
    if nodes.is_empty() {
        return StructureAnalysis::default();
    }

    let mut analysis = StructureAnalysis::default();
    let mut titled = 0usize;
    let mut total_chars = 0usize;
    let mut min_len = usize::MAX;
    let mut max_len = 0usize;

    for node in nodes {
        analysis.max_level = analysis.max_level.max(node.level);
        *analysis.level_distribution.entry(node.level).or_insert(0) += 1;
        if node.title.is_empty() {
            continue;
        }
        let len = node.title.chars().count();
        titled += 1;
        total_chars += len;
        min_len = min_len.min(len);
        max_len = max_len.max(len);
    }

    if titled > 0 {
        analysis.average_title_length = total_chars as f64 / titled as f64;
        analysis.title_length_range = (min_len, max_len);
    }
    analysis.has_hierarchy = analysis.max_level > 0;
    analysis
}
