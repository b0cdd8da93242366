mod classify;
mod extract;

pub use classify::{
    analyze_structure, classify_outline, match_title, ClassifyStats, StructureAnalysis,
    TitlePattern,
};
pub use extract::{extract_outline, Outline, OutlineNode, OutlineStats, OutlineStatus};
