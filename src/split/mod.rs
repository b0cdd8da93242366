mod execute;
mod plan;

pub use execute::{split_pdf, split_pdf_to_temp, PartFile, SplitReport};
pub use plan::{plan_split, PartPreview, SplitPlan, SplitRange};
