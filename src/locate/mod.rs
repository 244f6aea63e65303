//! Locating disclosures: page ranges from the outline, regions from
//! section titles.

mod outline;
mod pattern;
mod section;

pub use outline::{consecutive_runs, search_bookmarks, OutlineResolver, OutlineSource};
pub use pattern::TitlePattern;
pub use section::{pages_with_section, SectionLocator};
