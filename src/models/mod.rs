pub mod content;
pub mod fields;
pub mod gold;

pub use content::{ContentType, RawContentRecord, StagingRecord};
pub use gold::{
    GenreStat, GoldRecord, GoldView, KpiOverview, LanguageStat, MovieFinance, TopTitle,
    YearlyStat,
};
