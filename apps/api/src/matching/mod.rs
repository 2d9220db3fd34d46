// Matching core: JD parsing, fuzzy skill matching, semantic similarity, score aggregation.
// Pure and synchronous. No database, filesystem, or HTTP types below this module except
// in `handlers`.

pub mod fuzzy;
pub mod handlers;
pub mod jd_parser;
pub mod pipeline;
pub mod scorer;
pub mod similarity;
pub mod text;
